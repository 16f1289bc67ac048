use serde::{Deserialize, Serialize};

use chrono::{SecondsFormat, Utc};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// How one hand on one seat came out, for the round log.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeatOutcome {
    /// Player name
    pub player: String,
    /// Seat name ("center seat", ...)
    pub seat: String,
    /// Table position (1-7)
    pub position: u8,
    /// Cards in short notation at settlement time
    pub cards: Vec<String>,
    /// Final score as displayed ("20", "Blackjack", "Bust")
    pub score: Option<String>,
    /// What was settled: "win", "push", "lose", "blackjack", "bust",
    /// "surrender", or a side-bet tier name
    pub outcome: String,
    /// Amount staked, in cents
    pub bet_cents: u64,
    /// Net movement toward the player, in cents (negative on a loss)
    pub net_cents: i64,
}

/// Complete record of one round, serialized as a single JSONL line.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// 1-based round counter for the session
    pub round: u64,
    /// Penetration percentage in play for the current shoe
    pub pen: Option<u8>,
    /// Dealer's up-card in short notation
    pub dealer_up: Option<String>,
    /// Dealer's full hand at round end
    pub dealer_hand: Vec<String>,
    /// Dealer's final score as displayed
    pub dealer_score: Option<String>,
    /// Every settled hand and side bet this round
    pub seats: Vec<SeatOutcome>,
    /// Whether the front cut card forced a reshuffle at round end
    pub reshuffle: bool,
    /// Timestamp when the round was logged (RFC3339)
    #[serde(default)]
    pub ts: Option<String>,
}

/// Writes round records as JSONL. A logger without a writer swallows
/// records, which keeps the table code free of logging conditionals.
pub struct RoundLogger {
    writer: Option<BufWriter<File>>,
}

impl RoundLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                let _ = create_dir_all(parent);
            }
        }
        let f = File::create(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
        })
    }

    /// A logger that drops everything; used when no log path is configured.
    pub fn disabled() -> Self {
        Self { writer: None }
    }

    pub fn write(&mut self, record: &RoundRecord) -> std::io::Result<()> {
        // inject timestamp if missing
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}
