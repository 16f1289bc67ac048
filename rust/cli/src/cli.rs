//! Command-line argument types for the pitboss CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "pitboss",
    version,
    about = "Multi-seat casino blackjack table",
    disable_help_subcommand = true
)]
pub struct PitbossCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an interactive table on this terminal
    Play {
        #[command(flatten)]
        rules: RuleArgs,
        /// RNG seed for the shoe (default: random)
        #[arg(long)]
        seed: Option<u64>,
        /// Number of rounds to play before the session ends
        #[arg(long, default_value_t = 10)]
        rounds: u64,
        /// Write a JSONL round log to this file
        #[arg(long)]
        log: Option<String>,
    },
    /// Print the resolved rule preset without starting a game
    Preset {
        #[command(flatten)]
        rules: RuleArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = PresetFormat::Toml)]
        format: PresetFormat,
        /// Also save the preset to this file
        #[arg(long)]
        save: Option<String>,
    },
}

/// The table-rule flags shared by `play` and `preset`.
#[derive(Args, Debug, Clone)]
pub struct RuleArgs {
    /// Number of decks in the shoe (1, 2, 4, 6 or 8)
    #[arg(long, default_value_t = 6)]
    pub decks: u8,
    /// Minimum main bet, in whole dollars
    #[arg(long = "min-bet", default_value_t = 5)]
    pub min_bet: u64,
    /// Maximum main bet, in whole dollars
    #[arg(long = "max-bet", default_value_t = 100)]
    pub max_bet: u64,
    /// What a natural blackjack pays
    #[arg(long, value_enum, default_value_t = RatioFlag::ThreeTwo)]
    pub ratio: RatioFlag,
    /// Dealer behavior on seventeen
    #[arg(long, value_enum, default_value_t = SeventeenFlag::S17)]
    pub seventeen: SeventeenFlag,
    /// Surrender rule
    #[arg(long, value_enum, default_value_t = SurrenderFlag::Ls)]
    pub surrender: SurrenderFlag,
    /// Doubling rule
    #[arg(long, value_enum, default_value_t = DoublingFlag::Da2)]
    pub doubling: DoublingFlag,
    /// Double after split
    #[arg(long = "das", value_enum, default_value_t = DasFlag::Das)]
    pub das: DasFlag,
    /// Split cap
    #[arg(long, value_enum, default_value_t = SplitFlag::Sp4)]
    pub split: SplitFlag,
    /// Ace re-split rule
    #[arg(long = "resplit-aces", value_enum, default_value_t = ResplitFlag::Nrsa)]
    pub resplit_aces: ResplitFlag,
    /// Joining restriction
    #[arg(long = "joining", value_enum, default_value_t = JoinFlag::Nmse)]
    pub joining: JoinFlag,
    /// Up to two side bets (e.g. perfect-pairs,lucky-ladies)
    #[arg(long = "side-bets", value_delimiter = ',')]
    pub side_bets: Vec<String>,
    /// Fixed penetration percentage instead of the per-deck random range
    #[arg(long)]
    pub pen: Option<u8>,
    /// Load the whole preset from a TOML file instead of the flags above
    #[arg(long)]
    pub preset: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum RatioFlag {
    /// 3:2
    #[value(name = "3-2")]
    ThreeTwo,
    /// 6:5
    #[value(name = "6-5")]
    SixFive,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum SeventeenFlag {
    S17,
    H17,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum SurrenderFlag {
    Ns,
    Es,
    Es10,
    Ls,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum DoublingFlag {
    Da2,
    D9,
    D10,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum DasFlag {
    Das,
    Ndas,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum SplitFlag {
    Sp2,
    Sp4,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ResplitFlag {
    Rsa,
    Nrsa,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum JoinFlag {
    /// No restriction
    None,
    /// No mid-shoe entry
    Nmse,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum PresetFormat {
    Toml,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_play_parses_with_defaults() {
        let cli = PitbossCli::try_parse_from(["pitboss", "play"]).unwrap();
        match cli.cmd {
            Commands::Play { rules, rounds, .. } => {
                assert_eq!(rules.decks, 6);
                assert_eq!(rules.min_bet, 5);
                assert_eq!(rules.max_bet, 100);
                assert_eq!(rounds, 10);
            }
            _ => panic!("expected play command"),
        }
    }

    #[test]
    fn test_side_bets_flag_is_comma_separated() {
        let cli = PitbossCli::try_parse_from([
            "pitboss",
            "play",
            "--side-bets",
            "perfect-pairs,lucky-ladies",
        ])
        .unwrap();
        match cli.cmd {
            Commands::Play { rules, .. } => {
                assert_eq!(rules.side_bets, vec!["perfect-pairs", "lucky-ladies"]);
            }
            _ => panic!("expected play command"),
        }
    }

    #[test]
    fn test_ratio_flag_values() {
        let cli =
            PitbossCli::try_parse_from(["pitboss", "preset", "--ratio", "6-5"]).unwrap();
        match cli.cmd {
            Commands::Preset { rules, .. } => {
                assert!(matches!(rules.ratio, RatioFlag::SixFive));
            }
            _ => panic!("expected preset command"),
        }
    }

    #[test]
    fn test_unknown_side_bet_name_still_parses_as_string() {
        // validation happens when the rules are built, not in clap
        let cli = PitbossCli::try_parse_from(["pitboss", "preset", "--side-bets", "royal-match"])
            .unwrap();
        match cli.cmd {
            Commands::Preset { rules, .. } => assert_eq!(rules.side_bets, vec!["royal-match"]),
            _ => panic!("expected preset command"),
        }
    }
}
