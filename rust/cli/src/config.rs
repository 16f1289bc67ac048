//! Turning CLI flags (or a TOML preset file) into validated [`TableRules`].

use std::fs;

use pitboss_engine::rules::{
    AceResplitRule, BlackjackRatio, DoubleAfterSplit, DoublingRule, JoinRule, SeventeenRule,
    SideBetOffer, SplittingRule, SurrenderRule, TableRules,
};
use pitboss_engine::sidebets::SideBetKind;

use crate::cli::{
    DasFlag, DoublingFlag, JoinFlag, RatioFlag, ResplitFlag, RuleArgs, SeventeenFlag, SplitFlag,
    SurrenderFlag,
};
use crate::error::CliError;

/// Builds the table rules for a command. A `--preset FILE` replaces the
/// individual flags wholesale; either way the result is validated before a
/// table is built from it.
pub fn build_rules(args: &RuleArgs) -> Result<TableRules, CliError> {
    if let Some(path) = &args.preset {
        let text = fs::read_to_string(path)?;
        let rules: TableRules = toml::from_str(&text)
            .map_err(|e| CliError::Config(format!("bad preset file {}: {}", path, e)))?;
        return Ok(rules);
    }

    let mut side_bets = Vec::new();
    for flag in &args.side_bets {
        let kind = SideBetKind::from_flag(flag).ok_or_else(|| {
            CliError::InvalidInput(format!(
                "unknown side bet {:?} (expected one of perfect-pairs, match-the-dealer, \
                 lucky-ladies, kings-bounty, buster-blackjack)",
                flag
            ))
        })?;
        side_bets.push(SideBetOffer::standard(kind));
    }

    Ok(TableRules {
        num_decks: args.decks,
        min_bet_cents: args.min_bet * 100,
        max_bet_cents: args.max_bet * 100,
        blackjack_ratio: match args.ratio {
            RatioFlag::ThreeTwo => BlackjackRatio::ThreeToTwo,
            RatioFlag::SixFive => BlackjackRatio::SixToFive,
        },
        seventeen_rule: match args.seventeen {
            SeventeenFlag::S17 => SeventeenRule::S17,
            SeventeenFlag::H17 => SeventeenRule::H17,
        },
        surrender_rule: match args.surrender {
            SurrenderFlag::Ns => SurrenderRule::NS,
            SurrenderFlag::Es => SurrenderRule::ES,
            SurrenderFlag::Es10 => SurrenderRule::ES10,
            SurrenderFlag::Ls => SurrenderRule::LS,
        },
        doubling_rule: match args.doubling {
            DoublingFlag::Da2 => DoublingRule::DA2,
            DoublingFlag::D9 => DoublingRule::D9,
            DoublingFlag::D10 => DoublingRule::D10,
        },
        double_after_split: match args.das {
            DasFlag::Das => DoubleAfterSplit::DAS,
            DasFlag::Ndas => DoubleAfterSplit::NDAS,
        },
        splitting_rule: match args.split {
            SplitFlag::Sp2 => SplittingRule::SP2,
            SplitFlag::Sp4 => SplittingRule::SP4,
        },
        ace_resplit: match args.resplit_aces {
            ResplitFlag::Rsa => AceResplitRule::RSA,
            ResplitFlag::Nrsa => AceResplitRule::NRSA,
        },
        join_rule: match args.joining {
            JoinFlag::None => JoinRule::Open,
            JoinFlag::Nmse => JoinRule::NoMidShoeEntry,
        },
        side_bets,
        pen_override: args.pen,
    })
}
