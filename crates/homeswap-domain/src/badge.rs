//! Achievement badges and the milestone ladders that award them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Achievement badge kinds.
///
/// Wire format: upper snake case string, the same value stored in the
/// `badges.type` column. Each type exists at most once in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeType {
    // referral ladder
    GoldenHost,
    LotsOfFriends,
    PureCharisma,
    Vip,
    DiamondVip,
    // trade ladder
    FirstTrade,
    ExperiencedTrader,
    Veteran,
}

impl BadgeType {
    pub const ALL: [BadgeType; 8] = [
        Self::GoldenHost,
        Self::LotsOfFriends,
        Self::PureCharisma,
        Self::Vip,
        Self::DiamondVip,
        Self::FirstTrade,
        Self::ExperiencedTrader,
        Self::Veteran,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GoldenHost => "GOLDEN_HOST",
            Self::LotsOfFriends => "LOTS_OF_FRIENDS",
            Self::PureCharisma => "PURE_CHARISMA",
            Self::Vip => "VIP",
            Self::DiamondVip => "DIAMOND_VIP",
            Self::FirstTrade => "FIRST_TRADE",
            Self::ExperiencedTrader => "EXPERIENCED_TRADER",
            Self::Veteran => "VETERAN",
        }
    }

    /// Human-readable name used when seeding the catalog.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::GoldenHost => "Golden Host",
            Self::LotsOfFriends => "Lots of Friends",
            Self::PureCharisma => "Pure Charisma",
            Self::Vip => "VIP",
            Self::DiamondVip => "Diamond VIP",
            Self::FirstTrade => "First Trade",
            Self::ExperiencedTrader => "Experienced Trader",
            Self::Veteran => "Veteran",
        }
    }
}

impl fmt::Display for BadgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown badge type: {0}")]
pub struct UnknownBadgeType(pub String);

impl FromStr for BadgeType {
    type Err = UnknownBadgeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| UnknownBadgeType(s.to_owned()))
    }
}

/// Referral milestones. Matched exactly against the referrer's new total.
pub const REFERRAL_LADDER: [(u32, BadgeType); 5] = [
    (1, BadgeType::GoldenHost),
    (3, BadgeType::LotsOfFriends),
    (10, BadgeType::PureCharisma),
    (50, BadgeType::Vip),
    (200, BadgeType::DiamondVip),
];

/// Badge earned when a user's referral count reaches `total_referrals`.
///
/// Only the exact breakpoint awards; totals in between award nothing.
pub fn referral_badge(total_referrals: u32) -> Option<BadgeType> {
    REFERRAL_LADDER
        .iter()
        .find(|(at, _)| *at == total_referrals)
        .map(|(_, badge)| *badge)
}

pub const FIRST_TRADE_AT: u64 = 1;
pub const EXPERIENCED_TRADER_AT: u64 = 20;
pub const VETERAN_FROM: u64 = 100;

/// Badge earned for `accepted` completed exchanges.
///
/// First trade and experienced trader match exactly; veteran is open-ended.
pub fn trade_badge(accepted: u64) -> Option<BadgeType> {
    match accepted {
        FIRST_TRADE_AT => Some(BadgeType::FirstTrade),
        EXPERIENCED_TRADER_AT => Some(BadgeType::ExperiencedTrader),
        n if n >= VETERAN_FROM => Some(BadgeType::Veteran),
        _ => None,
    }
}
