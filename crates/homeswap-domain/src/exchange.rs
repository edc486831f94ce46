//! Exchange request lifecycle.
//!
//! The only modeled transition is `Pending -> Accepted`. It is one-way: an
//! accepted request never returns to pending, and accepted properties stay
//! exchanged. Other statuses exist on the entity but have no transitions yet.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExchangeStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl ExchangeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ExchangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown exchange status: {0}")]
pub struct UnknownExchangeStatus(pub String);

impl FromStr for ExchangeStatus {
    type Err = UnknownExchangeStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "ACCEPTED" => Ok(Self::Accepted),
            "REJECTED" => Ok(Self::Rejected),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(UnknownExchangeStatus(other.to_owned())),
        }
    }
}

/// The two users and two properties an exchange request binds together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeParties {
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub from_property_id: Uuid,
    pub to_property_id: Uuid,
}

/// Side effect the caller must carry out to complete a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeEffect {
    /// Set `is_exchanged = true` on the property.
    MarkPropertyExchanged(Uuid),
    /// Re-evaluate the trade badge ladder for the user.
    EvaluateTradeBadges(Uuid),
}

/// Next status plus the ordered effects that go with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: ExchangeStatus,
    pub effects: Vec<ExchangeEffect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("exchange request is not pending (status {0})")]
    NotPending(ExchangeStatus),
}

impl ExchangeStatus {
    /// Accept a pending request.
    ///
    /// Both properties are marked exchanged unconditionally. The recipient's
    /// badges are evaluated before the proposer's.
    pub fn accept(self, parties: &ExchangeParties) -> Result<Transition, TransitionError> {
        if self != Self::Pending {
            return Err(TransitionError::NotPending(self));
        }
        Ok(Transition {
            next: Self::Accepted,
            effects: vec![
                ExchangeEffect::MarkPropertyExchanged(parties.from_property_id),
                ExchangeEffect::MarkPropertyExchanged(parties.to_property_id),
                ExchangeEffect::EvaluateTradeBadges(parties.to_user_id),
                ExchangeEffect::EvaluateTradeBadges(parties.from_user_id),
            ],
        })
    }
}

impl Transition {
    /// Property ids this transition marks exchanged, in effect order.
    pub fn properties_to_mark(&self) -> Vec<Uuid> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                ExchangeEffect::MarkPropertyExchanged(id) => Some(*id),
                ExchangeEffect::EvaluateTradeBadges(_) => None,
            })
            .collect()
    }

    /// User ids whose trade badges must be evaluated, in effect order.
    pub fn users_to_evaluate(&self) -> Vec<Uuid> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                ExchangeEffect::EvaluateTradeBadges(id) => Some(*id),
                ExchangeEffect::MarkPropertyExchanged(_) => None,
            })
            .collect()
    }
}
