//! Typed forms of the string columns used across the schema.
//!
//! Each enum serializes to the same upper/lower-case string that is stored in the
//! database, so API payloads and rows agree without a mapping layer.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Pricing category of a leaflet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfitType {
    /// Multi-unit dwellings (apartment blocks)
    #[serde(rename = "MKD")]
    Mkd,
    /// Private sector (detached houses)
    #[serde(rename = "CHS")]
    Chs,
}

impl ProfitType {
    /// Payout per distributed leaflet.
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Mkd => 0.5,
            Self::Chs => 1.5,
        }
    }

    /// Distributor payout for `distributed` leaflets.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn profit_for(self, distributed: i64) -> f64 {
        self.multiplier() * distributed as f64
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mkd => "MKD",
            Self::Chs => "CHS",
        }
    }
}

impl FromStr for ProfitType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MKD" => Ok(Self::Mkd),
            "CHS" => Ok(Self::Chs),
            other => Err(Error::validation(format!("Неизвестный тип оплаты: {other}"))),
        }
    }
}

/// Lifecycle state of a leaflet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeafletOrderState {
    InProcess,
    #[serde(rename = "FORPAYMENT")]
    ForPayment,
    Done,
    Declined,
    Cancelled,
}

impl LeafletOrderState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProcess => "IN_PROCESS",
            Self::ForPayment => "FORPAYMENT",
            Self::Done => "DONE",
            Self::Declined => "DECLINED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Whether the order can still be completed, cancelled or paid.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::InProcess | Self::ForPayment)
    }
}

impl FromStr for LeafletOrderState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "IN_PROCESS" => Ok(Self::InProcess),
            "FORPAYMENT" => Ok(Self::ForPayment),
            "DONE" => Ok(Self::Done),
            "DECLINED" => Ok(Self::Declined),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(Error::validation(format!("Неизвестный статус: {other}"))),
        }
    }
}

impl fmt::Display for LeafletOrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a customer service order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    New,
    InWork,
    Done,
    Cancelled,
}

impl OrderState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::InWork => "IN_WORK",
            Self::Done => "DONE",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for OrderState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NEW" => Ok(Self::New),
            "IN_WORK" => Ok(Self::InWork),
            "DONE" => Ok(Self::Done),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(Error::validation(format!("Неизвестный статус: {other}"))),
        }
    }
}

/// Dashboard role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Advertising,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Advertising => "advertising",
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "admin" => Ok(Self::Admin),
            "advertising" => Ok(Self::Advertising),
            "manager" => Ok(Self::Manager),
            other => Err(Error::validation(format!("Неизвестная роль: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_profit_multipliers() {
        assert_eq!(ProfitType::Mkd.profit_for(30), 15.0);
        assert_eq!(ProfitType::Chs.profit_for(30), 45.0);
        assert_eq!(ProfitType::Chs.profit_for(0), 0.0);
    }

    #[test]
    fn test_state_strings_match_serde() -> Result<()> {
        for state in [
            LeafletOrderState::InProcess,
            LeafletOrderState::ForPayment,
            LeafletOrderState::Done,
            LeafletOrderState::Declined,
            LeafletOrderState::Cancelled,
        ] {
            let json = serde_json::to_string(&state)?;
            assert_eq!(json, format!("\"{}\"", state.as_str()));
            assert_eq!(state.as_str().parse::<LeafletOrderState>()?, state);
        }
        Ok(())
    }

    #[test]
    fn test_open_states() {
        assert!(LeafletOrderState::InProcess.is_open());
        assert!(LeafletOrderState::ForPayment.is_open());
        assert!(!LeafletOrderState::Done.is_open());
        assert!(!LeafletOrderState::Declined.is_open());
        assert!(!LeafletOrderState::Cancelled.is_open());
    }

    #[test]
    fn test_unknown_values_rejected() {
        assert!("XYZ".parse::<ProfitType>().is_err());
        assert!("PAID".parse::<LeafletOrderState>().is_err());
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_round_trip() -> Result<()> {
        for role in [Role::Admin, Role::Manager, Role::Advertising] {
            assert_eq!(role.as_str().parse::<Role>()?, role);
        }
        Ok(())
    }
}
