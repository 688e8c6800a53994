//! Marketplace participant roles.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The part a user plays in the marketplace.
///
/// Farmers and SHG/FPO groups sell produce; consumers buy it. The role is
/// issued by the API at login and kept in the session store as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Individual grower selling their own produce.
    Farmer,
    /// Self-Help Group or Farmer-Producer Organization.
    #[serde(alias = "shg", alias = "fpo", alias = "SHG/FPO")]
    ShgFpo,
    /// Buyer.
    Consumer,
}

impl UserRole {
    /// Wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Farmer => "farmer",
            Self::ShgFpo => "shg_fpo",
            Self::Consumer => "consumer",
        }
    }

    /// Whether this role lists produce for sale.
    #[must_use]
    pub const fn is_seller(self) -> bool {
        matches!(self, Self::Farmer | Self::ShgFpo)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown user role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for UserRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "farmer" => Ok(Self::Farmer),
            "shg_fpo" | "shg" | "fpo" | "shg/fpo" => Ok(Self::ShgFpo),
            "consumer" | "customer" => Ok(Self::Consumer),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_aliases() {
        assert_eq!("SHG".parse::<UserRole>().unwrap(), UserRole::ShgFpo);
        assert_eq!("shg/fpo".parse::<UserRole>().unwrap(), UserRole::ShgFpo);
        assert_eq!(" Farmer ".parse::<UserRole>().unwrap(), UserRole::Farmer);
        assert_eq!("customer".parse::<UserRole>().unwrap(), UserRole::Consumer);
    }

    #[test]
    fn test_from_str_unknown() {
        assert_eq!(
            "trader".parse::<UserRole>(),
            Err(ParseRoleError("trader".to_string()))
        );
    }

    #[test]
    fn test_sellers() {
        assert!(UserRole::Farmer.is_seller());
        assert!(UserRole::ShgFpo.is_seller());
        assert!(!UserRole::Consumer.is_seller());
    }

    #[test]
    fn test_display_matches_serde() {
        for role in [UserRole::Farmer, UserRole::ShgFpo, UserRole::Consumer] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
        }
    }
}
