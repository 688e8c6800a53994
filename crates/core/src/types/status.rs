//! Status enums for orders and payments.

use serde::{Deserialize, Serialize};

/// Order lifecycle as reported by the marketplace API.
///
/// Orders move forward through `Placed → Confirmed → Packed → Shipped →
/// Delivered`; `Cancelled` can be reached from any state before delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Placed,
    Confirmed,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Ordered tracking stages shown to the buyer.
    pub const TRACKING_STAGES: [Self; 5] = [
        Self::Placed,
        Self::Confirmed,
        Self::Packed,
        Self::Shipped,
        Self::Delivered,
    ];

    /// Position in [`Self::TRACKING_STAGES`], `None` for cancelled orders.
    #[must_use]
    pub fn stage_index(self) -> Option<usize> {
        Self::TRACKING_STAGES.iter().position(|s| *s == self)
    }

    /// No further transitions happen from this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Placed => "Order placed",
            Self::Confirmed => "Confirmed by seller",
            Self::Packed => "Packed",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// How the buyer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CashOnDelivery,
    Upi,
    Card,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CashOnDelivery => write!(f, "cash on delivery"),
            Self::Upi => write!(f, "UPI"),
            Self::Card => write!(f, "card"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cod" | "cash" | "cash_on_delivery" => Ok(Self::CashOnDelivery),
            "upi" => Ok(Self::Upi),
            "card" => Ok(Self::Card),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_index() {
        assert_eq!(OrderStatus::Placed.stage_index(), Some(0));
        assert_eq!(OrderStatus::Delivered.stage_index(), Some(4));
        assert_eq!(OrderStatus::Cancelled.stage_index(), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }

    #[test]
    fn test_order_status_wire_format() {
        let status: OrderStatus = serde_json::from_str("\"shipped\"").unwrap();
        assert_eq!(status, OrderStatus::Shipped);
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("COD".parse::<PaymentMethod>().unwrap(), PaymentMethod::CashOnDelivery);
        assert_eq!("upi".parse::<PaymentMethod>().unwrap(), PaymentMethod::Upi);
        assert!("cheque".parse::<PaymentMethod>().is_err());
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap(),
            "\"cash_on_delivery\""
        );
    }
}
