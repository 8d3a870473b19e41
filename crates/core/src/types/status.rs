//! Order lifecycle and account role enums.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// The admin console moves orders forward through
/// `pending -> approved -> dispatched -> delivered`, one step at a time.
/// `cancelled` is a valid stored value but is not reachable through the
/// status-update endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Approved,
    Dispatched,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The next status in the forward-only progression, if any.
    ///
    /// `delivered` and `cancelled` are terminal.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Approved),
            Self::Approved => Some(Self::Dispatched),
            Self::Dispatched => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    /// Whether `target` is a legal single-step forward transition from `self`.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }

    /// Whether this status may be set through the admin status-update
    /// endpoint at all. `cancelled` is excluded from the allow-list.
    #[must_use]
    pub const fn is_updatable_target(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Dispatched => write!(f, "dispatched"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "dispatched" => Ok(Self::Dispatched),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Account role. Admins may manage the catalog and move orders through
/// their lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// How an order is paid.
///
/// `cod` needs no verification, `khalti` is verified synchronously against
/// the wallet provider before the order is committed, and `stripe` goes
/// through the hosted checkout-session flow instead of the order endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cod,
    Khalti,
    Stripe,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cod => write!(f, "cod"),
            Self::Khalti => write!(f, "khalti"),
            Self::Stripe => write!(f, "stripe"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cod" => Ok(Self::Cod),
            "khalti" => Ok(Self::Khalti),
            "stripe" => Ok(Self::Stripe),
            _ => Err(format!("unsupported payment method: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_forward_chain() {
        assert_eq!(OrderStatus::Pending.next(), Some(OrderStatus::Approved));
        assert_eq!(OrderStatus::Approved.next(), Some(OrderStatus::Dispatched));
        assert_eq!(
            OrderStatus::Dispatched.next(),
            Some(OrderStatus::Delivered)
        );
        assert_eq!(OrderStatus::Delivered.next(), None);
        assert_eq!(OrderStatus::Cancelled.next(), None);
    }

    #[test]
    fn test_status_rejects_skips_and_reversals() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Approved));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Dispatched.can_transition_to(OrderStatus::Approved));
        assert!(!OrderStatus::Approved.can_transition_to(OrderStatus::Approved));
    }

    #[test]
    fn test_cancelled_outside_update_allow_list() {
        assert!(OrderStatus::Pending.is_updatable_target());
        assert!(OrderStatus::Delivered.is_updatable_target());
        assert!(!OrderStatus::Cancelled.is_updatable_target());
    }

    #[test]
    fn test_status_string_roundtrip() {
        for s in ["pending", "approved", "dispatched", "delivered", "cancelled"] {
            let status = OrderStatus::from_str(s).expect("parse");
            assert_eq!(status.to_string(), s);
        }
        assert!(OrderStatus::from_str("shipped").is_err());
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!(PaymentMethod::from_str("cod"), Ok(PaymentMethod::Cod));
        assert_eq!(PaymentMethod::from_str("khalti"), Ok(PaymentMethod::Khalti));
        assert_eq!(PaymentMethod::from_str("stripe"), Ok(PaymentMethod::Stripe));
        assert!(PaymentMethod::from_str("esewa").is_err());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::from_str("admin"), Ok(Role::Admin));
        assert_eq!(Role::from_str("user"), Ok(Role::User));
        assert!(Role::from_str("root").is_err());
    }
}
