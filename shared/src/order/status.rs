//! Lifecycle statuses and the central transition table

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order lifecycle status
///
/// ```text
/// AwaitingPayment -> AwaitingVerification -> InProduction -> Shipping -> Completed
///        ^                   |
///        +---- (rejected) ---+
/// ```
///
/// `Completed` is terminal. `Rejected` exists as an explicit admin override
/// state; a rejected *payment* sends the order straight back to
/// `AwaitingPayment` so the buyer can resubmit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    AwaitingPayment,
    AwaitingVerification,
    InProduction,
    Shipping,
    Completed,
    Rejected,
}

impl OrderStatus {
    /// String form stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::AwaitingPayment => "AWAITING_PAYMENT",
            OrderStatus::AwaitingVerification => "AWAITING_VERIFICATION",
            OrderStatus::InProduction => "IN_PRODUCTION",
            OrderStatus::Shipping => "SHIPPING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Rejected => "REJECTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed)
    }

    /// Statuses an admin may set through the fulfillment endpoint
    pub fn is_advance_target(&self) -> bool {
        matches!(
            self,
            OrderStatus::InProduction
                | OrderStatus::Shipping
                | OrderStatus::Completed
                | OrderStatus::Rejected
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AWAITING_PAYMENT" => Ok(OrderStatus::AwaitingPayment),
            "AWAITING_VERIFICATION" => Ok(OrderStatus::AwaitingVerification),
            "IN_PRODUCTION" => Ok(OrderStatus::InProduction),
            "SHIPPING" => Ok(OrderStatus::Shipping),
            "COMPLETED" => Ok(OrderStatus::Completed),
            "REJECTED" => Ok(OrderStatus::Rejected),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Payment verification status
///
/// A payment is "live" while awaiting verification; once decided it is
/// immutable — a rejected payment can never become verified.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    AwaitingVerification,
    Verified,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::AwaitingVerification => "AWAITING_VERIFICATION",
            PaymentStatus::Verified => "VERIFIED",
            PaymentStatus::Rejected => "REJECTED",
        }
    }

    pub fn is_decided(&self) -> bool {
        !matches!(self, PaymentStatus::AwaitingVerification)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AWAITING_VERIFICATION" => Ok(PaymentStatus::AwaitingVerification),
            "VERIFIED" => Ok(PaymentStatus::Verified),
            "REJECTED" => Ok(PaymentStatus::Rejected),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// Illegal transition reported by the table
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("{0} is not a valid fulfillment target")]
    NotAdvanceTarget(OrderStatus),

    #[error("transition {from} -> {to} is not allowed")]
    Illegal { from: OrderStatus, to: OrderStatus },
}

/// How strictly the admin fulfillment endpoint validates progression
///
/// The original system let an admin jump to any enumerated status; that
/// laxity is kept as the default. Strict mode enforces forward-only
/// progression and makes `Completed` truly terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentPolicy {
    #[default]
    Permissive,
    Strict,
}

impl FulfillmentPolicy {
    /// Validate an admin-initiated fulfillment transition
    pub fn validate_advance(
        &self,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), TransitionError> {
        if !to.is_advance_target() {
            return Err(TransitionError::NotAdvanceTarget(to));
        }
        match self {
            FulfillmentPolicy::Permissive => Ok(()),
            FulfillmentPolicy::Strict => {
                let ok = match (from, to) {
                    // Rejected override is allowed from any non-terminal state
                    (f, OrderStatus::Rejected) if !f.is_terminal() => true,
                    (OrderStatus::AwaitingVerification, OrderStatus::InProduction) => true,
                    (OrderStatus::InProduction, OrderStatus::Shipping) => true,
                    (OrderStatus::Shipping, OrderStatus::Completed) => true,
                    _ => false,
                };
                if ok {
                    Ok(())
                } else {
                    Err(TransitionError::Illegal { from, to })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_targets_exclude_payment_states() {
        assert!(!OrderStatus::AwaitingPayment.is_advance_target());
        assert!(!OrderStatus::AwaitingVerification.is_advance_target());
        assert!(OrderStatus::InProduction.is_advance_target());
        assert!(OrderStatus::Shipping.is_advance_target());
        assert!(OrderStatus::Completed.is_advance_target());
        assert!(OrderStatus::Rejected.is_advance_target());
    }

    #[test]
    fn permissive_allows_any_enumerated_jump() {
        let p = FulfillmentPolicy::Permissive;
        assert!(p.validate_advance(OrderStatus::AwaitingPayment, OrderStatus::Completed).is_ok());
        assert!(p.validate_advance(OrderStatus::Shipping, OrderStatus::InProduction).is_ok());
        // Target outside the enumerated set is still refused
        assert_eq!(
            p.validate_advance(OrderStatus::InProduction, OrderStatus::AwaitingPayment),
            Err(TransitionError::NotAdvanceTarget(OrderStatus::AwaitingPayment))
        );
    }

    #[test]
    fn strict_enforces_forward_only() {
        let s = FulfillmentPolicy::Strict;
        assert!(s.validate_advance(OrderStatus::InProduction, OrderStatus::Shipping).is_ok());
        assert!(s.validate_advance(OrderStatus::Shipping, OrderStatus::Completed).is_ok());
        assert_eq!(
            s.validate_advance(OrderStatus::Shipping, OrderStatus::InProduction),
            Err(TransitionError::Illegal {
                from: OrderStatus::Shipping,
                to: OrderStatus::InProduction,
            })
        );
    }

    #[test]
    fn strict_keeps_completed_terminal() {
        let s = FulfillmentPolicy::Strict;
        assert_eq!(
            s.validate_advance(OrderStatus::Completed, OrderStatus::Rejected),
            Err(TransitionError::Illegal {
                from: OrderStatus::Completed,
                to: OrderStatus::Rejected,
            })
        );
    }

    #[test]
    fn rejected_override_allowed_from_non_terminal() {
        let s = FulfillmentPolicy::Strict;
        assert!(s.validate_advance(OrderStatus::AwaitingPayment, OrderStatus::Rejected).is_ok());
        assert!(s.validate_advance(OrderStatus::InProduction, OrderStatus::Rejected).is_ok());
    }

    #[test]
    fn status_strings_round_trip() {
        for st in [
            OrderStatus::AwaitingPayment,
            OrderStatus::AwaitingVerification,
            OrderStatus::InProduction,
            OrderStatus::Shipping,
            OrderStatus::Completed,
            OrderStatus::Rejected,
        ] {
            assert_eq!(st.as_str().parse::<OrderStatus>(), Ok(st));
        }
    }

    #[test]
    fn decided_payments_are_not_live() {
        assert!(!PaymentStatus::AwaitingVerification.is_decided());
        assert!(PaymentStatus::Verified.is_decided());
        assert!(PaymentStatus::Rejected.is_decided());
    }
}
