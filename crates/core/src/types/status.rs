//! Order workflow status.
//!
//! The workflow is a fixed, ordered set of states:
//!
//! ```text
//! Pending -> Preparing -> Out for Delivery -> Delivered
//! ```
//!
//! `Pending` is the only initial state and `Delivered` is terminal. The wire
//! representation is the human-readable label, spaces included.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string is not one of the defined status labels.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid status: {0:?}")]
pub struct UnknownStatus(pub String);

/// Where an order is in the delivery workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "order_status"))]
pub enum OrderStatus {
    /// Placed, not yet picked up by staff.
    #[default]
    #[cfg_attr(feature = "postgres", sqlx(rename = "Pending"))]
    Pending,
    /// Being prepared.
    #[cfg_attr(feature = "postgres", sqlx(rename = "Preparing"))]
    Preparing,
    /// Handed to a courier.
    #[serde(rename = "Out for Delivery")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "Out for Delivery"))]
    OutForDelivery,
    /// Received by the customer.
    #[cfg_attr(feature = "postgres", sqlx(rename = "Delivered"))]
    Delivered,
}

impl OrderStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Preparing,
        Self::OutForDelivery,
        Self::Delivered,
    ];

    /// The wire label for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Preparing => "Preparing",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
        }
    }

    /// Whether no further transitions exist.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// The next status in the workflow, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Preparing),
            Self::Preparing => Some(Self::OutForDelivery),
            Self::OutForDelivery => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }

    /// Whether moving from `self` to `target` is a strictly sequential step.
    ///
    /// Staying in the same status is allowed, so re-applying a status is a no-op.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        self == target || self.next() == Some(target)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_owned()))
    }
}
