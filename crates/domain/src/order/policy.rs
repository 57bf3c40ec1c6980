//! What happens to a cart when it is submitted.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Cart handling on order submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubmitPolicy {
    /// The cart keeps its items after submission.
    #[default]
    RetainCart,

    /// The cart is emptied in the same commit that stores the order.
    ClearCart,
}

impl SubmitPolicy {
    /// Returns true if submission empties the cart.
    pub fn clears_cart(&self) -> bool {
        matches!(self, SubmitPolicy::ClearCart)
    }
}

impl std::fmt::Display for SubmitPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SubmitPolicy::RetainCart => "retain",
            SubmitPolicy::ClearCart => "clear",
        };
        write!(f, "{s}")
    }
}

impl FromStr for SubmitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retain" | "retain_cart" => Ok(SubmitPolicy::RetainCart),
            "clear" | "clear_cart" => Ok(SubmitPolicy::ClearCart),
            other => Err(format!("unknown submit policy: {other}")),
        }
    }
}
