use serde::{Deserialize, Serialize};

pub type AgentId = u32;

/// Per-round market side of a vehicle, derived from its state of charge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Buyer,
    Seller,
    #[default]
    Neutral,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

/// Why a matching attempt produced no settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    PriceMismatch,
    OutOfRange,
    NoSellerFound,
    NoBuyerFound,
    ZeroTransfer,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::PriceMismatch => "price_mismatch",
            FailureReason::OutOfRange => "out_of_range",
            FailureReason::NoSellerFound => "no_seller_found",
            FailureReason::NoBuyerFound => "no_buyer_found",
            FailureReason::ZeroTransfer => "zero_transfer",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
