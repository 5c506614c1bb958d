use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade reference shared by the buy leg and the sell leg of one round trip.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeRef(pub String);

impl TradeRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TradeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TradeRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// 1-based row number in the source file (header excluded).
pub type RowNumber = usize;
