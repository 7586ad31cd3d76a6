//! Federation wire types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Memo kinds a federation server may ask the sender to attach.
///
/// Values outside the four known kinds are kept verbatim in
/// [`MemoType::Other`] and serialize back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MemoType {
    Id,
    Text,
    Hash,
    Return,
    Other(String),
}

impl MemoType {
    pub fn as_str(&self) -> &str {
        match self {
            MemoType::Id => "id",
            MemoType::Text => "text",
            MemoType::Hash => "hash",
            MemoType::Return => "return",
            MemoType::Other(raw) => raw,
        }
    }
}

impl From<String> for MemoType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "id" => MemoType::Id,
            "text" => MemoType::Text,
            "hash" => MemoType::Hash,
            "return" => MemoType::Return,
            _ => MemoType::Other(raw),
        }
    }
}

impl From<MemoType> for String {
    fn from(memo_type: MemoType) -> Self {
        match memo_type {
            MemoType::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for MemoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a federation lookup.
///
/// `memo` is always a string on the wire, even for `id` memos; responses that
/// carry any other JSON type are rejected before a record is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederationRecord {
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo_type: Option<MemoType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    /// Any other fields the server returned (e.g. `zion_address`), untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FederationRecord {
    /// A record for a destination that was already an account id.
    pub fn account(account_id: impl Into<String>) -> Self {
        Self { account_id: account_id.into(), memo_type: None, memo: None, extra: Map::new() }
    }
}
