//! Wire contract shared by the RPC and HTTP front ends
//!
//! RPC framing is one JSON object per line:
//! ```text
//! -> {"id":1,"method":"Store.Get","params":{"key":"foo"}}
//! <- {"id":1,"result":{"success":true,"data":"bar"}}
//! ```
//! Transport-level failures (undecodable frame, unknown method) come back in
//! the top-level `error` field with no `result`. Application-level failures are
//! a `result` with `success: false`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Message returned for a missing or expired key by every front end
pub const NOT_FOUND_MESSAGE: &str = "Key not found or expired";

/// Parameters for every operation. `value` and `ttl` only matter for `Set`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Target key
    #[serde(default)]
    pub key: String,
    /// Payload to store
    #[serde(default)]
    pub value: String,
    /// Lifetime in seconds; zero or negative never expires
    #[serde(default)]
    pub ttl: i64,
}

impl Request {
    /// Request addressing only a key (Get / Delete)
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Set request
    pub fn set(key: impl Into<String>, value: impl Into<String>, ttl: i64) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ttl,
        }
    }
}

/// Outcome of one operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Whether the operation succeeded
    pub success: bool,
    /// Value for a successful Get
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Human-readable reason when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    /// `{"success":true}`
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    /// `{"success":true,"data":...}`
    pub fn with_data(data: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// `{"success":false,"error":...}`
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// The not-found/expired failure
    pub fn not_found() -> Self {
        Self::failure(NOT_FOUND_MESSAGE)
    }
}

/// RPC method names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `Store.Set`
    Set,
    /// `Store.Get`
    Get,
    /// `Store.Delete`
    Delete,
}

impl Method {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Set => "Store.Set",
            Method::Get => "Store.Get",
            Method::Delete => "Store.Delete",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Store.Set" => Ok(Method::Set),
            "Store.Get" => Ok(Method::Get),
            "Store.Delete" => Ok(Method::Delete),
            _ => Err(Error::Decode(format!("unknown method '{}'", s))),
        }
    }
}

/// One RPC call on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcFrame {
    /// Caller-chosen correlation id, echoed in the reply
    pub id: u64,
    /// Method name, e.g. `Store.Set`
    pub method: String,
    /// Call parameters
    #[serde(default)]
    pub params: Request,
}

impl RpcFrame {
    /// Build a frame for `method`
    pub fn new(id: u64, method: Method, params: Request) -> Self {
        Self {
            id,
            method: method.as_str().to_string(),
            params,
        }
    }
}

/// One RPC reply on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcReplyFrame {
    /// Id of the call this answers; `None` when the call could not be decoded
    pub id: Option<u64>,
    /// Application-level outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Reply>,
    /// Transport-level failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RpcReplyFrame {
    /// Successful dispatch (the reply itself may still be `success: false`)
    pub fn result(id: u64, reply: Reply) -> Self {
        Self {
            id: Some(id),
            result: Some(reply),
            error: None,
        }
    }

    /// Transport-level failure
    pub fn transport_error(id: Option<u64>, error: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(error.into()),
        }
    }
}
