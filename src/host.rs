//! Request/response boundary for host integrations.
//!
//! Requests arrive as JSON objects tagged by `action`:
//!
//! ```json
//! { "action": "getVersion" }
//! { "action": "backup" }
//! { "action": "cleanup", "days": 30 }
//! ```
//!
//! Every request yields a [`HostResponse`]; failures are reported in it
//! rather than returned as errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::lifecycle::Counts;
use crate::migrate::SCHEMA_VERSION;
use crate::storage::KeyValueStore;
use crate::store::{Action, Outcome, TaskStore};
use crate::transfer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum HostRequest {
    GetVersion,
    Backup,
    Cleanup { days: u32 },
}

impl HostRequest {
    /// Parse a JSON request
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|err| Error::InvalidArgument(format!("invalid host request: {err}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HostResponse {
    fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn failed(err: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub version: &'static str,
    pub schema_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_saved: Option<DateTime<Utc>>,
    pub counts: Counts,
}

/// Handle one host request against an open store
pub fn handle<S: KeyValueStore>(
    store: &mut TaskStore<S>,
    request: HostRequest,
    now: DateTime<Utc>,
) -> HostResponse {
    let result = match &request {
        HostRequest::GetVersion => serde_json::to_value(VersionInfo {
            version: env!("CARGO_PKG_VERSION"),
            schema_version: SCHEMA_VERSION,
            last_saved: store.last_saved(),
            counts: store.list().counts(),
        })
        .map_err(Error::from),
        HostRequest::Backup => {
            serde_json::to_value(transfer::export(store.list(), now)).map_err(Error::from)
        }
        HostRequest::Cleanup { days } => store
            .apply(
                Action::Cleanup {
                    older_than_days: *days,
                },
                now,
            )
            .and_then(|outcome| match outcome {
                Outcome::CleanedUp { report } => Ok(serde_json::to_value(report)?),
                other => Err(Error::Internal(format!("unexpected outcome: {other:?}"))),
            }),
    };

    match result {
        Ok(data) => HostResponse::ok(data),
        Err(err) => {
            tracing::error!(request = ?request, error = %err, "host request failed");
            HostResponse::failed(&err)
        }
    }
}
