//! Typed views of daemon responses.
//!
//! Operations return `serde_json::Value`; these DTOs are for callers that want
//! fixed shapes. Record types keep unrecognized fields in `extra`, since the
//! daemon adds fields between versions.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Project a generic result onto a typed view.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// `{"error": N}` status returned by mutating operations. 0 means success.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Status {
    pub error: i64,
}

impl Status {
    pub fn is_ok(&self) -> bool {
        self.error == 0
    }
}

/// One entry from `get_folders`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Folder {
    pub dir: String,
    pub secret: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type", default)]
    pub access: Option<String>,
    #[serde(default)]
    pub files: u64,
    #[serde(default)]
    pub error: i64,
    #[serde(default)]
    pub indexing: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry from `get_files`, or the record returned by `set_file_prefs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileEntry {
    pub name: String,
    /// `file` or `folder`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub total_pieces: Option<u64>,
    #[serde(default)]
    pub have_pieces: Option<u64>,
    /// 1 when marked for download in a selective-sync folder.
    #[serde(default)]
    pub download: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry from `get_folder_peers`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Peer {
    pub id: String,
    #[serde(default)]
    pub connection: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub synced: Option<i64>,
    #[serde(default)]
    pub download: u64,
    #[serde(default)]
    pub upload: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `get_secrets`. Which keys are present depends on the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Secrets {
    #[serde(default)]
    pub read_only: Option<String>,
    #[serde(default)]
    pub read_write: Option<String>,
    #[serde(default)]
    pub encryption: Option<String>,
}

/// Result of `get_folder_hosts` and `set_folder_hosts`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FolderHosts {
    pub hosts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OsInfo {
    pub os: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: String,
}

/// Current transfer rates in bytes per second.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Speed {
    pub download: u64,
    pub upload: u64,
}
