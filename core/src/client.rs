//! Stateless request builder and response parser for the daemon's `/api`.
//!
//! # Design
//! `SyncClient` holds only the base URL and optional credentials and carries
//! no mutable state between calls. Each operation has a `build_*` method that
//! produces an `HttpRequest`; every response goes through the same
//! `parse_response`, since the daemon's result shapes vary by operation and
//! version and are returned to the caller as generic JSON.
//!
//! Parameters appear in the query in a fixed order: required ones first, then
//! optional ones, each group in the order the method signature lists them.

use serde_json::Value;

use crate::config::{ClientConfig, Credentials};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::query::{Preferences, Query};

/// Sans-IO client for the daemon control API.
#[derive(Debug, Clone)]
pub struct SyncClient {
    base_url: String,
    credentials: Option<Credentials>,
}

impl SyncClient {
    /// `listen_address` is `host:port`; a full `http://host:port` is accepted too.
    pub fn new(listen_address: &str) -> Self {
        let address = listen_address.trim_end_matches('/');
        let base_url = if address.starts_with("http://") || address.starts_with("https://") {
            format!("{address}/api")
        } else {
            format!("http://{address}/api")
        };
        Self {
            base_url,
            credentials: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let client = Self::new(&config.listen_address);
        match &config.credentials {
            Some(credentials) => client.with_credentials(credentials.clone()),
            None => client,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Turn any query into a request against this daemon.
    pub fn build(&self, query: &Query) -> HttpRequest {
        let headers = match &self.credentials {
            Some(credentials) => vec![("authorization".to_string(), credentials.authorization())],
            None => Vec::new(),
        };
        HttpRequest {
            url: format!("{}?{}", self.base_url, query.encode()),
            headers,
        }
    }

    // -----------------------------------------------------------------------
    // Folders
    // -----------------------------------------------------------------------

    /// Add a folder to sync. Without a secret the daemon generates one.
    pub fn build_add_folder(&self, dir: &str, secret: Option<&str>, selective_sync: bool) -> HttpRequest {
        self.build(
            &Query::new("add_folder")
                .param("dir", dir)
                .opt("secret", secret)
                .flag("selective_sync", selective_sync),
        )
    }

    /// List all folders, or only the one identified by `secret`.
    pub fn build_get_folders(&self, secret: Option<&str>) -> HttpRequest {
        self.build(&Query::new("get_folders").opt("secret", secret))
    }

    pub fn build_remove_folder(&self, secret: &str) -> HttpRequest {
        self.build(&Query::new("remove_folder").param("secret", secret))
    }

    // -----------------------------------------------------------------------
    // Files
    // -----------------------------------------------------------------------

    /// List files at `path` inside the folder (its root when `path` is `None`).
    pub fn build_get_files(&self, secret: &str, path: Option<&str>) -> HttpRequest {
        self.build(&Query::new("get_files").param("secret", secret).opt("path", path))
    }

    /// Mark a file for download in a selective-sync folder.
    pub fn build_set_file_prefs(&self, secret: &str, path: &str, download: bool) -> HttpRequest {
        self.build(
            &Query::new("set_file_prefs")
                .param("secret", secret)
                .param("path", path)
                .flag("download", download),
        )
    }

    // -----------------------------------------------------------------------
    // Per-folder settings
    // -----------------------------------------------------------------------

    pub fn build_get_folder_peers(&self, secret: &str) -> HttpRequest {
        self.build(&Query::new("get_folder_peers").param("secret", secret))
    }

    /// Fetch the secrets for a folder, or generate a fresh set without one.
    ///
    /// `secret_type` is `encryption` to request an encrypted secret.
    pub fn build_get_secrets(&self, secret: Option<&str>, secret_type: Option<&str>) -> HttpRequest {
        self.build(
            &Query::new("get_secrets")
                .opt("secret", secret)
                .opt("type", secret_type),
        )
    }

    pub fn build_get_folder_prefs(&self, secret: &str) -> HttpRequest {
        self.build(&Query::new("get_folder_prefs").param("secret", secret))
    }

    pub fn build_set_folder_prefs(&self, secret: &str, prefs: &Preferences) -> HttpRequest {
        self.build(&Query::new("set_folder_prefs").param("secret", secret).prefs(prefs))
    }

    pub fn build_get_folder_hosts(&self, secret: &str) -> HttpRequest {
        self.build(&Query::new("get_folder_hosts").param("secret", secret))
    }

    /// Replace the folder's predefined hosts (`host:port` entries).
    pub fn build_set_folder_hosts<S: AsRef<str>>(&self, secret: &str, hosts: &[S]) -> HttpRequest {
        self.build(
            &Query::new("set_folder_hosts")
                .param("secret", secret)
                .list("hosts", hosts),
        )
    }

    // -----------------------------------------------------------------------
    // Daemon-wide
    // -----------------------------------------------------------------------

    pub fn build_get_prefs(&self) -> HttpRequest {
        self.build(&Query::new("get_prefs"))
    }

    pub fn build_set_prefs(&self, prefs: &Preferences) -> HttpRequest {
        self.build(&Query::new("set_prefs").prefs(prefs))
    }

    pub fn build_get_os(&self) -> HttpRequest {
        self.build(&Query::new("get_os"))
    }

    pub fn build_get_version(&self) -> HttpRequest {
        self.build(&Query::new("get_version"))
    }

    pub fn build_get_speed(&self) -> HttpRequest {
        self.build(&Query::new("get_speed"))
    }

    pub fn build_shutdown(&self) -> HttpRequest {
        self.build(&Query::new("shutdown"))
    }

    /// Decode a response body into generic JSON.
    ///
    /// A daemon-reported failure such as `{"error": 1}` is still `Ok`; see
    /// `check_daemon_status`.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, ApiError> {
        if !response.is_success() {
            return Err(ApiError::HttpError {
                status: response.status,
                body: response.body,
            });
        }
        if response.body.trim().is_empty() {
            return Err(ApiError::EmptyResponse);
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }
}
