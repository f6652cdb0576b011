//! Blocking facade: one method per daemon operation.

use serde_json::Value;

use crate::client::SyncClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::query::{Preferences, Query};
use crate::transport::{Transport, UreqTransport};

/// A `SyncClient` paired with a `Transport`.
///
/// Read-only after construction; share it by reference across threads when
/// the transport allows it. Calls are not serialized.
#[derive(Clone)]
pub struct SyncApi<T: Transport = UreqTransport> {
    client: SyncClient,
    transport: T,
}

impl SyncApi<UreqTransport> {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            client: SyncClient::from_config(config),
            transport: UreqTransport::new(config.timeout),
        }
    }
}

impl<T: Transport> SyncApi<T> {
    pub fn with_transport(client: SyncClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &SyncClient {
        &self.client
    }

    /// Issue an arbitrary query, for daemon methods this crate does not wrap.
    pub fn call(&self, query: &Query) -> Result<Value, ApiError> {
        self.send(self.client.build(query))
    }

    fn send(&self, request: HttpRequest) -> Result<Value, ApiError> {
        tracing::debug!(query = request.query().unwrap_or_default(), "calling daemon");
        let response = self.transport.execute(&request)?;
        self.client.parse_response(response)
    }

    pub fn add_folder(&self, dir: &str, secret: Option<&str>, selective_sync: bool) -> Result<Value, ApiError> {
        self.send(self.client.build_add_folder(dir, secret, selective_sync))
    }

    pub fn get_folders(&self, secret: Option<&str>) -> Result<Value, ApiError> {
        self.send(self.client.build_get_folders(secret))
    }

    pub fn remove_folder(&self, secret: &str) -> Result<Value, ApiError> {
        self.send(self.client.build_remove_folder(secret))
    }

    pub fn get_files(&self, secret: &str, path: Option<&str>) -> Result<Value, ApiError> {
        self.send(self.client.build_get_files(secret, path))
    }

    pub fn set_file_prefs(&self, secret: &str, path: &str, download: bool) -> Result<Value, ApiError> {
        self.send(self.client.build_set_file_prefs(secret, path, download))
    }

    pub fn get_folder_peers(&self, secret: &str) -> Result<Value, ApiError> {
        self.send(self.client.build_get_folder_peers(secret))
    }

    pub fn get_secrets(&self, secret: Option<&str>, secret_type: Option<&str>) -> Result<Value, ApiError> {
        self.send(self.client.build_get_secrets(secret, secret_type))
    }

    pub fn get_folder_prefs(&self, secret: &str) -> Result<Value, ApiError> {
        self.send(self.client.build_get_folder_prefs(secret))
    }

    pub fn set_folder_prefs(&self, secret: &str, prefs: &Preferences) -> Result<Value, ApiError> {
        self.send(self.client.build_set_folder_prefs(secret, prefs))
    }

    pub fn get_folder_hosts(&self, secret: &str) -> Result<Value, ApiError> {
        self.send(self.client.build_get_folder_hosts(secret))
    }

    pub fn set_folder_hosts<S: AsRef<str>>(&self, secret: &str, hosts: &[S]) -> Result<Value, ApiError> {
        self.send(self.client.build_set_folder_hosts(secret, hosts))
    }

    pub fn get_prefs(&self) -> Result<Value, ApiError> {
        self.send(self.client.build_get_prefs())
    }

    pub fn set_prefs(&self, prefs: &Preferences) -> Result<Value, ApiError> {
        self.send(self.client.build_set_prefs(prefs))
    }

    pub fn get_os(&self) -> Result<Value, ApiError> {
        self.send(self.client.build_get_os())
    }

    pub fn get_version(&self) -> Result<Value, ApiError> {
        self.send(self.client.build_get_version())
    }

    pub fn get_speed(&self) -> Result<Value, ApiError> {
        self.send(self.client.build_get_speed())
    }

    pub fn shutdown(&self) -> Result<Value, ApiError> {
        self.send(self.client.build_shutdown())
    }
}
