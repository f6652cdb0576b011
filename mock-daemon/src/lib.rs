//! In-memory stand-in for the sync daemon's `/api` control endpoint.
//!
//! Every call is `GET /api?method=<op>&...`. State lives behind a shared
//! `Db` handle so tests can inspect the raw queries the daemon received.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Folder {
    pub dir: String,
    pub secret: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub access: String,
    pub files: u64,
    pub error: i64,
    pub indexing: i64,
    #[serde(skip)]
    pub selective_sync: bool,
    #[serde(skip)]
    pub entries: Vec<Value>,
    #[serde(skip)]
    pub hosts: Vec<String>,
    #[serde(skip)]
    pub prefs: Map<String, Value>,
}

#[derive(Debug, Default)]
pub struct DaemonState {
    pub folders: Vec<Folder>,
    pub prefs: Map<String, Value>,
    pub credentials: Option<(String, String)>,
    pub shutdown_requested: bool,
    /// Raw query strings in arrival order.
    pub queries: Vec<String>,
}

pub type Db = Arc<RwLock<DaemonState>>;

pub fn new_db() -> Db {
    let state = DaemonState {
        prefs: default_prefs(),
        ..DaemonState::default()
    };
    Arc::new(RwLock::new(state))
}

/// Like `new_db`, but every request must carry these basic-auth credentials.
pub fn new_db_with_auth(login: &str, password: &str) -> Db {
    let state = DaemonState {
        prefs: default_prefs(),
        credentials: Some((login.to_string(), password.to_string())),
        ..DaemonState::default()
    };
    Arc::new(RwLock::new(state))
}

pub fn app() -> Router {
    app_with_state(new_db())
}

pub fn app_with_state(db: Db) -> Router {
    Router::new().route("/api", get(dispatch)).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, new_db()).await
}

pub async fn run_with_state(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(db)).await
}

fn default_prefs() -> Map<String, Value> {
    let prefs = json!({
        "device_name": "mock-daemon",
        "disk_low_priority": "true",
        "download_limit": 0,
        "folder_rescan_interval": "600",
        "lan_encrypt_data": "true",
        "lan_use_tcp": "false",
        "lang": -1,
        "listening_port": 11589,
        "max_file_size_diff_for_patching": "1000",
        "max_file_size_for_versioning": "1000",
        "rate_limit_local_peers": "false",
        "send_buf_size": "5",
        "sync_max_time_diff": "600",
        "sync_trash_ttl": "30",
        "upload_limit": 0,
        "use_upnp": 0
    });
    match prefs {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn default_folder_prefs() -> Map<String, Value> {
    ["search_lan", "use_dht", "use_hosts", "use_relay_server", "use_sync_trash", "use_tracker"]
        .into_iter()
        .map(|key| (key.to_string(), json!(if key == "use_dht" { 0 } else { 1 })))
        .collect()
}

fn new_secret() -> String {
    format!("A{}", Uuid::new_v4().simple()).to_uppercase()
}

fn status(code: i64) -> Value {
    json!({ "error": code })
}

fn failure(message: &str) -> Value {
    json!({ "error": 1, "message": message })
}

/// Numeric preference values stay numbers; everything else stays a string.
fn pref_value(raw: &str) -> Value {
    raw.parse::<i64>().map(Value::from).unwrap_or_else(|_| json!(raw))
}

fn authorized(state: &DaemonState, headers: &HeaderMap) -> bool {
    let Some((login, password)) = &state.credentials else {
        return true;
    };
    let expected = base64::engine::general_purpose::STANDARD.encode(format!("{login}:{password}"));
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        .is_some_and(|token| token == expected)
}

async fn dispatch(
    State(db): State<Db>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut state = db.write().await;
    if !authorized(&state, &headers) {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    state.queries.push(raw.unwrap_or_default());

    let method = params.get("method").map(String::as_str).unwrap_or_default();
    tracing::debug!(method, "api call");
    Json(handle(&mut state, method, &params)).into_response()
}

fn handle(state: &mut DaemonState, method: &str, params: &HashMap<String, String>) -> Value {
    let param = |key: &str| params.get(key).map(String::as_str).filter(|v| !v.is_empty());
    let flag = |key: &str| param(key) == Some("1");

    match method {
        "add_folder" => {
            let Some(dir) = param("dir") else {
                return failure("Specify path to the sync folder");
            };
            if state.folders.iter().any(|f| f.dir == dir) {
                return failure("Selected folder is already added to BitTorrent Sync.");
            }
            state.folders.push(Folder {
                dir: dir.to_string(),
                secret: param("secret").map_or_else(new_secret, str::to_string),
                size: 0,
                access: "read_write".to_string(),
                files: 0,
                error: 0,
                indexing: 0,
                selective_sync: flag("selective_sync"),
                entries: Vec::new(),
                hosts: Vec::new(),
                prefs: default_folder_prefs(),
            });
            status(0)
        }
        "get_folders" => {
            let folders = state
                .folders
                .iter()
                .filter(|f| param("secret").is_none_or(|s| s == f.secret))
                .map(|f| serde_json::to_value(f).unwrap_or(Value::Null))
                .collect();
            Value::Array(folders)
        }
        "remove_folder" => {
            let before = state.folders.len();
            state.folders.retain(|f| Some(f.secret.as_str()) != param("secret"));
            status(if state.folders.len() < before { 0 } else { 1 })
        }
        "get_secrets" => {
            let read_write = param("secret").map_or_else(new_secret, str::to_string);
            let body = read_write.get(1..).unwrap_or_default();
            if param("type") == Some("encryption") {
                json!({ "read_write": read_write, "encryption": format!("D{body}") })
            } else {
                json!({
                    "read_only": format!("B{body}"),
                    "read_write": read_write,
                    "encryption": format!("D{body}"),
                })
            }
        }
        "get_prefs" => Value::Object(state.prefs.clone()),
        "set_prefs" => {
            for (key, value) in params.iter().filter(|(k, _)| k.as_str() != "method") {
                state.prefs.insert(key.clone(), pref_value(value));
            }
            Value::Object(state.prefs.clone())
        }
        "get_os" => json!({ "os": std::env::consts::OS }),
        "get_version" => json!({ "version": "1.4.111" }),
        "get_speed" => json!({ "download": 0, "upload": 0 }),
        "shutdown" => {
            state.shutdown_requested = true;
            status(0)
        }
        _ => {
            let Some(folder) = param("secret").and_then(|s| state.folders.iter_mut().find(|f| f.secret == s)) else {
                return match method {
                    "get_files" | "set_file_prefs" | "get_folder_peers" | "get_folder_prefs"
                    | "set_folder_prefs" | "get_folder_hosts" | "set_folder_hosts" => {
                        failure("Invalid secret")
                    }
                    _ => failure("Invalid request"),
                };
            };
            handle_folder(folder, method, params)
        }
    }
}

fn handle_folder(folder: &mut Folder, method: &str, params: &HashMap<String, String>) -> Value {
    let param = |key: &str| params.get(key).map(String::as_str).filter(|v| !v.is_empty());

    match method {
        "get_files" => {
            let prefix = param("path").map(|p| format!("{}/", p.trim_end_matches('/')));
            let entries = folder
                .entries
                .iter()
                .filter(|e| {
                    let name = e["name"].as_str().unwrap_or_default();
                    match &prefix {
                        Some(prefix) => name
                            .strip_prefix(prefix.as_str())
                            .is_some_and(|rest| !rest.is_empty() && !rest.contains('/')),
                        None => !name.contains('/'),
                    }
                })
                .cloned()
                .collect();
            Value::Array(entries)
        }
        "set_file_prefs" => {
            let Some(path) = param("path") else {
                return failure("Specify path");
            };
            let download = i64::from(param("download") == Some("1"));
            match folder.entries.iter_mut().find(|e| e["name"] == path) {
                Some(entry) => {
                    entry["download"] = json!(download);
                    entry.clone()
                }
                None => {
                    let entry = json!({
                        "name": path,
                        "state": "created",
                        "type": "file",
                        "size": 0,
                        "total_pieces": 0,
                        "have_pieces": 0,
                        "download": download,
                    });
                    folder.entries.push(entry.clone());
                    folder.files += 1;
                    entry
                }
            }
        }
        "get_folder_peers" => json!([]),
        "get_folder_prefs" => Value::Object(folder.prefs.clone()),
        "set_folder_prefs" => {
            for (key, value) in params
                .iter()
                .filter(|(k, _)| !matches!(k.as_str(), "method" | "secret"))
            {
                folder.prefs.insert(key.clone(), pref_value(value));
            }
            Value::Object(folder.prefs.clone())
        }
        "get_folder_hosts" => json!({ "hosts": folder.hosts }),
        "set_folder_hosts" => {
            folder.hosts = param("hosts")
                .map(|h| h.split(',').map(str::to_string).collect())
                .unwrap_or_default();
            json!({ "hosts": folder.hosts })
        }
        _ => failure("Invalid request"),
    }
}
