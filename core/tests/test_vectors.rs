//! Verify request building and response parsing against the JSON vectors in
//! `test-vectors/`.
//!
//! Query vectors pin the exact wire format of every operation. Response
//! vectors compare parsed JSON values, not raw strings, so field order in the
//! simulated bodies does not matter.

use serde_json::Value;
use sync_core::{ApiError, DaemonError, HttpRequest, HttpResponse, Preferences, SyncClient};

const BASE_URL: &str = "http://127.0.0.1:8888/api";

fn client() -> SyncClient {
    SyncClient::new("127.0.0.1:8888")
}

fn prefs(args: &Value) -> Preferences {
    args["prefs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| (pair[0].as_str().unwrap(), pair[1].as_str().unwrap()))
        .collect()
}

/// Dispatch a vector's operation name and arguments onto the matching builder.
fn build(c: &SyncClient, operation: &str, args: &Value) -> HttpRequest {
    let s = |key: &str| args[key].as_str();
    let b = |key: &str| args[key].as_bool().unwrap_or(false);
    match operation {
        "add_folder" => c.build_add_folder(s("dir").unwrap(), s("secret"), b("selective_sync")),
        "get_folders" => c.build_get_folders(s("secret")),
        "remove_folder" => c.build_remove_folder(s("secret").unwrap()),
        "get_files" => c.build_get_files(s("secret").unwrap(), s("path")),
        "set_file_prefs" => c.build_set_file_prefs(s("secret").unwrap(), s("path").unwrap(), b("download")),
        "get_folder_peers" => c.build_get_folder_peers(s("secret").unwrap()),
        "get_secrets" => c.build_get_secrets(s("secret"), s("type")),
        "get_folder_prefs" => c.build_get_folder_prefs(s("secret").unwrap()),
        "set_folder_prefs" => c.build_set_folder_prefs(s("secret").unwrap(), &prefs(args)),
        "get_folder_hosts" => c.build_get_folder_hosts(s("secret").unwrap()),
        "set_folder_hosts" => {
            let hosts: Vec<&str> = args["hosts"]
                .as_array()
                .unwrap()
                .iter()
                .map(|h| h.as_str().unwrap())
                .collect();
            c.build_set_folder_hosts(s("secret").unwrap(), hosts.as_slice())
        }
        "get_prefs" => c.build_get_prefs(),
        "set_prefs" => c.build_set_prefs(&prefs(args)),
        "get_os" => c.build_get_os(),
        "get_version" => c.build_get_version(),
        "get_speed" => c.build_get_speed(),
        "shutdown" => c.build_shutdown(),
        other => panic!("unknown operation: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[test]
fn query_test_vectors() {
    let raw = include_str!("../../test-vectors/queries.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = case["expected_query"].as_str().unwrap();

        let req = build(&c, case["operation"].as_str().unwrap(), &case["args"]);
        assert_eq!(req.url, format!("{BASE_URL}?{expected}"), "{name}: url");
        assert!(!req.url.ends_with('&'), "{name}: trailing separator");
        assert!(req.headers.is_empty(), "{name}: headers");
    }
}

#[test]
fn every_operation_has_a_query_vector() {
    let raw = include_str!("../../test-vectors/queries.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let covered: Vec<&str> = vectors["cases"]
        .as_array()
        .unwrap()
        .iter()
        .map(|case| case["operation"].as_str().unwrap())
        .collect();

    for operation in [
        "add_folder", "get_folders", "remove_folder", "get_files", "set_file_prefs",
        "get_folder_peers", "get_secrets", "get_folder_prefs", "set_folder_prefs",
        "get_folder_hosts", "set_folder_hosts", "get_prefs", "set_prefs", "get_os",
        "get_version", "get_speed", "shutdown",
    ] {
        assert!(covered.contains(&operation), "no vector for {operation}");
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        };
        let result = c.parse_response(response);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "EmptyResponse" => assert!(matches!(err, ApiError::EmptyResponse), "{name}: {err}"),
                "DeserializationError" => {
                    assert!(matches!(err, ApiError::DeserializationError(_)), "{name}: {err}")
                }
                "HttpError" => assert!(matches!(err, ApiError::HttpError { .. }), "{name}: {err}"),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            let value = result.unwrap();
            assert_eq!(value, case["expected_result"], "{name}: parsed result");
            let daemon_error = DaemonError::from_response(&value).and_then(|e| e.code);
            assert_eq!(daemon_error, case["expected_daemon_error"].as_i64(), "{name}: daemon status");
        }
    }
}
