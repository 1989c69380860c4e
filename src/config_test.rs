use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

// =============================================================================
// Defaults
// =============================================================================

#[test]
fn empty_environment_uses_defaults() {
    let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.state_file, PathBuf::from(DEFAULT_STATE_FILE));
    assert_eq!(config.timeouts, Timeouts::default());
}

#[test]
fn blank_state_file_uses_default() {
    let config = ClientConfig::from_lookup(lookup_from(&[(ENV_STATE_FILE, "  ")])).unwrap();
    assert_eq!(config.state_file, PathBuf::from(DEFAULT_STATE_FILE));
}

// =============================================================================
// Base URL
// =============================================================================

#[test]
fn base_url_trailing_slash_trimmed() {
    let config = ClientConfig::from_lookup(lookup_from(&[(ENV_BASE_URL, "https://rooms.example.edu/")])).unwrap();
    assert_eq!(config.base_url, "https://rooms.example.edu");
}

#[test]
fn base_url_without_scheme_is_rejected() {
    let err = ClientConfig::from_lookup(lookup_from(&[(ENV_BASE_URL, "rooms.example.edu")])).unwrap_err();
    assert!(err.to_string().contains(ENV_BASE_URL));
}

#[test]
fn with_base_url_overrides() {
    let config = ClientConfig::from_lookup(lookup_from(&[]))
        .unwrap()
        .with_base_url("http://127.0.0.1:9000/")
        .unwrap();
    assert_eq!(config.base_url, "http://127.0.0.1:9000");
}

// =============================================================================
// Timeouts
// =============================================================================

#[test]
fn timeouts_parsed() {
    let config = ClientConfig::from_lookup(lookup_from(&[
        (ENV_REQUEST_TIMEOUT_SECS, "5"),
        (ENV_CONNECT_TIMEOUT_SECS, " 2 "),
    ]))
    .unwrap();
    assert_eq!(config.timeouts, Timeouts { request_secs: 5, connect_secs: 2 });
}

#[test]
fn invalid_or_zero_timeouts_fall_back() {
    let config = ClientConfig::from_lookup(lookup_from(&[
        (ENV_REQUEST_TIMEOUT_SECS, "soon"),
        (ENV_CONNECT_TIMEOUT_SECS, "0"),
    ]))
    .unwrap();
    assert_eq!(config.timeouts, Timeouts::default());
}
