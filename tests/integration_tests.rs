use call_blocker::config::Config;
use call_blocker::host::HostSession;
use call_blocker::init::init_components;
use call_blocker::model::{CallDetails, CallResponse, Contact};
use call_blocker::store::MemoryPreferences;
use serde_json::Value;
use std::sync::Arc;

fn memory_config() -> Config {
    let mut config = Config::default();
    config.storage.backend = "memory".to_string();
    config.stats.enable = false;
    config
}

#[tokio::test]
async fn test_end_to_end_screening() {
    let config = memory_config();
    let components = init_components(&config, Arc::new(MemoryPreferences::new()));
    let screener = components.screener;

    screener
        .contacts()
        .save_contacts(vec![Contact {
            name: "Friend".to_string(),
            phone: "+15551234567".to_string(),
        }])
        .unwrap();

    // Known contact, formatted differently
    let resp = screener
        .screen(&CallDetails::incoming("+1 (555) 123-4567"))
        .await;
    assert_eq!(resp, CallResponse::allow());
    assert!(screener.blocked_calls().snapshot().is_empty());

    // Stranger
    let mut rx = screener.blocked_calls().observe();
    let resp = screener.screen(&CallDetails::incoming("+15559999999")).await;
    assert_eq!(resp, CallResponse::reject());

    let log = screener.blocked_calls().snapshot();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].phone.as_deref(), Some("+15559999999"));

    // The observable view was pushed the same entry
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().len(), 1);
}

#[tokio::test]
async fn test_missing_plus_is_not_a_match() {
    let components = init_components(&memory_config(), Arc::new(MemoryPreferences::new()));
    let screener = components.screener;
    screener
        .contacts()
        .save_contacts(vec![Contact {
            name: "Mom".to_string(),
            phone: "+7 (919) 710-21-96".to_string(),
        }])
        .unwrap();

    let resp = screener.screen(&CallDetails::incoming("79197102196")).await;
    assert_eq!(resp, CallResponse::reject());
    let resp = screener
        .screen(&CallDetails::incoming("+7 919 710 21 96"))
        .await;
    assert_eq!(resp, CallResponse::allow());
}

#[tokio::test]
async fn test_host_session_flow() {
    let components = init_components(&memory_config(), Arc::new(MemoryPreferences::new()));
    let session = HostSession::new(components.screener, components.importer, components.recent);

    let resp: Value = serde_json::from_str(
        &session
            .handle_line(r#"{"op":"import_contacts","contacts":[{"name":"A","phone":"+1 (555) 123-4567"}]}"#)
            .await,
    )
    .unwrap();
    assert_eq!(resp["kind"], "imported");
    assert_eq!(resp["allowed_numbers"], 1);

    let resp: Value = serde_json::from_str(
        &session
            .handle_line(r#"{"op":"screen","number":"+15559999999"}"#)
            .await,
    )
    .unwrap();
    assert_eq!(resp["kind"], "screened");
    assert_eq!(resp["reject_call"], true);

    let resp: Value =
        serde_json::from_str(&session.handle_line(r#"{"op":"blocked"}"#).await).unwrap();
    assert_eq!(resp["kind"], "blocked");
    assert_eq!(resp["title"], "Blocking enabled");
    assert_eq!(resp["rows"][0]["phone"], "+15559999999");

    let resp: Value =
        serde_json::from_str(&session.handle_line(r#"{"op":"toggle"}"#).await).unwrap();
    assert_eq!(resp["enabled"], false);

    // Disabled: strangers get through and nothing new is logged
    let resp: Value = serde_json::from_str(
        &session
            .handle_line(r#"{"op":"screen","number":"+15550000000"}"#)
            .await,
    )
    .unwrap();
    assert_eq!(resp["reject_call"], false);

    let resp: Value =
        serde_json::from_str(&session.handle_line(r#"{"op":"status"}"#).await).unwrap();
    assert_eq!(resp["enabled"], false);
    assert_eq!(resp["stats"]["screened"], 2);
    assert_eq!(resp["stats"]["blocked"], 1);

    let resp: Value =
        serde_json::from_str(&session.handle_line(r#"{"op":"blocked"}"#).await).unwrap();
    assert_eq!(resp["rows"].as_array().unwrap().len(), 1);

    let resp: Value =
        serde_json::from_str(&session.handle_line("not json").await).unwrap();
    assert_eq!(resp["kind"], "error");
}

#[tokio::test]
async fn test_recent_events_are_buffered() {
    let components = init_components(&memory_config(), Arc::new(MemoryPreferences::new()));
    let session = HostSession::new(components.screener, components.importer, components.recent);

    session
        .handle_line(r#"{"op":"screen","number":"+15559999999"}"#)
        .await;

    // Sink tasks drain asynchronously
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let resp: Value =
        serde_json::from_str(&session.handle_line(r#"{"op":"recent","limit":5}"#).await).unwrap();
    assert_eq!(resp["kind"], "recent");
    let events = resp["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["number"], "+15559999999");
    assert_eq!(events[0]["action"], "Blocked");
    assert_eq!(events[0]["reason"], "not_allow_listed");
}
