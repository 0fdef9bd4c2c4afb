//! Session envelopes through a bootstrapped application context.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use kay_core::AppContext;
use kay_core::conf::UnitRegistry;
use kay_core::sessions::{SessionCodec, SessionData, SessionRecord};
use serde_json::json;

fn context() -> AppContext {
    let registry = UnitRegistry::new()
        .with_unit_source("settings", "SECRET_KEY = \"integration\"\nCOOKIE_AGE = 60\n")
        .unwrap();
    AppContext::bootstrap("settings", registry).unwrap()
}

#[test]
fn round_trip_through_context() {
    let ctx = context();
    let mut payload = SessionData::new();
    payload.insert("_user".into(), json!("ann@example.com"));
    payload.insert("visits".into(), json!(3));

    let envelope = ctx.codec().encode(&payload).unwrap();
    assert_eq!(ctx.codec().decode(&envelope), payload);
}

#[test]
fn truncated_envelopes_decode_empty() {
    let ctx = context();
    assert!(ctx.codec().decode("").is_empty());
    assert!(ctx.codec().decode("short").is_empty());

    let envelope = ctx.codec().encode(&json!({"a": 1})).unwrap();
    assert!(ctx.codec().decode(&envelope[..envelope.len() / 2]).is_empty());
}

#[test]
fn envelope_from_another_deployment_is_discarded() {
    let ctx = context();
    let foreign = SessionCodec::new("someone-else").encode(&json!({"admin": true})).unwrap();
    assert!(ctx.codec().decode(&foreign).is_empty());
}

#[test]
fn record_uses_cookie_age() {
    let ctx = context();
    let now = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
    let age = ctx.settings().cookie_age().unwrap();
    assert_eq!(age, Duration::from_secs(60));

    let record = SessionRecord::new(ctx.codec(), &json!({"cart": [1]}), now, age).unwrap();
    assert_eq!(record.decoded(ctx.codec(), now)["cart"], json!([1]));
    assert!(record.decoded(ctx.codec(), now + chrono::Duration::seconds(60)).is_empty());
}
