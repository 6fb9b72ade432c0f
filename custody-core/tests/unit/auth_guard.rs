use crate::fixtures::*;
use custody_core::application::{request_signature, AuthRequest};
use custody_core::domain::UsedNonce;
use custody_core::foundation::util::time::FixedClock;
use custody_core::foundation::ErrorCode;
use custody_core::infrastructure::storage::{MemoryStorage, Storage};
use std::sync::Arc;

const BODY: &[u8] = br#"{"address":"0x0000000000000000000000000000000000000001"}"#;

struct Signed {
    timestamp: String,
    nonce: String,
    signature: String,
}

fn signed(timestamp: i64, nonce: &str) -> Signed {
    let timestamp = timestamp.to_string();
    let signature = request_signature(TEST_API_SECRET, &timestamp, nonce, BODY);
    Signed { timestamp, nonce: nonce.to_string(), signature }
}

fn request(signed: &Signed) -> AuthRequest<'_> {
    AuthRequest {
        api_key: Some(TEST_API_SECRET),
        signature: Some(&signed.signature),
        timestamp: Some(&signed.timestamp),
        nonce: Some(&signed.nonce),
        body: BODY,
    }
}

#[test]
fn key_only_mode_ignores_signature_headers() {
    let guard = auth_guard(false, Arc::new(MemoryStorage::new()), FixedClock::new(TEST_NOW));
    let junk = AuthRequest {
        api_key: Some(TEST_API_SECRET),
        signature: Some("zz"),
        timestamp: Some("yesterday"),
        nonce: Some("n"),
        body: b"",
    };
    assert!(guard.verify(&junk).is_ok());
    assert!(guard.verify(&junk).is_ok(), "no nonce is recorded in key-only mode");
}

#[test]
fn missing_or_wrong_key_is_rejected() {
    let guard = auth_guard(false, Arc::new(MemoryStorage::new()), FixedClock::new(TEST_NOW));
    let missing = AuthRequest { body: BODY, ..AuthRequest::default() };
    assert_eq!(guard.verify(&missing).expect_err("missing").code(), ErrorCode::AuthenticationFailed);
    let wrong = AuthRequest { api_key: Some("test-api-secreT"), body: BODY, ..AuthRequest::default() };
    assert_eq!(guard.verify(&wrong).expect_err("wrong").code(), ErrorCode::AuthenticationFailed);
}

#[test]
fn signed_request_is_accepted_once() {
    let storage = Arc::new(MemoryStorage::new());
    let guard = auth_guard(true, storage.clone(), FixedClock::new(TEST_NOW));
    let first = signed(TEST_NOW, "nonce-1");

    guard.verify(&request(&first)).expect("first use");
    assert!(storage.nonce_exists("nonce-1").expect("lookup"));
    assert_eq!(guard.verify(&request(&first)).expect_err("replay").code(), ErrorCode::ReplayDetected);
}

#[test]
fn signature_must_match_exactly() {
    let storage = Arc::new(MemoryStorage::new());
    let guard = auth_guard(true, storage.clone(), FixedClock::new(TEST_NOW));
    let mut upper = signed(TEST_NOW, "nonce-upper");
    upper.signature = upper.signature.to_ascii_uppercase();
    assert_eq!(guard.verify(&request(&upper)).expect_err("uppercase hex").code(), ErrorCode::AuthenticationFailed);

    let mut padded = signed(TEST_NOW, "nonce-padded");
    padded.signature = format!(" {} ", padded.signature);
    assert_eq!(guard.verify(&request(&padded)).expect_err("padded").code(), ErrorCode::AuthenticationFailed);
    assert!(!storage.nonce_exists("nonce-upper").expect("ledger"));
}

#[test]
fn blank_nonce_is_treated_as_missing() {
    let storage = Arc::new(MemoryStorage::new());
    let guard = auth_guard(true, storage.clone(), FixedClock::new(TEST_NOW));
    let blank = signed(TEST_NOW, "");
    let err = guard.verify(&request(&blank)).expect_err("blank nonce");
    assert_eq!(err.code(), ErrorCode::AuthenticationFailed);
    assert!(!storage.nonce_exists("").expect("ledger"));

    let keyed = signed(TEST_NOW, "nonce-key");
    let blank_key = AuthRequest { api_key: Some(""), ..request(&keyed) };
    assert_eq!(guard.verify(&blank_key).expect_err("blank key").code(), ErrorCode::AuthenticationFailed);
}

#[test]
fn stale_and_future_timestamps_expire_even_when_signed() {
    let guard = auth_guard(true, Arc::new(MemoryStorage::new()), FixedClock::new(TEST_NOW));
    let stale = signed(TEST_NOW - 301, "nonce-stale");
    assert_eq!(guard.verify(&request(&stale)).expect_err("stale").code(), ErrorCode::RequestExpired);
    let future = signed(TEST_NOW + 301, "nonce-future");
    assert_eq!(guard.verify(&request(&future)).expect_err("future").code(), ErrorCode::RequestExpired);

    let edge = signed(TEST_NOW - 300, "nonce-edge");
    assert!(guard.verify(&request(&edge)).is_ok());
}

#[test]
fn tampered_body_or_nonce_fails_signature_check() {
    let storage = Arc::new(MemoryStorage::new());
    let guard = auth_guard(true, storage.clone(), FixedClock::new(TEST_NOW));
    let good = signed(TEST_NOW, "nonce-1");

    let tampered = AuthRequest { body: b"{}", ..request(&good) };
    assert_eq!(guard.verify(&tampered).expect_err("body").code(), ErrorCode::AuthenticationFailed);

    let swapped = AuthRequest { nonce: Some("nonce-2"), ..request(&good) };
    assert_eq!(guard.verify(&swapped).expect_err("nonce").code(), ErrorCode::AuthenticationFailed);
    assert!(!storage.nonce_exists("nonce-2").expect("lookup"), "rejected requests do not burn nonces");
}

#[test]
fn missing_signature_headers_and_bad_timestamp() {
    let guard = auth_guard(true, Arc::new(MemoryStorage::new()), FixedClock::new(TEST_NOW));
    let good = signed(TEST_NOW, "nonce-1");
    let no_nonce = AuthRequest { nonce: None, ..request(&good) };
    assert_eq!(guard.verify(&no_nonce).expect_err("missing").code(), ErrorCode::AuthenticationFailed);

    let text_ts = AuthRequest { timestamp: Some("noon"), ..request(&good) };
    assert_eq!(guard.verify(&text_ts).expect_err("format").code(), ErrorCode::AuthenticationFailed);
}

#[test]
fn nonce_ledger_is_purged_on_sampled_seconds_only() {
    let storage = Arc::new(MemoryStorage::new());
    let old = UsedNonce { nonce: "ancient".to_string(), timestamp: PURGE_NOW - 3_600, created_at: PURGE_NOW - 3_600 };
    storage.insert_nonce_if_absent(&old).expect("seed nonce");

    let clock = FixedClock::new(PURGE_NOW - 20);
    let guard = auth_guard(true, storage.clone(), clock.clone());
    guard.verify(&request(&signed(PURGE_NOW - 20, "n-unsampled"))).expect("unsampled second");
    assert!(storage.nonce_exists("ancient").expect("lookup"));

    clock.set(PURGE_NOW);
    guard.verify(&request(&signed(PURGE_NOW, "n-sampled"))).expect("sampled second");
    assert!(!storage.nonce_exists("ancient").expect("lookup"));
    assert!(storage.nonce_exists("n-unsampled").expect("lookup"), "recent nonces survive the purge");
    assert!(storage.nonce_exists("n-sampled").expect("lookup"));
}

#[test]
fn concurrent_reuse_of_one_nonce_admits_exactly_one() {
    let storage = Arc::new(MemoryStorage::new());
    let guard = Arc::new(auth_guard(true, storage, FixedClock::new(TEST_NOW)));
    let shared = Arc::new(signed(TEST_NOW, "contended"));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let guard = Arc::clone(&guard);
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || guard.verify(&request(&shared)).is_ok())
        })
        .collect();
    let accepted = handles.into_iter().map(|handle| handle.join().expect("thread")).filter(|ok| *ok).count();
    assert_eq!(accepted, 1);
}
