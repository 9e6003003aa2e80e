//! # Runtime Flow Tests
//!
//! Drives `run_request` against a temporary state file.

use clap::Parser;
use mailbox_contract::prelude::*;
use mailbox_runtime::{run_request, state_file, RuntimeConfig};
use std::path::Path;

const CREATOR: Address = Address::new([0x11; 32]);
const USER: Address = Address::new([0x22; 32]);

fn config(state_file: &Path, extra: &[&str]) -> RuntimeConfig {
    let mut argv = vec![
        "mailbox-runtime".to_string(),
        "--state-file".to_string(),
        state_file.display().to_string(),
    ];
    argv.extend(extra.iter().map(ToString::to_string));
    RuntimeConfig::parse_from(argv)
}

fn request(call: ApplicationCall) -> Vec<u8> {
    serde_json::to_vec(&CallRequestPayload::submit(call)).unwrap()
}

fn paid_share(amount: u64) -> ApplicationCall {
    ApplicationCall::no_op(
        USER,
        vec![Bytes::from("v1"), Bytes::from("share"), Bytes::from("cid")],
    )
    .grouped_after(vec![GroupTransaction::payment(USER, CREATOR, amount)])
}

#[tokio::test]
async fn test_create_persists_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let config = config(&path, &[]);

    let response = run_request(&config, &request(ApplicationCall::no_op(CREATOR, vec![])))
        .await
        .unwrap();
    assert!(response.admitted);
    assert!(response.committed);
    assert_eq!(response.state_changes.len(), 4);

    let saved = state_file::load_snapshot(&path).unwrap().config.unwrap();
    assert_eq!(saved.creator, CREATOR);
    assert_eq!(saved.fee, 1000);
}

#[tokio::test]
async fn test_share_after_create() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let config = config(&path, &["--default-fee", "10"]);

    run_request(&config, &request(ApplicationCall::no_op(CREATOR, vec![])))
        .await
        .unwrap();

    let underpaid = run_request(&config, &request(paid_share(9))).await.unwrap();
    assert!(!underpaid.admitted);
    assert_eq!(
        underpaid.rejection_label.as_deref(),
        Some("payment_insufficient")
    );

    let paid = run_request(&config, &request(paid_share(10))).await.unwrap();
    assert!(paid.admitted);
    assert!(paid.log.is_some());
}

#[tokio::test]
async fn test_dry_run_leaves_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let config = config(&path, &["--dry-run"]);

    let response = run_request(&config, &request(ApplicationCall::no_op(CREATOR, vec![])))
        .await
        .unwrap();
    assert!(response.admitted);
    assert!(!response.committed);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_bad_request_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir.path().join("state.json"), &[]);
    assert!(run_request(&config, b"{}").await.is_err());
}
