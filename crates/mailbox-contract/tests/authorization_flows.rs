//! # Authorization Flow Tests
//!
//! End-to-end calls through `MailboxService` over the in-memory store.
//!
//! ## Test Categories
//!
//! 1. **Scenarios** - create, paid share, underpaid share
//! 2. **Payment Attacks** - misdirected, foreign and misplaced payments
//! 3. **Bulk Boundary** - `fee * count - 1` vs `fee * count`
//! 4. **Creator Gate** - `set_config` and lifecycle calls
//! 5. **Properties** - rekey always rejects, idempotent rejection

use mailbox_contract::prelude::*;
use proptest::prelude::*;

// =============================================================================
// TEST HELPERS
// =============================================================================

const A: Address = Address::new([0xAA; 32]);
const B: Address = Address::new([0xBB; 32]);
const MALLORY: Address = Address::new([0x66; 32]);

fn args(items: &[&[u8]]) -> Vec<Bytes> {
    items.iter().map(|a| Bytes::from_slice(a)).collect()
}

fn share_call(sender: Address, payment: GroupTransaction, cid: &[u8]) -> ApplicationCall {
    ApplicationCall::no_op(sender, args(&[b"v1", b"share", cid])).grouped_after(vec![payment])
}

fn bulk_call(sender: Address, amount: u64, count: u64) -> ApplicationCall {
    ApplicationCall::no_op(
        sender,
        vec![Bytes::from("v1"), Bytes::from("bulk"), Bytes::from("root"), itob(count)],
    )
    .grouped_after(vec![GroupTransaction::payment(sender, A, amount)])
}

async fn created_service() -> MailboxService<InMemoryStateStore> {
    let service = create_test_service();
    let outcome = service
        .submit(&ApplicationCall::no_op(A, vec![]))
        .await
        .unwrap();
    assert!(outcome.admitted);
    service
}

fn created_config() -> GlobalConfig {
    GlobalConfig {
        creator: A,
        version: Bytes::from("v1"),
        fee: 1000,
        service: A,
    }
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[tokio::test]
async fn test_create_with_no_arguments() {
    let service = created_service().await;
    assert_eq!(
        service.store().load_config().await.unwrap(),
        Some(created_config())
    );
}

#[tokio::test]
async fn test_paid_share_emits_exact_log() {
    let service = created_service().await;
    let call = share_call(B, GroupTransaction::payment(B, A, 1000), b"cid123");
    let outcome = service.submit(&call).await.unwrap();

    assert!(outcome.admitted);
    let mut expected = b"v1|share|cid123|from|".to_vec();
    expected.extend_from_slice(B.as_bytes());
    expected.extend_from_slice(b"|to|");
    assert_eq!(outcome.log, Some(Bytes::from(expected)));
    assert!(outcome.state_changes().is_empty());
}

#[tokio::test]
async fn test_underpaid_share_changes_nothing() {
    let service = created_service().await;
    let before = service.store().snapshot();

    let call = share_call(B, GroupTransaction::payment(B, A, 999), b"cid123");
    let outcome = service.submit(&call).await.unwrap();

    assert!(!outcome.admitted);
    assert!(outcome.log.is_none());
    assert!(matches!(
        outcome.rejection,
        Some(AuthorizationError::Payment(PaymentError::Insufficient {
            required: 1000,
            paid: 999
        }))
    ));
    assert_eq!(service.store().snapshot(), before);
}

#[tokio::test]
async fn test_overpaid_share_admitted() {
    let service = created_service().await;
    let call = share_call(B, GroupTransaction::payment(B, A, 5_000_000), b"cid");
    assert!(service.submit(&call).await.unwrap().admitted);
}

// =============================================================================
// PAYMENT ATTACKS
// =============================================================================

#[tokio::test]
async fn test_payment_to_wrong_receiver() {
    let service = created_service().await;
    let call = share_call(B, GroupTransaction::payment(B, MALLORY, 1000), b"cid");
    let outcome = service.submit(&call).await.unwrap();
    assert!(matches!(
        outcome.rejection,
        Some(AuthorizationError::Payment(PaymentError::Misdirected {
            field: "receiver",
            ..
        }))
    ));
}

#[tokio::test]
async fn test_payment_from_someone_else() {
    let service = created_service().await;
    let call = share_call(B, GroupTransaction::payment(MALLORY, A, 1000), b"cid");
    let outcome = service.submit(&call).await.unwrap();
    assert!(matches!(
        outcome.rejection,
        Some(AuthorizationError::Payment(PaymentError::Misdirected {
            field: "sender",
            ..
        }))
    ));
}

#[tokio::test]
async fn test_payment_after_the_call_does_not_count() {
    let service = created_service().await;
    let mut call = ApplicationCall::no_op(B, args(&[b"v1", b"share", b"cid"]));
    call.group = vec![
        GroupTransaction::application_call(B),
        GroupTransaction::payment(B, A, 1000),
    ];
    call.group_index = 0;
    let outcome = service.submit(&call).await.unwrap();
    assert!(matches!(
        outcome.rejection,
        Some(AuthorizationError::Payment(PaymentError::Missing(_)))
    ));
}

#[tokio::test]
async fn test_share_without_group() {
    let service = created_service().await;
    let call = ApplicationCall::no_op(B, args(&[b"v1", b"share", b"cid"]));
    let outcome = service.submit(&call).await.unwrap();
    assert!(!outcome.admitted);
    assert_eq!(outcome.rejection.unwrap().label(), "payment_missing");
}

#[tokio::test]
async fn test_non_payment_sibling_rejected() {
    let service = created_service().await;
    let mut sibling = GroupTransaction::payment(B, A, 1000);
    sibling.tx_type = TxType::AssetTransfer;
    let outcome = service
        .submit(&share_call(B, sibling, b"cid"))
        .await
        .unwrap();
    assert!(!outcome.admitted);
}

// =============================================================================
// BULK BOUNDARY
// =============================================================================

#[tokio::test]
async fn test_bulk_boundary() {
    let service = created_service().await;

    let short = service.submit(&bulk_call(B, 4_999, 5)).await.unwrap();
    assert!(!short.admitted);

    let exact = service.submit(&bulk_call(B, 5_000, 5)).await.unwrap();
    assert!(exact.admitted);
    let log = LogRecord::parse(exact.log.unwrap().as_slice()).unwrap();
    assert_eq!(
        log,
        LogRecord::Bulk {
            version: Bytes::from("v1"),
            merkle_root: Bytes::from("root"),
            sender: B,
            count: 5,
        }
    );
}

#[tokio::test]
async fn test_bulk_log_uses_decimal_count() {
    let service = created_service().await;
    let outcome = service.submit(&bulk_call(B, 12_000, 12)).await.unwrap();
    let raw = outcome.log.unwrap().into_vec();
    assert!(raw.ends_with(b"|count|12"));
}

// =============================================================================
// CREATOR GATE
// =============================================================================

#[tokio::test]
async fn test_set_config_service_only_keeps_fee() {
    let service = created_service().await;
    let new_service = Address::new([0x5E; 32]);
    let call = ApplicationCall::no_op(
        A,
        vec![Bytes::from("v1"), Bytes::from("set_config"), new_service.into()],
    );
    assert!(service.submit(&call).await.unwrap().admitted);

    let config = service.store().load_config().await.unwrap().unwrap();
    assert_eq!(config.service, new_service);
    assert_eq!(config.fee, 1000);
    assert_eq!(config.creator, A);

    // Payments now have to go to the new service address.
    let old = share_call(B, GroupTransaction::payment(B, A, 1000), b"cid");
    assert!(!service.submit(&old).await.unwrap().admitted);
    let new = share_call(B, GroupTransaction::payment(B, new_service, 1000), b"cid");
    assert!(service.submit(&new).await.unwrap().admitted);
}

#[tokio::test]
async fn test_set_config_ignores_presented_version() {
    let service = created_service().await;
    let call = ApplicationCall::no_op(
        A,
        vec![Bytes::from("v2"), Bytes::from("set_config"), itob(2000)],
    );
    assert!(service.submit(&call).await.unwrap().admitted);

    let config = service.store().load_config().await.unwrap().unwrap();
    assert_eq!(config.version, Bytes::from("v2"));
    assert_eq!(config.fee, 2000);

    // Old tag is now stale.
    let stale = share_call(B, GroupTransaction::payment(B, A, 2000), b"cid");
    assert!(matches!(
        service.submit(&stale).await.unwrap().rejection,
        Some(AuthorizationError::VersionMismatch { .. })
    ));
}

#[tokio::test]
async fn test_lifecycle_calls_by_non_creator() {
    let service = created_service().await;
    for phase in [OnCompletion::UpdateApplication, OnCompletion::DeleteApplication] {
        let outcome = service
            .submit(&ApplicationCall::lifecycle(B, phase))
            .await
            .unwrap();
        assert!(!outcome.admitted);
    }
    assert!(service.store().is_created().await.unwrap());
}

#[tokio::test]
async fn test_opt_in_always_rejected() {
    let service = created_service().await;
    for sender in [A, B] {
        let outcome = service
            .submit(&ApplicationCall::lifecycle(sender, OnCompletion::OptIn))
            .await
            .unwrap();
        assert_eq!(outcome.rejection, Some(AuthorizationError::OptInRejected));
    }
}

#[tokio::test]
async fn test_recipient_registry_variant() {
    let engine = EngineConfig {
        record_recipients: true,
        ..EngineConfig::default()
    };
    let store = std::sync::Arc::new(InMemoryStateStore::with_config(created_config()));
    let service = MailboxService::new(
        std::sync::Arc::clone(&store),
        ServiceConfig {
            engine,
            ..ServiceConfig::default()
        },
    );

    let call = ApplicationCall::no_op(B, args(&[b"v1", b"share", b"cid", b"carol"]))
        .grouped_after(vec![GroupTransaction::payment(B, A, 1000)]);
    service.submit(&call).await.unwrap();
    service.submit(&call).await.unwrap();

    let record = LocalShareRecord {
        recipient: Bytes::from("carol"),
        cid: Bytes::from("cid"),
    };
    assert!(store.has_local_record(&record).await.unwrap());
    assert_eq!(store.local_record_count(), 1);
}

#[tokio::test]
async fn test_event_handler_round_trip() {
    let service = std::sync::Arc::new(created_service().await);
    let handler = MailboxEventHandler::new(std::sync::Arc::clone(&service));

    let call = share_call(B, GroupTransaction::payment(B, A, 1000), b"cid");
    let raw = serde_json::to_vec(&CallRequestPayload::submit(call)).unwrap();
    let response = handler.handle_json(&raw).await.unwrap();
    assert!(response.admitted);
    assert!(response.committed);
    assert!(response.log.is_some());
}

// =============================================================================
// PROPERTIES
// =============================================================================

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn arb_address() -> impl Strategy<Value = Address> {
    any::<[u8; 32]>().prop_map(Address::new)
}

fn arb_phase() -> impl Strategy<Value = OnCompletion> {
    prop_oneof![
        Just(OnCompletion::NoOp),
        Just(OnCompletion::OptIn),
        Just(OnCompletion::CloseOut),
        Just(OnCompletion::UpdateApplication),
        Just(OnCompletion::DeleteApplication),
    ]
}

fn arb_args() -> impl Strategy<Value = Vec<Bytes>> {
    let tag = prop_oneof![
        Just(Bytes::from("share")),
        Just(Bytes::from("bulk")),
        Just(Bytes::from("set_config")),
    ];
    let free = proptest::collection::vec(any::<u8>(), 0..40).prop_map(Bytes::from);
    (tag, proptest::collection::vec(free, 0..3)).prop_map(|(tag, rest)| {
        let mut args = vec![Bytes::from("v1"), tag];
        args.extend(rest);
        args
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_rekey_always_rejects(
        target in arb_address().prop_filter("non-zero", |a| !a.is_zero()),
        sender in prop_oneof![Just(A), Just(B), arb_address()],
        phase in arb_phase(),
        args in arb_args(),
        amount in any::<u64>(),
        created in any::<bool>(),
    ) {
        let mut call = ApplicationCall::no_op(sender, args)
            .grouped_after(vec![GroupTransaction::payment(sender, A, amount)])
            .with_rekey(target);
        call.on_completion = phase;
        let snapshot = created.then(created_config);

        let outcome = evaluate(&call, snapshot.as_ref(), &EngineConfig::default());
        prop_assert!(!outcome.admitted);
        prop_assert!(outcome.update.is_empty());
        prop_assert!(outcome.log.is_none());
    }

    #[test]
    fn prop_bulk_charge_boundary(fee in 1u64..1_000_000, count in 1u64..1_000_000) {
        let config = GlobalConfig { fee, ..created_config() };
        let required = fee * count;
        let engine = EngineConfig::default();

        let short = bulk_call(B, required - 1, count);
        prop_assert!(!evaluate(&short, Some(&config), &engine).admitted);

        let exact = bulk_call(B, required, count);
        prop_assert!(evaluate(&exact, Some(&config), &engine).admitted);
    }

    #[test]
    fn prop_non_creator_set_config_rejected(
        sender in arb_address().prop_filter("not creator", |a| *a != A),
        fee in proptest::collection::vec(any::<u8>(), 0..9),
        new_service in arb_address(),
    ) {
        let call = ApplicationCall::no_op(
            sender,
            vec![Bytes::from("v1"), Bytes::from("set_config"), Bytes::from(fee), new_service.into()],
        );
        let outcome = evaluate(&call, Some(&created_config()), &EngineConfig::default());
        prop_assert_eq!(
            outcome.rejection,
            Some(AuthorizationError::UnauthorizedCaller { caller: sender })
        );
    }

    #[test]
    fn prop_share_paid_at_least_fee_admitted(
        amount in 1000u64..,
        cid in proptest::collection::vec(any::<u8>(), 1..64),
    ) {
        let call = share_call(B, GroupTransaction::payment(B, A, amount), &cid);
        let outcome = evaluate(&call, Some(&created_config()), &EngineConfig::default());
        prop_assert!(outcome.admitted);
        let log = outcome.log.unwrap().into_vec();
        prop_assert!(log.windows(cid.len()).any(|w| w == cid.as_slice()));
    }

    #[test]
    fn prop_rejection_is_idempotent(amount in 0u64..1000) {
        let service = runtime().block_on(created_service());
        let call = share_call(B, GroupTransaction::payment(B, A, amount), b"cid");

        let first = runtime().block_on(service.submit(&call)).unwrap();
        let second = runtime().block_on(service.submit(&call)).unwrap();
        prop_assert!(!first.admitted);
        prop_assert_eq!(first, second);
        prop_assert_eq!(
            runtime().block_on(service.store().load_config()).unwrap(),
            Some(created_config())
        );
    }
}
