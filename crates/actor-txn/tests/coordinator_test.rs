mod common;

use actor_runtime::{ActorKey, InMemoryStateStore, StateStore};
use actor_txn::clients::TransactionClient;
use actor_txn::config::CoordinatorConfig;
use actor_txn::model::Decision;
use actor_txn::transaction_actor::{self, TransactionError};
use common::{fast_config, handles, init_tracing, ops, PrepareScript, ScriptedParticipant};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const SETTLE: Duration = Duration::from_secs(5);

fn coordinator(
    store: Arc<dyn StateStore>,
    config: CoordinatorConfig,
    name: &str,
) -> (TransactionClient, actor_runtime::ActorRegistry<transaction_actor::Transaction>) {
    let registry = transaction_actor::registry(store, config);
    (
        TransactionClient::new(registry.actor_ref(name.to_string())),
        registry,
    )
}

fn script() -> impl Strategy<Value = PrepareScript> {
    prop_oneof![
        4 => Just(PrepareScript::Vote(true)),
        1 => Just(PrepareScript::Vote(false)),
        1 => Just(PrepareScript::Fail),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Commit if and only if every participant votes yes, and every participant ends up
    /// acknowledging that decision exactly once.
    #[test]
    fn decision_is_unanimous(scripts in prop::collection::vec(script(), 1..5)) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let participants: Vec<_> = scripts
                .iter()
                .enumerate()
                .map(|(i, s)| ScriptedParticipant::new(&format!("p{i}"), *s))
                .collect();
            let (txn, registry) =
                coordinator(Arc::new(InMemoryStateStore::new()), fast_config(), "t");

            let decision = txn
                .transact(handles(&participants), ops(participants.len()))
                .await
                .unwrap();
            let expected = if scripts.iter().all(|s| *s == PrepareScript::Vote(true)) {
                Decision::Commit
            } else {
                Decision::Abort
            };
            assert_eq!(decision, expected);
            assert!(txn.await_completion(SETTLE).await.unwrap());

            for p in &participants {
                assert_eq!(p.prepare_calls(), 1);
                assert_eq!(p.acknowledged(), vec![expected]);
            }
            registry.shutdown().await.unwrap();
        });
    }
}

#[tokio::test]
async fn test_completed_transaction_is_not_rerun() {
    init_tracing();
    let participants = vec![
        ScriptedParticipant::new("a", PrepareScript::Vote(true)),
        ScriptedParticipant::new("b", PrepareScript::Vote(true)),
    ];
    let (txn, registry) = coordinator(Arc::new(InMemoryStateStore::new()), fast_config(), "t");

    let first = txn.transact(handles(&participants), ops(2)).await.unwrap();
    assert_eq!(first, Decision::Commit);
    assert!(txn.await_completion(SETTLE).await.unwrap());

    let again = txn.transact(handles(&participants), ops(2)).await.unwrap();
    assert_eq!(again, first);
    // Give a stray commit phase the chance to show up.
    tokio::time::sleep(Duration::from_millis(50)).await;
    for p in &participants {
        assert_eq!(p.prepare_calls(), 1);
        assert_eq!(p.commit_calls(), 1);
    }
    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_transaction_id_is_assigned_once() {
    let store: Arc<dyn StateStore> = Arc::new(InMemoryStateStore::new());
    let (txn, registry) = coordinator(store.clone(), fast_config(), "t");
    let before = txn.record().await.unwrap();
    assert_eq!(before.decision, None);
    assert!(!before.commit_complete);
    registry.shutdown().await.unwrap();

    let (txn, registry) = coordinator(store, fast_config(), "t");
    assert_eq!(txn.record().await.unwrap().id, before.id);
    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_recorded_decision_resumes_without_prepare() {
    init_tracing();
    let store: Arc<dyn StateStore> = Arc::new(InMemoryStateStore::new());
    let key = ActorKey::new("Transaction", "crashed");
    // A coordinator that decided commit, then went away before the commit phase finished.
    store
        .set(&key, "id", json!("6f1c1a2e-8a43-4e0e-9a53-4cb1c1e2a001"))
        .await
        .unwrap();
    store.set(&key, "decision", json!("commit")).await.unwrap();

    let participants = vec![
        ScriptedParticipant::new("a", PrepareScript::Vote(false)),
        ScriptedParticipant::new("b", PrepareScript::Vote(true)),
    ];
    let (txn, registry) = coordinator(store.clone(), fast_config(), "crashed");

    let decision = txn.transact(handles(&participants), ops(2)).await.unwrap();
    assert_eq!(decision, Decision::Commit);
    assert!(txn.await_completion(SETTLE).await.unwrap());

    for p in &participants {
        assert_eq!(p.prepare_calls(), 0);
        assert_eq!(p.acknowledged(), vec![Decision::Commit]);
    }
    assert_eq!(
        store.get(&key, "commitComplete").await.unwrap(),
        Some(json!(true))
    );
    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_length_mismatch_contacts_nobody() {
    let participants = vec![
        ScriptedParticipant::new("a", PrepareScript::Vote(true)),
        ScriptedParticipant::new("b", PrepareScript::Vote(true)),
    ];
    let (txn, registry) = coordinator(Arc::new(InMemoryStateStore::new()), fast_config(), "t");

    let result = txn.transact(handles(&participants), ops(1)).await;
    assert!(matches!(
        result,
        Err(TransactionError::LengthMismatch {
            participants: 2,
            operations: 1
        })
    ));
    assert_eq!(txn.record().await.unwrap().decision, None);
    for p in &participants {
        assert_eq!(p.prepare_calls(), 0);
        assert_eq!(p.commit_calls(), 0);
    }
    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_failed_commit_is_retried_until_acknowledged() {
    init_tracing();
    let flaky = ScriptedParticipant::with_failing_commits("flaky", PrepareScript::Vote(true), 2);
    let steady = ScriptedParticipant::new("steady", PrepareScript::Vote(true));
    let participants = vec![flaky.clone(), steady.clone()];
    let (txn, registry) = coordinator(Arc::new(InMemoryStateStore::new()), fast_config(), "t");

    let decision = txn.transact(handles(&participants), ops(2)).await.unwrap();
    assert_eq!(decision, Decision::Commit);
    assert!(txn.await_completion(SETTLE).await.unwrap());

    // Two failed rounds, then one that went through everywhere.
    assert_eq!(flaky.commit_calls(), 3);
    assert_eq!(flaky.acknowledged(), vec![Decision::Commit]);
    assert_eq!(steady.commit_calls(), 3);
    assert_eq!(steady.prepare_calls(), 1);
    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_exhausted_retries_leave_the_transaction_decided() {
    init_tracing();
    let mut config = fast_config();
    config.retry.max_attempts = 1;
    let flaky = ScriptedParticipant::with_failing_commits("flaky", PrepareScript::Vote(true), 3);
    let participants = vec![flaky.clone()];
    let (txn, registry) = coordinator(Arc::new(InMemoryStateStore::new()), config, "t");

    txn.transact(handles(&participants), ops(1)).await.unwrap();
    assert!(!txn.await_completion(Duration::from_millis(300)).await.unwrap());
    // First round plus one retry.
    assert_eq!(flaky.commit_calls(), 2);
    assert_eq!(txn.record().await.unwrap().decision, Some(Decision::Commit));

    // A later transact resumes: one more failure, then the retry succeeds.
    let decision = txn.transact(handles(&participants), ops(1)).await.unwrap();
    assert_eq!(decision, Decision::Commit);
    assert!(txn.await_completion(SETTLE).await.unwrap());
    assert_eq!(flaky.commit_calls(), 4);
    assert_eq!(flaky.prepare_calls(), 1);
    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_hung_participant_forces_abort() {
    init_tracing();
    let mut config = fast_config();
    config.call_timeout = Duration::from_millis(50);
    let participants = vec![
        ScriptedParticipant::new("hung", PrepareScript::Hang),
        ScriptedParticipant::new("ok", PrepareScript::Vote(true)),
    ];
    let (txn, registry) = coordinator(Arc::new(InMemoryStateStore::new()), config, "t");

    let decision = txn.transact(handles(&participants), ops(2)).await.unwrap();
    assert_eq!(decision, Decision::Abort);
    assert!(txn.await_completion(SETTLE).await.unwrap());
    for p in &participants {
        assert_eq!(p.acknowledged(), vec![Decision::Abort]);
    }
    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_failed_prepare_is_an_abort_vote() {
    let participants = vec![
        ScriptedParticipant::new("a", PrepareScript::Vote(true)),
        ScriptedParticipant::new("broken", PrepareScript::Fail),
    ];
    let (txn, registry) = coordinator(Arc::new(InMemoryStateStore::new()), fast_config(), "t");

    assert_eq!(
        txn.transact(handles(&participants), ops(2)).await.unwrap(),
        Decision::Abort
    );
    registry.shutdown().await.unwrap();
}
