#![allow(dead_code)]

use actor_txn::config::{CoordinatorConfig, RetryPolicy};
use actor_txn::model::{Decision, Operation, TxnId};
use actor_txn::participant::{Participant, ParticipantHandle};
use actor_txn::participant_actor::ParticipantError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How a [`ScriptedParticipant`] answers `prepare`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrepareScript {
    Vote(bool),
    Fail,
    Hang,
}

/// A participant that does what the test tells it to and counts every call.
#[derive(Debug)]
pub struct ScriptedParticipant {
    name: String,
    prepare: PrepareScript,
    failing_commits: AtomicUsize,
    prepare_calls: AtomicUsize,
    commit_calls: AtomicUsize,
    acknowledged: Mutex<Vec<Decision>>,
}

impl ScriptedParticipant {
    pub fn new(name: &str, prepare: PrepareScript) -> Arc<Self> {
        Self::with_failing_commits(name, prepare, 0)
    }

    /// The first `failures` commit calls fail.
    pub fn with_failing_commits(name: &str, prepare: PrepareScript, failures: usize) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            prepare,
            failing_commits: AtomicUsize::new(failures),
            prepare_calls: AtomicUsize::new(0),
            commit_calls: AtomicUsize::new(0),
            acknowledged: Mutex::new(Vec::new()),
        })
    }

    pub fn prepare_calls(&self) -> usize {
        self.prepare_calls.load(Ordering::SeqCst)
    }

    pub fn commit_calls(&self) -> usize {
        self.commit_calls.load(Ordering::SeqCst)
    }

    /// Decisions this participant acknowledged, in order.
    pub fn acknowledged(&self) -> Vec<Decision> {
        self.acknowledged.lock().unwrap().clone()
    }

    pub fn handle(self: &Arc<Self>) -> ParticipantHandle {
        self.clone()
    }
}

#[async_trait]
impl Participant for ScriptedParticipant {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn prepare(&self, _txn_id: &TxnId, _operation: &Operation) -> Result<bool, ParticipantError> {
        self.prepare_calls.fetch_add(1, Ordering::SeqCst);
        match self.prepare {
            PrepareScript::Vote(vote) => Ok(vote),
            PrepareScript::Fail => Err(ParticipantError::ActorCommunication("scripted".to_string())),
            PrepareScript::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(true)
            }
        }
    }

    async fn commit(
        &self,
        _txn_id: &TxnId,
        decision: Decision,
        _operation: &Operation,
    ) -> Result<(), ParticipantError> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);
        let fail = self
            .failing_commits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if fail {
            return Err(ParticipantError::ActorCommunication("scripted".to_string()));
        }
        self.acknowledged.lock().unwrap().push(decision);
        Ok(())
    }
}

/// Short deadlines and backoffs so retry paths finish quickly.
pub fn fast_config() -> CoordinatorConfig {
    CoordinatorConfig {
        call_timeout: Duration::from_millis(200),
        retry: RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(20),
        },
        ..CoordinatorConfig::default()
    }
}

pub fn handles(participants: &[Arc<ScriptedParticipant>]) -> Vec<ParticipantHandle> {
    participants.iter().map(|p| p.handle()).collect()
}

pub fn ops(n: usize) -> Vec<Operation> {
    (0..n)
        .map(|i| Operation::new().write("val", i as i64, 0))
        .collect()
}

/// Installs a test-friendly subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
