use actor_runtime::{
    ActorContext, ActorEntity, ActorRegistry, ActorState, FrameworkError, InMemoryStateStore,
    StateError, StateStore,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// --- Test Entity ---

#[derive(Default)]
struct CounterDeps {
    activations: AtomicUsize,
    refuse_activation: AtomicBool,
}

#[derive(Clone, Debug, PartialEq)]
struct Counter {
    value: i64,
}

#[derive(Debug)]
enum CounterAction {
    Incr(i64),
    IncrLater(i64),
    Slow(i64),
    /// Answers from the registry-wide context rather than the instance.
    Activations,
}

#[derive(Debug, thiserror::Error)]
enum CounterError {
    #[error("activation refused")]
    ActivationRefused,
    #[error("no longer reachable")]
    Gone,
    #[error(transparent)]
    State(#[from] StateError),
}

#[async_trait]
impl ActorEntity for Counter {
    const KIND: &'static str = "Counter";
    type Id = String;
    type Action = CounterAction;
    type ActionResult = i64;
    type Context = Arc<CounterDeps>;
    type Error = CounterError;

    async fn on_activate(
        _id: String,
        state: &ActorState,
        deps: &Arc<CounterDeps>,
    ) -> Result<Self, Self::Error> {
        if deps.refuse_activation.load(Ordering::SeqCst) {
            return Err(CounterError::ActivationRefused);
        }
        deps.activations.fetch_add(1, Ordering::SeqCst);
        Ok(Self {
            value: state.get("value").await?.unwrap_or(0),
        })
    }

    async fn handle_action(
        &mut self,
        action: CounterAction,
        ctx: &ActorContext<'_, Self>,
    ) -> Result<i64, Self::Error> {
        match action {
            CounterAction::Incr(by) => {
                self.value += by;
                ctx.state.set("value", &self.value).await?;
                Ok(self.value)
            }
            CounterAction::IncrLater(by) => {
                let me = ctx.myself().ok_or(CounterError::Gone)?;
                tokio::spawn(async move {
                    let _ = me.tell(CounterAction::Incr(by)).await;
                });
                Ok(self.value)
            }
            CounterAction::Slow(by) => {
                // Read, yield, write: only safe if nothing else runs in between.
                let current = self.value;
                tokio::time::sleep(Duration::from_millis(1)).await;
                self.value = current + by;
                ctx.state.set("value", &self.value).await?;
                Ok(self.value)
            }
            CounterAction::Activations => Ok(ctx.deps.activations.load(Ordering::SeqCst) as i64),
        }
    }
}

fn registry(store: Arc<dyn StateStore>) -> (ActorRegistry<Counter>, Arc<CounterDeps>) {
    let deps = Arc::new(CounterDeps::default());
    (ActorRegistry::new(store, deps.clone(), 16), deps)
}

// --- Tests ---

#[tokio::test]
async fn test_activation_happens_once_per_instance() {
    let (registry, deps) = registry(Arc::new(InMemoryStateStore::new()));

    let a = registry.actor_ref("a".to_string());
    assert_eq!(a.call(CounterAction::Incr(2)).await.unwrap(), 2);
    assert_eq!(a.call(CounterAction::Incr(3)).await.unwrap(), 5);

    // A second lookup reaches the same instance.
    let again = registry.actor_ref("a".to_string());
    assert_eq!(again.get().await.unwrap(), Counter { value: 5 });
    assert_eq!(deps.activations.load(Ordering::SeqCst), 1);
    assert_eq!(registry.active_count(), 1);

    registry.actor_ref("b".to_string()).get().await.unwrap();
    assert_eq!(deps.activations.load(Ordering::SeqCst), 2);
    assert!(registry.contains(&"b".to_string()));

    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_calls_are_serialized() {
    let (registry, _) = registry(Arc::new(InMemoryStateStore::new()));

    let mut handles = Vec::new();
    for _ in 0..25 {
        let counter = registry.actor_ref("hot".to_string());
        handles.push(tokio::spawn(async move {
            counter.call(CounterAction::Slow(1)).await
        }));
    }
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }
    results.sort();

    assert_eq!(results, (1..=25).collect::<Vec<i64>>());
    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_tell_and_call_async() {
    let (registry, _) = registry(Arc::new(InMemoryStateStore::new()));
    let counter = registry.actor_ref("c".to_string());

    counter.tell(CounterAction::Incr(10)).await.unwrap();
    let pending_a = counter.call_async(CounterAction::Incr(1)).await.unwrap();
    let pending_b = counter.call_async(CounterAction::Incr(1)).await.unwrap();

    // Mailbox order: the tell is applied before both pending calls.
    assert_eq!(pending_a.wait().await.unwrap(), 11);
    assert_eq!(
        pending_b
            .wait_timeout(Duration::from_secs(1))
            .await
            .unwrap(),
        12
    );
    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_tell_to_self() {
    let (registry, _) = registry(Arc::new(InMemoryStateStore::new()));
    let counter = registry.actor_ref("self".to_string());

    assert_eq!(counter.call(CounterAction::IncrLater(7)).await.unwrap(), 0);

    let mut value = 0;
    for _ in 0..100 {
        value = counter.get().await.unwrap().value;
        if value == 7 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(value, 7);
    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_state_outlives_the_registry() {
    let store: Arc<dyn StateStore> = Arc::new(InMemoryStateStore::new());

    let (first, _) = registry(store.clone());
    first
        .actor_ref("durable".to_string())
        .call(CounterAction::Incr(42))
        .await
        .unwrap();
    first.shutdown().await.unwrap();

    // A fresh process over the same store resumes from the persisted fields.
    let (second, deps) = registry(store);
    let snapshot = second.actor_ref("durable".to_string()).get().await.unwrap();
    assert_eq!(snapshot.value, 42);
    assert_eq!(deps.activations.load(Ordering::SeqCst), 1);
    second.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_failed_activation_is_retried() {
    let (registry, deps) = registry(Arc::new(InMemoryStateStore::new()));
    deps.refuse_activation.store(true, Ordering::SeqCst);

    let counter = registry.actor_ref("flaky".to_string());
    let err = counter.call(CounterAction::Incr(1)).await.unwrap_err();
    assert!(matches!(
        err.into_entity_error::<CounterError>(),
        Ok(CounterError::ActivationRefused)
    ));

    deps.refuse_activation.store(false, Ordering::SeqCst);
    assert_eq!(counter.call(CounterAction::Incr(1)).await.unwrap(), 1);
    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_closes_references() {
    let (registry, deps) = registry(Arc::new(InMemoryStateStore::new()));
    let counter = registry.actor_ref("s".to_string());
    counter.call(CounterAction::Incr(3)).await.unwrap();

    registry.shutdown().await.unwrap();
    assert_eq!(registry.active_count(), 0);
    assert!(matches!(
        counter.call(CounterAction::Incr(1)).await,
        Err(FrameworkError::ActorClosed)
    ));

    // Referencing the id again activates a new instance from the persisted fields.
    let revived = registry.actor_ref("s".to_string());
    assert_eq!(revived.call(CounterAction::Incr(1)).await.unwrap(), 4);
    assert_eq!(deps.activations.load(Ordering::SeqCst), 2);
    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_actions_see_the_shared_context() {
    let (registry, deps) = registry(Arc::new(InMemoryStateStore::new()));
    registry.actor_ref("x".to_string()).get().await.unwrap();
    let y = registry.actor_ref("y".to_string());

    assert_eq!(y.call(CounterAction::Activations).await.unwrap(), 2);
    deps.activations.fetch_add(10, Ordering::SeqCst);
    assert_eq!(y.call(CounterAction::Activations).await.unwrap(), 12);
    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_passivate_stops_one_instance() {
    let (registry, deps) = registry(Arc::new(InMemoryStateStore::new()));
    let idle = registry.actor_ref("idle".to_string());
    let busy = registry.actor_ref("busy".to_string());
    idle.call(CounterAction::Incr(5)).await.unwrap();
    busy.call(CounterAction::Incr(1)).await.unwrap();

    assert!(registry.passivate(&"idle".to_string()).await.unwrap());
    assert!(!registry.passivate(&"idle".to_string()).await.unwrap());
    assert!(!registry.contains(&"idle".to_string()));
    assert_eq!(registry.active_count(), 1);
    assert!(matches!(
        idle.call(CounterAction::Incr(1)).await,
        Err(FrameworkError::ActorClosed)
    ));
    assert_eq!(busy.call(CounterAction::Incr(1)).await.unwrap(), 2);

    let revived = registry.actor_ref("idle".to_string());
    assert_eq!(revived.get().await.unwrap().value, 5);
    assert_eq!(deps.activations.load(Ordering::SeqCst), 3);
    registry.shutdown().await.unwrap();
}
