//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter whose level filter comes
//! from `RUST_LOG`. The runtime logs with structured fields (`entity_type`, `id`), so the
//! module target is hidden to keep lines short.
//!
//! ```bash
//! RUST_LOG=info cargo run     # protocol milestones
//! RUST_LOG=debug cargo run    # every message and payload
//! RUST_LOG=actor_runtime=debug,actor_txn=info cargo run
//! ```

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
