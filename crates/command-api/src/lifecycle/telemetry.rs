//! Structured logging setup.
//!
//! The store actor tags every event with `entity_type` and, where one applies, `id`, so the
//! module path adds nothing and is left out. Verbosity comes from `RUST_LOG`:
//!
//! ```bash
//! RUST_LOG=info cargo run      # one line per committed change
//! RUST_LOG=debug cargo run     # every request, including reads
//! ```

/// Installs the global `tracing` subscriber. Call once, at startup.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
