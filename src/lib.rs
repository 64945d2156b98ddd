//! gridmatch (workspace facade crate).
//!
//! Re-exports the workspace crates under one roof so binaries, benches and
//! integration tests can write `gridmatch::engine::GameMaster` and friends.

pub use gridmatch_adapter as adapter;
pub use gridmatch_core as core;
pub use gridmatch_engine as engine;
pub use gridmatch_types as types;

/// Install the `fmt` subscriber used by the binaries.
///
/// `RUST_LOG` wins over `default_filter`. Output goes to stderr so stdout
/// stays free for results.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
