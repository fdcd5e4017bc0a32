//! Tracing subscriber setup for hosts that do not install their own
use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<bool> = OnceCell::new();

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, falling back to `default_directive`.
///
/// Only the first call has any effect. Returns `false` when another global subscriber
/// was already installed, in which case that subscriber keeps receiving events.
pub fn init_tracing(default_directive: &str) -> bool {
    *INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
        tracing_subscriber::fmt().with_env_filter(filter).with_thread_names(true).try_init().is_ok()
    })
}
