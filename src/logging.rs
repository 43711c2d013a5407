//! Logging facade. The original reaches for a `Logger::getInstance()`
//! singleton with its own level filtering and sink; `log` plus `env_logger`
//! give the same "call a macro anywhere, configure once at startup" shape
//! without hand-rolling either, and respect `RUST_LOG` for the level a
//! deployer wants without a recompile.

/// Installs the global logger. Call once, before the event loop starts.
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}
