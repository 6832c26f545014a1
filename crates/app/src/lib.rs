//! Shared setup for the `ed` and `diff` binaries.

/// Starts logging to stderr. The filter comes from `RUST_LOG` and defaults to
/// `warn`, so stdout only ever carries program output.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();
}
