use env_logger::Env;

/// Installs the global logger, honouring `RUST_LOG` and defaulting to `info`.
///
/// Calling it more than once is harmless.
pub fn init() {
    let env = Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env).try_init().is_ok() {
        log::debug!("logging initialized");
    }
}
