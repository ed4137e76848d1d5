use tracing::Level;

/// Installs the global fmt subscriber.
/// Only the first call has an effect, so tests may call it freely.
pub fn initialize_tracing(level: Level) {
    let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
}
