//! Logging wrapper around pattern runs.

use std::time::Instant;

/// Log `message`, run `body`, then log how long it took.
pub fn logged<T>(message: &str, body: impl FnOnce() -> T) -> T {
    log::info!("{message}");
    let start = Instant::now();
    let result = body();
    log::info!("{message} done in {:.2?}", start.elapsed());
    result
}
