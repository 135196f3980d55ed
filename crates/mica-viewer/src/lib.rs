//! # mica-viewer
//!
//! Image-viewer panels composed from `mica-widgets` controls: the channel
//! contrast panel and the scale selector, wired to a shared
//! [`ViewerContext`]. No pixel decoding or page chrome lives here; the crate
//! stops at the widget boundary.

mod channels;
mod context;
mod scale;

pub use channels::*;
pub use context::*;
pub use scale::*;

/// Initialize logging from `RUST_LOG`, defaulting to `info`
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .try_init();
}
