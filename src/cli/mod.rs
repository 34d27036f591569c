mod app;
mod args;
mod commands;
mod render;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub(crate) mod theme;
mod timeline;

pub use app::{AppState, run_tui};
pub use args::CliArgs;
pub use render::Regions;
