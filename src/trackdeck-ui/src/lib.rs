pub mod app;
pub mod form;
pub mod help;
mod player;
pub use app::{run_ui, UiContext, UiError};
