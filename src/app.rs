//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the active tab, cursors,
//! selection and prompt state.

mod model;

pub use model::*;
