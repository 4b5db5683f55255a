mod controller;
mod engine;
mod playlist;

pub use controller::LocalPlaybackController;
pub use engine::{AudioEngine, RodioEngine};
