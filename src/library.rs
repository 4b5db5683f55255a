mod display;
mod model;
mod scan;

pub use model::LocalTrack;
pub use scan::expand;

#[cfg(test)]
mod tests;
