//! Report renderers for a finished (or in-progress) run.
//!
//! Renderers are pure: they take results and stats by reference and return
//! strings, leaving printing to the run driver.
pub mod json;
pub mod markdown;
pub mod palette;
pub mod terminal;

pub use palette::Palette;
