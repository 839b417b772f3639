//! Font loading and text measurement.

mod font_cache;

pub use font_cache::{FontCache, FontId, FontLoadError};
