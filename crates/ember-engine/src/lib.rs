//! Ember engine crate.
//!
//! Owns the application lifecycle, the frame loop and the platform + GPU
//! pieces it drives. Games plug in as [`core::Module`]s.

pub mod core;
pub mod coords;
pub mod device;
pub mod event;
pub mod logging;
pub mod paint;
pub mod render;
pub mod text;
pub mod time;
pub mod window;

#[cfg(test)]
mod testing;
