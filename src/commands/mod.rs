//! Command implementations

pub mod analyze;
pub mod formats;
pub mod render;

pub use analyze::*;
pub use formats::*;
pub use render::*;
