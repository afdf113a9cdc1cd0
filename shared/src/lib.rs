pub mod api;
pub mod geometry;

pub use api::*;
