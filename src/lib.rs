pub mod error;
pub mod geometry;
pub mod math;
pub mod network;
pub mod operations;
pub mod parse;
pub mod topology;

pub use error::{OdrError, Result};
pub use network::{GeoReference, LoadOptions, RoadNetwork};
