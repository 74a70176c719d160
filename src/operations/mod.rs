//! Passes and queries that run against a [`RoadStore`](crate::topology::RoadStore).

mod link_roads;
pub mod query;

pub use link_roads::LinkRoads;
