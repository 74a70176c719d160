mod road_mark_segments;
mod traffic_flow;

pub use road_mark_segments::{RoadMarkSegment, RoadMarkSegments};
pub use traffic_flow::TrafficFlowSuccessors;
