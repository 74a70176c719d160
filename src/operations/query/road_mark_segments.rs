use tracing::trace;

use crate::error::Result;
use crate::math::polyline_2d::resample;
use crate::math::Point2;
use crate::topology::{RoadId, RoadMark, RoadStore};

/// One road mark together with the stretch of lane boundary it paints.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadMarkSegment {
    pub mark: RoadMark,
    pub points: Vec<Point2>,
}

/// Splits the outer boundary of a lane into the stretches covered by each
/// of its road marks.
///
/// A mark runs from its `sOffset` to the next mark's `sOffset`, the last
/// one to the end of the lane section.
pub struct RoadMarkSegments {
    road: RoadId,
    section: usize,
    lane: i32,
}

impl RoadMarkSegments {
    /// Creates a new `RoadMarkSegments` query.
    #[must_use]
    pub fn new(road: RoadId, section: usize, lane: i32) -> Self {
        Self { road, section, lane }
    }

    /// Executes the query.
    ///
    /// Stretches shorter than two boundary samples are dropped; the rest are
    /// resampled at the road's resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if the road, section or lane does not exist.
    pub fn execute(&self, store: &RoadStore) -> Result<Vec<RoadMarkSegment>> {
        let road = store.road(self.road)?;
        let section = road.section(self.section)?;
        let lane = store.lane_at(self.road, self.section, self.lane)?;
        let frame = section.frame();
        let marks = lane.road_marks();

        let mut segments = Vec::with_capacity(marks.len());
        for (i, mark) in marks.iter().enumerate() {
            let end = marks.get(i + 1).map(|next| next.s_offset);
            let points = lane.boundary_segment(&frame, mark.s_offset, end)?;
            if points.len() < 2 {
                trace!(%lane, s_offset = mark.s_offset, "road mark covers too little boundary");
                continue;
            }
            segments.push(RoadMarkSegment {
                mark: mark.clone(),
                points: resample(&points, road.resolution())?,
            });
        }
        Ok(segments)
    }
}
