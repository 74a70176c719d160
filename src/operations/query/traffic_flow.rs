use crate::error::{Result, TopologyError};
use crate::topology::{ContactPoint, LaneLink, RoadId, RoadStore};

/// Lanes a vehicle can legally continue into from the end of a lane.
///
/// Follows the successor links of lanes that run with their centerline and
/// the predecessor links of lanes that run against it.
pub struct TrafficFlowSuccessors {
    road: RoadId,
    section: usize,
    lane: i32,
}

impl TrafficFlowSuccessors {
    /// Creates a new `TrafficFlowSuccessors` query.
    #[must_use]
    pub fn new(road: RoadId, section: usize, lane: i32) -> Self {
        Self { road, section, lane }
    }

    /// Executes the query on a linked store.
    ///
    /// # Errors
    ///
    /// Returns an error if the lane does not exist, or if a connected lane is
    /// attached at the end that traffic would have to enter against its flow.
    pub fn execute(&self, store: &RoadStore) -> Result<Vec<LaneLink>> {
        let lane = store.lane_at(self.road, self.section, self.lane)?;
        let candidates = if lane.flows_against_centerline() {
            lane.predecessors()
        } else {
            lane.successors()
        };

        let mut result: Vec<LaneLink> = Vec::with_capacity(candidates.len());
        for link in candidates {
            let target = store.lane(link)?;
            let expected = if target.flows_against_centerline() {
                ContactPoint::End
            } else {
                ContactPoint::Beginning
            };
            if link.contact != expected {
                return Err(TopologyError::ContactPointMismatch {
                    lane: lane.to_string(),
                    target: target.to_string(),
                    expected: expected.as_str(),
                }
                .into());
            }
            if !result.contains(link) {
                result.push(*link);
            }
        }
        Ok(result)
    }
}
