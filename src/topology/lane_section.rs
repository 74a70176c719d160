use super::lane::Lane;
use super::{ContactPoint, RoadId, TrafficRule};
use crate::error::Result;
use crate::geometry::Side;
use crate::math::Point2;
use crate::network::LoadOptions;
use crate::parse::{LaneRecord, LaneSectionRecord};

/// Borrowed view of the clipped section arrays that lane construction runs against.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SectionFrame<'a> {
    pub road: &'a str,
    pub index: usize,
    pub rule: TrafficRule,
    /// Reference line clipped to the section; distances are measured along it.
    pub reference: &'a [Point2],
    /// Lane offset line clipped to the section, the innermost lane boundary.
    pub offset: &'a [Point2],
    pub z: &'a [f64],
}

/// Clipped road arrays covering `[s_start, s_end]` of one section.
#[derive(Debug, Clone)]
pub(crate) struct SectionGeometry {
    pub s_start: f64,
    pub s_end: f64,
    pub reference_line: Vec<Point2>,
    pub offset_line: Vec<Point2>,
    pub z: Vec<f64>,
}

/// Resolved connection from a lane section to a section of the same or another road.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionLink {
    pub road: RoadId,
    pub section: usize,
    /// End of the target section this section attaches to.
    pub contact: ContactPoint,
}

/// A stretch of road over which the lane layout does not change.
#[derive(Debug, Clone)]
pub struct LaneSection {
    road: String,
    index: usize,
    rule: TrafficRule,
    s_start: f64,
    s_end: f64,
    single_side: bool,
    reference_line: Vec<Point2>,
    offset_line: Vec<Point2>,
    z: Vec<f64>,
    left: Vec<Lane>,
    center: Option<Lane>,
    right: Vec<Lane>,
    pub(crate) predecessor: Option<SectionLink>,
    pub(crate) successor: Option<SectionLink>,
}

impl LaneSection {
    pub(crate) fn build(
        road: &str,
        index: usize,
        rule: TrafficRule,
        record: &LaneSectionRecord,
        geometry: SectionGeometry,
        options: &LoadOptions,
    ) -> Result<Self> {
        let frame = SectionFrame {
            road,
            index,
            rule,
            reference: &geometry.reference_line,
            offset: &geometry.offset_line,
            z: &geometry.z,
        };
        let left = build_side(&record.left, Side::Left, &frame, options)?;
        let right = build_side(&record.right, Side::Right, &frame, options)?;
        let center = record.center.first().map(|r| Lane::center(r, &frame));

        Ok(Self {
            road: road.to_string(),
            index,
            rule,
            s_start: geometry.s_start,
            s_end: geometry.s_end,
            single_side: record.single_side,
            reference_line: geometry.reference_line,
            offset_line: geometry.offset_line,
            z: geometry.z,
            left,
            center,
            right,
            predecessor: None,
            successor: None,
        })
    }

    pub(crate) fn frame(&self) -> SectionFrame<'_> {
        SectionFrame {
            road: &self.road,
            index: self.index,
            rule: self.rule,
            reference: &self.reference_line,
            offset: &self.offset_line,
            z: &self.z,
        }
    }

    /// Document id of the owning road.
    #[must_use]
    pub fn road(&self) -> &str {
        &self.road
    }

    /// Position of this section along its road, starting at 0.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn s_start(&self) -> f64 {
        self.s_start
    }

    #[must_use]
    pub fn s_end(&self) -> f64 {
        self.s_end
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.s_end - self.s_start
    }

    #[must_use]
    pub fn single_side(&self) -> bool {
        self.single_side
    }

    #[must_use]
    pub fn reference_line(&self) -> &[Point2] {
        &self.reference_line
    }

    #[must_use]
    pub fn offset_line(&self) -> &[Point2] {
        &self.offset_line
    }

    /// Elevation at every sample of the reference line.
    #[must_use]
    pub fn z_profile(&self) -> &[f64] {
        &self.z
    }

    /// Left lanes, innermost first (ids 1, 2, ...).
    #[must_use]
    pub fn left_lanes(&self) -> &[Lane] {
        &self.left
    }

    /// Right lanes, innermost first (ids -1, -2, ...).
    #[must_use]
    pub fn right_lanes(&self) -> &[Lane] {
        &self.right
    }

    #[must_use]
    pub fn center_lane(&self) -> Option<&Lane> {
        self.center.as_ref()
    }

    /// Iterates over all lanes: left, center, then right.
    pub fn lanes(&self) -> impl Iterator<Item = &Lane> + '_ {
        self.left
            .iter()
            .chain(self.center.iter())
            .chain(self.right.iter())
    }

    pub(crate) fn lanes_mut(&mut self) -> impl Iterator<Item = &mut Lane> + '_ {
        self.left
            .iter_mut()
            .chain(self.center.iter_mut())
            .chain(self.right.iter_mut())
    }

    /// Returns the lane with the given id.
    #[must_use]
    pub fn lane(&self, id: i32) -> Option<&Lane> {
        self.lanes().find(|lane| lane.id() == id)
    }

    pub(crate) fn lane_mut(&mut self, id: i32) -> Option<&mut Lane> {
        self.lanes_mut().find(|lane| lane.id() == id)
    }

    /// Resolved predecessor section; `None` until the network is linked.
    #[must_use]
    pub fn predecessor(&self) -> Option<&SectionLink> {
        self.predecessor.as_ref()
    }

    /// Resolved successor section; `None` until the network is linked.
    #[must_use]
    pub fn successor(&self) -> Option<&SectionLink> {
        self.successor.as_ref()
    }
}

/// Builds the lanes of one side outwards from the offset line.
fn build_side(
    records: &[LaneRecord],
    side: Side,
    frame: &SectionFrame<'_>,
    options: &LoadOptions,
) -> Result<Vec<Lane>> {
    let mut ordered: Vec<&LaneRecord> = records
        .iter()
        .filter(|r| !options.is_ignored(r.lane_type))
        .collect();
    ordered.sort_by_key(|r| r.id.unsigned_abs());

    let mut lanes: Vec<Lane> = Vec::with_capacity(ordered.len());
    for record in ordered {
        let inner = lanes.last().map_or(frame.offset, Lane::boundary);
        let lane = Lane::build(record, side, lanes.len(), inner, frame)?;
        lanes.push(lane);
    }
    Ok(lanes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parse::PolyRecord;
    use crate::topology::LaneType;

    fn lane(id: i32, lane_type: LaneType, width: f64) -> LaneRecord {
        LaneRecord {
            id,
            lane_type: Some(lane_type),
            level: false,
            predecessors: vec![],
            successors: vec![],
            widths: vec![PolyRecord {
                s: 0.0,
                coefficients: [width, 0.0, 0.0, 0.0],
            }],
            borders: vec![],
            road_marks: vec![],
        }
    }

    fn geometry() -> SectionGeometry {
        let reference: Vec<Point2> = (0..=4).map(|i| Point2::new(f64::from(i), 0.0)).collect();
        SectionGeometry {
            s_start: 0.0,
            s_end: 4.0,
            offset_line: reference.clone(),
            reference_line: reference,
            z: vec![0.0; 5],
        }
    }

    fn record() -> LaneSectionRecord {
        LaneSectionRecord {
            s: 0.0,
            single_side: false,
            left: vec![lane(2, LaneType::Sidewalk, 2.0), lane(1, LaneType::Driving, 3.0)],
            center: vec![LaneRecord {
                widths: vec![],
                lane_type: None,
                ..lane(0, LaneType::Driving, 0.0)
            }],
            right: vec![
                lane(-2, LaneType::Shoulder, 1.0),
                lane(-1, LaneType::Driving, 3.5),
            ],
        }
    }

    #[test]
    fn lanes_are_stacked_outwards_by_id() {
        let section = LaneSection::build(
            "r",
            0,
            TrafficRule::RightHand,
            &record(),
            geometry(),
            &LoadOptions::default(),
        )
        .unwrap();
        let left: Vec<i32> = section.left_lanes().iter().map(Lane::id).collect();
        assert_eq!(left, vec![1, 2]);
        assert_eq!(section.lane(2).unwrap().index(), 1);
        assert_eq!(section.lane(-1).unwrap().index(), 0);
        assert!((section.lane(2).unwrap().boundary()[0].y - 5.0).abs() < 1e-12);
        assert!((section.lane(-2).unwrap().boundary()[0].y + 4.5).abs() < 1e-12);
        assert_eq!(section.center_lane().unwrap().boundary(), section.offset_line());
        assert_eq!(section.lanes().count(), 5);
    }

    #[test]
    fn ignored_lane_types_are_skipped() {
        let options = LoadOptions::default().with_ignored_lane_types([LaneType::Sidewalk]);
        let section =
            LaneSection::build("r", 0, TrafficRule::RightHand, &record(), geometry(), &options).unwrap();
        assert!(section.lane(2).is_none());
        assert!(section.lane(1).is_some());
    }
}
