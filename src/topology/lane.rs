use std::fmt;

use tracing::trace;

use super::lane_section::SectionFrame;
use super::road_mark::sort_by_offset;
use super::{ContactPoint, RoadId, RoadMark, TrafficRule};
use crate::error::{Result, TopologyError};
use crate::geometry::{CompositeCurve, Side};
use crate::math::polyline_2d::cumulative_distances;
use crate::math::{Point2, Point3};
use crate::parse::{LaneRecord, PolyRecord};

keyword_enum! {
    /// Use of a lane. The `none` type is represented as `Option::None`.
    pub enum LaneType {
        Shoulder => "shoulder",
        Border => "border",
        Driving => "driving",
        Stop => "stop",
        Restricted => "restricted",
        Parking => "parking",
        Median => "median",
        Biking => "biking",
        Sidewalk => "sidewalk",
        Curb => "curb",
        Exit => "exit",
        Entry => "entry",
        OnRamp => "onRamp",
        OffRamp => "offRamp",
        ConnectingRamp => "connectingRamp",
        Bidirectional => "bidirectional",
        Special1 => "special1",
        Special2 => "special2",
        Special3 => "special3",
        RoadWorks => "roadWorks",
        Tram => "tram",
        Rail => "rail",
        Bus => "bus",
        Taxi => "taxi",
        Hov => "HOV",
        MotorwayEntry => "mwyEntry",
        MotorwayExit => "mwyExit",
        Walking => "walking",
        SlipLane => "slipLane",
        Shared => "shared",
    }
}

/// Resolved connection from a lane to a lane of a neighbouring section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LaneLink {
    pub road: RoadId,
    pub section: usize,
    pub lane: i32,
    /// End of the target lane this lane attaches to.
    pub contact: ContactPoint,
}

/// How the lateral extent of a lane is described.
#[derive(Debug, Clone)]
pub enum Representation {
    /// Width measured from the inner boundary.
    Width(CompositeCurve),
    /// Absolute offset of the far boundary from the lane offset line.
    Border(CompositeCurve),
    /// No width data: the center lane, or a lane of type `none` whose far
    /// boundary falls back to the section reference line.
    Empty,
}

/// A lane of one lane section.
///
/// Boundaries are sampled in parallel with the section reference line.
/// Lanes with positive ids lie left of the reference line, negative ids
/// right, and id 0 is the center lane that only carries road marks.
#[derive(Debug, Clone)]
pub struct Lane {
    road: String,
    section: usize,
    id: i32,
    side: Option<Side>,
    index: usize,
    lane_type: Option<LaneType>,
    level: bool,
    rule: TrafficRule,
    representation: Representation,
    inner_boundary: Vec<Point2>,
    boundary: Vec<Point2>,
    centerline: Vec<Point3>,
    road_marks: Vec<RoadMark>,
    predecessor_ids: Vec<i32>,
    successor_ids: Vec<i32>,
    pub(crate) predecessors: Vec<LaneLink>,
    pub(crate) successors: Vec<LaneLink>,
}

impl Lane {
    /// Builds a side lane whose inner edge is `inner`.
    pub(crate) fn build(
        record: &LaneRecord,
        side: Side,
        index: usize,
        inner: &[Point2],
        frame: &SectionFrame<'_>,
    ) -> Result<Self> {
        let unsupported = |reason| TopologyError::UnsupportedLaneRepresentation {
            lane: format!("{} of section {} on road {}", record.id, frame.index, frame.road),
            reason,
        };
        let representation = match (record.widths.is_empty(), record.borders.is_empty()) {
            (false, false) => return Err(unsupported("uses both widths and borders").into()),
            (false, true) => Representation::Width(PolyRecord::composite(&record.widths)?),
            (true, false) => Representation::Border(PolyRecord::composite(&record.borders)?),
            (true, true) if record.lane_type.is_none() => Representation::Empty,
            (true, true) => return Err(unsupported("uses neither widths nor borders").into()),
        };

        let boundary = match &representation {
            Representation::Width(width) => {
                width.project_offset(frame.reference, frame.offset, inner, side, 0.0, None)?
            }
            Representation::Border(border) => {
                border.project_offset(frame.reference, frame.offset, frame.offset, side, 0.0, None)?
            }
            Representation::Empty => frame.reference.to_vec(),
        };
        trace!(road = frame.road, section = frame.index, lane = record.id, "built lane");
        Ok(Self::assemble(
            record,
            Some(side),
            index,
            representation,
            inner.to_vec(),
            boundary,
            frame,
        ))
    }

    /// Builds the center lane, which coincides with the lane offset line.
    pub(crate) fn center(record: &LaneRecord, frame: &SectionFrame<'_>) -> Self {
        let line = frame.offset.to_vec();
        Self::assemble(record, None, 0, Representation::Empty, line.clone(), line, frame)
    }

    fn assemble(
        record: &LaneRecord,
        side: Option<Side>,
        index: usize,
        representation: Representation,
        inner_boundary: Vec<Point2>,
        boundary: Vec<Point2>,
        frame: &SectionFrame<'_>,
    ) -> Self {
        let centerline = inner_boundary
            .iter()
            .zip(&boundary)
            .zip(frame.z)
            .map(|((a, b), &z)| Point3::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0, z))
            .collect();
        let mut road_marks = record.road_marks.clone();
        sort_by_offset(&mut road_marks);
        let linked = |ids: &[i32]| -> Vec<i32> {
            if record.id == 0 {
                return Vec::new();
            }
            ids.iter().copied().filter(|&id| id != 0).collect()
        };

        Self {
            road: frame.road.to_string(),
            section: frame.index,
            id: record.id,
            side,
            index,
            lane_type: record.lane_type,
            level: record.level,
            rule: frame.rule,
            representation,
            inner_boundary,
            boundary,
            centerline,
            road_marks,
            predecessor_ids: linked(&record.predecessors),
            successor_ids: linked(&record.successors),
            predecessors: Vec::new(),
            successors: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Document id of the owning road.
    #[must_use]
    pub fn road(&self) -> &str {
        &self.road
    }

    /// Index of the owning lane section along the road.
    #[must_use]
    pub fn section(&self) -> usize {
        self.section
    }

    /// Side of the reference line, `None` for the center lane.
    #[must_use]
    pub fn side(&self) -> Option<Side> {
        self.side
    }

    /// Position within its side, counted outwards from the reference line;
    /// 0 for the center lane.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn is_center(&self) -> bool {
        self.side.is_none()
    }

    #[must_use]
    pub fn lane_type(&self) -> Option<LaneType> {
        self.lane_type
    }

    #[must_use]
    pub fn level(&self) -> bool {
        self.level
    }

    #[must_use]
    pub fn representation(&self) -> &Representation {
        &self.representation
    }

    /// Edge of the lane nearest the reference line.
    #[must_use]
    pub fn inner_boundary(&self) -> &[Point2] {
        &self.inner_boundary
    }

    /// Edge of the lane farthest from the reference line.
    #[must_use]
    pub fn boundary(&self) -> &[Point2] {
        &self.boundary
    }

    /// Midline between both boundaries, with the road elevation as `z`.
    #[must_use]
    pub fn centerline(&self) -> &[Point3] {
        &self.centerline
    }

    /// Road marks in ascending `s_offset` order.
    #[must_use]
    pub fn road_marks(&self) -> &[RoadMark] {
        &self.road_marks
    }

    /// Declared predecessor lane ids, never containing 0.
    #[must_use]
    pub fn predecessor_ids(&self) -> &[i32] {
        &self.predecessor_ids
    }

    /// Declared successor lane ids, never containing 0.
    #[must_use]
    pub fn successor_ids(&self) -> &[i32] {
        &self.successor_ids
    }

    /// Resolved predecessor lanes; empty until the network is linked.
    #[must_use]
    pub fn predecessors(&self) -> &[LaneLink] {
        &self.predecessors
    }

    /// Resolved successor lanes; empty until the network is linked.
    #[must_use]
    pub fn successors(&self) -> &[LaneLink] {
        &self.successors
    }

    /// Returns `true` if legal traffic runs against the centerline's point order.
    ///
    /// Right lanes follow the reference line under right-hand traffic, left
    /// lanes under left-hand traffic.
    #[must_use]
    pub fn flows_against_centerline(&self) -> bool {
        (self.id < 0) != (self.rule == TrafficRule::RightHand)
    }

    /// Centerline ordered along the legal direction of travel.
    #[must_use]
    pub fn traffic_flow_line(&self) -> Vec<Point3> {
        let mut line = self.centerline.clone();
        if self.flows_against_centerline() {
            line.reverse();
        }
        line
    }

    /// Far boundary restricted to section-relative distances `[s_start, s_end]`.
    pub(crate) fn boundary_segment(
        &self,
        frame: &SectionFrame<'_>,
        s_start: f64,
        s_end: Option<f64>,
    ) -> Result<Vec<Point2>> {
        match (&self.representation, self.side) {
            (Representation::Width(width), Some(side)) => width.project_offset(
                frame.reference,
                frame.offset,
                &self.inner_boundary,
                side,
                s_start,
                s_end,
            ),
            (Representation::Border(border), Some(side)) => border.project_offset(
                frame.reference,
                frame.offset,
                frame.offset,
                side,
                s_start,
                s_end,
            ),
            _ => {
                let upper = s_end.unwrap_or(f64::INFINITY);
                Ok(cumulative_distances(frame.reference)
                    .into_iter()
                    .zip(&self.boundary)
                    .filter(|(s, _)| *s >= s_start && *s <= upper)
                    .map(|(_, &p)| p)
                    .collect())
            }
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lane {} of section {} on road {}",
            self.id, self.section, self.road
        )
    }
}
