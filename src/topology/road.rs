use tracing::{debug, warn};

use super::lane_section::{LaneSection, SectionGeometry};
use super::{ContactPoint, Signal};
use crate::error::{GeometryError, Result, TopologyError};
use crate::geometry::{CompositeCurve, Side};
use crate::math::polyline_2d::{cumulative_distances, resample, sub_polyline};
use crate::math::{Point2, Vector2, TOLERANCE};
use crate::network::LoadOptions;
use crate::parse::{LinkRecord, LinkTarget, PolyRecord, RoadRecord};

slotmap::new_key_type! {
    /// Unique identifier for a road in the road store.
    pub struct RoadId;
}

/// Distance by which an empty or inverted lane section range is widened
/// backwards from its end.
const DEGENERATE_SECTION_LENGTH: f64 = 0.1;

keyword_enum! {
    /// Standard driving side of a road.
    #[derive(Default)]
    pub enum TrafficRule {
        /// Right-hand traffic.
        #[default]
        RightHand => "RHT",
        /// Left-hand traffic.
        LeftHand => "LHT",
    }
}

keyword_enum! {
    /// Kind of element a road link points at.
    pub enum ElementType {
        Road => "road",
        Junction => "junction",
    }
}

/// Resolved neighbour of a road at one of its ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoadLink {
    /// Another road, attached at `contact`.
    Road { road: RoadId, contact: ContactPoint },
    /// A junction, identified by its document id.
    Junction { id: String },
}

/// Junction ids a road declares at its start and end.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JunctionIds<'a> {
    pub predecessor: Vec<&'a str>,
    pub successor: Vec<&'a str>,
}

/// A road: reference line, elevation, lane offset and lane sections, all
/// sampled at construction.
#[derive(Debug, Clone)]
pub struct Road {
    id: String,
    name: Option<String>,
    declared_length: f64,
    junction: Option<String>,
    rule: TrafficRule,
    resolution: f64,
    plan_view: CompositeCurve,
    elevation: CompositeCurve,
    lane_offset: CompositeCurve,
    reference_line: Vec<Point2>,
    distances: Vec<f64>,
    z: Vec<f64>,
    offset_line: Vec<Point2>,
    sections: Vec<LaneSection>,
    signals: Vec<Signal>,
    links: Vec<LinkRecord>,
    pub(crate) predecessor: Option<RoadLink>,
    pub(crate) successor: Option<RoadLink>,
}

impl Road {
    /// Builds a road from its record, sampling every derived line once.
    ///
    /// # Errors
    ///
    /// Returns an error if the plan view is empty or has zero length, a
    /// geometry cannot be evaluated, or a lane is malformed.
    pub fn build(record: RoadRecord, options: &LoadOptions) -> Result<Self> {
        let resolution = options.resolution();
        let RoadRecord {
            id,
            name,
            length: declared_length,
            junction,
            rule,
            links,
            plan_view,
            elevation,
            lane_offsets,
            mut lane_sections,
            signals,
        } = record;

        let (starts, members) = plan_view.into_iter().map(|r| (r.s, r.geometry)).unzip();
        let plan_view = CompositeCurve::new(members, starts)?;
        if plan_view.is_empty() {
            return Err(GeometryError::Degenerate(format!("road {id} has no plan view geometry")).into());
        }
        let reference_line = resample(&plan_view.evaluate(resolution)?, resolution)?;
        let distances = cumulative_distances(&reference_line);
        let total = distances.last().copied().unwrap_or(0.0);
        if total < TOLERANCE {
            return Err(GeometryError::Degenerate(format!("road {id} has a zero-length reference line")).into());
        }

        let elevation = PolyRecord::composite(&elevation)?;
        let z = elevation.values_at(&distances)?;

        let lane_offset = PolyRecord::composite(&lane_offsets)?;
        let offset_line = if lane_offset.is_empty() {
            reference_line.clone()
        } else {
            lane_offset.project_offset(
                &reference_line,
                &reference_line,
                &reference_line,
                Side::Left,
                0.0,
                None,
            )?
        };

        lane_sections.sort_by(|a, b| a.s.total_cmp(&b.s));
        let mut sections = Vec::with_capacity(lane_sections.len());
        for (index, section) in lane_sections.iter().enumerate() {
            let mut start = section.s;
            let end = lane_sections.get(index + 1).map_or(total, |next| next.s).min(total);
            if start >= end {
                warn!(road = %id, section = index, start, end, "empty lane section range, widening backwards");
                start = end - DEGENERATE_SECTION_LENGTH;
            }
            let geometry = SectionGeometry {
                s_start: start,
                s_end: end,
                reference_line: sub_polyline(&reference_line, &distances, start, end)?,
                offset_line: sub_polyline(&offset_line, &distances, start, end)?,
                z: sub_polyline(&z, &distances, start, end)?,
            };
            sections.push(LaneSection::build(&id, index, rule, section, geometry, options)?);
        }

        debug!(
            road = %id,
            length = total,
            geometries = plan_view.members().len(),
            sections = sections.len(),
            "built road"
        );

        Ok(Self {
            id,
            name,
            declared_length,
            junction,
            rule,
            resolution,
            plan_view,
            elevation,
            lane_offset,
            reference_line,
            distances,
            z,
            offset_line,
            sections,
            signals,
            links,
            predecessor: None,
            successor: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Length as declared in the document.
    #[must_use]
    pub fn declared_length(&self) -> f64 {
        self.declared_length
    }

    /// Arc length of the sampled reference line.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.distances.last().copied().unwrap_or(0.0)
    }

    /// Id of the junction this road belongs to, if it is a connecting road.
    #[must_use]
    pub fn junction(&self) -> Option<&str> {
        self.junction.as_deref()
    }

    #[must_use]
    pub fn rule(&self) -> TrafficRule {
        self.rule
    }

    /// Sampling resolution the road was built with.
    #[must_use]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Plan-view geometries in ascending `s` order.
    #[must_use]
    pub fn plan_view(&self) -> &CompositeCurve {
        &self.plan_view
    }

    #[must_use]
    pub fn elevation(&self) -> &CompositeCurve {
        &self.elevation
    }

    #[must_use]
    pub fn lane_offset(&self) -> &CompositeCurve {
        &self.lane_offset
    }

    #[must_use]
    pub fn reference_line(&self) -> &[Point2] {
        &self.reference_line
    }

    /// Cumulative arc length at every reference line sample.
    #[must_use]
    pub fn reference_distances(&self) -> &[f64] {
        &self.distances
    }

    /// Elevation at every reference line sample.
    #[must_use]
    pub fn z_profile(&self) -> &[f64] {
        &self.z
    }

    /// Reference line shifted by the lane offset; equals the reference line without one.
    #[must_use]
    pub fn offset_line(&self) -> &[Point2] {
        &self.offset_line
    }

    /// Lane sections in order along the reference line.
    #[must_use]
    pub fn sections(&self) -> &[LaneSection] {
        &self.sections
    }

    /// Returns a lane section by index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn section(&self, index: usize) -> Result<&LaneSection, TopologyError> {
        self.sections.get(index).ok_or_else(|| {
            TopologyError::EntityNotFound(format!("section {index} of road {}", self.id))
        })
    }

    pub(crate) fn section_mut(&mut self, index: usize) -> Result<&mut LaneSection, TopologyError> {
        let id = &self.id;
        self.sections
            .get_mut(index)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("section {index} of road {id}")))
    }

    #[must_use]
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Link elements as declared in the document.
    #[must_use]
    pub fn links(&self) -> &[LinkRecord] {
        &self.links
    }

    /// Resolved neighbour at the start of the road.
    #[must_use]
    pub fn predecessor(&self) -> Option<&RoadLink> {
        self.predecessor.as_ref()
    }

    /// Resolved neighbour at the end of the road.
    #[must_use]
    pub fn successor(&self) -> Option<&RoadLink> {
        self.successor.as_ref()
    }

    /// Declared predecessor element ids, roads and junctions alike.
    #[must_use]
    pub fn predecessor_ids(&self) -> Vec<&str> {
        self.links
            .iter()
            .flat_map(|l| &l.predecessors)
            .map(|t| t.element_id.as_str())
            .collect()
    }

    /// Declared successor element ids, roads and junctions alike.
    #[must_use]
    pub fn successor_ids(&self) -> Vec<&str> {
        self.links
            .iter()
            .flat_map(|l| &l.successors)
            .map(|t| t.element_id.as_str())
            .collect()
    }

    /// Junctions declared as predecessor or successor of this road.
    #[must_use]
    pub fn junction_connecting_ids(&self) -> JunctionIds<'_> {
        let mut ids = JunctionIds::default();
        for link in &self.links {
            ids.predecessor.extend(junctions(&link.predecessors));
            ids.successor.extend(junctions(&link.successors));
        }
        ids
    }

    /// Reference line sample at distance `s` and the unit tangent there.
    ///
    /// The sample is the first one at or beyond `s`, clamped to the last;
    /// the last sample reuses the tangent of the final segment.
    #[must_use]
    pub fn coordinate_and_direction(&self, s: f64) -> (Point2, Vector2) {
        let n = self.reference_line.len();
        let index = self.distances.partition_point(|&d| d < s).min(n - 1);
        let segment = index.min(n - 2);
        let tangent = self.reference_line[segment + 1] - self.reference_line[segment];
        (self.reference_line[index], tangent.normalize())
    }

    /// Planar position of a signal: the reference point at `s` shifted by
    /// `t` along the left normal.
    #[must_use]
    pub fn signal_anchor(&self, signal: &Signal) -> Point2 {
        let (point, tangent) = self.coordinate_and_direction(signal.s);
        point + Side::Left.normal(&tangent) * signal.t
    }

    pub(crate) fn clear_links(&mut self) {
        self.predecessor = None;
        self.successor = None;
        for section in &mut self.sections {
            section.predecessor = None;
            section.successor = None;
            for lane in section.lanes_mut() {
                lane.predecessors.clear();
                lane.successors.clear();
            }
        }
    }
}

fn junctions(targets: &[LinkTarget]) -> impl Iterator<Item = &str> + '_ {
    targets
        .iter()
        .filter(|t| t.element_type == ElementType::Junction)
        .map(|t| t.element_id.as_str())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parse::parse_document;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn build(xml_road: &str) -> Result<Road> {
        let doc = parse_document(&format!("<OpenDRIVE>{xml_road}</OpenDRIVE>"))?;
        let record = doc.roads.into_iter().next().unwrap();
        Road::build(record, &LoadOptions::default())
    }

    const LANES: &str = r#"<lanes>
        <laneSection s="0">
            <center><lane id="0" type="none"/></center>
            <right><lane id="-1" type="driving"><width sOffset="0" a="3" b="0" c="0" d="0"/></lane></right>
        </laneSection>
    </lanes>"#;

    #[test]
    fn reference_line_follows_sorted_geometries() {
        // Geometries declared out of order.
        let road = build(&format!(
            r#"<road id="1" length="20">
                <planView>
                    <geometry s="10" x="10" y="0" hdg="0" length="10"><line/></geometry>
                    <geometry s="0" x="0" y="0" hdg="0" length="10"><line/></geometry>
                </planView>{LANES}
            </road>"#
        ))
        .unwrap();
        let line = road.reference_line();
        assert_relative_eq!(line[0].x, 0.0);
        assert_relative_eq!(line[line.len() - 1].x, 20.0, epsilon = 1e-9);
        assert!(line.windows(2).all(|w| w[1].x > w[0].x));
    }

    #[test]
    fn geometry_lengths_sum_to_reference_length() {
        let road = build(&format!(
            r#"<road id="1" length="25.7">
                <planView>
                    <geometry s="0" x="0" y="0" hdg="0" length="10"><line/></geometry>
                    <geometry s="10" x="10" y="0" hdg="0" length="5.7"><arc curvature="0.05"/></geometry>
                    <geometry s="15.7" x="15.6" y="0.8" hdg="0.285" length="10">
                        <spiral curvStart="0.05" curvEnd="0"/>
                    </geometry>
                </planView>{LANES}
            </road>"#
        ))
        .unwrap();
        let declared: f64 = road.plan_view().members().iter().filter_map(|g| g.length()).sum();
        assert_relative_eq!(road.length(), declared, epsilon = 0.05);
    }

    #[test]
    fn elevation_and_lane_offset_are_applied() {
        let road = build(&format!(
            r#"<road id="1" length="10">
                <planView><geometry s="0" x="0" y="0" hdg="0" length="10"><line/></geometry></planView>
                <elevationProfile><elevation s="0" a="1" b="0.1" c="0" d="0"/></elevationProfile>
                <lanes>
                    <laneOffset s="0" a="0.5" b="0" c="0" d="0"/>
                    <laneSection s="0">
                        <center><lane id="0" type="none"/></center>
                    </laneSection>
                </lanes>
            </road>"#
        ))
        .unwrap();
        let z = road.z_profile();
        assert_relative_eq!(z[0], 1.0);
        assert_relative_eq!(z[z.len() - 1], 2.0, epsilon = 1e-9);
        assert!(road.offset_line().iter().all(|p| (p.y - 0.5).abs() < 1e-12));
    }

    #[test]
    fn sections_cover_the_reference_line() {
        let road = build(
            r#"<road id="1" length="10">
                <planView><geometry s="0" x="0" y="0" hdg="0" length="10"><line/></geometry></planView>
                <lanes>
                    <laneSection s="0"><center><lane id="0" type="none"/></center></laneSection>
                    <laneSection s="3.33"><center><lane id="0" type="none"/></center></laneSection>
                    <laneSection s="7"><center><lane id="0" type="none"/></center></laneSection>
                </lanes>
            </road>"#,
        )
        .unwrap();
        let sections = road.sections();
        assert_eq!(sections.len(), 3);
        assert_relative_eq!(sections[0].s_start(), 0.0);
        for pair in sections.windows(2) {
            assert_relative_eq!(pair[0].s_end(), pair[1].s_start());
        }
        assert_relative_eq!(sections[2].s_end(), road.length());

        // Exact interpolated cut at a non-grid distance.
        let first = sections[0].reference_line();
        assert_relative_eq!(first[first.len() - 1].x, 3.33, epsilon = 1e-9);
        assert_relative_eq!(sections[1].reference_line()[0].x, 3.33, epsilon = 1e-9);
    }

    #[test]
    fn empty_section_range_widens_backwards() {
        let road = build(
            r#"<road id="1" length="10">
                <planView><geometry s="0" x="0" y="0" hdg="0" length="10"><line/></geometry></planView>
                <lanes>
                    <laneSection s="0"><center><lane id="0" type="none"/></center></laneSection>
                    <laneSection s="12"><center><lane id="0" type="none"/></center></laneSection>
                </lanes>
            </road>"#,
        )
        .unwrap();
        let last = &road.sections()[1];
        assert_relative_eq!(last.s_end(), road.length());
        assert_relative_eq!(last.length(), DEGENERATE_SECTION_LENGTH, epsilon = 1e-9);
        assert!(last.reference_line().len() >= 2);
    }

    #[test]
    fn zero_length_reference_line_fails() {
        let err = build(
            r#"<road id="1" length="0">
                <planView><geometry s="0" x="0" y="0" hdg="0" length="0"><line/></geometry></planView>
            </road>"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("zero-length"));
    }

    #[test]
    fn missing_plan_view_fails() {
        assert!(build(r#"<road id="1" length="0"/>"#).is_err());
    }

    #[test]
    fn signal_anchor_is_offset_to_the_left() {
        let road = build(&format!(
            r#"<road id="1" length="10">
                <planView><geometry s="0" x="5" y="5" hdg="{FRAC_PI_2}" length="10"><line/></geometry></planView>
                {LANES}
                <signals><signal id="s" s="4.05" t="2"/></signals>
            </road>"#
        ))
        .unwrap();
        let anchor = road.signal_anchor(&road.signals()[0]);
        // Heading north, so left is -x; s snaps to the next sample.
        assert_relative_eq!(anchor.x, 3.0, epsilon = 1e-9);
        assert_relative_eq!(anchor.y, 9.1, epsilon = 1e-9);

        let (end, direction) = road.coordinate_and_direction(100.0);
        assert_relative_eq!(end.y, 15.0, epsilon = 1e-9);
        assert_relative_eq!(direction.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn declared_link_ids_are_reported() {
        let road = build(&format!(
            r#"<road id="1" length="10">
                <link>
                    <predecessor elementType="junction" elementId="J1"/>
                    <successor elementType="road" elementId="2" contactPoint="start"/>
                </link>
                <planView><geometry s="0" x="0" y="0" hdg="0" length="10"><line/></geometry></planView>
                {LANES}
            </road>"#
        ))
        .unwrap();
        assert_eq!(road.predecessor_ids(), vec!["J1"]);
        assert_eq!(road.successor_ids(), vec!["2"]);
        let junctions = road.junction_connecting_ids();
        assert_eq!(junctions.predecessor, vec!["J1"]);
        assert!(junctions.successor.is_empty());
    }
}
