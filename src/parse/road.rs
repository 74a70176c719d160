use roxmltree::Node;

use super::{
    child, children, describe, flag, keyword, optional, required, required_str, start_distance, text,
};
use crate::error::{ParseError, Result};
use crate::geometry::{
    Arc, CompositeCurve, CubicPolynomial, Geometry, Line, ParamRange, ParametricCubicPolynomial,
    Pose, Spiral,
};
use crate::topology::{
    ContactPoint, ElementType, LaneType, Orientation, RoadMark, Signal, TrafficRule,
};

/// One `<geometry>` element of a plan view.
#[derive(Debug, Clone)]
pub struct PlanViewRecord {
    /// Declared start distance along the reference line.
    pub s: f64,
    pub geometry: Geometry,
}

/// A cubic polynomial piece `a + b ds + c ds² + d ds³` starting at `s`.
///
/// Used by elevation, lane offset, lane width and lane border elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolyRecord {
    pub s: f64,
    pub coefficients: [f64; 4],
}

impl PolyRecord {
    /// Assembles pieces into one composite offset function.
    ///
    /// # Errors
    ///
    /// Returns an error if the composite cannot be built.
    pub fn composite(records: &[Self]) -> Result<CompositeCurve> {
        let members = records
            .iter()
            .map(|r| {
                let [a, b, c, d] = r.coefficients;
                Geometry::CubicPolynomial(CubicPolynomial::new(a, b, c, d))
            })
            .collect();
        CompositeCurve::new(members, records.iter().map(|r| r.s).collect())
    }
}

/// Target of a road `<predecessor>` or `<successor>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkTarget {
    pub element_type: ElementType,
    pub element_id: String,
    pub contact_point: Option<ContactPoint>,
}

/// One `<link>` element of a road, as declared.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinkRecord {
    pub predecessors: Vec<LinkTarget>,
    pub successors: Vec<LinkTarget>,
}

/// One `<lane>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneRecord {
    pub id: i32,
    /// `None` for lanes of type `none`.
    pub lane_type: Option<LaneType>,
    pub level: bool,
    /// Declared predecessor lane ids, as written.
    pub predecessors: Vec<i32>,
    /// Declared successor lane ids, as written.
    pub successors: Vec<i32>,
    pub widths: Vec<PolyRecord>,
    pub borders: Vec<PolyRecord>,
    pub road_marks: Vec<RoadMark>,
}

/// One `<laneSection>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneSectionRecord {
    pub s: f64,
    pub single_side: bool,
    pub left: Vec<LaneRecord>,
    pub center: Vec<LaneRecord>,
    pub right: Vec<LaneRecord>,
}

/// One `<road>` element.
#[derive(Debug, Clone)]
pub struct RoadRecord {
    pub id: String,
    pub name: Option<String>,
    pub length: f64,
    /// Id of the junction this road belongs to; `None` for `-1` or absent.
    pub junction: Option<String>,
    pub rule: TrafficRule,
    pub links: Vec<LinkRecord>,
    pub plan_view: Vec<PlanViewRecord>,
    pub elevation: Vec<PolyRecord>,
    pub lane_offsets: Vec<PolyRecord>,
    pub lane_sections: Vec<LaneSectionRecord>,
    pub signals: Vec<Signal>,
}

pub(super) fn parse_road(node: Node) -> Result<RoadRecord> {
    let id = required_str(node, "id")?.to_string();

    let plan_view = match child(node, "planView") {
        Some(pv) => children(pv, "geometry")
            .map(|g| parse_geometry(g, &id))
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };
    let elevation = match child(node, "elevationProfile") {
        Some(profile) => children(profile, "elevation")
            .map(parse_poly)
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    let (lane_offsets, lane_sections) = match child(node, "lanes") {
        Some(lanes) => (
            children(lanes, "laneOffset")
                .map(parse_poly)
                .collect::<Result<Vec<_>>>()?,
            children(lanes, "laneSection")
                .map(parse_lane_section)
                .collect::<Result<Vec<_>>>()?,
        ),
        None => (Vec::new(), Vec::new()),
    };

    let signals = match child(node, "signals") {
        Some(signals) => children(signals, "signal")
            .map(parse_signal)
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(RoadRecord {
        name: text(node, "name"),
        length: optional(node, "length")?.unwrap_or(0.0),
        junction: node
            .attribute("junction")
            .filter(|j| *j != "-1" && !j.is_empty())
            .map(str::to_string),
        rule: keyword(node, "rule").unwrap_or_default(),
        links: children(node, "link")
            .map(parse_link)
            .collect::<Result<Vec<_>>>()?,
        plan_view,
        elevation,
        lane_offsets,
        lane_sections,
        signals,
        id,
    })
}

fn parse_link(node: Node) -> Result<LinkRecord> {
    let target = |n: Node| -> Result<LinkTarget> {
        Ok(LinkTarget {
            element_type: required(n, "elementType")?,
            element_id: required_str(n, "elementId")?.to_string(),
            contact_point: optional(n, "contactPoint")?,
        })
    };
    Ok(LinkRecord {
        predecessors: children(node, "predecessor")
            .map(target)
            .collect::<Result<Vec<_>>>()?,
        successors: children(node, "successor")
            .map(target)
            .collect::<Result<Vec<_>>>()?,
    })
}

fn parse_geometry(node: Node, road_id: &str) -> Result<PlanViewRecord> {
    let s = required(node, "s")?;
    let pose = Pose::new(required(node, "x")?, required(node, "y")?, required(node, "hdg")?);
    let length = required(node, "length")?;

    let variant = node
        .children()
        .find(Node::is_element)
        .ok_or_else(|| ParseError::UnknownGeometry(road_id.to_string()))?;
    let geometry = match variant.tag_name().name() {
        "line" => Geometry::Line(Line::new(pose, length)?),
        "arc" => Geometry::Arc(Arc::new(pose, length, required(variant, "curvature")?)?),
        "spiral" => Geometry::Spiral(Spiral::new(
            pose,
            length,
            required(variant, "curvStart")?,
            required(variant, "curvEnd")?,
        )?),
        "poly3" => Geometry::CubicPolynomial(CubicPolynomial::with_frame(
            coefficients(variant, ["a", "b", "c", "d"])?,
            pose,
            length,
        )?),
        "paramPoly3" => {
            let p_range = match variant.attribute("pRange") {
                None | Some("normalized") => ParamRange::Normalized,
                Some("arcLength") => ParamRange::ArcLength,
                Some(other) => {
                    return Err(ParseError::InvalidAttribute {
                        attribute: "pRange",
                        element: describe(variant),
                        message: format!("expected normalized or arcLength, got {other:?}"),
                    }
                    .into())
                }
            };
            Geometry::ParametricCubicPolynomial(ParametricCubicPolynomial::new(
                pose,
                length,
                coefficients(variant, ["aU", "bU", "cU", "dU"])?,
                coefficients(variant, ["aV", "bV", "cV", "dV"])?,
                p_range,
            )?)
        }
        _ => return Err(ParseError::UnknownGeometry(road_id.to_string()).into()),
    };
    Ok(PlanViewRecord { s, geometry })
}

fn coefficients(node: Node, names: [&'static str; 4]) -> Result<[f64; 4]> {
    Ok([
        required(node, names[0])?,
        required(node, names[1])?,
        required(node, names[2])?,
        required(node, names[3])?,
    ])
}

fn parse_poly(node: Node) -> Result<PolyRecord> {
    Ok(PolyRecord {
        s: start_distance(node)?,
        coefficients: coefficients(node, ["a", "b", "c", "d"])?,
    })
}

fn parse_lane_section(node: Node) -> Result<LaneSectionRecord> {
    let side = |name: &str| -> Result<Vec<LaneRecord>> {
        match child(node, name) {
            Some(group) => children(group, "lane").map(parse_lane).collect(),
            None => Ok(Vec::new()),
        }
    };
    Ok(LaneSectionRecord {
        s: start_distance(node)?,
        single_side: flag(node, "singleSide")?,
        left: side("left")?,
        center: side("center")?,
        right: side("right")?,
    })
}

fn parse_lane(node: Node) -> Result<LaneRecord> {
    // Lane types this reader does not know are read like `none`.
    let lane_type = match required_str(node, "type")? {
        "none" => None,
        _ => keyword(node, "type"),
    };
    let (predecessors, successors) = match child(node, "link") {
        Some(link) => {
            let ids = |name: &'static str| {
                children(link, name)
                    .map(|n| required::<i32>(n, "id"))
                    .collect::<Result<Vec<_>>>()
            };
            (ids("predecessor")?, ids("successor")?)
        }
        None => (Vec::new(), Vec::new()),
    };

    Ok(LaneRecord {
        id: required(node, "id")?,
        lane_type,
        level: flag(node, "level")?,
        predecessors,
        successors,
        widths: children(node, "width")
            .map(parse_poly)
            .collect::<Result<Vec<_>>>()?,
        borders: children(node, "border")
            .map(parse_poly)
            .collect::<Result<Vec<_>>>()?,
        road_marks: children(node, "roadMark")
            .map(parse_road_mark)
            .collect::<Result<Vec<_>>>()?,
    })
}

fn parse_road_mark(node: Node) -> Result<RoadMark> {
    Ok(RoadMark {
        s_offset: optional(node, "sOffset")?.unwrap_or(0.0),
        kind: keyword(node, "type").unwrap_or_default(),
        color: keyword(node, "color").unwrap_or_default(),
        weight: keyword(node, "weight"),
        width: optional(node, "width")?,
        material: text(node, "material"),
        lane_change: keyword(node, "laneChange"),
        height: optional(node, "height")?.unwrap_or(0.0),
    })
}

fn parse_signal(node: Node) -> Result<Signal> {
    Ok(Signal {
        id: text(node, "id").unwrap_or_else(|| "invalid_id".into()),
        name: text(node, "name"),
        s: optional(node, "s")?.unwrap_or(0.0),
        t: optional(node, "t")?.unwrap_or(0.0),
        z_offset: optional(node, "zOffset")?.unwrap_or(0.0),
        h_offset: optional(node, "hOffset")?,
        pitch: optional(node, "pitch")?,
        roll: optional(node, "roll")?,
        orientation: keyword::<Orientation>(node, "orientation").unwrap_or_default(),
        dynamic: flag(node, "dynamic")?,
        country: text(node, "country"),
        country_revision: text(node, "countryRevision"),
        kind: text(node, "type").unwrap_or_else(|| "none".into()),
        subtype: text(node, "subtype").unwrap_or_default(),
        value: optional(node, "value")?,
        unit: keyword(node, "unit"),
        text: text(node, "text"),
        width: optional(node, "width")?,
        height: optional(node, "height")?,
        length: optional(node, "length")?,
    })
}
