//! Reading an OpenDRIVE document into validated records.
//!
//! Every attribute is read and converted exactly once here; the topology
//! layer only ever sees typed records.

pub mod header;
pub mod road;

pub use header::{GlobalOffset, Header};
pub use road::{
    LaneRecord, LaneSectionRecord, LinkRecord, LinkTarget, PlanViewRecord, PolyRecord, RoadRecord,
};

use std::fmt::Display;
use std::str::FromStr;

use roxmltree::Node;
use tracing::warn;

use crate::error::{ParseError, Result, UnknownVariant};
use crate::topology::{Connection, ContactPoint, Junction, LaneLinkPair};

/// The records of one OpenDRIVE document, in document order.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub header: Header,
    pub roads: Vec<RoadRecord>,
    pub junctions: Vec<Junction>,
}

/// Parses an OpenDRIVE document.
///
/// # Errors
///
/// Returns an error if the text is not well-formed XML, the root element is
/// not `<OpenDRIVE>`, or a required attribute is missing or malformed.
pub fn parse_document(xml: &str) -> Result<Document> {
    let doc = roxmltree::Document::parse(xml).map_err(ParseError::from)?;
    let root = doc.root_element();
    if root.tag_name().name() != "OpenDRIVE" {
        return Err(ParseError::MissingElement {
            element: "OpenDRIVE",
            context: "document root".into(),
        }
        .into());
    }

    let header = match child(root, "header") {
        Some(node) => header::parse_header(node)?,
        None => Header::default(),
    };
    let roads = children(root, "road")
        .map(road::parse_road)
        .collect::<Result<Vec<_>>>()?;
    let junctions = children(root, "junction")
        .map(parse_junction)
        .collect::<Result<Vec<_>>>()?;

    Ok(Document {
        header,
        roads,
        junctions,
    })
}

fn parse_junction(node: Node) -> Result<Junction> {
    let connections = children(node, "connection")
        .map(|connection| {
            let lane_links = children(connection, "laneLink")
                .map(|link| {
                    Ok(LaneLinkPair {
                        from: required(link, "from")?,
                        to: required(link, "to")?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Connection {
                id: text(connection, "id").unwrap_or_default(),
                incoming_road: required_str(connection, "incomingRoad")?.to_string(),
                connecting_road: text(connection, "connectingRoad"),
                linked_road: text(connection, "linkedRoad"),
                contact_point: optional::<ContactPoint>(connection, "contactPoint")?,
                lane_links,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Junction {
        id: required_str(node, "id")?.to_string(),
        name: text(node, "name"),
        kind: keyword(node, "type").unwrap_or_default(),
        connections,
    })
}

/// Returns the first child element named `name`.
pub(crate) fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.tag_name().name() == name)
}

/// Iterates over the child elements named `name`.
pub(crate) fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| n.tag_name().name() == name)
}

/// Short description of an element for error messages, e.g. `<road id="7">`.
pub(crate) fn describe(node: Node) -> String {
    match node.attribute("id") {
        Some(id) => format!("<{} id=\"{id}\">", node.tag_name().name()),
        None => format!("<{}>", node.tag_name().name()),
    }
}

pub(crate) fn required_str<'a>(node: Node<'a, '_>, attribute: &'static str) -> Result<&'a str> {
    node.attribute(attribute).ok_or_else(|| {
        ParseError::MissingAttribute {
            attribute,
            element: describe(node),
        }
        .into()
    })
}

/// Reads an optional attribute as an owned string.
pub(crate) fn text(node: Node, attribute: &str) -> Option<String> {
    node.attribute(attribute).map(str::to_string)
}

/// Reads and converts a required attribute.
pub(crate) fn required<T>(node: Node, attribute: &'static str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    convert(node, attribute, required_str(node, attribute)?)
}

/// Reads and converts an optional attribute.
pub(crate) fn optional<T>(node: Node, attribute: &'static str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    node.attribute(attribute)
        .map(|value| convert(node, attribute, value))
        .transpose()
}

/// Reads an optional keyword attribute.
///
/// Values outside the enumeration are reported with a warning and read as
/// absent, so newer document revisions still load.
pub(crate) fn keyword<T>(node: Node, attribute: &'static str) -> Option<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    let value = node.attribute(attribute)?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(element = %describe(node), attribute, %err, "ignoring unrecognized keyword");
            None
        }
    }
}

/// Reads the start distance of a record, which may be spelled `s` or `sOffset`.
pub(crate) fn start_distance(node: Node) -> Result<f64> {
    match optional(node, "s")? {
        Some(s) => Ok(s),
        None => required(node, "sOffset"),
    }
}

/// Reads an OpenDRIVE boolean (`true`/`false`, `1`/`0`, `yes`/`no`).
pub(crate) fn flag(node: Node, attribute: &'static str) -> Result<bool> {
    match node.attribute(attribute) {
        None => Ok(false),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(ParseError::InvalidAttribute {
            attribute,
            element: describe(node),
            message: format!("expected a boolean, got {other:?}"),
        }
        .into()),
    }
}

fn convert<T>(node: Node, attribute: &'static str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value.trim().parse::<T>().map_err(|e| {
        ParseError::InvalidAttribute {
            attribute,
            element: describe(node),
            message: e.to_string(),
        }
        .into()
    })
}
