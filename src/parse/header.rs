use roxmltree::Node;

use super::{child, optional, text};
use crate::error::Result;

/// Translation and rotation applied to every coordinate of the document.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlobalOffset {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub heading: f64,
}

/// Document-wide metadata from the `<header>` element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Header {
    pub name: Option<String>,
    pub rev_major: Option<u32>,
    pub rev_minor: Option<u32>,
    pub version: Option<String>,
    pub date: Option<String>,
    pub vendor: Option<String>,
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    /// Raw projection definition, if present and non-empty.
    pub geo_reference: Option<String>,
    pub offset: Option<GlobalOffset>,
}

pub(super) fn parse_header(node: Node) -> Result<Header> {
    let geo_reference = child(node, "geoReference")
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let offset = child(node, "offset")
        .map(|n| -> Result<GlobalOffset> {
            Ok(GlobalOffset {
                x: optional(n, "x")?.unwrap_or(0.0),
                y: optional(n, "y")?.unwrap_or(0.0),
                z: optional(n, "z")?.unwrap_or(0.0),
                heading: optional(n, "hdg")?.unwrap_or(0.0),
            })
        })
        .transpose()?;

    Ok(Header {
        name: text(node, "name"),
        rev_major: optional(node, "revMajor")?,
        rev_minor: optional(node, "revMinor")?,
        version: text(node, "version"),
        date: text(node, "date"),
        vendor: text(node, "vendor"),
        north: optional(node, "north")?.unwrap_or(0.0),
        south: optional(node, "south")?.unwrap_or(0.0),
        east: optional(node, "east")?.unwrap_or(0.0),
        west: optional(node, "west")?.unwrap_or(0.0),
        geo_reference,
        offset,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn header(xml: &str) -> Header {
        let doc = roxmltree::Document::parse(xml).unwrap();
        parse_header(doc.root_element()).unwrap()
    }

    #[test]
    fn reads_cdata_geo_reference_and_offset() {
        let h = header(
            r#"<header revMajor="1" revMinor="6" name="town" north="10" west="-3.5">
                <geoReference><![CDATA[ +proj=utm +zone=32 +datum=WGS84 ]]></geoReference>
                <offset x="100" y="-20" z="1" hdg="0.5"/>
            </header>"#,
        );
        assert_eq!(h.rev_minor, Some(6));
        assert_eq!(h.north, 10.0);
        assert_eq!(h.west, -3.5);
        assert_eq!(h.geo_reference.as_deref(), Some("+proj=utm +zone=32 +datum=WGS84"));
        let offset = h.offset.unwrap();
        assert_eq!((offset.x, offset.y, offset.z, offset.heading), (100.0, -20.0, 1.0, 0.5));
    }

    #[test]
    fn missing_parts_default() {
        let h = header("<header><geoReference>   </geoReference></header>");
        assert!(h.geo_reference.is_none());
        assert!(h.offset.is_none());
        assert_eq!(h.south, 0.0);
    }
}
