use std::collections::HashSet;

use super::ContactPoint;

keyword_enum! {
    /// Kind of junction.
    #[derive(Default)]
    pub enum JunctionType {
        #[default]
        Default => "default",
        Virtual => "virtual",
        Direct => "direct",
        Crossing => "crossing",
    }
}

/// A lane-to-lane mapping inside a junction connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneLinkPair {
    /// Lane on the incoming road.
    pub from: i32,
    /// Lane on the connecting road.
    pub to: i32,
}

/// One path through a junction, from an incoming road onto a connecting road.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub id: String,
    pub incoming_road: String,
    /// Road inside the junction, absent for direct junctions.
    pub connecting_road: Option<String>,
    /// Road linked directly, used by direct junctions.
    pub linked_road: Option<String>,
    pub contact_point: Option<ContactPoint>,
    pub lane_links: Vec<LaneLinkPair>,
}

/// An area where roads meet, described by its connections.
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    pub id: String,
    pub name: Option<String>,
    pub kind: JunctionType,
    pub connections: Vec<Connection>,
}

impl Junction {
    /// Returns the ids of all roads that lie inside this junction.
    #[must_use]
    pub fn connecting_road_ids(&self) -> HashSet<&str> {
        self.connections
            .iter()
            .filter_map(|c| c.connecting_road.as_deref())
            .collect()
    }

    /// Returns the ids of all roads that enter this junction.
    #[must_use]
    pub fn incoming_road_ids(&self) -> HashSet<&str> {
        self.connections
            .iter()
            .map(|c| c.incoming_road.as_str())
            .collect()
    }
}
