/// Declares a fieldless enum that maps one-to-one onto the keyword values of
/// a document attribute, with `as_str`, `FromStr` and `Display`.
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Returns the keyword as written in the document.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::UnknownVariant;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err($crate::error::UnknownVariant(other.to_string())),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod junction;
pub mod lane;
pub mod lane_section;
pub mod road;
pub mod road_mark;
pub mod signal;

pub use junction::{Connection, Junction, JunctionType, LaneLinkPair};
pub use lane::{Lane, LaneLink, LaneType, Representation};
pub use lane_section::{LaneSection, SectionLink};
pub use road::{ElementType, JunctionIds, Road, RoadId, RoadLink, TrafficRule};
pub use road_mark::{LaneChange, RoadMark, RoadMarkColor, RoadMarkType, RoadMarkWeight};
pub use signal::{Orientation, Signal, Unit};

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::error::TopologyError;

keyword_enum! {
    /// End of a road, lane section or lane that a link attaches to.
    pub enum ContactPoint {
        /// The start of the reference line (`s = 0`).
        Beginning => "start",
        /// The end of the reference line (`s = length`).
        End => "end",
    }
}

/// Central arena that owns every road of a network.
///
/// Roads reference each other through [`RoadId`] (generational indices)
/// rather than pointers, so links can be resolved in a second pass without
/// self-referential structures. Iteration follows insertion order.
#[derive(Debug, Default)]
pub struct RoadStore {
    roads: SlotMap<RoadId, Road>,
    index: HashMap<String, RoadId>,
    order: Vec<RoadId>,
}

impl RoadStore {
    /// Creates a new, empty road store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a road and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if a road with the same document id is already stored.
    pub fn add_road(&mut self, road: Road) -> Result<RoadId, TopologyError> {
        if self.index.contains_key(road.id()) {
            return Err(TopologyError::InvalidTopology(format!(
                "duplicate road id {}",
                road.id()
            )));
        }
        let name = road.id().to_string();
        let id = self.roads.insert(road);
        self.index.insert(name, id);
        self.order.push(id);
        Ok(id)
    }

    /// Returns a reference to the road, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn road(&self, id: RoadId) -> Result<&Road, TopologyError> {
        self.roads
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("road".into()))
    }

    /// Returns a mutable reference to the road, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn road_mut(&mut self, id: RoadId) -> Result<&mut Road, TopologyError> {
        self.roads
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("road".into()))
    }

    /// Looks up the arena key of a road by its document id.
    #[must_use]
    pub fn key_of(&self, road_id: &str) -> Option<RoadId> {
        self.index.get(road_id).copied()
    }

    /// Returns the road with the given document id.
    ///
    /// # Errors
    ///
    /// Returns an error if no road has this id.
    pub fn road_by_id(&self, road_id: &str) -> Result<&Road, TopologyError> {
        let key = self
            .key_of(road_id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("road {road_id}")))?;
        self.road(key)
    }

    /// Returns the lane section a section link points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the road or section does not exist.
    pub fn section(&self, link: &SectionLink) -> Result<&LaneSection, TopologyError> {
        self.road(link.road)?.section(link.section)
    }

    /// Returns the lane a lane link points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the road, section or lane does not exist.
    pub fn lane(&self, link: &LaneLink) -> Result<&Lane, TopologyError> {
        self.lane_at(link.road, link.section, link.lane)
    }

    /// Returns lane `lane` of section `section` on road `road`.
    ///
    /// # Errors
    ///
    /// Returns an error if the road, section or lane does not exist.
    pub fn lane_at(&self, road: RoadId, section: usize, lane: i32) -> Result<&Lane, TopologyError> {
        let road = self.road(road)?;
        road.section(section)?.lane(lane).ok_or_else(|| {
            TopologyError::EntityNotFound(format!(
                "lane {lane} in section {section} of road {}",
                road.id()
            ))
        })
    }

    /// Returns all arena keys in insertion order.
    #[must_use]
    pub fn ids(&self) -> &[RoadId] {
        &self.order
    }

    /// Iterates over all roads in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (RoadId, &Road)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.roads.get(id).map(|road| (id, road)))
    }

    /// Iterates mutably over all roads, in no particular order.
    pub fn roads_mut(&mut self) -> impl Iterator<Item = &mut Road> + '_ {
        self.roads.values_mut()
    }

    /// Returns the number of roads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roads.len()
    }

    /// Returns `true` if the store holds no roads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }
}
