//! Loading a complete road network.

use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::error::{GeometryError, ParseError, Result};
use crate::operations::LinkRoads;
use crate::parse::{parse_document, GlobalOffset, Header};
use crate::topology::{Junction, LaneType, Road, RoadStore};

const DEFAULT_RESOLUTION: f64 = 0.1;

/// Options controlling how a document is turned into a network.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    resolution: f64,
    ignored_lane_types: HashSet<LaneType>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            ignored_lane_types: HashSet::new(),
        }
    }
}

impl LoadOptions {
    /// Sets the spacing of sampled lines in meters.
    #[must_use]
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Sets the lane types that are left out of every lane section.
    #[must_use]
    pub fn with_ignored_lane_types(mut self, types: impl IntoIterator<Item = LaneType>) -> Self {
        self.ignored_lane_types = types.into_iter().collect();
        self
    }

    #[must_use]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    #[must_use]
    pub fn ignored_lane_types(&self) -> &HashSet<LaneType> {
        &self.ignored_lane_types
    }

    /// Returns `true` if lanes of this type are skipped. Lanes of type
    /// `none` are always kept.
    #[must_use]
    pub fn is_ignored(&self, lane_type: Option<LaneType>) -> bool {
        lane_type.is_some_and(|t| self.ignored_lane_types.contains(&t))
    }

    /// Checks that the resolution is a positive finite number.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ParameterOutOfRange`] otherwise.
    pub fn validate(&self) -> Result<()> {
        if self.resolution > 0.0 && self.resolution.is_finite() {
            Ok(())
        } else {
            Err(GeometryError::ParameterOutOfRange {
                parameter: "resolution",
                value: self.resolution,
                min: 0.0,
                max: f64::INFINITY,
            }
            .into())
        }
    }
}

/// Coordinate system declared by the document header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoReference {
    /// Plain local metric coordinates.
    Flat,
    /// A PROJ.4 definition string.
    Proj4(String),
}

/// A parsed, sampled and linked OpenDRIVE road network.
#[derive(Debug)]
pub struct RoadNetwork {
    header: Header,
    store: RoadStore,
    junctions: Vec<Junction>,
}

impl RoadNetwork {
    /// Parses and links a network from an OpenDRIVE document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed, a road cannot be
    /// built, or the links between roads are inconsistent.
    pub fn parse(xml: &str, options: LoadOptions) -> Result<Self> {
        options.validate()?;
        let document = parse_document(xml)?;

        let mut store = RoadStore::new();
        for record in document.roads {
            store.add_road(Road::build(record, &options)?)?;
        }
        let mut network = Self {
            header: document.header,
            store,
            junctions: document.junctions,
        };
        network.relink()?;

        info!(
            roads = network.store.len(),
            junctions = network.junctions.len(),
            name = network.header.name.as_deref().unwrap_or_default(),
            "loaded road network"
        );
        Ok(network)
    }

    /// Reads and parses a network from a file.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`RoadNetwork::parse`].
    pub fn from_file(path: impl AsRef<Path>, options: LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&xml, options)
    }

    /// Rebuilds every road, section and lane link.
    ///
    /// # Errors
    ///
    /// See [`LinkRoads::execute`].
    pub fn relink(&mut self) -> Result<()> {
        LinkRoads::new(&self.junctions).execute(&mut self.store)
    }

    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    #[must_use]
    pub fn geo_reference(&self) -> GeoReference {
        match &self.header.geo_reference {
            Some(definition) if definition.contains("+proj=") => {
                GeoReference::Proj4(definition.clone())
            }
            _ => GeoReference::Flat,
        }
    }

    /// Global offset of the local coordinates; zero when the header has none.
    #[must_use]
    pub fn offset(&self) -> GlobalOffset {
        self.header.offset.unwrap_or_default()
    }

    /// Ids of the roads that connect roads inside any junction.
    #[must_use]
    pub fn connecting_road_ids(&self) -> HashSet<&str> {
        self.junctions
            .iter()
            .flat_map(Junction::connecting_road_ids)
            .collect()
    }

    /// Roads in document order, optionally without junction connecting roads.
    #[must_use]
    pub fn get_roads(&self, include_connecting_roads: bool) -> Vec<&Road> {
        let connecting = if include_connecting_roads {
            HashSet::new()
        } else {
            self.connecting_road_ids()
        };
        self.store
            .iter()
            .map(|(_, road)| road)
            .filter(|road| !connecting.contains(road.id()))
            .collect()
    }

    /// Looks up a road by its document id.
    ///
    /// # Errors
    ///
    /// Returns an error if no road has this id.
    pub fn road(&self, id: &str) -> Result<&Road> {
        Ok(self.store.road_by_id(id)?)
    }

    #[must_use]
    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    #[must_use]
    pub fn store(&self) -> &RoadStore {
        &self.store
    }
}
