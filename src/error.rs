use thiserror::Error;

/// Top-level error type for the odrkit road network engine.
#[derive(Debug, Error)]
pub enum OdrError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("samples must be sorted ascending from zero, got {0:?}")]
    UnsortedSamples(Vec<f64>),

    #[error("failed to solve initial value problem: {0}")]
    SolveFailed(String),

    #[error("geometry is only defined parametrically")]
    ParametricOnly,

    #[error("path lengths do not match: {expected} vs {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Errors related to the road / lane connectivity model.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("road {road} declares more than one {kind}")]
    MultipleLinks { road: String, kind: &'static str },

    #[error("lane {lane} uses an unsupported representation: {reason}")]
    UnsupportedLaneRepresentation { lane: String, reason: &'static str },

    #[error("expected {lane} to connect to the {expected} of {target}")]
    ContactPointMismatch {
        lane: String,
        target: String,
        expected: &'static str,
    },

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors raised while reading the road network document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("missing required element: {element} in {context}")]
    MissingElement {
        element: &'static str,
        context: String,
    },

    #[error("missing required attribute: {attribute} on {element}")]
    MissingAttribute {
        attribute: &'static str,
        element: String,
    },

    #[error("invalid value for {attribute} on {element}: {message}")]
    InvalidAttribute {
        attribute: &'static str,
        element: String,
        message: String,
    },

    #[error("unrecognized geometry variant in road {0}")]
    UnknownGeometry(String),
}

/// A keyword attribute held a value outside its enumeration.
#[derive(Debug, Error)]
#[error("unrecognized value {0:?}")]
pub struct UnknownVariant(pub String);

/// Convenience type alias for results using [`OdrError`].
pub type Result<T, E = OdrError> = std::result::Result<T, E>;
