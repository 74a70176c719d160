keyword_enum! {
    /// Direction of traffic a signal applies to, relative to the reference line.
    #[derive(Default)]
    pub enum Orientation {
        /// Valid for traffic along increasing `s`.
        Plus => "+",
        /// Valid for traffic along decreasing `s`.
        Minus => "-",
        /// Valid in both directions.
        #[default]
        None => "none",
    }
}

keyword_enum! {
    /// Unit of a signal value.
    pub enum Unit {
        Foot => "ft",
        Kilometer => "km",
        Meter => "m",
        Mile => "mile",
        KilometersPerHour => "km/h",
        MetersPerSecond => "m/s",
        MilesPerHour => "mph",
        Kilogram => "kg",
        Ton => "t",
        Percent => "%",
    }
}

/// A sign or traffic light placed along a road.
///
/// Position is given in road coordinates; see
/// [`Road::signal_anchor`](super::Road::signal_anchor) for the planar point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signal {
    pub id: String,
    pub name: Option<String>,
    /// Distance along the reference line.
    pub s: f64,
    /// Lateral distance from the reference line, positive to the left.
    pub t: f64,
    pub z_offset: f64,
    pub h_offset: Option<f64>,
    pub pitch: Option<f64>,
    pub roll: Option<f64>,
    pub orientation: Orientation,
    pub dynamic: bool,
    pub country: Option<String>,
    pub country_revision: Option<String>,
    /// Signal type code; `"none"` when absent.
    pub kind: String,
    pub subtype: String,
    pub value: Option<f64>,
    pub unit: Option<Unit>,
    pub text: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub length: Option<f64>,
}
