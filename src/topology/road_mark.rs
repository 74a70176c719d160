keyword_enum! {
    /// Color of a road mark.
    #[derive(Default)]
    pub enum RoadMarkColor {
        /// No color given.
        #[default]
        Invalid => "invalid",
        Black => "black",
        Blue => "blue",
        Green => "green",
        Orange => "orange",
        Red => "red",
        Standard => "standard",
        White => "white",
        Violet => "violet",
        Yellow => "yellow",
    }
}

keyword_enum! {
    /// Line pattern of a road mark.
    #[derive(Default)]
    pub enum RoadMarkType {
        /// No type given.
        #[default]
        Invalid => "invalid",
        BottsDots => "botts dots",
        BrokenBroken => "broken broken",
        BrokenSolid => "broken solid",
        Broken => "broken",
        Curb => "curb",
        Custom => "custom",
        Edge => "edge",
        Grass => "grass",
        None => "none",
        SolidBroken => "solid broken",
        SolidSolid => "solid solid",
        Solid => "solid",
    }
}

keyword_enum! {
    /// Stroke weight of a road mark.
    pub enum RoadMarkWeight {
        Standard => "standard",
        Bold => "bold",
    }
}

keyword_enum! {
    /// Lane changes allowed across a road mark.
    pub enum LaneChange {
        Invalid => "invalid",
        Both => "both",
        Decrease => "decrease",
        Increase => "increase",
        None => "none",
    }
}

/// A marking painted along the far boundary of a lane, starting at `s_offset`
/// from the start of its lane section and running until the next mark.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoadMark {
    /// Start of the mark relative to the lane section start.
    pub s_offset: f64,
    /// Line pattern.
    pub kind: RoadMarkType,
    /// Color.
    pub color: RoadMarkColor,
    /// Stroke weight, if given.
    pub weight: Option<RoadMarkWeight>,
    /// Line width in meters, if given.
    pub width: Option<f64>,
    /// Surface material, if given.
    pub material: Option<String>,
    /// Permitted lane changes, if given.
    pub lane_change: Option<LaneChange>,
    /// Height above the road surface, `0.0` when absent.
    pub height: f64,
}

/// Orders road marks by `s_offset`, keeping document order for ties.
pub fn sort_by_offset(marks: &mut [RoadMark]) {
    marks.sort_by(|a, b| a.s_offset.total_cmp(&b.s_offset));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mark(s_offset: f64, kind: RoadMarkType) -> RoadMark {
        RoadMark {
            s_offset,
            kind,
            ..RoadMark::default()
        }
    }

    #[test]
    fn sorts_ascending_by_offset() {
        let mut marks = vec![
            mark(2.0, RoadMarkType::Solid),
            mark(0.0, RoadMarkType::Broken),
            mark(5.0, RoadMarkType::Curb),
        ];
        sort_by_offset(&mut marks);
        let offsets: Vec<f64> = marks.iter().map(|m| m.s_offset).collect();
        assert_eq!(offsets, vec![0.0, 2.0, 5.0]);
    }

    #[test]
    fn ties_keep_document_order() {
        let mut marks = vec![mark(1.0, RoadMarkType::Solid), mark(1.0, RoadMarkType::Broken)];
        sort_by_offset(&mut marks);
        assert_eq!(marks[0].kind, RoadMarkType::Solid);
    }

    #[test]
    fn keywords_round_trip_through_text() {
        assert_eq!("botts dots".parse::<RoadMarkType>().unwrap(), RoadMarkType::BottsDots);
        assert_eq!(RoadMarkColor::Yellow.to_string(), "yellow");
        assert!("purple".parse::<RoadMarkColor>().is_err());
    }
}
