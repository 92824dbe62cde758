use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CabinetType {
    /// Base cabinet up to 1000mm.
    A,
    /// Tall cabinet.
    B,
    /// Wall cabinet.
    C,
}

impl CabinetType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::A => "Onderkast",
            Self::B => "Hoge kast",
            Self::C => "Bovenkast",
        }
    }
}

impl fmt::Display for CabinetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        };
        f.write_str(tag)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibleSide {
    #[default]
    None,
    Left,
    Right,
    Both,
}

impl VisibleSide {
    /// Accepts the sheet's Dutch values (`links`, `rechterzijde`, `beide`,
    /// `l+r`, `geen`) and the English ones. Spaces are ignored. Returns
    /// `None` for a value that names no side.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String =
            raw.chars().filter(|ch| !ch.is_whitespace()).collect::<String>().to_lowercase();
        let side = match normalized.as_str() {
            "" | "geen" | "nee" | "none" | "-" => Self::None,
            "links" | "linkerzijde" | "left" | "l" => Self::Left,
            "rechts" | "rechterzijde" | "right" | "r" => Self::Right,
            "beide" | "beiden" | "both" | "linksenrechts" | "links+rechts" | "links/rechts"
            | "l+r" | "l/r" | "lr" => Self::Both,
            _ => return None,
        };
        Some(side)
    }

    pub fn count(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Left | Self::Right => 1,
            Self::Both => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "Geen",
            Self::Left => "Links",
            Self::Right => "Rechts",
            Self::Both => "Links en rechts",
        }
    }
}

/// One populated column of the custom cabinets sheet. Dimensions are in
/// millimetres; `None` means the cell was blank.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinetRecord {
    /// 1-based column position on the sheet.
    pub column: usize,
    pub cabinet_type: CabinetType,
    pub height_mm: Option<u32>,
    pub width_mm: Option<u32>,
    pub depth_mm: Option<u32>,
    pub leg_height_mm: Option<u32>,
    pub visible_side: VisibleSide,
    pub fitout: String,
    pub hinge_count: u32,
    pub front_model: String,
    pub front_count: u32,
    pub corpus_color: String,
    pub double_sided: bool,
    pub handle: String,
    pub finish: String,
}

impl CabinetRecord {
    pub fn new(column: usize, cabinet_type: CabinetType) -> Self {
        Self {
            column,
            cabinet_type,
            height_mm: None,
            width_mm: None,
            depth_mm: None,
            leg_height_mm: None,
            visible_side: VisibleSide::None,
            fitout: String::new(),
            hinge_count: 0,
            front_model: String::new(),
            front_count: 0,
            corpus_color: String::new(),
            double_sided: false,
            handle: String::new(),
            finish: String::new(),
        }
    }

    /// Height, width and depth when all three are present and non-zero.
    pub fn dimensions(&self) -> Option<(u32, u32, u32)> {
        let positive = |value: Option<u32>| value.filter(|mm| *mm > 0);
        Some((positive(self.height_mm)?, positive(self.width_mm)?, positive(self.depth_mm)?))
    }

    pub fn missing_dimensions(&self) -> Vec<&'static str> {
        [("height", self.height_mm), ("width", self.width_mm), ("depth", self.depth_mm)]
            .into_iter()
            .filter(|(_, value)| value.unwrap_or(0) == 0)
            .map(|(name, _)| name)
            .collect()
    }
}
