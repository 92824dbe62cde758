use serde::{Deserialize, Serialize};

/// Part kinds recognised in the fronts column. Tokens are the Dutch sheet
/// values with their English aliases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    Door,
    DrawerFront,
    CoverPanel,
    Filler,
    Plinth,
    Other,
}

impl PartKind {
    pub fn classify(token: &str) -> Option<Self> {
        let token = token.trim().to_uppercase();
        match token.as_str() {
            "DEUR" | "DOOR" => Some(Self::Door),
            "LADE" | "DRAWER" | "DRAWER-FRONT" | "DRAWER_FRONT" => Some(Self::DrawerFront),
            "BEDEKKINGSPANEEL" | "COVER_PANEL" | "COVER-PANEL" => Some(Self::CoverPanel),
            "PASSTUK" | "FILLER" => Some(Self::Filler),
            "PLINT" | "PLINTH" => Some(Self::Plinth),
            other if other.contains("ANDERS") || other.contains("OTHER") => Some(Self::Other),
            _ => None,
        }
    }

    pub fn is_front(&self) -> bool {
        matches!(self, Self::Door | Self::DrawerFront | Self::CoverPanel)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub lines: Vec<String>,
}

impl CustomerInfo {
    pub const MAX_LINES: usize = 5;

    pub fn new(lines: impl IntoIterator<Item = String>) -> Self {
        Self { lines: lines.into_iter().take(Self::MAX_LINES).collect() }
    }

    /// Line `index`, or an empty placeholder when the sheet left it blank.
    pub fn line(&self, index: usize) -> &str {
        self.lines.get(index).map(String::as_str).unwrap_or("")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontsInput {
    pub parts: Vec<String>,
    pub style_code: String,
    pub material_code: String,
    pub color: String,
    pub customer: CustomerInfo,
    pub hinge_count: u32,
    pub drawer_count: u32,
    pub project: String,
}
