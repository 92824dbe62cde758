//! Extracted workbook tables and conversion into pricing inputs.
//!
//! Spreadsheet parsing happens upstream. This module consumes the extracted
//! logical tables as JSON: a fronts table and an optional cabinets table with
//! one object per sheet column. Cells may hold numbers, text or booleans;
//! blank cells are `null` or absent.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::cabinet::{CabinetRecord, CabinetType, VisibleSide};
use crate::domain::fronts::{CustomerInfo, FrontsInput};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn text(&self) -> String {
        match self {
            Self::Bool(value) => value.to_string(),
            Self::Number(value) if value.fract() == 0.0 => format!("{value:.0}"),
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value.trim().to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(value) if value.trim().is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontsSheet {
    pub parts: Vec<Option<Cell>>,
    pub style_code: Option<Cell>,
    pub material_code: Option<Cell>,
    pub color: Option<Cell>,
    pub customer: Vec<Option<Cell>>,
    pub hinges: Option<Cell>,
    pub drawers: Option<Cell>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CabinetColumn {
    #[serde(rename = "type")]
    pub cabinet_type: Option<Cell>,
    pub height: Option<Cell>,
    pub width: Option<Cell>,
    pub depth: Option<Cell>,
    pub leg_height: Option<Cell>,
    pub visible_side: Option<Cell>,
    pub fitout: Option<Cell>,
    pub hinges: Option<Cell>,
    pub front_model: Option<Cell>,
    pub fronts: Option<Cell>,
    pub corpus_color: Option<Cell>,
    pub double_sided: Option<Cell>,
    pub handle: Option<Cell>,
    pub finish: Option<Cell>,
}

impl CabinetColumn {
    fn cells(&self) -> [&Option<Cell>; 14] {
        [
            &self.cabinet_type,
            &self.height,
            &self.width,
            &self.depth,
            &self.leg_height,
            &self.visible_side,
            &self.fitout,
            &self.hinges,
            &self.front_model,
            &self.fronts,
            &self.corpus_color,
            &self.double_sided,
            &self.handle,
            &self.finish,
        ]
    }

    /// A column without a single filled cell is not a cabinet.
    pub fn is_empty(&self) -> bool {
        self.cells().into_iter().all(|cell| cell.as_ref().map_or(true, Cell::is_blank))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CabinetsSheet {
    pub columns: Vec<CabinetColumn>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedWorkbook {
    #[serde(default)]
    pub project: Option<String>,
    pub fronts: FrontsSheet,
    #[serde(default)]
    pub cabinets: Option<CabinetsSheet>,
}

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("failed to read workbook {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse workbook {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{field} has an invalid value `{value}`{}", column_suffix(.column))]
    InvalidCell { field: &'static str, column: Option<usize>, value: String },
}

fn column_suffix(column: &Option<usize>) -> String {
    column.map(|column| format!(" in cabinet column {column}")).unwrap_or_default()
}

/// Source of extracted workbooks. File formats other than the JSON tables
/// plug in here.
pub trait SheetReader {
    fn read(&self, path: &Path) -> Result<ExtractedWorkbook, SheetError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSheetReader;

impl SheetReader for JsonSheetReader {
    fn read(&self, path: &Path) -> Result<ExtractedWorkbook, SheetError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| SheetError::Read { path: path.to_path_buf(), source })?;
        let mut workbook: ExtractedWorkbook = serde_json::from_str(&raw)
            .map_err(|source| SheetError::Parse { path: path.to_path_buf(), source })?;

        let has_project = workbook.project.as_deref().is_some_and(|name| !name.trim().is_empty());
        if !has_project {
            workbook.project = path.file_stem().map(|stem| stem.to_string_lossy().into_owned());
        }
        Ok(workbook)
    }
}

impl ExtractedWorkbook {
    pub fn fronts_input(&self) -> Result<FrontsInput, SheetError> {
        let sheet = &self.fronts;
        let parts = sheet
            .parts
            .iter()
            .filter_map(|cell| text(cell))
            .map(|part| part.to_uppercase())
            .collect();
        let customer = CustomerInfo::new(
            sheet
                .customer
                .iter()
                .take(CustomerInfo::MAX_LINES)
                .map(|cell| text(cell).unwrap_or_default()),
        );

        Ok(FrontsInput {
            parts,
            style_code: text(&sheet.style_code).unwrap_or_default(),
            material_code: text(&sheet.material_code).unwrap_or_default(),
            color: text(&sheet.color).unwrap_or_default(),
            customer,
            hinge_count: count(&sheet.hinges, "hinges", None)?.unwrap_or(0),
            drawer_count: count(&sheet.drawers, "drawers", None)?.unwrap_or(0),
            project: self.project.clone().unwrap_or_default(),
        })
    }

    /// Populated cabinet columns in sheet order. Empty columns are dropped
    /// but keep their position in the numbering.
    pub fn cabinet_records(&self) -> Result<Vec<CabinetRecord>, SheetError> {
        let Some(sheet) = &self.cabinets else {
            return Ok(Vec::new());
        };

        sheet
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| !column.is_empty())
            .map(|(index, column)| cabinet_record(index + 1, column))
            .collect()
    }
}

fn cabinet_record(position: usize, column: &CabinetColumn) -> Result<CabinetRecord, SheetError> {
    let at = Some(position);
    let raw_type = text(&column.cabinet_type).unwrap_or_default();
    let cabinet_type = CabinetType::parse(&raw_type).ok_or(SheetError::InvalidCell {
        field: "type",
        column: at,
        value: raw_type,
    })?;

    let mut record = CabinetRecord::new(position, cabinet_type);
    record.height_mm = count(&column.height, "height", at)?;
    record.width_mm = count(&column.width, "width", at)?;
    record.depth_mm = count(&column.depth, "depth", at)?;
    record.leg_height_mm = count(&column.leg_height, "leg_height", at)?;
    record.visible_side = match text(&column.visible_side) {
        None => VisibleSide::None,
        Some(side) => VisibleSide::parse(&side).ok_or(SheetError::InvalidCell {
            field: "visible_side",
            column: at,
            value: side,
        })?,
    };
    record.fitout = text(&column.fitout).unwrap_or_default();
    record.hinge_count = count(&column.hinges, "hinges", at)?.unwrap_or(0);
    record.front_model = text(&column.front_model).unwrap_or_default();
    record.front_count = count(&column.fronts, "fronts", at)?.unwrap_or(0);
    record.corpus_color = text(&column.corpus_color).unwrap_or_default();
    record.double_sided = text(&column.double_sided).is_some_and(|value| is_yes(&value));
    record.handle = text(&column.handle).unwrap_or_default();
    record.finish = text(&column.finish).unwrap_or_default();
    Ok(record)
}

fn text(cell: &Option<Cell>) -> Option<String> {
    cell.as_ref().map(Cell::text).filter(|value| !value.is_empty())
}

/// Whole non-negative counts and millimetres. `12`, `12.0` and `" 12 "` are
/// accepted; blanks are `None`.
fn count(
    cell: &Option<Cell>,
    field: &'static str,
    column: Option<usize>,
) -> Result<Option<u32>, SheetError> {
    let invalid = |value: String| SheetError::InvalidCell { field, column, value };

    match cell {
        None => Ok(None),
        Some(Cell::Bool(value)) => Err(invalid(value.to_string())),
        Some(Cell::Number(value)) => {
            if value.fract() == 0.0 && *value >= 0.0 && *value <= f64::from(u32::MAX) {
                Ok(Some(*value as u32))
            } else {
                Err(invalid(value.to_string()))
            }
        }
        Some(Cell::Text(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            let trimmed = trimmed.strip_suffix(".0").unwrap_or(trimmed);
            trimmed.parse::<u32>().map(Some).map_err(|_| invalid(raw.clone()))
        }
    }
}

fn is_yes(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "ja" | "j" | "yes" | "y" | "true" | "1" | "x")
}
