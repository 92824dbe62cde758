use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cpq::catalog::{CatalogError, ModelCatalog, ModelKey};
use crate::cpq::fitout::{parse_fitout, FitOut, FitOutItem};
use crate::cpq::staffel::{self, Staffel, StaffelTable};
use crate::domain::cabinet::{CabinetRecord, CabinetType};

/// Mounting labour on fronts and finished sides.
pub const SURFACE_MARKUP: Decimal = Decimal::from_parts(140, 0, 0, false, 2);
/// Sell price is purchase cost divided by this (60% gross margin).
pub const MARGIN_DIVISOR: Decimal = Decimal::from_parts(4, 0, 0, false, 1);

const SQUARE_MM_PER_M2: u32 = 1_000_000;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CabinetError {
    #[error("cabinet in column {column} is missing {}", .missing.join(", "))]
    MissingDimensions { column: usize, missing: Vec<&'static str> },
    #[error(
        "tall cabinet in column {column} has height {height_mm}mm; \
         supported heights are 1001-2770mm"
    )]
    TallCabinetHeight { column: usize, height_mm: u32 },
    #[error("cabinet in column {column}: {source}")]
    Catalog { column: usize, source: CatalogError },
}

/// Corpus price row, chosen from the cabinet type plus height band or fit-out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorpusRow {
    BaseDrawer,
    BaseShelf,
    BaseOven,
    TallLow,
    TallHigh,
    WallUpTo390,
    Wall391To520,
    Wall521To780,
    WallFrom781,
}

impl CorpusRow {
    pub fn select(
        record: &CabinetRecord,
        height_mm: u32,
        fitout: &FitOut,
    ) -> Result<Self, CabinetError> {
        let row = match record.cabinet_type {
            CabinetType::A if fitout.mentions_drawer() => Self::BaseDrawer,
            CabinetType::A if fitout.mentions_shelf() => Self::BaseShelf,
            CabinetType::A => Self::BaseOven,
            CabinetType::B => match height_mm {
                1001..=2079 => Self::TallLow,
                2080..=2770 => Self::TallHigh,
                _ => {
                    return Err(CabinetError::TallCabinetHeight {
                        column: record.column,
                        height_mm,
                    })
                }
            },
            CabinetType::C => match height_mm {
                0..=390 => Self::WallUpTo390,
                391..=520 => Self::Wall391To520,
                521..=780 => Self::Wall521To780,
                _ => Self::WallFrom781,
            },
        };
        Ok(row)
    }

    pub fn table(&self) -> &'static StaffelTable {
        match self {
            Self::BaseDrawer => &staffel::BASE_DRAWER,
            Self::BaseShelf => &staffel::BASE_SHELF,
            Self::BaseOven => &staffel::BASE_OVEN,
            Self::TallLow => &staffel::TALL_LOW,
            Self::TallHigh => &staffel::TALL_HIGH,
            Self::WallUpTo390 => &staffel::WALL_UP_TO_390,
            Self::Wall391To520 => &staffel::WALL_391_TO_520,
            Self::Wall521To780 => &staffel::WALL_521_TO_780,
            Self::WallFrom781 => &staffel::WALL_FROM_781,
        }
    }

    /// Shelves that come with the corpus at no extra cost.
    pub fn included_shelves(&self) -> u32 {
        match self {
            Self::BaseShelf | Self::Wall521To780 | Self::WallFrom781 => 2,
            Self::Wall391To520 => 1,
            Self::BaseDrawer
            | Self::BaseOven
            | Self::TallLow
            | Self::TallHigh
            | Self::WallUpTo390 => 0,
        }
    }
}

fn fitout_table(item: FitOutItem) -> &'static StaffelTable {
    match item {
        FitOutItem::Shelf => &staffel::SHELF,
        FitOutItem::Drawer => &staffel::DRAWER,
        FitOutItem::PushToOpenDrawer => &staffel::PUSH_TO_OPEN_DRAWER,
        FitOutItem::CutleryTray => &staffel::CUTLERY_TRAY,
        FitOutItem::SinkProtector => &staffel::SINK_PROTECTOR,
        FitOutItem::PharmacyPullOut => &staffel::PHARMACY_PULLOUT,
        FitOutItem::Carousel => &staffel::CAROUSEL,
        FitOutItem::FlapHinge => &staffel::FLAP_HINGE,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CabinetPriceResult {
    pub record: CabinetRecord,
    pub staffel: Staffel,
    pub corpus_row: CorpusRow,
    pub corpus_price: Decimal,
    pub fitout: FitOut,
    pub included_shelves: u32,
    pub priced_shelves: u32,
    pub fitout_cost: Decimal,
    pub hinge_cost: Decimal,
    pub front_model: ModelKey,
    pub front_area_m2: Decimal,
    pub front_area_cost: Decimal,
    pub side_area_m2: Decimal,
    pub side_area_cost: Decimal,
    pub surface_cost: Decimal,
    pub purchase_cost: Decimal,
    pub sell_price_excl_vat: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    MissingDimensions { missing: Vec<&'static str> },
    ZeroCost,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedCabinet {
    pub column: usize,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CabinetPricing {
    pub priced: Vec<CabinetPriceResult>,
    pub skipped: Vec<SkippedCabinet>,
    pub total_sell_excl_vat: Decimal,
}

pub fn price_cabinet(
    catalog: &ModelCatalog,
    record: &CabinetRecord,
) -> Result<CabinetPriceResult, CabinetError> {
    let column = record.column;
    let (height_mm, width_mm, depth_mm) = record.dimensions().ok_or_else(|| {
        CabinetError::MissingDimensions { column, missing: record.missing_dimensions() }
    })?;

    let staffel = Staffel::for_width(width_mm);
    let fitout = parse_fitout(&record.fitout);

    let corpus_row = CorpusRow::select(record, height_mm, &fitout)?;
    let corpus_price = corpus_row.table().price(staffel);

    let included_shelves = corpus_row.included_shelves();
    let priced_shelves = fitout.shelves.saturating_sub(included_shelves);
    let fitout_cost: Decimal = FitOutItem::ALL
        .into_iter()
        .map(|item| {
            let count = match item {
                FitOutItem::Shelf => priced_shelves,
                other => fitout.count(other),
            };
            Decimal::from(count) * fitout_table(item).price(staffel)
        })
        .sum();

    let hinge_cost = Decimal::from(record.hinge_count) * staffel::CABINET_HINGE.price(staffel);

    let catalog_error = |source: CatalogError| CabinetError::Catalog { column, source };
    let front_model = catalog.front_model(&record.front_model).map_err(catalog_error)?;
    let front_area_price = catalog.area_price(front_model).map_err(catalog_error)?;

    let front_area_m2 = area_m2(height_mm, width_mm);
    let front_area_cost = front_area_m2 * front_area_price;

    let sides = record.visible_side.count();
    let (side_area_m2, side_area_cost) = if sides > 0 {
        let flat_model = front_model.family().flat_variant();
        let side_price = catalog.area_price(flat_model).map_err(catalog_error)?;
        let side_area_m2 = area_m2(height_mm, depth_mm) * Decimal::from(sides);
        (side_area_m2, side_area_m2 * side_price)
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    let surface_cost = (front_area_cost + side_area_cost) * SURFACE_MARKUP;
    let purchase_cost = corpus_price + fitout_cost + hinge_cost + surface_cost;
    let sell_price_excl_vat =
        if purchase_cost > Decimal::ZERO { purchase_cost / MARGIN_DIVISOR } else { Decimal::ZERO };

    debug!(
        event_name = "cpq.cabinet.priced",
        column,
        staffel_mm = staffel.width_mm(),
        corpus_row = ?corpus_row,
        purchase_cost = %purchase_cost,
        sell_price = %sell_price_excl_vat,
        "cabinet priced"
    );

    Ok(CabinetPriceResult {
        record: record.clone(),
        staffel,
        corpus_row,
        corpus_price,
        fitout,
        included_shelves,
        priced_shelves,
        fitout_cost,
        hinge_cost,
        front_model,
        front_area_m2,
        front_area_cost,
        side_area_m2,
        side_area_cost,
        surface_cost,
        purchase_cost,
        sell_price_excl_vat,
    })
}

/// Prices every cabinet. Cabinets without dimensions or with a zero cost are
/// left out of the quotation and listed in `skipped`; any other cabinet error
/// fails the whole set.
pub fn price_all(
    catalog: &ModelCatalog,
    records: &[CabinetRecord],
) -> Result<CabinetPricing, CabinetError> {
    let mut pricing = CabinetPricing::default();

    for record in records {
        match price_cabinet(catalog, record) {
            Ok(result) if result.purchase_cost > Decimal::ZERO => {
                pricing.total_sell_excl_vat += result.sell_price_excl_vat;
                pricing.priced.push(result);
            }
            Ok(_) => {
                warn!(
                    event_name = "cpq.cabinet.skipped",
                    column = record.column,
                    reason = "zero_cost",
                    "cabinet has no cost and is left out of the quotation"
                );
                pricing
                    .skipped
                    .push(SkippedCabinet { column: record.column, reason: SkipReason::ZeroCost });
            }
            Err(CabinetError::MissingDimensions { column, missing }) => {
                warn!(
                    event_name = "cpq.cabinet.skipped",
                    column,
                    reason = "missing_dimensions",
                    missing = %missing.join(","),
                    "cabinet is missing dimensions and is left out of the quotation"
                );
                pricing.skipped.push(SkippedCabinet {
                    column,
                    reason: SkipReason::MissingDimensions { missing },
                });
            }
            Err(error) => return Err(error),
        }
    }

    Ok(pricing)
}

fn area_m2(first_mm: u32, second_mm: u32) -> Decimal {
    Decimal::from(first_mm) * Decimal::from(second_mm) / Decimal::from(SQUARE_MM_PER_M2)
}
