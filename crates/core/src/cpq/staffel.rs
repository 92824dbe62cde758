//! Width staffels and the purchase price tables indexed by them.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::cpq::pricing::cents;

pub const STAFFELS_MM: [u32; 8] = [300, 400, 500, 600, 800, 900, 1000, 1200];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Staffel {
    index: usize,
}

impl Staffel {
    /// Rounds a width up to the next staffel. Widths above the largest
    /// staffel use the largest.
    pub fn for_width(width_mm: u32) -> Self {
        let index = STAFFELS_MM
            .iter()
            .position(|staffel| *staffel >= width_mm)
            .unwrap_or(STAFFELS_MM.len() - 1);
        Self { index }
    }

    pub fn width_mm(&self) -> u32 {
        STAFFELS_MM[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl Serialize for Staffel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.width_mm())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaffelTable([Decimal; STAFFELS_MM.len()]);

impl StaffelTable {
    pub fn price(&self, staffel: Staffel) -> Decimal {
        self.0[staffel.index]
    }
}

const fn table(amounts: [u32; STAFFELS_MM.len()]) -> StaffelTable {
    let mut prices = [Decimal::ZERO; STAFFELS_MM.len()];
    let mut index = 0;
    while index < amounts.len() {
        prices[index] = cents(amounts[index]);
        index += 1;
    }
    StaffelTable(prices)
}

const fn flat(amount: u32) -> StaffelTable {
    StaffelTable([cents(amount); STAFFELS_MM.len()])
}

// Corpus rows, purchase prices in cents.
pub const BASE_DRAWER: StaffelTable =
    table([14200, 15600, 17100, 18500, 21400, 22900, 24300, 27200]);
pub const BASE_SHELF: StaffelTable =
    table([9800, 10800, 11800, 12800, 14900, 15900, 16900, 19000]);
pub const BASE_OVEN: StaffelTable = table([8800, 9700, 10600, 11500, 13400, 14300, 15200, 17000]);
pub const TALL_LOW: StaffelTable =
    table([19600, 21600, 23600, 25600, 29700, 31700, 33700, 37800]);
pub const TALL_HIGH: StaffelTable =
    table([23800, 26200, 28700, 31100, 36000, 38500, 40900, 45800]);
pub const WALL_UP_TO_390: StaffelTable = table([6200, 6800, 7500, 8100, 9400, 10000, 10700, 12000]);
pub const WALL_391_TO_520: StaffelTable =
    table([7400, 8200, 8900, 9700, 11200, 12000, 12700, 14200]);
pub const WALL_521_TO_780: StaffelTable =
    table([9200, 10100, 11100, 12000, 13900, 14900, 15800, 17700]);
pub const WALL_FROM_781: StaffelTable =
    table([10400, 11500, 12500, 13600, 15800, 16800, 17900, 20000]);

// Fit-out and hardware. Only shelves vary with the staffel.
pub const SHELF: StaffelTable = table([1150, 1300, 1450, 1600, 1950, 2100, 2250, 2600]);
pub const DRAWER: StaffelTable = flat(5800);
pub const PUSH_TO_OPEN_DRAWER: StaffelTable = flat(7150);
pub const CUTLERY_TRAY: StaffelTable = flat(3400);
pub const SINK_PROTECTOR: StaffelTable = flat(2750);
pub const PHARMACY_PULLOUT: StaffelTable = flat(24500);
pub const CAROUSEL: StaffelTable = flat(18600);
pub const FLAP_HINGE: StaffelTable = flat(4200);
pub const CABINET_HINGE: StaffelTable = flat(425);
