//! Fit-out (inrichting) text parsing.
//!
//! The cabinets sheet describes interior accessories as free text such as
//! `2x plank, 1x apothekerskast` or `3 lades + bestekbak`. The text is split
//! into items on `,` `;` `+` `/`, line breaks and the word `en`. Each item may
//! start with a quantity (`2x`, `2 x` or `2`); without one the quantity is 1.
//! The first keyword that matches an item decides what it is, checked in the
//! order of [`FitOutItem::ALL`]. Whether the text mentions a drawer or a
//! shelf at all is tracked apart from the counts, so `bestekbak in lade`
//! still marks a drawer cabinet.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitOutItem {
    PharmacyPullOut,
    Carousel,
    SinkProtector,
    CutleryTray,
    FlapHinge,
    PushToOpenDrawer,
    Drawer,
    Shelf,
}

impl FitOutItem {
    /// Keyword match order. More specific items come first so that
    /// `besteklade` is a cutlery tray and `tip-on lade` is not a plain drawer.
    pub const ALL: [FitOutItem; 8] = [
        Self::PharmacyPullOut,
        Self::Carousel,
        Self::SinkProtector,
        Self::CutleryTray,
        Self::FlapHinge,
        Self::PushToOpenDrawer,
        Self::Drawer,
        Self::Shelf,
    ];

    fn matches(&self, text: &str) -> bool {
        match self {
            Self::PharmacyPullOut => text.contains("apotheker"),
            Self::Carousel => text.contains("carrousel") || text.contains("carousel"),
            Self::SinkProtector => text.contains("spoel"),
            Self::CutleryTray => text.contains("bestek"),
            Self::FlapHinge => text.contains("klep"),
            Self::PushToOpenDrawer => {
                text.contains("lade")
                    && (text.contains("push") || text.contains("tip-on") || text.contains("tipon"))
            }
            Self::Drawer => text.contains("lade"),
            Self::Shelf => text.contains("plank"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PharmacyPullOut => "Apothekerskast",
            Self::Carousel => "Carrousel",
            Self::SinkProtector => "Spoelkastbeschermer",
            Self::CutleryTray => "Bestekbak",
            Self::FlapHinge => "Klepscharnier",
            Self::PushToOpenDrawer => "Lade push-to-open",
            Self::Drawer => "Lade",
            Self::Shelf => "Legplank",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitOut {
    pub shelves: u32,
    pub drawers: u32,
    pub push_to_open_drawers: u32,
    pub cutlery_trays: u32,
    pub sink_protectors: u32,
    pub pharmacy_pullouts: u32,
    pub carousels: u32,
    pub flap_hinges: u32,
    pub unrecognized: Vec<String>,
    pub drawer_mentioned: bool,
    pub shelf_mentioned: bool,
}

impl FitOut {
    pub fn count(&self, item: FitOutItem) -> u32 {
        match item {
            FitOutItem::Shelf => self.shelves,
            FitOutItem::Drawer => self.drawers,
            FitOutItem::PushToOpenDrawer => self.push_to_open_drawers,
            FitOutItem::CutleryTray => self.cutlery_trays,
            FitOutItem::SinkProtector => self.sink_protectors,
            FitOutItem::PharmacyPullOut => self.pharmacy_pullouts,
            FitOutItem::Carousel => self.carousels,
            FitOutItem::FlapHinge => self.flap_hinges,
        }
    }

    fn add(&mut self, item: FitOutItem, quantity: u32) {
        let slot = match item {
            FitOutItem::Shelf => &mut self.shelves,
            FitOutItem::Drawer => &mut self.drawers,
            FitOutItem::PushToOpenDrawer => &mut self.push_to_open_drawers,
            FitOutItem::CutleryTray => &mut self.cutlery_trays,
            FitOutItem::SinkProtector => &mut self.sink_protectors,
            FitOutItem::PharmacyPullOut => &mut self.pharmacy_pullouts,
            FitOutItem::Carousel => &mut self.carousels,
            FitOutItem::FlapHinge => &mut self.flap_hinges,
        };
        *slot = slot.saturating_add(quantity);
    }

    pub fn mentions_drawer(&self) -> bool {
        self.drawer_mentioned
    }

    pub fn mentions_shelf(&self) -> bool {
        self.shelf_mentioned
    }

    /// Non-zero items in match order, for descriptions.
    pub fn items(&self) -> impl Iterator<Item = (FitOutItem, u32)> + '_ {
        FitOutItem::ALL
            .into_iter()
            .map(|item| (item, self.count(item)))
            .filter(|(_, count)| *count > 0)
    }
}

pub fn parse_fitout(text: &str) -> FitOut {
    let mut fitout = FitOut::default();

    for item in split_items(text) {
        let (quantity, rest) = split_quantity(&item);
        let lowered = rest.to_lowercase();
        fitout.drawer_mentioned |= lowered.contains("lade");
        fitout.shelf_mentioned |= lowered.contains("plank");
        match FitOutItem::ALL.into_iter().find(|candidate| candidate.matches(&lowered)) {
            Some(kind) => fitout.add(kind, quantity),
            None => fitout.unrecognized.push(item),
        }
    }

    fitout
}

fn split_items(text: &str) -> Vec<String> {
    let mut items = Vec::new();

    for chunk in text.split([',', ';', '+', '/', '\n', '\r']) {
        let mut current: Vec<&str> = Vec::new();
        for word in chunk.split_whitespace() {
            if word.eq_ignore_ascii_case("en") {
                push_item(&mut items, &current);
                current.clear();
            } else {
                current.push(word);
            }
        }
        push_item(&mut items, &current);
    }

    items
}

fn push_item(items: &mut Vec<String>, words: &[&str]) {
    if !words.is_empty() {
        items.push(words.join(" "));
    }
}

fn split_quantity(item: &str) -> (u32, &str) {
    let digits_end = item.find(|ch: char| !ch.is_ascii_digit()).unwrap_or(item.len());
    if digits_end == 0 {
        return (1, item);
    }

    let quantity = item[..digits_end].parse::<u32>().unwrap_or(u32::MAX);
    let rest = item[digits_end..].trim_start();
    let rest = rest.strip_prefix(|ch: char| matches!(ch, 'x' | 'X' | '×')).unwrap_or(rest);
    (quantity, rest.trim_start())
}
