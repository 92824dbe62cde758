use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cpq::pricing::cents;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelKey {
    Noah,
    Fedde,
    Dave,
    Jolie,
    Dex,
    Jack,
    Chiel,
    James,
    Sam,
    Duke,
}

impl ModelKey {
    pub const ALL: [ModelKey; 10] = [
        Self::Noah,
        Self::Fedde,
        Self::Dave,
        Self::Jolie,
        Self::Dex,
        Self::Jack,
        Self::Chiel,
        Self::James,
        Self::Sam,
        Self::Duke,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Noah => "NOAH",
            Self::Fedde => "FEDDE",
            Self::Dave => "DAVE",
            Self::Jolie => "JOLIE",
            Self::Dex => "DEX",
            Self::Jack => "JACK",
            Self::Chiel => "CHIEL",
            Self::James => "JAMES",
            Self::Sam => "SAM",
            Self::Duke => "DUKE",
        }
    }

    /// Parses a model name as written on the cabinets sheet (`jack`, ` DUKE `).
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|key| key.as_str() == normalized)
    }

    pub fn family(&self) -> MaterialFamily {
        match self {
            Self::Noah | Self::Fedde | Self::Dave | Self::Jolie | Self::Dex => {
                MaterialFamily::PaintedPanel
            }
            Self::Jack | Self::Chiel | Self::James => MaterialFamily::OakVeneer,
            Self::Sam | Self::Duke => MaterialFamily::WalnutVeneer,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialFamily {
    PaintedPanel,
    OakVeneer,
    WalnutVeneer,
}

impl MaterialFamily {
    /// The flat model whose area price stands in for side panels of this family.
    pub fn flat_variant(&self) -> ModelKey {
        match self {
            Self::PaintedPanel => ModelKey::Noah,
            Self::OakVeneer => ModelKey::Jack,
            Self::WalnutVeneer => ModelKey::Sam,
        }
    }

    pub fn material_name(&self) -> &'static str {
        match self {
            Self::PaintedPanel => "MDF gespoten",
            Self::OakVeneer => "Eikenfineer",
            Self::WalnutVeneer => "Noten fineer",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FrontTemplate {
    pub title: String,
    pub material_text: String,
    pub thickness: String,
    pub finish: String,
    pub double_sided: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    pub key: ModelKey,
    pub material: String,
    pub price_per_front: Decimal,
    pub filler_surcharge: Decimal,
    pub template: FrontTemplate,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("front model `{code}` is not a known model")]
    UnknownFrontModel { code: String },
    #[error("no area price is configured for front model {model}")]
    MissingAreaPrice { model: ModelKey },
}

/// Immutable model tables shared by every pricing rule.
#[derive(Clone, Debug)]
pub struct ModelCatalog {
    descriptors: Vec<ModelDescriptor>,
    selections: BTreeMap<(String, String), ModelKey>,
    area_prices: BTreeMap<ModelKey, Decimal>,
}

struct ModelRow {
    key: ModelKey,
    style_code: &'static str,
    price_per_front: Decimal,
    filler_surcharge: Decimal,
    area_price: Decimal,
    material_text: &'static str,
}

const MODEL_ROWS: [ModelRow; 10] = [
    row(ModelKey::Noah, "K01 - vlak", 9669, 18926, 14500, "MDF Gespoten - vlak"),
    row(ModelKey::Fedde, "K02 - greeploos", 9669, 18926, 15500, "MDF Gespoten - greeploos"),
    row(ModelKey::Dave, "K04 - 70mm kader", 9669, 18926, 17500, "MDF Gespoten - 70mm kader"),
    row(ModelKey::Jolie, "K05 - 25mm kader", 9669, 18926, 17500, "MDF Gespoten - 25mm kader"),
    row(ModelKey::Dex, "K13 - Vgroef", 9669, 18926, 16500, "MDF Gespoten - V-groef"),
    row(ModelKey::Jack, "K01 - vlak", 11322, 20992, 21000, "Eiken fineer - vlak"),
    row(ModelKey::Chiel, "K02 - greeploos", 15100, 20992, 23500, "Eiken fineer - greeploos"),
    row(
        ModelKey::James,
        "K09 - 10mm kader",
        19500,
        20992,
        26000,
        "Eiken fineer - 10mm massief kader",
    ),
    row(ModelKey::Sam, "K01 - vlak", 16900, 24029, 26500, "Noten fineer - vlak"),
    row(ModelKey::Duke, "K02 - greeploos", 18500, 24029, 28500, "Noten fineer - greeploos"),
];

const fn row(
    key: ModelKey,
    style_code: &'static str,
    price_per_front: u32,
    filler_surcharge: u32,
    area_price: u32,
    material_text: &'static str,
) -> ModelRow {
    ModelRow {
        key,
        style_code,
        price_per_front: cents(price_per_front),
        filler_surcharge: cents(filler_surcharge),
        area_price: cents(area_price),
        material_text,
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl ModelCatalog {
    pub fn standard() -> Self {
        let mut descriptors = Vec::with_capacity(MODEL_ROWS.len());
        let mut selections = BTreeMap::new();
        let mut area_prices = BTreeMap::new();

        for row in &MODEL_ROWS {
            let family = row.key.family();
            let (thickness, finish, double_sided) = match family {
                MaterialFamily::PaintedPanel => ("18mm", "Zijdeglans", "Nee, binnenzijde wit"),
                MaterialFamily::OakVeneer | MaterialFamily::WalnutVeneer => {
                    ("19mm", "Monocoat olie", "Ja")
                }
            };

            descriptors.push(ModelDescriptor {
                key: row.key,
                material: family.material_name().to_string(),
                price_per_front: row.price_per_front,
                filler_surcharge: row.filler_surcharge,
                template: FrontTemplate {
                    title: format!("Keukenrenovatie model {}", title_case(row.key.as_str())),
                    material_text: row.material_text.to_string(),
                    thickness: thickness.to_string(),
                    finish: finish.to_string(),
                    double_sided: double_sided.to_string(),
                },
            });
            selections
                .insert((row.style_code.to_string(), family.material_name().to_string()), row.key);
            area_prices.insert(row.key, row.area_price);
        }

        Self { descriptors, selections, area_prices }
    }

    /// Resolves the style/material cell pair to a model. Only surrounding
    /// whitespace is ignored; case must match the mapping table.
    pub fn resolve(&self, style_code: &str, material_code: &str) -> Option<ModelKey> {
        self.selections
            .get(&(style_code.trim().to_string(), material_code.trim().to_string()))
            .copied()
    }

    pub fn describe(&self, key: ModelKey) -> &ModelDescriptor {
        &self.descriptors[key.index()]
    }

    pub fn area_price(&self, key: ModelKey) -> Result<Decimal, CatalogError> {
        self.area_prices.get(&key).copied().ok_or(CatalogError::MissingAreaPrice { model: key })
    }

    pub fn front_model(&self, code: &str) -> Result<ModelKey, CatalogError> {
        ModelKey::from_code(code)
            .ok_or_else(|| CatalogError::UnknownFrontModel { code: code.trim().to_string() })
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.descriptors.iter()
    }

    /// Style/material pairs sorted by style code, for operator listings.
    pub fn selections(&self) -> impl Iterator<Item = (&str, &str, ModelKey)> {
        self.selections
            .iter()
            .map(|((style, material), key)| (style.as_str(), material.as_str(), *key))
    }

    #[cfg(test)]
    pub(crate) fn without_area_price(mut self, key: ModelKey) -> Self {
        self.area_prices.remove(&key);
        self
    }
}

fn title_case(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{CatalogError, MaterialFamily, ModelCatalog, ModelKey};

    #[test]
    fn resolves_trimmed_pairs_without_case_folding() {
        let catalog = ModelCatalog::standard();

        assert_eq!(catalog.resolve("  K01 - vlak ", "MDF gespoten "), Some(ModelKey::Noah));
        assert_eq!(catalog.resolve("K02 - greeploos", "Eikenfineer"), Some(ModelKey::Chiel));
        assert_eq!(catalog.resolve("K09 - 10mm kader", "Eikenfineer"), Some(ModelKey::James));
        assert_eq!(catalog.resolve("k01 - vlak", "MDF gespoten"), None);
        assert_eq!(catalog.resolve("K09 - 10mm kader", "Noten fineer"), None);
    }

    #[test]
    fn describe_covers_every_key_in_table_order() {
        let catalog = ModelCatalog::standard();
        for key in ModelKey::ALL {
            assert_eq!(catalog.describe(key).key, key);
        }

        let noah = catalog.describe(ModelKey::Noah);
        assert_eq!(noah.price_per_front, Decimal::new(9669, 2));
        assert_eq!(noah.filler_surcharge, Decimal::new(18926, 2));
        assert_eq!(noah.material, "MDF gespoten");
        assert_eq!(noah.template.title, "Keukenrenovatie model Noah");
        assert_eq!(noah.template.thickness, "18mm");

        let duke = catalog.describe(ModelKey::Duke);
        assert_eq!(duke.template.double_sided, "Ja");
        assert_eq!(duke.template.material_text, "Noten fineer - greeploos");
    }

    #[test]
    fn every_family_has_a_flat_representative_in_the_same_family() {
        for family in
            [MaterialFamily::PaintedPanel, MaterialFamily::OakVeneer, MaterialFamily::WalnutVeneer]
        {
            assert_eq!(family.flat_variant().family(), family);
        }
        assert_eq!(ModelKey::James.family().flat_variant(), ModelKey::Jack);
    }

    #[test]
    fn front_model_codes_are_case_insensitive_names() {
        let catalog = ModelCatalog::standard();
        assert_eq!(catalog.front_model(" jack "), Ok(ModelKey::Jack));
        assert_eq!(
            catalog.front_model("K01"),
            Err(CatalogError::UnknownFrontModel { code: "K01".to_string() })
        );
    }

    #[test]
    fn missing_area_price_is_reported_not_defaulted() {
        let catalog = ModelCatalog::standard().without_area_price(ModelKey::Dex);
        assert_eq!(
            catalog.area_price(ModelKey::Dex),
            Err(CatalogError::MissingAreaPrice { model: ModelKey::Dex })
        );
        assert_eq!(catalog.area_price(ModelKey::Jack), Ok(Decimal::new(21000, 2)));
    }
}
