//! Renders priced fronts and cabinets into CRM quotation sections.

use rust_decimal::Decimal;

use crate::cpq::cabinets::CabinetPriceResult;
use crate::cpq::catalog::ModelCatalog;
use crate::cpq::fronts::FrontPriceResult;
use crate::cpq::pricing::{
    DRAWER_UNIT_PRICE, FREIGHT_FEE, HINGE_UNIT_PRICE, INSPECTION_FEE, MONTAGE_PER_FRONT,
};
use crate::domain::fronts::CustomerInfo;
use crate::domain::quotation::{
    LineItem, QuotationMode, QuotationPayload, Section, CURRENCY_CODE, LINE_BREAK,
};

pub const SECTION_CUSTOMER: &str = "KLANTGEGEVENS";
pub const SECTION_RENOVATION: &str = "KEUKENRENOVATIE";
pub const SECTION_ACCESSORIES: &str = "ACCESSOIRES";
pub const SECTION_CABINETS: &str = "MAATWERK KASTEN";
pub const SECTION_INSTALLATION: &str = "INMETEN, LEVEREN & MONTEREN";

const CUSTOMER_LABELS: [&str; CustomerInfo::MAX_LINES] =
    ["Naam", "Adres", "Postcode / woonplaats", "Tel", "Email"];

#[derive(Clone, Copy, Debug)]
pub struct ComposeInput<'a> {
    pub fronts: &'a FrontPriceResult,
    pub cabinets: &'a [CabinetPriceResult],
    pub mode: QuotationMode,
    pub customer: &'a CustomerInfo,
    pub color: &'a str,
}

/// Builds the ordered section list for one quotation. The output depends only
/// on the input, so the same request always renders the same payload.
pub fn compose(catalog: &ModelCatalog, input: ComposeInput<'_>) -> QuotationPayload {
    let mut sections = vec![customer_section(input.customer)];

    match input.mode {
        QuotationMode::Consumer => {
            sections.push(Section::new(
                SECTION_RENOVATION,
                vec![consumer_renovation_line(catalog, &input)],
            ));
            push_cabinets(&mut sections, catalog, input.cabinets);
        }
        QuotationMode::Dealer => {
            let renovation = dealer_renovation_lines(catalog, &input);
            if !renovation.is_empty() {
                sections.push(Section::new(SECTION_RENOVATION, renovation));
            }
            let accessories = accessory_lines(input.fronts);
            if !accessories.is_empty() {
                sections.push(Section::new(SECTION_ACCESSORIES, accessories));
            }
            push_cabinets(&mut sections, catalog, input.cabinets);
            sections.push(Section::new(SECTION_INSTALLATION, installation_lines(input.fronts)));
        }
    }

    QuotationPayload { mode: input.mode, currency: CURRENCY_CODE.to_string(), sections }
}

fn customer_section(customer: &CustomerInfo) -> Section {
    let text = CUSTOMER_LABELS
        .iter()
        .enumerate()
        .map(|(index, label)| format!("{label}: {}", customer.line(index)))
        .collect::<Vec<_>>()
        .join(LINE_BREAK);

    let item = LineItem::new(1, "Klantgegevens", &[text], Decimal::ZERO);
    Section::new(SECTION_CUSTOMER, vec![item])
}

fn front_spec_lines(
    catalog: &ModelCatalog,
    input: &ComposeInput<'_>,
    count: String,
) -> Vec<String> {
    let template = &catalog.describe(input.fronts.model).template;
    vec![
        count,
        format!("Materiaal: {}", template.material_text),
        format!("Frontdikte: {}", template.thickness),
        format!("Kleur: {}", input.color.trim()),
        format!("Afwerking: {}", template.finish),
        format!("Dubbelzijdig in kleur afwerken: {}", template.double_sided),
        "Inmeten: Ja".to_string(),
        "Montage: Ja".to_string(),
    ]
}

fn consumer_renovation_line(catalog: &ModelCatalog, input: &ComposeInput<'_>) -> LineItem {
    let fronts = input.fronts;

    let mut inclusions = Vec::new();
    if fronts.has_filler {
        inclusions.push("inclusief passtukken en/of plinten");
    }
    if fronts.has_other {
        inclusions.push("inclusief licht- en/of sierlijsten");
    }
    let extra = if inclusions.is_empty() {
        String::new()
    } else {
        format!(" ({})", inclusions.join(", "))
    };

    let count = format!("Aantal fronten: {} fronten{extra}", fronts.front_count);
    let mut lines = front_spec_lines(catalog, input, count);
    lines.extend(
        [
            "Handgrepen: Te bepalen",
            "",
            "Prijs is inclusief:",
            "- Demontage oude fronten & materialen",
            "- Inmeten, leveren en montage van de fronten",
        ]
        .map(String::from),
    );
    if fronts.has_filler {
        lines.push("- Montage van passtukken en/of plinten".to_string());
    }
    if fronts.has_other {
        lines.push("- Montage van licht- en/of sierlijsten".to_string());
    }
    lines.push("- Afvoeren van oude fronten".to_string());
    if fronts.hinge_count > 0 {
        lines.push(format!("- Inclusief vervangen scharnieren ({} stuks)", fronts.hinge_count));
    }
    if fronts.drawer_count > 0 {
        lines.push(format!("- Inclusief plaatsen maatwerk lades ({} stuks)", fronts.drawer_count));
    }

    LineItem::new(
        1,
        format!("Keukenrenovatie model {}", fronts.model),
        &lines,
        fronts.subtotal_excl_vat,
    )
}

fn dealer_renovation_lines(catalog: &ModelCatalog, input: &ComposeInput<'_>) -> Vec<LineItem> {
    let fronts = input.fronts;
    let descriptor = catalog.describe(fronts.model);
    let mut items = Vec::new();

    // A CRM line needs a positive quantity, so a quotation without fronts
    // carries only its surcharges.
    if fronts.front_count > 0 {
        let count = format!("Aantal fronten: {}", fronts.front_count);
        let mut lines = front_spec_lines(catalog, input, count);
        lines.push(String::new());
        lines.push("Fronten worden geleverd zonder scharnieren".to_string());
        items.push(LineItem::new(
            fronts.front_count,
            descriptor.template.title.clone(),
            &lines,
            fronts.price_per_front,
        ));
    }

    let included = ["inclusief montage".to_string()];
    if fronts.filler_surcharge > Decimal::ZERO {
        items.push(LineItem::new(
            1,
            "Plinten en/of passtukken",
            &included,
            fronts.filler_surcharge,
        ));
    }
    if fronts.other_surcharge > Decimal::ZERO {
        items.push(LineItem::new(1, "Licht- en/of sierlijsten", &included, fronts.other_surcharge));
    }

    items
}

fn accessory_lines(fronts: &FrontPriceResult) -> Vec<LineItem> {
    let mut items = Vec::new();
    if fronts.hinge_count > 0 {
        items.push(LineItem::new(
            fronts.hinge_count,
            "Scharnieren - Softclose",
            &["Prijs per stuk".to_string()],
            HINGE_UNIT_PRICE,
        ));
    }
    if fronts.drawer_count > 0 {
        items.push(LineItem::new(
            fronts.drawer_count,
            "Maatwerk lades - Softclose",
            &["Prijs per stuk (incl. montage)".to_string()],
            DRAWER_UNIT_PRICE,
        ));
    }
    items
}

fn installation_lines(fronts: &FrontPriceResult) -> Vec<LineItem> {
    let mut items =
        vec![LineItem::new(1, "Inmeten", &["Inmeten op locatie".to_string()], INSPECTION_FEE)];
    if fronts.front_count > 0 {
        items.push(LineItem::new(
            fronts.front_count,
            "Montage per front",
            &["Inclusief demontage oude fronten & afvoeren".to_string()],
            MONTAGE_PER_FRONT,
        ));
    }
    items.push(LineItem::new(
        1,
        "Vracht- & verpakkingskosten",
        &["Levering op locatie".to_string()],
        FREIGHT_FEE,
    ));
    items
}

fn push_cabinets(
    sections: &mut Vec<Section>,
    catalog: &ModelCatalog,
    cabinets: &[CabinetPriceResult],
) {
    if cabinets.is_empty() {
        return;
    }
    let items = cabinets.iter().map(|cabinet| cabinet_line(catalog, cabinet)).collect();
    sections.push(Section::new(SECTION_CABINETS, items));
}

fn cabinet_line(catalog: &ModelCatalog, cabinet: &CabinetPriceResult) -> LineItem {
    let record = &cabinet.record;
    let (height, width, depth) = record.dimensions().unwrap_or_default();
    let front = catalog.describe(cabinet.front_model);

    let mut lines = vec![
        format!("Type: {} - {}", record.cabinet_type, record.cabinet_type.label()),
        format!("Afmetingen (b x h x d): {width} x {height} x {depth} mm"),
    ];
    if let Some(legs) = record.leg_height_mm.filter(|mm| *mm > 0) {
        lines.push(format!("Pootjes: {legs} mm"));
    }
    if !record.corpus_color.trim().is_empty() {
        lines.push(format!("Corpuskleur: {}", record.corpus_color.trim()));
    }
    lines.push(format!("Frontmodel: {} ({})", front.key, front.template.material_text));
    if record.front_count > 0 {
        lines.push(format!("Aantal fronten: {}", record.front_count));
    }
    lines.push(format!("Zichtbare zijde: {}", record.visible_side.label()));
    lines.push(format!(
        "Dubbelzijdig afwerken: {}",
        if record.double_sided { "Ja" } else { "Nee" }
    ));

    let fitout = cabinet
        .fitout
        .items()
        .map(|(item, count)| format!("{count}x {}", item.label()))
        .collect::<Vec<_>>();
    if fitout.is_empty() {
        lines.push("Inrichting: Geen".to_string());
    } else {
        lines.push(format!("Inrichting: {}", fitout.join(", ")));
    }
    if record.hinge_count > 0 {
        lines.push(format!("Scharnieren: {}", record.hinge_count));
    }
    if !record.handle.trim().is_empty() {
        lines.push(format!("Handgrepen: {}", record.handle.trim()));
    }
    if !record.finish.trim().is_empty() {
        lines.push(format!("Afwerking: {}", record.finish.trim()));
    }

    LineItem::new(
        1,
        format!("{} maatwerk - {width} x {height} x {depth} mm", record.cabinet_type.label()),
        &lines,
        cabinet.sell_price_excl_vat,
    )
}
