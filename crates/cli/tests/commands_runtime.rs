use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use inmeet_cli::commands::{catalog, config, preview, price, submit};
use inmeet_core::config::{InmeetConfig, LoadOptions};
use inmeet_core::domain::quotation::QuotationMode;
use serde_json::Value;
use tempfile::TempDir;

const CORRELATION_ID: &str = "test-correlation";

const KITCHEN: &str = r#"{
    "fronts": {
        "parts": ["DEUR", "DEUR", "DEUR", "DEUR", "DEUR",
                  "DEUR", "DEUR", "DEUR", "DEUR", "DEUR"],
        "style_code": "K01 - vlak",
        "material_code": "MDF gespoten",
        "color": "RAL 9010",
        "customer": ["J. Jansen", "Dorpsstraat 1", "1234 AB Utrecht"],
        "hinges": 20,
        "drawers": 2
    }
}"#;

#[test]
fn price_reports_the_reference_totals() {
    let (_dir, input) = workbook("keuken-jansen.json", KITCHEN);

    let result = price::run(&input, None, CORRELATION_ID);
    assert_eq!(result.exit_code, 0, "expected a priced workbook: {}", result.output);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "price");
    assert_eq!(payload["status"], "ok");

    let summary = &payload["data"]["summary"];
    assert_eq!(summary["project"], "keuken-jansen");
    assert_eq!(summary["model"], "NOAH");
    assert_eq!(summary["front_count"], 10);
    assert_eq!(amount(&summary["total_excl_vat"]), "1971.17");
    assert_eq!(amount(&summary["vat"]), "413.95");
    assert_eq!(amount(&summary["total_incl_vat"]), "2385.12");
    assert!(payload["data"]["sections"].is_null());
}

#[test]
fn price_with_a_mode_includes_the_composed_sections() {
    let (_dir, input) = workbook("keuken.json", KITCHEN);

    let result = price::run(&input, Some(QuotationMode::Dealer), CORRELATION_ID);
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    let sections = payload["data"]["sections"].as_array().expect("sections");
    let titles: Vec<_> = sections.iter().map(|section| section["title"].clone()).collect();
    assert_eq!(titles.first(), Some(&Value::from("KLANTGEGEVENS")));
    assert!(titles.contains(&Value::from("KEUKENRENOVATIE")));
    assert!(titles.contains(&Value::from("INMETEN, LEVEREN & MONTEREN")));
}

#[test]
fn preview_prints_the_request_body() {
    let (_dir, input) = workbook("keuken.json", KITCHEN);

    let result = preview::run(&input, QuotationMode::Consumer, " 42 ", CORRELATION_ID);
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    let body = &payload["data"];
    assert_eq!(body["deal_id"], "42");
    assert_eq!(body["currency"]["code"], "EUR");
    assert_eq!(body["text"], "\u{200b}");
    assert_eq!(body["grouped_lines"][0]["section"]["title"], "KLANTGEGEVENS");

    let renovation = &body["grouped_lines"][1]["line_items"][0];
    assert_eq!(renovation["description"], "Keukenrenovatie model NOAH");
    assert_eq!(renovation["unit_price"]["tax"], "excluding");
    assert!(renovation["unit_price"]["amount"].is_number());
}

#[test]
fn unknown_model_is_an_input_failure() {
    let broken = KITCHEN.replace("K01 - vlak", "K99 - onbekend");
    let (_dir, input) = workbook("keuken.json", &broken);

    let result = price::run(&input, None, CORRELATION_ID);
    assert_eq!(result.exit_code, 3);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "input");
    assert_eq!(payload["correlation_id"], CORRELATION_ID);
}

#[test]
fn missing_workbook_is_an_input_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = preview::run(
        &dir.path().join("missing.json"),
        QuotationMode::Dealer,
        "42",
        CORRELATION_ID,
    );

    assert_eq!(result.exit_code, 3);
    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "preview");
    assert!(payload["message"].as_str().expect("message").contains("missing.json"));
}

#[test]
fn submit_without_credentials_is_a_config_failure() {
    let (_dir, input) = workbook("keuken.json", KITCHEN);

    with_env(&[], || {
        let config = InmeetConfig::load(LoadOptions::default()).expect("defaults load");
        let result = submit::run(&config, &input, QuotationMode::Dealer, "42", CORRELATION_ID);

        assert_eq!(result.exit_code, 2, "expected config validation failure code");
        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "submit");
        assert_eq!(payload["error_class"], "config_validation");
        assert!(payload["message"].as_str().expect("message").contains("INMEET_CRM_CLIENT_ID"));
    });
}

#[test]
fn submit_refuses_a_blank_deal_before_calling_the_crm() {
    let (dir, input) = workbook("keuken.json", KITCHEN);
    let token_file = dir.path().join("refresh_token.txt");
    let token_file = token_file.to_string_lossy().into_owned();

    with_env(
        &[
            ("INMEET_CRM_CLIENT_ID", "client"),
            ("INMEET_CRM_CLIENT_SECRET", "secret"),
            ("INMEET_CRM_REFRESH_TOKEN", "refresh"),
            ("INMEET_CRM_TOKEN_FILE", &token_file),
        ],
        || {
            let config = InmeetConfig::load(LoadOptions::default()).expect("config loads");
            let result =
                submit::run(&config, &input, QuotationMode::Consumer, "   ", CORRELATION_ID);

            assert_eq!(result.exit_code, 3);
            let payload = parse_payload(&result.output);
            assert_eq!(payload["error_class"], "input");
        },
    );
    assert!(!Path::new(&token_file).exists());
}

#[test]
fn blank_deal_is_an_input_failure_even_without_credentials() {
    let (_dir, input) = workbook("keuken.json", KITCHEN);

    with_env(&[], || {
        let config = InmeetConfig::load(LoadOptions::default()).expect("defaults load");
        let result = submit::run(&config, &input, QuotationMode::Dealer, "  ", CORRELATION_ID);

        assert_eq!(result.exit_code, 3, "a blank deal id is checked before credentials");
        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "input");
        assert_eq!(payload["correlation_id"], CORRELATION_ID);
    });
}

#[test]
fn catalog_lists_every_model() {
    let result = catalog::run();
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["data"]["models"].as_array().map(Vec::len), Some(10));
    let selections = payload["data"]["selections"].as_array().expect("selections");
    assert!(selections.iter().any(|selection| {
        selection["style"] == "K01 - vlak"
            && selection["material"] == "MDF gespoten"
            && selection["model"] == "NOAH"
    }));
}

#[test]
fn config_attributes_sources_and_redacts_secrets() {
    with_env(
        &[("INMEET_CRM_CLIENT_SECRET", "super-secret"), ("INMEET_LOG_LEVEL", "debug")],
        || {
            let loaded = InmeetConfig::load(LoadOptions::default()).expect("config loads");
            let result = config::run(&loaded, None);
            assert_eq!(result.exit_code, 0);
            assert!(!result.output.contains("super-secret"));

            let payload = parse_payload(&result.output);
            let fields = payload["data"].as_array().expect("fields");
            let field = |key: &str| {
                fields.iter().find(|field| field["key"] == key).cloned().expect("field")
            };

            assert_eq!(field("crm.client_secret")["value"], "<redacted>");
            assert_eq!(field("crm.client_secret")["source"], "env (INMEET_CRM_CLIENT_SECRET)");
            assert_eq!(field("logging.level")["value"], "debug");
            assert_eq!(field("logging.level")["source"], "env (INMEET_LOG_LEVEL)");
            assert_eq!(field("crm.api_base")["source"], "default");
        },
    );
}

fn workbook(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write workbook");
    (dir, path)
}

fn amount(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid json")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "INMEET_CRM_API_BASE",
        "INMEET_CRM_TOKEN_URL",
        "INMEET_CRM_CLIENT_ID",
        "INMEET_CRM_CLIENT_SECRET",
        "INMEET_CRM_REFRESH_TOKEN",
        "INMEET_CRM_TOKEN_FILE",
        "INMEET_CRM_TIMEOUT_SECS",
        "INMEET_LOGGING_LEVEL",
        "INMEET_LOGGING_FORMAT",
        "INMEET_LOG_LEVEL",
        "INMEET_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
