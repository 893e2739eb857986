use catan_core::core_api::{Engine, EngineConfig, Session};
use catan_core::decode::parse_date;
use catan_core::filter::{DateRange, GameFilter, RequiredStats, Whitelist};
use catan_render::{
    JsonStyle, Report, TextRenderOptions, TextStyle, render_json_full, render_text_with_options,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WebRenderOptions {
    pub json_output: bool,
    pub verbose: bool,
    pub from: Option<String>,
    pub to: Option<String>,
    pub players: Vec<String>,
    pub require_order: bool,
    pub require_point_details: bool,
    /// Reference date for the summary card; no summary without it.
    pub today: Option<String>,
    pub config: Option<EngineConfig>,
}

#[derive(Debug, Clone)]
struct WebError {
    code: &'static str,
    message: String,
}

#[derive(Debug, Clone, Serialize)]
struct WebErrorPayload {
    code: String,
    message: String,
}

impl WebError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn to_js_value(&self) -> JsValue {
        let payload = WebErrorPayload {
            code: self.code.to_string(),
            message: self.message.clone(),
        };
        serde_wasm_bindgen::to_value(&payload).unwrap_or_else(|_| {
            JsValue::from_str(&format!("{}: {}", payload.code, payload.message))
        })
    }
}

#[wasm_bindgen]
pub fn render_stats_text(csv: &str, options: JsValue) -> Result<String, JsValue> {
    let parsed_options = parse_options(options).map_err(|err| err.to_js_value())?;
    render_stats_text_impl(csv, &parsed_options).map_err(|err| err.to_js_value())
}

/// Players present under the date filter alone, for populating selection
/// controls.
#[wasm_bindgen]
pub fn available_players(csv: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let parsed_options = parse_options(options).map_err(|err| err.to_js_value())?;
    let names = available_players_impl(csv, &parsed_options).map_err(|err| err.to_js_value())?;
    serde_wasm_bindgen::to_value(&names)
        .map_err(|err| WebError::new("render_failed", err.to_string()).to_js_value())
}

fn render_stats_text_impl(csv: &str, options: &WebRenderOptions) -> Result<String, WebError> {
    let session = open_session(csv, options)?;
    let filter = GameFilter {
        date_range: parse_date_range(options)?,
        whitelist: Whitelist::new(
            options
                .players
                .iter()
                .map(|name| name.trim())
                .filter(|name| !name.is_empty()),
        ),
        required: RequiredStats {
            order: options.require_order,
            point_details: options.require_point_details,
        },
    };
    let summary = parse_optional_date("today", options.today.as_deref())?
        .map(|today| session.summary(today));

    let view = session.view(&filter);
    let report = Report {
        session: &session,
        view: &view,
        summary: summary.as_ref(),
    };

    if options.json_output {
        let value = render_json_full(&report, JsonStyle::CanonicalV1);
        return serde_json::to_string_pretty(&value).map_err(|err| {
            WebError::new(
                "render_failed",
                format!("failed to serialize rendered JSON output: {err}"),
            )
        });
    }

    Ok(render_text_with_options(
        &report,
        TextStyle::Report,
        TextRenderOptions {
            verbose: options.verbose,
        },
    ))
}

fn available_players_impl(csv: &str, options: &WebRenderOptions) -> Result<Vec<String>, WebError> {
    let session = open_session(csv, options)?;
    Ok(session.available_players(&parse_date_range(options)?))
}

fn open_session(csv: &str, options: &WebRenderOptions) -> Result<Session, WebError> {
    if csv.trim().is_empty() {
        return Err(WebError::new(
            "empty_input",
            "The session export is empty. Please provide the CSV export.",
        ));
    }

    let engine = Engine::with_config(options.config.unwrap_or_default())
        .map_err(|err| WebError::new("invalid_options", err.message))?;
    engine
        .open_bytes(csv)
        .map_err(|err| WebError::new("parse_failed", err.to_string()))
}

fn parse_options(options: JsValue) -> Result<WebRenderOptions, WebError> {
    if options.is_null() || options.is_undefined() {
        return Ok(WebRenderOptions::default());
    }

    serde_wasm_bindgen::from_value(options).map_err(|err| {
        WebError::new(
            "invalid_options",
            format!("Failed to parse web render options: {err}"),
        )
    })
}

fn parse_optional_date(label: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, WebError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    parse_date(raw).map(Some).ok_or_else(|| {
        WebError::new(
            "invalid_options",
            format!("Invalid {label} '{raw}'. Expected YYYY-MM-DD, YYYY/MM/DD, DD.MM.YYYY or MM/DD/YYYY"),
        )
    })
}

fn parse_date_range(options: &WebRenderOptions) -> Result<DateRange, WebError> {
    let start = parse_optional_date("from", options.from.as_deref())?;
    let end = parse_optional_date("to", options.to.as_deref())?;
    match (start, end) {
        (None, None) => Ok(DateRange::default()),
        (Some(start), Some(end)) => Ok(DateRange::new(start, end)),
        _ => Err(WebError::new(
            "invalid_options",
            "Both from and to are needed for a date range.",
        )),
    }
}
