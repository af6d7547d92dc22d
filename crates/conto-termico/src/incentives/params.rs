//! Loosely-typed form values supplied for a single intervention.
//!
//! Inputs arrive from HTML-style forms or JSON clients, so numbers may be sent as text.
//! Accessors coerce what can be coerced, report absent or blank values as `None`, and raise
//! a [`CalculationFault`] only when a present value has an unusable shape.

use super::domain::PremiumId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single form value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Flag(bool),
    Number(f64),
    Text(String),
    Rows(Vec<InterventionParams>),
    Map(InterventionParams),
}

impl ParamValue {
    /// Text used when comparing against visibility rules and select options.
    pub(crate) fn match_text(&self) -> Option<String> {
        match self {
            ParamValue::Null => None,
            ParamValue::Flag(value) => Some(value.to_string()),
            ParamValue::Number(value) => Some(format_number(*value)),
            ParamValue::Text(value) if value.trim().is_empty() => None,
            ParamValue::Text(value) => Some(value.clone()),
            ParamValue::Rows(_) | ParamValue::Map(_) => None,
        }
    }

    pub(crate) fn is_blank(&self) -> bool {
        match self {
            ParamValue::Null => true,
            ParamValue::Text(value) => value.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Number(f64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Flag(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<Vec<InterventionParams>> for ParamValue {
    fn from(value: Vec<InterventionParams>) -> Self {
        ParamValue::Rows(value)
    }
}

/// Raised when a present input cannot be interpreted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalculationFault {
    #[error("field '{field}' must be numeric, got '{found}'")]
    InvalidNumber { field: String, found: String },
    #[error("field '{field}' must be a single text value")]
    InvalidText { field: String },
    #[error("field '{field}' must be a list of rows")]
    InvalidRows { field: String },
}

/// Field map keyed by the input ids declared in the intervention schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterventionParams(BTreeMap<String, ParamValue>);

/// Key under which per-intervention premium selections are stored.
pub const PREMIUMS_FIELD: &str = "premiums";

impl InterventionParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by fixtures and the CLI demo.
    pub fn with(mut self, field: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Marks a per-intervention premium as selected.
    pub fn with_premium(mut self, premium: PremiumId) -> Self {
        let mut selections = match self.0.remove(PREMIUMS_FIELD) {
            Some(ParamValue::Map(existing)) => existing,
            _ => InterventionParams::new(),
        };
        selections.insert(premium.id(), true);
        self.0
            .insert(PREMIUMS_FIELD.to_string(), ParamValue::Map(selections));
        self
    }

    pub fn insert(&mut self, field: &str, value: impl Into<ParamValue>) {
        self.0.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&ParamValue> {
        self.0.get(field).filter(|value| !value.is_blank())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Numeric value of `field`; numeric text is accepted.
    pub fn number(&self, field: &str) -> Result<Option<f64>, CalculationFault> {
        match self.get(field) {
            None => Ok(None),
            Some(ParamValue::Number(value)) => Ok(Some(*value)),
            Some(ParamValue::Text(raw)) => parse_number(raw)
                .map(Some)
                .ok_or_else(|| CalculationFault::InvalidNumber {
                    field: field.to_string(),
                    found: raw.clone(),
                }),
            Some(other) => Err(CalculationFault::InvalidNumber {
                field: field.to_string(),
                found: describe(other),
            }),
        }
    }

    /// Numeric value of `field` when it is strictly positive.
    pub fn positive(&self, field: &str) -> Result<Option<f64>, CalculationFault> {
        Ok(self.number(field)?.filter(|value| *value > 0.0))
    }

    /// Text value of `field`; numbers are rendered without trailing zeros.
    pub fn text(&self, field: &str) -> Result<Option<String>, CalculationFault> {
        match self.get(field) {
            None => Ok(None),
            Some(ParamValue::Text(value)) => Ok(Some(value.trim().to_string())),
            Some(ParamValue::Number(value)) => Ok(Some(format_number(*value))),
            Some(_) => Err(CalculationFault::InvalidText {
                field: field.to_string(),
            }),
        }
    }

    /// Checkbox-style flag; anything not recognisably true counts as false.
    pub fn flag(&self, field: &str) -> bool {
        match self.get(field) {
            Some(ParamValue::Flag(value)) => *value,
            Some(ParamValue::Number(value)) => *value != 0.0,
            Some(ParamValue::Text(value)) => matches!(
                value.trim().to_lowercase().as_str(),
                "true" | "1" | "si" | "sì" | "yes" | "on"
            ),
            _ => false,
        }
    }

    pub fn rows(&self, field: &str) -> Result<&[InterventionParams], CalculationFault> {
        match self.get(field) {
            None => Ok(&[]),
            Some(ParamValue::Rows(rows)) => Ok(rows.as_slice()),
            Some(_) => Err(CalculationFault::InvalidRows {
                field: field.to_string(),
            }),
        }
    }

    pub fn premium_selected(&self, premium: PremiumId) -> bool {
        match self.0.get(PREMIUMS_FIELD) {
            Some(ParamValue::Map(selections)) => selections.flag(premium.id()),
            _ => false,
        }
    }
}

impl FromIterator<(String, ParamValue)> for InterventionParams {
    fn from_iter<T: IntoIterator<Item = (String, ParamValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Accepts `1500.5`, `1500,5` and `1.500,50`. Dots only act as thousands separators when a
/// decimal comma is present, so `1.500` still reads as one and a half.
fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let normalised = if raw.contains(',') {
        raw.replace('.', "").replace(',', ".")
    } else {
        raw.to_string()
    };
    normalised
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn describe(value: &ParamValue) -> String {
    match value {
        ParamValue::Null => "null".to_string(),
        ParamValue::Flag(flag) => flag.to_string(),
        ParamValue::Number(number) => number.to_string(),
        ParamValue::Text(text) => text.clone(),
        ParamValue::Rows(rows) => format!("list of {} rows", rows.len()),
        ParamValue::Map(_) => "object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_mixed_form_payloads() {
        let params: InterventionParams = serde_json::from_value(json!({
            "superficie": "120,5",
            "zona_climatica": "E",
            "righe_opache": [{ "superficie": 10, "costo_totale": 1500 }],
            "premiums": { "prodotti-ue": true },
            "note": null
        }))
        .expect("payload deserializes");

        assert_eq!(params.number("superficie").expect("numeric"), Some(120.5));
        assert_eq!(params.text("zona_climatica").expect("text"), Some("E".to_string()));
        assert_eq!(params.rows("righe_opache").expect("rows").len(), 1);
        assert!(params.premium_selected(PremiumId::ProdottiUe));
        assert!(params.get("note").is_none());
    }

    #[test]
    fn italian_thousands_separators_are_understood() {
        let params = InterventionParams::new()
            .with("costo_totale", "1.500,50")
            .with("superficie", " 12.345.678,9 ")
            .with("potenza", "1.5")
            .with("scop", "4,1");

        assert_eq!(params.number("costo_totale").expect("numeric"), Some(1_500.5));
        assert_eq!(params.number("superficie").expect("numeric"), Some(12_345_678.9));
        assert_eq!(params.number("potenza").expect("numeric"), Some(1.5));
        assert_eq!(params.number("scop").expect("numeric"), Some(4.1));
        assert!(InterventionParams::new()
            .with("costo_totale", "1,500,50")
            .number("costo_totale")
            .is_err());
    }

    #[test]
    fn blank_and_missing_values_are_absent() {
        let params = InterventionParams::new().with("superficie", "  ");
        assert_eq!(params.number("superficie").expect("blank is absent"), None);
        assert_eq!(params.number("costo").expect("missing is absent"), None);
        assert!(params.rows("righe").expect("missing rows").is_empty());
    }

    #[test]
    fn malformed_values_raise_faults() {
        let params = InterventionParams::new()
            .with("superficie", "dieci")
            .with("righe_opache", 4.0)
            .with("zona_climatica", true);

        assert!(matches!(
            params.number("superficie"),
            Err(CalculationFault::InvalidNumber { .. })
        ));
        assert!(matches!(
            params.rows("righe_opache"),
            Err(CalculationFault::InvalidRows { .. })
        ));
        assert!(matches!(
            params.text("zona_climatica"),
            Err(CalculationFault::InvalidText { .. })
        ));
    }

    #[test]
    fn positive_filters_zero_and_negative() {
        let params = InterventionParams::new()
            .with("zero", 0.0)
            .with("negative", -3.0)
            .with("ok", 2.5);
        assert_eq!(params.positive("zero").expect("numeric"), None);
        assert_eq!(params.positive("negative").expect("numeric"), None);
        assert_eq!(params.positive("ok").expect("numeric"), Some(2.5));
    }

    #[test]
    fn numbers_render_as_select_text() {
        let params = InterventionParams::new().with("emissioni", 5.0);
        assert_eq!(params.text("emissioni").expect("text"), Some("5".to_string()));
    }
}
