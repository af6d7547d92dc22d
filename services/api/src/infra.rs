use chrono::{DateTime, Utc};
use conto_termico::error::AppError;
use conto_termico::incentives::{BuildingCategory, CombinationResult, SubjectType};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Combined quote stamped with the moment it was produced.
#[derive(Debug, Serialize)]
pub(crate) struct QuoteEnvelope {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) ruleset: &'static str,
    #[serde(flatten)]
    pub(crate) result: CombinationResult,
}

impl QuoteEnvelope {
    pub(crate) fn new(ruleset: &'static str, result: CombinationResult) -> Self {
        Self {
            generated_at: Utc::now(),
            ruleset,
            result,
        }
    }
}

pub(crate) fn parse_subject(raw: &str) -> Result<SubjectType, String> {
    SubjectType::from_id(raw.trim()).ok_or_else(|| {
        let known: Vec<&str> = SubjectType::ALL.iter().map(|subject| subject.id()).collect();
        format!("unknown subject '{raw}' (expected one of: {})", known.join(", "))
    })
}

pub(crate) fn parse_building(raw: &str) -> Result<BuildingCategory, String> {
    BuildingCategory::from_id(raw.trim()).ok_or_else(|| {
        let known: Vec<&str> = BuildingCategory::ALL
            .iter()
            .map(|building| building.id())
            .collect();
        format!("unknown building '{raw}' (expected one of: {})", known.join(", "))
    })
}

pub(crate) fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_parser_lists_known_ids_on_failure() {
        assert_eq!(parse_subject(" pa "), Ok(SubjectType::Pa));
        let err = parse_subject("condominio").expect_err("unknown subject");
        assert!(err.contains("person"));
    }

    #[test]
    fn building_parser_accepts_subcategories() {
        assert_eq!(
            parse_building("tertiary_hospital"),
            Ok(BuildingCategory::TertiaryHospital)
        );
        assert!(parse_building("warehouse").is_err());
    }
}
