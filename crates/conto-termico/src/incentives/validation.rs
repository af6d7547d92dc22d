//! Pre-flight checks of form inputs against the intervention schemas.

use super::catalog::RuleCatalog;
use super::domain::InterventionId;
use super::params::InterventionParams;
use super::schema::{FieldKind, InputField};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputIssue {
    Missing,
    Invalid { message: String },
    BelowMinimum { min: f64, found: f64 },
    AboveMaximum { max: f64, found: f64 },
    UnknownOption { found: String },
    EmptyTable,
    /// A column of one table row; `row` counts from zero.
    InvalidRow {
        row: usize,
        column: &'static str,
        issue: Box<InputIssue>,
    },
}

/// A required field of a selected intervention that is absent or unusable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingRequiredInput {
    pub intervention: InterventionId,
    pub field: &'static str,
    pub label: &'static str,
    pub issue: InputIssue,
}

#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{} required input(s) missing or invalid", .issues.len())]
pub struct ValidationError {
    pub issues: Vec<MissingRequiredInput>,
}

fn check_field(field: &InputField, params: &InterventionParams) -> Vec<InputIssue> {
    match &field.kind {
        FieldKind::Table { columns } => match params.rows(field.id) {
            Err(fault) => vec![InputIssue::Invalid {
                message: fault.to_string(),
            }],
            Ok(rows) if rows.is_empty() && !field.optional => vec![InputIssue::EmptyTable],
            Ok(rows) => rows
                .iter()
                .enumerate()
                .flat_map(|(index, row)| check_row(columns, index, row))
                .collect(),
        },
        _ => check_value(field, params).into_iter().collect(),
    }
}

fn check_row(
    columns: &[InputField],
    index: usize,
    row: &InterventionParams,
) -> Vec<InputIssue> {
    columns
        .iter()
        .filter(|column| column.is_visible(row))
        .flat_map(|column| {
            check_field(column, row)
                .into_iter()
                .map(move |issue| InputIssue::InvalidRow {
                    row: index,
                    column: column.id,
                    issue: Box::new(issue),
                })
        })
        .collect()
}

fn check_value(field: &InputField, params: &InterventionParams) -> Option<InputIssue> {
    match &field.kind {
        FieldKind::Computed | FieldKind::Checkbox | FieldKind::Table { .. } => None,
        FieldKind::Number => {
            let value = match params.number(field.id) {
                Err(fault) => {
                    return Some(InputIssue::Invalid {
                        message: fault.to_string(),
                    })
                }
                Ok(None) if field.optional => return None,
                Ok(None) => return Some(InputIssue::Missing),
                Ok(Some(value)) => value,
            };
            if !value.is_finite() {
                return Some(InputIssue::Invalid {
                    message: format!("field '{}' must be a finite number", field.id),
                });
            }
            if let Some(min) = field.min.filter(|min| value < *min) {
                return Some(InputIssue::BelowMinimum { min, found: value });
            }
            match field.resolve_max(params) {
                Err(fault) => Some(InputIssue::Invalid {
                    message: fault.to_string(),
                }),
                Ok(Some(max)) if value > max => Some(InputIssue::AboveMaximum { max, found: value }),
                Ok(_) => None,
            }
        }
        FieldKind::Select { options } => match params.text(field.id) {
            Err(fault) => Some(InputIssue::Invalid {
                message: fault.to_string(),
            }),
            Ok(None) if field.optional => None,
            Ok(None) => Some(InputIssue::Missing),
            Ok(Some(value)) if options.contains(&value.as_str()) => None,
            Ok(Some(value)) => Some(InputIssue::UnknownOption { found: value }),
        },
    }
}

/// Issues for one intervention; hidden fields are skipped.
pub fn intervention_issues(
    catalog: &RuleCatalog,
    intervention: InterventionId,
    params: &InterventionParams,
) -> Vec<MissingRequiredInput> {
    let Some(spec) = catalog.intervention(intervention) else {
        return Vec::new();
    };

    spec.inputs
        .iter()
        .filter(|field| field.is_visible(params))
        .flat_map(|field| {
            check_field(field, params)
                .into_iter()
                .map(move |issue| MissingRequiredInput {
                    intervention,
                    field: field.id,
                    label: field.label,
                    issue,
                })
        })
        .collect()
}

/// Validates every selected intervention before a quote is computed.
pub fn validate_inputs(
    catalog: &RuleCatalog,
    selection: &[InterventionId],
    inputs: &BTreeMap<InterventionId, InterventionParams>,
) -> Result<(), ValidationError> {
    let empty = InterventionParams::new();
    let issues: Vec<_> = selection
        .iter()
        .flat_map(|id| intervention_issues(catalog, *id, inputs.get(id).unwrap_or(&empty)))
        .collect();

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { issues })
    }
}
