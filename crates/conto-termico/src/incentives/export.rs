//! CSV breakdown of a combined quote.

use super::combination::CombinationResult;
use std::io::Write;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write breakdown row: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush breakdown: {0}")]
    Io(#[from] std::io::Error),
}

const HEADER: [&str; 7] = [
    "riga",
    "intervento",
    "descrizione",
    "incentivo_base",
    "premi",
    "incentivo_finale",
    "note",
];

fn amount(value: f64) -> String {
    format!("{value:.2}")
}

/// Writes one row per intervention, one per global premium and a closing total row.
pub fn export_csv<W: Write>(result: &CombinationResult, writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;

    for detail in &result.details {
        let premiums: f64 = detail.premiums.iter().map(|premium| premium.value).sum();
        let (base, premiums, final_incentive) = (
            amount(detail.base_incentive),
            amount(premiums),
            amount(detail.final_incentive),
        );
        let note = detail
            .error
            .as_deref()
            .or(detail.note.as_deref())
            .unwrap_or_default();
        csv_writer.write_record([
            "intervento",
            detail.intervention.id(),
            detail.name.as_str(),
            base.as_str(),
            premiums.as_str(),
            final_incentive.as_str(),
            note,
        ])?;
    }

    for unknown in &result.unknown_interventions {
        csv_writer.write_record([
            "intervento",
            unknown.id.as_str(),
            "",
            "0.00",
            "0.00",
            "0.00",
            unknown.error.as_str(),
        ])?;
    }

    for premium in &result.applied_global_premiums {
        let value = amount(premium.value);
        csv_writer.write_record([
            "premio_globale",
            premium.id.id(),
            premium.name.as_str(),
            "",
            value.as_str(),
            "",
            premium.note.as_deref().unwrap_or_default(),
        ])?;
    }

    let cap_note = if result.was_capped {
        format!("massimale applicato: {}", amount(result.cap))
    } else {
        String::new()
    };
    let (subtotal, total) = (amount(result.subtotal), amount(result.total));
    csv_writer.write_record([
        "totale",
        "",
        "",
        subtotal.as_str(),
        "",
        total.as_str(),
        cap_note.as_str(),
    ])?;

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incentives::combination::{CalculationContext, CombinationEngine};
    use crate::incentives::domain::{InterventionId, OperatorType};
    use crate::incentives::params::InterventionParams;
    use crate::incentives::RuleCatalog;

    #[test]
    fn breakdown_ends_with_total_row() {
        let catalog = RuleCatalog::standard();
        let request = CalculationContext::new(OperatorType::PrivateResidential).select(
            InterventionId::Teleriscaldamento,
            InterventionParams::new()
                .with("potenza_contrattuale", 60.0)
                .with("costo_totale", 12_000.0),
        );
        let result = CombinationEngine::new(&catalog).combine(&request);

        let mut buffer = Vec::new();
        export_csv(&result, &mut buffer).expect("export succeeds");
        let text = String::from_utf8(buffer).expect("utf-8 output");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("riga,intervento,descrizione"));
        assert!(lines[1].starts_with("intervento,teleriscaldamento,"));
        assert!(lines[1].contains("6240.00"));
        assert_eq!(lines[2], "totale,,,6240.00,,6240.00,");
    }

    #[test]
    fn unknown_selections_get_a_zero_row_with_the_error() {
        let service = crate::incentives::IncentiveService::default();
        let request: crate::incentives::CombineRequest = serde_json::from_value(serde_json::json!({
            "selected_interventions": ["cappotto-termico"],
            "operator_type": "pa"
        }))
        .expect("request deserializes");
        let result = service.combine_selection(&request);

        let mut buffer = Vec::new();
        export_csv(&result, &mut buffer).expect("export succeeds");
        let text = String::from_utf8(buffer).expect("utf-8 output");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[1],
            "intervento,cappotto-termico,,0.00,0.00,0.00,unknown intervention 'cappotto-termico'"
        );
        assert_eq!(lines.last().copied(), Some("totale,,,0.00,,0.00,"));
    }
}
