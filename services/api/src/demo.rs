use crate::infra::{read_json_file, QuoteEnvelope};
use clap::Args;
use conto_termico::error::AppError;
use conto_termico::incentives::{
    calculators, export_csv, BuildingCategory, CalculationContext, CombinationResult,
    ContextData, IncentiveError, IncentiveService, InterventionId, InterventionParams,
    OperatorType, PremiumId, ResolvedOperator, SubjectType, ValidationRequest,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogArgs {
    /// Applicant subject type (e.g. pa, person, sme)
    #[arg(long, value_parser = crate::infra::parse_subject, requires = "building")]
    pub(crate) subject: Option<SubjectType>,
    /// Building category or subcategory (e.g. residential, tertiary_school)
    #[arg(long, value_parser = crate::infra::parse_building, requires = "subject")]
    pub(crate) building: Option<BuildingCategory>,
}

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// JSON file holding the selected interventions, inputs, operator and context
    #[arg(long)]
    pub(crate) request: PathBuf,
    /// Write the breakdown as CSV to this path
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Print the full quote as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
    /// Combine even when required inputs are missing (affected works price at zero)
    #[arg(long)]
    pub(crate) lenient: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the explanation trace of the single-intervention scenarios.
    #[arg(long)]
    pub(crate) explain: bool,
}

pub(crate) fn run_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let service = IncentiveService::default();

    if let (Some(subject), Some(building)) = (args.subject, args.building) {
        let resolved = service.resolve(subject.id(), building.id())?;
        render_resolution(&service, &resolved);
        return Ok(());
    }

    let view = service.catalog_view();
    println!("{}", view.ruleset);
    println!("\nSubjects");
    for subject in view.subjects {
        println!("  - {:<18} {}", subject.id.id(), subject.name);
    }
    println!("\nBuildings");
    for building in view.buildings {
        let marker = if building.art48ter { " [Art. 48-ter]" } else { "" };
        println!("  - {:<18} {}{}", building.id.id(), building.name, marker);
    }
    println!("\nInterventions");
    for spec in view.interventions {
        println!("  - {:<24} {}", spec.id.id(), spec.name);
    }
    println!("\nPremiums");
    for premium in view.premiums {
        println!("  - {:<24} {}", premium.id.id(), premium.name);
    }
    Ok(())
}

fn render_resolution(service: &IncentiveService, resolved: &ResolvedOperator) {
    let mapping = resolved.mapping;
    println!(
        "{} on {} -> {} (max rate {:.0}%)",
        resolved.subject.id(),
        resolved.building.id(),
        mapping.operator_type,
        mapping.max_incentive_rate * 100.0
    );
    if resolved.used_parent_mapping {
        println!("  (resolved through the parent building category)");
    }
    if resolved.context.is_art48ter() {
        println!("  Art. 48-ter: full coverage of eligible expenses");
    }

    println!("Eligible interventions");
    for id in &resolved.eligible_interventions {
        let name = service
            .catalog()
            .intervention(*id)
            .map(|spec| spec.name)
            .unwrap_or(id.id());
        println!("  - {name}");
    }

    if !resolved.notes.is_empty() {
        println!("Regulatory notes");
        for note in &resolved.notes {
            println!("  - [{:?}] {}: {}", note.severity, note.title, note.text);
        }
    }

    let modes: Vec<&str> = resolved
        .implementation_modes
        .iter()
        .map(|mode| mode.id.id())
        .collect();
    println!("Implementation modes: {}", modes.join(", "));
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let QuoteArgs {
        request,
        csv,
        json,
        lenient,
    } = args;

    let service = IncentiveService::default();
    let request: CalculationContext = read_json_file(&request)?;
    let result = if lenient {
        let report = service.validate(&ValidationRequest {
            selected_interventions: request.selected_interventions.clone(),
            inputs_by_intervention: request.inputs_by_intervention.clone(),
        });
        for issue in &report.issues {
            eprintln!(
                "warning: {} / {}: {:?}",
                issue.intervention, issue.label, issue.issue
            );
        }
        service.combine(&request)
    } else {
        service.quote(&request)?
    };

    if let Some(path) = csv {
        let writer = BufWriter::new(File::create(&path)?);
        export_csv(&result, writer)?;
        println!("Breakdown written to {}", path.display());
    }

    if json {
        let envelope = QuoteEnvelope::new(service.catalog().ruleset(), result);
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else {
        render_combination(&result);
    }
    Ok(())
}

fn render_combination(result: &CombinationResult) {
    for detail in &result.details {
        match &detail.error {
            Some(error) => println!("  - {}: error ({error})", detail.name),
            None => println!(
                "  - {}: base €{:.2} -> final €{:.2}",
                detail.name, detail.base_incentive, detail.final_incentive
            ),
        }
        for premium in &detail.premiums {
            println!("      + {} (€{:.2})", premium.name, premium.value);
        }
    }
    for premium in &result.applied_global_premiums {
        println!("  * {}: €{:.2}", premium.name, premium.value);
        if let Some(note) = &premium.note {
            println!("    {note}");
        }
    }
    println!("  Subtotal: €{:.2}", result.subtotal);
    if result.was_capped {
        println!(
            "  Total: €{:.2} (capped at €{:.2}, was €{:.2})",
            result.total, result.cap, result.original_total
        );
    } else {
        println!("  Total: €{:.2}", result.total);
    }
    for requirement in &result.documentation {
        println!("  Documentation ({}): {}", requirement.premium, requirement.text);
    }
}

fn school_context() -> ContextData {
    ContextData {
        subject_type: Some(SubjectType::Pa),
        ..ContextData::for_building(BuildingCategory::TertiarySchool)
    }
}

fn envelope_params() -> InterventionParams {
    InterventionParams::new()
        .with(
            "righe_opache",
            vec![InterventionParams::new()
                .with("tipologia_struttura", "parete_esterno")
                .with("superficie", 100.0)
                .with("costo_totale", 20_000.0)],
        )
        .with("zona_climatica", "E")
}

fn glazing_params() -> InterventionParams {
    InterventionParams::new()
        .with("superficie", 50.0)
        .with("costo_specifico", 700.0)
        .with("zona_climatica", "D")
}

fn heat_pump_params() -> InterventionParams {
    InterventionParams::new()
        .with("tipo_pompa", "aria/acqua (≤35kW)")
        .with("potenza_nominale", 10.0)
        .with("scop", 4.0)
        .with("scop_minimo", 4.0)
        .with("zona_climatica", "E")
        .with("costo_totale", 12_000.0)
}

fn single_scenario(
    service: &IncentiveService,
    title: &str,
    intervention: InterventionId,
    params: &InterventionParams,
    operator: OperatorType,
    context: &ContextData,
    explain: bool,
) -> Result<(), AppError> {
    println!("\n{title}");
    let tables = service.catalog().tables();
    if explain {
        let explained = calculators::explain(tables, intervention, params, operator, context)
            .map_err(IncentiveError::from)?;
        println!("  Formula: {}", explained.formula);
        for step in &explained.steps {
            println!("    {step}");
        }
        println!("  Incentive: €{:.2}", explained.result);
    } else {
        let incentive = calculators::calculate(tables, intervention, params, operator, context)
            .map_err(IncentiveError::from)?;
        println!("  Incentive: €{incentive:.2}");
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = IncentiveService::default();
    println!("{} demo", service.catalog().ruleset());

    let school = service.resolve(SubjectType::Pa.id(), BuildingCategory::TertiarySchool.id())?;
    println!(
        "Applicant: pa on tertiary_school -> {} (Art. 48-ter: {})",
        school.operator_type(),
        school.context.is_art48ter()
    );

    single_scenario(
        &service,
        "Scenario A - opaque envelope on a public school",
        InterventionId::IsolamentoOpache,
        &envelope_params(),
        OperatorType::Pa,
        &school_context(),
        args.explain,
    )?;

    single_scenario(
        &service,
        "Scenario B - glazing for a tertiary SME in zone D",
        InterventionId::SostituzioneInfissi,
        &glazing_params(),
        OperatorType::PrivateTertiarySme,
        &ContextData::default(),
        args.explain,
    )?;

    println!("\nScenario C - envelope and heat pump for a tertiary SME");
    let multi = CalculationContext::new(OperatorType::PrivateTertiarySme)
        .select(InterventionId::IsolamentoOpache, envelope_params())
        .select(InterventionId::PompaCalore, heat_pump_params())
        .with_global_premium(PremiumId::Pmi);
    render_combination(&service.combine(&multi));

    println!("\nScenario D - full coverage for a public school");
    let full = CalculationContext::new(OperatorType::Pa)
        .select(
            InterventionId::SostituzioneInfissi,
            InterventionParams::new()
                .with("superficie", 20.0)
                .with("costo_specifico", 600.0)
                .with("zona_climatica", "E")
                .with("costo_totale", 10_000.0),
        )
        .with_context(school.context.clone());
    render_combination(&service.combine(&full));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{parse_building, parse_subject};

    #[test]
    fn demo_scenarios_run_to_completion() {
        run_demo(DemoArgs { explain: true }).expect("demo runs");
    }

    #[test]
    fn catalog_resolution_rejects_invalid_pairs() {
        let err = run_catalog(CatalogArgs {
            subject: Some(SubjectType::Person),
            building: Some(BuildingCategory::TertiaryPrison),
        })
        .expect_err("person cannot apply on prisons");
        assert!(matches!(err, AppError::Incentive(_)));
    }

    #[test]
    fn quote_reports_missing_request_file() {
        let err = run_quote(QuoteArgs {
            request: PathBuf::from("does-not-exist.json"),
            csv: None,
            json: false,
            lenient: false,
        })
        .expect_err("missing file");
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn parsers_are_shared_with_clap() {
        assert_eq!(parse_subject("sme"), Ok(SubjectType::Sme));
        assert_eq!(
            parse_building("tertiary_school"),
            Ok(BuildingCategory::TertiarySchool)
        );
    }
}
