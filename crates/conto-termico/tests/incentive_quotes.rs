use conto_termico::incentives::{
    self, export_csv, BuildingCategory, CalculationContext, CombinationMode, InterventionId,
    InterventionParams, OperatorType, PremiumId, SubjectType,
};

fn school_retrofit() -> CalculationContext {
    serde_json::from_str(include_str!("fixtures/school_retrofit.json"))
        .expect("fixture deserializes")
}

fn residential_heat_pump() -> InterventionParams {
    InterventionParams::new()
        .with("tipo_pompa", "aria/acqua (≤35kW)")
        .with("potenza_nominale", 10.0)
        .with("scop", 4.0)
        .with("scop_minimo", 4.0)
        .with("zona_climatica", "E")
        .with("costo_totale", 12_000.0)
}

#[test]
fn school_retrofit_is_reimbursed_up_to_declared_cost() {
    let result = incentives::combine(&school_retrofit());

    assert_eq!(result.mode, CombinationMode::Incentivo100);
    assert!(result.is_incentivo_100);
    assert_eq!(result.details.len(), 3);
    assert!(result.details.iter().all(|detail| detail.error.is_none()));

    let glazing = result
        .detail(InterventionId::SostituzioneInfissi)
        .expect("glazing priced");
    assert!((glazing.final_incentive - 120.0 * 650.0).abs() < 1e-6);

    let envelope = result
        .detail(InterventionId::IsolamentoOpache)
        .expect("envelope priced");
    assert!(envelope.final_incentive > 0.0);
    assert!(envelope.final_incentive <= 125_000.0);

    let detail_sum: f64 = result.details.iter().map(|detail| detail.final_incentive).sum();
    assert!((result.subtotal - detail_sum).abs() < 1e-6);
    assert!(result.total <= result.cap);
    assert!(result.global_premium(PremiumId::DiagnosiEnergetica).is_none());
}

#[test]
fn resolved_context_flows_into_the_quote() {
    let resolved = incentives::resolve_operator(SubjectType::Person, BuildingCategory::Residential)
        .expect("private homeowner resolves");
    assert_eq!(resolved.operator_type(), OperatorType::PrivateResidential);
    assert!(!resolved
        .eligible_interventions
        .contains(&InterventionId::IsolamentoOpache));

    let request = CalculationContext::new(resolved.operator_type())
        .select(InterventionId::PompaCalore, residential_heat_pump())
        .with_context(resolved.context.clone());
    let result = incentives::combine(&request);

    assert_eq!(result.mode, CombinationMode::Standard);
    assert!((result.total - 0.150 * 12_750.0 * 2.0).abs() < 1e-6);
}

#[test]
fn explanation_agrees_with_calculation() {
    let params = residential_heat_pump();
    let context = Default::default();
    let calculated = incentives::calculate(
        InterventionId::PompaCalore,
        &params,
        OperatorType::PrivateResidential,
        &context,
    )
    .expect("calculation succeeds");
    let explained = incentives::explain(
        InterventionId::PompaCalore,
        &params,
        OperatorType::PrivateResidential,
        &context,
    )
    .expect("explanation succeeds");

    assert_eq!(explained.result.to_bits(), calculated.to_bits());
    assert!(!explained.steps.is_empty());
}

#[test]
fn quote_breakdown_exports_as_csv() {
    let result = incentives::combine(&school_retrofit());
    let mut buffer = Vec::new();
    export_csv(&result, &mut buffer).expect("export succeeds");

    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    let kinds: Vec<String> = reader
        .records()
        .map(|record| record.expect("valid row")[0].to_string())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "intervento",
            "intervento",
            "intervento",
            "premio_globale",
            "totale"
        ]
    );
}
