use super::common::*;

use crate::incentives::calculators::{self, ExplainValue};
use crate::incentives::domain::{BuildingCategory, ContextData, InterventionId, OperatorType};
use crate::incentives::params::{CalculationFault, InterventionParams};

fn calc(intervention: InterventionId, params: &InterventionParams, operator: OperatorType) -> f64 {
    calculators::calculate(catalog().tables(), intervention, params, operator, &no_context())
        .expect("calculation succeeds")
}

#[test]
fn opaque_envelope_pays_full_rate_on_art48ter_buildings() {
    let context = ContextData::for_building(BuildingCategory::TertiarySchool);
    let incentive = calculators::calculate(
        catalog().tables(),
        InterventionId::IsolamentoOpache,
        &opaque_params("E"),
        OperatorType::Pa,
        &context,
    )
    .expect("calculation succeeds");

    assert_close(incentive, 20_000.0);
}

#[test]
fn opaque_envelope_rates_follow_operator_and_zone() {
    assert_close(
        calc(InterventionId::IsolamentoOpache, &opaque_params("E"), OperatorType::Pa),
        13_000.0,
    );
    assert_close(
        calc(
            InterventionId::IsolamentoOpache,
            &opaque_params("E"),
            OperatorType::PrivateTertiarySme,
        ),
        10_000.0,
    );
    assert_close(
        calc(
            InterventionId::IsolamentoOpache,
            &opaque_params("C"),
            OperatorType::PrivateTertiarySme,
        ),
        8_000.0,
    );
}

#[test]
fn opaque_rows_are_capped_at_their_structure_ceiling_and_incomplete_rows_skipped() {
    let params = InterventionParams::new()
        .with(
            "righe_opache",
            vec![
                // 500 €/m² against a 100 €/m² ceiling.
                opaque_row("parete_interno", 10.0, 5_000.0),
                InterventionParams::new().with("tipologia_struttura", "copertura_esterno"),
            ],
        )
        .with("zona_climatica", "B");

    assert_close(
        calc(InterventionId::IsolamentoOpache, &params, OperatorType::PrivateTertiaryLarge),
        0.40 * 100.0 * 10.0,
    );
}

#[test]
fn glazing_uses_zone_ceiling_and_private_rate() {
    let incentive = calc(
        InterventionId::SostituzioneInfissi,
        &glazing_params(50.0, 700.0, "D"),
        OperatorType::PrivateTertiarySme,
    );
    assert_close(incentive, 14_000.0);

    let cold = calc(
        InterventionId::SostituzioneInfissi,
        &glazing_params(50.0, 900.0, "E"),
        OperatorType::PrivateTertiarySme,
    );
    assert_close(cold, 0.50 * 800.0 * 50.0);

    let mild = calc(
        InterventionId::SostituzioneInfissi,
        &glazing_params(50.0, 900.0, "B"),
        OperatorType::Pa,
    );
    assert_close(mild, 700.0 * 50.0);
}

#[test]
fn eu_products_premium_is_applied_inside_area_priced_works() {
    let incentive = calc(
        InterventionId::SostituzioneInfissi,
        &with_eu_products(glazing_params(50.0, 700.0, "D")),
        OperatorType::PrivateTertiarySme,
    );
    assert_close(incentive, 14_000.0 * 1.10);
}

#[test]
fn absolute_caps_bound_large_projects() {
    let glazing = calc(
        InterventionId::SostituzioneInfissi,
        &glazing_params(10_000.0, 800.0, "E"),
        OperatorType::Pa,
    );
    assert_close(glazing, 500_000.0);

    let lighting = calc(
        InterventionId::IlluminazioneLed,
        &InterventionParams::new()
            .with("superficie", 10_000.0)
            .with("costo_specifico", 20.0)
            .with("tipo_lampada", "Alta efficienza"),
        OperatorType::Pa,
    );
    assert_close(lighting, 50_000.0);
}

#[test]
fn unknown_shading_type_prices_as_first_row() {
    let params = InterventionParams::new()
        .with("superficie", 10.0)
        .with("costo_specifico", 100.0)
        .with("tipo_schermatura", "Tende da sole");
    assert_close(
        calc(InterventionId::SchermatureSolari, &params, OperatorType::PrivateTertiaryPerson),
        0.40 * 100.0 * 10.0,
    );
}

#[test]
fn charging_ceilings_depend_on_connector_class() {
    let per_kw = calc(
        InterventionId::InfrastruttureRicarica,
        &InterventionParams::new()
            .with("tipo_infrastruttura", "Media (22-50kW)")
            .with("potenza", 40.0)
            .with("costo_totale", 55_000.0),
        OperatorType::PrivateTertiarySme,
    );
    assert_close(per_kw, 0.30 * 48_000.0);

    let per_point = calc(
        InterventionId::InfrastruttureRicarica,
        &InterventionParams::new()
            .with("tipo_infrastruttura", "Standard monofase (7.4-22kW)")
            .with("numero_punti", 2.7)
            .with("costo_totale", 5_000.0),
        OperatorType::Pa,
    );
    assert_close(per_point, 0.30 * 4_800.0);

    let unknown = calc(
        InterventionId::InfrastruttureRicarica,
        &InterventionParams::new().with("costo_totale", 5_000.0),
        OperatorType::Pa,
    );
    assert_eq!(unknown, 0.0);
}

#[test]
fn photovoltaic_adds_registry_bonus_to_rate() {
    let incentive = calc(
        InterventionId::FotovoltaicoAccumulo,
        &InterventionParams::new()
            .with("potenza_fv", 15.0)
            .with("capacita_accumulo", 10.0)
            .with("registro_ue", "Sì - Requisiti lett. b) (+10%)"),
        OperatorType::PrivateTertiarySme,
    );
    assert_close(incentive, 0.30 * (15.0 * 1_500.0 + 10.0 * 1_000.0));
}

#[test]
fn heat_pump_annual_incentive_is_multiplied_by_duration() {
    let private = calc(
        InterventionId::PompaCalore,
        &heat_pump_params(),
        OperatorType::PrivateTertiarySme,
    );
    // Qu = 10 × 1700, EI = Qu × 0.75, Ci = 0.150.
    assert_close(private, 0.150 * 12_750.0 * 2.0);

    let public = calc(InterventionId::PompaCalore, &heat_pump_params(), OperatorType::Pa);
    assert_close(public, 0.150 * 12_750.0 * 5.0);
}

#[test]
fn small_split_pumps_use_reduced_coefficient() {
    let params = heat_pump_params()
        .with("tipo_pompa", "aria/aria split/multisplit")
        .with("potenza_nominale", 6.0);
    assert_close(
        calc(InterventionId::PompaCalore, &params, OperatorType::PrivateResidential),
        0.070 * (6.0 * 1_700.0 * 0.75) * 2.0,
    );
}

#[test]
fn hybrid_factory_made_systems_get_higher_k() {
    let params = InterventionParams::new()
        .with("tipo_sistema", "Ibrido factory made (Pn ≤35kW)")
        .with("potenza_pdc", 10.0)
        .with("scop", 4.0)
        .with("scop_minimo", 4.0)
        .with("zona_climatica", "E");
    assert_close(
        calc(InterventionId::SistemiIbridi, &params, OperatorType::PrivateResidential),
        1.25 * 12_750.0 * 0.150 * 2.0,
    );
}

#[test]
fn biomass_boiler_applies_emission_factor_and_district_reduction() {
    let standalone = calc(
        InterventionId::Biomassa,
        &biomass_params(),
        OperatorType::PrivateTertiarySme,
    );
    assert_close(standalone, 30.0 * 1_700.0 * 0.060 * 1.2 * 2.0);

    let at_plant = calc(
        InterventionId::Biomassa,
        &biomass_params().with("centrale_teleriscaldamento", "Sì"),
        OperatorType::PrivateTertiarySme,
    );
    assert_close(at_plant, standalone * 0.80);
}

#[test]
fn biomass_stoves_scale_with_log_of_power() {
    let params = biomass_params()
        .with("tipo_generatore", "Stufa a pellet")
        .with("potenza_nominale", 12.0)
        .with("riduzione_emissioni", "Oltre il 50%");
    assert_close(
        calc(InterventionId::Biomassa, &params, OperatorType::PrivateResidential),
        3.35 * 12.0_f64.ln() * 1_700.0 * 0.055 * 1.5 * 2.0,
    );
}

#[test]
fn solar_thermal_prefers_certified_yield() {
    let base = InterventionParams::new()
        .with("superficie_lorda", 10.0)
        .with("tipo_impianto", "Produzione ACS")
        .with("tipo_collettore", "Piani vetrati");
    assert_close(
        calc(InterventionId::SolareTermico, &base, OperatorType::PrivateResidential),
        0.35 * 400.0 * 10.0 * 2.0,
    );

    let certified = base.with("qcol", 550.0);
    assert_close(
        calc(InterventionId::SolareTermico, &certified, OperatorType::PrivateResidential),
        0.35 * 550.0 * 10.0 * 2.0,
    );
}

#[test]
fn flat_rate_works_respect_their_tiers() {
    let water_heater = calc(
        InterventionId::ScaldacquaPdc,
        &InterventionParams::new()
            .with("capacita", 120.0)
            .with("classe_energetica", "Classe A")
            .with("costo_totale", 3_000.0),
        OperatorType::PrivateResidential,
    );
    assert_close(water_heater, 500.0);

    let district = calc(
        InterventionId::Teleriscaldamento,
        &InterventionParams::new()
            .with("potenza_contrattuale", 60.0)
            .with("costo_totale", 12_000.0),
        OperatorType::PrivateResidential,
    );
    assert_close(district, 0.65 * 9_600.0);

    let cogeneration = calc(
        InterventionId::Microcogenerazione,
        &InterventionParams::new()
            .with("potenza_elettrica", 40.0)
            .with("costo_totale", 400_000.0),
        OperatorType::Pa,
    );
    assert_close(cogeneration, 100_000.0);
}

#[test]
fn missing_inputs_yield_zero_for_every_intervention() {
    let empty = InterventionParams::new();
    for intervention in InterventionId::ALL {
        for operator in OperatorType::ALL {
            assert_eq!(
                calc(intervention, &empty, operator),
                0.0,
                "{intervention} for {operator}"
            );
        }
    }
}

#[test]
fn non_positive_inputs_yield_zero() {
    let params = glazing_params(-5.0, 700.0, "D");
    assert_eq!(
        calc(InterventionId::SostituzioneInfissi, &params, OperatorType::Pa),
        0.0
    );
}

#[test]
fn malformed_values_raise_calculation_fault() {
    let params = glazing_params(50.0, 700.0, "D").with("superficie", "cinquanta");
    let fault = calculators::calculate(
        catalog().tables(),
        InterventionId::SostituzioneInfissi,
        &params,
        OperatorType::Pa,
        &no_context(),
    )
    .expect_err("text area is rejected");

    assert_eq!(
        fault,
        CalculationFault::InvalidNumber {
            field: "superficie".to_string(),
            found: "cinquanta".to_string(),
        }
    );
}

#[test]
fn numeric_text_is_accepted() {
    let params = InterventionParams::new()
        .with("superficie", "50")
        .with("costo_specifico", "700")
        .with("zona_climatica", "D");
    assert_close(
        calc(InterventionId::SostituzioneInfissi, &params, OperatorType::PrivateTertiarySme),
        14_000.0,
    );
}

#[test]
fn explanation_lists_formula_variables_and_steps() {
    let explained = calculators::explain(
        catalog().tables(),
        InterventionId::SostituzioneInfissi,
        &glazing_params(50.0, 700.0, "D"),
        OperatorType::PrivateTertiarySme,
        &no_context(),
    )
    .expect("explanation succeeds");

    assert_eq!(explained.intervention, InterventionId::SostituzioneInfissi);
    assert!(explained.formula.contains("min(C, 800)"));
    assert_eq!(explained.variable("p"), Some(&ExplainValue::Number(0.40)));
    assert_eq!(explained.variable("Sint"), Some(&ExplainValue::Number(50.0)));
    assert!(!explained.steps.is_empty());
}
