use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::incentives::domain::{ContextData, InterventionId, OperatorType, PremiumId};
use crate::incentives::params::InterventionParams;
use crate::incentives::{incentive_router, IncentiveService, RuleCatalog};

pub(super) fn catalog() -> RuleCatalog {
    RuleCatalog::standard()
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn opaque_row(structure: &str, area: f64, cost: f64) -> InterventionParams {
    InterventionParams::new()
        .with("tipologia_struttura", structure)
        .with("superficie", area)
        .with("costo_totale", cost)
}

/// 100 m² of external wall insulation costing 200 €/m².
pub(super) fn opaque_params(zone: &str) -> InterventionParams {
    InterventionParams::new()
        .with("righe_opache", vec![opaque_row("parete_esterno", 100.0, 20_000.0)])
        .with("zona_climatica", zone)
}

pub(super) fn glazing_params(area: f64, unit_cost: f64, zone: &str) -> InterventionParams {
    InterventionParams::new()
        .with("superficie", area)
        .with("costo_specifico", unit_cost)
        .with("zona_climatica", zone)
}

/// 10 kW air/water pump in zone E with SCOP equal to the ecodesign minimum.
pub(super) fn heat_pump_params() -> InterventionParams {
    InterventionParams::new()
        .with("tipo_pompa", "aria/acqua (≤35kW)")
        .with("potenza_nominale", 10.0)
        .with("scop", 4.0)
        .with("scop_minimo", 4.0)
        .with("zona_climatica", "E")
        .with("costo_totale", 12_000.0)
}

pub(super) fn biomass_params() -> InterventionParams {
    InterventionParams::new()
        .with("tipo_generatore", "Caldaia a biomassa")
        .with("potenza_nominale", 30.0)
        .with("zona_climatica", "E")
        .with("riduzione_emissioni", "Dal 20% al 50%")
        .with("centrale_teleriscaldamento", "No")
        .with("emissioni", "5")
        .with("costo_totale", 25_000.0)
}

/// One complete, valid input set per catalogue entry.
pub(super) fn sample_inputs() -> Vec<(InterventionId, InterventionParams)> {
    vec![
        (InterventionId::IsolamentoOpache, opaque_params("E")),
        (
            InterventionId::SostituzioneInfissi,
            glazing_params(50.0, 700.0, "D"),
        ),
        (
            InterventionId::SchermatureSolari,
            InterventionParams::new()
                .with("superficie", 40.0)
                .with("costo_specifico", 300.0)
                .with("tipo_schermatura", "Schermature/ombreggiamento"),
        ),
        (
            InterventionId::Nzeb,
            glazing_params(800.0, 1_500.0, "B"),
        ),
        (
            InterventionId::IlluminazioneLed,
            InterventionParams::new()
                .with("superficie", 2_000.0)
                .with("costo_specifico", 40.0)
                .with("tipo_lampada", "LED"),
        ),
        (
            InterventionId::BuildingAutomation,
            InterventionParams::new()
                .with("superficie", 1_500.0)
                .with("costo_specifico", 45.0),
        ),
        (
            InterventionId::InfrastruttureRicarica,
            InterventionParams::new()
                .with("tipo_infrastruttura", "Media (22-50kW)")
                .with("potenza", 40.0)
                .with("costo_totale", 55_000.0),
        ),
        (
            InterventionId::FotovoltaicoAccumulo,
            InterventionParams::new()
                .with("potenza_fv", 15.0)
                .with("capacita_accumulo", 10.0)
                .with("registro_ue", "Sì - Requisiti lett. b) (+10%)"),
        ),
        (InterventionId::PompaCalore, heat_pump_params()),
        (
            InterventionId::SistemiIbridi,
            InterventionParams::new()
                .with("tipo_sistema", "Ibrido factory made (Pn ≤35kW)")
                .with("potenza_pdc", 8.0)
                .with("scop", 3.8)
                .with("scop_minimo", 3.2)
                .with("zona_climatica", "D")
                .with("costo_totale", 9_000.0),
        ),
        (InterventionId::Biomassa, biomass_params()),
        (
            InterventionId::SolareTermico,
            InterventionParams::new()
                .with("superficie_lorda", 10.0)
                .with("tipo_impianto", "Produzione ACS")
                .with("tipo_collettore", "Piani vetrati")
                .with("costo_totale", 8_000.0),
        ),
        (
            InterventionId::ScaldacquaPdc,
            InterventionParams::new()
                .with("capacita", 200.0)
                .with("classe_energetica", "Classe A+")
                .with("costo_totale", 3_000.0),
        ),
        (
            InterventionId::Teleriscaldamento,
            InterventionParams::new()
                .with("potenza_contrattuale", 60.0)
                .with("costo_totale", 12_000.0),
        ),
        (
            InterventionId::Microcogenerazione,
            InterventionParams::new()
                .with("potenza_elettrica", 20.0)
                .with("costo_totale", 150_000.0),
        ),
    ]
}

pub(super) fn with_eu_products(params: InterventionParams) -> InterventionParams {
    params.with_premium(PremiumId::ProdottiUe)
}

pub(super) fn no_context() -> ContextData {
    ContextData::default()
}

pub(super) const PRIVATE_OPERATORS: [OperatorType; 4] = [
    OperatorType::PrivateTertiaryPerson,
    OperatorType::PrivateTertiarySme,
    OperatorType::PrivateTertiaryLarge,
    OperatorType::PrivateResidential,
];

pub(super) fn service() -> Arc<IncentiveService> {
    Arc::new(IncentiveService::default())
}

pub(super) fn router() -> axum::Router {
    incentive_router(service())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
