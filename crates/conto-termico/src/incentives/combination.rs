//! Multi-intervention quotes.
//!
//! A quote runs in one of two modes, chosen before any calculation: the standard flow
//! (base incentives, premiums, operator cap) or full coverage, where each intervention pays
//! back its whole cost up to the incentive the standard formula would grant.

use super::calculators;
use super::catalog::RuleCatalog;
use super::domain::{BuildingCategory, ContextData, InterventionId, OperatorType, PremiumId};
use super::format::{euro, italian};
use super::params::{CalculationFault, InterventionParams};
use super::premiums::{AppliedPremium, DocumentationRequirement, PremiumEngine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Everything needed to quote a set of interventions for one applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationContext {
    pub selected_interventions: Vec<InterventionId>,
    #[serde(default)]
    pub inputs_by_intervention: BTreeMap<InterventionId, InterventionParams>,
    pub operator_type: OperatorType,
    #[serde(default)]
    pub selected_global_premiums: Vec<PremiumId>,
    #[serde(default)]
    pub context_data: ContextData,
}

impl CalculationContext {
    pub fn new(operator_type: OperatorType) -> Self {
        Self {
            selected_interventions: Vec::new(),
            inputs_by_intervention: BTreeMap::new(),
            operator_type,
            selected_global_premiums: Vec::new(),
            context_data: ContextData::default(),
        }
    }

    pub fn select(mut self, intervention: InterventionId, params: InterventionParams) -> Self {
        self.selected_interventions.push(intervention);
        self.inputs_by_intervention.insert(intervention, params);
        self
    }

    pub fn with_global_premium(mut self, premium: PremiumId) -> Self {
        self.selected_global_premiums.push(premium);
        self
    }

    pub fn with_context(mut self, context: ContextData) -> Self {
        self.context_data = context;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationMode {
    Standard,
    Incentivo100,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterventionDetail {
    pub intervention: InterventionId,
    pub name: String,
    pub base_incentive: f64,
    pub premiums: Vec<AppliedPremium>,
    pub final_incentive: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InterventionDetail {
    fn failed(intervention: InterventionId, name: String, fault: &CalculationFault) -> Self {
        Self {
            intervention,
            name,
            base_incentive: 0.0,
            premiums: Vec::new(),
            final_incentive: 0.0,
            note: None,
            error: Some(fault.to_string()),
        }
    }
}

/// A selected id the catalogue does not know; the rest of the quote is still priced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnknownSelection {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinationResult {
    pub mode: CombinationMode,
    pub total: f64,
    pub subtotal: f64,
    pub details: Vec<InterventionDetail>,
    pub applied_global_premiums: Vec<AppliedPremium>,
    pub was_capped: bool,
    pub original_total: f64,
    pub cap: f64,
    pub is_incentivo_100: bool,
    pub documentation: Vec<DocumentationRequirement>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown_interventions: Vec<UnknownSelection>,
}

impl CombinationResult {
    pub fn detail(&self, intervention: InterventionId) -> Option<&InterventionDetail> {
        self.details
            .iter()
            .find(|detail| detail.intervention == intervention)
    }

    pub fn global_premium(&self, premium: PremiumId) -> Option<&AppliedPremium> {
        self.applied_global_premiums
            .iter()
            .find(|applied| applied.id == premium)
    }
}

/// Why a quote runs in full-coverage mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FullCoverage {
    Art48ter(BuildingCategory),
    SmallMunicipality,
}

impl FullCoverage {
    fn detect(context: &ContextData) -> Option<Self> {
        match context.building_subcategory {
            Some(building) if building.is_art48ter() => Some(FullCoverage::Art48ter(building)),
            _ if context.is_small_municipality() => Some(FullCoverage::SmallMunicipality),
            _ => None,
        }
    }

    fn reason(self) -> String {
        match self {
            FullCoverage::Art48ter(building) => {
                format!("Art. 48-ter ({})", building.art48ter_label().unwrap_or_default())
            }
            FullCoverage::SmallMunicipality => "Comune < 15.000 abitanti".to_string(),
        }
    }

    fn premium_name(self) -> &'static str {
        match self {
            FullCoverage::Art48ter(_) => "Incentivo 100% - Art. 48-ter",
            FullCoverage::SmallMunicipality => "Incentivo 100% - Piccolo Comune",
        }
    }

    fn note(self, total_cost: f64, total_ceiling: f64) -> String {
        let amounts = format!(
            "totale spesa: €{}, tetto massimo: €{}",
            italian(total_cost, 2),
            italian(total_ceiling, 2)
        );
        match self {
            FullCoverage::Art48ter(building) => format!(
                "Art. 48-ter applicato automaticamente per {}. Incentivo al 100% della spesa ammissibile ({amounts})",
                building_description(building)
            ),
            FullCoverage::SmallMunicipality => format!(
                "Maggiorazione per Comune sotto 15.000 abitanti applicata. L'edificio è di proprietà ed utilizzato dal Comune, con intervento diretto. Incentivo al 100% della spesa ammissibile ({amounts}). Dovrai attestare queste condizioni nella richiesta al GSE."
            ),
        }
    }
}

fn building_description(building: BuildingCategory) -> &'static str {
    match building {
        BuildingCategory::TertiarySchool => "edificio scolastico",
        BuildingCategory::TertiaryHospital => "struttura ospedaliera/sanitaria pubblica",
        BuildingCategory::TertiaryPrison => "struttura penitenziaria",
        BuildingCategory::Residential
        | BuildingCategory::Tertiary
        | BuildingCategory::TertiaryGeneric => "edificio",
    }
}

const EXPLICIT_COST_FIELDS: [&str; 3] = ["costo_totale", "spesa_totale", "costo_intervento"];

/// Expense that full coverage reimburses.
///
/// Only an explicit cost, the opaque-structure rows or `superficie × costo_specifico` are
/// understood; anything else counts as zero expense.
fn declared_cost(params: &InterventionParams) -> Result<f64, CalculationFault> {
    for field in EXPLICIT_COST_FIELDS {
        if let Some(cost) = params.positive(field)? {
            return Ok(cost);
        }
    }

    let rows = params.rows("righe_opache")?;
    if !rows.is_empty() {
        let mut total = 0.0;
        for row in rows {
            total += row.number("costo_totale")?.unwrap_or(0.0);
        }
        return Ok(total);
    }

    match (
        params.positive("superficie")?,
        params.positive("costo_specifico")?,
    ) {
        (Some(area), Some(unit_cost)) => Ok(area * unit_cost),
        _ => Ok(0.0),
    }
}

pub struct CombinationEngine<'a> {
    catalog: &'a RuleCatalog,
}

impl<'a> CombinationEngine<'a> {
    pub fn new(catalog: &'a RuleCatalog) -> Self {
        Self { catalog }
    }

    fn name_of(&self, intervention: InterventionId) -> String {
        self.catalog
            .intervention(intervention)
            .map(|spec| spec.name)
            .unwrap_or(intervention.id())
            .to_string()
    }

    pub fn combine(&self, request: &CalculationContext) -> CombinationResult {
        let result = match FullCoverage::detect(&request.context_data) {
            Some(coverage) => self.combine_full_coverage(request, coverage),
            None => self.combine_standard(request),
        };
        info!(
            mode = ?result.mode,
            operator = %request.operator_type,
            interventions = result.details.len(),
            total = result.total,
            was_capped = result.was_capped,
            "combination completed"
        );
        result
    }

    fn contain(&self, intervention: InterventionId, fault: &CalculationFault) -> InterventionDetail {
        warn!(%intervention, error = %fault, "calculation fault contained");
        InterventionDetail::failed(intervention, self.name_of(intervention), fault)
    }

    fn combine_full_coverage(
        &self,
        request: &CalculationContext,
        coverage: FullCoverage,
    ) -> CombinationResult {
        let tables = self.catalog.tables();
        let empty = InterventionParams::new();
        let reason = coverage.reason();
        let mut details = Vec::with_capacity(request.selected_interventions.len());
        let mut subtotal = 0.0;
        let mut total_cost = 0.0;
        let mut total_ceiling = 0.0;

        for &intervention in &request.selected_interventions {
            let params = request
                .inputs_by_intervention
                .get(&intervention)
                .unwrap_or(&empty);
            let outcome = calculators::calculate(
                tables,
                intervention,
                params,
                request.operator_type,
                &request.context_data,
            )
            .and_then(|ceiling| Ok((declared_cost(params)?, ceiling)));

            let (cost, ceiling) = match outcome {
                Ok(amounts) => amounts,
                Err(fault) => {
                    details.push(self.contain(intervention, &fault));
                    continue;
                }
            };

            let incentive = cost.min(ceiling);
            total_cost += cost;
            total_ceiling += ceiling;
            subtotal += incentive;
            details.push(InterventionDetail {
                intervention,
                name: self.name_of(intervention),
                base_incentive: incentive,
                premiums: vec![AppliedPremium::new(
                    PremiumId::Incentivo100Auto,
                    format!("Incentivo al 100% - {reason}"),
                    incentive,
                )],
                final_incentive: incentive,
                note: Some(format!("100% spesa ({}), max Imas {}", euro(cost), euro(ceiling))),
                error: None,
            });
        }

        let cap = self.catalog.combined_cap(request.operator_type);
        let total = subtotal.min(cap);
        let global = AppliedPremium::new(PremiumId::Incentivo100Auto, coverage.premium_name(), subtotal)
            .with_note(coverage.note(total_cost, total_ceiling));
        let applied_global_premiums = vec![global];
        let documentation = PremiumEngine::new(self.catalog).documentation(
            &request.selected_interventions,
            &request.inputs_by_intervention,
            &applied_global_premiums,
        );

        CombinationResult {
            mode: CombinationMode::Incentivo100,
            total,
            subtotal,
            details,
            applied_global_premiums,
            was_capped: total < subtotal,
            original_total: subtotal,
            cap,
            is_incentivo_100: true,
            documentation,
            unknown_interventions: Vec::new(),
        }
    }

    fn standard_detail(
        &self,
        engine: &PremiumEngine<'_>,
        request: &CalculationContext,
        intervention: InterventionId,
        params: &InterventionParams,
    ) -> Result<InterventionDetail, CalculationFault> {
        let base = calculators::calculate(
            self.catalog.tables(),
            intervention,
            params,
            request.operator_type,
            &request.context_data,
        )?;
        let (final_incentive, premiums) = engine.apply_per_intervention(
            intervention,
            base,
            params,
            &request.selected_interventions,
        )?;

        Ok(InterventionDetail {
            intervention,
            name: self.name_of(intervention),
            base_incentive: base,
            premiums,
            final_incentive,
            note: None,
            error: None,
        })
    }

    fn combine_standard(&self, request: &CalculationContext) -> CombinationResult {
        let engine = PremiumEngine::new(self.catalog);
        let empty = InterventionParams::new();
        let mut details = Vec::with_capacity(request.selected_interventions.len());
        let mut subtotal = 0.0;

        for &intervention in &request.selected_interventions {
            let params = request
                .inputs_by_intervention
                .get(&intervention)
                .unwrap_or(&empty);
            match self.standard_detail(&engine, request, intervention, params) {
                Ok(detail) => {
                    subtotal += detail.final_incentive;
                    details.push(detail);
                }
                Err(fault) => details.push(self.contain(intervention, &fault)),
            }
        }

        let mut applied_global_premiums = Vec::new();
        let multi_bonus: f64 = details
            .iter()
            .flat_map(|detail| &detail.premiums)
            .filter(|premium| premium.id == PremiumId::MultiIntervento)
            .map(|premium| premium.value)
            .sum();
        if multi_bonus > 0.0 {
            let name = self
                .catalog
                .premium(PremiumId::MultiIntervento)
                .map(|premium| premium.short_name)
                .unwrap_or(PremiumId::MultiIntervento.id());
            applied_global_premiums.push(AppliedPremium::new(
                PremiumId::MultiIntervento,
                name,
                multi_bonus,
            ));
        }

        let (original_total, global) = engine.apply_global(
            subtotal,
            &request.selected_global_premiums,
            request.operator_type,
        );
        applied_global_premiums.extend(global);

        let cap = self.catalog.combined_cap(request.operator_type);
        let total = original_total.min(cap);
        let documentation = engine.documentation(
            &request.selected_interventions,
            &request.inputs_by_intervention,
            &applied_global_premiums,
        );

        CombinationResult {
            mode: CombinationMode::Standard,
            total,
            subtotal,
            details,
            applied_global_premiums,
            was_capped: total < original_total,
            original_total,
            cap,
            is_incentivo_100: false,
            documentation,
            unknown_interventions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_cost_wins_over_derived_shapes() {
        let params = InterventionParams::new()
            .with("spesa_totale", 4_000.0)
            .with("superficie", 10.0)
            .with("costo_specifico", 100.0);
        assert_eq!(declared_cost(&params).expect("cost"), 4_000.0);
    }

    #[test]
    fn cost_is_derived_from_rows_or_area() {
        let rows = InterventionParams::new().with(
            "righe_opache",
            vec![
                InterventionParams::new().with("costo_totale", 1_500.0),
                InterventionParams::new().with("costo_totale", "2500"),
            ],
        );
        assert_eq!(declared_cost(&rows).expect("cost"), 4_000.0);

        let area = InterventionParams::new()
            .with("superficie", 20.0)
            .with("costo_specifico", 50.0);
        assert_eq!(declared_cost(&area).expect("cost"), 1_000.0);
        assert_eq!(declared_cost(&InterventionParams::new()).expect("cost"), 0.0);
    }

    #[test]
    fn full_coverage_prefers_art48ter_reason() {
        let context = ContextData::for_building(BuildingCategory::TertiaryHospital);
        let coverage = FullCoverage::detect(&context).expect("art. 48-ter applies");
        assert_eq!(coverage.reason(), "Art. 48-ter (Ospedale/Struttura sanitaria)");
        assert!(FullCoverage::detect(&ContextData::for_building(BuildingCategory::TertiaryGeneric))
            .is_none());
    }
}
