use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::calculators::{self, ExplainResult};
use super::catalog::{
    BuildingInfo, ImplementationModeInfo, InterventionSpec, PremiumDefinition, RuleCatalog,
    SubjectInfo,
};
use super::combination::{
    CalculationContext, CombinationEngine, CombinationResult, UnknownSelection,
};
use super::domain::{
    BuildingCategory, ContextData, InterventionId, OperatorType, PremiumId, SubjectType,
};
use super::error::IncentiveError;
use super::params::InterventionParams;
use super::resolver::{OperatorResolver, ResolvedOperator};
use super::validation::{validate_inputs, MissingRequiredInput};

/// Reference data a client needs to build the intake form.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub ruleset: &'static str,
    pub subjects: &'static [SubjectInfo],
    pub buildings: &'static [BuildingInfo],
    pub implementation_modes: &'static [ImplementationModeInfo],
    pub premiums: &'static [PremiumDefinition],
    pub interventions: &'static [InterventionSpec],
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveRequest {
    pub subject: String,
    pub building: String,
}

/// Single-intervention request; identifiers travel as their wire ids.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculationRequest {
    pub intervention: String,
    #[serde(default)]
    pub params: InterventionParams,
    pub operator: String,
    #[serde(default)]
    pub context: ContextData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResponse {
    pub intervention: InterventionId,
    pub operator: OperatorType,
    pub incentive: f64,
}

/// Multi-intervention request with wire ids for the selection.
///
/// Unlike [`CalculationContext`], an unknown intervention id does not reject the request:
/// it is reported in `unknown_interventions` and the remaining selection is priced.
#[derive(Debug, Clone, Deserialize)]
pub struct CombineRequest {
    pub selected_interventions: Vec<String>,
    #[serde(default)]
    pub inputs_by_intervention: BTreeMap<String, InterventionParams>,
    pub operator_type: OperatorType,
    #[serde(default)]
    pub selected_global_premiums: Vec<PremiumId>,
    #[serde(default)]
    pub context_data: ContextData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationRequest {
    pub selected_interventions: Vec<InterventionId>,
    #[serde(default)]
    pub inputs_by_intervention: BTreeMap<InterventionId, InterventionParams>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<MissingRequiredInput>,
}

fn parse_subject(value: &str) -> Result<SubjectType, IncentiveError> {
    SubjectType::from_id(value.trim()).ok_or_else(|| IncentiveError::UnknownSubject(value.to_string()))
}

fn parse_building(value: &str) -> Result<BuildingCategory, IncentiveError> {
    BuildingCategory::from_id(value.trim())
        .ok_or_else(|| IncentiveError::UnknownBuilding(value.to_string()))
}

fn parse_intervention(value: &str) -> Result<InterventionId, IncentiveError> {
    InterventionId::from_id(value.trim())
        .ok_or_else(|| IncentiveError::UnknownIntervention(value.to_string()))
}

fn parse_operator(value: &str) -> Result<OperatorType, IncentiveError> {
    OperatorType::from_id(value.trim())
        .ok_or_else(|| IncentiveError::UnknownOperator(value.to_string()))
}

/// Entry point shared by the HTTP router and the CLI.
///
/// Holds the catalogue behind an `Arc` so handlers can clone the service cheaply.
#[derive(Debug, Clone)]
pub struct IncentiveService {
    catalog: Arc<RuleCatalog>,
}

impl IncentiveService {
    pub fn new(catalog: RuleCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn catalog_view(&self) -> CatalogView {
        CatalogView {
            ruleset: self.catalog.ruleset(),
            subjects: self.catalog.subjects(),
            buildings: self.catalog.buildings(),
            implementation_modes: self.catalog.implementation_modes(),
            premiums: self.catalog.premiums(),
            interventions: self.catalog.interventions(),
        }
    }

    pub fn resolve(&self, subject: &str, building: &str) -> Result<ResolvedOperator, IncentiveError> {
        let subject = parse_subject(subject)?;
        let building = parse_building(building)?;
        OperatorResolver::new(&self.catalog).resolve(subject, building)
    }

    pub fn calculate(
        &self,
        request: &CalculationRequest,
    ) -> Result<CalculationResponse, IncentiveError> {
        let intervention = parse_intervention(&request.intervention)?;
        let operator = parse_operator(&request.operator)?;
        let incentive = calculators::calculate(
            self.catalog.tables(),
            intervention,
            &request.params,
            operator,
            &request.context,
        )?;
        Ok(CalculationResponse {
            intervention,
            operator,
            incentive,
        })
    }

    pub fn explain(&self, request: &CalculationRequest) -> Result<ExplainResult, IncentiveError> {
        let intervention = parse_intervention(&request.intervention)?;
        let operator = parse_operator(&request.operator)?;
        let explained = calculators::explain(
            self.catalog.tables(),
            intervention,
            &request.params,
            operator,
            &request.context,
        )?;
        Ok(explained)
    }

    pub fn combine(&self, request: &CalculationContext) -> CombinationResult {
        CombinationEngine::new(&self.catalog).combine(request)
    }

    pub fn combine_selection(&self, request: &CombineRequest) -> CombinationResult {
        let mut context = CalculationContext::new(request.operator_type)
            .with_context(request.context_data.clone());
        context.selected_global_premiums = request.selected_global_premiums.clone();
        let mut unknown = Vec::new();

        for raw in &request.selected_interventions {
            match parse_intervention(raw) {
                Ok(intervention) => {
                    let params = request
                        .inputs_by_intervention
                        .get(raw)
                        .or_else(|| request.inputs_by_intervention.get(intervention.id()))
                        .cloned()
                        .unwrap_or_default();
                    context = context.select(intervention, params);
                }
                Err(error) => {
                    warn!(intervention = %raw, "unknown intervention skipped");
                    unknown.push(UnknownSelection {
                        id: raw.clone(),
                        error: error.to_string(),
                    });
                }
            }
        }

        let mut result = self.combine(&context);
        result.unknown_interventions = unknown;
        result
    }

    pub fn validate(&self, request: &ValidationRequest) -> ValidationReport {
        match validate_inputs(
            &self.catalog,
            &request.selected_interventions,
            &request.inputs_by_intervention,
        ) {
            Ok(()) => ValidationReport {
                valid: true,
                issues: Vec::new(),
            },
            Err(error) => ValidationReport {
                valid: false,
                issues: error.issues,
            },
        }
    }

    /// Validates the request first, then combines it.
    pub fn quote(&self, request: &CalculationContext) -> Result<CombinationResult, IncentiveError> {
        validate_inputs(
            &self.catalog,
            &request.selected_interventions,
            &request.inputs_by_intervention,
        )?;
        Ok(self.combine(request))
    }
}

impl Default for IncentiveService {
    fn default() -> Self {
        Self::new(RuleCatalog::standard())
    }
}
