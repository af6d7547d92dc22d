//! Conto Termico 3.0 incentive engine.
//!
//! Data flows one way: the [`OperatorResolver`] classifies the applicant, the calculators
//! price each selected intervention, the [`PremiumEngine`] layers bonuses on top and the
//! [`CombinationEngine`] aggregates, overrides and caps. Every stage reads from an immutable
//! [`RuleCatalog`] that is built once and passed in.

pub mod calculators;
pub mod catalog;
pub mod combination;
pub mod domain;
pub mod error;
pub mod export;
mod format;
pub mod params;
pub mod premiums;
pub mod resolver;
pub mod router;
pub mod schema;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use calculators::{ExplainResult, ExplainValue, ExplainVariable};
pub use catalog::{InterventionSpec, OperatorMapping, PremiumDefinition, RuleCatalog};
pub use combination::{
    CalculationContext, CombinationEngine, CombinationMode, CombinationResult, InterventionDetail,
    UnknownSelection,
};
pub use domain::{
    BuildingCategory, ClimateZone, ContextData, ImplementationMode, InterventionCategory,
    InterventionId, OperatorType, PremiumId, SubjectType,
};
pub use error::IncentiveError;
pub use export::{export_csv, ExportError};
pub use params::{CalculationFault, InterventionParams, ParamValue};
pub use premiums::{AppliedPremium, DocumentationRequirement, PremiumEngine};
pub use resolver::{ModeOption, OperatorResolver, ResolvedOperator};
pub use router::incentive_router;
pub use schema::{FieldBound, FieldKind, InputField, Limit, VisibilityRule};
pub use service::{
    CalculationRequest, CalculationResponse, CatalogView, CombineRequest, IncentiveService,
    ResolveRequest, ValidationReport, ValidationRequest,
};
pub use validation::{validate_inputs, InputIssue, MissingRequiredInput, ValidationError};

/// Resolves an applicant against the standard catalogue.
pub fn resolve_operator(
    subject: SubjectType,
    building: BuildingCategory,
) -> Result<ResolvedOperator, IncentiveError> {
    OperatorResolver::new(&RuleCatalog::standard()).resolve(subject, building)
}

/// Prices one intervention with the standard rate tables.
pub fn calculate(
    intervention: InterventionId,
    params: &InterventionParams,
    operator: OperatorType,
    context: &ContextData,
) -> Result<f64, CalculationFault> {
    calculators::calculate(
        RuleCatalog::standard().tables(),
        intervention,
        params,
        operator,
        context,
    )
}

pub fn explain(
    intervention: InterventionId,
    params: &InterventionParams,
    operator: OperatorType,
    context: &ContextData,
) -> Result<ExplainResult, CalculationFault> {
    calculators::explain(
        RuleCatalog::standard().tables(),
        intervention,
        params,
        operator,
        context,
    )
}

/// Combines a selection with the standard catalogue.
pub fn combine(request: &CalculationContext) -> CombinationResult {
    CombinationEngine::new(&RuleCatalog::standard()).combine(request)
}
