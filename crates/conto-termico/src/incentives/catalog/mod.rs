//! Read-only rule catalogue: reference data, operator matrix, intervention schemas,
//! premium definitions and the numeric rate tables.

mod interventions;
mod operators;
mod premiums;
pub mod tables;

pub use interventions::InterventionSpec;
pub use operators::{
    BuildingInfo, ImplementationModeInfo, InterventionPolicy, NoteSeverity, OperatorInfo,
    OperatorMapping, RegulatoryNote, SubjectInfo,
};
pub use premiums::{PremiumDefinition, PremiumKind, PremiumScope, PremiumTarget};
pub use tables::RateTables;

pub(crate) use premiums::{MULTI_INTERVENTION_TARGETS, MULTI_INTERVENTION_TRIGGERS};

use super::domain::{BuildingCategory, InterventionId, OperatorType, PremiumId, SubjectType};
use crate::config::Ruleset;
use serde::Serialize;

/// Immutable rule set shared by the resolver, calculators and combination engine.
#[derive(Debug, Clone, Serialize)]
pub struct RuleCatalog {
    ruleset: &'static str,
    subjects: &'static [SubjectInfo],
    buildings: &'static [BuildingInfo],
    implementation_modes: &'static [ImplementationModeInfo],
    operators: &'static [OperatorInfo],
    operator_matrix: &'static [OperatorMapping],
    interventions: &'static [InterventionSpec],
    premiums: &'static [PremiumDefinition],
    regulatory_notes: &'static [RegulatoryNote],
    rate_tables: &'static RateTables,
}

impl RuleCatalog {
    /// Conto Termico 3.0 rules.
    pub fn standard() -> Self {
        Self::for_ruleset(Ruleset::ContoTermico3)
    }

    pub fn for_ruleset(ruleset: Ruleset) -> Self {
        match ruleset {
            Ruleset::ContoTermico3 => Self {
                ruleset: ruleset.label(),
                subjects: &operators::SUBJECTS,
                buildings: &operators::BUILDINGS,
                implementation_modes: &operators::IMPLEMENTATION_MODES,
                operators: &operators::OPERATORS,
                operator_matrix: &operators::OPERATOR_MATRIX,
                interventions: &interventions::INTERVENTIONS,
                premiums: &premiums::PREMIUMS,
                regulatory_notes: &operators::REGULATORY_NOTES,
                rate_tables: tables::ct3(),
            },
        }
    }

    pub fn ruleset(&self) -> &'static str {
        self.ruleset
    }

    pub fn tables(&self) -> &'static RateTables {
        self.rate_tables
    }

    pub fn subjects(&self) -> &'static [SubjectInfo] {
        self.subjects
    }

    pub fn subject(&self, id: SubjectType) -> Option<&'static SubjectInfo> {
        self.subjects.iter().find(|subject| subject.id == id)
    }

    pub fn buildings(&self) -> &'static [BuildingInfo] {
        self.buildings
    }

    pub fn building(&self, id: BuildingCategory) -> Option<&'static BuildingInfo> {
        self.buildings.iter().find(|building| building.id == id)
    }

    pub fn implementation_modes(&self) -> &'static [ImplementationModeInfo] {
        self.implementation_modes
    }

    pub fn operator(&self, id: OperatorType) -> Option<&'static OperatorInfo> {
        self.operators.iter().find(|operator| operator.id == id)
    }

    /// Ceiling on a combined quote; 2 M€ when the class is not listed.
    pub fn combined_cap(&self, id: OperatorType) -> f64 {
        self.operator(id)
            .map(|operator| operator.combined_cap)
            .unwrap_or(2_000_000.0)
    }

    pub fn operator_mapping(&self, key: &str) -> Option<&'static OperatorMapping> {
        self.operator_matrix.iter().find(|row| row.key == key)
    }

    pub fn interventions(&self) -> &'static [InterventionSpec] {
        self.interventions
    }

    pub fn intervention(&self, id: InterventionId) -> Option<&'static InterventionSpec> {
        self.interventions.iter().find(|spec| spec.id == id)
    }

    /// Premium definitions in application order.
    pub fn premiums(&self) -> &'static [PremiumDefinition] {
        self.premiums
    }

    pub fn premium(&self, id: PremiumId) -> Option<&'static PremiumDefinition> {
        self.premiums.iter().find(|premium| premium.id == id)
    }

    /// Notes whose audience includes any of `keys`.
    pub fn notes_for(&self, keys: &[&str]) -> Vec<&'static RegulatoryNote> {
        self.regulatory_notes
            .iter()
            .filter(|note| note.applies_to.iter().any(|target| keys.contains(target)))
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn with_operator_matrix(mut self, matrix: &'static [OperatorMapping]) -> Self {
        self.operator_matrix = matrix;
        self
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_covers_every_intervention() {
        let catalog = RuleCatalog::standard();
        for id in InterventionId::ALL {
            assert!(catalog.intervention(id).is_some(), "missing {id}");
        }
        assert_eq!(catalog.premiums().len(), 5);
    }

    #[test]
    fn combined_caps_follow_operator_class() {
        let catalog = RuleCatalog::standard();
        assert_eq!(catalog.combined_cap(OperatorType::Pa), 5_000_000.0);
        assert_eq!(catalog.combined_cap(OperatorType::PrivateTertiarySme), 2_000_000.0);
        assert_eq!(catalog.combined_cap(OperatorType::PrivateResidential), 1_000_000.0);
    }

    #[test]
    fn notes_match_direct_and_parent_keys() {
        let catalog = RuleCatalog::standard();
        let notes = catalog.notes_for(&["pa_tertiary_school", "pa_tertiary"]);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, "public_buildings_special");
    }
}
