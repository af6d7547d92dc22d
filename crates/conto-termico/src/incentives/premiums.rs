//! Premium layering on top of base incentives.
//!
//! Premiums never rewrite a base amount: each one yields a delta on the running total and is
//! recorded as an [`AppliedPremium`].

use super::catalog::{
    PremiumDefinition, PremiumScope, RuleCatalog, MULTI_INTERVENTION_TARGETS,
    MULTI_INTERVENTION_TRIGGERS,
};
use super::domain::{InterventionId, OperatorType, PremiumId};
use super::params::{CalculationFault, InterventionParams};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedPremium {
    pub id: PremiumId,
    pub name: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AppliedPremium {
    pub(crate) fn new(id: PremiumId, name: impl Into<String>, value: f64) -> Self {
        Self {
            id,
            name: name.into(),
            value,
            note: None,
        }
    }

    pub(crate) fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Paperwork the applicant must attach for a premium that was counted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentationRequirement {
    pub premium: PremiumId,
    pub text: &'static str,
}

/// Whether the selection pairs an envelope work with a qualifying Title III work.
pub fn qualifies_for_multi_intervention(selection: &[InterventionId]) -> bool {
    let has_target = selection
        .iter()
        .any(|id| MULTI_INTERVENTION_TARGETS.contains(id));
    let has_trigger = selection
        .iter()
        .any(|id| MULTI_INTERVENTION_TRIGGERS.contains(id));
    has_target && has_trigger
}

pub struct PremiumEngine<'a> {
    catalog: &'a RuleCatalog,
}

impl<'a> PremiumEngine<'a> {
    pub fn new(catalog: &'a RuleCatalog) -> Self {
        Self { catalog }
    }

    fn scoped(&self, scope: PremiumScope) -> impl Iterator<Item = &'a PremiumDefinition> {
        self.catalog
            .premiums()
            .iter()
            .filter(move |premium| premium.scope == scope)
    }

    /// Applies per-intervention premiums to `base` in catalogue order.
    ///
    /// `prodotti-ue` is skipped: the calculators already include it.
    pub fn apply_per_intervention(
        &self,
        intervention: InterventionId,
        base: f64,
        params: &InterventionParams,
        selection: &[InterventionId],
    ) -> Result<(f64, Vec<AppliedPremium>), CalculationFault> {
        let mut running = base;
        let mut applied = Vec::new();

        for premium in self.scoped(PremiumScope::PerIntervention) {
            if !premium.applies_to.covers(intervention) {
                continue;
            }
            let active = match premium.id {
                PremiumId::MultiIntervento => qualifies_for_multi_intervention(selection),
                PremiumId::EmissioniBiomassa => {
                    params.premium_selected(premium.id)
                        && params.text("emissioni")?.as_deref() == Some("5")
                }
                PremiumId::ProdottiUe
                | PremiumId::Pmi
                | PremiumId::DiagnosiEnergetica
                | PremiumId::Incentivo100Auto => false,
            };
            if !active {
                continue;
            }

            let delta = premium.kind.delta(running);
            running += delta;
            applied.push(AppliedPremium::new(premium.id, premium.name, delta));
        }

        Ok((running, applied))
    }

    /// Applies the selected global premiums to `subtotal` in catalogue order.
    pub fn apply_global(
        &self,
        subtotal: f64,
        selected: &[PremiumId],
        operator: OperatorType,
    ) -> (f64, Vec<AppliedPremium>) {
        let mut running = subtotal;
        let mut applied = Vec::new();

        for premium in self.scoped(PremiumScope::Global) {
            if !selected.contains(&premium.id) {
                continue;
            }
            let eligible = match premium.id {
                PremiumId::Pmi => operator == OperatorType::PrivateTertiarySme,
                PremiumId::DiagnosiEnergetica => true,
                PremiumId::MultiIntervento
                | PremiumId::ProdottiUe
                | PremiumId::EmissioniBiomassa
                | PremiumId::Incentivo100Auto => false,
            };
            if !eligible {
                continue;
            }

            let delta = premium.kind.delta(running);
            running += delta;
            applied.push(AppliedPremium::new(premium.id, premium.short_name, delta));
        }

        (running, applied)
    }

    /// Documentation owed for the premiums that were counted in a quote.
    pub fn documentation(
        &self,
        selection: &[InterventionId],
        inputs: &BTreeMap<InterventionId, InterventionParams>,
        applied_global: &[AppliedPremium],
    ) -> Vec<DocumentationRequirement> {
        let mut required: Vec<DocumentationRequirement> = Vec::new();
        let mut push = |premium: &PremiumDefinition| {
            if let Some(text) = premium.requires_documentation {
                if !required.iter().any(|entry| entry.premium == premium.id) {
                    required.push(DocumentationRequirement {
                        premium: premium.id,
                        text,
                    });
                }
            }
        };

        for premium in self.scoped(PremiumScope::PerIntervention) {
            let claimed = selection.iter().any(|id| {
                premium.applies_to.covers(*id)
                    && inputs
                        .get(id)
                        .map(|params| params.premium_selected(premium.id))
                        .unwrap_or(false)
            });
            if claimed {
                push(premium);
            }
        }
        for premium in self.scoped(PremiumScope::Global) {
            if applied_global.iter().any(|entry| entry.id == premium.id) {
                push(premium);
            }
        }

        required
    }
}
