use crate::incentives::domain::{InterventionId, PremiumId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PremiumScope {
    Global,
    PerIntervention,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PremiumKind {
    /// Percentage points added to the running total.
    Percentage(f64),
    /// Flat euro amount.
    Fixed(f64),
}

impl PremiumKind {
    pub fn delta(self, running_total: f64) -> f64 {
        match self {
            PremiumKind::Percentage(points) => running_total * (points / 100.0),
            PremiumKind::Fixed(amount) => amount,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumTarget {
    Every,
    Only(&'static [InterventionId]),
}

impl PremiumTarget {
    pub fn covers(&self, intervention: InterventionId) -> bool {
        match self {
            PremiumTarget::Every => true,
            PremiumTarget::Only(targets) => targets.contains(&intervention),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PremiumDefinition {
    pub id: PremiumId,
    pub name: &'static str,
    /// Label used when the premium appears among the global entries of a quote.
    pub short_name: &'static str,
    pub description: &'static str,
    pub scope: PremiumScope,
    pub kind: PremiumKind,
    pub applies_to: PremiumTarget,
    /// Applied without user selection when the intervention mix qualifies.
    pub automatic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_documentation: Option<&'static str>,
}

/// Title II works boosted by the multi-intervention premium.
pub(crate) const MULTI_INTERVENTION_TARGETS: &[InterventionId] = &[
    InterventionId::IsolamentoOpache,
    InterventionId::SostituzioneInfissi,
];

/// Title III works that unlock the multi-intervention premium.
pub(crate) const MULTI_INTERVENTION_TRIGGERS: &[InterventionId] = &[
    InterventionId::PompaCalore,
    InterventionId::SistemiIbridi,
    InterventionId::Biomassa,
    InterventionId::ScaldacquaPdc,
];

const EU_PRODUCT_TARGETS: &[InterventionId] = &[
    InterventionId::IsolamentoOpache,
    InterventionId::SostituzioneInfissi,
    InterventionId::SchermatureSolari,
    InterventionId::Nzeb,
    InterventionId::IlluminazioneLed,
    InterventionId::BuildingAutomation,
    InterventionId::InfrastruttureRicarica,
    InterventionId::FotovoltaicoAccumulo,
];

/// Catalogue order is application order.
pub(crate) const PREMIUMS: [PremiumDefinition; 5] = [
    PremiumDefinition {
        id: PremiumId::MultiIntervento,
        name: "Maggiorazione multi-intervento",
        short_name: "Multi-intervento (dal 25% al 30%) - già applicato agli interventi Titolo II",
        description: "Porta l'incentivo dal 25% al 30% dei costi ammissibili per gli interventi 1.A e 1.B combinati con interventi 2.A, 2.B, 2.C o 2.E.",
        scope: PremiumScope::PerIntervention,
        kind: PremiumKind::Percentage(20.0),
        applies_to: PremiumTarget::Only(MULTI_INTERVENTION_TARGETS),
        automatic: true,
        requires_documentation: None,
    },
    PremiumDefinition {
        id: PremiumId::ProdottiUe,
        name: "Premio prodotti UE (+10%)",
        short_name: "Prodotti UE",
        description: "Maggiorazione del 10% per componenti tecnologici prodotti nell'Unione Europea (Art. 5).",
        scope: PremiumScope::PerIntervention,
        kind: PremiumKind::Percentage(10.0),
        applies_to: PremiumTarget::Only(EU_PRODUCT_TARGETS),
        automatic: false,
        requires_documentation: Some(
            "Attestazione ufficiale che certifica la produzione europea dei componenti",
        ),
    },
    PremiumDefinition {
        id: PremiumId::Pmi,
        name: "Maggiorazione per piccole e medie imprese (+15%)",
        short_name: "PMI (+15%)",
        description: "Maggiorazione del 15% dell'incentivo per PMI in ambito terziario.",
        scope: PremiumScope::Global,
        kind: PremiumKind::Percentage(15.0),
        applies_to: PremiumTarget::Every,
        automatic: false,
        requires_documentation: None,
    },
    PremiumDefinition {
        id: PremiumId::DiagnosiEnergetica,
        name: "Diagnosi energetica e certificazione",
        short_name: "Diagnosi energetica",
        description: "Premio fisso di €1.000 per diagnosi energetica certificata e APE.",
        scope: PremiumScope::Global,
        kind: PremiumKind::Fixed(1_000.0),
        applies_to: PremiumTarget::Every,
        automatic: false,
        requires_documentation: Some(
            "Diagnosi energetica e Attestato di Prestazione Energetica (APE)",
        ),
    },
    PremiumDefinition {
        id: PremiumId::EmissioniBiomassa,
        name: "Maggiorazione biomassa 5 stelle (+20%)",
        short_name: "Biomassa 5 stelle",
        description: "Premio del 20% per generatori a biomassa con classe emissioni 5 stelle.",
        scope: PremiumScope::PerIntervention,
        kind: PremiumKind::Percentage(20.0),
        applies_to: PremiumTarget::Only(&[InterventionId::Biomassa]),
        automatic: false,
        requires_documentation: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_premiums_scale_running_total() {
        assert_eq!(PremiumKind::Percentage(20.0).delta(1_000.0), 200.0);
        assert_eq!(PremiumKind::Fixed(1_000.0).delta(5.0), 1_000.0);
    }

    #[test]
    fn multi_intervention_targets_title_two_envelope_only() {
        let multi = &PREMIUMS[0];
        assert!(multi.automatic);
        assert!(multi.applies_to.covers(InterventionId::SostituzioneInfissi));
        assert!(!multi.applies_to.covers(InterventionId::Nzeb));
    }
}
