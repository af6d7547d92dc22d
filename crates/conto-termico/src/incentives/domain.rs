use serde::{Deserialize, Serialize};
use std::fmt;

/// Legal nature of the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    Pa,
    EtsNonEconomic,
    Person,
    Sme,
    LargeCompany,
    EtsEconomic,
}

impl SubjectType {
    pub const ALL: [SubjectType; 6] = [
        SubjectType::Pa,
        SubjectType::EtsNonEconomic,
        SubjectType::Person,
        SubjectType::Sme,
        SubjectType::LargeCompany,
        SubjectType::EtsEconomic,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            SubjectType::Pa => "pa",
            SubjectType::EtsNonEconomic => "ets_non_economic",
            SubjectType::Person => "person",
            SubjectType::Sme => "sme",
            SubjectType::LargeCompany => "large_company",
            SubjectType::EtsEconomic => "ets_economic",
        }
    }

    pub fn from_id(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|subject| subject.id() == value)
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Building category, including the tertiary subcategories that refine it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingCategory {
    Residential,
    Tertiary,
    TertiaryGeneric,
    TertiarySchool,
    TertiaryHospital,
    TertiaryPrison,
}

impl BuildingCategory {
    pub const ALL: [BuildingCategory; 6] = [
        BuildingCategory::Residential,
        BuildingCategory::Tertiary,
        BuildingCategory::TertiaryGeneric,
        BuildingCategory::TertiarySchool,
        BuildingCategory::TertiaryHospital,
        BuildingCategory::TertiaryPrison,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            BuildingCategory::Residential => "residential",
            BuildingCategory::Tertiary => "tertiary",
            BuildingCategory::TertiaryGeneric => "tertiary_generic",
            BuildingCategory::TertiarySchool => "tertiary_school",
            BuildingCategory::TertiaryHospital => "tertiary_hospital",
            BuildingCategory::TertiaryPrison => "tertiary_prison",
        }
    }

    pub fn from_id(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|building| building.id() == value)
    }

    /// Parent category for subcategories; `None` for top-level categories.
    pub const fn parent(self) -> Option<BuildingCategory> {
        match self {
            BuildingCategory::TertiaryGeneric
            | BuildingCategory::TertiarySchool
            | BuildingCategory::TertiaryHospital
            | BuildingCategory::TertiaryPrison => Some(BuildingCategory::Tertiary),
            BuildingCategory::Residential | BuildingCategory::Tertiary => None,
        }
    }

    /// Schools, hospitals and prisons fall under Art. 48-ter (100% coverage).
    pub const fn is_art48ter(self) -> bool {
        matches!(
            self,
            BuildingCategory::TertiarySchool
                | BuildingCategory::TertiaryHospital
                | BuildingCategory::TertiaryPrison
        )
    }

    pub(crate) const fn art48ter_label(self) -> Option<&'static str> {
        match self {
            BuildingCategory::TertiarySchool => Some("Scuola"),
            BuildingCategory::TertiaryHospital => Some("Ospedale/Struttura sanitaria"),
            BuildingCategory::TertiaryPrison => Some("Carcere"),
            _ => None,
        }
    }
}

impl fmt::Display for BuildingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Regulatory operator class that drives rates and caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorType {
    Pa,
    PrivateTertiaryPerson,
    PrivateTertiarySme,
    PrivateTertiaryLarge,
    PrivateResidential,
}

impl OperatorType {
    pub const ALL: [OperatorType; 5] = [
        OperatorType::Pa,
        OperatorType::PrivateTertiaryPerson,
        OperatorType::PrivateTertiarySme,
        OperatorType::PrivateTertiaryLarge,
        OperatorType::PrivateResidential,
    ];

    pub const TERTIARY: [OperatorType; 4] = [
        OperatorType::Pa,
        OperatorType::PrivateTertiaryPerson,
        OperatorType::PrivateTertiarySme,
        OperatorType::PrivateTertiaryLarge,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            OperatorType::Pa => "pa",
            OperatorType::PrivateTertiaryPerson => "private_tertiary_person",
            OperatorType::PrivateTertiarySme => "private_tertiary_sme",
            OperatorType::PrivateTertiaryLarge => "private_tertiary_large",
            OperatorType::PrivateResidential => "private_residential",
        }
    }

    pub fn from_id(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|operator| operator.id() == value)
    }

    pub const fn is_public(self) -> bool {
        matches!(self, OperatorType::Pa)
    }
}

impl fmt::Display for OperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Italian climate zone, A (warmest) to F (coldest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClimateZone {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl ClimateZone {
    pub const ALL: [ClimateZone; 6] = [
        ClimateZone::A,
        ClimateZone::B,
        ClimateZone::C,
        ClimateZone::D,
        ClimateZone::E,
        ClimateZone::F,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            ClimateZone::A => "A",
            ClimateZone::B => "B",
            ClimateZone::C => "C",
            ClimateZone::D => "D",
            ClimateZone::E => "E",
            ClimateZone::F => "F",
        }
    }

    pub fn from_id(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|zone| zone.id().eq_ignore_ascii_case(value))
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Zones E and F get the higher private envelope rate.
    pub const fn is_cold(self) -> bool {
        matches!(self, ClimateZone::E | ClimateZone::F)
    }

    pub const fn is_warm(self) -> bool {
        matches!(self, ClimateZone::A | ClimateZone::B | ClimateZone::C)
    }
}

impl fmt::Display for ClimateZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Regulatory title an intervention belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionCategory {
    /// Titolo II: envelope and efficiency works.
    EnergyEfficiency,
    /// Titolo III: renewable thermal generation.
    RenewableSources,
}

impl InterventionCategory {
    pub const fn label(self) -> &'static str {
        match self {
            InterventionCategory::EnergyEfficiency => "Efficienza Energetica",
            InterventionCategory::RenewableSources => "Fonti Rinnovabili",
        }
    }
}

/// Catalogue identifier of each incentivised intervention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterventionId {
    IsolamentoOpache,
    SostituzioneInfissi,
    SchermatureSolari,
    Nzeb,
    IlluminazioneLed,
    BuildingAutomation,
    InfrastruttureRicarica,
    FotovoltaicoAccumulo,
    PompaCalore,
    SistemiIbridi,
    Biomassa,
    SolareTermico,
    ScaldacquaPdc,
    Teleriscaldamento,
    Microcogenerazione,
}

impl InterventionId {
    pub const ALL: [InterventionId; 15] = [
        InterventionId::IsolamentoOpache,
        InterventionId::SostituzioneInfissi,
        InterventionId::SchermatureSolari,
        InterventionId::Nzeb,
        InterventionId::IlluminazioneLed,
        InterventionId::BuildingAutomation,
        InterventionId::InfrastruttureRicarica,
        InterventionId::FotovoltaicoAccumulo,
        InterventionId::PompaCalore,
        InterventionId::SistemiIbridi,
        InterventionId::Biomassa,
        InterventionId::SolareTermico,
        InterventionId::ScaldacquaPdc,
        InterventionId::Teleriscaldamento,
        InterventionId::Microcogenerazione,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            InterventionId::IsolamentoOpache => "isolamento-opache",
            InterventionId::SostituzioneInfissi => "sostituzione-infissi",
            InterventionId::SchermatureSolari => "schermature-solari",
            InterventionId::Nzeb => "nzeb",
            InterventionId::IlluminazioneLed => "illuminazione-led",
            InterventionId::BuildingAutomation => "building-automation",
            InterventionId::InfrastruttureRicarica => "infrastrutture-ricarica",
            InterventionId::FotovoltaicoAccumulo => "fotovoltaico-accumulo",
            InterventionId::PompaCalore => "pompa-calore",
            InterventionId::SistemiIbridi => "sistemi-ibridi",
            InterventionId::Biomassa => "biomassa",
            InterventionId::SolareTermico => "solare-termico",
            InterventionId::ScaldacquaPdc => "scaldacqua-pdc",
            InterventionId::Teleriscaldamento => "teleriscaldamento",
            InterventionId::Microcogenerazione => "microcogenerazione",
        }
    }

    pub fn from_id(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|intervention| intervention.id() == value)
    }

    pub const fn category(self) -> InterventionCategory {
        match self {
            InterventionId::IsolamentoOpache
            | InterventionId::SostituzioneInfissi
            | InterventionId::SchermatureSolari
            | InterventionId::Nzeb
            | InterventionId::IlluminazioneLed
            | InterventionId::BuildingAutomation
            | InterventionId::InfrastruttureRicarica
            | InterventionId::FotovoltaicoAccumulo => InterventionCategory::EnergyEfficiency,
            InterventionId::PompaCalore
            | InterventionId::SistemiIbridi
            | InterventionId::Biomassa
            | InterventionId::SolareTermico
            | InterventionId::ScaldacquaPdc
            | InterventionId::Teleriscaldamento
            | InterventionId::Microcogenerazione => InterventionCategory::RenewableSources,
        }
    }
}

impl fmt::Display for InterventionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// How the works are carried out and financed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationMode {
    Direct,
    Esco,
    EnergyCommunity,
    Ppp,
}

impl ImplementationMode {
    pub const ALL: [ImplementationMode; 4] = [
        ImplementationMode::Direct,
        ImplementationMode::Esco,
        ImplementationMode::EnergyCommunity,
        ImplementationMode::Ppp,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            ImplementationMode::Direct => "direct",
            ImplementationMode::Esco => "esco",
            ImplementationMode::EnergyCommunity => "energy_community",
            ImplementationMode::Ppp => "ppp",
        }
    }
}

/// Identifier of a premium (bonus) in the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PremiumId {
    #[serde(rename = "multi-intervento")]
    MultiIntervento,
    #[serde(rename = "prodotti-ue")]
    ProdottiUe,
    #[serde(rename = "pmi")]
    Pmi,
    #[serde(rename = "diagnosi-energetica")]
    DiagnosiEnergetica,
    #[serde(rename = "emissioni-biomassa")]
    EmissioniBiomassa,
    /// Synthetic entry reported when the 100% override replaces the standard flow.
    #[serde(rename = "incentivo-100-auto")]
    Incentivo100Auto,
}

impl PremiumId {
    pub const fn id(self) -> &'static str {
        match self {
            PremiumId::MultiIntervento => "multi-intervento",
            PremiumId::ProdottiUe => "prodotti-ue",
            PremiumId::Pmi => "pmi",
            PremiumId::DiagnosiEnergetica => "diagnosi-energetica",
            PremiumId::EmissioniBiomassa => "emissioni-biomassa",
            PremiumId::Incentivo100Auto => "incentivo-100-auto",
        }
    }
}

impl fmt::Display for PremiumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Applicant context forwarded to calculators and to the combination engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextData {
    #[serde(default)]
    pub building_subcategory: Option<BuildingCategory>,
    #[serde(default)]
    pub subject_type: Option<SubjectType>,
    #[serde(default)]
    pub implementation_mode: Option<ImplementationMode>,
    #[serde(default)]
    pub is_comune: bool,
    #[serde(default)]
    pub is_edificio_comunale: bool,
    #[serde(default)]
    pub is_piccolo_comune: bool,
    /// Explicit Art. 48-ter flag, usually copied from the resolved operator mapping.
    #[serde(default)]
    pub art48ter: bool,
}

impl ContextData {
    pub fn for_building(building: BuildingCategory) -> Self {
        Self {
            building_subcategory: Some(building),
            ..Self::default()
        }
    }

    pub fn is_art48ter(&self) -> bool {
        self.art48ter
            || self
                .building_subcategory
                .map(BuildingCategory::is_art48ter)
                .unwrap_or(false)
    }

    /// Municipality under 15,000 inhabitants acting directly on its own building.
    pub fn is_small_municipality(&self) -> bool {
        self.is_comune
            && self.is_edificio_comunale
            && self.is_piccolo_comune
            && self.subject_type == Some(SubjectType::Pa)
            && self.implementation_mode == Some(ImplementationMode::Direct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_round_trip_through_lookup() {
        for subject in SubjectType::ALL {
            assert_eq!(SubjectType::from_id(subject.id()), Some(subject));
        }
        for building in BuildingCategory::ALL {
            assert_eq!(BuildingCategory::from_id(building.id()), Some(building));
        }
        for intervention in InterventionId::ALL {
            assert_eq!(InterventionId::from_id(intervention.id()), Some(intervention));
        }
        assert_eq!(SubjectType::from_id("cooperative"), None);
    }

    #[test]
    fn serde_names_match_catalogue_ids() {
        let json = serde_json::to_string(&InterventionId::IlluminazioneLed).expect("serialize");
        assert_eq!(json, "\"illuminazione-led\"");
        let json = serde_json::to_string(&PremiumId::Incentivo100Auto).expect("serialize");
        assert_eq!(json, "\"incentivo-100-auto\"");
        let operator: OperatorType =
            serde_json::from_str("\"private_tertiary_sme\"").expect("deserialize");
        assert_eq!(operator, OperatorType::PrivateTertiarySme);
    }

    #[test]
    fn subcategories_report_their_parent() {
        assert_eq!(
            BuildingCategory::TertiarySchool.parent(),
            Some(BuildingCategory::Tertiary)
        );
        assert_eq!(BuildingCategory::Residential.parent(), None);
        assert!(BuildingCategory::TertiaryPrison.is_art48ter());
        assert!(!BuildingCategory::TertiaryGeneric.is_art48ter());
    }

    #[test]
    fn small_municipality_requires_every_flag() {
        let mut context = ContextData {
            subject_type: Some(SubjectType::Pa),
            implementation_mode: Some(ImplementationMode::Direct),
            is_comune: true,
            is_edificio_comunale: true,
            is_piccolo_comune: true,
            ..ContextData::default()
        };
        assert!(context.is_small_municipality());

        context.implementation_mode = Some(ImplementationMode::Esco);
        assert!(!context.is_small_municipality());
    }
}
