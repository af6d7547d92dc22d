use crate::incentives::domain::{
    BuildingCategory, ImplementationMode, InterventionCategory, OperatorType, SubjectType,
};
use crate::incentives::schema::InputField;
use serde::Serialize;

const EVERY_SUBJECT: &[SubjectType] = &SubjectType::ALL;
const PUBLIC_SUBJECTS: &[SubjectType] = &[SubjectType::Pa, SubjectType::EtsNonEconomic];

#[derive(Debug, Clone, Serialize)]
pub struct SubjectInfo {
    pub id: SubjectType,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildingInfo {
    pub id: BuildingCategory,
    pub name: &'static str,
    pub description: &'static str,
    pub allowed_subjects: &'static [SubjectType],
    pub art48ter: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

impl BuildingInfo {
    pub fn allows(&self, subject: SubjectType) -> bool {
        self.allowed_subjects.contains(&subject)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImplementationModeInfo {
    pub id: ImplementationMode,
    pub name: &'static str,
    pub description: &'static str,
    pub allowed_subjects: &'static [SubjectType],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
    /// Extra questions asked when a public subject picks this mode.
    pub fields: &'static [InputField],
}

#[derive(Debug, Clone, Serialize)]
pub struct OperatorInfo {
    pub id: OperatorType,
    pub name: &'static str,
    pub max_incentive_rate: f64,
    /// Ceiling on the combined incentive for one application.
    pub combined_cap: f64,
    pub description: &'static str,
}

/// Which regulatory titles an operator mapping may access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionPolicy {
    #[serde(rename = "all_titolo2_and_3")]
    AllTitles,
    #[serde(rename = "only_titolo3")]
    OnlyTitleThree,
}

impl InterventionPolicy {
    pub fn permits(self, category: InterventionCategory) -> bool {
        match self {
            InterventionPolicy::AllTitles => true,
            InterventionPolicy::OnlyTitleThree => category == InterventionCategory::RenewableSources,
        }
    }
}

/// One row of the subject × building matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorMapping {
    pub key: &'static str,
    pub operator_type: OperatorType,
    pub max_incentive_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_rate: Option<f64>,
    pub allowed_interventions: InterventionPolicy,
    pub requires_public_ownership: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub art48ter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteSeverity {
    Info,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegulatoryNote {
    pub id: &'static str,
    pub title: &'static str,
    pub text: &'static str,
    pub severity: NoteSeverity,
    pub applies_to: &'static [&'static str],
}

pub(crate) const SUBJECTS: [SubjectInfo; 6] = [
    SubjectInfo {
        id: SubjectType::Pa,
        name: "Pubblica Amministrazione",
        description: "PA ex D.Lgs 165/2001, enti pubblici, società in house, ex IACP, concessionari",
    },
    SubjectInfo {
        id: SubjectType::EtsNonEconomic,
        name: "ETS non economico",
        description: "Enti del Terzo Settore iscritti al RUNTS che non svolgono attività economica",
    },
    SubjectInfo {
        id: SubjectType::Person,
        name: "Persona fisica o condominio",
        description: "Soggetti privati non imprese",
    },
    SubjectInfo {
        id: SubjectType::Sme,
        name: "Piccola o Media Impresa (PMI)",
        description: "Micro, piccole e medie imprese iscritte al registro imprese",
    },
    SubjectInfo {
        id: SubjectType::LargeCompany,
        name: "Grande Impresa",
        description: "Grandi imprese iscritte al registro imprese",
    },
    SubjectInfo {
        id: SubjectType::EtsEconomic,
        name: "ETS economico",
        description: "Enti del Terzo Settore iscritti al RUNTS che svolgono attività economica",
    },
];

const ART48TER_NOTE: &str = "Art. 48-ter: incentivo al 100% della spesa ammissibile";

pub(crate) const BUILDINGS: [BuildingInfo; 6] = [
    BuildingInfo {
        id: BuildingCategory::Residential,
        name: "Residenziale",
        description: "Gruppo A (escluso A/8, A/9, A/10)",
        allowed_subjects: EVERY_SUBJECT,
        art48ter: false,
        note: Some("PA/ETS: Titolo II solo su edifici di proprietà pubblica (es. ex IACP/ATER)"),
    },
    BuildingInfo {
        id: BuildingCategory::Tertiary,
        name: "Terziario",
        description: "A/10, Gruppo B, C, D, E",
        allowed_subjects: EVERY_SUBJECT,
        art48ter: false,
        note: None,
    },
    BuildingInfo {
        id: BuildingCategory::TertiaryGeneric,
        name: "Terziario generico",
        description: "Uffici, negozi, attività commerciali",
        allowed_subjects: EVERY_SUBJECT,
        art48ter: false,
        note: None,
    },
    BuildingInfo {
        id: BuildingCategory::TertiarySchool,
        name: "Scuola",
        description: "Edificio pubblico adibito a uso scolastico (non università)",
        allowed_subjects: PUBLIC_SUBJECTS,
        art48ter: true,
        note: Some(ART48TER_NOTE),
    },
    BuildingInfo {
        id: BuildingCategory::TertiaryHospital,
        name: "Ospedale/Struttura sanitaria pubblica",
        description: "Strutture ospedaliere e sanitarie pubbliche del SSN",
        allowed_subjects: PUBLIC_SUBJECTS,
        art48ter: true,
        note: Some(ART48TER_NOTE),
    },
    BuildingInfo {
        id: BuildingCategory::TertiaryPrison,
        name: "Carcere",
        description: "Istituto penitenziario",
        allowed_subjects: &[SubjectType::Pa],
        art48ter: true,
        note: Some(ART48TER_NOTE),
    },
];

const MUNICIPALITY_FIELDS: [InputField; 3] = [
    InputField::checkbox("is_comune", "Il soggetto richiedente è un Comune?")
        .help("Solo Comuni, non altre PA come Regioni, Province, ASL o Università."),
    InputField::checkbox(
        "is_edificio_comunale",
        "L'edificio è di proprietà del Comune ed è utilizzato dallo stesso Comune?",
    )
    .visible_if("is_comune", &["true"]),
    InputField::checkbox(
        "is_piccolo_comune",
        "Il Comune ha popolazione inferiore a 15.000 abitanti?",
    )
    .help("Se sì, si applica l'incentivo al 100% della spesa ammissibile.")
    .visible_if("is_edificio_comunale", &["true"]),
];

pub(crate) const IMPLEMENTATION_MODES: [ImplementationModeInfo; 4] = [
    ImplementationModeInfo {
        id: ImplementationMode::Direct,
        name: "Intervento diretto",
        description: "Il soggetto ammesso realizza l'intervento e ne sostiene le spese.",
        allowed_subjects: EVERY_SUBJECT,
        note: None,
        fields: &MUNICIPALITY_FIELDS,
    },
    ImplementationModeInfo {
        id: ImplementationMode::Esco,
        name: "Tramite ESCO/Contratto EPC",
        description: "Energy Service Company che sostiene le spese per conto del soggetto ammesso.",
        allowed_subjects: EVERY_SUBJECT,
        note: Some(
            "Per i privati in ambito residenziale è ammessa solo per interventi Titolo III con P > 70 kW o S > 20 m²; altrimenti si usa il mandato all'incasso.",
        ),
        fields: &[],
    },
    ImplementationModeInfo {
        id: ImplementationMode::EnergyCommunity,
        name: "Tramite Comunità Energetica",
        description: "Autoconsumo collettivo o comunità energetica rinnovabile (CER).",
        allowed_subjects: EVERY_SUBJECT,
        note: None,
        fields: &[],
    },
    ImplementationModeInfo {
        id: ImplementationMode::Ppp,
        name: "Partenariato Pubblico-Privato",
        description: "Contratto PPP per interventi su immobili pubblici.",
        allowed_subjects: PUBLIC_SUBJECTS,
        note: None,
        fields: &[],
    },
];

pub(crate) const OPERATORS: [OperatorInfo; 5] = [
    OperatorInfo {
        id: OperatorType::Pa,
        name: "Pubbliche Amministrazioni ed ETS non economici",
        max_incentive_rate: 1.0,
        combined_cap: 5_000_000.0,
        description: "PA ex D.Lgs 165/2001 ed ETS non economici",
    },
    OperatorInfo {
        id: OperatorType::PrivateTertiaryPerson,
        name: "Soggetti Privati - Ambito Terziario (persone fisiche, condomini)",
        max_incentive_rate: 0.65,
        combined_cap: 2_000_000.0,
        description: "Soggetti non imprese su edifici terziari (A/10, B, C, D, E)",
    },
    OperatorInfo {
        id: OperatorType::PrivateTertiarySme,
        name: "PMI ed ETS economici - Ambito Terziario",
        max_incentive_rate: 0.50,
        combined_cap: 2_000_000.0,
        description: "Micro, piccole e medie imprese ed ETS economici",
    },
    OperatorInfo {
        id: OperatorType::PrivateTertiaryLarge,
        name: "Grandi Imprese - Ambito Terziario",
        max_incentive_rate: 0.30,
        combined_cap: 2_000_000.0,
        description: "Grandi imprese",
    },
    OperatorInfo {
        id: OperatorType::PrivateResidential,
        name: "Soggetti Privati - Ambito Residenziale",
        max_incentive_rate: 0.65,
        combined_cap: 1_000_000.0,
        description: "Soggetti privati su edifici residenziali (Gruppo A escluso A/8, A/9, A/10)",
    },
];

const fn public_row(key: &'static str, default_rate: f64, art48ter: Option<bool>) -> OperatorMapping {
    OperatorMapping {
        key,
        operator_type: OperatorType::Pa,
        max_incentive_rate: 1.0,
        default_rate: Some(default_rate),
        allowed_interventions: InterventionPolicy::AllTitles,
        requires_public_ownership: false,
        art48ter,
        note: None,
    }
}

const fn private_row(
    key: &'static str,
    operator_type: OperatorType,
    max_incentive_rate: f64,
    art48ter: Option<bool>,
) -> OperatorMapping {
    let allowed_interventions = match operator_type {
        OperatorType::PrivateResidential => InterventionPolicy::OnlyTitleThree,
        _ => InterventionPolicy::AllTitles,
    };
    OperatorMapping {
        key,
        operator_type,
        max_incentive_rate,
        default_rate: None,
        allowed_interventions,
        requires_public_ownership: false,
        art48ter,
        note: None,
    }
}

pub(crate) const OPERATOR_MATRIX: [OperatorMapping; 23] = [
    public_row("pa_tertiary", 0.65, None),
    public_row("pa_tertiary_generic", 0.65, Some(false)),
    public_row("pa_tertiary_school", 1.0, Some(true)),
    public_row("pa_tertiary_hospital", 1.0, Some(true)),
    public_row("pa_tertiary_prison", 1.0, Some(true)),
    OperatorMapping {
        requires_public_ownership: true,
        note: Some("Titolo II ammesso solo per edifici di proprietà pubblica (es. ex IACP/ATER su edilizia sociale)"),
        ..public_row("pa_residential", 0.65, None)
    },
    public_row("ets_non_economic_tertiary", 0.65, None),
    public_row("ets_non_economic_tertiary_generic", 0.65, Some(false)),
    public_row("ets_non_economic_tertiary_school", 1.0, Some(true)),
    public_row("ets_non_economic_tertiary_hospital", 1.0, Some(true)),
    OperatorMapping {
        requires_public_ownership: true,
        note: Some("Titolo II ammesso solo per edifici di proprietà pubblica (equiparati a PA)"),
        ..public_row("ets_non_economic_residential", 0.65, None)
    },
    private_row("person_residential", OperatorType::PrivateResidential, 0.65, None),
    private_row("person_tertiary", OperatorType::PrivateTertiaryPerson, 0.65, None),
    private_row(
        "person_tertiary_generic",
        OperatorType::PrivateTertiaryPerson,
        0.65,
        Some(false),
    ),
    private_row("sme_residential", OperatorType::PrivateResidential, 0.50, None),
    private_row("sme_tertiary", OperatorType::PrivateTertiarySme, 0.50, None),
    private_row(
        "sme_tertiary_generic",
        OperatorType::PrivateTertiarySme,
        0.50,
        Some(false),
    ),
    private_row(
        "large_company_residential",
        OperatorType::PrivateResidential,
        0.30,
        None,
    ),
    private_row(
        "large_company_tertiary",
        OperatorType::PrivateTertiaryLarge,
        0.30,
        None,
    ),
    private_row(
        "large_company_tertiary_generic",
        OperatorType::PrivateTertiaryLarge,
        0.30,
        Some(false),
    ),
    private_row(
        "ets_economic_residential",
        OperatorType::PrivateResidential,
        0.50,
        None,
    ),
    private_row("ets_economic_tertiary", OperatorType::PrivateTertiarySme, 0.50, None),
    private_row(
        "ets_economic_tertiary_generic",
        OperatorType::PrivateTertiarySme,
        0.50,
        Some(false),
    ),
];

pub(crate) const REGULATORY_NOTES: [RegulatoryNote; 4] = [
    RegulatoryNote {
        id: "pa_residential_titolo2",
        title: "PA/ETS su edifici residenziali - Interventi Titolo II",
        text: "Gli interventi di efficienza energetica (Titolo II) su edifici residenziali sono ammessi per PA e ETS non economici solo quando l'edificio è di proprietà pubblica, ad esempio ex IACP/ATER su edilizia sociale. Riferimento: paragrafo 12.10.4 delle Regole Applicative.",
        severity: NoteSeverity::Warning,
        applies_to: &["pa_residential", "ets_non_economic_residential"],
    },
    RegulatoryNote {
        id: "private_residential_restrictions",
        title: "Soggetti privati su edifici residenziali",
        text: "I soggetti privati (persone fisiche, condomini, imprese, ETS economici) su edifici residenziali accedono solo agli interventi del Titolo III (fonti rinnovabili); gli interventi del Titolo II sono esclusi.",
        severity: NoteSeverity::Info,
        applies_to: &[
            "person_residential",
            "sme_residential",
            "large_company_residential",
            "ets_economic_residential",
        ],
    },
    RegulatoryNote {
        id: "public_buildings_special",
        title: "Edifici pubblici speciali (scuole, ospedali)",
        text: "Per interventi su edifici pubblici adibiti a uso scolastico e su strutture ospedaliere e sanitarie del SSN l'incentivo è pari al 100% delle spese ammissibili. Riferimento: Art. 48-ter D.L. 104/2020, paragrafo 12.11 delle Regole Applicative.",
        severity: NoteSeverity::Info,
        applies_to: &[
            "pa_tertiary",
            "pa_residential",
            "ets_non_economic_tertiary",
            "ets_non_economic_residential",
        ],
    },
    RegulatoryNote {
        id: "esco_residential_thresholds",
        title: "ESCO su edifici residenziali - Soglie minime",
        text: "In ambito residenziale l'utilizzo di ESCO tramite contratti EPC o Servizio Energia richiede almeno 70 kW per gli impianti di climatizzazione e 20 m² per il solare termico; sotto tali soglie è ammesso solo il mandato irrevocabile all'incasso.",
        severity: NoteSeverity::Info,
        applies_to: &[
            "person_residential",
            "sme_residential",
            "large_company_residential",
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn matrix_keys_are_unique() {
        let keys: BTreeSet<_> = OPERATOR_MATRIX.iter().map(|row| row.key).collect();
        assert_eq!(keys.len(), OPERATOR_MATRIX.len());
    }

    #[test]
    fn residential_private_rows_only_reach_title_three() {
        for row in OPERATOR_MATRIX
            .iter()
            .filter(|row| row.operator_type == OperatorType::PrivateResidential)
        {
            assert_eq!(row.allowed_interventions, InterventionPolicy::OnlyTitleThree);
            assert!(!row
                .allowed_interventions
                .permits(InterventionCategory::EnergyEfficiency));
        }
    }

    #[test]
    fn every_building_lists_its_subjects() {
        for building in &BUILDINGS {
            assert!(!building.allowed_subjects.is_empty());
            assert_eq!(building.art48ter, building.id.is_art48ter());
        }
    }
}
