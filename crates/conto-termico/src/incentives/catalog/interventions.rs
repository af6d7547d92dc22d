use crate::incentives::domain::{InterventionCategory, InterventionId, OperatorType};
use crate::incentives::schema::{FieldBound, InputField, Limit};
use serde::Serialize;

/// Catalogue entry for one incentivised intervention.
#[derive(Debug, Clone, Serialize)]
pub struct InterventionSpec {
    pub id: InterventionId,
    pub name: &'static str,
    pub description: &'static str,
    pub category: InterventionCategory,
    pub allowed_operators: &'static [OperatorType],
    pub inputs: &'static [InputField],
}

impl InterventionSpec {
    pub fn allows(&self, operator: OperatorType) -> bool {
        self.allowed_operators.contains(&operator)
    }

    pub fn input(&self, id: &str) -> Option<&InputField> {
        self.inputs.iter().find(|field| field.id == id)
    }
}

const TERTIARY_OPERATORS: &[OperatorType] = &OperatorType::TERTIARY;
const ALL_OPERATORS: &[OperatorType] = &OperatorType::ALL;

const ZONES: &[&str] = &["A", "B", "C", "D", "E", "F"];

const fn zone_field() -> InputField {
    InputField::select("zona_climatica", "Zona climatica", ZONES)
}

const fn cost_field(label: &'static str) -> InputField {
    InputField::number("costo_totale", label)
}

const fn area_cost_inputs(
    area_label: &'static str,
    unit_cost_max: FieldBound,
    third: InputField,
) -> [InputField; 3] {
    [
        InputField::number("superficie", area_label),
        InputField::number("costo_specifico", "Costo specifico C (€/m²)").max(unit_cost_max),
        third,
    ]
}

const fn fixed(value: f64) -> Limit {
    Limit::Fixed { value }
}

/// Unit-cost ceiling split between the warm zones (A, B, C) and the cold ones (D, E, F).
macro_rules! by_zone {
    ($warm:expr, $cold:expr) => {
        FieldBound::DependsOn {
            field: "zona_climatica",
            cases: &[
                ("A", fixed($warm)),
                ("B", fixed($warm)),
                ("C", fixed($warm)),
                ("D", fixed($cold)),
                ("E", fixed($cold)),
                ("F", fixed($cold)),
            ],
            fallback: None,
        }
    };
}

const OPAQUE_COLUMNS: [InputField; 4] = [
    InputField::select(
        "tipologia_struttura",
        "Tipologia",
        &[
            "copertura_esterno",
            "copertura_interno",
            "copertura_ventilata",
            "pavimento_esterno",
            "pavimento_interno",
            "parete_esterno",
            "parete_interno",
            "parete_ventilata",
        ],
    ),
    InputField::number("superficie", "Superficie (m²)"),
    InputField::number("costo_totale", "Costo totale (€)"),
    InputField::computed("costo_specifico", "Costo specifico (€/m²)"),
];

const OPAQUE_INPUTS: [InputField; 2] = [
    InputField::table("righe_opache", "Tabella strutture opache", &OPAQUE_COLUMNS)
        .help("Una riga per ogni tipologia di struttura opaca isolata."),
    zone_field()
        .help("Le zone E ed F danno diritto alla percentuale maggiorata per i privati."),
];

const GLAZING_INPUTS: [InputField; 3] = area_cost_inputs(
    "Superficie infissi Sint (m²)",
    by_zone!(700.0, 800.0),
    zone_field(),
);

const SHADING_INPUTS: [InputField; 3] = area_cost_inputs(
    "Superficie schermata Sint (m²)",
    FieldBound::DependsOn {
        field: "tipo_schermatura",
        cases: &[
            ("Schermature/ombreggiamento", fixed(250.0)),
            ("Meccanismi automatici", fixed(50.0)),
            ("Filtrazione solare selettiva non riflettente", fixed(130.0)),
            ("Filtrazione solare selettiva riflettente", fixed(80.0)),
        ],
        fallback: None,
    },
    InputField::select(
        "tipo_schermatura",
        "Tipo di schermatura",
        &[
            "Schermature/ombreggiamento",
            "Meccanismi automatici",
            "Filtrazione solare selettiva non riflettente",
            "Filtrazione solare selettiva riflettente",
        ],
    ),
);

const NZEB_INPUTS: [InputField; 3] = area_cost_inputs(
    "Superficie utile Sed (m²)",
    by_zone!(1_000.0, 1_300.0),
    zone_field(),
);

const LIGHTING_INPUTS: [InputField; 3] = area_cost_inputs(
    "Superficie edificio Sed (m²)",
    FieldBound::DependsOn {
        field: "tipo_lampada",
        cases: &[("Alta efficienza", fixed(15.0))],
        fallback: Some(fixed(35.0)),
    },
    InputField::select("tipo_lampada", "Tipo di lampada", &["Alta efficienza", "LED"]),
);

const AUTOMATION_INPUTS: [InputField; 2] = [
    InputField::number("superficie", "Superficie edificio Sed (m²)"),
    InputField::number("costo_specifico", "Costo specifico C (€/m²)")
        .max(FieldBound::Static { value: 60.0 }),
];

const STANDARD_CHARGERS: &[&str] = &["Standard monofase (7.4-22kW)", "Standard trifase (7.4-22kW)"];
const POWERED_CHARGERS: &[&str] = &["Media (22-50kW)", "Alta (50-100kW)", "Oltre 100kW"];

const fn per_point(amount: f64) -> Limit {
    Limit::PerUnit {
        field: "numero_punti",
        factor: amount,
    }
}

const CHARGING_INPUTS: [InputField; 4] = [
    InputField::select(
        "tipo_infrastruttura",
        "Tipo infrastruttura",
        &[
            "Standard monofase (7.4-22kW)",
            "Standard trifase (7.4-22kW)",
            "Media (22-50kW)",
            "Alta (50-100kW)",
            "Oltre 100kW",
        ],
    ),
    InputField::number("numero_punti", "Numero punti di ricarica")
        .min(1.0)
        .step(1.0)
        .visible_if("tipo_infrastruttura", STANDARD_CHARGERS),
    InputField::number("potenza", "Potenza dell'infrastruttura (kW)")
        .step(0.1)
        .visible_if("tipo_infrastruttura", POWERED_CHARGERS),
    cost_field("Costo totale sostenuto (€)").max(FieldBound::DependsOn {
        field: "tipo_infrastruttura",
        cases: &[
            ("Standard monofase (7.4-22kW)", per_point(2_400.0)),
            ("Standard trifase (7.4-22kW)", per_point(8_400.0)),
            (
                "Media (22-50kW)",
                Limit::PerUnit {
                    field: "potenza",
                    factor: 1_200.0,
                },
            ),
            ("Alta (50-100kW)", fixed(60_000.0)),
            ("Oltre 100kW", fixed(110_000.0)),
        ],
        fallback: None,
    }),
];

const PHOTOVOLTAIC_INPUTS: [InputField; 3] = [
    InputField::number("potenza_fv", "Potenza impianto FV (kWp)").step(0.1),
    InputField::number("capacita_accumulo", "Capacità accumulo (kWh)").step(0.1),
    InputField::select(
        "registro_ue",
        "Moduli FV iscritti al registro UE",
        &[
            "No",
            "Sì - Requisiti lett. a) (+5%)",
            "Sì - Requisiti lett. b) (+10%)",
            "Sì - Requisiti lett. c) (+15%)",
        ],
    ),
];

const COST_FOR_FULL_COVERAGE: &str = "Necessario per il calcolo dell'incentivo al 100%";

const HEAT_PUMP_INPUTS: [InputField; 6] = [
    cost_field("Costo totale intervento (€)").help(COST_FOR_FULL_COVERAGE),
    InputField::select(
        "tipo_pompa",
        "Tipo di pompa di calore",
        &[
            "aria/aria split/multisplit",
            "aria/aria fixed double duct",
            "aria/aria VRF/VRV (13-35kW)",
            "aria/aria VRF/VRV (>35kW)",
            "aria/aria rooftop (≤35kW)",
            "aria/aria rooftop (>35kW)",
            "aria/acqua (≤35kW)",
            "aria/acqua (>35kW)",
            "acqua/aria (≤35kW)",
            "acqua/aria (>35kW)",
            "acqua/acqua (≤35kW)",
            "acqua/acqua (>35kW)",
            "salamoia/aria (≤35kW)",
            "salamoia/aria (>35kW)",
            "salamoia/acqua (≤35kW)",
            "salamoia/acqua (>35kW)",
        ],
    ),
    InputField::number("potenza_nominale", "Potenza termica nominale Prated (kW)").step(0.1),
    InputField::number("scop", "SCOP stagionale").min(2.5).step(0.01),
    InputField::number("scop_minimo", "SCOP minimo ecodesign")
        .min(2.5)
        .step(0.01),
    zone_field(),
];

const HYBRID_INPUTS: [InputField; 6] = [
    cost_field("Costo totale intervento (€)").help(COST_FOR_FULL_COVERAGE),
    InputField::select(
        "tipo_sistema",
        "Tipo sistema",
        &[
            "Ibrido factory made (Pn ≤35kW)",
            "Ibrido factory made (Pn >35kW)",
            "Sistema bivalente (Pn ≤35kW)",
            "Sistema bivalente (Pn >35kW)",
        ],
    ),
    InputField::number("potenza_pdc", "Potenza termica pompa di calore Prated (kW)").step(0.1),
    InputField::number("scop", "SCOP pompa di calore").min(2.5).step(0.01),
    InputField::number("scop_minimo", "SCOP minimo ecodesign")
        .min(2.5)
        .step(0.01),
    zone_field(),
];

const BIOMASS_INPUTS: [InputField; 7] = [
    cost_field("Costo totale intervento (€)").help(COST_FOR_FULL_COVERAGE),
    InputField::select(
        "tipo_generatore",
        "Tipo generatore",
        &["Caldaia a biomassa", "Stufa a pellet", "Stufa a legna", "Termocamino"],
    ),
    InputField::number("potenza_nominale", "Potenza termica nominale Pn (kW)").step(0.1),
    zone_field(),
    InputField::select(
        "riduzione_emissioni",
        "Riduzione emissioni particolato vs DM 186/2017 classe 5 stelle",
        &["Fino al 20%", "Dal 20% al 50%", "Oltre il 50%"],
    ),
    InputField::select(
        "centrale_teleriscaldamento",
        "Installato presso centrale teleriscaldamento?",
        &["No", "Sì"],
    ),
    InputField::select(
        "emissioni",
        "Classe di qualità ambientale (stelle, DM 186/2017)",
        &["4", "5"],
    )
    .optional()
    .help("La classe 5 stelle abilita la maggiorazione emissioni."),
];

const SOLAR_INPUTS: [InputField; 5] = [
    cost_field("Costo totale intervento (€)").help(COST_FOR_FULL_COVERAGE),
    InputField::number("superficie_lorda", "Superficie solare lorda Sl (m²)").step(0.01),
    InputField::select(
        "tipo_impianto",
        "Tipo di impianto",
        &[
            "Produzione ACS",
            "Produzione ACS + riscaldamento",
            "Collettori a concentrazione",
            "Solar cooling",
        ],
    ),
    InputField::select(
        "tipo_collettore",
        "Tipo collettore (se applicabile)",
        &["Piani vetrati", "Sottovuoto", "Concentrazione", "N/A"],
    ),
    InputField::number("qcol", "Energia annua Qcol da certificazione (kWh)")
        .step(0.1)
        .optional(),
];

const WATER_HEATER_INPUTS: [InputField; 3] = [
    InputField::number("capacita", "Capacità del serbatoio (litri)").min(80.0),
    InputField::select(
        "classe_energetica",
        "Classe energetica (Reg. EU 812/2013)",
        &["Classe A", "Classe A+"],
    ),
    cost_field("Costo totale intervento (€)"),
];

const DISTRICT_HEATING_INPUTS: [InputField; 2] = [
    InputField::number("potenza_contrattuale", "Potenza termica contrattuale (kW)"),
    cost_field("Costo totale dell'allacciamento (€)"),
];

const COGENERATION_INPUTS: [InputField; 2] = [
    InputField::number("potenza_elettrica", "Potenza elettrica nominale (kWe)")
        .max(FieldBound::Static { value: 50.0 }),
    cost_field("Costo totale intervento (€)"),
];

pub(crate) const INTERVENTIONS: [InterventionSpec; 15] = [
    InterventionSpec {
        id: InterventionId::IsolamentoOpache,
        name: "1.A - Isolamento termico di superfici opache",
        description: "Art. 5, comma 1, lett. a) - Coibentazione di pareti, coperture e pavimenti per ridurre le dispersioni termiche.",
        category: InterventionCategory::EnergyEfficiency,
        allowed_operators: TERTIARY_OPERATORS,
        inputs: &OPAQUE_INPUTS,
    },
    InterventionSpec {
        id: InterventionId::SostituzioneInfissi,
        name: "1.B - Sostituzione di chiusure trasparenti (infissi)",
        description: "Art. 5, comma 1, lett. b) - Sostituzione di serramenti e infissi con nuovi a maggiore efficienza energetica.",
        category: InterventionCategory::EnergyEfficiency,
        allowed_operators: TERTIARY_OPERATORS,
        inputs: &GLAZING_INPUTS,
    },
    InterventionSpec {
        id: InterventionId::SchermatureSolari,
        name: "1.C - Installazione di schermature e ombreggiamenti",
        description: "Art. 5, comma 1, lett. c) - Sistemi di schermatura solare per ridurre gli apporti termici estivi.",
        category: InterventionCategory::EnergyEfficiency,
        allowed_operators: TERTIARY_OPERATORS,
        inputs: &SHADING_INPUTS,
    },
    InterventionSpec {
        id: InterventionId::Nzeb,
        name: "1.D - Trasformazione in edificio a energia quasi zero (NZEB)",
        description: "Art. 5, comma 1, lett. d) - Trasformazione di edifici esistenti in edifici a energia quasi zero.",
        category: InterventionCategory::EnergyEfficiency,
        allowed_operators: TERTIARY_OPERATORS,
        inputs: &NZEB_INPUTS,
    },
    InterventionSpec {
        id: InterventionId::IlluminazioneLed,
        name: "1.E - Sostituzione sistemi di illuminazione con LED",
        description: "Art. 5, comma 1, lett. e) - Sostituzione dei corpi illuminanti con sistemi ad alta efficienza.",
        category: InterventionCategory::EnergyEfficiency,
        allowed_operators: TERTIARY_OPERATORS,
        inputs: &LIGHTING_INPUTS,
    },
    InterventionSpec {
        id: InterventionId::BuildingAutomation,
        name: "1.F - Installazione di sistemi di building automation",
        description: "Art. 5, comma 1, lett. f) - Controllo e gestione automatica di impianti termici e illuminazione.",
        category: InterventionCategory::EnergyEfficiency,
        allowed_operators: TERTIARY_OPERATORS,
        inputs: &AUTOMATION_INPUTS,
    },
    InterventionSpec {
        id: InterventionId::InfrastruttureRicarica,
        name: "1.G - Infrastrutture di ricarica per veicoli elettrici",
        description: "Art. 5, comma 1, lett. g) - Infrastrutture di ricarica presso edifici pubblici o ad uso terziario.",
        category: InterventionCategory::EnergyEfficiency,
        allowed_operators: TERTIARY_OPERATORS,
        inputs: &CHARGING_INPUTS,
    },
    InterventionSpec {
        id: InterventionId::FotovoltaicoAccumulo,
        name: "1.H - Impianto fotovoltaico con sistema di accumulo",
        description: "Art. 5, comma 1, lett. h) - Fotovoltaico integrato con accumulo elettrico per l'autoconsumo.",
        category: InterventionCategory::EnergyEfficiency,
        allowed_operators: TERTIARY_OPERATORS,
        inputs: &PHOTOVOLTAIC_INPUTS,
    },
    InterventionSpec {
        id: InterventionId::PompaCalore,
        name: "2.A - Sostituzione con pompe di calore",
        description: "Art. 8, comma 1, lett. a) - Sostituzione della climatizzazione invernale con pompe di calore ad alta efficienza.",
        category: InterventionCategory::RenewableSources,
        allowed_operators: ALL_OPERATORS,
        inputs: &HEAT_PUMP_INPUTS,
    },
    InterventionSpec {
        id: InterventionId::SistemiIbridi,
        name: "2.B - Sistemi ibridi factory made o bivalenti",
        description: "Art. 8, comma 1, lett. b) - Pompa di calore integrata con caldaia a condensazione.",
        category: InterventionCategory::RenewableSources,
        allowed_operators: &[
            OperatorType::Pa,
            OperatorType::PrivateTertiaryPerson,
            OperatorType::PrivateResidential,
        ],
        inputs: &HYBRID_INPUTS,
    },
    InterventionSpec {
        id: InterventionId::Biomassa,
        name: "2.C - Sostituzione con generatori a biomassa",
        description: "Art. 8, comma 1, lett. c) - Caldaie, stufe o termocamini a biomassa ad alta efficienza e basse emissioni.",
        category: InterventionCategory::RenewableSources,
        allowed_operators: ALL_OPERATORS,
        inputs: &BIOMASS_INPUTS,
    },
    InterventionSpec {
        id: InterventionId::SolareTermico,
        name: "2.D - Installazione di collettori solari termici",
        description: "Art. 8, comma 1, lett. d) - Solare termico per acqua calda sanitaria, riscaldamento o solar cooling.",
        category: InterventionCategory::RenewableSources,
        allowed_operators: ALL_OPERATORS,
        inputs: &SOLAR_INPUTS,
    },
    InterventionSpec {
        id: InterventionId::ScaldacquaPdc,
        name: "2.E - Sostituzione con scaldacqua a pompa di calore",
        description: "Art. 8, comma 1, lett. e) - Scaldacqua a pompa di calore per la produzione di acqua calda sanitaria.",
        category: InterventionCategory::RenewableSources,
        allowed_operators: ALL_OPERATORS,
        inputs: &WATER_HEATER_INPUTS,
    },
    InterventionSpec {
        id: InterventionId::Teleriscaldamento,
        name: "2.F - Teleriscaldamento alimentato da biomassa/solare termico/geotermia",
        description: "Art. 8, comma 1, lett. f) - Allacciamento a reti di teleriscaldamento efficienti alimentate da fonti rinnovabili.",
        category: InterventionCategory::RenewableSources,
        allowed_operators: ALL_OPERATORS,
        inputs: &DISTRICT_HEATING_INPUTS,
    },
    InterventionSpec {
        id: InterventionId::Microcogenerazione,
        name: "2.G - Microcogenerazione alimentata da fonti rinnovabili",
        description: "Art. 8, comma 1, lett. g) - Microcogenerazione fino a 50 kWe alimentata da fonti rinnovabili.",
        category: InterventionCategory::RenewableSources,
        allowed_operators: ALL_OPERATORS,
        inputs: &COGENERATION_INPUTS,
    },
];
