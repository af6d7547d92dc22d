//! Numeric coefficients of the Conto Termico 3.0 decree.
//!
//! Calculators never hard-code a rate: every coefficient they read lives in [`RateTables`],
//! which the catalog owns and hands out by reference.

use crate::incentives::domain::{ClimateZone, OperatorType};
use serde::Serialize;

/// Percentage paid on eligible cost, split by operator family.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EnvelopeRates {
    /// Public administration in Art. 48-ter buildings.
    pub public_art48ter: f64,
    pub public: f64,
    /// Private operators in climate zones E and F.
    pub private_cold: f64,
    pub private: f64,
}

/// Unit ceiling and absolute cap for an area-priced intervention.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UnitCeiling {
    pub label: &'static str,
    pub cost_per_unit: f64,
    pub max_incentive: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct OpaqueStructure {
    pub id: &'static str,
    pub label: &'static str,
    pub cost_per_m2: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChargingCeiling {
    PerPoint { amount: f64 },
    PerKw { amount: f64 },
    Flat { amount: f64 },
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChargingClass {
    pub label: &'static str,
    pub ceiling: ChargingCeiling,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PowerTier {
    /// Inclusive upper power bound in kW.
    pub up_to_kw: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct HeatPumpCoefficient {
    /// Substrings of the pump type that select this row.
    pub matches: &'static [&'static str],
    pub small_threshold_kw: f64,
    pub small: f64,
    /// Override for split units under the threshold.
    pub small_split: Option<f64>,
    pub large: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SolarBand {
    /// Exclusive upper bound of gross collector area in m².
    pub below_m2: f64,
    pub domestic_hot_water: f64,
    pub hot_water_and_heating: f64,
    pub concentrating: f64,
    pub solar_cooling: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DistrictHeatingTier {
    pub up_to_kw: f64,
    pub cost_per_kw: f64,
    pub max_incentive: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClimateZoneInfo {
    pub zone: ClimateZone,
    pub degree_days: u32,
    pub coefficient: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RateTables {
    pub envelope: EnvelopeRates,
    pub efficiency_public: f64,
    pub efficiency_private: f64,
    pub nzeb_private: f64,
    pub eu_products_multiplier: f64,

    pub opaque_structures: &'static [OpaqueStructure],
    pub opaque_default_cost: f64,
    pub opaque_max_incentive: f64,

    pub glazing_cost_cold: f64,
    pub glazing_cost_mild: f64,
    pub glazing_max_incentive: f64,

    pub shading: &'static [UnitCeiling],
    pub nzeb_warm: UnitCeiling,
    pub nzeb_cold: UnitCeiling,
    pub lighting_high_efficiency: UnitCeiling,
    pub lighting_led: UnitCeiling,
    pub building_automation: UnitCeiling,

    pub charging_rate: f64,
    pub charging_classes: &'static [ChargingClass],

    pub photovoltaic_base_rate: f64,
    pub photovoltaic_tiers: &'static [PowerTier],
    pub photovoltaic_cost_above_tiers: f64,
    pub storage_cost_per_kwh: f64,
    pub eu_registry_bonuses: &'static [(&'static str, f64)],

    /// Equivalent full-load hours per climate zone, indexed A..F.
    pub heating_hours: [f64; 6],
    pub heat_pumps: &'static [HeatPumpCoefficient],
    pub heat_pump_default: f64,
    pub hybrid_small_threshold_kw: f64,
    pub hybrid_small: f64,
    pub hybrid_large: f64,
    pub hybrid_factory_made: f64,
    pub hybrid_large_system: f64,

    pub biomass_boiler_tiers: &'static [PowerTier],
    pub biomass_boiler_large: f64,
    pub biomass_pellet_stove: f64,
    pub biomass_other_stove: f64,
    pub biomass_stove_log_factor: f64,
    pub biomass_emission_bands: &'static [(&'static str, f64)],
    pub biomass_emission_default: f64,
    pub biomass_district_reduction: f64,

    pub solar_bands: &'static [SolarBand],
    pub solar_large: SolarBand,
    pub solar_collector_yield: &'static [(&'static str, f64)],
    pub solar_default_yield: f64,

    pub water_heater_rate: f64,
    pub water_heater_small_tank_litres: f64,
    /// (class, small tank cap, large tank cap)
    pub water_heater_caps: &'static [(&'static str, f64, f64)],

    pub district_heating_rate: f64,
    pub district_heating_tiers: &'static [DistrictHeatingTier],
    pub district_heating_large: DistrictHeatingTier,

    pub cogeneration_rate: f64,
    pub cogeneration_cost_per_kw: f64,
    pub cogeneration_max_incentive: f64,

    pub public_duration_years: f64,
    pub private_duration_years: f64,

    pub climate_zones: [ClimateZoneInfo; 6],
}

impl RateTables {
    pub fn heating_hours(&self, zone: ClimateZone) -> f64 {
        self.heating_hours[zone.index()]
    }

    /// Years over which annual Title III incentives are paid.
    pub fn duration_years(&self, operator: OperatorType) -> f64 {
        if operator.is_public() {
            self.public_duration_years
        } else {
            self.private_duration_years
        }
    }

    pub fn opaque_cost_per_m2(&self, structure: &str) -> f64 {
        self.opaque_structures
            .iter()
            .find(|entry| entry.id == structure)
            .map(|entry| entry.cost_per_m2)
            .unwrap_or(self.opaque_default_cost)
    }

    pub fn climate_zone(&self, zone: ClimateZone) -> &ClimateZoneInfo {
        &self.climate_zones[zone.index()]
    }
}

const OPAQUE_STRUCTURES: [OpaqueStructure; 8] = [
    OpaqueStructure {
        id: "copertura_esterno",
        label: "Copertura - Isolamento esterno",
        cost_per_m2: 300.0,
    },
    OpaqueStructure {
        id: "copertura_interno",
        label: "Copertura - Isolamento interno",
        cost_per_m2: 150.0,
    },
    OpaqueStructure {
        id: "copertura_ventilata",
        label: "Copertura - Copertura ventilata",
        cost_per_m2: 350.0,
    },
    OpaqueStructure {
        id: "pavimento_esterno",
        label: "Pavimento - Isolamento esterno",
        cost_per_m2: 170.0,
    },
    OpaqueStructure {
        id: "pavimento_interno",
        label: "Pavimento - Isolamento interno",
        cost_per_m2: 150.0,
    },
    OpaqueStructure {
        id: "parete_esterno",
        label: "Parete perimetrale - Isolamento esterno",
        cost_per_m2: 200.0,
    },
    OpaqueStructure {
        id: "parete_interno",
        label: "Parete perimetrale - Isolamento interno",
        cost_per_m2: 100.0,
    },
    OpaqueStructure {
        id: "parete_ventilata",
        label: "Parete perimetrale - Parete ventilata",
        cost_per_m2: 250.0,
    },
];

pub(crate) const SHADING_TYPES: [UnitCeiling; 4] = [
    UnitCeiling {
        label: "Schermature/ombreggiamento",
        cost_per_unit: 250.0,
        max_incentive: 90_000.0,
    },
    UnitCeiling {
        label: "Meccanismi automatici",
        cost_per_unit: 50.0,
        max_incentive: 10_000.0,
    },
    UnitCeiling {
        label: "Filtrazione solare selettiva non riflettente",
        cost_per_unit: 130.0,
        max_incentive: 30_000.0,
    },
    UnitCeiling {
        label: "Filtrazione solare selettiva riflettente",
        cost_per_unit: 80.0,
        max_incentive: 30_000.0,
    },
];

pub(crate) const CHARGING_CLASSES: [ChargingClass; 5] = [
    ChargingClass {
        label: "Standard monofase (7.4-22kW)",
        ceiling: ChargingCeiling::PerPoint { amount: 2_400.0 },
    },
    ChargingClass {
        label: "Standard trifase (7.4-22kW)",
        ceiling: ChargingCeiling::PerPoint { amount: 8_400.0 },
    },
    ChargingClass {
        label: "Media (22-50kW)",
        ceiling: ChargingCeiling::PerKw { amount: 1_200.0 },
    },
    ChargingClass {
        label: "Alta (50-100kW)",
        ceiling: ChargingCeiling::Flat { amount: 60_000.0 },
    },
    ChargingClass {
        label: "Oltre 100kW",
        ceiling: ChargingCeiling::Flat { amount: 110_000.0 },
    },
];

const PHOTOVOLTAIC_TIERS: [PowerTier; 3] = [
    PowerTier {
        up_to_kw: 20.0,
        value: 1_500.0,
    },
    PowerTier {
        up_to_kw: 200.0,
        value: 1_200.0,
    },
    PowerTier {
        up_to_kw: 600.0,
        value: 1_100.0,
    },
];

const HEAT_PUMPS: [HeatPumpCoefficient; 5] = [
    HeatPumpCoefficient {
        matches: &["aria/aria split", "fixed double duct"],
        small_threshold_kw: 12.0,
        small: 0.200,
        small_split: Some(0.070),
        large: 0.055,
    },
    HeatPumpCoefficient {
        matches: &["VRF", "rooftop"],
        small_threshold_kw: 35.0,
        small: 0.150,
        small_split: None,
        large: 0.055,
    },
    HeatPumpCoefficient {
        matches: &["aria/acqua"],
        small_threshold_kw: 35.0,
        small: 0.150,
        small_split: None,
        large: 0.060,
    },
    HeatPumpCoefficient {
        matches: &["acqua/aria", "acqua/acqua"],
        small_threshold_kw: 35.0,
        small: 0.160,
        small_split: None,
        large: 0.060,
    },
    HeatPumpCoefficient {
        matches: &["salamoia"],
        small_threshold_kw: 35.0,
        small: 0.160,
        small_split: None,
        large: 0.060,
    },
];

const BIOMASS_BOILER_TIERS: [PowerTier; 2] = [
    PowerTier {
        up_to_kw: 35.0,
        value: 0.060,
    },
    PowerTier {
        up_to_kw: 500.0,
        value: 0.025,
    },
];

const SOLAR_BANDS: [SolarBand; 4] = [
    SolarBand {
        below_m2: 12.0,
        domestic_hot_water: 0.35,
        hot_water_and_heating: 0.36,
        concentrating: 0.38,
        solar_cooling: 0.43,
    },
    SolarBand {
        below_m2: 50.0,
        domestic_hot_water: 0.32,
        hot_water_and_heating: 0.33,
        concentrating: 0.35,
        solar_cooling: 0.40,
    },
    SolarBand {
        below_m2: 200.0,
        domestic_hot_water: 0.13,
        hot_water_and_heating: 0.13,
        concentrating: 0.13,
        solar_cooling: 0.17,
    },
    SolarBand {
        below_m2: 500.0,
        domestic_hot_water: 0.12,
        hot_water_and_heating: 0.12,
        concentrating: 0.12,
        solar_cooling: 0.15,
    },
];

const DISTRICT_HEATING_TIERS: [DistrictHeatingTier; 2] = [
    DistrictHeatingTier {
        up_to_kw: 35.0,
        cost_per_kw: 200.0,
        max_incentive: 6_500.0,
    },
    DistrictHeatingTier {
        up_to_kw: 100.0,
        cost_per_kw: 160.0,
        max_incentive: 15_000.0,
    },
];

static CT3_TABLES: RateTables = RateTables {
    envelope: EnvelopeRates {
        public_art48ter: 1.0,
        public: 0.65,
        private_cold: 0.50,
        private: 0.40,
    },
    efficiency_public: 1.0,
    efficiency_private: 0.40,
    nzeb_private: 0.65,
    eu_products_multiplier: 1.10,

    opaque_structures: &OPAQUE_STRUCTURES,
    opaque_default_cost: 300.0,
    opaque_max_incentive: 1_000_000.0,

    glazing_cost_cold: 800.0,
    glazing_cost_mild: 700.0,
    glazing_max_incentive: 500_000.0,

    shading: &SHADING_TYPES,
    nzeb_warm: UnitCeiling {
        label: "Zone A, B, C",
        cost_per_unit: 1_000.0,
        max_incentive: 2_500_000.0,
    },
    nzeb_cold: UnitCeiling {
        label: "Zone D, E, F",
        cost_per_unit: 1_300.0,
        max_incentive: 3_000_000.0,
    },
    lighting_high_efficiency: UnitCeiling {
        label: "Alta efficienza",
        cost_per_unit: 15.0,
        max_incentive: 50_000.0,
    },
    lighting_led: UnitCeiling {
        label: "LED",
        cost_per_unit: 35.0,
        max_incentive: 140_000.0,
    },
    building_automation: UnitCeiling {
        label: "Building automation",
        cost_per_unit: 60.0,
        max_incentive: 100_000.0,
    },

    charging_rate: 0.30,
    charging_classes: &CHARGING_CLASSES,

    photovoltaic_base_rate: 0.20,
    photovoltaic_tiers: &PHOTOVOLTAIC_TIERS,
    photovoltaic_cost_above_tiers: 1_050.0,
    storage_cost_per_kwh: 1_000.0,
    eu_registry_bonuses: &[("lett. a)", 0.05), ("lett. b)", 0.10), ("lett. c)", 0.15)],

    heating_hours: [600.0, 850.0, 1_100.0, 1_400.0, 1_700.0, 1_800.0],
    heat_pumps: &HEAT_PUMPS,
    heat_pump_default: 0.150,
    hybrid_small_threshold_kw: 35.0,
    hybrid_small: 0.150,
    hybrid_large: 0.060,
    hybrid_factory_made: 1.25,
    hybrid_large_system: 1.1,

    biomass_boiler_tiers: &BIOMASS_BOILER_TIERS,
    biomass_boiler_large: 0.020,
    biomass_pellet_stove: 0.055,
    biomass_other_stove: 0.045,
    biomass_stove_log_factor: 3.35,
    biomass_emission_bands: &[("Fino al 20%", 1.0), ("Dal 20% al 50%", 1.2)],
    biomass_emission_default: 1.5,
    biomass_district_reduction: 0.80,

    solar_bands: &SOLAR_BANDS,
    solar_large: SolarBand {
        below_m2: f64::INFINITY,
        domestic_hot_water: 0.11,
        hot_water_and_heating: 0.11,
        concentrating: 0.11,
        solar_cooling: 0.14,
    },
    solar_collector_yield: &[
        ("Piani vetrati", 400.0),
        ("Sottovuoto", 600.0),
        ("Concentrazione", 800.0),
    ],
    solar_default_yield: 500.0,

    water_heater_rate: 0.40,
    water_heater_small_tank_litres: 150.0,
    water_heater_caps: &[("Classe A", 500.0, 1_100.0), ("Classe A+", 700.0, 1_500.0)],

    district_heating_rate: 0.65,
    district_heating_tiers: &DISTRICT_HEATING_TIERS,
    district_heating_large: DistrictHeatingTier {
        up_to_kw: f64::INFINITY,
        cost_per_kw: 130.0,
        max_incentive: 30_000.0,
    },

    cogeneration_rate: 0.65,
    cogeneration_cost_per_kw: 5_000.0,
    cogeneration_max_incentive: 100_000.0,

    public_duration_years: 5.0,
    private_duration_years: 2.0,

    climate_zones: [
        ClimateZoneInfo {
            zone: ClimateZone::A,
            degree_days: 600,
            coefficient: 0.8,
        },
        ClimateZoneInfo {
            zone: ClimateZone::B,
            degree_days: 900,
            coefficient: 0.9,
        },
        ClimateZoneInfo {
            zone: ClimateZone::C,
            degree_days: 1_400,
            coefficient: 1.0,
        },
        ClimateZoneInfo {
            zone: ClimateZone::D,
            degree_days: 2_100,
            coefficient: 1.1,
        },
        ClimateZoneInfo {
            zone: ClimateZone::E,
            degree_days: 3_000,
            coefficient: 1.3,
        },
        ClimateZoneInfo {
            zone: ClimateZone::F,
            degree_days: 3_000,
            coefficient: 1.5,
        },
    ],
};

/// Coefficients in force for the 2025 decree.
pub fn ct3() -> &'static RateTables {
    &CT3_TABLES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_opaque_structure_uses_default_ceiling() {
        let tables = ct3();
        assert_eq!(tables.opaque_cost_per_m2("parete_interno"), 100.0);
        assert_eq!(tables.opaque_cost_per_m2("tetto_verde"), 300.0);
    }

    #[test]
    fn public_operators_are_paid_over_five_years() {
        let tables = ct3();
        assert_eq!(tables.duration_years(OperatorType::Pa), 5.0);
        assert_eq!(tables.duration_years(OperatorType::PrivateResidential), 2.0);
    }

    #[test]
    fn climate_zone_rows_are_indexed_by_zone() {
        let tables = ct3();
        for zone in ClimateZone::ALL {
            assert_eq!(tables.climate_zone(zone).zone, zone);
        }
        assert_eq!(tables.heating_hours(ClimateZone::E), 1_700.0);
    }
}
