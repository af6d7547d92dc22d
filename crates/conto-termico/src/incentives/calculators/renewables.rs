//! Title III formulas. Annual incentives are multiplied by the payout duration of the operator.

use super::{Inputs, Recorder};
use crate::incentives::catalog::tables::{DistrictHeatingTier, SolarBand};
use crate::incentives::catalog::RateTables;
use crate::incentives::domain::ClimateZone;
use crate::incentives::format::{euro, italian};
use crate::incentives::params::CalculationFault;

const ENERGY_FORMULA: &str = "EI = Qu × (1 - 1/SCOP) × kp; Qu = Prated × Quf";

/// Heat pump operating figures shared by stand-alone pumps and hybrid systems.
struct PumpRating {
    power: f64,
    scop: f64,
    scop_min: f64,
    zone: ClimateZone,
}

impl PumpRating {
    fn read(input: &Inputs<'_>, power_field: &str) -> Result<Option<Self>, CalculationFault> {
        let params = input.params;
        let power = params.positive(power_field)?;
        let scop = params.positive("scop")?;
        let scop_min = params.positive("scop_minimo")?;
        let zone = input.zone()?;
        Ok(match (power, scop, scop_min, zone) {
            (Some(power), Some(scop), Some(scop_min), Some(zone)) => Some(Self {
                power,
                scop,
                scop_min,
                zone,
            }),
            _ => None,
        })
    }

    /// Incentivised thermal energy `EI` in kWh.
    fn incentivised_energy<R: Recorder>(&self, tables: &RateTables, rec: &mut R) -> f64 {
        let hours = tables.heating_hours(self.zone);
        let qu = self.power * hours;
        let kp = self.scop / self.scop_min;
        let ei = qu * (1.0 - 1.0 / self.scop) * kp;

        rec.var("Prated", self.power);
        rec.var("Quf", hours);
        rec.var("Qu", qu);
        rec.var("SCOP", self.scop);
        rec.var("kp", kp);
        rec.var("EI", ei);
        rec.step(|| format!("Qu = {:.1} × {hours} = {qu:.2} kWh", self.power));
        rec.step(|| format!("kp = {:.2} / {:.2} = {kp:.4}", self.scop, self.scop_min));
        rec.step(|| format!("EI = {qu:.2} × (1 - 1/{:.2}) × {kp:.4} = {ei:.2} kWh", self.scop));
        ei
    }
}

fn heat_pump_coefficient(tables: &RateTables, kind: &str, power: f64) -> f64 {
    let Some(row) = tables
        .heat_pumps
        .iter()
        .find(|row| row.matches.iter().any(|marker| kind.contains(marker)))
    else {
        return tables.heat_pump_default;
    };

    if power <= row.small_threshold_kw {
        match row.small_split {
            Some(split) if kind.contains("split") => split,
            _ => row.small,
        }
    } else {
        row.large
    }
}

pub(super) fn heat_pump<R: Recorder>(
    input: &Inputs<'_>,
    rec: &mut R,
) -> Result<f64, CalculationFault> {
    rec.formula(|| format!("Ia_tot = Ci × EI × durata; {ENERGY_FORMULA}"));

    let kind = input.params.text("tipo_pompa")?.unwrap_or_default();
    let Some(rating) = PumpRating::read(input, "potenza_nominale")? else {
        rec.step(|| "Potenza, SCOP, SCOP minimo o zona climatica mancanti".to_string());
        return Ok(0.0);
    };

    let ei = rating.incentivised_energy(input.tables, rec);
    let ci = heat_pump_coefficient(input.tables, &kind, rating.power);
    let duration = input.duration_years();
    let annual = ci * ei;
    let total = annual * duration;

    rec.var("Ci", ci);
    rec.var("durata", duration);
    rec.step(|| format!("Ia annuo = {ci:.3} × {ei:.2} = {annual:.2}"));
    rec.step(|| format!("Ia_tot = {annual:.2} × {duration} anni = {}", euro(total)));
    Ok(total)
}

pub(super) fn hybrid_system<R: Recorder>(
    input: &Inputs<'_>,
    rec: &mut R,
) -> Result<f64, CalculationFault> {
    let tables = input.tables;
    rec.formula(|| format!("Ia_tot = k × EI × Ci × durata; {ENERGY_FORMULA}"));

    let kind = input.params.text("tipo_sistema")?.unwrap_or_default();
    let Some(rating) = PumpRating::read(input, "potenza_pdc")? else {
        rec.step(|| "Potenza, SCOP, SCOP minimo o zona climatica mancanti".to_string());
        return Ok(0.0);
    };

    let k = if kind.contains("factory made") {
        tables.hybrid_factory_made
    } else if kind.contains(">35kW") {
        tables.hybrid_large_system
    } else {
        1.0
    };
    let ei = rating.incentivised_energy(tables, rec);
    let ci = if rating.power <= tables.hybrid_small_threshold_kw {
        tables.hybrid_small
    } else {
        tables.hybrid_large
    };
    let duration = input.duration_years();
    let annual = k * ei * ci;
    let total = annual * duration;

    rec.var("k", k);
    rec.var("Ci", ci);
    rec.var("durata", duration);
    rec.step(|| format!("Ia annuo = {k} × {ei:.2} × {ci:.3} = {annual:.2}"));
    rec.step(|| format!("Ia_tot = {annual:.2} × {duration} anni = {}", euro(total)));
    Ok(total)
}

const BIOMASS_BOILER: &str = "Caldaia a biomassa";

pub(super) fn biomass<R: Recorder>(
    input: &Inputs<'_>,
    rec: &mut R,
) -> Result<f64, CalculationFault> {
    let tables = input.tables;
    let params = input.params;
    let district_plant = params.flag("centrale_teleriscaldamento");

    rec.formula(|| {
        let reduction = if district_plant {
            format!(" × {:.2} (teleriscaldamento)", tables.biomass_district_reduction)
        } else {
            String::new()
        };
        format!("Ia_tot = f(tipo) × Hr × Ci × Ce × durata{reduction}")
    });

    let power = params.positive("potenza_nominale")?;
    let zone = input.zone()?;
    let reduction = params.text("riduzione_emissioni")?;
    let (Some(power), Some(zone), Some(reduction)) = (power, zone, reduction) else {
        rec.step(|| "Potenza, zona climatica o riduzione emissioni mancanti".to_string());
        return Ok(0.0);
    };

    let generator = params.text("tipo_generatore")?.unwrap_or_default();
    let is_boiler = generator == BIOMASS_BOILER;

    let ce = tables
        .biomass_emission_bands
        .iter()
        .find(|(label, _)| *label == reduction)
        .map(|(_, ce)| *ce)
        .unwrap_or(tables.biomass_emission_default);
    let ci = if is_boiler {
        tables
            .biomass_boiler_tiers
            .iter()
            .find(|tier| power <= tier.up_to_kw)
            .map(|tier| tier.value)
            .unwrap_or(tables.biomass_boiler_large)
    } else if generator.contains("pellet") {
        tables.biomass_pellet_stove
    } else {
        tables.biomass_other_stove
    };
    let hours = tables.heating_hours(zone);

    let mut annual = if is_boiler {
        power * hours * ci * ce
    } else {
        tables.biomass_stove_log_factor * power.ln() * hours * ci * ce
    };
    rec.step(|| {
        if is_boiler {
            format!("Ia annuo = Pn × Hr × Ci × Ce = {power:.1} × {hours} × {ci:.3} × {ce} = {annual:.2}")
        } else {
            format!(
                "Ia annuo = {} × ln({power:.1}) × {hours} × {ci:.3} × {ce} = {annual:.2}",
                tables.biomass_stove_log_factor
            )
        }
    });
    if district_plant {
        annual *= tables.biomass_district_reduction;
        rec.step(|| format!("Riduzione teleriscaldamento: {annual:.2}"));
    }

    let duration = input.duration_years();
    let total = annual * duration;

    rec.var("tipo", generator.as_str());
    rec.var("Pn", power);
    rec.var("Hr", hours);
    rec.var("Ci", ci);
    rec.var("Ce", ce);
    rec.var("durata", duration);
    rec.step(|| format!("Ia_tot = {annual:.2} × {duration} anni = {}", euro(total)));
    Ok(total)
}

fn solar_band(tables: &RateTables, area: f64) -> SolarBand {
    tables
        .solar_bands
        .iter()
        .find(|band| area < band.below_m2)
        .copied()
        .unwrap_or(tables.solar_large)
}

/// Coefficient for the system type; unrecognised types price as solar cooling.
fn solar_coefficient(band: &SolarBand, system: &str) -> f64 {
    match system {
        "Produzione ACS" => band.domestic_hot_water,
        "Produzione ACS + riscaldamento" => band.hot_water_and_heating,
        "Collettori a concentrazione" => band.concentrating,
        _ => band.solar_cooling,
    }
}

pub(super) fn solar_thermal<R: Recorder>(
    input: &Inputs<'_>,
    rec: &mut R,
) -> Result<f64, CalculationFault> {
    let tables = input.tables;
    let params = input.params;
    rec.formula(|| "Ia_tot = Ci × Qu × Sl × durata".to_string());

    let area = params.positive("superficie_lorda")?;
    let system = params.text("tipo_impianto")?;
    let (Some(area), Some(system)) = (area, system) else {
        rec.step(|| "Superficie lorda o tipo di impianto mancanti".to_string());
        return Ok(0.0);
    };

    let ci = solar_coefficient(&solar_band(tables, area), &system);
    let collector = params.text("tipo_collettore")?;
    let qu = match params.positive("qcol")? {
        Some(certified) => certified,
        None => collector
            .as_deref()
            .and_then(|collector| {
                tables
                    .solar_collector_yield
                    .iter()
                    .find(|(label, _)| *label == collector)
            })
            .map(|(_, yield_kwh)| *yield_kwh)
            .unwrap_or(tables.solar_default_yield),
    };
    let duration = input.duration_years();
    let annual = ci * qu * area;
    let total = annual * duration;

    rec.var("Ci", ci);
    rec.var("Qu", qu);
    rec.var("Sl", area);
    rec.var("durata", duration);
    rec.step(|| format!("Ia annuo = {ci:.2} × {qu:.1} × {area:.2} = {annual:.2}"));
    rec.step(|| format!("Ia_tot = {annual:.2} × {duration} anni = {}", euro(total)));
    Ok(total)
}

pub(super) fn heat_pump_water_heater<R: Recorder>(
    input: &Inputs<'_>,
    rec: &mut R,
) -> Result<f64, CalculationFault> {
    let tables = input.tables;
    let params = input.params;
    let rate = tables.water_heater_rate;

    let capacity = params.positive("capacita")?;
    let class = params.text("classe_energetica")?;
    let spend = params.positive("costo_totale")?;
    let (Some(capacity), Some(class), Some(spend)) = (capacity, class, spend) else {
        rec.formula(|| format!("Itot = {:.0}% × Spesa", rate * 100.0));
        rec.step(|| "Capacità, classe energetica o spesa mancanti".to_string());
        return Ok(0.0);
    };

    // Unlisted classes take the last (highest) row.
    let cap = tables
        .water_heater_caps
        .iter()
        .find(|(label, _, _)| *label == class)
        .or_else(|| tables.water_heater_caps.last())
        .map(|(_, small, large)| {
            if capacity <= tables.water_heater_small_tank_litres {
                *small
            } else {
                *large
            }
        })
        .unwrap_or(0.0);
    let base = rate * spend;
    let result = base.min(cap);

    rec.formula(|| format!("Itot = {:.0}% × Spesa; Imas={}€", rate * 100.0, italian(cap, 0)));
    rec.var("Spesa", spend);
    rec.var("Imas", cap);
    rec.step(|| format!("Base={rate:.2}×{spend:.2}={base:.2}"));
    rec.step(|| format!("Finale=min({base:.2}, {cap})={result:.2}"));
    Ok(result)
}

fn district_heating_tier(tables: &RateTables, power: f64) -> DistrictHeatingTier {
    tables
        .district_heating_tiers
        .iter()
        .find(|tier| power <= tier.up_to_kw)
        .copied()
        .unwrap_or(tables.district_heating_large)
}

pub(super) fn district_heating<R: Recorder>(
    input: &Inputs<'_>,
    rec: &mut R,
) -> Result<f64, CalculationFault> {
    let tables = input.tables;
    let rate = tables.district_heating_rate;
    let power = input.params.positive("potenza_contrattuale")?;
    let spend = input.params.positive("costo_totale")?;

    let (Some(power), Some(spend)) = (power, spend) else {
        rec.formula(|| format!("Itot = {:.0}% × min(Spesa, Pn × Cmax)", rate * 100.0));
        rec.step(|| "Potenza contrattuale o spesa mancanti".to_string());
        return Ok(0.0);
    };

    let tier = district_heating_tier(tables, power);
    let admissible = power * tier.cost_per_kw;
    let effective = spend.min(admissible);
    let base = rate * effective;
    let result = base.min(tier.max_incentive);

    rec.formula(|| {
        format!(
            "Itot = {:.0}% × min(Spesa, Pn × Cmax); Imas={}€",
            rate * 100.0,
            italian(tier.max_incentive, 0)
        )
    });
    rec.var("Spesa", spend);
    rec.var("Pn", power);
    rec.var("cmax", tier.cost_per_kw);
    rec.var("Imas", tier.max_incentive);
    rec.step(|| format!("C_amm=P×Cmax={power}×{}={admissible:.2}", tier.cost_per_kw));
    rec.step(|| format!("Spesa_eff=min({spend:.2}, {admissible:.2})={effective:.2}"));
    rec.step(|| format!("Base={rate:.2}×{effective:.2}={base:.2}"));
    rec.step(|| format!("Finale=min({base:.2}, {})={result:.2}", tier.max_incentive));
    Ok(result)
}

pub(super) fn micro_cogeneration<R: Recorder>(
    input: &Inputs<'_>,
    rec: &mut R,
) -> Result<f64, CalculationFault> {
    let tables = input.tables;
    let rate = tables.cogeneration_rate;
    let unit_cost = tables.cogeneration_cost_per_kw;
    let cap = tables.cogeneration_max_incentive;

    rec.formula(|| {
        format!(
            "Itot = {:.0}% × min(Spesa, P_el × {unit_cost}€/kWe); Imas={}€",
            rate * 100.0,
            italian(cap, 0)
        )
    });

    let power = input.params.positive("potenza_elettrica")?;
    let spend = input.params.positive("costo_totale")?;
    let (Some(power), Some(spend)) = (power, spend) else {
        rec.step(|| "Potenza elettrica o spesa mancanti".to_string());
        return Ok(0.0);
    };

    let admissible = power * unit_cost;
    let effective = spend.min(admissible);
    let base = rate * effective;
    let result = base.min(cap);

    rec.var("Spesa", spend);
    rec.var("P_el", power);
    rec.var("Imas", cap);
    rec.step(|| format!("C_amm=P_el×{unit_cost}={power}×{unit_cost}={admissible:.2}"));
    rec.step(|| format!("Spesa_eff=min({spend:.2}, {admissible:.2})={effective:.2}"));
    rec.step(|| format!("Base={rate:.2}×{effective:.2}={base:.2}"));
    rec.step(|| format!("Finale=min({base:.2}, {cap})={result:.2}"));
    Ok(result)
}
