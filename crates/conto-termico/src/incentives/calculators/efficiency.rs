//! Title II formulas: envelope, lighting, automation, charging and photovoltaic works.

use super::{Inputs, Recorder};
use crate::incentives::catalog::tables::{ChargingCeiling, UnitCeiling};
use crate::incentives::catalog::RateTables;
use crate::incentives::format::{euro, italian};
use crate::incentives::params::CalculationFault;
use tracing::warn;

fn eu_suffix(multiplier: f64, label: &str) -> String {
    if multiplier > 1.0 {
        format!(" × {multiplier:.2} ({label})")
    } else {
        String::new()
    }
}

/// Envelope rate for opaque structures, with the label used in explanations.
fn opaque_rate(input: &Inputs<'_>, cold_zone: bool) -> (f64, &'static str) {
    let rates = &input.tables.envelope;
    if input.operator.is_public() && input.context.is_art48ter() {
        (
            rates.public_art48ter,
            "100% (Art. 48-ter: scuole/ospedali/carceri)",
        )
    } else if input.operator.is_public() {
        (rates.public, "65% (PA/ETS non economici)")
    } else if cold_zone {
        (rates.private_cold, "50% (zone climatiche E/F)")
    } else {
        (rates.private, "40% (base)")
    }
}

pub(super) fn opaque_envelope<R: Recorder>(
    input: &Inputs<'_>,
    rec: &mut R,
) -> Result<f64, CalculationFault> {
    let tables = input.tables;
    let rows = input.params.rows("righe_opache")?;
    let zone = input.zone()?;
    let ue = input.eu_products_multiplier();

    rec.formula(|| format!("Itot = Σ [p × min(Ci, Cmax,i) × Sint,i]{}", eu_suffix(ue, "UE")));

    let zone = match zone {
        Some(zone) if !rows.is_empty() => zone,
        _ => {
            rec.step(|| "Nessuna riga inserita o zona climatica mancante".to_string());
            return Ok(0.0);
        }
    };

    let (rate, rate_label) = opaque_rate(input, zone.is_cold());
    rec.var("NumeroRighe", rows.len());
    rec.var("p", rate);
    rec.var("pDesc", rate_label);
    rec.var("ZonaClimatica", zone.id());
    rec.var("UE", ue > 1.0);
    rec.var("Imas", tables.opaque_max_incentive);
    rec.step(|| format!("Zona climatica: {zone}"));
    rec.step(|| format!("Percentuale: {rate_label}"));

    let mut total = 0.0;
    for (index, row) in rows.iter().enumerate() {
        let structure = row.text("tipologia_struttura")?;
        let area = row.positive("superficie")?;
        let cost = row.positive("costo_totale")?;
        let (Some(structure), Some(area), Some(cost)) = (structure, area, cost) else {
            rec.step(|| format!("Riga {}: dati incompleti", index + 1));
            continue;
        };

        let ceiling = tables.opaque_cost_per_m2(&structure);
        let specific = cost / area;
        if specific > ceiling {
            warn!(
                structure = %structure,
                specific_cost = specific,
                ceiling,
                "opaque structure cost above ceiling"
            );
        }
        let effective = specific.min(ceiling);
        let row_incentive = rate * effective * area * ue;
        total += row_incentive;

        rec.step(|| {
            format!(
                "Riga {}: {structure}, C = {} / {area:.2} = {specific:.2} €/m² (Cmax {ceiling})",
                index + 1,
                italian(cost, 2)
            )
        });
        rec.step(|| {
            format!(
                "  Incentivo riga = {rate:.2} × {effective:.2} × {area:.2}{} = {}",
                eu_suffix(ue, "UE"),
                euro(row_incentive)
            )
        });
    }

    let capped = total.min(tables.opaque_max_incentive);
    rec.step(|| {
        format!(
            "Finale = min({}, {}) = {}",
            italian(total, 2),
            italian(tables.opaque_max_incentive, 0),
            euro(capped)
        )
    });
    Ok(capped)
}

/// Shared shape of the area-priced works: `p × min(C, Cmax) × S`, EU bonus, absolute cap.
struct AreaRule {
    area_symbol: &'static str,
    rate: f64,
    ceiling: f64,
    cap: f64,
}

fn area_priced<R: Recorder>(
    input: &Inputs<'_>,
    rule: AreaRule,
    rec: &mut R,
) -> Result<f64, CalculationFault> {
    let area = input.params.positive("superficie")?;
    let cost = input.params.positive("costo_specifico")?;
    let ue = input.eu_products_multiplier();
    let AreaRule {
        area_symbol,
        rate,
        ceiling,
        cap,
    } = rule;

    rec.formula(|| {
        format!(
            "Itot = p × min(C, {ceiling}) × {area_symbol}{}; Imas={}€",
            eu_suffix(ue, "prodotti UE"),
            italian(cap, 0)
        )
    });

    let (Some(area), Some(cost)) = (area, cost) else {
        rec.step(|| "Superficie o costo specifico mancanti".to_string());
        return Ok(0.0);
    };

    let effective = cost.min(ceiling);
    let base = rate * effective * area;
    let with_ue = base * ue;
    let result = with_ue.min(cap);

    rec.var("p", rate);
    rec.var("C", cost);
    rec.var("Ceff", effective);
    rec.var(area_symbol, area);
    rec.var("UE", ue > 1.0);
    rec.var("Imas", cap);
    rec.step(|| format!("p={rate:.2}"));
    rec.step(|| format!("Ceff=min({cost:.2}, {ceiling})={effective:.2}"));
    rec.step(|| format!("Base={rate:.2}×{effective:.2}×{area:.2}={base:.2}"));
    rec.step(|| {
        if ue > 1.0 {
            format!("UE: {base:.2}×{ue:.2}={with_ue:.2}")
        } else {
            "UE: non applicata".to_string()
        }
    });
    rec.step(|| format!("Finale=min({with_ue:.2}, {cap})={result:.2}"));
    Ok(result)
}

fn efficiency_rate(input: &Inputs<'_>) -> f64 {
    if input.operator.is_public() {
        input.tables.efficiency_public
    } else {
        input.tables.efficiency_private
    }
}

pub(super) fn glazing<R: Recorder>(
    input: &Inputs<'_>,
    rec: &mut R,
) -> Result<f64, CalculationFault> {
    let tables = input.tables;
    let zone = input.zone()?;
    let mild = zone.map(|zone| zone.is_warm()).unwrap_or(true);
    let cold = zone.map(|zone| zone.is_cold()).unwrap_or(false);

    let rate = if input.operator.is_public() {
        tables.efficiency_public
    } else if cold {
        tables.envelope.private_cold
    } else {
        tables.envelope.private
    };
    let ceiling = if mild {
        tables.glazing_cost_mild
    } else {
        tables.glazing_cost_cold
    };

    area_priced(
        input,
        AreaRule {
            area_symbol: "Sint",
            rate,
            ceiling,
            cap: tables.glazing_max_incentive,
        },
        rec,
    )
}

/// Ceiling row for a shading type; unknown types use the first row.
pub(super) fn shading_ceiling(tables: &RateTables, kind: Option<&str>) -> UnitCeiling {
    kind.and_then(|kind| tables.shading.iter().find(|row| row.label == kind))
        .or_else(|| tables.shading.first())
        .copied()
        .unwrap_or(UnitCeiling {
            label: "",
            cost_per_unit: 0.0,
            max_incentive: 0.0,
        })
}

pub(super) fn solar_shading<R: Recorder>(
    input: &Inputs<'_>,
    rec: &mut R,
) -> Result<f64, CalculationFault> {
    let kind = input.params.text("tipo_schermatura")?;
    let ceiling = shading_ceiling(input.tables, kind.as_deref());
    rec.var("Tipo", ceiling.label);

    area_priced(
        input,
        AreaRule {
            area_symbol: "Sint",
            rate: efficiency_rate(input),
            ceiling: ceiling.cost_per_unit,
            cap: ceiling.max_incentive,
        },
        rec,
    )
}

pub(super) fn nzeb<R: Recorder>(input: &Inputs<'_>, rec: &mut R) -> Result<f64, CalculationFault> {
    let tables = input.tables;
    let warm = input.zone()?.map(|zone| zone.is_warm()).unwrap_or(false);
    let ceiling = if warm {
        tables.nzeb_warm
    } else {
        tables.nzeb_cold
    };
    let rate = if input.operator.is_public() {
        tables.efficiency_public
    } else {
        tables.nzeb_private
    };

    area_priced(
        input,
        AreaRule {
            area_symbol: "Sed",
            rate,
            ceiling: ceiling.cost_per_unit,
            cap: ceiling.max_incentive,
        },
        rec,
    )
}

pub(super) fn lighting<R: Recorder>(
    input: &Inputs<'_>,
    rec: &mut R,
) -> Result<f64, CalculationFault> {
    let tables = input.tables;
    let kind = input.params.text("tipo_lampada")?;
    let ceiling = if kind.as_deref() == Some(tables.lighting_high_efficiency.label) {
        tables.lighting_high_efficiency
    } else {
        tables.lighting_led
    };
    rec.var("Tipo", ceiling.label);

    area_priced(
        input,
        AreaRule {
            area_symbol: "Sed",
            rate: efficiency_rate(input),
            ceiling: ceiling.cost_per_unit,
            cap: ceiling.max_incentive,
        },
        rec,
    )
}

pub(super) fn building_automation<R: Recorder>(
    input: &Inputs<'_>,
    rec: &mut R,
) -> Result<f64, CalculationFault> {
    let ceiling = input.tables.building_automation;
    area_priced(
        input,
        AreaRule {
            area_symbol: "Sed",
            rate: efficiency_rate(input),
            ceiling: ceiling.cost_per_unit,
            cap: ceiling.max_incentive,
        },
        rec,
    )
}

pub(super) fn charging_infrastructure<R: Recorder>(
    input: &Inputs<'_>,
    rec: &mut R,
) -> Result<f64, CalculationFault> {
    let tables = input.tables;
    let params = input.params;
    let rate = tables.charging_rate;
    rec.formula(|| format!("Itot = {:.0}% × min(Spesa, Cmax)", rate * 100.0));

    let Some(spend) = params.positive("costo_totale")? else {
        rec.step(|| "Spesa mancante".to_string());
        return Ok(0.0);
    };

    let kind = params.text("tipo_infrastruttura")?;
    let class = kind
        .as_deref()
        .and_then(|kind| tables.charging_classes.iter().find(|class| class.label == kind));

    let ceiling = match class.map(|class| class.ceiling) {
        Some(ChargingCeiling::PerPoint { amount }) => {
            let points = params.number("numero_punti")?.unwrap_or(0.0).trunc().max(0.0);
            let ceiling = amount * points;
            rec.step(|| format!("Cmax = {amount} € × N_punti ({points}) = {}", italian(ceiling, 0)));
            ceiling
        }
        Some(ChargingCeiling::PerKw { amount }) => {
            let power = params.number("potenza")?.unwrap_or(0.0);
            let ceiling = power * amount;
            rec.step(|| format!("Cmax = P × {amount} €/kW = {power:.1} × {amount} = {}", italian(ceiling, 0)));
            ceiling
        }
        Some(ChargingCeiling::Flat { amount }) => {
            rec.step(|| format!("Cmax = {} € per infrastruttura", italian(amount, 0)));
            amount
        }
        None => {
            rec.step(|| "Tipo non selezionato".to_string());
            0.0
        }
    };

    let admissible = spend.min(ceiling);
    let incentive = rate * admissible;

    rec.var("Spesa", spend);
    rec.var("Cmax", ceiling);
    rec.var("SpesaAmm", admissible);
    rec.step(|| {
        format!(
            "Spesa ammissibile = min({}, {}) = {}",
            italian(spend, 2),
            italian(ceiling, 2),
            italian(admissible, 2)
        )
    });
    rec.step(|| format!("Itot = {rate:.2} × {} = {}", italian(admissible, 2), euro(incentive)));
    Ok(incentive)
}

pub(super) fn photovoltaic<R: Recorder>(
    input: &Inputs<'_>,
    rec: &mut R,
) -> Result<f64, CalculationFault> {
    let tables = input.tables;
    let params = input.params;
    let power = params.positive("potenza_fv")?;
    let storage = params.positive("capacita_accumulo")?;
    let registry = params.text("registro_ue")?;

    let bonus = registry
        .as_deref()
        .and_then(|registry| {
            tables
                .eu_registry_bonuses
                .iter()
                .find(|(marker, _)| registry.contains(marker))
        })
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0.0);
    let rate = tables.photovoltaic_base_rate + bonus;
    let storage_ceiling = tables.storage_cost_per_kwh;

    rec.formula(|| {
        format!(
            "Itot = {:.0}% × (min(C_FV, cmax_FV) + min(C_acc, {storage_ceiling}€/kWh))",
            rate * 100.0
        )
    });

    let (Some(power), Some(storage)) = (power, storage) else {
        rec.step(|| "Potenza FV o capacità di accumulo mancanti".to_string());
        return Ok(0.0);
    };

    let ceiling = tables
        .photovoltaic_tiers
        .iter()
        .find(|tier| power <= tier.up_to_kw)
        .map(|tier| tier.value)
        .unwrap_or(tables.photovoltaic_cost_above_tiers);
    let panels_cost = power * ceiling;
    let storage_cost = storage * storage_ceiling;
    let incentive = rate * (panels_cost + storage_cost);

    rec.var("p_fv", power);
    rec.var("cmax_fv", ceiling);
    rec.var("costi_fv", panels_cost);
    rec.var("kwh_acc", storage);
    rec.var("cmax_acc_kwh", storage_ceiling);
    rec.var("costi_acc", storage_cost);
    rec.step(|| format!("C_FV = {power:.1} kWp × {ceiling} €/kWp = {}", italian(panels_cost, 2)));
    rec.step(|| format!("C_acc = {storage:.1} kWh × {storage_ceiling} €/kWh = {}", italian(storage_cost, 2)));
    rec.step(|| format!("Itot = {rate:.2} × {} = {}", italian(panels_cost + storage_cost, 2), euro(incentive)));
    Ok(incentive)
}
