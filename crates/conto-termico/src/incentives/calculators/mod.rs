//! Per-intervention incentive formulas.
//!
//! Each formula is written once against a [`Recorder`]. [`calculate`] runs it with a recorder
//! that discards everything and [`explain`] with one that keeps the trace, so the explained
//! result is the calculated result, produced by the same arithmetic.

mod efficiency;
mod renewables;

use super::catalog::RateTables;
use super::domain::{ClimateZone, ContextData, InterventionId, OperatorType, PremiumId};
use super::params::{CalculationFault, InterventionParams};
use serde::Serialize;
use tracing::debug;

/// Value shown next to a named variable in an explanation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExplainValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl From<f64> for ExplainValue {
    fn from(value: f64) -> Self {
        ExplainValue::Number(value)
    }
}

impl From<usize> for ExplainValue {
    fn from(value: usize) -> Self {
        ExplainValue::Number(value as f64)
    }
}

impl From<bool> for ExplainValue {
    fn from(value: bool) -> Self {
        ExplainValue::Flag(value)
    }
}

impl From<&str> for ExplainValue {
    fn from(value: &str) -> Self {
        ExplainValue::Text(value.to_string())
    }
}

impl From<String> for ExplainValue {
    fn from(value: String) -> Self {
        ExplainValue::Text(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainVariable {
    pub name: &'static str,
    pub value: ExplainValue,
}

/// Auditable decomposition of one intervention's incentive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainResult {
    pub intervention: InterventionId,
    pub result: f64,
    pub formula: String,
    pub variables: Vec<ExplainVariable>,
    pub steps: Vec<String>,
}

impl ExplainResult {
    pub fn variable(&self, name: &str) -> Option<&ExplainValue> {
        self.variables
            .iter()
            .find(|variable| variable.name == name)
            .map(|variable| &variable.value)
    }
}

/// Sink for the human-readable side of a calculation.
///
/// Renderers are closures so that the silent path never formats a string.
pub(crate) trait Recorder {
    fn formula(&mut self, render: impl FnOnce() -> String);
    fn var(&mut self, name: &'static str, value: impl Into<ExplainValue>);
    fn step(&mut self, render: impl FnOnce() -> String);
}

pub(crate) struct Silent;

impl Recorder for Silent {
    fn formula(&mut self, _render: impl FnOnce() -> String) {}

    fn var(&mut self, _name: &'static str, _value: impl Into<ExplainValue>) {}

    fn step(&mut self, _render: impl FnOnce() -> String) {}
}

#[derive(Default)]
pub(crate) struct Trace {
    formula: String,
    variables: Vec<ExplainVariable>,
    steps: Vec<String>,
}

impl Trace {
    fn finish(self, intervention: InterventionId, result: f64) -> ExplainResult {
        ExplainResult {
            intervention,
            result,
            formula: self.formula,
            variables: self.variables,
            steps: self.steps,
        }
    }
}

impl Recorder for Trace {
    fn formula(&mut self, render: impl FnOnce() -> String) {
        self.formula = render();
    }

    fn var(&mut self, name: &'static str, value: impl Into<ExplainValue>) {
        self.variables.push(ExplainVariable {
            name,
            value: value.into(),
        });
    }

    fn step(&mut self, render: impl FnOnce() -> String) {
        self.steps.push(render());
    }
}

/// Everything a formula may read.
pub(crate) struct Inputs<'a> {
    pub tables: &'a RateTables,
    pub params: &'a InterventionParams,
    pub operator: OperatorType,
    pub context: &'a ContextData,
}

impl Inputs<'_> {
    /// Selected climate zone; unknown labels count as missing.
    fn zone(&self) -> Result<Option<ClimateZone>, CalculationFault> {
        Ok(self
            .params
            .text("zona_climatica")?
            .as_deref()
            .and_then(ClimateZone::from_id))
    }

    fn eu_products_multiplier(&self) -> f64 {
        if self.params.premium_selected(PremiumId::ProdottiUe) {
            self.tables.eu_products_multiplier
        } else {
            1.0
        }
    }

    fn duration_years(&self) -> f64 {
        self.tables.duration_years(self.operator)
    }
}

fn evaluate<R: Recorder>(
    intervention: InterventionId,
    input: &Inputs<'_>,
    rec: &mut R,
) -> Result<f64, CalculationFault> {
    let raw = match intervention {
        InterventionId::IsolamentoOpache => efficiency::opaque_envelope(input, rec)?,
        InterventionId::SostituzioneInfissi => efficiency::glazing(input, rec)?,
        InterventionId::SchermatureSolari => efficiency::solar_shading(input, rec)?,
        InterventionId::Nzeb => efficiency::nzeb(input, rec)?,
        InterventionId::IlluminazioneLed => efficiency::lighting(input, rec)?,
        InterventionId::BuildingAutomation => efficiency::building_automation(input, rec)?,
        InterventionId::InfrastruttureRicarica => efficiency::charging_infrastructure(input, rec)?,
        InterventionId::FotovoltaicoAccumulo => efficiency::photovoltaic(input, rec)?,
        InterventionId::PompaCalore => renewables::heat_pump(input, rec)?,
        InterventionId::SistemiIbridi => renewables::hybrid_system(input, rec)?,
        InterventionId::Biomassa => renewables::biomass(input, rec)?,
        InterventionId::SolareTermico => renewables::solar_thermal(input, rec)?,
        InterventionId::ScaldacquaPdc => renewables::heat_pump_water_heater(input, rec)?,
        InterventionId::Teleriscaldamento => renewables::district_heating(input, rec)?,
        InterventionId::Microcogenerazione => renewables::micro_cogeneration(input, rec)?,
    };

    // NaN collapses to zero as well.
    Ok(raw.max(0.0))
}

/// Incentive in euro for one intervention; missing inputs yield 0.
pub fn calculate(
    tables: &RateTables,
    intervention: InterventionId,
    params: &InterventionParams,
    operator: OperatorType,
    context: &ContextData,
) -> Result<f64, CalculationFault> {
    let input = Inputs {
        tables,
        params,
        operator,
        context,
    };
    let result = evaluate(intervention, &input, &mut Silent)?;
    debug!(%intervention, %operator, incentive = result, "intervention calculated");
    Ok(result)
}

/// Same computation as [`calculate`], with formula, variables and steps.
pub fn explain(
    tables: &RateTables,
    intervention: InterventionId,
    params: &InterventionParams,
    operator: OperatorType,
    context: &ContextData,
) -> Result<ExplainResult, CalculationFault> {
    let input = Inputs {
        tables,
        params,
        operator,
        context,
    };
    let mut trace = Trace::default();
    let result = evaluate(intervention, &input, &mut trace)?;
    Ok(trace.finish(intervention, result))
}

/// Absolute per-intervention cap for the given inputs, when the rules state one.
pub fn stated_cap(
    tables: &RateTables,
    intervention: InterventionId,
    params: &InterventionParams,
) -> Result<Option<f64>, CalculationFault> {
    let cap = match intervention {
        InterventionId::IsolamentoOpache => Some(tables.opaque_max_incentive),
        InterventionId::SostituzioneInfissi => Some(tables.glazing_max_incentive),
        InterventionId::SchermatureSolari => {
            let kind = params.text("tipo_schermatura")?;
            Some(efficiency::shading_ceiling(tables, kind.as_deref()).max_incentive)
        }
        InterventionId::Nzeb => Some(tables.nzeb_cold.max_incentive.max(tables.nzeb_warm.max_incentive)),
        InterventionId::IlluminazioneLed => Some(
            tables
                .lighting_led
                .max_incentive
                .max(tables.lighting_high_efficiency.max_incentive),
        ),
        InterventionId::BuildingAutomation => Some(tables.building_automation.max_incentive),
        InterventionId::ScaldacquaPdc => tables
            .water_heater_caps
            .iter()
            .map(|(_, small, large)| small.max(*large))
            .reduce(f64::max),
        InterventionId::Teleriscaldamento => Some(tables.district_heating_large.max_incentive),
        InterventionId::Microcogenerazione => Some(tables.cogeneration_max_incentive),
        InterventionId::InfrastruttureRicarica
        | InterventionId::FotovoltaicoAccumulo
        | InterventionId::PompaCalore
        | InterventionId::SistemiIbridi
        | InterventionId::Biomassa
        | InterventionId::SolareTermico => None,
    };
    Ok(cap)
}
