use super::params::{CalculationFault, InterventionParams};
use serde::Serialize;

/// Declarative description of one form input.
#[derive(Debug, Clone, Serialize)]
pub struct InputField {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<FieldBound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<VisibilityRule>,
}

impl InputField {
    pub const fn number(id: &'static str, label: &'static str) -> Self {
        Self {
            id,
            label,
            kind: FieldKind::Number,
            min: Some(0.0),
            max: None,
            step: None,
            optional: false,
            help: None,
            visible_if: None,
        }
    }

    pub const fn select(
        id: &'static str,
        label: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            kind: FieldKind::Select { options },
            min: None,
            ..Self::number(id, label)
        }
    }

    pub const fn table(
        id: &'static str,
        label: &'static str,
        columns: &'static [InputField],
    ) -> Self {
        Self {
            kind: FieldKind::Table { columns },
            min: None,
            ..Self::number(id, label)
        }
    }

    pub const fn checkbox(id: &'static str, label: &'static str) -> Self {
        Self {
            kind: FieldKind::Checkbox,
            min: None,
            optional: true,
            ..Self::number(id, label)
        }
    }

    pub const fn computed(id: &'static str, label: &'static str) -> Self {
        Self {
            kind: FieldKind::Computed,
            min: None,
            optional: true,
            ..Self::number(id, label)
        }
    }

    pub const fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub const fn max(mut self, max: FieldBound) -> Self {
        self.max = Some(max);
        self
    }

    pub const fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub const fn help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    pub const fn visible_if(
        mut self,
        field: &'static str,
        values: &'static [&'static str],
    ) -> Self {
        self.visible_if = Some(VisibilityRule { field, values });
        self
    }

    /// Whether the field is shown given the values entered so far.
    pub fn is_visible(&self, params: &InterventionParams) -> bool {
        match &self.visible_if {
            None => true,
            Some(rule) => rule.matches(params),
        }
    }

    /// Upper bound in force for the current inputs, if any.
    pub fn resolve_max(&self, params: &InterventionParams) -> Result<Option<f64>, CalculationFault> {
        match &self.max {
            None => Ok(None),
            Some(bound) => bound.resolve(params),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Number,
    Select { options: &'static [&'static str] },
    Table { columns: &'static [InputField] },
    Checkbox,
    /// Derived by the form; never requested from the user.
    Computed,
}

/// Shows a field only while another field holds one of `values`.
#[derive(Debug, Clone, Serialize)]
pub struct VisibilityRule {
    pub field: &'static str,
    pub values: &'static [&'static str],
}

impl VisibilityRule {
    pub fn matches(&self, params: &InterventionParams) -> bool {
        params
            .get(self.field)
            .and_then(|value| value.match_text())
            .map(|current| self.values.iter().any(|allowed| *allowed == current))
            .unwrap_or(false)
    }
}

/// Upper bound of a numeric field.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldBound {
    Static {
        value: f64,
    },
    /// Bound selected by the value of another field; `None` means unbounded.
    DependsOn {
        field: &'static str,
        cases: &'static [(&'static str, Limit)],
        fallback: Option<Limit>,
    },
}

impl FieldBound {
    pub fn resolve(&self, params: &InterventionParams) -> Result<Option<f64>, CalculationFault> {
        match self {
            FieldBound::Static { value } => Ok(Some(*value)),
            FieldBound::DependsOn {
                field,
                cases,
                fallback,
            } => {
                let selected = params.text(field)?;
                let limit = selected
                    .as_deref()
                    .and_then(|value| {
                        cases
                            .iter()
                            .find(|(case, _)| *case == value)
                            .map(|(_, limit)| *limit)
                    })
                    .or(*fallback);
                match limit {
                    Some(limit) => limit.resolve(params),
                    None => Ok(None),
                }
            }
        }
    }
}

/// Limit picked by one case of a dependent bound.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Limit {
    Fixed {
        value: f64,
    },
    /// `factor` for each unit held by `field`; unbounded while `field` is empty or zero.
    PerUnit {
        field: &'static str,
        factor: f64,
    },
}

impl Limit {
    pub fn resolve(&self, params: &InterventionParams) -> Result<Option<f64>, CalculationFault> {
        match *self {
            Limit::Fixed { value } => Ok(Some(value)),
            Limit::PerUnit { field, factor } => {
                Ok(params.positive(field)?.map(|units| units * factor))
            }
        }
    }
}
