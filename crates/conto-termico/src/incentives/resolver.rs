//! Subject × building → operator classification.

use super::catalog::{
    ImplementationModeInfo, InterventionSpec, OperatorMapping, RegulatoryNote, RuleCatalog,
};
use super::domain::{
    BuildingCategory, ContextData, ImplementationMode, InterventionId, OperatorType, SubjectType,
};
use super::error::IncentiveError;
use super::schema::InputField;
use serde::Serialize;
use tracing::{debug, warn};

/// Implementation mode offered to a subject; extra questions are only asked of public
/// administrations.
#[derive(Debug, Clone, Serialize)]
pub struct ModeOption {
    pub id: ImplementationMode,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
    pub fields: &'static [InputField],
}

impl ModeOption {
    fn for_subject(info: &ImplementationModeInfo, subject: SubjectType) -> Self {
        Self {
            id: info.id,
            name: info.name,
            description: info.description,
            note: info.note,
            fields: if subject == SubjectType::Pa {
                info.fields
            } else {
                &[]
            },
        }
    }
}

/// Outcome of resolving an applicant: classification plus what it unlocks.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedOperator {
    pub subject: SubjectType,
    pub building: BuildingCategory,
    pub mapping: &'static OperatorMapping,
    /// Set when the subcategory had no row and the parent category's row was used.
    pub used_parent_mapping: bool,
    pub eligible_interventions: Vec<InterventionId>,
    pub notes: Vec<&'static RegulatoryNote>,
    pub implementation_modes: Vec<ModeOption>,
    /// Context to forward to calculations for this applicant.
    pub context: ContextData,
}

impl ResolvedOperator {
    pub fn operator_type(&self) -> OperatorType {
        self.mapping.operator_type
    }
}

fn matrix_key(subject: SubjectType, building: BuildingCategory) -> String {
    format!("{}_{}", subject.id(), building.id())
}

pub struct OperatorResolver<'a> {
    catalog: &'a RuleCatalog,
}

impl<'a> OperatorResolver<'a> {
    pub fn new(catalog: &'a RuleCatalog) -> Self {
        Self { catalog }
    }

    fn invalid(subject: SubjectType, building: BuildingCategory) -> IncentiveError {
        warn!(%subject, %building, "no operator mapping for combination");
        IncentiveError::InvalidCombination {
            subject: subject.id().to_string(),
            building: building.id().to_string(),
        }
    }

    /// Matrix row for the pair, falling back from a subcategory to its parent.
    ///
    /// Returns the row and whether the fallback was taken.
    pub fn lookup(
        &self,
        subject: SubjectType,
        building: BuildingCategory,
    ) -> Result<(&'static OperatorMapping, bool), IncentiveError> {
        if let Some(info) = self.catalog.building(building) {
            if !info.allows(subject) {
                return Err(Self::invalid(subject, building));
            }
        }

        if let Some(mapping) = self.catalog.operator_mapping(&matrix_key(subject, building)) {
            return Ok((mapping, false));
        }

        let fallback = building.parent().and_then(|parent| {
            let key = matrix_key(subject, parent);
            debug!(%subject, %building, fallback = %key, "using parent category mapping");
            self.catalog.operator_mapping(&key)
        });
        match fallback {
            Some(mapping) => Ok((mapping, true)),
            None => Err(Self::invalid(subject, building)),
        }
    }

    /// Catalogue entries open to the mapping's operator and policy.
    pub fn eligible_interventions(&self, mapping: &OperatorMapping) -> Vec<&'static InterventionSpec> {
        self.catalog
            .interventions()
            .iter()
            .filter(|spec| {
                spec.allows(mapping.operator_type)
                    && mapping.allowed_interventions.permits(spec.category)
            })
            .collect()
    }

    pub fn resolve(
        &self,
        subject: SubjectType,
        building: BuildingCategory,
    ) -> Result<ResolvedOperator, IncentiveError> {
        let (mapping, used_parent_mapping) = self.lookup(subject, building)?;

        let direct_key = matrix_key(subject, building);
        let parent_key = building.parent().map(|parent| matrix_key(subject, parent));
        let mut keys = vec![direct_key.as_str()];
        if let Some(parent_key) = parent_key.as_deref() {
            keys.push(parent_key);
        }
        let notes = self.catalog.notes_for(&keys);

        let implementation_modes = self
            .catalog
            .implementation_modes()
            .iter()
            .filter(|mode| mode.allowed_subjects.contains(&subject))
            .map(|mode| ModeOption::for_subject(mode, subject))
            .collect();

        let context = ContextData {
            subject_type: Some(subject),
            art48ter: mapping.art48ter.unwrap_or(false),
            ..ContextData::for_building(building)
        };

        Ok(ResolvedOperator {
            subject,
            building,
            mapping,
            used_parent_mapping,
            eligible_interventions: self
                .eligible_interventions(mapping)
                .into_iter()
                .map(|spec| spec.id)
                .collect(),
            notes,
            implementation_modes,
            context,
        })
    }
}
