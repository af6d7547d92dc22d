use super::common::*;

use crate::incentives::catalog::{InterventionPolicy, OperatorMapping};
use crate::incentives::domain::{
    BuildingCategory, ImplementationMode, InterventionCategory, InterventionId, OperatorType,
    SubjectType,
};
use crate::incentives::error::IncentiveError;
use crate::incentives::resolver::OperatorResolver;

#[test]
fn subcategory_row_takes_precedence() {
    let catalog = catalog();
    let resolved = OperatorResolver::new(&catalog)
        .resolve(SubjectType::Pa, BuildingCategory::TertiarySchool)
        .expect("pa may apply on schools");

    assert_eq!(resolved.mapping.key, "pa_tertiary_school");
    assert_eq!(resolved.operator_type(), OperatorType::Pa);
    assert_eq!(resolved.mapping.art48ter, Some(true));
    assert!(!resolved.used_parent_mapping);
    assert!(resolved.context.art48ter);
    assert_eq!(
        resolved.context.building_subcategory,
        Some(BuildingCategory::TertiarySchool)
    );
    assert!(resolved
        .notes
        .iter()
        .any(|note| note.id == "public_buildings_special"));
}

#[test]
fn subcategory_without_row_falls_back_to_parent() {
    static PARENT_ONLY: [OperatorMapping; 1] = [OperatorMapping {
        key: "pa_tertiary",
        operator_type: OperatorType::Pa,
        max_incentive_rate: 0.65,
        default_rate: None,
        allowed_interventions: InterventionPolicy::AllTitles,
        requires_public_ownership: false,
        art48ter: None,
        note: None,
    }];
    let catalog = catalog().with_operator_matrix(&PARENT_ONLY);

    let (mapping, used_parent) = OperatorResolver::new(&catalog)
        .lookup(SubjectType::Pa, BuildingCategory::TertiaryHospital)
        .expect("parent row resolves");

    assert_eq!(mapping.key, "pa_tertiary");
    assert!(used_parent);
}

#[test]
fn missing_mapping_is_an_invalid_combination() {
    let catalog = catalog().with_operator_matrix(&[]);
    let err = OperatorResolver::new(&catalog)
        .resolve(SubjectType::Sme, BuildingCategory::Tertiary)
        .expect_err("no rows at all");

    assert!(matches!(
        err,
        IncentiveError::InvalidCombination { ref subject, ref building }
            if subject == "sme" && building == "tertiary"
    ));
    assert!(!err.is_input_error());
}

#[test]
fn building_rejects_subjects_it_does_not_admit() {
    let catalog = catalog();
    let err = OperatorResolver::new(&catalog)
        .resolve(SubjectType::Person, BuildingCategory::TertiaryPrison)
        .expect_err("prisons are public only");
    assert!(matches!(err, IncentiveError::InvalidCombination { .. }));
}

#[test]
fn residential_privates_only_see_title_three() {
    let catalog = catalog();
    let resolved = OperatorResolver::new(&catalog)
        .resolve(SubjectType::Person, BuildingCategory::Residential)
        .expect("person on residential resolves");

    assert_eq!(resolved.operator_type(), OperatorType::PrivateResidential);
    assert!(!resolved.eligible_interventions.is_empty());
    assert!(resolved
        .eligible_interventions
        .iter()
        .all(|id| id.category() == InterventionCategory::RenewableSources));
    assert!(resolved
        .eligible_interventions
        .contains(&InterventionId::PompaCalore));
}

#[test]
fn tertiary_smes_see_both_titles() {
    let catalog = catalog();
    let resolved = OperatorResolver::new(&catalog)
        .resolve(SubjectType::Sme, BuildingCategory::TertiaryGeneric)
        .expect("sme on generic tertiary resolves");

    assert_eq!(resolved.operator_type(), OperatorType::PrivateTertiarySme);
    assert!(resolved
        .eligible_interventions
        .contains(&InterventionId::IsolamentoOpache));
    assert!(resolved
        .eligible_interventions
        .contains(&InterventionId::Microcogenerazione));
}

#[test]
fn implementation_mode_questions_are_only_for_public_administrations() {
    let catalog = catalog();
    let resolver = OperatorResolver::new(&catalog);

    let public = resolver
        .resolve(SubjectType::Pa, BuildingCategory::Tertiary)
        .expect("pa resolves");
    let direct = public
        .implementation_modes
        .iter()
        .find(|mode| mode.id == ImplementationMode::Direct)
        .expect("direct mode offered");
    assert!(!direct.fields.is_empty());

    let private = resolver
        .resolve(SubjectType::Sme, BuildingCategory::Tertiary)
        .expect("sme resolves");
    assert!(private
        .implementation_modes
        .iter()
        .all(|mode| mode.fields.is_empty()));
}
