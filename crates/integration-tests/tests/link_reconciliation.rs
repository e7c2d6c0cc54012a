//! Category/option-group link reconciliation scenarios.

use std::collections::BTreeMap;

use serde_json::json;

use menuforge_core::reconcile::{ReconcileOutcome, RejectReason, plan_links};
use menuforge_core::types::{OptionGroupId, Owner};

use menuforge_integration_tests::{BRAND, FRANCHISE, INDEPENDENT};

fn ids(raw: &[i32]) -> Vec<OptionGroupId> {
    raw.iter().copied().map(OptionGroupId::new).collect()
}

#[test]
fn franchise_category_mixes_own_and_template_groups() {
    // The store admin links one of their own groups and two brand template
    // groups, and asks for a group of another store by mistake.
    let candidates: BTreeMap<OptionGroupId, Owner> = [
        (OptionGroupId::new(1), Owner::StoreOwned(FRANCHISE)),
        (OptionGroupId::new(2), Owner::BrandTemplate(BRAND)),
        (OptionGroupId::new(3), Owner::BrandTemplate(BRAND)),
        (OptionGroupId::new(4), Owner::StoreOwned(INDEPENDENT)),
    ]
    .into_iter()
    .collect();

    let plan = plan_links(
        Owner::StoreOwned(FRANCHISE),
        Some(BRAND),
        &ids(&[3]),
        &ids(&[1, 2, 3, 4]),
        &candidates,
    );

    assert_eq!(plan.to_add, ids(&[1, 2]));
    assert!(plan.to_remove.is_empty());
    assert_eq!(
        plan.rejected,
        vec![(OptionGroupId::new(4), RejectReason::IncompatibleOwnership)]
    );
}

#[test]
fn replacing_the_whole_set_removes_and_adds_in_one_plan() {
    let candidates: BTreeMap<OptionGroupId, Owner> = [
        (OptionGroupId::new(1), Owner::BrandTemplate(BRAND)),
        (OptionGroupId::new(2), Owner::BrandTemplate(BRAND)),
    ]
    .into_iter()
    .collect();

    let plan = plan_links(
        Owner::BrandTemplate(BRAND),
        None,
        &ids(&[1]),
        &ids(&[2]),
        &candidates,
    );

    assert_eq!(plan.to_add, ids(&[2]));
    assert_eq!(plan.to_remove, ids(&[1]));
    assert!(!plan.is_noop());
}

#[test]
fn rejects_never_block_the_valid_part_of_the_plan() {
    let candidates: BTreeMap<OptionGroupId, Owner> =
        [(OptionGroupId::new(1), Owner::StoreOwned(FRANCHISE))]
            .into_iter()
            .collect();

    let plan = plan_links(
        Owner::StoreOwned(FRANCHISE),
        None,
        &[],
        &ids(&[1, 99]),
        &candidates,
    );

    assert_eq!(plan.to_add, ids(&[1]));
    assert_eq!(
        plan.rejected,
        vec![(OptionGroupId::new(99), RejectReason::NotVisible)]
    );
}

#[test]
fn outcome_serializes_with_snake_case_reasons() {
    let candidates: BTreeMap<OptionGroupId, Owner> =
        [(OptionGroupId::new(2), Owner::BrandTemplate(BRAND))]
            .into_iter()
            .collect();

    let plan = plan_links(
        Owner::StoreOwned(INDEPENDENT),
        None,
        &ids(&[1]),
        &ids(&[2]),
        &candidates,
    );
    let outcome = ReconcileOutcome::from(&plan);

    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        json!({
            "linked": [],
            "unlinked": [1],
            "rejected": [
                {"option_group_id": 2, "reason": "incompatible_ownership"}
            ]
        })
    );
}
