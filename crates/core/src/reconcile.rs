//! Category/option-group link reconciliation.
//!
//! A category carries a desired set of option groups on create and update.
//! [`plan_links`] diffs that set against the currently linked one and
//! validates every addition against ownership rules. The caller applies the
//! plan in one transaction and reports the outcome; invalid candidates are
//! rejected individually and never fail the rest of the plan.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::types::{BrandId, OptionGroupId, Owner};

/// Why a desired option group was not linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The id names no option group visible to the caller.
    NotVisible,
    /// The group exists but belongs to another store or brand.
    IncompatibleOwnership,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotVisible => write!(f, "not visible"),
            Self::IncompatibleOwnership => write!(f, "incompatible ownership"),
        }
    }
}

/// The computed diff between current and desired link sets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkPlan {
    /// Validated additions, in ascending id order.
    pub to_add: Vec<OptionGroupId>,
    /// Links to drop, removed unconditionally.
    pub to_remove: Vec<OptionGroupId>,
    /// Desired ids that failed validation, with the reason each.
    pub rejected: Vec<(OptionGroupId, RejectReason)>,
}

impl LinkPlan {
    /// Whether applying this plan would change anything.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// What a reconciliation actually did, reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub linked: Vec<OptionGroupId>,
    pub unlinked: Vec<OptionGroupId>,
    pub rejected: Vec<RejectedLink>,
}

/// One rejected link candidate in a [`ReconcileOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RejectedLink {
    pub option_group_id: OptionGroupId,
    pub reason: RejectReason,
}

impl From<&LinkPlan> for ReconcileOutcome {
    fn from(plan: &LinkPlan) -> Self {
        Self {
            linked: plan.to_add.clone(),
            unlinked: plan.to_remove.clone(),
            rejected: plan
                .rejected
                .iter()
                .map(|&(option_group_id, reason)| RejectedLink {
                    option_group_id,
                    reason,
                })
                .collect(),
        }
    }
}

/// Whether `group_owner` may be linked under a category with
/// `category_owner`.
///
/// A store-owned category links its own store's groups, or templates of the
/// store's brand (`store_brand`, set when the store is a franchise). A
/// template category links only templates of the same brand.
#[must_use]
pub fn link_allowed(
    category_owner: Owner,
    store_brand: Option<BrandId>,
    group_owner: Owner,
) -> bool {
    match category_owner {
        Owner::StoreOwned(store_id) => match group_owner {
            Owner::StoreOwned(group_store) => group_store == store_id,
            Owner::BrandTemplate(group_brand) => store_brand == Some(group_brand),
        },
        Owner::BrandTemplate(brand_id) => group_owner == Owner::BrandTemplate(brand_id),
    }
}

/// Diff the current link set against the desired one.
///
/// `candidates` maps every option group id the caller could resolve to its
/// owner; a desired id absent from the map is rejected as not visible.
/// Removals are unconditional. The plan is deterministic: all three lists
/// come out in ascending id order, and duplicate desired ids collapse.
#[must_use]
pub fn plan_links(
    category_owner: Owner,
    store_brand: Option<BrandId>,
    current: &[OptionGroupId],
    desired: &[OptionGroupId],
    candidates: &BTreeMap<OptionGroupId, Owner>,
) -> LinkPlan {
    let current: BTreeSet<OptionGroupId> = current.iter().copied().collect();
    let desired: BTreeSet<OptionGroupId> = desired.iter().copied().collect();

    let to_remove = current.difference(&desired).copied().collect();

    let mut to_add = Vec::new();
    let mut rejected = Vec::new();
    for id in desired.difference(&current) {
        match candidates.get(id) {
            None => rejected.push((*id, RejectReason::NotVisible)),
            Some(&owner) if link_allowed(category_owner, store_brand, owner) => to_add.push(*id),
            Some(_) => rejected.push((*id, RejectReason::IncompatibleOwnership)),
        }
    }

    LinkPlan {
        to_add,
        to_remove,
        rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StoreId;

    const STORE: StoreId = StoreId::new(5);
    const BRAND: BrandId = BrandId::new(1);
    const OTHER_BRAND: BrandId = BrandId::new(2);

    fn ids(raw: &[i32]) -> Vec<OptionGroupId> {
        raw.iter().copied().map(OptionGroupId::new).collect()
    }

    fn candidates(entries: &[(i32, Owner)]) -> BTreeMap<OptionGroupId, Owner> {
        entries
            .iter()
            .map(|&(id, owner)| (OptionGroupId::new(id), owner))
            .collect()
    }

    #[test]
    fn matching_sets_are_a_noop() {
        let cands = candidates(&[(1, Owner::StoreOwned(STORE))]);
        let plan = plan_links(
            Owner::StoreOwned(STORE),
            None,
            &ids(&[1]),
            &ids(&[1]),
            &cands,
        );
        assert!(plan.is_noop());
        assert!(plan.rejected.is_empty());
    }

    #[test]
    fn diff_splits_into_add_and_remove() {
        let cands = candidates(&[
            (1, Owner::StoreOwned(STORE)),
            (2, Owner::StoreOwned(STORE)),
            (3, Owner::StoreOwned(STORE)),
        ]);
        let plan = plan_links(
            Owner::StoreOwned(STORE),
            None,
            &ids(&[1, 2]),
            &ids(&[2, 3]),
            &cands,
        );
        assert_eq!(plan.to_add, ids(&[3]));
        assert_eq!(plan.to_remove, ids(&[1]));
    }

    #[test]
    fn foreign_brand_template_is_rejected_and_valid_links_survive() {
        // Franchise store of BRAND tries to link a template of OTHER_BRAND.
        let cands = candidates(&[
            (1, Owner::StoreOwned(STORE)),
            (2, Owner::BrandTemplate(BRAND)),
            (3, Owner::BrandTemplate(OTHER_BRAND)),
        ]);
        let plan = plan_links(
            Owner::StoreOwned(STORE),
            Some(BRAND),
            &ids(&[1]),
            &ids(&[1, 2, 3]),
            &cands,
        );
        assert_eq!(plan.to_add, ids(&[2]));
        assert!(plan.to_remove.is_empty());
        assert_eq!(
            plan.rejected,
            vec![(OptionGroupId::new(3), RejectReason::IncompatibleOwnership)]
        );
    }

    #[test]
    fn independent_store_cannot_link_any_template() {
        let cands = candidates(&[(2, Owner::BrandTemplate(BRAND))]);
        let plan = plan_links(Owner::StoreOwned(STORE), None, &[], &ids(&[2]), &cands);
        assert!(plan.to_add.is_empty());
        assert_eq!(
            plan.rejected,
            vec![(OptionGroupId::new(2), RejectReason::IncompatibleOwnership)]
        );
    }

    #[test]
    fn template_category_links_only_same_brand_templates() {
        let cands = candidates(&[
            (1, Owner::BrandTemplate(BRAND)),
            (2, Owner::BrandTemplate(OTHER_BRAND)),
            (3, Owner::StoreOwned(STORE)),
        ]);
        let plan = plan_links(
            Owner::BrandTemplate(BRAND),
            None,
            &[],
            &ids(&[1, 2, 3]),
            &cands,
        );
        assert_eq!(plan.to_add, ids(&[1]));
        assert_eq!(plan.rejected.len(), 2);
    }

    #[test]
    fn unknown_ids_are_rejected_as_not_visible() {
        let plan = plan_links(
            Owner::StoreOwned(STORE),
            None,
            &[],
            &ids(&[9]),
            &BTreeMap::new(),
        );
        assert_eq!(
            plan.rejected,
            vec![(OptionGroupId::new(9), RejectReason::NotVisible)]
        );
    }

    #[test]
    fn duplicate_desired_ids_collapse() {
        let cands = candidates(&[(1, Owner::StoreOwned(STORE))]);
        let plan = plan_links(
            Owner::StoreOwned(STORE),
            None,
            &[],
            &ids(&[1, 1, 1]),
            &cands,
        );
        assert_eq!(plan.to_add, ids(&[1]));
    }

    #[test]
    fn outcome_reports_the_applied_plan() {
        let plan = LinkPlan {
            to_add: ids(&[2]),
            to_remove: ids(&[1]),
            rejected: vec![(OptionGroupId::new(3), RejectReason::NotVisible)],
        };
        let outcome = ReconcileOutcome::from(&plan);
        assert_eq!(outcome.linked, ids(&[2]));
        assert_eq!(outcome.unlinked, ids(&[1]));
        assert_eq!(outcome.rejected[0].option_group_id, OptionGroupId::new(3));
    }
}
