//! Catalog-item ownership as a tagged variant.
//!
//! The persistence layer stores ownership as a pair of nullable columns
//! (`store_id`, `brand_id`). Exactly one must be set; this module converts
//! that pair into a closed enum at the repository boundary so the invariant
//! is checked once instead of at every query site.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::{BrandId, StoreId};

/// Who owns a catalog entity (category, product or option group).
///
/// A `StoreOwned` entity belongs to one store and has no override layer.
/// A `BrandTemplate` entity is shared by every franchise store of the brand
/// and can be customized per store through a `StoreOverride`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Owner {
    StoreOwned(StoreId),
    BrandTemplate(BrandId),
}

/// Invalid `(store_id, brand_id)` column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OwnerError {
    #[error("entity has neither store_id nor brand_id")]
    Unowned,
    #[error("entity has both store_id and brand_id")]
    DoublyOwned,
}

impl Owner {
    /// Build an owner from the two nullable database columns.
    ///
    /// # Errors
    ///
    /// Returns [`OwnerError`] when both or neither column is set.
    pub fn from_columns(
        store_id: Option<StoreId>,
        brand_id: Option<BrandId>,
    ) -> Result<Self, OwnerError> {
        match (store_id, brand_id) {
            (Some(store), None) => Ok(Self::StoreOwned(store)),
            (None, Some(brand)) => Ok(Self::BrandTemplate(brand)),
            (None, None) => Err(OwnerError::Unowned),
            (Some(_), Some(_)) => Err(OwnerError::DoublyOwned),
        }
    }

    /// The owning store, if store-owned.
    #[must_use]
    pub const fn store_id(&self) -> Option<StoreId> {
        match self {
            Self::StoreOwned(id) => Some(*id),
            Self::BrandTemplate(_) => None,
        }
    }

    /// The owning brand, if a template.
    #[must_use]
    pub const fn brand_id(&self) -> Option<BrandId> {
        match self {
            Self::StoreOwned(_) => None,
            Self::BrandTemplate(id) => Some(*id),
        }
    }

    /// Whether this entity is a brand template.
    #[must_use]
    pub const fn is_template(&self) -> bool {
        matches!(self, Self::BrandTemplate(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_column_is_required() {
        assert_eq!(
            Owner::from_columns(Some(StoreId::new(1)), None),
            Ok(Owner::StoreOwned(StoreId::new(1)))
        );
        assert_eq!(
            Owner::from_columns(None, Some(BrandId::new(2))),
            Ok(Owner::BrandTemplate(BrandId::new(2)))
        );
        assert_eq!(Owner::from_columns(None, None), Err(OwnerError::Unowned));
        assert_eq!(
            Owner::from_columns(Some(StoreId::new(1)), Some(BrandId::new(2))),
            Err(OwnerError::DoublyOwned)
        );
    }

    #[test]
    fn accessors_match_variant() {
        let store_owned = Owner::StoreOwned(StoreId::new(5));
        assert_eq!(store_owned.store_id(), Some(StoreId::new(5)));
        assert_eq!(store_owned.brand_id(), None);
        assert!(!store_owned.is_template());

        let template = Owner::BrandTemplate(BrandId::new(9));
        assert_eq!(template.store_id(), None);
        assert_eq!(template.brand_id(), Some(BrandId::new(9)));
        assert!(template.is_template());
    }
}
