//! Per-store customization of brand-template items.
//!
//! A franchise store never edits a template row. Instead it attaches at most
//! one [`StoreOverride`] per `(kind, template item)` pair, and the merge
//! engine in [`crate::resolve`] folds the override into the template when the
//! store's view of the catalog is produced.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{OverrideId, StoreId};

/// Which template entity an override customizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "override_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKind {
    Product,
    Category,
    OptionItem,
    OptionGroup,
}

impl std::fmt::Display for OverrideKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Product => write!(f, "product"),
            Self::Category => write!(f, "category"),
            Self::OptionItem => write!(f, "option_item"),
            Self::OptionGroup => write!(f, "option_group"),
        }
    }
}

impl std::str::FromStr for OverrideKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(Self::Product),
            "category" => Ok(Self::Category),
            "option_item" => Ok(Self::OptionItem),
            "option_group" => Ok(Self::OptionGroup),
            _ => Err(format!("invalid override kind: {s}")),
        }
    }
}

/// Natural key of an override: one row per store per template item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverrideKey {
    pub store_id: StoreId,
    pub kind: OverrideKind,
    /// Id of the template row being customized (untyped: the kind selects
    /// the entity table).
    pub template_item_id: i32,
}

/// A store's customization of one brand-template item.
///
/// Every `local_*` field is an optional layer over the template value:
/// `None` means "use the template's value", including `local_price` - a
/// price of zero is a real override, only a missing value falls through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreOverride {
    pub id: OverrideId,
    pub store_id: StoreId,
    pub kind: OverrideKind,
    pub template_item_id: i32,
    pub local_price: Option<Decimal>,
    pub local_available: Option<bool>,
    /// Whether the store carries this template item at all. A template with
    /// no override row is active; the flag exists to let a store switch a
    /// template item off without touching any other field.
    pub active_in_store: bool,
    pub local_name: Option<String>,
    pub local_display_order: Option<i32>,
}

impl StoreOverride {
    /// The natural key of this override.
    #[must_use]
    pub const fn key(&self) -> OverrideKey {
        OverrideKey {
            store_id: self.store_id,
            kind: self.kind,
            template_item_id: self.template_item_id,
        }
    }
}
