//! # Reports and History Filters
//!
//! Pure aggregations behind the history page and the reports page. All of
//! them work on data already loaded by the service; nothing here talks to
//! a store.
//!
//! ```text
//! Vec<MovementRecord> ──► filter_movements(MovementFilter) ──► history table
//!                    └──► monthly_movements(year)          ──► bar chart
//! Vec<Product>        ──► stock_by_category                ──► pie chart
//!                    └──► category_values                  ──► value table
//! ```

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{MovementRecord, MovementType, Product};

// =============================================================================
// History Filter
// =============================================================================

/// Filters applied to the movement history.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MovementFilter {
    /// `None` shows both directions.
    #[serde(default)]
    pub movement_type: Option<MovementType>,

    /// Case-insensitive match on product name or performer name.
    #[serde(default)]
    pub search: String,
}

impl MovementFilter {
    pub fn matches(&self, record: &MovementRecord) -> bool {
        if let Some(kind) = self.movement_type {
            if record.movement.movement_type != kind {
                return false;
            }
        }

        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        let hit = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(&needle))
        };
        hit(&record.product_name) || hit(&record.performed_by_name)
    }
}

/// Keeps the records matching `filter`, preserving order.
pub fn filter_movements<'a>(
    records: &'a [MovementRecord],
    filter: &MovementFilter,
) -> Vec<&'a MovementRecord> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

// =============================================================================
// Reports
// =============================================================================

/// Units in stock for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryQuantity {
    pub category: String,
    pub quantity: i64,
}

/// Stock value for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryValue {
    pub category: String,
    pub products: usize,
    pub value: Money,
}

/// Inbound and outbound units for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyMovement {
    /// 1..=12
    pub month: u32,
    pub inbound: i64,
    pub outbound: i64,
}

/// Units per category, categories in alphabetical order.
pub fn stock_by_category(products: &[Product]) -> Vec<CategoryQuantity> {
    let mut totals: BTreeMap<&str, i64> = BTreeMap::new();
    for p in products {
        let total = totals.entry(p.category.as_str()).or_default();
        *total = total.saturating_add(p.quantity);
    }

    totals
        .into_iter()
        .map(|(category, quantity)| CategoryQuantity {
            category: category.to_string(),
            quantity,
        })
        .collect()
}

/// Stock value per category, highest value first.
pub fn category_values(products: &[Product]) -> Vec<CategoryValue> {
    let mut totals: BTreeMap<&str, (usize, Money)> = BTreeMap::new();
    for p in products {
        let entry = totals.entry(p.category.as_str()).or_default();
        entry.0 += 1;
        entry.1 += p.stock_value();
    }

    let mut values: Vec<CategoryValue> = totals
        .into_iter()
        .map(|(category, (products, value))| CategoryValue {
            category: category.to_string(),
            products,
            value,
        })
        .collect();
    // stable sort keeps alphabetical order on ties
    values.sort_by(|a, b| b.value.cmp(&a.value));
    values
}

/// Twelve buckets (January first) of absolute units moved in `year`.
pub fn monthly_movements(records: &[MovementRecord], year: i32) -> Vec<MonthlyMovement> {
    let mut months: Vec<MonthlyMovement> = (1..=12)
        .map(|month| MonthlyMovement {
            month,
            ..Default::default()
        })
        .collect();

    for record in records {
        let at = record.movement.created_at;
        if at.year() != year {
            continue;
        }
        let bucket = &mut months[at.month0() as usize];
        let units = record.movement.quantity_change.saturating_abs();
        let total = match record.movement.movement_type {
            MovementType::Inbound => &mut bucket.inbound,
            MovementType::Outbound => &mut bucket.outbound,
        };
        *total = total.saturating_add(units);
    }

    months
}
