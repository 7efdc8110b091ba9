//! # Dashboard Statistics
//!
//! The four dashboard cards and the stock badge of the product table,
//! computed from a mirror snapshot.
//!
//! ```text
//! ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐
//! │ Total        │ │ Valor em     │ │ Estoque      │ │ Sem          │
//! │ produtos     │ │ estoque      │ │ baixo        │ │ estoque      │
//! │   len()      │ │ Σ price×qty  │ │ 0 < q <= 5   │ │   q == 0     │
//! └──────────────┘ └──────────────┘ └──────────────┘ └──────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Product;

/// Aggregates shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub total_products: usize,
    pub total_value: Money,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
}

impl DashboardStats {
    /// Computes the dashboard cards.
    ///
    /// `low_stock_threshold` is inclusive: with the default of 5 a product
    /// with 5 units counts as low, one with 0 units counts only as out of
    /// stock.
    pub fn compute(products: &[Product], low_stock_threshold: i64) -> Self {
        products.iter().fold(DashboardStats::default(), |mut stats, p| {
            stats.total_products += 1;
            stats.total_value += p.stock_value();
            match StockLevel::classify(p.quantity, low_stock_threshold) {
                StockLevel::OutOfStock => stats.out_of_stock_count += 1,
                StockLevel::Low => stats.low_stock_count += 1,
                StockLevel::Normal => {}
            }
            stats
        })
    }
}

/// Stock badge of a product row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    Low,
    Normal,
}

impl StockLevel {
    pub fn classify(quantity: i64, low_stock_threshold: i64) -> Self {
        if quantity <= 0 {
            StockLevel::OutOfStock
        } else if quantity <= low_stock_threshold {
            StockLevel::Low
        } else {
            StockLevel::Normal
        }
    }
}

/// Case-insensitive match of `query` against name or category.
///
/// An empty (or blank) query keeps every product. Order is preserved.
pub fn filter_products<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return products.iter().collect();
    }

    products
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle) || p.category.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(name: &str, category: &str, price_cents: i64, quantity: i64) -> Product {
        let now = Utc::now();
        Product {
            id: format!("id-{name}"),
            name: name.to_string(),
            category: category.to_string(),
            price_cents,
            quantity,
            brand: None,
            model: None,
            serial_number: None,
            status: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn catalogue() -> Vec<Product> {
        vec![
            product("Monitor LED 24\"", "Eletrônicos", 89990, 15),
            product("Teclado Mecânico", "Informática", 34990, 3),
            product("Mouse Gamer", "Informática", 12990, 2),
            product("Webcam HD", "Eletrônicos", 19990, 8),
            product("Fone de Ouvido", "Eletrônicos", 14990, 4),
            product("Cadeira de Escritório", "Móveis", 59990, 0),
        ]
    }

    #[test]
    fn test_dashboard_stats_for_demo_catalogue() {
        let stats = DashboardStats::compute(&catalogue(), 5);
        assert_eq!(stats.total_products, 6);
        assert_eq!(stats.low_stock_count, 3);
        assert_eq!(stats.out_of_stock_count, 1);
        // 89990*15 + 34990*3 + 12990*2 + 19990*8 + 14990*4
        assert_eq!(stats.total_value.cents(), 1_349_850 + 104_970 + 25_980 + 159_920 + 59_960);
    }

    #[test]
    fn test_dashboard_stats_with_huge_values_saturate() {
        let products = vec![
            product("Servidor", "Infra", i64::MAX / 2, 3),
            product("Storage", "Infra", i64::MAX / 2, 3),
            product("Cabo", "Infra", 990, i64::MAX),
        ];
        let stats = DashboardStats::compute(&products, 5);
        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.total_value.cents(), i64::MAX);
        assert_eq!(stats.low_stock_count, 2);
    }

    #[test]
    fn test_dashboard_stats_empty() {
        assert_eq!(DashboardStats::compute(&[], 5), DashboardStats::default());
    }

    #[test]
    fn test_stock_level_boundaries() {
        assert_eq!(StockLevel::classify(0, 5), StockLevel::OutOfStock);
        assert_eq!(StockLevel::classify(1, 5), StockLevel::Low);
        assert_eq!(StockLevel::classify(5, 5), StockLevel::Low);
        assert_eq!(StockLevel::classify(6, 5), StockLevel::Normal);
    }

    #[test]
    fn test_filter_products_by_name_or_category() {
        let products = catalogue();
        let hits = filter_products(&products, "informát");
        assert_eq!(hits.len(), 2);

        let hits = filter_products(&products, "WEBCAM");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Webcam HD");

        assert_eq!(filter_products(&products, "  ").len(), 6);
        assert!(filter_products(&products, "impressora").is_empty());
    }
}
