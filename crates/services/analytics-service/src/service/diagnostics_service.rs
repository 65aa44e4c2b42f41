//! Diagnostics service - read-only sanity checks over the seeded catalog.

use std::sync::Arc;

use async_trait::async_trait;

use common::AppResult;
use domain::Diagnostics;

use crate::repository::CommerceRepository;

#[async_trait]
pub trait DiagnosticsService: Send + Sync {
    /// Collect counts, join checks, a product search and line total drift
    async fn run(&self, search_term: &str) -> AppResult<Diagnostics>;
}

pub struct DiagnosticsManager {
    repo: Arc<dyn CommerceRepository>,
}

impl DiagnosticsManager {
    pub fn new(repo: Arc<dyn CommerceRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl DiagnosticsService for DiagnosticsManager {
    async fn run(&self, search_term: &str) -> AppResult<Diagnostics> {
        let counts = self.repo.table_counts().await?;
        let orphaned_orders = self.repo.orphaned_orders().await?;
        let search_matches = self.repo.search_products(search_term).await?;
        let line_total_mismatches = self.repo.line_total_mismatches().await?;

        if orphaned_orders > 0 {
            tracing::warn!("{} orders reference missing users", orphaned_orders);
        }
        if !line_total_mismatches.is_empty() {
            tracing::info!(
                "{} orders have line totals that differ from their amount",
                line_total_mismatches.len()
            );
        }

        Ok(Diagnostics {
            counts,
            orphaned_orders,
            search_term: search_term.to_string(),
            search_matches,
            line_total_mismatches,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{LineTotalMismatch, ProductMatch, TableCounts};
    use mockall::predicate::eq;
    use rust_decimal::Decimal;

    use crate::repository::MockCommerceRepository;

    #[tokio::test]
    async fn test_run_collects_every_check() {
        let mut repo = MockCommerceRepository::new();
        repo.expect_table_counts().returning(|| {
            Ok(TableCounts {
                users: 5,
                products: 10,
                orders: 8,
                order_items: 16,
            })
        });
        repo.expect_orphaned_orders().returning(|| Ok(0));
        repo.expect_search_products()
            .with(eq("wireless"))
            .returning(|_| {
                Ok(vec![ProductMatch {
                    id: 2,
                    name: "Wireless Mouse".to_string(),
                }])
            });
        repo.expect_line_total_mismatches().returning(|| {
            Ok(vec![LineTotalMismatch {
                order_id: 2,
                amount: Decimal::new(8950, 2),
                line_total: Decimal::new(11549, 2),
            }])
        });

        let service = DiagnosticsManager::new(Arc::new(repo));
        let diagnostics = service.run("wireless").await.unwrap();

        assert_eq!(diagnostics.counts.orders, 8);
        assert_eq!(diagnostics.orphaned_orders, 0);
        assert_eq!(diagnostics.search_term, "wireless");
        assert_eq!(diagnostics.search_matches.len(), 1);
        assert_eq!(diagnostics.line_total_mismatches[0].order_id, 2);
    }
}
