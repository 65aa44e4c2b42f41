//! Migration: Add `users.city` and replace the order date index.
//!
//! Both steps are guarded by catalog probes, see [`crate::infra::evolution`].

use sea_orm_migration::prelude::*;

use crate::infra::evolution;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        evolution::evolve(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        evolution::revert(manager).await
    }
}
