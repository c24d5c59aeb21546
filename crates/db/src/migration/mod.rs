//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration.

pub use sea_orm_migration::prelude::*;

mod m20261001_000001_schools_and_ledger;
mod m20261001_000002_sessions;
mod m20261015_000003_classes_and_schedules;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_schools_and_ledger::Migration),
            Box::new(m20261001_000002_sessions::Migration),
            Box::new(m20261015_000003_classes_and_schedules::Migration),
        ]
    }
}
