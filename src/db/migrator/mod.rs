use sea_orm_migration::prelude::*;

mod m20260301_create_discovery_cache;
mod m20260301_create_rate_limits;
mod m20260302_create_search_metrics;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_create_discovery_cache::Migration),
            Box::new(m20260301_create_rate_limits::Migration),
            Box::new(m20260302_create_search_metrics::Migration),
        ]
    }
}
