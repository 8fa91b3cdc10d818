use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DiscoveryCache::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DiscoveryCache::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DiscoveryCache::SearchTerm).string().not_null())
                    .col(ColumnDef::new(DiscoveryCache::ResultsJson).text().not_null())
                    .col(
                        ColumnDef::new(DiscoveryCache::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(DiscoveryCache::ExpiresAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DiscoveryCache::HitCount)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_discovery_cache_search_term")
                    .table(DiscoveryCache::Table)
                    .col(DiscoveryCache::SearchTerm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_discovery_cache_expires_at")
                    .table(DiscoveryCache::Table)
                    .col(DiscoveryCache::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DiscoveryCache::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DiscoveryCache {
    Table,
    Id,
    SearchTerm,
    ResultsJson,
    CreatedAt,
    ExpiresAt,
    HitCount,
}
