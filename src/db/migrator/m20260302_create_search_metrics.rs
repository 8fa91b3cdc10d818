use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SearchMetrics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SearchMetrics::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SearchMetrics::SearchTerm).string().not_null())
                    .col(ColumnDef::new(SearchMetrics::ResultCount).integer().not_null())
                    .col(ColumnDef::new(SearchMetrics::CallerId).string().null())
                    .col(ColumnDef::new(SearchMetrics::Provider).string().not_null())
                    .col(
                        ColumnDef::new(SearchMetrics::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_search_metrics_created_at")
                    .table(SearchMetrics::Table)
                    .col(SearchMetrics::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SearchMetrics::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SearchMetrics {
    Table,
    Id,
    SearchTerm,
    ResultCount,
    CallerId,
    Provider,
    CreatedAt,
}
