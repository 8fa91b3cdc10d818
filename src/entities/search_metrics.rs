use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "search_metrics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub search_term: String,
    pub result_count: i32,
    pub caller_id: Option<String>,
    pub provider: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
