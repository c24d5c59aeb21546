//! `SeaORM` Entity for class_fee_structures table.
//!
//! One row per class and academic year. `due_dates` holds a JSON array of
//! ISO dates.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "class_fee_structures")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub school_id: Uuid,
    pub class_id: Uuid,
    pub academic_year: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub tuition_fee: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub admission_fee: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub development_fee: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub transport_fee: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub library_fee: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub lab_fee: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub sports_fee: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub other_fee: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_fee: Decimal,
    #[sea_orm(column_type = "JsonBinary")]
    pub due_dates: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id"
    )]
    Classes,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Classes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
