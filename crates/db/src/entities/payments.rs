//! `SeaORM` Entity for payments table.
//!
//! Insert-only. A trigger rejects UPDATE and DELETE.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PaymentModeDb;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub school_id: Uuid,
    pub student_id: Uuid,
    pub fee_structure_id: Uuid,
    #[sea_orm(unique)]
    pub receipt_no: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    pub mode: PaymentModeDb,
    pub reference: Option<String>,
    pub remarks: Option<String>,
    pub paid_on: Date,
    pub recorded_by: Uuid,
    pub recorded_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Students,
    #[sea_orm(
        belongs_to = "super::fee_structures::Entity",
        from = "Column::FeeStructureId",
        to = "super::fee_structures::Column::Id"
    )]
    FeeStructures,
    #[sea_orm(has_many = "super::payment_events::Entity")]
    PaymentEvents,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Students.def()
    }
}

impl Related<super::fee_structures::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FeeStructures.def()
    }
}

impl Related<super::payment_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
