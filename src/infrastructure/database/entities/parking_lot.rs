//! Parking lot entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parking_lots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    /// Short unique code, e.g. "LOT-A"
    pub code: String,

    pub total_slots: i32,

    /// Smallest currency unit per hour
    pub rate_per_hour: i64,

    /// Grace window not billed
    pub free_minutes: i64,

    #[sea_orm(nullable)]
    pub address: Option<String>,

    #[sea_orm(nullable, column_type = "Double")]
    pub latitude: Option<f64>,

    #[sea_orm(nullable, column_type = "Double")]
    pub longitude: Option<f64>,

    pub is_active: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::parking_slot::Entity")]
    ParkingSlots,
}

impl Related<super::parking_slot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParkingSlots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
