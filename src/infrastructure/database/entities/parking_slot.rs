//! Parking slot entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parking_slots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub lot_id: String,

    /// Unique together with lot_id
    pub slot_number: i32,

    /// Available, Occupied, Maintenance
    pub status: String,

    /// Car, Bike
    pub vehicle_type: String,

    /// Open session occupying this slot, if any
    #[sea_orm(nullable)]
    pub current_session_id: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::parking_lot::Entity",
        from = "Column::LotId",
        to = "super::parking_lot::Column::Id"
    )]
    ParkingLot,
}

impl Related<super::parking_lot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParkingLot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
