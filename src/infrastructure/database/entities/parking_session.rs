//! Parking session entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parking_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Normalized (trimmed, uppercased)
    pub plate_number: String,

    pub lot_id: String,
    pub slot_number: i32,

    /// Set when the plate belongs to a registered user
    #[sea_orm(nullable)]
    pub user_id: Option<String>,

    pub entry_time: DateTimeUtc,

    #[sea_orm(nullable)]
    pub exit_time: Option<DateTimeUtc>,

    #[sea_orm(nullable)]
    pub duration_minutes: Option<i64>,

    /// Smallest currency unit, 0 until exit
    pub fare: i64,

    /// PENDING, PAID, UNPAID, NO_USER
    pub payment_status: String,

    /// IN, OUT
    pub status: String,

    /// true while the session is IN, NULL once OUT. The unique index on
    /// (plate_number, active) is the one-active-session-per-plate
    /// constraint: SQLite treats NULLs as distinct, so closed sessions
    /// never collide.
    #[sea_orm(nullable)]
    pub active: Option<bool>,

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
