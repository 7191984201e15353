//! Create parking_sessions table

use sea_orm_migration::prelude::*;

use super::m20240201_000001_create_parking_lots::ParkingLots;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ParkingSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParkingSessions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ParkingSessions::PlateNumber)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ParkingSessions::LotId).string().not_null())
                    .col(
                        ColumnDef::new(ParkingSessions::SlotNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ParkingSessions::UserId).string())
                    .col(
                        ColumnDef::new(ParkingSessions::EntryTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ParkingSessions::ExitTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(ParkingSessions::DurationMinutes).big_integer())
                    .col(
                        ColumnDef::new(ParkingSessions::Fare)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ParkingSessions::PaymentStatus)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(ParkingSessions::Status)
                            .string()
                            .not_null()
                            .default("IN"),
                    )
                    .col(ColumnDef::new(ParkingSessions::Active).boolean())
                    .col(
                        ColumnDef::new(ParkingSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParkingSessions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_parking_sessions_lot")
                            .from(ParkingSessions::Table, ParkingSessions::LotId)
                            .to(ParkingLots::Table, ParkingLots::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // `active` is true for IN sessions and NULL for OUT sessions.
        // NULLs are distinct in SQLite, so this unique index enforces at
        // most one open session per plate while keeping history unlimited.
        manager
            .create_index(
                Index::create()
                    .name("idx_parking_sessions_plate_active")
                    .table(ParkingSessions::Table)
                    .col(ParkingSessions::PlateNumber)
                    .col(ParkingSessions::Active)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_parking_sessions_plate")
                    .table(ParkingSessions::Table)
                    .col(ParkingSessions::PlateNumber)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_parking_sessions_lot_status")
                    .table(ParkingSessions::Table)
                    .col(ParkingSessions::LotId)
                    .col(ParkingSessions::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParkingSessions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ParkingSessions {
    Table,
    Id,
    PlateNumber,
    LotId,
    SlotNumber,
    UserId,
    EntryTime,
    ExitTime,
    DurationMinutes,
    Fare,
    PaymentStatus,
    Status,
    Active,
    CreatedAt,
    UpdatedAt,
}
