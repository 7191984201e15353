//! Create parking_slots table

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
                    .table(ParkingSlots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParkingSlots::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ParkingSlots::LotId).string().not_null())
                    .col(
                        ColumnDef::new(ParkingSlots::SlotNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParkingSlots::Status)
                            .string()
                            .not_null()
                            .default("Available"),
                    )
                    .col(
                        ColumnDef::new(ParkingSlots::VehicleType)
                            .string()
                            .not_null()
                            .default("Car"),
                    )
                    .col(ColumnDef::new(ParkingSlots::CurrentSessionId).string())
                    .col(
                        ColumnDef::new(ParkingSlots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParkingSlots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_parking_slots_lot")
                            .from(ParkingSlots::Table, ParkingSlots::LotId)
                            .to(ParkingLots::Table, ParkingLots::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A slot number exists once per lot
        manager
            .create_index(
                Index::create()
                    .name("idx_parking_slots_lot_number")
                    .table(ParkingSlots::Table)
                    .col(ParkingSlots::LotId)
                    .col(ParkingSlots::SlotNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Reservation scans filter on (lot, status)
        manager
            .create_index(
                Index::create()
                    .name("idx_parking_slots_lot_status")
                    .table(ParkingSlots::Table)
                    .col(ParkingSlots::LotId)
                    .col(ParkingSlots::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParkingSlots::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ParkingSlots {
    Table,
    Id,
    LotId,
    SlotNumber,
    Status,
    VehicleType,
    CurrentSessionId,
    CreatedAt,
    UpdatedAt,
}
