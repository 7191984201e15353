//! Create parking_lots table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ParkingLots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParkingLots::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ParkingLots::Name).string().not_null())
                    .col(ColumnDef::new(ParkingLots::Code).string().not_null())
                    .col(
                        ColumnDef::new(ParkingLots::TotalSlots)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ParkingLots::RatePerHour)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParkingLots::FreeMinutes)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ParkingLots::Address).string())
                    .col(ColumnDef::new(ParkingLots::Latitude).double())
                    .col(ColumnDef::new(ParkingLots::Longitude).double())
                    .col(
                        ColumnDef::new(ParkingLots::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ParkingLots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParkingLots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_parking_lots_code")
                    .table(ParkingLots::Table)
                    .col(ParkingLots::Code)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParkingLots::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ParkingLots {
    Table,
    Id,
    Name,
    Code,
    TotalSlots,
    RatePerHour,
    FreeMinutes,
    Address,
    Latitude,
    Longitude,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
