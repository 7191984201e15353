//! Create user_vehicles table

use sea_orm_migration::prelude::*;

use super::m20240201_000006_create_app_users::AppUsers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserVehicles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserVehicles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserVehicles::UserId).string().not_null())
                    .col(
                        ColumnDef::new(UserVehicles::PlateNumber)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserVehicles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_vehicles_user")
                            .from(UserVehicles::Table, UserVehicles::UserId)
                            .to(AppUsers::Table, AppUsers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // a plate belongs to at most one user, system-wide
        manager
            .create_index(
                Index::create()
                    .name("idx_user_vehicles_plate")
                    .table(UserVehicles::Table)
                    .col(UserVehicles::PlateNumber)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserVehicles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum UserVehicles {
    Table,
    Id,
    UserId,
    PlateNumber,
    CreatedAt,
}
