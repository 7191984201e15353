//! Create app_users table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AppUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppUsers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AppUsers::Name).string().not_null())
                    .col(ColumnDef::new(AppUsers::Email).string().not_null())
                    .col(ColumnDef::new(AppUsers::Phone).string())
                    .col(ColumnDef::new(AppUsers::PasswordHash).string().not_null())
                    .col(ColumnDef::new(AppUsers::FcmToken).string())
                    .col(
                        ColumnDef::new(AppUsers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(AppUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppUsers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_app_users_email")
                    .table(AppUsers::Table)
                    .col(AppUsers::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // nullable, NULLs are distinct so users without a phone coexist
        manager
            .create_index(
                Index::create()
                    .name("idx_app_users_phone")
                    .table(AppUsers::Table)
                    .col(AppUsers::Phone)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AppUsers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum AppUsers {
    Table,
    Id,
    Name,
    Email,
    Phone,
    PasswordHash,
    FcmToken,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
