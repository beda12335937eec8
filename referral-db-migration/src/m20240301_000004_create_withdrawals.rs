use referral_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240301_000004_create_withdrawals"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(withdrawal::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(withdrawal::Column::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(withdrawal::Column::UserId).string().not_null())
                    .col(ColumnDef::new(withdrawal::Column::UserName).string().not_null())
                    .col(ColumnDef::new(withdrawal::Column::Amount).big_integer().not_null())
                    .col(ColumnDef::new(withdrawal::Column::UpiId).string().not_null())
                    .col(ColumnDef::new(withdrawal::Column::Status).string().not_null())
                    .col(ColumnDef::new(withdrawal::Column::AdminNote).string())
                    .col(ColumnDef::new(withdrawal::Column::ApprovedBy).string())
                    .col(ColumnDef::new(withdrawal::Column::RejectedBy).string())
                    .col(
                        ColumnDef::new(withdrawal::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(withdrawal::Column::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(withdrawal::Column::ProcessedAt).big_integer())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(withdrawal::Entity).to_owned())
            .await
    }
}
