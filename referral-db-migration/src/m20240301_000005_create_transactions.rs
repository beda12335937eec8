use referral_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240301_000005_create_transactions"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(transaction::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(transaction::Column::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(transaction::Column::UserId).string().not_null())
                    .col(ColumnDef::new(transaction::Column::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(transaction::Column::TransactionType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(transaction::Column::Status).string().not_null())
                    .col(
                        ColumnDef::new(transaction::Column::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(transaction::Column::ReferenceId).string())
                    .col(
                        ColumnDef::new(transaction::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(transaction::Entity).to_owned())
            .await
    }
}
