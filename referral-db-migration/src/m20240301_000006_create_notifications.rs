use referral_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240301_000006_create_notifications"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(notification::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(notification::Column::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(notification::Column::UserId).string().not_null())
                    .col(
                        ColumnDef::new(notification::Column::NotificationType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(notification::Column::Title).string().not_null())
                    .col(ColumnDef::new(notification::Column::Message).string().not_null())
                    .col(
                        ColumnDef::new(notification::Column::Read)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(notification::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(notification::Entity).to_owned())
            .await
    }
}
