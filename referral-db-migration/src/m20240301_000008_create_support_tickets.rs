use referral_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240301_000008_create_support_tickets"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(support_ticket::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(support_ticket::Column::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(support_ticket::Column::UserId).string())
                    .col(ColumnDef::new(support_ticket::Column::UserName).string().not_null())
                    .col(ColumnDef::new(support_ticket::Column::UserEmail).string().not_null())
                    .col(ColumnDef::new(support_ticket::Column::UserPhone).string().not_null())
                    .col(ColumnDef::new(support_ticket::Column::Subject).string().not_null())
                    .col(ColumnDef::new(support_ticket::Column::Message).text().not_null())
                    .col(ColumnDef::new(support_ticket::Column::Status).string().not_null())
                    .col(ColumnDef::new(support_ticket::Column::AdminReply).text())
                    .col(
                        ColumnDef::new(support_ticket::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(support_ticket::Column::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(support_ticket::Entity).to_owned())
            .await
    }
}
