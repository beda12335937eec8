use referral_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240301_000003_create_activation_requests"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(activation_request::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(activation_request::Column::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(activation_request::Column::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(activation_request::Column::UserName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(activation_request::Column::UserEmail)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(activation_request::Column::UtrNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(activation_request::Column::HasReferrer)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(activation_request::Column::ReferrerId).string())
                    .col(ColumnDef::new(activation_request::Column::ReferrerName).string())
                    .col(
                        ColumnDef::new(activation_request::Column::Status)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(activation_request::Column::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(activation_request::Column::ApprovedBy).string())
                    .col(ColumnDef::new(activation_request::Column::RejectedBy).string())
                    .col(ColumnDef::new(activation_request::Column::RejectionReason).string())
                    .col(
                        ColumnDef::new(activation_request::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(activation_request::Column::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(activation_request::Column::ProcessedAt).big_integer())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(activation_request::Entity).to_owned())
            .await
    }
}
