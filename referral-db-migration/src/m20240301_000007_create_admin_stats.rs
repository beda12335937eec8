use referral_db_entity::db::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240301_000007_create_admin_stats"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(admin_stats::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(admin_stats::Column::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(admin_stats::Column::TotalEarnings)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(admin_stats::Column::TotalActivations)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(admin_stats::Column::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // approvals only ever increment this row
        let seed = Query::insert()
            .into_table(admin_stats::Entity)
            .columns([
                admin_stats::Column::Id,
                admin_stats::Column::TotalEarnings,
                admin_stats::Column::TotalActivations,
                admin_stats::Column::UpdatedAt,
            ])
            .values_panic([
                admin_stats::SINGLETON_ID.into(),
                0i64.into(),
                0i64.into(),
                0i64.into(),
            ])
            .to_owned();
        let backend = manager.get_database_backend();
        manager
            .get_connection()
            .execute(backend.build(&seed))
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(admin_stats::Entity).to_owned())
            .await
    }
}
