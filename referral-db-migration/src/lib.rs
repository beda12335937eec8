pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_users;
mod m20240301_000002_create_referral_codes;
mod m20240301_000003_create_activation_requests;
mod m20240301_000004_create_withdrawals;
mod m20240301_000005_create_transactions;
mod m20240301_000006_create_notifications;
mod m20240301_000007_create_admin_stats;
mod m20240301_000008_create_support_tickets;
mod m20240315_000001_create_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_users::Migration),
            Box::new(m20240301_000002_create_referral_codes::Migration),
            Box::new(m20240301_000003_create_activation_requests::Migration),
            Box::new(m20240301_000004_create_withdrawals::Migration),
            Box::new(m20240301_000005_create_transactions::Migration),
            Box::new(m20240301_000006_create_notifications::Migration),
            Box::new(m20240301_000007_create_admin_stats::Migration),
            Box::new(m20240301_000008_create_support_tickets::Migration),
            Box::new(m20240315_000001_create_indexes::Migration),
        ]
    }
}
