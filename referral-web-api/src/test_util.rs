use crate::admin::AdminDirectory;
use crate::auth::Caller;
use crate::dto::{RequestStatus, Role, ACTIVATION_AMOUNT};
use crate::records::{new_id, now};
use referral_db_entity::db::activation_request::{self, Entity as ActivationRequest};
use referral_db_entity::db::notification::{self, Entity as Notification};
use referral_db_entity::db::transaction::{self, Entity as Transaction};
use referral_db_entity::db::user::{self, Entity as User};
use referral_db_entity::db::withdrawal::{self, Entity as Withdrawal};
use referral_db_migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};

pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    // one connection, otherwise every pooled connection gets its own empty database
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn caller(user_id: &str) -> Caller {
    Caller {
        user_id: user_id.to_owned(),
    }
}

pub fn directory() -> AdminDirectory {
    AdminDirectory::new(None)
}

pub async fn seed_user(
    db: &DatabaseConnection,
    id: &str,
    role: Role,
    balance: i64,
    referrer_id: Option<&str>,
) -> user::Model {
    let timestamp = now();
    let model = user::ActiveModel {
        id: ActiveValue::Set(id.to_owned()),
        name: ActiveValue::Set(format!("User {}", id)),
        email: ActiveValue::Set(format!("{}@example.com", id)),
        phone: ActiveValue::Set(None),
        wallet_balance: ActiveValue::Set(balance),
        is_referral_active: ActiveValue::Set(false),
        activated_at: ActiveValue::Set(None),
        referrer_id: ActiveValue::Set(referrer_id.map(str::to_owned)),
        referral_code: ActiveValue::Set(format!("REF{}", id.to_uppercase())),
        total_referrals: ActiveValue::Set(0),
        active_referrals: ActiveValue::Set(0),
        total_earnings: ActiveValue::Set(0),
        role: ActiveValue::Set(role.to_string()),
        created_at: ActiveValue::Set(timestamp),
        updated_at: ActiveValue::Set(timestamp),
    };
    User::insert(model).exec(db).await.unwrap();
    load_user(db, id).await
}

pub async fn seed_admin(db: &DatabaseConnection) -> user::Model {
    seed_user(db, "admin", Role::Admin, 0, None).await
}

pub async fn seed_activation(db: &DatabaseConnection, user: &user::Model, utr: &str) -> String {
    let id = new_id();
    let timestamp = now();
    ActivationRequest::insert(activation_request::ActiveModel {
        id: ActiveValue::Set(id.to_owned()),
        user_id: ActiveValue::Set(user.id.to_owned()),
        user_name: ActiveValue::Set(user.name.to_owned()),
        user_email: ActiveValue::Set(user.email.to_owned()),
        utr_number: ActiveValue::Set(utr.to_owned()),
        has_referrer: ActiveValue::Set(user.referrer_id.is_some()),
        referrer_id: ActiveValue::Set(user.referrer_id.to_owned()),
        referrer_name: ActiveValue::Set(None),
        status: ActiveValue::Set(RequestStatus::Pending.to_string()),
        amount: ActiveValue::Set(ACTIVATION_AMOUNT),
        approved_by: ActiveValue::Set(None),
        rejected_by: ActiveValue::Set(None),
        rejection_reason: ActiveValue::Set(None),
        created_at: ActiveValue::Set(timestamp),
        updated_at: ActiveValue::Set(timestamp),
        processed_at: ActiveValue::Set(None),
    })
    .exec(db)
    .await
    .unwrap();
    id
}

pub async fn seed_withdrawal(db: &DatabaseConnection, user_id: &str, amount: i64) -> String {
    let id = new_id();
    let timestamp = now();
    Withdrawal::insert(withdrawal::ActiveModel {
        id: ActiveValue::Set(id.to_owned()),
        user_id: ActiveValue::Set(user_id.to_owned()),
        user_name: ActiveValue::Set(format!("User {}", user_id)),
        amount: ActiveValue::Set(amount),
        upi_id: ActiveValue::Set("ravi@okaxis".to_owned()),
        status: ActiveValue::Set(RequestStatus::Pending.to_string()),
        admin_note: ActiveValue::Set(None),
        approved_by: ActiveValue::Set(None),
        rejected_by: ActiveValue::Set(None),
        created_at: ActiveValue::Set(timestamp),
        updated_at: ActiveValue::Set(timestamp),
        processed_at: ActiveValue::Set(None),
    })
    .exec(db)
    .await
    .unwrap();
    id
}

pub async fn load_user(db: &DatabaseConnection, id: &str) -> user::Model {
    User::find_by_id(id.to_owned())
        .one(db)
        .await
        .unwrap()
        .unwrap()
}

pub async fn load_activation(db: &DatabaseConnection, id: &str) -> activation_request::Model {
    ActivationRequest::find_by_id(id.to_owned())
        .one(db)
        .await
        .unwrap()
        .unwrap()
}

pub async fn transactions_of(db: &DatabaseConnection, user_id: &str) -> Vec<transaction::Model> {
    Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id.to_owned()))
        .order_by_asc(transaction::Column::CreatedAt)
        .all(db)
        .await
        .unwrap()
}

pub async fn notifications_of(
    db: &DatabaseConnection,
    user_id: &str,
) -> Vec<notification::Model> {
    Notification::find()
        .filter(notification::Column::UserId.eq(user_id.to_owned()))
        .all(db)
        .await
        .unwrap()
}
