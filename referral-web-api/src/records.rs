use crate::dto::{NotificationType, TransactionType, TRANSACTION_COMPLETED};
use referral_db_entity::db::{notification, transaction};
use sea_orm::ActiveValue;
use uuid::Uuid;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn transaction_record(
    user_id: &str,
    amount: i64,
    transaction_type: TransactionType,
    description: String,
    reference_id: &str,
    timestamp: i64,
) -> transaction::ActiveModel {
    transaction::ActiveModel {
        id: ActiveValue::Set(new_id()),
        user_id: ActiveValue::Set(user_id.to_owned()),
        amount: ActiveValue::Set(amount),
        transaction_type: ActiveValue::Set(transaction_type.to_string()),
        status: ActiveValue::Set(TRANSACTION_COMPLETED.to_owned()),
        description: ActiveValue::Set(description),
        reference_id: ActiveValue::Set(Some(reference_id.to_owned())),
        created_at: ActiveValue::Set(timestamp),
    }
}

pub fn notification_record(
    user_id: &str,
    notification_type: NotificationType,
    title: &str,
    message: String,
    timestamp: i64,
) -> notification::ActiveModel {
    notification::ActiveModel {
        id: ActiveValue::Set(new_id()),
        user_id: ActiveValue::Set(user_id.to_owned()),
        notification_type: ActiveValue::Set(notification_type.to_string()),
        title: ActiveValue::Set(title.to_owned()),
        message: ActiveValue::Set(message),
        read: ActiveValue::Set(false),
        created_at: ActiveValue::Set(timestamp),
    }
}
