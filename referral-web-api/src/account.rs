use crate::auth::Caller;
use crate::dto::{Registration, Role};
use crate::error::{ApiError, ApiResult};
use crate::records::now;
use rand::distributions::Alphanumeric;
use rand::Rng;
use referral_db_entity::db::notification::{self, Entity as Notification};
use referral_db_entity::db::referral_code::{self, Entity as ReferralCode};
use referral_db_entity::db::user::{self, Entity as User};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};
use tracing::{info, warn};

const REFERRAL_CODE_LENGTH: usize = 8;
const REFERRAL_CODE_ATTEMPTS: usize = 5;

fn generate_referral_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFERRAL_CODE_LENGTH)
        .map(char::from)
        .collect::<String>()
        .to_uppercase()
}

async fn mint_referral_code(db: &DatabaseConnection) -> ApiResult<String> {
    for _ in 0..REFERRAL_CODE_ATTEMPTS {
        let code = generate_referral_code();
        let taken = ReferralCode::find_by_id(code.to_owned()).one(db).await?.is_some()
            || User::find()
                .filter(user::Column::ReferralCode.eq(code.to_owned()))
                .one(db)
                .await?
                .is_some();
        if !taken {
            return Ok(code);
        }
        warn!("Referral code collision on {}, retrying", code);
    }
    Err(ApiError::Upstream(
        "Could not mint a unique referral code".to_owned(),
    ))
}

/// Creates the caller's user row, optionally under the owner of `referral_code`.
/// Returns the newly minted referral code.
pub async fn register_user(
    db: &DatabaseConnection,
    caller: &Caller,
    registration: &Registration,
) -> ApiResult<String> {
    let name = registration.name.as_deref().unwrap_or_default().trim();
    let email = registration.email.as_deref().unwrap_or_default().trim();
    if name.is_empty() || email.is_empty() {
        return Err(ApiError::InvalidInput(
            "Name and email are required".to_owned(),
        ));
    }
    if !email.contains('@') {
        return Err(ApiError::InvalidInput("Invalid email address".to_owned()));
    }
    if User::find_by_id(caller.user_id.to_owned())
        .one(db)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("User is already registered".to_owned()));
    }

    let referrer_id = match registration
        .referral_code
        .as_deref()
        .map(|code| code.trim().to_uppercase())
        .filter(|code| !code.is_empty())
    {
        Some(code) => match ReferralCode::find_by_id(code.to_owned()).one(db).await? {
            Some(owner) => Some(owner.user_id),
            None => {
                return Err(ApiError::InvalidInput(format!(
                    "Referral code {} does not exist",
                    code
                )))
            }
        },
        None => None,
    };

    let code = mint_referral_code(db).await?;
    let timestamp = now();
    let phone = registration
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|phone| !phone.is_empty())
        .map(str::to_owned);

    let txn = db.begin().await?;
    User::insert(user::ActiveModel {
        id: ActiveValue::Set(caller.user_id.to_owned()),
        name: ActiveValue::Set(name.to_owned()),
        email: ActiveValue::Set(email.to_owned()),
        phone: ActiveValue::Set(phone),
        wallet_balance: ActiveValue::Set(0),
        is_referral_active: ActiveValue::Set(false),
        activated_at: ActiveValue::Set(None),
        referrer_id: ActiveValue::Set(referrer_id.to_owned()),
        referral_code: ActiveValue::Set(code.to_owned()),
        total_referrals: ActiveValue::Set(0),
        active_referrals: ActiveValue::Set(0),
        total_earnings: ActiveValue::Set(0),
        role: ActiveValue::Set(Role::User.to_string()),
        created_at: ActiveValue::Set(timestamp),
        updated_at: ActiveValue::Set(timestamp),
    })
    .exec(&txn)
    .await?;
    ReferralCode::insert(referral_code::ActiveModel {
        code: ActiveValue::Set(code.to_owned()),
        user_id: ActiveValue::Set(caller.user_id.to_owned()),
        is_active: ActiveValue::Set(false),
        created_at: ActiveValue::Set(timestamp),
        updated_at: ActiveValue::Set(timestamp),
    })
    .exec(&txn)
    .await?;
    txn.commit().await?;

    info!(
        "Registered {} with code {} (referrer: {:?})",
        caller.user_id, code, referrer_id
    );
    Ok(code)
}

/// Marks the given notifications read. Ids owned by other users are ignored.
pub async fn mark_notifications_read(
    db: &DatabaseConnection,
    caller: &Caller,
    notification_ids: &[String],
) -> ApiResult<u64> {
    if notification_ids.is_empty() {
        return Err(ApiError::InvalidInput(
            "No notifications specified".to_owned(),
        ));
    }
    let result = Notification::update_many()
        .col_expr(notification::Column::Read, Expr::value(true))
        .filter(notification::Column::UserId.eq(caller.user_id.to_owned()))
        .filter(notification::Column::Id.is_in(notification_ids.to_vec()))
        .filter(notification::Column::Read.eq(false))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::NotificationType;
    use crate::ledger::notify;
    use crate::test_util::*;

    fn registration(referral_code: Option<&str>) -> Registration {
        Registration {
            name: Some("Asha".to_owned()),
            email: Some("asha@example.com".to_owned()),
            phone: Some("9000000000".to_owned()),
            referral_code: referral_code.map(str::to_owned),
        }
    }

    #[test]
    fn generated_codes_are_upper_alphanumeric() {
        let code = generate_referral_code();
        assert_eq!(code.len(), REFERRAL_CODE_LENGTH);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[tokio::test]
    async fn registration_links_referrer_by_code() {
        let db = setup_db().await;
        let first = register_user(&db, &caller("u1"), &registration(None))
            .await
            .unwrap();
        let second = register_user(
            &db,
            &caller("u2"),
            &registration(Some(&first.to_lowercase())),
        )
        .await
        .unwrap();
        assert_ne!(first, second);

        let referred = load_user(&db, "u2").await;
        assert_eq!(referred.referrer_id.as_deref(), Some("u1"));
        assert_eq!(referred.referral_code, second);
        assert_eq!(referred.wallet_balance, 0);
        assert_eq!(referred.role, "user");
        let code = ReferralCode::find_by_id(second).one(&db).await.unwrap().unwrap();
        assert!(!code.is_active);
        assert_eq!(code.user_id, "u2");
    }

    #[tokio::test]
    async fn registration_rejects_unknown_code_and_repeats() {
        let db = setup_db().await;
        let unknown = register_user(&db, &caller("u1"), &registration(Some("NOPE1234"))).await;
        assert!(matches!(unknown, Err(ApiError::InvalidInput(_))));

        register_user(&db, &caller("u1"), &registration(None))
            .await
            .unwrap();
        let again = register_user(&db, &caller("u1"), &registration(None)).await;
        assert!(matches!(again, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn only_own_notifications_are_marked() {
        let db = setup_db().await;
        notify(&db, "u1", NotificationType::ReferralBonus, "t", "m".to_owned()).await;
        notify(&db, "u2", NotificationType::ReferralBonus, "t", "m".to_owned()).await;
        let mine = notifications_of(&db, "u1").await;
        let theirs = notifications_of(&db, "u2").await;
        let ids = vec![mine[0].id.to_owned(), theirs[0].id.to_owned()];

        assert_eq!(
            mark_notifications_read(&db, &caller("u1"), &ids).await,
            Ok(1)
        );
        assert!(notifications_of(&db, "u1").await[0].read);
        assert!(!notifications_of(&db, "u2").await[0].read);
        assert_eq!(
            mark_notifications_read(&db, &caller("u1"), &ids).await,
            Ok(0)
        );
    }
}
