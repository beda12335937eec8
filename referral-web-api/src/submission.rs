use crate::auth::Caller;
use crate::dto::{
    NotificationType, RequestStatus, ACTIVATION_AMOUNT, MAX_WITHDRAWAL, MIN_UTR_LENGTH,
    MIN_WITHDRAWAL,
};
use crate::error::{ApiError, ApiResult};
use crate::ledger::notify;
use crate::records::{new_id, now};
use referral_db_entity::db::activation_request::{self, Entity as ActivationRequest};
use referral_db_entity::db::user::{Entity as User, Model as UserModel};
use referral_db_entity::db::withdrawal::{self, Entity as Withdrawal};
use regex::Regex;
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::OnceLock;
use tracing::{info, warn};

static UPI_PATTERN: OnceLock<Regex> = OnceLock::new();

fn upi_pattern() -> &'static Regex {
    UPI_PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z]{3,}$").expect("UPI pattern is valid")
    })
}

/// Trims and upper-cases a UTR, rejecting anything too short to be one.
pub fn normalize_utr(utr: Option<&str>) -> ApiResult<String> {
    let utr = utr.unwrap_or_default().trim().to_uppercase();
    if utr.chars().count() < MIN_UTR_LENGTH {
        return Err(ApiError::InvalidInput(format!(
            "Invalid UTR number. It must be at least {} characters",
            MIN_UTR_LENGTH
        )));
    }
    Ok(utr)
}

pub fn validate_upi_id(upi_id: Option<&str>) -> ApiResult<String> {
    let upi_id = upi_id.unwrap_or_default().trim();
    if !upi_pattern().is_match(upi_id) {
        return Err(ApiError::InvalidInput(
            "Invalid UPI ID. Use the format name@bank".to_owned(),
        ));
    }
    Ok(upi_id.to_owned())
}

pub fn validate_withdrawal_amount(amount: Option<i64>) -> ApiResult<i64> {
    match amount {
        Some(amount) if (MIN_WITHDRAWAL..=MAX_WITHDRAWAL).contains(&amount) => Ok(amount),
        Some(_) => Err(ApiError::InvalidInput(format!(
            "Withdrawal amount must be between ₹{} and ₹{}",
            MIN_WITHDRAWAL, MAX_WITHDRAWAL
        ))),
        None => Err(ApiError::InvalidInput(
            "Withdrawal amount is required".to_owned(),
        )),
    }
}

async fn load_caller(db: &DatabaseConnection, caller: &Caller) -> ApiResult<UserModel> {
    User::find_by_id(caller.user_id.to_owned())
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_owned()))
}

async fn utr_taken(db: &DatabaseConnection, utr: &str) -> ApiResult<bool> {
    let existing = ActivationRequest::find()
        .filter(activation_request::Column::UtrNumber.eq(utr.to_owned()))
        .one(db)
        .await?;
    Ok(existing.is_some())
}

fn utr_conflict() -> ApiError {
    ApiError::Conflict("This UTR number has already been used".to_owned())
}

/// Inserts the request. A concurrent submission can claim the UTR between the
/// lookup and this insert; the unique index then rejects it, reported as a conflict.
async fn store_activation_request(
    db: &DatabaseConnection,
    request: activation_request::ActiveModel,
    utr: &str,
) -> ApiResult<()> {
    match ActivationRequest::insert(request).exec(db).await {
        Ok(_) => Ok(()),
        Err(error) => {
            if utr_taken(db, utr).await? {
                warn!("UTR {} claimed concurrently: {}", utr, error);
                return Err(utr_conflict());
            }
            Err(error.into())
        }
    }
}

pub async fn submit_activation_request(
    db: &DatabaseConnection,
    caller: &Caller,
    utr_number: Option<&str>,
) -> ApiResult<String> {
    let utr = normalize_utr(utr_number)?;
    let user = load_caller(db, caller).await?;
    if user.is_referral_active {
        return Err(ApiError::InvalidInput(
            "Your account is already activated".to_owned(),
        ));
    }

    let pending = ActivationRequest::find()
        .filter(activation_request::Column::UserId.eq(user.id.to_owned()))
        .filter(activation_request::Column::Status.eq(RequestStatus::Pending.to_string()))
        .one(db)
        .await?;
    if pending.is_some() {
        return Err(ApiError::Conflict(
            "You already have a pending activation request".to_owned(),
        ));
    }

    // UTRs are unique across every request, whoever filed it and whatever its status
    if utr_taken(db, &utr).await? {
        warn!("UTR {} submitted again by {}", utr, user.id);
        return Err(utr_conflict());
    }

    let referrer_name = match user.referrer_id.as_deref() {
        Some(referrer_id) => match User::find_by_id(referrer_id.to_owned()).one(db).await {
            Ok(referrer) => referrer.map(|referrer| referrer.name),
            Err(error) => {
                warn!("Referrer lookup failed for {}: {}", referrer_id, error);
                None
            }
        },
        None => None,
    };

    let id = new_id();
    let timestamp = now();
    let request = activation_request::ActiveModel {
        id: ActiveValue::Set(id.to_owned()),
        user_id: ActiveValue::Set(user.id.to_owned()),
        user_name: ActiveValue::Set(user.name.to_owned()),
        user_email: ActiveValue::Set(user.email.to_owned()),
        utr_number: ActiveValue::Set(utr.to_owned()),
        has_referrer: ActiveValue::Set(user.referrer_id.is_some()),
        referrer_id: ActiveValue::Set(user.referrer_id.to_owned()),
        referrer_name: ActiveValue::Set(referrer_name),
        status: ActiveValue::Set(RequestStatus::Pending.to_string()),
        amount: ActiveValue::Set(ACTIVATION_AMOUNT),
        approved_by: ActiveValue::Set(None),
        rejected_by: ActiveValue::Set(None),
        rejection_reason: ActiveValue::Set(None),
        created_at: ActiveValue::Set(timestamp),
        updated_at: ActiveValue::Set(timestamp),
        processed_at: ActiveValue::Set(None),
    };
    store_activation_request(db, request, &utr).await?;
    info!("Activation request {} submitted by {}", id, user.id);

    notify(
        db,
        &user.id,
        NotificationType::ActivationSubmitted,
        "Activation request submitted",
        "We received your payment details. An admin will verify them shortly.".to_owned(),
    )
    .await;
    Ok(id)
}

pub async fn create_withdrawal_request(
    db: &DatabaseConnection,
    caller: &Caller,
    amount: Option<i64>,
    upi_id: Option<&str>,
) -> ApiResult<String> {
    let amount = validate_withdrawal_amount(amount)?;
    let upi_id = validate_upi_id(upi_id)?;
    let user = load_caller(db, caller).await?;
    if user.wallet_balance < amount {
        return Err(ApiError::InvalidInput("Insufficient balance".to_owned()));
    }

    let id = new_id();
    let timestamp = now();
    Withdrawal::insert(withdrawal::ActiveModel {
        id: ActiveValue::Set(id.to_owned()),
        user_id: ActiveValue::Set(user.id.to_owned()),
        user_name: ActiveValue::Set(user.name.to_owned()),
        amount: ActiveValue::Set(amount),
        upi_id: ActiveValue::Set(upi_id.to_owned()),
        status: ActiveValue::Set(RequestStatus::Pending.to_string()),
        admin_note: ActiveValue::Set(None),
        approved_by: ActiveValue::Set(None),
        rejected_by: ActiveValue::Set(None),
        created_at: ActiveValue::Set(timestamp),
        updated_at: ActiveValue::Set(timestamp),
        processed_at: ActiveValue::Set(None),
    })
    .exec(db)
    .await?;
    info!("Withdrawal {} of {} requested by {}", id, amount, user.id);

    notify(
        db,
        &user.id,
        NotificationType::WithdrawalSubmitted,
        "Withdrawal requested",
        format!("Your withdrawal of ₹{} to {} is awaiting review.", amount, upi_id),
    )
    .await;
    Ok(id)
}
