//! Ledger transitions for activation and withdrawal decisions.
//!
//! Every approval runs as a single database transaction: the status flip,
//! every wallet movement, the matching `transactions` rows and the
//! notifications commit together or not at all. The status flip is a
//! conditional update on `status = 'PENDING'`, so two admins racing on the
//! same request cannot both pass; the loser sees `Conflict` and no balance
//! changes.
//!
//! The referral-code activation that follows an approved activation is
//! deliberately outside the transaction. Its failure is reported through
//! [`TransitionOutcome::CommittedWithWarning`].

use crate::admin::{require_admin, AdminDirectory};
use crate::auth::Caller;
use crate::dto::{
    NotificationType, RequestStatus, TransactionType, ADMIN_SHARE, ADMIN_STATS_ID,
    REFERRAL_BONUS,
};
use crate::error::{ApiError, ApiResult};
use crate::records::{notification_record, now, transaction_record};
use referral_db_entity::db::activation_request::{
    self, Entity as ActivationRequest, Model as ActivationRequestModel,
};
use referral_db_entity::db::admin_stats::{self, Entity as AdminStats};
use referral_db_entity::db::notification::Entity as Notification;
use referral_db_entity::db::referral_code::{self, Entity as ReferralCode};
use referral_db_entity::db::transaction::Entity as Transaction;
use referral_db_entity::db::user::{self, Entity as User, Model as UserModel};
use referral_db_entity::db::withdrawal::{self, Entity as Withdrawal};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, TransactionTrait,
};
use tracing::{info, warn};

const DEFAULT_ACTIVATION_REJECTION: &str = "Payment could not be verified";
const DEFAULT_WITHDRAWAL_REJECTION: &str = "Withdrawal request rejected";

/// Result of a committed transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    Committed,
    /// The ledger committed but a follow-up write did not.
    CommittedWithWarning(String),
}

/// How the activation fee is divided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivationSplit {
    pub user_credit: i64,
    pub referrer_bonus: i64,
    pub admin_share: i64,
}

impl ActivationSplit {
    pub fn for_request(has_referrer: bool) -> ActivationSplit {
        if has_referrer {
            ActivationSplit {
                user_credit: 0,
                referrer_bonus: REFERRAL_BONUS,
                admin_share: ADMIN_SHARE,
            }
        } else {
            ActivationSplit {
                user_credit: REFERRAL_BONUS,
                referrer_bonus: 0,
                admin_share: ADMIN_SHARE,
            }
        }
    }

    pub fn total(&self) -> i64 {
        self.user_credit + self.referrer_bonus + self.admin_share
    }
}

pub async fn approve_activation(
    db: &DatabaseConnection,
    admins: &AdminDirectory,
    caller: &Caller,
    request_id: &str,
) -> ApiResult<TransitionOutcome> {
    require_admin(db, caller).await?;
    let request = find_pending_activation(db, request_id).await?;
    let user = match User::find_by_id(request.user_id.to_owned()).one(db).await? {
        Some(user) => user,
        None => return Err(ApiError::NotFound("User not found".to_owned())),
    };
    let admin_id = admins.admin_id(db).await?;
    let referrer_id = if request.has_referrer {
        match request.referrer_id.to_owned().or(user.referrer_id.to_owned()) {
            Some(id) => Some(id),
            None => {
                return Err(ApiError::NotFound(
                    "Referrer not recorded on request".to_owned(),
                ))
            }
        }
    } else {
        None
    };
    let split = ActivationSplit::for_request(request.has_referrer);
    let timestamp = now();

    let txn = db.begin().await?;

    let claimed = ActivationRequest::update_many()
        .col_expr(
            activation_request::Column::Status,
            Expr::value(RequestStatus::Approved.to_string()),
        )
        .col_expr(
            activation_request::Column::ApprovedBy,
            Expr::value(caller.user_id.to_owned()),
        )
        .col_expr(activation_request::Column::UpdatedAt, Expr::value(timestamp))
        .col_expr(activation_request::Column::ProcessedAt, Expr::value(timestamp))
        .filter(activation_request::Column::Id.eq(request.id.to_owned()))
        .filter(activation_request::Column::Status.eq(RequestStatus::Pending.to_string()))
        .exec(&txn)
        .await?;
    if claimed.rows_affected == 0 {
        txn.rollback().await?;
        return Err(already_processed());
    }

    let activated = User::update_many()
        .col_expr(
            user::Column::WalletBalance,
            Expr::col(user::Column::WalletBalance).add(split.user_credit),
        )
        .col_expr(user::Column::IsReferralActive, Expr::value(true))
        .col_expr(user::Column::ActivatedAt, Expr::value(timestamp))
        .col_expr(user::Column::UpdatedAt, Expr::value(timestamp))
        .filter(user::Column::Id.eq(user.id.to_owned()))
        .exec(&txn)
        .await?;
    if activated.rows_affected == 0 {
        txn.rollback().await?;
        return Err(ApiError::NotFound("User not found".to_owned()));
    }
    Transaction::insert(transaction_record(
        &user.id,
        split.user_credit,
        TransactionType::ActivationPayment,
        "Account activation".to_owned(),
        &request.id,
        timestamp,
    ))
    .exec(&txn)
    .await?;

    if let Some(referrer_id) = referrer_id.as_deref() {
        credit_referrer(&txn, referrer_id, &user, split.referrer_bonus, &request.id, timestamp)
            .await?;
    }

    credit_admin(&txn, &admin_id, &user, split.admin_share, &request.id, timestamp).await?;

    Notification::insert(notification_record(
        &user.id,
        NotificationType::ActivationApproved,
        "Account activated",
        "Your activation payment was verified. Share your referral code to start earning."
            .to_owned(),
        timestamp,
    ))
    .exec(&txn)
    .await?;

    txn.commit().await?;
    info!(
        "Activation {} approved by {}: user +{}, referrer +{}, admin +{}",
        request.id, caller.user_id, split.user_credit, split.referrer_bonus, split.admin_share
    );

    match activate_referral_code(db, &user, timestamp).await {
        Ok(()) => Ok(TransitionOutcome::Committed),
        Err(error) => {
            warn!(
                "Activation {} committed but referral code {} was not activated: {}",
                request.id, user.referral_code, error
            );
            Ok(TransitionOutcome::CommittedWithWarning(format!(
                "Referral code {} could not be activated",
                user.referral_code
            )))
        }
    }
}

pub async fn reject_activation(
    db: &DatabaseConnection,
    caller: &Caller,
    request_id: &str,
    reason: Option<&str>,
) -> ApiResult<TransitionOutcome> {
    require_admin(db, caller).await?;
    let request = find_pending_activation(db, request_id).await?;
    let reason = reason_or(reason, DEFAULT_ACTIVATION_REJECTION);
    let timestamp = now();

    let rejected = ActivationRequest::update_many()
        .col_expr(
            activation_request::Column::Status,
            Expr::value(RequestStatus::Rejected.to_string()),
        )
        .col_expr(
            activation_request::Column::RejectionReason,
            Expr::value(reason.to_owned()),
        )
        .col_expr(
            activation_request::Column::RejectedBy,
            Expr::value(caller.user_id.to_owned()),
        )
        .col_expr(activation_request::Column::UpdatedAt, Expr::value(timestamp))
        .col_expr(activation_request::Column::ProcessedAt, Expr::value(timestamp))
        .filter(activation_request::Column::Id.eq(request.id.to_owned()))
        .filter(activation_request::Column::Status.eq(RequestStatus::Pending.to_string()))
        .exec(db)
        .await?;
    if rejected.rows_affected == 0 {
        return Err(already_processed());
    }
    info!("Activation {} rejected by {}", request.id, caller.user_id);

    notify(
        db,
        &request.user_id,
        NotificationType::ActivationRejected,
        "Activation rejected",
        format!("Your activation request was rejected: {}", reason),
    )
    .await;
    Ok(TransitionOutcome::Committed)
}

pub async fn approve_withdrawal(
    db: &DatabaseConnection,
    caller: &Caller,
    withdrawal_id: &str,
    admin_note: Option<&str>,
) -> ApiResult<TransitionOutcome> {
    require_admin(db, caller).await?;
    let request = find_pending_withdrawal(db, withdrawal_id).await?;
    if User::find_by_id(request.user_id.to_owned())
        .one(db)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("User not found".to_owned()));
    }
    let note = admin_note.map(str::trim).filter(|note| !note.is_empty());
    let timestamp = now();

    let txn = db.begin().await?;

    let claimed = Withdrawal::update_many()
        .col_expr(
            withdrawal::Column::Status,
            Expr::value(RequestStatus::Approved.to_string()),
        )
        .col_expr(
            withdrawal::Column::AdminNote,
            Expr::value(note.map(str::to_owned)),
        )
        .col_expr(
            withdrawal::Column::ApprovedBy,
            Expr::value(caller.user_id.to_owned()),
        )
        .col_expr(withdrawal::Column::UpdatedAt, Expr::value(timestamp))
        .col_expr(withdrawal::Column::ProcessedAt, Expr::value(timestamp))
        .filter(withdrawal::Column::Id.eq(request.id.to_owned()))
        .filter(withdrawal::Column::Status.eq(RequestStatus::Pending.to_string()))
        .exec(&txn)
        .await?;
    if claimed.rows_affected == 0 {
        txn.rollback().await?;
        return Err(already_processed());
    }

    // balance is checked again here, the submission-time check may be stale
    let debited = User::update_many()
        .col_expr(
            user::Column::WalletBalance,
            Expr::col(user::Column::WalletBalance).sub(request.amount),
        )
        .col_expr(user::Column::UpdatedAt, Expr::value(timestamp))
        .filter(user::Column::Id.eq(request.user_id.to_owned()))
        .filter(user::Column::WalletBalance.gte(request.amount))
        .exec(&txn)
        .await?;
    if debited.rows_affected == 0 {
        txn.rollback().await?;
        return Err(ApiError::Conflict(
            "Insufficient wallet balance for this withdrawal".to_owned(),
        ));
    }

    Transaction::insert(transaction_record(
        &request.user_id,
        request.amount,
        TransactionType::Withdrawal,
        format!("Withdrawal to {}", request.upi_id),
        &request.id,
        timestamp,
    ))
    .exec(&txn)
    .await?;
    Notification::insert(notification_record(
        &request.user_id,
        NotificationType::WithdrawalApproved,
        "Withdrawal approved",
        format!(
            "Your withdrawal of ₹{} to {} has been approved.",
            request.amount, request.upi_id
        ),
        timestamp,
    ))
    .exec(&txn)
    .await?;

    txn.commit().await?;
    info!(
        "Withdrawal {} of {} approved by {}",
        request.id, request.amount, caller.user_id
    );
    Ok(TransitionOutcome::Committed)
}

pub async fn reject_withdrawal(
    db: &DatabaseConnection,
    caller: &Caller,
    withdrawal_id: &str,
    reason: Option<&str>,
) -> ApiResult<TransitionOutcome> {
    require_admin(db, caller).await?;
    let request = find_pending_withdrawal(db, withdrawal_id).await?;
    let reason = reason_or(reason, DEFAULT_WITHDRAWAL_REJECTION);
    let timestamp = now();

    let rejected = Withdrawal::update_many()
        .col_expr(
            withdrawal::Column::Status,
            Expr::value(RequestStatus::Rejected.to_string()),
        )
        .col_expr(withdrawal::Column::AdminNote, Expr::value(reason.to_owned()))
        .col_expr(
            withdrawal::Column::RejectedBy,
            Expr::value(caller.user_id.to_owned()),
        )
        .col_expr(withdrawal::Column::UpdatedAt, Expr::value(timestamp))
        .col_expr(withdrawal::Column::ProcessedAt, Expr::value(timestamp))
        .filter(withdrawal::Column::Id.eq(request.id.to_owned()))
        .filter(withdrawal::Column::Status.eq(RequestStatus::Pending.to_string()))
        .exec(db)
        .await?;
    if rejected.rows_affected == 0 {
        return Err(already_processed());
    }
    info!("Withdrawal {} rejected by {}", request.id, caller.user_id);

    notify(
        db,
        &request.user_id,
        NotificationType::WithdrawalRejected,
        "Withdrawal rejected",
        format!(
            "Your withdrawal of ₹{} was rejected: {}",
            request.amount, reason
        ),
    )
    .await;
    Ok(TransitionOutcome::Committed)
}

async fn find_pending_activation(
    db: &DatabaseConnection,
    request_id: &str,
) -> ApiResult<ActivationRequestModel> {
    let request_id = request_id.trim();
    if request_id.is_empty() {
        return Err(ApiError::InvalidInput("Request ID is required".to_owned()));
    }
    match ActivationRequest::find_by_id(request_id.to_owned())
        .one(db)
        .await?
    {
        Some(request) if request.status == RequestStatus::Pending.to_string() => Ok(request),
        Some(_) => Err(already_processed()),
        None => Err(ApiError::NotFound(
            "Activation request not found".to_owned(),
        )),
    }
}

async fn find_pending_withdrawal(
    db: &DatabaseConnection,
    withdrawal_id: &str,
) -> ApiResult<withdrawal::Model> {
    let withdrawal_id = withdrawal_id.trim();
    if withdrawal_id.is_empty() {
        return Err(ApiError::InvalidInput(
            "Withdrawal ID is required".to_owned(),
        ));
    }
    match Withdrawal::find_by_id(withdrawal_id.to_owned())
        .one(db)
        .await?
    {
        Some(request) if request.status == RequestStatus::Pending.to_string() => Ok(request),
        Some(_) => Err(already_processed()),
        None => Err(ApiError::NotFound(
            "Withdrawal request not found".to_owned(),
        )),
    }
}

async fn credit_referrer(
    txn: &DatabaseTransaction,
    referrer_id: &str,
    referred: &UserModel,
    bonus: i64,
    request_id: &str,
    timestamp: i64,
) -> ApiResult<()> {
    let credited = User::update_many()
        .col_expr(
            user::Column::WalletBalance,
            Expr::col(user::Column::WalletBalance).add(bonus),
        )
        .col_expr(
            user::Column::TotalReferrals,
            Expr::col(user::Column::TotalReferrals).add(1),
        )
        .col_expr(
            user::Column::ActiveReferrals,
            Expr::col(user::Column::ActiveReferrals).add(1),
        )
        .col_expr(
            user::Column::TotalEarnings,
            Expr::col(user::Column::TotalEarnings).add(bonus),
        )
        .col_expr(user::Column::UpdatedAt, Expr::value(timestamp))
        .filter(user::Column::Id.eq(referrer_id.to_owned()))
        .exec(txn)
        .await?;
    if credited.rows_affected == 0 {
        return Err(ApiError::NotFound("Referrer not found".to_owned()));
    }
    Transaction::insert(transaction_record(
        referrer_id,
        bonus,
        TransactionType::ReferralBonus,
        format!("Referral bonus for {}", referred.name),
        request_id,
        timestamp,
    ))
    .exec(txn)
    .await?;
    Notification::insert(notification_record(
        referrer_id,
        NotificationType::ReferralBonus,
        "Referral bonus earned",
        format!(
            "{} activated their account. ₹{} has been added to your wallet.",
            referred.name, bonus
        ),
        timestamp,
    ))
    .exec(txn)
    .await?;
    Ok(())
}

async fn credit_admin(
    txn: &DatabaseTransaction,
    admin_id: &str,
    activated: &UserModel,
    share: i64,
    request_id: &str,
    timestamp: i64,
) -> ApiResult<()> {
    let credited = User::update_many()
        .col_expr(
            user::Column::WalletBalance,
            Expr::col(user::Column::WalletBalance).add(share),
        )
        .col_expr(
            user::Column::TotalEarnings,
            Expr::col(user::Column::TotalEarnings).add(share),
        )
        .col_expr(user::Column::UpdatedAt, Expr::value(timestamp))
        .filter(user::Column::Id.eq(admin_id.to_owned()))
        .exec(txn)
        .await?;
    if credited.rows_affected == 0 {
        return Err(ApiError::NotFound("Admin user not found".to_owned()));
    }
    Transaction::insert(transaction_record(
        admin_id,
        share,
        TransactionType::PlatformFee,
        format!("Platform fee from {}", activated.name),
        request_id,
        timestamp,
    ))
    .exec(txn)
    .await?;

    let bumped = AdminStats::update_many()
        .col_expr(
            admin_stats::Column::TotalEarnings,
            Expr::col(admin_stats::Column::TotalEarnings).add(share),
        )
        .col_expr(
            admin_stats::Column::TotalActivations,
            Expr::col(admin_stats::Column::TotalActivations).add(1),
        )
        .col_expr(admin_stats::Column::UpdatedAt, Expr::value(timestamp))
        .filter(admin_stats::Column::Id.eq(ADMIN_STATS_ID))
        .exec(txn)
        .await?;
    if bumped.rows_affected == 0 {
        return Err(ApiError::Upstream("Admin stats row is missing".to_owned()));
    }
    Ok(())
}

/// Upserts the user's referral code as active.
async fn activate_referral_code<C: ConnectionTrait>(
    db: &C,
    user: &UserModel,
    timestamp: i64,
) -> Result<(), sea_orm::DbErr> {
    let updated = ReferralCode::update_many()
        .col_expr(referral_code::Column::IsActive, Expr::value(true))
        .col_expr(referral_code::Column::UpdatedAt, Expr::value(timestamp))
        .filter(referral_code::Column::Code.eq(user.referral_code.to_owned()))
        .exec(db)
        .await?;
    if updated.rows_affected == 0 {
        ReferralCode::insert(referral_code::ActiveModel {
            code: ActiveValue::Set(user.referral_code.to_owned()),
            user_id: ActiveValue::Set(user.id.to_owned()),
            is_active: ActiveValue::Set(true),
            created_at: ActiveValue::Set(timestamp),
            updated_at: ActiveValue::Set(timestamp),
        })
        .exec(db)
        .await?;
    }
    Ok(())
}

/// Writes a notification outside any transaction; failures are only logged.
pub async fn notify<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    notification_type: NotificationType,
    title: &str,
    message: String,
) {
    let record = notification_record(user_id, notification_type, title, message, now());
    if let Err(error) = Notification::insert(record).exec(db).await {
        warn!(
            "Could not write {} notification for {}: {}",
            notification_type, user_id, error
        );
    }
}

fn reason_or<'a>(reason: Option<&'a str>, default: &'a str) -> &'a str {
    match reason.map(str::trim) {
        Some(reason) if !reason.is_empty() => reason,
        _ => default,
    }
}

fn already_processed() -> ApiError {
    ApiError::Conflict("Request already processed".to_owned())
}
