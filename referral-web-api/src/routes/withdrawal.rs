use crate::auth::Caller;
use crate::dto::{ActionResponse, WithdrawalDecision, WithdrawalSubmission};
use crate::error::ApiResult;
use crate::pool::Db;
use crate::{ledger, submission};
use rocket::serde::json::Json;
use sea_orm_rocket::Connection;
use tracing::info;

#[post("/createWithdrawalRequest", data = "<body>")]
pub async fn create(
    caller: Caller,
    conn: Connection<'_, Db>,
    body: Json<WithdrawalSubmission>,
) -> ApiResult<Json<ActionResponse>> {
    let db = conn.into_inner();
    submission::create_withdrawal_request(db, &caller, body.amount, body.upi_id.as_deref())
        .await?;
    Ok(Json(ActionResponse::new(
        "Withdrawal request submitted successfully",
    )))
}

#[post("/approveWithdrawal", data = "<body>")]
pub async fn approve(
    caller: Caller,
    conn: Connection<'_, Db>,
    body: Json<WithdrawalDecision>,
) -> ApiResult<Json<ActionResponse>> {
    let db = conn.into_inner();
    let withdrawal_id = body.withdrawal_id.as_deref().unwrap_or_default();
    info!("approveWithdrawal {} by {}", withdrawal_id, caller.user_id);
    let outcome =
        ledger::approve_withdrawal(db, &caller, withdrawal_id, body.admin_note.as_deref())
            .await?;
    Ok(Json(ActionResponse::from_outcome(
        "Withdrawal approved successfully",
        outcome,
    )))
}

#[post("/rejectWithdrawal", data = "<body>")]
pub async fn reject(
    caller: Caller,
    conn: Connection<'_, Db>,
    body: Json<WithdrawalDecision>,
) -> ApiResult<Json<ActionResponse>> {
    let db = conn.into_inner();
    let withdrawal_id = body.withdrawal_id.as_deref().unwrap_or_default();
    info!("rejectWithdrawal {} by {}", withdrawal_id, caller.user_id);
    let outcome =
        ledger::reject_withdrawal(db, &caller, withdrawal_id, body.reason.as_deref()).await?;
    Ok(Json(ActionResponse::from_outcome(
        "Withdrawal request rejected",
        outcome,
    )))
}
