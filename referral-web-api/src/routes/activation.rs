use crate::admin::AdminDirectory;
use crate::auth::Caller;
use crate::dto::{ActionResponse, ActivationDecision, ActivationSubmission};
use crate::error::ApiResult;
use crate::pool::Db;
use crate::{ledger, submission};
use rocket::{serde::json::Json, State};
use sea_orm_rocket::Connection;
use tracing::info;

#[post("/submitActivationRequest", data = "<body>")]
pub async fn submit(
    caller: Caller,
    conn: Connection<'_, Db>,
    body: Json<ActivationSubmission>,
) -> ApiResult<Json<ActionResponse>> {
    let db = conn.into_inner();
    submission::submit_activation_request(db, &caller, body.utr_number.as_deref()).await?;
    Ok(Json(ActionResponse::new(
        "Activation request submitted successfully",
    )))
}

#[post("/approveActivation", data = "<body>")]
pub async fn approve(
    caller: Caller,
    conn: Connection<'_, Db>,
    admins: &State<AdminDirectory>,
    body: Json<ActivationDecision>,
) -> ApiResult<Json<ActionResponse>> {
    let db = conn.into_inner();
    let request_id = body.request_id.as_deref().unwrap_or_default();
    info!("approveActivation {} by {}", request_id, caller.user_id);
    let outcome = ledger::approve_activation(db, admins, &caller, request_id).await?;
    Ok(Json(ActionResponse::from_outcome(
        "Activation approved successfully",
        outcome,
    )))
}

#[post("/rejectActivation", data = "<body>")]
pub async fn reject(
    caller: Caller,
    conn: Connection<'_, Db>,
    body: Json<ActivationDecision>,
) -> ApiResult<Json<ActionResponse>> {
    let db = conn.into_inner();
    let request_id = body.request_id.as_deref().unwrap_or_default();
    info!("rejectActivation {} by {}", request_id, caller.user_id);
    let outcome =
        ledger::reject_activation(db, &caller, request_id, body.reason.as_deref()).await?;
    Ok(Json(ActionResponse::from_outcome(
        "Activation request rejected",
        outcome,
    )))
}
