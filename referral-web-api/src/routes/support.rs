use crate::auth::Caller;
use crate::dto::{ActionResponse, SupportForm, TicketResponse, TicketUpdate};
use crate::error::ApiResult;
use crate::pool::Db;
use crate::support::{self, SupportMailer};
use rocket::{serde::json::Json, State};
use sea_orm_rocket::Connection;

#[post("/submitSupportTicket", data = "<body>")]
pub async fn submit_ticket(
    conn: Connection<'_, Db>,
    caller: Option<Caller>,
    body: Json<SupportForm>,
) -> ApiResult<Json<TicketResponse>> {
    let db = conn.into_inner();
    let ticket_id = support::submit_support_ticket(db, caller.as_ref(), &body).await?;
    Ok(Json(TicketResponse {
        success: true,
        message: "Support ticket submitted successfully".to_owned(),
        ticket_id,
    }))
}

#[post("/sendSupportEmail", data = "<body>")]
pub async fn send_email(
    mailer: &State<SupportMailer>,
    client: &State<reqwest::Client>,
    body: Json<SupportForm>,
) -> ApiResult<Json<ActionResponse>> {
    mailer.send(client, &body).await?;
    Ok(Json(ActionResponse::new("Support email sent successfully")))
}

#[post("/updateSupportTicket", data = "<body>")]
pub async fn update_ticket(
    caller: Caller,
    conn: Connection<'_, Db>,
    body: Json<TicketUpdate>,
) -> ApiResult<Json<ActionResponse>> {
    let db = conn.into_inner();
    let status = support::update_support_ticket(
        db,
        &caller,
        body.ticket_id.as_deref().unwrap_or_default(),
        body.status.as_deref(),
        body.admin_reply.as_deref(),
    )
    .await?;
    Ok(Json(ActionResponse::new(&format!(
        "Support ticket marked {}",
        status
    ))))
}
