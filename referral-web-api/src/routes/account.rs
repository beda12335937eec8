use crate::account;
use crate::auth::Caller;
use crate::dto::{NotificationsRead, ReadResponse, Registration, RegistrationResponse};
use crate::error::ApiResult;
use crate::pool::Db;
use rocket::serde::json::Json;
use sea_orm_rocket::Connection;

#[post("/registerUser", data = "<body>")]
pub async fn register(
    caller: Caller,
    conn: Connection<'_, Db>,
    body: Json<Registration>,
) -> ApiResult<Json<RegistrationResponse>> {
    let db = conn.into_inner();
    let referral_code = account::register_user(db, &caller, &body).await?;
    Ok(Json(RegistrationResponse {
        success: true,
        message: "Registration successful".to_owned(),
        referral_code,
    }))
}

#[post("/markNotificationsRead", data = "<body>")]
pub async fn mark_read(
    caller: Caller,
    conn: Connection<'_, Db>,
    body: Json<NotificationsRead>,
) -> ApiResult<Json<ReadResponse>> {
    let db = conn.into_inner();
    let updated = account::mark_notifications_read(db, &caller, &body.notification_ids).await?;
    Ok(Json(ReadResponse {
        success: true,
        message: format!("{} notifications marked read", updated),
        updated,
    }))
}
