mod account;
mod admin;
mod auth;
mod cors;
mod datadog;
mod dto;
mod error;
mod ledger;
mod maintenance;
mod pool;
mod records;
mod routes;
mod submission;
mod support;
#[cfg(test)]
mod test_util;

use auth::AuthFailure;
use dto::ErrorBody;
use error::OPAQUE_ERROR;
use pool::{Db, ReferralConfig};
use rocket::{http::Status, serde::json::Json, Build, Config, Request, Rocket};
use sea_orm_rocket::Database;
use support::SupportMailer;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

#[macro_use]
extern crate rocket;

fn error_body(message: impl Into<String>) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: message.into(),
    })
}

#[get("/")]
async fn health_ping() -> &'static str {
    ""
}

#[get("/maintenance_mode")]
async fn maintenance_mode() -> (Status, Json<ErrorBody>) {
    (
        Status::ServiceUnavailable,
        error_body("Service is under maintenance"),
    )
}

#[catch(400)]
async fn bad_request() -> Json<ErrorBody> {
    error_body("Invalid request body")
}

#[catch(401)]
async fn unauthorized(req: &Request<'_>) -> Json<ErrorBody> {
    match &req.local_cache(|| AuthFailure(None)).0 {
        Some(reason) => error_body(reason.as_str()),
        None => error_body("Authentication required"),
    }
}

#[catch(404)]
async fn not_found(req: &Request<'_>) -> Json<ErrorBody> {
    error_body(format!("Couldn't find '{}'", req.uri()))
}

// Rocket answers unparseable JSON with 422; clients get the same 400 as other bad input.
#[catch(422)]
async fn unprocessable() -> (Status, Json<ErrorBody>) {
    (Status::BadRequest, error_body("Invalid request body"))
}

#[catch(500)]
async fn internal_error() -> Json<ErrorBody> {
    error_body(OPAQUE_ERROR)
}

#[catch(default)]
async fn fallback(status: Status, _: &Request<'_>) -> Json<ErrorBody> {
    error_body(status.reason_lossy())
}

fn assemble(
    config: ReferralConfig,
    reqwest_client: reqwest::Client,
    datadog_client: datadog_apm::Client,
) -> Rocket<Build> {
    let admins = admin::AdminDirectory::new(config.admin_user_id.to_owned());
    let mailer = SupportMailer {
        api_url: config.email_api_url.to_owned(),
        api_key: config.email_api_key.to_owned(),
        to: config.support_email_to.to_owned(),
        from: config.support_email_from.to_owned(),
    };
    let origin_header = cors::OriginHeader::from_list(&config.cors_allowed_domains);

    rocket::build()
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                not_found,
                unprocessable,
                internal_error,
                fallback
            ],
        )
        .attach(datadog::RequestTimer)
        .attach(maintenance::MaintenanceMode)
        .manage(config)
        .manage(admins)
        .manage(mailer)
        .manage(reqwest_client)
        .manage(datadog_client)
        .attach(origin_header)
        .attach(routes::mount())
        .mount("/", routes![health_ping, maintenance_mode])
}

#[launch]
async fn rocket() -> _ {
    let referral_config = Config::figment()
        .extract::<ReferralConfig>()
        .expect("Referral config is incomplete");
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", &referral_config.rust_log);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                format!("referral_web_api={}", &referral_config.web_api_log)
                    .parse()
                    .expect("Error parsing directive"),
            ),
        )
        .with_span_events(FmtSpan::FULL)
        .init();

    let reqwest_client = reqwest::Client::builder()
        .user_agent("Referral Web Api")
        .build()
        .expect("Reqwest client failed to initialize!");

    let datadog_client = datadog_apm::Client::new(datadog_apm::Config {
        env: Some("prod".to_owned()),
        service: "prod-referral-web-api".to_owned(),
        host: referral_config.datadog_host.to_owned(),
        port: referral_config.datadog_port.to_owned(),
        ..Default::default()
    });

    assemble(referral_config, reqwest_client, datadog_client)
        .attach(Db::init())
        .attach(admin::warm_up())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{sign_token, Claims};
    use crate::dto::Role;
    use crate::test_util::*;
    use referral_db_entity::db::withdrawal::{self, Entity as Withdrawal};
    use rocket::figment::providers::{Format, Toml};
    use rocket::figment::Figment;
    use rocket::http::{ContentType, Header};
    use rocket::local::asynchronous::Client;
    use sea_orm::{
        ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Statement,
    };

    const JWT_KEY: &str = "test-secret";

    fn config(enable_maintenance: bool) -> ReferralConfig {
        let toml = format!(
            r#"
            database_url = "sqlite::memory:"
            sqlx_max_connections = 1
            web_api_sqlx_logging_level = "info"
            rust_log = "info"
            web_api_log = "info"
            cors_allowed_domains = "https://app.example.com"
            jwt_key = "{}"
            enable_datadog = false
            datadog_host = "localhost"
            datadog_port = "8126"
            enable_maintenance = {}
            email_api_url = "http://127.0.0.1:9/send"
            email_api_key = "key"
            support_email_to = "support@example.com"
            support_email_from = "noreply@example.com"
            "#,
            JWT_KEY, enable_maintenance
        );
        Figment::from(Toml::string(&toml)).extract().unwrap()
    }

    async fn app(enable_maintenance: bool) -> (Client, DatabaseConnection) {
        let db = setup_db().await;
        let datadog_client = datadog_apm::Client::new(datadog_apm::Config {
            service: "test-referral-web-api".to_owned(),
            ..Default::default()
        });
        let rocket = assemble(
            config(enable_maintenance),
            reqwest::Client::new(),
            datadog_client,
        )
        .manage(Db::from_connection(db.clone()));
        (Client::tracked(rocket).await.unwrap(), db)
    }

    fn bearer(user_id: &str) -> Header<'static> {
        let token = sign_token(
            JWT_KEY,
            &Claims {
                sub: user_id.to_owned(),
                exp: None,
            },
        );
        Header::new("Authorization", format!("Bearer {}", token))
    }

    async fn post(
        client: &Client,
        path: &'static str,
        user_id: Option<&str>,
        body: &str,
    ) -> (Status, String) {
        let mut request = client
            .post(path)
            .header(ContentType::JSON)
            .body(body.to_owned());
        if let Some(user_id) = user_id {
            request = request.header(bearer(user_id));
        }
        let response = request.dispatch().await;
        let status = response.status();
        (status, response.into_string().await.unwrap_or_default())
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized_before_anything_else() {
        let (client, _db) = app(false).await;
        let (status, body) = post(&client, "/approveActivation", None, "{not json").await;
        assert_eq!(status, Status::Unauthorized);
        assert_eq!(body, r#"{"error":"Missing Authorization header"}"#);
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let (client, _db) = app(false).await;
        let response = client
            .post("/createWithdrawalRequest")
            .header(Header::new("Authorization", "Bearer not.a.token"))
            .header(ContentType::JSON)
            .body(r#"{"amount":100,"upiId":"ravi@okaxis"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[tokio::test]
    async fn wrong_method_on_a_known_endpoint_is_405() {
        let (client, _db) = app(false).await;
        let response = client.get("/rejectWithdrawal").dispatch().await;
        assert_eq!(response.status(), Status::MethodNotAllowed);
        assert!(response
            .into_string()
            .await
            .unwrap()
            .contains(r#""error":"Method not allowed on /rejectWithdrawal""#));
    }

    #[tokio::test]
    async fn unknown_path_is_404_json() {
        let (client, _db) = app(false).await;
        let response = client.post("/nothingHere").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        assert!(response.into_string().await.unwrap().contains("nothingHere"));
    }

    #[tokio::test]
    async fn maintenance_mode_diverts_everything_but_health() {
        let (client, _db) = app(true).await;
        let (status, _) = post(
            &client,
            "/submitActivationRequest",
            None,
            r#"{"utrNumber":"123456789012"}"#,
        )
        .await;
        assert_eq!(status, Status::ServiceUnavailable);

        let response = client.get("/").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
    }

    #[tokio::test]
    async fn activation_submission_succeeds() {
        let (client, db) = app(false).await;
        seed_user(&db, "u1", Role::User, 0, None).await;

        let (status, body) = post(
            &client,
            "/submitActivationRequest",
            Some("u1"),
            r#"{"utrNumber":"123456789012"}"#,
        )
        .await;
        assert_eq!(status, Status::Ok);
        assert_eq!(
            body,
            r#"{"success":true,"message":"Activation request submitted successfully"}"#
        );
    }

    #[tokio::test]
    async fn malformed_bodies_are_bad_requests() {
        let (client, db) = app(false).await;
        seed_user(&db, "u1", Role::User, 0, None).await;

        let (status, body) =
            post(&client, "/submitActivationRequest", Some("u1"), "{not json").await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body, r#"{"error":"Invalid request body"}"#);

        let (status, _) = post(
            &client,
            "/submitActivationRequest",
            Some("u1"),
            r#"{"utrNumber":123456789012}"#,
        )
        .await;
        assert_eq!(status, Status::BadRequest);
    }

    #[tokio::test]
    async fn approval_by_non_admin_is_forbidden() {
        let (client, db) = app(false).await;
        let user = seed_user(&db, "u1", Role::User, 0, None).await;
        let request_id = seed_activation(&db, &user, "123456789012").await;

        let body = format!(r#"{{"requestId":"{}"}}"#, request_id);
        let (status, body) = post(&client, "/approveActivation", Some("u1"), &body).await;
        assert_eq!(status, Status::Forbidden);
        assert_eq!(body, r#"{"error":"Admin access required"}"#);
        assert_eq!(load_activation(&db, &request_id).await.status, "PENDING");
    }

    #[tokio::test]
    async fn approval_of_unknown_request_is_not_found() {
        let (client, db) = app(false).await;
        seed_admin(&db).await;

        let (status, body) = post(
            &client,
            "/approveActivation",
            Some("admin"),
            r#"{"requestId":"missing"}"#,
        )
        .await;
        assert_eq!(status, Status::NotFound);
        assert_eq!(body, r#"{"error":"Activation request not found"}"#);
    }

    #[tokio::test]
    async fn referral_code_warning_reaches_the_client() {
        let (client, db) = app(false).await;
        seed_admin(&db).await;
        let user = seed_user(&db, "u1", Role::User, 0, None).await;
        let request_id = seed_activation(&db, &user, "123456789012").await;
        db.execute(Statement::from_string(
            db.get_database_backend(),
            "DROP TABLE referral_codes".to_owned(),
        ))
        .await
        .unwrap();

        let body = format!(r#"{{"requestId":"{}"}}"#, request_id);
        let (status, body) = post(&client, "/approveActivation", Some("admin"), &body).await;
        assert_eq!(status, Status::Ok);
        assert!(body.contains(r#""success":true"#));
        assert!(body.contains(r#""warning":"Referral code REFU1 could not be activated""#));
        assert_eq!(load_user(&db, "u1").await.wallet_balance, 10);
    }

    #[tokio::test]
    async fn withdrawal_is_requested_and_approved() {
        let (client, db) = app(false).await;
        seed_admin(&db).await;
        seed_user(&db, "u1", Role::User, 500, None).await;

        let (status, _) = post(
            &client,
            "/createWithdrawalRequest",
            Some("u1"),
            r#"{"amount":100,"upiId":"ravi@okaxis"}"#,
        )
        .await;
        assert_eq!(status, Status::Ok);
        let request = Withdrawal::find()
            .filter(withdrawal::Column::UserId.eq("u1"))
            .one(&db)
            .await
            .unwrap()
            .unwrap();

        let body = format!(r#"{{"withdrawalId":"{}"}}"#, request.id);
        let (status, _) = post(&client, "/approveWithdrawal", Some("admin"), &body).await;
        assert_eq!(status, Status::Ok);
        assert_eq!(load_user(&db, "u1").await.wallet_balance, 400);

        let (status, body) = post(&client, "/rejectWithdrawal", Some("admin"), &body).await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body, r#"{"error":"Request already processed"}"#);
    }

    #[tokio::test]
    async fn support_routes_store_tickets_and_hide_mail_failures() {
        let (client, _db) = app(false).await;
        let form = r#"{"userName":"Ravi","userEmail":"ravi@example.com","userPhone":"9876543210","subject":"Help","message":"Withdrawal pending"}"#;

        let (status, body) = post(&client, "/submitSupportTicket", None, form).await;
        assert_eq!(status, Status::Ok);
        assert!(body.contains(r#""ticketId":""#));

        let (status, body) = post(&client, "/sendSupportEmail", None, form).await;
        assert_eq!(status, Status::InternalServerError);
        assert_eq!(body, r#"{"error":"Internal server error"}"#);
    }

    #[tokio::test]
    async fn account_routes_register_and_validate() {
        let (client, _db) = app(false).await;
        let (status, body) = post(
            &client,
            "/registerUser",
            Some("newbie"),
            r#"{"name":"Asha","email":"asha@example.com"}"#,
        )
        .await;
        assert_eq!(status, Status::Ok);
        assert!(body.contains(r#""referralCode":""#));

        let (status, body) = post(
            &client,
            "/markNotificationsRead",
            Some("newbie"),
            r#"{"notificationIds":[]}"#,
        )
        .await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body, r#"{"error":"No notifications specified"}"#);
    }
}
