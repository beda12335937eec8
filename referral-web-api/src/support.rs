use crate::admin::require_admin;
use crate::auth::Caller;
use crate::dto::{NotificationType, SupportForm, TicketStatus};
use crate::error::{ApiError, ApiResult};
use crate::ledger::notify;
use crate::records::{new_id, now};
use referral_db_entity::db::support_ticket::{self, Entity as SupportTicket};
use rocket::serde::Serialize;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, EntityTrait};
use std::str::FromStr;
use tracing::{info, warn};

/// A support form whose fields are all present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactDetails {
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub subject: String,
    pub message: String,
}

impl ContactDetails {
    pub fn from_form(form: &SupportForm) -> ApiResult<ContactDetails> {
        let field = |value: &Option<String>| value.as_deref().unwrap_or_default().trim().to_owned();
        let details = ContactDetails {
            user_name: field(&form.user_name),
            user_email: field(&form.user_email),
            user_phone: field(&form.user_phone),
            subject: field(&form.subject),
            message: field(&form.message),
        };
        if details.user_name.is_empty()
            || details.user_email.is_empty()
            || details.user_phone.is_empty()
            || details.subject.is_empty()
            || details.message.is_empty()
        {
            return Err(ApiError::InvalidInput("All fields are required".to_owned()));
        }
        if !details.user_email.contains('@') {
            return Err(ApiError::InvalidInput("Invalid email address".to_owned()));
        }
        Ok(details)
    }
}

pub async fn submit_support_ticket(
    db: &DatabaseConnection,
    caller: Option<&Caller>,
    form: &SupportForm,
) -> ApiResult<String> {
    let details = ContactDetails::from_form(form)?;
    let id = new_id();
    let timestamp = now();
    SupportTicket::insert(support_ticket::ActiveModel {
        id: ActiveValue::Set(id.to_owned()),
        user_id: ActiveValue::Set(caller.map(|caller| caller.user_id.to_owned())),
        user_name: ActiveValue::Set(details.user_name),
        user_email: ActiveValue::Set(details.user_email),
        user_phone: ActiveValue::Set(details.user_phone),
        subject: ActiveValue::Set(details.subject),
        message: ActiveValue::Set(details.message),
        status: ActiveValue::Set(TicketStatus::Open.to_string()),
        admin_reply: ActiveValue::Set(None),
        created_at: ActiveValue::Set(timestamp),
        updated_at: ActiveValue::Set(timestamp),
    })
    .exec(db)
    .await?;
    info!("Support ticket {} opened", id);
    Ok(id)
}

pub async fn update_support_ticket(
    db: &DatabaseConnection,
    caller: &Caller,
    ticket_id: &str,
    status: Option<&str>,
    admin_reply: Option<&str>,
) -> ApiResult<TicketStatus> {
    require_admin(db, caller).await?;
    let ticket_id = ticket_id.trim();
    if ticket_id.is_empty() {
        return Err(ApiError::InvalidInput("Ticket ID is required".to_owned()));
    }
    let status = match TicketStatus::from_str(status.unwrap_or_default().trim()) {
        Ok(status) => status,
        Err(_) => {
            return Err(ApiError::InvalidInput(
                "Status must be one of OPEN, IN_PROGRESS, RESOLVED, CLOSED".to_owned(),
            ))
        }
    };
    let ticket = match SupportTicket::find_by_id(ticket_id.to_owned()).one(db).await? {
        Some(ticket) => ticket,
        None => return Err(ApiError::NotFound("Support ticket not found".to_owned())),
    };

    let user_id = ticket.user_id.to_owned();
    let subject = ticket.subject.to_owned();
    let reply = admin_reply
        .map(str::trim)
        .filter(|reply| !reply.is_empty())
        .map(str::to_owned);
    let mut active: support_ticket::ActiveModel = ticket.into();
    active.status = ActiveValue::Set(status.to_string());
    if reply.is_some() {
        active.admin_reply = ActiveValue::Set(reply.to_owned());
    }
    active.updated_at = ActiveValue::Set(now());
    active.update(db).await?;
    info!("Support ticket {} set to {} by {}", ticket_id, status, caller.user_id);

    if let Some(user_id) = user_id {
        let message = match reply {
            Some(reply) => format!("Your ticket \"{}\" is now {}: {}", subject, status, reply),
            None => format!("Your ticket \"{}\" is now {}", subject, status),
        };
        notify(
            db,
            &user_id,
            NotificationType::SupportUpdate,
            "Support ticket updated",
            message,
        )
        .await;
    }
    Ok(status)
}

/// Settings for the HTTP email provider that relays support mail.
#[derive(Clone, Debug)]
pub struct SupportMailer {
    pub api_url: String,
    pub api_key: String,
    pub to: String,
    pub from: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
}

impl SupportMailer {
    pub fn compose(&self, details: &ContactDetails) -> OutgoingEmail {
        OutgoingEmail {
            from: self.from.to_owned(),
            to: self.to.to_owned(),
            reply_to: details.user_email.to_owned(),
            subject: format!("[Support] {}", details.subject),
            text: format!(
                "Name: {}\nEmail: {}\nPhone: {}\n\n{}",
                details.user_name, details.user_email, details.user_phone, details.message
            ),
        }
    }

    pub async fn send(&self, client: &reqwest::Client, form: &SupportForm) -> ApiResult<()> {
        let details = ContactDetails::from_form(form)?;
        let email = self.compose(&details);
        let response = client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&email)
            .header("User-Agent", "Referral Web Api")
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Email provider rejected support mail: {} {}", status, body);
            return Err(ApiError::Upstream(format!(
                "Email provider returned {}",
                status
            )));
        }
        info!("Support email from {} relayed", details.user_email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::Role;
    use crate::test_util::*;

    fn form() -> SupportForm {
        SupportForm {
            user_name: Some("Ravi".to_owned()),
            user_email: Some("ravi@example.com".to_owned()),
            user_phone: Some("9876543210".to_owned()),
            subject: Some("Withdrawal pending".to_owned()),
            message: Some("My withdrawal is pending for 3 days".to_owned()),
        }
    }

    #[test]
    fn every_field_is_required() {
        assert!(ContactDetails::from_form(&form()).is_ok());
        let missing_phone = SupportForm {
            user_phone: Some("   ".to_owned()),
            ..form()
        };
        assert_eq!(
            ContactDetails::from_form(&missing_phone),
            Err(ApiError::InvalidInput("All fields are required".to_owned()))
        );
        let bad_email = SupportForm {
            user_email: Some("ravi".to_owned()),
            ..form()
        };
        assert!(ContactDetails::from_form(&bad_email).is_err());
    }

    #[test]
    fn composed_email_replies_to_the_user() {
        let mailer = SupportMailer {
            api_url: "http://localhost".to_owned(),
            api_key: "key".to_owned(),
            to: "support@example.com".to_owned(),
            from: "noreply@example.com".to_owned(),
        };
        let email = mailer.compose(&ContactDetails::from_form(&form()).unwrap());
        assert_eq!(email.reply_to, "ravi@example.com");
        assert_eq!(email.subject, "[Support] Withdrawal pending");
        assert!(email.text.contains("9876543210"));
    }

    #[tokio::test]
    async fn unreachable_provider_is_an_upstream_error() {
        let mailer = SupportMailer {
            api_url: "http://127.0.0.1:9/send".to_owned(),
            api_key: "key".to_owned(),
            to: "support@example.com".to_owned(),
            from: "noreply@example.com".to_owned(),
        };
        let client = reqwest::Client::new();
        let result = mailer.send(&client, &form()).await;
        assert!(matches!(result, Err(ApiError::Upstream(_))));
    }

    #[tokio::test]
    async fn tickets_open_and_admin_updates_notify_owner() {
        let db = setup_db().await;
        let admin = seed_admin(&db).await;
        seed_user(&db, "u1", Role::User, 0, None).await;

        let ticket_id = submit_support_ticket(&db, Some(&caller("u1")), &form())
            .await
            .unwrap();
        let ticket = SupportTicket::find_by_id(ticket_id.to_owned())
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ticket.status, "OPEN");
        assert_eq!(ticket.user_id.as_deref(), Some("u1"));

        let forbidden =
            update_support_ticket(&db, &caller("u1"), &ticket_id, Some("CLOSED"), None).await;
        assert!(matches!(forbidden, Err(ApiError::Forbidden(_))));

        let status = update_support_ticket(
            &db,
            &caller(&admin.id),
            &ticket_id,
            Some("RESOLVED"),
            Some("Paid out this morning"),
        )
        .await
        .unwrap();
        assert_eq!(status, TicketStatus::Resolved);
        let ticket = SupportTicket::find_by_id(ticket_id.to_owned())
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ticket.admin_reply.as_deref(), Some("Paid out this morning"));
        assert_eq!(notifications_of(&db, "u1").await.len(), 1);

        let bad_status =
            update_support_ticket(&db, &caller(&admin.id), &ticket_id, Some("DONE"), None).await;
        assert!(matches!(bad_status, Err(ApiError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn anonymous_tickets_are_accepted() {
        let db = setup_db().await;
        let ticket_id = submit_support_ticket(&db, None, &form()).await.unwrap();
        let ticket = SupportTicket::find_by_id(ticket_id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ticket.user_id, None);
    }
}
