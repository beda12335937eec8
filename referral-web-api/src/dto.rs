use crate::ledger::TransitionOutcome;
use rocket::serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

pub const ACTIVATION_AMOUNT: i64 = 20;
pub const REFERRAL_BONUS: i64 = 10;
pub const ADMIN_SHARE: i64 = 10;
pub const MIN_WITHDRAWAL: i64 = 100;
pub const MAX_WITHDRAWAL: i64 = 10_000;
pub const MIN_UTR_LENGTH: usize = 12;

pub const ADMIN_STATS_ID: &str = referral_db_entity::db::admin_stats::SINGLETON_ID;
pub const TRANSACTION_COMPLETED: &str = "COMPLETED";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    ActivationPayment,
    ReferralBonus,
    PlatformFee,
    Withdrawal,
    Credit,
    Debit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    ActivationSubmitted,
    ActivationApproved,
    ActivationRejected,
    ReferralBonus,
    WithdrawalSubmitted,
    WithdrawalApproved,
    WithdrawalRejected,
    SupportUpdate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase", default)]
pub struct ActivationSubmission {
    pub utr_number: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase", default)]
pub struct ActivationDecision {
    pub request_id: Option<String>,
    pub reason: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase", default)]
pub struct WithdrawalSubmission {
    pub amount: Option<i64>,
    pub upi_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase", default)]
pub struct WithdrawalDecision {
    pub withdrawal_id: Option<String>,
    pub admin_note: Option<String>,
    pub reason: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase", default)]
pub struct SupportForm {
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase", default)]
pub struct TicketUpdate {
    pub ticket_id: Option<String>,
    pub status: Option<String>,
    pub admin_reply: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase", default)]
pub struct Registration {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub referral_code: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase", default)]
pub struct NotificationsRead {
    pub notification_ids: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ActionResponse {
    pub fn new(message: &str) -> ActionResponse {
        ActionResponse {
            success: true,
            message: message.to_owned(),
            warning: None,
        }
    }

    pub fn from_outcome(message: &str, outcome: TransitionOutcome) -> ActionResponse {
        match outcome {
            TransitionOutcome::Committed => ActionResponse::new(message),
            TransitionOutcome::CommittedWithWarning(warning) => ActionResponse {
                success: true,
                message: message.to_owned(),
                warning: Some(warning),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct TicketResponse {
    pub success: bool,
    pub message: String,
    pub ticket_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub success: bool,
    pub message: String,
    pub referral_code: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ReadResponse {
    pub success: bool,
    pub message: String,
    pub updated: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn activation_split_adds_up_to_fee() {
        assert_eq!(REFERRAL_BONUS + ADMIN_SHARE, ACTIVATION_AMOUNT);
    }

    #[test]
    fn status_strings_match_stored_values() {
        assert_eq!(RequestStatus::Pending.to_string(), "PENDING");
        assert_eq!(TransactionType::ActivationPayment.to_string(), "ACTIVATION_PAYMENT");
        assert_eq!(TransactionType::PlatformFee.to_string(), "PLATFORM_FEE");
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(TicketStatus::from_str("IN_PROGRESS"), Ok(TicketStatus::InProgress));
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let decision: ActivationDecision = rocket::serde::json::from_str("{}").unwrap();
        assert_eq!(decision.request_id, None);
        let submission: WithdrawalSubmission =
            rocket::serde::json::from_str(r#"{"amount": 500, "upiId": "ravi@okaxis"}"#).unwrap();
        assert_eq!(submission.amount, Some(500));
        assert_eq!(submission.upi_id.as_deref(), Some("ravi@okaxis"));
    }
}
