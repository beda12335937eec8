pub mod activation_request;
pub mod admin_stats;
pub mod notification;
pub mod referral_code;
pub mod support_ticket;
pub mod transaction;
pub mod user;
pub mod withdrawal;
