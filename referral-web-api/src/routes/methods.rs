use crate::error::ApiError;
use rocket::request::FromParam;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Paths served by the POST handlers. Anything else is left to the 404 catcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum Endpoint {
    SubmitActivationRequest,
    ApproveActivation,
    RejectActivation,
    CreateWithdrawalRequest,
    ApproveWithdrawal,
    RejectWithdrawal,
    SubmitSupportTicket,
    SendSupportEmail,
    UpdateSupportTicket,
    RegisterUser,
    MarkNotificationsRead,
}

impl<'a> FromParam<'a> for Endpoint {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        Endpoint::from_str(param).map_err(|_| param)
    }
}

fn not_allowed(endpoint: Endpoint) -> ApiError {
    ApiError::MethodNotAllowed(format!("Method not allowed on /{}", endpoint))
}

#[get("/<endpoint>", rank = 20)]
pub fn get_not_allowed(endpoint: Endpoint) -> ApiError {
    not_allowed(endpoint)
}

#[put("/<endpoint>", rank = 20)]
pub fn put_not_allowed(endpoint: Endpoint) -> ApiError {
    not_allowed(endpoint)
}

#[patch("/<endpoint>", rank = 20)]
pub fn patch_not_allowed(endpoint: Endpoint) -> ApiError {
    not_allowed(endpoint)
}

#[delete("/<endpoint>", rank = 20)]
pub fn delete_not_allowed(endpoint: Endpoint) -> ApiError {
    not_allowed(endpoint)
}

/// CORS preflight. Headers are added by the CORS fairing.
#[options("/<_endpoint>")]
pub fn preflight(_endpoint: Endpoint) {}
