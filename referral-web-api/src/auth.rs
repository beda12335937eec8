use crate::error::ApiError;
use crate::pool::ReferralConfig;
use hmac::{Hmac, Mac};
use jwt::token::verified::VerifyWithKey;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{info, warn};

/// Claims carried by tokens from the identity provider.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// The authenticated user behind a request. Role checks happen against the
/// `users` row, not the token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
}

/// Reason the last auth guard failed, picked up by the 401 catcher.
pub struct AuthFailure(pub Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Caller {
    type Error = ApiError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let jwt_key = match req.rocket().state::<ReferralConfig>() {
            Some(config) => config.jwt_key.as_str(),
            None => {
                let error = ApiError::Upstream("Referral config is not managed".to_owned());
                return Outcome::Failure((Status::InternalServerError, error));
            }
        };
        let result = match req.headers().get_one("Authorization") {
            None => Err(ApiError::Unauthenticated(
                "Missing Authorization header".to_owned(),
            )),
            Some(header) => bearer_token(header)
                .and_then(|token| verify_token(jwt_key, token, chrono::Utc::now().timestamp())),
        };
        match result {
            Ok(user_id) => Outcome::Success(Caller { user_id }),
            Err(error) => {
                req.local_cache(|| AuthFailure(Some(error.to_string())));
                Outcome::Failure((Status::Unauthorized, error))
            }
        }
    }
}

pub fn bearer_token(header: &str) -> Result<&str, ApiError> {
    match header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(ApiError::Unauthenticated(
            "Authorization header must be 'Bearer <token>'".to_owned(),
        )),
    }
}

/// Verifies an HS256 token and returns its subject.
pub fn verify_token(jwt_key: &str, token: &str, now: i64) -> Result<String, ApiError> {
    let key: Hmac<Sha256> = match Hmac::new_from_slice(jwt_key.as_bytes()) {
        Ok(key) => key,
        Err(error) => {
            warn!("Faulty JWT key: {}", error);
            return Err(ApiError::Upstream("Faulty JWT key".to_owned()));
        }
    };
    let claims: Claims = match token.verify_with_key(&key) {
        Ok(claims) => claims,
        Err(error) => {
            info!("JWT verification error: {}", error);
            return Err(ApiError::Unauthenticated("Invalid token".to_owned()));
        }
    };
    if claims.sub.trim().is_empty() {
        return Err(ApiError::Unauthenticated("Token has no subject".to_owned()));
    }
    match claims.exp {
        Some(exp) if exp <= now => {
            info!("JWT token is expired");
            Err(ApiError::Unauthenticated("Token expired".to_owned()))
        }
        _ => Ok(claims.sub),
    }
}

#[cfg(test)]
pub fn sign_token(jwt_key: &str, claims: &Claims) -> String {
    use jwt::SignWithKey;
    let key: Hmac<Sha256> = Hmac::new_from_slice(jwt_key.as_bytes()).unwrap();
    claims.sign_with_key(&key).unwrap()
}
