use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::http::Status;
use rocket::{Request, Response};
use std::collections::HashSet;

pub struct OriginHeader {
    pub allowed_domains: HashSet<String>,
}

impl OriginHeader {
    /// Builds the allowlist from a comma separated config value.
    pub fn from_list(domains: &str) -> OriginHeader {
        let allowed_domains = domains
            .split(',')
            .map(str::trim)
            .filter(|domain| !domain.is_empty())
            .map(str::to_owned)
            .collect();
        OriginHeader { allowed_domains }
    }
}

#[rocket::async_trait]
impl Fairing for OriginHeader {
    fn info(&self) -> Info {
        Info {
            name: "CORS Policy",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        if response.status() == Status::NotFound {
            return;
        }

        match request.headers().get_one("Origin") {
            None => {}
            Some(origin) => {
                if self.allowed_domains.contains(origin) {
                    response.set_header(Header::new("Access-Control-Allow-Origin", origin));
                    response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
                    response.set_header(Header::new("Access-Control-Allow-Methods", "POST, OPTIONS"));
                    response.set_header(Header::new(
                        "Access-Control-Allow-Headers",
                        "Authorization, Content-Type",
                    ));
                    response.set_header(Header::new("Vary", "Origin"));
                }
            }
        };
    }
}
