use crate::pool::ReferralConfig;
use rocket::{
    fairing::{Fairing, Info, Kind},
    http::{uri::Origin, Method},
    Data, Request,
};
use tracing::info;

pub struct MaintenanceMode;

#[rocket::async_trait]
impl Fairing for MaintenanceMode {
    fn info(&self) -> Info {
        Info {
            name: "Maintenance Mode",
            kind: Kind::Request,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        let enabled = request
            .rocket()
            .state::<ReferralConfig>()
            .map(|config| config.enable_maintenance)
            .unwrap_or(false);
        if !enabled || request.uri().path().as_str() == "/" || request.method() == Method::Options {
            return;
        }
        info!("Maintenance mode, diverting {} {}", request.method(), request.uri());
        if let Ok(uri) = Origin::parse("/maintenance_mode") {
            request.set_uri(uri);
            request.set_method(Method::Get);
        }
    }
}
