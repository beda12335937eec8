use crate::pool::ReferralConfig;
use datadog_apm::{ErrorInfo, HttpInfo, Span, Trace};
use rocket::{
    fairing::{Fairing, Info, Kind},
    http::Status,
    Data, Request, Response,
};
use std::{
    collections::HashMap,
    time::{Duration, SystemTime},
};
use tracing::warn;

pub struct RequestTimer;

#[derive(Clone)]
struct TimerStart(Option<SystemTime>);

fn tracing_enabled(request: &Request<'_>) -> bool {
    let enabled = request
        .rocket()
        .state::<ReferralConfig>()
        .map(|config| config.enable_datadog)
        .unwrap_or(false);
    enabled && request.uri().path().as_str() != "/"
}

fn error_info(status: Status) -> Option<ErrorInfo> {
    let msg = match status.code {
        200..=299 => return None,
        401 | 403 => "Unauthorized",
        500..=599 => "Internal error",
        _ => "Bad input error",
    };
    Some(ErrorInfo {
        r#type: status.reason_lossy().to_owned(),
        msg: msg.to_owned(),
        stack: "".to_owned(),
    })
}

#[rocket::async_trait]
impl Fairing for RequestTimer {
    fn info(&self) -> Info {
        Info {
            name: "Datadog trace",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        if tracing_enabled(request) {
            request.local_cache(|| TimerStart(Some(SystemTime::now())));
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        if !tracing_enabled(request) || response.status() == Status::NotFound {
            return;
        }
        let start = match request.local_cache(|| TimerStart(None)).0 {
            Some(start) => start,
            None => return,
        };
        let client = match request.rocket().state::<datadog_apm::Client>() {
            Some(client) => client.clone(),
            None => return,
        };

        let method = request.method().as_str();
        let path = request.uri().path().as_str();
        let duration = match SystemTime::now().duration_since(start) {
            Ok(d) => d,
            Err(error) => {
                warn!("Failed calculating duration: {}", error);
                Duration::from_millis(0)
            }
        };

        let span = Span {
            id: 1,
            parent_id: None,
            name: "request".to_owned(),
            resource: format!("{} {}", method, path),
            r#type: "web".to_owned(),
            start,
            duration,
            http: Some(HttpInfo {
                url: request.uri().to_string(),
                method: method.to_owned(),
                status_code: response.status().code.to_string(),
            }),
            error: error_info(response.status()),
            sql: None,
            tags: HashMap::new(),
        };

        client.send_trace(Trace {
            id: 1,
            priority: 1,
            spans: vec![span],
        });
    }
}
