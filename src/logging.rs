//! Logger setup.
//!
//! Application logs go through the `log` facade and carry structured
//! key-value fields. In release mode each record is written as a single JSON
//! object; in debug mode records are human-readable lines with the fields
//! appended as `key=value`.
//!
//! Every HTTP request is recorded by `AccessLog` as one record with its own
//! fields, at a level chosen from the response status. A handler that
//! panics is answered by `Recover` with a 500 envelope and an error record.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, StatusCode},
    Error, HttpMessage, ResponseError,
};
use chrono::{SecondsFormat, Utc};
use env_logger::{Builder, Env};
use futures::future::{ready, FutureExt, LocalBoxFuture, Ready};
use log::kv::{self, Key, Value as KvValue, VisitSource};
use log::{Level, Record};
use serde_json::{Map, Value};
use std::any::Any;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use crate::auth::Claims;
use crate::config::AppMode;
use crate::error::AppError;

/// Paths that are not access-logged.
const EXCLUDED_PATHS: &[&str] = &["/health"];

/// Installs the global logger. `RUST_LOG` overrides the mode's default level.
pub fn init(mode: AppMode) {
    let default_level = match mode {
        AppMode::Debug => "debug",
        AppMode::Release => "info",
    };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));

    match mode {
        AppMode::Release => {
            builder.format(|buf, record| writeln!(buf, "{}", json_line(record)));
        }
        AppMode::Debug => {
            builder.format(|buf, record| writeln!(buf, "{}", text_line(record)));
        }
    }

    // A second init (e.g. from tests) keeps the first logger.
    let _ = builder.try_init();
}

/// Routes panics through the logger so they end up in the same stream as
/// everything else. The worker that panicked is replaced by actix.
pub fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let thread = std::thread::current();
        log::error!(
            thread = thread.name().unwrap_or("unnamed"),
            location = location.as_str(),
            panic = panic_message(info.payload()).as_str();
            "Panic in worker"
        );
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn level_for(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::Error
    } else if status.is_client_error() {
        Level::Warn
    } else {
        Level::Info
    }
}

/// Access log middleware: one record per request with `method`, `path`,
/// `status`, `latency_ms`, `ip`, `user_agent` and, once authenticated,
/// `user_id`. 5xx responses log at error, 4xx at warn, the rest at info.
pub struct AccessLog;

impl<S, B> Transform<S, ServiceRequest> for AccessLog
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AccessLogService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessLogService { service }))
    }
}

pub struct AccessLogService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AccessLogService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if EXCLUDED_PATHS.contains(&req.path()) {
            return Box::pin(self.service.call(req));
        }

        let started = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let ip = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("-")
            .to_string();
        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-")
            .to_string();

        let fut = self.service.call(req);
        Box::pin(async move {
            let result = fut.await;
            let (status, user_id) = match &result {
                Ok(res) => (
                    res.status(),
                    res.request()
                        .extensions()
                        .get::<Claims>()
                        .map(|claims| claims.sub.clone()),
                ),
                Err(err) => (err.as_response_error().status_code(), None),
            };
            let latency_ms = started.elapsed().as_millis() as u64;

            log::log!(
                level_for(status),
                method = method.as_str(),
                path = path.as_str(),
                status = status.as_u16(),
                latency_ms = latency_ms,
                ip = ip.as_str(),
                user_agent = user_agent.as_str(),
                user_id = user_id.as_deref().unwrap_or("-");
                "HTTP request"
            );
            result
        })
    }
}

struct FieldCollector(Vec<(String, String)>);

impl<'kvs> VisitSource<'kvs> for FieldCollector {
    fn visit_pair(&mut self, key: Key<'kvs>, value: KvValue<'kvs>) -> Result<(), kv::Error> {
        self.0.push((key.to_string(), value.to_string()));
        Ok(())
    }
}

fn fields(record: &Record) -> Vec<(String, String)> {
    let mut collector = FieldCollector(Vec::new());
    let _ = record.key_values().visit(&mut collector);
    collector.0
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn json_line(record: &Record) -> Value {
    let mut line = Map::new();
    line.insert("ts".into(), Value::String(timestamp()));
    line.insert("level".into(), Value::String(record.level().as_str().to_string()));
    line.insert("target".into(), Value::String(record.target().to_string()));
    line.insert("msg".into(), Value::String(record.args().to_string()));
    for (key, value) in fields(record) {
        line.insert(key, Value::String(value));
    }
    Value::Object(line)
}

fn text_line(record: &Record) -> String {
    let mut line = format!(
        "{} {:<5} {} {}",
        timestamp(),
        record.level(),
        record.target(),
        record.args()
    );
    for (key, value) in fields(record) {
        line.push_str(&format!(" {}={}", key, value));
    }
    line
}

/// Turns a panic inside a handler into a logged 500 envelope instead of a
/// dropped connection.
pub struct Recover;

impl<S, B> Transform<S, ServiceRequest> for Recover
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RecoverService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RecoverService { service }))
    }
}

pub struct RecoverService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RecoverService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request = req.request().clone();
        let fut = self.service.call(req);

        Box::pin(async move {
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(result) => Ok(result?.map_into_left_body()),
                Err(payload) => {
                    let ip = request
                        .connection_info()
                        .realip_remote_addr()
                        .unwrap_or("-")
                        .to_string();
                    log::error!(
                        error = panic_message(payload.as_ref()).as_str(),
                        method = request.method().as_str(),
                        path = request.path(),
                        ip = ip.as_str();
                        "Panic recovered"
                    );
                    let response = AppError::Internal {
                        message: "Internal server error".into(),
                        detail: None,
                    }
                    .error_response();
                    Ok(ServiceResponse::new(request, response).map_into_right_body())
                }
            }
        })
    }
}
