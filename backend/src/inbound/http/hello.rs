//! Demonstration API handlers.
//!
//! ```text
//! GET  /api/hello
//! POST /api/hello/validate {"username":"ada","phone":"13812345678"}
//! POST /api/hello/validate/form username=ada&phone=13812345678
//! GET  /api/hello/error/business?throwError=true
//! GET  /api/hello/error/runtime?throwError=true
//! GET  /api/hello/error/validation?username=ada&phone=13812345678
//! GET  /api/hello/trace
//! POST /api/hello/async?durationMs=500
//! GET  /api/hello/health
//! ```

use std::time::Duration;

use actix_web::{get, post, web};
use color_eyre::eyre::eyre;
use serde::{Deserialize, Serialize};
use tracing::field::display;
use tracing::info;

use crate::domain::validation::{Validate, Violation, Violations};
use crate::domain::{ApiResult, Envelope, ErrorCode, Failure, RequestContext, fail_if};
use crate::executor::Submission;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ValidatedForm, ValidatedJson, ValidatedQuery};

/// Version reported by the health endpoint.
pub const SERVICE_VERSION: &str = "1.0.0";

const NO_FAILURE_RAISED: &str = "no exception thrown";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MAX_TASK_DURATION_MS: u64 = 10_000;

fn default_task_duration_ms() -> u64 {
    500
}

/// User fields checked by the validation demonstrations.
///
/// Example JSON:
/// `{"username":"ada","phone":"13812345678"}`
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub phone: String,
}

impl Validate for UserRequest {
    fn validate(&self) -> Violations {
        let mut violations = Violations::new();
        violations
            .not_blank("username", &self.username, "username must not be blank")
            .mobile("phone", &self.phone, "phone format invalid");
        violations
    }
}

/// Query toggle for the failure demonstrations.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThrowToggle {
    pub throw_error: bool,
}

/// Query for the background task demonstration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsyncTaskRequest {
    #[serde(default = "default_task_duration_ms")]
    pub duration_ms: u64,
}

impl Validate for AsyncTaskRequest {
    fn validate(&self) -> Violations {
        let mut violations = Violations::new();
        if self.duration_ms > MAX_TASK_DURATION_MS {
            violations.push(Violation::new(
                "durationMs",
                format!("durationMs must not exceed {MAX_TASK_DURATION_MS}"),
            ));
        }
        violations
    }
}

/// Payload of `GET /api/hello/trace`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceReport {
    pub trace_id: Option<String>,
    pub message: String,
}

/// Payload of `GET /api/hello/health`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub trace_id: Option<String>,
}

fn now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Greet the caller, quoting the request's trace identifier.
#[get("")]
pub async fn hello(ctx: RequestContext) -> ApiResult<String> {
    let trace_id = ctx.trace_id().map(display);
    info!(trace_id, "hello requested");
    let label = ctx.trace_label().unwrap_or_default();
    Ok(Envelope::success(format!(
        "Hello! Welcome to the web backend scaffold. Current request traceId: {label}"
    )))
}

/// Validate a JSON body; violations join with `;`.
#[post("/validate")]
pub async fn validate_body(
    ctx: RequestContext,
    ValidatedJson(request): ValidatedJson<UserRequest>,
) -> ApiResult<String> {
    info!(trace_id = ctx.trace_id().map(display), ?request, "body validation passed");
    Ok(Envelope::success(format!(
        "parameter validation passed: username {}, phone {}",
        request.username, request.phone
    )))
}

/// Validate a URL-encoded form; violations join with `；`.
#[post("/validate/form")]
pub async fn validate_form(
    ctx: RequestContext,
    ValidatedForm(request): ValidatedForm<UserRequest>,
) -> ApiResult<String> {
    info!(trace_id = ctx.trace_id().map(display), ?request, "form validation passed");
    Ok(Envelope::success(format!(
        "parameter validation passed: username {}, phone {}",
        request.username, request.phone
    )))
}

/// Raise a parameter-error business failure on request.
#[get("/error/business")]
pub async fn business_error(
    ctx: RequestContext,
    toggle: web::Query<ThrowToggle>,
) -> ApiResult<&'static str> {
    info!(
        trace_id = ctx.trace_id().map(display),
        throw_error = toggle.throw_error,
        "business failure demo requested"
    );
    fail_if(toggle.throw_error, ErrorCode::ParamsError)?;
    Ok(Envelope::success(NO_FAILURE_RAISED))
}

/// Raise an unclassified failure on request.
#[get("/error/runtime")]
pub async fn runtime_error(
    ctx: RequestContext,
    toggle: web::Query<ThrowToggle>,
) -> ApiResult<&'static str> {
    info!(
        trace_id = ctx.trace_id().map(display),
        throw_error = toggle.throw_error,
        "unclassified failure demo requested"
    );
    if toggle.throw_error {
        return Err(eyre!("deliberate runtime failure for the demo endpoint").into());
    }
    Ok(Envelope::success(NO_FAILURE_RAISED))
}

/// Validate query parameters; violations join with `;`.
#[get("/error/validation")]
pub async fn validation_error(
    ctx: RequestContext,
    ValidatedQuery(request): ValidatedQuery<UserRequest>,
) -> ApiResult<&'static str> {
    info!(trace_id = ctx.trace_id().map(display), ?request, "parameter validation passed");
    Ok(Envelope::success("parameter validation passed"))
}

/// Call both downstream services in order and report the trace identifier.
#[get("/trace")]
pub async fn trace(ctx: RequestContext, state: web::Data<HttpState>) -> ApiResult<TraceReport> {
    let trace_id = ctx.trace_id().map(display);
    info!(trace_id, "trace demo started");
    state.users.call(&ctx).await?;
    state.orders.call(&ctx).await?;
    info!(trace_id, "trace demo finished");
    Ok(Envelope::success(TraceReport {
        trace_id: ctx.trace_label(),
        message: "trace demo complete; look for this traceId in the logs".to_owned(),
    }))
}

/// Submit a background task that sleeps for `durationMs`.
#[post("/async")]
pub async fn submit_task(
    ctx: RequestContext,
    state: web::Data<HttpState>,
    ValidatedQuery(request): ValidatedQuery<AsyncTaskRequest>,
) -> ApiResult<Submission> {
    let duration = Duration::from_millis(request.duration_ms);
    let task_ctx = ctx;
    let submission = state
        .executor
        .submit(&ctx, async move {
            tokio::time::sleep(duration).await;
            info!(
                trace_id = task_ctx.trace_id().map(display),
                ?duration,
                "background task finished"
            );
            Ok(())
        })
        .await
        .map_err(Failure::unclassified)?;
    info!(
        trace_id = ctx.trace_id().map(display),
        task = submission.task_name(),
        admission = ?submission.admission(),
        "background task submitted"
    );
    Ok(Envelope::success(submission))
}

/// Report liveness with a timestamp and the trace identifier.
#[get("/health")]
pub async fn health(ctx: RequestContext) -> ApiResult<HealthReport> {
    info!(trace_id = ctx.trace_id().map(display), "health check");
    Ok(Envelope::success(HealthReport {
        status: "UP",
        timestamp: now(),
        version: SERVICE_VERSION,
        trace_id: ctx.trace_label(),
    }))
}

/// Register the demonstration endpoints under `/api/hello`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use scaffold::inbound::http::hello;
///
/// let app = App::new().configure(hello::routes);
/// ```
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/hello")
            .service(hello)
            .service(validate_body)
            .service(validate_form)
            .service(business_error)
            .service(runtime_error)
            .service(validation_error)
            .service(trace)
            .service(submit_task)
            .service(health),
    );
}
