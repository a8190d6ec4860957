//! Middleware funnelling every failed request through the dispatcher.
//!
//! Handler failures arrive as responses carrying an error and are replaced
//! by a status-200 envelope. Failures from inner middleware arrive as `Err`;
//! they stay errors but carry the same envelope as their response. Both are
//! resolved with the request's explicit context. Errors that are not a
//! [`Failure`] are treated as unclassified.

use std::task::{Context, Poll};

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::Error;
use actix_web::error::InternalError;
use color_eyre::eyre::eyre;
use futures_util::future::{LocalBoxFuture, Ready, ready};

use crate::domain::dispatch::dispatch;
use crate::domain::{Envelope, Failure, RequestContext};
use crate::inbound::http::response::envelope_response;
use crate::middleware::trace::request_context;

fn dispatch_error(err: &Error, ctx: &RequestContext) -> Envelope<()> {
    match err.as_error::<Failure>() {
        Some(failure) => dispatch(failure, ctx),
        None => {
            let status = err.as_response_error().status_code();
            dispatch(&Failure::from(eyre!("{err} (status {status})")), ctx)
        }
    }
}

/// Failure dispatch middleware. Install it inside [`Trace`](super::Trace) so
/// the request context is available.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use scaffold::{Dispatch, Trace};
///
/// let app = App::new().wrap(Dispatch).wrap(Trace);
/// ```
#[derive(Clone)]
pub struct Dispatch;

impl<S, B> Transform<S, ServiceRequest> for Dispatch
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = DispatchMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(DispatchMiddleware { service }))
    }
}

/// Service wrapper produced by [`Dispatch`].
pub struct DispatchMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for DispatchMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // No `HttpRequest` clone may outlive this call: the router needs
        // unique access to write match info.
        let ctx = request_context(req.request());
        let fut = self.service.call(req);
        Box::pin(async move {
            match fut.await {
                Ok(res) => {
                    let envelope = res.response().error().map(|err| dispatch_error(err, &ctx));
                    let Some(envelope) = envelope else {
                        return Ok(res.map_into_left_body());
                    };
                    let (req, _failed) = res.into_parts();
                    let response = envelope_response(&envelope);
                    Ok(ServiceResponse::new(req, response).map_into_right_body())
                }
                Err(err) => {
                    let response = envelope_response(&dispatch_error(&err, &ctx));
                    Err(InternalError::from_response(err, response).into())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Trace;
    use crate::domain::ErrorCode;
    use actix_web::http::StatusCode;
    use actix_web::body::to_bytes;
    use actix_web::{App, HttpResponse, test, web};
    use futures_util::future::err;
    use serde_json::Value;

    async fn business() -> Result<HttpResponse, Failure> {
        Err(Failure::business_with(40001, "duplicate username"))
    }

    async fn framework_error() -> Result<HttpResponse, Error> {
        Err(actix_web::error::ErrorBadGateway("upstream exploded"))
    }

    async fn fine() -> HttpResponse {
        HttpResponse::Ok().body("fine")
    }

    async fn call(path: &str) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .wrap(Dispatch)
                .wrap(Trace)
                .route("/business", web::get().to(business))
                .route("/framework", web::get().to(framework_error)),
        )
        .await;
        let req = test::TestRequest::get().uri(path).to_request();
        let res = test::call_service(&app, req).await;
        let status = res.status();
        let body: Value = test::read_body_json(res).await;
        (status, body)
    }

    #[actix_web::test]
    async fn business_failures_render_their_code_with_status_ok() {
        let (status, body) = call("/business").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("code").and_then(Value::as_i64), Some(40001));
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("duplicate username")
        );
        assert!(body.get("data").is_none());
    }

    #[actix_web::test]
    async fn foreign_errors_are_unclassified() {
        let (status, body) = call("/framework").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body.get("code").and_then(Value::as_i64),
            Some(i64::from(ErrorCode::ServerError.code()))
        );
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("internal server error")
        );
    }

    async fn echo(path: web::Path<(String, u32)>) -> HttpResponse {
        let (name, id) = path.into_inner();
        HttpResponse::Ok().body(format!("{name}:{id}"))
    }

    #[actix_web::test]
    async fn routed_scopes_with_path_segments_reach_handlers() {
        let app = test::init_service(
            App::new().wrap(Dispatch).wrap(Trace).service(
                web::scope("/api")
                    .route("/items/{name}/{id}", web::get().to(echo))
                    .route("/business", web::get().to(business)),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/items/widget/7").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body.as_ref(), b"widget:7");

        let req = test::TestRequest::get().uri("/api/business").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.get("code").and_then(Value::as_i64), Some(40001));
    }

    #[actix_web::test]
    async fn middleware_errors_carry_the_envelope() {
        let app = test::init_service(
            App::new()
                .wrap_fn(|_req, _srv| {
                    err::<ServiceResponse, Error>(Failure::business(ErrorCode::Forbidden).into())
                })
                .wrap(Dispatch)
                .route("/", web::get().to(fine)),
        )
        .await;
        let req = test::TestRequest::get().uri("/").to_request();
        let Err(error) = test::try_call_service(&app, req).await else {
            panic!("inner middleware error should propagate");
        };

        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body()).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body.get("code").and_then(Value::as_i64), Some(40300));
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("access forbidden")
        );
    }

    #[actix_web::test]
    async fn successful_responses_pass_through() {
        let app = test::init_service(
            App::new()
                .wrap(Dispatch)
                .route("/", web::get().to(fine)),
        )
        .await;
        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body.as_ref(), b"fine");
    }
}
