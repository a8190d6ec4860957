//! Application assembly shared by the server binary and integration tests.

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::config::CorsSettings;
use crate::domain::{ApiResult, ErrorCode, Failure};
use crate::inbound::http::cors::cors;
use crate::inbound::http::hello;
use crate::inbound::http::state::HttpState;
use crate::{Dispatch, Trace};

async fn route_not_found() -> ApiResult<()> {
    Err(Failure::business(ErrorCode::NotFound))
}

/// Build the application with middleware ordered CORS, Trace, Dispatch.
///
/// Unknown routes answer with the not-found envelope.
pub fn build_app(
    state: web::Data<HttpState>,
    cors_settings: CorsSettings,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .wrap(Dispatch)
        .wrap(Trace)
        .wrap(cors(&cors_settings))
        .configure(hello::routes)
        .default_service(web::to(route_not_found))
}
