//! HTTP adapter mapping for domain failures.
//!
//! Purpose: let Actix handlers return [`Failure`] directly. Every failure
//! renders as a status-200 envelope; the [`Dispatch`](crate::Dispatch)
//! middleware re-renders it with the request context and logs it.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use super::response::envelope_response;
use crate::domain::Failure;
use crate::domain::dispatch::resolve;

impl ResponseError for Failure {
    fn status_code(&self) -> StatusCode {
        StatusCode::OK
    }

    fn error_response(&self) -> HttpResponse {
        envelope_response(&resolve(self))
    }
}

#[cfg(test)]
mod tests;
