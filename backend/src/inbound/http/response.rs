//! Rendering of envelopes as HTTP responses.

use actix_web::body::BoxBody;
use actix_web::{HttpRequest, HttpResponse, Responder};
use serde::Serialize;

use crate::domain::Envelope;

/// Render `envelope` as a status-200 JSON response.
pub fn envelope_response<T: Serialize>(envelope: &Envelope<T>) -> HttpResponse {
    HttpResponse::Ok().json(envelope)
}

impl<T: Serialize> Responder for Envelope<T> {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        envelope_response(&self)
    }
}
