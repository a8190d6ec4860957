//! Tests for HTTP failure mapping.

use super::*;
use crate::domain::ErrorCode;
use crate::domain::validation::{ValidationOrigin, Violation};
use actix_web::body::to_bytes;
use color_eyre::eyre::eyre;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn form_failure() -> Failure {
    Failure::validation(
        ValidationOrigin::Form,
        vec![
            Violation::new("username", "username must not be blank"),
            Violation::new("phone", "phone format invalid"),
        ],
    )
}

async fn render(failure: &Failure) -> (StatusCode, Value) {
    let response = ResponseError::error_response(failure);
    let status = response.status();
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let body = serde_json::from_slice(&bytes).expect("envelope JSON deserialisation succeeds");
    (status, body)
}

#[rstest]
#[case(Failure::business(ErrorCode::NotFound))]
#[case(Failure::business_with(40001, "duplicate username"))]
#[case(Failure::from(eyre!("boom")))]
fn status_is_always_ok(#[case] failure: Failure) {
    assert_eq!(ResponseError::status_code(&failure), StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn business_failure_renders_code_and_message() {
    let (status, body) = render(&Failure::business(ErrorCode::NoAuth)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "code": 40101, "message": "no permission" }));
}

#[rstest]
#[actix_web::test]
async fn form_failure_renders_full_width_join(form_failure: Failure) {
    let (_, body) = render(&form_failure).await;
    assert_eq!(
        body,
        json!({
            "code": 40000,
            "message": "username must not be blank；phone format invalid",
        })
    );
}

#[rstest]
#[actix_web::test]
async fn unclassified_failure_hides_detail() {
    let (_, body) = render(&Failure::from(eyre!("connection string postgres://secret"))).await;
    assert_eq!(
        body,
        json!({ "code": 50000, "message": "internal server error" })
    );
}
