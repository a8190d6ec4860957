//! Tests for resolving failures into envelopes.

use super::*;
use crate::TraceId;
use crate::domain::validation::{ValidationOrigin, Violation};
use color_eyre::eyre::eyre;
use rstest::{fixture, rstest};

#[fixture]
fn ctx() -> RequestContext {
    RequestContext::new(TraceId::generate())
}

fn blank_username_and_bad_phone(origin: ValidationOrigin) -> Failure {
    Failure::validation(
        origin,
        vec![
            Violation::new("username", "username must not be blank"),
            Violation::new("phone", "phone format invalid"),
        ],
    )
}

#[rstest]
fn business_failure_keeps_its_code_and_message(ctx: RequestContext) {
    let envelope = dispatch(&Failure::business_with(40001, "duplicate username"), &ctx);

    assert_eq!(envelope.code(), 40001);
    assert_eq!(envelope.message(), "duplicate username");
    assert!(envelope.data().is_none());
}

#[rstest]
#[case(ValidationOrigin::Body, "username must not be blank;phone format invalid")]
#[case(
    ValidationOrigin::Parameters,
    "username must not be blank;phone format invalid"
)]
#[case(ValidationOrigin::Form, "username must not be blank；phone format invalid")]
fn validation_failures_join_messages_per_origin(
    ctx: RequestContext,
    #[case] origin: ValidationOrigin,
    #[case] expected: &str,
) {
    let envelope = dispatch(&blank_username_and_bad_phone(origin), &ctx);

    assert_eq!(envelope.code(), ErrorCode::ParamsError.code());
    assert_eq!(envelope.message(), expected);
}

#[rstest]
fn form_separator_differs_from_body_separator(ctx: RequestContext) {
    let body = dispatch(&blank_username_and_bad_phone(ValidationOrigin::Body), &ctx);
    let form = dispatch(&blank_username_and_bad_phone(ValidationOrigin::Form), &ctx);

    assert_ne!(body.message(), form.message());
}

#[rstest]
fn empty_violation_list_yields_empty_message(ctx: RequestContext) {
    let envelope = dispatch(
        &Failure::validation(ValidationOrigin::Parameters, Vec::new()),
        &ctx,
    );

    assert_eq!(envelope.code(), 40000);
    assert_eq!(envelope.message(), "");
}

#[rstest]
#[case("database password leaked in message")]
#[case("")]
fn unclassified_failures_hide_their_detail(ctx: RequestContext, #[case] detail: &str) {
    let envelope = dispatch(&Failure::from(eyre!("{detail}")), &ctx);

    assert_eq!(envelope.code(), 50000);
    assert_eq!(envelope.message(), "internal server error");
}

#[test]
fn dispatch_is_agnostic_to_trace_presence() {
    let failure = Failure::business(ErrorCode::NotFound);

    let with_trace = dispatch(&failure, &RequestContext::new(TraceId::generate()));
    let without_trace = dispatch(&failure, &RequestContext::detached());

    assert_eq!(with_trace, without_trace);
}

#[test]
fn resolve_matches_dispatch() {
    let failure = Failure::business(ErrorCode::Forbidden);

    assert_eq!(resolve(&failure), dispatch(&failure, &RequestContext::detached()));
}
