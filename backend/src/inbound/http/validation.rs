//! Validating extractors for inbound HTTP adapters.
//!
//! Each extractor deserialises with the matching Actix extractor, then runs
//! the value's [`Validate`] constraints. Constraint violations surface as a
//! validation [`Failure`] tagged with the input origin, so the dispatcher can
//! pick the right separator.
//!
//! Input that cannot be read at all (malformed JSON, a wrong content type, a
//! query or path value of the wrong type) is unclassified: the parser text is
//! logged and the caller sees the generic server error. Form binding errors
//! are the exception and stay form violations.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use color_eyre::eyre::eyre;
use serde::de::DeserializeOwned;

use crate::domain::Failure;
use crate::domain::validation::{Validate, ValidationOrigin, Violation};

fn unreadable(source: &str, err: &actix_web::Error) -> Failure {
    Failure::from(eyre!("unreadable request {source}: {err}"))
}

fn unbound_form(err: &actix_web::Error) -> Failure {
    Failure::validation(ValidationOrigin::Form, vec![Violation::new("form", err.to_string())])
}

fn checked<T: Validate>(origin: ValidationOrigin, value: T) -> Result<T, Failure> {
    let violations = value.validate();
    if violations.is_empty() {
        return Ok(value);
    }
    Err(Failure::validation(origin, violations.into_vec()))
}

/// JSON body that passed validation.
///
/// # Examples
/// ```
/// use scaffold::domain::ApiResult;
/// use scaffold::domain::validation::{Validate, Violations};
/// use scaffold::inbound::http::validation::ValidatedJson;
/// use scaffold::Envelope;
///
/// #[derive(serde::Deserialize)]
/// struct Rename {
///     name: String,
/// }
///
/// impl Validate for Rename {
///     fn validate(&self) -> Violations {
///         let mut violations = Violations::new();
///         violations.not_blank("name", &self.name, "name must not be blank");
///         violations
///     }
/// }
///
/// async fn rename(ValidatedJson(body): ValidatedJson<Rename>) -> ApiResult<String> {
///     Ok(Envelope::success(body.name))
/// }
/// ```
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
{
    type Error = Failure;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = web::Json::<T>::from_request(req, payload);
        Box::pin(async move {
            let body = fut
                .await
                .map_err(|err| unreadable("body", &err))?;
            checked(ValidationOrigin::Body, body.into_inner()).map(Self)
        })
    }
}

/// URL-encoded form body that passed validation.
#[derive(Debug)]
pub struct ValidatedForm<T>(pub T);

impl<T> FromRequest for ValidatedForm<T>
where
    T: DeserializeOwned + Validate + 'static,
{
    type Error = Failure;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = web::Form::<T>::from_request(req, payload);
        Box::pin(async move {
            let form = fut
                .await
                .map_err(|err| unbound_form(&err))?;
            checked(ValidationOrigin::Form, form.into_inner()).map(Self)
        })
    }
}

/// Query string that passed validation.
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<T> FromRequest for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
{
    type Error = Failure;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = web::Query::<T>::from_query(req.query_string())
            .map_err(|err| unreadable("query", &actix_web::Error::from(err)))
            .and_then(|query| checked(ValidationOrigin::Parameters, query.into_inner()))
            .map(Self);
        ready(result)
    }
}

/// Path segments that passed validation.
#[derive(Debug)]
pub struct ValidatedPath<T>(pub T);

impl<T> FromRequest for ValidatedPath<T>
where
    T: DeserializeOwned + Validate + 'static,
{
    type Error = Failure;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = web::Path::<T>::from_request(req, payload);
        Box::pin(async move {
            let path = fut
                .await
                .map_err(|err| unreadable("path", &err))?;
            checked(ValidationOrigin::Parameters, path.into_inner()).map(Self)
        })
    }
}
