//! Field-level validation primitives shared by every request origin.
//!
//! Constraints record a [`Violation`] per failing field in the order they are
//! checked, so the joined message follows field declaration order. All
//! constraints run; nothing short-circuits.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Separator for body and parameter violation messages.
pub const MESSAGE_SEPARATOR: &str = ";";
/// Separator for form-binding violation messages.
///
/// Full-width semicolon kept for compatibility with existing clients that
/// split form errors on it. Unifying it with [`MESSAGE_SEPARATOR`] is an open
/// product decision.
pub const FORM_MESSAGE_SEPARATOR: &str = "；";

/// Where the rejected input came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationOrigin {
    /// Structured request body (JSON).
    Body,
    /// Query string or path segments.
    Parameters,
    /// URL-encoded form fields.
    Form,
}

impl ValidationOrigin {
    /// Separator used when joining violation messages for this origin.
    #[must_use]
    pub const fn separator(self) -> &'static str {
        match self {
            Self::Body | Self::Parameters => MESSAGE_SEPARATOR,
            Self::Form => FORM_MESSAGE_SEPARATOR,
        }
    }
}

impl fmt::Display for ValidationOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Body => "body",
            Self::Parameters => "parameter",
            Self::Form => "form",
        };
        f.write_str(label)
    }
}

/// One rejected field and the message explaining why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    field: String,
    message: String,
}

impl Violation {
    /// Record a violation for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Name of the rejected field.
    #[must_use]
    pub fn field(&self) -> &str {
        self.field.as_str()
    }

    /// Default message for the violated constraint.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

static MOBILE_RE: OnceLock<Regex> = OnceLock::new();

fn mobile_regex() -> &'static Regex {
    MOBILE_RE.get_or_init(|| {
        // Mainland China mobile numbers: 11 digits, carrier prefix 13x-19x.
        Regex::new(r"^1[3-9]\d{9}$")
            .unwrap_or_else(|error| panic!("mobile regex failed to compile: {error}"))
    })
}

/// Ordered collector of violations for one request value.
///
/// # Examples
/// ```
/// use scaffold::domain::validation::Violations;
///
/// let mut violations = Violations::new();
/// violations
///     .not_blank("username", "  ", "username must not be blank")
///     .mobile("phone", "13812345678", "phone format invalid");
/// assert_eq!(violations.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    /// Start an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject `value` when it is empty or whitespace only.
    pub fn not_blank(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(Violation::new(field, message));
        }
        self
    }

    /// Reject `value` unless it is a well-formed mobile number.
    pub fn mobile(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        if !mobile_regex().is_match(value) {
            self.push(Violation::new(field, message));
        }
        self
    }

    /// Append an already-built violation.
    pub fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    /// Whether no constraint was violated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Consume the collector, keeping recording order.
    #[must_use]
    pub fn into_vec(self) -> Vec<Violation> {
        self.0
    }
}

/// Request values that can report their own constraint violations.
pub trait Validate {
    /// Check every constraint and return the violations in declaration order.
    fn validate(&self) -> Violations;
}

/// Validation failure raised for one request origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    origin: ValidationOrigin,
    violations: Vec<Violation>,
}

impl ValidationFailure {
    /// Bundle the violations collected for `origin`.
    #[must_use]
    pub fn new(origin: ValidationOrigin, violations: Vec<Violation>) -> Self {
        Self { origin, violations }
    }

    /// Input origin that failed validation.
    #[must_use]
    pub fn origin(&self) -> ValidationOrigin {
        self.origin
    }

    /// Violations in recording order.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Every violation message joined with the origin's separator.
    ///
    /// An empty violation list yields an empty string.
    #[must_use]
    pub fn joined_message(&self) -> String {
        self.violations
            .iter()
            .map(Violation::message)
            .collect::<Vec<_>>()
            .join(self.origin.separator())
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} validation failed: {}",
            self.origin,
            self.joined_message()
        )
    }
}
