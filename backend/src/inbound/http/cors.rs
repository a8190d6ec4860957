//! Cross-origin policy applied to every route.

use actix_cors::Cors;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::http::{Method, Uri};
use tracing::warn;

use crate::config::CorsSettings;

const ANY: &str = "*";

fn is_any(entries: &[String]) -> bool {
    entries.iter().any(|entry| entry.trim() == ANY)
}

fn entries(list: &[String]) -> impl Iterator<Item = &str> {
    list.iter().map(|entry| entry.trim()).filter(|entry| !entry.is_empty())
}

/// Origin pattern such as `https://*.example.com`; each `*` matches any run
/// of characters.
#[derive(Debug, Clone)]
struct OriginPattern {
    parts: Vec<String>,
}

impl OriginPattern {
    fn new(pattern: &str) -> Self {
        Self {
            parts: pattern.split('*').map(str::to_owned).collect(),
        }
    }

    fn matches(&self, origin: &str) -> bool {
        let Some((first, rest)) = self.parts.split_first() else {
            return false;
        };
        let Some(mut remainder) = origin.strip_prefix(first.as_str()) else {
            return false;
        };
        let Some((last, middle)) = rest.split_last() else {
            return remainder.is_empty();
        };
        for part in middle {
            match remainder.find(part.as_str()) {
                Some(at) => remainder = remainder.get(at + part.len()..).unwrap_or_default(),
                None => return false,
            }
        }
        remainder.ends_with(last.as_str())
    }
}

fn is_exact_origin(origin: &str) -> bool {
    let Ok(uri) = origin.parse::<Uri>() else {
        return false;
    };
    uri.scheme().is_some() && uri.host().is_some() && HeaderValue::from_str(origin).is_ok()
}

fn with_origins(cors: Cors, origins: &[String]) -> Cors {
    if is_any(origins) {
        return cors.allow_any_origin();
    }
    let mut patterns = Vec::new();
    let mut cors = cors;
    for origin in entries(origins) {
        if origin.contains('*') {
            patterns.push(OriginPattern::new(origin));
        } else if is_exact_origin(origin) {
            cors = cors.allowed_origin(origin);
        } else {
            warn!(origin, "ignoring invalid CORS origin");
        }
    }
    if patterns.is_empty() {
        return cors;
    }
    cors.allowed_origin_fn(move |origin, _head| {
        origin
            .to_str()
            .is_ok_and(|origin| patterns.iter().any(|pattern| pattern.matches(origin)))
    })
}

/// Build the CORS middleware for `settings`.
///
/// Any `*` origin entry accepts every origin by echoing it back, which keeps
/// credentialed requests working. Entries containing `*` elsewhere are
/// wildcard patterns. Unparseable origins, methods and headers are skipped
/// with a warning, so a bad entry never stops the server from starting.
///
/// # Examples
/// ```
/// use scaffold::config::CorsSettings;
/// use scaffold::inbound::http::cors::cors;
///
/// let _middleware = cors(&CorsSettings::default());
/// ```
pub fn cors(settings: &CorsSettings) -> Cors {
    let mut cors = with_origins(
        Cors::default().max_age(settings.max_age),
        &settings.allowed_origins,
    );

    cors = if is_any(&settings.allowed_methods) {
        cors.allow_any_method()
    } else {
        let methods: Vec<&str> = entries(&settings.allowed_methods)
            .filter(|method| match Method::from_bytes(method.as_bytes()) {
                Ok(_) => true,
                Err(error) => {
                    warn!(method, %error, "ignoring invalid CORS method");
                    false
                }
            })
            .collect();
        cors.allowed_methods(methods)
    };

    cors = if is_any(&settings.allowed_headers) {
        cors.allow_any_header()
    } else {
        let headers: Vec<&str> = entries(&settings.allowed_headers)
            .filter(|header| match HeaderName::from_bytes(header.as_bytes()) {
                Ok(_) => true,
                Err(error) => {
                    warn!(header, %error, "ignoring invalid CORS header");
                    false
                }
            })
            .collect();
        cors.allowed_headers(headers)
    };

    if settings.allow_credentials {
        cors = cors.supports_credentials();
    }
    cors
}
