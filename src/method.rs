//! HTTP method handling.
//!
//! Registration accepts methods as strings in any case; they are stored as
//! upper-case [`http::Method`] values. Extension methods (`PURGE`, `MKCOL`,
//! ...) are accepted as long as they are valid HTTP tokens.

use std::collections::BTreeSet;
use std::fmt;

use http::Method;

use crate::error::Error;

/// Parses a method name case-insensitively into its canonical upper-case form.
pub(crate) fn canonicalize(method: &str) -> Result<Method, Error> {
    let trimmed = method.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyMethod);
    }
    Method::from_bytes(trimmed.to_ascii_uppercase().as_bytes())
        .map_err(|_| Error::InvalidMethod(method.to_owned()))
}

/// The set of methods registered against one route path.
///
/// Rendered as a sorted, comma-separated list (`"GET, PUT"`) for the
/// `Allow` and `Access-Control-Allow-Methods` headers, so the value does not
/// depend on registration order.
#[derive(Clone, Debug, Default)]
pub(crate) struct AllowedMethods(BTreeSet<String>);

impl AllowedMethods {
    pub(crate) fn insert(&mut self, method: &Method) {
        self.0.insert(method.as_str().to_owned());
    }
}

impl fmt::Display for AllowedMethods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, method) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(method)?;
        }
        Ok(())
    }
}
