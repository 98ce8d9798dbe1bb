//! Field-level validation.
//!
//! A [`Validator`] accumulates rule failures keyed by field name. Checks never
//! short-circuit: every failing rule is recorded, and a later failure on the
//! same field replaces the earlier message.
//!
//! ```
//! use crm_persistence::validation::Validator;
//!
//! let mut v = Validator::new();
//! v.check(!"".is_empty(), "name", "must be provided");
//! v.check(0 > 0, "price", "must be greater than zero");
//!
//! assert!(!v.valid());
//! assert_eq!(v.errors().len(), 2);
//! ```

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{StoreError, StoreResult};

/// Email address shape accepted for user accounts.
pub static EMAIL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

/// Field name to message mapping surfaced verbatim to API consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    /// Records `message` under `field`, replacing any earlier message.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    /// Returns the message recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Returns true if `field` has a recorded failure.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no failures were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates failures in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
        }
        Ok(())
    }
}

/// Accumulates field errors across independent checks.
#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    /// Creates a validator with no recorded errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no errors have been recorded.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records an error for `field` unconditionally.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(field, message);
    }

    /// Records `message` under `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: impl Into<String>, message: impl Into<String>) {
        if !ok {
            self.add_error(field, message);
        }
    }

    /// The errors recorded so far.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Consumes the validator, returning `ValidationFailed` if anything failed.
    pub fn finish(self) -> StoreResult<()> {
        if self.valid() {
            Ok(())
        } else {
            Err(StoreError::ValidationFailed(self.errors))
        }
    }
}

/// Types that know their own field rules.
pub trait Validate {
    /// Runs every rule for `self`, recording failures in `v`.
    fn validate(&self, v: &mut Validator);

    /// Runs the rules with a fresh validator.
    fn validated(&self) -> StoreResult<()> {
        let mut v = Validator::new();
        self.validate(&mut v);
        v.finish()
    }
}

/// Returns true if `value` is one of `permitted`.
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

/// Returns true if `value` matches `rx`.
pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}

/// Returns true if every element of `values` is distinct.
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let distinct: HashSet<&T> = values.iter().collect();
    distinct.len() == values.len()
}
