//! User accounts.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::RecordMeta;
use crate::core::{Patch, Record};
use crate::credentials::Password;
use crate::error::StoreResult;
use crate::validation::{EMAIL_RX, Validate, Validator, matches};

const DUPLICATE_EMAIL: &str = "a user with this email address already exists";

/// An account that can sign in to the administration service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Persistence metadata.
    #[serde(flatten)]
    pub meta: RecordMeta,

    /// Display name.
    pub full_name: String,

    /// Sign-in address, unique across users (case-insensitive).
    pub email: String,

    /// Derived password hash. Never serialized.
    #[serde(skip)]
    pub password: Password,

    /// Whether the account has been activated.
    #[serde(default)]
    pub activated: bool,
}

impl User {
    /// Replaces the password hash with one derived from `plaintext`.
    ///
    /// The plaintext rules are checked first so a rejected password is never
    /// hashed.
    pub fn set_password(&mut self, plaintext: &str) -> StoreResult<()> {
        let mut v = Validator::new();
        validate_password_plaintext(&mut v, plaintext);
        v.finish()?;

        self.password = Password::set(plaintext)?;
        Ok(())
    }
}

/// Checks that `email` is present and shaped like an address.
pub fn validate_email(v: &mut Validator, email: &str) {
    v.check(!email.is_empty(), "email", "must be provided");
    v.check(
        matches(email, &EMAIL_RX),
        "email",
        "must be a valid email address",
    );
}

/// Checks a plaintext password before it is hashed.
pub fn validate_password_plaintext(v: &mut Validator, password: &str) {
    v.check(!password.is_empty(), "password", "must be provided");
    v.check(
        password.len() >= 8,
        "password",
        "must be at least 8 bytes long",
    );
    v.check(
        password.len() <= 72,
        "password",
        "must not be more than 72 bytes long",
    );
}

fn validate_full_name(v: &mut Validator, full_name: &str) {
    v.check(!full_name.is_empty(), "full_name", "must be provided");
    v.check(
        full_name.len() <= 500,
        "full_name",
        "must not be more than 500 bytes long",
    );
}

impl Validate for User {
    fn validate(&self, v: &mut Validator) {
        validate_full_name(v, &self.full_name);
        validate_email(v, &self.email);
        v.check(self.password.is_set(), "password", "must be provided");
    }
}

impl Record for User {
    const RESOURCE: &'static str = "user";

    const SORT_SAFELIST: &'static [&'static str] =
        &["id", "full_name", "email", "-id", "-full_name", "-email"];

    type Filter = ();

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn unique_violation(constraint: &str) -> Option<(&'static str, &'static str)> {
        constraint
            .contains("users.email")
            .then_some(("email", DUPLICATE_EMAIL))
    }
}

/// A registration request carrying the plaintext password.
#[derive(Clone, Deserialize)]
pub struct NewUser {
    /// Display name.
    pub full_name: String,
    /// Sign-in address.
    pub email: String,
    /// Plaintext password, hashed before the user is stored.
    pub password: String,
}

impl NewUser {
    /// Creates a registration request.
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Hashes the password and builds an unsaved, inactive user.
    pub fn into_user(self) -> StoreResult<User> {
        Ok(User {
            meta: RecordMeta::default(),
            full_name: self.full_name,
            email: self.email,
            password: Password::set(&self.password)?,
            activated: false,
        })
    }
}

impl Validate for NewUser {
    fn validate(&self, v: &mut Validator) {
        validate_full_name(v, &self.full_name);
        validate_email(v, &self.email);
        validate_password_plaintext(v, &self.password);
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Partial update of a user. Passwords change through [`User::set_password`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    /// New display name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// New sign-in address.
    #[serde(default)]
    pub email: Option<String>,
    /// New activation state.
    #[serde(default)]
    pub activated: Option<bool>,
}

impl Patch<User> for UserPatch {
    fn apply(self, user: &mut User) {
        if let Some(full_name) = self.full_name {
            user.full_name = full_name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(activated) = self.activated {
            user.activated = activated;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_rules() {
        let err = NewUser::new("", "nope", "short").validated().unwrap_err();
        let errors = err.validation_errors().unwrap();

        assert_eq!(errors.get("full_name"), Some("must be provided"));
        assert_eq!(errors.get("email"), Some("must be a valid email address"));
        assert_eq!(errors.get("password"), Some("must be at least 8 bytes long"));
    }

    #[test]
    fn test_password_upper_bound() {
        let err = NewUser::new("Ann", "ann@example.com", "p".repeat(73))
            .validated()
            .unwrap_err();
        assert_eq!(
            err.validation_errors().unwrap().get("password"),
            Some("must not be more than 72 bytes long")
        );
    }

    #[test]
    fn test_into_user_hashes_password() {
        let user = NewUser::new("Ann", "ann@example.com", "pa55word")
            .into_user()
            .unwrap();

        assert!(!user.activated);
        assert!(user.password.matches("pa55word"));
        assert!(user.validated().is_ok());
    }

    #[test]
    fn test_user_without_hash_fails() {
        let mut user = NewUser::new("Ann", "ann@example.com", "pa55word")
            .into_user()
            .unwrap();
        user.password = Password::default();

        let err = user.validated().unwrap_err();
        assert!(err.validation_errors().unwrap().contains("password"));
    }

    #[test]
    fn test_set_password_rejects_short_plaintext() {
        let mut user = NewUser::new("Ann", "ann@example.com", "pa55word")
            .into_user()
            .unwrap();

        assert!(user.set_password("short").is_err());
        assert!(user.password.matches("pa55word"));

        user.set_password("n3w-pa55word").unwrap();
        assert!(user.password.matches("n3w-pa55word"));
    }

    #[test]
    fn test_password_never_serialized_or_debugged() {
        let new_user = NewUser::new("Ann", "ann@example.com", "pa55word");
        assert!(!format!("{:?}", new_user).contains("pa55word"));

        let user = new_user.into_user().unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert!(!format!("{:?}", user).contains("argon2"));
    }

    #[test]
    fn test_email_constraint_maps_to_field() {
        assert_eq!(
            User::unique_violation("UNIQUE constraint failed: users.email"),
            Some(("email", DUPLICATE_EMAIL))
        );
        assert_eq!(User::unique_violation("UNIQUE constraint failed: users.id"), None);
    }
}
