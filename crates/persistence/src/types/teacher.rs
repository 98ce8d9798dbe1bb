//! Teacher records.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ParseEnumError, RecordMeta};
use crate::core::{Patch, Record};
use crate::validation::{Validate, Validator};

/// Teacher gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
}

impl Gender {
    /// Returns the stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(ParseEnumError::new("gender", s)),
        }
    }
}

/// Employment status of a teacher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeacherStatus {
    /// Currently teaching.
    #[default]
    Active,
    /// On leave.
    Vacation,
    /// No longer teaching; kept for history.
    Archived,
}

impl TeacherStatus {
    /// Returns the stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            TeacherStatus::Active => "active",
            TeacherStatus::Vacation => "vacation",
            TeacherStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for TeacherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeacherStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TeacherStatus::Active),
            "vacation" => Ok(TeacherStatus::Vacation),
            "archived" => Ok(TeacherStatus::Archived),
            _ => Err(ParseEnumError::new("teacher status", s)),
        }
    }
}

/// A teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// Persistence metadata.
    #[serde(flatten)]
    pub meta: RecordMeta,

    /// Full name, searchable by token.
    pub full_name: String,

    /// Date of birth.
    pub birth_date: NaiveDate,

    /// Contact phone number.
    pub phone: String,

    /// Free-form note.
    #[serde(default)]
    pub note: String,

    /// Gender.
    pub gender: Gender,

    /// Employment status.
    #[serde(default)]
    pub status: TeacherStatus,
}

impl Teacher {
    /// Creates an unsaved, active teacher with an empty note.
    pub fn new(
        full_name: impl Into<String>,
        birth_date: NaiveDate,
        phone: impl Into<String>,
        gender: Gender,
    ) -> Self {
        Self {
            meta: RecordMeta::default(),
            full_name: full_name.into(),
            birth_date,
            phone: phone.into(),
            note: String::new(),
            gender,
            status: TeacherStatus::default(),
        }
    }

    /// Sets the note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: TeacherStatus) -> Self {
        self.status = status;
        self
    }
}

impl Validate for Teacher {
    fn validate(&self, v: &mut Validator) {
        v.check(!self.full_name.is_empty(), "full_name", "must be provided");
        v.check(
            self.full_name.len() <= 200,
            "full_name",
            "must not be more than 200 bytes long",
        );
        v.check(!self.phone.is_empty(), "phone", "must be provided");
        v.check(
            self.phone.len() <= 20,
            "phone",
            "must not be more than 20 bytes long",
        );
        v.check(
            self.note.len() <= 1000,
            "note",
            "must not be more than 1000 bytes long",
        );
    }
}

impl Record for Teacher {
    const RESOURCE: &'static str = "teacher";

    const SORT_SAFELIST: &'static [&'static str] = &[
        "id",
        "name",
        "gender",
        "status",
        "birth_date",
        "-id",
        "-name",
        "-gender",
        "-status",
        "-birth_date",
    ];

    type Filter = TeacherFilter;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

/// Filters accepted when listing teachers. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherFilter {
    /// Free-text search over the full name. Every token must match.
    #[serde(default)]
    pub name: String,

    /// Exact gender.
    #[serde(default)]
    pub gender: Option<Gender>,

    /// Exact status.
    #[serde(default)]
    pub status: Option<TeacherStatus>,
}

impl TeacherFilter {
    /// Filters by name tokens.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Restricts to `gender`.
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Restricts to `status`.
    pub fn with_status(mut self, status: TeacherStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Partial update of a teacher. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherPatch {
    /// New full name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// New date of birth.
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// New phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// New note.
    #[serde(default)]
    pub note: Option<String>,
    /// New gender.
    #[serde(default)]
    pub gender: Option<Gender>,
    /// New status.
    #[serde(default)]
    pub status: Option<TeacherStatus>,
}

impl Patch<Teacher> for TeacherPatch {
    fn apply(self, teacher: &mut Teacher) {
        if let Some(full_name) = self.full_name {
            teacher.full_name = full_name;
        }
        if let Some(birth_date) = self.birth_date {
            teacher.birth_date = birth_date;
        }
        if let Some(phone) = self.phone {
            teacher.phone = phone;
        }
        if let Some(note) = self.note {
            teacher.note = note;
        }
        if let Some(gender) = self.gender {
            teacher.gender = gender;
        }
        if let Some(status) = self.status {
            teacher.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teacher() -> Teacher {
        Teacher::new(
            "Anna Petrova",
            NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
            "+7 900 000 00 00",
            Gender::Female,
        )
    }

    #[test]
    fn test_new_teacher_is_active() {
        let teacher = teacher();
        assert_eq!(teacher.status, TeacherStatus::Active);
        assert!(teacher.note.is_empty());
        assert!(teacher.validated().is_ok());
    }

    #[test]
    fn test_rules_accumulate() {
        let mut teacher = teacher();
        teacher.full_name = String::new();
        teacher.phone = "1".repeat(21);
        teacher.note = "x".repeat(1001);

        let err = teacher.validated().unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert_eq!(errors.get("full_name"), Some("must be provided"));
        assert_eq!(errors.get("phone"), Some("must not be more than 20 bytes long"));
        assert_eq!(errors.get("note"), Some("must not be more than 1000 bytes long"));
    }

    #[test]
    fn test_name_length_is_counted_in_bytes() {
        let mut teacher = teacher();
        // 101 two-byte characters
        teacher.full_name = "я".repeat(101);

        let err = teacher.validated().unwrap_err();
        assert_eq!(
            err.validation_errors().unwrap().get("full_name"),
            Some("must not be more than 200 bytes long")
        );
    }

    #[test]
    fn test_enum_round_trip_through_str() {
        for status in [
            TeacherStatus::Active,
            TeacherStatus::Vacation,
            TeacherStatus::Archived,
        ] {
            assert_eq!(status.as_str().parse::<TeacherStatus>().unwrap(), status);
        }
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert!("other".parse::<Gender>().is_err());
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut teacher = teacher().with_note("likes chess");
        TeacherPatch {
            status: Some(TeacherStatus::Vacation),
            ..Default::default()
        }
        .apply(&mut teacher);

        assert_eq!(teacher.status, TeacherStatus::Vacation);
        assert_eq!(teacher.full_name, "Anna Petrova");
        assert_eq!(teacher.note, "likes chess");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(teacher()).unwrap();
        assert_eq!(json["gender"], "female");
        assert_eq!(json["status"], "active");
        assert_eq!(json["birth_date"], "1990-05-17");
        assert_eq!(json["version"], 0);
    }
}
