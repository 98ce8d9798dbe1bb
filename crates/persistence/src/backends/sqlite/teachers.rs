//! Teacher table layout.

use rusqlite::Row;
use rusqlite::types::Value;

use crate::types::{RecordMeta, Teacher, TeacherFilter};

use super::query_builder::Predicate;
use super::store::{SqliteRecord, parse_column};

impl SqliteRecord for Teacher {
    const TABLE: &'static str = "teachers";

    const COLUMNS: &'static [&'static str] = &[
        "full_name",
        "birth_date",
        "phone",
        "note",
        "gender",
        "status",
    ];

    fn sort_column(key: &str) -> Option<&'static str> {
        match key {
            "id" => Some("id"),
            "name" => Some("full_name"),
            "gender" => Some("gender"),
            "status" => Some("status"),
            "birth_date" => Some("birth_date"),
            _ => None,
        }
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.full_name.clone()),
            Value::Text(self.birth_date.format("%Y-%m-%d").to_string()),
            Value::Text(self.phone.clone()),
            Value::Text(self.note.clone()),
            Value::Text(self.gender.as_str().to_string()),
            Value::Text(self.status.as_str().to_string()),
        ]
    }

    fn from_row(meta: RecordMeta, row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Teacher {
            meta,
            full_name: row.get(offset)?,
            birth_date: parse_column(row, offset + 1)?,
            phone: row.get(offset + 2)?,
            note: row.get(offset + 3)?,
            gender: parse_column(row, offset + 4)?,
            status: parse_column(row, offset + 5)?,
        })
    }

    fn predicates(filter: &TeacherFilter) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(name) = Predicate::text("teachers_fts", &filter.name) {
            predicates.push(name);
        }
        if let Some(gender) = filter.gender {
            predicates.push(Predicate::eq("gender", gender.as_str()));
        }
        if let Some(status) = filter.status {
            predicates.push(Predicate::eq("status", status.as_str()));
        }
        predicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gender, TeacherStatus};

    #[test]
    fn test_default_filter_has_no_predicates() {
        assert!(Teacher::predicates(&TeacherFilter::default()).is_empty());
    }

    #[test]
    fn test_filter_predicates() {
        let filter = TeacherFilter::name("anna")
            .with_gender(Gender::Female)
            .with_status(TeacherStatus::Vacation);

        assert_eq!(
            Teacher::predicates(&filter),
            vec![
                Predicate::text("teachers_fts", "anna").unwrap(),
                Predicate::eq("gender", "female"),
                Predicate::eq("status", "vacation"),
            ]
        );
    }
}
