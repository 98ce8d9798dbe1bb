//! Subscription table layout.

use rusqlite::Row;
use rusqlite::types::Value;

use crate::types::{RecordMeta, Subscription, SubscriptionFilter};

use super::query_builder::Predicate;
use super::store::{SqliteRecord, parse_column};

fn optional_count(value: Option<i16>) -> Value {
    value.map_or(Value::Null, |v| Value::Integer(i64::from(v)))
}

impl SqliteRecord for Subscription {
    const TABLE: &'static str = "subscriptions";

    const COLUMNS: &'static [&'static str] = &[
        "name",
        "price",
        "type",
        "duration_months",
        "sessions_count",
        "validity_months",
    ];

    fn sort_column(key: &str) -> Option<&'static str> {
        match key {
            "id" => Some("id"),
            "name" => Some("name"),
            "price" => Some("price"),
            "type" => Some("type"),
            _ => None,
        }
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Integer(i64::from(self.price)),
            Value::Text(self.kind.as_str().to_string()),
            optional_count(self.duration_months),
            optional_count(self.sessions_count),
            optional_count(self.validity_months),
        ]
    }

    fn from_row(meta: RecordMeta, row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Subscription {
            meta,
            name: row.get(offset)?,
            price: row.get(offset + 1)?,
            kind: parse_column(row, offset + 2)?,
            duration_months: row.get(offset + 3)?,
            sessions_count: row.get(offset + 4)?,
            validity_months: row.get(offset + 5)?,
        })
    }

    fn predicates(filter: &SubscriptionFilter) -> Vec<Predicate> {
        filter
            .kind
            .map(|kind| Predicate::eq("type", kind.as_str()))
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SubscriptionKind;

    #[test]
    fn test_absent_counts_bind_as_null() {
        let values = Subscription::monthly("Gold", 5000, None).column_values();
        assert_eq!(values[3], Value::Null);
        assert_eq!(values[2], Value::Text("monthly".to_string()));
    }

    #[test]
    fn test_kind_filter() {
        assert!(Subscription::predicates(&SubscriptionFilter::default()).is_empty());
        assert_eq!(
            Subscription::predicates(&SubscriptionFilter {
                kind: Some(SubscriptionKind::Visits)
            }),
            vec![Predicate::eq("type", "visits")]
        );
    }
}
