//! SQL query builder for list operations.
//!
//! Builds a single statement that returns the window-wide match count next to
//! every row of the requested page:
//!
//! ```text
//! SELECT COUNT(*) OVER(), <columns> FROM <table>
//! WHERE <predicates>
//! ORDER BY <sort column> <direction>[, id ASC]
//! LIMIT ? OFFSET ?
//! ```
//!
//! Table and column names only ever come from compile-time constants; user
//! input is bound as parameters.

use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;

use crate::types::SortDirection;

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    /// String parameter.
    Text(String),
    /// Integer parameter.
    Integer(i64),
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlParam::Text(s) => s.to_sql(),
            SqlParam::Integer(i) => i.to_sql(),
        }
    }
}

/// A fragment of SQL with bound parameters.
#[derive(Debug, Clone, Default)]
pub struct SqlFragment {
    /// The SQL text, using anonymous `?` placeholders.
    pub sql: String,
    /// Bound parameter values, in placeholder order.
    pub params: Vec<SqlParam>,
}

/// A row filter on a list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `column = value`.
    Eq {
        /// Column name.
        column: &'static str,
        /// Value bound as text.
        value: String,
    },
    /// Every token of `query` matches the record's entry in `fts_table`.
    Text {
        /// FTS5 table keyed by `record_id`.
        fts_table: &'static str,
        /// Prepared FTS5 match expression.
        query: String,
    },
}

impl Predicate {
    /// An equality predicate.
    pub fn eq(column: &'static str, value: impl Into<String>) -> Self {
        Predicate::Eq {
            column,
            value: value.into(),
        }
    }

    /// A token search predicate, or `None` if `input` has no tokens.
    ///
    /// An empty search means "no filter", never "match nothing".
    pub fn text(fts_table: &'static str, input: &str) -> Option<Self> {
        fts_query(input).map(|query| Predicate::Text { fts_table, query })
    }

    fn to_fragment(&self) -> SqlFragment {
        match self {
            Predicate::Eq { column, value } => SqlFragment {
                sql: format!("{} = ?", column),
                params: vec![SqlParam::Text(value.clone())],
            },
            Predicate::Text { fts_table, query } => SqlFragment {
                sql: format!(
                    "id IN (SELECT record_id FROM {t} WHERE {t} MATCH ?)",
                    t = fts_table
                ),
                params: vec![SqlParam::Text(query.clone())],
            },
        }
    }
}

/// Turns free text into an FTS5 expression matching every token.
///
/// Input is split on anything that is not alphanumeric and each token is
/// quoted, so FTS5 operators in user input are treated as plain words.
pub fn fts_query(input: &str) -> Option<String> {
    let tokens: Vec<String> = input
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{}\"", t))
        .collect();

    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

/// Ordering and window of a list query.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    /// Sort column, already mapped from a safelisted sort key.
    pub sort_column: &'static str,
    /// Sort direction.
    pub direction: SortDirection,
    /// Rows per page.
    pub limit: u32,
    /// Rows to skip.
    pub offset: u64,
}

/// Builds the paged list statement for `table`.
pub fn build_list_query(
    table: &str,
    columns: &[&str],
    predicates: &[Predicate],
    window: Window,
) -> SqlFragment {
    let mut sql = format!("SELECT COUNT(*) OVER(), {} FROM {}", columns.join(", "), table);
    let mut params = Vec::new();

    if !predicates.is_empty() {
        let clauses: Vec<String> = predicates
            .iter()
            .map(|p| {
                let fragment = p.to_fragment();
                params.extend(fragment.params);
                fragment.sql
            })
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    sql.push_str(&format!(
        " ORDER BY {} {}",
        window.sort_column,
        window.direction.as_sql()
    ));
    if window.sort_column != "id" {
        sql.push_str(", id ASC");
    }
    sql.push_str(" LIMIT ? OFFSET ?");
    params.push(SqlParam::Integer(i64::from(window.limit)));
    params.push(SqlParam::Integer(
        i64::try_from(window.offset).unwrap_or(i64::MAX),
    ));

    SqlFragment { sql, params }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Window {
        Window {
            sort_column: "id",
            direction: SortDirection::Ascending,
            limit: 20,
            offset: 40,
        }
    }

    #[test]
    fn test_unfiltered_query() {
        let query = build_list_query("cabinets", &["id", "name"], &[], window());

        assert_eq!(
            query.sql,
            "SELECT COUNT(*) OVER(), id, name FROM cabinets ORDER BY id ASC LIMIT ? OFFSET ?"
        );
        assert_eq!(
            query.params,
            vec![SqlParam::Integer(20), SqlParam::Integer(40)]
        );
    }

    #[test]
    fn test_predicates_are_anded_in_order() {
        let predicates = vec![
            Predicate::text("teachers_fts", "anna").unwrap(),
            Predicate::eq("gender", "female"),
        ];
        let query = build_list_query(
            "teachers",
            &["id"],
            &predicates,
            Window {
                sort_column: "full_name",
                direction: SortDirection::Descending,
                ..window()
            },
        );

        assert!(query.sql.contains(
            "WHERE id IN (SELECT record_id FROM teachers_fts WHERE teachers_fts MATCH ?) AND gender = ?"
        ));
        assert!(query.sql.contains("ORDER BY full_name DESC, id ASC"));
        assert_eq!(
            query.params,
            vec![
                SqlParam::Text("\"anna\"".to_string()),
                SqlParam::Text("female".to_string()),
                SqlParam::Integer(20),
                SqlParam::Integer(40),
            ]
        );
    }

    #[test]
    fn test_fts_query_tokenizes_and_quotes() {
        assert_eq!(
            fts_query("Anna  Petrova"),
            Some("\"Anna\" \"Petrova\"".to_string())
        );
        assert_eq!(
            fts_query("anna OR \"x\" NEAR(y)"),
            Some("\"anna\" \"OR\" \"x\" \"NEAR\" \"y\"".to_string())
        );
        assert_eq!(fts_query("Мария"), Some("\"Мария\"".to_string()));
    }

    #[test]
    fn test_empty_text_is_no_predicate() {
        assert_eq!(fts_query(""), None);
        assert!(Predicate::text("teachers_fts", "  -*- ").is_none());
    }
}
