// ABOUTME: Schema translation from SQLite declared types to MySQL column definitions
// ABOUTME: Builds idempotent CREATE TABLE statements and issues them against the target

use crate::mysql::writer::TargetWriter;
use crate::utils::quote_mysql_ident;
use anyhow::{Context, Result};

/// A source column as read from the SQLite catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub declared_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
}

/// MySQL column types the translator can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetColumnType {
    BigInteger,
    Text,
    LargeBinary,
    Double,
    FixedDecimal,
}

impl TargetColumnType {
    /// MySQL spelling of the type
    pub fn sql(&self) -> &'static str {
        match self {
            TargetColumnType::BigInteger => "BIGINT",
            TargetColumnType::Text => "TEXT",
            TargetColumnType::LargeBinary => "LONGBLOB",
            TargetColumnType::Double => "DOUBLE",
            TargetColumnType::FixedDecimal => "DECIMAL(38,10)",
        }
    }

    /// MySQL rejects literal defaults on TEXT and BLOB columns
    fn requires_expression_default(&self) -> bool {
        matches!(
            self,
            TargetColumnType::Text | TargetColumnType::LargeBinary
        )
    }
}

/// One entry of the translation table: any needle found in the upper-cased
/// declared type selects `target`.
#[derive(Debug)]
pub struct TypeRule {
    pub needles: &'static [&'static str],
    pub target: TargetColumnType,
}

impl TypeRule {
    pub fn matches(&self, declared_upper: &str) -> bool {
        self.needles
            .iter()
            .any(|needle| declared_upper.contains(needle))
    }
}

/// Translation rules in precedence order; the first match wins.
pub const TYPE_RULES: &[TypeRule] = &[
    TypeRule {
        needles: &["INT"],
        target: TargetColumnType::BigInteger,
    },
    TypeRule {
        needles: &["CHAR", "CLOB", "TEXT"],
        target: TargetColumnType::Text,
    },
    TypeRule {
        needles: &["BLOB"],
        target: TargetColumnType::LargeBinary,
    },
    TypeRule {
        needles: &["REAL", "FLOA", "DOUB"],
        target: TargetColumnType::Double,
    },
    TypeRule {
        needles: &["NUM", "DEC"],
        target: TargetColumnType::FixedDecimal,
    },
];

/// Type used when no rule matches, including empty declared types
pub const FALLBACK_TYPE: TargetColumnType = TargetColumnType::Text;

/// Translate a SQLite declared type into a MySQL column type
///
/// Case-insensitive substring matching against [`TYPE_RULES`], mirroring
/// SQLite's own type affinity heuristics.
///
/// # Examples
///
/// ```
/// # use sqlite_mysql_migrator::migration::schema::{translate_type, TargetColumnType};
/// assert_eq!(translate_type("integer"), TargetColumnType::BigInteger);
/// assert_eq!(translate_type("VARCHAR(20)"), TargetColumnType::Text);
/// assert_eq!(translate_type(""), TargetColumnType::Text);
/// ```
pub fn translate_type(declared_type: &str) -> TargetColumnType {
    let upper = declared_type.to_uppercase();
    TYPE_RULES
        .iter()
        .find(|rule| rule.matches(&upper))
        .map(|rule| rule.target)
        .unwrap_or(FALLBACK_TYPE)
}

/// Render a column definition: `name TYPE [NOT NULL] [DEFAULT value]`
///
/// # Examples
///
/// ```
/// # use sqlite_mysql_migrator::migration::schema::{build_column_clause, ColumnDescriptor};
/// let column = ColumnDescriptor {
///     name: "qty".to_string(),
///     declared_type: "INTEGER".to_string(),
///     not_null: true,
///     default_value: Some("0".to_string()),
/// };
/// assert_eq!(build_column_clause(&column), "`qty` BIGINT NOT NULL DEFAULT 0");
/// ```
pub fn build_column_clause(column: &ColumnDescriptor) -> String {
    let target = translate_type(&column.declared_type);
    let mut clause = format!("{} {}", quote_mysql_ident(&column.name), target.sql());

    if column.not_null {
        clause.push_str(" NOT NULL");
    }

    if let Some(default) = &column.default_value {
        clause.push_str(" DEFAULT ");
        clause.push_str(&render_default(target, default));
    }

    clause
}

/// Build the idempotent CREATE TABLE statement for a table
pub fn build_create_table(table: &str, columns: &[ColumnDescriptor]) -> String {
    let clauses = columns
        .iter()
        .map(build_column_clause)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_mysql_ident(table),
        clauses
    )
}

/// Create the target table unless it already exists
///
/// An existing table is left untouched even when its structure differs from
/// the translated one.
pub async fn create_table<W>(target: &mut W, table: &str, columns: &[ColumnDescriptor]) -> Result<()>
where
    W: TargetWriter + ?Sized,
{
    let sql = build_create_table(table, columns);
    tracing::debug!("DDL for '{}': {}", table, sql);

    target
        .execute_ddl(&sql)
        .await
        .with_context(|| format!("Failed to create table '{}' on target", table))
}

#[derive(Debug, PartialEq)]
enum DefaultKind {
    Null,
    Literal(String),
    Expression(String),
}

/// Normalise a SQLite default for MySQL DDL
fn render_default(target: TargetColumnType, raw: &str) -> String {
    match classify_default(raw.trim()) {
        DefaultKind::Null => "NULL".to_string(),
        DefaultKind::Literal(literal) if target.requires_expression_default() => {
            format!("({})", literal)
        }
        DefaultKind::Literal(literal) => literal,
        DefaultKind::Expression(expr) => format!("({})", expr),
    }
}

fn classify_default(value: &str) -> DefaultKind {
    let upper = value.to_ascii_uppercase();
    match upper.as_str() {
        "NULL" => return DefaultKind::Null,
        "TRUE" | "FALSE" => return DefaultKind::Literal(upper),
        // No translated type is temporal, so these are only valid as expressions
        "CURRENT_TIMESTAMP" | "CURRENT_DATE" | "CURRENT_TIME" => {
            return DefaultKind::Expression(upper)
        }
        _ => {}
    }

    if let Some(inner) = string_literal_body(value) {
        // MySQL treats backslash as an escape inside string literals; SQLite does not
        return DefaultKind::Literal(format!("'{}'", inner.replace('\\', "\\\\")));
    }

    if is_blob_literal(value) || is_numeric_literal(value) {
        return DefaultKind::Literal(value.to_string());
    }

    DefaultKind::Expression(value.to_string())
}

/// Body of a well-formed single-quoted literal, quotes still doubled
fn string_literal_body(value: &str) -> Option<&str> {
    let inner = value.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\'' && chars.next() != Some('\'') {
            return None;
        }
    }
    Some(inner)
}

fn is_blob_literal(value: &str) -> bool {
    value
        .strip_prefix("X'")
        .or_else(|| value.strip_prefix("x'"))
        .and_then(|rest| rest.strip_suffix('\''))
        .is_some_and(|hex| hex.len() % 2 == 0 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

fn is_numeric_literal(value: &str) -> bool {
    let unsigned = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);
    unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && unsigned
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        && unsigned.parse::<f64>().is_ok()
}
