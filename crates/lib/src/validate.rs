//! # Read-Only SQL Gate
//!
//! The validator judges whether a model-generated string is safe to execute as a
//! read-only analytical query. It is a syntactic allow-list gate, not a parser:
//! the generator is a cooperative component, and the gate exists to catch
//! generation mistakes, not adversarial injection. Keyword matches inside string
//! literals or comments are accepted false positives.

use regex::Regex;
use std::sync::LazyLock;

/// DML/DDL keywords that disqualify a query from execution.
pub const FORBIDDEN_KEYWORDS: [&str; 10] = [
    "INSERT", "UPDATE", "DELETE", "DROP", "CREATE", "ALTER", "TRUNCATE", "GRANT", "REVOKE",
    "MERGE",
];

static LEADING_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(SELECT|WITH)\b").expect("valid leading-keyword regex"));

static FORBIDDEN: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    FORBIDDEN_KEYWORDS
        .iter()
        .map(|kw| {
            let re = Regex::new(&format!(r"(?i)\b{kw}\b")).expect("valid keyword regex");
            (*kw, re)
        })
        .collect()
});

/// The outcome of validating a candidate query string.
///
/// Derived purely from the text; carries no external state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationVerdict {
    pub is_structurally_valid: bool,
    pub is_readonly_safe: bool,
    pub message: Option<String>,
}

impl ValidationVerdict {
    /// True when the query passed both the structure and the read-only checks.
    pub fn is_safe(&self) -> bool {
        self.is_structurally_valid && self.is_readonly_safe
    }

    fn reject_structure(message: impl Into<String>) -> Self {
        Self {
            is_structurally_valid: false,
            is_readonly_safe: true,
            message: Some(message.into()),
        }
    }

    fn reject_safety(message: String) -> Self {
        Self {
            is_structurally_valid: true,
            is_readonly_safe: false,
            message: Some(message),
        }
    }

    fn accept() -> Self {
        Self {
            is_structurally_valid: true,
            is_readonly_safe: true,
            message: None,
        }
    }
}

/// Validates that a generated query is a read-only SELECT or WITH statement.
///
/// The checks run in a fixed precedence and the first applicable failure wins:
/// empty input, then statement structure, then the forbidden-keyword scan. The
/// keyword scan only runs on structurally valid queries.
pub fn validate_sql(sql: &str) -> ValidationVerdict {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return ValidationVerdict::reject_structure("LLM returned an empty SQL query.");
    }

    match LEADING_KEYWORD.captures(trimmed) {
        Some(caps) => {
            let first_keyword = caps.get(1).map(|m| m.as_str().to_uppercase());
            // A common-table-expression must still project via a SELECT of its
            // own, outside the parenthesized CTE bodies.
            if first_keyword.as_deref() == Some("WITH") && !has_top_level_select(trimmed) {
                return ValidationVerdict::reject_structure(
                    "SQL starts with WITH but does not contain a SELECT statement.",
                );
            }
        }
        None => {
            return ValidationVerdict::reject_structure(
                "Generated SQL must start with SELECT or WITH.",
            );
        }
    }

    for (keyword, re) in FORBIDDEN.iter() {
        if re.is_match(trimmed) {
            return ValidationVerdict::reject_safety(format!(
                "Generated SQL contains a disallowed keyword: {keyword}. Only SELECT queries are permitted."
            ));
        }
    }

    ValidationVerdict::accept()
}

/// Scans for a whole-word `SELECT` token at parenthesis depth zero.
///
/// Quoted regions (single, double, or backtick) are skipped so parentheses
/// inside literals and identifiers do not distort the depth count. Escaped
/// quotes within a literal are not understood, matching the gate's
/// approximate treatment of literals elsewhere.
fn has_top_level_select(sql: &str) -> bool {
    let upper = sql.to_uppercase();
    let bytes = upper.as_bytes();
    let mut depth: usize = 0;
    let mut quote: Option<char> = None;
    for (i, ch) in upper.char_indices() {
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' | '`' => quote = Some(ch),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            'S' if depth == 0 && upper[i..].starts_with("SELECT") => {
                let before_ok = i == 0 || {
                    let b = bytes[i - 1];
                    !(b.is_ascii_alphanumeric() || b == b'_')
                };
                let end = i + "SELECT".len();
                let after_ok = end >= bytes.len() || {
                    let b = bytes[end];
                    !(b.is_ascii_alphanumeric() || b == b'_')
                };
                if before_ok && after_ok {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}
