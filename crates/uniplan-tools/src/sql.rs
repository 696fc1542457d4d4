use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    #[error("empty SQL query")]
    Empty,
    #[error("only a single SQL statement is allowed")]
    MultipleStatements,
    #[error("only read-only SELECT queries are allowed, got '{0}'")]
    NotReadOnly(String),
    #[error("unterminated string literal in SQL query")]
    Unterminated,
}

// Keywords that make a WITH query write through a CTE
const WRITE_KEYWORDS: [&str; 8] = [
    "INSERT", "UPDATE", "DELETE", "REPLACE", "DROP", "ALTER", "CREATE", "ATTACH",
];

/// A single read-only query produced by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlQuery(String);

impl SqlQuery {
    /// Clean model output into a query: strip code fences, whitespace and
    /// trailing semicolons, then require exactly one `SELECT`/`WITH` statement.
    pub fn parse(text: &str) -> Result<Self, SqlError> {
        let body = uniplan_llm::strip_code_fences(text);
        let body = body.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace());
        if body.is_empty() {
            return Err(SqlError::Empty);
        }

        let words = keywords(body)?;
        let first = words.first().map(String::as_str).unwrap_or_default();
        match first {
            "SELECT" => {}
            "WITH" => {
                if let Some(word) = words.iter().find(|w| WRITE_KEYWORDS.contains(&w.as_str())) {
                    return Err(SqlError::NotReadOnly(word.clone()));
                }
            }
            other => return Err(SqlError::NotReadOnly(other.to_string())),
        }

        Ok(Self(body.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upper-cased bare words outside string literals, quoted identifiers and comments.
/// A `;` outside those means a second statement.
fn keywords(sql: &str) -> Result<Vec<String>, SqlError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = sql.chars().peekable();

    let flush = |current: &mut String, words: &mut Vec<String>| {
        if !current.is_empty() {
            words.push(current.to_ascii_uppercase());
            current.clear();
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                flush(&mut current, &mut words);
                let mut closed = false;
                while let Some(nc) = chars.next() {
                    if nc == c {
                        // Doubled quote is an escaped quote
                        if chars.peek() == Some(&c) {
                            chars.next();
                            continue;
                        }
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(SqlError::Unterminated);
                }
            }
            '[' => {
                flush(&mut current, &mut words);
                if !chars.by_ref().any(|nc| nc == ']') {
                    return Err(SqlError::Unterminated);
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                flush(&mut current, &mut words);
                for nc in chars.by_ref() {
                    if nc == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                flush(&mut current, &mut words);
                chars.next();
                let mut prev = '\0';
                for nc in chars.by_ref() {
                    if prev == '*' && nc == '/' {
                        break;
                    }
                    prev = nc;
                }
            }
            ';' => return Err(SqlError::MultipleStatements),
            c if c.is_alphanumeric() || c == '_' => current.push(c),
            _ => flush(&mut current, &mut words),
        }
    }
    flush(&mut current, &mut words);

    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_select() {
        let query = SqlQuery::parse("SELECT name FROM institutions WHERE state = 'MA';").unwrap();
        assert_eq!(query.as_str(), "SELECT name FROM institutions WHERE state = 'MA'");
    }

    #[test]
    fn test_fenced_select() {
        let query = SqlQuery::parse("```sql\nselect * from costs\n```").unwrap();
        assert_eq!(query.as_str(), "select * from costs");
    }

    #[test]
    fn test_multibyte_inline_fence_rejected() {
        assert!(SqlQuery::parse("```日本 graph```").is_err());
    }

    #[test]
    fn test_with_query_allowed() {
        let sql = "WITH ma AS (SELECT * FROM institutions WHERE state = 'MA') SELECT name FROM ma";
        assert!(SqlQuery::parse(sql).is_ok());
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(SqlQuery::parse("  ```sql\n```  "), Err(SqlError::Empty));
        assert_eq!(SqlQuery::parse(";"), Err(SqlError::Empty));
    }

    #[test]
    fn test_writes_rejected() {
        assert_eq!(
            SqlQuery::parse("DELETE FROM institutions"),
            Err(SqlError::NotReadOnly("DELETE".into()))
        );
        assert_eq!(
            SqlQuery::parse("WITH x AS (SELECT 1) INSERT INTO t SELECT * FROM x"),
            Err(SqlError::NotReadOnly("INSERT".into()))
        );
        assert!(SqlQuery::parse("PRAGMA table_info(institutions)").is_err());
    }

    #[test]
    fn test_multiple_statements_rejected() {
        assert_eq!(
            SqlQuery::parse("SELECT 1; DROP TABLE institutions"),
            Err(SqlError::MultipleStatements)
        );
    }

    #[test]
    fn test_keywords_inside_literals_ignored() {
        let sql = "SELECT name FROM institutions WHERE motto = 'Delete; nothing' -- drop later";
        assert!(SqlQuery::parse(sql).is_ok());

        let sql = "SELECT \"update\" FROM [create] WHERE note = 'it''s fine'";
        assert!(SqlQuery::parse(sql).is_ok());
    }

    #[test]
    fn test_unterminated_literal() {
        assert_eq!(SqlQuery::parse("SELECT 'oops"), Err(SqlError::Unterminated));
    }
}
