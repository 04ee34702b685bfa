//! Rewrites `?` placeholders into a backend's native positional syntax.
//!
//! Markers inside single-quoted literals, double-quoted identifiers, `--` line
//! comments and `/* */` block comments are left alone. Postgres dollar-quoted
//! bodies (`$$ ... $$`) are not recognised, so a `?` inside one is rewritten.

use crate::BackendError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `?1, ?2, ...`
    Sqlite,
    /// `$1, $2, ...`
    Postgres,
}

impl Dialect {
    fn marker(self, position: usize) -> String {
        match self {
            Self::Sqlite => format!("?{position}"),
            Self::Postgres => format!("${position}"),
        }
    }
}

/// A query ready for the backend, with its parameters in their original order.
#[derive(Debug, Clone, PartialEq)]
pub struct Translated<P> {
    pub sql: String,
    pub params: Vec<P>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Lex {
    Code,
    Literal,
    Identifier,
    LineComment,
    BlockComment,
}

/// Numbers each bare `?` left to right. The placeholder count must equal
/// `params.len()`.
pub fn translate<P>(
    dialect: Dialect,
    template: &str,
    params: Vec<P>,
) -> Result<Translated<P>, BackendError> {
    let mut sql = String::with_capacity(template.len() + params.len() * 2);
    let mut placeholders = 0;
    let mut state = Lex::Code;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            Lex::Code => match c {
                '?' => {
                    placeholders += 1;
                    sql.push_str(&dialect.marker(placeholders));
                    continue;
                }
                '\'' => state = Lex::Literal,
                '"' => state = Lex::Identifier,
                '-' if chars.peek() == Some(&'-') => state = Lex::LineComment,
                '/' if chars.peek() == Some(&'*') => {
                    sql.push(c);
                    sql.extend(chars.next());
                    state = Lex::BlockComment;
                    continue;
                }
                _ => {}
            },
            // a doubled quote closes and immediately reopens, which is the escape
            Lex::Literal if c == '\'' => state = Lex::Code,
            Lex::Identifier if c == '"' => state = Lex::Code,
            Lex::LineComment if c == '\n' => state = Lex::Code,
            Lex::BlockComment if c == '*' && chars.peek() == Some(&'/') => {
                sql.push(c);
                sql.extend(chars.next());
                state = Lex::Code;
                continue;
            }
            _ => {}
        }
        sql.push(c);
    }

    if placeholders != params.len() {
        return Err(BackendError::ParamCount {
            placeholders,
            params: params.len(),
        });
    }

    Ok(Translated { sql, params })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_markers_in_order() {
        let t = translate(Dialect::Postgres, "WHERE a=? AND b=?", vec![1, 2]).unwrap();
        assert_eq!(t.sql, "WHERE a=$1 AND b=$2");
        assert_eq!(t.params, vec![1, 2]);

        let t = translate(Dialect::Sqlite, "WHERE a=? AND b=?", vec![1, 2]).unwrap();
        assert_eq!(t.sql, "WHERE a=?1 AND b=?2");
        assert_eq!(t.params, vec![1, 2]);
    }

    #[test]
    fn leaves_quoted_markers_alone() {
        let t = translate(
            Dialect::Postgres,
            "SELECT '?', \"col?\" FROM t WHERE code = ? AND note = 'it''s ?'",
            vec!["x"],
        )
        .unwrap();
        assert_eq!(
            t.sql,
            "SELECT '?', \"col?\" FROM t WHERE code = $1 AND note = 'it''s ?'"
        );
    }

    #[test]
    fn leaves_commented_markers_alone() {
        let t = translate(
            Dialect::Sqlite,
            "SELECT 1 -- why?\nFROM t /* really? */ WHERE id = ?",
            vec![7],
        )
        .unwrap();
        assert_eq!(t.sql, "SELECT 1 -- why?\nFROM t /* really? */ WHERE id = ?1");
    }

    #[test]
    fn single_dash_and_slash_are_code() {
        let t = translate(Dialect::Postgres, "SELECT 4 - ? / ?", vec![1, 2]).unwrap();
        assert_eq!(t.sql, "SELECT 4 - $1 / $2");
    }

    #[test]
    fn count_mismatch_is_rejected() {
        let err = translate(Dialect::Postgres, "WHERE a=? AND b=?", vec![1]).unwrap_err();
        assert!(matches!(
            err,
            BackendError::ParamCount {
                placeholders: 2,
                params: 1
            }
        ));
    }

    #[test]
    fn no_markers_no_params() {
        let t = translate::<i64>(Dialect::Sqlite, "SELECT 1", vec![]).unwrap();
        assert_eq!(t.sql, "SELECT 1");
        assert!(t.params.is_empty());
    }
}
