//! Read-only statement policy
//!
//! Checked before anything reaches the database: the text must hold exactly
//! one statement, and that statement must have a read-only shape
//! (`SELECT ...` or `WITH ... SELECT ...`). Violations surface as structural
//! errors so a generator can be told what to fix.

use thiserror::Error;

/// Statement keywords that always indicate a write or a schema/session change
const FORBIDDEN_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "CREATE", "ALTER", "ATTACH", "DETACH", "PRAGMA",
    "VACUUM", "REINDEX",
];

/// Leading keywords of accepted statements
const READ_ONLY_LEADING: &[&str] = &["SELECT", "WITH"];

/// Why a statement was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    /// Nothing but whitespace or comments
    #[error("empty statement")]
    Empty,

    /// More than one statement in the text
    #[error(
        "only a single statement is allowed; combine lookups with JOIN, UNION or subqueries"
    )]
    MultipleStatements,

    /// A statement shape that could write or change the session
    #[error("only read-only SELECT/WITH statements are allowed (found `{keyword}`)")]
    NotReadOnly {
        /// Offending keyword, upper-cased
        keyword: String,
    },
}

/// Check `sql` against the read-only policy.
///
/// Returns the statement with surrounding whitespace and a trailing `;`
/// removed, ready to hand to the database.
pub fn check_statement(sql: &str) -> Result<String, PolicyViolation> {
    let original: Vec<char> = sql.chars().collect();
    let masked = mask_literals_and_comments(&original);

    if masked.iter().all(|c| c.is_whitespace()) {
        return Err(PolicyViolation::Empty);
    }

    let end = match masked.iter().position(|c| *c == ';') {
        Some(pos) => {
            let rest_is_empty = masked[pos + 1..]
                .iter()
                .all(|c| c.is_whitespace() || *c == ';');
            if !rest_is_empty {
                return Err(PolicyViolation::MultipleStatements);
            }
            pos
        }
        None => original.len(),
    };

    let words = keywords(&masked[..end]);
    let leading = words.first().ok_or(PolicyViolation::Empty)?;
    if !READ_ONLY_LEADING.contains(&leading.as_str()) {
        return Err(PolicyViolation::NotReadOnly {
            keyword: leading.clone(),
        });
    }

    for (index, word) in words.iter().enumerate() {
        if FORBIDDEN_KEYWORDS.contains(&word.as_str()) {
            return Err(PolicyViolation::NotReadOnly {
                keyword: word.clone(),
            });
        }
        // replace(x, y, z) is a scalar function; only REPLACE INTO writes
        if word == "REPLACE" && words.get(index + 1).map(String::as_str) == Some("INTO") {
            return Err(PolicyViolation::NotReadOnly {
                keyword: "REPLACE".to_string(),
            });
        }
    }

    let statement: String = original[..end].iter().collect();
    Ok(statement.trim().to_string())
}

/// Replace string literals, quoted identifiers and comments with spaces,
/// keeping a one-to-one character mapping with the input.
fn mask_literals_and_comments(chars: &[char]) -> Vec<char> {
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            '\'' | '"' | '`' | '[' => {
                let close = if c == '[' { ']' } else { c };
                out.push(' ');
                i += 1;
                while i < chars.len() {
                    if chars[i] == close {
                        // doubled quote is an escaped quote inside the literal
                        if close != ']' && chars.get(i + 1) == Some(&close) {
                            out.push(' ');
                            out.push(' ');
                            i += 2;
                            continue;
                        }
                        out.push(' ');
                        i += 1;
                        break;
                    }
                    out.push(' ');
                    i += 1;
                }
            }
            '-' if next == Some('-') => {
                while i < chars.len() && chars[i] != '\n' {
                    out.push(' ');
                    i += 1;
                }
            }
            '/' if next == Some('*') => {
                out.push(' ');
                out.push(' ');
                i += 2;
                while i < chars.len() {
                    if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                        out.push(' ');
                        out.push(' ');
                        i += 2;
                        break;
                    }
                    out.push(' ');
                    i += 1;
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

fn keywords(masked: &[char]) -> Vec<String> {
    let text: String = masked.iter().collect();
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_uppercase)
        .collect()
}
