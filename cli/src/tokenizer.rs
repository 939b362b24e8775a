//! Splits one input line into whitespace-separated command tokens,
//! honoring single/double quoted substrings so a value can contain spaces.
//! Grounded on the teacher's `cli::tokenizer`'s char-by-char quote-aware
//! scan, simplified since this protocol has no bound-parameter syntax (the
//! teacher's `?`-placeholder / typed-parameter machinery has no analog
//! here -- every token is sent as an opaque bulk string).

use crate::error::{CliError, CliResult};

pub fn tokenize(line: &str) -> CliResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '"' || c == '\'' {
            let quote = c;
            chars.next();
            let mut token = String::new();
            let mut terminated = false;
            while let Some(&c) = chars.peek() {
                chars.next();
                if c == '\\' {
                    match chars.next() {
                        Some(escaped) => token.push(escaped),
                        None => return Err(CliError::QueryError("string not terminated".into())),
                    }
                    continue;
                }
                if c == quote {
                    terminated = true;
                    break;
                }
                token.push(c);
            }
            if !terminated {
                return Err(CliError::QueryError("mismatched quotes".into()));
            }
            tokens.push(token);
        } else {
            let mut token = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
            tokens.push(token);
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(
            tokenize("set foo bar").unwrap(),
            vec!["set", "foo", "bar"]
        );
    }

    #[test]
    fn keeps_quoted_spaces_together() {
        assert_eq!(
            tokenize(r#"set foo "bar baz""#).unwrap(),
            vec!["set", "foo", "bar baz"]
        );
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        assert!(tokenize(r#"set foo "bar"#).is_err());
    }
}
