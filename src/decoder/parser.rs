//! RFC 4512 description grammar.
//!
//! Turns a description such as `( 2.5.4.3 NAME ( 'cn' 'commonName' ) SUP name )` into a
//! [`RawDescription`]: the leading numeric OID plus keyword/value pairs. Which keywords
//! are legal, and which of them are bare flags, is decided by the caller per kind.

use crate::error::{SchemaError, SchemaResult};
use crate::oid::is_oid;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Dollar,
    Quoted(String),
    Word(String),
}

fn tokenize(raw: &str) -> SchemaResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            '$' => tokens.push(Token::Dollar),
            '\'' => {
                let mut quoted = String::new();
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some('\\') => {
                            let hex: String = chars.by_ref().take(2).collect();
                            let byte = u8::from_str_radix(&hex, 16)
                                .ok()
                                .filter(u8::is_ascii)
                                .ok_or_else(|| {
                                    SchemaError::invalid_syntax(
                                        format!("bad escape '\\{}' in quoted string", hex),
                                        raw,
                                    )
                                })?;
                            quoted.push(char::from(byte));
                        }
                        Some(ch) => quoted.push(ch),
                        None => {
                            return Err(SchemaError::invalid_syntax(
                                "unterminated quoted string",
                                raw,
                            ));
                        }
                    }
                }
                tokens.push(Token::Quoted(quoted));
            }
            c => {
                let mut word = c.to_string();
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() || matches!(next, '(' | ')' | '$' | '\'') {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }
    Ok(tokens)
}

/// A parsed description: the OID and its keyword fields in order of appearance.
///
/// Keywords are stored upper-cased. Flags carry no values.
#[derive(Debug, Clone)]
pub struct RawDescription {
    raw: String,
    oid: String,
    fields: Vec<(String, Vec<String>)>,
}

impl RawDescription {
    /// Parse `raw`, accepting the keywords in `allowed` (of which `flags` take no value)
    /// plus any `X-` extension.
    pub fn parse(raw: &str, allowed: &[&str], flags: &[&str]) -> SchemaResult<Self> {
        let error = |message: &str| SchemaError::invalid_syntax(message, raw);
        let tokens = tokenize(raw)?;
        let mut tokens = tokens.into_iter().peekable();

        if tokens.next() != Some(Token::Open) {
            return Err(error("description must start with '('"));
        }
        let oid = match tokens.next() {
            Some(Token::Word(word)) if is_oid(&word) => word,
            _ => return Err(error("missing OID")),
        };

        let mut fields: Vec<(String, Vec<String>)> = Vec::new();
        loop {
            let keyword = match tokens.next() {
                Some(Token::Close) => break,
                Some(Token::Word(word)) => word.to_ascii_uppercase(),
                Some(_) => return Err(error("expected a keyword")),
                None => return Err(error("missing closing ')'")),
            };
            let is_extension = keyword.starts_with("X-");
            if !is_extension && !allowed.contains(&keyword.as_str()) {
                return Err(error(&format!("unknown keyword {}", keyword)));
            }
            if fields.iter().any(|(existing, _)| *existing == keyword) {
                return Err(error(&format!("duplicate keyword {}", keyword)));
            }
            if flags.contains(&keyword.as_str()) {
                fields.push((keyword, Vec::new()));
                continue;
            }

            let values = match tokens.next() {
                Some(Token::Quoted(value)) | Some(Token::Word(value)) => vec![value],
                Some(Token::Open) => {
                    let mut values = Vec::new();
                    loop {
                        match tokens.next() {
                            Some(Token::Close) => break,
                            Some(Token::Dollar) => {}
                            Some(Token::Quoted(value)) | Some(Token::Word(value)) => {
                                values.push(value)
                            }
                            Some(Token::Open) => return Err(error("nested list")),
                            None => return Err(error("unterminated list")),
                        }
                    }
                    if values.is_empty() {
                        return Err(error(&format!("empty list for {}", keyword)));
                    }
                    values
                }
                _ => return Err(error(&format!("missing value for {}", keyword))),
            };
            fields.push((keyword, values));
        }

        if tokens.next().is_some() {
            return Err(error("trailing text after closing ')'"));
        }
        Ok(Self {
            raw: raw.to_string(),
            oid,
            fields,
        })
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn flag(&self, keyword: &str) -> bool {
        self.values(keyword).is_some()
    }

    /// All values of a keyword; empty if absent.
    pub fn list(&self, keyword: &str) -> Vec<String> {
        self.values(keyword).map(<[String]>::to_vec).unwrap_or_default()
    }

    /// The value of a single-valued keyword.
    pub fn single(&self, keyword: &str) -> SchemaResult<Option<String>> {
        match self.values(keyword) {
            None => Ok(None),
            Some([value]) => Ok(Some(value.clone())),
            Some(_) => Err(self.error(format!("{} takes a single value", keyword))),
        }
    }

    pub fn required(&self, keyword: &str) -> SchemaResult<String> {
        self.single(keyword)?
            .ok_or_else(|| self.error(format!("missing required {}", keyword)))
    }

    pub fn required_list(&self, keyword: &str) -> SchemaResult<Vec<String>> {
        let values = self.list(keyword);
        if values.is_empty() {
            return Err(self.error(format!("missing required {}", keyword)));
        }
        Ok(values)
    }

    /// First value of an `X-` extension.
    pub fn extension(&self, name: &str) -> Option<&str> {
        self.values(&name.to_ascii_uppercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn error(&self, message: impl Into<String>) -> SchemaError {
        SchemaError::invalid_syntax(message, self.raw.clone())
    }

    fn values(&self, keyword: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == keyword)
            .map(|(_, values)| values.as_slice())
    }
}
