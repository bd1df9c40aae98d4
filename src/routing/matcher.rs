//! Route pattern matching logic.
//!
//! # Responsibilities
//! - Compile `:name` / `*` pattern strings into tokens
//! - Match a concrete request path against one compiled pattern
//! - Substitute bound parameters into content source identifiers
//!
//! # Design Decisions
//! - A named parameter binds one or more characters and never crosses `/`
//! - `*` binds the shortest run of characters (including `/`) that lets the
//!   rest of the pattern match, under the name `_`; one per pattern
//! - Whole-path match: a trailing slash is significant
//! - No regex: the token matcher only backtracks within a single pattern

use std::collections::BTreeMap;

use super::{RouteError, RouteResult};

/// Parameter bindings produced by a successful match.
pub type Params = BTreeMap<String, String>;

/// Name under which a `*` wildcard binds its value.
pub const WILDCARD_PARAM: &str = "_";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Param(String),
    Wildcard,
}

/// A compiled URL pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    tokens: Vec<Token>,
}

impl Pattern {
    /// Compile a pattern string.
    pub fn parse(source: &str) -> RouteResult<Self> {
        if !source.starts_with('/') {
            return Err(invalid(source, "pattern must start with '/'"));
        }

        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut names: Vec<String> = Vec::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            let token = match c {
                ':' => {
                    let mut name = String::new();
                    while let Some(&next) = chars.peek() {
                        if !is_name_char(next) {
                            break;
                        }
                        name.push(next);
                        chars.next();
                    }
                    if name.is_empty() {
                        return Err(invalid(source, "parameter name is empty"));
                    }
                    Token::Param(name)
                }
                '*' => Token::Wildcard,
                _ => {
                    literal.push(c);
                    continue;
                }
            };

            if literal.is_empty() && matches!(tokens.last(), Some(Token::Param(_) | Token::Wildcard)) {
                return Err(invalid(source, "parameters must be separated by literal text"));
            }
            let name = match &token {
                Token::Param(name) => name.clone(),
                _ => WILDCARD_PARAM.to_string(),
            };
            if names.contains(&name) {
                let reason = match token {
                    Token::Wildcard => "only one `*` is allowed per pattern".to_string(),
                    _ => format!("duplicate parameter `{name}`"),
                };
                return Err(invalid(source, &reason));
            }
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(token);
            names.push(name);
        }

        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            tokens,
        })
    }

    /// The pattern string as declared.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of the parameters this pattern binds, in order of appearance.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            Token::Param(name) => Some(name.as_str()),
            Token::Wildcard => Some(WILDCARD_PARAM),
            Token::Literal(_) => None,
        })
    }

    /// Match `path` against this pattern, returning the bound parameters.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let mut bindings = Vec::new();
        if match_tokens(&self.tokens, path, &mut bindings) {
            Some(bindings.into_iter().collect())
        } else {
            None
        }
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

fn match_tokens(tokens: &[Token], input: &str, bindings: &mut Vec<(String, String)>) -> bool {
    let Some((token, remaining)) = tokens.split_first() else {
        return input.is_empty();
    };

    match token {
        Token::Literal(text) => input
            .strip_prefix(text.as_str())
            .is_some_and(|rest| match_tokens(remaining, rest, bindings)),
        // Named segments are greedy, wildcards lazy.
        Token::Param(name) => {
            let segment_end = input.find('/').unwrap_or(input.len());
            try_bind(name, input, (1..=segment_end).rev(), remaining, bindings)
        }
        Token::Wildcard => try_bind(WILDCARD_PARAM, input, 0..=input.len(), remaining, bindings),
    }
}

/// Bind `name` to the first prefix of `input`, taking lengths from `ends` in
/// order, for which the remaining tokens also match.
fn try_bind(
    name: &str,
    input: &str,
    ends: impl Iterator<Item = usize>,
    remaining: &[Token],
    bindings: &mut Vec<(String, String)>,
) -> bool {
    for end in ends {
        if !input.is_char_boundary(end) {
            continue;
        }
        bindings.push((name.to_string(), input[..end].to_string()));
        if match_tokens(remaining, &input[end..], bindings) {
            return true;
        }
        bindings.pop();
    }
    false
}

/// Replace `:name` tokens in `template` with bound values.
///
/// Tokens naming an unbound parameter are left as-is, so identifiers without
/// tokens pass through unchanged.
pub fn substitute(template: &str, params: &Params) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != ':' {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        while let Some(&next) = chars.peek() {
            if !is_name_char(next) {
                break;
            }
            name.push(next);
            chars.next();
        }
        match params.get(&name) {
            Some(value) if !name.is_empty() => out.push_str(value),
            _ => {
                out.push(':');
                out.push_str(&name);
            }
        }
    }
    out
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn invalid(pattern: &str, reason: &str) -> RouteError {
    RouteError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    }
}
