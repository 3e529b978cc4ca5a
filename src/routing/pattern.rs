//! Route pattern compilation.
//!
//! # Syntax
//! ```text
//! /items                        literal
//! /items/{id}                   one non-slash segment bound to `id`
//! /items/{id:\d+}               same, constrained by a regex
//! /clipart/{term}[/{page:\d+}]  optional trailing part (may nest)
//! ```
//!
//! # Design Decisions
//! - Optional parts are only allowed at the end of the pattern
//! - Each pattern expands into one anchored regex per alternative,
//!   longest alternative first
//! - Constraint regexes must not contain capturing groups
//! - `[`, `]` and `:` inside `{...}` belong to the parameter

use regex::Regex;

use crate::error::DispatchError;

/// Default constraint for a `{name}` placeholder.
const DEFAULT_SEGMENT: &str = "[^/]+";

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone)]
struct Alternative {
    regex: Regex,
    names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Param {
        name: String,
        constraint: Option<String>,
    },
}

impl PathPattern {
    /// Parse and compile a pattern string.
    pub fn parse(source: &str) -> Result<Self, DispatchError> {
        let invalid = |reason: &str| DispatchError::InvalidPattern {
            pattern: source.to_string(),
            reason: reason.to_string(),
        };

        let segments = split_optionals(source).map_err(|r| invalid(r))?;

        let mut alternatives = Vec::with_capacity(segments.len());
        let mut prefix = String::new();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 && segment.is_empty() {
                return Err(invalid("empty optional part"));
            }
            prefix.push_str(segment);
            let parts = parse_parts(&prefix).map_err(|r| invalid(&r))?;
            alternatives.push(compile(&parts).map_err(|r| invalid(&r))?);
        }
        alternatives.reverse();

        Ok(Self {
            source: source.to_string(),
            alternatives,
        })
    }

    /// The pattern as registered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match a decoded path, returning captured parameters in declaration order.
    ///
    /// Parameters of an omitted optional part are absent, not empty.
    pub fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
        self.alternatives.iter().find_map(|alt| {
            let caps = alt.regex.captures(path)?;
            Some(
                alt.names
                    .iter()
                    .enumerate()
                    .filter_map(|(i, name)| {
                        caps.get(i + 1)
                            .map(|m| (name.clone(), m.as_str().to_string()))
                    })
                    .collect(),
            )
        })
    }
}

/// Split at top-level `[`, dropping the trailing `]` run.
fn split_optionals(source: &str) -> Result<Vec<&str>, &'static str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut opened = 0usize;
    let mut closed = 0usize;
    let mut tail_start = None;

    for (idx, ch) in source.char_indices() {
        if closed > 0 && depth == 0 && ch != ']' {
            return Err("optional segments can only occur at the end of a route");
        }
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or("unbalanced `}` in route pattern")?;
            }
            '[' if depth == 0 => {
                segments.push(&source[start..idx]);
                start = idx + 1;
                opened += 1;
            }
            ']' if depth == 0 => {
                if closed == 0 {
                    tail_start = Some(idx);
                }
                closed += 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err("unterminated `{` in route pattern");
    }
    if opened != closed {
        return Err("number of opening `[` and closing `]` does not match");
    }

    let end = tail_start.unwrap_or(source.len());
    segments.push(&source[start..end]);
    Ok(segments)
}

/// Tokenize one alternative into literals and placeholders.
fn parse_parts(text: &str) -> Result<Vec<Part>, String> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = text.char_indices();

    while let Some((idx, ch)) = chars.next() {
        if ch != '{' {
            literal.push(ch);
            continue;
        }

        let mut depth = 1usize;
        let mut end = None;
        for (j, c) in chars.by_ref() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(j);
                        break;
                    }
                }
                _ => {}
            }
        }
        let end = end.ok_or_else(|| "unterminated `{` in route pattern".to_string())?;
        let body = &text[idx + 1..end];

        if !literal.is_empty() {
            parts.push(Part::Literal(std::mem::take(&mut literal)));
        }
        parts.push(parse_placeholder(body)?);
    }

    if !literal.is_empty() {
        parts.push(Part::Literal(literal));
    }
    Ok(parts)
}

fn parse_placeholder(body: &str) -> Result<Part, String> {
    let (name, constraint) = match body.split_once(':') {
        Some((name, constraint)) => (name.trim(), Some(constraint.trim())),
        None => (body.trim(), None),
    };

    let mut name_chars = name.chars();
    let valid_name = name_chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name_chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid_name {
        return Err(format!("invalid parameter name `{name}`"));
    }

    if let Some(constraint) = constraint {
        if constraint.is_empty() {
            return Err(format!("empty constraint for parameter `{name}`"));
        }
        let compiled = Regex::new(constraint)
            .map_err(|e| format!("invalid constraint for parameter `{name}`: {e}"))?;
        if compiled.captures_len() > 1 {
            return Err(format!(
                "constraint for parameter `{name}` contains a capturing group"
            ));
        }
    }

    Ok(Part::Param {
        name: name.to_string(),
        constraint: constraint.map(str::to_string),
    })
}

fn compile(parts: &[Part]) -> Result<Alternative, String> {
    let mut expr = String::from("^");
    let mut names: Vec<String> = Vec::new();

    for part in parts {
        match part {
            Part::Literal(text) => expr.push_str(&regex::escape(text)),
            Part::Param { name, constraint } => {
                if names.contains(name) {
                    return Err(format!("parameter `{name}` is declared twice"));
                }
                expr.push('(');
                expr.push_str(constraint.as_deref().unwrap_or(DEFAULT_SEGMENT));
                expr.push(')');
                names.push(name.clone());
            }
        }
    }
    expr.push('$');

    let regex = Regex::new(&expr).map_err(|e| e.to_string())?;
    Ok(Alternative { regex, names })
}
