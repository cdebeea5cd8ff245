//! Path-query tokenizer.
//!
//! ```text
//! segment := tag
//!          | tag "[" INT "]"
//!          | tag "[@" ATTR "=" QUOTE VALUE QUOTE "]"
//!          | tag "[@" ATTR "=" QUOTE VALUE QUOTE "][" INT "]"
//!          | INT
//! ```
//!
//! Segments are separated by `/`. A single leading `/` is accepted.

use super::{QueryError, QueryErrorCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrFilter {
    pub attr: String,
    pub value: String,
}

/// One step of a path query. `tag == None` indexes the current list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryToken {
    pub tag: Option<String>,
    pub index: Option<usize>,
    pub filter: Option<AttrFilter>,
    /// The segment as written, used to report error paths.
    pub raw: String,
}

/// Split a query into tokens.
pub fn parse_query(query: &str, max_segments: usize) -> Result<Vec<QueryToken>, QueryError> {
    let trimmed = query.trim();
    let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
    if body.is_empty() {
        return Err(syntax(query, "empty query"));
    }

    let segments: Vec<&str> = body.split('/').collect();
    if segments.len() > max_segments {
        return Err(syntax(
            query,
            format!("query has {} segments (limit {max_segments})", segments.len()),
        ));
    }

    let mut tokens = Vec::with_capacity(segments.len());
    for (i, seg) in segments.iter().enumerate() {
        let prefix = segments[..=i].join("/");
        tokens.push(parse_segment(seg).map_err(|msg| syntax(&prefix, msg))?);
    }
    Ok(tokens)
}

fn syntax(path: &str, message: impl Into<String>) -> QueryError {
    QueryError::new(QueryErrorCode::Internal, path, message)
}

fn parse_segment(seg: &str) -> Result<QueryToken, String> {
    if seg.is_empty() {
        return Err("empty segment".to_string());
    }

    if seg.bytes().all(|b| b.is_ascii_digit()) {
        let index = seg
            .parse::<usize>()
            .map_err(|_| format!("index out of range: {seg}"))?;
        return Ok(QueryToken {
            tag: None,
            index: Some(index),
            filter: None,
            raw: seg.to_string(),
        });
    }

    let tag_end = seg.find('[').unwrap_or(seg.len());
    let tag = &seg[..tag_end];
    if tag.is_empty() || !tag.chars().all(is_name_char) {
        return Err(format!("invalid tag in segment '{seg}'"));
    }

    let mut rest = &seg[tag_end..];
    let mut filter = None;
    let mut index = None;

    if let Some(after) = rest.strip_prefix("[@") {
        let (f, tail) = parse_filter(after)
            .ok_or_else(|| format!("malformed attribute filter in '{seg}'"))?;
        filter = Some(f);
        rest = tail;
    }

    if let Some(after) = rest.strip_prefix('[') {
        let close = after
            .find(']')
            .ok_or_else(|| format!("unterminated index in '{seg}'"))?;
        let digits = &after[..close];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("index must be a non-negative integer in '{seg}'"));
        }
        index = Some(
            digits
                .parse::<usize>()
                .map_err(|_| format!("index out of range in '{seg}'"))?,
        );
        rest = &after[close + 1..];
    }

    if !rest.is_empty() {
        return Err(format!("unexpected trailing input '{rest}' in '{seg}'"));
    }

    Ok(QueryToken {
        tag: Some(tag.to_string()),
        index,
        filter,
        raw: seg.to_string(),
    })
}

/// Parse `ATTR=QUOTE VALUE QUOTE]` and return the remaining input.
fn parse_filter(s: &str) -> Option<(AttrFilter, &str)> {
    let eq = s.find('=')?;
    let attr = &s[..eq];
    if attr.is_empty() || !attr.chars().all(is_name_char) {
        return None;
    }

    let after_eq = &s[eq + 1..];
    let quote = after_eq.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let body = &after_eq[1..];
    let close = body.find(quote)?;
    let value = &body[..close];
    let tail = body[close + 1..].strip_prefix(']')?;

    Some((
        AttrFilter {
            attr: attr.to_string(),
            value: value.to_string(),
        },
        tail,
    ))
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}
