//! Page window resolution for JSQL queries.
//!
//! A base query may already carry `limit` and `offset`. The embedded `offset`
//! becomes the session's base offset, and page offsets are counted from it;
//! the embedded `limit`, when present, replaces the default page size.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::JsqlQuery;
use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::PagingError;

/// Absolute window sent to the execution service for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    /// Rows requested.
    pub limit: u64,
    /// Absolute offset: `base_offset + page_offset`.
    pub offset: u64,
    /// Offset embedded in the base query, 0 if absent.
    pub base_offset: u64,
}

/// A base query rewritten for one page, together with its window.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedQuery {
    pub query: JsqlQuery,
    pub window: PageWindow,
}

/// Default page size used when a query carries no limit.
pub const fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

fn parse_non_negative_integer(value: &Value, field: &str) -> Result<u64, PagingError> {
    let Value::Number(number) = value else {
        return Err(PagingError::invalid_field(field));
    };

    if let Some(n) = number.as_u64() {
        return Ok(n);
    }

    // Integral floats such as `10.0` are accepted; negatives and fractions are not.
    match number.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f >= 0.0 && f <= u64::MAX as f64 => {
            Ok(f as u64)
        }
        _ => Err(PagingError::invalid_field(field)),
    }
}

fn read_optional_integer(query: &JsqlQuery, field: &str) -> Result<Option<u64>, PagingError> {
    match query.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse_non_negative_integer(value, field).map(Some),
    }
}

/// Resolve the window for `page_offset` and rewrite `query` with absolute
/// `limit`/`offset` values. The input query is left untouched.
pub fn with_paging(
    query: &JsqlQuery,
    page_size: u64,
    page_offset: u64,
) -> Result<PagedQuery, PagingError> {
    let embedded_limit = read_optional_integer(query, "limit")?;
    let embedded_offset = read_optional_integer(query, "offset")?;

    let limit = embedded_limit.unwrap_or(page_size);
    let base_offset = embedded_offset.unwrap_or(0);
    let offset = base_offset
        .checked_add(page_offset)
        .ok_or_else(|| PagingError::invalid_field("offset"))?;

    let mut paged = query.clone();
    paged.insert("limit", Value::from(limit));
    paged.insert("offset", Value::from(offset));

    Ok(PagedQuery {
        query: paged,
        window: PageWindow {
            limit,
            offset,
            base_offset,
        },
    })
}
