//! Core rotation logic: override resolution, cursor read-modify-write and
//! the wraparound advance.
//!
//! The cursor lives in the external store and is never cached across
//! requests. Stored values are conceptually "the last 1-based index served";
//! the handler advances with `(cursor mod total) + 1`, which both wraps
//! out-of-range values and produces the next 1-based index.

use crate::catalog::Catalog;
use crate::config::Overrides;
use crate::errors::RotorError;
use crate::store::{CURSOR_KEY, CursorStore};
use serde::Serialize;

/// Per-request deviation from sequential advancement. Mutually exclusive;
/// resolution order is reset, then custom start, then continue.
#[derive(Debug, PartialEq, Eq)]
pub enum Directive {
    /// Treat the cursor as 0 so the next served index is 1
    Reset,
    /// Requested 1-based start position, still unclamped
    StartAt(i64),
    /// Advance from whatever the store holds
    Continue,
}

/// Resolves the override directive from startup configuration and the
/// request's query parameters.
///
/// Environment flags win over query parameters, and a configured
/// `START_INDEX` shadows the `start` query value even when it does not
/// parse (the query value is only consulted when the environment provides
/// no candidate at all).
pub fn resolve_directive(
    overrides: &Overrides,
    query_reset: Option<&str>,
    query_start: Option<&str>,
) -> Directive {
    if overrides.reset_index || overrides.restart_index || query_reset == Some("1") {
        return Directive::Reset;
    }

    let candidate = overrides
        .start_index
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(query_start);

    match candidate.and_then(parse_start) {
        Some(requested) => Directive::StartAt(requested),
        None => Directive::Continue,
    }
}

/// Leading-integer parse: optional sign, then digits, trailing garbage
/// ignored ("250abc" is 250, "25.7" is 25). A value with no leading integer
/// is treated as not provided.
fn parse_start(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let leading: &str = match digits.find(|c: char| !c.is_ascii_digit()) {
        Some(end) => &digits[..end],
        None => digits,
    };
    if leading.is_empty() {
        return None;
    }

    // Saturate instead of overflowing on absurdly long digit runs; the
    // clamp to [1, total] later makes the exact value irrelevant.
    match leading.parse::<i64>() {
        Ok(n) => Some(sign * n),
        Err(_) => Some(if sign < 0 { i64::MIN } else { i64::MAX }),
    }
}

/// Stored cursor values are written by this handler and always numeric, but
/// the key is not locked or scoped; anything unparseable falls back to 0.
fn parse_stored(raw: &str) -> i64 {
    parse_start(raw).unwrap_or(0)
}

/// The served rotation entry, in the external JSON field naming.
#[derive(Debug, Serialize, PartialEq)]
pub struct Rotation {
    #[serde(rename = "authorisedUserAgent")]
    pub authorised_user_agent: String,
    #[serde(rename = "indexReturned")]
    pub index_returned: i64,
    pub total: i64,
    pub updated: String,
    #[serde(rename = "browserChoice")]
    pub browser_choice: String,
    /// Advisory describing which override applied, if any
    #[serde(rename = "_note", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Serves one rotation step: read the cursor, apply the directive, advance
/// with wraparound, persist the served index and pick the catalog entry.
///
/// Store traffic per call is one read plus one write on the continue path,
/// or one read plus two writes when an override fires (the override branch
/// persists its pre-advance cursor before the advance write lands the final
/// value). Any store failure aborts the request; the computed index is
/// never served on a best-effort basis.
pub async fn rotate(
    store: &dyn CursorStore,
    catalog: &Catalog,
    directive: Directive,
) -> Result<Rotation, RotorError> {
    let total = catalog.total();
    if total == 0 {
        return Err(RotorError::EmptyCatalog);
    }

    let stored = store.get(CURSOR_KEY).await?;

    let (working, note) = match directive {
        Directive::Reset => {
            store.set(CURSOR_KEY, 0).await?;
            (0, Some("Index was reset to 1".to_string()))
        }
        Directive::StartAt(requested) => {
            let valid = requested.clamp(1, total);
            store.set(CURSOR_KEY, valid - 1).await?;
            // The note reports the requested value, not the clamped one.
            (valid - 1, Some(format!("Index was set to {requested}")))
        }
        Directive::Continue => {
            let cursor = stored.as_deref().map(parse_stored).unwrap_or(0);
            (cursor, None)
        }
    };

    // Euclidean remainder keeps the served index in [1, total] even if the
    // store ever holds a negative value.
    let served = working.rem_euclid(total) + 1;
    store.set(CURSOR_KEY, served).await?;

    let agent = catalog.agent(served).ok_or_else(|| {
        RotorError::InternalError(format!("served index {served} out of range 1..={total}"))
    })?;

    tracing::debug!(index = served, total, note = ?note, "rotation served");

    Ok(Rotation {
        authorised_user_agent: agent.to_string(),
        index_returned: served,
        total,
        updated: catalog.updated.clone(),
        browser_choice: catalog.browser_choice.clone(),
        note,
    })
}
