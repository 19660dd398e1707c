//! Store list loading.
//!
//! The input is a delimited text file with a header row. One column holds
//! store identifiers; other columns are ignored. An identifier cell may be a
//! bare numeric id or a Naver place URL that embeds one.

use std::collections::HashSet;
use std::mem::take;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::ConfigError;

static PLACE_HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:m\.place|pcmap\.place|map|store)\.naver\.com(?:[/?#]|$)")
        .expect("valid place host regex")
});

static PLACE_ID_QUERY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[?&](?:id|placeId)=(\d{4,})(?:[&#]|$)").expect("valid place id query regex")
});

/// A numeric segment directly after a place-type segment, e.g.
/// `/restaurant/1234567` or `/place/1234567`. Search terms in other
/// segments never match.
static PLACE_ID_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"/(?:place|restaurant|cafe|hairshop|nailshop|hospital|accommodation)/(\d{4,})(?:[/?#&]|$)",
    )
    .expect("valid place id path regex")
});

/// One store to scrape. The identifier is opaque apart from being used to
/// build the per-store view URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StoreTarget {
    pub id: String,
}

impl StoreTarget {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Parse an identifier cell.
    ///
    /// Returns `None` when `raw` looks like a URL but no store id can be
    /// recovered from it. Blank input is also `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if raw.starts_with("http://") || raw.starts_with("https://") {
            return store_id_from_url(raw).map(Self::new);
        }

        // Spreadsheet exports sometimes write integer ids as floats.
        let id = match raw.strip_suffix(".0") {
            Some(int) if !int.is_empty() && int.bytes().all(|b| b.is_ascii_digit()) => int,
            _ => raw,
        };
        Some(Self::new(id))
    }
}

impl std::fmt::Display for StoreTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// Returns `true` for URLs on one of the Naver place hosts.
#[must_use]
pub fn is_place_url(url: &str) -> bool {
    PLACE_HOST_RE.is_match(url.trim())
}

/// Extract the numeric store id from a Naver place URL.
///
/// An `id`/`placeId` query parameter wins; otherwise the last numeric
/// segment that follows a place-type segment is used.
#[must_use]
pub fn store_id_from_url(url: &str) -> Option<String> {
    let url = url.trim();
    if !is_place_url(url) {
        return None;
    }
    let capture = |re: &Regex| -> Option<String> {
        re.captures_iter(url)
            .last()
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_owned())
    };
    capture(&PLACE_ID_QUERY_RE).or_else(|| capture(&PLACE_ID_PATH_RE))
}

/// Load store targets from a delimited file.
///
/// Tabs separate fields in `.tsv` files; commas everywhere else. Blank
/// identifier cells are skipped and repeated identifiers are kept once, in
/// first-seen order. A URL cell with no recognisable store id is logged and
/// skipped.
///
/// # Errors
///
/// - [`ConfigError::InputMissing`] if `path` does not exist.
/// - [`ConfigError::InputIo`] if the file cannot be read.
/// - [`ConfigError::MissingColumn`] if the header has no `id_column`.
pub fn load_store_targets(path: &Path, id_column: &str) -> Result<Vec<StoreTarget>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::InputMissing {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::InputIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sep = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => '\t',
        _ => ',',
    };

    parse_store_targets(&content, sep, id_column).map_err(|err| match err {
        ConfigError::MissingColumn { column, .. } => ConfigError::MissingColumn {
            column,
            path: path.display().to_string(),
        },
        other => other,
    })
}

fn parse_store_targets(
    content: &str,
    sep: char,
    id_column: &str,
) -> Result<Vec<StoreTarget>, ConfigError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut rows = parse_rows(content, sep).into_iter();

    let header = rows.next().unwrap_or_default();
    let wanted = id_column.trim();
    let column = header
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(wanted))
        .ok_or_else(|| ConfigError::MissingColumn {
            column: wanted.to_owned(),
            path: String::new(),
        })?;

    let mut seen = HashSet::new();
    let mut targets = Vec::new();

    // Header is line 1.
    for (index, row) in rows.enumerate() {
        let Some(cell) = row.get(column) else {
            continue;
        };
        if cell.trim().is_empty() {
            continue;
        }
        let Some(target) = StoreTarget::parse(cell) else {
            tracing::warn!(
                line = index + 2,
                value = cell.trim(),
                "skipping row: not a store id or a recognised place URL"
            );
            continue;
        };
        if seen.insert(target.id.clone()) {
            targets.push(target);
        }
    }

    Ok(targets)
}

/// Minimal delimited-text parser: quoted fields, doubled-quote escapes,
/// CRLF line endings. Blank lines are dropped.
fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == sep && !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                push_row(&mut rows, take(&mut row));
            }
            _ => field.push(ch),
        }
    }

    // Unterminated quotes still flush the trailing row.
    row.push(field);
    push_row(&mut rows, row);

    rows
}

fn push_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    if !(row.len() == 1 && row[0].trim().is_empty()) {
        rows.push(row);
    }
}

#[cfg(test)]
#[path = "stores_test.rs"]
mod tests;
