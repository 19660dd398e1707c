//! Post-processing of raw element text.

use crate::rules::{FieldValue, PostProcess};

/// Literal suffix on review revisit markers, as in `"3번째 방문"`.
pub const VISIT_SUFFIX: &str = "번째 방문";

/// Apply `post` to a raw element value.
#[must_use]
pub fn apply(post: PostProcess, raw: &str) -> FieldValue {
    match post {
        PostProcess::Trim => FieldValue::Text(raw.trim().to_owned()),
        PostProcess::VisitCount => parse_visit_count(raw),
    }
}

/// Read `"N번째 방문"` as `Count(N)`.
///
/// Text without the suffix, or whose prefix is not an integer, is returned
/// trimmed and otherwise unchanged. Empty input yields empty text.
#[must_use]
pub fn parse_visit_count(raw: &str) -> FieldValue {
    let trimmed = raw.trim();
    if trimmed.contains(VISIT_SUFFIX) {
        if let Ok(n) = trimmed.replace(VISIT_SUFFIX, "").trim().parse::<u32>() {
            return FieldValue::Count(n);
        }
    }
    FieldValue::Text(trimmed.to_owned())
}

/// Combine an item label with its optional qualifier: `"주차 (무료)"`.
#[must_use]
pub fn combine_label(primary: &str, secondary: Option<&str>) -> String {
    let primary = primary.trim();
    match secondary.map(str::trim).filter(|s| !s.is_empty()) {
        Some(secondary) => format!("{primary} ({secondary})").trim().to_owned(),
        None => primary.to_owned(),
    }
}
