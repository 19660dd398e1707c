//! Records produced for a single store.
//!
//! A [`StoreOutputUnit`] is assembled once all three extractions for a
//! store have finished and is never mutated after it is handed to a sink.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Profile field names in the order they are collected and reported.
pub mod profile_fields {
    pub const NAME: &str = "name";
    pub const CATEGORY: &str = "category";
    pub const DESCRIPTION: &str = "description";
    pub const ADDRESS: &str = "address";
    pub const DIRECTIONS: &str = "directions";
    pub const PHONE: &str = "phone";
    pub const SOCIAL_LINK: &str = "social_link";
    pub const EXTRA_INFO: &str = "extra_info";
    pub const INTRODUCTION: &str = "introduction";
    pub const AMENITIES: &str = "amenities";
}

/// Singleton profile fields for one store, in insertion order.
///
/// Built incrementally across the home and information views. Every field
/// that was looked up is present, even when its value is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileRecord {
    fields: Vec<(String, String)>,
}

impl ProfileRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `field`, replacing an earlier value in place so the original
    /// position is kept.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((field, value)),
        }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// Store display name, empty when the page did not expose one.
    #[must_use]
    pub fn name(&self) -> &str {
        self.get(profile_fields::NAME).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for ProfileRecord {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (field, value) in iter {
            self.set(field, value);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MenuRecord {
    pub name: String,
    pub price: String,
    pub description: String,
    /// Badge text shown on recommended items (e.g. `"대표"`), empty otherwise.
    pub recommendation: String,
}

/// Revisit marker on a review.
///
/// `"3번째 방문"` parses to `Count(3)`. Any other text is kept verbatim in
/// `Raw`; an absent marker is `Raw("")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RevisitValue {
    Count(u32),
    Raw(String),
}

impl Default for RevisitValue {
    fn default() -> Self {
        Self::Raw(String::new())
    }
}

impl RevisitValue {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Raw(raw) if raw.is_empty())
    }
}

impl std::fmt::Display for RevisitValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewRecord {
    pub content: String,
    pub date: String,
    pub revisit: RevisitValue,
}

/// Why a reveal-more expansion stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Termination {
    /// The control disappeared or stopped being clickable; content is complete.
    Exhausted,
    /// The iteration cap was hit; the list is a prefix of the full dataset.
    Capped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpansionReport {
    pub iterations_performed: u32,
    pub terminated_by: Termination,
}

impl ExpansionReport {
    #[must_use]
    pub fn exhausted(iterations_performed: u32) -> Self {
        Self {
            iterations_performed,
            terminated_by: Termination::Exhausted,
        }
    }

    #[must_use]
    pub fn capped(iterations_performed: u32) -> Self {
        Self {
            iterations_performed,
            terminated_by: Termination::Capped,
        }
    }

    /// `true` when the records behind this expansion may be incomplete.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.terminated_by == Termination::Capped
    }
}

/// Everything captured for one store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreOutputUnit {
    pub store_id: String,
    pub captured_at: DateTime<Utc>,
    pub profile: ProfileRecord,
    pub menu: Vec<MenuRecord>,
    pub reviews: Vec<ReviewRecord>,
    pub menu_expansion: ExpansionReport,
    pub review_expansion: ExpansionReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_set_keeps_first_position_on_overwrite() {
        let mut profile = ProfileRecord::new();
        profile.set("name", "");
        profile.set("category", "한식");
        profile.set("name", "할매국밥");
        let fields: Vec<_> = profile.iter().collect();
        assert_eq!(fields, vec![("name", "할매국밥"), ("category", "한식")]);
    }

    #[test]
    fn profile_name_defaults_to_empty() {
        let profile = ProfileRecord::new();
        assert_eq!(profile.name(), "");
        assert!(profile.is_empty());
    }

    #[test]
    fn profile_extend_sets_each_pair() {
        let mut profile = ProfileRecord::new();
        profile.extend([("name", "A"), ("phone", "")]);
        assert_eq!(profile.len(), 2);
        assert_eq!(profile.get("phone"), Some(""));
        assert_eq!(profile.get("missing"), None);
    }

    #[test]
    fn revisit_serializes_count_as_number_and_raw_as_string() {
        assert_eq!(
            serde_json::to_value(RevisitValue::Count(3)).unwrap(),
            serde_json::json!(3)
        );
        assert_eq!(
            serde_json::to_value(RevisitValue::Raw("방문".to_owned())).unwrap(),
            serde_json::json!("방문")
        );
    }

    #[test]
    fn revisit_default_is_empty_raw() {
        assert!(RevisitValue::default().is_empty());
        assert!(!RevisitValue::Count(1).is_empty());
    }

    #[test]
    fn expansion_report_truncation_flag() {
        assert!(ExpansionReport::capped(50).is_truncated());
        assert!(!ExpansionReport::exhausted(3).is_truncated());
    }
}
