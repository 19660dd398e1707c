//! Declarative field rules.
//!
//! A [`FieldRule`] names one output field and says where its value comes
//! from: a primary selector, an ordered fallback chain, which part of the
//! matched element to read, and how to post-process it. Rules are data so
//! the site-specific tables in [`crate::selectors`] stay free of control flow.

/// A CSS selector plus the index of the match to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    pub css: &'static str,
    pub nth: usize,
}

impl Selector {
    #[must_use]
    pub const fn first(css: &'static str) -> Self {
        Self { css, nth: 0 }
    }

    #[must_use]
    pub const fn nth(css: &'static str, nth: usize) -> Self {
        Self { css, nth }
    }
}

/// Which part of a matched element supplies the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Text,
    Attribute(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcess {
    /// Trim surrounding whitespace.
    Trim,
    /// Trim, then read `"N번째 방문"` as the integer `N`; other text is kept.
    VisitCount,
}

/// A control that must be clicked before a value becomes readable, e.g. a
/// "show phone number" button that opens a popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupReveal {
    pub trigger: &'static str,
    pub target: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub primary: Selector,
    pub fallbacks: &'static [Selector],
    pub source: Source,
    pub post: PostProcess,
    /// Tried only after every selector came back empty.
    pub reveal: Option<PopupReveal>,
}

impl FieldRule {
    /// Trimmed text of the first element matching `css`.
    #[must_use]
    pub const fn text(field: &'static str, css: &'static str) -> Self {
        Self {
            field,
            primary: Selector::first(css),
            fallbacks: &[],
            source: Source::Text,
            post: PostProcess::Trim,
            reveal: None,
        }
    }

    #[must_use]
    pub const fn with_primary(mut self, primary: Selector) -> Self {
        self.primary = primary;
        self
    }

    #[must_use]
    pub const fn with_fallbacks(mut self, fallbacks: &'static [Selector]) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    #[must_use]
    pub const fn with_attribute(mut self, name: &'static str) -> Self {
        self.source = Source::Attribute(name);
        self
    }

    #[must_use]
    pub const fn with_post(mut self, post: PostProcess) -> Self {
        self.post = post;
        self
    }

    #[must_use]
    pub const fn with_reveal(mut self, trigger: &'static str, target: &'static str) -> Self {
        self.reveal = Some(PopupReveal { trigger, target });
        self
    }

    /// Primary selector followed by the fallback chain.
    pub fn selectors(&self) -> impl Iterator<Item = &Selector> {
        std::iter::once(&self.primary).chain(self.fallbacks.iter())
    }
}

/// A list of labelled items folded into one field, e.g. amenities where each
/// item has a visible label and an optional visually-hidden qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelListRule {
    pub field: &'static str,
    pub item: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
    pub separator: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Count(u32),
}

impl FieldValue {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }

    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Count(n) => n.to_string(),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// Field values from one container (or the page, for singletons), in rule
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(&'static str, FieldValue)>,
}

impl Record {
    pub fn push(&mut self, field: &'static str, value: FieldValue) {
        self.fields.push((field, value));
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    /// Text of `field`, empty when absent. Counts are rendered as digits.
    #[must_use]
    pub fn text(&self, field: &str) -> String {
        self.get(field).cloned().map(FieldValue::into_text).unwrap_or_default()
    }

    #[must_use]
    pub fn has_any_value(&self) -> bool {
        self.fields.iter().any(|(_, value)| !value.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    pub fn into_fields(self) -> impl Iterator<Item = (&'static str, FieldValue)> {
        self.fields.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_every_part() {
        const FALLBACKS: &[Selector] = &[Selector::first("div.b")];
        const RULE: FieldRule = FieldRule::text("price", "div.a em")
            .with_fallbacks(FALLBACKS)
            .with_attribute("href")
            .with_post(PostProcess::VisitCount)
            .with_reveal("a.open", "div.popup em");
        assert_eq!(RULE.primary, Selector::first("div.a em"));
        assert_eq!(RULE.source, Source::Attribute("href"));
        assert_eq!(RULE.post, PostProcess::VisitCount);
        assert_eq!(
            RULE.reveal,
            Some(PopupReveal {
                trigger: "a.open",
                target: "div.popup em"
            })
        );
        let chain: Vec<_> = RULE.selectors().map(|s| s.css).collect();
        assert_eq!(chain, vec!["div.a em", "div.b"]);
    }

    #[test]
    fn record_with_only_empty_text_has_no_value() {
        let mut record = Record::default();
        record.push("a", FieldValue::default());
        record.push("b", FieldValue::Text(String::new()));
        assert!(!record.has_any_value());
        record.push("c", FieldValue::Count(0));
        assert!(record.has_any_value());
    }

    #[test]
    fn record_text_renders_counts() {
        let mut record = Record::default();
        record.push("revisit", FieldValue::Count(3));
        assert_eq!(record.text("revisit"), "3");
        assert_eq!(record.text("missing"), "");
    }
}
