//! Field extraction from a fully expanded page.
//!
//! Lists are walked container by container with every rule scoped to the
//! container's subtree. A container whose fields all come back empty is
//! dropped, and a container whose lookups fail is logged and skipped so one
//! broken item never costs the rest of the list.

use std::time::Duration;

use placescrape_core::{MenuRecord, ReviewRecord, RevisitValue};

use crate::error::ScraperError;
use crate::page::PageSession;
use crate::parse;
use crate::rules::{FieldRule, FieldValue, LabelListRule, PopupReveal, PostProcess, Record, Source};
use crate::selectors::{menu_fields, review_fields};

#[derive(Debug, Clone, Copy)]
pub struct RecordExtractor {
    wait_timeout: Duration,
}

impl RecordExtractor {
    /// `wait_timeout` bounds the waits in popup-reveal rules.
    #[must_use]
    pub fn new(wait_timeout: Duration) -> Self {
        Self { wait_timeout }
    }

    /// Evaluate every rule against the whole page. Every field is present in
    /// the result; a field whose lookup fails is logged and left empty.
    pub async fn extract_singleton<P: PageSession>(&self, page: &P, rules: &[FieldRule]) -> Record {
        let mut record = Record::default();
        for rule in rules {
            let value = match self.resolve(page, None, rule).await {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(field = rule.field, error = %e, "field lookup failed; recording empty value");
                    FieldValue::default()
                }
            };
            record.push(rule.field, value);
        }
        record
    }

    /// One record per container matching `container_selector`, in document
    /// order.
    ///
    /// # Errors
    ///
    /// Returns an error only if the containers themselves cannot be listed.
    pub async fn extract_list<P: PageSession>(
        &self,
        page: &P,
        container_selector: &str,
        rules: &[FieldRule],
    ) -> Result<Vec<Record>, ScraperError> {
        let containers = page.find(container_selector).await?;
        let mut records = Vec::with_capacity(containers.len());

        for (index, container) in containers.iter().enumerate() {
            match self.extract_container(page, container, rules).await {
                Ok(record) if record.has_any_value() => records.push(record),
                Ok(_) => {
                    tracing::debug!(container_selector, index, "skipping container with no values");
                }
                Err(e) => {
                    tracing::warn!(container_selector, index, error = %e, "skipping item that failed extraction");
                }
            }
        }

        tracing::debug!(
            container_selector,
            containers = containers.len(),
            records = records.len(),
            "list extraction finished"
        );
        Ok(records)
    }

    /// Fold labelled items into a single separated string, e.g.
    /// `"주차 (무료), 포장"`. Items that fail or come back empty are left out.
    pub async fn extract_label_list<P: PageSession>(&self, page: &P, rule: &LabelListRule) -> String {
        let items = match page.find(rule.item).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(field = rule.field, error = %e, "label list lookup failed");
                return String::new();
            }
        };

        let mut labels = Vec::with_capacity(items.len());
        for item in &items {
            let primary = first_text(page, Some(item), rule.primary)
                .await
                .unwrap_or_else(|e| {
                    tracing::debug!(field = rule.field, error = %e, "label lookup failed");
                    None
                })
                .unwrap_or_default();
            let secondary = first_text(page, Some(item), rule.secondary)
                .await
                .unwrap_or_else(|e| {
                    tracing::debug!(field = rule.field, error = %e, "qualifier lookup failed");
                    None
                });

            let label = parse::combine_label(&primary, secondary.as_deref());
            if !label.is_empty() {
                labels.push(label);
            }
        }
        labels.join(rule.separator)
    }

    async fn extract_container<P: PageSession>(
        &self,
        page: &P,
        container: &P::Element,
        rules: &[FieldRule],
    ) -> Result<Record, ScraperError> {
        let mut record = Record::default();
        for rule in rules {
            let value = self.resolve(page, Some(container), rule).await?;
            record.push(rule.field, value);
        }
        Ok(record)
    }

    /// Resolve one rule within `scope` (the whole page when `None`).
    ///
    /// The first selector whose indexed match has a non-blank raw value
    /// wins; later selectors are never queried. A popup reveal is attempted
    /// only at page scope and only when every selector came back empty.
    ///
    /// # Errors
    ///
    /// Propagates session failures from element lookups and reads.
    pub async fn resolve<P: PageSession>(
        &self,
        page: &P,
        scope: Option<&P::Element>,
        rule: &FieldRule,
    ) -> Result<FieldValue, ScraperError> {
        for selector in rule.selectors() {
            let matches = query(page, scope, selector.css).await?;
            let Some(element) = matches.get(selector.nth) else {
                continue;
            };
            let raw = raw_value(page, element, rule.source).await?;
            if raw.trim().is_empty() {
                continue;
            }
            return Ok(parse::apply(rule.post, &raw));
        }

        match (rule.reveal, scope) {
            (Some(reveal), None) => Ok(self.reveal_and_read(page, rule.field, reveal, rule.post).await),
            _ => Ok(FieldValue::default()),
        }
    }

    /// Click the popup trigger, then read the revealed element. Any step
    /// that times out or fails ends with an empty value.
    async fn reveal_and_read<P: PageSession>(
        &self,
        page: &P,
        field: &'static str,
        reveal: PopupReveal,
        post: PostProcess,
    ) -> FieldValue {
        match page.find(reveal.trigger).await {
            Ok(triggers) if !triggers.is_empty() => {}
            Ok(_) => return FieldValue::default(),
            Err(e) => {
                tracing::warn!(field, error = %e, "popup trigger lookup failed");
                return FieldValue::default();
            }
        }

        match page.wait_until_clickable(reveal.trigger, self.wait_timeout).await {
            Ok(Some(trigger)) => {
                if let Err(e) = page.click_via_script(&trigger).await {
                    tracing::warn!(field, error = %e, "popup trigger click failed");
                }
            }
            Ok(None) => tracing::warn!(field, "popup trigger never became clickable"),
            Err(e) => tracing::warn!(field, error = %e, "waiting for popup trigger failed"),
        }

        match page.wait_until_visible(reveal.target, self.wait_timeout).await {
            Ok(Some(target)) => match page.text(&target).await {
                Ok(raw) => parse::apply(post, &raw),
                Err(e) => {
                    tracing::warn!(field, error = %e, "reading revealed value failed");
                    FieldValue::default()
                }
            },
            Ok(None) => {
                tracing::warn!(field, "revealed value never became visible");
                FieldValue::default()
            }
            Err(e) => {
                tracing::warn!(field, error = %e, "waiting for revealed value failed");
                FieldValue::default()
            }
        }
    }
}

async fn query<P: PageSession>(
    page: &P,
    scope: Option<&P::Element>,
    css: &str,
) -> Result<Vec<P::Element>, ScraperError> {
    match scope {
        Some(element) => page.find_within(element, css).await,
        None => page.find(css).await,
    }
}

async fn raw_value<P: PageSession>(
    page: &P,
    element: &P::Element,
    source: Source,
) -> Result<String, ScraperError> {
    match source {
        Source::Text => page.text(element).await,
        Source::Attribute(name) => Ok(page.attribute(element, name).await?.unwrap_or_default()),
    }
}

async fn first_text<P: PageSession>(
    page: &P,
    scope: Option<&P::Element>,
    css: &str,
) -> Result<Option<String>, ScraperError> {
    let matches = query(page, scope, css).await?;
    match matches.first() {
        Some(element) => Ok(Some(page.text(element).await?.trim().to_owned())),
        None => Ok(None),
    }
}

#[must_use]
pub fn to_menu_record(record: &Record) -> MenuRecord {
    MenuRecord {
        name: record.text(menu_fields::NAME),
        price: record.text(menu_fields::PRICE),
        description: record.text(menu_fields::DESCRIPTION),
        recommendation: record.text(menu_fields::RECOMMENDATION),
    }
}

#[must_use]
pub fn to_review_record(record: &Record) -> ReviewRecord {
    let revisit = match record.get(review_fields::REVISIT) {
        Some(FieldValue::Count(n)) => RevisitValue::Count(*n),
        Some(FieldValue::Text(raw)) => RevisitValue::Raw(raw.clone()),
        None => RevisitValue::default(),
    };
    ReviewRecord {
        content: record.text(review_fields::CONTENT),
        date: record.text(review_fields::DATE),
        revisit,
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
