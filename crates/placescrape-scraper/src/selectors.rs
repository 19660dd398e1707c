//! CSS selector tables for Naver Place mobile pages.
//!
//! Class names on these pages are build-generated and change without
//! notice. When extraction starts coming back empty, capture the page,
//! update the selectors here, and extend the fixtures in the tests.

use placescrape_core::records::profile_fields;

use crate::rules::{FieldRule, LabelListRule, PostProcess, Selector};

/// "Show more" control at the bottom of the menu and review lists.
pub const REVEAL_MORE: &str = "a.fvwqf";

pub const MENU_CONTAINER: &str = "li.E2jtL";
pub const REVIEW_CONTAINER: &str = "li.place_apply_pui.EjjAW";

pub mod menu_fields {
    pub const NAME: &str = "name";
    pub const PRICE: &str = "price";
    pub const DESCRIPTION: &str = "description";
    pub const RECOMMENDATION: &str = "recommendation";
}

pub mod review_fields {
    pub const CONTENT: &str = "content";
    pub const DATE: &str = "date";
    pub const REVISIT: &str = "revisit";
}

/// Profile fields on the `/home` view.
pub const HOME_RULES: &[FieldRule] = &[
    FieldRule::text(profile_fields::NAME, "span.GHAhO"),
    FieldRule::text(profile_fields::CATEGORY, "span.lnJFt"),
    FieldRule::text(profile_fields::DESCRIPTION, "div.XtBbS"),
    FieldRule::text(profile_fields::ADDRESS, "span.LDgIH"),
    FieldRule::text(profile_fields::DIRECTIONS, "span.zPfVt"),
    // Some stores hide the number behind a button that opens a popup.
    FieldRule::text(profile_fields::PHONE, "span.xlx7Q").with_reveal("a.BfF3H", "div.J7eF_ em"),
    FieldRule::text(profile_fields::SOCIAL_LINK, "div.jO09N a").with_attribute("href"),
    FieldRule::text(profile_fields::EXTRA_INFO, "div.xPvPE"),
];

/// Profile fields on the `/information` view.
pub const INFORMATION_RULES: &[FieldRule] =
    &[FieldRule::text(profile_fields::INTRODUCTION, "div.T8RFa")];

pub const AMENITY_RULE: LabelListRule = LabelListRule {
    field: profile_fields::AMENITIES,
    item: "li.c7TR6",
    primary: "div.owG4q",
    secondary: "span.place_blind",
    separator: ", ",
};

const MENU_PRICE_FALLBACKS: &[Selector] = &[Selector::first("div.GXS1X")];

pub const MENU_RULES: &[FieldRule] = &[
    FieldRule::text(menu_fields::NAME, "span.lPzHi"),
    // Discounted items wrap the current price in <em>.
    FieldRule::text(menu_fields::PRICE, "div.GXS1X em").with_fallbacks(MENU_PRICE_FALLBACKS),
    FieldRule::text(menu_fields::DESCRIPTION, "div.kPogF"),
    FieldRule::text(menu_fields::RECOMMENDATION, "span.QM_zp span"),
];

pub const REVIEW_RULES: &[FieldRule] = &[
    FieldRule::text(review_fields::CONTENT, "div.pui__vn15t2"),
    FieldRule::text(review_fields::DATE, "span.pui__gfuUIT > time"),
    // The second meta span carries "N번째 방문".
    FieldRule::text(review_fields::REVISIT, "span.pui__gfuUIT")
        .with_primary(Selector::nth("span.pui__gfuUIT", 1))
        .with_post(PostProcess::VisitCount),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn assert_unique_fields(rules: &[FieldRule]) {
        let mut seen = HashSet::new();
        for rule in rules {
            assert!(seen.insert(rule.field), "duplicate field {}", rule.field);
        }
    }

    #[test]
    fn field_names_are_unique_per_table() {
        assert_unique_fields(HOME_RULES);
        assert_unique_fields(INFORMATION_RULES);
        assert_unique_fields(MENU_RULES);
        assert_unique_fields(REVIEW_RULES);
    }

    #[test]
    fn profile_views_do_not_overlap() {
        let home: HashSet<_> = HOME_RULES.iter().map(|r| r.field).collect();
        for rule in INFORMATION_RULES {
            assert!(!home.contains(rule.field));
        }
        assert!(!home.contains(AMENITY_RULE.field));
    }

    #[test]
    fn only_phone_uses_popup_reveal() {
        let revealed: Vec<_> = HOME_RULES
            .iter()
            .filter(|r| r.reveal.is_some())
            .map(|r| r.field)
            .collect();
        assert_eq!(revealed, vec![profile_fields::PHONE]);
    }

    #[test]
    fn revisit_reads_second_meta_span() {
        let revisit = REVIEW_RULES
            .iter()
            .find(|r| r.field == review_fields::REVISIT)
            .unwrap();
        assert_eq!(revisit.primary.nth, 1);
        assert_eq!(revisit.post, PostProcess::VisitCount);
    }
}
