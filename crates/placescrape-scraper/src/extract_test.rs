use std::time::Duration;

use placescrape_core::records::profile_fields;
use placescrape_core::RevisitValue;

use super::*;
use crate::rules::Selector;
use crate::selectors::{
    AMENITY_RULE, HOME_RULES, MENU_CONTAINER, MENU_RULES, REVIEW_CONTAINER, REVIEW_RULES,
};
use crate::test_support::{FakePage, FakeView};

const URL: &str = "https://m.place.naver.com/restaurant/1234567/home";

async fn load(view: FakeView) -> FakePage {
    let page = FakePage::new().with_view(URL, view);
    page.navigate(URL).await.expect("navigate");
    page
}

fn extractor() -> RecordExtractor {
    RecordExtractor::new(Duration::from_secs(1))
}

#[tokio::test]
async fn primary_selector_wins_over_fallback() {
    const FALLBACKS: &[Selector] = &[Selector::first("div.b")];
    let rule = FieldRule::text("price", "div.a").with_fallbacks(FALLBACKS);
    let page = load(FakeView::new().text("div.a", " 9,000원 ").text("div.b", "11,000원")).await;

    let value = extractor().resolve(&page, None, &rule).await.expect("resolve");

    assert_eq!(value, FieldValue::Text("9,000원".to_owned()));
    assert_eq!(page.queries("div.a"), 1);
    assert_eq!(page.queries("div.b"), 0);
}

#[tokio::test]
async fn blank_primary_falls_through_to_fallback() {
    const FALLBACKS: &[Selector] = &[Selector::first("div.b")];
    let rule = FieldRule::text("price", "div.a").with_fallbacks(FALLBACKS);
    let page = load(FakeView::new().text("div.a", "   ").text("div.b", "11,000원")).await;

    let value = extractor().resolve(&page, None, &rule).await.expect("resolve");

    assert_eq!(value, FieldValue::Text("11,000원".to_owned()));
    assert_eq!(page.queries("div.b"), 1);
}

#[tokio::test]
async fn missing_everywhere_is_empty_text() {
    let rule = FieldRule::text("price", "div.a");
    let page = load(FakeView::new()).await;

    let value = extractor().resolve(&page, None, &rule).await.expect("resolve");

    assert!(value.is_empty());
}

#[tokio::test]
async fn nth_selector_reads_indexed_match_only() {
    let rule = FieldRule::text("revisit", "span.meta")
        .with_primary(Selector::nth("span.meta", 1))
        .with_post(PostProcess::VisitCount);

    let single = load(FakeView::new().text("span.meta", "2.14.수")).await;
    let value = extractor().resolve(&single, None, &rule).await.expect("resolve");
    assert!(value.is_empty());

    let both = load(FakeView::new().text("span.meta", "2.14.수").text("span.meta", "3번째 방문")).await;
    let value = extractor().resolve(&both, None, &rule).await.expect("resolve");
    assert_eq!(value, FieldValue::Count(3));
}

#[tokio::test]
async fn attribute_source_reads_attribute_not_text() {
    let rule = FieldRule::text("social_link", "div.jO09N a").with_attribute("href");
    let page = load(FakeView::new().attribute("div.jO09N a", "href", "https://instagram.com/x")).await;

    let value = extractor().resolve(&page, None, &rule).await.expect("resolve");

    assert_eq!(value, FieldValue::Text("https://instagram.com/x".to_owned()));
}

#[tokio::test]
async fn list_extraction_keeps_document_order_and_drops_empty_items() {
    let view = FakeView::new()
        .item(MENU_CONTAINER, &[("span.lPzHi", "김치찌개"), ("div.GXS1X", "9,000원")])
        .item(MENU_CONTAINER, &[("span.other", "ignored")])
        .item(
            MENU_CONTAINER,
            &[("span.lPzHi", "된장찌개"), ("div.GXS1X em", "8,000원"), ("div.GXS1X", "10,000원 8,000원")],
        );
    let page = load(view).await;

    let records = extractor()
        .extract_list(&page, MENU_CONTAINER, MENU_RULES)
        .await
        .expect("extract");

    let menu: Vec<_> = records.iter().map(to_menu_record).collect();
    assert_eq!(menu.len(), 2);
    assert_eq!(menu[0].name, "김치찌개");
    assert_eq!(menu[0].price, "9,000원");
    assert_eq!(menu[1].name, "된장찌개");
    assert_eq!(menu[1].price, "8,000원");
    assert_eq!(menu[1].description, "");
}

#[tokio::test]
async fn list_rules_are_scoped_to_their_container() {
    let view = FakeView::new()
        .text("span.lPzHi", "page-level name")
        .item(MENU_CONTAINER, &[("div.GXS1X", "7,000원")]);
    let page = load(view).await;

    let records = extractor()
        .extract_list(&page, MENU_CONTAINER, MENU_RULES)
        .await
        .expect("extract");

    // The price's fallback is only consulted because the <em> is absent.
    assert_eq!(page.queries("div.GXS1X"), 1);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text(menu_fields::NAME), "");
    assert_eq!(records[0].text(menu_fields::PRICE), "7,000원");
}

#[tokio::test]
async fn failing_item_is_skipped_and_siblings_survive() {
    let view = FakeView::new()
        .item(REVIEW_CONTAINER, &[("div.pui__vn15t2", "맛있어요")])
        .failing_node(REVIEW_CONTAINER)
        .item(REVIEW_CONTAINER, &[("div.pui__vn15t2", "또 올게요")]);
    let page = load(view).await;

    let records = extractor()
        .extract_list(&page, REVIEW_CONTAINER, REVIEW_RULES)
        .await
        .expect("extract");

    let contents: Vec<_> = records.iter().map(|r| r.text(review_fields::CONTENT)).collect();
    assert_eq!(contents, vec!["맛있어요", "또 올게요"]);
}

#[tokio::test]
async fn review_revisit_is_parsed_to_count_or_kept_raw() {
    let view = FakeView::new()
        .item(
            REVIEW_CONTAINER,
            &[
                ("div.pui__vn15t2", "좋아요"),
                ("span.pui__gfuUIT > time", "2.14.수"),
                ("span.pui__gfuUIT", "2.14.수"),
                ("span.pui__gfuUIT", "3번째 방문"),
            ],
        )
        .item(
            REVIEW_CONTAINER,
            &[
                ("div.pui__vn15t2", "별로"),
                ("span.pui__gfuUIT", "1.2.화"),
                ("span.pui__gfuUIT", "영수증"),
            ],
        );
    let page = load(view).await;

    let records = extractor()
        .extract_list(&page, REVIEW_CONTAINER, REVIEW_RULES)
        .await
        .expect("extract");
    let reviews: Vec<_> = records.iter().map(to_review_record).collect();

    assert_eq!(reviews[0].date, "2.14.수");
    assert_eq!(reviews[0].revisit, RevisitValue::Count(3));
    assert_eq!(reviews[1].date, "");
    assert_eq!(reviews[1].revisit, RevisitValue::Raw("영수증".to_owned()));
}

#[tokio::test]
async fn singleton_emits_every_field_even_when_absent() {
    let page = load(FakeView::new().text("span.GHAhO", "을지면옥")).await;

    let record = extractor().extract_singleton(&page, HOME_RULES).await;

    assert_eq!(record.iter().count(), HOME_RULES.len());
    assert_eq!(record.text(profile_fields::NAME), "을지면옥");
    assert_eq!(record.text(profile_fields::PHONE), "");
}

#[tokio::test]
async fn singleton_field_failure_leaves_value_empty() {
    let view = FakeView::new()
        .text("span.GHAhO", "을지면옥")
        .failing_node("span.lnJFt");
    let page = load(view).await;

    let record = extractor().extract_singleton(&page, HOME_RULES).await;

    assert_eq!(record.text(profile_fields::NAME), "을지면옥");
    assert_eq!(record.text(profile_fields::CATEGORY), "");
}

#[tokio::test]
async fn phone_is_revealed_through_popup_when_not_inline() {
    let view = FakeView::new().popup("a.BfF3H", "div.J7eF_ em", " 02-1234-5678 ");
    let page = load(view).await;

    let record = extractor().extract_singleton(&page, HOME_RULES).await;

    assert_eq!(record.text(profile_fields::PHONE), "02-1234-5678");
    assert_eq!(page.clicks("a.BfF3H"), 1);
}

#[tokio::test]
async fn inline_phone_skips_popup() {
    let view = FakeView::new()
        .text("span.xlx7Q", "02-000-0000")
        .popup("a.BfF3H", "div.J7eF_ em", "02-1234-5678");
    let page = load(view).await;

    let record = extractor().extract_singleton(&page, HOME_RULES).await;

    assert_eq!(record.text(profile_fields::PHONE), "02-000-0000");
    assert_eq!(page.clicks("a.BfF3H"), 0);
}

#[tokio::test]
async fn popup_that_never_shows_target_yields_empty() {
    let page = load(FakeView::new().unclickable("a.BfF3H")).await;

    let record = extractor().extract_singleton(&page, HOME_RULES).await;

    assert_eq!(record.text(profile_fields::PHONE), "");
}

#[tokio::test]
async fn amenities_join_labels_with_qualifiers() {
    let view = FakeView::new()
        .item("li.c7TR6", &[("div.owG4q", "주차"), ("span.place_blind", "무료")])
        .item("li.c7TR6", &[("div.owG4q", "포장")])
        .item("li.c7TR6", &[("span.place_blind", "")]);
    let page = load(view).await;

    let amenities = extractor().extract_label_list(&page, &AMENITY_RULE).await;

    assert_eq!(amenities, "주차 (무료), 포장");
}

#[tokio::test]
async fn no_amenities_is_empty_string() {
    let page = load(FakeView::new()).await;

    assert_eq!(extractor().extract_label_list(&page, &AMENITY_RULE).await, "");
}
