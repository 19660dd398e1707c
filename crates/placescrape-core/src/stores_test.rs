use std::io::Write;

use super::*;

fn ids(targets: &[StoreTarget]) -> Vec<&str> {
    targets.iter().map(|t| t.id.as_str()).collect()
}

#[test]
fn parse_rows_handles_quotes_and_crlf() {
    let rows = parse_rows("id,name\r\n1,\"Kim, \"\"Jr\"\"\"\r\n", ',');
    assert_eq!(
        rows,
        vec![
            vec!["id".to_owned(), "name".to_owned()],
            vec!["1".to_owned(), "Kim, \"Jr\"".to_owned()],
        ]
    );
}

#[test]
fn parse_rows_drops_blank_lines() {
    let rows = parse_rows("id\n\n1\n\n2", ',');
    assert_eq!(rows.len(), 3);
}

#[test]
fn parse_store_targets_reads_named_column() {
    let targets =
        parse_store_targets("name,id\n국밥집,1234567\n분식,7654321\n", ',', "id").unwrap();
    assert_eq!(ids(&targets), vec!["1234567", "7654321"]);
}

#[test]
fn parse_store_targets_column_match_is_case_insensitive() {
    let targets = parse_store_targets(" ID \n42\n", ',', "id").unwrap();
    assert_eq!(ids(&targets), vec!["42"]);
}

#[test]
fn parse_store_targets_strips_bom() {
    let targets = parse_store_targets("\u{feff}id\n42\n", ',', "id").unwrap();
    assert_eq!(ids(&targets), vec!["42"]);
}

#[test]
fn parse_store_targets_skips_blank_and_duplicate_ids() {
    let targets = parse_store_targets("id\n1111\n \n2222\n1111\n", ',', "id").unwrap();
    assert_eq!(ids(&targets), vec!["1111", "2222"]);
}

#[test]
fn parse_store_targets_normalises_float_ids() {
    let targets = parse_store_targets("id\n1234567.0\n", ',', "id").unwrap();
    assert_eq!(ids(&targets), vec!["1234567"]);
}

#[test]
fn parse_store_targets_missing_column() {
    let result = parse_store_targets("store\n1\n", ',', "id");
    assert!(
        matches!(result, Err(ConfigError::MissingColumn { ref column, .. }) if column == "id"),
        "expected MissingColumn(id), got: {result:?}"
    );
}

#[test]
fn parse_store_targets_accepts_place_urls() {
    let content = "id\nhttps://m.place.naver.com/restaurant/1234567/home\n";
    let targets = parse_store_targets(content, ',', "id").unwrap();
    assert_eq!(ids(&targets), vec!["1234567"]);
}

#[test]
fn parse_store_targets_skips_unrecognised_urls() {
    let content = "id\n1111\nhttps://example.com/1234567\n2222\n";
    let targets = parse_store_targets(content, ',', "id").unwrap();
    assert_eq!(ids(&targets), vec!["1111", "2222"]);
}

#[test]
fn parse_store_targets_skips_place_urls_without_id() {
    let targets = parse_store_targets("id\nhttps://m.place.naver.com/\n42\n", ',', "id").unwrap();
    assert_eq!(ids(&targets), vec!["42"]);
}

#[test]
fn store_id_from_url_variants() {
    assert_eq!(
        store_id_from_url("https://m.place.naver.com/restaurant/1234567/review/visitor").as_deref(),
        Some("1234567")
    );
    assert_eq!(
        store_id_from_url("https://pcmap.place.naver.com/place/7654321").as_deref(),
        Some("7654321")
    );
    assert_eq!(
        store_id_from_url("https://map.naver.com/p/entry/place/1029384?c=15.00").as_deref(),
        Some("1029384")
    );
    assert_eq!(
        store_id_from_url("https://store.naver.com/restaurants/detail?id=55555").as_deref(),
        Some("55555")
    );
    assert_eq!(store_id_from_url("https://m.place.naver.com/"), None);
}

#[test]
fn store_id_from_url_ignores_numeric_search_terms() {
    assert_eq!(
        store_id_from_url("https://map.naver.com/p/search/1004/place/1234567").as_deref(),
        Some("1234567")
    );
    assert_eq!(
        store_id_from_url("https://map.naver.com/p/search/1004?c=15.00").as_deref(),
        None
    );
    assert_eq!(
        store_id_from_url("https://map.naver.com/p/search/1004/place/1234567?placeId=7654321")
            .as_deref(),
        Some("7654321")
    );
}

#[test]
fn is_place_url_recognises_hosts() {
    assert!(is_place_url("https://m.place.naver.com/restaurant/1"));
    assert!(is_place_url("https://map.naver.com/p"));
    assert!(!is_place_url("https://evil.com/m.place.naver.com/1"));
    assert!(!is_place_url("https://place.naver.com.evil.com/1"));
}

#[test]
fn store_target_parse_keeps_opaque_tokens() {
    assert_eq!(StoreTarget::parse(" abc-12 ").unwrap().id, "abc-12");
    assert!(StoreTarget::parse("   ").is_none());
}

#[test]
fn load_store_targets_missing_file_is_input_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store_list.csv");
    let result = load_store_targets(&path, "id");
    assert!(
        matches!(result, Err(ConfigError::InputMissing { .. })),
        "expected InputMissing, got: {result:?}"
    );
}

#[test]
fn load_store_targets_reads_tsv_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stores.tsv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "name\tid").unwrap();
    writeln!(file, "a, b\t31").unwrap();
    drop(file);

    let targets = load_store_targets(&path, "id").unwrap();
    assert_eq!(ids(&targets), vec!["31"]);
}

#[test]
fn load_store_targets_reports_path_on_missing_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stores.csv");
    std::fs::write(&path, "store\n1\n").unwrap();

    let err = load_store_targets(&path, "id").unwrap_err();
    match err {
        ConfigError::MissingColumn { path: reported, .. } => {
            assert!(reported.ends_with("stores.csv"), "got path {reported}");
        }
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}
