use std::time::{Duration, Instant};

use serde_json::json;
use uuid::Uuid;

use storefront_admin_api::client::ClientError;
use storefront_admin_api::client::list::{
    ListPage, ListQuery, ListState, SEARCH_DEBOUNCE, SearchDebounce, SortDirection, decode_list,
};
use storefront_admin_api::models::Category;
use storefront_admin_api::response::PaginationMeta;

fn category_json(name: &str) -> serde_json::Value {
    json!({
        "id": Uuid::new_v4(),
        "name": name,
        "description": null,
        "imageUrl": null,
        "isSystemCategory": false,
    })
}

#[test]
fn paginated_shape_mirrors_meta_exactly() {
    let body = json!({
        "data": [category_json("Beverages"), category_json("Snacks")],
        "meta": {
            "currentPage": 2,
            "totalPages": 7,
            "itemsPerPage": 15,
            "totalItems": 93,
            "hasNextPage": true,
            "hasPreviousPage": true,
        }
    });

    let page = decode_list::<Category>(body).expect("paginated shape decodes");
    assert_eq!(page.items.len(), 2);
    assert_eq!(
        page.meta,
        PaginationMeta {
            current_page: 2,
            total_pages: 7,
            items_per_page: 15,
            total_items: 93,
            has_next_page: true,
            has_previous_page: true,
        }
    );
}

#[test]
fn legacy_array_becomes_a_single_full_page() {
    let body = json!([category_json("Beverages"), category_json("Snacks")]);
    let page = decode_list::<Category>(body).expect("legacy shape decodes");
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.meta, PaginationMeta::single_page(2));
    assert_eq!(page.meta.current_page, 1);
    assert_eq!(page.meta.total_pages, 1);
    assert_eq!(page.meta.total_items, 2);
}

#[test]
fn empty_legacy_array_is_still_one_page() {
    let page = decode_list::<Category>(json!([])).expect("empty array decodes");
    assert!(page.items.is_empty());
    assert_eq!(page.meta.total_pages, 1);
}

#[test]
fn unknown_shape_is_rejected() {
    let err = decode_list::<Category>(json!({ "items": [] })).unwrap_err();
    assert!(matches!(err, ClientError::UnexpectedFormat));

    // A paginated envelope missing meta fields is not silently accepted.
    let err = decode_list::<Category>(json!({
        "data": [],
        "meta": { "currentPage": 1 }
    }))
    .unwrap_err();
    assert!(matches!(err, ClientError::UnexpectedFormat));
}

#[test]
fn success_replaces_the_whole_view_state() {
    let mut state: ListState<Category> = ListState::new();
    let token = state.begin_fetch();
    assert!(state.loading);

    let page = decode_list::<Category>(json!([category_json("Beverages")])).unwrap();
    assert!(state.apply(token, Ok(page)));
    assert!(!state.loading);
    assert_eq!(state.items.len(), 1);
    assert!(state.error.is_none());
}

#[test]
fn failure_empties_the_item_list() {
    let mut state: ListState<Category> = ListState::new();
    let token = state.begin_fetch();
    let page = decode_list::<Category>(json!([category_json("Beverages")])).unwrap();
    state.apply(token, Ok(page));

    let token = state.begin_fetch();
    assert!(state.apply(token, Err(ClientError::Server("boom".into()))));
    assert!(state.items.is_empty());
    assert!(state.meta.is_none());
    assert!(matches!(state.error, Some(ClientError::Server(_))));
}

#[test]
fn stale_responses_are_discarded() {
    let mut state: ListState<Category> = ListState::new();
    let stale = state.begin_fetch();
    let fresh = state.begin_fetch();

    let fresh_page = decode_list::<Category>(json!([category_json("Fresh")])).unwrap();
    assert!(state.apply(fresh, Ok(fresh_page)));

    // The slower, older response resolves afterwards and must not win.
    let stale_page: ListPage<Category> =
        decode_list(json!([category_json("Stale"), category_json("Rows")])).unwrap();
    assert!(!state.apply(stale, Ok(stale_page)));
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].name, "Fresh");
}

#[test]
fn sort_and_search_changes_reset_the_page() {
    let mut query = ListQuery {
        page: 4,
        ..ListQuery::default()
    };

    query.toggle_sort("name");
    assert_eq!(query.page, 1);
    assert_eq!(query.sort_by.as_deref(), Some("name"));
    assert_eq!(query.sort_order, Some(SortDirection::Descending));

    query.page = 3;
    query.toggle_sort("name");
    assert_eq!(query.sort_order, Some(SortDirection::Ascending));
    assert_eq!(query.page, 1);

    query.page = 5;
    query.set_search("tea");
    assert_eq!(query.search.as_deref(), Some("tea"));
    assert_eq!(query.page, 1);

    query.page = 2;
    query.set_search("");
    assert_eq!(query.search, None);
    assert_eq!(query.page, 1);
}

#[test]
fn query_pairs_skip_unset_parameters() {
    let query = ListQuery::default();
    let pairs = query.to_pairs();
    assert_eq!(
        pairs,
        vec![("page", "1".to_string()), ("limit", "10".to_string())]
    );

    let query = ListQuery {
        page: 3,
        limit: 15,
        search: Some("tea".into()),
        sort_by: Some("name".into()),
        sort_order: Some(SortDirection::Descending),
    };
    let pairs = query.to_pairs();
    assert!(pairs.contains(&("search", "tea".to_string())));
    assert!(pairs.contains(&("sortBy", "name".to_string())));
    assert!(pairs.contains(&("sortOrder", "desc".to_string())));
}

#[test]
fn search_commits_after_the_debounce_window() {
    let mut search = SearchDebounce::new();
    let start = Instant::now();

    assert!(!search.input("te", start));
    assert!(!search.input("tea", start + Duration::from_millis(200)));

    // Not yet idle for the full window.
    assert_eq!(search.poll(start + Duration::from_millis(400)), None);
    assert_eq!(search.committed(), "");

    let committed = search.poll(start + Duration::from_millis(200) + SEARCH_DEBOUNCE);
    assert_eq!(committed.as_deref(), Some("tea"));
    assert_eq!(search.committed(), "tea");

    // Nothing new to commit on the next tick.
    assert_eq!(search.poll(start + Duration::from_secs(5)), None);
}

#[test]
fn clearing_search_commits_immediately() {
    let mut search = SearchDebounce::new();
    let start = Instant::now();

    search.input("tea", start);
    search.poll(start + SEARCH_DEBOUNCE);
    assert_eq!(search.committed(), "tea");

    // No debounce on clear, and any pending term is dropped.
    search.input("teapot", start + Duration::from_secs(2));
    assert!(search.input("", start + Duration::from_secs(2)));
    assert_eq!(search.committed(), "");
    assert_eq!(search.poll(start + Duration::from_secs(10)), None);
}
