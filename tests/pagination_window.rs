use storefront_admin_api::pagination::{PageItem, page_window};

fn pages(items: &[PageItem]) -> Vec<i64> {
    items
        .iter()
        .filter_map(|item| match item {
            PageItem::Page { number, .. } => Some(*number),
            PageItem::Ellipsis => None,
        })
        .collect()
}

#[test]
fn single_page() {
    assert_eq!(page_window(1, 1), vec![PageItem::page(1, true)]);
}

#[test]
fn middle_of_long_list() {
    let items = page_window(5, 10);
    assert_eq!(
        items,
        vec![
            PageItem::page(1, false),
            PageItem::page(2, false),
            PageItem::page(3, false),
            PageItem::page(4, false),
            PageItem::page(5, true),
            PageItem::page(6, false),
            PageItem::page(7, false),
            PageItem::Ellipsis,
            PageItem::page(10, false),
        ]
    );
}

#[test]
fn start_of_long_list() {
    let items = page_window(1, 10);
    assert_eq!(
        items,
        vec![
            PageItem::page(1, true),
            PageItem::page(2, false),
            PageItem::page(3, false),
            PageItem::Ellipsis,
            PageItem::page(10, false),
        ]
    );
}

#[test]
fn no_ellipsis_when_everything_fits() {
    let items = page_window(4, 7);
    assert_eq!(pages(&items), vec![1, 2, 3, 4, 5, 6, 7]);
    assert!(items.iter().all(|i| !matches!(i, PageItem::Ellipsis)));
}

#[test]
fn single_page_gap_renders_the_page() {
    // Window ends at 6, anchor is 8: the lone page 7 is shown, not an ellipsis.
    let items = page_window(4, 8);
    assert_eq!(pages(&items), vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn out_of_range_current_is_clamped() {
    let items = page_window(99, 5);
    assert!(items.contains(&PageItem::page(5, true)));
    let items = page_window(0, 5);
    assert!(items.contains(&PageItem::page(1, true)));
}

#[test]
fn empty_when_no_pages() {
    assert!(page_window(1, 0).is_empty());
}

// Anchors appear exactly once, the current page is marked active, and an
// ellipsis stands wherever at least two pages were skipped.
#[test]
fn window_properties_hold_for_all_small_inputs() {
    for total in 1..=30_i64 {
        for current in 1..=total {
            let items = page_window(current, total);
            let numbers = pages(&items);

            assert_eq!(
                numbers.iter().filter(|&&n| n == 1).count(),
                1,
                "page 1 missing or duplicated for ({current}, {total})"
            );
            assert_eq!(
                numbers.iter().filter(|&&n| n == total).count(),
                1,
                "last page missing or duplicated for ({current}, {total})"
            );

            let active: Vec<i64> = items
                .iter()
                .filter_map(|item| match item {
                    PageItem::Page {
                        number,
                        current: true,
                    } => Some(*number),
                    _ => None,
                })
                .collect();
            assert_eq!(active, vec![current]);

            // Rendered pages are strictly increasing, and adjacent rendered
            // pages either abut or are separated by an ellipsis hiding >= 2
            // pages.
            let mut previous: Option<(i64, bool)> = None;
            for item in &items {
                match item {
                    PageItem::Page { number, .. } => {
                        if let Some((prev, ellipsis_between)) = previous {
                            if ellipsis_between {
                                assert!(
                                    number - prev >= 3,
                                    "ellipsis hid fewer than 2 pages for ({current}, {total})"
                                );
                            } else {
                                assert_eq!(
                                    number - prev,
                                    1,
                                    "silent gap between {prev} and {number} for ({current}, {total})"
                                );
                            }
                        }
                        previous = Some((*number, false));
                    }
                    PageItem::Ellipsis => {
                        let (prev, _) = previous.expect("ellipsis cannot lead the window");
                        previous = Some((prev, true));
                    }
                }
            }
        }
    }
}
