use betsmarter_terminal::pagination::Pager;

#[test]
fn forty_five_rows_in_pages_of_twenty() {
    let mut pager = Pager::new(20);
    pager.set_filtered_total(45);
    assert_eq!(pager.last_page(), 2);
    assert_eq!(pager.range_label(), "1-20 of 45");

    assert!(pager.go_last());
    assert_eq!(pager.page(), 2);
    assert_eq!(pager.window(), (40, 20));
    assert_eq!(pager.row_span(), Some((41, 45)));
    assert_eq!(pager.range_label(), "41-45 of 45");
    assert!(!pager.has_next());
    assert!(pager.has_prev());
}

#[test]
fn navigation_stays_in_bounds() {
    let mut pager = Pager::new(20);
    pager.set_filtered_total(45);

    assert!(!pager.go_prev());
    assert!(!pager.go_first());
    assert_eq!(pager.page(), 0);

    for _ in 0..10 {
        pager.go_next();
    }
    assert_eq!(pager.page(), 2);
    assert!(!pager.go_next());

    for _ in 0..10 {
        pager.go_prev();
    }
    assert_eq!(pager.page(), 0);

    assert!(pager.go_to(99));
    assert_eq!(pager.page(), 2);
}

#[test]
fn exact_multiple_has_no_trailing_empty_page() {
    let mut pager = Pager::new(20);
    pager.set_filtered_total(40);
    assert_eq!(pager.last_page(), 1);
    pager.go_last();
    assert_eq!(pager.range_label(), "21-40 of 40");
}

#[test]
fn reset_returns_to_first_page() {
    let mut pager = Pager::new(5);
    pager.set_filtered_total(12);
    pager.go_last();
    pager.reset();
    assert_eq!(pager.page(), 0);
    assert_eq!(pager.window(), (0, 5));
}
