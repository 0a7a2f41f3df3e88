//! Value-object behavior of pages, criteria and legacy query params.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use reef_sdk::criteria::{
    MosaicSearchCriteria, Order, SearchCriteria, TransactionSearchCriteria,
};
use reef_sdk::model::{Address, TransactionGroup};
use reef_sdk::page::{Page, QueryParams, DEFAULT_PAGE_SIZE};

fn hash_of(value: &impl Hash) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn page_is_last_iff_shorter_than_page_size() {
    assert!(!Page::new(vec!["a", "b", "c"], 1, 2).is_last());
    assert!(!Page::new(vec!["a", "b"], 4, 2).is_last());
    assert!(Page::new(vec!["a"], 5, 2).is_last());
    assert!(Page::new(Vec::<&str>::new(), 1, 2).is_last());
}

#[test]
fn page_preserves_row_order() {
    let page = Page::new(vec![3, 1, 2], 1, 10);
    assert_eq!(page.data(), &[3, 1, 2]);
    assert_eq!(page.into_data(), vec![3, 1, 2]);
}

#[test]
fn default_criteria_has_every_field_absent() {
    let criteria = TransactionSearchCriteria::default();
    assert_eq!(criteria.paging().order, None);
    assert_eq!(criteria.paging().page_size, None);
    assert_eq!(criteria.paging().page_number, None);
    assert_eq!(criteria.paging().offset, None);
    assert_eq!(criteria.group, None);
    assert_eq!(criteria.address, None);
    assert!(criteria.transaction_types.is_empty());
}

#[test]
fn equal_criteria_share_a_hash() {
    let a = TransactionSearchCriteria::default()
        .group(TransactionGroup::Confirmed)
        .address(Address::new("TATNE7Q5BITMUTRRN6IB4I7FLSDRDWZA37JGO5Q"));
    let b = TransactionSearchCriteria::default()
        .group(TransactionGroup::Confirmed)
        .address(Address::new("TATNE7Q5BITMUTRRN6IB4I7FLSDRDWZA37JGO5Q"));
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn page_number_breaks_equality_and_hash() {
    let a = MosaicSearchCriteria::default();
    let b = MosaicSearchCriteria::default().with_page_number(2);
    assert_ne!(a, b);
    assert_ne!(hash_of(&a), hash_of(&b));
}

#[test]
fn filter_field_breaks_equality() {
    let a = MosaicSearchCriteria::default();
    let b = MosaicSearchCriteria::default()
        .owner_address(Address::new("TATNE7Q5BITMUTRRN6IB4I7FLSDRDWZA37JGO5Q"));
    assert_ne!(a, b);
}

#[test]
fn builder_touches_only_its_own_field() {
    let criteria = MosaicSearchCriteria::default()
        .with_order(Order::Desc)
        .with_page_size(25)
        .with_offset("cursor-token");
    assert_eq!(criteria.paging().order, Some(Order::Desc));
    assert_eq!(criteria.paging().page_size, Some(25));
    assert_eq!(criteria.paging().page_number, None);
    assert_eq!(criteria.paging().offset.as_deref(), Some("cursor-token"));
    assert_eq!(criteria.owner_address, None);
}

#[test]
fn paging_query_pairs_skip_absent_fields() {
    let criteria = MosaicSearchCriteria::default()
        .with_order(Order::Desc)
        .with_page_size(25)
        .with_page_number(3);
    let pairs = criteria.paging().to_query_pairs();
    assert_eq!(
        pairs,
        vec![
            ("pageSize", "25".to_owned()),
            ("pageNumber", "3".to_owned()),
            ("order", "desc".to_owned()),
        ]
    );
    assert!(MosaicSearchCriteria::default()
        .paging()
        .to_query_pairs()
        .is_empty());
}

#[test]
fn query_params_clamp_out_of_range_sizes() {
    assert_eq!(QueryParams::new(-1).page_size(), 10);
    assert_eq!(QueryParams::new(0).page_size(), 10);
    assert_eq!(QueryParams::new(9).page_size(), 10);
    assert_eq!(QueryParams::new(1000).page_size(), 10);
    assert_eq!(QueryParams::new(101).page_size(), 10);
}

#[test]
fn query_params_pass_in_range_sizes_through() {
    assert_eq!(QueryParams::new(10).page_size(), 10);
    assert_eq!(QueryParams::new(15).page_size(), 15);
    assert_eq!(QueryParams::new(100).page_size(), 100);
    assert_eq!(QueryParams::default().page_size(), DEFAULT_PAGE_SIZE);
}

#[test]
fn query_params_render_cursor_and_order() {
    let params = QueryParams::new(25).id("5C2A5D187D70C5BA2C4C6B2E").order(Order::Asc);
    assert_eq!(
        params.to_query_pairs(),
        vec![
            ("pageSize", "25".to_owned()),
            ("id", "5C2A5D187D70C5BA2C4C6B2E".to_owned()),
            ("order", "asc".to_owned()),
        ]
    );
}
