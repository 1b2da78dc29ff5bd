use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::store::RowStore;
use crate::{IndexKey, Record, SortKeyFn, Value};

/// Compares two sort keys.
///
/// Null keys sort before every present key regardless of `reverse`; only the comparison of
/// two present keys is reversed. Equal keys compare `Equal`, so a stable sort keeps their
/// prior relative order in both directions.
pub fn compare_sort_keys(a: &Value, b: &Value, reverse: bool) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => {
            let ord = a.total_cmp(b);
            if reverse { ord.reverse() } else { ord }
        }
    }
}

pub(crate) fn sort_key(record: &Record, column: &str, key: Option<&SortKeyFn>) -> Value {
    let value = record.value(column);
    match key {
        Some(f) => f(value),
        None => value.clone(),
    }
}

/// Stable permutation of the store's order by `column`.
///
/// The key function runs once per row.
pub(crate) fn sort_store<A>(
    store: &mut RowStore<A>,
    column: &str,
    key: Option<&SortKeyFn>,
    reverse: bool,
) {
    let mut keyed: Vec<(Value, IndexKey)> = store
        .records()
        .map(|record| (sort_key(record, column, key), record.key().clone()))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_sort_keys(a, b, reverse));
    store.reorder(keyed.into_iter().map(|(_, k)| k).collect());
}

/// Restores index-key order.
pub(crate) fn sort_store_by_index<A>(store: &mut RowStore<A>) {
    let mut order = store.keys().to_vec();
    order.sort();
    store.reorder(order);
}
