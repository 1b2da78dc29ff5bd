use crate::*;

use alloc::rc::Rc;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::{Cell as StdCell, RefCell};
use core::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn gen_range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        self.gen_range_u64(start as u64, end_exclusive as u64) as u32
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

fn row(id: i64, name: &str, score: i64) -> RowData {
    RowData::new()
        .with("id", id)
        .with("name", name)
        .with("score", score)
}

fn scenario_options() -> TableOptions {
    TableOptions::new(vec![
        Column::hidden("id"),
        Column::new("name"),
        Column::new("score"),
    ])
    .with_index("id")
}

fn scenario_rows() -> Vec<RowData> {
    vec![row(1, "a", 3), row(2, "b", 1), row(3, "c", 1)]
}

fn scenario() -> DataTable {
    DataTable::from_rows(scenario_options(), scenario_rows()).unwrap()
}

fn ids<A>(table: &DataTable<A>) -> Vec<i64> {
    table
        .records()
        .map(|r| r.value("id").as_i64().unwrap())
        .collect()
}

fn record_events<A>(table: &mut DataTable<A>) -> Arc<std::sync::Mutex<Vec<Event>>> {
    let events = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    table.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    events
}

/// Serves `total` rows keyed `0..total`, honoring offset/limit, and records every query.
struct Paged {
    total: usize,
    known_total: bool,
    fail: Rc<StdCell<bool>>,
    calls: Arc<AtomicUsize>,
    queries: Rc<RefCell<Vec<Query>>>,
}

impl Paged {
    fn new(total: usize, known_total: bool) -> Self {
        Self {
            total,
            known_total,
            fail: Rc::new(StdCell::new(false)),
            calls: Arc::new(AtomicUsize::new(0)),
            queries: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl DataSource for Paged {
    fn query(&mut self, query: &Query) -> Result<Vec<RowData>, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.borrow_mut().push(query.clone());
        if self.fail.get() {
            return Err("source offline".into());
        }
        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);
        Ok((offset..self.total)
            .take(limit)
            .map(|i| {
                RowData::new()
                    .with("id", i as i64)
                    .with("n", ((i * 7) % 13) as i64)
            })
            .collect())
    }

    fn query_result_count(&mut self) -> Result<Option<usize>, BoxError> {
        Ok(self.known_total.then_some(self.total))
    }
}

fn paged_options(page_size: usize) -> TableOptions {
    TableOptions::new(vec![Column::new("id"), Column::new("n")])
        .with_index("id")
        .with_page_size(page_size)
}

#[test]
fn scenario_sort_breaks_ties_by_prior_order() {
    let mut table = scenario();
    assert_eq!(ids(&table), [1, 2, 3]);

    table.sort_by_column("score", Some(false), false).unwrap();
    assert_eq!(ids(&table), [2, 3, 1]);

    table.sort_by_column("score", Some(true), false).unwrap();
    assert_eq!(ids(&table), [1, 2, 3]);
}

#[test]
fn sort_is_stable_for_duplicate_keys() {
    let mut rng = Lcg::new(7);
    let rows: Vec<RowData> = (0..60)
        .map(|id| {
            RowData::new()
                .with("id", id as i64)
                .with("g", rng.gen_range_u32(0, 4))
        })
        .collect();
    let options = TableOptions::new(vec![Column::new("id"), Column::new("g")]).with_index("id");
    let mut table = DataTable::from_rows(options, rows).unwrap();

    for reverse in [false, true] {
        table.sort_index();
        table.sort_by_column("g", Some(reverse), false).unwrap();
        let sorted: Vec<(i64, i64)> = table
            .records()
            .map(|r| (r.value("g").as_i64().unwrap(), r.value("id").as_i64().unwrap()))
            .collect();
        for pair in sorted.windows(2) {
            let (g0, id0) = pair[0];
            let (g1, id1) = pair[1];
            if reverse {
                assert!(g0 >= g1);
            } else {
                assert!(g0 <= g1);
            }
            if g0 == g1 {
                assert!(id0 < id1, "ties must keep index order");
            }
        }
    }
}

#[test]
fn nulls_sort_first_in_both_directions() {
    let scores = [Some(2), None, Some(1), None, Some(3)];
    let rows: Vec<RowData> = scores
        .iter()
        .enumerate()
        .map(|(i, score)| {
            RowData::new()
                .with("id", i as i64 + 1)
                .with("score", *score)
        })
        .collect();
    let options =
        TableOptions::new(vec![Column::new("id"), Column::new("score")]).with_index("id");
    let mut table = DataTable::from_rows(options, rows).unwrap();

    table.sort_by_column("score", Some(false), false).unwrap();
    assert_eq!(ids(&table), [2, 4, 3, 1, 5]);

    table.sort_by_column("score", Some(true), false).unwrap();
    assert_eq!(ids(&table), [2, 4, 5, 1, 3]);
}

#[test]
fn compare_sort_keys_orders_mixed_values() {
    use core::cmp::Ordering::*;
    assert_eq!(compare_sort_keys(&Value::Null, &Value::from(1), false), Less);
    assert_eq!(compare_sort_keys(&Value::Null, &Value::from(1), true), Less);
    assert_eq!(compare_sort_keys(&Value::from(1), &Value::from(2.5), false), Less);
    assert_eq!(compare_sort_keys(&Value::from(1), &Value::from(2.5), true), Greater);
    assert_eq!(compare_sort_keys(&Value::from(true), &Value::from(0), false), Less);
    assert_eq!(compare_sort_keys(&Value::from(9), &Value::from("a"), false), Less);
}

#[test]
fn column_default_direction_and_toggle() {
    let options = TableOptions::new(vec![
        Column::hidden("id"),
        Column::new("name"),
        Column::new("score").with_sort_reverse(true),
    ])
    .with_index("id");
    let mut table = DataTable::from_rows(options, scenario_rows()).unwrap();

    table.sort_by_column("score", None, false).unwrap();
    assert_eq!(table.sort_by(), Some(&SortBy::descending("score")));
    assert_eq!(ids(&table), [1, 2, 3]);

    table.sort_by_column("score", None, true).unwrap();
    assert_eq!(table.sort_by(), Some(&SortBy::ascending("score")));
    assert_eq!(ids(&table), [2, 3, 1]);

    table.sort_by_column("score", None, true).unwrap();
    assert_eq!(table.sort_by(), Some(&SortBy::descending("score")));

    // Sorting a different column never toggles.
    table.sort_by_column("name", None, true).unwrap();
    assert_eq!(table.sort_by(), Some(&SortBy::ascending("name")));
}

#[test]
fn sort_key_function_is_used() {
    let options = TableOptions::new(vec![
        Column::hidden("id"),
        Column::new("name").with_sort_key(|v| Value::from(v.as_str().map(|s| s.len() as i64))),
    ])
    .with_index("id");
    let rows = vec![
        RowData::new().with("id", 1).with("name", "ccc"),
        RowData::new().with("id", 2).with("name", "a"),
        RowData::new().with("id", 3).with("name", "bb"),
    ];
    let mut table = DataTable::from_rows(options, rows).unwrap();
    table.sort_by_column("name", Some(false), false).unwrap();
    assert_eq!(ids(&table), [2, 3, 1]);
}

#[test]
fn cycle_sort_column_wraps() {
    let mut table = scenario();
    assert_eq!(table.sort_column(), None);

    table.cycle_sort_column(1).unwrap();
    assert_eq!(table.sort_column(), Some(0));
    assert_eq!(table.sort_by().unwrap().column, "name");

    table.cycle_sort_column(1).unwrap();
    assert_eq!(table.sort_column(), Some(1));

    table.cycle_sort_column(1).unwrap();
    assert_eq!(table.sort_column(), Some(0));

    table.cycle_sort_column(-1).unwrap();
    assert_eq!(table.sort_column(), Some(1));
}

#[test]
fn sort_index_restores_key_order() {
    let mut table = scenario();
    table.sort_by_column("score", Some(false), false).unwrap();
    table.sort_index();
    assert_eq!(ids(&table), [1, 2, 3]);
    assert_eq!(table.sort_by(), None);
}

#[test]
fn sort_marks_focus_column_on_rows() {
    let mut table = scenario();
    table.sort_by_column("score", None, false).unwrap();
    assert_eq!(table.sort_column(), Some(1));
    let rendered = table.get_row_by_position(0).unwrap();
    assert_eq!(rendered.focus_column, Some(1));
}

#[test]
fn sort_refocus_follows_the_focused_row() {
    let mut table =
        DataTable::from_rows(scenario_options().with_sort_refocus(true), scenario_rows()).unwrap();
    table.set_focus(0).unwrap();
    table.sort_by_column("score", Some(false), false).unwrap();
    assert_eq!(table.focus_position(), Some(2));
    assert_eq!(table.selection().unwrap().key(), &IndexKey::from(1));
}

#[test]
fn filters_are_idempotent_and_clear_restores_order() {
    let mut table = scenario();
    table.add_filter(|row| row.value("score").as_i64().is_some_and(|s| s < 3));
    assert_eq!(ids(&table), [2, 3]);

    let before = table.positions().clone();
    table.apply_filters();
    assert_eq!(table.positions(), &before);

    table.clear_filters();
    assert_eq!(ids(&table), [1, 2, 3]);
}

#[test]
fn filters_see_store_order_after_sort() {
    let mut table = scenario();
    table.sort_by_column("score", Some(true), false).unwrap();
    table.add_filter(|row| row.value("name").as_str() != Some("b"));
    assert_eq!(ids(&table), [1, 3]);
}

#[test]
fn focus_is_clamped_after_filtering() {
    let mut table = scenario();
    table.set_focus(2).unwrap();

    table.add_filter(|row| row.value("id").as_i64() == Some(2));
    assert_eq!(table.len(), 1);
    assert_eq!(table.focus_position(), Some(0));

    table.add_filter(|_| false);
    assert!(table.is_empty());
    assert_eq!(table.focus_position(), None);
}

#[test]
fn blur_is_announced_before_focus() {
    let mut table = scenario();
    assert_eq!(table.focus_position(), Some(0));
    let events = record_events(&mut table);

    table.set_focus(2).unwrap();
    table.select();
    assert_eq!(
        *events.lock().unwrap(),
        [Event::Blur(0), Event::Focus(2), Event::Select(IndexKey::from(3))]
    );

    assert!(table.set_focus(3).unwrap_err().is_bounds());
}

#[test]
fn unsubscribed_observers_stop_receiving_events() {
    let mut table = scenario();
    let count = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&count);
    let id = table.subscribe(move |_| {
        sink.fetch_add(1, Ordering::SeqCst);
    });
    table.set_focus(1).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 2);

    assert!(table.unsubscribe(id));
    assert!(!table.unsubscribe(id));
    table.set_focus(2).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn pagination_loads_every_row_exactly_once() {
    let source = Paged::new(237, true);
    let queries = Rc::clone(&source.queries);
    let mut table = DataTable::new(paged_options(50), source).unwrap();
    assert_eq!(table.loaded_len(), 50);
    assert_eq!(table.row_count(), Some(237));
    assert_eq!(table.phase(), LoadPhase::Idle);

    // Still inside the loaded window.
    assert!(!table.load_more(Some(10)).unwrap());
    assert_eq!(queries.borrow().len(), 1);

    let mut steps = 0;
    while table.load_more(Some(table.len())).unwrap() {
        steps += 1;
        assert!(steps < 10);
    }
    assert_eq!(steps, 4);
    assert_eq!(table.phase(), LoadPhase::Exhausted);

    let mut seen = ids(&table);
    assert_eq!(seen.len(), 237);
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen, (0..237).collect::<Vec<i64>>());

    let offsets: Vec<Option<usize>> = queries.borrow().iter().map(|q| q.offset).collect();
    assert_eq!(
        offsets,
        [Some(0), Some(50), Some(100), Some(150), Some(200)]
    );
    assert!(queries.borrow().iter().all(|q| q.limit == Some(50)));

    let state = table.page_state();
    assert_eq!(state.loaded, 237);
    assert_eq!(state.page, 4);
    assert!(state.is_exhausted());
}

#[test]
fn unknown_total_stops_on_short_page() {
    let mut table = DataTable::new(paged_options(50), Paged::new(120, false)).unwrap();
    assert_eq!(table.row_count(), None);
    assert!(table.load_more(None).unwrap());
    assert!(table.load_more(None).unwrap());
    assert_eq!(table.loaded_len(), 120);
    assert_eq!(table.phase(), LoadPhase::Exhausted);
    assert!(!table.load_more(None).unwrap());
}

#[test]
fn unknown_total_stops_on_empty_page() {
    let mut table = DataTable::new(paged_options(50), Paged::new(100, false)).unwrap();
    assert!(table.load_more(None).unwrap());
    assert_eq!(table.phase(), LoadPhase::Idle);
    assert!(!table.load_more(None).unwrap());
    assert_eq!(table.loaded_len(), 100);
    assert_eq!(table.phase(), LoadPhase::Exhausted);
}

#[test]
fn load_all_advances_one_page_at_a_time() {
    let source = Paged::new(237, true);
    let queries = Rc::clone(&source.queries);
    let mut table = DataTable::new(paged_options(50), source).unwrap();
    table.load_all().unwrap();
    assert_eq!(table.loaded_len(), 237);
    assert!(table.page_state().is_exhausted());

    let queries = queries.borrow();
    assert_eq!(queries.len(), 5);
    assert!(queries[1..].iter().all(|q| q.load_all));
    for pair in queries.windows(2) {
        assert_eq!(pair[1].offset.unwrap() - pair[0].offset.unwrap(), 50);
    }
}

#[test]
fn failed_query_commits_nothing() {
    let source = Paged::new(237, true);
    let fail = Rc::clone(&source.fail);
    let mut table = DataTable::new(paged_options(50), source).unwrap();

    fail.set(true);
    let err = table.load_more(None).unwrap_err();
    assert!(matches!(err, Error::DataSource(_)));
    assert_eq!(table.loaded_len(), 50);
    assert_eq!(table.phase(), LoadPhase::Idle);

    fail.set(false);
    assert!(table.load_more(None).unwrap());
    assert_eq!(table.loaded_len(), 100);
}

#[test]
fn repeated_key_does_not_pull_the_next_page_back() {
    let offsets = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&offsets);
    let source = FnSource::new(move |query: &Query| -> Result<Vec<RowData>, BoxError> {
        let offset = query.offset.unwrap_or(0);
        seen.borrow_mut().push(offset);
        Ok((offset..(offset + query.limit.unwrap_or(12)).min(12))
            .map(|i| {
                let id = if i == 5 { 0 } else { i as i64 };
                RowData::new().with("id", id).with("n", i as i64)
            })
            .collect())
    });
    let mut table = DataTable::new(paged_options(4), source).unwrap();
    table.load_all().unwrap();

    assert_eq!(*offsets.borrow(), [0, 4, 8, 12]);
    assert_eq!(table.loaded_len(), 11);
    assert_eq!(table.phase(), LoadPhase::Exhausted);
    let mut keys = ids(&table);
    keys.sort_unstable();
    assert_eq!(keys, [0, 1, 2, 3, 4, 6, 7, 8, 9, 10, 11]);
    let replaced = table.record(&IndexKey::from(0i64)).unwrap();
    assert_eq!(replaced.value("n"), &Value::from(5i64));
}

#[test]
fn load_more_after_delete_continues_past_the_loaded_rows() {
    let source = Paged::new(6, true);
    let queries = Rc::clone(&source.queries);
    let mut table = DataTable::new(paged_options(2), source).unwrap();
    assert!(table.load_more(Some(2)).unwrap());
    assert_eq!(ids(&table), [0, 1, 2, 3]);

    assert_eq!(table.delete_rows([&IndexKey::from(3)]), 1);
    let positions = table.positions().clone();
    assert!(table.load_more(Some(table.len())).unwrap());
    assert_eq!(ids(&table), [0, 1, 2, 4, 5]);
    for (position, key) in positions.keys().iter().enumerate() {
        assert_eq!(table.key_to_position(key), Some(position));
    }

    let offsets: Vec<Option<usize>> = queries.borrow().iter().map(|q| q.offset).collect();
    assert_eq!(offsets, [Some(0), Some(2), Some(4)]);
    assert_eq!(table.phase(), LoadPhase::Exhausted);
    assert!(!table.load_more(Some(table.len())).unwrap());
}

#[test]
fn batch_with_missing_key_is_rejected_whole() {
    let err = DataTable::from_rows(
        scenario_options(),
        vec![row(1, "a", 1), RowData::new().with("name", "x")],
    )
    .unwrap_err();
    assert!(matches!(err, Error::MissingIndexKey { .. }));

    let mut table = scenario();
    let err = table
        .append_rows(vec![row(4, "d", 0), RowData::new().with("id", 1.5)])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidIndexKey { .. }));
    assert_eq!(table.loaded_len(), 3);
}

#[test]
fn refresh_keeps_focused_row() {
    let mut table = scenario();
    table.set_focus(2).unwrap();
    let mut reversed = scenario_rows();
    reversed.reverse();
    table.set_source(VecSource::new(reversed));

    table.refresh(false).unwrap();
    assert_eq!(ids(&table), [3, 2, 1]);
    assert_eq!(table.focus_position(), Some(0));

    table.refresh(true).unwrap();
    assert_eq!(table.focus_position(), Some(0));
}

#[test]
fn non_reset_refresh_reloads_loaded_pages() {
    let source = Paged::new(237, true);
    let queries = Rc::clone(&source.queries);
    let mut table = DataTable::new(paged_options(50), source).unwrap();
    table.load_more(None).unwrap();
    table.load_more(None).unwrap();
    assert_eq!(table.loaded_len(), 150);

    table.refresh(false).unwrap();
    assert_eq!(table.loaded_len(), 150);
    let last = queries.borrow().last().cloned().unwrap();
    assert_eq!(last.offset, Some(0));
    assert_eq!(last.limit, Some(150));
}

#[test]
fn reset_restores_initial_sort() {
    let options = scenario_options().with_sort_by(Some(SortBy::ascending("score")));
    let mut table = DataTable::from_rows(options, scenario_rows()).unwrap();
    assert_eq!(ids(&table), [2, 3, 1]);

    table.sort_by_column("name", Some(true), false).unwrap();
    assert_eq!(ids(&table), [3, 2, 1]);

    table.reset(false).unwrap();
    assert_eq!(table.sort_by(), Some(&SortBy::descending("name")));

    table.reset(true).unwrap();
    assert_eq!(table.sort_by(), Some(&SortBy::ascending("score")));
    assert_eq!(ids(&table), [2, 3, 1]);
}

#[test]
fn query_sort_delegates_to_source() {
    let source = Paged::new(30, true);
    let queries = Rc::clone(&source.queries);
    let options = paged_options(10)
        .with_query_sort(true)
        .with_sort_by(Some(SortBy::descending("n")));
    let mut table = DataTable::new(options, source).unwrap();
    assert_eq!(
        queries.borrow()[0].sort,
        Some(SortBy::descending("n"))
    );
    // Rows arrive in source order; nothing is sorted locally.
    assert_eq!(ids(&table), (0..10).collect::<Vec<i64>>());

    table.sort_by_column("id", Some(true), false).unwrap();
    let last = queries.borrow().last().cloned().unwrap();
    assert_eq!(last.sort, Some(SortBy::descending("id")));
    assert_eq!(last.offset, Some(0));
}

#[test]
fn cached_row_is_reused_until_invalidated() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let options = scenario_options().with_materializer(
        move |table: &DataTable<RenderedRow>, key: &IndexKey| {
            counter.fetch_add(1, Ordering::SeqCst);
            RenderedRow::materialize(table, key)
        },
    );
    let mut table = DataTable::from_rows(options, scenario_rows()).unwrap();

    let first = table.get_row_by_position(0).unwrap();
    let again = table.get_row_by_position(0).unwrap();
    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    table.set_value(0, "name", "z").unwrap();
    let fresh = table.get_row_by_position(0).unwrap();
    assert!(!Arc::ptr_eq(&first, &fresh));
    assert_eq!(fresh.cell("name").unwrap().text, "z");
    let stable = table.get_row_by_position(0).unwrap();
    assert!(Arc::ptr_eq(&fresh, &stable));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn row_attr_and_decoration_are_applied() {
    let options = TableOptions::new(vec![
        Column::hidden("id"),
        Column::new("name"),
        Column::new("score").with_decoration(|v| alloc::format!("{v} pts")),
    ])
    .with_index("id")
    .with_row_attr(Some(|record: &Record| {
        (record.value("score").as_i64() == Some(3)).then(|| String::from("highlight"))
    }));
    let mut table = DataTable::from_rows(options, scenario_rows()).unwrap();

    let top = table.get_row_by_position(0).unwrap();
    assert_eq!(top.texts(), ["a", "3 pts"]);
    assert_eq!(top.attr.as_deref(), Some("highlight"));
    assert_eq!(table.get_row_by_position(1).unwrap().attr, None);
}

#[test]
fn deleting_twice_is_a_no_op() {
    let mut table = scenario();
    let key = IndexKey::from(2);
    assert_eq!(table.delete_rows([&key]), 1);
    let positions = table.positions().clone();
    assert_eq!(table.delete_rows([&key]), 0);
    assert_eq!(table.positions(), &positions);
    assert_eq!(ids(&table), [1, 3]);
}

#[test]
fn delete_position_clamps_focus() {
    let mut table = scenario();
    table.set_focus(2).unwrap();
    assert_eq!(table.delete_position(2).unwrap(), IndexKey::from(3));
    assert_eq!(table.focus_position(), Some(1));
    assert!(table.delete_position(5).unwrap_err().is_bounds());
}

#[test]
fn duplicate_keys_keep_identity_last_write_wins() {
    let rows = vec![row(1, "a", 3), row(2, "b", 1), row(1, "c", 9)];
    let table = DataTable::from_rows(scenario_options(), rows).unwrap();
    assert_eq!(ids(&table), [1, 2]);
    let record = table.record(&IndexKey::from(1)).unwrap();
    assert_eq!(record.value("name"), &Value::from("c"));
    assert_eq!(record.value("score"), &Value::from(9));
}

#[test]
fn add_row_resorts_and_refilters() {
    let options = scenario_options().with_sort_by(Some(SortBy::ascending("score")));
    let mut table = DataTable::from_rows(options, scenario_rows()).unwrap();
    table.add_filter(|row| row.value("name").as_str() != Some("x"));

    table.add_row(row(4, "d", 2), true).unwrap();
    assert_eq!(ids(&table), [2, 3, 4, 1]);

    table.add_row(row(5, "x", 0), true).unwrap();
    assert_eq!(ids(&table), [2, 3, 4, 1]);
    assert_eq!(table.loaded_len(), 5);
}

#[test]
fn swap_rows_keeps_keys_in_place() {
    let mut table = scenario();
    table.swap_rows(0, 1, None).unwrap();
    assert_eq!(ids(&table), [1, 2, 3]);
    assert_eq!(table.get_value(0, "name").unwrap(), &Value::from("b"));
    assert_eq!(table.get_value(1, "name").unwrap(), &Value::from("a"));

    table.swap_rows(0, 1, Some("score")).unwrap();
    assert_eq!(table.get_value(0, "name").unwrap(), &Value::from("a"));
    assert_eq!(table.get_value(0, "score").unwrap(), &Value::from(1));
}

#[test]
fn computed_columns_follow_their_inputs() {
    let options = TableOptions::new(vec![
        Column::hidden("id"),
        Column::new("score"),
        Column::new("double").with_value_fn(|table, record| {
            assert_eq!(table.index_name(), "id");
            Value::from(record.value("score").as_i64().map(|s| s * 2))
        }),
    ])
    .with_index("id");
    let mut table = DataTable::from_rows(options, scenario_rows()).unwrap();
    assert_eq!(table.get_value(0, "double").unwrap(), &Value::from(6));

    table.set_value(0, "score", 10).unwrap();
    table.get_row_by_position(0).unwrap();
    assert_eq!(table.get_value(0, "double").unwrap(), &Value::from(20));

    assert!(matches!(
        table.set_value(0, "id", 7),
        Err(Error::IndexColumnReadOnly { .. })
    ));
}

#[test]
fn columns_can_be_added_removed_and_toggled() {
    let mut table = scenario();
    table.add_column(Column::new("flag"), true).unwrap();
    assert_eq!(table.get_value(2, "flag").unwrap(), &Value::from(true));
    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        ["id", "name", "score", "flag"]
    );

    table.sort_by_column("score", None, false).unwrap();
    assert_eq!(table.sort_column(), Some(1));
    table.hide_columns(["name"]).unwrap();
    assert_eq!(table.sort_column(), Some(0));
    assert_eq!(table.get_row_by_position(0).unwrap().texts(), ["1", "true"]);

    table.toggle_columns([ColumnRef::Name("name".into())], None).unwrap();
    assert_eq!(table.visible_column_index("name"), Some(0));

    table.remove_columns(["flag"]).unwrap();
    assert!(table.record_at(0).unwrap().get("flag").is_none());
    assert!(matches!(
        table.remove_columns(["id"]),
        Err(Error::IndexColumnReadOnly { .. })
    ));
    assert!(matches!(
        table.show_columns([ColumnRef::Index(9)]),
        Err(Error::ColumnIndexOutOfRange(9))
    ));
}

#[test]
fn set_columns_reloads_with_new_definitions() {
    let mut table = scenario();
    table
        .set_columns(vec![Column::new("score").with_width(4)])
        .unwrap();
    assert_eq!(table.column_names().collect::<Vec<_>>(), ["id", "score"]);
    assert_eq!(table.len(), 3);
    assert!(matches!(table.set_columns(Vec::new()), Err(Error::NoColumns)));
}

#[test]
fn typed_rows_round_trip_through_their_shape() {
    #[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Player {
        id: i64,
        name: String,
        score: i64,
    }

    impl RowShape for Player {
        const SHAPE: &'static str = "player";
    }

    let players = [
        Player { id: 1, name: "a".into(), score: 3 },
        Player { id: 2, name: "b".into(), score: 1 },
    ];
    let mut rows: Vec<RowData> = players
        .iter()
        .map(|p| RowData::from_shape(p).unwrap())
        .collect();
    rows.push(row(3, "c", 1));
    let table = DataTable::from_rows(scenario_options(), rows).unwrap();

    assert_eq!(table.typed_row::<Player>(1).unwrap(), players[1]);
    assert_eq!(table.record_at(2).unwrap().shape(), DYNAMIC_SHAPE);
    assert!(matches!(
        table.typed_row::<Player>(2),
        Err(Error::ShapeMismatch { .. })
    ));

    let registry = ShapeRegistry::new().with::<Player>();
    let decoded = registry.decode(table.record_at(0).unwrap()).unwrap().unwrap();
    assert_eq!(decoded.downcast_ref::<Player>(), Some(&players[0]));
    assert!(registry.decode(table.record_at(2).unwrap()).is_none());
}

#[test]
fn json_round_trip_reproduces_the_store() {
    let mut table = scenario();
    table.sort_by_column("score", Some(false), false).unwrap();
    table.set_value(1, "name", Value::Null).unwrap();
    let json = table.to_json().unwrap();

    let options = TableOptions::new(vec![Column::new("other")]).with_index("key");
    let mut other = DataTable::from_rows(options, Vec::new()).unwrap();
    other.load_json(&json).unwrap();

    assert_eq!(other.index_name(), "id");
    assert_eq!(other.to_document(), table.to_document());
    assert_eq!(ids(&other), [2, 3, 1]);
    assert!(other.column("id").unwrap().hide);
}

#[test]
fn json_round_trip_reloads_every_page() {
    let mut table = DataTable::new(paged_options(2), Paged::new(5, true)).unwrap();
    table.load_all().unwrap();
    let json = table.to_json().unwrap();

    let mut other = DataTable::from_rows(paged_options(2), Vec::new()).unwrap();
    other.load_json(&json).unwrap();
    assert_eq!(other.loaded_len(), 5);
    assert_eq!(other.to_document(), table.to_document());
    assert!(other.page_state().is_exhausted());
}

#[cfg(feature = "std")]
#[test]
fn save_and_load_through_a_file() {
    let path = std::env::temp_dir().join(alloc::format!(
        "datatable-roundtrip-{}.json",
        std::process::id()
    ));
    let table = scenario();
    table.save(&path).unwrap();

    let mut loaded = DataTable::from_rows(scenario_options(), Vec::new()).unwrap();
    loaded.load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded.to_document(), table.to_document());
}

#[test]
fn invalid_configuration_is_rejected() {
    let err = DataTable::from_rows(TableOptions::new(Vec::new()), Vec::new()).unwrap_err();
    assert!(matches!(err, Error::NoColumns));
    assert!(err.is_configuration());

    let err = DataTable::from_rows(scenario_options().with_limit(Some(0)), Vec::new()).unwrap_err();
    assert!(matches!(err, Error::InvalidPageSize));

    let err = DataTable::from_rows(
        scenario_options().with_sort_by(Some(SortBy::ascending("nope"))),
        Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnknownColumn(_)));

    let mut table = scenario();
    assert!(table.sort_by_column("nope", None, false).unwrap_err().is_configuration());
    assert!(table.get_value(0, "nope").unwrap_err().is_configuration());
    assert!(table.position_to_key(3).unwrap_err().is_bounds());
}

#[test]
fn missing_index_column_is_inserted_hidden() {
    let options = TableOptions::new(vec![Column::new("name")]);
    let rows = vec![RowData::new().with("index", "k1").with("name", "a")];
    let mut table = DataTable::from_rows(options, rows).unwrap();
    assert_eq!(table.column_names().collect::<Vec<_>>(), ["index", "name"]);
    assert!(table.column("index").unwrap().hide);
    assert_eq!(table.get_row_by_position(0).unwrap().texts(), ["a"]);
    assert_eq!(table.position_to_key(0).unwrap(), &IndexKey::from("k1"));
}

#[test]
fn positions_step_within_bounds() {
    let table = scenario();
    assert_eq!(table.next_position(0), Some(1));
    assert_eq!(table.next_position(2), None);
    assert_eq!(table.prev_position(1), Some(0));
    assert_eq!(table.prev_position(0), None);
    assert_eq!(table.key_to_position(&IndexKey::from(3)), Some(2));
    assert_eq!(table.key_to_position(&IndexKey::from(9)), None);
}

#[test]
fn negotiate_widths_examples() {
    let widths = [10, 10, 10];
    let mins = [5, 5, 5];

    let grown = negotiate_widths(&widths, &mins, 0, 8, ResizeDirection::Forward).unwrap();
    assert_eq!(grown, [18, 5, 7]);

    let clamped = negotiate_widths(&widths, &mins, 0, 50, ResizeDirection::Forward).unwrap();
    assert_eq!(clamped, [20, 5, 5]);

    let shrunk = negotiate_widths(&widths, &mins, 1, -10, ResizeDirection::Forward).unwrap();
    assert_eq!(shrunk, [10, 5, 15]);

    let backward = negotiate_widths(&widths, &mins, 2, 4, ResizeDirection::Backward).unwrap();
    assert_eq!(backward, [10, 6, 14]);

    let same = negotiate_widths(&widths, &mins, 1, 0, ResizeDirection::Forward).unwrap();
    assert_eq!(same, widths);
}

#[test]
fn negotiate_widths_rejects_short_runs() {
    assert!(matches!(
        negotiate_widths(&[10], &[1], 0, 3, ResizeDirection::Forward),
        Err(Error::ResizeRun { .. })
    ));
    assert!(matches!(
        negotiate_widths(&[10, 10], &[1, 1], 1, 3, ResizeDirection::Forward),
        Err(Error::ResizeRun { .. })
    ));
    assert!(matches!(
        negotiate_widths(&[10, 10], &[1, 1], 5, 3, ResizeDirection::Backward),
        Err(Error::ResizeRun { .. })
    ));
    assert!(matches!(
        negotiate_widths(&[10, 10], &[1], 0, 3, ResizeDirection::Forward),
        Err(Error::WidthMismatch { expected: 2, found: 1 })
    ));
    // Backward from the first column runs forward instead.
    assert_eq!(
        negotiate_widths(&[10, 10], &[1, 1], 0, 3, ResizeDirection::Backward).unwrap(),
        [13, 7]
    );
}

#[cfg(debug_assertions)]
#[test]
#[should_panic]
fn negotiate_widths_flags_boundary_overflow() {
    let widths = [u32::MAX - 2, 10];
    let mins = [0, 0];
    let _ = negotiate_widths(&widths, &mins, 0, 5, ResizeDirection::Forward);
}

#[test]
fn negotiate_widths_conserves_total_randomized() {
    let mut rng = Lcg::new(0xC0FFEE);
    for _ in 0..2_000 {
        let n = rng.gen_range_usize(2, 9);
        let mut widths: Vec<u32> = (0..n).map(|_| rng.gen_range_u32(1, 40)).collect();
        let mins: Vec<u32> = widths.iter().map(|&w| rng.gen_range_u32(0, w + 1)).collect();
        for _ in 0..8 {
            let index = rng.gen_range_usize(0, n);
            let direction = if rng.gen_bool() {
                ResizeDirection::Forward
            } else {
                ResizeDirection::Backward
            };
            let delta = rng.gen_range_u32(0, 61) as i32 - 30;
            let before: u32 = widths.iter().sum();
            match negotiate_widths(&widths, &mins, index, delta, direction) {
                Ok(out) => {
                    assert_eq!(out.iter().sum::<u32>(), before);
                    for (w, m) in out.iter().zip(&mins) {
                        assert!(w >= m);
                    }
                    widths = out;
                }
                Err(err) => {
                    assert!(matches!(err, Error::ResizeRun { .. }));
                    assert_eq!(index, n - 1);
                    assert_eq!(direction, ResizeDirection::Forward);
                }
            }
        }
    }
}

#[test]
fn header_drag_resolution() {
    let drag = |index, origin, delta| HeaderDrag { index, origin, delta };
    let cell = |offset| DragOrigin::Cell { offset, width: 9 };

    assert_eq!(
        resolve_header_drag(&drag(0, DragOrigin::Divider, 4), 3),
        Some((ResizeDirection::Forward, 4))
    );
    assert_eq!(
        resolve_header_drag(&drag(1, cell(1), 4), 3),
        Some((ResizeDirection::Backward, -4))
    );
    assert_eq!(
        resolve_header_drag(&drag(1, cell(8), 4), 3),
        Some((ResizeDirection::Forward, 4))
    );
    assert_eq!(resolve_header_drag(&drag(1, cell(4), 4), 3), None);
    assert_eq!(resolve_header_drag(&drag(0, cell(1), 4), 3), None);
    assert_eq!(resolve_header_drag(&drag(2, cell(8), 4), 3), None);
}

#[test]
fn drag_header_fixes_changed_widths() {
    let mut table = scenario();
    let events = record_events(&mut table);
    let drag = HeaderDrag {
        index: 0,
        origin: DragOrigin::Divider,
        delta: 4,
    };
    let out = table.drag_header(&drag, &[10, 10], &[3, 3]).unwrap();
    assert_eq!(out, Some(vec![14, 6]));
    assert_eq!(table.column("name").unwrap().sizing, Sizing::Given(14));
    assert_eq!(table.column("score").unwrap().sizing, Sizing::Given(6));
    assert_eq!(*events.lock().unwrap(), [Event::ColumnsResized]);

    assert!(matches!(
        table.drag_header(&drag, &[10, 10, 10], &[3, 3, 3]),
        Err(Error::WidthMismatch { .. })
    ));

    let ignored = HeaderDrag {
        index: 0,
        origin: DragOrigin::Cell { offset: 4, width: 9 },
        delta: 4,
    };
    assert_eq!(table.drag_header(&ignored, &[14, 6], &[3, 3]).unwrap(), None);
}

#[test]
fn fn_source_has_unknown_total() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let source = FnSource::new(move |query: &Query| -> Result<Vec<RowData>, BoxError> {
        counter.fetch_add(1, Ordering::SeqCst);
        let offset = query.offset.unwrap_or(0);
        Ok((offset..offset + 5)
            .filter(|i| *i < 12)
            .map(|i| RowData::new().with("id", i as i64))
            .collect())
    });
    let options = TableOptions::new(vec![Column::new("id")])
        .with_index("id")
        .with_page_size(5);
    let mut table = DataTable::new(options, source).unwrap();
    table.load_all().unwrap();
    assert_eq!(table.loaded_len(), 12);
    assert_eq!(table.row_count(), None);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn options_skip_initial_load() {
    let source = Paged::new(10, true);
    let calls = Arc::clone(&source.calls);
    let mut table = DataTable::new(paged_options(5).with_load_on_init(false), source).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(table.is_empty());
    assert!(table.load_more(Some(0)).unwrap());
    assert_eq!(table.loaded_len(), 5);
}
