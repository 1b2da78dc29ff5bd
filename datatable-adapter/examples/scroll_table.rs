use datatable::{Column, DataTable, RowData, TableOptions};
use datatable_adapter::ScrollController;

fn main() -> Result<(), datatable::Error> {
    // Example: a viewport of 8 rows over a table that loads 20 rows per page.
    //
    // An adapter would:
    // - report the viewport height on layout
    // - scroll on user input
    // - draw the rows returned by visible_rows()
    let rows = (0..100i64)
        .map(|i| RowData::new().with("id", i).with("label", format!("item {i}")))
        .collect();
    let options = TableOptions::new(vec![Column::new("id"), Column::new("label")])
        .with_index("id")
        .with_page_size(20);
    let table = DataTable::from_rows(options, rows)?;

    let mut c = ScrollController::new(table).with_prefetch(4);
    c.on_viewport_size(8);
    for _ in 0..6 {
        let rows = c.visible_rows()?;
        let first = rows.first().map(|r| r.texts().join(" "));
        println!(
            "first_visible={} loaded={} top={first:?}",
            c.first_visible(),
            c.source().loaded_len()
        );
        c.scroll_by(7);
    }

    let anchor = c.capture_first_visible_anchor();
    c.source_mut().sort_by_column("id", Some(true), false)?;
    if let Some(anchor) = anchor {
        c.apply_anchor(&anchor);
    }
    println!("after sort: first_visible={}", c.first_visible());
    Ok(())
}
