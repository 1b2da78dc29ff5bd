use datatable::{BoxError, Column, DataTable, FnSource, Query, RowData, TableOptions};

fn main() -> Result<(), datatable::Error> {
    // Example: a source that only knows how to serve one page at a time.
    const TOTAL: usize = 237;
    let source = FnSource::new(|query: &Query| -> Result<Vec<RowData>, BoxError> {
        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(TOTAL);
        println!("query offset={offset} limit={limit}");
        Ok((offset..TOTAL.min(offset + limit))
            .map(|i| RowData::new().with("id", i as i64).with("square", (i * i) as i64))
            .collect())
    });

    let options = TableOptions::new(vec![Column::new("id"), Column::new("square")])
        .with_index("id")
        .with_page_size(50);
    let mut table = DataTable::new(options, source)?;

    // A viewport asks for more rows whenever it scrolls past the loaded tail.
    while table.load_more(Some(table.len()))? {
        println!("{:?}", table.page_state());
    }
    println!("done: {:?}", table.page_state());
    Ok(())
}
