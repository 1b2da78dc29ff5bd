use datatable::{Column, DataTable, RowData, SortBy, TableOptions, Value};

fn main() -> Result<(), datatable::Error> {
    // Example: a static table sorted by score, with a computed column and a filter.
    let options = TableOptions::new(vec![
        Column::hidden("id"),
        Column::new("name").with_width(10),
        Column::new("score").with_sort_reverse(true),
        Column::new("grade").with_value_fn(|_, row| {
            let grade = match row.value("score").as_i64() {
                Some(s) if s >= 90 => "A",
                Some(s) if s >= 75 => "B",
                Some(_) => "C",
                None => return Value::Null,
            };
            Value::from(grade)
        }),
    ])
    .with_index("id")
    .with_sort_by(Some(SortBy::descending("score")));

    let rows = [("ada", Some(97)), ("bob", Some(71)), ("cy", None), ("dee", Some(88))]
        .into_iter()
        .enumerate()
        .map(|(i, (name, score))| {
            RowData::new()
                .with("id", i as i64)
                .with("name", name)
                .with("score", score)
        })
        .collect();

    let mut table = DataTable::from_rows(options, rows)?;
    for position in 0..table.len() {
        let row = table.get_row_by_position(position)?;
        println!("{:?}", row.texts());
    }

    table.add_filter(|row| !row.value("score").is_null());
    table.sort_by_column("score", None, true)?;
    println!("filtered, ascending:");
    for position in 0..table.len() {
        let row = table.get_row_by_position(position)?;
        println!("{:?}", row.texts());
    }

    println!("{}", table.to_json()?);
    Ok(())
}
