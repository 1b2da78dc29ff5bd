use datatable::{Column, DataTable, DragOrigin, HeaderDrag, RowData, TableOptions};

fn main() -> Result<(), datatable::Error> {
    // Example: an adapter reports header drags with the widths it laid out.
    let options = TableOptions::new(vec![
        Column::new("a"),
        Column::new("b"),
        Column::new("c"),
    ])
    .with_index("a");
    let mut table = DataTable::from_rows(options, vec![RowData::new().with("a", 1)])?;

    let mut widths = vec![12, 12, 12];
    let mins = vec![4, 4, 4];
    let drags = [
        HeaderDrag { index: 0, origin: DragOrigin::Divider, delta: 5 },
        HeaderDrag { index: 1, origin: DragOrigin::Cell { offset: 1, width: 7 }, delta: 3 },
        HeaderDrag { index: 2, origin: DragOrigin::Cell { offset: 3, width: 12 }, delta: 9 },
    ];
    for drag in &drags {
        match table.drag_header(drag, &widths, &mins)? {
            Some(out) => widths = out,
            None => println!("ignored {drag:?}"),
        }
        println!("widths={widths:?} total={}", widths.iter().sum::<u32>());
    }
    for column in table.visible_columns() {
        println!("{} {:?}", column.name, column.sizing);
    }
    Ok(())
}
