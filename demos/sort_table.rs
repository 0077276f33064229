/// Sortable Attribute Table Example
///
/// This example demonstrates:
/// - Loading a table from CSV
/// - Sorting by a column and toggling direction
/// - Following a selected row through a sort via its origin index
/// - Editing a cell from text
///
/// Run with `RUST_LOG=debug` to see the sorter's log output.

use tablesorter::{Table, TableChange};

fn print_table(table: &Table) {
    println!("   {}", table.schema().get_column_names().join(" | "));
    for (position, row) in table.iter_rows().enumerate() {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        println!(
            "   [{} <- origin {}] {}",
            position,
            table.permutation()[position],
            cells.join(" | ")
        );
    }
    println!();
}

fn main() -> tablesorter::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    println!("=== TableSorter Example ===\n");

    // Load data
    println!("1. Loading attributes from CSV...");
    let csv = "attribute,value,writable\n\
               HeapUsed,52428800,false\n\
               Verbose,,true\n\
               ObjectPendingFinalizationCount,0,false\n\
               GcCount,118,false\n";
    let mut table = Table::from_csv("memory", csv)?;
    print_table(&table);

    // Select a row, then sort
    let selected = table.origin_index(Some(3))?;
    println!("2. Selected row at position 3 (origin {:?})", selected);

    println!("3. Sorting by 'value' (click the header)...");
    let direction = table.toggle_sort(1)?;
    println!("   Direction: {:?}", direction);
    print_table(&table);

    if let Some(origin) = selected {
        println!("   Selection is now at position {}\n", table.position_of_origin(origin)?);
    }

    println!("4. Clicking the same header again...");
    let direction = table.toggle_sort(1)?;
    println!("   Direction: {:?}", direction);
    print_table(&table);

    // Edit a cell from text
    println!("5. Marking 'Verbose' as not writable...");
    let position = table.position_of_origin(1)?;
    table.begin_edit(position, 2)?;
    table.edit_text("false")?;
    table.commit_edit()?;
    print_table(&table);
    println!(
        "   Verbose writable: {:?}\n",
        table.row_by_origin(1)?[2].as_bool()
    );

    println!("6. Change log:");
    for change in table.drain_changes() {
        match change {
            TableChange::Sorted { key, swaps } => {
                println!("   sorted column {} {:?} ({} swaps)", key.column, key.direction, swaps)
            }
            other if other.is_structural() => println!("   rows changed: {:?}", other),
            other => println!("   {:?}", other),
        }
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
