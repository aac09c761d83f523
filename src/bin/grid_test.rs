use sheet_admin::grid::DataGrid;
use sheet_admin::query::SortDirection;
use std::collections::HashMap;

fn headers() -> Vec<String> {
    vec!["Name".to_string(), "Email".to_string(), "Phone".to_string()]
}

// A small roster with overlapping values across columns
fn roster() -> Vec<Vec<String>> {
    vec![
        vec!["Alice".into(), "alice@x.com".into(), "9876543210".into()],
        vec!["Bob".into(), "bob@x.com".into(), "9123456780".into()],
        vec!["Carol".into(), "ali@y.com".into(), "9988776655".into()],
        vec!["Dan".into(), "dan@x.com".into(), "9870001112".into()],
    ]
}

fn numbered(count: usize) -> Vec<Vec<String>> {
    (0..count)
        .map(|i| {
            vec![
                format!("Person {:02}", i),
                format!("p{}@x.com", i),
                format!("90000000{:02}", i),
            ]
        })
        .collect()
}

fn grid_with(rows: Vec<Vec<String>>) -> DataGrid {
    let mut grid = DataGrid::new();
    grid.import(headers(), rows, &[], HashMap::new());
    grid
}

fn test_import() {
    println!("\n====== Testing import ======");

    let grid = grid_with(roster());
    assert_eq!(grid.store.len(), 4);
    assert_eq!(grid.store.records()[0].id, "row-0");
    assert_eq!(grid.store.records()[3].id, "row-3");
    assert_eq!(grid.columns.visible(), &headers()[..]);
    println!("✓ Records imported with dense row ids");

    let mut grid = grid_with(roster());
    grid.toggle_row("row-0");
    grid.set_search("alice");
    grid.import(headers(), roster(), &[], HashMap::new());
    assert!(grid.selected.is_empty());
    assert!(grid.filters.search.is_empty());
    assert_eq!(grid.page(), 1);
    println!("✓ Re-import resets selection, filters and page");

    let mut grid = DataGrid::new();
    let mut short = roster();
    short[1] = vec!["Bob".into()];
    grid.import(headers(), short, &[], HashMap::new());
    assert_eq!(grid.store.records()[1].get("Email"), "");
    println!("✓ Short rows padded with empty strings");
}

fn test_search_and_filters() {
    println!("\n====== Testing search and filters ======");

    let mut grid = grid_with(roster());
    grid.set_search("ali");
    let names: Vec<&str> = grid.matching().iter().map(|r| r.get("Name")).collect();
    assert_eq!(names, vec!["Alice", "Carol"]);
    println!("✓ Search matches any visible column, case-insensitively");

    grid.set_search("987");
    let names: Vec<&str> = grid.matching().iter().map(|r| r.get("Name")).collect();
    assert_eq!(names, vec!["Alice", "Dan"]);
    println!("✓ Search over digits hits the phone column");

    let mut grid = grid_with(roster());
    grid.set_filter("Email", "@x.com");
    assert_eq!(grid.matching().len(), 3);
    grid.set_filter("Name", "b");
    let names: Vec<&str> = grid.matching().iter().map(|r| r.get("Name")).collect();
    assert_eq!(names, vec!["Bob"]);
    println!("✓ Per-column filters combine with AND");

    let before = grid.matching().len();
    grid.set_filter("Email", "@x.com");
    assert_eq!(grid.matching().len(), before);
    println!("✓ Re-applying the same filter changes nothing");

    grid.set_filter("Name", "");
    assert_eq!(grid.matching().len(), 3);
    println!("✓ Empty filter value removes the filter");

    grid.clear_filters();
    assert_eq!(grid.matching().len(), 4);
    println!("✓ clear_filters restores the full set");

    // Adding a filter can only shrink the result set
    let mut grid = grid_with(numbered(25));
    let mut previous = grid.matching().len();
    for term in ["Person", "Person 1", "Person 12"] {
        grid.set_filter("Name", term);
        let now = grid.matching().len();
        assert!(now <= previous, "narrowing a filter must not grow the set");
        previous = now;
    }
    println!("✓ Narrowing a filter never grows the result set");
}

fn test_sorting() {
    println!("\n====== Testing sorting ======");

    let mut grid = grid_with(roster());
    grid.toggle_sort("Name");
    assert_eq!(grid.filters.direction, SortDirection::Ascending);
    let first = grid.matching()[0].get("Name").to_string();
    assert_eq!(first, "Alice");
    println!("✓ First click sorts ascending");

    grid.toggle_sort("Name");
    assert_eq!(grid.filters.direction, SortDirection::Descending);
    assert_eq!(grid.matching()[0].get("Name"), "Dan");
    println!("✓ Second click flips to descending");

    grid.toggle_sort("Email");
    assert_eq!(grid.filters.direction, SortDirection::Ascending);
    println!("✓ New column resets to ascending");

    // Stability: ties keep their prior relative order
    let mut grid = DataGrid::new();
    grid.import(
        vec!["Group".to_string(), "Name".to_string()],
        vec![
            vec!["b".into(), "first".into()],
            vec!["a".into(), "second".into()],
            vec!["b".into(), "third".into()],
        ],
        &[],
        HashMap::new(),
    );
    grid.toggle_sort("Group");
    let names: Vec<&str> = grid.matching().iter().map(|r| r.get("Name")).collect();
    assert_eq!(names, vec!["second", "first", "third"]);
    println!("✓ Stable sort keeps tied rows in import order");
}

fn test_pagination() {
    println!("\n====== Testing pagination ======");

    let mut grid = grid_with(numbered(25));
    assert_eq!(grid.page_count(), 3);
    assert_eq!(grid.page_rows().len(), 10);
    println!("✓ 25 rows at 10 per page is 3 pages");

    grid.next_page();
    grid.next_page();
    assert_eq!(grid.page(), 3);
    assert_eq!(grid.page_rows().len(), 5);
    println!("✓ Last page holds the remaining 5 rows");

    grid.next_page();
    assert_eq!(grid.page(), 3);
    println!("✓ next_page stops at the last page");

    grid.set_search("Person 01");
    assert_eq!(grid.page(), 1);
    println!("✓ Page resets when a search shrinks the result set");

    let mut grid = grid_with(numbered(25));
    grid.next_page();
    grid.next_page();
    grid.set_rows_per_page(25);
    assert_eq!(grid.page(), 1);
    assert_eq!(grid.page_count(), 1);
    println!("✓ Page resets when the page size grows past the data");

    let mut grid = grid_with(Vec::new());
    assert_eq!(grid.page_count(), 1);
    assert!(grid.page_rows().is_empty());
    grid.prev_page();
    assert_eq!(grid.page(), 1);
    println!("✓ Empty dataset still reports one (empty) page");
}

fn test_selection() {
    println!("\n====== Testing selection ======");

    let mut grid = grid_with(roster());
    grid.toggle_row("row-1");
    assert!(grid.selected.contains("row-1"));
    grid.toggle_row("row-1");
    assert!(!grid.selected.contains("row-1"));
    println!("✓ Toggle flips membership");

    grid.toggle_page_selection();
    assert_eq!(grid.selected.len(), 4);
    grid.toggle_page_selection();
    assert!(grid.selected.is_empty());
    println!("✓ Page toggle selects all, then deselects all");

    grid.toggle_row("row-0");
    grid.toggle_page_selection();
    assert_eq!(grid.selected.len(), 4);
    println!("✓ Partially selected page gets fully selected");

    grid.set_search("alice");
    assert_eq!(grid.selected.len(), 4);
    println!("✓ Selection survives filtering out of view");

    grid.set_search("");
    grid.set_only_selected(true);
    grid.set_search("no-such-person");
    assert_eq!(grid.matching().len(), 4);
    println!("✓ Only-selected view ignores search and filters");
}

fn test_mutation() {
    println!("\n====== Testing row mutation ======");

    let mut grid = grid_with(roster());
    let mut fields = HashMap::new();
    fields.insert("Name".to_string(), "Alicia".to_string());
    grid.update_row("row-0", fields.clone()).unwrap();
    assert_eq!(grid.store.get("row-0").unwrap().get("Name"), "Alicia");
    println!("✓ Update replaces the record's fields");

    assert!(grid.update_row("row-99", fields).is_err());
    println!("✓ Updating a missing id is an error");

    grid.toggle_row("row-1");
    grid.toggle_highlight("row-1");
    grid.delete_row("row-1").unwrap();
    assert_eq!(grid.store.len(), 3);
    assert!(!grid.selected.contains("row-1"));
    assert!(!grid.highlighted.contains("row-1"));
    println!("✓ Delete prunes both the selected and highlighted sets");

    assert!(grid.delete_row("row-1").is_err());
    println!("✓ Deleting the same id twice is an error");

    let mut grid = grid_with(numbered(25));
    grid.toggle_row("row-3");
    grid.toggle_row("row-17");
    grid.toggle_highlight("row-3");
    let removed = grid.delete_selected();
    assert_eq!(removed, 2);
    assert_eq!(grid.store.len(), 23);
    assert!(grid.selected.is_empty());
    assert!(grid.highlighted.is_empty());
    println!("✓ delete_selected removes every checked row and prunes ids");

    // Ids are never reused after deletion
    assert!(grid.store.get("row-3").is_none());
    assert!(grid.store.get("row-4").is_some());
    println!("✓ Remaining ids unchanged after deletion");
}

fn test_columns() {
    println!("\n====== Testing column settings ======");

    let mut grid = grid_with(roster());
    grid.columns.hide("Phone");
    assert_eq!(grid.columns.visible().len(), 2);
    assert_eq!(grid.columns.hidden(), vec!["Phone".to_string()]);
    println!("✓ Hiding removes the header from the visible subset");

    grid.set_search("987");
    assert!(grid.matching().is_empty());
    println!("✓ Search skips hidden columns");

    grid.set_search("");
    grid.columns.restore();
    assert_eq!(grid.columns.visible().len(), 3);
    println!("✓ Restore brings back the full header list");

    grid.columns.set_alias("Name", "Participant");
    assert_eq!(grid.columns.display("Name"), "Participant");
    grid.columns.set_alias("Name", "  ");
    assert_eq!(grid.columns.display("Name"), "Name");
    println!("✓ Aliases apply and a blank alias clears");

    assert!(grid.columns.set_width("Name", 120.0));
    assert_eq!(grid.columns.width("Name"), Some(120.0));
    assert!(!grid.columns.set_width("Name", 40.0));
    assert_eq!(grid.columns.width("Name"), Some(120.0));
    println!("✓ Widths below the minimum are rejected, not clamped");

    assert!(grid.columns.resize("Name", 120.0, 300.0, 340.0));
    assert_eq!(grid.columns.width("Name"), Some(160.0));
    assert!(!grid.columns.resize("Name", 120.0, 300.0, 100.0));
    assert_eq!(grid.columns.width("Name"), Some(160.0));
    println!("✓ Drag-resize applies the delta and rejects under-minimum moves");
}

fn main() {
    test_import();
    test_search_and_filters();
    test_sorting();
    test_pagination();
    test_selection();
    test_mutation();
    test_columns();
    println!("\nAll grid tests passed.");
}
