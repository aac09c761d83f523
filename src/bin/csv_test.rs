use sheet_admin::csv::{escape_field, is_phone_escaped, parse, parse_row, parse_sheet, serialize};
use sheet_admin::store::Record;
use std::collections::HashMap;

// Helper to build a record with the given field pairs
fn record(id: &str, pairs: &[(&str, &str)]) -> Record {
    let mut fields = HashMap::new();
    for (k, v) in pairs {
        fields.insert(k.to_string(), v.to_string());
    }
    Record::new(id.to_string(), fields)
}

fn test_parse_row() {
    println!("\n====== Testing parse_row ======");

    assert_eq!(parse_row("a,b,c"), vec!["a", "b", "c"]);
    println!("✓ Plain fields split on commas");

    assert_eq!(parse_row("a,\"b,c\",d"), vec!["a", "b,c", "d"]);
    println!("✓ Quoted field keeps its comma");

    assert_eq!(parse_row("a,\"say \"\"hi\"\"\",c"), vec!["a", "say \"hi\"", "c"]);
    println!("✓ Doubled quote becomes a literal quote");

    assert_eq!(parse_row(""), vec![""]);
    assert_eq!(parse_row("a,,c"), vec!["a", "", "c"]);
    println!("✓ Empty fields are preserved");
}

fn test_parse() {
    println!("\n====== Testing parse ======");

    let rows = parse("a,b\nc,d");
    assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    println!("✓ Lines split into rows");

    let rows = parse("a,b\r\nc,d");
    assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    println!("✓ CRLF line endings handled");
}

fn test_parse_sheet() {
    println!("\n====== Testing parse_sheet ======");

    let (headers, rows) = parse_sheet("Name,Email,Phone\nAlice,a@x.com,9876543210\nBob,b@x.com,");
    assert_eq!(headers, vec!["Name", "Email", "Phone"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], vec!["Alice", "a@x.com", "9876543210"]);
    println!("✓ First line becomes the header row");

    let (headers, rows) = parse_sheet("Name,,Email\nAlice,x,a@x.com");
    assert_eq!(headers, vec!["Name", "Email"]);
    assert_eq!(rows[0].len(), 3);
    println!("✓ Blank header names filtered from the header row only");

    let (headers, rows) = parse_sheet("");
    assert!(headers.is_empty());
    assert!(rows.is_empty());
    println!("✓ Empty input yields empty headers and rows");
}

fn test_escape_field() {
    println!("\n====== Testing escape_field ======");

    assert_eq!(escape_field("plain"), "plain");
    println!("✓ Plain value passes through unchanged");

    assert_eq!(escape_field("a,b"), "\"a,b\"");
    assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    println!("✓ Commas and quotes trigger quoting with doubled quotes");

    let escaped = escape_field("9876543210");
    assert_eq!(escaped, "=\"\t9876543210\"");
    assert!(is_phone_escaped(&escaped));
    println!("✓ 10-digit phone number gets the literal-string escape");

    let escaped = escape_field("+91 98765 43210");
    assert!(is_phone_escaped(&escaped));
    println!("✓ Phone number with spaces and + also escaped");

    assert!(!is_phone_escaped(&escape_field("123456")));
    println!("✓ Six digits is too short for the phone escape");

    assert!(!is_phone_escaped(&escape_field("12345678,9")));
    println!("✓ Phone-like value containing a comma is quoted instead");

    assert!(!is_phone_escaped(&escape_field("call 9876543210")));
    println!("✓ Letters disqualify the phone escape");
}

fn test_serialize() {
    println!("\n====== Testing serialize ======");

    let a = record("row-0", &[("Name", "Alice"), ("Phone", "9876543210")]);
    let b = record("row-1", &[("Name", "Bob, Jr."), ("Phone", "")]);
    let records = vec![&a, &b];
    let keys = vec!["Name".to_string(), "Phone".to_string()];

    let csv = serialize(&records, &keys, true);
    let lines: Vec<&str> = csv.split('\n').collect();
    assert_eq!(lines[0], "S.No,Name,Phone");
    assert_eq!(lines[1], "1,Alice,=\"\t9876543210\"");
    assert_eq!(lines[2], "2,\"Bob, Jr.\",");
    println!("✓ Serial column, phone escape and quoting all present");

    let csv = serialize(&records, &keys, false);
    assert!(csv.starts_with("Name,Phone"));
    println!("✓ Serial column omitted when not requested");

    // Round trip modulo the serial column and phone escape
    let (headers, rows) = parse_sheet(&serialize(&records, &keys, false));
    assert_eq!(headers, keys);
    assert_eq!(rows[1][0], "Bob, Jr.");
    println!("✓ Quoted fields survive a round trip");
}

fn main() {
    test_parse_row();
    test_parse();
    test_parse_sheet();
    test_escape_field();
    test_serialize();
    println!("\nAll CSV tests passed.");
}
