use crate::store::Record;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Phone-number-like cell: 7+ digits/spaces/punctuation and nothing else.
    /// Such values are emitted as spreadsheet literal strings so a re-import
    /// does not reinterpret them as numbers and drop leading zeros.
    static ref PHONE_LIKE_REGEX: Regex = Regex::new(r"^[\d\s+()\-]{7,}$").unwrap();
}

/// Parse CSV text into rows of string fields.
///
/// The input is split on CRLF or LF first, then each line is scanned
/// character by character with an in-quotes flag: a `"` toggles quoting, a
/// doubled `""` inside a quoted field becomes a literal quote, and a comma
/// outside quotes ends the field. Because the line split happens before the
/// field scan, quoted fields spanning multiple lines are not supported.
///
/// # Examples
/// ```
/// use sheet_admin::csv::parse;
///
/// let rows = parse("a,\"b,c\"\nd,e");
/// assert_eq!(rows, vec![vec!["a".to_string(), "b,c".to_string()],
///                       vec!["d".to_string(), "e".to_string()]]);
/// ```
pub fn parse(text: &str) -> Vec<Vec<String>> {
    text.split(['\n'])
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .map(parse_row)
        .collect()
}

/// Parse a single CSV line into fields.
pub fn parse_row(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    // Doubled quote inside a quoted field - literal quote
                    current_field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                result.push(current_field);
                current_field = String::new();
            }
            _ => {
                current_field.push(c);
            }
        }
    }

    result.push(current_field);
    result
}

/// Parse a whole sheet: the first line is the header row, the rest are data.
///
/// Blank header names are filtered out of the header row only; data rows are
/// returned as-is (short rows are padded with empty strings at import time,
/// never rejected for shape mismatch).
pub fn parse_sheet(text: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let mut lines = parse(text.trim());
    if lines.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let headers: Vec<String> = lines
        .remove(0)
        .into_iter()
        .filter(|h| !h.trim().is_empty())
        .collect();

    (headers, lines)
}

/// Serialize records to CSV text in the given key order.
///
/// A synthetic `S.No` column (1-based row position) is prepended when
/// `include_serial` is set. Phone-number-like values are escaped as
/// spreadsheet literal strings; values containing a comma, quote, or newline
/// are quoted with internal quotes doubled.
pub fn serialize(records: &[&Record], keys: &[String], include_serial: bool) -> String {
    let mut out = Vec::with_capacity(records.len() + 1);

    let mut header: Vec<String> = Vec::new();
    if include_serial {
        header.push("S.No".to_string());
    }
    header.extend(keys.iter().cloned());
    out.push(header.join(","));

    for (index, record) in records.iter().enumerate() {
        let mut fields: Vec<String> = Vec::with_capacity(keys.len() + 1);
        if include_serial {
            fields.push((index + 1).to_string());
        }
        for key in keys {
            fields.push(escape_field(record.get(key)));
        }
        out.push(fields.join(","));
    }

    out.join("\n")
}

/// Escape a single cell for CSV output.
pub fn escape_field(cell: &str) -> String {
    if PHONE_LIKE_REGEX.is_match(cell) && !cell.contains(',') {
        // Spreadsheet literal-string escape, keeps the value textual
        format!("=\"\t{}\"", cell)
    } else if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// True when a serialized field went through the phone-literal escape.
pub fn is_phone_escaped(field: &str) -> bool {
    field.starts_with("=\"\t") && field.ends_with('"')
}
