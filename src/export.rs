use crate::csv;
use crate::error::{PanelError, Result};
use crate::store::Record;
use chrono::Local;

/// Persisted PDF export settings.
#[derive(Clone, serde::Serialize, serde::Deserialize, Debug)]
pub struct PdfConfig {
    pub title: String,
    /// Header image as a data URI, if configured.
    pub header_image: Option<String>,
    pub show_timestamp: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        PdfConfig {
            title: "Registrations".to_string(),
            header_image: None,
            show_timestamp: true,
        }
    }
}

/// Export records to CSV with the synthetic `S.No` column prepended.
///
/// A zero-row set is an EmptyExport condition, not a zero-row file.
pub fn to_csv(records: &[&Record], headers: &[String]) -> Result<String> {
    if records.is_empty() {
        return Err(PanelError::EmptyExport);
    }
    if headers.is_empty() {
        return Err(PanelError::EmptyExport);
    }
    Ok(csv::serialize(records, headers, true))
}

/// Caller-side check for the printable document's column widths: the
/// percentages must round to exactly 100.
pub fn validate_widths(widths: &[f64]) -> Result<()> {
    let total: f64 = widths.iter().sum();
    if total.round() != 100.0 {
        return Err(PanelError::InvalidWidths(total));
    }
    Ok(())
}

/// Build the print-ready HTML document for a PDF export.
///
/// Layout matches the print window: optional header image, optional title
/// block, optional export timestamp, then the data table with an `S.No.`
/// column and a `colgroup` carrying each column's percentage width. The
/// width list covers `S.No.` plus one entry per header; the sum is NOT
/// validated here (see [`validate_widths`]). Responsibility ends at the
/// HTML string; printing is the caller's concern.
pub fn to_printable_document(
    records: &[&Record],
    headers: &[String],
    widths: &[f64],
    title: &str,
    config: &PdfConfig,
) -> Result<String> {
    if records.is_empty() {
        return Err(PanelError::EmptyExport);
    }

    let final_title = if title.is_empty() { &config.title } else { title };

    let mut html = String::new();
    html.push_str("<html><head><title>");
    html.push_str(&escape_html(final_title));
    html.push_str("</title><style>");
    html.push_str(PRINT_STYLES);
    html.push_str("</style></head><body>");

    if let Some(image) = &config.header_image {
        html.push_str(&format!(
            "<div class=\"header-image\"><img src=\"{}\" /></div>",
            image
        ));
    }

    html.push_str(&format!(
        "<div class=\"header\"><h1>{}</h1></div>",
        escape_html(final_title)
    ));

    if config.show_timestamp {
        let stamp = Local::now().format("%d/%m/%Y, %H:%M:%S");
        html.push_str(&format!(
            "<div class=\"time\"><p>Export Time: {}</p></div>",
            stamp
        ));
    }

    html.push_str("<table><colgroup>");
    for width in widths {
        html.push_str(&format!("<col style=\"width:{}%\">", width));
    }
    html.push_str("</colgroup><thead><tr><th>S.No.</th>");
    for header in headers {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr></thead><tbody>");

    for (index, record) in records.iter().enumerate() {
        html.push_str(&format!("<tr><td>{}</td>", index + 1));
        for header in headers {
            html.push_str(&format!("<td>{}</td>", escape_html(record.get(header))));
        }
        html.push_str("</tr>");
    }

    html.push_str("</tbody></table></body></html>");
    Ok(html)
}

const PRINT_STYLES: &str = "\
@page { size: A4; margin: 1in; }\n\
body { font-family: Arial, sans-serif; }\n\
table { width: 100%; border-collapse: collapse; table-layout: fixed; }\n\
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; word-break: break-word; }\n\
th { background-color: #f2f2f2; }\n\
.header { text-align: center; margin-bottom: 20px; }\n\
.time { text-align: right; margin-top: 10px; font-size: 0.8em; color: #555; }\n\
.header-image { width: 100%; margin: 0 0 20px 0; }\n\
.header-image img { max-width: 100%; height: auto; display: block; margin: 0 auto; }";

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
