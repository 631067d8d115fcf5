const KB: i64 = 1024;
const MB: i64 = KB * 1024;
const GB: i64 = MB * 1024;

/// Formats a byte count with base-1024 units and two decimals, e.g.
/// `1536` becomes `"1.50KB"`. Negative input yields `"0B"`.
pub fn format_size(bytes: i64) -> String {
    if bytes < 0 {
        "0B".to_string()
    } else if bytes < KB {
        format!("{:.2}B", bytes as f64)
    } else if bytes < MB {
        format!("{:.2}KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.2}MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.2}GB", bytes as f64 / GB as f64)
    }
}
