use std::fmt::Display;

const SEPARATOR: &str = " | ";

/// Format a result set as text: a header of column names, a dash rule two
/// characters longer than the header, then one line per row. Every line ends
/// with a newline. An empty header gets an empty rule.
pub fn render<C: AsRef<str>, V: Display>(columns: &[C], rows: &[Vec<V>]) -> String {
    let header = columns.iter().map(|c| c.as_ref()).collect::<Vec<_>>().join(SEPARATOR);
    let rule_len = if header.is_empty() { 0 } else { header.chars().count() + 2 };

    let mut out = String::new();
    out.push_str(&header);
    out.push('\n');
    out.push_str(&"-".repeat(rule_len));
    out.push('\n');
    for row in rows {
        let line = row.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(SEPARATOR);
        out.push_str(&line);
        out.push('\n');
    }
    out
}
