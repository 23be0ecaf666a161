//! Minimal CSV assembly shared by the admin export and the bulk-import
//! exporter.

/// Escape one field: a value containing a comma, a double quote, or a
/// newline is wrapped in double quotes with inner quotes doubled; anything
/// else is emitted as-is.
pub fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

/// Join already-ordered field values into one escaped CSV line.
pub fn join_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|field| escape_field(field.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Attachment filename of the form `<stem>_<ISO date>.csv`.
pub fn timestamped_filename(stem: &str) -> String {
    format!("{}_{}.csv", stem, chrono::Utc::now().format("%Y-%m-%d"))
}
