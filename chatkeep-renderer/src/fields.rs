//! Best-effort reading of generated records.
//!
//! Records carry no strict schema. Consumers read `- **Label:** value` lines
//! they recognize and ignore everything else, so hand edits and extra
//! free-text sections never break parsing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// Every `- **Label:** value` line, keyed by label. Later duplicates win.
pub fn parse_labeled(text: &str) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    for line in text.lines() {
        let Some(rest) = line.trim().strip_prefix("- **") else {
            continue;
        };
        let Some((label, value)) = rest.split_once(":**") else {
            continue;
        };
        fields.insert(label.trim().to_string(), value.trim().to_string());
    }
    fields
}

/// A labeled RFC 3339 timestamp, if present and well formed.
pub fn labeled_timestamp(text: &str, label: &str) -> Option<DateTime<Utc>> {
    let fields = parse_labeled(text);
    let raw = fields.get(label)?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Save timestamp from a save-record.
pub fn saved_at(text: &str) -> Option<DateTime<Utc>> {
    labeled_timestamp(text, "Saved")
}

/// Load timestamp from a load-record.
pub fn loaded_at(text: &str) -> Option<DateTime<Utc>> {
    labeled_timestamp(text, "Loaded")
}

/// Body of the `## <heading>` section, up to the next `## ` heading.
///
/// Italic placeholder lines written by the template are dropped; `None` when
/// nothing else is left.
pub fn section(text: &str, heading: &str) -> Option<String> {
    let marker = format!("## {heading}");
    let mut lines = text.lines().skip_while(|line| line.trim_end() != marker);
    lines.next()?;

    let body: Vec<&str> = lines
        .take_while(|line| !line.starts_with("## "))
        .filter(|line| !is_placeholder(line.trim()))
        .collect();
    let body = body.join("\n").trim().to_string();
    if body.is_empty() {
        None
    } else {
        Some(body)
    }
}

fn is_placeholder(line: &str) -> bool {
    line.len() > 1 && line.starts_with('_') && line.ends_with('_')
}
