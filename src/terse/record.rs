// Record reconstruction and key=value extraction for RouterOS terse output
//
// Device terminals wrap long lines, so a logical entry can span several
// physical lines where only the first carries the leading index.

use regex_lite::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static INDEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+").expect("index pattern is valid"));

/// A key token is letters, digits, underscore or hyphen, preceded by
/// whitespace or the start of the text.
static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)([A-Za-z0-9_-]+)=").expect("key pattern is valid"));

/// One reconstructed logical line of terse output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub index: Option<u32>,
    /// Everything between the index and the first `key=`, e.g. `"A S"`.
    pub flags: Option<String>,
    pub fields: HashMap<String, String>,
}

impl Record {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();

        let (index, rest) = match INDEX_RE.captures(line) {
            Some(caps) => {
                let index = caps.get(1).and_then(|m| m.as_str().parse().ok());
                let end = caps.get(0).map_or(0, |m| m.end());
                (index, &line[end..])
            }
            None => (None, line),
        };

        let keys: Vec<(usize, usize, &str)> = KEY_RE
            .captures_iter(rest)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let key = caps.get(1)?;
                Some((whole.start(), whole.end(), key.as_str()))
            })
            .collect();

        let flags = keys
            .first()
            .map(|&(start, _, _)| rest[..start].trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string);

        let mut fields = HashMap::new();
        for (i, &(_, value_start, key)) in keys.iter().enumerate() {
            let value_end = keys.get(i + 1).map_or(rest.len(), |&(next, _, _)| next);
            let value = rest[value_start..value_end].trim();
            // First occurrence wins
            fields
                .entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }

        Record {
            index,
            flags,
            fields,
        }
    }

    /// Value of `key`, or `None` when the record does not carry it.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Value of `key` when present and non-empty.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Whether the flags column carries the given marker. RouterOS 6
    /// separates flags (`A S`), RouterOS 7 runs them together (`DAc`).
    pub fn has_flag(&self, marker: char) -> bool {
        self.flags
            .as_deref()
            .is_some_and(|flags| flags.contains(marker))
    }
}

/// Whether a trimmed line opens a new record (`"0 "`, `"12 "`, ...).
pub fn starts_with_index(line: &str) -> bool {
    INDEX_RE.is_match(line)
}

/// Rebuild logical records from raw multi-line output.
///
/// Continuation lines are space-joined onto the open record. Lines that
/// appear before any indexed line (table headers, banners) belong to no
/// record and are skipped.
pub fn recordize(raw: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current: Option<String> = None;

    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if starts_with_index(line) {
            if let Some(done) = current.replace(line.to_string()) {
                records.push(done);
            }
        } else if let Some(open) = current.as_mut() {
            open.push(' ');
            open.push_str(line);
        } else {
            tracing::trace!(line, "skipping line outside of any record");
        }
    }

    records.extend(current);
    records
}

/// Extract a single `key=value` field from a record string.
pub fn pick_field(record: &str, key: &str) -> Option<String> {
    Record::parse(record).get(key).map(str::to_string)
}

/// Extract the flags column from a record string.
pub fn pick_flags(record: &str) -> Option<String> {
    Record::parse(record).flags
}
