//! Text formats for moving word roots in and out of the store.
//!
//! Export writes a fixed two-column header followed by one quoted record per
//! root. Import reads the same layout back, tolerating unquoted fields.

use rootify_core::Snapshot;

/// Header line written by [`format_csv`]
pub const CSV_HEADER: &str = "中文词根,英文对应";

/// Format `(chinese, english)` pairs as CSV, header first.
///
/// Embedded `"` are doubled so the output can be read back by [`parse_csv`].
pub fn format_csv<'a, I>(rows: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for (chinese, english) in rows {
        out.push_str(&quote(chinese));
        out.push(',');
        out.push_str(&quote(english));
        out.push('\n');
    }
    out
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Parse CSV content into `(chinese, english)` pairs.
///
/// The first line is a header and is skipped. Blank lines, rows with fewer
/// than two columns and rows with an empty key or gloss are dropped.
pub fn parse_csv(content: &str) -> Vec<(String, String)> {
    content
        .trim()
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut fields = split_record(line).into_iter();
            let chinese = fields.next()?;
            let english = fields.next()?;
            if chinese.is_empty() || english.is_empty() {
                tracing::debug!("Skipping incomplete CSV row: {line}");
                return None;
            }
            Some((chinese, english))
        })
        .collect()
}

fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);

    fields.into_iter().map(|f| f.trim().to_string()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportAction {
    Add,
    Update,
}

impl ImportAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportAction::Add => "add",
            ImportAction::Update => "update",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPreviewItem {
    pub chinese: String,
    pub english: String,
    pub action: ImportAction,
}

/// Tag each parsed row with whether importing it adds or replaces a root
pub fn preview_import(rows: &[(String, String)], existing: &Snapshot) -> Vec<ImportPreviewItem> {
    rows.iter()
        .map(|(chinese, english)| ImportPreviewItem {
            chinese: chinese.clone(),
            english: english.clone(),
            action: if existing.contains(chinese) {
                ImportAction::Update
            } else {
                ImportAction::Add
            },
        })
        .collect()
}
