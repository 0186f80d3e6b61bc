//! Lenient comma-separated table parsing.
//!
//! The collection export is read line by line. Quoting follows the usual
//! double-quote convention, but malformed input never fails: an unterminated
//! quote simply runs to the end of its line.

/// Header plus header-aligned data rows parsed from delimited text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    /// Every row has exactly `headers.len()` cells.
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Parses raw text. Blank lines are skipped, short rows are padded with
    /// empty cells and surplus cells are dropped.
    pub fn parse(text: &str) -> Self {
        let mut lines = text.split('\n');
        let headers = parse_line(lines.next().unwrap_or_default());
        let width = headers.len();

        let rows = lines
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let mut cells = parse_line(line);
                cells.resize(width, String::new());
                cells
            })
            .collect();

        Self { headers, rows }
    }

    /// Returns `(header, cell)` pairs for one row.
    pub fn row_pairs(&self, index: usize) -> impl Iterator<Item = (&str, &str)> {
        let row = self.rows.get(index).map(Vec::as_slice).unwrap_or_default();
        self.headers
            .iter()
            .map(String::as_str)
            .zip(row.iter().map(String::as_str))
    }
}

/// Splits a single line into trimmed fields.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    fields.push(current.trim().to_string());
    fields
}
