use std::fmt;
use std::str::FromStr;

/// Convert a 1-based column number to its sheet letter ("A", ..., "Z", "AA", ...).
///
/// Bijective base-26. There is no letter for column 0; it yields the empty
/// string.
pub fn column_letter(mut n: usize) -> String {
    let mut letters = String::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.insert(0, (b'A' + rem as u8) as char);
        n = (n - rem) / 26;
    }
    letters
}

/// Inverse of [`column_letter`]: "A" → 1, "Z" → 26, "AA" → 27.
///
/// Returns `None` for empty input or anything other than ASCII uppercase.
pub fn column_number(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut n = 0usize;
    for c in letters.chars() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        n = n * 26 + (c as usize - 'A' as usize + 1);
    }
    Some(n)
}

/// An A1-style range inside a named table: `Items!B2` or `Items!A4:C6`.
///
/// Coordinates are 1-based sheet positions; `end` is inclusive and absent
/// for single-cell ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub table: String,
    pub start_col: usize,
    pub start_row: usize,
    pub end: Option<(usize, usize)>,
}

impl A1Range {
    /// Single-cell range.
    pub fn cell(table: impl Into<String>, col: usize, row: usize) -> Self {
        Self {
            table: table.into(),
            start_col: col,
            start_row: row,
            end: None,
        }
    }

    /// Rectangular range from (start_col, start_row) to (end_col, end_row).
    pub fn span(
        table: impl Into<String>,
        start_col: usize,
        start_row: usize,
        end_col: usize,
        end_row: usize,
    ) -> Self {
        Self {
            table: table.into(),
            start_col,
            start_row,
            end: Some((end_col, end_row)),
        }
    }
}

impl fmt::Display for A1Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}!{}{}",
            self.table,
            column_letter(self.start_col),
            self.start_row
        )?;
        if let Some((col, row)) = self.end {
            write!(f, ":{}{}", column_letter(col), row)?;
        }
        Ok(())
    }
}

/// Error for unparseable A1 range text.
#[derive(Debug)]
pub struct ParseRangeError(pub String);

impl fmt::Display for ParseRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid A1 range: {}", self.0)
    }
}

impl std::error::Error for ParseRangeError {}

impl FromStr for A1Range {
    type Err = ParseRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (table, cells) = s
            .split_once('!')
            .ok_or_else(|| ParseRangeError(format!("'{s}': missing table prefix")))?;
        if table.is_empty() {
            return Err(ParseRangeError(format!("'{s}': empty table name")));
        }

        let (start, end) = match cells.split_once(':') {
            Some((a, b)) => (a, Some(b)),
            None => (cells, None),
        };

        let (start_col, start_row) =
            parse_cell(start).ok_or_else(|| ParseRangeError(format!("'{s}': bad cell '{start}'")))?;
        let end = match end {
            Some(e) => Some(
                parse_cell(e).ok_or_else(|| ParseRangeError(format!("'{s}': bad cell '{e}'")))?,
            ),
            None => None,
        };

        Ok(A1Range {
            table: table.to_string(),
            start_col,
            start_row,
            end,
        })
    }
}

/// Split "C12" into (3, 12). Both halves must be non-empty.
fn parse_cell(s: &str) -> Option<(usize, usize)> {
    let digits_at = s.find(|c: char| c.is_ascii_digit())?;
    let col = column_number(&s[..digits_at])?;
    let row: usize = s[digits_at..].parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((col, row))
}
