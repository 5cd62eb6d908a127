//! In-memory workbook model
//!
//! The shape of data crossing the boundary from whatever spreadsheet
//! reader the host wires in: named sheets, ordered rows, header-addressed
//! cells. Decoding xlsx/csv bytes into this model is the reader's job.

use serde::{Deserialize, Serialize};

/// A single spreadsheet cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    /// Textual content
    Text(String),
    /// Numeric content
    Number(f64),
    /// Boolean content (availability flags and the like)
    Bool(bool),
    /// Blank cell
    Empty,
}

impl Cell {
    /// Convenience constructor for text cells
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Convenience constructor for numeric cells
    pub fn number(value: f64) -> Self {
        Cell::Number(value)
    }

    /// Whether the cell holds no content
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

/// One sheet: a header row plus ordered data rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Create an empty sheet with the given header row
    ///
    /// Headers are stored trimmed, matching how readers of real exports
    /// behave.
    pub fn new<I, S>(name: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            headers: headers
                .into_iter()
                .map(|h| h.into().trim().to_string())
                .collect(),
            rows: Vec::new(),
        }
    }

    /// Append a data row; short rows are padded with empty cells
    pub fn push_row<I>(&mut self, row: I)
    where
        I: IntoIterator<Item = Cell>,
    {
        let mut cells: Vec<Cell> = row.into_iter().collect();
        cells.resize(self.headers.len(), Cell::Empty);
        self.rows.push(cells);
    }

    /// Builder-style row append
    pub fn with_row<I>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = Cell>,
    {
        self.push_row(row);
        self
    }

    /// Sheet name as it appears in the workbook
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Header row
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of a header by exact (already-resolved) name
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Cell at (row, resolved column index)
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&Cell::Empty)
    }
}

/// A named collection of sheets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create an empty workbook
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet
    pub fn push_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    /// Builder-style sheet append
    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.push_sheet(sheet);
        self
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name())
    }

    /// Look up a sheet by its exact name
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    /// Number of sheets
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// Whether the workbook has no sheets
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}
