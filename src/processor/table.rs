use log::debug;
use memmap2::Mmap;
use std::{collections::HashMap, fs::File, io::Write, path::Path};

use crate::processor::{
    ProcessorError, Result, RowFilter, StatMethod, line_parser::LineParser, stat_view::StatView,
};

/// One data line: string cells aligned with the table headers by index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    fn new(cells: Vec<String>) -> Self {
        Row { cells }
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.cells.get(idx).map(String::as_str)
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// In-memory CSV table with header-name lookup
///
/// # Examples
///
/// ```rust
/// # use csv_stat_view::processor::{StatMethod, RowFilter, table::Table};
/// let csv = b"Name,Session_Type,Max_Speed\nAl,Practice,10\nAl,Game,20\nBo,Practice,30\n";
/// let table = Table::parse(csv).unwrap();
/// let practice = RowFilter::equals("Session_Type", "Practice");
/// let view = table
///     .to_stat_view_filtered("Name", "Max_Speed", StatMethod::Mean, &practice)
///     .unwrap();
/// assert_eq!(view.get("Al"), Some(10.0));
/// assert_eq!(view.get("Bo"), Some(30.0));
/// ```
#[derive(Debug, Clone)]
pub struct Table {
    headers: HashMap<String, usize>,
    header_names: Vec<String>,
    rows: Vec<Row>,
    num_cols: usize,
    num_rows: usize,
}

impl Table {
    /// Loads a CSV file into memory using memory mapping
    ///
    /// The first line gives the column names; every following line becomes
    /// one row in file order. The mapping is released before returning.
    ///
    /// # Errors
    /// Returns a [`ProcessorError`] if:
    /// - File cannot be opened or mapped
    /// - File is empty (no header line)
    /// - A row has a different number of fields than the header
    /// - A line is not valid UTF-8
    pub fn load_csv(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| ProcessorError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        if file.metadata()?.len() == 0 {
            return Err(ProcessorError::MissingHeader);
        }
        let mmap = unsafe { Mmap::map(&file)? };

        let table = Self::parse(&mmap[..])?;
        debug!(
            "loaded {}: {} columns, {} rows",
            path.display(),
            table.num_cols,
            table.num_rows
        );
        Ok(table)
    }

    /// Builds a table from an in-memory CSV buffer
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let mut lines = LineParser::new(buf);

        let header_names = lines.next_line().ok_or(ProcessorError::MissingHeader)??;
        let num_cols = header_names.len();

        // a repeated name keeps the index of its last occurrence
        let mut headers = HashMap::with_capacity(num_cols);
        for (idx, name) in header_names.iter().enumerate() {
            headers.insert(name.clone(), idx);
        }

        let mut rows = Vec::new();
        while let Some(fields) = lines.next_line() {
            let fields = fields?;
            if fields.len() != num_cols {
                return Err(ProcessorError::RowWidthMismatch {
                    line: lines.line_number(),
                    expected: num_cols,
                    found: fields.len(),
                });
            }
            rows.push(Row::new(fields));
        }

        let num_rows = rows.len();
        Ok(Table {
            headers,
            header_names,
            rows,
            num_cols,
            num_rows,
        })
    }

    /// Writes the header line and every row, `,`-separated and `\n`-terminated
    pub fn write_csv<W: Write>(&self, mut out: W) -> Result<()> {
        writeln!(out, "{}", self.header_names.join(","))?;
        for row in &self.rows {
            writeln!(out, "{}", row.cells.join(","))?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Header names in file order
    pub fn headers(&self) -> &[String] {
        &self.header_names
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    pub fn column_index(&self, header: &str) -> Result<usize> {
        self.headers
            .get(header)
            .copied()
            .ok_or_else(|| ProcessorError::HeaderNotFound(header.to_string()))
    }

    /// Cell at column `header`, row `row_idx`
    pub fn at_col_row(&self, header: &str, row_idx: usize) -> Result<&str> {
        let col = self.column_index(header)?;
        let row = self
            .rows
            .get(row_idx)
            .ok_or(ProcessorError::RowIndexOutOfRange {
                index: row_idx,
                len: self.num_rows,
            })?;
        Ok(&row.cells[col])
    }

    /// Group all rows by `key_col` and reduce the numbers in `data_col`
    pub fn to_stat_view(
        &self,
        key_col: &str,
        data_col: &str,
        method: StatMethod,
    ) -> Result<StatView> {
        self.to_stat_view_filtered(key_col, data_col, method, &RowFilter::PassThrough)
    }

    /// Group the rows admitted by `filter` by `key_col` and reduce the
    /// numbers in `data_col` with `method`.
    ///
    /// Groups without any admitted row do not appear in the result.
    ///
    /// # Errors
    /// - [`ProcessorError::HeaderNotFound`] for an unknown key, data or filter column
    /// - [`ProcessorError::NumericParse`] on the first admitted data cell that
    ///   is not a number; nothing is returned in that case
    pub fn to_stat_view_filtered(
        &self,
        key_col: &str,
        data_col: &str,
        method: StatMethod,
        filter: &RowFilter,
    ) -> Result<StatView> {
        let key_idx = self.column_index(key_col)?;
        let data_idx = self.column_index(data_col)?;
        let filter_idx = filter
            .column()
            .map(|col| self.column_index(col))
            .transpose()?;

        let mut groups: HashMap<&str, Vec<f64>> = HashMap::new();
        let mut admitted = 0usize;
        for (i, row) in self.rows.iter().enumerate() {
            if let Some(fi) = filter_idx {
                if !filter.admits(&row.cells[fi]) {
                    continue;
                }
            }

            let raw = &row.cells[data_idx];
            let value = parse_number(raw).ok_or_else(|| ProcessorError::NumericParse {
                column: data_col.to_string(),
                row: i,
                value: raw.clone(),
            })?;
            groups
                .entry(row.cells[key_idx].as_str())
                .or_default()
                .push(value);
            admitted += 1;
        }

        let mut view = StatView::empty(method);
        for (key, mut values) in groups {
            view.insert(key.to_string(), method.reduce(&mut values)?);
        }

        debug!(
            "{method} of {data_col} by {key_col}: {admitted}/{} rows admitted, {} groups",
            self.num_rows,
            view.len()
        );
        Ok(view)
    }
}

/// Parse a numeric cell; surrounding ASCII whitespace is ignored
fn parse_number(cell: &str) -> Option<f64> {
    fast_float::parse::<f64, _>(cell.trim_ascii()).ok()
}
