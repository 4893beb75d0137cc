use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;

use thiserror::Error;

pub mod line_parser;
pub mod query_builder;
pub mod stat_view;
pub mod stats;
pub mod table;

/// Error type used across the crate
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("cannot open {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line} is not valid UTF-8: {source}")]
    Utf8 {
        line: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("input has no header line")]
    MissingHeader,

    #[error("Missing column: {0}")]
    HeaderNotFound(String),

    #[error("row index {index} out of range for table with {len} rows")]
    RowIndexOutOfRange { index: usize, len: usize },

    #[error("line {line}: expected {expected} fields, got {found}")]
    RowWidthMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}, column {column}: {value:?} is not a number")]
    NumericParse {
        column: String,
        row: usize,
        value: String,
    },

    #[error("cannot reduce an empty group")]
    EmptyGroup,

    #[error("bottom_n({requested}) requested but the view only has {available} keys")]
    InvalidBottomN { requested: usize, available: usize },

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

pub type Result<T> = std::result::Result<T, ProcessorError>;

/// Statistic used to reduce the values collected for one group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatMethod {
    /// Arithmetic mean
    Mean,
    /// Lower-middle element of the sorted values
    Median,
    /// Most frequent value, smallest value on ties
    Mode,
}

impl StatMethod {
    /// Reduce `values` to a single number. Median and mode reorder the slice.
    pub fn reduce(self, values: &mut [f64]) -> Result<f64> {
        match self {
            StatMethod::Mean => stats::mean(values),
            StatMethod::Median => stats::median(values),
            StatMethod::Mode => stats::mode(values),
        }
    }
}

impl fmt::Display for StatMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatMethod::Mean => "mean",
            StatMethod::Median => "median",
            StatMethod::Mode => "mode",
        };
        f.write_str(name)
    }
}

impl FromStr for StatMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mean" | "avg" => Ok(StatMethod::Mean),
            "median" => Ok(StatMethod::Median),
            "mode" => Ok(StatMethod::Mode),
            other => Err(format!(
                "unknown stat method {other:?} (expected mean, median or mode)"
            )),
        }
    }
}

/// Predicate applied to the string value of one cell
#[derive(Clone)]
pub enum FilterPredicate {
    /// Cell equals the literal exactly
    Equals(String),
    /// Arbitrary string predicate
    Matches(Rc<dyn Fn(&str) -> bool>),
}

impl FilterPredicate {
    pub fn equals(value: impl Into<String>) -> Self {
        FilterPredicate::Equals(value.into())
    }

    pub fn matches(f: impl Fn(&str) -> bool + 'static) -> Self {
        FilterPredicate::Matches(Rc::new(f))
    }

    pub fn test(&self, cell: &str) -> bool {
        match self {
            FilterPredicate::Equals(target) => target == cell,
            FilterPredicate::Matches(f) => f(cell),
        }
    }
}

impl fmt::Debug for FilterPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterPredicate::Equals(v) => f.debug_tuple("Equals").field(v).finish(),
            FilterPredicate::Matches(_) => f.write_str("Matches(<fn>)"),
        }
    }
}

/// Row filter evaluated once per row during aggregation
#[derive(Debug, Clone, Default)]
pub enum RowFilter {
    /// Admits every row
    #[default]
    PassThrough,
    /// Admits rows whose `column` cell satisfies `predicate`
    Column {
        column: String,
        predicate: FilterPredicate,
    },
}

impl RowFilter {
    pub fn new(column: &str, predicate: FilterPredicate) -> Self {
        RowFilter::Column {
            column: column.to_string(),
            predicate,
        }
    }

    /// Shorthand for an equality filter on `column`
    pub fn equals(column: &str, value: &str) -> Self {
        Self::new(column, FilterPredicate::equals(value))
    }

    /// Column the filter reads, `None` for the pass-through filter
    pub fn column(&self) -> Option<&str> {
        match self {
            RowFilter::PassThrough => None,
            RowFilter::Column { column, .. } => Some(column),
        }
    }

    pub fn admits(&self, cell: &str) -> bool {
        match self {
            RowFilter::PassThrough => true,
            RowFilter::Column { predicate, .. } => predicate.test(cell),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_method_from_str() {
        assert_eq!("mean".parse::<StatMethod>().unwrap(), StatMethod::Mean);
        assert_eq!("Median".parse::<StatMethod>().unwrap(), StatMethod::Median);
        assert_eq!("MODE".parse::<StatMethod>().unwrap(), StatMethod::Mode);
        assert!("sum".parse::<StatMethod>().is_err());
        assert_eq!(StatMethod::Median.to_string(), "median");
    }

    #[test]
    fn test_pass_through_admits_everything() {
        let f = RowFilter::default();
        assert!(f.column().is_none());
        assert!(f.admits(""));
        assert!(f.admits("anything"));
    }

    #[test]
    fn test_equals_filter() {
        let f = RowFilter::equals("Session_Type", "Practice");
        assert_eq!(f.column(), Some("Session_Type"));
        assert!(f.admits("Practice"));
        assert!(!f.admits("practice"));
        assert!(!f.admits("Game"));
    }

    #[test]
    fn test_custom_predicate() {
        let f = RowFilter::new("Name", FilterPredicate::matches(|s| s.starts_with('A')));
        assert!(f.admits("Al"));
        assert!(!f.admits("Bo"));
        assert_eq!(format!("{:?}", FilterPredicate::matches(|_| true)), "Matches(<fn>)");
    }
}
