//! # csv_stat_view
//!
//! Loads a comma-separated file into memory and computes per-group summary
//! statistics over a numeric column. It supports:
//!
//! - Memory-mapped CSV loading with fail-fast row width checks
//! - Grouped mean, median (lower-middle) and mode (smallest value on ties)
//! - Single-column row filters: string equality or any `Fn(&str) -> bool`
//! - Cross-view queries: keys greater than another view, bottom-N keys
//! - A fluent query builder with an LRU result cache
//!
//! The CSV grammar is deliberately minimal: fields are split on every `,`,
//! there is no quoting or escaping, and a trailing `\r` is ignored.
//!
//! # Example
//!
//! ```rust,no_run
//! use csv_stat_view::processor::{RowFilter, StatMethod, table::Table};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let table = Table::load_csv(Path::new("data/soccer_performance_data.csv"))?;
//!
//!     let practice = table.to_stat_view_filtered(
//!         "Name",
//!         "Max_Speed",
//!         StatMethod::Mean,
//!         &RowFilter::equals("Session_Type", "Practice"),
//!     )?;
//!     let game = table.to_stat_view_filtered(
//!         "Name",
//!         "Max_Speed",
//!         StatMethod::Mean,
//!         &RowFilter::equals("Session_Type", "Game"),
//!     )?;
//!
//!     for name in game.gt(&practice) {
//!         println!("{name} is faster in games");
//!     }
//!
//!     let sleep = table.to_stat_view("Name", "Sleep_Quality", StatMethod::Mean)?;
//!     println!("{:?}", sleep.bottom_n(3)?);
//!     Ok(())
//! }
//! ```

pub mod processor;

pub use processor::{
    FilterPredicate, ProcessorError, Result, RowFilter, StatMethod, query_builder::QueryCache,
    stat_view::StatView, table::Table,
};
