use log::trace;
use lru::LruCache;

use crate::processor::table::Table;
use crate::processor::{
    FilterPredicate, ProcessorError, Result, RowFilter, StatMethod, stat_view::StatView,
};
use std::cell::RefCell;
use std::num::NonZeroUsize;
use std::rc::Rc;

const DEFAULT_CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::new(128).unwrap();

/// Cache key of a stat view query.
///
/// Only equality filters can be keyed; queries with a closure predicate
/// bypass the cache.
#[derive(Debug, Hash, Eq, PartialEq, Clone)]
pub struct QueryKey {
    group_col: String,
    data_col: String,
    method: StatMethod,
    filter: Option<(String, String)>,
}

#[derive(Debug)]
pub struct QueryCache {
    cache: RefCell<LruCache<QueryKey, StatView>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            cache: RefCell::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, key: &QueryKey) -> Option<StatView> {
        self.cache.borrow_mut().get(key).cloned()
    }

    pub fn put(&self, key: QueryKey, value: StatView) {
        self.cache.borrow_mut().put(key, value);
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent builder for a single stat view
///
/// ```rust
/// # use std::rc::Rc;
/// # use csv_stat_view::processor::{FilterPredicate, StatMethod, table::Table};
/// let table = Rc::new(Table::parse(b"Name,Session_Type,Max_Speed\nAl,Game,20\n").unwrap());
/// let view = table
///     .query()
///     .filter("Session_Type", FilterPredicate::equals("Game"))
///     .group_by("Name")
///     .aggregate("Max_Speed", StatMethod::Mean)
///     .execute()
///     .unwrap();
/// assert_eq!(view.get("Al"), Some(20.0));
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: Rc<Table>,
    cache: Option<Rc<QueryCache>>,
    filter: RowFilter,
    group_col: Option<String>,
    aggregation: Option<(String, StatMethod)>,
}

impl QueryBuilder {
    pub fn new(table: Rc<Table>, cache: Option<Rc<QueryCache>>) -> Self {
        Self {
            table,
            cache,
            filter: RowFilter::PassThrough,
            group_col: None,
            aggregation: None,
        }
    }

    /// Restrict the rows to those whose `column` satisfies `predicate`.
    /// A later call replaces the earlier filter.
    pub fn filter(mut self, column: &str, predicate: FilterPredicate) -> Self {
        self.filter = RowFilter::new(column, predicate);
        self
    }

    /// Column whose value is the group key
    pub fn group_by(mut self, column: &str) -> Self {
        self.group_col = Some(column.to_string());
        self
    }

    /// Numeric column to reduce, and how
    pub fn aggregate(mut self, column: &str, method: StatMethod) -> Self {
        self.aggregation = Some((column.to_string(), method));
        self
    }

    /// Disable caching
    pub fn no_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn execute(self) -> Result<StatView> {
        let group_col = self
            .group_col
            .as_deref()
            .ok_or_else(|| ProcessorError::InvalidQuery("no group_by column".into()))?;
        let (data_col, method) = self
            .aggregation
            .as_ref()
            .ok_or_else(|| ProcessorError::InvalidQuery("no aggregation".into()))?;

        let key = self.cache_key(group_col, data_col, *method);
        match (&self.cache, key) {
            (Some(lru), Some(key)) => {
                if let Some(view) = lru.get(&key) {
                    trace!("query cache hit: {key:?}");
                    return Ok(view);
                }
                trace!("query cache miss: {key:?}");
                let view =
                    self.table
                        .to_stat_view_filtered(group_col, data_col, *method, &self.filter)?;
                lru.put(key, view.clone());
                Ok(view)
            }
            _ => self
                .table
                .to_stat_view_filtered(group_col, data_col, *method, &self.filter),
        }
    }

    fn cache_key(&self, group_col: &str, data_col: &str, method: StatMethod) -> Option<QueryKey> {
        let filter = match &self.filter {
            RowFilter::PassThrough => None,
            RowFilter::Column {
                column,
                predicate: FilterPredicate::Equals(value),
            } => Some((column.clone(), value.clone())),
            RowFilter::Column {
                predicate: FilterPredicate::Matches(_),
                ..
            } => return None,
        };
        Some(QueryKey {
            group_col: group_col.to_string(),
            data_col: data_col.to_string(),
            method,
            filter,
        })
    }
}

impl Table {
    pub fn query(self: &Rc<Self>) -> QueryBuilder {
        QueryBuilder::new(self.clone(), None)
    }

    pub fn query_with_cache(self: &Rc<Self>, cache: &Rc<QueryCache>) -> QueryBuilder {
        QueryBuilder::new(self.clone(), Some(cache.clone()))
    }
}
