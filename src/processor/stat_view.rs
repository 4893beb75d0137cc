use std::collections::BTreeMap;
use std::fmt;

use crate::processor::{ProcessorError, Result, StatMethod};

/// Group key to statistic mapping produced by
/// [`Table::to_stat_view`](crate::processor::table::Table::to_stat_view).
///
/// Keys are kept in ascending order; that is also the order `Display`
/// prints them in.
#[derive(Debug, Clone, PartialEq)]
pub struct StatView {
    method: StatMethod,
    values: BTreeMap<String, f64>,
}

impl StatView {
    /// Build a view from already reduced values
    pub fn from_values<K, I>(method: StatMethod, values: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        StatView {
            method,
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn method(&self) -> StatMethod {
        self.method
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Keys of `other` whose value in `self` is strictly greater.
    ///
    /// Keys missing from `self` count as not greater; keys only in `self`
    /// are ignored.
    pub fn gt(&self, other: &StatView) -> Vec<String> {
        other
            .values
            .iter()
            .filter(|(key, theirs)| self.get(key).is_some_and(|ours| ours > **theirs))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// The `n` keys with the smallest values, ascending by value then key.
    ///
    /// # Errors
    /// [`ProcessorError::InvalidBottomN`] if `n` exceeds the number of keys.
    pub fn bottom_n(&self, n: usize) -> Result<Vec<String>> {
        if n > self.values.len() {
            return Err(ProcessorError::InvalidBottomN {
                requested: n,
                available: self.values.len(),
            });
        }

        let mut inverted: Vec<(f64, &String)> =
            self.values.iter().map(|(k, v)| (*v, k)).collect();
        inverted.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));

        Ok(inverted
            .into_iter()
            .take(n)
            .map(|(_, k)| k.clone())
            .collect())
    }

    pub(crate) fn insert(&mut self, key: String, value: f64) {
        self.values.insert(key, value);
    }

    pub(crate) fn empty(method: StatMethod) -> Self {
        StatView {
            method,
            values: BTreeMap::new(),
        }
    }
}

impl fmt::Display for StatView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.values {
            writeln!(f, "{key}: {value}")?;
        }
        Ok(())
    }
}
