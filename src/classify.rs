//! Role classification and index tables shared by every composite.

use std::collections::BTreeMap;

use arcstr::ArcStr;
use regex::Regex;

use crate::error::{DataError, Result};
use crate::instance::Instance;
use crate::names::INDEX;

/// Maps a name pattern to a role of the enclosing composite.
///
/// If the pattern has an `index` capture group, the role is indexed by it.
#[derive(Debug, Clone)]
pub struct Rule<R> {
    pub pattern: Regex,
    pub role: R,
}

impl<R> Rule<R> {
    pub fn new(pattern: Regex, role: R) -> Self {
        Self { pattern, role }
    }
}

/// Returns the role and index of the first rule in `rules` matching `name`.
pub fn classify<R: Copy>(
    rules: &[Rule<R>],
    composite: &'static str,
    name: &ArcStr,
) -> Result<(R, Option<usize>)> {
    for rule in rules {
        let Some(caps) = rule.pattern.captures(name) else {
            continue;
        };
        let index = caps
            .name(INDEX)
            .map(|text| {
                text.as_str().parse().map_err(|_| DataError::InvalidIndex {
                    composite,
                    name: name.clone(),
                    text: text.as_str().to_string(),
                })
            })
            .transpose()?;
        return Ok((rule.role, index));
    }
    Err(DataError::UnknownElement {
        composite,
        name: name.clone(),
    })
}

/// Unwraps the index of an indexed rule.
pub(crate) fn require_index(
    index: Option<usize>,
    composite: &'static str,
    name: &ArcStr,
) -> Result<usize> {
    index.ok_or_else(|| DataError::InvalidIndex {
        composite,
        name: name.clone(),
        text: String::new(),
    })
}

/// A role that holds at most one instance.
#[derive(Debug)]
pub struct Single {
    composite: &'static str,
    role: &'static str,
    inner: Option<Instance>,
}

impl Single {
    pub fn new(composite: &'static str, role: &'static str) -> Self {
        Self {
            composite,
            role,
            inner: None,
        }
    }

    pub fn set(&mut self, instance: Instance) -> Result<()> {
        if self.inner.is_some() {
            return Err(DataError::DuplicateElement {
                composite: self.composite,
                role: self.role,
                name: instance.name().clone(),
            });
        }
        self.inner = Some(instance);
        Ok(())
    }

    pub fn take(self) -> Result<Instance> {
        self.inner.ok_or(DataError::MissingElement {
            composite: self.composite,
            role: self.role,
        })
    }
}

/// A role holding one instance per index.
#[derive(Debug)]
pub struct Slots {
    composite: &'static str,
    role: &'static str,
    entries: BTreeMap<usize, Instance>,
}

impl Slots {
    pub fn new(composite: &'static str, role: &'static str) -> Self {
        Self {
            composite,
            role,
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, index: usize, instance: Instance) -> Result<()> {
        if self.entries.contains_key(&index) {
            return Err(DataError::DuplicateIndex {
                composite: self.composite,
                role: self.role,
                index,
                name: instance.name().clone(),
            });
        }
        self.entries.insert(index, instance);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Orders the slots by index, requiring indices `0..n` with `n <= max`.
    pub fn into_dense(self, max: usize) -> Result<Vec<Instance>> {
        into_dense(self.composite, self.role, self.entries, max)
    }

    /// Orders the slots by index, requiring exactly the indices `0..N`.
    pub fn into_exact<const N: usize>(self) -> Result<[Instance; N]> {
        let (composite, role) = (self.composite, self.role);
        let items = into_exact(composite, role, self.entries, N)?;
        into_array(composite, role, items)
    }
}

/// A role grouping any number of instances under each index.
#[derive(Debug)]
pub struct Groups {
    composite: &'static str,
    role: &'static str,
    entries: BTreeMap<usize, Vec<Instance>>,
}

impl Groups {
    pub fn new(composite: &'static str, role: &'static str) -> Self {
        Self {
            composite,
            role,
            entries: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, index: usize, instance: Instance) {
        self.entries.entry(index).or_default().push(instance);
    }

    /// Orders the groups by index, requiring exactly the indices `0..n`.
    pub fn into_exact(self, n: usize) -> Result<Vec<Vec<Instance>>> {
        into_exact(self.composite, self.role, self.entries, n)
    }
}

fn into_dense<T>(
    composite: &'static str,
    role: &'static str,
    entries: BTreeMap<usize, T>,
    max: usize,
) -> Result<Vec<T>> {
    if let Some((&index, _)) = entries.range(max..).next() {
        return Err(DataError::IndexOutOfRange {
            composite,
            role,
            index,
            expected: max,
        });
    }
    entries
        .into_iter()
        .enumerate()
        .map(|(expected, (index, item))| {
            if index == expected {
                Ok(item)
            } else {
                Err(DataError::MissingIndex {
                    composite,
                    role,
                    index: expected,
                })
            }
        })
        .collect()
}

fn into_exact<T>(
    composite: &'static str,
    role: &'static str,
    entries: BTreeMap<usize, T>,
    n: usize,
) -> Result<Vec<T>> {
    let count = entries.len();
    let items = into_dense(composite, role, entries, n)?;
    if count < n {
        return Err(DataError::MissingIndex {
            composite,
            role,
            index: count,
        });
    }
    Ok(items)
}

/// Converts a length-checked vector into a fixed-size array.
pub(crate) fn into_array<T, const N: usize>(
    composite: &'static str,
    role: &'static str,
    items: Vec<T>,
) -> Result<[T; N]> {
    items.try_into().map_err(|items: Vec<T>| DataError::MissingIndex {
        composite,
        role,
        index: items.len(),
    })
}
