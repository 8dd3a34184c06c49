use std::collections::{BTreeMap, BTreeSet};

use super::model::{Dimension, Record};

// ---------------------------------------------------------------------------
// Selection: which values of one dimension pass
// ---------------------------------------------------------------------------

/// Selection for a single dimension.
///
/// `All` places no constraint. `Values` keeps records whose value is in the
/// set; an empty set is a deliberate "nothing selected" and passes no record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Values(BTreeSet<String>),
}

impl Selection {
    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Values(set) => value.is_some_and(|v| set.contains(v)),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    /// Whether `value` is shown as checked in a widget.
    pub fn contains(&self, value: &str) -> bool {
        self.matches(Some(value))
    }
}

// ---------------------------------------------------------------------------
// Filtered view: indices into the loaded records
// ---------------------------------------------------------------------------

/// The subset of records passing the current filters, by index.
#[derive(Debug, Clone, Copy)]
pub struct FilteredView<'a> {
    records: &'a [Record],
    indices: &'a [usize],
}

impl<'a> FilteredView<'a> {
    pub fn new(records: &'a [Record], indices: &'a [usize]) -> Self {
        FilteredView { records, indices }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + 'a {
        let records = self.records;
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Cascading filter state
// ---------------------------------------------------------------------------

/// Options offered for one dimension after upstream narrowing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionOptions {
    pub dimension: Dimension,
    /// Sorted, deduplicated, empty cells excluded.
    pub options: Vec<String>,
}

/// Result of one pass through the cascade.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// One entry per dimension, in cascade order.
    pub options: Vec<DimensionOptions>,
    /// Records passing every categorical selection.
    pub indices: Vec<usize>,
    /// Dimensions whose selection was pruned because values went stale.
    pub resets: Vec<Dimension>,
}

impl Resolution {
    pub fn options_for(&self, dimension: Dimension) -> &[String] {
        self.options
            .iter()
            .find(|o| o.dimension == dimension)
            .map(|o| o.options.as_slice())
            .unwrap_or(&[])
    }
}

/// Ordered per-dimension selections. Absent dimensions mean `All`.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    dimensions: Vec<Dimension>,
    selections: BTreeMap<Dimension, Selection>,
}

impl FilterState {
    /// Start with every dimension unconstrained. Duplicates are dropped.
    pub fn new(dimensions: impl IntoIterator<Item = Dimension>) -> Self {
        let mut ordered = Vec::new();
        for dim in dimensions {
            if !ordered.contains(&dim) {
                ordered.push(dim);
            }
        }
        FilterState {
            dimensions: ordered,
            selections: BTreeMap::new(),
        }
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn selection(&self, dimension: Dimension) -> &Selection {
        static ALL: Selection = Selection::All;
        self.selections.get(&dimension).unwrap_or(&ALL)
    }

    pub fn set(&mut self, dimension: Dimension, selection: Selection) {
        if selection.is_all() {
            self.selections.remove(&dimension);
        } else {
            self.selections.insert(dimension, selection);
        }
    }

    pub fn select_all(&mut self, dimension: Dimension) {
        self.set(dimension, Selection::All);
    }

    pub fn select_none(&mut self, dimension: Dimension) {
        self.set(dimension, Selection::Values(BTreeSet::new()));
    }

    /// Flip one value, given the options currently offered for `dimension`.
    /// Selecting every option collapses back to `All`.
    pub fn toggle(&mut self, dimension: Dimension, value: &str, options: &[String]) {
        let mut set: BTreeSet<String> = match self.selection(dimension) {
            Selection::All => options.iter().cloned().collect(),
            Selection::Values(set) => set.clone(),
        };
        if !set.remove(value) {
            set.insert(value.to_string());
        }

        let covers_all = !options.is_empty() && options.iter().all(|o| set.contains(o));
        if covers_all {
            self.select_all(dimension);
        } else {
            self.set(dimension, Selection::Values(set));
        }
    }

    pub fn clear(&mut self) {
        self.selections.clear();
    }

    /// Whether `record` passes every selection.
    #[cfg(test)]
    fn matches(&self, record: &Record) -> bool {
        self.dimensions
            .iter()
            .all(|&dim| self.selection(dim).matches(dim.value(record)))
    }

    /// Walk the cascade, revalidating each selection against the options
    /// left by the dimensions before it, and return the surviving records.
    pub fn resolve(&mut self, records: &[Record]) -> Resolution {
        let mut current: Vec<usize> = (0..records.len()).collect();
        let mut options = Vec::with_capacity(self.dimensions.len());
        let mut resets = Vec::new();

        for &dim in &self.dimensions {
            let offered: Vec<String> = current
                .iter()
                .filter_map(|&i| dim.value(&records[i]))
                .collect::<BTreeSet<&str>>()
                .into_iter()
                .map(str::to_owned)
                .collect();

            // With nothing upstream there is nothing to validate against.
            if !current.is_empty() {
                if let Some(selection) = self.selections.get_mut(&dim) {
                    if prune_stale(selection, &offered) {
                        log::info!("{dim} selection pruned after upstream filter change");
                        resets.push(dim);
                    }
                }
            }

            let selection = self.selection(dim);
            current.retain(|&i| selection.matches(dim.value(&records[i])));

            options.push(DimensionOptions {
                dimension: dim,
                options: offered,
            });
        }

        for dim in &resets {
            if self.selections.get(dim).is_some_and(Selection::is_all) {
                self.selections.remove(dim);
            }
        }

        Resolution {
            options,
            indices: current,
            resets,
        }
    }
}

/// Drop selected values missing from `offered`; a selection emptied this
/// way becomes `All`. Returns whether anything changed.
fn prune_stale(selection: &mut Selection, offered: &[String]) -> bool {
    let Selection::Values(set) = selection else {
        return false;
    };
    if set.is_empty() {
        return false;
    }
    let before = set.len();
    set.retain(|v| offered.binary_search(v).is_ok());
    if set.len() == before {
        return false;
    }
    if set.is_empty() {
        *selection = Selection::All;
    }
    true
}
