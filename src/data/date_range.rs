use chrono::NaiveDate;

use super::model::Record;
use crate::error::InvalidRangeError;

// ---------------------------------------------------------------------------
// Closed order-date interval
// ---------------------------------------------------------------------------

/// `[from, to]`, inclusive on both ends. Construction enforces `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, InvalidRangeError> {
        if from > to {
            return Err(InvalidRangeError { from, to });
        }
        Ok(DateRange { from, to })
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Earliest and latest order date among `indices`.
    pub fn bounds(records: &[Record], indices: &[usize]) -> Option<Self> {
        let mut dates = indices.iter().map(|&i| records[i].order_date);
        let first = dates.next()?;
        let (from, to) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(DateRange { from, to })
    }
}

/// Keep the indices whose order date lies inside `range`.
pub fn filter_by_date(records: &[Record], indices: &[usize], range: DateRange) -> Vec<usize> {
    indices
        .iter()
        .copied()
        .filter(|&i| range.contains(records[i].order_date))
        .collect()
}

// ---------------------------------------------------------------------------
// User-requested range with recovery
// ---------------------------------------------------------------------------

/// The interval the user asked for. `None` ends follow the data bounds.
#[derive(Debug, Clone, Default)]
pub struct DateRangeState {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    last_valid: Option<DateRange>,
}

impl DateRangeState {
    /// Resolve the range to apply against a subset with the given bounds.
    ///
    /// An inverted request is not applied: the last valid range (or the
    /// bounds, if none was ever valid) is returned together with the error.
    pub fn effective(
        &mut self,
        bounds: Option<DateRange>,
    ) -> (Option<DateRange>, Option<InvalidRangeError>) {
        let from = self.from.or(bounds.map(|b| b.from));
        let to = self.to.or(bounds.map(|b| b.to));
        let (Some(from), Some(to)) = (from, to) else {
            return (None, None);
        };

        match DateRange::new(from, to) {
            Ok(range) => {
                self.last_valid = Some(range);
                (Some(range), None)
            }
            Err(err) => {
                log::warn!("{err}; keeping previous range");
                (self.last_valid.or(bounds), Some(err))
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
