use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;

use super::filter::FilteredView;
use super::model::{Dimension, Measure, Record};

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

/// Profit over sales; exactly 0 when sales sum to 0.
pub fn margin(profit: f64, sales: f64) -> f64 {
    if sales == 0.0 {
        0.0
    } else {
        profit / sales
    }
}

/// Summed measures of one group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub sales: f64,
    pub profit: f64,
    pub quantity: i64,
    pub rows: usize,
}

impl Totals {
    pub fn add(&mut self, record: &Record) {
        self.sales += record.sales;
        self.profit += record.profit;
        self.quantity += record.quantity;
        self.rows += 1;
    }

    pub fn margin(&self) -> f64 {
        margin(self.profit, self.sales)
    }

    pub fn get(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Sales => self.sales,
            Measure::Profit => self.profit,
            Measure::Quantity => self.quantity as f64,
            Measure::Margin => self.margin(),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntity {
    pub name: String,
    pub totals: Totals,
}

/// One key of a breakdown with its value and fraction of the whole.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub key: String,
    pub value: f64,
    pub share: f64,
}

/// Headline numbers for the metric cards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kpis {
    pub total_sales: f64,
    pub total_profit: f64,
    pub total_quantity: i64,
    /// Distinct order ids.
    pub orders: usize,
    /// Margin as a percentage.
    pub margin_rate: f64,
}

/// Order-line counts per (month, region).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Heatmap {
    /// `YYYY-MM`, ascending.
    pub months: Vec<String>,
    pub regions: Vec<String>,
    /// `counts[month][region]`
    pub counts: Vec<Vec<usize>>,
}

impl Heatmap {
    pub fn max(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

/// Label used for records without a region in the heatmap.
pub const BLANK_LABEL: &str = "(blank)";

/// Per-day totals, ascending by date.
pub fn time_series(view: FilteredView<'_>) -> Vec<DailyPoint> {
    let mut by_day: BTreeMap<NaiveDate, Totals> = BTreeMap::new();
    for r in view.iter() {
        by_day.entry(r.order_date).or_default().add(r);
    }
    by_day
        .into_iter()
        .map(|(date, totals)| DailyPoint { date, totals })
        .collect()
}

/// Top `n` entities by `measure`, descending.
///
/// Groups keep the order in which their entity first appears, and the sort
/// is stable, so ties stay in input order. Records without a value for the
/// entity column are skipped.
pub fn entity_ranking(
    view: FilteredView<'_>,
    entity: Dimension,
    measure: Measure,
    n: usize,
) -> Vec<RankedEntity> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<RankedEntity> = Vec::new();

    for r in view.iter() {
        let Some(name) = entity.value(r) else {
            continue;
        };
        let idx = *position.entry(name).or_insert_with(|| {
            groups.push(RankedEntity {
                name: name.to_string(),
                totals: Totals::default(),
            });
            groups.len() - 1
        });
        groups[idx].totals.add(r);
    }

    groups.sort_by(|a, b| b.totals.get(measure).total_cmp(&a.totals.get(measure)));
    groups.truncate(n);
    groups
}

/// `measure` summed per value of `dimension`, ascending by key.
pub fn category_breakdown(
    view: FilteredView<'_>,
    dimension: Dimension,
    measure: Measure,
) -> Vec<Slice> {
    let mut groups: BTreeMap<&str, Totals> = BTreeMap::new();
    for r in view.iter() {
        if let Some(key) = dimension.value(r) {
            groups.entry(key).or_default().add(r);
        }
    }

    let values: Vec<(&str, f64)> = groups
        .iter()
        .map(|(key, totals)| (*key, totals.get(measure)))
        .collect();
    let total: f64 = values.iter().map(|(_, v)| v).sum();

    values
        .into_iter()
        .map(|(key, value)| Slice {
            key: key.to_string(),
            value,
            share: if total == 0.0 { 0.0 } else { value / total },
        })
        .collect()
}

/// [`category_breakdown`] ordered by value, largest first.
pub fn ranked_breakdown(
    view: FilteredView<'_>,
    dimension: Dimension,
    measure: Measure,
) -> Vec<Slice> {
    let mut slices = category_breakdown(view, dimension, measure);
    slices.sort_by(|a, b| b.value.total_cmp(&a.value));
    slices
}

pub fn kpis(view: FilteredView<'_>) -> Kpis {
    let mut totals = Totals::default();
    let mut orders: HashSet<&str> = HashSet::new();
    for r in view.iter() {
        totals.add(r);
        orders.insert(r.order_id.as_str());
    }
    Kpis {
        total_sales: totals.sales,
        total_profit: totals.profit,
        total_quantity: totals.quantity,
        orders: orders.len(),
        margin_rate: totals.margin() * 100.0,
    }
}

pub fn order_heatmap(view: FilteredView<'_>) -> Heatmap {
    let mut cells: BTreeMap<(String, &str), usize> = BTreeMap::new();
    let mut regions: BTreeSet<&str> = BTreeSet::new();

    for r in view.iter() {
        let month = r.order_date.format("%Y-%m").to_string();
        let region = Dimension::Region.value(r).unwrap_or(BLANK_LABEL);
        regions.insert(region);
        *cells.entry((month, region)).or_default() += 1;
    }

    let months: Vec<String> = cells
        .keys()
        .map(|(m, _)| m.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let regions: Vec<&str> = regions.into_iter().collect();

    let counts: Vec<Vec<usize>> = months
        .iter()
        .map(|m| {
            regions
                .iter()
                .map(|reg| cells.get(&(m.clone(), *reg)).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    Heatmap {
        months,
        regions: regions.into_iter().map(str::to_owned).collect(),
        counts,
    }
}
