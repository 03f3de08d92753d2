use crate::model::{LeadRecord, Qualification, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

/// A field records can be grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Qualification,
    Weekday,
    Hour,
    Campaign,
    Source,
    Medium,
    Term,
    PostalCode,
}

impl Dimension {
    pub fn key(&self, record: &LeadRecord) -> String {
        let lead = &record.lead;
        match self {
            Dimension::Qualification => lead.qualification.label().to_string(),
            Dimension::Weekday => record.weekday.label().to_string(),
            Dimension::Hour => record.hour.to_string(),
            Dimension::Campaign => lead.utm_campaign.clone(),
            Dimension::Source => lead.utm_source.clone(),
            Dimension::Medium => lead.utm_medium.clone(),
            Dimension::Term => lead.utm_term.clone(),
            Dimension::PostalCode => lead.postal_code.clone(),
        }
    }

    /// Fixed key order for enum-valued dimensions; `None` for free-form text.
    pub fn canonical_keys(&self) -> Option<Vec<String>> {
        match self {
            Dimension::Qualification => Some(
                Qualification::ALL
                    .iter()
                    .map(|q| q.label().to_string())
                    .collect(),
            ),
            Dimension::Weekday => Some(Weekday::ALL.iter().map(|d| d.label().to_string()).collect()),
            Dimension::Hour => Some((0..24).map(|h: u32| h.to_string()).collect()),
            _ => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Qualification => "qualification",
            Dimension::Weekday => "weekday",
            Dimension::Hour => "hour",
            Dimension::Campaign => "utm_campaign",
            Dimension::Source => "utm_source",
            Dimension::Medium => "utm_medium",
            Dimension::Term => "utm_term",
            Dimension::PostalCode => "postal_code",
        };
        f.write_str(name)
    }
}

/// One or two grouping dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    One(Dimension),
    Two(Dimension, Dimension),
}

impl GroupBy {
    pub fn dimensions(&self) -> Vec<Dimension> {
        match *self {
            GroupBy::One(d) => vec![d],
            GroupBy::Two(a, b) => vec![a, b],
        }
    }
}

/// What a pivot cell holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueAgg {
    #[default]
    Count,
    SumValue,
}

impl ValueAgg {
    fn contribution(&self, record: &LeadRecord) -> Decimal {
        match self {
            ValueAgg::Count => Decimal::ONE,
            ValueAgg::SumValue => record.lead.value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRow {
    /// One key per grouping dimension, in the same order.
    pub keys: Vec<String>,
    pub count: u64,
    pub value_sum: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateTable {
    pub dimensions: Vec<Dimension>,
    pub rows: Vec<GroupRow>,
}

impl AggregateTable {
    /// Count for a key tuple, 0 when the combination was not observed.
    pub fn count(&self, keys: &[&str]) -> u64 {
        self.rows
            .iter()
            .find(|r| r.keys.iter().map(String::as_str).eq(keys.iter().copied()))
            .map_or(0, |r| r.count)
    }

    pub fn total_count(&self) -> u64 {
        self.rows.iter().map(|r| r.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotRow {
    pub key: String,
    /// One cell per entry of `PivotTable::columns`.
    pub values: Vec<Decimal>,
    pub total: Decimal,
}

/// Dense cross-tabulation: every row has a cell for every column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotTable {
    pub row_dimension: Dimension,
    pub column_dimension: Dimension,
    pub aggregation: ValueAgg,
    pub columns: Vec<String>,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    pub fn row(&self, key: &str) -> Option<&PivotRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    pub fn get(&self, row: &str, column: &str) -> Option<Decimal> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.row(row).map(|r| r.values[col])
    }

    pub fn row_keys(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.key.as_str()).collect()
    }

    pub fn column_totals(&self) -> Vec<Decimal> {
        (0..self.columns.len())
            .map(|i| saturating_sum(self.rows.iter().map(|r| r.values[i])))
            .collect()
    }

    pub fn grand_total(&self) -> Decimal {
        saturating_sum(self.rows.iter().map(|r| r.total))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Headline metric: how many leads ended in each qualification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub qualification: Qualification,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationSummary {
    pub total: u64,
    /// Always five entries, in canonical order.
    pub counts: Vec<StatusCount>,
}

impl QualificationSummary {
    pub fn count(&self, qualification: Qualification) -> u64 {
        self.counts[qualification.position()].count
    }
}

/// Totals per key, ordered canonically for enum dimensions (every canonical
/// key present) and by descending record count then ascending key otherwise.
fn order_keys(dimension: Dimension, totals: &HashMap<String, u64>) -> Vec<String> {
    if let Some(canonical) = dimension.canonical_keys() {
        return canonical;
    }
    let mut keys: Vec<&String> = totals.keys().collect();
    keys.sort_by_key(|k| (Reverse(totals.get(*k).copied().unwrap_or_default()), *k));
    keys.into_iter().cloned().collect()
}

/// Count records (and sum their values) per key of one or two dimensions.
///
/// With one dimension the table is dense over enum-valued keys, so absent
/// weekdays or qualifications appear with a zero count. With two dimensions
/// only observed combinations are listed, ordered by the first dimension's
/// order and then the second's.
pub fn group_count(records: &[LeadRecord], group_by: GroupBy) -> AggregateTable {
    let dimensions = group_by.dimensions();

    let mut groups: HashMap<Vec<String>, (u64, Decimal)> = HashMap::new();
    for record in records {
        let keys: Vec<String> = dimensions.iter().map(|d| d.key(record)).collect();
        let entry = groups.entry(keys).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(record.lead.value);
    }

    let mut per_dimension_totals: Vec<HashMap<String, u64>> = vec![HashMap::new(); dimensions.len()];
    for (keys, (count, _)) in &groups {
        for (i, key) in keys.iter().enumerate() {
            *per_dimension_totals[i].entry(key.clone()).or_default() += count;
        }
    }

    let orders: Vec<Vec<String>> = dimensions
        .iter()
        .zip(&per_dimension_totals)
        .map(|(d, totals)| order_keys(*d, totals))
        .collect();

    let rows = match group_by {
        GroupBy::One(_) => orders[0]
            .iter()
            .map(|key| {
                let keys = vec![key.clone()];
                let (count, value_sum) = groups.get(&keys).copied().unwrap_or((0, Decimal::ZERO));
                GroupRow {
                    keys,
                    count,
                    value_sum,
                }
            })
            .collect(),
        GroupBy::Two(_, _) => {
            let rank = |order: &[String], key: &str| order.iter().position(|k| k == key).unwrap_or(usize::MAX);
            let mut rows: Vec<GroupRow> = groups
                .into_iter()
                .map(|(keys, (count, value_sum))| GroupRow {
                    keys,
                    count,
                    value_sum,
                })
                .collect();
            rows.sort_by_key(|r| {
                (
                    rank(orders[0].as_slice(), &r.keys[0]),
                    rank(orders[1].as_slice(), &r.keys[1]),
                )
            });
            rows
        }
    };

    AggregateTable { dimensions, rows }
}

/// Cross-tabulate `row_dimension` against `column_dimension`.
///
/// Columns follow the canonical order for enum dimensions and ascending key
/// order otherwise. Rows of enum dimensions are always all present in
/// canonical order; free-form rows are the observed keys by descending
/// record count (ties by ascending key), whatever the aggregation.
/// Unobserved cells are zero and value sums saturate at `Decimal::MAX`.
pub fn pivot(
    records: &[LeadRecord],
    row_dimension: Dimension,
    column_dimension: Dimension,
    aggregation: ValueAgg,
) -> PivotTable {
    build_pivot(records, row_dimension, column_dimension, aggregation, None)
}

/// Pivot restricted to the `n` row keys with the most records.
///
/// Keys are picked by raw record count before pivoting (ties by ascending
/// key), so the cut does not depend on the aggregation.
pub fn pivot_top_n(
    records: &[LeadRecord],
    row_dimension: Dimension,
    column_dimension: Dimension,
    aggregation: ValueAgg,
    n: usize,
) -> PivotTable {
    let keep: HashSet<String> = top_keys(records, row_dimension, n).into_iter().collect();
    let selected: Vec<LeadRecord> = records
        .iter()
        .filter(|r| keep.contains(&row_dimension.key(r)))
        .cloned()
        .collect();
    build_pivot(&selected, row_dimension, column_dimension, aggregation, Some(&keep))
}

/// The `n` most frequent keys of a dimension, most frequent first.
pub fn top_keys(records: &[LeadRecord], dimension: Dimension, n: usize) -> Vec<String> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for record in records {
        *counts.entry(dimension.key(record)).or_default() += 1;
    }
    let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(n).map(|(k, _)| k).collect()
}

fn build_pivot(
    records: &[LeadRecord],
    row_dimension: Dimension,
    column_dimension: Dimension,
    aggregation: ValueAgg,
    row_subset: Option<&HashSet<String>>,
) -> PivotTable {
    let mut cells: HashMap<(String, String), Decimal> = HashMap::new();
    let mut observed_columns = BTreeSet::new();
    let mut row_counts: HashMap<String, u64> = HashMap::new();

    for record in records {
        let row = row_dimension.key(record);
        let column = column_dimension.key(record);
        let amount = aggregation.contribution(record);
        let cell = cells.entry((row.clone(), column.clone())).or_default();
        *cell = cell.saturating_add(amount);
        *row_counts.entry(row).or_default() += 1;
        observed_columns.insert(column);
    }

    let columns: Vec<String> = column_dimension
        .canonical_keys()
        .unwrap_or_else(|| observed_columns.into_iter().collect());

    let mut row_keys = order_keys(row_dimension, &row_counts);
    if let Some(subset) = row_subset {
        row_keys.retain(|k| subset.contains(k));
    }

    let rows = row_keys
        .into_iter()
        .map(|key| {
            let values: Vec<Decimal> = columns
                .iter()
                .map(|c| {
                    cells
                        .get(&(key.clone(), c.clone()))
                        .copied()
                        .unwrap_or(Decimal::ZERO)
                })
                .collect();
            let total = saturating_sum(values.iter().copied());
            PivotRow { key, values, total }
        })
        .collect();

    PivotTable {
        row_dimension,
        column_dimension,
        aggregation,
        columns,
        rows,
    }
}

/// Sum that sticks at `Decimal::MAX` instead of overflowing.
fn saturating_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Total plus per-qualification counts, zeros included.
pub fn qualification_counts(records: &[LeadRecord]) -> QualificationSummary {
    let mut counts = [0u64; 5];
    for record in records {
        counts[record.lead.qualification.position()] += 1;
    }
    QualificationSummary {
        total: records.len() as u64,
        counts: Qualification::ALL
            .iter()
            .zip(counts)
            .map(|(q, count)| StatusCount {
                qualification: *q,
                count,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{many, LeadFixture};
    use rust_decimal_macros::dec;
    use Qualification::*;

    #[test]
    fn test_group_by_qualification_fixed_order() {
        let mut records = many(6, Qualified);
        records.extend(many(4, Converted));
        let table = group_count(&records, GroupBy::One(Dimension::Qualification));
        let got: Vec<(&str, u64)> = table
            .rows
            .iter()
            .map(|r| (r.keys[0].as_str(), r.count))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Qualificado", 6),
                ("Convertido", 4),
                ("Desqualificado", 0),
                ("Achei", 0),
                ("Não interagiu", 0),
            ]
        );
    }

    #[test]
    fn test_group_by_weekday_has_every_day() {
        let records = vec![
            LeadFixture::new("2024-02-07 10:00", Qualified).build(), // Wednesday
            LeadFixture::new("2024-02-04 10:00", Qualified).build(), // Sunday
        ];
        let table = group_count(&records, GroupBy::One(Dimension::Weekday));
        let days: Vec<&str> = table.rows.iter().map(|r| r.keys[0].as_str()).collect();
        assert_eq!(
            days,
            vec!["Segunda", "Terça", "Quarta", "Quinta", "Sexta", "Sábado", "Domingo"]
        );
        assert_eq!(table.count(&["Quarta"]), 1);
        assert_eq!(table.count(&["Segunda"]), 0);
        assert_eq!(table.total_count(), 2);
    }

    #[test]
    fn test_group_by_campaign_sorted_by_count() {
        let records = vec![
            LeadFixture::new("2024-02-05 10:00", Qualified).campaign("b").value(dec!(10)).build(),
            LeadFixture::new("2024-02-05 10:00", Qualified).campaign("a").build(),
            LeadFixture::new("2024-02-05 10:00", Converted).campaign("b").value(dec!(5.5)).build(),
            LeadFixture::new("2024-02-05 10:00", Converted).campaign("c").build(),
        ];
        let table = group_count(&records, GroupBy::One(Dimension::Campaign));
        let keys: Vec<&str> = table.rows.iter().map(|r| r.keys[0].as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(table.rows[0].value_sum, dec!(15.5));
    }

    #[test]
    fn test_group_by_two_dimensions() {
        let records = vec![
            LeadFixture::new("2024-02-05 10:00", Converted).campaign("x").build(),
            LeadFixture::new("2024-02-05 10:00", Qualified).campaign("y").build(),
            LeadFixture::new("2024-02-05 10:00", Qualified).campaign("x").build(),
            LeadFixture::new("2024-02-05 10:00", Qualified).campaign("x").build(),
        ];
        let table = group_count(&records, GroupBy::Two(Dimension::Campaign, Dimension::Qualification));
        assert_eq!(table.dimensions, vec![Dimension::Campaign, Dimension::Qualification]);
        let keys: Vec<(&str, &str, u64)> = table
            .rows
            .iter()
            .map(|r| (r.keys[0].as_str(), r.keys[1].as_str(), r.count))
            .collect();
        assert_eq!(
            keys,
            vec![("x", "Qualificado", 2), ("x", "Convertido", 1), ("y", "Qualificado", 1)]
        );
        assert_eq!(table.count(&["y", "Convertido"]), 0);
    }

    #[test]
    fn test_pivot_is_dense_over_canonical_columns() {
        let records = vec![
            LeadFixture::new("2024-02-05 10:00", Achei).campaign("x").build(),
            LeadFixture::new("2024-02-05 10:00", Qualified).campaign("y").build(),
            LeadFixture::new("2024-02-05 10:00", Qualified).campaign("y").build(),
        ];
        let table = pivot(&records, Dimension::Campaign, Dimension::Qualification, ValueAgg::Count);
        assert_eq!(table.columns.len(), 5);
        assert_eq!(table.columns[0], "Qualificado");
        assert_eq!(table.row_keys(), vec!["y", "x"]);
        for row in &table.rows {
            assert_eq!(row.values.len(), 5);
        }
        assert_eq!(table.get("x", "Qualificado"), Some(dec!(0)));
        assert_eq!(table.get("x", "Achei"), Some(dec!(1)));
        assert_eq!(table.row("y").unwrap().total, dec!(2));
        assert_eq!(table.column_totals(), vec![dec!(2), dec!(0), dec!(0), dec!(1), dec!(0)]);
    }

    #[test]
    fn test_pivot_ties_broken_by_key() {
        let records = vec![
            LeadFixture::new("2024-02-05 10:00", Qualified).campaign("zeta").build(),
            LeadFixture::new("2024-02-05 10:00", Qualified).campaign("alpha").build(),
        ];
        let table = pivot(&records, Dimension::Campaign, Dimension::Qualification, ValueAgg::Count);
        assert_eq!(table.row_keys(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_pivot_sum_value() {
        let records = vec![
            LeadFixture::new("2024-02-05 10:00", Converted).campaign("x").value(dec!(100.50)).build(),
            LeadFixture::new("2024-02-05 10:00", Converted).campaign("x").value(dec!(20)).build(),
        ];
        let table = pivot(&records, Dimension::Campaign, Dimension::Qualification, ValueAgg::SumValue);
        assert_eq!(table.get("x", "Convertido"), Some(dec!(120.50)));
        assert_eq!(table.grand_total(), dec!(120.50));
    }

    #[test]
    fn test_heatmap_pivot_shape() {
        let records = vec![
            LeadFixture::new("2024-02-05 09:00", Qualified).build(), // Monday
            LeadFixture::new("2024-02-05 09:45", Converted).build(),
            LeadFixture::new("2024-02-10 22:10", Achei).build(), // Saturday
        ];
        let table = pivot(&records, Dimension::Weekday, Dimension::Hour, ValueAgg::Count);
        assert_eq!(table.rows.len(), 7);
        assert_eq!(table.columns.len(), 24);
        assert_eq!(table.get("Segunda", "9"), Some(dec!(2)));
        assert_eq!(table.get("Sábado", "22"), Some(dec!(1)));
        assert_eq!(table.get("Terça", "0"), Some(dec!(0)));
    }

    #[test]
    fn test_pivot_empty_input_keeps_enum_rows() {
        let table = pivot(&[], Dimension::Weekday, Dimension::Qualification, ValueAgg::Count);
        assert_eq!(table.rows.len(), 7);
        assert!(table.rows.iter().all(|r| r.total == Decimal::ZERO));
        let free = pivot(&[], Dimension::Campaign, Dimension::Qualification, ValueAgg::Count);
        assert!(free.is_empty());
        assert_eq!(free.columns.len(), 5);
    }

    #[test]
    fn test_top_n_selects_by_record_count() {
        let mut records = Vec::new();
        for _ in 0..5 {
            records.push(LeadFixture::new("2024-02-05 10:00", Qualified).postal_code("A").build());
        }
        for _ in 0..3 {
            records.push(LeadFixture::new("2024-02-05 10:00", Converted).postal_code("B").build());
        }
        records.push(LeadFixture::new("2024-02-05 10:00", Achei).postal_code("C").build());

        let table = pivot_top_n(&records, Dimension::PostalCode, Dimension::Qualification, ValueAgg::Count, 2);
        assert_eq!(table.row_keys(), vec!["A", "B"]);
        assert!(table.row("C").is_none());
        assert_eq!(table.columns.len(), 5);
    }

    #[test]
    fn test_top_n_cut_ignores_value_sums() {
        let records = vec![
            LeadFixture::new("2024-02-05 10:00", Qualified).postal_code("A").value(dec!(1)).build(),
            LeadFixture::new("2024-02-05 10:00", Qualified).postal_code("A").value(dec!(1)).build(),
            LeadFixture::new("2024-02-05 10:00", Qualified).postal_code("B").value(dec!(1000)).build(),
        ];
        let table = pivot_top_n(&records, Dimension::PostalCode, Dimension::Qualification, ValueAgg::SumValue, 1);
        assert_eq!(table.row_keys(), vec!["A"]);
        assert_eq!(table.get("A", "Qualificado"), Some(dec!(2)));
    }

    #[test]
    fn test_value_sums_saturate() {
        let records = vec![
            LeadFixture::new("2024-02-05 10:00", Qualified).campaign("x").value(Decimal::MAX).build(),
            LeadFixture::new("2024-02-05 11:00", Qualified).campaign("x").value(Decimal::MAX).build(),
        ];
        let table = group_count(&records, GroupBy::One(Dimension::Weekday));
        assert_eq!(table.rows[0].value_sum, Decimal::MAX);
        assert_eq!(table.count(&["Segunda"]), 2);

        let sums = pivot(&records, Dimension::Campaign, Dimension::Qualification, ValueAgg::SumValue);
        assert_eq!(sums.get("x", "Qualificado"), Some(Decimal::MAX));
        assert_eq!(sums.grand_total(), Decimal::MAX);
        assert_eq!(sums.column_totals()[0], Decimal::MAX);
    }

    #[test]
    fn test_sum_pivot_rows_ordered_by_count() {
        let records = vec![
            LeadFixture::new("2024-02-05 10:00", Qualified).campaign("many").value(dec!(1)).build(),
            LeadFixture::new("2024-02-05 10:00", Qualified).campaign("many").value(dec!(1)).build(),
            LeadFixture::new("2024-02-05 10:00", Qualified).campaign("rich").value(dec!(500)).build(),
        ];
        let table = pivot(&records, Dimension::Campaign, Dimension::Qualification, ValueAgg::SumValue);
        assert_eq!(table.row_keys(), vec!["many", "rich"]);
        assert_eq!(table.row("rich").unwrap().total, dec!(500));
    }

    #[test]
    fn test_top_n_larger_than_keys() {
        let records = many(3, Qualified);
        assert_eq!(top_keys(&records, Dimension::Campaign, 15).len(), 1);
    }

    #[test]
    fn test_qualification_counts() {
        let mut records = many(2, Achei);
        records.extend(many(1, NotEngaged));
        let summary = qualification_counts(&records);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.counts.len(), 5);
        assert_eq!(summary.count(Achei), 2);
        assert_eq!(summary.count(NotEngaged), 1);
        assert_eq!(summary.count(Qualified), 0);
        assert_eq!(summary.counts[0].qualification, Qualified);
    }
}
