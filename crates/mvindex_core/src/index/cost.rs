//! Range-index cost estimation.

use crate::index::descriptor::IndexColumn;
use std::ops::BitOr;

/// Rows added to the row count before estimating, so that empty and tiny
/// tables still get a meaningful ordering of plans.
pub const COST_ROW_OFFSET: u64 = 1000;

/// Kind of predicate a query places on one table column.
///
/// Masks combine with `|`; [`IndexCondition::RANGE`] is `START | END`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IndexCondition(u8);

impl IndexCondition {
    /// Column is unconstrained.
    pub const NONE: Self = Self(0);
    /// `column = value`.
    pub const EQUALITY: Self = Self(1);
    /// `column >= value`.
    pub const START: Self = Self(2);
    /// `column <= value`.
    pub const END: Self = Self(4);
    /// Both a start and an end bound.
    pub const RANGE: Self = Self(2 | 4);

    /// Returns the raw mask bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for IndexCondition {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Cost of a single lookup in a sorted structure of `rows` entries:
/// one step per halving.
pub fn lookup_cost(rows: u64) -> u64 {
    let mut cost = 1;
    let mut n = rows;
    while n > 0 {
        n /= 2;
        cost += 1;
    }
    cost
}

/// Base cost of scanning a sorted index.
///
/// `masks` holds one condition per table column, indexed by column
/// position; `None` means the query constrains nothing. Columns are
/// considered in index order and only a leading run of equality
/// conditions narrows the estimate further.
pub fn range_index_cost(
    columns: &[IndexColumn],
    unique: bool,
    masks: Option<&[IndexCondition]>,
    row_count: u64,
) -> u64 {
    let n = row_count.saturating_add(COST_ROW_OFFSET);
    let Some(masks) = masks else {
        return n;
    };
    let lookup = lookup_cost(n);
    let mut cost = n;
    let mut rows = n;
    let mut selectivity: u64 = 0;
    for (i, index_column) in columns.iter().enumerate() {
        let mask = masks
            .get(index_column.column.id)
            .copied()
            .unwrap_or(IndexCondition::NONE);
        if mask.contains(IndexCondition::EQUALITY) {
            if unique && i == columns.len() - 1 {
                cost = lookup + 1;
                break;
            }
            // the field is public and may hold values above 100
            let column_selectivity = u64::from(index_column.column.selectivity.clamp(1, 100));
            selectivity = 100 - (100 - selectivity) * (100 - column_selectivity) / 100;
            let distinct = (n * selectivity / 100).max(1);
            rows = (n / distinct).max(1);
            cost = lookup + rows;
        } else if mask.contains(IndexCondition::RANGE) {
            cost = lookup + rows / 4;
            break;
        } else if mask.contains(IndexCondition::START) {
            cost = lookup + rows / 3;
            break;
        } else if mask.contains(IndexCondition::END) {
            cost = rows / 3;
            break;
        } else {
            break;
        }
    }
    cost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;
    use mvindex_codec::ColumnType;

    fn columns(n: usize) -> Vec<IndexColumn> {
        (0..n)
            .map(|i| IndexColumn::ascending(Column::new(i, format!("c{i}"), ColumnType::Integer)))
            .collect()
    }

    #[test]
    fn lookup_cost_counts_halvings() {
        assert_eq!(lookup_cost(0), 1);
        assert_eq!(lookup_cost(1), 2);
        assert_eq!(lookup_cost(1000), 11);
    }

    #[test]
    fn range_contains_start_and_end() {
        assert_eq!(IndexCondition::START | IndexCondition::END, IndexCondition::RANGE);
        assert!(IndexCondition::RANGE.contains(IndexCondition::START));
        assert!(!IndexCondition::START.contains(IndexCondition::RANGE));
        assert!(IndexCondition::NONE.contains(IndexCondition::NONE));
    }

    #[test]
    fn no_masks_costs_full_scan() {
        assert_eq!(range_index_cost(&columns(1), false, None, 0), 1000);
        assert_eq!(range_index_cost(&columns(1), false, None, 500), 1500);
    }

    #[test]
    fn unique_equality_is_a_point_lookup() {
        let masks = [IndexCondition::EQUALITY];
        assert_eq!(range_index_cost(&columns(1), true, Some(&masks[..]), 0), 12);
    }

    #[test]
    fn equality_uses_selectivity() {
        let masks = [IndexCondition::EQUALITY];
        assert_eq!(range_index_cost(&columns(1), false, Some(&masks[..]), 0), 13);
    }

    #[test]
    fn equality_prefix_of_unique_index_is_not_a_point_lookup() {
        let masks = [IndexCondition::EQUALITY, IndexCondition::NONE];
        assert_eq!(range_index_cost(&columns(2), true, Some(&masks[..]), 0), 13);
    }

    #[test]
    fn bounds_scale_rows() {
        let cols = columns(1);
        let cost = |m: IndexCondition| range_index_cost(&cols, false, Some(&[m][..]), 0);
        assert_eq!(cost(IndexCondition::RANGE), 261);
        assert_eq!(cost(IndexCondition::START), 344);
        assert_eq!(cost(IndexCondition::END), 333);
        assert_eq!(cost(IndexCondition::NONE), 1000);
    }

    #[test]
    fn out_of_range_selectivity_is_clamped() {
        let mut cols = columns(1);
        cols[0].column.selectivity = 200;
        let masks = [IndexCondition::EQUALITY];
        assert_eq!(range_index_cost(&cols, false, Some(&masks[..]), 0), 12);
        cols[0].column.selectivity = 100;
        assert_eq!(range_index_cost(&cols, false, Some(&masks[..]), 0), 12);
    }

    #[test]
    fn masks_are_indexed_by_table_column() {
        let cols = vec![IndexColumn::ascending(Column::new(
            2,
            "c2",
            ColumnType::Integer,
        ))];
        let masks = [
            IndexCondition::EQUALITY,
            IndexCondition::NONE,
            IndexCondition::RANGE,
        ];
        assert_eq!(range_index_cost(&cols, false, Some(&masks[..]), 0), 261);
    }
}
