use std::collections::BTreeSet;

use super::Axis;
use crate::data::model::{CellValue, MissingMask};
use crate::error::{invalid, Result};

/// An axis reordered so that members of the same group are contiguous.
#[derive(Debug, Clone)]
pub struct Grouped {
    pub mask: MissingMask,
    pub labels: Vec<String>,
    /// Distinct group labels, sorted.
    pub groups: Vec<CellValue>,
    /// Group of each item, as an index into `groups`, in the new order.
    pub index: Vec<usize>,
    /// New position `i` holds the item formerly at `order[i]`.
    pub order: Vec<usize>,
}

impl Grouped {
    /// Apply the same reordering to any other per-item vector.
    pub fn permute<T: Clone>(&self, values: &[T]) -> Vec<T> {
        self.order.iter().map(|&i| values[i].clone()).collect()
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }
}

/// Sort the items of one axis by group membership.
///
/// `membership` and `labels` must both match the current length of `axis`
/// in `mask`. The sort is stable, so items keep their relative order inside
/// a group.
pub fn group(
    mask: &MissingMask,
    labels: &[String],
    membership: &[CellValue],
    axis: Axis,
) -> Result<Grouped> {
    let axis_length = match axis {
        Axis::Rows => mask.num_rows(),
        Axis::Cols => mask.num_cols(),
    };
    if membership.len() != axis_length {
        return invalid!(
            "group membership has {} entries for {axis_length} {axis}",
            membership.len()
        );
    }
    if labels.len() != axis_length {
        return invalid!("{} labels for {axis_length} {axis}", labels.len());
    }

    let groups: Vec<CellValue> = membership
        .iter()
        .map(CellValue::normalized)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let unsorted_index: Vec<usize> = membership
        .iter()
        .map(|m| groups.binary_search(m).unwrap_or_default())
        .collect();

    let mut order: Vec<usize> = (0..axis_length).collect();
    order.sort_by_key(|&i| unsorted_index[i]);

    let mask = match axis {
        Axis::Rows => mask.permute_rows(&order),
        Axis::Cols => mask.permute_cols(&order),
    };
    log::debug!("grouped {axis_length} {axis} into {} groups", groups.len());

    Ok(Grouped {
        mask,
        labels: order.iter().map(|&i| labels[i].clone()).collect(),
        index: order.iter().map(|&i| unsorted_index[i]).collect(),
        groups,
        order,
    })
}

/// Sum of the member frequencies of every group.
pub fn group_frequencies(frequencies: &[f64], index: &[usize], num_groups: usize) -> Vec<f64> {
    let mut sums = vec![0.0; num_groups];
    for (&f, &g) in frequencies.iter().zip(index) {
        sums[g] += f;
    }
    sums
}

/// Text placed on a group strip.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAnnotation {
    pub group: CellValue,
    /// Item position the text is centred on.
    pub position: usize,
    /// Share of the axis' summed frequency, in percent. NaN when the axis
    /// has no missing cells at all.
    pub percentage: f64,
    pub text: String,
}

/// One annotation per group, centred on the mean position of its members.
pub fn group_annotations(
    groups: &[CellValue],
    index: &[usize],
    group_freq: &[f64],
) -> Vec<GroupAnnotation> {
    let total: f64 = group_freq.iter().sum();
    if total == 0.0 {
        log::warn!("no missing cells across {} groups; percentages are undefined", groups.len());
    }

    groups
        .iter()
        .enumerate()
        .map(|(g, name)| {
            let (sum, count) = index
                .iter()
                .enumerate()
                .filter(|(_, &gi)| gi == g)
                .fold((0usize, 0usize), |(s, n), (pos, _)| (s + pos, n + 1));
            let position = if count == 0 {
                0
            } else {
                (sum as f64 / count as f64).round() as usize
            };
            let percentage = 100.0 * group_freq[g] / total;
            GroupAnnotation {
                group: name.clone(),
                position,
                percentage,
                text: format!("{name} {percentage:.2}%"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn four_rows() -> (MissingMask, Vec<String>) {
        let mask = MissingMask::from_rows(&[
            vec![true, false],
            vec![false, false],
            vec![true, true],
            vec![false, true],
        ])
        .unwrap();
        let labels = (0..4).map(|i| format!("row{i}")).collect();
        (mask, labels)
    }

    fn abac() -> Vec<CellValue> {
        ["A", "B", "A", "C"].into_iter().map(CellValue::from).collect()
    }

    #[test]
    fn rows_are_stably_sorted_by_group() {
        let (mask, labels) = four_rows();
        let grouped = group(&mask, &labels, &abac(), Axis::Rows).unwrap();
        assert_eq!(grouped.order, vec![0, 2, 1, 3]);
        let expected: Vec<CellValue> = ["A", "A", "B", "C"].into_iter().map(CellValue::from).collect();
        assert_eq!(grouped.permute(&abac()), expected);
        assert_eq!(grouped.labels, vec!["row0", "row2", "row1", "row3"]);
        assert_eq!(grouped.index, vec![0, 0, 1, 2]);
        assert_eq!(grouped.mask.row_counts(), vec![1, 2, 0, 1]);
    }

    #[test]
    fn same_group_items_are_contiguous() {
        let membership: Vec<CellValue> = [3, 1, 2, 1, 3, 2, 1]
            .into_iter()
            .map(CellValue::Integer)
            .collect();
        let mask = MissingMask::from_rows(&[vec![false; 7]]).unwrap();
        let labels: Vec<String> = (0..7).map(|i| i.to_string()).collect();
        let grouped = group(&mask, &labels, &membership, Axis::Cols).unwrap();

        for g in 0..grouped.num_groups() {
            let positions: Vec<usize> = (0..7).filter(|&i| grouped.index[i] == g).collect();
            let (first, last) = (positions[0], positions[positions.len() - 1]);
            assert!((first..=last).all(|i| grouped.index[i] == g));
        }
    }

    #[test]
    fn membership_length_must_match() {
        let (mask, labels) = four_rows();
        let short = vec![CellValue::from("A")];
        assert!(group(&mask, &labels, &short, Axis::Rows).is_err());
        assert!(group(&mask, &labels, &abac(), Axis::Cols).is_err());
    }

    #[test]
    fn percentages_sum_to_hundred() {
        let index = vec![0, 0, 1, 2];
        let freq = vec![0.5, 0.0, 1.0, 0.5];
        let sums = group_frequencies(&freq, &index, 3);
        assert_eq!(sums, vec![0.5, 1.0, 0.5]);

        let names: Vec<CellValue> = ["A", "B", "C"].into_iter().map(CellValue::from).collect();
        let annotations = group_annotations(&names, &index, &sums);
        let total: f64 = annotations.iter().map(|a| a.percentage).sum();
        assert_approx_eq!(total, 100.0);
        assert_eq!(annotations[0].text, "A 25.00%");
        assert_eq!(annotations[0].position, 1);
        assert_eq!(annotations[2].position, 3);
    }

    #[test]
    fn signed_zeros_share_a_group() {
        let (mask, labels) = four_rows();
        let members: Vec<CellValue> = [0.0, 1.0, -0.0, 1.0].into_iter().map(CellValue::from).collect();
        let grouped = group(&mask, &labels, &members, Axis::Rows).unwrap();
        assert_eq!(grouped.num_groups(), 2);
        assert_eq!(grouped.order, vec![0, 2, 1, 3]);
        assert_eq!(grouped.groups[0].to_string(), "0");
    }

    #[test]
    fn zero_total_gives_nan_percentages() {
        let annotations = group_annotations(&[CellValue::from("A")], &[0, 0], &[0.0]);
        assert!(annotations[0].percentage.is_nan());
    }
}
