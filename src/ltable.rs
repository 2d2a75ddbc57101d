//! Per-order multiplication tables: `L[oa][ob]` maps a pair of `Tv`-local
//! monomial indices, one from the order-`oa` block and one from the
//! order-`ob` block, straight to the `To` index of their product, without
//! re-deriving and re-searching the summed monomial at evaluation time.
//!
//! When `oa == ob` the table only needs the lower triangle (`j <= i`): a
//! product is commutative, so `L[oa][oa].get(i, j) == L[oa][oa].get(j, i)`.

use crate::byvar::ByVar;
use crate::enumerate::ByOrder;
use crate::mono::{self, Ord};

#[derive(Debug)]
pub struct LTable {
    pub oa: Ord,
    pub ob: Ord,
    na: usize,
    nb: usize,
    triangular: bool,
    /// `To` index of the product, or `-1` if the sum exceeds the variable
    /// shape's validity (order, knob budget, or a per-variable cap).
    cells: Vec<i32>,
    /// flat `3 * na` buffer of `[start, split, end]` per row, handed to the
    /// dispatch plan so a worker can claim a contiguous column range of a
    /// row without two workers racing on the same cells.
    pub row_ranges: Vec<i32>,
}

impl LTable {
    fn packed_index(&self, i: usize, j: usize) -> usize {
        if !self.triangular {
            return i * self.nb + j;
        }
        let (hi, lo) = if i >= j { (i, j) } else { (j, i) };
        hi * (hi + 1) / 2 + lo
    }

    pub fn get(&self, i: usize, j: usize) -> Option<usize> {
        let v = self.cells[self.packed_index(i, j)];
        if v < 0 { None } else { Some(v as usize) }
    }

    pub fn build(by_order: &ByOrder, by_var: &ByVar, oa: Ord, ob: Ord) -> Self {
        let triangular = oa == ob;
        let nv = by_order.nv;
        let a_lo = by_order.ord2idx[oa as usize] as usize;
        let a_hi = by_order.ord2idx[oa as usize + 1] as usize;
        let b_lo = by_order.ord2idx[ob as usize] as usize;
        let b_hi = by_order.ord2idx[ob as usize + 1] as usize;
        let na = a_hi - a_lo;
        let nb = b_hi - b_lo;

        let tv_a: Vec<&[Ord]> = (0..na).map(|i| by_var.tv_mono(by_order, a_lo + i)).collect();
        let tv_b: Vec<&[Ord]> = (0..nb).map(|j| by_var.tv_mono(by_order, b_lo + j)).collect();

        let packed_len = if triangular { na * (na + 1) / 2 } else { na * nb };
        let mut cells = vec![-1i32; packed_len];
        let mut sum = vec![0 as Ord; nv];

        let key_of = |i: usize, j: usize| if triangular { i * (i + 1) / 2 + j } else { i * nb + j };

        for i in 0..na {
            let j_max = if triangular { i + 1 } else { nb };
            for j in 0..j_max {
                mono::add_into(tv_a[i], tv_b[j], &mut sum);
                if let Some(to_idx) = by_order.find_index(&sum) {
                    cells[key_of(i, j)] = to_idx as i32;
                }
            }
        }

        // the median To index of the combined order, used to split each row
        // roughly in half by product magnitude rather than by column count.
        let oc = oa as usize + ob as usize;
        let split_threshold = (by_order.ord2idx[oc + 1] + by_order.ord2idx[oc]).saturating_sub(1) / 2;
        let split_threshold = split_threshold as i32;

        let mut row_ranges = vec![0i32; 3 * na];
        for i in 0..na {
            let j_max = if triangular { i + 1 } else { nb };
            let fallback_split = if triangular { i + 1 } else { nb };

            let mut start = None;
            let mut end = 0usize;
            let mut split = fallback_split;
            let mut split_found = false;
            for j in 0..j_max {
                let v = cells[key_of(i, j)];
                if v < 0 {
                    continue;
                }
                if start.is_none() {
                    start = Some(j);
                }
                end = j + 1;
                if !split_found && v >= split_threshold {
                    split = j;
                    split_found = true;
                }
            }

            row_ranges[3 * i] = start.unwrap_or(0) as i32;
            row_ranges[3 * i + 1] = split as i32;
            row_ranges[3 * i + 2] = end as i32;
        }

        LTable { oa, ob, na, nb, triangular, cells, row_ranges }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.na, self.nb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumerate::enumerate;

    #[test]
    fn product_of_order_one_blocks_lands_in_order_two() {
        let var_ords = [2, 2];
        let by_order = enumerate(2, &var_ords, 0, 2);
        let by_var = ByVar::build(&by_order, &var_ords);
        let l = LTable::build(&by_order, &by_var, 1, 1);
        assert_eq!(l.shape(), (2, 2));
        for i in 0..2 {
            for j in 0..=i {
                let to_idx = l.get(i, j).expect("order-1 x order-1 always fits within mo=2");
                assert_eq!(by_order.ords[to_idx], 2);
            }
        }
    }

    #[test]
    fn overflowing_products_are_absent() {
        // order 2 * order 2 exceeds mo=2, so every cell must miss.
        let var_ords = [2, 2];
        let by_order = enumerate(2, &var_ords, 0, 2);
        let by_var = ByVar::build(&by_order, &var_ords);
        let l = LTable::build(&by_order, &by_var, 2, 2);
        for i in 0..l.na {
            for j in 0..=i {
                assert!(l.get(i, j).is_none());
            }
        }
    }

    #[test]
    fn triangular_table_is_symmetric() {
        let var_ords = [3, 2, 1];
        let by_order = enumerate(3, &var_ords, 0, 3);
        let by_var = ByVar::build(&by_order, &var_ords);
        let l = LTable::build(&by_order, &by_var, 1, 1);
        for i in 0..l.na {
            for j in 0..l.nb {
                assert_eq!(l.get(i, j), l.get(j, i));
            }
        }
    }

    #[test]
    fn row_ranges_match_valid_cell_bounds_and_median_split() {
        let var_ords = [2, 2, 2];
        let by_order = enumerate(3, &var_ords, 0, 3);
        let by_var = ByVar::build(&by_order, &var_ords);
        let l = LTable::build(&by_order, &by_var, 1, 2);
        let oc = 1 + 2;
        let threshold = (by_order.ord2idx[oc + 1] + by_order.ord2idx[oc] - 1) / 2;

        for i in 0..l.na {
            let (start, split, end) = (l.row_ranges[3 * i], l.row_ranges[3 * i + 1], l.row_ranges[3 * i + 2]);
            let valid: Vec<usize> = (0..l.nb).filter(|&j| l.get(i, j).is_some()).collect();

            match (valid.first(), valid.last()) {
                (Some(&lo), Some(&hi)) => {
                    assert_eq!(start as usize, lo, "row {i} start should be the first valid column");
                    assert_eq!(end as usize, hi + 1, "row {i} end should be one past the last valid column");
                }
                _ => {
                    assert_eq!(start, 0);
                    assert_eq!(end, 0);
                }
            }

            if (split as usize) < l.nb {
                if let Some(v) = l.get(i, split as usize) {
                    assert!(v as u32 >= threshold, "row {i} split column should clear the median threshold");
                }
            }
            for &j in valid.iter().take_while(|&&j| (j as i32) < split) {
                let v = l.get(i, j).unwrap() as u32;
                assert!(v < threshold, "row {i} column {j} precedes split but is >= threshold");
            }
        }
    }
}
