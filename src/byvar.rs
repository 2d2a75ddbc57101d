//! The by-variable monomial ordering `Tv` and its bijection with `To`.
//!
//! `Tv` keeps `To`'s order-block boundaries (`ord2idx`) but re-sorts each
//! block lexicographically over `(m[sort[0]], m[sort[1]], ..., m[sort[nv-1]])`,
//! where `sort` ranks variables ascending by `var_ords` (see
//! [`crate::mono::sort_by_var_ords`]). Grouping by order first is what lets
//! the H matrix (see [`crate::hindex`]) compute a monomial's rank within its
//! own order block as a function of row and cumulative exponent sum alone,
//! independent of which block it is: the within-block comparator touches
//! every component, so it fully orders each (order-homogeneous) block without
//! ties, and `Tv` can be produced by sorting each block's index list under
//! that comparator rather than by walking an odometer and re-deriving the
//! rank by search for every step.

use crate::enumerate::ByOrder;
use crate::mono::Ord;

#[derive(Debug)]
pub struct ByVar {
    /// `sort[r]` is the variable occupying row `r` of the H matrix.
    pub sort: Vec<usize>,
    /// `tv2to[k]` is the `To` index of the monomial at `Tv` position `k`.
    pub tv2to: Vec<u32>,
    /// inverse of `tv2to`.
    pub to2tv: Vec<u32>,
}

fn tv_key<'a>(m: &'a [Ord], sort: &'a [usize]) -> impl Iterator<Item = Ord> + 'a {
    sort.iter().map(move |&v| m[v])
}

fn tv_cmp(a: &[Ord], b: &[Ord], sort: &[usize]) -> std::cmp::Ordering {
    tv_key(a, sort).cmp(tv_key(b, sort))
}

impl ByVar {
    pub fn build(by_order: &ByOrder, var_ords: &[Ord]) -> Self {
        let sort = crate::mono::sort_by_var_ords(var_ords);
        let nc = by_order.nc();

        let mut tv2to: Vec<u32> = Vec::with_capacity(nc);
        for o in 0..by_order.ord2idx.len() - 1 {
            let lo = by_order.ord2idx[o] as usize;
            let hi = by_order.ord2idx[o + 1] as usize;
            let mut block: Vec<u32> = (lo as u32..hi as u32).collect();
            block.sort_by(|&a, &b| tv_cmp(by_order.mono(a as usize), by_order.mono(b as usize), &sort));
            tv2to.extend(block);
        }

        let mut to2tv = vec![0u32; nc];
        for (tv_idx, &to_idx) in tv2to.iter().enumerate() {
            to2tv[to_idx as usize] = tv_idx as u32;
        }

        ByVar { sort, tv2to, to2tv }
    }

    /// `Tv[k]`, i.e. the monomial at by-variable rank `k`.
    pub fn tv_mono<'a>(&self, by_order: &'a ByOrder, k: usize) -> &'a [Ord] {
        by_order.mono(self.tv2to[k] as usize)
    }
}
