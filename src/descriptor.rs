//! The public descriptor surface: a fixed monomial shape (variable count,
//! per-variable and per-knob order caps, maximum order) together with every
//! table derived from it.
//!
//! Construction does all the expensive work once: enumerate `To`, derive
//! `Tv` and the `H` matrix, build every `(oa, ob)` multiplication table that
//! can contribute within `mo`, and lay those tables across worker lanes.
//! Everything after that — `get_idx`, `mul_index`, truncation queries — is a
//! cheap lookup into data that never changes for the descriptor's lifetime.

use std::sync::atomic::{AtomicU8, Ordering};

use bitflags::bitflags;

use crate::byvar::ByVar;
use crate::dispatch::{self, DispatchPlan};
use crate::enumerate::{self, ByOrder};
use crate::error::{ConsistencyError, ParamError};
use crate::hindex::HMatrix;
use crate::ltable::LTable;
use crate::mono::{self, Ord};
use crate::registry::{self, Shape};

/// Largest number of variables (map plus knob) a single descriptor can
/// address; bounds the registry-shape comparisons and the enumeration's
/// working set.
pub const MAX_VARS: usize = 100;

bitflags! {
    /// Which consistency sweeps [`Descriptor::verify_with`] runs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VerifyFlags: u8 {
        /// cross-checks the `H` matrix against `Tv`'s actual order blocks.
        const TABLES = 0b0001;
        /// checks the dispatch plan covers every order exactly once.
        const DISPATCH = 0b0010;
        /// checks the registry still reports this descriptor's own shape.
        const REGISTRY = 0b0100;
        const ALL = Self::TABLES.bits() | Self::DISPATCH.bits() | Self::REGISTRY.bits();
    }
}

#[derive(Debug)]
pub struct Descriptor {
    nmv: usize,
    var_ords: Vec<Ord>,
    map_ords: Vec<Ord>,
    ko: Ord,
    mo: Ord,
    var_names: Option<Vec<String>>,
    by_order: ByOrder,
    by_var: ByVar,
    h: HMatrix,
    ltables: Vec<LTable>,
    dispatch: DispatchPlan,
    trunc: AtomicU8,
    slot_id: usize,
}

fn validate_common(var_ords: &[Ord], mo: Ord) -> Result<(), ParamError> {
    let nv = var_ords.len();
    if nv == 0 || nv > MAX_VARS {
        return Err(ParamError::TooManyVariables { nv, max: MAX_VARS });
    }
    if mo as u32 > mono::MAX_ORDER {
        return Err(ParamError::OrderTooLarge { mo: mo as u32, max: mono::MAX_ORDER });
    }
    Ok(())
}

fn validate_names(var_names: &Option<Vec<String>>, nv: usize) -> Result<(), ParamError> {
    if let Some(names) = var_names {
        if names.len() != nv {
            return Err(ParamError::VarNamesLenMismatch { expected: nv, got: names.len() });
        }
    }
    Ok(())
}

/// Estimated convolution cost per output order, for `o` in `[2, mo]`:
/// `ops[o] = sum_{j=1}^{(o-1)/2} 2 * block(o-j) * block(j) + [o even] * block(o/2)^2`,
/// where `block(k) = ord2idx[k+1] - ord2idx[k]` is the order-`k` block size.
/// `order_cost[0]` and `order_cost[1]` are left at zero; those orders carry no
/// convolution work and are never assigned to a lane.
fn estimate_order_costs(ord2idx: &[u32], mo: Ord) -> Vec<u64> {
    let block = |k: usize| (ord2idx[k + 1] - ord2idx[k]) as u64;
    let mut order_cost = vec![0u64; mo as usize + 1];
    for o in 2..=mo as usize {
        let mut ops = 0u64;
        for j in 1..=(o - 1) / 2 {
            ops += 2 * block(o - j) * block(j);
        }
        if o % 2 == 0 {
            let c = block(o / 2);
            ops += c * c;
        }
        order_cost[o] = ops;
    }
    order_cost
}

impl Descriptor {
    /// A descriptor over `nv = var_ords.len()` map variables, with no knobs.
    pub fn new(var_ords: &[Ord], mo: Ord, lanes: usize) -> Result<Self, ParamError> {
        Self::new_k(var_ords, var_ords, mo, 0, 0, lanes, None)
    }

    /// A descriptor with `nk` knob variables appended after `var_ords.len() - nk`
    /// map variables. `map_ords` (one entry per map variable) is the cap the
    /// enclosing map already imposes; `var_ords` may only tighten it further.
    /// `dk` bounds the combined order contributed by knob variables alone.
    pub fn new_k(
        var_ords: &[Ord],
        map_ords: &[Ord],
        mo: Ord,
        nk: usize,
        dk: Ord,
        lanes: usize,
        var_names: Option<Vec<String>>,
    ) -> Result<Self, ParamError> {
        validate_common(var_ords, mo)?;
        let nv = var_ords.len();
        debug_assert!(nk <= nv, "knob count {nk} exceeds variable count {nv}");
        let nmv = nv - nk;

        if map_ords.len() != nmv {
            return Err(ParamError::MapOrdsLenMismatch { expected: nmv, got: map_ords.len() });
        }
        for i in 0..nmv {
            if var_ords[i] > map_ords[i] {
                return Err(ParamError::VarExceedsMapOrd { var: i, var_ord: var_ords[i], map_ord: map_ords[i] });
            }
        }
        let knob_cap_sum: u32 = var_ords[nmv..].iter().map(|&x| x as u32).sum();
        if dk as u32 > knob_cap_sum {
            return Err(ParamError::KnobBudgetExceedsCaps { dk, sum: knob_cap_sum });
        }
        if dk > mo {
            return Err(ParamError::KnobBudgetExceedsMaxOrd { dk, mo });
        }
        validate_names(&var_names, nv)?;

        let ko = dk;
        let by_order = enumerate::enumerate(nmv, var_ords, ko, mo);
        let by_var = ByVar::build(&by_order, var_ords);
        let h = HMatrix::build(var_ords, nmv, ko, mo);

        let mut ltables = Vec::new();
        for oa in 0..=mo {
            for ob in oa..=mo {
                if oa as u32 + ob as u32 > mo as u32 {
                    break;
                }
                ltables.push(LTable::build(&by_order, &by_var, oa, ob));
            }
        }

        let order_cost = estimate_order_costs(&by_order.ord2idx, mo);
        let dispatch_plan = dispatch::build(mo, lanes, &order_cost);

        let slot_id = registry::acquire(Shape {
            nmv,
            var_ords: var_ords.to_vec(),
            map_ords: map_ords.to_vec(),
            ko,
            mo,
        })
        .map_err(|_| ParamError::TooManyVariables { nv, max: MAX_VARS })?;

        Ok(Descriptor {
            nmv,
            var_ords: var_ords.to_vec(),
            map_ords: map_ords.to_vec(),
            ko,
            mo,
            var_names,
            by_order,
            by_var,
            h,
            ltables,
            dispatch: dispatch_plan,
            trunc: AtomicU8::new(mo),
            slot_id,
        })
    }

    pub fn nv(&self) -> usize {
        self.var_ords.len()
    }

    pub fn nmv(&self) -> usize {
        self.nmv
    }

    pub fn maxord(&self) -> Ord {
        self.mo
    }

    pub fn maxsize(&self) -> usize {
        self.by_order.nc()
    }

    pub fn var_names(&self) -> Option<&[String]> {
        self.var_names.as_deref()
    }

    /// Current truncation order (`<= maxord`); coefficients beyond it are
    /// treated as implicitly zero by callers that honor it.
    pub fn gtrunc(&self) -> Ord {
        self.trunc.load(Ordering::Relaxed)
    }

    /// Sets the truncation order, clamped to `maxord`, returning the
    /// previous value.
    pub fn strunc(&self, new_trunc: Ord) -> Ord {
        self.trunc.swap(new_trunc.min(self.mo), Ordering::Relaxed)
    }

    pub fn get_mono(&self, idx: usize) -> &[Ord] {
        self.by_order.mono(idx)
    }

    /// Looks up a dense monomial's `To` index.
    pub fn get_idx(&self, m: &[Ord]) -> Option<usize> {
        self.by_order.find_index(m)
    }

    /// Looks up a monomial given sparsely as `(variable, exponent)` pairs;
    /// variables not named default to exponent zero.
    pub fn get_idx_sp(&self, pairs: &[(usize, Ord)]) -> Option<usize> {
        let mut m = vec![0 as Ord; self.nv()];
        for &(v, e) in pairs {
            if v >= m.len() {
                return None;
            }
            m[v] = e;
        }
        self.get_idx(&m)
    }

    /// `Tv`-local rank of `m` within its own order block, via the `H` matrix.
    pub fn get_idx_by_var(&self, m: &[Ord]) -> Option<usize> {
        let o = mono::order(m) as usize;
        if o + 1 >= self.by_order.ord2idx.len() {
            return None;
        }
        let block_lo = self.by_order.ord2idx[o] as usize;
        let rank = self.h.block_rank(m);
        if rank < 0 {
            return None;
        }
        Some(block_lo + rank as usize)
    }

    /// The `To` index of the product of `To[a_idx]` (order `oa`) and
    /// `To[b_idx]` (order `ob`), if that table was built (`oa + ob <= maxord`).
    pub fn mul_index(&self, oa: Ord, ob: Ord, a_idx: usize, b_idx: usize) -> Option<usize> {
        let a_lo = *self.by_order.ord2idx.get(oa as usize)? as usize;
        let b_lo = *self.by_order.ord2idx.get(ob as usize)? as usize;
        let a_tv = self.by_var.to2tv[a_idx] as usize - a_lo;
        let b_tv = self.by_var.to2tv[b_idx] as usize - b_lo;
        let (lo_ord, hi_ord, i, j) = if oa <= ob { (oa, ob, a_tv, b_tv) } else { (ob, oa, b_tv, a_tv) };
        let table = self.ltables.iter().find(|t| t.oa == lo_ord && t.ob == hi_ord)?;
        table.get(i, j)
    }

    pub fn verify(&self) -> Result<(), ConsistencyError> {
        self.verify_with(VerifyFlags::ALL)
    }

    pub fn verify_with(&self, flags: VerifyFlags) -> Result<(), ConsistencyError> {
        if flags.contains(VerifyFlags::TABLES) {
            for o in 0..self.by_order.ord2idx.len() - 1 {
                let lo = self.by_order.ord2idx[o] as usize;
                let hi = self.by_order.ord2idx[o + 1] as usize;
                for to_idx in lo..hi {
                    let m = self.by_order.mono(to_idx);
                    let expected = self.by_var.to2tv[to_idx] as usize - lo;
                    let got = self.h.block_rank(m);
                    if got < 0 || got as usize != expected {
                        return Err(ConsistencyError {
                            code: 1001,
                            message: format!("H rank mismatch for {m:?}: expected {expected}, got {got}"),
                        });
                    }
                }
            }
        }
        if flags.contains(VerifyFlags::DISPATCH) {
            // only orders in [2, mo] are real convolution work; a phantom
            // order mo+1 may also appear (see dispatch::build) but carries
            // no corresponding output and is skipped here.
            let mut seen = vec![false; self.mo as usize + 1];
            for item in self.dispatch.lanes.iter().flatten() {
                let o = item.order as usize;
                if o > self.mo as usize {
                    continue;
                }
                if seen[o] {
                    return Err(ConsistencyError { code: 2001, message: format!("order {o} dispatched twice") });
                }
                seen[o] = true;
            }
            if (2..=self.mo as usize).any(|o| !seen[o]) {
                return Err(ConsistencyError { code: 2002, message: "not every order was dispatched".into() });
            }
        }
        if flags.contains(VerifyFlags::REGISTRY) {
            let shape = registry::shape_of(self.slot_id)
                .map_err(|e| ConsistencyError { code: 3001, message: e.to_string() })?;
            if shape.nmv != self.nmv || shape.mo != self.mo {
                return Err(ConsistencyError { code: 3002, message: "registry slot shape drifted".into() });
            }
        }
        Ok(())
    }
}

impl Drop for Descriptor {
    fn drop(&mut self) {
        registry::release(self.slot_id);
    }
}
