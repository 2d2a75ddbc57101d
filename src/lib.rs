//! Truncated power series algebra descriptor: monomial enumeration, the
//! `To`/`Tv` orderings and their `H`-matrix bijection, per-order
//! multiplication tables, and a greedy thread dispatch plan over them.
//!
//! [`Descriptor`] is the entry point; everything else is a module it
//! assembles from.

/// Monomial primitives shared by every other module.
pub mod mono;

/// The by-order monomial table `To`.
pub mod enumerate;

/// The by-variable monomial table `Tv` and its bijection with `To`.
pub mod byvar;

/// The `H` indexing matrix: `O(nv)` monomial-to-`Tv`-rank lookup.
pub mod hindex;

/// Per-order-pair multiplication tables.
pub mod ltable;

/// Greedy thread dispatch across worker lanes.
pub mod dispatch;

/// The fixed-capacity process-wide descriptor registry.
pub mod registry;

/// The public descriptor surface.
pub mod descriptor;

/// A NaN-tagged 64-bit value used for parameter and attribute payloads.
pub mod tval;

/// Construction and consistency-check error types.
pub mod error;

pub use descriptor::{Descriptor, VerifyFlags};
pub use tval::{Value, ValueKind};
