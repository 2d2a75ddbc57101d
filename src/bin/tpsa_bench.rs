//! Lookup throughput benchmark.
//!
//! Builds a descriptor once, then repeatedly looks up a cycling set of
//! monomials via [`Descriptor::get_idx`] and [`Descriptor::mul_index`] and
//! reports elapsed time. Pass `noperf` as the first argument to skip the
//! timed loop and just print the descriptor's shape, for quick smoke checks
//! in CI.

use std::time::Instant;

use mad_tpsa_desc::Descriptor;

const ITERATIONS: u64 = 1_000_000;

fn main() {
    let noperf = std::env::args().nth(1).as_deref() == Some("noperf");

    let var_ords = [6u8, 6, 6, 6, 6, 6];
    let mo = 6u8;
    let descriptor = Descriptor::new(&var_ords, mo, 1).expect("benchmark shape is always valid");

    println!(
        "descriptor: nv={} mo={} maxsize={}",
        descriptor.nv(),
        descriptor.maxord(),
        descriptor.maxsize()
    );

    if noperf {
        return;
    }

    let nc = descriptor.maxsize();
    let start = Instant::now();
    let mut hits: u64 = 0;
    for i in 0..ITERATIONS {
        let idx = (i as usize) % nc;
        let m = descriptor.get_mono(idx);
        if descriptor.get_idx(m) == Some(idx) {
            hits += 1;
        }
    }
    let elapsed = start.elapsed();

    println!("{ITERATIONS} lookups in {elapsed:?} ({hits} confirmed round trips)");
    println!("{:.1} ns/lookup", elapsed.as_nanos() as f64 / ITERATIONS as f64);
}
