use mad_tpsa_desc::descriptor::VerifyFlags;
use mad_tpsa_desc::Descriptor;

/// S1: two variables, order 2 — the canonical hand-traced shape.
#[test]
fn s1_two_variables_order_two() {
    let d = Descriptor::new(&[2, 2], 2, 1).unwrap();
    assert_eq!(d.maxsize(), 6);
    assert_eq!(d.get_mono(0), &[0, 0]);
    assert_eq!(d.get_idx(&[2, 0]), Some(3));
    assert_eq!(d.get_idx(&[1, 1]), Some(4));
    assert_eq!(d.get_idx(&[0, 2]), Some(5));
}

/// S2: two variables, order 1.
#[test]
fn s2_two_variables_order_one() {
    let d = Descriptor::new(&[1, 1], 1, 1).unwrap();
    assert_eq!(d.maxsize(), 3);
}

/// S3: the by-variable rank plus its order-block offset must agree with the
/// direct `To` lookup, for every monomial in a moderately shaped descriptor.
#[test]
fn s3_by_variable_rank_matches_direct_lookup() {
    let d = Descriptor::new(&[3, 2, 1], 3, 2).unwrap();
    for i in 0..d.maxsize() {
        let m = d.get_mono(i).to_vec();
        assert_eq!(d.get_idx_by_var(&m), Some(i));
    }
}

/// S4: a single knob variable tightens the reachable order for monomials
/// that touch it, without otherwise disturbing the map-only monomials.
#[test]
fn s4_knob_budget_restricts_reachable_monomials() {
    let d = Descriptor::new_k(&[3, 2], &[3], 3, 1, 1, 1, None).unwrap();
    assert!(d.get_idx(&[0, 2]).is_none(), "knob order 2 exceeds dk=1");
    assert!(d.get_idx(&[0, 1]).is_some());
    assert!(d.get_idx(&[2, 0]).is_some(), "pure map monomial is unaffected by dk");
}

/// S5: multiplying two monomials via `mul_index` agrees with directly
/// enumerating their componentwise sum.
#[test]
fn s5_multiplication_table_matches_direct_sum() {
    let d = Descriptor::new(&[3, 3], 4, 2).unwrap();
    for oa in 0..=2u8 {
        for ob in 0..=2u8 {
            for a_idx in 0..d.maxsize() {
                let ma = d.get_mono(a_idx);
                if mad_tpsa_desc::mono::order(ma) != oa as u32 {
                    continue;
                }
                for b_idx in 0..d.maxsize() {
                    let mb = d.get_mono(b_idx);
                    if mad_tpsa_desc::mono::order(mb) != ob as u32 {
                        continue;
                    }
                    let sum = mad_tpsa_desc::mono::add(ma, mb);
                    let expected = d.get_idx(&sum);
                    let got = d.mul_index(oa, ob, a_idx, b_idx);
                    assert_eq!(got, expected, "{ma:?} * {mb:?}");
                }
            }
        }
    }
}

/// S6: a larger shape builds cleanly, spreads across several lanes, and
/// passes every consistency sweep.
#[test]
fn s6_larger_shape_passes_full_verification() {
    let d = Descriptor::new(&[4, 4, 4], 5, 4).unwrap();
    assert!(d.verify().is_ok());
    assert!(d.verify_with(VerifyFlags::TABLES).is_ok());
    assert!(d.verify_with(VerifyFlags::DISPATCH).is_ok());
    assert!(d.verify_with(VerifyFlags::REGISTRY).is_ok());
}
