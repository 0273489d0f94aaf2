use rhobench_math::{ordered_bits, QuantGrid};

// Determinism tests for grid codes. Base, step and inputs are dyadic
// rationals, so every intermediate value is exact in binary.

#[test]
fn test_grid_codes_dyadic() {
    let grid = QuantGrid::new(-2.0, 0.25).unwrap();

    let vals: [f32; 9] = [-2.0, -1.75, -1.0, -0.5, 0.0, 0.25, 0.5, 1.0, 2.0];
    let expected: [i64; 9] = [0, 1, 4, 6, 8, 9, 10, 12, 16];

    for (i, (&v, &k)) in vals.iter().zip(expected.iter()).enumerate() {
        assert_eq!(grid.code(v), k, "code mismatch at {}", i);
        assert_eq!(grid.value(k), v, "value mismatch at {}", i);
    }
}

#[test]
fn test_grid_ties_round_away_from_zero() {
    let grid = QuantGrid::new(0.0, 1.0).unwrap();
    assert_eq!(grid.code(0.5), 1);
    assert_eq!(grid.code(1.5), 2);
    assert_eq!(grid.code(-0.5), -1);
}

#[test]
fn test_ordered_bits_known_values() {
    assert_eq!(ordered_bits(0.0), 0x8000_0000);
    assert_eq!(ordered_bits(-0.0), 0x7fff_ffff);
    assert_eq!(ordered_bits(1.0), 0x8000_0000 | 0x3f80_0000);
    assert_eq!(ordered_bits(-1.0), !0xbf80_0000u32 as i64);
}
