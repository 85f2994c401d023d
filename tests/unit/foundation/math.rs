use super::*;

#[test]
fn fnv_is_deterministic_per_seed() {
    let hash = |seed: u64, v: u64| {
        let mut h = Fnv1a64::new(seed);
        h.write_u64(v);
        h.finish()
    };
    assert_eq!(hash(7, 3), hash(7, 3));
    assert_ne!(hash(7, 3), hash(8, 3));
    assert_ne!(hash(7, 3), hash(7, 4));
}

#[test]
fn mul_div255_endpoints() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(200, 0), 0);
    assert_eq!(mul_div255_u8(255, 128), 128);
}

#[test]
fn opacity_quantization_clamps() {
    assert_eq!(opacity_to_u8(-1.0), 0);
    assert_eq!(opacity_to_u8(0.0), 0);
    assert_eq!(opacity_to_u8(1.0), 255);
    assert_eq!(opacity_to_u8(7.5), 255);
    assert_eq!(opacity_to_u8(0.5), 128);
}
