use num_bigint::BigUint;
use tsrng_core::hash::h256;
use tsrng_core::merkle::MerkleTree;
use tsrng_core::seed::parse_seed;
use tsrng_core::selector::unique_indices;
use tsrng_core::vdf::{derive_prime, vdf_encode};

#[test]
fn merkle_of_one() {
    let leaf = vec![0u8; 64];
    let tree = MerkleTree::build(&[leaf.clone()]).unwrap();

    let mut tagged = vec![0x00u8];
    tagged.extend_from_slice(&leaf);
    let expected_root = h256(&tagged);

    assert_eq!(tree.root(), expected_root);
    let proof = tree.proof(0).unwrap();
    assert!(proof.is_empty());
}

#[test]
fn odd_leaves_three_values() {
    let leaves = vec![vec![0x61u8], vec![0x62u8], vec![0x63u8]];
    let tree = MerkleTree::build(&leaves).unwrap();

    let h = |b: u8| {
        let mut tagged = vec![0x00u8];
        tagged.push(b);
        h256(&tagged)
    };
    let node = |l: &[u8; 32], r: &[u8; 32]| {
        let mut tagged = vec![0x01u8];
        tagged.extend_from_slice(l);
        tagged.extend_from_slice(r);
        h256(&tagged)
    };

    let h61 = h(0x61);
    let h62 = h(0x62);
    let h63 = h(0x63);
    let n01 = node(&h61, &h62);
    let n22 = node(&h63, &h63);
    let expected_root = node(&n01, &n22);

    assert_eq!(tree.root(), expected_root);
}

#[test]
fn seed_canonicalization_scenarios() {
    assert_eq!(parse_seed("0xDEADBEEF"), vec![0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(
        parse_seed(r#"{"randomness":"a1b2"}"#),
        vec![0xA1, 0xB2]
    );
    assert_eq!(
        parse_seed("not-hex-not-b64-!!"),
        h256(b"not-hex-not-b64-!!").to_vec()
    );
}

#[test]
fn vdf_determinism_and_manual_squaring() {
    let p1 = derive_prime(b"TSRNG/modulus/\x01", 256).unwrap();
    let p2 = derive_prime(b"TSRNG/modulus/\x01", 256).unwrap();
    assert_eq!(p1, p2);

    let x = BigUint::from(5u32);
    let t = 3u64;
    let y = vdf_encode(&x, t, &p1);

    let mut manual = (&x * &x) % &p1;
    manual = (&manual * &manual) % &p1;
    manual = (&manual * &manual) % &p1;
    assert_eq!(y, manual);
}

#[test]
fn unbiased_sample_covers_full_domain() {
    let mut sample = unique_indices(10, 10, b"domain", b"seed", b"root").unwrap();
    sample.sort_unstable();
    assert_eq!(sample, (0..10).collect::<Vec<_>>());
}
