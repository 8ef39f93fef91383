//! xxHash64.
//!
//! The sets only require a deterministic 64-bit hash that is well
//! distributed in its low bits; this module provides the reference
//! choice. The implementation matches the canonical xxHash64 algorithm
//! bit for bit: inputs of 32 bytes and more run four accumulators over
//! 32-byte stripes before merging, shorter inputs start from the seed
//! directly, and both finish with 8-, 4- and 1-byte tail rounds and the
//! final avalanche. All loads are little-endian regardless of host.

const PRIME64_1: u64 = 0x9E37_79B1_85EB_CA87;
const PRIME64_2: u64 = 0xC2B2_AE3D_27D4_EB4F;
const PRIME64_3: u64 = 0x1656_67B1_9E37_79F9;
const PRIME64_4: u64 = 0x85EB_CA77_C2B2_AE63;
const PRIME64_5: u64 = 0x27D4_EB2F_1656_67C5;

/// Hashes `data` with seed 0.
#[inline]
pub fn hash(data: &[u8]) -> u64 {
    hash_with_seed(0, data)
}

/// Hashes `data` with an explicit seed.
pub fn hash_with_seed(seed: u64, data: &[u8]) -> u64 {
    let len = data.len();
    let mut hash = if len >= 32 {
        body(seed, data)
    } else {
        seed.wrapping_add(PRIME64_5)
    };

    hash = hash.wrapping_add(len as u64);

    // The body consumed up to the last 32-byte boundary; the tail rounds
    // take the rest.
    tail(hash, &data[len & !31..])
}

/// Hashes a 64-bit value as its 8 little-endian bytes.
///
/// Equivalent to `hash(&value.to_le_bytes())` with the length-8 path
/// folded out: one 8-byte tail round and the avalanche.
#[inline(always)]
pub fn hash_u64(value: u64) -> u64 {
    let hash = PRIME64_5.wrapping_add(8);
    avalanche(tail_u64(hash, value))
}

fn body(seed: u64, data: &[u8]) -> u64 {
    let mut v1 = seed.wrapping_add(PRIME64_1).wrapping_add(PRIME64_2);
    let mut v2 = seed.wrapping_add(PRIME64_2);
    let mut v3 = seed;
    let mut v4 = seed.wrapping_sub(PRIME64_1);

    for stripe in data.chunks_exact(32) {
        v1 = mix(v1, read_u64(stripe, 0));
        v2 = mix(v2, read_u64(stripe, 8));
        v3 = mix(v3, read_u64(stripe, 16));
        v4 = mix(v4, read_u64(stripe, 24));
    }

    let mut hash = v1
        .rotate_left(1)
        .wrapping_add(v2.rotate_left(7))
        .wrapping_add(v3.rotate_left(12))
        .wrapping_add(v4.rotate_left(18));

    hash = merge(hash, v1);
    hash = merge(hash, v2);
    hash = merge(hash, v3);
    hash = merge(hash, v4);
    hash
}

fn tail(mut hash: u64, mut rest: &[u8]) -> u64 {
    while rest.len() >= 8 {
        hash = tail_u64(hash, read_u64(rest, 0));
        rest = &rest[8..];
    }

    if rest.len() >= 4 {
        hash = tail_u32(hash, read_u32(rest, 0));
        rest = &rest[4..];
    }

    for &byte in rest {
        hash = tail_u8(hash, byte);
    }

    avalanche(hash)
}

#[inline(always)]
fn mix(current: u64, value: u64) -> u64 {
    current
        .wrapping_add(value.wrapping_mul(PRIME64_2))
        .rotate_left(31)
        .wrapping_mul(PRIME64_1)
}

#[inline(always)]
fn merge(hash: u64, value: u64) -> u64 {
    (hash ^ mix(0, value))
        .wrapping_mul(PRIME64_1)
        .wrapping_add(PRIME64_4)
}

#[inline(always)]
fn tail_u64(hash: u64, value: u64) -> u64 {
    (hash ^ mix(0, value))
        .rotate_left(27)
        .wrapping_mul(PRIME64_1)
        .wrapping_add(PRIME64_4)
}

#[inline(always)]
fn tail_u32(hash: u64, value: u32) -> u64 {
    (hash ^ u64::from(value).wrapping_mul(PRIME64_1))
        .rotate_left(23)
        .wrapping_mul(PRIME64_2)
        .wrapping_add(PRIME64_3)
}

#[inline(always)]
fn tail_u8(hash: u64, value: u8) -> u64 {
    (hash ^ u64::from(value).wrapping_mul(PRIME64_5))
        .rotate_left(11)
        .wrapping_mul(PRIME64_1)
}

#[inline(always)]
fn avalanche(mut hash: u64) -> u64 {
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(PRIME64_2);
    hash ^= hash >> 29;
    hash = hash.wrapping_mul(PRIME64_3);
    hash ^= hash >> 32;
    hash
}

#[inline(always)]
fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}

#[inline(always)]
fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use rand::rngs::OsRng;
    use rand::TryRngCore;

    use super::*;

    // Published xxHash64 known-answer values, seed 0.
    #[test]
    fn known_answers() {
        assert_eq!(hash(b""), 0xEF46_DB37_51D8_E999);
        assert_eq!(hash(b"a"), 0xD24E_C4F1_A98C_6E5B);
        assert_eq!(hash(b"abc"), 0x44BC_2CF5_AD77_0999);
        // 43 bytes, exercising the 32-byte body path.
        assert_eq!(
            hash(b"The quick brown fox jumps over the lazy dog"),
            0x0B24_2D36_1FDA_71BC
        );
    }

    #[test]
    fn seed_zero_is_the_default() {
        assert_eq!(hash_with_seed(0, b"abc"), hash(b"abc"));
        assert_ne!(hash_with_seed(1, b"abc"), hash(b"abc"));
    }

    #[test]
    fn hash_u64_matches_byte_hashing() {
        let mut rng = OsRng;
        for value in [0u64, 1, 0x80, u64::MAX] {
            assert_eq!(hash_u64(value), hash(&value.to_le_bytes()));
        }
        for _ in 0..1000 {
            let value = rng.try_next_u64().unwrap();
            assert_eq!(hash_u64(value), hash(&value.to_le_bytes()));
        }
    }

    #[test]
    fn low_bits_are_distributed() {
        // The sets take the occupancy tag from the low 7 bits, so a
        // run of small consecutive inputs must not pile onto a few
        // tags.
        let mut counts = [0u32; 128];
        for value in 0..12_800u64 {
            counts[(hash_u64(value) & 0x7F) as usize] += 1;
        }
        for (tag, &count) in counts.iter().enumerate() {
            assert!(count > 0, "tag {tag} never produced");
            assert!(count < 1000, "tag {tag} produced {count} times");
        }
    }
}
