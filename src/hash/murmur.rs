const C1: u64 = 0x87c3_7b91_1142_53d5;
const C2: u64 = 0x4cf5_ad43_2745_937f;

/// MurmurHash3 (x64, 128-bit variant), returning only the first 64 bits of the result.
///
/// Only the low 32 bits of `seed` take part in the hash, so seeds that differ only in their upper
/// half produce the same value.
///
/// # Examples
/// ```
/// # use container_core::hash::murmur3_64;
/// assert_eq!(murmur3_64(b"hello", 0), 0xcbd8_a7b3_41bd_9b02);
/// assert_eq!(murmur3_64(b"", 0), 0);
/// ```
pub fn murmur3_64(data: &[u8], seed: u64) -> u64 {
    murmur3_x64_128(data, seed as u32).0
}

/// The full MurmurHash3 x64 128-bit hash of `data`, as `(h1, h2)`.
///
/// Blocks are read as little-endian words regardless of the target, so the result is the same on
/// every platform.
pub fn murmur3_x64_128(data: &[u8], seed: u32) -> (u64, u64) {
    let mut h1 = seed as u64;
    let mut h2 = seed as u64;

    let mut blocks = data.chunks_exact(16);
    for block in &mut blocks {
        let (lo, hi) = block.split_at(8);

        h1 ^= mix_k1(read_le(lo));
        h1 = h1.rotate_left(27).wrapping_add(h2).wrapping_mul(5).wrapping_add(0x52dc_e729);

        h2 ^= mix_k2(read_le(hi));
        h2 = h2.rotate_left(31).wrapping_add(h1).wrapping_mul(5).wrapping_add(0x3849_5ab5);
    }

    let tail = blocks.remainder();
    if tail.len() > 8 {
        h2 ^= mix_k2(read_le(&tail[8..]));
    }
    if !tail.is_empty() {
        h1 ^= mix_k1(read_le(&tail[..tail.len().min(8)]));
    }

    h1 ^= data.len() as u64;
    h2 ^= data.len() as u64;

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    h1 = fmix64(h1);
    h2 = fmix64(h2);

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    (h1, h2)
}

/// Finalization mix, forcing all bits of a block to avalanche.
pub(crate) const fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

const fn mix_k1(k1: u64) -> u64 {
    k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2)
}

const fn mix_k2(k2: u64) -> u64 {
    k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1)
}

/// Reads up to 8 bytes as a little-endian integer, zero-extending short input.
fn read_le(bytes: &[u8]) -> u64 {
    bytes.iter().rev().fold(0, |acc, &byte| (acc << 8) | byte as u64)
}
