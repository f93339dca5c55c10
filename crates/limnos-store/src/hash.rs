//! FNV-1a hashing for dataset fingerprints.
//!
//! Fast and deterministic, not cryptographically secure. Used to assert
//! that two runs produced bitwise-identical data.

/// FNV-1a offset basis for 64-bit.
pub(crate) const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

/// Feed a byte string into an FNV-1a hash state.
#[inline]
pub(crate) fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

/// Feed a u64 (as 8 LE bytes) into an FNV-1a hash state.
#[inline]
pub(crate) fn fnv1a_u64(hash: u64, v: u64) -> u64 {
    fnv1a_bytes(hash, &v.to_le_bytes())
}

/// Feed every value's bit pattern into an FNV-1a hash state.
///
/// Bit patterns, not values: `0.0` and `-0.0` hash differently, and NaN
/// payloads are preserved.
pub(crate) fn fnv1a_f64s(mut hash: u64, values: &[f64]) -> u64 {
    for v in values {
        hash = fnv1a_u64(hash, v.to_bits());
    }
    hash
}
