//! Jenkins one-at-a-time hash
//!
//! The hash is the record identity, not a bucket index, so it must match
//! the reference output bit for bit. Bytes are added sign-extended (as a
//! signed C `char` would be); ASCII is unaffected.

/// Hash `key` with Jenkins one-at-a-time.
pub fn jenkins_hash(key: &str) -> u32 {
    let mut hash: u32 = 0;

    for &byte in key.as_bytes() {
        hash = hash.wrapping_add(byte as i8 as u32);
        hash = hash.wrapping_add(hash << 10);
        hash ^= hash >> 6;
    }

    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash = hash.wrapping_add(hash << 15);

    hash
}
