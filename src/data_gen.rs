// src/data_gen.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! Payload generation and key naming for the `populate` action.

use once_cell::sync::Lazy;
use rand::Rng;

/// Default payload size when no local source file is given: 1 MB.
pub const DEFAULT_OBJECT_SIZE: usize = 1024 * 1024;

const BLOCK: usize = 512;

/// A base random block, generated once per process.
static BASE_BLOCK: Lazy<Vec<u8>> = Lazy::new(|| {
    let mut block = vec![0u8; BLOCK];
    rand::rngs::ThreadRng::default().fill(&mut block[..]);
    block
});

/// Generate `size` bytes of random-looking data cheaply.
///
/// The buffer is tiled from a static 512-byte base block; each tile then
/// gets a fresh random 32-byte head, and a fresh 32-byte tail when the tile
/// is large enough. A minimum size of 512 bytes is enforced, matching the
/// smallest unit the tiling works in.
pub fn generate_random_data(size: usize) -> Vec<u8> {
    let size = size.max(BLOCK);
    let mut data = vec![0u8; size];
    let mut rng = rand::rngs::ThreadRng::default();

    for chunk in data.chunks_mut(BLOCK) {
        let len = chunk.len();
        chunk.copy_from_slice(&BASE_BLOCK[..len]);

        rng.fill(&mut chunk[..len.min(32)]);
        if len > 128 {
            rng.fill(&mut chunk[len - 32..]);
        }
    }

    data
}

/// Object names for a populate batch: `<prefix>1.bin` through
/// `<prefix>N.bin`.
pub fn populate_keys(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{prefix}{i}.bin")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enforces_minimum_size() {
        assert_eq!(generate_random_data(0).len(), 512);
        assert_eq!(generate_random_data(100).len(), 512);
    }

    #[test]
    fn honors_requested_size() {
        assert_eq!(generate_random_data(512).len(), 512);
        assert_eq!(generate_random_data(513).len(), 513);
        assert_eq!(generate_random_data(64 * 1024).len(), 64 * 1024);
    }

    #[test]
    fn blocks_differ_from_each_other() {
        let data = generate_random_data(4 * 512);
        let first = &data[..512];
        let second = &data[512..1024];
        assert_ne!(first, second);
    }

    #[test]
    fn populate_keys_are_one_based() {
        assert_eq!(
            populate_keys("blob", 3),
            vec!["blob1.bin", "blob2.bin", "blob3.bin"]
        );
        assert!(populate_keys("blob", 0).is_empty());
    }
}
