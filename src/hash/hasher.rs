use std::hash::{BuildHasher, Hasher};

use super::murmur::{fmix64, murmur3_64};

/// A [`Hasher`] backed by [`murmur3_64`].
///
/// The first call to [`write`](Hasher::write) hashes its bytes with the seed, so hashing a single
/// byte string through this type gives exactly `murmur3_64(bytes, seed)`. Later writes are folded
/// into the running state.
#[derive(Debug, Clone)]
pub struct MurmurHasher {
    seed: u64,
    state: Option<u64>,
}

impl MurmurHasher {
    pub const fn with_seed(seed: u64) -> MurmurHasher {
        MurmurHasher {
            seed,
            state: None,
        }
    }
}

impl Hasher for MurmurHasher {
    fn finish(&self) -> u64 {
        match self.state {
            Some(state) => state,
            None => murmur3_64(&[], self.seed),
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        let hash = murmur3_64(bytes, self.seed);
        self.state = Some(match self.state {
            Some(prev) => fmix64(prev.rotate_left(17) ^ hash),
            None => hash,
        });
    }
}

/// Builds [`MurmurHasher`]s sharing one seed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildMurmurHasher {
    pub seed: u64,
}

impl BuildMurmurHasher {
    pub const fn with_seed(seed: u64) -> BuildMurmurHasher {
        BuildMurmurHasher { seed }
    }
}

impl BuildHasher for BuildMurmurHasher {
    type Hasher = MurmurHasher;

    fn build_hasher(&self) -> Self::Hasher {
        MurmurHasher::with_seed(self.seed)
    }
}
