use rand::RngCore;

/// Deterministic xorshift generator; sampling goes through `rand::Rng`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Random {
    seed: u64,
}

// A zero state would stay zero forever.
const ZERO_SEED_REPLACEMENT: u64 = 0xD1B5_4A32_D192_ED03;

impl Random {
    pub fn new(seed: u64) -> Self {
        let mut rng = Self { seed: 0 };
        rng.set_seed(seed);
        rng
    }

    pub fn new_seed() -> u64 {
        loop {
            let seed: u64 = rand::random();
            if seed != 0 {
                return seed;
            }
        }
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = if seed == 0 { ZERO_SEED_REPLACEMENT } else { seed };
    }
}

impl RngCore for Random {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.seed;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        x ^= x >> 9;
        x ^= x << 11;
        self.seed = x;
        x
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
