//! Seeded dice for the randomized effect behaviors (PARALYZED, HEXED).
//! The same seed replays the same battle.

/// Six-sided die thrown once per effect instance per tick. PARALYZED and
/// HEXED read the face to decide whether they bite.
pub const EFFECT_DIE_SIDES: u32 = 6;

/// Die roller backed by Marsaglia's xorshift64 with the 13/7/17 shift
/// triple. Not cryptographic; it only has to replay identically from a seed.
#[derive(Debug, Clone)]
pub struct Dice {
    state: u64,
}

impl Dice {
    pub fn new(seed: u64) -> Self {
        // xorshift is stuck at zero forever
        Dice {
            state: seed.max(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Face in `0..sides`. A die with no sides always shows 0.
    pub fn roll(&mut self, sides: u32) -> u32 {
        match sides {
            0 => 0,
            n => (self.next_u64() % u64::from(n)) as u32,
        }
    }

    /// The per-tick roll handed to every effect behavior.
    pub fn roll_effect(&mut self) -> u32 {
        self.roll(EFFECT_DIE_SIDES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_rolls() {
        let mut a = Dice::new(42);
        let mut b = Dice::new(42);
        let rolls: Vec<u32> = (0..16).map(|_| a.roll(6)).collect();
        assert_eq!(rolls, (0..16).map(|_| b.roll(6)).collect::<Vec<_>>());
    }

    #[test]
    fn every_face_comes_up() {
        let mut dice = Dice::new(0);
        let mut seen = [false; 6];
        for _ in 0..200 {
            seen[dice.roll(6) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(dice.roll(0), 0);
    }

    #[test]
    fn effect_rolls_use_the_effect_die() {
        let mut a = Dice::new(9);
        let mut b = Dice::new(9);
        for _ in 0..50 {
            let face = a.roll_effect();
            assert!(face < EFFECT_DIE_SIDES);
            assert_eq!(face, b.roll(EFFECT_DIE_SIDES));
        }
    }
}
