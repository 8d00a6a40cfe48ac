//! Two-dice checks

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Result of rolling 2d6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub dice: [u8; 2],
    pub total: u8,
}

impl DiceRoll {
    /// Roll plus modifier meets the target number
    pub fn meets(&self, modifier: i32, target: i32) -> bool {
        self.total as i32 + modifier >= target
    }
}

pub fn roll_2d6<R: Rng + ?Sized>(rng: &mut R) -> DiceRoll {
    let a: u8 = rng.gen_range(1..=6);
    let b: u8 = rng.gen_range(1..=6);
    DiceRoll {
        dice: [a, b],
        total: a + b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_seeded_rolls_repeat() {
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(roll_2d6(&mut a), roll_2d6(&mut b));
        }
    }

    #[test]
    fn test_meets_target() {
        let roll = DiceRoll {
            dice: [3, 4],
            total: 7,
        };
        assert!(roll.meets(0, 7));
        assert!(!roll.meets(-1, 7));
        assert!(roll.meets(2, 9));
    }
}
