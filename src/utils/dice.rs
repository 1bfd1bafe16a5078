//! # Dice
//!
//! Seeded, thread-safe dice used by the combat resolver.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// A seeded random source behind a mutex.
///
/// Shared between turns (and threads) through an `Arc`; the lock is
/// independent of any lock a transport holds around the game state.
///
/// # Examples
///
/// ```
/// use dungeon_crawler::Dice;
///
/// let dice = Dice::new(42);
/// let roll = dice.roll_die(20);
/// assert!((1..=20).contains(&roll));
/// ```
#[derive(Debug)]
pub struct Dice {
    rng: Mutex<StdRng>,
}

impl Dice {
    /// Creates dice with a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Creates dice seeded from system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Restarts the sequence from `seed`.
    pub fn reseed(&self, seed: u64) {
        self.with_rng(|rng| *rng = StdRng::seed_from_u64(seed));
    }

    /// Rolls one die, uniformly in `[1, sides]`.
    ///
    /// A die with zero sides always rolls 0.
    pub fn roll_die(&self, sides: u32) -> i32 {
        if sides == 0 {
            return 0;
        }
        self.with_rng(|rng| rng.gen_range(1..=sides) as i32)
    }

    /// Rolls `num_dice` dice of `sides` sides plus `modifier`, never below 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use dungeon_crawler::Dice;
    ///
    /// let dice = Dice::new(7);
    /// let damage = dice.roll_damage(2, 6, 1);
    /// assert!((3..=13).contains(&damage));
    /// assert_eq!(dice.roll_damage(1, 4, -10), 0);
    /// ```
    pub fn roll_damage(&self, num_dice: u32, sides: u32, modifier: i32) -> i32 {
        let rolled: i32 = (0..num_dice).map(|_| self.roll_die(sides)).sum();
        (modifier + rolled).max(0)
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        // A panic while holding the lock cannot leave the RNG half-updated.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

impl Default for Dice {
    fn default() -> Self {
        Self::from_entropy()
    }
}
