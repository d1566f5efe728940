//! Node color assignment.
//!
//! Colors are drawn once per node at construction. A seeded palette gives
//! reproducible colors for tests and `--seed`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::geometry::Rgb;

#[derive(Debug, Clone)]
pub struct Palette {
    rng: StdRng,
}

impl Palette {
    /// Reproducible palette: the same seed yields the same color sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is given, random otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn next_color(&mut self) -> Rgb {
        Rgb(self.rng.gen(), self.rng.gen(), self.rng.gen())
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_entropy()
    }
}
