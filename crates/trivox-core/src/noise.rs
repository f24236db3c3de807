//! White, pink, and brown noise sources.
//!
//! Each [`NoiseGenerator`] owns its own seeded PRNG, so voices never share
//! random state and tests can reproduce a sequence exactly.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Seed used by [`NoiseGenerator::new`].
pub const DEFAULT_NOISE_SEED: u64 = 0x7269_766f_6e6f_6973;

/// Noise color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoiseType {
    /// Flat spectrum, uniform in [-1, 1].
    #[default]
    White,
    /// -3 dB/octave (Kellett recursive filter).
    Pink,
    /// -6 dB/octave (leaky integrator).
    Brown,
}

impl NoiseType {
    /// All noise types in flat-parameter index order.
    pub const ALL: [NoiseType; 3] = [NoiseType::White, NoiseType::Pink, NoiseType::Brown];

    /// Noise type for a flat parameter index, `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Multi-color noise generator.
///
/// # Algorithms
///
/// - **White**: uniform samples from the instance PRNG.
/// - **Pink**: Paul Kellett's refined 7-state filter, output scaled by 0.11.
/// - **Brown**: `state = (state + 0.02·white) / 1.02`, scaled by 3.5 and
///   clamped to [-1, 1]. The leak keeps the integrator from drifting.
///
/// # Example
///
/// ```rust
/// use trivox_core::{NoiseGenerator, NoiseType};
///
/// let mut noise = NoiseGenerator::with_seed(42);
/// noise.set_noise_type(NoiseType::Pink);
/// let sample = noise.advance();
/// assert!((-1.0..=1.0).contains(&sample));
/// ```
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    noise_type: NoiseType,
    rng: SmallRng,
    /// Kellett pink filter taps b0..b6
    pink: [f32; 7],
    brown: f32,
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseGenerator {
    /// Create a white noise generator with the default seed.
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_NOISE_SEED)
    }

    /// Create a white noise generator with an explicit PRNG seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            noise_type: NoiseType::White,
            rng: SmallRng::seed_from_u64(seed),
            pink: [0.0; 7],
            brown: 0.0,
        }
    }

    /// Set the noise color. Filter state is kept.
    pub fn set_noise_type(&mut self, noise_type: NoiseType) {
        self.noise_type = noise_type;
    }

    /// Current noise color.
    pub fn noise_type(&self) -> NoiseType {
        self.noise_type
    }

    /// Clear pink and brown filter state. The PRNG stream continues.
    pub fn reset(&mut self) {
        self.pink = [0.0; 7];
        self.brown = 0.0;
    }

    /// Generate the next sample in [-1, 1].
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let white = self.white();
        match self.noise_type {
            NoiseType::White => white,
            NoiseType::Pink => self.pink(white),
            NoiseType::Brown => self.brown(white),
        }
    }

    #[inline]
    fn white(&mut self) -> f32 {
        self.rng.random_range(-1.0f32..=1.0)
    }

    #[inline]
    fn pink(&mut self, white: f32) -> f32 {
        let b = &mut self.pink;
        b[0] = 0.99886 * b[0] + white * 0.055_517_9;
        b[1] = 0.99332 * b[1] + white * 0.075_075_9;
        b[2] = 0.96900 * b[2] + white * 0.153_852;
        b[3] = 0.86650 * b[3] + white * 0.310_485_6;
        b[4] = 0.55000 * b[4] + white * 0.532_952_2;
        b[5] = -0.7616 * b[5] - white * 0.016_898;
        let out = (b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + white * 0.5362) * 0.11;
        b[6] = white * 0.115_926;
        out.clamp(-1.0, 1.0)
    }

    #[inline]
    fn brown(&mut self, white: f32) -> f32 {
        self.brown = (self.brown + 0.02 * white) / 1.02;
        (self.brown * 3.5).clamp(-1.0, 1.0)
    }
}
