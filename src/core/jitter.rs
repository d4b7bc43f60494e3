use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Inclusive bounds of the random term added to every match score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterRange {
    min: i32,
    max: i32,
}

impl JitterRange {
    /// Bounds are reordered if given backwards
    pub fn new(min: i32, max: i32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }
}

impl Default for JitterRange {
    fn default() -> Self {
        Self { min: -5, max: 5 }
    }
}

/// Source of the jitter term. Injected so scoring stays testable.
pub trait JitterSource {
    fn next_jitter(&mut self) -> i32;
}

/// Uniform jitter drawn from an `Rng`
#[derive(Debug, Clone)]
pub struct RandomJitter<R = StdRng> {
    rng: R,
    range: JitterRange,
}

impl RandomJitter<StdRng> {
    pub fn from_entropy(range: JitterRange) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            range,
        }
    }
}

impl<R: Rng> RandomJitter<R> {
    pub fn with_rng(rng: R, range: JitterRange) -> Self {
        Self { rng, range }
    }
}

impl<R: Rng> JitterSource for RandomJitter<R> {
    fn next_jitter(&mut self) -> i32 {
        self.rng.gen_range(self.range.min..=self.range.max)
    }
}

/// Always returns zero; exposes the deterministic part of a score
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroJitter;

impl JitterSource for ZeroJitter {
    fn next_jitter(&mut self) -> i32 {
        0
    }
}

/// Always returns the same offset
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub i32);

impl JitterSource for FixedJitter {
    fn next_jitter(&mut self) -> i32 {
        self.0
    }
}
