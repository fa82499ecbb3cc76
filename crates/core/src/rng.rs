//! RNG module - seeded gem generation
//!
//! A small LCG keeps boards reproducible from a seed (tests, the headless
//! simulator and network clients all rely on that). [`GemSource`] turns it into
//! a stream of gems with uniformly distributed kinds and increasing ids.

use crate::types::{Gem, GemKind};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Scales from the high bits: the low bits of this LCG cycle with short
    /// periods (bit 0 simply alternates), so `% max` would be badly skewed for
    /// small palettes.
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Current internal state
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Produces new gems for a board
#[derive(Debug, Clone)]
pub struct GemSource {
    palette: Vec<GemKind>,
    rng: SimpleRng,
    next_id: u32,
}

impl GemSource {
    /// Create a source drawing from `palette`
    ///
    /// The palette must be non-empty; board construction validates this.
    pub fn new(palette: Vec<GemKind>, seed: u32) -> Self {
        Self {
            palette,
            rng: SimpleRng::new(seed),
            next_id: 1,
        }
    }

    pub fn palette(&self) -> &[GemKind] {
        &self.palette
    }

    /// Uniformly random kind from the palette
    pub fn next_kind(&mut self) -> GemKind {
        let i = self.rng.next_range(self.palette.len() as u32) as usize;
        self.palette.get(i).copied().unwrap_or(GemKind::Red)
    }

    /// New gem with a random kind
    pub fn next_gem(&mut self) -> Gem {
        let kind = self.next_kind();
        self.gem_of(kind)
    }

    /// New gem of a fixed kind (still consumes an id)
    pub fn gem_of(&mut self, kind: GemKind) -> Gem {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        Gem { id, kind }
    }

    /// Restart the stream from a new seed; ids keep increasing
    pub fn reseed(&mut self, seed: u32) {
        self.rng = SimpleRng::new(seed);
    }

    /// Current RNG state (resuming from it continues the same sequence)
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_zero_seed_is_remapped() {
        let mut a = SimpleRng::new(0);
        let mut b = SimpleRng::new(1);
        assert_eq!(a.next_u32(), b.next_u32());
    }

    #[test]
    fn test_next_range_stays_in_range() {
        let mut rng = SimpleRng::new(7);
        for max in 1..10 {
            for _ in 0..200 {
                assert!(rng.next_range(max) < max);
            }
        }
        assert_eq!(rng.next_range(0), 0);
    }

    #[test]
    fn test_two_kind_palette_does_not_alternate() {
        let mut source = GemSource::new(vec![GemKind::Red, GemKind::Blue], 3);
        let kinds: Vec<_> = (0..64).map(|_| source.next_kind()).collect();
        let alternating = kinds.windows(2).all(|w| w[0] != w[1]);
        assert!(!alternating);
    }

    #[test]
    fn test_every_palette_kind_shows_up() {
        let palette = GemKind::ALL.to_vec();
        let mut source = GemSource::new(palette.clone(), 99);
        let mut seen = [false; 6];
        for _ in 0..600 {
            let k = source.next_kind();
            let i = palette.iter().position(|p| *p == k).unwrap();
            seen[i] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_gem_ids_increase() {
        let mut source = GemSource::new(vec![GemKind::Green], 1);
        let a = source.next_gem();
        let b = source.next_gem();
        let c = source.gem_of(GemKind::Red);
        assert!(a.id < b.id && b.id < c.id);
        assert_eq!(a.kind, GemKind::Green);
        assert_eq!(c.kind, GemKind::Red);
    }
}
