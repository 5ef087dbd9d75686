//! Seeded randomness for the probabilistic parts of the simulation.
//!
//! Every probabilistic decision draws from a named [`RollStream`] so that a
//! change in one subsystem (say, footstep cadence) never perturbs another
//! (whisper timing) for the same user seed.

use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use sha2::Sha256;

/// Simulation domain a random roll belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RollStream {
    /// Flashlight flicker below the battery threshold.
    Flicker,
    /// Low-sanity whisper cue.
    Whisper,
    /// Footstep audio while moving.
    Footstep,
    /// Flavor text selection (whisper lines).
    Lore,
}

/// Injectable source of uniform rolls in `[0, 1)`.
pub trait RandomSource {
    fn roll(&mut self, stream: RollStream) -> f32;
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

/// Deterministic bundle of RNG streams segregated by simulation domain.
#[derive(Debug, Clone)]
pub struct RngBundle {
    seed: u64,
    flicker: CountingRng<SmallRng>,
    whisper: CountingRng<SmallRng>,
    footstep: CountingRng<SmallRng>,
    lore: CountingRng<SmallRng>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            flicker: CountingRng::new(derive_stream_seed(seed, b"flicker")),
            whisper: CountingRng::new(derive_stream_seed(seed, b"whisper")),
            footstep: CountingRng::new(derive_stream_seed(seed, b"footstep")),
            lore: CountingRng::new(derive_stream_seed(seed, b"lore")),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw count of a single stream.
    #[must_use]
    pub const fn draws(&self, stream: RollStream) -> u64 {
        match stream {
            RollStream::Flicker => self.flicker.draws(),
            RollStream::Whisper => self.whisper.draws(),
            RollStream::Footstep => self.footstep.draws(),
            RollStream::Lore => self.lore.draws(),
        }
    }

    fn stream_mut(&mut self, stream: RollStream) -> &mut CountingRng<SmallRng> {
        match stream {
            RollStream::Flicker => &mut self.flicker,
            RollStream::Whisper => &mut self.whisper,
            RollStream::Footstep => &mut self.footstep,
            RollStream::Lore => &mut self.lore,
        }
    }
}

impl RandomSource for RngBundle {
    fn roll(&mut self, stream: RollStream) -> f32 {
        self.stream_mut(stream).r#gen::<f32>()
    }
}

/// Source that returns the same roll for every stream.
///
/// `FixedRoll(0.0)` makes every chance fire; `FixedRoll(0.999)` suppresses them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRoll(pub f32);

impl RandomSource for FixedRoll {
    fn roll(&mut self, _stream: RollStream) -> f32 {
        self.0.clamp(0.0, 0.999_999)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    // HMAC accepts keys of any length, so the error arm is unreachable.
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_replays_identically() {
        let mut a = RngBundle::from_user_seed(1337);
        let mut b = RngBundle::from_user_seed(1337);
        for _ in 0..16 {
            assert!((a.roll(RollStream::Whisper) - b.roll(RollStream::Whisper)).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn streams_are_independent() {
        let mut a = RngBundle::from_user_seed(7);
        let mut b = RngBundle::from_user_seed(7);
        for _ in 0..10 {
            let _ = a.roll(RollStream::Footstep);
        }
        assert!((a.roll(RollStream::Whisper) - b.roll(RollStream::Whisper)).abs() < f32::EPSILON);
        assert_eq!(a.draws(RollStream::Footstep), 10);
        assert_eq!(b.draws(RollStream::Footstep), 0);
    }

    #[test]
    fn rolls_stay_in_unit_interval() {
        let mut bundle = RngBundle::from_user_seed(0xDEAD_BEEF);
        for _ in 0..256 {
            let roll = bundle.roll(RollStream::Flicker);
            assert!((0.0..1.0).contains(&roll));
        }
    }

    #[test]
    fn fixed_roll_is_clamped_below_one() {
        let mut source = FixedRoll(1.5);
        assert!(source.roll(RollStream::Lore) < 1.0);
    }
}
