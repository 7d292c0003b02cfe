use uuid::Uuid;

const RANDOM_MASK: u64 = (1 << 62) - 1;

/// Decides whether a new session is recorded
pub trait Sampler: Send {
    fn sample(&self, session_id: &Uuid) -> bool;
}

/// Records every session
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysSample;

impl Sampler for AlwaysSample {
    fn sample(&self, _session_id: &Uuid) -> bool {
        true
    }
}

/// Records a percentage of sessions.
///
/// The decision is derived from the session id, so the same id always gets
/// the same answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSampler {
    rate: f64,
}

impl RateSampler {
    /// `rate` is a percentage, clamped to `0.0..=100.0`.
    pub fn new(rate: f64) -> Self {
        let rate = if rate.is_nan() {
            0.0
        } else {
            rate.clamp(0.0, 100.0)
        };
        Self { rate }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl Sampler for RateSampler {
    fn sample(&self, session_id: &Uuid) -> bool {
        if self.rate >= 100.0 {
            return true;
        }
        if self.rate <= 0.0 {
            return false;
        }

        // the two top bits of the low half hold the variant; the 62 below are random
        let bits = (session_id.as_u128() as u64) & RANDOM_MASK;
        let threshold = (self.rate / 100.0) * RANDOM_MASK as f64;
        (bits as f64) < threshold
    }
}

impl<F> Sampler for F
where
    F: Fn(&Uuid) -> bool + Send,
{
    fn sample(&self, session_id: &Uuid) -> bool {
        self(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_sampler_bounds() {
        let id = Uuid::new_v4();
        assert!(RateSampler::new(100.0).sample(&id));
        assert!(!RateSampler::new(0.0).sample(&id));
        assert_eq!(RateSampler::new(250.0).rate(), 100.0);
        assert_eq!(RateSampler::new(-3.0).rate(), 0.0);
        assert_eq!(RateSampler::new(f64::NAN).rate(), 0.0);
    }

    #[test]
    fn test_rate_sampler_is_deterministic_per_id() {
        let sampler = RateSampler::new(50.0);
        let low = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0001);
        let high = Uuid::from_u128(0x0000_0000_0000_4000_bfff_ffff_ffff_fff0);

        assert!(sampler.sample(&low));
        assert!(sampler.sample(&low));
        assert!(!sampler.sample(&high));
    }

    #[test]
    fn test_rate_sampler_ratio_is_roughly_honored() {
        let sampler = RateSampler::new(30.0);
        let sampled = (0..10_000)
            .filter(|_| sampler.sample(&Uuid::new_v4()))
            .count();
        assert!((2_500..3_500).contains(&sampled), "sampled {}", sampled);
    }

    #[test]
    fn test_closure_sampler() {
        let reject_all = |_: &Uuid| false;
        assert!(!reject_all.sample(&Uuid::new_v4()));
    }
}
