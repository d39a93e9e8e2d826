//! Sampling over triangles.
//!
//! [`Barycentric`] draws uniform points on a triangle, and [`TriangleSampler`] turns a
//! triangle into density-weighted [`crate::scatter::record::Instance`]s.
use rand::Rng;

pub mod barycentric;
pub mod triangle;

pub use barycentric::Barycentric;
pub use triangle::{
    target_count, TriangleSample, TriangleSampler, DEFAULT_MAX_INSTANCES_PER_TRIANGLE,
    DEFAULT_MAX_REJECTIONS,
};

/// Generate a random float in the range [0, 1).
///
/// Uses the high 24 bits so every value is exactly representable and below 1.
#[inline]
pub(crate) fn rand01(rng: &mut dyn Rng) -> f32 {
    (rng.next_u32() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRng {
        value: u32,
    }

    impl rand::TryRng for FixedRng {
        type Error = core::convert::Infallible;

        fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
            Ok(self.value)
        }

        fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
            Ok(self.value as u64)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Self::Error> {
            let bytes = self.value.to_le_bytes();
            for (i, b) in dest.iter_mut().enumerate() {
                *b = bytes[i % 4];
            }
            Ok(())
        }
    }

    #[test]
    fn rand01_returns_zero_for_zero_input() {
        let mut rng = FixedRng { value: 0 };
        assert_eq!(rand01(&mut rng), 0.0);
    }

    #[test]
    fn rand01_values_in_range() {
        let test_values = vec![0, 1, 100, 1000, u32::MAX / 2, u32::MAX - 1, u32::MAX];

        for value in test_values {
            let mut rng = FixedRng { value };
            let result = rand01(&mut rng);
            assert!(
                (0.0..1.0).contains(&result),
                "rand01({}) = {} is out of range [0,1)",
                value,
                result
            );
        }
    }

    #[test]
    fn rand01_top_values_stay_below_one() {
        for value in (u32::MAX - 255)..=u32::MAX {
            let mut rng = FixedRng { value };
            assert!(rand01(&mut rng) < 1.0, "rand01({value}) reached 1.0");
        }
    }

    #[test]
    fn rand01_midpoint() {
        let mut rng = FixedRng {
            value: u32::MAX / 2,
        };
        assert!((rand01(&mut rng) - 0.5).abs() < 0.001);
    }
}
