use nalgebra::DVector;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::AppError;

/// Perturbs a fixed mean coefficient vector with Gaussian noise on every draw.
#[derive(Debug, Clone)]
pub struct CoefficientSampler {
    means: DVector<f64>,
    noise: Normal<f64>,
}

impl CoefficientSampler {
    pub fn new(means: DVector<f64>, std_dev: f64) -> Result<Self, AppError> {
        let noise = Normal::new(0.0, std_dev).map_err(|e| {
            AppError::Internal(format!("invalid coefficient std dev {}: {}", std_dev, e))
        })?;
        Ok(Self { means, noise })
    }

    /// Draws the mean vector uniformly from `[0, 1)`.
    pub fn with_uniform_means<R: Rng + ?Sized>(
        width: usize,
        std_dev: f64,
        rng: &mut R,
    ) -> Result<Self, AppError> {
        let means = DVector::from_fn(width, |_, _| rng.gen::<f64>());
        Self::new(means, std_dev)
    }

    pub fn means(&self) -> &DVector<f64> {
        &self.means
    }

    pub fn width(&self) -> usize {
        self.means.len()
    }

    /// Each component is drawn independently from `Normal(mean_i, std_dev)`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DVector<f64> {
        self.means.map(|mean| mean + self.noise.sample(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_uniform_means() {
        let mut rng = StdRng::seed_from_u64(11);
        let sampler = CoefficientSampler::with_uniform_means(54, 0.5, &mut rng).unwrap();
        assert_eq!(sampler.width(), 54);
        assert!(sampler.means().iter().all(|m| (0.0..1.0).contains(m)));
    }

    #[test]
    fn test_samples_differ_between_calls() {
        let mut rng = StdRng::seed_from_u64(11);
        let sampler = CoefficientSampler::new(DVector::from_element(54, 0.5), 0.5).unwrap();

        let first = sampler.sample(&mut rng);
        let second = sampler.sample(&mut rng);
        assert_eq!(first.len(), 54);
        assert_ne!(first, second);
    }

    #[test]
    fn test_seeded_samples_are_reproducible() {
        let sampler = CoefficientSampler::new(DVector::from_element(8, 1.0), 0.5).unwrap();
        let a = sampler.sample(&mut StdRng::seed_from_u64(5));
        let b = sampler.sample(&mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_samples_center_on_means() {
        let means = DVector::from_vec(vec![-2.0, 0.0, 3.0]);
        let sampler = CoefficientSampler::new(means.clone(), 0.5).unwrap();
        let mut rng = StdRng::seed_from_u64(99);

        let draws = 20_000;
        let mut total = DVector::zeros(3);
        for _ in 0..draws {
            total += sampler.sample(&mut rng);
        }
        let average = total / draws as f64;

        for (avg, mean) in average.iter().zip(means.iter()) {
            assert!((avg - mean).abs() < 0.05, "{} vs {}", avg, mean);
        }
    }

    #[test]
    fn test_zero_std_dev_returns_means() {
        let means = DVector::from_vec(vec![0.1, 0.2]);
        let sampler = CoefficientSampler::new(means.clone(), 0.0).unwrap();
        assert_eq!(sampler.sample(&mut StdRng::seed_from_u64(1)), means);
    }

    #[test]
    fn test_rejects_invalid_std_dev() {
        assert!(CoefficientSampler::new(DVector::zeros(2), f64::NAN).is_err());
    }
}
