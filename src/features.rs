use nalgebra::DVector;
use tracing::debug;

use crate::{
    config::NUM_CONTINUOUS_DERIVED_FEATURES,
    error::AppError,
    feature_store::{CategoricalKey, FeatureStore},
};

/// Expands the continuous input into `[x, x^2, ln(1 + x), sqrt(x)]`.
///
/// Inputs must be non-negative, which keeps both the logarithm and the square
/// root real, and every derived component must be finite.
pub fn derive_continuous(x: f64) -> Result<[f64; NUM_CONTINUOUS_DERIVED_FEATURES], AppError> {
    if !x.is_finite() || x < 0.0 {
        return Err(AppError::InvalidContinuousValue(x));
    }

    let derived = [x, x * x, x.ln_1p(), x.sqrt()];
    if !derived.iter().all(|v| v.is_finite()) {
        return Err(AppError::InvalidContinuousValue(x));
    }

    Ok(derived)
}

/// Joins a feature store row with the derived continuous features.
pub struct FeatureAssembler {
    store: FeatureStore,
}

impl FeatureAssembler {
    pub fn new(store: FeatureStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    pub fn width(&self) -> usize {
        self.store.row_width() + NUM_CONTINUOUS_DERIVED_FEATURES
    }

    /// Builds the augmented vector: categorical row first, derived features
    /// second. Fails before any allocation if either half is unavailable.
    pub fn assemble<S: AsRef<str>>(
        &self,
        ids: &[S; 3],
        continuous_feature: f64,
    ) -> Result<DVector<f64>, AppError> {
        let key = CategoricalKey::encode(ids);
        let row = self.store.lookup(&key)?;
        let derived = derive_continuous(continuous_feature)?;

        let features = DVector::from_iterator(
            self.width(),
            row.iter().copied().chain(derived.iter().copied()),
        );
        debug!("Assembled {} features for {}", features.len(), key);

        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use rand::{rngs::StdRng, SeedableRng};

    fn assembler() -> FeatureAssembler {
        let model = ModelConfig::reference();
        let mut rng = StdRng::seed_from_u64(3);
        let store = FeatureStore::build(&model.domains, model.discrete_features, &mut rng).unwrap();
        FeatureAssembler::new(store)
    }

    #[test]
    fn test_derive_zero() {
        assert_eq!(derive_continuous(0.0).unwrap(), [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_derive_order() {
        let derived = derive_continuous(3.0).unwrap();
        assert_eq!(derived.len(), 4);
        assert_eq!(derived[0], 3.0);
        assert_eq!(derived[1], 9.0);
        assert!((derived[2] - 4.0_f64.ln()).abs() < 1e-12);
        assert!((derived[3] - 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_derive_rejects_out_of_domain() {
        for x in [-0.5, -1.0, -10.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                derive_continuous(x),
                Err(AppError::InvalidContinuousValue(_))
            ));
        }
    }

    #[test]
    fn test_derive_rejects_overflowing_square() {
        for x in [1e200, f64::MAX] {
            assert!(matches!(
                derive_continuous(x),
                Err(AppError::InvalidContinuousValue(v)) if v == x
            ));
        }
        // Magnitudes whose square still fits are accepted.
        let derived = derive_continuous(1e150).unwrap();
        assert!(derived.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_assemble_concatenates_row_then_derived() {
        let assembler = assembler();
        let ids = ["bananas", "green", "medium"];
        let features = assembler.assemble(&ids, 15.75).unwrap();

        assert_eq!(features.len(), 54);
        assert_eq!(assembler.width(), 54);

        let row = assembler
            .store()
            .lookup(&CategoricalKey::encode(&ids))
            .unwrap();
        assert_eq!(&features.as_slice()[..50], row.as_slice());
        assert_eq!(features[50], 15.75);
        assert_eq!(features[51], 15.75 * 15.75);
        assert!((features[52] - 16.75_f64.ln()).abs() < 1e-12);
        assert!((features[53] - 15.75_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_assemble_propagates_failures() {
        let assembler = assembler();
        assert!(matches!(
            assembler.assemble(&["grape", "red", "small"], 1.0),
            Err(AppError::UnknownCategory(_))
        ));
        assert!(matches!(
            assembler.assemble(&["apples", "red", "small"], -2.0),
            Err(AppError::InvalidContinuousValue(_))
        ));
        assert!(matches!(
            assembler.assemble(&["apples", "red", "small"], f64::MAX),
            Err(AppError::InvalidContinuousValue(_))
        ));
    }
}
