use nalgebra::DVector;

use crate::error::{internal_error, AppError};

const MIN_PROBABILITY: f64 = f64::MIN_POSITIVE;
const MAX_PROBABILITY: f64 = 1.0 - f64::EPSILON;

/// Logistic function, evaluated so that `exp` never overflows and clamped to
/// the open interval `(0, 1)`.
pub fn sigmoid(x: f64) -> f64 {
    let p = if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    };
    p.clamp(MIN_PROBABILITY, MAX_PROBABILITY)
}

/// `sigmoid(features . coefficients)`.
pub fn score(features: &DVector<f64>, coefficients: &DVector<f64>) -> Result<f64, AppError> {
    if features.len() != coefficients.len() {
        return Err(internal_error(&format!(
            "feature width {} does not match coefficient width {}",
            features.len(),
            coefficients.len()
        )));
    }

    let logit = features.dot(coefficients);
    if logit.is_nan() {
        return Err(internal_error("dot product of features and coefficients is NaN"));
    }

    Ok(sigmoid(logit))
}
