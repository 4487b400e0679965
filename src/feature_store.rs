use nalgebra::DVector;
use rand::Rng;
use std::{
    collections::{HashMap, HashSet},
    fmt,
};
use tracing::{debug, info};

use crate::error::AppError;

pub const KEY_SEPARATOR: char = '_';

/// Lookup key for one combination of categorical values.
///
/// Keys are the values joined with [`KEY_SEPARATOR`]. Domain values are
/// checked for the separator when the store is built, so every stored key has
/// exactly two separators and a request value that contains one can never
/// collide with a stored key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoricalKey(String);

impl CategoricalKey {
    pub fn encode<S: AsRef<str>>(values: &[S; 3]) -> Self {
        let mut key = String::with_capacity(values.iter().map(|v| v.as_ref().len() + 1).sum());
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                key.push(KEY_SEPARATOR);
            }
            key.push_str(value.as_ref());
        }
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoricalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable table of precomputed rows, one per categorical combination.
#[derive(Debug)]
pub struct FeatureStore {
    rows: HashMap<CategoricalKey, DVector<f64>>,
    row_width: usize,
}

impl FeatureStore {
    /// Enumerates the cross product of `domains` and draws one uniform row of
    /// `row_width` components per combination.
    pub fn build<R: Rng + ?Sized>(
        domains: &[Vec<String>; 3],
        row_width: usize,
        rng: &mut R,
    ) -> Result<Self, AppError> {
        for (index, domain) in domains.iter().enumerate() {
            validate_domain(index, domain)?;
        }

        let capacity = domains.iter().map(Vec::len).product();
        let mut rows = HashMap::with_capacity(capacity);

        for id_0 in &domains[0] {
            for id_1 in &domains[1] {
                for id_2 in &domains[2] {
                    let key = CategoricalKey::encode(&[id_0, id_1, id_2]);
                    let row = DVector::from_fn(row_width, |_, _| rng.gen::<f64>());
                    debug!("Built feature row for {}", key);
                    rows.insert(key, row);
                }
            }
        }

        info!("Feature store size: {} discrete combinations.", rows.len());

        Ok(Self { rows, row_width })
    }

    pub fn lookup(&self, key: &CategoricalKey) -> Result<&DVector<f64>, AppError> {
        self.rows
            .get(key)
            .ok_or_else(|| AppError::UnknownCategory(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_width(&self) -> usize {
        self.row_width
    }
}

fn validate_domain(index: usize, domain: &[String]) -> Result<(), AppError> {
    if domain.is_empty() {
        return Err(AppError::InvalidDomain(format!("domain {} is empty", index)));
    }

    let mut seen = HashSet::with_capacity(domain.len());
    for value in domain {
        if value.is_empty() {
            return Err(AppError::InvalidDomain(format!(
                "domain {} contains an empty value",
                index
            )));
        }
        if value.contains(KEY_SEPARATOR) {
            return Err(AppError::InvalidDomain(format!(
                "value {:?} in domain {} contains the key separator {:?}",
                value, index, KEY_SEPARATOR
            )));
        }
        if !seen.insert(value.as_str()) {
            return Err(AppError::InvalidDomain(format!(
                "value {:?} appears twice in domain {}",
                value, index
            )));
        }
    }

    Ok(())
}
