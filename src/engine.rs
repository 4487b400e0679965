use rand::Rng;
use tracing::{debug, info};

use crate::{
    config::{ModelConfig, SELF_CHECK_CONTINUOUS, SELF_CHECK_IDS},
    error::AppError,
    feature_store::FeatureStore,
    features::FeatureAssembler,
    model,
    sampler::CoefficientSampler,
};

/// Score for a single request: a 1x1 result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    probability: f64,
}

impl Prediction {
    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn shape(&self) -> (usize, usize) {
        (1, 1)
    }

    pub fn as_matrix(&self) -> Vec<Vec<f64>> {
        vec![vec![self.probability]]
    }
}

/// Application context: the feature store and coefficient means, built once
/// and read-only for the rest of the process.
pub struct PredictionEngine {
    model: ModelConfig,
    assembler: FeatureAssembler,
    sampler: CoefficientSampler,
}

impl PredictionEngine {
    pub fn new(model: ModelConfig) -> Result<Self, AppError> {
        Self::with_rng(model, &mut rand::thread_rng())
    }

    /// Builds the engine drawing the store rows and coefficient means from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(model: ModelConfig, rng: &mut R) -> Result<Self, AppError> {
        info!("Initializing prediction engine with means and feature store...");

        let sampler = CoefficientSampler::with_uniform_means(
            model.total_features(),
            model.coefficient_std_dev,
            rng,
        )?;
        let store = FeatureStore::build(&model.domains, model.discrete_features, rng)?;
        let assembler = FeatureAssembler::new(store);

        info!("Coefficient means vector size: {}", sampler.width());
        info!(
            "Feature store contains {} discrete entries.",
            assembler.store().len()
        );
        info!(
            "Each request will result in a matrix of size (1, {}).",
            assembler.width()
        );

        Ok(Self {
            model,
            assembler,
            sampler,
        })
    }

    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    pub fn feature_store(&self) -> &FeatureStore {
        self.assembler.store()
    }

    pub fn feature_width(&self) -> usize {
        self.assembler.width()
    }

    /// Assembles features, draws fresh coefficients and scores them.
    pub fn predict<S: AsRef<str>>(
        &self,
        ids: &[S; 3],
        continuous_feature: f64,
    ) -> Result<Prediction, AppError> {
        self.predict_with_rng(ids, continuous_feature, &mut rand::thread_rng())
    }

    pub fn predict_with_rng<S: AsRef<str>, R: Rng + ?Sized>(
        &self,
        ids: &[S; 3],
        continuous_feature: f64,
        rng: &mut R,
    ) -> Result<Prediction, AppError> {
        let features = self.assembler.assemble(ids, continuous_feature)?;
        let coefficients = self.sampler.sample(rng);
        let probability = model::score(&features, &coefficients)?;

        debug!(probability, "Scored request");
        Ok(Prediction { probability })
    }

    /// Runs one prediction on a fixed input before the service takes traffic.
    pub fn self_check(&self) -> Result<Prediction, AppError> {
        info!("Running a sample prediction during startup");
        let prediction = self.predict(&SELF_CHECK_IDS, SELF_CHECK_CONTINUOUS)?;
        info!(
            shape = ?prediction.shape(),
            "Sample result vector: {:?}",
            prediction.as_matrix()
        );
        Ok(prediction)
    }
}
