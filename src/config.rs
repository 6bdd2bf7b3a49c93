use crate::dataset::Bounds;
use crate::error::{KMeansError, Result};

/// Configuration for a clustering session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Largest number of clusters `initialize()` accepts
    pub max_k: usize,

    /// Largest dataset `generate_dataset()` accepts
    pub max_points: usize,

    /// Iteration bound for `converge()`. Reaching it forces the session to
    /// converge and raises the warning flag on the report.
    pub max_iters: usize,

    /// Convergence tolerance. When the largest centroid displacement of a step
    /// is below this threshold the run is considered converged.
    pub tol: f64,

    /// Random seed for dataset generation and randomized initialization.
    /// `None` seeds from system entropy.
    pub seed: Option<u64>,

    /// Coordinate domain for generated datasets
    pub bounds: Bounds,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_k: 10,
            max_points: 1000,
            max_iters: 300,
            tol: 1e-6,
            seed: None,
            bounds: Bounds::default(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of clusters
    pub fn with_max_k(mut self, max_k: usize) -> Self {
        self.max_k = max_k;
        self
    }

    /// Set the maximum dataset size
    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    /// Set the iteration bound for `converge()`
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the coordinate domain for generated datasets
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_k == 0 {
            return Err(KMeansError::InvalidConfig(
                "max_k must be greater than 0".to_string(),
            ));
        }
        if self.max_points == 0 {
            return Err(KMeansError::InvalidConfig(
                "max_points must be greater than 0".to_string(),
            ));
        }
        if self.max_iters == 0 {
            return Err(KMeansError::InvalidConfig(
                "max_iters must be greater than 0".to_string(),
            ));
        }
        if self.tol.is_nan() || self.tol < 0.0 {
            return Err(KMeansError::InvalidConfig(format!(
                "tol must be a non-negative number, got {}",
                self.tol
            )));
        }
        if !self.bounds.is_valid() {
            return Err(KMeansError::InvalidConfig(format!(
                "invalid coordinate bounds {:?}",
                self.bounds
            )));
        }
        Ok(())
    }
}
