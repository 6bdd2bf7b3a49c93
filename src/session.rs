use crate::algorithm::{compute_inertia, lloyd_step, Assignment, StepOutcome};
use crate::config::SessionConfig;
use crate::dataset::{Dataset, Point};
use crate::error::{KMeansError, Result};
use crate::init::{InitMethod, Initializer};
use log::{debug, info, warn};
use ndarray::Array2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fmt;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No dataset
    Empty,
    /// Dataset present, clustering not initialized
    DatasetReady,
    /// Centroids and assignment present, still iterating
    Initialized,
    /// The last iteration left the assignment (or centroids) unchanged
    Converged,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Empty => "empty",
            SessionState::DatasetReady => "dataset ready",
            SessionState::Initialized => "initialized",
            SessionState::Converged => "converged",
        };
        f.write_str(name)
    }
}

/// A centroid position tagged with its cluster id
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub id: usize,
    pub x: f64,
    pub y: f64,
}

impl Centroid {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Everything a renderer needs to draw the current session
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub state: SessionState,
    pub dataset: Option<Dataset>,
    pub k: Option<usize>,
    pub method: Option<InitMethod>,
    pub centroids: Option<Vec<Centroid>>,
    pub assignment: Option<Assignment>,
    /// Lloyd iterations since the last `initialize()`
    pub iterations: usize,
    /// Within-cluster sum of squares, present once initialized
    pub inertia: Option<f64>,
}

impl Snapshot {
    pub fn is_converged(&self) -> bool {
        self.state == SessionState::Converged
    }
}

/// Result of `initialize()`
#[derive(Debug, Clone)]
pub struct InitReport {
    pub snapshot: Snapshot,
    pub message: String,
}

/// Result of a single `step()`
#[derive(Debug, Clone)]
pub struct StepReport {
    pub snapshot: Snapshot,
    pub converged: bool,
    /// Largest distance any centroid moved during this step
    pub shift: f64,
    /// Points that changed cluster during this step
    pub n_changed: usize,
    /// Clusters that had no points and kept their previous centroid
    pub empty_clusters: Vec<usize>,
}

/// Result of `converge()`
#[derive(Debug, Clone)]
pub struct ConvergeReport {
    pub snapshot: Snapshot,
    /// Always true: hitting the iteration bound forces convergence
    pub converged: bool,
    /// Steps performed by this call
    pub steps: usize,
    /// Set when the iteration bound was reached before the run stabilized
    pub hit_iteration_limit: bool,
    pub message: String,
}

/// State of an initialized run. Centroids and assignment only exist together.
#[derive(Debug, Clone)]
struct Run {
    k: usize,
    method: InitMethod,
    centroids: Array2<f64>,
    assignment: Assignment,
    iterations: usize,
    converged: bool,
}

/// Interactive k-means clustering session.
///
/// Owns the dataset, the centroids and the assignment, and only allows
/// operations that make sense in the current [`SessionState`]. A failed
/// operation leaves the session untouched.
///
/// # Example
///
/// ```
/// use kmeans_stepper::{InitMethod, Session, SessionConfig, SessionState};
///
/// let mut session = Session::with_config(SessionConfig::new().with_seed(7)).unwrap();
/// session.generate_dataset(200).unwrap();
/// session.initialize(4, InitMethod::KMeansPlusPlus, None).unwrap();
///
/// let report = session.converge().unwrap();
/// assert!(report.converged);
/// assert_eq!(session.state(), SessionState::Converged);
/// ```
pub struct Session {
    config: SessionConfig,
    rng: ChaCha8Rng,
    dataset: Option<Dataset>,
    run: Option<Run>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create an empty session with the default configuration, seeded from entropy
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            rng: ChaCha8Rng::from_entropy(),
            dataset: None,
            run: None,
        }
    }

    /// Create an empty session with a custom configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration fails validation.
    pub fn with_config(config: SessionConfig) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Ok(Self {
            config,
            rng,
            dataset: None,
            run: None,
        })
    }

    pub fn state(&self) -> SessionState {
        match (&self.dataset, &self.run) {
            (None, _) => SessionState::Empty,
            (Some(_), None) => SessionState::DatasetReady,
            (Some(_), Some(run)) if run.converged => SessionState::Converged,
            (Some(_), Some(_)) => SessionState::Initialized,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn k(&self) -> Option<usize> {
        self.run.as_ref().map(|run| run.k)
    }

    pub fn method(&self) -> Option<InitMethod> {
        self.run.as_ref().map(|run| run.method)
    }

    pub fn centroids(&self) -> Option<Vec<Centroid>> {
        self.run.as_ref().map(|run| centroid_list(&run.centroids))
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        self.run.as_ref().map(|run| &run.assignment)
    }

    pub fn iterations(&self) -> usize {
        self.run.as_ref().map_or(0, |run| run.iterations)
    }

    /// Within-cluster sum of squares for the current run
    pub fn inertia(&self) -> Option<f64> {
        match (&self.dataset, &self.run) {
            (Some(dataset), Some(run)) => Some(compute_inertia(
                &dataset.view(),
                &run.centroids.view(),
                &run.assignment,
            )),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state(),
            dataset: self.dataset.clone(),
            k: self.k(),
            method: self.method(),
            centroids: self.centroids(),
            assignment: self.assignment().cloned(),
            iterations: self.iterations(),
            inertia: self.inertia(),
        }
    }

    /// Replace the dataset with `num_points` points sampled uniformly from the
    /// configured bounds. Legal in every state; clears any clustering run.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNumPoints` if `num_points` is 0 or above `max_points`.
    pub fn generate_dataset(&mut self, num_points: usize) -> Result<Snapshot> {
        if num_points == 0 || num_points > self.config.max_points {
            return Err(KMeansError::InvalidNumPoints(format!(
                "expected between 1 and {} points, got {}",
                self.config.max_points, num_points
            )));
        }

        let dataset = Dataset::generate(num_points, self.config.bounds, &mut self.rng)?;
        info!(
            "Generated dataset of {} points in {:?}",
            dataset.len(),
            dataset.bounds()
        );

        self.dataset = Some(dataset);
        self.run = None;
        Ok(self.snapshot())
    }

    /// Install a prepared dataset. Legal in every state; clears any clustering run.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNumPoints` if the dataset holds more than `max_points` points.
    pub fn load_dataset(&mut self, dataset: Dataset) -> Result<Snapshot> {
        if dataset.len() > self.config.max_points {
            return Err(KMeansError::InvalidNumPoints(format!(
                "dataset has {} points, the maximum is {}",
                dataset.len(),
                self.config.max_points
            )));
        }

        info!("Loaded dataset of {} points", dataset.len());
        self.dataset = Some(dataset);
        self.run = None;
        Ok(self.snapshot())
    }

    /// Choose `k` starting centroids with `method` and assign every point to
    /// the nearest one. `manual` supplies the coordinates for
    /// [`InitMethod::Manual`] and is ignored otherwise.
    ///
    /// Legal once a dataset exists, including over an existing run.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No dataset exists (`NoDataset`)
    /// - `k` is 0 or above `max_k` (`InvalidK`)
    /// - `k` exceeds the dataset size for a sampling strategy (`InsufficientData`)
    /// - Manual coordinates are missing, miscounted or out of domain (`InvalidCentroids`)
    pub fn initialize(
        &mut self,
        k: usize,
        method: InitMethod,
        manual: Option<Vec<Point>>,
    ) -> Result<InitReport> {
        if self.dataset.is_none() {
            return Err(KMeansError::NoDataset);
        }
        let initializer = Initializer::from_method(method, manual)?;
        self.initialize_with(k, &initializer)
    }

    /// Same as [`Session::initialize`] with a prebuilt [`Initializer`]
    pub fn initialize_with(&mut self, k: usize, initializer: &Initializer) -> Result<InitReport> {
        let dataset = self.dataset.as_ref().ok_or(KMeansError::NoDataset)?;

        let centroids =
            initializer.initialize_centroids(dataset, k, self.config.max_k, &mut self.rng)?;
        let assignment = Assignment::compute(&dataset.view(), &centroids.view());
        let method = initializer.method();

        info!("Initialized clustering: k = {}, method = {}", k, method);

        self.run = Some(Run {
            k,
            method,
            centroids,
            assignment,
            iterations: 0,
            converged: false,
        });

        Ok(InitReport {
            snapshot: self.snapshot(),
            message: format!(
                "Clustering initialized with {} clusters using {} initialization.",
                k, method
            ),
        })
    }

    /// Perform exactly one Lloyd iteration.
    ///
    /// # Errors
    ///
    /// Returns a precondition error unless the session is `Initialized`.
    pub fn step(&mut self) -> Result<StepReport> {
        self.require_initialized()?;
        let (converged, shift, n_changed, empty_clusters) = self.advance()?;

        Ok(StepReport {
            snapshot: self.snapshot(),
            converged,
            shift,
            n_changed,
            empty_clusters,
        })
    }

    /// Step until the run converges or `max_iters` steps have been taken.
    ///
    /// Hitting the bound is not an error: the session is marked converged and
    /// the report carries `hit_iteration_limit`.
    ///
    /// # Errors
    ///
    /// Returns a precondition error unless the session is `Initialized`.
    pub fn converge(&mut self) -> Result<ConvergeReport> {
        self.require_initialized()?;

        let mut steps = 0;
        let mut converged = false;
        while steps < self.config.max_iters {
            steps += 1;
            if self.advance()?.0 {
                converged = true;
                break;
            }
        }

        let hit_iteration_limit = !converged;
        let message = if hit_iteration_limit {
            warn!(
                "Reached the iteration limit ({}) without stabilizing; forcing convergence",
                self.config.max_iters
            );
            if let Some(run) = self.run.as_mut() {
                run.converged = true;
            }
            format!(
                "Clustering stopped after reaching the iteration limit of {}.",
                self.config.max_iters
            )
        } else {
            "Clustering has converged.".to_string()
        };

        Ok(ConvergeReport {
            snapshot: self.snapshot(),
            converged: true,
            steps,
            hit_iteration_limit,
            message,
        })
    }

    /// Drop the dataset and any clustering run
    pub fn reset(&mut self) -> Snapshot {
        info!("Session reset");
        self.dataset = None;
        self.run = None;
        self.snapshot()
    }

    fn require_initialized(&self) -> Result<()> {
        match self.state() {
            SessionState::Initialized => Ok(()),
            SessionState::Empty => Err(KMeansError::NoDataset),
            SessionState::DatasetReady => Err(KMeansError::NotInitialized),
            SessionState::Converged => Err(KMeansError::AlreadyConverged),
        }
    }

    /// One Lloyd iteration on the current run. Returns whether it converged,
    /// the largest centroid shift, the number of reassigned points and the
    /// clusters left empty.
    fn advance(&mut self) -> Result<(bool, f64, usize, Vec<usize>)> {
        let dataset = self.dataset.as_ref().ok_or(KMeansError::NoDataset)?;
        let run = self.run.as_mut().ok_or(KMeansError::NotInitialized)?;

        let StepOutcome {
            centroids,
            assignment,
            shift,
            n_changed,
            empty_clusters,
            converged,
        } = lloyd_step(
            &dataset.view(),
            &run.centroids.view(),
            &run.assignment,
            self.config.tol,
        );

        run.iterations += 1;
        debug!(
            "Iteration {}: shift = {:.6}, reassigned = {}",
            run.iterations, shift, n_changed
        );
        if !empty_clusters.is_empty() {
            warn!(
                "Iteration {}: clusters {:?} have no points; centroids left in place",
                run.iterations, empty_clusters
            );
        }

        run.centroids = centroids;
        run.assignment = assignment;
        run.converged = converged;

        if converged {
            info!("Converged after {} iterations", run.iterations);
        }

        Ok((converged, shift, n_changed, empty_clusters))
    }
}

fn centroid_list(centroids: &Array2<f64>) -> Vec<Centroid> {
    centroids
        .outer_iter()
        .enumerate()
        .map(|(id, row)| Centroid {
            id,
            x: row[0],
            y: row[1],
        })
        .collect()
}
