//! # kmeans-stepper
//!
//! A step-by-step k-means clustering engine for interactive teaching tools.
//!
//! A [`Session`] owns a 2D dataset, the current centroids and the cluster
//! assignment. The caller drives it one Lloyd iteration at a time and renders
//! the [`Snapshot`] returned after every operation.
//!
//! ## Features
//!
//! - **Four initialization strategies**: Random, Furthest First, KMeans++ and
//!   Manual (caller-supplied coordinates)
//! - **Single stepping**: `step()` runs exactly one update + assign iteration
//! - **Run to convergence**: `converge()` iterates until the assignment is stable,
//!   bounded by a configurable iteration limit
//! - **Enforced call order**: operations that make no sense in the current
//!   [`SessionState`] are rejected with a precondition error
//! - **Reproducible**: set a seed in [`SessionConfig`] and every random choice
//!   is repeatable
//!
//! ## Example
//!
//! ```rust
//! use kmeans_stepper::{InitMethod, Session, SessionConfig, SessionState};
//!
//! let mut session = Session::with_config(SessionConfig::new().with_seed(42)).unwrap();
//!
//! // 100 points sampled uniformly from [0, 100] x [0, 100]
//! session.generate_dataset(100).unwrap();
//! session.initialize(3, InitMethod::FurthestFirst, None).unwrap();
//!
//! // Advance one iteration and look at the result
//! let report = session.step().unwrap();
//! assert_eq!(report.snapshot.centroids.unwrap().len(), 3);
//!
//! if !report.converged {
//!     let report = session.converge().unwrap();
//!     assert!(report.converged);
//! }
//! assert_eq!(session.state(), SessionState::Converged);
//! ```
//!
//! ## Manual Initialization
//!
//! ```rust
//! use kmeans_stepper::{Dataset, InitMethod, Point, Session};
//!
//! let dataset = Dataset::from_points(&[(0.0, 0.0), (0.0, 1.0), (10.0, 0.0), (10.0, 1.0)]).unwrap();
//!
//! let mut session = Session::new();
//! session.load_dataset(dataset).unwrap();
//! let report = session
//!     .initialize(2, InitMethod::Manual, Some(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]))
//!     .unwrap();
//!
//! assert_eq!(report.snapshot.assignment.unwrap().to_vec(), vec![0, 0, 1, 1]);
//! assert!(session.step().unwrap().converged);
//! ```

mod algorithm;
mod config;
mod dataset;
mod distance;
mod error;
mod init;
mod session;
mod shared;

pub use algorithm::Assignment;
pub use config::SessionConfig;
pub use dataset::{Bounds, Dataset, Point, DEFAULT_NUM_POINTS};
pub use error::{ErrorKind, KMeansError, Result};
pub use init::{InitMethod, Initializer};
pub use session::{
    Centroid, ConvergeReport, InitReport, Session, SessionState, Snapshot, StepReport,
};
pub use shared::SharedSession;
