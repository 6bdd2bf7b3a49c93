//! Centroid initialization strategies.
//!
//! Every strategy takes a dataset and a cluster count and produces a `(k, 2)`
//! array of starting centroids. Randomized strategies draw from the RNG passed
//! in by the caller, so a seeded session reproduces the same centroids.

use crate::dataset::{Dataset, Point};
use crate::distance::{min_squared_distances, update_min_squared_distances};
use crate::error::{KMeansError, Result};
use ndarray::{Array2, Axis};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Name of an initialization strategy, without any strategy-specific data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitMethod {
    Random,
    FurthestFirst,
    KMeansPlusPlus,
    Manual,
}

impl InitMethod {
    pub const ALL: [InitMethod; 4] = [
        InitMethod::Random,
        InitMethod::FurthestFirst,
        InitMethod::KMeansPlusPlus,
        InitMethod::Manual,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InitMethod::Random => "Random",
            InitMethod::FurthestFirst => "Furthest First",
            InitMethod::KMeansPlusPlus => "KMeans++",
            InitMethod::Manual => "Manual",
        }
    }
}

impl fmt::Display for InitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InitMethod {
    type Err = KMeansError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(InitMethod::Random),
            "furthest first" | "furthest-first" | "furthest_first" | "furthestfirst" => {
                Ok(InitMethod::FurthestFirst)
            }
            "kmeans++" | "k-means++" | "kmeans-plus-plus" | "kmeansplusplus" | "kpp" => {
                Ok(InitMethod::KMeansPlusPlus)
            }
            "manual" => Ok(InitMethod::Manual),
            _ => Err(KMeansError::UnknownInitMethod(s.to_string())),
        }
    }
}

/// A fully specified initialization strategy
#[derive(Debug, Clone, PartialEq)]
pub enum Initializer {
    /// k distinct dataset points chosen uniformly without replacement
    Random,
    /// Greedy farthest-point traversal from a random first point
    FurthestFirst,
    /// D²-weighted seeding
    KMeansPlusPlus,
    /// Caller-supplied coordinates, one per cluster
    Manual(Vec<Point>),
}

impl Initializer {
    pub fn method(&self) -> InitMethod {
        match self {
            Initializer::Random => InitMethod::Random,
            Initializer::FurthestFirst => InitMethod::FurthestFirst,
            Initializer::KMeansPlusPlus => InitMethod::KMeansPlusPlus,
            Initializer::Manual(_) => InitMethod::Manual,
        }
    }

    /// Build an initializer from a method tag plus optional manual coordinates.
    ///
    /// Coordinates are required for `Manual` and ignored by the others.
    pub fn from_method(method: InitMethod, manual: Option<Vec<Point>>) -> Result<Self> {
        match method {
            InitMethod::Random => Ok(Initializer::Random),
            InitMethod::FurthestFirst => Ok(Initializer::FurthestFirst),
            InitMethod::KMeansPlusPlus => Ok(Initializer::KMeansPlusPlus),
            InitMethod::Manual => manual.map(Initializer::Manual).ok_or_else(|| {
                KMeansError::InvalidCentroids(
                    "manual initialization requires centroid coordinates".to_string(),
                )
            }),
        }
    }

    /// Produce `k` initial centroids for `dataset`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `k` is 0 or larger than `max_k`
    /// - `k` exceeds the number of points (all strategies except `Manual`)
    /// - manual coordinates have the wrong count or fall outside the dataset's bounds
    pub fn initialize_centroids<R: Rng + ?Sized>(
        &self,
        dataset: &Dataset,
        k: usize,
        max_k: usize,
        rng: &mut R,
    ) -> Result<Array2<f64>> {
        validate_k(k, max_k)?;

        match self {
            Initializer::Manual(points) => manual_init(dataset, k, points),
            _ => {
                if dataset.len() < k {
                    return Err(KMeansError::InsufficientData(format!(
                        "Number of samples ({}) is less than k ({})",
                        dataset.len(),
                        k
                    )));
                }
                let indices = match self {
                    Initializer::Random => random_init(dataset, k, rng),
                    Initializer::FurthestFirst => furthest_first_init(dataset, k, rng),
                    _ => kmeans_plus_plus_init(dataset, k, rng),
                };
                Ok(dataset.view().select(Axis(0), &indices))
            }
        }
    }
}

fn validate_k(k: usize, max_k: usize) -> Result<()> {
    if k == 0 {
        return Err(KMeansError::InvalidK("k must be at least 1".to_string()));
    }
    if k > max_k {
        return Err(KMeansError::InvalidK(format!(
            "k ({}) exceeds the maximum of {}",
            k, max_k
        )));
    }
    Ok(())
}

/// Pick k distinct point indices uniformly at random
fn random_init<R: Rng + ?Sized>(dataset: &Dataset, k: usize, rng: &mut R) -> Vec<usize> {
    let indices: Vec<usize> = (0..dataset.len()).collect();
    indices.choose_multiple(rng, k).cloned().collect()
}

/// Start from a random point, then repeatedly take the point whose nearest
/// chosen centroid is farthest away. Ties go to the lowest point index.
fn furthest_first_init<R: Rng + ?Sized>(dataset: &Dataset, k: usize, rng: &mut R) -> Vec<usize> {
    let data = dataset.view();
    let first = rng.gen_range(0..dataset.len());
    let mut selected = vec![first];

    let mut min_dists = min_squared_distances(&data, &data.select(Axis(0), &[first]).view());

    while selected.len() < k {
        let mut best_idx = 0;
        let mut best_dist = f64::NEG_INFINITY;
        for (i, &d) in min_dists.iter().enumerate() {
            if d > best_dist {
                best_dist = d;
                best_idx = i;
            }
        }

        selected.push(best_idx);
        update_min_squared_distances(&data, &data.row(best_idx), &mut min_dists);
    }

    selected
}

/// k-means++ seeding: each new centroid is drawn with probability
/// proportional to its squared distance from the nearest chosen centroid.
fn kmeans_plus_plus_init<R: Rng + ?Sized>(dataset: &Dataset, k: usize, rng: &mut R) -> Vec<usize> {
    let data = dataset.view();
    let n = dataset.len();
    let first = rng.gen_range(0..n);
    let mut selected = vec![first];

    let mut min_dists = min_squared_distances(&data, &data.select(Axis(0), &[first]).view());

    while selected.len() < k {
        // All weights are zero once every point coincides with a chosen centroid
        let next = match WeightedIndex::new(min_dists.iter()) {
            Ok(weights) => weights.sample(rng),
            Err(_) => rng.gen_range(0..n),
        };

        selected.push(next);
        update_min_squared_distances(&data, &data.row(next), &mut min_dists);
    }

    selected
}

fn manual_init(dataset: &Dataset, k: usize, points: &[Point]) -> Result<Array2<f64>> {
    if points.len() != k {
        return Err(KMeansError::InvalidCentroids(format!(
            "Expected {} centroids, but got {}",
            k,
            points.len()
        )));
    }

    let bounds = dataset.bounds();
    let mut centroids = Array2::zeros((k, 2));
    for (i, p) in points.iter().enumerate() {
        if !p.is_finite() || !bounds.contains(p) {
            return Err(KMeansError::InvalidCentroids(format!(
                "centroid {} at ({}, {}) lies outside the dataset domain {:?}",
                i, p.x, p.y, bounds
            )));
        }
        centroids[[i, 0]] = p.x;
        centroids[[i, 1]] = p.y;
    }

    Ok(centroids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Bounds;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn line_dataset() -> Dataset {
        Dataset::from_points(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (7.0, 0.0), (10.0, 0.0)]).unwrap()
    }

    fn random_dataset(n: usize, seed: u64) -> Dataset {
        Dataset::generate(n, Bounds::default(), &mut ChaCha8Rng::seed_from_u64(seed)).unwrap()
    }

    fn rows(centroids: &Array2<f64>) -> Vec<(f64, f64)> {
        centroids.outer_iter().map(|r| (r[0], r[1])).collect()
    }

    #[test]
    fn test_method_parse_and_display() {
        for method in InitMethod::ALL {
            assert_eq!(method.label().parse::<InitMethod>().unwrap(), method);
        }
        assert_eq!("kmeans-plus-plus".parse::<InitMethod>().unwrap(), InitMethod::KMeansPlusPlus);
        assert_eq!(" RANDOM ".parse::<InitMethod>().unwrap(), InitMethod::Random);
        assert!(matches!(
            "spectral".parse::<InitMethod>(),
            Err(KMeansError::UnknownInitMethod(_))
        ));
    }

    #[test]
    fn test_from_method_manual_needs_points() {
        assert!(Initializer::from_method(InitMethod::Manual, None).is_err());
        let init = Initializer::from_method(InitMethod::Manual, Some(vec![Point::new(1.0, 1.0)])).unwrap();
        assert_eq!(init.method(), InitMethod::Manual);
        assert_eq!(
            Initializer::from_method(InitMethod::Random, None).unwrap(),
            Initializer::Random
        );
    }

    #[test]
    fn test_k_bounds_apply_to_every_strategy() {
        let dataset = random_dataset(50, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let strategies = [
            Initializer::Random,
            Initializer::FurthestFirst,
            Initializer::KMeansPlusPlus,
            Initializer::Manual(vec![]),
        ];

        for init in &strategies {
            let zero = init.initialize_centroids(&dataset, 0, 10, &mut rng);
            assert!(matches!(zero, Err(KMeansError::InvalidK(_))), "{:?}", init);
            let too_many = init.initialize_centroids(&dataset, 11, 10, &mut rng);
            assert!(matches!(too_many, Err(KMeansError::InvalidK(_))), "{:?}", init);
        }
    }

    #[test]
    fn test_random_picks_distinct_dataset_points() {
        let dataset = random_dataset(30, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let centroids = Initializer::Random
            .initialize_centroids(&dataset, 10, 10, &mut rng)
            .unwrap();

        let points = dataset.to_points();
        let chosen = rows(&centroids);
        for (i, c) in chosen.iter().enumerate() {
            assert!(points.iter().any(|p| (p.x, p.y) == *c));
            assert!(!chosen[..i].contains(c), "centroid {} duplicated", i);
        }
    }

    #[test]
    fn test_random_k_greater_than_n() {
        let dataset = random_dataset(3, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let result = Initializer::Random.initialize_centroids(&dataset, 4, 10, &mut rng);
        assert!(matches!(result, Err(KMeansError::InsufficientData(_))));
    }

    #[test]
    fn test_random_k_equals_n_uses_every_point() {
        let dataset = line_dataset();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let centroids = Initializer::Random
            .initialize_centroids(&dataset, 5, 10, &mut rng)
            .unwrap();
        let mut xs: Vec<f64> = centroids.column(0).to_vec();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 7.0, 10.0]);
    }

    #[test]
    fn test_furthest_first_second_is_farthest_from_first() {
        let dataset = random_dataset(200, 3);

        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let centroids = Initializer::FurthestFirst
                .initialize_centroids(&dataset, 2, 10, &mut rng)
                .unwrap();

            let first = Point::from(centroids.row(0));
            let second = Point::from(centroids.row(1));
            let dist = |p: &Point| (p.x - first.x).powi(2) + (p.y - first.y).powi(2);
            let farthest = dataset.iter().map(|p| dist(&p)).fold(0.0, f64::max);

            assert_relative_eq!(dist(&second), farthest);
        }
    }

    #[test]
    fn test_furthest_first_greedy_sequence() {
        let dataset = random_dataset(100, 6);

        for seed in 0..5 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let centroids = Initializer::FurthestFirst
                .initialize_centroids(&dataset, 3, 10, &mut rng)
                .unwrap();

            // The third centroid maximizes the distance to the nearer of the first two
            let chosen = centroids.select(Axis(0), &[0, 1]);
            let min_dists = min_squared_distances(&dataset.view(), &chosen.view());
            let best = min_dists.iter().cloned().fold(0.0, f64::max);
            let third = centroids.select(Axis(0), &[2]);
            let third_dist = min_squared_distances(&third.view(), &chosen.view())[0];

            assert_relative_eq!(third_dist, best);
        }
    }

    #[test]
    fn test_furthest_first_tie_lowest_index() {
        // From the middle point, both ends are equally far
        let dataset = Dataset::from_points(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)]).unwrap();

        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let centroids = Initializer::FurthestFirst
                .initialize_centroids(&dataset, 2, 10, &mut rng)
                .unwrap();
            if centroids[[0, 0]] == 5.0 {
                assert_eq!(centroids[[1, 0]], 0.0);
            }
        }
    }

    #[test]
    fn test_kmeans_plus_plus_reproducible() {
        let dataset = random_dataset(300, 4);

        let a = Initializer::KMeansPlusPlus
            .initialize_centroids(&dataset, 6, 10, &mut ChaCha8Rng::seed_from_u64(42))
            .unwrap();
        let b = Initializer::KMeansPlusPlus
            .initialize_centroids(&dataset, 6, 10, &mut ChaCha8Rng::seed_from_u64(42))
            .unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_kmeans_plus_plus_never_repeats_with_distinct_points() {
        let dataset = line_dataset();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let centroids = Initializer::KMeansPlusPlus
            .initialize_centroids(&dataset, 5, 10, &mut rng)
            .unwrap();
        let mut xs: Vec<f64> = centroids.column(0).to_vec();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());

        // A chosen point has zero weight, so with k == n every point is used once
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 7.0, 10.0]);
    }

    #[test]
    fn test_kmeans_plus_plus_coincident_points() {
        let dataset = Dataset::from_points(&[(3.0, 3.0), (3.0, 3.0), (3.0, 3.0)]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let centroids = Initializer::KMeansPlusPlus
            .initialize_centroids(&dataset, 3, 10, &mut rng)
            .unwrap();
        assert!(centroids.iter().all(|&v| v == 3.0));
    }

    #[test]
    fn test_kmeans_plus_plus_weights_by_squared_distance() {
        // From a first pick at x = 0 the weights are 0, 1 and 9, so x = 3 is
        // chosen 90% of the time (75% under plain distance, 50% uniformly)
        let dataset = Dataset::from_points(&[(0.0, 0.0), (1.0, 0.0), (3.0, 0.0)]).unwrap();

        let mut from_origin = 0;
        let mut picked_far = 0;
        for seed in 0..6000 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let centroids = Initializer::KMeansPlusPlus
                .initialize_centroids(&dataset, 2, 10, &mut rng)
                .unwrap();
            if centroids[[0, 0]] == 0.0 {
                from_origin += 1;
                if centroids[[1, 0]] == 3.0 {
                    picked_far += 1;
                }
            }
        }

        assert!(from_origin > 1500, "first pick at origin only {} times", from_origin);
        let share = picked_far as f64 / from_origin as f64;
        assert!((0.86..=0.94).contains(&share), "far point share {}", share);
    }

    #[test]
    fn test_manual_count_must_match_k() {
        let dataset = random_dataset(20, 5);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let pts = |n: usize| (0..n).map(|i| Point::new(10.0 * i as f64, 50.0)).collect::<Vec<_>>();

        assert!(Initializer::Manual(pts(3))
            .initialize_centroids(&dataset, 3, 10, &mut rng)
            .is_ok());
        for n in [2, 4] {
            let result = Initializer::Manual(pts(n)).initialize_centroids(&dataset, 3, 10, &mut rng);
            assert!(matches!(result, Err(KMeansError::InvalidCentroids(_))));
        }
    }

    #[test]
    fn test_manual_outside_domain() {
        let dataset = random_dataset(20, 5);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let result = Initializer::Manual(vec![Point::new(50.0, 50.0), Point::new(150.0, 10.0)])
            .initialize_centroids(&dataset, 2, 10, &mut rng);
        assert!(matches!(result, Err(KMeansError::InvalidCentroids(_))));

        let nan = Initializer::Manual(vec![Point::new(f64::NAN, 10.0)])
            .initialize_centroids(&dataset, 1, 10, &mut rng);
        assert!(nan.is_err());
    }

    #[test]
    fn test_manual_allows_k_greater_than_n() {
        let dataset = Dataset::from_points(&[(0.0, 0.0), (10.0, 10.0)]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let points = vec![Point::new(1.0, 1.0), Point::new(5.0, 5.0), Point::new(9.0, 9.0)];

        let centroids = Initializer::Manual(points)
            .initialize_centroids(&dataset, 3, 10, &mut rng)
            .unwrap();
        assert_eq!(rows(&centroids), vec![(1.0, 1.0), (5.0, 5.0), (9.0, 9.0)]);
    }
}
