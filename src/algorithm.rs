use crate::distance::{find_nearest_centroids, max_centroid_shift, squared_distance};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Cluster id for every point, indexed by point position in the dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    labels: Array1<usize>,
}

impl Assignment {
    /// Assign every point to its nearest centroid (lowest id on ties)
    pub fn compute(data: &ArrayView2<f64>, centroids: &ArrayView2<f64>) -> Self {
        Self {
            labels: find_nearest_centroids(data, centroids),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Cluster id of point `i`
    pub fn get(&self, i: usize) -> Option<usize> {
        self.labels.get(i).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.labels.iter().copied()
    }

    pub fn labels(&self) -> ArrayView1<'_, usize> {
        self.labels.view()
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.labels.to_vec()
    }

    /// Number of points in each of `k` clusters
    pub fn cluster_sizes(&self, k: usize) -> Vec<usize> {
        let mut counts = vec![0; k];
        for label in self.iter() {
            if let Some(c) = counts.get_mut(label) {
                *c += 1;
            }
        }
        counts
    }

    /// Indices of the points assigned to `cluster`
    pub fn members(&self, cluster: usize) -> Vec<usize> {
        self.iter()
            .enumerate()
            .filter(|&(_, label)| label == cluster)
            .map(|(i, _)| i)
            .collect()
    }

    /// How many points carry a different id in `other`
    pub fn count_changed(&self, other: &Assignment) -> usize {
        self.labels
            .iter()
            .zip(other.labels.iter())
            .filter(|(a, b)| a != b)
            .count()
            + self.len().abs_diff(other.len())
    }
}

/// Recompute each centroid as the mean of its assigned points.
///
/// A cluster with no points keeps its previous centroid. Returns the new
/// centroids and the ids of the clusters that were empty.
pub fn update_centroids(
    data: &ArrayView2<f64>,
    assignment: &Assignment,
    centroids: &ArrayView2<f64>,
) -> (Array2<f64>, Vec<usize>) {
    let k = centroids.nrows();
    let n_features = centroids.ncols();

    let mut cluster_sums: Array2<f64> = Array2::zeros((k, n_features));
    let mut cluster_counts = vec![0usize; k];

    for (point, label) in data.outer_iter().zip(assignment.iter()) {
        cluster_counts[label] += 1;
        for j in 0..n_features {
            cluster_sums[[label, j]] += point[j];
        }
    }

    let mut new_centroids = centroids.to_owned();
    let mut empty_clusters = Vec::new();

    for (cluster_idx, &count) in cluster_counts.iter().enumerate() {
        if count > 0 {
            for j in 0..n_features {
                new_centroids[[cluster_idx, j]] = cluster_sums[[cluster_idx, j]] / count as f64;
            }
        } else {
            empty_clusters.push(cluster_idx);
        }
    }

    (new_centroids, empty_clusters)
}

/// Within-cluster sum of squared distances
pub fn compute_inertia(
    data: &ArrayView2<f64>,
    centroids: &ArrayView2<f64>,
    assignment: &Assignment,
) -> f64 {
    data.outer_iter()
        .zip(assignment.iter())
        .map(|(point, label)| squared_distance(&point, &centroids.row(label)))
        .sum()
}

/// Result of a single Lloyd iteration
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub centroids: Array2<f64>,
    pub assignment: Assignment,
    /// Largest distance any centroid moved
    pub shift: f64,
    /// Points whose cluster id changed
    pub n_changed: usize,
    /// Clusters that had no points and kept their old centroid
    pub empty_clusters: Vec<usize>,
    pub converged: bool,
}

/// Run one Lloyd iteration: update centroids from the current assignment,
/// then reassign points to the moved centroids.
///
/// The iteration counts as converged when no point changed cluster or when no
/// centroid moved by `tol` or more.
pub fn lloyd_step(
    data: &ArrayView2<f64>,
    centroids: &ArrayView2<f64>,
    assignment: &Assignment,
    tol: f64,
) -> StepOutcome {
    let (new_centroids, empty_clusters) = update_centroids(data, assignment, centroids);
    let new_assignment = Assignment::compute(data, &new_centroids.view());

    let shift = max_centroid_shift(centroids, &new_centroids.view());
    let n_changed = new_assignment.count_changed(assignment);
    let converged = n_changed == 0 || shift < tol;

    StepOutcome {
        centroids: new_centroids,
        assignment: new_assignment,
        shift,
        n_changed,
        empty_clusters,
        converged,
    }
}
