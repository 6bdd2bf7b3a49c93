use ndarray::{Array1, ArrayView1, ArrayView2};

/// Squared Euclidean distance between two rows
#[inline]
pub fn squared_distance(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&u, &v)| {
            let d = u - v;
            d * d
        })
        .sum()
}

/// Find the centroid closest to `point`, returning its index and squared distance.
///
/// Ties go to the lowest centroid index. `centroids` must have at least one row.
#[inline]
pub fn nearest_centroid(point: &ArrayView1<f64>, centroids: &ArrayView2<f64>) -> (usize, f64) {
    let mut best_label = 0;
    let mut best_dist = f64::INFINITY;

    for (j, centroid) in centroids.outer_iter().enumerate() {
        let dist = squared_distance(point, &centroid);
        // Strict comparison keeps the first (lowest) index on ties
        if dist < best_dist {
            best_dist = dist;
            best_label = j;
        }
    }

    (best_label, best_dist)
}

/// Find the nearest centroid for each data point
///
/// # Arguments
/// * `data` - Data points (n_data, 2)
/// * `centroids` - Centroids (k, 2)
///
/// # Returns
/// * `labels` - Cluster assignment for each data point (n_data,)
pub fn find_nearest_centroids(data: &ArrayView2<f64>, centroids: &ArrayView2<f64>) -> Array1<usize> {
    data.outer_iter()
        .map(|point| nearest_centroid(&point, centroids).0)
        .collect()
}

/// Squared distance from each point to the closest of `centroids`
pub fn min_squared_distances(data: &ArrayView2<f64>, centroids: &ArrayView2<f64>) -> Array1<f64> {
    data.outer_iter()
        .map(|point| nearest_centroid(&point, centroids).1)
        .collect()
}

/// Fold a newly chosen centroid into running nearest-distance values.
///
/// Keeps seeding strategies at O(n) per added centroid instead of O(n·k).
pub fn update_min_squared_distances(
    data: &ArrayView2<f64>,
    new_centroid: &ArrayView1<f64>,
    min_dists: &mut Array1<f64>,
) {
    for (point, best) in data.outer_iter().zip(min_dists.iter_mut()) {
        let dist = squared_distance(&point, new_centroid);
        if dist < *best {
            *best = dist;
        }
    }
}

/// Largest Euclidean distance any centroid moved between two iterations
pub fn max_centroid_shift(old_centroids: &ArrayView2<f64>, new_centroids: &ArrayView2<f64>) -> f64 {
    old_centroids
        .outer_iter()
        .zip(new_centroids.outer_iter())
        .map(|(old_c, new_c)| squared_distance(&old_c, &new_c).sqrt())
        .fold(0.0, f64::max)
}
