//! Spatial Clustering
//!
//! With many agents and many noise sources, applying every sound to every
//! agent dominates the tick. Sounds are first reduced to a bounded number of
//! volume-weighted centroids and only the centroids are dispatched.
//!
//! The pass is single and greedy: K random sounds seed the clusters, every
//! other sound joins the nearest one.

use rand::seq::index;
use rand::Rng;
use serde::Serialize;
use sound_events::Tripoint;

use crate::sink::Noise;

/// A group of merged sounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Centroid {
    /// Volume-weighted average position, not snapped to the grid
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Loudest merged sound
    pub volume: i32,
    /// Sum of merged volumes; only steers later merges
    #[serde(skip)]
    weight: f32,
}

impl Centroid {
    fn seed(noise: &Noise) -> Self {
        Self {
            x: noise.position.x as f32,
            y: noise.position.y as f32,
            z: noise.position.z as f32,
            volume: noise.volume,
            weight: noise.volume as f32,
        }
    }

    /// Nearest grid tile to the centroid.
    pub fn position(&self) -> Tripoint {
        Tripoint::new(
            self.x.round() as i32,
            self.y.round() as i32,
            self.z.round() as i32,
        )
    }

    fn distance_squared(&self, p: Tripoint) -> f32 {
        let dx = p.x as f32 - self.x;
        let dy = p.y as f32 - self.y;
        let dz = p.z as f32 - self.z;
        dx * dx + dy * dy + dz * dz
    }

    fn merge(&mut self, noise: &Noise) {
        let volume = noise.volume as f32;
        let volume_sum = volume + self.weight;
        // Two silent sounds carry no weight either way.
        if volume_sum > 0.0 {
            self.x = (noise.position.x as f32 * volume + self.x * self.weight) / volume_sum;
            self.y = (noise.position.y as f32 * volume + self.y * self.weight) / volume_sum;
            self.z = (noise.position.z as f32 * volume + self.z * self.weight) / volume_sum;
        }
        self.volume = self.volume.max(noise.volume);
        self.weight = volume_sum;
    }

    #[cfg(test)]
    pub(crate) fn weight(&self) -> f32 {
        self.weight
    }
}

/// Result of clustering, with the centroid each input sound ended up in.
#[derive(Debug, Clone, Default)]
pub struct Clustering {
    pub centroids: Vec<Centroid>,
    /// `assignments[i]` is the index of the centroid holding input sound `i`
    pub assignments: Vec<usize>,
}

/// Maximum number of centroids for `n` sounds: `max(min_clusters, ceil(ln n))`, 0 for no sounds.
pub fn cluster_cap(n: usize, min_clusters: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let log_cap = (n as f64).ln().ceil() as usize;
    min_clusters.max(log_cap)
}

/// Clusters `noises` into at most [`cluster_cap`] centroids.
pub fn cluster_sounds<R: Rng + ?Sized>(
    noises: &[Noise],
    min_clusters: usize,
    rng: &mut R,
) -> Vec<Centroid> {
    cluster_with_assignments(noises, min_clusters, rng).centroids
}

/// Clusters `noises` and reports which centroid absorbed each sound.
pub fn cluster_with_assignments<R: Rng + ?Sized>(
    noises: &[Noise],
    min_clusters: usize,
    rng: &mut R,
) -> Clustering {
    let cap = cluster_cap(noises.len(), min_clusters);

    // Few enough sounds to keep every one exact, otherwise K random seeds.
    let seeds: Vec<usize> = if noises.len() <= cap {
        (0..noises.len()).collect()
    } else {
        index::sample(rng, noises.len(), cap).into_vec()
    };

    let mut assignments = vec![usize::MAX; noises.len()];
    let mut centroids: Vec<Centroid> = Vec::with_capacity(cap);
    for seed in seeds {
        let noise = &noises[seed];
        // Sounds on the same tile share a centroid.
        match centroids.iter().position(|c| c.position() == noise.position) {
            Some(existing) => {
                centroids[existing].merge(noise);
                assignments[seed] = existing;
            }
            None => {
                assignments[seed] = centroids.len();
                centroids.push(Centroid::seed(noise));
            }
        }
    }

    for (i, noise) in noises.iter().enumerate() {
        if assignments[i] != usize::MAX {
            continue;
        }
        let nearest = nearest_centroid(&centroids, noise.position);
        centroids[nearest].merge(noise);
        assignments[i] = nearest;
    }

    Clustering {
        centroids,
        assignments,
    }
}

/// Index of the closest centroid; the first one wins ties.
fn nearest_centroid(centroids: &[Centroid], p: Tripoint) -> usize {
    let mut best = 0;
    let mut best_distance = f32::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let distance = centroid.distance_squared(p);
        if distance < best_distance {
            best = i;
            best_distance = distance;
        }
    }
    best
}
