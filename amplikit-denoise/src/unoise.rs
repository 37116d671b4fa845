//! UNOISE3 greedy abundance-ordered clustering.

use log::{debug, info};
use std::time::Instant;

use amplikit_seq::distance::edit_distance_banded;
use amplikit_seq::sequence::Sequence;

/// Default value of the UNOISE3 alpha parameter
pub const DEFAULT_ALPHA: f64 = 2.0;
/// Reads below this abundance are assumed to be errors and never seed a cluster
pub const DEFAULT_MIN_SIZE: u64 = 8;

/// A denoised cluster: its seed sequence and the total abundance merged into it.
#[derive(Debug, Clone)]
pub struct Centroid {
    /// the read that seeded this cluster
    pub seq: Sequence,
    /// abundance of the seed plus all reads merged into it
    pub total_size: u64,
}

/// Maximum number of differences at which a read of abundance `query_size` may be
/// an error of a parent of abundance `parent_size`.
///
/// This is the UNOISE3 skew rule: `floor((log2(skew) - 1) / alpha)`; a negative value
/// means the skew is too small for the read to be an error of that parent.
fn allowed_diffs(parent_size: u64, query_size: u64, alpha: f64) -> i64 {
    let skew = parent_size as f64 / query_size as f64;
    ((skew.log2() - 1.0) / alpha).floor() as i64
}

/// Clusters dereplicated reads into zero-radius OTUs.
///
/// Reads are visited in order of decreasing abundance. Each read is compared against
/// the centroids found so far; the centroid with the fewest differences wins the read
/// if those differences stay within the skew-dependent allowance, otherwise the read
/// seeds a new centroid. Reads with an abundance below `min_size` never seed clusters,
/// so the loop stops at the first one. The returned centroids are sorted by their
/// accumulated abundance, largest first.
pub fn unoise(mut seqs: Vec<Sequence>, alpha: f64, min_size: u64) -> Vec<Centroid> {
    let start = Instant::now();
    let n_reads = seqs.len();
    seqs.sort_by(|a, b| b.size().cmp(&a.size()));

    let mut centroids: Vec<Centroid> = Vec::new();
    for query in seqs {
        if query.size() < min_size {
            break;
        }
        let mut best: Option<usize> = None;
        let mut best_diffs = u32::MAX;
        for (c_idx, centroid) in centroids.iter().enumerate() {
            // centroids are visited in abundance order; once the skew drops below 2
            // the allowance is negative for this and every following centroid
            if centroid.seq.size() < 2 * query.size() {
                break;
            }
            let allowance = allowed_diffs(centroid.seq.size(), query.size(), alpha);
            if allowance < 0 {
                continue;
            }
            // the distance can never exceed the longer sequence
            let limit = (allowance as u64).min(centroid.seq.len().max(query.len()) as u64) as u32;
            if query.len().abs_diff(centroid.seq.len()) > limit as usize {
                continue;
            }
            let diffs = edit_distance_banded(query.seq(), centroid.seq.seq(), limit);
            if diffs <= limit && diffs < best_diffs {
                best_diffs = diffs;
                best = Some(c_idx);
                if best_diffs <= 1 {
                    break;
                }
            }
        }
        match best {
            Some(c_idx) => {
                debug!("{} (size {}) merged into {} at {} diffs",
                       query.id(), query.size(), centroids[c_idx].seq.id(), best_diffs);
                centroids[c_idx].total_size += query.size();
            }
            None => {
                centroids.push(Centroid { total_size: query.size(), seq: query });
            }
        }
    }

    centroids.sort_by(|a, b| b.total_size.cmp(&a.total_size));
    info!("{} reads denoised into {} centroids in {:?}", n_reads, centroids.len(), start.elapsed());

    centroids
}
