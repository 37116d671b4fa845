//! UCHIME2 positional-crossover chimera detection.
//!
//! A PCR chimera is a hybrid read: its left part copies one template and its right part
//! another. The detector aligns every centroid against its more abundant peers and keeps,
//! over all of them, the deepest positions up to which the query is explained from the
//! left and from the right. When those two witnesses come from two different parents and
//! their explained regions meet, the query is called chimeric.

use log::info;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::time::Instant;

use amplikit_seq::alignment::{AlignmentPath, AlignmentStep, BandedAligner, ALIGNMENT_INFINITY};

use crate::unoise::Centroid;

/// Default minimum abundance skew of a parent over a chimera candidate
pub const DEFAULT_MIN_ABSKEW: f64 = 16.0;
/// Number of queries dispatched to a worker in one go
const CHUNK_SIZE: usize = 32;
/// Queries matching their best parent this closely skip the second and third crossover rule
const SMALL_DIFF_COUNT: u32 = 4;

/// Positions of the first differences of one pairwise alignment, seen from both ends.
///
/// All positions are 1-based query coordinates. A missing left-hand diff is reported
/// as 0, a missing right-hand diff as `|query| + 1`, so that the caller's max/min
/// bookkeeping ignores them.
struct DiffPositions {
    diffs: u32,
    pos_l0: usize,
    pos_l1: usize,
    pos_r0: usize,
    pos_r1: usize,
}

/// Walks an alignment path from both ends, recording where the query stops matching.
///
/// Mismatches, deletions and insertions all count as differences, including those in
/// the flanking regions of the alignment.
fn scan_path(query: &[u8], target: &[u8], path: &AlignmentPath, n_query: usize) -> DiffPositions {
    let mut scan = DiffPositions {
        diffs: 0,
        pos_l0: 0,
        pos_l1: 0,
        pos_r0: n_query + 1,
        pos_r1: n_query + 1,
    };

    // ---------- left to right
    let mut q_pos = 0usize;
    let mut t_pos = 0usize;
    for step in path.iter() {
        let is_diff = match step {
            AlignmentStep::Match => {
                q_pos += 1;
                t_pos += 1;
                !query[q_pos - 1].eq_ignore_ascii_case(&target[t_pos - 1])
            }
            AlignmentStep::Deletion => {
                q_pos += 1;
                true
            }
            AlignmentStep::Insertion => {
                t_pos += 1;
                true
            }
        };
        if is_diff {
            scan.diffs += 1;
            if scan.diffs == 1 { scan.pos_l0 = q_pos; }
            if scan.diffs == 2 { scan.pos_l1 = q_pos; }
        }
    }

    // ---------- right to left
    let mut seen = 0u32;
    let mut q_pos = n_query + 1;
    let mut t_pos = target.len() + 1;
    for step in path.iter().rev() {
        let is_diff = match step {
            AlignmentStep::Match => {
                q_pos -= 1;
                t_pos -= 1;
                !query[q_pos - 1].eq_ignore_ascii_case(&target[t_pos - 1])
            }
            AlignmentStep::Deletion => {
                q_pos -= 1;
                true
            }
            AlignmentStep::Insertion => {
                t_pos -= 1;
                true
            }
        };
        if is_diff {
            seen += 1;
            if seen == 1 { scan.pos_r0 = q_pos; }
            if seen == 2 { scan.pos_r1 = q_pos; break; }
        }
    }

    scan
}

/// Decides whether centroid `idx` is a chimera of two of its more abundant peers.
///
/// `parent_flags`, when given, holds the verdicts for all earlier centroids; parents
/// already called chimeric are then skipped, which reproduces the de-novo behavior of
/// the sequential mode. The parallel mode passes `None` and judges every query
/// independently.
fn is_chimera(
    centroids: &[Centroid],
    idx: usize,
    min_abskew: f64,
    parent_flags: Option<&[bool]>,
    aligner: &mut BandedAligner,
) -> bool {
    let query = &centroids[idx];
    let n_query = query.seq.len();
    let no_right_diff = n_query + 1;
    let min_parent_size = (query.total_size as f64 * min_abskew).ceil() as u64;

    let mut pos_best_l0 = 0usize;
    let mut pos_best_l1 = 0usize;
    let mut pos_best_r0 = no_right_diff;
    let mut pos_best_r1 = no_right_diff;
    let mut best_l0 = usize::MAX;
    let mut best_l1 = usize::MAX;
    let mut best_r0 = usize::MAX;
    let mut best_r1 = usize::MAX;
    let mut best_parent_diffs = u32::MAX;

    for parent_idx in 0..idx {
        let parent = &centroids[parent_idx];
        if parent.total_size < min_parent_size {
            break;
        }
        if let Some(flags) = parent_flags {
            if flags[parent_idx] { continue; }
        }
        let score = aligner.align(query.seq.seq(), parent.seq.seq());
        if score >= ALIGNMENT_INFINITY {
            continue;
        }
        if score == 0 {
            // an exact copy of a more abundant sequence is never a chimera
            return false;
        }
        let path = aligner.backtrace();
        let scan = scan_path(query.seq.seq(), parent.seq.seq(), &path, n_query);
        if scan.diffs == 0 {
            return false;
        }
        if scan.diffs < best_parent_diffs {
            best_parent_diffs = scan.diffs;
        }
        if scan.pos_l0 > pos_best_l0 {
            pos_best_l0 = scan.pos_l0;
            best_l0 = parent_idx;
        }
        if scan.pos_l1 > pos_best_l1 {
            pos_best_l1 = scan.pos_l1;
            best_l1 = parent_idx;
        }
        if scan.pos_r0 < pos_best_r0 {
            pos_best_r0 = scan.pos_r0;
            best_r0 = parent_idx;
        }
        if scan.pos_r1 < pos_best_r1 {
            pos_best_r1 = scan.pos_r1;
            best_r1 = parent_idx;
        }
    }

    let crossover = |pos_left: usize, pos_right: usize, left_parent: usize, right_parent: usize| {
        pos_left > 2
            && pos_right != no_right_diff
            && pos_left + 1 >= pos_right
            && left_parent != right_parent
            && left_parent != usize::MAX
            && right_parent != usize::MAX
    };

    if crossover(pos_best_l0, pos_best_r0, best_l0, best_r0) {
        return true;
    }
    if best_parent_diffs != u32::MAX && best_parent_diffs > SMALL_DIFF_COUNT {
        if crossover(pos_best_l1, pos_best_r0, best_l1, best_r0) {
            return true;
        }
        if crossover(pos_best_l0, pos_best_r1, best_l0, best_r1) {
            return true;
        }
    }

    false
}

/// Flags chimeric centroids of a denoised, abundance-sorted centroid list.
///
/// The input must be sorted by `total_size`, largest first, as returned by
/// [`unoise()`](crate::unoise::unoise). The `threads` parameter selects the execution
/// mode: `1` runs sequentially and skips parents already called chimeric, which is the
/// closest to the USEARCH de-novo behavior; `0` runs on a worker pool sized by the
/// host and any larger value caps the pool at that size. Both parallel modes judge
/// every query independently, so their flags are deterministic and identical across
/// thread counts.
pub fn flag_chimeras(centroids: &[Centroid], min_abskew: f64, threads: usize) -> Vec<bool> {
    let start = Instant::now();
    let n = centroids.len();
    let mut flags = vec![false; n];

    if threads == 1 {
        let mut aligner = BandedAligner::new();
        for idx in 0..n {
            let verdict = is_chimera(centroids, idx, min_abskew, Some(&flags), &mut aligner);
            flags[idx] = verdict;
        }
    } else {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .expect("can't build a worker pool");
        pool.install(|| {
            flags
                .par_chunks_mut(CHUNK_SIZE)
                .enumerate()
                .for_each_init(BandedAligner::new, |aligner, (chunk_idx, chunk)| {
                    for (k, flag) in chunk.iter_mut().enumerate() {
                        let idx = chunk_idx * CHUNK_SIZE + k;
                        *flag = is_chimera(centroids, idx, min_abskew, None, aligner);
                    }
                });
        });
    }

    let n_chimeric = flags.iter().filter(|&&f| f).count();
    info!("{} of {} centroids flagged as chimeric in {:?}", n_chimeric, n, start.elapsed());

    flags
}
