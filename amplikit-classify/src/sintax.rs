//! The SINTAX taxonomy classifier.
//!
//! SINTAX predicts the taxonomy of a query without any Bayesian model: the unique 8-mer
//! words of the query are bootstrap-resampled, each sample votes for the reference
//! sequence sharing most of its words, and the fraction of votes agreeing with the top
//! taxonomy at each rank becomes the confidence of that rank.

use log::info;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::time::Instant;

use amplikit_seq::kmer::{WordScanner, WORD_SPACE};
use amplikit_seq::sequence::Sequence;

use crate::rng::{Lcg, Mwc};
use crate::taxonomy::TaxonomyTable;

/// Default number of bootstrap iterations
pub const DEFAULT_BOOT_ITERS: usize = 100;
/// Number of query words drawn, with replacement, per bootstrap iteration
pub const BOOT_SUBSET: usize = 32;
/// Queries with fewer unique words than this stay unclassified
pub const MIN_QUERY_WORDS: usize = 8;

/// Posting-list index over the unique 8-mer words of a reference database.
///
/// For every word the index stores the ids of all reference sequences containing it
/// at least once, packed into one contiguous array addressed by per-word offsets.
/// The index is immutable once built and may be shared by any number of workers.
pub struct SintaxIndex {
    taxonomies: TaxonomyTable,
    seq_to_tax: Vec<u32>,
    posting_starts: Vec<u32>,
    posting_lens: Vec<u32>,
    posting_data: Vec<i32>,
    n_seqs: usize,
}

impl SintaxIndex {
    /// Builds the index from reference sequences and their taxonomy strings.
    ///
    /// The two slices are walked in parallel and truncated to the shorter one;
    /// references whose taxonomy holds no rank token are skipped. Posting lists are
    /// laid out in two passes, counting first and filling second, so no per-word
    /// allocation ever happens.
    pub fn build(seqs: &[Sequence], taxonomies: &[String]) -> SintaxIndex {
        let start = Instant::now();
        let n_input = seqs.len().min(taxonomies.len());

        let mut table = TaxonomyTable::new();
        let mut seq_to_tax: Vec<u32> = Vec::with_capacity(n_input);
        let mut words_per_seq: Vec<Vec<u16>> = Vec::with_capacity(n_input);
        let mut scanner = WordScanner::new();
        let mut words: Vec<u16> = Vec::new();

        for (seq, tax) in seqs.iter().take(n_input).zip(taxonomies.iter()) {
            let slot = match table.insert(tax) {
                Some(slot) => slot,
                None => continue,
            };
            scanner.unique_words(seq.seq(), &mut words);
            seq_to_tax.push(slot);
            words_per_seq.push(words.clone());
        }

        // ---------- first pass: how long is each posting list
        let mut posting_lens = vec![0u32; WORD_SPACE];
        for seq_words in &words_per_seq {
            for &word in seq_words {
                posting_lens[word as usize] += 1;
            }
        }
        let mut posting_starts = vec![0u32; WORD_SPACE];
        let mut total = 0u32;
        for word in 0..WORD_SPACE {
            posting_starts[word] = total;
            total += posting_lens[word];
        }

        // ---------- second pass: fill the packed posting data
        let mut posting_data = vec![0i32; total as usize];
        let mut cursor = posting_starts.clone();
        for (seq_id, seq_words) in words_per_seq.iter().enumerate() {
            for &word in seq_words {
                posting_data[cursor[word as usize] as usize] = seq_id as i32;
                cursor[word as usize] += 1;
            }
        }

        let n_seqs = seq_to_tax.len();
        info!("SINTAX index over {} references ({} distinct taxonomies) built in {:?}",
              n_seqs, table.len(), start.elapsed());

        SintaxIndex { taxonomies: table, seq_to_tax, posting_starts, posting_lens, posting_data, n_seqs }
    }

    /// Number of indexed reference sequences
    pub fn n_seqs(&self) -> usize { self.n_seqs }

    /// The deduplicated taxonomy table of this index
    pub fn taxonomies(&self) -> &TaxonomyTable { &self.taxonomies }

    #[inline]
    fn postings(&self, word: u16) -> &[i32] {
        let start = self.posting_starts[word as usize] as usize;
        let len = self.posting_lens[word as usize] as usize;
        &self.posting_data[start..start + len]
    }

    /// Classifies a query against this index, trying both strands.
    ///
    /// The strand whose bootstrap votes hit a reference hardest wins; on a tie the
    /// forward strand is reported. A query yielding fewer than
    /// [`MIN_QUERY_WORDS`] unique words returns an empty hit.
    pub fn classify(&self, seq: &[u8], workspace: &mut SintaxWorkspace, boot_iters: usize) -> SintaxHit {
        let forward = self.classify_strand(seq, false, workspace, boot_iters);
        let reverse = self.classify_strand(seq, true, workspace, boot_iters);

        match (forward, reverse) {
            (Some(fwd), Some(rev)) => {
                if rev.best_hit_count > fwd.best_hit_count {
                    SintaxHit { ranks: rev.ranks, confidences: rev.confidences, strand: '-' }
                } else {
                    SintaxHit { ranks: fwd.ranks, confidences: fwd.confidences, strand: '+' }
                }
            }
            (Some(fwd), None) => SintaxHit { ranks: fwd.ranks, confidences: fwd.confidences, strand: '+' },
            (None, Some(rev)) => SintaxHit { ranks: rev.ranks, confidences: rev.confidences, strand: '-' },
            (None, None) => SintaxHit::none(),
        }
    }

    /// One bootstrap run over a single strand of the query.
    fn classify_strand(
        &self,
        seq: &[u8],
        reverse: bool,
        ws: &mut SintaxWorkspace,
        boot_iters: usize,
    ) -> Option<StrandOutcome> {
        if self.n_seqs == 0 || boot_iters == 0 {
            return None;
        }
        if reverse {
            ws.scanner.unique_words_rc(seq, &mut ws.query_words);
        } else {
            ws.scanner.unique_words(seq, &mut ws.query_words);
        }
        let n_words = ws.query_words.len();
        if n_words < MIN_QUERY_WORDS {
            return None;
        }

        ws.lcg.reset();
        ws.mwc.reset();
        ws.tax_votes.clear();
        ws.tax_votes.resize(self.taxonomies.len(), 0);
        let mut best_hit_count = 0u32;

        for _ in 0..boot_iters {
            // only the entries touched by the previous iteration need resetting
            for &target in &ws.touched {
                ws.votes[target as usize] = 0;
            }
            ws.touched.clear();

            for _ in 0..BOOT_SUBSET {
                let drawn = ws.lcg.next() as usize % n_words;
                let word = ws.query_words[drawn];
                for &target in self.postings(word) {
                    if ws.votes[target as usize] == 0 {
                        ws.touched.push(target as u32);
                    }
                    ws.votes[target as usize] += 1;
                }
            }

            let chosen: usize;
            if ws.touched.is_empty() {
                // none of the sampled words occurs in any reference
                chosen = ws.mwc.next() as usize % self.n_seqs;
            } else {
                let mut top_count = 0u32;
                for &target in &ws.touched {
                    top_count = top_count.max(ws.votes[target as usize]);
                }
                ws.ties.clear();
                for &target in &ws.touched {
                    if ws.votes[target as usize] == top_count {
                        ws.ties.push(target as i32);
                    }
                }
                let k = ws.mwc.next() as usize % ws.ties.len();
                chosen = quickselect(&mut ws.ties, k) as usize;
                if top_count > best_hit_count {
                    best_hit_count = top_count;
                }
            }
            ws.tax_votes[self.seq_to_tax[chosen] as usize] += 1;
        }

        // ---------- rank the taxonomies by their votes, ties broken by the tax string
        let mut top_tax: Option<usize> = None;
        for (tax, &votes) in ws.tax_votes.iter().enumerate() {
            if votes == 0 {
                continue;
            }
            top_tax = match top_tax {
                None => Some(tax),
                Some(best) => {
                    let best_votes = ws.tax_votes[best];
                    if votes > best_votes
                        || (votes == best_votes
                            && self.taxonomies.taxonomy(tax as u32).tax_string
                                < self.taxonomies.taxonomy(best as u32).tax_string)
                    {
                        Some(tax)
                    } else {
                        Some(best)
                    }
                }
            };
        }
        let top_tax = top_tax?;
        let top = self.taxonomies.taxonomy(top_tax as u32);

        // ---------- per-rank confidences: cumulative product of the per-depth agreement
        let mut confidences = Vec::with_capacity(top.ranks.len());
        let mut cumulative = 1.0f64;
        for (depth, &rank_id) in top.rank_ids.iter().enumerate() {
            let mut votes_at_depth = 0u32;
            for (tax, &votes) in ws.tax_votes.iter().enumerate() {
                if votes == 0 {
                    continue;
                }
                let taxonomy = self.taxonomies.taxonomy(tax as u32);
                if taxonomy.rank_ids.get(depth) == Some(&rank_id) {
                    votes_at_depth += votes;
                }
            }
            cumulative *= votes_at_depth as f64 / boot_iters as f64;
            confidences.push(cumulative);
        }

        Some(StrandOutcome { ranks: top.ranks.clone(), confidences, best_hit_count })
    }
}

struct StrandOutcome {
    ranks: Vec<String>,
    confidences: Vec<f64>,
    best_hit_count: u32,
}

/// The prediction of the SINTAX classifier for one query.
#[derive(Debug, Clone, Default)]
pub struct SintaxHit {
    /// predicted rank tokens, outermost first; empty for an unclassified query
    pub ranks: Vec<String>,
    /// cumulative confidence per rank, non-increasing with depth
    pub confidences: Vec<f64>,
    /// the strand the prediction came from: '+' or '-'
    pub strand: char,
}

impl SintaxHit {
    /// The empty hit reported for unclassifiable queries
    pub fn none() -> Self {
        SintaxHit { ranks: Vec::new(), confidences: Vec::new(), strand: '+' }
    }

    /// True when no taxonomy could be assigned
    pub fn is_none(&self) -> bool { self.ranks.is_empty() }
}

/// Per-worker scratch of the SINTAX classifier.
///
/// Holds the word scanner, the vote vectors and both random generators. A workspace is
/// created once per worker and reused across queries; it must never be shared.
pub struct SintaxWorkspace {
    scanner: WordScanner,
    query_words: Vec<u16>,
    votes: Vec<u32>,
    touched: Vec<u32>,
    ties: Vec<i32>,
    tax_votes: Vec<u32>,
    lcg: Lcg,
    mwc: Mwc,
}

impl SintaxWorkspace {
    pub fn new(index: &SintaxIndex) -> Self {
        SintaxWorkspace {
            scanner: WordScanner::new(),
            query_words: Vec::new(),
            votes: vec![0; index.n_seqs()],
            touched: Vec::new(),
            ties: Vec::new(),
            tax_votes: vec![0; index.taxonomies().len()],
            lcg: Lcg::new(),
            mwc: Mwc::new(),
        }
    }
}

/// Selects the k-th smallest value (0-based) without sorting the whole slice.
fn quickselect(values: &mut [i32], k: usize) -> i32 {
    let mut lo = 0usize;
    let mut hi = values.len() - 1;
    while lo < hi {
        let pivot = values[(lo + hi) / 2];
        let mut i = lo;
        let mut j = hi;
        while i <= j {
            while values[i] < pivot { i += 1; }
            while values[j] > pivot { j -= 1; }
            if i <= j {
                values.swap(i, j);
                i += 1;
                if j == 0 { break; }
                j -= 1;
            }
        }
        // the k-th value sits in one of the partitions, or right between them
        if k <= j {
            hi = j;
        } else if k >= i {
            lo = i;
        } else {
            return values[k];
        }
    }
    values[k]
}

/// Classifies a batch of queries, optionally in parallel.
///
/// `threads` follows the toolkit convention: `1` stays on the calling thread, `0` uses
/// a pool sized by the host, any larger value caps the pool. Every worker gets its own
/// [`SintaxWorkspace`]; hits come back in query order and are identical across all
/// thread settings.
pub fn classify_batch(
    index: &SintaxIndex,
    queries: &[Sequence],
    boot_iters: usize,
    threads: usize,
) -> Vec<SintaxHit> {
    if threads == 1 {
        let mut workspace = SintaxWorkspace::new(index);
        return queries.iter().map(|q| index.classify(q.seq(), &mut workspace, boot_iters)).collect();
    }
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .expect("can't build a worker pool");
    pool.install(|| {
        queries
            .par_iter()
            .map_init(
                || SintaxWorkspace::new(index),
                |workspace, q| index.classify(q.seq(), workspace, boot_iters),
            )
            .collect()
    })
}
