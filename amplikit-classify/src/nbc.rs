//! The Naive Bayesian taxonomy classifier.
//!
//! The reference database is folded into a taxonomy tree; every node accumulates the
//! word counts and the sequence count of the references passing through it. A query
//! descends the tree greedily, at each level picking the child with the best posterior
//! of having produced the query words; bootstrap re-descents over resampled words
//! measure how stable that path is.

use std::collections::HashMap;
use std::time::Instant;

use log::info;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use amplikit_seq::kmer::WordScanner;
use amplikit_seq::sequence::{reverse_complement, Sequence};

use crate::rng::Lcg;
use crate::taxonomy::parse_rank_tokens;

/// Default number of bootstrap iterations
pub const DEFAULT_BOOT_ITERS: usize = 100;
/// Default lower bound on the number of words drawn per bootstrap iteration
pub const DEFAULT_MIN_WORDS: usize = 8;

/// A node of the taxonomy tree.
///
/// Nodes live in the flat vector of their [`NbcIndex`] and reference their children by
/// index, so the tree is serializable and free of reference cycles. The root sits at
/// index 0 and carries no rank name.
#[derive(Debug, Clone)]
pub struct NbcNode {
    /// rank token of this node, e.g. ``p:Firmicutes``
    pub name: String,
    /// index of the parent node; the root is its own parent
    pub parent: usize,
    /// number of ranks between this node and the root
    pub depth: usize,
    /// indices of the children, in insertion order
    pub children: Vec<usize>,
    /// number of reference sequences whose taxonomy passes through this node
    pub seq_count: u32,
    /// occurrences of every word among those references
    pub word_counts: HashMap<u16, u32>,
}

impl NbcNode {
    fn new(name: String, parent: usize, depth: usize) -> Self {
        NbcNode {
            name,
            parent,
            depth,
            children: Vec::new(),
            seq_count: 0,
            word_counts: HashMap::new(),
        }
    }
}

/// Naive Bayes index: a taxonomy tree with per-node word statistics.
pub struct NbcIndex {
    nodes: Vec<NbcNode>,
}

impl NbcIndex {
    /// Builds the tree from reference sequences and their taxonomy strings.
    ///
    /// The two slices are walked in parallel and truncated to the shorter one;
    /// references whose taxonomy holds no rank token are skipped. References sharing a
    /// taxonomy prefix share the corresponding nodes.
    pub fn build(seqs: &[Sequence], taxonomies: &[String]) -> NbcIndex {
        let start = Instant::now();
        let n_input = seqs.len().min(taxonomies.len());

        let mut nodes = vec![NbcNode::new(String::new(), 0, 0)];
        let mut scanner = WordScanner::new();
        let mut words: Vec<u16> = Vec::new();
        let mut n_indexed = 0usize;

        for (seq, tax) in seqs.iter().take(n_input).zip(taxonomies.iter()) {
            let ranks = parse_rank_tokens(tax);
            if ranks.is_empty() {
                continue;
            }
            scanner.unique_words(seq.seq(), &mut words);
            n_indexed += 1;

            let mut node = 0usize;
            nodes[node].seq_count += 1;
            for rank in &ranks {
                node = Self::find_or_create_child(&mut nodes, node, rank);
                nodes[node].seq_count += 1;
                for &word in &words {
                    *nodes[node].word_counts.entry(word).or_insert(0) += 1;
                }
            }
        }

        info!("NBC tree of {} nodes over {} references built in {:?}",
              nodes.len(), n_indexed, start.elapsed());

        NbcIndex { nodes }
    }

    fn find_or_create_child(nodes: &mut Vec<NbcNode>, parent: usize, name: &str) -> usize {
        for &child in &nodes[parent].children {
            if nodes[child].name == name {
                return child;
            }
        }
        let child = nodes.len();
        let depth = nodes[parent].depth + 1;
        nodes.push(NbcNode::new(name.to_string(), parent, depth));
        nodes[parent].children.push(child);
        child
    }

    /// Number of nodes in the tree, the root included
    pub fn n_nodes(&self) -> usize { self.nodes.len() }

    /// Access to a node, mainly for inspection and tests
    pub fn node(&self, idx: usize) -> &NbcNode { &self.nodes[idx] }

    /// Log-posterior score of one child for a set of query words.
    fn child_score(&self, child: usize, sibling_count: u32, n_siblings: usize, words: &[u16]) -> f64 {
        let node = &self.nodes[child];
        let prior = (node.seq_count + 1) as f64 / (sibling_count as f64 + n_siblings as f64);
        let denominator = (node.seq_count + 2) as f64;
        let mut score = prior.ln();
        for word in words {
            let count = node.word_counts.get(word).copied().unwrap_or(0);
            score += ((count + 1) as f64 / denominator).ln();
        }
        score
    }

    /// Walks the tree from the root, greedily picking the best-scoring child.
    ///
    /// Ties go to the first child in insertion order, or to a random winner when a
    /// generator is supplied (the bootstrap re-descents). Returns the chosen path,
    /// root excluded, and its total log-score.
    fn descend(&self, words: &[u16], mut rng: Option<&mut Lcg>, path: &mut Vec<usize>) -> f64 {
        path.clear();
        let mut total_score = 0.0f64;
        let mut node = 0usize;
        let mut winners: Vec<usize> = Vec::new();

        while !self.nodes[node].children.is_empty() {
            let children = &self.nodes[node].children;
            let sibling_count: u32 = children.iter().map(|&c| self.nodes[c].seq_count).sum();
            let mut best_score = f64::NEG_INFINITY;
            winners.clear();
            for &child in children {
                let score = self.child_score(child, sibling_count, children.len(), words);
                if score > best_score {
                    best_score = score;
                    winners.clear();
                    winners.push(child);
                } else if score == best_score {
                    winners.push(child);
                }
            }
            let chosen = match rng.as_deref_mut() {
                Some(lcg) => winners[lcg.next() as usize % winners.len()],
                None => winners[0],
            };
            path.push(chosen);
            total_score += best_score;
            node = chosen;
        }

        total_score
    }

    /// One deterministic descent plus its bootstrap agreement, on a single strand.
    fn classify_strand(
        &self,
        seq: &[u8],
        ws: &mut NbcWorkspace,
        boot_iters: usize,
        min_words: usize,
    ) -> Option<StrandOutcome> {
        ws.scanner.unique_words(seq, &mut ws.words);
        if ws.words.is_empty() || self.nodes[0].children.is_empty() {
            return None;
        }
        ws.lcg.reset();

        let mut path: Vec<usize> = Vec::new();
        let score = self.descend(&ws.words, None, &mut path);
        if path.is_empty() {
            return None;
        }

        let mut agree = vec![0u32; path.len()];
        let n_words = ws.words.len();
        let n_sample = min_words.max(n_words / 8);
        for _ in 0..boot_iters {
            ws.sample.clear();
            for _ in 0..n_sample {
                let drawn = ws.lcg.next() as usize % n_words;
                let word = ws.words[drawn];
                ws.sample.push(word);
            }
            self.descend(&ws.sample, Some(&mut ws.lcg), &mut ws.boot_path);
            // consensus is monotone: past the first disagreement nothing can agree
            for depth in 0..path.len() {
                if ws.boot_path.get(depth) == Some(&path[depth]) {
                    agree[depth] += 1;
                } else {
                    break;
                }
            }
        }

        let confidences = agree.iter().map(|&a| a as f64 / boot_iters as f64).collect();
        let ranks = path.iter().map(|&n| self.nodes[n].name.clone()).collect();

        Some(StrandOutcome { ranks, confidences, depth: path.len(), score })
    }

    /// Classifies a query against this index, trying both strands.
    ///
    /// The deeper deterministic path wins; at equal depth the higher log-score does, and
    /// the forward strand is kept when both strands agree completely. A query without a
    /// single valid word returns an empty hit with a score of negative infinity.
    pub fn classify(
        &self,
        seq: &[u8],
        ws: &mut NbcWorkspace,
        boot_iters: usize,
        min_words: usize,
    ) -> NbcHit {
        let forward = self.classify_strand(seq, ws, boot_iters, min_words);

        let rc = reverse_complement(seq);
        let reverse = self.classify_strand(&rc, ws, boot_iters, min_words);

        match (forward, reverse) {
            (Some(fwd), Some(rev)) => {
                let reverse_wins = rev.depth > fwd.depth
                    || (rev.depth == fwd.depth && rev.score > fwd.score);
                if reverse_wins {
                    NbcHit { ranks: rev.ranks, confidences: rev.confidences, strand: '-', score: rev.score }
                } else {
                    NbcHit { ranks: fwd.ranks, confidences: fwd.confidences, strand: '+', score: fwd.score }
                }
            }
            (Some(fwd), None) => NbcHit { ranks: fwd.ranks, confidences: fwd.confidences, strand: '+', score: fwd.score },
            (None, Some(rev)) => NbcHit { ranks: rev.ranks, confidences: rev.confidences, strand: '-', score: rev.score },
            (None, None) => NbcHit::none(),
        }
    }
}

struct StrandOutcome {
    ranks: Vec<String>,
    confidences: Vec<f64>,
    depth: usize,
    score: f64,
}

/// The prediction of the NBC classifier for one query.
#[derive(Debug, Clone)]
pub struct NbcHit {
    /// predicted rank tokens, outermost first; empty for an unclassified query
    pub ranks: Vec<String>,
    /// bootstrap agreement per rank, non-increasing with depth
    pub confidences: Vec<f64>,
    /// the strand the prediction came from: '+' or '-'
    pub strand: char,
    /// total log-score of the deterministic descent
    pub score: f64,
}

impl NbcHit {
    /// The empty hit reported for unclassifiable queries
    pub fn none() -> Self {
        NbcHit { ranks: Vec::new(), confidences: Vec::new(), strand: '+', score: f64::NEG_INFINITY }
    }

    /// True when no taxonomy could be assigned
    pub fn is_none(&self) -> bool { self.ranks.is_empty() }
}

/// Per-worker scratch of the NBC classifier.
pub struct NbcWorkspace {
    scanner: WordScanner,
    words: Vec<u16>,
    sample: Vec<u16>,
    boot_path: Vec<usize>,
    lcg: Lcg,
}

impl NbcWorkspace {
    pub fn new(_index: &NbcIndex) -> Self {
        NbcWorkspace {
            scanner: WordScanner::new(),
            words: Vec::new(),
            sample: Vec::new(),
            boot_path: Vec::new(),
            lcg: Lcg::new(),
        }
    }
}

/// Classifies a batch of queries, optionally in parallel.
///
/// Same thread-count convention as the rest of the toolkit: `1` stays on the calling
/// thread, `0` uses a host-sized pool, a larger value caps the pool. Hits come back in
/// query order and are identical across all thread settings.
pub fn classify_batch(
    index: &NbcIndex,
    queries: &[Sequence],
    boot_iters: usize,
    min_words: usize,
    threads: usize,
) -> Vec<NbcHit> {
    if threads == 1 {
        let mut workspace = NbcWorkspace::new(index);
        return queries
            .iter()
            .map(|q| index.classify(q.seq(), &mut workspace, boot_iters, min_words))
            .collect();
    }
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .expect("can't build a worker pool");
    pool.install(|| {
        queries
            .par_iter()
            .map_init(
                || NbcWorkspace::new(index),
                |workspace, q| index.classify(q.seq(), workspace, boot_iters, min_words),
            )
            .collect()
    })
}
