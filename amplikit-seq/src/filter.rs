//! Detects reads of the PhiX174 sequencing control.
//!
//! Illumina runs are routinely spiked with the PhiX174 phage as a calibration control;
//! its reads have to be removed before any amplicon analysis. The filter marks every
//! 8-mer word found on either strand of the bundled PhiX174 genome in a 65,536-entry
//! table and scores a read by the fraction of its words present in that table.

use once_cell::sync::Lazy;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::kmer::{base_code, for_each_word, WORD_LENGTH, WORD_SPACE};

/// The PhiX174 reference genome bundled with the crate
static PHIX_FASTA: &str = include_str!("data/phix174.fasta");

/// 2-bit codes of the reference, non-ACGT letters skipped
static PHIX_CODES: Lazy<Vec<u16>> = Lazy::new(|| {
    PHIX_FASTA
        .lines()
        .filter(|line| !line.starts_with('>'))
        .flat_map(|line| line.bytes())
        .filter_map(base_code)
        .collect()
});

/// Marks every 8-mer of both PhiX strands
static PHIX_WORDS: Lazy<Vec<bool>> = Lazy::new(|| {
    let mut table = vec![false; WORD_SPACE];
    let codes = &*PHIX_CODES;

    let mut word: u16 = 0;
    for (n, &code) in codes.iter().enumerate() {
        word = (word << 2) | code;
        if n + 1 >= WORD_LENGTH { table[word as usize] = true; }
    }
    word = 0;
    for (n, &code) in codes.iter().rev().enumerate() {
        word = (word << 2) | (code ^ 0b11);
        if n + 1 >= WORD_LENGTH { table[word as usize] = true; }
    }

    table
});

/// Number of bases of the bundled PhiX174 reference.
///
/// ```
/// assert_eq!(amplikit_seq::filter::phix_seq_len(), 5386);
/// ```
pub fn phix_seq_len() -> usize { PHIX_CODES.len() }

/// Fraction of the valid 8-mer words of a read that occur in the PhiX174 genome.
///
/// Every occurrence of a word counts; ambiguous letters break the word run as usual.
/// A read contributing no valid word at all scores 0.
pub fn phix_score(seq: &[u8]) -> f64 {
    let mut n_words = 0u32;
    let mut n_hits = 0u32;
    for_each_word(seq, |word| {
        n_words += 1;
        if PHIX_WORDS[word as usize] { n_hits += 1; }
    });
    if n_words == 0 {
        return 0.0;
    }
    n_hits as f64 / n_words as f64
}

/// Decides whether a read comes from the PhiX control.
///
/// A read is called PhiX when it contributes at least `min_kmers` valid words and its
/// [`phix_score()`] reaches `min_id` raised to the word length - the word-level identity
/// expected of a read whose bases match the reference at the rate `min_id`. Reads too
/// short to yield `min_kmers` words are never called PhiX.
pub fn is_phix(seq: &[u8], min_id: f64, min_kmers: usize) -> bool {
    let mut n_words = 0usize;
    let mut n_hits = 0usize;
    for_each_word(seq, |word| {
        n_words += 1;
        if PHIX_WORDS[word as usize] { n_hits += 1; }
    });
    if n_words < min_kmers || n_words == 0 {
        return false;
    }
    let score = n_hits as f64 / n_words as f64;
    score >= min_id.powi(WORD_LENGTH as i32)
}

/// Flags PhiX reads in a batch, optionally in parallel.
///
/// `threads` follows the toolkit convention: `1` runs sequentially on the calling
/// thread, `0` uses a worker pool sized by the host and any larger value caps the
/// pool at that size. The returned flags are in input order and identical across
/// all thread settings.
pub fn phix_flags<S: AsRef<[u8]> + Sync>(seqs: &[S], min_id: f64, min_kmers: usize, threads: usize) -> Vec<bool> {
    if threads == 1 {
        return seqs.iter().map(|s| is_phix(s.as_ref(), min_id, min_kmers)).collect();
    }
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .expect("can't build a worker pool");
    pool.install(|| {
        seqs.par_iter().map(|s| is_phix(s.as_ref(), min_id, min_kmers)).collect()
    })
}
