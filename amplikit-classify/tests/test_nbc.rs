use amplikit_classify::nbc::{classify_batch, NbcIndex, NbcWorkspace, DEFAULT_BOOT_ITERS, DEFAULT_MIN_WORDS};
use amplikit_seq::sequence::{reverse_complement, Sequence};

static REF_1: &str = "AAGCCCAATAAACCACTCTGACTGGCCGAATAGGGATATAGGCAACGACATGTGCGGCGACCCTTGCGACAGTGACGCTTTCGCCGTTGCCTAAACCTAT";
static REF_2: &str = "TTGAAGGAGTCTAGCAGCCGCAGTAAGGCACAATACCTCGTCCGTGTTACCAGACCAAACAAGACGTCCTCTTCAATGTTTAAATGACCCTCTCGTCATA";
static REF_3: &str = "AAACCTTTCTACTATGTGTTCCGCAAGAATCAACAACTACAATGGCGCGTCGTGAATAACGCGACGGCTGAGACGAACGGCGCGTGAATGAAGCGCTTAA";

fn reference_index() -> NbcIndex {
    let refs = vec![
        Sequence::from_str("ref_1", REF_1),
        Sequence::from_str("ref_2", REF_2),
        Sequence::from_str("ref_3", REF_3),
    ];
    let taxonomies = vec![
        String::from("d:Bacteria,p:Firmicutes,f:Testaceae,g:Testus"),
        String::from("d:Bacteria,p:Bacteroidota,f:Gammaceae,g:Gammus"),
        String::from("d:Bacteria,p:Firmicutes,f:Testaceae,g:Altus"),
    ];
    NbcIndex::build(&refs, &taxonomies)
}

#[test]
fn tree_nodes_are_shared_along_common_prefixes() {
    let index = reference_index();
    // root + d:Bacteria + 2 phyla + 2 families + 3 genera
    assert_eq!(index.n_nodes(), 9);
    assert_eq!(index.node(0).seq_count, 3);
}

#[test]
fn known_reference_classifies_deeply_and_confidently() {
    let index = reference_index();
    let mut workspace = NbcWorkspace::new(&index);

    let hit = index.classify(REF_1.as_bytes(), &mut workspace, DEFAULT_BOOT_ITERS, DEFAULT_MIN_WORDS);
    assert_eq!(hit.strand, '+');
    assert!(hit.ranks.len() > 2, "path of {} ranks is too shallow", hit.ranks.len());
    assert_eq!(hit.ranks.last().unwrap(), "g:Testus");

    let n_ranks = hit.confidences.len();
    assert!(hit.confidences[n_ranks - 1] >= 0.9);
    assert!(hit.confidences[n_ranks - 2] >= 0.9);
}

#[test]
fn short_queries_stay_unclassified() {
    let index = reference_index();
    let mut workspace = NbcWorkspace::new(&index);

    let hit = index.classify(b"ACGTACG", &mut workspace, DEFAULT_BOOT_ITERS, DEFAULT_MIN_WORDS);
    assert!(hit.is_none());
    assert_eq!(hit.score, f64::NEG_INFINITY);
    assert_eq!(hit.strand, '+');
}

#[test]
fn reverse_complement_flips_the_strand() {
    let index = reference_index();
    let mut workspace = NbcWorkspace::new(&index);

    let rc = reverse_complement(REF_1.as_bytes());
    let hit = index.classify(&rc, &mut workspace, DEFAULT_BOOT_ITERS, DEFAULT_MIN_WORDS);
    assert_eq!(hit.strand, '-');
    assert_eq!(hit.ranks.last().unwrap(), "g:Testus");
}

#[test]
fn repeated_calls_are_identical() {
    let index = reference_index();
    let mut workspace = NbcWorkspace::new(&index);

    let first = index.classify(REF_2.as_bytes(), &mut workspace, DEFAULT_BOOT_ITERS, DEFAULT_MIN_WORDS);
    let second = index.classify(REF_2.as_bytes(), &mut workspace, DEFAULT_BOOT_ITERS, DEFAULT_MIN_WORDS);
    assert_eq!(first.ranks, second.ranks);
    assert_eq!(first.confidences, second.confidences);
    assert_eq!(first.score, second.score);
}

#[test]
fn batch_classification_matches_single_calls() {
    let index = reference_index();
    let queries = vec![
        Sequence::from_str("q1", REF_1),
        Sequence::from_str("q2", REF_2),
        Sequence::from_str("q3", REF_3),
    ];

    let sequential = classify_batch(&index, &queries, DEFAULT_BOOT_ITERS, DEFAULT_MIN_WORDS, 1);
    let pooled = classify_batch(&index, &queries, DEFAULT_BOOT_ITERS, DEFAULT_MIN_WORDS, 0);
    for (a, b) in sequential.iter().zip(pooled.iter()) {
        assert_eq!(a.ranks, b.ranks);
        assert_eq!(a.confidences, b.confidences);
        assert_eq!(a.strand, b.strand);
    }
    assert_eq!(sequential[0].ranks.last().unwrap(), "g:Testus");
    assert_eq!(sequential[1].ranks.last().unwrap(), "g:Gammus");
    assert_eq!(sequential[2].ranks.last().unwrap(), "g:Altus");
}
