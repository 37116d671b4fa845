use amplikit_classify::sintax::{classify_batch, SintaxIndex, SintaxWorkspace, DEFAULT_BOOT_ITERS};
use amplikit_seq::sequence::{reverse_complement, Sequence};

static REF_1: &str = "AAGCCCAATAAACCACTCTGACTGGCCGAATAGGGATATAGGCAACGACATGTGCGGCGACCCTTGCGACAGTGACGCTTTCGCCGTTGCCTAAACCTAT";
static REF_2: &str = "TTGAAGGAGTCTAGCAGCCGCAGTAAGGCACAATACCTCGTCCGTGTTACCAGACCAAACAAGACGTCCTCTTCAATGTTTAAATGACCCTCTCGTCATA";
static REF_3: &str = "AAACCTTTCTACTATGTGTTCCGCAAGAATCAACAACTACAATGGCGCGTCGTGAATAACGCGACGGCTGAGACGAACGGCGCGTGAATGAAGCGCTTAA";

fn single_reference_index() -> SintaxIndex {
    let refs = vec![Sequence::from_str("ref_1", REF_1)];
    let taxonomies = vec![String::from("d:Bacteria,p:Firmicutes,g:Testus")];
    SintaxIndex::build(&refs, &taxonomies)
}

#[test]
fn exact_self_hit_is_confident() {
    let index = single_reference_index();
    let mut workspace = SintaxWorkspace::new(&index);

    let hit = index.classify(REF_1.as_bytes(), &mut workspace, DEFAULT_BOOT_ITERS);
    assert_eq!(hit.strand, '+');
    assert_eq!(hit.ranks, vec!["d:Bacteria", "p:Firmicutes", "g:Testus"]);
    assert_eq!(hit.confidences.len(), 3);
    for conf in &hit.confidences {
        assert!(*conf >= 0.99, "confidence {} too low", conf);
    }
}

#[test]
fn reverse_complement_flips_the_strand() {
    let index = single_reference_index();
    let mut workspace = SintaxWorkspace::new(&index);

    let rc = reverse_complement(REF_1.as_bytes());
    let hit = index.classify(&rc, &mut workspace, DEFAULT_BOOT_ITERS);
    assert_eq!(hit.strand, '-');
    assert_eq!(hit.ranks, vec!["d:Bacteria", "p:Firmicutes", "g:Testus"]);
}

#[test]
fn short_queries_stay_unclassified() {
    let index = single_reference_index();
    let mut workspace = SintaxWorkspace::new(&index);

    // shorter than one word
    let hit = index.classify(b"ACGTACG", &mut workspace, DEFAULT_BOOT_ITERS);
    assert!(hit.is_none());

    // long enough, but fewer than eight unique words
    let hit = index.classify(b"AAAAAAAAAAAAAAAA", &mut workspace, DEFAULT_BOOT_ITERS);
    assert!(hit.is_none());
}

#[test]
fn words_broken_by_ambiguity_stay_unclassified() {
    let index = single_reference_index();
    let mut workspace = SintaxWorkspace::new(&index);

    // an N every seven bases never lets a full word form
    let broken: String = REF_1
        .as_bytes()
        .chunks(7)
        .map(|chunk| format!("{}N", String::from_utf8_lossy(chunk)))
        .collect();
    let hit = index.classify(broken.as_bytes(), &mut workspace, DEFAULT_BOOT_ITERS);
    assert!(hit.is_none());
}

#[test]
fn duplicate_taxonomies_collapse() {
    let refs = vec![
        Sequence::from_str("ref_1", REF_1),
        Sequence::from_str("ref_2", REF_2),
        Sequence::from_str("ref_3", REF_3),
    ];
    let taxonomies = vec![
        String::from("d:Bacteria,p:Firmicutes,g:Alpha"),
        String::from("d:Bacteria,p:Firmicutes,g:Alpha"),
        String::from("d:Bacteria,p:Firmicutes,g:Beta"),
    ];
    let index = SintaxIndex::build(&refs, &taxonomies);
    let mut workspace = SintaxWorkspace::new(&index);

    let hit = index.classify(REF_1.as_bytes(), &mut workspace, DEFAULT_BOOT_ITERS);
    assert_eq!(hit.ranks.last().unwrap(), "g:Alpha");
}

#[test]
fn repeated_calls_are_identical() {
    let index = single_reference_index();
    let mut workspace = SintaxWorkspace::new(&index);

    let first = index.classify(REF_1.as_bytes(), &mut workspace, DEFAULT_BOOT_ITERS);
    let second = index.classify(REF_1.as_bytes(), &mut workspace, DEFAULT_BOOT_ITERS);
    assert_eq!(first.ranks, second.ranks);
    assert_eq!(first.confidences, second.confidences);
    assert_eq!(first.strand, second.strand);
}

#[test]
fn batch_classification_matches_single_calls() {
    let refs = vec![
        Sequence::from_str("ref_1", REF_1),
        Sequence::from_str("ref_2", REF_2),
        Sequence::from_str("ref_3", REF_3),
    ];
    let taxonomies = vec![
        String::from("d:Bacteria,p:Firmicutes,g:Alpha"),
        String::from("d:Bacteria,p:Bacteroidota,g:Gamma"),
        String::from("d:Bacteria,p:Firmicutes,g:Beta"),
    ];
    let index = SintaxIndex::build(&refs, &taxonomies);

    let queries = vec![
        Sequence::from_str("q1", REF_1),
        Sequence::from_str("q2", REF_2),
        Sequence::from_str("q3", REF_3),
    ];
    let sequential = classify_batch(&index, &queries, DEFAULT_BOOT_ITERS, 1);
    let pooled = classify_batch(&index, &queries, DEFAULT_BOOT_ITERS, 0);
    let capped = classify_batch(&index, &queries, DEFAULT_BOOT_ITERS, 2);

    for (a, b) in sequential.iter().zip(pooled.iter()) {
        assert_eq!(a.ranks, b.ranks);
        assert_eq!(a.confidences, b.confidences);
        assert_eq!(a.strand, b.strand);
    }
    for (a, b) in sequential.iter().zip(capped.iter()) {
        assert_eq!(a.ranks, b.ranks);
    }
    assert_eq!(sequential[0].ranks.last().unwrap(), "g:Alpha");
    assert_eq!(sequential[1].ranks.last().unwrap(), "g:Gamma");
    assert_eq!(sequential[2].ranks.last().unwrap(), "g:Beta");
}
