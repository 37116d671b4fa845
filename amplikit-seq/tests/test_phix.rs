use amplikit_seq::filter::{is_phix, phix_flags, phix_score, phix_seq_len};
use amplikit_seq::sequence::reverse_complement;

/// The first 140 bases of the PhiX174 genome, exactly as bundled with the crate
static PHIX_SNIPPET: &[u8] =
    b"GAGTTTTATCGCTTCCATGACGCAGAAGTTAACACTTTCGGATATTTCTGATGAGTCGAAAAATTATCTTGATAAAGCAG\
      GAATTACTACTGCTTGTTTACGAATTAAATCGAAGTGGACTGCTGGCGGAAAATGAGAAA";

/// 140 bases of the E. coli 16S rRNA gene (V3-V4 region)
static SIXTEEN_S_SNIPPET: &[u8] =
    b"TACGGAGGGTGCAAGCGTTAATCGGAATTACTGGGCGTAAAGCGCACGCAGGCGGTTTGTTAAGTCAGATGTGAAATCCC\
      CGGGCTCAACCTGGGAACTGCATCTGATACTGGCAAGCTTGAGTCTCGTAGAGGGGGGTA";

#[test]
fn bundled_genome_length() {
    assert_eq!(phix_seq_len(), 5386);
}

#[test]
fn phix_snippet_is_recognized() {
    let score = phix_score(PHIX_SNIPPET);
    assert!(score >= 0.7, "snippet scored only {}", score);
    assert!(is_phix(PHIX_SNIPPET, 0.97, 8));
}

#[test]
fn reverse_strand_is_recognized_too() {
    let rc = reverse_complement(PHIX_SNIPPET);
    assert!(phix_score(&rc) >= 0.7);
    assert!(is_phix(&rc, 0.97, 8));
}

#[test]
fn sixteen_s_snippet_is_not_phix() {
    let score = phix_score(SIXTEEN_S_SNIPPET);
    assert!(score < 0.3, "16S snippet scored {}", score);
    assert!(!is_phix(SIXTEEN_S_SNIPPET, 0.97, 8));
}

#[test]
fn short_reads_are_never_phix() {
    assert!(!is_phix(b"GAGTTTT", 0.97, 8));
    assert!(!is_phix(b"GAGTTTT", 0.0, 8));
    assert!(!is_phix(b"", 0.97, 8));
    assert_eq!(phix_score(b"GAGTTTT"), 0.0);
}

#[test]
fn ambiguous_bases_break_the_words() {
    // every run of valid bases is shorter than a word
    let broken = b"GAGTTTTNATCGCTTNCCATGACNGCAGAAGNTTAACACN";
    assert_eq!(phix_score(broken), 0.0);
    assert!(!is_phix(broken, 0.97, 8));
}

#[test]
fn batched_flags_match_the_single_calls() {
    let reads: Vec<&[u8]> = vec![PHIX_SNIPPET, SIXTEEN_S_SNIPPET, b"GAGTTTT"];
    let expected = vec![true, false, false];
    assert_eq!(phix_flags(&reads, 0.97, 8, 1), expected);
    assert_eq!(phix_flags(&reads, 0.97, 8, 0), expected);
    assert_eq!(phix_flags(&reads, 0.97, 8, 3), expected);
}
