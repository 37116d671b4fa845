use amplikit_seq::kmer::{base_code, WordScanner, WORD_LENGTH};
use amplikit_seq::sequence::reverse_complement;

#[test]
fn base_codes() {
    assert_eq!(base_code(b'A'), Some(0));
    assert_eq!(base_code(b'c'), Some(1));
    assert_eq!(base_code(b'G'), Some(2));
    assert_eq!(base_code(b't'), Some(3));
    assert_eq!(base_code(b'U'), Some(3));
    assert_eq!(base_code(b'N'), None);
    assert_eq!(base_code(b'-'), None);
}

#[test]
fn unique_words_of_a_short_sequence() {
    let mut scanner = WordScanner::new();
    let mut words = Vec::new();

    // 12 bases of period 4 give 5 windows but only 4 distinct words
    scanner.unique_words(b"ACGTACGTACGT", &mut words);
    assert_eq!(words.len(), 4);

    // one base short of a full word
    scanner.unique_words(b"ACGTACG", &mut words);
    assert!(words.is_empty());
}

#[test]
fn ambiguity_resets_the_rolling_word() {
    let mut scanner = WordScanner::new();
    let mut words = Vec::new();

    // no 8-mer may span the N: seven valid bases on either side yield nothing
    scanner.unique_words(b"ACGTACGNTACGTAC", &mut words);
    assert!(words.is_empty());

    // eight fresh valid bases after the N resume emission
    scanner.unique_words(b"ACGTACGNACGTACGT", &mut words);
    assert_eq!(words.len(), 1);

    // the word after the reset equals the word of the clean tail
    let mut tail_words = Vec::new();
    scanner.unique_words(b"ACGTACGT", &mut tail_words);
    assert_eq!(words, tail_words);
}

#[test]
fn lower_case_words_match_upper_case_words() {
    let mut scanner = WordScanner::new();
    let mut upper = Vec::new();
    let mut lower = Vec::new();
    scanner.unique_words(b"GGATCCTTAAGGATCC", &mut upper);
    scanner.unique_words(b"ggatccttaaggatcc", &mut lower);
    assert_eq!(upper, lower);
}

#[test]
fn reverse_strand_words_without_allocation() {
    let seq = b"TTGGCAACCGGTTACGCATTGGCC";
    let rc = reverse_complement(seq);

    let mut scanner = WordScanner::new();
    let mut in_place = Vec::new();
    let mut explicit = Vec::new();
    scanner.unique_words_rc(seq, &mut in_place);
    scanner.unique_words(&rc, &mut explicit);

    assert_eq!(in_place, explicit);
    assert_eq!(in_place.len(), seq.len() - WORD_LENGTH + 1);
}

#[test]
fn scanner_is_reusable_across_sequences() {
    let mut scanner = WordScanner::new();
    let mut first = Vec::new();
    let mut again = Vec::new();
    scanner.unique_words(b"CCGGAATTCCGGAATT", &mut first);
    scanner.unique_words(b"ACGTACGTACGT", &mut again);
    scanner.unique_words(b"CCGGAATTCCGGAATT", &mut again);
    assert_eq!(first, again);
}
