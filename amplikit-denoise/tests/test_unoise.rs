use amplikit_denoise::unoise::unoise;
use amplikit_seq::sequence::Sequence;

static SEQ_1: &str = "TTGGCAACCGGTTACGCATTGGCCAAGGTTCCAACGGTAC";
// SEQ_1 with a single substitution, twelfth base
static SEQ_1_ERR: &str = "TTGGCAACCGGATACGCATTGGCCAAGGTTCCAACGGTAC";
static SEQ_2: &str = "GGGGTTTTCCCCAAAAGGGGTTTTCCCCAAAAGGGGTTTT";
// SEQ_2 with a single substitution, first base
static SEQ_2_ERR: &str = "AGGGTTTTCCCCAAAAGGGGTTTTCCCCAAAAGGGGTTTT";

fn read(id: &str, seq: &str, size: u64) -> Sequence {
    Sequence::from_str(&format!("{};size={};", id, size), seq)
}

#[test]
fn error_reads_merge_into_their_parents() {
    let reads = vec![
        read("a", SEQ_1, 80),
        read("b", SEQ_1_ERR, 10),
        read("c", SEQ_2, 9),
        read("d", SEQ_2_ERR, 7),
    ];
    let centroids = unoise(reads, 2.0, 8);

    // "b" is absorbed by "a"; "c" seeds its own cluster; "d" is below minsize
    assert_eq!(centroids.len(), 2);
    assert_eq!(centroids[0].seq.to_string(), SEQ_1);
    assert_eq!(centroids[0].total_size, 90);
    assert_eq!(centroids[1].seq.to_string(), SEQ_2);
    assert_eq!(centroids[1].total_size, 9);
}

#[test]
fn low_skew_reads_seed_their_own_clusters() {
    // at sizes 80 vs 50 the skew is below 2, so even a 1-diff read stays separate
    let reads = vec![read("a", SEQ_1, 80), read("b", SEQ_1_ERR, 50)];
    let centroids = unoise(reads, 2.0, 8);
    assert_eq!(centroids.len(), 2);
    assert_eq!(centroids[0].total_size, 80);
    assert_eq!(centroids[1].total_size, 50);
}

#[test]
fn reads_below_minsize_are_dropped() {
    let reads = vec![read("a", SEQ_1, 80), read("b", SEQ_2, 3)];
    let centroids = unoise(reads, 2.0, 8);
    assert_eq!(centroids.len(), 1);
    assert_eq!(centroids[0].total_size, 80);
}

#[test]
fn unannotated_reads_count_as_errors() {
    // a missing ;size=N; parses as zero, which is below any sensible minsize
    let reads = vec![read("a", SEQ_1, 80), Sequence::from_str("b", SEQ_2)];
    let centroids = unoise(reads, 2.0, 8);
    assert_eq!(centroids.len(), 1);
}

#[test]
fn centroids_come_back_sorted_by_total_size() {
    // "c" starts smaller than "b" but absorbs enough abundance to overtake it
    let reads = vec![
        read("a", SEQ_1, 400),
        read("b", SEQ_2, 70),
        read("c", "ACACACACACACACACACACTGTGTGTGTGTGTGTGTGTG", 65),
        read("d", "ACACACACACACACACACACTGTGTGTGTGTGTGTGTGTC", 8),
    ];
    let centroids = unoise(reads, 2.0, 8);
    assert_eq!(centroids.len(), 3);
    assert_eq!(centroids[0].total_size, 400);
    assert_eq!(centroids[1].total_size, 73);
    assert_eq!(centroids[2].total_size, 70);
}
