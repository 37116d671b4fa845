use once_cell::sync::Lazy;
use regex::Regex;

static SIZE_ANNOTATION: Lazy<Regex> = Lazy::new(|| Regex::new(r";size=([^;]*)").unwrap());
static TAX_ANNOTATION: Lazy<Regex> = Lazy::new(|| Regex::new(r";tax=([^;]*)").unwrap());

/// Extracts the abundance from a ``;size=N;`` annotation of a FASTA description.
///
/// Returns 0 when the annotation is missing or its value can't be parsed as an integer;
/// any other annotations found in the description are ignored.
///
/// # Example
/// ```rust
/// use amplikit_seq::sequence::annotation_size;
/// assert_eq!(annotation_size("read_1;size=1234;"), 1234);
/// assert_eq!(annotation_size("read_1;size=big;"), 0);
/// assert_eq!(annotation_size("read_1"), 0);
/// ```
pub fn annotation_size(description: &str) -> u64 {
    match SIZE_ANNOTATION.captures(description) {
        Some(captures) => captures[1].parse::<u64>().unwrap_or(0),
        None => 0,
    }
}

/// Extracts the payload of a ``;tax=...;`` annotation of a FASTA description.
///
/// # Example
/// ```rust
/// use amplikit_seq::sequence::annotation_tax;
/// let tax = annotation_tax("ref_8;tax=d:Bacteria,p:Firmicutes;size=3;");
/// assert_eq!(tax, Some("d:Bacteria,p:Firmicutes"));
/// assert_eq!(annotation_tax("ref_8"), None);
/// ```
pub fn annotation_tax(description: &str) -> Option<&str> {
    TAX_ANNOTATION.captures(description).map(|captures| captures.get(1).unwrap().as_str())
}

/// Removes a ``;size=N;`` annotation from a description, keeping everything else.
///
/// Used when a sequence is relabelled with a fresh abundance, e.g. by the dereplication tool.
pub fn strip_size_annotation(description: &str) -> String {
    SIZE_ANNOTATION.replace(description, "").trim_end_matches(';').to_string()
}
