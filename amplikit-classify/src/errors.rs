use thiserror::Error;


/// Errors that may appear while using the amplikit-classify crate
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("No reference sequence of {file_name} carries a ';tax=...;' annotation")]
    /// The reference database held no taxonomy annotations at all
    NoReferenceTaxonomies { file_name: String },

    #[error("Error returned while reading a sequence file")]
    /// Error returned while reading a sequence file
    Sequence(#[from] amplikit_seq::SequenceError),

    #[error("General I/O error occurred while reading an input file")]
    /// I/O error occurred while reading an input file
    Io(#[from] std::io::Error),
}
