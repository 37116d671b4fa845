use thiserror::Error;


/// Errors that may appear while using the amplikit-denoise crate
#[derive(Debug, Error)]
pub enum DenoiseError {
    #[error("No sequences could be read from: {file_name}")]
    /// The input stream held no FASTA records at all
    NoSequencesRead { file_name: String },

    #[error("Error returned while reading a sequence file")]
    /// Error returned while reading a sequence file
    Sequence(#[from] amplikit_seq::SequenceError),

    #[error("General I/O error occurred while reading an input file")]
    /// I/O error occurred while reading an input file
    Io(#[from] std::io::Error),
}
