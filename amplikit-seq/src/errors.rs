use displaydoc::Display;
use thiserror::Error;

#[derive(Debug, Error, Display)]
#[non_exhaustive]
/// Errors that may be thrown while reading or writing sequence files
pub enum SequenceError {
    /// The FASTQ record '{description}' declares {seq_length} bases but {qual_length} quality letters
    MismatchedQualityLength {
        /// description line of the broken record
        description: String,
        /// number of bases
        seq_length: usize,
        /// number of quality letters
        qual_length: usize,
    },
    /// General I/O error occurred while reading a sequence file
    Io(#[from] std::io::Error),
}
