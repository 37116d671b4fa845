//! Provides [`Sequence`](crate::sequence::Sequence) and [`FastqRecord`](crate::sequence::FastqRecord)
//! structs along with iterators that read them from FASTA and FASTQ streams

mod sequence;
mod annotations;
mod fastq;

pub use sequence::*;
pub use annotations::*;
pub use fastq::*;
