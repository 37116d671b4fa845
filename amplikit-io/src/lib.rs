//! Utility functions to facilitate I/O operations for amplikit crates
//!
//! A few code fragments used by every amplikit driver were refactored into utility
//! functions and gathered within the ``amplikit-io`` crate:
//!
//! # Opening an input stream, which might be gzip'ed
//!
//! The [open_file()] function opens a file of a given name. If that file name
//! has ``.gz`` suffix, the returned ``BufRead`` is automatically uncompressed:
//!
//! ```no_run
//! use amplikit_io::open_file;
//! # use std::io;
//! # fn main() -> Result<(), io::Error> {
//! let reader = open_file("reads.fasta")?;
//! let reader_gzipped = open_file("reads.fasta.gz")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Unified opening of an output stream.
//!
//! [out_writer()] opens a file for writing. If the given file name is ``"stdout"`` or ``"stderr"``, writes to the appropriate
//! stream rather than to a file:
//!
//! ```
//! use std::fs;
//! use amplikit_io::out_writer;
//! // This will print on stdout
//! let mut to_stream = out_writer("", true);
//! // This will also print on stdout
//! to_stream = out_writer("stdout", true);
//! // "stdout" file should not exist
//! assert!(fs::metadata("stdout").is_err());
//! ```
//!
#![allow(clippy::needless_return)]
mod utils;
pub use utils::*;
