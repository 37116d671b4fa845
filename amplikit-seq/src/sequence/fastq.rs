use std::fmt;
use std::io::BufRead;

use log::warn;

/// A single FASTQ record: description, residues and their quality string.
///
/// The record keeps its lines verbatim so that kept reads can be written back unchanged.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct FastqRecord {
    /// description line, without the leading ``@``
    description: String,
    /// the read itself
    seq: String,
    /// per-base quality letters
    qual: String,
}

impl FastqRecord {
    pub fn from_attrs(description: String, seq: String, qual: String) -> Self {
        FastqRecord { description, seq, qual }
    }

    /// Return the description line of this record
    pub fn description(&self) -> &str { self.description.as_ref() }

    /// Return a string slice holding the ID of this record, i.e. the first word of its description
    pub fn id(&self) -> &str { self.description.split_whitespace().next().unwrap_or("") }

    /// Return the read as bytes
    pub fn seq(&self) -> &[u8] { self.seq.as_bytes() }

    /// Return the quality string of this record
    pub fn qual(&self) -> &str { self.qual.as_ref() }

    /// Return the length of the read
    pub fn len(&self) -> usize { self.seq.len() }

    /// Returns true when the read holds no bases
    pub fn is_empty(&self) -> bool { self.seq.is_empty() }
}

impl fmt::Display for FastqRecord {
    /// Creates a `String` representation of a `FastqRecord` - the four FASTQ lines
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "@{}\n{}\n+\n{}\n", self.description, self.seq, self.qual)
    }
}

/// Iterator that provides records from a FASTQ-formatted buffer.
///
/// A FASTQ record takes exactly four lines; a trailing incomplete record is reported
/// with a warning and dropped, which ends the iteration.
pub struct FastqIterator<R> {
    reader: R,
    buffer: String,
}

impl<R: BufRead> FastqIterator<R> {
    pub fn new(stream: R) -> Self {
        FastqIterator { reader: stream, buffer: String::new() }
    }

    fn next_line(&mut self) -> Option<String> {
        self.buffer.clear();
        match self.reader.read_line(&mut self.buffer) {
            Ok(0) => None,
            Ok(_) => Some(self.buffer.trim_end().to_owned()),
            Err(_) => None,
        }
    }
}

impl<R: BufRead> Iterator for FastqIterator<R> {

    type Item = FastqRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let header = loop {
            let line = self.next_line()?;
            if !line.is_empty() { break line; }
        };
        if !header.starts_with('@') {
            warn!("skipping a FASTQ line that is not a record header: {}", header);
            return None;
        }
        let description = header[1..].to_owned();
        let seq = match self.next_line() {
            Some(line) => line,
            None => {
                warn!("dropping a truncated FASTQ record: {}", description);
                return None;
            }
        };
        // the separator line; its content (if any) is ignored
        if self.next_line().is_none() {
            warn!("dropping a truncated FASTQ record: {}", description);
            return None;
        }
        let qual = match self.next_line() {
            Some(line) => line,
            None => {
                warn!("dropping a truncated FASTQ record: {}", description);
                return None;
            }
        };

        Some(FastqRecord::from_attrs(description, seq, qual))
    }
}
