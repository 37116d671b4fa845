use std::fmt::{Display, Formatter};
use std::slice::Iter;

/// Represents possible moves on an alignment matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentStep {
    /// A query and a target symbol aligned to each other - a match or a mismatch
    Match,
    /// Consumes a single query symbol, inserting a gap in the target
    Deletion,
    /// Consumes a single target symbol, inserting a gap in the query
    Insertion,
}

impl Display for AlignmentStep {
    /// Displays an alignment step as a single character
    ///
    /// The [`Match`](AlignmentStep::Match), [`Deletion`](AlignmentStep::Deletion)
    /// and [`Insertion`](AlignmentStep::Insertion) steps are displayed as ``'M'``,
    /// ``'D'`` and ``'I'``, respectively
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignmentStep::Match => { write!(f, "M")? }
            AlignmentStep::Deletion => { write!(f, "D")? }
            AlignmentStep::Insertion => { write!(f, "I")? }
        }
        Ok(())
    }
}

impl TryFrom<u8> for AlignmentStep {
    type Error = &'static str;

    /// Tries to convert a `u8` value into an `AlignmentStep` variant.
    ///
    /// # Example
    /// ```
    /// use amplikit_seq::alignment::AlignmentStep;
    /// assert_eq!(AlignmentStep::try_from(b'M').unwrap(), AlignmentStep::Match);
    /// assert_eq!(AlignmentStep::try_from(b'I').unwrap(), AlignmentStep::Insertion);
    /// ```
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            b'M' => Ok(AlignmentStep::Match),
            b'D' => Ok(AlignmentStep::Deletion),
            b'I' => Ok(AlignmentStep::Insertion),
            _ => Err("Invalid value for AlignmentStep"),
        }
    }
}

/// Represents an abstract pairwise alignment.
///
/// An [AlignmentPath] object defines which position of a query sequence is aligned
/// to a given position of a target and where the gaps are located. It is implemented
/// as the vector of [AlignmentStep]s taken on an alignment matrix.
#[derive(Debug, Default, Clone)]
pub struct AlignmentPath { path: Vec<AlignmentStep> }

impl AlignmentPath {
    /// Creates an [`AlignmentPath`] directly from steps
    pub fn from_attrs(path: Vec<AlignmentStep>) -> AlignmentPath { AlignmentPath{path} }

    /// Iterates over all steps of this path
    pub fn iter(&self) -> Iter<'_, AlignmentStep> { self.path.iter() }

    /// Number of steps on this path
    pub fn len(&self) -> usize { self.path.len() }

    /// True for the empty path, e.g. when two sequences could not be aligned within the band
    pub fn is_empty(&self) -> bool { self.path.is_empty() }
}

impl TryFrom<&str> for AlignmentPath {
    type Error = &'static str;

    /// Tries to convert a string into an `AlignmentPath`.
    ///
    /// Each character of a given string is converted to an [AlignmentStep] variant with
    /// [`AlignmentStep::try_from(s: u8)`](AlignmentStep::try_from())
    /// # Example
    /// ```
    /// use amplikit_seq::alignment::AlignmentPath;
    /// let path = AlignmentPath::try_from("MMDMM").unwrap();
    /// assert_eq!(path.to_string(), "MMDMM");
    /// ```
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let path: Result<Vec<AlignmentStep>, _> = s.chars().map(|c| AlignmentStep::try_from(c as u8)).collect();
        path.map(|path| AlignmentPath { path })
    }
}

impl Display for AlignmentPath {
    /// Displays this [AlignmentPath] as a single line string
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for step in &self.path {
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}
