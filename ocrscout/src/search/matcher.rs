/// Handles literal, case-sensitive line matching on OCR output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatcher {
    term: String,
}

impl LineMatcher {
    /// Creates a new LineMatcher for the given term
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into() }
    }

    /// The term lines are matched against
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Checks whether the term occurs in `line`. An empty term matches nothing.
    pub fn is_match(&self, line: &str) -> bool {
        !self.term.is_empty() && line.contains(self.term.as_str())
    }

    /// Splits extracted text into lines and yields the ones containing the term
    pub fn matching_lines<'t>(&'t self, text: &'t str) -> impl Iterator<Item = &'t str> + 't {
        text.lines().filter(move |line| self.is_match(line))
    }

    /// Returns the subsequence of `lines` that contain the term, preserving order
    pub fn filter<'l>(&self, lines: &[&'l str]) -> Vec<&'l str> {
        lines
            .iter()
            .copied()
            .filter(|line| self.is_match(line))
            .collect()
    }
}
