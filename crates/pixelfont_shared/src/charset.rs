use derive_more::Display;

/// Inclusive range of code points that the pipeline processes, in ascending order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[display("U+{first:04X}..=U+{last:04X}")]
pub struct CharRange {
    pub first: u32,
    pub last: u32,
}

impl Default for CharRange {
    /// Printable ASCII
    fn default() -> Self {
        Self::new(32, 126)
    }
}

impl CharRange {
    pub const fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    pub fn is_empty(&self) -> bool {
        self.first > self.last
    }

    pub fn contains(&self, code_point: u32) -> bool {
        (self.first..=self.last).contains(&code_point)
    }

    /// Code points that are not unicode scalar values (surrogates) are silently left out.
    pub fn chars(&self) -> impl Iterator<Item = char> {
        (self.first..=self.last).filter_map(char::from_u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn default_is_printable_ascii() {
        let range = CharRange::default();
        let chars: Vec<char> = range.chars().collect();
        assert_eq!(chars.len(), 95);
        assert_eq!(chars.first(), Some(&' '));
        assert_eq!(chars.last(), Some(&'~'));
    }

    #[test_case(32, 126, 95 ; "ascii")]
    #[test_case(65, 65, 1 ; "single")]
    #[test_case(66, 65, 0 ; "inverted")]
    #[test_case(0xD7FF, 0xE000, 2 ; "surrogates skipped")]
    fn counts(first: u32, last: u32, expected: usize) {
        assert_eq!(CharRange::new(first, last).chars().count(), expected);
    }

    #[test]
    fn ascending_order() {
        let chars: Vec<u32> = CharRange::new(40, 50).chars().map(u32::from).collect();
        let mut sorted = chars.clone();
        sorted.sort_unstable();
        assert_eq!(chars, sorted);
    }

    #[test]
    fn display() {
        assert_eq!(CharRange::default().to_string(), "U+0020..=U+007E");
        assert!(CharRange::new(2, 1).is_empty());
        assert!(CharRange::default().contains(65));
    }
}
