//! Anonymous response labels

use serde::{Deserialize, Serialize};

const PREFIX: &str = "Response ";

/// Anonymous identifier substituted for an agent during peer evaluation
///
/// Labels run `Response A` … `Response Z`, then `Response AA`, `Response AB`, …
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Label for the zero-based position `index`
    pub fn for_index(index: usize) -> Self {
        // Bijective base-26: 0 -> A, 25 -> Z, 26 -> AA
        let mut letters = Vec::new();
        let mut n = index + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(b'A' + rem as u8);
            n = (n - 1) / 26;
        }
        letters.reverse();
        let suffix = String::from_utf8_lossy(&letters);
        Self(format!("{PREFIX}{suffix}"))
    }

    /// Build a label from its letter suffix (`"B"` -> `Response B`)
    pub fn from_letters(letters: &str) -> Option<Self> {
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_uppercase()) {
            return None;
        }
        Some(Self(format!("{PREFIX}{letters}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The letter suffix (`Response B` -> `B`)
    pub fn letters(&self) -> &str {
        self.0.strip_prefix(PREFIX).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_index() {
        assert_eq!(Label::for_index(0).as_str(), "Response A");
        assert_eq!(Label::for_index(2).as_str(), "Response C");
        assert_eq!(Label::for_index(25).as_str(), "Response Z");
        assert_eq!(Label::for_index(26).as_str(), "Response AA");
        assert_eq!(Label::for_index(27).as_str(), "Response AB");
        assert_eq!(Label::for_index(52).as_str(), "Response BA");
    }

    #[test]
    fn test_from_letters() {
        assert_eq!(Label::from_letters("B"), Some(Label::for_index(1)));
        assert_eq!(Label::from_letters("b"), None);
        assert_eq!(Label::from_letters(""), None);
        assert_eq!(Label::for_index(27).letters(), "AB");
    }
}
