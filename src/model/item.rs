use serde::{Deserialize, Serialize};

/// A single item of a single category, e.g. the "Red" of "Color".
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct Item {
    pub category: usize, // zero-based category index
    pub index: usize,    // zero-based item index within the category
}

impl Item {
    pub fn new(category: usize, index: usize) -> Self {
        Self { category, index }
    }

    #[cfg(test)]
    /// Parse an item from a string of the form "0a" or "1b" etc.
    pub fn parse(s: &str) -> Self {
        let category = s.chars().next().unwrap().to_digit(10).unwrap() as usize;
        let index = Self::letter_to_index(s.chars().nth(1).unwrap());
        Self { category, index }
    }

    pub fn letter(&self) -> char {
        Self::index_to_letter(self.index)
    }

    pub fn letter_to_index(letter: char) -> usize {
        letter as usize - 'a' as usize
    }

    pub fn index_to_letter(index: usize) -> char {
        (index + 'a' as usize) as u8 as char
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.category, self.letter())
    }
}

impl std::fmt::Debug for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.category, self.letter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let item = Item::parse("0a");
        assert_eq!(item.category, 0);
        assert_eq!(item.index, 0);

        let item = Item::parse("3f");
        assert_eq!(item.category, 3);
        assert_eq!(item.index, 5);
        assert_eq!(item.to_string(), "3f");
    }
}
