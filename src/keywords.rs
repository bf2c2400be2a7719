// Copyright (c) tokenmark contributors.
// Licensed under the MIT License.

//! Exact-match keyword dictionary, queried on word runs between separators.

use rustc_hash::FxHashMap;

use crate::token::TokenType;

/// Maps literal words to token types, with optional case folding.
///
/// Built once per rule set; lookups happen on every keyword-candidate run,
/// so the map is keyed by character slices to avoid re-encoding the line.
#[derive(Default)]
pub struct KeywordMap {
    ignore_case: bool,
    words: FxHashMap<Box<[char]>, TokenType>,
}

impl KeywordMap {
    pub fn new(ignore_case: bool) -> KeywordMap {
        KeywordMap { ignore_case, words: FxHashMap::default() }
    }

    pub fn add(&mut self, word: &str, token: TokenType) {
        let key: Box<[char]> = if self.ignore_case {
            word.chars().flat_map(char::to_lowercase).collect()
        } else {
            word.chars().collect()
        };
        self.words.insert(key, token);
    }

    /// Returns the mapped type for an exact word, or `Null` on a miss.
    pub fn lookup(&self, run: &[char]) -> TokenType {
        if run.is_empty() {
            return TokenType::Null;
        }
        let hit = if self.ignore_case {
            let folded: Vec<char> = run.iter().flat_map(|ch| ch.to_lowercase()).collect();
            self.words.get(folded.as_slice())
        } else {
            self.words.get(run)
        };
        hit.copied().unwrap_or(TokenType::Null)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn exact_match_only() {
        let mut map = KeywordMap::new(false);
        map.add("if", TokenType::Keyword1);
        assert_eq!(map.lookup(&chars("if")), TokenType::Keyword1);
        assert_eq!(map.lookup(&chars("iffy")), TokenType::Null);
        assert_eq!(map.lookup(&chars("i")), TokenType::Null);
        assert_eq!(map.lookup(&[]), TokenType::Null);
    }

    #[test]
    fn case_folding() {
        let mut map = KeywordMap::new(true);
        map.add("Select", TokenType::Keyword2);
        assert_eq!(map.lookup(&chars("SELECT")), TokenType::Keyword2);
        assert_eq!(map.lookup(&chars("select")), TokenType::Keyword2);

        let mut exact = KeywordMap::new(false);
        exact.add("Select", TokenType::Keyword2);
        assert_eq!(exact.lookup(&chars("SELECT")), TokenType::Null);
    }
}
