use crate::runtime::error::{self, syntax_error};
use std::{
    collections::{HashMap, hash_map},
    fmt::{self, Display, Formatter},
};

/// Dense identifier of a word.  Primitive words own the lowest identifiers.
pub type WordId = usize;

/// Maps word names to their identifiers so repeated references to a name share one identifier.
#[derive(Default)]
pub struct WordTable {
    entries: HashMap<String, WordId>,
}

impl WordTable {
    pub fn new() -> WordTable {
        WordTable {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: String, id: WordId) {
        let _ = self.entries.insert(name, id);
    }

    /// Exact match lookup of a name.
    pub fn get(&self, name: &str) -> Option<WordId> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over every name and identifier.  The order is stable as long as the table isn't
    /// modified.
    pub fn iter(&self) -> hash_map::Iter<'_, String, WordId> {
        self.entries.iter()
    }
}

/// The information kept for each identifier.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct WordEntry {
    /// The name the identifier was created for.
    pub name: String,

    /// The code address of the word's body, or None while the word is referenced but not yet
    /// defined.
    pub address: Option<usize>,
}

/// The word dictionary.  Identifiers are handed out densely and in order, they are never reused
/// and the dictionary never shrinks.  Every identifier starts out unresolved and is resolved at
/// most once, when its definition is compiled or a native word is registered under it.
#[derive(Default)]
pub struct Dictionary {
    entries: Vec<WordEntry>,
    words: WordTable,
}

/// Pretty print the dictionary, listing every user visible word with its address.
impl Display for Dictionary {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let max_size = self
            .entries
            .iter()
            .map(|entry| entry.name.len())
            .max()
            .unwrap_or(0);

        writeln!(formatter, "{} words known.\n", self.entries.len())?;

        for (id, entry) in self.entries.iter().enumerate() {
            match entry.address {
                Some(address) => writeln!(
                    formatter,
                    "{:5}  {:width$}  @{}",
                    id,
                    entry.name,
                    address,
                    width = max_size
                )?,
                None => writeln!(
                    formatter,
                    "{:5}  {:width$}  unresolved",
                    id,
                    entry.name,
                    width = max_size
                )?,
            }
        }

        Ok(())
    }
}

impl Dictionary {
    pub fn new() -> Dictionary {
        Dictionary {
            entries: Vec::new(),
            words: WordTable::new(),
        }
    }

    /// Find the identifier for a name, creating a new unresolved identifier the first time the
    /// name is seen.
    pub fn resolve(&mut self, name: &str) -> WordId {
        if let Some(id) = self.words.get(name) {
            return id;
        }

        let id = self.entries.len();

        self.entries.push(WordEntry {
            name: name.to_string(),
            address: None,
        });
        self.words.insert(name.to_string(), id);

        id
    }

    /// Look up a name without creating it.
    pub fn find(&self, name: &str) -> Option<WordId> {
        self.words.get(name)
    }

    /// Resolve an identifier to the code address of its body.  Resolving twice is an error.
    pub fn define(&mut self, id: WordId, address: usize) -> error::Result<()> {
        match self.entries.get_mut(id) {
            Some(entry) if entry.address.is_none() => {
                entry.address = Some(address);
                Ok(())
            }
            Some(entry) => syntax_error(format!("word '{}' is already defined", entry.name)),
            None => syntax_error(format!("unknown word identifier {}", id)),
        }
    }

    /// The code address of an identifier, None if it is unresolved or doesn't exist.
    pub fn address_of(&self, id: WordId) -> Option<usize> {
        self.entries.get(id).and_then(|entry| entry.address)
    }

    pub fn name_of(&self, id: WordId) -> Option<&str> {
        self.entries.get(id).map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Access to the name table, for listing words.
    pub fn words(&self) -> &WordTable {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_deduplicates_names() {
        let mut dictionary = Dictionary::new();

        let a = dictionary.resolve("alpha");
        let b = dictionary.resolve("beta");

        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(dictionary.resolve("alpha"), a);
        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary.words().len(), 2);
    }

    #[test]
    fn identifiers_resolve_exactly_once() {
        let mut dictionary = Dictionary::new();
        let id = dictionary.resolve("square");

        assert_eq!(dictionary.address_of(id), None);

        dictionary.define(id, 42).unwrap();
        assert_eq!(dictionary.address_of(id), Some(42));

        assert!(dictionary.define(id, 50).is_err());
        assert_eq!(dictionary.address_of(id), Some(42));
    }

    #[test]
    fn listing_marks_unresolved_words() {
        let mut dictionary = Dictionary::new();
        let id = dictionary.resolve("later");

        assert!(dictionary.to_string().contains("unresolved"));

        dictionary.define(id, 7).unwrap();
        assert!(dictionary.to_string().contains("@7"));
    }
}
