use std::collections::HashMap;

// Keyed lookup over raw identifier bytes. Keys are compared by their full
// length, so identifiers sharing a prefix never collide.
#[derive(Debug, Clone)]
pub struct Store<V> {
    entries: HashMap<Box<[u8]>, V>,
}

impl<V> Default for Store<V> {
    fn default() -> Self {
        Store { entries: HashMap::new() }
    }
}

impl<V> Store<V> {
    /// Insert `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: &[u8], value: V) -> Option<V> {
        self.entries.insert(key.into(), value)
    }

    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.entries.get(key)
    }

    #[cfg(test)]
    pub fn remove(&mut self, key: &[u8]) -> Option<V> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_keys_are_distinct() {
        let mut store = Store::default();
        assert_eq!(store.insert(b"ab", 1), None);
        assert_eq!(store.insert(b"abc", 2), None);
        assert_eq!(store.insert(b"a", 3), None);

        assert_eq!(store.get(b"ab"), Some(&1));
        assert_eq!(store.get(b"abc"), Some(&2));
        assert_eq!(store.get(b"a"), Some(&3));
        assert_eq!(store.get(b"abcd"), None);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn insert_replaces_and_remove_shrinks() {
        let mut store = Store::default();
        store.insert(b"expr", 'e');
        assert_eq!(store.insert(b"expr", 'x'), Some('e'));
        assert_eq!(store.len(), 1);

        assert_eq!(store.remove(b"expr"), Some('x'));
        assert_eq!(store.remove(b"expr"), None);
        assert_eq!(store.get(b"expr"), None);
        assert_eq!(store.len(), 0);
    }
}
