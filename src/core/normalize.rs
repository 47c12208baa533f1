//! Name normalization and the case-insensitive, insertion-ordered map used
//! for character and NPC keyed state.
use rustc_hash::FxHashMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Canonical form of a character name: trimmed, inner whitespace collapsed,
/// lowercased.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Comparison key for name lookups: lowercase alphanumerics only, so
/// `"  Greaves "`, `"GREAVES"` and `"greaves."` all collide. Names with no
/// alphanumerics fall back to their trimmed lowercase form.
pub fn name_key(name: &str) -> String {
    let key: String = name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    if key.is_empty() {
        name.trim().to_lowercase()
    } else {
        key
    }
}

/// A map from names to values that matches keys case- and
/// punctuation-insensitively while remembering the first-stored spelling.
///
/// Iteration follows insertion order.
#[derive(Debug, Clone)]
pub struct NameKeyedMap<V> {
    entries: Vec<(String, V)>,
    index: FxHashMap<String, usize>,
}

impl<V> Default for NameKeyedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<V: PartialEq> PartialEq for NameKeyedMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<V> NameKeyedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.position(name).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        self.position(name).map(move |i| &mut self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// The spelling under which a matching entry was first stored.
    pub fn original_key(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.entries[i].0.as_str())
    }

    /// Insert or overwrite. An existing entry keeps its stored key; a new
    /// entry is stored under `name` exactly as given. Returns the previous
    /// value, if any.
    pub fn upsert(&mut self, name: &str, value: V) -> Option<V> {
        match self.position(name) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.push_new(name, value);
                None
            }
        }
    }

    /// Mutable access to the entry matching `name`, inserting `make()` under
    /// `name` first if nothing matches.
    pub fn get_or_insert_with(&mut self, name: &str, make: impl FnOnce() -> V) -> &mut V {
        let i = match self.position(name) {
            Some(i) => i,
            None => self.push_new(name, make()),
        };
        &mut self.entries[i].1
    }

    pub fn remove(&mut self, name: &str) -> Option<V> {
        let i = self.position(name)?;
        let (_, value) = self.entries.remove(i);
        self.reindex();
        Some(value)
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &V) -> bool) {
        let before = self.entries.len();
        self.entries.retain(|(name, value)| keep(name, value));
        if self.entries.len() != before {
            self.reindex();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut V)> {
        self.entries
            .iter_mut()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, value)| value)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&name_key(name)).copied()
    }

    fn push_new(&mut self, name: &str, value: V) -> usize {
        let i = self.entries.len();
        self.entries.push((name.to_string(), value));
        self.index.insert(name_key(name), i);
        i
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, (name, _)) in self.entries.iter().enumerate() {
            self.index.insert(name_key(name), i);
        }
    }
}

impl<V> FromIterator<(String, V)> for NameKeyedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.upsert(&name, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for NameKeyedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct NameKeyedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for NameKeyedMapVisitor<V> {
    type Value = NameKeyedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map keyed by name")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = NameKeyedMap::new();
        while let Some((name, value)) = access.next_entry::<String, V>()? {
            map.upsert(&name, value);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for NameKeyedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(NameKeyedMapVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_name_trims_collapses_and_lowercases() {
        assert_eq!(normalize_name("  Captain   GREAVES "), "captain greaves");
        assert_eq!(normalize_name("\tMara\n"), "mara");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn name_key_ignores_case_and_punctuation() {
        assert_eq!(name_key("  Greaves  "), "greaves");
        assert_eq!(name_key("GREAVES"), "greaves");
        assert_eq!(name_key("Dr. Greaves"), name_key("dr greaves"));
        assert_eq!(name_key("O'Malley"), "omalley");
    }

    #[test]
    fn punctuation_only_names_do_not_collide() {
        assert_ne!(name_key("???"), name_key("—"));
        assert_eq!(name_key("  ??? "), "???");

        let mut map = NameKeyedMap::new();
        map.upsert("???", 1);
        map.upsert("—", 2);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(" ??? "), Some(&1));
    }

    #[test]
    fn lookup_is_case_insensitive_and_keeps_first_spelling() {
        let mut map = NameKeyedMap::new();
        map.upsert("GREAVES", 1);
        assert_eq!(map.get("greaves"), Some(&1));
        assert_eq!(map.get("  Greaves  "), Some(&1));
        assert_eq!(map.original_key("greaves"), Some("GREAVES"));

        assert_eq!(map.upsert("Greaves", 2), Some(1));
        assert_eq!(map.len(), 1);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["GREAVES"]);
        assert_eq!(map.get("GREAVES"), Some(&2));
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut map = NameKeyedMap::new();
        map.upsert("Zed", 1);
        map.upsert("Abe", 2);
        map.upsert("Mara", 3);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["Zed", "Abe", "Mara"]);
    }

    #[test]
    fn remove_and_retain_keep_index_consistent() {
        let mut map: NameKeyedMap<u32> = [
            ("Ana".to_string(), 1),
            ("Bo".to_string(), 2),
            ("Cy".to_string(), 3),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.remove("ana"), Some(1));
        assert_eq!(map.get("cy"), Some(&3));
        map.retain(|_, v| *v != 3);
        assert_eq!(map.get("bo"), Some(&2));
        assert!(!map.contains("cy"));
        assert_eq!(map.remove("nobody"), None);
    }

    #[test]
    fn get_or_insert_with_reuses_matching_entry() {
        let mut map: NameKeyedMap<Vec<u32>> = NameKeyedMap::new();
        map.get_or_insert_with("Mara", Vec::new).push(1);
        map.get_or_insert_with("MARA", Vec::new).push(2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("mara"), Some(&vec![1, 2]));
    }

    #[test]
    fn serializes_as_ordered_map() {
        let mut map = NameKeyedMap::new();
        map.upsert("Zed", 1);
        map.upsert("Abe", 2);
        let text = ron::to_string(&map).unwrap();
        let zed = text.find("Zed").unwrap();
        let abe = text.find("Abe").unwrap();
        assert!(zed < abe, "expected insertion order in {}", text);

        let back: NameKeyedMap<i32> = ron::from_str(&text).unwrap();
        assert_eq!(back, map);
        assert_eq!(back.get("abe"), Some(&2));
    }

    #[test]
    fn deserializing_colliding_names_keeps_first_key() {
        let map: NameKeyedMap<i32> = ron::from_str(r#"{"Greaves": 1, "GREAVES": 2}"#).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.original_key("greaves"), Some("Greaves"));
        assert_eq!(map.get("greaves"), Some(&2));
    }
}
