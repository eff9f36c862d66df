//! Insertion-ordered parameter collection.

/// An ordered mapping from parameter name to its values.
///
/// Names keep the order in which they were first inserted. Some consumers
/// render parameters back to the user, so the order exposed by the host is
/// preserved rather than re-sorted.
///
/// Lookups are linear; request parameter sets are small.
///
/// # Examples
///
/// ```
/// use request_sanitizer::web::ParameterMap;
///
/// let mut params = ParameterMap::new();
/// params.append("tag", "a");
/// params.append("q", "rust");
/// params.append("tag", "b");
///
/// let names: Vec<&str> = params.names().collect();
/// assert_eq!(names, ["tag", "q"]);
/// assert_eq!(params.get("tag"), Some(&["a".to_string(), "b".to_string()][..]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
    entries: Vec<(String, Vec<String>)>,
}

impl ParameterMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the values of `name`, adding the name if new.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1.push(value.into()),
            None => self.entries.push((name, vec![value.into()])),
        }
    }

    /// Sets the values of `name`, keeping its position if already present.
    ///
    /// Returns the previous values, if any.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<String>) -> Option<Vec<String>> {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, values)),
            None => {
                self.entries.push((name, values));
                None
            }
        }
    }

    /// Returns the values of `name`, if present.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.position(name).map(|idx| self.entries[idx].1.as_slice())
    }

    /// Returns `true` if `name` is present.
    pub fn contains_key(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Iterates over parameter names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates over `(name, values)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Returns the number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no names.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }
}

impl IntoIterator for ParameterMap {
    type Item = (String, Vec<String>);
    type IntoIter = std::vec::IntoIter<(String, Vec<String>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<String>)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (K, Vec<String>)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, values) in iter {
            map.insert(name, values);
        }
        map
    }
}
