//! Names pre-seeded into a tracker's baseline

use std::collections::{BTreeSet, HashSet};

/// Extra names treated as already present when a scope is entered
///
/// Usually this is just the name the tracker itself is bound to, so its own
/// binding is not reported as new. Built from a single name or any
/// collection of names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extras {
    names: BTreeSet<String>,
}

impl Extras {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Merge more names in
    pub fn extend<I>(&mut self, names: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
    }
}

impl From<&str> for Extras {
    fn from(name: &str) -> Self {
        Self {
            names: BTreeSet::from([name.to_string()]),
        }
    }
}

impl From<String> for Extras {
    fn from(name: String) -> Self {
        Self {
            names: BTreeSet::from([name]),
        }
    }
}

impl<T: Into<String>> From<Vec<T>> for Extras {
    fn from(names: Vec<T>) -> Self {
        names.into_iter().collect()
    }
}

impl<T: Into<String>, const N: usize> From<[T; N]> for Extras {
    fn from(names: [T; N]) -> Self {
        names.into_iter().collect()
    }
}

impl From<HashSet<String>> for Extras {
    fn from(names: HashSet<String>) -> Self {
        names.into_iter().collect()
    }
}

impl From<BTreeSet<String>> for Extras {
    fn from(names: BTreeSet<String>) -> Self {
        Self { names }
    }
}

impl<T: Into<Extras>> From<Option<T>> for Extras {
    fn from(extras: Option<T>) -> Self {
        extras.map(Into::into).unwrap_or_default()
    }
}

impl<T: Into<String>> FromIterator<T> for Extras {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_name() {
        let extras = Extras::from("scope");
        assert_eq!(extras.iter().collect::<Vec<_>>(), vec!["scope"]);
    }

    #[test]
    fn test_collection_is_a_union() {
        let extras = Extras::from(vec!["a", "b", "a"]);
        assert_eq!(extras.len(), 2);
    }

    #[test]
    fn test_absent_extras() {
        let extras = Extras::from(None::<&str>);
        assert!(extras.is_empty());
        assert_eq!(Extras::none(), extras);
    }

    #[test]
    fn test_extend() {
        let mut extras = Extras::from(["a"]);
        extras.extend(vec!["b".to_string()]);
        assert_eq!(extras.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
