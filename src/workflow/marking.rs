use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The set of places a subject currently occupies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Marking {
    places: BTreeSet<String>,
}

impl Marking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a marking occupying every given place.
    pub fn with_places<I, S>(places: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            places: places.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has(&self, place: &str) -> bool {
        self.places.contains(place)
    }

    pub fn mark(&mut self, place: impl Into<String>) {
        self.places.insert(place.into());
    }

    pub fn unmark(&mut self, place: &str) {
        self.places.remove(place);
    }

    pub fn places(&self) -> impl Iterator<Item = &str> {
        self.places.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// True when every place in `places` is occupied.
    pub fn contains_all<'p>(&self, mut places: impl Iterator<Item = &'p str>) -> bool {
        places.all(|place| self.has(place))
    }
}

impl fmt::Display for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, place) in self.places.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{place}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_and_unmark() {
        let mut marking = Marking::new();
        assert!(marking.is_empty());

        marking.mark("draft");
        marking.mark("review");
        marking.mark("draft");
        assert_eq!(marking.len(), 2);
        assert!(marking.has("draft"));

        marking.unmark("draft");
        assert!(!marking.has("draft"));
        assert_eq!(marking.places().collect::<Vec<_>>(), vec!["review"]);
    }

    #[test]
    fn contains_all_checks_every_place() {
        let marking = Marking::with_places(["a", "b"]);
        assert!(marking.contains_all(["a", "b"].into_iter()));
        assert!(!marking.contains_all(["a", "c"].into_iter()));
    }

    #[test]
    fn display_lists_places_in_order() {
        let marking = Marking::with_places(["review", "draft"]);
        assert_eq!(marking.to_string(), "{draft, review}");
    }

    #[test]
    fn serializes_as_plain_list() {
        let marking = Marking::with_places(["b", "a"]);
        assert_eq!(serde_json::to_string(&marking).unwrap(), r#"["a","b"]"#);
    }
}
