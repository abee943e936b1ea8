use serde::{Deserialize, Serialize};

/// Address of a location inside a snapshot
///
/// Object members are joined with dots (`user.profile.name`), array members
/// use bracketed indices (`tags[2]`, `items[0].id`). The root value itself is
/// addressed by the empty path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// The path of the root value
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Whether this is the root path
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of an object member below this path
    pub fn child_key(&self, key: &str) -> Self {
        if self.0.is_empty() {
            Self(key.to_string())
        } else {
            Self(format!("{}.{}", self.0, key))
        }
    }

    /// Path of an array element below this path
    pub fn child_index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment of the path, used as a display label
    ///
    /// Returns the member key for `a.b`, the bracketed index for `a[3]`,
    /// and `None` for the root.
    pub fn last_segment(&self) -> Option<&str> {
        if self.0.is_empty() {
            return None;
        }
        let cut = self.0.rfind(['.', '[']);
        Some(match cut {
            Some(i) if self.0.as_bytes()[i] == b'.' => &self.0[i + 1..],
            Some(i) => &self.0[i..],
            None => &self.0,
        })
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FieldPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_paths() {
        let root = FieldPath::root();
        assert!(root.is_root());

        let user = root.child_key("user");
        assert_eq!(user.as_str(), "user");
        assert_eq!(user.child_key("name").as_str(), "user.name");
        assert_eq!(user.child_key("tags").child_index(2).as_str(), "user.tags[2]");
        assert_eq!(root.child_index(0).as_str(), "[0]");
        assert_eq!(
            root.child_key("items").child_index(0).child_key("id").as_str(),
            "items[0].id"
        );
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(FieldPath::root().last_segment(), None);
        assert_eq!(FieldPath::from("user").last_segment(), Some("user"));
        assert_eq!(FieldPath::from("user.name").last_segment(), Some("name"));
        assert_eq!(FieldPath::from("tags[2]").last_segment(), Some("[2]"));
        assert_eq!(FieldPath::from("items[0].id").last_segment(), Some("id"));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let path = FieldPath::from("a.b[1]");
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"a.b[1]\"");
    }
}
