use serde::{Deserialize, Serialize};

// User identity = opaque string handle issued by the remote auth service.
// Meaningful only as an equality key; the client never inspects it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Uid(pub String);

impl Uid {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty uid means "no active session".
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn short(&self) -> &str {
        let end = self.0.len().min(8);
        &self.0[..end]
    }
}

impl std::fmt::Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chat room identifier.  Messages carry their topic and the feed
/// subscribes to exactly one topic at a time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Topic(pub String);

impl Topic {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Topic {
    fn default() -> Self {
        Self(crate::constants::DEFAULT_TOPIC.to_string())
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_short_handles_small_ids() {
        assert_eq!(Uid::new("abcdefghij").short(), "abcdefgh");
        assert_eq!(Uid::new("ab").short(), "ab");
        assert!(Uid::new("").is_empty());
    }

    #[test]
    fn uid_serializes_as_plain_string() {
        let json = serde_json::to_string(&Uid::new("u1")).unwrap();
        assert_eq!(json, "\"u1\"");
    }
}
