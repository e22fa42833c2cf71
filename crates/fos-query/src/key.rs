//! Registration identity keys

use std::fmt;

/// `type(selector):capture` - the identity of one binding on one node.
///
/// Whitespace is stripped from the selector, so `"ul > li"` and `"ul>li"`
/// name the same binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn new(event_type: &str, selector: Option<&str>, capture: bool) -> Self {
        let mut key = String::from(event_type);
        if let Some(selector) = selector {
            key.push('(');
            key.extend(selector.chars().filter(|c| !c.is_whitespace()));
            key.push(')');
        }
        if capture {
            key.push_str(":capture");
        }
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
