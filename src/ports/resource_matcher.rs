//! Resource Matcher Port - picks a file or link to attach to a reply.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Video,
    Document,
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub kind: AttachmentKind,
    pub url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

pub trait ResourceMatcher: Send + Sync {
    /// At most one attachment, never one whose id is in `already_sent`.
    fn find(&self, text: &str, already_sent: &BTreeSet<String>) -> Option<Attachment>;
}
