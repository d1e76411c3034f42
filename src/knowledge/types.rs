//! Core knowledge type definitions.
//!
//! Defines [`NodeType`] and [`Importance`] (node classification), [`Node`] (a captured
//! unit of knowledge), [`RelationKind`] and [`Edge`] (typed links between nodes).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::embedding::EmbeddingProvider;

/// What kind of knowledge a node captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Idea,
    Decision,
    Progress,
    Insight,
    Question,
    Session,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idea => "idea",
            Self::Decision => "decision",
            Self::Progress => "progress",
            Self::Insight => "insight",
            Self::Question => "question",
            Self::Session => "session",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idea" => Ok(Self::Idea),
            "decision" => Ok(Self::Decision),
            "progress" => Ok(Self::Progress),
            "insight" => Ok(Self::Insight),
            "question" => Ok(Self::Question),
            "session" => Ok(Self::Session),
            _ => Err(format!("unknown node type: {s}")),
        }
    }
}

/// Declared importance of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Low,
    #[default]
    Medium,
    High,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Importance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("unknown importance: {s}")),
        }
    }
}

/// A knowledge node as supplied by the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Opaque identifier.
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub content: String,
    /// Lowercased, deduplicated, in first-seen order.
    #[serde(default, deserialize_with = "super::tags::deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub importance: Importance,
    pub created_at: DateTime<Utc>,
    /// Never earlier than `created_at`.
    pub updated_at: DateTime<Utc>,
    /// Precomputed embedding, possibly from an external model of any width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Node {
    /// Create a node stamped with `now`, medium importance and no tags.
    pub fn new(
        id: impl Into<String>,
        node_type: NodeType,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            node_type,
            content: content.into(),
            tags: Vec::new(),
            importance: Importance::Medium,
            created_at: now,
            updated_at: now,
            embedding: None,
        }
    }

    /// Replace the tags, normalizing them.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = super::tags::normalize_tags(tags);
        self
    }

    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    /// Move `updated_at`, keeping it at or after `created_at`.
    pub fn updated(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = at.max(self.created_at);
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// The vector used for index search: the precomputed embedding when present,
    /// otherwise the provider's embedding of the content.
    pub fn vector(&self, provider: &dyn EmbeddingProvider) -> Vec<f32> {
        match &self.embedding {
            Some(embedding) => embedding.clone(),
            None => provider.embed(&self.content),
        }
    }

    /// Days since the last update, never negative.
    pub fn age_days(&self, now: DateTime<Utc>) -> f64 {
        self.age_hours(now) / 24.0
    }

    /// Hours since the last update, never negative.
    pub fn age_hours(&self, now: DateTime<Utc>) -> f64 {
        let seconds = now.signed_duration_since(self.updated_at).num_milliseconds() as f64 / 1000.0;
        (seconds / 3600.0).max(0.0)
    }
}

/// Relation label carried by an [`Edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    References,
    RelatesTo,
    DerivedFrom,
    Blocks,
    Duplicates,
    ResolvedBy,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::References => "references",
            Self::RelatesTo => "relates_to",
            Self::DerivedFrom => "derived_from",
            Self::Blocks => "blocks",
            Self::Duplicates => "duplicates",
            Self::ResolvedBy => "resolved_by",
        }
    }

    /// Whether reading the edge backwards changes its meaning.
    pub fn is_directional(&self) -> bool {
        matches!(self, Self::Blocks | Self::DerivedFrom | Self::ResolvedBy)
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RelationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "references" => Ok(Self::References),
            "relates_to" => Ok(Self::RelatesTo),
            "derived_from" => Ok(Self::DerivedFrom),
            "blocks" => Ok(Self::Blocks),
            "duplicates" => Ok(Self::Duplicates),
            "resolved_by" => Ok(Self::ResolvedBy),
            _ => Err(format!("unknown relation kind: {s}")),
        }
    }
}

/// A directed, typed link between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    /// ID of the source node.
    pub source: String,
    /// ID of the target node.
    pub target: String,
    pub kind: RelationKind,
    pub created_at: DateTime<Utc>,
    /// Scored strength in `[0.0, 1.0]`; `None` for caller-asserted links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<String>,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        kind: RelationKind,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind,
            created_at,
            strength: None,
            evidence: Vec::new(),
        }
    }

    /// Whether `node_id` is either endpoint.
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}
