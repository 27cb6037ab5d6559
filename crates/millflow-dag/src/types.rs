use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn from_u128(value: u128) -> Self {
                Self(Uuid::from_u128(value))
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a node, immutable after creation.
    NodeId
);
uuid_id!(
    /// Identifier of a sheet.
    SheetId
);
uuid_id!(BlockerId);
uuid_id!(NoteId);

/// Grouping key of the job a sheet belongs to. Jobs live outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a person (assignee). People are owned elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub String);

impl PersonId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    #[default]
    ShopOperation,
    External,
    Material,
    Approval,
    QualityCheck,
    Delivery,
    Install,
}

impl NodeKind {
    pub const ALL: [NodeKind; 7] = [
        NodeKind::ShopOperation,
        NodeKind::External,
        NodeKind::Material,
        NodeKind::Approval,
        NodeKind::QualityCheck,
        NodeKind::Delivery,
        NodeKind::Install,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NodeKind::ShopOperation => "shop-operation",
            NodeKind::External => "external",
            NodeKind::Material => "material",
            NodeKind::Approval => "approval",
            NodeKind::QualityCheck => "quality-check",
            NodeKind::Delivery => "delivery",
            NodeKind::Install => "install",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeStatus {
    #[default]
    NotStarted,
    Ready,
    InProgress,
    Blocked,
    Done,
    Skipped,
}

impl NodeStatus {
    pub const ALL: [NodeStatus; 6] = [
        NodeStatus::NotStarted,
        NodeStatus::Ready,
        NodeStatus::InProgress,
        NodeStatus::Blocked,
        NodeStatus::Done,
        NodeStatus::Skipped,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NodeStatus::NotStarted => "not-started",
            NodeStatus::Ready => "ready",
            NodeStatus::InProgress => "in-progress",
            NodeStatus::Blocked => "blocked",
            NodeStatus::Done => "done",
            NodeStatus::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockerKind {
    Internal,
    External,
    Material,
    Approval,
    Site,
}

/// Which side of the target a sibling is spliced on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Side {
    Left,
    #[default]
    Right,
}

/// Where a pasted node lands relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PastePosition {
    Before,
    After,
    Sibling(Side),
}

pub type Timestamp = chrono::DateTime<chrono::Utc>;

pub fn now_timestamp() -> Timestamp {
    chrono::Utc::now()
}
