//! Scene abstraction the applicator reads targets from.
//!
//! The host application owns the scene. The applicator only needs to read
//! node identity, type, names and channels, and to walk children, nested
//! deformers and actor membership. Hosts expose that through
//! [`TargetNode`] and [`SceneView`]; keys are written back through a
//! [`crate::keyframes::KeyframeSink`].

use serde::{Deserialize, Serialize};

/// Host-assigned node identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node types the applicator distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Actor group: a flat list of member items plus group channels.
    Actor,
    Locator,
    Mesh,
    MorphDeformer,
    /// Any other host type. Traversed, never bound.
    #[serde(other)]
    Other,
}

impl NodeKind {
    /// Whether rotation bindings may drive this node.
    pub fn is_rotatable(self) -> bool {
        matches!(self, NodeKind::Locator | NodeKind::Mesh)
    }
}

/// How a channel evaluates its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    #[default]
    Scalar,
    /// Angle channel, stored in radians.
    Angle,
}

/// Rotation axis of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Parse an axis letter, case-insensitively.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'X' => Some(Axis::X),
            'Y' => Some(Axis::Y),
            'Z' => Some(Axis::Z),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// What a key is written to on a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "snake_case")]
pub enum ChannelTarget {
    /// A named channel (e.g. a morph deformer's `strength`).
    Channel(String),
    /// One axis of the item's rotation.
    Rotation(Axis),
}

impl std::fmt::Display for ChannelTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelTarget::Channel(name) => write!(f, "{name}"),
            ChannelTarget::Rotation(axis) => write!(f, "rot.{axis}"),
        }
    }
}

/// Read-only view of one scene node.
///
/// Handles are cheap to clone; collections are returned by value so hosts
/// can build them from whatever their scene API provides.
pub trait TargetNode: Clone {
    fn id(&self) -> NodeId;

    fn name(&self) -> &str;

    fn kind(&self) -> NodeKind;

    /// Evaluation type of a channel, or `None` if the node has no such
    /// channel. Channel names are matched exactly.
    fn channel_kind(&self, channel: &str) -> Option<ChannelKind>;

    fn has_channel(&self, channel: &str) -> bool {
        self.channel_kind(channel).is_some()
    }

    /// Direct children in host order.
    fn children(&self) -> Vec<Self>;

    /// Deformers attached to a mesh.
    fn deformers(&self) -> Vec<Self>;

    /// Member items of an actor.
    fn members(&self) -> Vec<Self>;

    /// Channels an actor exposes at group level, as `(owning item, channel)`.
    fn group_channels(&self) -> Vec<(Self, String)>;

    /// Names of the takes (action clips) an actor owns.
    fn takes(&self) -> Vec<String>;
}

/// Scene-level queries needed to choose a root target.
pub trait SceneView {
    type Node<'s>: TargetNode
    where
        Self: 's;

    /// Scene frame rate as reported by the host.
    fn fps(&self) -> f64;

    /// All actor groups in the scene.
    fn actors(&self) -> Vec<Self::Node<'_>>;

    /// Current selection, in selection order.
    fn selection(&self) -> Vec<Self::Node<'_>>;
}
