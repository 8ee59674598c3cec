//! In-memory scene graph.
//!
//! A JSON-serializable stand-in for a host scene, used by the command-line
//! tool and by tests to run the full pipeline without a host. Nodes are
//! stored in a flat list and referenced by index ([`NodeId`]).

use std::path::Path;

use serde::{Deserialize, Serialize};

use applicator_common::error::{ApplicatorError, ApplicatorResult};

use crate::scene::{ChannelKind, NodeId, NodeKind, SceneView, TargetNode};

/// Channel name every morph deformer exposes, listed or not.
pub const MORPH_STRENGTH_CHANNEL: &str = "strength";

/// Scene description (`scene.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneGraph {
    /// Scene frame rate.
    pub fps: f64,

    /// All nodes; a node's position is its id.
    #[serde(default)]
    pub nodes: Vec<SceneNode>,

    /// Actor groups.
    #[serde(default)]
    pub actors: Vec<NodeId>,

    /// Current selection, in selection order.
    #[serde(default)]
    pub selection: Vec<NodeId>,
}

/// A node in a [`SceneGraph`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,

    pub kind: NodeKind,

    #[serde(default)]
    pub channels: Vec<ChannelSpec>,

    #[serde(default)]
    pub children: Vec<NodeId>,

    /// Deformers (meshes only).
    #[serde(default)]
    pub deformers: Vec<NodeId>,

    /// Member items (actors only).
    #[serde(default)]
    pub members: Vec<NodeId>,

    /// Group-level channels (actors only).
    #[serde(default)]
    pub group_channels: Vec<GroupChannelSpec>,

    /// Existing takes (actors only).
    #[serde(default)]
    pub takes: Vec<String>,
}

/// A channel on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub name: String,
    #[serde(default)]
    pub kind: ChannelKind,
}

/// A channel an actor exposes at group level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupChannelSpec {
    pub item: NodeId,
    pub channel: String,
}

impl SceneGraph {
    /// Empty scene at the given frame rate.
    pub fn new(fps: f64) -> Self {
        Self {
            fps,
            nodes: Vec::new(),
            actors: Vec::new(),
            selection: Vec::new(),
        }
    }

    /// Load a scene description and check its references.
    pub fn load(path: impl AsRef<Path>) -> ApplicatorResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ApplicatorError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => ApplicatorError::Io(e),
        })?;
        let scene: SceneGraph = serde_json::from_str(&json)
            .map_err(|e| ApplicatorError::file_format(path, e.to_string()))?;
        if let Some(problem) = scene.check_references().into_iter().next() {
            return Err(ApplicatorError::file_format(path, problem));
        }
        Ok(scene)
    }

    /// Save the scene description as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> ApplicatorResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Every dangling node reference, as a message.
    pub fn check_references(&self) -> Vec<String> {
        let count = self.nodes.len();
        let mut problems = Vec::new();
        let mut check = |owner: &str, id: NodeId| {
            if id.0 >= count {
                problems.push(format!("{owner} references missing node {id}"));
            }
        };

        for (index, node) in self.nodes.iter().enumerate() {
            let owner = format!("node {} '{}'", NodeId(index), node.name);
            for &id in node
                .children
                .iter()
                .chain(&node.deformers)
                .chain(&node.members)
            {
                check(&owner, id);
            }
            for group_channel in &node.group_channels {
                check(&owner, group_channel.item);
            }
        }
        for &id in &self.actors {
            check("actor list", id);
        }
        for &id in &self.selection {
            check("selection", id);
        }
        problems
    }

    /// Handle to a node.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.0 < self.nodes.len()).then_some(NodeRef { graph: self, id })
    }

    /// First node with the given name (exact match).
    pub fn find(&self, name: &str) -> Option<NodeRef<'_>> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|index| NodeRef {
                graph: self,
                id: NodeId(index),
            })
    }

    /// Add a node. Actors are also registered in the actor list.
    pub fn add_node(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            name: name.into(),
            kind,
            channels: Vec::new(),
            children: Vec::new(),
            deformers: Vec::new(),
            members: Vec::new(),
            group_channels: Vec::new(),
            takes: Vec::new(),
        });
        if kind == NodeKind::Actor {
            self.actors.push(id);
        }
        id
    }

    // The builder methods below index with ids handed out by `add_node`
    // and panic on foreign ids.

    pub fn add_channel(&mut self, node: NodeId, name: impl Into<String>, kind: ChannelKind) {
        self.nodes[node.0].channels.push(ChannelSpec {
            name: name.into(),
            kind,
        });
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
    }

    pub fn add_deformer(&mut self, mesh: NodeId, deformer: NodeId) {
        self.nodes[mesh.0].deformers.push(deformer);
    }

    pub fn add_member(&mut self, actor: NodeId, item: NodeId) {
        self.nodes[actor.0].members.push(item);
    }

    pub fn add_group_channel(&mut self, actor: NodeId, item: NodeId, channel: impl Into<String>) {
        self.nodes[actor.0].group_channels.push(GroupChannelSpec {
            item,
            channel: channel.into(),
        });
    }

    pub fn add_take(&mut self, actor: NodeId, name: impl Into<String>) {
        self.nodes[actor.0].takes.push(name.into());
    }

    pub fn select(&mut self, node: NodeId) {
        self.selection.push(node);
    }

    fn refs(&self, ids: &[NodeId]) -> Vec<NodeRef<'_>> {
        ids.iter().filter_map(|&id| self.node(id)).collect()
    }
}

/// Borrowed handle to a node of a [`SceneGraph`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    graph: &'a SceneGraph,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    fn data(&self) -> &'a SceneNode {
        &self.graph.nodes[self.id.0]
    }
}

impl<'a> TargetNode for NodeRef<'a> {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &str {
        &self.data().name
    }

    fn kind(&self) -> NodeKind {
        self.data().kind
    }

    fn channel_kind(&self, channel: &str) -> Option<ChannelKind> {
        let data = self.data();
        data.channels
            .iter()
            .find(|c| c.name == channel)
            .map(|c| c.kind)
            .or_else(|| {
                (data.kind == NodeKind::MorphDeformer && channel == MORPH_STRENGTH_CHANNEL)
                    .then_some(ChannelKind::Scalar)
            })
    }

    fn children(&self) -> Vec<Self> {
        self.graph.refs(&self.data().children)
    }

    fn deformers(&self) -> Vec<Self> {
        self.graph.refs(&self.data().deformers)
    }

    fn members(&self) -> Vec<Self> {
        self.graph.refs(&self.data().members)
    }

    fn group_channels(&self) -> Vec<(Self, String)> {
        self.data()
            .group_channels
            .iter()
            .filter_map(|gc| self.graph.node(gc.item).map(|item| (item, gc.channel.clone())))
            .collect()
    }

    fn takes(&self) -> Vec<String> {
        self.data().takes.clone()
    }
}

impl SceneView for SceneGraph {
    type Node<'s> = NodeRef<'s>;

    fn fps(&self) -> f64 {
        self.fps
    }

    fn actors(&self) -> Vec<NodeRef<'_>> {
        self.refs(&self.actors)
    }

    fn selection(&self) -> Vec<NodeRef<'_>> {
        self.refs(&self.selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_rig() -> SceneGraph {
        let mut scene = SceneGraph::new(30.0);
        let head = scene.add_node("Head", NodeKind::Locator);
        let mesh = scene.add_node("FaceMesh", NodeKind::Mesh);
        let jaw = scene.add_node("JawOpen", NodeKind::MorphDeformer);
        scene.add_child(head, mesh);
        scene.add_deformer(mesh, jaw);
        scene.add_channel(head, "browAngle", ChannelKind::Angle);
        scene.select(head);
        scene
    }

    #[test]
    fn test_node_handles_follow_structure() {
        let scene = face_rig();
        let head = scene.find("Head").unwrap();
        assert_eq!(head.kind(), NodeKind::Locator);

        let children = head.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name(), "FaceMesh");

        let deformers = children[0].deformers();
        assert_eq!(deformers[0].name(), "JawOpen");
        assert_eq!(scene.selection()[0].id(), head.id());
    }

    #[test]
    fn test_channel_kinds() {
        let scene = face_rig();
        let head = scene.find("Head").unwrap();
        assert_eq!(head.channel_kind("browAngle"), Some(ChannelKind::Angle));
        assert!(!head.has_channel("BrowAngle"));

        let jaw = scene.find("JawOpen").unwrap();
        assert_eq!(
            jaw.channel_kind(MORPH_STRENGTH_CHANNEL),
            Some(ChannelKind::Scalar)
        );
        assert!(!head.has_channel(MORPH_STRENGTH_CHANNEL));
    }

    #[test]
    fn test_actor_registration_and_group_channels() {
        let mut scene = face_rig();
        let actor = scene.add_node("Hero", NodeKind::Actor);
        let head = scene.find("Head").unwrap().id();
        scene.add_member(actor, head);
        scene.add_group_channel(actor, head, "browAngle");
        scene.add_take(actor, "Idle");

        let actors = scene.actors();
        assert_eq!(actors.len(), 1);
        let hero = &actors[0];
        assert_eq!(hero.members()[0].name(), "Head");
        let (item, channel) = &hero.group_channels()[0];
        assert_eq!(item.name(), "Head");
        assert_eq!(channel, "browAngle");
        assert_eq!(hero.takes(), vec!["Idle".to_string()]);
    }

    #[test]
    fn test_load_rejects_dangling_references() {
        let dir = std::env::temp_dir().join("applicator_test_scene_graph");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let mut scene = face_rig();
        scene.selection.push(NodeId(42));
        let path = dir.join("scene.json");
        scene.save(&path).unwrap();

        let err = SceneGraph::load(&path).unwrap_err();
        assert!(err.to_string().contains("missing node #42"), "{err}");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_json_roundtrip() {
        let raw = r#"{
            "fps": 24.0,
            "nodes": [
                {"name": "Head", "kind": "locator", "children": [1]},
                {"name": "Cam", "kind": "camera"}
            ],
            "selection": [0]
        }"#;
        let scene: SceneGraph = serde_json::from_str(raw).unwrap();
        assert!(scene.check_references().is_empty());
        assert_eq!(scene.nodes[1].kind, NodeKind::Other);
        assert_eq!(scene.node(NodeId(0)).unwrap().children()[0].name(), "Cam");
        assert!(scene.node(NodeId(2)).is_none());
    }
}
