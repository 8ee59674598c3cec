//! Target traversal and binding dispatch.
//!
//! An actor root is processed flat: each member item is dispatched, and in
//! channel mode the actor's group channels too. Any other root is walked as
//! a tree: the item, its morph deformers (meshes only) and every descendant.

use std::collections::HashSet;

use applicator_capture_model::scene::{ChannelTarget, NodeId, NodeKind, TargetNode};
use applicator_capture_model::scene_graph::MORPH_STRENGTH_CHANNEL;
use applicator_common::config::BlendTargetMode;
use applicator_common::error::ApplicatorResult;
use serde::{Deserialize, Serialize};

use crate::mapping::ResolvedMappings;
use crate::neutral::NeutralProfile;
use crate::plan::KeyframePlan;
use crate::transform::{SignalChannel, SignalTransformer};

/// How the root target was processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalkMode {
    Actor,
    Item,
}

impl std::fmt::Display for WalkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalkMode::Actor => write!(f, "Actor"),
            WalkMode::Item => write!(f, "Item"),
        }
    }
}

/// Result of walking one root target.
#[derive(Debug, Clone)]
pub struct WalkOutcome {
    pub mode: WalkMode,
    pub plan: KeyframePlan,
    /// Bindings that produced a key series.
    pub bindings_applied: usize,
    /// Nodes dispatched.
    pub visited: usize,
}

/// Dispatches resolved bindings onto a target hierarchy.
pub struct TargetWalker<'a> {
    mappings: &'a ResolvedMappings,
    neutral: &'a NeutralProfile,
    transformer: SignalTransformer<'a>,
    blend_target: BlendTargetMode,
    take_name: Option<&'a str>,
}

impl<'a> TargetWalker<'a> {
    pub fn new(
        mappings: &'a ResolvedMappings,
        neutral: &'a NeutralProfile,
        transformer: SignalTransformer<'a>,
        blend_target: BlendTargetMode,
    ) -> Self {
        Self {
            mappings,
            neutral,
            transformer,
            blend_target,
            take_name: None,
        }
    }

    /// Take that keys are grouped into. Only used for actor roots.
    pub fn with_take(mut self, take_name: Option<&'a str>) -> Self {
        self.take_name = take_name;
        self
    }

    /// Plan every key for `root`.
    pub fn walk<N: TargetNode>(&self, root: &N) -> ApplicatorResult<WalkOutcome> {
        let mut walk = Walk {
            plan: KeyframePlan::new(),
            bindings_applied: 0,
            visited: 0,
        };

        let mode = if root.kind() == NodeKind::Actor {
            self.walk_actor(root, &mut walk)?;
            WalkMode::Actor
        } else {
            self.walk_item(root, &mut walk)?;
            WalkMode::Item
        };

        tracing::debug!(
            "{} walk of '{}': {} nodes, {} bindings, {} keys",
            mode,
            root.name(),
            walk.visited,
            walk.bindings_applied,
            walk.plan.len()
        );

        Ok(WalkOutcome {
            mode,
            plan: walk.plan,
            bindings_applied: walk.bindings_applied,
            visited: walk.visited,
        })
    }

    fn walk_actor<N: TargetNode>(&self, actor: &N, walk: &mut Walk) -> ApplicatorResult<()> {
        let take = self.take_name;
        for member in actor.members() {
            self.dispatch(&member, take, walk)?;
        }

        if self.blend_target == BlendTargetMode::Channel {
            for (item, channel) in actor.group_channels() {
                let Some(kind) = item.channel_kind(&channel) else {
                    continue;
                };
                let bindings = self.mappings.channel.iter().filter(|b| {
                    b.modifiers.enabled
                        && b.item.eq_ignore_ascii_case(item.name())
                        && b.channel.eq_ignore_ascii_case(&channel)
                });
                for binding in bindings {
                    let neutral = self.neutral.get(&binding.signal);
                    self.transformer.apply(
                        &mut walk.plan,
                        &item,
                        ChannelTarget::Channel(channel.clone()),
                        &binding.signal,
                        &binding.modifiers,
                        SignalChannel::magnitude(neutral, kind),
                        take,
                    )?;
                    walk.bindings_applied += 1;
                }
            }
        }
        Ok(())
    }

    fn walk_item<N: TargetNode>(&self, root: &N, walk: &mut Walk) -> ApplicatorResult<()> {
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![root.clone()];

        while let Some(node) = stack.pop() {
            if !seen.insert(node.id()) {
                tracing::debug!("Skipping repeated node '{}' ({})", node.name(), node.id());
                continue;
            }
            self.dispatch(&node, None, walk)?;

            let mut next = Vec::new();
            if node.kind() == NodeKind::Mesh {
                next.extend(
                    node.deformers()
                        .into_iter()
                        .filter(|d| d.kind() == NodeKind::MorphDeformer),
                );
            }
            next.extend(node.children());
            stack.extend(next.into_iter().rev());
        }
        Ok(())
    }

    /// Apply every binding that matches `node`.
    fn dispatch<N: TargetNode>(
        &self,
        node: &N,
        take: Option<&str>,
        walk: &mut Walk,
    ) -> ApplicatorResult<()> {
        walk.visited += 1;
        let name = node.name();

        match self.blend_target {
            BlendTargetMode::Morph if node.kind() == NodeKind::MorphDeformer => {
                let first = self
                    .mappings
                    .morph
                    .iter()
                    .find(|b| b.modifiers.enabled && b.target.eq_ignore_ascii_case(name));
                if let Some(binding) = first {
                    let kind = node.channel_kind(MORPH_STRENGTH_CHANNEL).unwrap_or_default();
                    self.transformer.apply(
                        &mut walk.plan,
                        node,
                        ChannelTarget::Channel(MORPH_STRENGTH_CHANNEL.to_string()),
                        &binding.signal,
                        &binding.modifiers,
                        SignalChannel::magnitude(self.neutral.get(&binding.signal), kind),
                        take,
                    )?;
                    walk.bindings_applied += 1;
                }
            }
            BlendTargetMode::Channel => {
                let bindings = self
                    .mappings
                    .channel
                    .iter()
                    .filter(|b| b.modifiers.enabled && b.item.eq_ignore_ascii_case(name));
                for binding in bindings {
                    let Some(kind) = node.channel_kind(&binding.channel) else {
                        continue;
                    };
                    self.transformer.apply(
                        &mut walk.plan,
                        node,
                        ChannelTarget::Channel(binding.channel.clone()),
                        &binding.signal,
                        &binding.modifiers,
                        SignalChannel::magnitude(self.neutral.get(&binding.signal), kind),
                        take,
                    )?;
                    walk.bindings_applied += 1;
                }
            }
            BlendTargetMode::Morph => {}
        }

        if node.kind().is_rotatable() {
            let bindings = self
                .mappings
                .rotation
                .iter()
                .filter(|b| b.modifiers.enabled && b.item.eq_ignore_ascii_case(name));
            for binding in bindings {
                self.transformer.apply(
                    &mut walk.plan,
                    node,
                    ChannelTarget::Rotation(binding.axis),
                    &binding.signal,
                    &binding.modifiers,
                    SignalChannel::Rotation,
                    take,
                )?;
                walk.bindings_applied += 1;
            }
        }
        Ok(())
    }
}

struct Walk {
    plan: KeyframePlan,
    bindings_applied: usize,
    visited: usize,
}
