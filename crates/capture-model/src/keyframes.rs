//! Keyframe writes and the sinks that receive them.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use applicator_common::error::ApplicatorResult;

use crate::scene::{ChannelTarget, NodeId};

/// A single key to create or update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyWrite {
    pub node: NodeId,

    /// Node name at planning time, for logs and exports.
    pub node_name: String,

    pub target: ChannelTarget,

    /// Output (scene) frame number.
    pub frame: i64,

    /// Scene time in seconds of `frame`.
    pub time: f64,

    pub value: f64,

    /// Take (action clip) the key is grouped into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take: Option<String>,
}

/// Receiver of keyframe writes. Implemented by the host.
///
/// `set_key` has create-or-update semantics: writing a key at a time that
/// already holds one replaces its value.
pub trait KeyframeSink {
    fn set_key(&mut self, key: &KeyWrite) -> ApplicatorResult<()>;

    /// Make sure `actor` owns a take named `name`, creating it if needed.
    /// Returns `true` when the take was created.
    fn ensure_take(&mut self, _actor: NodeId, _name: &str) -> ApplicatorResult<bool> {
        Ok(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct KeySlot {
    node: NodeId,
    target: ChannelTarget,
    frame: i64,
    take: Option<String>,
}

impl KeySlot {
    fn of(key: &KeyWrite) -> Self {
        Self {
            node: key.node,
            target: key.target.clone(),
            frame: key.frame,
            take: key.take.clone(),
        }
    }
}

/// In-memory sink that records keys and serializes them to JSON.
#[derive(Debug, Default)]
pub struct KeyframeLog {
    keys: Vec<KeyWrite>,
    slots: HashMap<KeySlot, usize>,
    created_takes: Vec<CreatedTake>,
    writes: usize,
}

/// A take created through [`KeyframeSink::ensure_take`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTake {
    pub actor: NodeId,
    pub name: String,
}

/// JSON document written by [`KeyframeLog::save`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyframeExport {
    /// Wall-clock time of export (RFC 3339).
    pub generated_at: String,
    pub created_takes: Vec<CreatedTake>,
    pub keys: Vec<KeyWrite>,
}

impl KeyframeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored keys, in first-write order.
    pub fn keys(&self) -> &[KeyWrite] {
        &self.keys
    }

    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Total `set_key` calls, including updates of existing keys.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn created_takes(&self) -> &[CreatedTake] {
        &self.created_takes
    }

    /// Keys on one node and target, in frame order.
    pub fn curve(&self, node: NodeId, target: &ChannelTarget) -> Vec<&KeyWrite> {
        let mut curve: Vec<&KeyWrite> = self
            .keys
            .iter()
            .filter(|k| k.node == node && &k.target == target)
            .collect();
        curve.sort_by_key(|k| k.frame);
        curve
    }

    /// Snapshot for serialization.
    pub fn export(&self) -> KeyframeExport {
        KeyframeExport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            created_takes: self.created_takes.clone(),
            keys: self.keys.clone(),
        }
    }

    /// Write the log as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> ApplicatorResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.export())?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl KeyframeSink for KeyframeLog {
    fn set_key(&mut self, key: &KeyWrite) -> ApplicatorResult<()> {
        self.writes += 1;
        let slot = KeySlot::of(key);
        match self.slots.get(&slot).copied() {
            Some(index) => self.keys[index] = key.clone(),
            None => {
                self.slots.insert(slot, self.keys.len());
                self.keys.push(key.clone());
            }
        }
        Ok(())
    }

    fn ensure_take(&mut self, actor: NodeId, name: &str) -> ApplicatorResult<bool> {
        let exists = self
            .created_takes
            .iter()
            .any(|t| t.actor == actor && t.name.eq_ignore_ascii_case(name));
        if exists {
            return Ok(false);
        }
        self.created_takes.push(CreatedTake {
            actor,
            name: name.to_string(),
        });
        Ok(true)
    }
}
