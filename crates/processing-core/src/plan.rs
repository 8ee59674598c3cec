//! Planned keyframe writes.
//!
//! Traversal collects every key into a [`KeyframePlan`] before anything
//! reaches the host, so a run that fails part-way leaves the scene as it
//! was.

use applicator_capture_model::keyframes::{KeyWrite, KeyframeSink};
use applicator_common::error::ApplicatorResult;

/// Ordered list of keys waiting to be written.
#[derive(Debug, Clone, Default)]
pub struct KeyframePlan {
    writes: Vec<KeyWrite>,
}

impl KeyframePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: KeyWrite) {
        self.writes.push(key);
    }

    /// Planned keys in emission order.
    pub fn writes(&self) -> &[KeyWrite] {
        &self.writes
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Write every planned key to `sink`, in order. Returns the number of
    /// keys written.
    pub fn commit<K: KeyframeSink + ?Sized>(&self, sink: &mut K) -> ApplicatorResult<usize> {
        for key in &self.writes {
            sink.set_key(key)?;
        }
        tracing::debug!("Committed {} keys", self.writes.len());
        Ok(self.writes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use applicator_capture_model::keyframes::KeyframeLog;
    use applicator_capture_model::scene::{ChannelTarget, NodeId};
    use applicator_common::error::ApplicatorError;

    fn key(frame: i64) -> KeyWrite {
        KeyWrite {
            node: NodeId(1),
            node_name: "JawOpen".to_string(),
            target: ChannelTarget::Channel("strength".to_string()),
            frame,
            time: frame as f64 / 60.0,
            value: 0.5,
            take: None,
        }
    }

    struct FailingSink {
        accepted: usize,
    }

    impl KeyframeSink for FailingSink {
        fn set_key(&mut self, _key: &KeyWrite) -> ApplicatorResult<()> {
            if self.accepted == 1 {
                return Err(ApplicatorError::sink("channel is locked"));
            }
            self.accepted += 1;
            Ok(())
        }
    }

    #[test]
    fn test_commit_writes_in_order() {
        let mut plan = KeyframePlan::new();
        plan.push(key(2));
        plan.push(key(0));

        let mut log = KeyframeLog::new();
        assert_eq!(plan.commit(&mut log).unwrap(), 2);
        assert_eq!(log.keys()[0].frame, 2);
        assert_eq!(log.keys()[1].frame, 0);
    }

    #[test]
    fn test_commit_stops_on_sink_error() {
        let mut plan = KeyframePlan::new();
        for frame in 0..3 {
            plan.push(key(frame));
        }
        let mut sink = FailingSink { accepted: 0 };
        let err = plan.commit(&mut sink).unwrap_err();
        assert!(matches!(err, ApplicatorError::Sink { .. }));
        assert_eq!(sink.accepted, 1);
    }
}
