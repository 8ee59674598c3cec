//! Mapping resolution.
//!
//! Turns a mapping table (or, without one, an identity mapping over the
//! capture's signals) into typed bindings:
//! - **Morph:** signal → strength of a same-named morph deformer
//! - **Channel:** signal → `item.channel` user channel
//! - **Rotation:** rotation signal → one rotation axis of an item
//!
//! Malformed rows are dropped with a warning rather than failing the run.

use applicator_capture_model::mapping_table::{MappingRecord, MappingTable, RowType};
use applicator_capture_model::scene::Axis;
use applicator_common::config::BlendTargetMode;
use applicator_common::error::ApplicatorError;

/// Separator between fan-out targets in a `Target` cell.
pub const FAN_OUT_SEPARATOR: char = '|';

/// Per-binding value modifiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BindingModifiers {
    pub enabled: bool,
    pub multiplier: f64,
    pub value_shift: f64,
    /// Apply the 7-frame moving average.
    pub smooth: bool,
}

impl BindingModifiers {
    /// Pass values through unchanged.
    pub const IDENTITY: BindingModifiers = BindingModifiers {
        enabled: true,
        multiplier: 1.0,
        value_shift: 0.0,
        smooth: false,
    };

    pub fn from_record(record: &MappingRecord) -> Self {
        Self {
            enabled: record.is_enabled(),
            multiplier: record.multiplier(),
            value_shift: record.value_shift(),
            smooth: record.is_smoothed(),
        }
    }
}

impl Default for BindingModifiers {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Signal → morph deformer strength.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphBinding {
    pub signal: String,
    /// Morph deformer name.
    pub target: String,
    pub modifiers: BindingModifiers,
}

/// Signal → named channel on an item.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelBinding {
    pub signal: String,
    pub item: String,
    pub channel: String,
    pub modifiers: BindingModifiers,
}

/// Rotation signal → rotation axis of an item.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationBinding {
    pub signal: String,
    pub item: String,
    pub axis: Axis,
    pub modifiers: BindingModifiers,
}

/// Output of [`MappingResolver::resolve`].
#[derive(Debug, Default)]
pub struct ResolvedMappings {
    pub morph: Vec<MorphBinding>,
    pub channel: Vec<ChannelBinding>,
    pub rotation: Vec<RotationBinding>,
    /// Rows that could not be turned into bindings.
    pub dropped: Vec<ApplicatorError>,
}

impl ResolvedMappings {
    /// Total number of bindings across all kinds.
    pub fn binding_count(&self) -> usize {
        self.morph.len() + self.channel.len() + self.rotation.len()
    }
}

/// Builds bindings for one blend-target mode.
#[derive(Debug, Clone, Copy)]
pub struct MappingResolver {
    mode: BlendTargetMode,
}

impl MappingResolver {
    pub fn new(mode: BlendTargetMode) -> Self {
        Self { mode }
    }

    /// Resolve bindings from a mapping table, or identity bindings over
    /// the given signals when there is none.
    pub fn resolve<S: AsRef<str>>(
        &self,
        morph_signals: &[S],
        rotation_signals: &[S],
        table: Option<&MappingTable>,
    ) -> ResolvedMappings {
        let resolved = match table {
            Some(table) => self.resolve_table(table),
            None => Self::identity(morph_signals, rotation_signals),
        };
        for dropped in &resolved.dropped {
            tracing::warn!("{dropped}");
        }
        tracing::debug!(
            "Resolved {} morph, {} channel, {} rotation bindings ({} rows dropped)",
            resolved.morph.len(),
            resolved.channel.len(),
            resolved.rotation.len(),
            resolved.dropped.len()
        );
        resolved
    }

    fn identity<S: AsRef<str>>(morph_signals: &[S], rotation_signals: &[S]) -> ResolvedMappings {
        let morph = morph_signals
            .iter()
            .map(|signal| MorphBinding {
                signal: signal.as_ref().to_string(),
                target: signal.as_ref().to_string(),
                modifiers: BindingModifiers::IDENTITY,
            })
            .collect();

        let rotation = rotation_signals
            .iter()
            .filter_map(|signal| {
                let signal = signal.as_ref();
                let Some((item, axis)) = identity_rotation(signal) else {
                    tracing::debug!("No identity axis for rotation signal {signal}");
                    return None;
                };
                Some(RotationBinding {
                    signal: signal.to_string(),
                    item: item.to_string(),
                    axis,
                    modifiers: BindingModifiers::IDENTITY,
                })
            })
            .collect();

        ResolvedMappings {
            morph,
            rotation,
            ..Default::default()
        }
    }

    fn resolve_table(&self, table: &MappingTable) -> ResolvedMappings {
        let mut resolved = ResolvedMappings::default();

        for record in table.records() {
            let modifiers = BindingModifiers::from_record(record);
            match record.row_type() {
                RowType::BlendShape if !record.target.is_empty() => {
                    let targets = record
                        .target
                        .split(FAN_OUT_SEPARATOR)
                        .map(str::trim)
                        .filter(|t| !t.is_empty());
                    for target in targets {
                        match self.mode {
                            BlendTargetMode::Morph => resolved.morph.push(MorphBinding {
                                signal: record.name.clone(),
                                target: target.to_string(),
                                modifiers,
                            }),
                            BlendTargetMode::Channel => match split_channel_target(target) {
                                Some((item, channel)) => resolved.channel.push(ChannelBinding {
                                    signal: record.name.clone(),
                                    item: item.to_string(),
                                    channel: channel.to_string(),
                                    modifiers,
                                }),
                                None => resolved.dropped.push(ApplicatorError::mapping_row(
                                    record.row,
                                    format!("channel target '{target}' is not of the form item.channel"),
                                )),
                            },
                        }
                    }
                }
                RowType::Item if !record.target.is_empty() => {
                    match split_item_target(&record.target) {
                        Ok((item, axis)) => resolved.rotation.push(RotationBinding {
                            signal: record.name.clone(),
                            item: item.to_string(),
                            axis,
                            modifiers,
                        }),
                        Err(message) => resolved
                            .dropped
                            .push(ApplicatorError::mapping_row(record.row, message)),
                    }
                }
                _ => {}
            }
        }

        resolved
    }
}

/// `HeadYaw` → (`Head`, Y); `LeftEyePitch` → (`LeftEye`, X); `*Roll` → Z.
fn identity_rotation(signal: &str) -> Option<(&str, Axis)> {
    [("Yaw", Axis::Y), ("Pitch", Axis::X), ("Roll", Axis::Z)]
        .into_iter()
        .find_map(|(suffix, axis)| signal.strip_suffix(suffix).map(|item| (item, axis)))
}

/// `item.channel` with exactly one dot and both parts present.
fn split_channel_target(target: &str) -> Option<(&str, &str)> {
    let (item, channel) = target.split_once('.')?;
    if item.is_empty() || channel.is_empty() || channel.contains('.') {
        return None;
    }
    Some((item, channel))
}

/// Item rows end in a separator and an axis letter: `Head.Y`, `LeftEye_X`.
fn split_item_target(target: &str) -> Result<(&str, Axis), String> {
    let mut tail = target.char_indices().rev();
    let (_, letter) = tail.next().ok_or_else(|| "empty item target".to_string())?;
    let Some((separator_at, _)) = tail.next() else {
        return Err(format!(
            "item target '{target}' is too short to hold an item and an axis"
        ));
    };
    let axis = Axis::from_letter(letter).ok_or_else(|| {
        format!("item target '{target}' ends in '{letter}', expected an X, Y or Z axis")
    })?;
    Ok((&target[..separator_at], axis))
}
