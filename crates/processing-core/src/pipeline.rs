//! Apply pipeline.
//!
//! Runs one application of a capture take onto a scene target:
//! root resolution and pre-flight checks, then reading, calibration,
//! mapping, cadence and traversal into a keyframe plan, and finally the
//! commit of that plan to the host's keyframe sink.

use std::path::Path;

use serde::{Deserialize, Serialize};

use applicator_capture_model::keyframes::KeyframeSink;
use applicator_capture_model::mapping_table::MappingTable;
use applicator_capture_model::scene::{NodeId, NodeKind, SceneView, TargetNode};
use applicator_capture_model::signals::{ARKIT_BLENDSHAPES, ARKIT_ROTATIONS};
use applicator_capture_model::take::Take;
use applicator_common::clock::FrameRate;
use applicator_common::config::{ApplyConfig, CaptureFileType};
use applicator_common::error::{ApplicatorError, ApplicatorResult};

use crate::cadence::CadencePattern;
use crate::mapping::MappingResolver;
use crate::neutral::NeutralProfile;
use crate::transform::SignalTransformer;
use crate::walker::{TargetWalker, WalkMode, WalkOutcome};

/// Target and frame rate that passed pre-flight validation.
#[derive(Debug, Clone)]
pub struct Preflight<N> {
    pub root: N,
    pub rate: FrameRate,
}

/// A fully planned run, not yet committed.
#[derive(Debug, Clone)]
pub struct PlannedApply {
    pub root: NodeId,
    pub root_name: String,
    pub rate: FrameRate,
    /// Capture frames read.
    pub capture_frames: usize,
    /// Output frames each binding produces.
    pub output_frames: usize,
    /// Mapping rows dropped during resolution.
    pub dropped_rows: usize,
    /// Take the keys are grouped into (actor roots only).
    pub take: Option<String>,
    /// Whether the actor already owns `take`.
    pub take_exists: bool,
    pub outcome: WalkOutcome,
}

/// Result of a committed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplySummary {
    pub root: String,
    pub mode: WalkMode,
    pub rate: FrameRate,
    pub output_frames: usize,
    pub bindings_applied: usize,
    pub keys_written: usize,
    pub dropped_rows: usize,
    pub take: Option<String>,
    pub take_created: bool,
}

/// Applies capture data according to one [`ApplyConfig`].
pub struct Applicator {
    config: ApplyConfig,
}

impl Applicator {
    pub fn new(config: ApplyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApplyConfig {
        &self.config
    }

    /// Resolve the root target and validate the run without reading any
    /// capture data. Every problem found is reported in one error.
    pub fn preflight<'s, S: SceneView>(
        &self,
        scene: &'s S,
    ) -> ApplicatorResult<Preflight<S::Node<'s>>> {
        let root = resolve_root(scene, self.config.target_name())?;

        let mut issues = Vec::new();
        let rate = FrameRate::from_fps(scene.fps());
        if rate.is_none() {
            issues.push(format!(
                "Unsupported frame rate {}. Supported frame rates: {}",
                scene.fps(),
                FrameRate::supported_list()
            ));
        }

        let file_type = self.config.capture_file_type;
        check_file(
            &mut issues,
            "Capture File",
            Some(self.config.capture_path.as_path()),
            true,
            file_type.extension(),
            file_type.extension_label(),
        );
        check_file(
            &mut issues,
            "Neutral File",
            self.config.neutral_path.as_deref(),
            false,
            file_type.extension(),
            file_type.extension_label(),
        );
        check_file(
            &mut issues,
            "Mapping File",
            self.config.mapping_path.as_deref(),
            false,
            file_type.extension(),
            file_type.extension_label(),
        );

        if let Some(take) = self.config.take_name() {
            if has_take(&root, take) && !self.config.append_to_existing_take {
                issues.push(format!(
                    "Take \"{take}\" already exists for \"{}\". Enable appending to add capture data to it",
                    root.name()
                ));
            }
        }

        match rate {
            Some(rate) if issues.is_empty() => Ok(Preflight { root, rate }),
            _ => Err(ApplicatorError::validation(issues.join("; "))),
        }
    }

    /// Read inputs and plan every key without touching the sink.
    pub fn plan<S: SceneView>(&self, scene: &S) -> ApplicatorResult<PlannedApply> {
        let Preflight { root, rate } = self.preflight(scene)?;
        let config = &self.config;
        tracing::info!(
            "Applying {} to '{}' ({}, {} fps, {} targets)",
            config.capture_path.display(),
            root.name(),
            config.capture_file_type,
            rate,
            config.blend_target
        );

        let capture = Take::read(&config.capture_path)?;
        let neutral_take = config.neutral_path.as_ref().map(Take::read).transpose()?;
        let table = config
            .mapping_path
            .as_ref()
            .map(MappingTable::read)
            .transpose()?;

        let morph_signals = catalogue_signals(&capture, &ARKIT_BLENDSHAPES);
        let rotation_signals = catalogue_signals(&capture, &ARKIT_ROTATIONS);

        let neutral = match &neutral_take {
            Some(take) => {
                let calibrated = catalogue_signals(take, &ARKIT_BLENDSHAPES);
                NeutralProfile::compute(&calibrated, Some(take))?
            }
            None => NeutralProfile::zero(&morph_signals),
        };

        let mappings = MappingResolver::new(config.blend_target).resolve(
            &morph_signals,
            &rotation_signals,
            table.as_ref(),
        );

        let cadence = CadencePattern::for_take(rate, capture.len());
        let output_frames = cadence.output_frame_count(capture.len(), config.skip_frames);
        tracing::info!(
            "Read {} capture frames; {} output frames from frame {}",
            capture.len(),
            output_frames,
            config.start_frame
        );

        let transformer =
            SignalTransformer::new(&capture, &cadence, config.start_frame, config.skip_frames);
        let walker = TargetWalker::new(&mappings, &neutral, transformer, config.blend_target)
            .with_take(config.take_name());
        let outcome = walker.walk(&root)?;

        let take = match outcome.mode {
            WalkMode::Actor => config.take_name().map(str::to_string),
            WalkMode::Item => None,
        };
        let take_exists = take.as_deref().is_some_and(|t| has_take(&root, t));

        Ok(PlannedApply {
            root: root.id(),
            root_name: root.name().to_string(),
            rate,
            capture_frames: capture.len(),
            output_frames,
            dropped_rows: mappings.dropped.len(),
            take,
            take_exists,
            outcome,
        })
    }

    /// Plan the run, then write it to `sink`.
    pub fn run<S: SceneView, K: KeyframeSink + ?Sized>(
        &self,
        scene: &S,
        sink: &mut K,
    ) -> ApplicatorResult<ApplySummary> {
        let planned = self.plan(scene)?;

        let take_created = match &planned.take {
            Some(take) if planned.take_exists => {
                tracing::info!(
                    "Adding keys to existing take '{}' on '{}'",
                    take,
                    planned.root_name
                );
                false
            }
            Some(take) => {
                let created = sink.ensure_take(planned.root, take)?;
                if created {
                    tracing::info!("Created take '{}' on '{}'", take, planned.root_name);
                }
                created
            }
            None => false,
        };

        let keys_written = planned.outcome.plan.commit(sink)?;
        tracing::info!(
            "Applied {} bindings to '{}': {} keys",
            planned.outcome.bindings_applied,
            planned.root_name,
            keys_written
        );

        Ok(ApplySummary {
            root: planned.root_name,
            mode: planned.outcome.mode,
            rate: planned.rate,
            output_frames: planned.output_frames,
            bindings_applied: planned.outcome.bindings_applied,
            keys_written,
            dropped_rows: planned.dropped_rows,
            take: planned.take,
            take_created,
        })
    }
}

/// Pick the root target: a named actor, else the selection.
pub fn resolve_root<'s, S: SceneView>(
    scene: &'s S,
    target_name: Option<&str>,
) -> ApplicatorResult<S::Node<'s>> {
    if let Some(name) = target_name.map(str::trim).filter(|n| !n.is_empty()) {
        let actors = scene.actors();
        let available: Vec<String> = actors.iter().map(|a| a.name().to_string()).collect();
        return actors
            .into_iter()
            .find(|actor| actor.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                ApplicatorError::validation(format!(
                    "\"{name}\" not in scene. Available actors: {}",
                    available.join(", ")
                ))
            });
    }

    let mut selection = scene.selection();
    match selection.len() {
        1 => Ok(selection.remove(0)),
        // The scene root itself is sometimes part of the selection.
        2 => Ok(selection.remove(1)),
        _ => Err(ApplicatorError::validation(
            "First select a target from the scene",
        )),
    }
}

/// Whether `node` is an actor owning a take named `take`.
fn has_take<N: TargetNode>(node: &N, take: &str) -> bool {
    node.kind() == NodeKind::Actor
        && node.takes().iter().any(|t| t.eq_ignore_ascii_case(take))
}

/// Record a problem with an input file path, if any.
fn check_file(
    issues: &mut Vec<String>,
    label: &str,
    path: Option<&Path>,
    required: bool,
    extension: &str,
    extension_label: &str,
) {
    let text = path
        .map(|p| p.to_string_lossy().trim().to_string())
        .unwrap_or_default();
    if text.is_empty() {
        if required {
            issues.push(format!("{label} is required"));
        }
        return;
    }
    if !Path::new(&text).exists() {
        issues.push(format!("Specified {label} does not exist: {text}"));
    } else if !text.to_lowercase().ends_with(extension) {
        issues.push(format!(
            "Incorrect {label} type. Please select a {extension_label} file."
        ));
    }
}

/// Catalogue signals recorded by `take`, in catalogue order. Missing ones
/// are logged.
fn catalogue_signals(take: &Take, catalogue: &[&'static str]) -> Vec<&'static str> {
    let (present, missing): (Vec<&'static str>, Vec<&'static str>) =
        catalogue.iter().copied().partition(|signal| take.has_signal(signal));
    if !missing.is_empty() {
        tracing::warn!(
            "{} lacks {} catalogue signals: {}",
            take.source().display(),
            missing.len(),
            missing.join(", ")
        );
    }
    present
}

/// File type a path's extension suggests, if any.
pub fn file_type_for(path: &Path) -> Option<CaptureFileType> {
    let text = path.to_string_lossy().to_lowercase();
    [CaptureFileType::LiveLinkFace, CaptureFileType::FaceCap]
        .into_iter()
        .find(|t| text.ends_with(t.extension()))
}
