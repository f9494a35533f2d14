//! Per-prompt progress record and its sparse patch.
//!
//! `Status::apply` is the deterministic fold at the heart of the status
//! fabric: scalar fields overwrite when present, the avatar list is extended
//! to match the slide structure, and per-slot updates arrive as a map keyed
//! by stringified indices so a patch never has to carry the whole list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::slides::SlideStructure;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Step status
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `NOT_STARTED → IN_PROGRESS → {DONE, FAILED}`. FAILED is terminal for the
/// step; whether it terminates the pipeline is the orchestrator's call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    #[default]
    NotStarted,
    InProgress,
    Done,
    Failed,
}

impl StepStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Progress of one slide's avatar rendering: audio first, then video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AvatarElementStatus {
    pub audio: StepStatus,
    pub video: StepStatus,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Status record
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub step_understanding: StepStatus,
    pub step_lookup: StepStatus,
    pub step_lecture_script_generation: StepStatus,
    pub step_slide_structure_generation: StepStatus,
    /// Count of slides whose content has been materialized.
    pub step_slide_generation: u32,
    pub step_slide_postprocessing: StepStatus,
    /// One slot per slide once the structure is known.
    pub steps_avatar_generation: Vec<AvatarElementStatus>,
    pub lecture_summary: Option<String>,
    pub slide_structure: Option<SlideStructure>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sparse patch
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Sparse form of [`Status`]: omitted fields leave the prior value unchanged.
///
/// `steps_avatar_generation` is keyed by stringified slot index (a BTreeMap
/// so iteration, and therefore conflict resolution, is deterministic).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_understanding: Option<StepStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_lookup: Option<StepStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_lecture_script_generation: Option<StepStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_slide_structure_generation: Option<StepStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_slide_generation: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_slide_postprocessing: Option<StepStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps_avatar_generation: Option<BTreeMap<String, AvatarElementStatus>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lecture_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slide_structure: Option<SlideStructure>,
}

impl StatusPatch {
    /// Patch a single avatar slot (0-based index).
    pub fn avatar_slot(index: usize, slot: AvatarElementStatus) -> Self {
        let mut map = BTreeMap::new();
        map.insert(index.to_string(), slot);
        Self {
            steps_avatar_generation: Some(map),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.step_understanding.is_none()
            && self.step_lookup.is_none()
            && self.step_lecture_script_generation.is_none()
            && self.step_slide_structure_generation.is_none()
            && self.step_slide_generation.is_none()
            && self.step_slide_postprocessing.is_none()
            && self.steps_avatar_generation.is_none()
            && self.lecture_summary.is_none()
            && self.slide_structure.is_none()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// The fold
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

impl Status {
    /// Apply a sparse patch in place.
    ///
    /// Order of operations:
    /// 1. overwrite every scalar field the patch carries;
    /// 2. if a slide structure is known (patched now or earlier) and has more
    ///    pages than avatar slots, extend the slot list with NOT_STARTED
    ///    entries;
    /// 3. apply the per-slot map against the extended list. Keys that do not
    ///    parse as an index or fall out of bounds are logged and dropped.
    ///
    /// Applying the same patch twice yields the same record as applying it
    /// once.
    pub fn apply(&mut self, patch: &StatusPatch) {
        if let Some(v) = patch.step_understanding {
            self.step_understanding = v;
        }
        if let Some(v) = patch.step_lookup {
            self.step_lookup = v;
        }
        if let Some(v) = patch.step_lecture_script_generation {
            self.step_lecture_script_generation = v;
        }
        if let Some(v) = patch.step_slide_structure_generation {
            self.step_slide_structure_generation = v;
        }
        if let Some(v) = patch.step_slide_generation {
            self.step_slide_generation = v;
        }
        if let Some(v) = patch.step_slide_postprocessing {
            self.step_slide_postprocessing = v;
        }
        if let Some(ref v) = patch.lecture_summary {
            self.lecture_summary = Some(v.clone());
        }
        if let Some(ref v) = patch.slide_structure {
            self.slide_structure = Some(v.clone());
        }

        if let Some(structure) = &self.slide_structure {
            if self.steps_avatar_generation.len() < structure.pages.len() {
                self.steps_avatar_generation
                    .resize_with(structure.pages.len(), AvatarElementStatus::default);
            }
        }

        if let Some(slots) = &patch.steps_avatar_generation {
            for (key, slot) in slots {
                match key.parse::<usize>() {
                    Ok(idx) if idx < self.steps_avatar_generation.len() => {
                        self.steps_avatar_generation[idx] = *slot;
                    }
                    Ok(idx) => {
                        tracing::warn!(
                            index = idx,
                            slots = self.steps_avatar_generation.len(),
                            "avatar slot patch out of range, dropping"
                        );
                    }
                    Err(err) => {
                        tracing::warn!(key = %key, %err, "non-numeric avatar slot key, dropping");
                    }
                }
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slides::SlideDraft;

    fn structure(pages: usize) -> SlideStructure {
        SlideStructure {
            pages: (1..=pages as u32)
                .map(|i| SlideDraft {
                    index: i,
                    content: format!("Title: page {i}"),
                    layout_name: "default".into(),
                })
                .collect(),
        }
    }

    #[test]
    fn scalar_overwrite_leaves_omitted_fields() {
        let mut status = Status::default();
        status.apply(&StatusPatch {
            step_understanding: Some(StepStatus::Done),
            ..StatusPatch::default()
        });
        assert_eq!(status.step_understanding, StepStatus::Done);
        assert_eq!(status.step_lookup, StepStatus::NotStarted);
    }

    #[test]
    fn structure_patch_extends_avatar_slots() {
        let mut status = Status::default();
        status.apply(&StatusPatch {
            slide_structure: Some(structure(3)),
            ..StatusPatch::default()
        });
        assert_eq!(status.steps_avatar_generation.len(), 3);
        assert!(status
            .steps_avatar_generation
            .iter()
            .all(|s| s.audio == StepStatus::NotStarted && s.video == StepStatus::NotStarted));
    }

    #[test]
    fn slot_patch_in_same_message_as_structure() {
        // Extension happens before the sparse map is applied.
        let mut status = Status::default();
        let mut slots = BTreeMap::new();
        slots.insert(
            "1".to_string(),
            AvatarElementStatus {
                audio: StepStatus::InProgress,
                video: StepStatus::NotStarted,
            },
        );
        status.apply(&StatusPatch {
            slide_structure: Some(structure(2)),
            steps_avatar_generation: Some(slots),
            ..StatusPatch::default()
        });
        assert_eq!(status.steps_avatar_generation[1].audio, StepStatus::InProgress);
        assert_eq!(status.steps_avatar_generation[0].audio, StepStatus::NotStarted);
    }

    #[test]
    fn out_of_range_slot_key_is_dropped() {
        let mut status = Status::default();
        status.apply(&StatusPatch {
            slide_structure: Some(structure(2)),
            ..StatusPatch::default()
        });

        let patch = StatusPatch::avatar_slot(
            99,
            AvatarElementStatus {
                audio: StepStatus::Done,
                video: StepStatus::Done,
            },
        );
        status.apply(&patch);
        assert_eq!(status.steps_avatar_generation.len(), 2);
        assert!(status
            .steps_avatar_generation
            .iter()
            .all(|s| s.audio == StepStatus::NotStarted));
    }

    #[test]
    fn non_numeric_slot_key_is_dropped() {
        let mut status = Status::default();
        status.apply(&StatusPatch {
            slide_structure: Some(structure(1)),
            ..StatusPatch::default()
        });

        let mut slots = BTreeMap::new();
        slots.insert(
            "first".to_string(),
            AvatarElementStatus {
                audio: StepStatus::Done,
                video: StepStatus::Done,
            },
        );
        status.apply(&StatusPatch {
            steps_avatar_generation: Some(slots),
            ..StatusPatch::default()
        });
        assert_eq!(status.steps_avatar_generation[0].audio, StepStatus::NotStarted);
    }

    #[test]
    fn apply_is_idempotent() {
        let mut once = Status::default();
        let patch = StatusPatch {
            step_lookup: Some(StepStatus::Done),
            slide_structure: Some(structure(2)),
            steps_avatar_generation: Some(BTreeMap::from([(
                "0".to_string(),
                AvatarElementStatus {
                    audio: StepStatus::Done,
                    video: StepStatus::InProgress,
                },
            )])),
            ..StatusPatch::default()
        };
        once.apply(&patch);
        let mut twice = once.clone();
        twice.apply(&patch);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_patch_is_identity() {
        let mut status = Status::default();
        status.apply(&StatusPatch {
            slide_structure: Some(structure(2)),
            step_slide_generation: Some(1),
            ..StatusPatch::default()
        });
        let before = status.clone();
        status.apply(&StatusPatch::default());
        assert_eq!(status, before);
    }

    #[test]
    fn wire_step_values_are_screaming_snake() {
        let json = serde_json::to_value(StepStatus::InProgress).unwrap();
        assert_eq!(json, "IN_PROGRESS");
        let json = serde_json::to_value(StepStatus::NotStarted).unwrap();
        assert_eq!(json, "NOT_STARTED");
    }

    #[test]
    fn patch_deserializes_sparse_wire_form() {
        let patch: StatusPatch = serde_json::from_str(
            r#"{"stepUnderstanding":"DONE","stepsAvatarGeneration":{"0":{"audio":"IN_PROGRESS","video":"NOT_STARTED"}}}"#,
        )
        .unwrap();
        assert_eq!(patch.step_understanding, Some(StepStatus::Done));
        assert!(patch.step_lookup.is_none());
        assert_eq!(patch.steps_avatar_generation.unwrap().len(), 1);
    }
}
