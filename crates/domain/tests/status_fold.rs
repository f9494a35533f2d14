//! The Status record must equal a deterministic fold of its patches in
//! arrival order, with the avatar slot list pinned to the slide structure at
//! every observable moment.

use std::collections::BTreeMap;

use orpheus_domain::slides::{SlideDraft, SlideStructure};
use orpheus_domain::status::{AvatarElementStatus, Status, StatusPatch, StepStatus};

fn structure(pages: usize) -> SlideStructure {
    SlideStructure {
        pages: (1..=pages as u32)
            .map(|i| SlideDraft {
                index: i,
                content: format!("Title: chunk {i}"),
                layout_name: "default".into(),
            })
            .collect(),
    }
}

fn slot(audio: StepStatus, video: StepStatus) -> AvatarElementStatus {
    AvatarElementStatus { audio, video }
}

#[test]
fn full_pipeline_fold_matches_patch_sequence() {
    let patches = vec![
        StatusPatch {
            step_understanding: Some(StepStatus::InProgress),
            ..StatusPatch::default()
        },
        StatusPatch {
            step_understanding: Some(StepStatus::Done),
            step_lookup: Some(StepStatus::InProgress),
            ..StatusPatch::default()
        },
        StatusPatch {
            step_lookup: Some(StepStatus::Done),
            step_lecture_script_generation: Some(StepStatus::Done),
            ..StatusPatch::default()
        },
        StatusPatch {
            step_slide_structure_generation: Some(StepStatus::Done),
            slide_structure: Some(structure(2)),
            ..StatusPatch::default()
        },
        StatusPatch::avatar_slot(0, slot(StepStatus::Done, StepStatus::InProgress)),
        StatusPatch {
            step_slide_generation: Some(2),
            lecture_summary: Some("Two slides about loops.".into()),
            ..StatusPatch::default()
        },
    ];

    let mut status = Status::default();
    for patch in &patches {
        status.apply(patch);
        // Invariant: slot count tracks the structure at every step.
        if let Some(s) = &status.slide_structure {
            assert_eq!(status.steps_avatar_generation.len(), s.pages.len());
        }
    }

    assert_eq!(status.step_understanding, StepStatus::Done);
    assert_eq!(status.step_lookup, StepStatus::Done);
    assert_eq!(status.step_lecture_script_generation, StepStatus::Done);
    assert_eq!(status.step_slide_structure_generation, StepStatus::Done);
    assert_eq!(status.step_slide_generation, 2);
    assert_eq!(
        status.steps_avatar_generation[0],
        slot(StepStatus::Done, StepStatus::InProgress)
    );
    assert_eq!(
        status.steps_avatar_generation[1],
        slot(StepStatus::NotStarted, StepStatus::NotStarted)
    );
    assert_eq!(status.lecture_summary.as_deref(), Some("Two slides about loops."));
}

#[test]
fn slot_invariant_survives_out_of_range_patches() {
    let mut status = Status::default();
    status.apply(&StatusPatch {
        slide_structure: Some(structure(2)),
        ..StatusPatch::default()
    });

    // Scenario: a worker for a stale prompt patches slot 99.
    let mut slots = BTreeMap::new();
    slots.insert("99".to_string(), slot(StepStatus::Done, StepStatus::Done));
    slots.insert("1".to_string(), slot(StepStatus::InProgress, StepStatus::NotStarted));
    status.apply(&StatusPatch {
        steps_avatar_generation: Some(slots),
        ..StatusPatch::default()
    });

    assert_eq!(status.steps_avatar_generation.len(), 2);
    assert_eq!(
        status.steps_avatar_generation[1],
        slot(StepStatus::InProgress, StepStatus::NotStarted)
    );
}

#[test]
fn structure_growth_extends_but_never_shrinks_slots() {
    let mut status = Status::default();
    status.apply(&StatusPatch {
        slide_structure: Some(structure(1)),
        ..StatusPatch::default()
    });
    status.apply(&StatusPatch::avatar_slot(0, slot(StepStatus::Done, StepStatus::Done)));

    // A later, larger structure extends the list; the finished slot stays.
    status.apply(&StatusPatch {
        slide_structure: Some(structure(3)),
        ..StatusPatch::default()
    });
    assert_eq!(status.steps_avatar_generation.len(), 3);
    assert_eq!(
        status.steps_avatar_generation[0],
        slot(StepStatus::Done, StepStatus::Done)
    );
}

#[test]
fn status_round_trips_through_wire_form() {
    let mut status = Status::default();
    status.apply(&StatusPatch {
        step_understanding: Some(StepStatus::Done),
        slide_structure: Some(structure(1)),
        ..StatusPatch::default()
    });

    let json = serde_json::to_string(&status).unwrap();
    assert!(json.contains("\"stepUnderstanding\":\"DONE\""));
    assert!(json.contains("\"stepsAvatarGeneration\""));

    let back: Status = serde_json::from_str(&json).unwrap();
    assert_eq!(back, status);
}
