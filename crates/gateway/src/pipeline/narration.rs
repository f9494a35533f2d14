//! Phase 7: per-slide narration, generated sequentially so every slide's
//! text can avoid repeating what earlier slides already said.

use orpheus_domain::prompt::{PromptRequest, SlideTask};
use orpheus_domain::script::LectureScript;
use orpheus_domain::slides::{SlideDraft, SlideStructure};
use orpheus_domain::status::{AvatarElementStatus, StatusPatch, StepStatus};

use crate::state::AppState;

fn narration_prompt(
    request: &PromptRequest,
    script: &LectureScript,
    history: &str,
    page: &SlideDraft,
    position: usize,
    total: usize,
) -> String {
    let mut prompt = format!(
        "You are a lecturer recording the narration for one presentation \
         slide. Speak naturally, in first person, addressing the student \
         directly.\n\
         \n\
         Student persona: {persona}\n\
         \n\
         Full lecture script:\n{script}\n\
         \n\
         Narration of previous slides (do not repeat it):\n{history}\n\
         \n\
         Current slide content:\n{content}\n",
        persona = request.user_persona.prompt_summary(),
        script = script.text,
        history = if history.is_empty() { "(none)" } else { history },
        content = page.content,
    );

    if position == 0 {
        prompt.push_str(
            "\nThis is the first slide: open with a short greeting and \
             introduce the topic of the lecture.\n",
        );
    } else if position + 1 == total {
        prompt.push_str(
            "\nThis is the last slide: wrap up with a brief summary and say \
             goodbye to the student.\n",
        );
    }

    prompt.push_str(
        "\nWrite the narration for the current slide as one plain text \
         paragraph. No headings, no markdown, no stage directions.",
    );
    prompt
}

/// Generate narration slide by slide and feed the worker queue as each one
/// lands; the worker starts rendering slide 1 while slide 2 is still being
/// written. A failed narration marks that slide's audio slot FAILED and
/// moves on.
pub async fn generate_and_enqueue(
    state: &AppState,
    request: &PromptRequest,
    script: &LectureScript,
    structure: &SlideStructure,
) {
    let prompt_id = request.prompt_id;
    let total = structure.pages.len();
    if total == 0 {
        tracing::warn!(%prompt_id, "empty slide structure, no narrations to generate");
        return;
    }

    state.video_jobs.start(
        prompt_id,
        total as u32,
        state.public_folder_url(prompt_id),
    );

    let mut history = String::new();
    for (position, page) in structure.pages.iter().enumerate() {
        let prompt = narration_prompt(request, script, &history, page, position, total);
        let narration = match state
            .llm
            .complete(&state.config.llm.slidesgen_model, &prompt)
            .await
        {
            Ok(text) => text.trim().to_owned(),
            Err(err) => {
                tracing::error!(%prompt_id, slide = position + 1, %err, "narration generation failed");
                state.status.update(
                    prompt_id,
                    &StatusPatch::avatar_slot(
                        position,
                        AvatarElementStatus {
                            audio: StepStatus::Failed,
                            video: StepStatus::NotStarted,
                        },
                    ),
                );
                state.video_jobs.task_finished(prompt_id, true);
                continue;
            }
        };

        history.push_str(&format!("Slide {} Narration: {}\n", position + 1, narration));

        let task = SlideTask {
            prompt_id,
            slide_index: (position + 1) as u32,
            narration_text: narration,
            persona: request.user_persona.clone(),
            course_id: request.course_id.clone(),
        };
        if let Err(err) = state.worker.enqueue(task) {
            tracing::error!(%prompt_id, %err, "slide worker queue closed, stopping narration");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orpheus_domain::persona::{Language, Persona, Preferences, Role};
    use uuid::Uuid;

    fn fixture() -> (PromptRequest, LectureScript, SlideDraft) {
        (
            PromptRequest {
                prompt_id: Uuid::new_v4(),
                course_id: "cs001".into(),
                prompt: "Explain for-loops".into(),
                user_persona: Persona {
                    language: Language::English,
                    preferences: Preferences::default(),
                    enrolled_courses: vec![],
                    role: Role::Student,
                },
            },
            LectureScript {
                text: "Loops repeat things.".into(),
                assets: vec![],
            },
            SlideDraft {
                index: 1,
                content: "Title: Loops".into(),
                layout_name: "default".into(),
            },
        )
    }

    #[test]
    fn first_slide_gets_an_introduction() {
        let (request, script, page) = fixture();
        let p = narration_prompt(&request, &script, "", &page, 0, 3);
        assert!(p.contains("first slide"));
        assert!(!p.contains("last slide"));
    }

    #[test]
    fn last_slide_gets_a_farewell() {
        let (request, script, page) = fixture();
        let p = narration_prompt(&request, &script, "earlier narration", &page, 2, 3);
        assert!(p.contains("last slide"));
        assert!(p.contains("earlier narration"));
    }

    #[test]
    fn middle_slides_get_neither() {
        let (request, script, page) = fixture();
        let p = narration_prompt(&request, &script, "", &page, 1, 3);
        assert!(!p.contains("first slide"));
        assert!(!p.contains("last slide"));
    }

    #[test]
    fn single_slide_deck_gets_the_introduction() {
        // position 0 wins over "last" for a one-slide deck.
        let (request, script, page) = fixture();
        let p = narration_prompt(&request, &script, "", &page, 0, 1);
        assert!(p.contains("first slide"));
    }
}
