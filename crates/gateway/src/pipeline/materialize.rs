//! Phase 5 unit of work: fill one draft's layout fields and substitute them
//! into the template.

use std::collections::BTreeMap;

use orpheus_domain::slides::SlideDraft;
use orpheus_domain::Result;
use serde_json::Value;

use super::complete_json;
use crate::layouts::{safe_substitute, LayoutTemplate};
use crate::state::AppState;

fn content_prompt(draft: &SlideDraft, layout: &LayoutTemplate) -> String {
    let schema_explanation = layout
        .schema
        .iter()
        .map(|(field, description)| format!("- {field}: {description}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a helpful assistant that creates concise and engaging \
         presentation slides. The slide should be clear and to the point. \
         Use bullet points where appropriate for content fields. We are \
         using sli.dev for slide rendering.\n\
         \n\
         You must return structured JSON data used to populate a slide \
         template. Return a single JSON object whose keys are exactly the \
         template fields below, every value a string.\n\
         \n\
         Create slide content based on the following text:\n{content}\n\
         \n\
         This is slide number {index}.\n\
         Layout: {layout}\n\
         Template schema explanation:\n{schema_explanation}",
        content = draft.content,
        index = draft.index,
        layout = layout.name,
    )
}

/// Materialize one slide draft into its final Markdown body.
///
/// A layout with an empty field schema needs no model call: the template is
/// the slide. Non-string JSON values are stringified rather than rejected;
/// fields the model omitted substitute as empty strings.
pub async fn materialize_slide(state: &AppState, draft: &SlideDraft) -> Result<String> {
    let layout = state.layouts.get_or_default(&draft.layout_name);
    if layout.schema.is_empty() {
        return Ok(layout.template.to_owned());
    }

    let prompt = content_prompt(draft, layout);
    let fields: serde_json::Map<String, Value> = complete_json(
        state.llm.as_ref(),
        &state.config.llm.slidesgen_model,
        &prompt,
        3,
    )
    .await?;

    let values: BTreeMap<String, String> = fields
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (key, text)
        })
        .collect();

    Ok(safe_substitute(layout.template, &values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layouts::LayoutCatalog;

    #[test]
    fn content_prompt_explains_the_schema() {
        let catalog = LayoutCatalog::default();
        let draft = SlideDraft {
            index: 2,
            content: "Title: loop bodies".into(),
            layout_name: "default".into(),
        };
        let p = content_prompt(&draft, catalog.get_or_default("default"));
        assert!(p.contains("slide number 2"));
        assert!(p.contains("- headline: "));
        assert!(p.contains("Title: loop bodies"));
    }
}
