//! Multimodal prompt assembly for panel images.
//!
//! Part order is fixed: main instructions, then one label + image pair
//! per character reference, then one label + image pair per prior panel,
//! oldest first. Prior panels are numbered by distance from the panel
//! being drawn, so the most recent one is "1 ago".

use panelsmith_core::model::{CharacterReference, PriorPanel, PromptPart};

const STYLE_DIRECTIVE: &str = "Style: Professional comic book art with clean lines, vibrant colors, and dynamic composition. Do NOT include any speech bubbles, text bubbles, dialogue, or written text in the image - the user will add these manually later.";

const REFERENCE_DIRECTIVE: &str = "Context: You will be provided with reference images of characters that appear in this scene. IMPORTANT: Use these reference images to maintain visual consistency for character faces and body types only. The characters' faces, facial features, hair, skin tone, and body proportions should match the reference images exactly. However, their clothing, poses, actions, and expressions should adapt according to the current scene context and narrative flow.";

const TASK_DIRECTIVE: &str = "Use the exact same drawing/cartoon style as used in reference images.\nTask: Create a single comic book style panel image that depicts the described scene using the provided references. Remember: Keep character faces and body types consistent with reference images, but allow clothing, poses, actions, and expressions to change based on the scene requirements and narrative flow.";

/// Distance of the prior panel at `index` from the panel being drawn.
pub fn panels_ago(prior_len: usize, index: usize) -> usize {
    prior_len - index
}

pub fn reference_label(name: &str) -> String {
    format!("{name}'s character base image reference:")
}

pub fn prior_panel_label(ago: usize) -> String {
    format!("Previous panel {ago} ago from this comic sequence:")
}

/// The main instruction text.
pub fn panel_instructions(scene: &str, prior: &[PriorPanel]) -> String {
    let mut text = format!(
        "Generate a comic book panel illustration for: \"{scene}\".\n\n{STYLE_DIRECTIVE}\n\n{REFERENCE_DIRECTIVE}"
    );

    if !prior.is_empty() {
        text.push_str(&format!(
            "\n\nPrevious Context: You will be provided with {} previous panel image(s) from this comic sequence in chronological order:",
            prior.len()
        ));
        for (index, panel) in prior.iter().enumerate() {
            text.push_str(&format!(
                "\n- Panel {} ago: \"{}\"",
                panels_ago(prior.len(), index),
                panel.scene
            ));
        }
        text.push_str(&format!(
            "\n\nGenerate a coherent image for the current scene \"{scene}\" that maintains visual and narrative consistency with the previous panels. Ensure the art style, lighting, and overall visual flow create a smooth progression. Study the sequence of events and character development. Characters should maintain their face and body consistency from reference images, but their clothing, poses, and actions should evolve naturally through the narrative sequence."
        ));
    }

    text.push_str("\n\n");
    text.push_str(TASK_DIRECTIVE);
    text
}

/// Build the ordered prompt parts for one panel.
///
/// `prior` must be in chronological order (oldest first).
pub fn build_panel_prompt(
    scene: &str,
    references: &[CharacterReference],
    prior: &[PriorPanel],
) -> Vec<PromptPart> {
    let mut parts = Vec::with_capacity(1 + 2 * (references.len() + prior.len()));
    parts.push(PromptPart::Text(panel_instructions(scene, prior)));

    for reference in references {
        parts.push(PromptPart::Text(reference_label(&reference.name)));
        parts.push(PromptPart::Image(reference.image.clone()));
    }

    for (index, panel) in prior.iter().enumerate() {
        parts.push(PromptPart::Text(prior_panel_label(panels_ago(
            prior.len(),
            index,
        ))));
        parts.push(PromptPart::Image(panel.image.clone()));
    }

    parts
}
