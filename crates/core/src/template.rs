//! Prompt template for character reference portraits.

/// Build an image prompt for a character from its name and description.
///
/// The wording asks for a clean, isolated full-body portrait so the result
/// works as a reference image for later panels.
pub fn character_prompt_template(name: &str, description: &str) -> String {
    format!(
        "Character reference sheet of {name}: {description}. \
         Full body, front-facing neutral pose, plain light background, \
         even lighting. Professional comic book art with clean lines and \
         vibrant colors. No text, no speech bubbles.",
        name = name.trim(),
        description = description.trim().trim_end_matches('.'),
    )
}
