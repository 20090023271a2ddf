//! Prompt policy for the hosted speech model.

use super::TranscriptionContext;

/// True when the context asks for translation rather than verbatim
/// transcription: a target language is set and differs from the source.
pub fn wants_translation(ctx: &TranscriptionContext) -> bool {
    let target = ctx.target_language.trim();
    if target.is_empty() || target.eq_ignore_ascii_case("none") {
        return false;
    }
    !target.eq_ignore_ascii_case(ctx.source_language.trim())
}

fn wants_language_detection(ctx: &TranscriptionContext) -> bool {
    let source = ctx.source_language.trim();
    source.is_empty()
        || source.eq_ignore_ascii_case("auto")
        || source.eq_ignore_ascii_case("auto-detect")
}

/// Build the instruction text sent alongside one audio chunk.
///
/// The model is told to return raw text only, to continue from the prior
/// transcript window rather than restart mid-sentence, and to return
/// nothing at all for non-speech audio. The last rule matters: without it
/// generative models invent plausible text over silence.
pub fn build_prompt(ctx: &TranscriptionContext) -> String {
    let source_line = if wants_language_detection(ctx) {
        "Detect the spoken language.".to_string()
    } else {
        format!("Source language: {}.", ctx.source_language.trim())
    };

    let task_line = if wants_translation(ctx) {
        format!(
            "Translate the speech to {}. Output ONLY the translated text.",
            ctx.target_language.trim()
        )
    } else {
        "Transcribe exactly what is said.".to_string()
    };

    let mut prompt = format!(
        "Task: Speech-to-text.\n{}\n{}\n",
        source_line, task_line
    );

    if !ctx.prior_text.trim().is_empty() {
        prompt.push_str(&format!(
            "The transcript so far ends with: \"{}\". Continue naturally from \
             there without repeating it.\n",
            ctx.prior_text.trim()
        ));
    }

    prompt.push_str(
        "Rules:\n\
         1. Output ONLY the raw text, with normal punctuation and capitalization.\n\
         2. No timestamps, no speaker labels, no introductory phrases.\n\
         3. If no speech is detected, output nothing.\n\
         4. Do not describe background noise (e.g. [music], [applause]).",
    );

    prompt
}
