//! Silence and hallucination filtering.
//!
//! Generative transcription models reliably fabricate boilerplate on
//! silent or ambiguous audio: broadcast sign-offs, subtitle credits,
//! copyright notices, stock pangrams. Rejecting these is a correctness
//! requirement, not cosmetics.

use crate::audio::AudioChunk;

/// Phrases the model is known to invent over silence. Compared against
/// the normalized (lowercased, punctuation-stripped) result text.
const HALLUCINATION_DENYLIST: &[&str] = &[
    "thank you for watching",
    "thanks for watching",
    "thank you so much for watching",
    "thank you for listening",
    "see you in the next video",
    "see you next time",
    "dont forget to like and subscribe",
    "please subscribe to the channel",
    "subtitles by the amara org community",
    "subtitles created by the community",
    "copyright all rights reserved",
    "all rights reserved",
    "the quick brown fox jumps over the lazy dog",
];

/// Pre-filter: a chunk this small cannot hold speech worth sending.
/// Classifying it locally bounds remote call volume.
pub fn is_silence(chunk: &AudioChunk, threshold_bytes: usize) -> bool {
    chunk.pcm_byte_len() < threshold_bytes
}

/// Post-filter: clean up a raw model result and decide whether it is
/// real speech. Returns the cleaned text, or `None` for empty, too-short,
/// or denylisted output.
pub fn screen_result(raw: &str, min_chars: usize) -> Option<String> {
    let text = unwrap_formatting(raw);
    let text = text.trim();

    if text.chars().count() < min_chars.max(1) {
        return None;
    }

    let normalized = normalize(text);
    if HALLUCINATION_DENYLIST
        .iter()
        .any(|phrase| normalized == normalize(phrase))
    {
        return None;
    }

    Some(text.to_string())
}

/// Strip code fences and JSON string wrapping the model sometimes adds
/// despite being told not to.
fn unwrap_formatting(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Some(inner) = strip_code_fence(trimmed) {
        return inner;
    }

    if trimmed.starts_with('"') && trimmed.ends_with('"') {
        if let Ok(unquoted) = serde_json::from_str::<String>(trimmed) {
            return unquoted;
        }
    }

    trimmed.to_string()
}

fn strip_code_fence(text: &str) -> Option<String> {
    let rest = text.strip_prefix("```")?;
    let rest = rest.strip_suffix("```")?;
    // Drop a language tag on the opening fence line, if any.
    let body = match rest.split_once('\n') {
        Some((first_line, body)) if !first_line.contains(' ') => body,
        _ => rest,
    };
    Some(body.trim().to_string())
}

fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true;

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_was_space = false;
        } else if ch == '\'' || ch == '\u{2019}' {
            // Apostrophes vanish so "don't" matches its denylist form "dont".
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }

    out.trim_end().to_string()
}
