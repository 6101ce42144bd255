//! Prompt assembly for the four downstream generation tasks.
//!
//! Builders are pure functions of the indexed content: the same scenes and
//! transcript always produce byte-identical prompt text, so a task can be
//! re-run without changing what the model sees.

use thiserror::Error;

use crate::types::Scene;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PromptError {
    #[error("no indexed content available for this task")]
    NothingToAnalyze,
    #[error("question must not be empty")]
    EmptyQuestion,
}

/// Scene descriptions joined one per line, no timestamps. Used where the
/// model only needs to know what was on screen.
fn scene_descriptions(scenes: &[Scene]) -> String {
    scenes
        .iter()
        .map(|s| s.description.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Scene lines with explicit numeric start/end seconds so the model can
/// ground a timestamp in real content.
fn scenes_with_timestamps(scenes: &[Scene]) -> String {
    scenes
        .iter()
        .map(|s| format!("Scene from {}s to {}s: {}", s.start, s.end, s.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Brand/object detection over the visual channel only.
pub fn visual_tags_prompt(scenes: &[Scene]) -> Result<String, PromptError> {
    if scenes.is_empty() {
        return Err(PromptError::NothingToAnalyze);
    }
    Ok(format!(
        "Analyze the following scene descriptions. Identify all recurring brands, \
         logos, named products, and important physical objects. Consolidate similar \
         items. Return a simple, comma-separated list.\n\nDESCRIPTIONS:\n{}",
        scene_descriptions(scenes)
    ))
}

/// Q&A over both channels. Instructs the model to answer in the two-part
/// Answer/Timestamp shape that [`crate::resolve::resolve_answer`] expects.
pub fn question_prompt(
    scenes: &[Scene],
    transcript: &str,
    question: &str,
) -> Result<String, PromptError> {
    if scenes.is_empty() {
        return Err(PromptError::NothingToAnalyze);
    }
    if question.trim().is_empty() {
        return Err(PromptError::EmptyQuestion);
    }
    Ok(format!(
        "You are an AI assistant analyzing a video. Based on the provided visual and \
         audio contexts, answer the user's question.\n\
         Your response MUST be in two parts:\n\
         1. **Answer:** A clear, text-based answer.\n\
         2. **Timestamp:** The single most relevant timestamp (in seconds) from the \
         video that best represents the answer. Return ONLY the number.\n\n\
         ---VISUAL CONTEXT---\n{}\n\
         ---AUDIO CONTEXT---\n{}\n\n\
         QUESTION: \"{}\"",
        scenes_with_timestamps(scenes),
        transcript,
        question.trim()
    ))
}

/// Quotable-line extraction over the spoken-word channel only.
pub fn quotes_prompt(transcript: &str) -> Result<String, PromptError> {
    if transcript.trim().is_empty() {
        return Err(PromptError::NothingToAnalyze);
    }
    Ok(format!(
        "You are a PR expert. Read the following transcript and extract the 5 most \
         memorable, impactful, and quotable sentences. Return them as a simple \
         bulleted list.\n\nTRANSCRIPT:\n{}",
        transcript
    ))
}

/// Social-media campaign copy from both channels. Works as long as at least
/// one channel has content.
pub fn campaign_prompt(scenes: &[Scene], transcript: &str) -> Result<String, PromptError> {
    if scenes.is_empty() && transcript.trim().is_empty() {
        return Err(PromptError::NothingToAnalyze);
    }
    Ok(format!(
        "You are a social media marketing expert. Based on the following video \
         transcript and visual descriptions, create three distinct social media posts \
         to promote it:\n\
         1. A professional post for LinkedIn.\n\
         2. A short, punchy post for Twitter/X.\n\
         3. An engaging caption for Instagram.\n\n\
         Include relevant hashtags for each. Format the output clearly with headings \
         for each platform.\n\n\
         ---VISUAL CONTEXT---\n{}\n\
         ---AUDIO CONTEXT---\n{}",
        scene_descriptions(scenes),
        transcript
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenes() -> Vec<Scene> {
        vec![
            Scene {
                start: 0.0,
                end: 5.0,
                description: "a car".into(),
            },
            Scene {
                start: 5.0,
                end: 12.0,
                description: "a phone reveal".into(),
            },
        ]
    }

    #[test]
    fn prompts_are_idempotent() {
        let s = scenes();
        let a = question_prompt(&s, "hello world", "when?").unwrap();
        let b = question_prompt(&s, "hello world", "when?").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn question_prompt_grounds_scene_timestamps() {
        let prompt = question_prompt(&scenes(), "talk", "when is the reveal?").unwrap();
        assert!(prompt.contains("Scene from 5s to 12s: a phone reveal"));
        assert!(prompt.contains("QUESTION: \"when is the reveal?\""));
    }

    #[test]
    fn quotes_prompt_requires_transcript() {
        assert_eq!(
            quotes_prompt("   ").unwrap_err(),
            PromptError::NothingToAnalyze
        );
    }

    #[test]
    fn visual_prompt_requires_scenes() {
        assert_eq!(
            visual_tags_prompt(&[]).unwrap_err(),
            PromptError::NothingToAnalyze
        );
    }

    #[test]
    fn question_prompt_rejects_blank_question() {
        assert_eq!(
            question_prompt(&scenes(), "t", "  ").unwrap_err(),
            PromptError::EmptyQuestion
        );
    }

    #[test]
    fn campaign_prompt_accepts_single_channel() {
        assert!(campaign_prompt(&scenes(), "").is_ok());
        assert!(campaign_prompt(&[], "some talk").is_ok());
        assert_eq!(
            campaign_prompt(&[], " ").unwrap_err(),
            PromptError::NothingToAnalyze
        );
    }
}
