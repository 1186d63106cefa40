//! Scene prompts: free-form text or a tagged script + visual composite.
//!
//! Composites produced by the story pipeline are kept as structured values.
//! Text typed by a user or returned by the text model goes through
//! [`ScenePrompt::parse`], which recognizes the rendered form:
//!
//! ```text
//! [HOOK] Script: "Dialogue in the target language"
//!
//! Visual Prompt (Veo): English visual description
//! ```

use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::SceneRole;

static VISUAL_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)visual\s+prompt(?:\s*\(\s*veo\s*\))?\s*:").expect("valid visual marker regex")
});

static SCRIPT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)script\s*:").expect("valid script marker regex"));

static ROLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[\s*([A-Za-z]+)\s*\]").expect("valid role tag regex"));

const OPENING_QUOTES: &[char] = &['"', '\u{201C}', '\''];
const CLOSING_QUOTES: &[char] = &['"', '\u{201D}', '\''];

/// Localized spoken script paired with an English visual description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CompositePrompt {
    /// Narrative role tag, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<SceneRole>,

    /// Dialogue in the target language; empty when the text had none
    pub script: String,

    /// English visual description
    pub visual: String,
}

impl CompositePrompt {
    pub fn new(role: Option<SceneRole>, script: impl Into<String>, visual: impl Into<String>) -> Self {
        Self {
            role,
            script: script.into().trim().to_string(),
            visual: visual.into().trim().to_string(),
        }
    }

    pub fn has_script(&self) -> bool {
        !self.script.is_empty()
    }

    /// Render to the text form understood by [`ScenePrompt::parse`].
    pub fn render(&self) -> String {
        let tag = self
            .role
            .map(|role| format!("[{}] ", role.as_str()))
            .unwrap_or_default();
        format!(
            "{}Script: \"{}\"\n\nVisual Prompt (Veo): {}",
            tag, self.script, self.visual
        )
    }
}

/// Prompt attached to a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScenePrompt {
    /// Free-form text used verbatim as the visual description
    Raw(String),
    /// Structured script + visual pair
    Composite(CompositePrompt),
}

impl ScenePrompt {
    /// Parse free-form text.
    ///
    /// Without a visual-prompt marker the whole text is kept as [`ScenePrompt::Raw`].
    pub fn parse(text: &str) -> Self {
        let Some(marker) = VISUAL_MARKER.find(text) else {
            return ScenePrompt::Raw(text.trim().to_string());
        };

        let head = &text[..marker.start()];
        let visual = &text[marker.end()..];

        let role = ROLE_TAG
            .captures(head)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<SceneRole>().ok());

        let script = SCRIPT_MARKER
            .find(head)
            .map(|m| strip_quotes(head[m.end()..].trim()))
            .unwrap_or_default();

        ScenePrompt::Composite(CompositePrompt::new(role, script, visual))
    }

    /// Text form of the prompt.
    pub fn render(&self) -> String {
        match self {
            ScenePrompt::Raw(text) => text.clone(),
            ScenePrompt::Composite(composite) => composite.render(),
        }
    }

    /// English visual description (the whole text for raw prompts).
    pub fn visual(&self) -> &str {
        match self {
            ScenePrompt::Raw(text) => text,
            ScenePrompt::Composite(composite) => &composite.visual,
        }
    }

    /// Spoken script, when present.
    pub fn script(&self) -> Option<&str> {
        match self {
            ScenePrompt::Composite(composite) if composite.has_script() => Some(&composite.script),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ScenePrompt::Raw(text) => text.trim().is_empty(),
            ScenePrompt::Composite(composite) => {
                composite.visual.is_empty() && composite.script.is_empty()
            }
        }
    }
}

impl Default for ScenePrompt {
    fn default() -> Self {
        ScenePrompt::Raw(String::new())
    }
}

impl From<CompositePrompt> for ScenePrompt {
    fn from(composite: CompositePrompt) -> Self {
        ScenePrompt::Composite(composite)
    }
}

/// Remove one pair of surrounding straight or curly quotes.
fn strip_quotes(text: &str) -> String {
    let text = text.strip_prefix(OPENING_QUOTES).unwrap_or(text);
    let text = text.strip_suffix(CLOSING_QUOTES).unwrap_or(text);
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rendered_composite() {
        let text = "[PROBLEM] Script: \"Kulit kering terus?\"\n\nVisual Prompt (Veo): A woman frowning at a mirror";
        let parsed = ScenePrompt::parse(text);

        assert_eq!(
            parsed,
            ScenePrompt::Composite(CompositePrompt::new(
                Some(SceneRole::Problem),
                "Kulit kering terus?",
                "A woman frowning at a mirror",
            ))
        );
        assert_eq!(parsed.script(), Some("Kulit kering terus?"));
    }

    #[test]
    fn test_parse_curly_quotes_and_plain_marker() {
        let text = "Script: \u{201C}Ayo coba sekarang!\u{201D}\nVisual Prompt: Close-up of the bottle";
        let parsed = ScenePrompt::parse(text);
        assert_eq!(parsed.script(), Some("Ayo coba sekarang!"));
        assert_eq!(parsed.visual(), "Close-up of the bottle");
    }

    #[test]
    fn test_parse_keeps_apostrophes_inside_script() {
        let parsed = ScenePrompt::parse("Script: \"Don't miss it\" Visual Prompt (Veo): Smiling man");
        assert_eq!(parsed.script(), Some("Don't miss it"));
    }

    #[test]
    fn test_parse_without_marker_is_raw() {
        let parsed = ScenePrompt::parse("  Slow pan across a sunny kitchen  ");
        assert_eq!(parsed, ScenePrompt::Raw("Slow pan across a sunny kitchen".to_string()));
        assert_eq!(parsed.visual(), "Slow pan across a sunny kitchen");
        assert_eq!(parsed.script(), None);
    }

    #[test]
    fn test_marker_without_script_is_visual_only() {
        let parsed = ScenePrompt::parse("Visual Prompt (Veo): Rain on a window");
        assert_eq!(parsed.script(), None);
        assert_eq!(parsed.visual(), "Rain on a window");
    }

    #[test]
    fn test_parse_render_parse_is_stable() {
        let inputs = [
            "[HOOK] Script: \"Halo semua!\"\n\nVisual Prompt (Veo): Girl waving",
            "script: 'Quick tip'   visual prompt (veo):   Macro of serum drop  ",
            "Script: \u{201C}Sale ends today\u{201D}\n\nVisual Prompt: Countdown on phone",
            "Visual Prompt (Veo): Only visuals here",
        ];

        for input in inputs {
            let first = ScenePrompt::parse(input);
            let second = ScenePrompt::parse(&first.render());
            assert_eq!(first, second, "unstable for {input:?}");
        }
    }

    #[test]
    fn test_is_empty() {
        assert!(ScenePrompt::default().is_empty());
        assert!(!ScenePrompt::Raw("x".into()).is_empty());
    }
}
