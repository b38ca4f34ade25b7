//! Prompts for the three generation calls: outline, layouts and alt text.
//!
//! Every builder here is a pure function of its inputs; unit tests inspect
//! the rendered text directly.

use crate::catalog::{self, CONTENT_TYPE_LIST, LAYOUT_TYPE_LIST};
use crate::model::MIN_OUTLINES;

/// Which generation call a prompt is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Outline,
    Layout,
    AltText,
}

/// Role tag of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: Role,
    pub text: String,
}

/// Ordered, role-tagged instruction text for one model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub messages: Vec<PromptMessage>,
}

impl Prompt {
    fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            messages: Vec::new(),
        }
    }

    fn system(mut self, text: impl Into<String>) -> Self {
        self.messages.push(PromptMessage {
            role: Role::System,
            text: text.into(),
        });
        self
    }

    fn user(mut self, text: impl Into<String>) -> Self {
        self.messages.push(PromptMessage {
            role: Role::User,
            text: text.into(),
        });
        self
    }

    /// Text of the last user message, if any.
    pub fn user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.text.as_str())
    }
}

pub const OUTLINE_PERSONA: &str = "You are a helpful AI that generates outlines for presentations.";

pub const LAYOUT_PERSONA: &str = "You generate JSON layouts for presentations.";

pub const ALT_TEXT_PERSONA: &str =
    "You write short, concrete descriptions of photographs for presentation slides.";

/// Upper bound on alt-text length, in words.
pub const ALT_TEXT_MAX_WORDS: usize = 50;

/// Build the outline prompt for a user topic.
pub fn outline_prompt(topic: &str) -> Prompt {
    let instructions = format!(
        r#"Create a coherent and relevant outline for the following prompt: {topic}.
The outline should consist of at least {MIN_OUTLINES} points, with each point written as a single sentence.
Ensure the outline is well-structured and directly related to the topic.
Return the output in the following JSON format:

{{
  "outlines": [
    "Point 1",
    "Point 2",
    "Point 3",
    "Point 4",
    "Point 5",
    "Point 6"
  ]
}}

Ensure that the JSON is valid and properly formatted. Do not include any other text or explanations outside the JSON."#
    );

    Prompt::new(PromptKind::Outline)
        .system(OUTLINE_PERSONA)
        .user(instructions)
}

/// Build the layout prompt for an ordered outline.
pub fn layout_prompt(outlines: &[String]) -> Prompt {
    let numbered = outlines
        .iter()
        .enumerate()
        .map(|(i, point)| format!("{}. {}", i + 1, point))
        .collect::<Vec<_>>()
        .join("\n");

    let instructions = format!(
        r#"You are a highly creative AI that generates JSON-based layouts for presentations. I will provide you with an array of outlines, and for each outline you must generate a unique and creative layout. Use the existing layouts as examples for structure and design, and generate unique designs based on the provided outline.

### Guidelines:
1. Write layouts based on the specific outline provided.
2. Use diverse and engaging designs, ensuring each layout is unique.
3. Adhere to the structure of the existing layouts but add new styles or components if needed.
4. Fill placeholder data into content fields where required.
5. Generate unique image placeholders for the "content" property of image components and also alt text according to the outline.
6. Ensure proper formatting and schema alignment for the output JSON.
7. Every "id" must be a freshly generated uuidv4 and must be unique across the whole output.
8. The "content" of every slide must be a single node of type "column".
9. Leaf components (titles, headings, paragraphs, lists, tables, images, dividers) take a string "content"; "column" and "resizable-column" take an array of components.

### Example Layouts:
{minimal}

### Full Example Layout:
{full}

### Layout Types:
Use only these values for a slide's "type": {layout_types}

### Component Types:
Use only these values for a component's "type": {content_types}

### Image Alt Text:
For every image, write an "alt" that describes a concrete, photorealistic scene relevant to the outline. Avoid abstract or cartoonish descriptions, do not repeat the slide text, and never start with "image of" or "picture of".

### Outlines:
{numbered}

For each outline, generate a layout. Return the output as a JSON array of layout objects and nothing else."#,
        minimal = catalog::minimal_examples(),
        full = catalog::full_example(),
        layout_types = LAYOUT_TYPE_LIST.as_str(),
        content_types = CONTENT_TYPE_LIST.as_str(),
    );

    Prompt::new(PromptKind::Layout)
        .system(LAYOUT_PERSONA)
        .user(instructions)
}

/// Build the alt-text prompt for one image, using its current alt as a hint.
pub fn alt_text_prompt(hint: &str) -> Prompt {
    let instructions = format!(
        r#"Create a highly realistic, professional description of a photograph based on this content description: "{hint}".
The description should be photorealistic, with natural lighting and a clear subject.
Use at most {ALT_TEXT_MAX_WORDS} words.
Do not start with "image of" or "picture of" and do not use those phrases.
Avoid abstract, cartoonish, illustrated or surreal descriptions.
Return only the description text."#
    );

    Prompt::new(PromptKind::AltText)
        .system(ALT_TEXT_PERSONA)
        .user(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentType, LayoutType};

    #[test]
    fn outline_prompt_embeds_topic_and_shape() {
        let p = outline_prompt("Rust in embedded systems");
        assert_eq!(p.kind, PromptKind::Outline);
        assert_eq!(p.messages[0].role, Role::System);
        let text = p.user_text().unwrap();
        assert!(text.contains("Rust in embedded systems"));
        assert!(text.contains("at least 6 points"));
        assert!(text.contains("\"outlines\""));
    }

    #[test]
    fn layout_prompt_embeds_enumerations_and_outlines() {
        let outlines: Vec<String> = ["Intro", "History", "Design", "Tradeoffs", "Use cases", "Conclusion"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let p = layout_prompt(&outlines);
        let text = p.user_text().unwrap();
        for ty in LayoutType::ALL {
            assert!(text.contains(ty.as_str()), "missing layout type {ty}");
        }
        for ty in ContentType::ALL {
            assert!(text.contains(ty.as_str()), "missing content type {ty}");
        }
        assert!(text.contains("1. Intro"));
        assert!(text.contains("6. Conclusion"));
        assert!(text.contains("uuidv4"));
        assert!(text.contains("picture of"));
    }

    #[test]
    fn prompts_are_deterministic() {
        let outlines = vec!["A".to_string(), "B".to_string()];
        assert_eq!(layout_prompt(&outlines), layout_prompt(&outlines));
        assert_eq!(outline_prompt("x"), outline_prompt("x"));
    }

    #[test]
    fn alt_text_prompt_constrains_style() {
        let p = alt_text_prompt("wind turbines at dusk");
        assert_eq!(p.kind, PromptKind::AltText);
        let text = p.user_text().unwrap();
        assert!(text.contains("wind turbines at dusk"));
        assert!(text.contains("at most 50 words"));
        assert!(text.contains("image of"));
        assert!(text.contains("cartoonish"));
    }
}
