//! Prompt text and response schemas sent to the model.

use chronicle_core::comic::Category;
use serde_json::{Value, json};

pub const PANEL_SCRIPT_INSTRUCTION: &str = r#"
You write the comic column of a satirical newspaper. You are blunt, cynical and allergic to fluff.
For every request produce one comic panel:
- 'title': a short, punchy headline.
- 'article': two or three blunt sentences stating what happened.
- 'imagePrompt': a vivid description of the scene for an illustrator.
- 'resources': two or three real organisations, government programs or references related to the topic,
  each with a 'name', a 'url' and a 'description' of what the resource is.
Answer with JSON only.
"#;

pub const STRIP_SCRIPT_INSTRUCTION: &str = r#"
You turn a newspaper headline into a short sequential comic strip.
Keep it gritty, direct and fast. Every panel gets:
- 'caption': narration or dialogue, one or two short lines.
- 'imagePrompt': a detailed description of the panel for the artist.
Answer with a JSON object holding the array 'panels'.
"#;

pub const CHAT_INSTRUCTION: &str = r#"
You are the Editor-in-Chief of a comic newspaper, chatting with a reader.
You are witty and a little cynical, but helpful and politically neutral.
Explain current events or the comics on the page. Keep answers short and conversational.
"#;

pub const COVER_ART_PROMPT: &str = "Wide cinematic comic book cover art for a newspaper called \
'THE AMERICAN CHRONICLE'. A busy but readable collage of a gavel for politics, a robot arm for \
technology and a ball for sports, merging into a futuristic city skyline. Style: premium digital \
comic art, bold outlines, vivid halftone patterns, dramatic angle.";

pub fn panel_script_prompt(category: Category) -> String {
    format!(
        "Write one comic panel for the '{category}' desk. If no specific news is given, lean on \
         familiar modern tropes of the topic. Return JSON with 'title', 'article', 'imagePrompt' \
         and 'resources'."
    )
}

pub fn strip_script_prompt(title: &str, body: &str) -> String {
    format!("Create a 3-panel comic strip from the headline \"{title}\" and the story \"{body}\".")
}

pub fn panel_image_prompt(directive: &str) -> String {
    format!(
        "A single-panel editorial cartoon. Style: modern digital comic, saturated colours, bold \
         clean black outlines, professional colouring. Scene: {directive}"
    )
}

pub fn panel_script_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "article": { "type": "STRING" },
            "imagePrompt": { "type": "STRING" },
            "resources": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "url": { "type": "STRING" },
                        "description": { "type": "STRING" }
                    },
                    "required": ["name", "url", "description"]
                }
            }
        },
        "required": ["title", "article", "imagePrompt", "resources"]
    })
}

pub fn strip_script_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "panels": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "caption": { "type": "STRING" },
                        "imagePrompt": { "type": "STRING" }
                    },
                    "required": ["caption", "imagePrompt"]
                }
            }
        },
        "required": ["panels"]
    })
}
