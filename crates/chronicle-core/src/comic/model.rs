//! Comic panel domain models.
//!
//! A [`Panel`] is one generated news item of an issue. It is created as a
//! placeholder the moment its workflow starts, then filled in place as the
//! script and the image arrive.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Headline shown while a panel script is still being generated.
pub const PLACEHOLDER_TITLE: &str = "Breaking News...";
/// Body shown while a panel script is still being generated.
pub const PLACEHOLDER_BODY: &str = "Our robots are currently scouring the globe for this story...";
/// Headline of a panel whose script could not be generated.
pub const FAILED_TITLE: &str = "Printing Error";
/// Body of a panel whose script could not be generated.
pub const FAILED_BODY: &str = "The press jammed. Please try refreshing.";

/// News desk a panel is written for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
pub enum Category {
    #[strum(serialize = "Politics")]
    Politics,
    #[strum(serialize = "Technology")]
    Technology,
    #[strum(serialize = "Sports")]
    Sports,
    #[serde(rename = "Current Events")]
    #[strum(serialize = "Current Events")]
    CurrentEvents,
}

impl Category {
    /// The fixed desks of every issue, in display order.
    pub const ALL: [Category; 4] = [
        Category::Politics,
        Category::Technology,
        Category::Sports,
        Category::CurrentEvents,
    ];
}

/// Reference to a generated image that a UI can display directly.
///
/// Generated images arrive inline, so the reference is a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Builds a `data:` URL reference from base64 image bytes.
    pub fn from_inline(mime_type: &str, base64_data: &str) -> Self {
        Self(format!("data:{mime_type};base64,{base64_data}"))
    }

    /// Wraps an already displayable locator.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A real-world link attached to a panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub url: String,
    pub description: String,
}

/// Where a panel is in its generation workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelStage {
    /// Placeholder published, waiting for the script.
    ScriptLoading,
    /// Script merged, waiting for the image.
    ImageLoading,
    /// Script and image both present.
    Ready,
    /// Script present, the image could not be produced.
    ImageMissing,
    /// The script could not be produced; the panel shows the error copy.
    Failed,
}

impl PanelStage {
    pub fn is_loading(self) -> bool {
        matches!(self, Self::ScriptLoading | Self::ImageLoading)
    }
}

/// One frame of a panel's expanded strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StripFrame {
    /// `<panel id>-frame-<position>`
    pub id: String,
    pub position: usize,
    pub caption: String,
    /// Image generation directive, never shown to readers.
    pub directive: String,
    pub image: Option<ImageRef>,
    pub loading: bool,
}

impl StripFrame {
    /// Creates a loading frame for the given parent and position.
    pub fn placeholder(panel_id: &str, position: usize, script: &FrameScript) -> Self {
        Self {
            id: format!("{panel_id}-frame-{position}"),
            position,
            caption: script.caption.clone(),
            directive: script.directive.clone(),
            image: None,
            loading: true,
        }
    }
}

/// The script of one panel as returned by the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelScript {
    pub title: String,
    #[serde(rename = "article", alias = "body")]
    pub body: String,
    #[serde(rename = "imagePrompt", alias = "directive")]
    pub directive: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// The script of one strip frame as returned by the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameScript {
    pub caption: String,
    #[serde(rename = "imagePrompt", alias = "directive")]
    pub directive: String,
}

/// A single generated news comic panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub id: String,
    pub category: Category,
    pub title: String,
    pub body: String,
    /// Image generation directive, never shown to readers.
    pub directive: String,
    /// Display date of the issue (`M/D/YYYY`).
    pub date: String,
    pub stage: PanelStage,
    pub image: Option<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip: Option<Vec<StripFrame>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Resource>>,
}

impl Panel {
    /// Creates the loading placeholder published when a workflow starts.
    pub fn placeholder(category: Category, date: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            category,
            title: PLACEHOLDER_TITLE.to_string(),
            body: PLACEHOLDER_BODY.to_string(),
            directive: String::new(),
            date: date.into(),
            stage: PanelStage::ScriptLoading,
            image: None,
            strip: None,
            resources: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.stage.is_loading()
    }

    /// Merges a generated script; the panel stays loading until its image settles.
    pub fn apply_script(&mut self, script: PanelScript) {
        self.title = script.title;
        self.body = script.body;
        self.directive = script.directive;
        self.resources = Some(script.resources);
        self.stage = PanelStage::ImageLoading;
    }

    /// Settles the image step. `None` is a valid terminal outcome.
    pub fn apply_image(&mut self, image: Option<ImageRef>) {
        self.stage = if image.is_some() {
            PanelStage::Ready
        } else {
            PanelStage::ImageMissing
        };
        self.image = image;
    }

    /// Replaces the content with the fixed printing error copy.
    pub fn mark_failed(&mut self) {
        self.title = FAILED_TITLE.to_string();
        self.body = FAILED_BODY.to_string();
        self.stage = PanelStage::Failed;
    }
}
