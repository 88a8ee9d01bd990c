//! Comic panel domain.

mod model;

pub use model::{
    Category, FAILED_BODY, FAILED_TITLE, FrameScript, ImageRef, PLACEHOLDER_BODY,
    PLACEHOLDER_TITLE, Panel, PanelScript, PanelStage, Resource, StripFrame,
};
