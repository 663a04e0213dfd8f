//! The persisted project document and its settings.
//!
//! A document is the serializable root of a project: settings, UI
//! context, raw resources, elements, animations, and the embedded-media
//! table that carries session media across a reload.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::animation::{Animation, AnimationKind};
use crate::element::Element;
use crate::ids::ElementId;
use crate::media::{EmbeddedMedia, MediaRegistry};

/// Current document schema version.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Top-level project document (`.project` payload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    /// Schema version.
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable project name.
    #[serde(default)]
    pub name: String,

    /// Unique project identifier (UUID).
    #[serde(default)]
    pub id: String,

    /// Creation timestamp (RFC 3339).
    #[serde(default)]
    pub created_at: String,

    /// Last modified timestamp (RFC 3339).
    #[serde(default)]
    pub modified_at: String,

    #[serde(default)]
    pub settings: ProjectSettings,

    #[serde(default)]
    pub ui: UiContext,

    /// Raw resources the user imported.
    #[serde(default)]
    pub resources: MediaRegistry,

    /// Scene elements in paint order.
    #[serde(default)]
    pub elements: Vec<Element>,

    #[serde(default)]
    pub animations: Vec<Animation>,

    /// Payloads for elements whose media was session-only at save time.
    #[serde(default)]
    pub embedded_media: Vec<EmbeddedMedia>,
}

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

/// Canvas, timing and export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// Canvas background as a hex string.
    pub background_color: String,

    /// Project length in milliseconds.
    pub max_time_ms: f64,

    /// Timeline frame rate.
    pub fps: u32,

    pub canvas_width: u32,
    pub canvas_height: u32,

    pub export_format: ExportFormat,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            background_color: "#111111".to_string(),
            max_time_ms: 30_000.0,
            fps: 60,
            canvas_width: 800,
            canvas_height: 500,
            export_format: ExportFormat::Mp4,
        }
    }
}

/// Editor UI state worth restoring on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiContext {
    /// Side panel that was open.
    pub selected_menu_option: String,

    /// Element that was selected.
    pub selected_element: Option<ElementId>,
}

impl Default for UiContext {
    fn default() -> Self {
        Self {
            selected_menu_option: "video".to_string(),
            selected_element: None,
        }
    }
}

/// Output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Mp4,
    Webm,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ProjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp4" => Ok(Self::Mp4),
            "webm" => Ok(Self::Webm),
            other => Err(ProjectError::ValidationError {
                message: format!("unknown export format '{other}' (expected mp4 or webm)"),
            }),
        }
    }
}

impl ProjectDocument {
    /// Create an empty document with the given settings.
    pub fn new(name: impl Into<String>, settings: ProjectSettings) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: default_version(),
            name: name.into(),
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now.clone(),
            modified_at: now,
            settings,
            ui: UiContext::default(),
            resources: MediaRegistry::new(),
            elements: Vec::new(),
            animations: Vec::new(),
            embedded_media: Vec::new(),
        }
    }

    /// Refresh the modification timestamp.
    pub fn touch(&mut self) {
        self.modified_at = chrono::Utc::now().to_rfc3339();
    }

    pub fn to_json_vec(&self) -> Result<Vec<u8>, ProjectError> {
        serde_json::to_vec(self).map_err(|source| ProjectError::SerializeError { source })
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ProjectError> {
        serde_json::from_slice(bytes).map_err(|source| ProjectError::ParseError { source })
    }

    pub fn embedded_for(&self, element_id: &ElementId) -> Option<&EmbeddedMedia> {
        self.embedded_media
            .iter()
            .find(|row| &row.element_id == element_id)
    }

    /// Report problems that loading will silently repair or skip.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = vec![];
        let max_time = self.settings.max_time_ms;

        if self.settings.fps == 0 {
            issues.push("Frame rate is zero".to_string());
        }

        for element in &self.elements {
            if !element.time_frame.is_valid_within(max_time) {
                issues.push(format!(
                    "Element '{}' ({}) has time frame [{}, {}] outside 0 <= start < end <= {max_time}",
                    element.name, element.id, element.time_frame.start, element.time_frame.end
                ));
            }
            if let Some(src) = element.media_src() {
                if src.is_ephemeral() && self.embedded_for(&element.id).is_none() {
                    issues.push(format!(
                        "Element '{}' ({}) references session-only media {} with no embedded copy",
                        element.name,
                        element.id,
                        src.describe()
                    ));
                }
            }
        }

        for animation in &self.animations {
            if !self.elements.iter().any(|e| e.id == animation.target_id) {
                issues.push(format!(
                    "Animation {} ({}) targets missing element {}",
                    animation.id,
                    animation.kind_name(),
                    animation.target_id
                ));
            }
            if animation.duration_ms <= 0.0 && animation.kind != AnimationKind::Breathe {
                issues.push(format!(
                    "Animation {} ({}) has non-positive duration",
                    animation.id,
                    animation.kind_name()
                ));
            }
        }

        issues
    }
}

/// Errors that can occur when working with project documents.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Parse error: {source}")]
    ParseError { source: serde_json::Error },

    #[error("Serialize error: {source}")]
    SerializeError { source: serde_json::Error },

    #[error("Invalid project: {message}")]
    ValidationError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::geometry::TimeFrame;
    use crate::media::{MediaKind, MediaRef};

    #[test]
    fn test_document_creation() {
        let doc = ProjectDocument::new("Promo", ProjectSettings::default());
        assert_eq!(doc.name, "Promo");
        assert_eq!(doc.version, DOCUMENT_VERSION);
        assert_eq!(doc.settings.canvas_width, 800);
        assert_eq!(doc.settings.export_format, ExportFormat::Mp4);
        assert!(doc.validate().is_empty());
    }

    #[test]
    fn test_document_json_round_trip() {
        let mut doc = ProjectDocument::new("Round", ProjectSettings::default());
        doc.elements.push(Element::text(
            "Title",
            "Hello",
            32.0,
            700,
            TimeFrame::new(0.0, 5000.0),
        ));
        let bytes = doc.to_json_vec().unwrap();
        let parsed = ProjectDocument::from_json_slice(&bytes).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_legacy_document_fills_defaults() {
        let parsed = ProjectDocument::from_json_slice(br#"{"elements":[]}"#).unwrap();
        assert_eq!(parsed.version, DOCUMENT_VERSION);
        assert_eq!(parsed.settings.fps, 60);
        assert_eq!(parsed.settings.max_time_ms, 30_000.0);
        assert_eq!(parsed.ui.selected_menu_option, "video");
        assert!(parsed.embedded_media.is_empty());
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("MP4".parse::<ExportFormat>().unwrap(), ExportFormat::Mp4);
        assert_eq!("webm".parse::<ExportFormat>().unwrap(), ExportFormat::Webm);
        assert!("gif".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Webm.extension(), "webm");
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut doc = ProjectDocument::new("Broken", ProjectSettings::default());
        let mut image = Element::image(
            "Shot",
            MediaRef::session("blob:1"),
            100.0,
            100.0,
            TimeFrame::new(0.0, 40_000.0),
        );
        doc.elements.push(image.clone());
        doc.animations.push(crate::animation::Animation::fade_in(
            "ghost".into(),
            500.0,
        ));

        let issues = doc.validate();
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().any(|i| i.contains("outside")));
        assert!(issues.iter().any(|i| i.contains("session-only")));
        assert!(issues.iter().any(|i| i.contains("missing element")));

        // An embedded copy makes the session reference acceptable.
        image.time_frame = TimeFrame::new(0.0, 1000.0);
        doc.elements = vec![image.clone()];
        doc.animations.clear();
        doc.embedded_media.push(EmbeddedMedia::new(
            image.id.clone(),
            MediaKind::Image,
            "image/png".to_string(),
            &[1, 2, 3],
        ));
        assert!(doc.validate().is_empty());
    }
}
