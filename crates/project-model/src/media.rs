//! Media references and the raw-resource registry.
//!
//! A [`MediaRef`] is either durable (survives a save/load cycle) or tied
//! to the current session. Session handles are resolved to bytes when a
//! project is saved and folded into the embedded-media table.

use std::collections::HashSet;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::ids::ElementId;

/// Pointer to the bytes behind a media element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaRef {
    /// In-memory handle owned by the host; meaningless after a reload.
    Session { handle: String },
    /// Base64 payload carried inside the project.
    Embedded { mime: String, payload: String },
    /// Path or URL the host can open again later.
    External { uri: String },
}

impl MediaRef {
    pub fn session(handle: impl Into<String>) -> Self {
        Self::Session {
            handle: handle.into(),
        }
    }

    pub fn external(uri: impl Into<String>) -> Self {
        Self::External { uri: uri.into() }
    }

    /// Embed raw bytes.
    pub fn embed(mime: impl Into<String>, bytes: &[u8]) -> Self {
        Self::Embedded {
            mime: mime.into(),
            payload: BASE64_STANDARD.encode(bytes),
        }
    }

    pub fn is_durable(&self) -> bool {
        !self.is_ephemeral()
    }

    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Self::Session { .. })
    }

    /// Decoded bytes of an embedded payload; `None` for other variants.
    pub fn decode_payload(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        match self {
            Self::Embedded { payload, .. } => Some(BASE64_STANDARD.decode(payload)),
            _ => None,
        }
    }

    /// Short human-readable description, safe to log.
    pub fn describe(&self) -> String {
        match self {
            Self::Session { handle } => format!("session:{handle}"),
            Self::Embedded { mime, payload } => format!("embedded:{mime} ({} b64 chars)", payload.len()),
            Self::External { uri } => uri.clone(),
        }
    }
}

/// Category of a raw media resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
    Audio,
}

impl MediaKind {
    pub const ALL: [MediaKind; 3] = [MediaKind::Video, MediaKind::Image, MediaKind::Audio];
}

/// One row of the embedded-media table written at save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedMedia {
    /// Element whose session reference this payload replaces.
    pub element_id: ElementId,

    /// Base64 encoded bytes.
    pub payload: String,

    pub media_type: MediaKind,

    #[serde(default = "default_mime")]
    pub mime: String,
}

fn default_mime() -> String {
    "application/octet-stream".to_string()
}

impl EmbeddedMedia {
    pub fn new(element_id: ElementId, media_type: MediaKind, mime: String, bytes: &[u8]) -> Self {
        Self {
            element_id,
            payload: BASE64_STANDARD.encode(bytes),
            media_type,
            mime,
        }
    }

    /// The durable reference this row stands for.
    pub fn to_media_ref(&self) -> MediaRef {
        MediaRef::Embedded {
            mime: self.mime.clone(),
            payload: self.payload.clone(),
        }
    }
}

/// Raw resources the user imported, one list per media kind.
///
/// Pure storage: indices are what the import operations refer to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaRegistry {
    pub videos: Vec<MediaRef>,
    pub images: Vec<MediaRef>,
    pub audios: Vec<MediaRef>,
}

impl MediaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, kind: MediaKind) -> &[MediaRef] {
        match kind {
            MediaKind::Video => &self.videos,
            MediaKind::Image => &self.images,
            MediaKind::Audio => &self.audios,
        }
    }

    fn list_mut(&mut self, kind: MediaKind) -> &mut Vec<MediaRef> {
        match kind {
            MediaKind::Video => &mut self.videos,
            MediaKind::Image => &mut self.images,
            MediaKind::Audio => &mut self.audios,
        }
    }

    /// Append a resource and return its index.
    pub fn push(&mut self, kind: MediaKind, media: MediaRef) -> usize {
        let list = self.list_mut(kind);
        list.push(media);
        list.len() - 1
    }

    pub fn get(&self, kind: MediaKind, index: usize) -> Option<&MediaRef> {
        self.list(kind).get(index)
    }

    /// Remove the resource at `index`; out-of-range indices are ignored.
    pub fn remove(&mut self, kind: MediaKind, index: usize) -> Option<MediaRef> {
        let list = self.list_mut(kind);
        (index < list.len()).then(|| list.remove(index))
    }

    /// Drop repeated entries, keeping the first occurrence of each.
    pub fn dedupe(&mut self) {
        for kind in MediaKind::ALL {
            let list = self.list_mut(kind);
            let mut seen = HashSet::new();
            list.retain(|media| seen.insert(media.clone()));
        }
    }

    /// Drop every session-only entry.
    pub fn retain_durable(&mut self) {
        for kind in MediaKind::ALL {
            self.list_mut(kind).retain(MediaRef::is_durable);
        }
    }

    pub fn len(&self) -> usize {
        self.videos.len() + self.images.len() + self.audios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
