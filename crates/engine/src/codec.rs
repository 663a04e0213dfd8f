//! Project persistence: session-media embedding and the `.project` format.
//!
//! A `.project` file is one zlib stream wrapping a UTF-8 JSON
//! [`ProjectDocument`]. There is no header; a successful inflate is the
//! only format signal. Older saves are plain JSON and are still accepted.

use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use futures::future::join_all;

use clipweave_common::error::{ClipweaveError, ClipweaveResult};
use clipweave_project_model::{
    ElementKind, EmbeddedMedia, MediaRef, MediaRegistry, ProjectDocument,
};

/// Bytes behind a session media handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    pub bytes: Vec<u8>,
    pub mime: String,
}

/// Host service turning session handles into bytes.
#[async_trait::async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve(&self, handle: &str) -> ClipweaveResult<ResolvedMedia>;
}

/// Resolver backed by an in-memory table.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    entries: HashMap<String, ResolvedMedia>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handle: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(
            handle.into(),
            ResolvedMedia {
                bytes,
                mime: mime.into(),
            },
        );
    }

    pub fn with(mut self, handle: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(handle, mime, bytes);
        self
    }
}

#[async_trait::async_trait]
impl MediaResolver for MemoryResolver {
    async fn resolve(&self, handle: &str) -> ClipweaveResult<ResolvedMedia> {
        self.entries
            .get(handle)
            .cloned()
            .ok_or_else(|| ClipweaveError::decode(format!("unknown session handle '{handle}'")))
    }
}

/// Counts from one embedding pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbedReport {
    pub embedded: usize,
    pub failed: usize,
}

/// Resolve every element's session media concurrently and fold the
/// payloads into the document's embedded-media table.
///
/// Failures are logged and skipped; those elements will not survive a
/// reload.
pub async fn embed_session_media(
    doc: &mut ProjectDocument,
    resolver: &dyn MediaResolver,
) -> EmbedReport {
    let pending: Vec<_> = doc
        .elements
        .iter()
        .filter_map(|element| match (element.media_src(), element.media_kind()) {
            (Some(MediaRef::Session { handle }), Some(kind)) => {
                Some((element.id.clone(), kind, handle.clone()))
            }
            _ => None,
        })
        .collect();

    let resolved = join_all(
        pending
            .iter()
            .map(|(_, _, handle)| resolver.resolve(handle.as_str())),
    )
    .await;

    let mut report = EmbedReport::default();
    for ((element_id, kind, handle), result) in pending.into_iter().zip(resolved) {
        match result {
            Ok(media) => {
                doc.embedded_media.retain(|row| row.element_id != element_id);
                doc.embedded_media
                    .push(EmbeddedMedia::new(element_id, kind, media.mime, &media.bytes));
                report.embedded += 1;
            }
            Err(e) => {
                tracing::warn!(
                    element = %element_id,
                    handle = %handle,
                    error = %e,
                    "Failed to resolve session media; it will not be saved"
                );
                report.failed += 1;
            }
        }
    }

    tracing::debug!(
        embedded = report.embedded,
        failed = report.failed,
        "Embedded session media"
    );
    report
}

/// JSON-encode and compress a document.
pub fn pack_document(doc: &ProjectDocument) -> ClipweaveResult<Vec<u8>> {
    let json = doc
        .to_json_vec()
        .map_err(|e| ClipweaveError::project(e.to_string()))?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

/// Parse a `.project` payload, compressed or legacy plain JSON.
pub fn unpack_document(bytes: &[u8]) -> ClipweaveResult<ProjectDocument> {
    let compressed_err = match inflate(bytes) {
        Ok(json) => match ProjectDocument::from_json_slice(&json) {
            Ok(doc) => return Ok(doc),
            Err(e) => e.to_string(),
        },
        Err(e) => e.to_string(),
    };

    match ProjectDocument::from_json_slice(bytes) {
        Ok(doc) => {
            tracing::info!("Loaded uncompressed legacy project");
            Ok(doc)
        }
        Err(plain_err) => Err(ClipweaveError::format(format!(
            "not a project file (compressed: {compressed_err}; plain JSON: {plain_err})"
        ))),
    }
}

fn inflate(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(bytes).read_to_end(&mut out)?;
    Ok(out)
}

/// Counts from restoring a loaded document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub restored: usize,
    pub dropped: usize,
    pub resources: usize,
}

/// Swap session references for their embedded payloads and rebuild the
/// raw-resource registry.
///
/// Elements whose session media has no embedded copy are dropped, along
/// with the registry's session-only entries.
pub fn restore_media(doc: &mut ProjectDocument) -> RestoreReport {
    let mut report = RestoreReport::default();
    let plot_ids: HashSet<_> = doc
        .elements
        .iter()
        .filter(|element| element.kind() == ElementKind::MathPlot)
        .map(|element| element.id.clone())
        .collect();
    let table: HashMap<_, _> = doc
        .embedded_media
        .iter()
        .map(|row| (row.element_id.clone(), row.to_media_ref()))
        .collect();

    doc.elements.retain_mut(|element| {
        let id = element.id.clone();
        let Some(src) = element.media_src_mut() else {
            return true;
        };
        if src.is_durable() {
            return true;
        }
        match table.get(&id) {
            Some(embedded) => {
                *src = embedded.clone();
                report.restored += 1;
                true
            }
            None => {
                tracing::warn!(element = %id, "Dropping element with unsaved session media");
                report.dropped += 1;
                false
            }
        }
    });

    // Plot rasters are generated, not imported; they stay off the resource list.
    let mut registry = MediaRegistry::new();
    for row in doc
        .embedded_media
        .iter()
        .filter(|row| !plot_ids.contains(&row.element_id))
    {
        registry.push(row.media_type, row.to_media_ref());
    }
    let mut legacy = std::mem::take(&mut doc.resources);
    legacy.retain_durable();
    for kind in clipweave_project_model::MediaKind::ALL {
        for media in legacy.list(kind) {
            registry.push(kind, media.clone());
        }
    }
    registry.dedupe();
    report.resources = registry.len();
    doc.resources = registry;

    report
}
