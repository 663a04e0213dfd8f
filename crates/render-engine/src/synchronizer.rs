//! Keeps the surface holding exactly one visual per element.
//!
//! The synchronizer owns the side table from element ids to surface
//! handles. Elements never point at their visuals; anything arriving from
//! the surface is mapped back through this table.

use std::collections::HashMap;

use futures::future::join_all;

use clipweave_animation::AnimationTimeline;
use clipweave_common::error::ClipweaveResult;
use clipweave_project_model::{
    Element, ElementId, ElementPatch, ElementProperties, Placement, TextProperties,
};

use crate::compositor::{compose_frame, FrameComposition};
use crate::surface::{
    DecodedMedia, MediaDecoder, RenderSurface, VisualContent, VisualHandle, VisualSpec,
    VisualTransform,
};

/// Outcome of a full refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub created: usize,
    pub skipped: usize,
    pub glyphs: usize,
}

/// Scene snapshot a refresh works from.
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    pub elements: &'a [Element],
    pub timeline: &'a AnimationTimeline,
    pub selected: Option<&'a ElementId>,
    pub time_ms: f64,
    pub playing: bool,
}

/// Which element (and glyph) a visual stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualOwner {
    pub element_id: ElementId,
    pub glyph_index: Option<usize>,
}

#[derive(Debug, Default)]
pub struct RenderSynchronizer {
    visuals: HashMap<ElementId, VisualHandle>,
    glyph_visuals: HashMap<(ElementId, usize), VisualHandle>,
    owners: HashMap<VisualHandle, VisualOwner>,
}

impl RenderSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tear down every managed visual and rebuild from `scene`.
    ///
    /// Rasters are probed concurrently before anything is added, so paint
    /// order still follows element order. Elements that fail to decode or
    /// that the surface rejects are skipped for this pass.
    pub async fn refresh(
        &mut self,
        surface: &mut dyn RenderSurface,
        decoder: &dyn MediaDecoder,
        scene: SceneView<'_>,
    ) -> RefreshReport {
        surface.clear_selection();
        self.clear(surface);

        let probes = join_all(scene.elements.iter().map(|element| probe_raster(decoder, element))).await;

        let mut report = RefreshReport::default();
        for (element, probe) in scene.elements.iter().zip(probes) {
            let content = match (build_content(element, probe), element.media_src()) {
                (Ok(content), _) => content,
                (Err(e), src) => {
                    tracing::warn!(
                        element = %element.id,
                        media = %src.map(|m| m.describe()).unwrap_or_default(),
                        error = %e,
                        "Skipping element that failed to decode"
                    );
                    report.skipped += 1;
                    continue;
                }
            };

            let spec = VisualSpec {
                element_id: element.id.clone(),
                glyph_index: None,
                placement: element.placement,
                content,
            };
            match surface.add_visual(spec) {
                Ok(handle) => {
                    self.track(handle, element.id.clone(), None);
                    report.created += 1;
                }
                Err(e) => {
                    tracing::warn!(element = %element.id, error = %e, "Surface rejected visual");
                    report.skipped += 1;
                }
            }
        }

        for layer in scene.timeline.glyph_layers() {
            let Some(parent) = scene.elements.iter().find(|e| e.id == layer.element_id) else {
                continue;
            };
            let spec = VisualSpec {
                element_id: layer.element_id.clone(),
                glyph_index: Some(layer.index),
                placement: Placement {
                    x: parent.placement.x + layer.offset.x,
                    y: parent.placement.y + layer.offset.y,
                    scale_x: layer.scale_x,
                    scale_y: layer.scale_y,
                    ..Placement::new(0.0, 0.0, layer.font_size, layer.font_size)
                },
                content: VisualContent::Glyph {
                    grapheme: layer.grapheme.clone(),
                    font_size: layer.font_size,
                    font_weight: layer.font_weight,
                    fill: layer.fill.clone(),
                },
            };
            match surface.add_visual(spec) {
                Ok(handle) => {
                    self.track(handle, layer.element_id.clone(), Some(layer.index));
                    report.glyphs += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        element = %layer.element_id,
                        glyph = layer.index,
                        error = %e,
                        "Surface rejected glyph visual"
                    );
                }
            }
        }

        self.select(surface, scene.selected);
        self.apply_frame(
            surface,
            &compose_frame(scene.elements, scene.timeline, scene.time_ms, scene.playing),
        );

        tracing::debug!(
            created = report.created,
            skipped = report.skipped,
            glyphs = report.glyphs,
            "Render refresh complete"
        );
        report
    }

    /// Remove every visual this synchronizer created.
    pub fn clear(&mut self, surface: &mut dyn RenderSurface) {
        for handle in self.owners.keys() {
            surface.remove_visual(*handle);
        }
        self.visuals.clear();
        self.glyph_visuals.clear();
        self.owners.clear();
    }

    fn track(&mut self, handle: VisualHandle, element_id: ElementId, glyph_index: Option<usize>) {
        match glyph_index {
            Some(index) => {
                self.glyph_visuals.insert((element_id.clone(), index), handle);
            }
            None => {
                self.visuals.insert(element_id.clone(), handle);
            }
        }
        self.owners.insert(
            handle,
            VisualOwner {
                element_id,
                glyph_index,
            },
        );
    }

    /// Make `id`'s visual the surface selection, or clear it.
    pub fn select(&self, surface: &mut dyn RenderSurface, id: Option<&ElementId>) {
        match id.and_then(|id| self.visuals.get(id)) {
            Some(handle) => surface.set_active_visual(*handle),
            None => surface.clear_selection(),
        }
    }

    /// Push one composed frame to the surface.
    pub fn apply_frame(&self, surface: &mut dyn RenderSurface, frame: &FrameComposition) {
        for element in &frame.elements {
            let Some(handle) = self.visuals.get(&element.element_id) else {
                continue;
            };
            surface.apply_state(*handle, &element.state);
            if let Some(cue) = &element.cue {
                surface.sync_media(*handle, cue);
            }
        }
        for glyph in &frame.glyphs {
            if let Some(handle) = self.glyph_visuals.get(&(glyph.element_id.clone(), glyph.index)) {
                surface.apply_state(*handle, &glyph.state);
            }
        }
    }

    pub fn handle_for(&self, id: &ElementId) -> Option<VisualHandle> {
        self.visuals.get(id).copied()
    }

    pub fn owner_of(&self, handle: VisualHandle) -> Option<&VisualOwner> {
        self.owners.get(&handle)
    }

    /// Element edited through `handle`. Glyph visuals are not editable.
    pub fn element_for(&self, handle: VisualHandle) -> Option<&ElementId> {
        self.owners
            .get(&handle)
            .filter(|owner| owner.glyph_index.is_none())
            .map(|owner| &owner.element_id)
    }

    pub fn visual_count(&self) -> usize {
        self.visuals.len()
    }

    pub fn glyph_count(&self) -> usize {
        self.glyph_visuals.len()
    }
}

async fn probe_raster(
    decoder: &dyn MediaDecoder,
    element: &Element,
) -> Option<ClipweaveResult<DecodedMedia>> {
    match &element.properties {
        ElementProperties::Video(_) | ElementProperties::Image(_) | ElementProperties::MathPlot(_) => {
            let src = element.media_src()?;
            let kind = element.media_kind()?;
            Some(decoder.probe(src, kind).await)
        }
        ElementProperties::Audio(_) | ElementProperties::Text(_) => None,
    }
}

fn build_content(
    element: &Element,
    probe: Option<ClipweaveResult<DecodedMedia>>,
) -> ClipweaveResult<VisualContent> {
    let raster = |media: &clipweave_project_model::MediaRef| -> ClipweaveResult<VisualContent> {
        let decoded = match probe {
            Some(result) => result?,
            None => DecodedMedia {
                width: element.placement.width,
                height: element.placement.height,
                duration_ms: None,
            },
        };
        Ok(VisualContent::Raster {
            media: media.clone(),
            effect: element.effect(),
            natural_width: decoded.width,
            natural_height: decoded.height,
        })
    };

    match &element.properties {
        ElementProperties::Video(p) => raster(&p.src),
        ElementProperties::Image(p) => raster(&p.src),
        ElementProperties::MathPlot(p) => raster(&p.src),
        ElementProperties::Text(p) => Ok(VisualContent::Text {
            text: p.text.clone(),
            font_size: p.font_size,
            font_weight: p.font_weight,
            fill: p.fill.clone(),
        }),
        ElementProperties::Audio(p) => Ok(VisualContent::Media { media: p.src.clone() }),
    }
}

/// Translate a user transform into a scene patch.
///
/// Rasters fold the scale into their size so later edits start from a
/// unit scale. Text keeps its scale and may carry edited text. Audio has
/// no geometry and yields an empty patch.
pub fn patch_from_transform(element: &Element, transform: &VisualTransform) -> ElementPatch {
    let rotation = transform.rotation;
    match &element.properties {
        ElementProperties::Video(_) | ElementProperties::Image(_) | ElementProperties::MathPlot(_) => {
            ElementPatch::placement(Placement {
                x: transform.x,
                y: transform.y,
                width: transform.width * transform.scale_x,
                height: transform.height * transform.scale_y,
                rotation,
                scale_x: 1.0,
                scale_y: 1.0,
            })
        }
        ElementProperties::Text(text) => {
            let mut patch = ElementPatch::placement(Placement {
                x: transform.x,
                y: transform.y,
                width: transform.width,
                height: transform.height,
                rotation,
                scale_x: transform.scale_x,
                scale_y: transform.scale_y,
            });
            if let Some(edited) = &transform.text {
                if edited != &text.text {
                    patch.properties = Some(ElementProperties::Text(TextProperties {
                        text: edited.clone(),
                        ..text.clone()
                    }));
                }
            }
            patch
        }
        ElementProperties::Audio(_) => ElementPatch::default(),
    }
}
