//! Splitting text elements into per-glyph layers.
//!
//! Character slides animate every glyph as its own visual. The layout
//! decides where each glyph sits relative to the text box origin; the
//! scheduler turns those positions into offsets and tracks.

use clipweave_project_model::{ElementId, Point2D};
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

/// Where one glyph of a laid-out string sits, before element scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphPlacement {
    pub grapheme: String,
    /// Horizontal offset from the text box's left edge.
    pub left: f64,
    /// Zero-based line index.
    pub line: usize,
}

/// Text measurement used for character splitting.
///
/// Hosts with real font metrics supply their own implementation; the
/// default [`MonospaceLayout`] is deterministic and font-agnostic.
pub trait GlyphLayout: Send + Sync {
    /// Lay out `text` in a box `box_width` wide. Line breaks are consumed
    /// and produce no glyph.
    fn layout(&self, text: &str, font_size: f64, box_width: f64) -> Vec<GlyphPlacement>;

    /// Distance between consecutive baselines.
    fn line_height(&self, font_size: f64) -> f64;
}

/// Fixed-advance layout with greedy per-character wrapping.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceLayout {
    /// Glyph advance as a fraction of the font size.
    pub advance_ratio: f64,
    /// Line height as a fraction of the font size.
    pub line_height_ratio: f64,
}

impl Default for MonospaceLayout {
    fn default() -> Self {
        Self {
            advance_ratio: 0.6,
            line_height_ratio: 1.16,
        }
    }
}

impl GlyphLayout for MonospaceLayout {
    fn layout(&self, text: &str, font_size: f64, box_width: f64) -> Vec<GlyphPlacement> {
        let advance = font_size * self.advance_ratio;
        let mut placements = Vec::new();
        let mut line = 0;
        let mut left = 0.0;

        for grapheme in text.graphemes(true) {
            if grapheme == "\n" || grapheme == "\r\n" {
                line += 1;
                left = 0.0;
                continue;
            }
            if left > 0.0 && left + advance > box_width {
                line += 1;
                left = 0.0;
            }
            placements.push(GlyphPlacement {
                grapheme: grapheme.to_string(),
                left,
                line,
            });
            left += advance;
        }

        placements
    }

    fn line_height(&self, font_size: f64) -> f64 {
        font_size * self.line_height_ratio
    }
}

/// A glyph split from a text element, ready to become its own visual.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlyphLayer {
    pub element_id: ElementId,
    /// Position in reading order.
    pub index: usize,
    pub grapheme: String,
    /// Offset from the parent's placed origin, scaling applied.
    pub offset: Point2D,
    pub font_size: f64,
    pub font_weight: u32,
    pub fill: String,
    pub scale_x: f64,
    pub scale_y: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_preserves_order_and_skips_newlines() {
        let layout = MonospaceLayout::default();
        let glyphs = layout.layout("ab\ncd", 10.0, 1000.0);
        let text: String = glyphs.iter().map(|g| g.grapheme.as_str()).collect();
        assert_eq!(text, "abcd");
        assert_eq!(glyphs[1].left, 6.0);
        assert_eq!(glyphs[1].line, 0);
        assert_eq!(glyphs[2].left, 0.0);
        assert_eq!(glyphs[2].line, 1);
    }

    #[test]
    fn test_layout_wraps_at_box_width() {
        let layout = MonospaceLayout::default();
        // 6 units per glyph, 13 units wide: two glyphs per line.
        let glyphs = layout.layout("abcde", 10.0, 13.0);
        let lines: Vec<usize> = glyphs.iter().map(|g| g.line).collect();
        assert_eq!(lines, vec![0, 0, 1, 1, 2]);
    }

    #[test]
    fn test_layout_keeps_grapheme_clusters_whole() {
        let layout = MonospaceLayout::default();
        let glyphs = layout.layout("e\u{301}x", 10.0, 1000.0);
        assert_eq!(glyphs.len(), 2);
        assert_eq!(glyphs[0].grapheme, "e\u{301}");
    }

    #[test]
    fn test_line_height() {
        assert!((MonospaceLayout::default().line_height(100.0) - 116.0).abs() < 1e-9);
    }
}
