//! Line breaking algorithm

use crate::document::{BlockId, BlockKind};
use crate::layout::engine::{BlockLayout, LineLayout, INDENT_WIDTH};
use crate::layout::font::FontMetrics;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Greedy line breaker over Unicode line break opportunities
#[derive(Debug, Default)]
pub struct LineBreaker;

impl LineBreaker {
    pub fn new() -> Self {
        Self
    }

    /// Layout a block into lines
    pub fn layout_block(
        &self,
        block_id: BlockId,
        text: &str,
        kind: &BlockKind,
        max_width: f32,
        metrics: &FontMetrics,
        content_hash: u64,
    ) -> BlockLayout {
        if kind.is_atom() {
            return BlockLayout {
                block_id,
                lines: Vec::new(),
                total_height: 0.0,
                content_hash,
            };
        }

        // Adjust width for list indentation
        let effective_width = match kind {
            BlockKind::ListItem { indent_level, .. } => {
                (max_width - *indent_level as f32 * INDENT_WIDTH).max(INDENT_WIDTH)
            }
            _ => max_width,
        };
        let line_height = metrics.line_height * kind.line_height_multiplier();

        let mut lines = Vec::new();
        let mut line_start = 0usize;
        let mut line_width = 0.0f32;
        let mut segment_start = 0usize;

        let push_line = |lines: &mut Vec<LineLayout>, start: usize, end: usize, width: f32| {
            lines.push(LineLayout {
                byte_range: start..end,
                height: line_height,
                width,
            });
        };

        for (offset, opportunity) in linebreaks(text) {
            let segment = text[segment_start..offset].trim_end_matches(['\n', '\r']);
            // Trailing spaces may hang past the edge
            let fit_width = metrics.text_width(segment.trim_end());
            let full_width = metrics.text_width(segment);

            if line_width > 0.0 && line_width + fit_width > effective_width {
                push_line(&mut lines, line_start, segment_start, line_width);
                line_start = segment_start;
                line_width = 0.0;
            }

            if line_width == 0.0 && fit_width > effective_width {
                // Emergency break inside an overlong word
                let mut x = 0.0f32;
                for (idx, grapheme) in segment.grapheme_indices(true) {
                    let width = metrics.text_width(grapheme);
                    if x > 0.0 && x + width > effective_width {
                        push_line(&mut lines, line_start, segment_start + idx, x);
                        line_start = segment_start + idx;
                        x = 0.0;
                    }
                    x += width;
                }
                line_width = x;
            } else {
                line_width += full_width;
            }

            if opportunity == BreakOpportunity::Mandatory {
                let end = segment_start + segment.len();
                push_line(&mut lines, line_start, end, line_width);
                line_start = offset;
                line_width = 0.0;
            }
            segment_start = offset;
        }

        // Empty text, or a trailing newline, still produces a line
        if lines.is_empty() || text.ends_with('\n') {
            push_line(&mut lines, text.len(), text.len(), 0.0);
        }

        let total_height = lines.iter().map(|l| l.height).sum::<f32>()
            + kind.spacing_after() * metrics.line_height;

        BlockLayout {
            block_id,
            lines,
            total_height,
            content_hash,
        }
    }
}
