//! Core layout engine with incremental update support

use crate::document::{Block, BlockId, Document};
use crate::editing::TransactionResult;
use crate::layout::font::FontMetrics;
use crate::layout::geometry::PageGeometry;
use crate::layout::line_break::LineBreaker;
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use std::hash::{Hash, Hasher};
use std::ops::Range;

/// Indentation width per level
pub const INDENT_WIDTH: f32 = 24.0;

/// Layout result for a single line
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    /// Byte range within the block text this line covers
    pub byte_range: Range<usize>,
    /// Line height
    pub height: f32,
    /// Actual width of content
    pub width: f32,
}

/// Layout result for a block
#[derive(Debug, Clone)]
pub struct BlockLayout {
    pub block_id: BlockId,
    /// Lines produced by line breaking
    pub lines: Vec<LineLayout>,
    /// Total height including spacing
    pub total_height: f32,
    /// Hash of block kind and content for change detection
    pub content_hash: u64,
}

/// Summary of one relayout pass
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LayoutDiff {
    /// Blocks that were laid out again
    pub changed_blocks: FxHashSet<BlockId>,
    /// Blocks whose layouts were dropped
    pub removed_blocks: FxHashSet<BlockId>,
    /// Whether the total rendered height moved
    pub height_changed: bool,
}

/// Complete layout state with incremental update support
#[derive(Debug)]
pub struct LayoutState {
    /// Per-block layout results
    block_layouts: FxHashMap<BlockId, BlockLayout>,
    /// Page geometry; content width drives line breaking
    geometry: PageGeometry,
    metrics: FontMetrics,
    /// Blocks needing relayout regardless of their hash
    dirty_blocks: FxHashSet<BlockId>,
    /// Version of document this layout corresponds to
    layout_version: Option<u64>,
    line_breaker: LineBreaker,
    total_height: f32,
}

impl LayoutState {
    /// Create new layout state
    pub fn new(geometry: PageGeometry, metrics: FontMetrics) -> Self {
        Self {
            block_layouts: FxHashMap::default(),
            geometry,
            metrics,
            dirty_blocks: FxHashSet::default(),
            layout_version: None,
            line_breaker: LineBreaker::new(),
            total_height: 0.0,
        }
    }

    /// Get geometry
    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Replace the font metrics. Every block is laid out again on the next pass.
    pub fn set_metrics(&mut self, metrics: FontMetrics) {
        self.metrics = metrics;
        self.invalidate_all();
    }

    /// Mark blocks as needing relayout based on a transaction result
    pub fn invalidate(&mut self, result: &TransactionResult) {
        self.dirty_blocks.extend(result.inserted.iter().copied());

        for block_id in &result.removed {
            self.block_layouts.remove(block_id);
            self.dirty_blocks.remove(block_id);
        }
    }

    /// Mark all blocks as dirty (for full relayout)
    pub fn invalidate_all(&mut self) {
        self.dirty_blocks.extend(self.block_layouts.keys().copied());
    }

    /// Whether the layout reflects the given document version
    pub fn is_current(&self, document: &Document) -> bool {
        self.layout_version == Some(document.version()) && self.dirty_blocks.is_empty()
    }

    /// Perform incremental relayout.
    ///
    /// Blocks are laid out again when dirty or when their content hash changed.
    pub fn relayout(&mut self, document: &Document) -> LayoutDiff {
        let mut diff = LayoutDiff::default();
        let max_width = self.geometry.content_width();

        for block in document.blocks() {
            let hash = hash_block(block);
            let fresh = self
                .block_layouts
                .get(&block.id)
                .is_some_and(|l| l.content_hash == hash)
                && !self.dirty_blocks.contains(&block.id);
            if fresh {
                continue;
            }

            let layout = self.line_breaker.layout_block(
                block.id,
                &block.text,
                &block.kind,
                max_width,
                &self.metrics,
                hash,
            );
            self.block_layouts.insert(block.id, layout);
            diff.changed_blocks.insert(block.id);
        }
        self.dirty_blocks.clear();

        // Drop layouts of blocks that left the document
        let live: FxHashSet<BlockId> = document.blocks().iter().map(|b| b.id).collect();
        self.block_layouts.retain(|id, _| {
            let keep = live.contains(id);
            if !keep {
                diff.removed_blocks.insert(*id);
            }
            keep
        });

        let total: f32 = document
            .blocks()
            .iter()
            .filter_map(|b| self.block_layouts.get(&b.id))
            .map(|l| l.total_height)
            .sum();
        diff.height_changed = total != self.total_height;
        self.total_height = total;
        self.layout_version = Some(document.version());

        diff
    }

    /// Rendered height of a block, `None` if it has not been laid out yet
    pub fn block_height(&self, block_id: BlockId) -> Option<f32> {
        self.block_layouts.get(&block_id).map(|l| l.total_height)
    }

    /// Height of every laid out block as of the last relayout
    pub fn total_height(&self) -> f32 {
        self.total_height
    }
}

/// Hash block kind and content for change detection
fn hash_block(block: &Block) -> u64 {
    let mut hasher = FxHasher::default();
    block.kind.hash(&mut hasher);
    block.text.hash(&mut hasher);
    hasher.finish()
}
