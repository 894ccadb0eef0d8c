//! Synthetic surface backed by a height table

use crate::document::{BlockId, BlockKind, BreakKind, Document, NodeType, Schema};
use crate::editing::{Position, Transaction, TransactionError, TransactionResult};
use crate::layout::PageGeometry;
use crate::pagination::surface::{BlockVisit, RenderSurface};
use crate::pagination::view::PagedHeight;
use rustc_hash::FxHashMap;
use std::ops::ControlFlow;

/// Every paragraph occupies 60 positions
const PARAGRAPH_CHARS: usize = 58;

pub(crate) struct HeightTable {
    pub document: Document,
    heights: FxHashMap<BlockId, f32>,
    /// Reject the next transaction as if the document changed underneath it
    pub reject_next: bool,
}

impl HeightTable {
    pub fn new(heights: &[f32]) -> Self {
        Self::with_schema(Schema::default(), heights)
    }

    pub fn with_schema(schema: Schema, heights: &[f32]) -> Self {
        let mut table = Self {
            document: Document::empty(schema),
            heights: FxHashMap::default(),
            reject_next: false,
        };
        for &height in heights {
            table.push_paragraph(height);
        }
        table
    }

    pub fn push_paragraph(&mut self, height: f32) -> BlockId {
        let id = self
            .document
            .push_block(BlockKind::Paragraph, "x".repeat(PARAGRAPH_CHARS))
            .expect("paragraph is always registered");
        self.heights.insert(id, height);
        id
    }

    pub fn push_break(&mut self, kind: BreakKind) -> BlockId {
        self.document
            .push_block(BlockKind::page_break(kind), "")
            .expect("page break registered")
    }

    /// Make a block unmeasurable, as if not rendered yet
    pub fn forget_height(&mut self, id: BlockId) {
        self.heights.remove(&id);
    }

    pub fn breaks(&self) -> Vec<(Position, BreakKind)> {
        self.document.page_breaks().collect()
    }

    pub fn automatic_breaks(&self) -> usize {
        self.breaks()
            .iter()
            .filter(|(_, kind)| *kind == BreakKind::Automatic)
            .count()
    }
}

impl RenderSurface for HeightTable {
    fn measure_rendered_height(&self, position: Position) -> Option<f32> {
        let block = self.document.block_at(position)?;
        if block.kind.is_page_break() {
            return Some(0.0);
        }
        self.heights.get(&block.id).copied()
    }

    fn total_rendered_height(&self) -> f32 {
        let mut height = PagedHeight::new(PageGeometry::default().content_height());
        for block in self.document.blocks() {
            if block.kind.is_page_break() {
                height.add_break();
            } else if let Some(&h) = self.heights.get(&block.id) {
                height.add_block(h);
            }
        }
        height.total()
    }

    fn traverse_blocks(&self, visitor: &mut dyn FnMut(BlockVisit) -> ControlFlow<()>) {
        for (position, block) in self.document.positioned() {
            let visit = BlockVisit {
                position,
                node_type: block.kind.node_type(),
                break_kind: block.kind.break_kind(),
                node_size: block.node_size(),
            };
            if visitor(visit).is_break() {
                break;
            }
        }
    }

    fn begin_transaction(&self) -> Transaction {
        self.document.transaction()
    }

    fn apply_transaction(&mut self, txn: Transaction) -> Result<TransactionResult, TransactionError> {
        if self.reject_next {
            self.reject_next = false;
            return Err(TransactionError::Stale {
                base: txn.base_version(),
                current: self.document.version() + 1,
            });
        }
        self.document.apply(txn)
    }

    fn supports_node(&self, node_type: NodeType) -> bool {
        self.document.schema().contains(node_type)
    }
}
