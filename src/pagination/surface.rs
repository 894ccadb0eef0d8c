//! Capabilities the pagination engine needs from the editing surface

use crate::document::{BreakKind, NodeType};
use crate::editing::{Position, Transaction, TransactionError, TransactionResult};
use std::ops::ControlFlow;

/// A block as seen during traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockVisit {
    pub position: Position,
    pub node_type: NodeType,
    /// Set when the block is a page break marker
    pub break_kind: Option<BreakKind>,
    /// Positions the block occupies
    pub node_size: usize,
}

impl BlockVisit {
    pub fn is_page_break(&self) -> bool {
        self.break_kind.is_some()
    }
}

/// The rendered, mutable document the engine paginates.
///
/// The surface owns the document tree. The engine only reads positions and
/// heights, and writes page break markers through
/// [`RenderSurface::apply_transaction`].
pub trait RenderSurface {
    /// Rendered height of the block starting at `position`, or `None` when it
    /// has not been rendered yet
    fn measure_rendered_height(&self, position: Position) -> Option<f32>;

    /// Height of the whole rendered document
    fn total_rendered_height(&self) -> f32;

    /// Visit top-level blocks in document order until the visitor breaks
    fn traverse_blocks(&self, visitor: &mut dyn FnMut(BlockVisit) -> ControlFlow<()>);

    /// Start a transaction against the current document state
    fn begin_transaction(&self) -> Transaction;

    /// Apply a transaction atomically
    fn apply_transaction(&mut self, txn: Transaction) -> Result<TransactionResult, TransactionError>;

    /// Whether the document schema has the given node type registered
    fn supports_node(&self, node_type: NodeType) -> bool;
}
