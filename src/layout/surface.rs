//! Render surface backed by the in-crate layout engine

use crate::document::{BlockId, Document, NodeType};
use crate::editing::{Position, Transaction, TransactionError, TransactionResult};
use crate::layout::engine::{LayoutDiff, LayoutState};
use crate::pagination::{BlockVisit, PagedHeight, RenderSurface};
use std::ops::ControlFlow;

/// A document together with its layout, borrowed for one pagination pass.
///
/// Applying a transaction lays the document out again before returning, so
/// measurements taken after an insertion already see the new marker.
pub struct LayoutSurface<'a> {
    document: &'a mut Document,
    layout: &'a mut LayoutState,
    /// Block starts in document order, rebuilt whenever the surface edits
    starts: Vec<(Position, BlockId)>,
    last_diff: Option<LayoutDiff>,
}

impl<'a> LayoutSurface<'a> {
    pub fn new(document: &'a mut Document, layout: &'a mut LayoutState) -> Self {
        let starts = index_blocks(document);
        Self {
            document,
            layout,
            starts,
            last_diff: None,
        }
    }

    pub fn document(&self) -> &Document {
        self.document
    }

    /// Diff of the most recent relayout done by this surface
    pub fn last_diff(&self) -> Option<&LayoutDiff> {
        self.last_diff.as_ref()
    }
}

impl RenderSurface for LayoutSurface<'_> {
    fn measure_rendered_height(&self, position: Position) -> Option<f32> {
        let idx = self
            .starts
            .binary_search_by_key(&position, |(start, _)| *start)
            .ok()?;
        self.layout.block_height(self.starts[idx].1)
    }

    fn total_rendered_height(&self) -> f32 {
        let mut height = PagedHeight::new(self.layout.geometry().content_height());
        for block in self.document.blocks() {
            if block.kind.is_page_break() {
                height.add_break();
            } else if let Some(h) = self.layout.block_height(block.id) {
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
                return;
            }
        }
    }

    fn begin_transaction(&self) -> Transaction {
        self.document.transaction()
    }

    fn apply_transaction(&mut self, txn: Transaction) -> Result<TransactionResult, TransactionError> {
        let result = self.document.apply(txn)?;
        self.starts = index_blocks(self.document);
        self.layout.invalidate(&result);
        self.last_diff = Some(self.layout.relayout(self.document));
        Ok(result)
    }

    fn supports_node(&self, node_type: NodeType) -> bool {
        self.document.schema().contains(node_type)
    }
}

fn index_blocks(document: &Document) -> Vec<(Position, BlockId)> {
    document.positioned().map(|(position, block)| (position, block.id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockKind, BreakKind};
    use crate::layout::{FontMetrics, PageGeometry};
    use crate::pagination::{find_break_position, insert_manual_break_at};

    fn setup(lines: usize) -> (Document, LayoutState) {
        let mut document = Document::empty(Default::default());
        for i in 0..lines {
            document
                .push_block(BlockKind::Paragraph, format!("line {i}"))
                .unwrap();
        }
        let mut layout = LayoutState::new(PageGeometry::default(), FontMetrics::monospace(20.0, 8.0));
        layout.relayout(&document);
        (document, layout)
    }

    #[test]
    fn test_measures_laid_out_blocks() {
        let (mut document, mut layout) = setup(3);
        let surface = LayoutSurface::new(&mut document, &mut layout);
        let height = surface.measure_rendered_height(Position(0)).unwrap();
        assert!(height >= 20.0);
        assert_eq!(surface.measure_rendered_height(Position(3)), None);
        assert!((surface.total_rendered_height() - 3.0 * height).abs() < 0.01);
    }

    #[test]
    fn test_unlaid_block_is_unmeasurable() {
        let (mut document, mut layout) = setup(1);
        document.push_block(BlockKind::Paragraph, "late").unwrap();
        let surface = LayoutSurface::new(&mut document, &mut layout);
        let late = surface.document().positioned().nth(1).map(|(p, _)| p).unwrap();
        assert_eq!(surface.measure_rendered_height(late), None);
    }

    #[test]
    fn test_insert_relays_out() {
        let (mut document, mut layout) = setup(2);
        let mut surface = LayoutSurface::new(&mut document, &mut layout);
        let at = surface.document().positioned().nth(1).map(|(p, _)| p).unwrap();

        insert_manual_break_at(&mut surface, at).unwrap();
        assert_eq!(surface.measure_rendered_height(at), Some(0.0));
        assert!(surface.last_diff().is_some());
        assert_eq!(
            surface.document().page_breaks().collect::<Vec<_>>(),
            vec![(at, BreakKind::Manual)]
        );
    }

    #[test]
    fn test_detects_overflow_from_real_layout() {
        let (mut document, mut layout) = setup(60);
        let surface = LayoutSurface::new(&mut document, &mut layout);
        assert!(surface.total_rendered_height() > 864.0);
        assert!(find_break_position(&surface, 864.0).is_some());
    }

    #[test]
    fn test_break_mid_page_starts_a_new_page() {
        let (mut document, mut layout) = setup(2);
        let mut surface = LayoutSurface::new(&mut document, &mut layout);
        let block = surface.measure_rendered_height(Position(0)).unwrap();
        let second = surface.document().positioned().nth(1).map(|(p, _)| p).unwrap();

        insert_manual_break_at(&mut surface, second).unwrap();
        assert!((surface.total_rendered_height() - (864.0 + block)).abs() < 0.01);
        // the moved block is still found at its new start
        assert_eq!(surface.measure_rendered_height(Position(second.0 + 1)), Some(block));
    }
}
