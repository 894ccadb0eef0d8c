//! Page break marker commands
//!
//! Inserting a marker shifts every later position by one. Callers must
//! resolve positions again after an insertion instead of reusing old ones.

use crate::document::{BlockId, BlockKind, BreakKind, NodeType};
use crate::editing::{Position, TransactionError};
use crate::pagination::surface::RenderSurface;
use std::ops::ControlFlow;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    #[error("page break node type is not registered in the document schema")]
    SchemaMissing,

    #[error("transaction rejected: {0}")]
    Rejected(#[from] TransactionError),
}

/// Insert a user-requested page break before the block at `at`
pub fn insert_manual_break_at<S>(surface: &mut S, at: Position) -> Result<BlockId, MarkerError>
where
    S: RenderSurface + ?Sized,
{
    insert_break_at(surface, at, BreakKind::Manual)
}

/// Insert an engine-authored page break. Only the auto-pagination controller
/// and explicit overflow checks call this.
pub(crate) fn insert_automatic_break_at<S>(
    surface: &mut S,
    at: Position,
) -> Result<BlockId, MarkerError>
where
    S: RenderSurface + ?Sized,
{
    insert_break_at(surface, at, BreakKind::Automatic)
}

fn insert_break_at<S>(surface: &mut S, at: Position, kind: BreakKind) -> Result<BlockId, MarkerError>
where
    S: RenderSurface + ?Sized,
{
    if !surface.supports_node(NodeType::PageBreak) {
        return Err(MarkerError::SchemaMissing);
    }

    let mut txn = surface.begin_transaction();
    txn.insert_block(at, BlockKind::page_break(kind), "");
    let result = surface.apply_transaction(txn)?;

    tracing::debug!(position = %at, %kind, "inserted page break");
    result
        .inserted
        .first()
        .copied()
        .ok_or(MarkerError::Rejected(TransactionError::InvalidPosition(at)))
}

/// Remove every automatic page break in a single transaction. Manual breaks
/// are left alone. Returns how many markers were removed.
pub fn remove_automatic_breaks<S>(surface: &mut S) -> Result<usize, MarkerError>
where
    S: RenderSurface + ?Sized,
{
    let mut automatic = Vec::new();
    surface.traverse_blocks(&mut |visit| {
        if visit.break_kind == Some(BreakKind::Automatic) {
            automatic.push(visit.position);
        }
        ControlFlow::Continue(())
    });
    if automatic.is_empty() {
        return Ok(0);
    }

    // Back to front so earlier positions stay valid
    let mut txn = surface.begin_transaction();
    for &at in automatic.iter().rev() {
        txn.remove_block(at);
    }
    let result = surface.apply_transaction(txn)?;

    tracing::debug!(removed = result.removed.len(), "removed automatic page breaks");
    Ok(result.removed.len())
}
