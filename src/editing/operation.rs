//! Positions, transactions and their results

use crate::document::{BlockId, BlockKind, NodeType};
use smallvec::SmallVec;
use std::fmt;
use thiserror::Error;

/// Offset into the document tree.
///
/// Positions sit between tokens: the position of a block is the number of
/// positions occupied by every block before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position(pub usize);

impl Position {
    /// Distance between two positions, regardless of order
    pub fn distance(self, other: Position) -> usize {
        self.0.abs_diff(other.0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single structural change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Insert a new block whose start will be `at`
    InsertBlock {
        at: Position,
        kind: BlockKind,
        text: String,
    },
    /// Remove the block starting at `at`
    RemoveBlock { at: Position },
}

impl Step {
    /// Get the position this step resolves against
    pub fn position(&self) -> Position {
        match self {
            Step::InsertBlock { at, .. } | Step::RemoveBlock { at } => *at,
        }
    }
}

/// A batch of steps applied atomically.
///
/// A transaction is bound to the document version it was begun from. Each
/// step resolves its position against the state left by the previous step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    base_version: u64,
    steps: Vec<Step>,
}

impl Transaction {
    /// Begin a transaction against the given document version
    pub fn new(base_version: u64) -> Self {
        Self {
            base_version,
            steps: Vec::new(),
        }
    }

    /// Queue a block insertion
    pub fn insert_block(&mut self, at: Position, kind: BlockKind, text: impl Into<String>) -> &mut Self {
        self.steps.push(Step::InsertBlock {
            at,
            kind,
            text: text.into(),
        });
        self
    }

    /// Queue a block removal
    pub fn remove_block(&mut self, at: Position) -> &mut Self {
        self.steps.push(Step::RemoveBlock { at });
        self
    }

    pub fn base_version(&self) -> u64 {
        self.base_version
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Why a transaction was not applied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("document changed since the transaction began (base version {base}, current {current})")]
    Stale { base: u64, current: u64 },

    #[error("position {0} is not a block boundary")]
    InvalidPosition(Position),

    #[error("node type `{0}` is not registered in the document schema")]
    SchemaMissing(NodeType),
}

/// Result of applying a transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionResult {
    /// New document version after this transaction
    pub version: u64,
    /// Blocks that were created
    pub inserted: SmallVec<[BlockId; 2]>,
    /// Blocks that were removed
    pub removed: SmallVec<[BlockId; 2]>,
}

impl TransactionResult {
    /// Check if any blocks were affected
    pub fn has_changes(&self) -> bool {
        !self.inserted.is_empty() || !self.removed.is_empty()
    }
}
