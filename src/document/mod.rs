//! Document model: an ordered list of blocks addressed by tree positions

mod block;
mod html;
mod schema;

pub use block::{Block, BlockId, BlockKind, BreakKind, ListId, ListMarker, UnknownBreakKind};
pub use html::HtmlError;
pub use schema::{NodeType, Schema};

use crate::editing::{Position, Step, Transaction, TransactionError, TransactionResult};
use smallvec::SmallVec;

/// The main document structure
#[derive(Debug, Clone)]
pub struct Document {
    /// Blocks in document order
    blocks: Vec<Block>,
    /// Node types this document accepts
    schema: Schema,
    /// Monotonic version counter
    version: u64,
    /// Next block ID to assign
    next_block_id: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new document holding one empty paragraph
    pub fn new() -> Self {
        Self::with_schema(Schema::default())
    }

    /// Create an empty document with a custom schema
    pub fn with_schema(schema: Schema) -> Self {
        let mut doc = Self::empty(schema);
        doc.ensure_block();
        doc
    }

    /// Create a document from plain text, one paragraph per line
    pub fn from_text(text: &str) -> Self {
        let mut doc = Self::empty(Schema::default());
        for line in text.lines() {
            let id = doc.allocate_id();
            doc.blocks.push(Block::new(id, BlockKind::Paragraph, line));
        }
        doc.ensure_block();
        doc
    }

    /// Document with no blocks at all, used while loading
    pub(crate) fn empty(schema: Schema) -> Self {
        Self {
            blocks: Vec::new(),
            schema,
            version: 0,
            next_block_id: 0,
        }
    }

    /// Append a block while loading, bypassing transactions
    pub(crate) fn push_loaded(&mut self, kind: BlockKind, text: String) {
        let id = self.allocate_id();
        self.blocks.push(Block::new(id, kind, text));
    }

    /// Ensure at least one block exists
    pub(crate) fn ensure_block(&mut self) {
        if self.blocks.is_empty() {
            let id = self.allocate_id();
            self.blocks.push(Block::new(id, BlockKind::Paragraph, ""));
        }
    }

    fn allocate_id(&mut self) -> BlockId {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        id
    }

    /// Get the document version
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Get the schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Get block count
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check whether the document has no text and no page breaks
    pub fn is_empty(&self) -> bool {
        self.blocks
            .iter()
            .all(|b| b.text.is_empty() && !b.kind.is_page_break())
    }

    /// Total number of positions in the document
    pub fn content_size(&self) -> usize {
        self.blocks.iter().map(Block::node_size).sum()
    }

    /// Blocks in document order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Iterate blocks together with their start positions
    pub fn positioned(&self) -> impl Iterator<Item = (Position, &Block)> + '_ {
        self.blocks.iter().scan(0usize, |pos, block| {
            let start = *pos;
            *pos += block.node_size();
            Some((Position(start), block))
        })
    }

    /// Get a block by ID
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Get the start position of a block
    pub fn position_of(&self, id: BlockId) -> Option<Position> {
        self.positioned()
            .find(|(_, b)| b.id == id)
            .map(|(pos, _)| pos)
    }

    /// Get the block starting exactly at `pos`
    pub fn block_at(&self, pos: Position) -> Option<&Block> {
        self.positioned()
            .take_while(|(start, _)| *start <= pos)
            .find(|(start, _)| *start == pos)
            .map(|(_, b)| b)
    }

    /// Get the first block ID
    pub fn first_block(&self) -> Option<BlockId> {
        self.blocks.first().map(|b| b.id)
    }

    /// Page break markers with their positions
    pub fn page_breaks(&self) -> impl Iterator<Item = (Position, BreakKind)> + '_ {
        self.positioned()
            .filter_map(|(pos, b)| b.kind.break_kind().map(|kind| (pos, kind)))
    }

    /// Get the full document text, one block per line
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .filter(|b| !b.kind.is_atom())
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Begin a transaction against the current version
    pub fn transaction(&self) -> Transaction {
        Transaction::new(self.version)
    }

    /// Apply a transaction atomically.
    ///
    /// Either every step applies and the version advances, or the document is
    /// left untouched.
    pub fn apply(&mut self, txn: Transaction) -> Result<TransactionResult, TransactionError> {
        if txn.base_version() != self.version {
            return Err(TransactionError::Stale {
                base: txn.base_version(),
                current: self.version,
            });
        }

        let mut working = self.blocks.clone();
        let mut next_id = self.next_block_id;
        let mut inserted: SmallVec<[BlockId; 2]> = SmallVec::new();
        let mut removed: SmallVec<[BlockId; 2]> = SmallVec::new();

        for step in txn.steps() {
            match step {
                Step::InsertBlock { at, kind, text } => {
                    let node_type = kind.node_type();
                    if !self.schema.contains(node_type) {
                        return Err(TransactionError::SchemaMissing(node_type));
                    }
                    let index = boundary_index(&working, *at)
                        .ok_or(TransactionError::InvalidPosition(*at))?;
                    let id = BlockId(next_id);
                    next_id += 1;
                    working.insert(index, Block::new(id, kind.clone(), text.as_str()));
                    inserted.push(id);
                }
                Step::RemoveBlock { at } => {
                    let index = boundary_index(&working, *at)
                        .filter(|&i| i < working.len())
                        .ok_or(TransactionError::InvalidPosition(*at))?;
                    removed.push(working.remove(index).id);
                }
            }
        }

        self.blocks = working;
        self.next_block_id = next_id;
        self.version += 1;
        self.ensure_block_after_edit();

        Ok(TransactionResult {
            version: self.version,
            inserted,
            removed,
        })
    }

    /// Append a block at the end of the document
    pub fn push_block(
        &mut self,
        kind: BlockKind,
        text: impl Into<String>,
    ) -> Result<BlockId, TransactionError> {
        let at = Position(self.content_size());
        let mut txn = self.transaction();
        txn.insert_block(at, kind, text);
        first_inserted(self.apply(txn)?, at)
    }

    /// Insert a block directly after another one
    pub fn insert_block_after(
        &mut self,
        after: BlockId,
        kind: BlockKind,
        text: impl Into<String>,
    ) -> Result<BlockId, TransactionError> {
        let index = self
            .blocks
            .iter()
            .position(|b| b.id == after)
            .ok_or(TransactionError::InvalidPosition(Position(self.content_size())))?;
        let at: usize = self.blocks[..=index].iter().map(Block::node_size).sum();
        let at = Position(at);
        let mut txn = self.transaction();
        txn.insert_block(at, kind, text);
        first_inserted(self.apply(txn)?, at)
    }

    /// Append text to a text block. Returns false for unknown blocks and atoms.
    pub fn append_text(&mut self, id: BlockId, text: &str) -> bool {
        match self.blocks.iter_mut().find(|b| b.id == id) {
            Some(block) if !block.kind.is_atom() => {
                block.text.push_str(text);
                self.version += 1;
                true
            }
            _ => false,
        }
    }

    /// Remove a block by ID
    pub fn remove_block(&mut self, id: BlockId) -> Option<Block> {
        let index = self.blocks.iter().position(|b| b.id == id)?;
        let block = self.blocks.remove(index);
        self.version += 1;
        self.ensure_block_after_edit();
        Some(block)
    }

    fn ensure_block_after_edit(&mut self) {
        if self.blocks.is_empty() {
            self.ensure_block();
        }
    }
}

fn first_inserted(result: TransactionResult, at: Position) -> Result<BlockId, TransactionError> {
    result
        .inserted
        .first()
        .copied()
        .ok_or(TransactionError::InvalidPosition(at))
}

/// Index of the block starting at `pos`, or `blocks.len()` when `pos` is the
/// end of the document. `None` if `pos` falls inside a block.
fn boundary_index(blocks: &[Block], pos: Position) -> Option<usize> {
    let mut start = 0usize;
    for (index, block) in blocks.iter().enumerate() {
        if start == pos.0 {
            return Some(index);
        }
        if start > pos.0 {
            return None;
        }
        start += block.node_size();
    }
    (start == pos.0).then_some(blocks.len())
}
