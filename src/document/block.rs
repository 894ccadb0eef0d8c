//! Block-level element metadata

use crate::document::NodeType;
use std::fmt;
use std::str::FromStr;

/// Stable identifier for blocks that survives edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BlockId(pub u64);

/// Unique identifier for a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListId(pub u64);

/// Type of list marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListMarker {
    Bullet,
    Numbered { ordinal: u32 },
}

/// Who authored a page break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BreakKind {
    /// Requested by the user. Never removed or moved by the engine.
    Manual,
    /// Inserted by auto-pagination when content overflowed a page.
    Automatic,
}

impl BreakKind {
    /// Attribute value used in persisted markup
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakKind::Manual => "manual",
            BreakKind::Automatic => "automatic",
        }
    }
}

impl fmt::Display for BreakKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a `data-kind` value is neither `manual` nor `automatic`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBreakKind(pub String);

impl FromStr for BreakKind {
    type Err = UnknownBreakKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "manual" => Ok(BreakKind::Manual),
            "automatic" => Ok(BreakKind::Automatic),
            other => Err(UnknownBreakKind(other.to_string())),
        }
    }
}

/// The kind of block element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum BlockKind {
    /// Regular paragraph
    #[default]
    Paragraph,
    /// Heading with level (1-6)
    Heading { level: u8 },
    /// List item
    ListItem {
        list_id: ListId,
        indent_level: u8,
        marker: ListMarker,
    },
    /// Page boundary. An atom: it has no content.
    PageBreak { kind: BreakKind },
}

impl BlockKind {
    /// Create a heading, clamping the level into 1..=6
    pub fn heading(level: u8) -> Self {
        BlockKind::Heading {
            level: level.clamp(1, 6),
        }
    }

    /// Create a page break marker
    pub fn page_break(kind: BreakKind) -> Self {
        BlockKind::PageBreak { kind }
    }

    /// Schema node type for this block
    pub fn node_type(&self) -> NodeType {
        match self {
            BlockKind::Paragraph => NodeType::Paragraph,
            BlockKind::Heading { .. } => NodeType::Heading,
            BlockKind::ListItem { .. } => NodeType::ListItem,
            BlockKind::PageBreak { .. } => NodeType::PageBreak,
        }
    }

    /// Get the line height multiplier for this block kind
    pub fn line_height_multiplier(&self) -> f32 {
        match self {
            BlockKind::Paragraph => 1.0,
            BlockKind::Heading { level } => match level {
                1 => 1.5,
                2 => 1.4,
                3 => 1.3,
                _ => 1.2,
            },
            BlockKind::ListItem { .. } => 1.0,
            BlockKind::PageBreak { .. } => 0.0,
        }
    }

    /// Get the spacing after this block (in line heights)
    pub fn spacing_after(&self) -> f32 {
        match self {
            BlockKind::Paragraph => 1.0,
            BlockKind::Heading { .. } => 0.5,
            BlockKind::ListItem { .. } => 0.25,
            BlockKind::PageBreak { .. } => 0.0,
        }
    }

    /// Check if this is a heading
    pub fn is_heading(&self) -> bool {
        matches!(self, BlockKind::Heading { .. })
    }

    /// Check if this is a list item
    pub fn is_list_item(&self) -> bool {
        matches!(self, BlockKind::ListItem { .. })
    }

    /// Check if this is a page break of any kind
    pub fn is_page_break(&self) -> bool {
        matches!(self, BlockKind::PageBreak { .. })
    }

    /// The break kind, if this block is a page break
    pub fn break_kind(&self) -> Option<BreakKind> {
        match self {
            BlockKind::PageBreak { kind } => Some(*kind),
            _ => None,
        }
    }

    /// Atoms occupy a single position and carry no text
    pub fn is_atom(&self) -> bool {
        self.is_page_break()
    }
}

/// A block in the document
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    /// Text content. Always empty for atoms.
    pub text: String,
}

impl Block {
    pub fn new(id: BlockId, kind: BlockKind, text: impl Into<String>) -> Self {
        let text = if kind.is_atom() {
            String::new()
        } else {
            text.into()
        };
        Self { id, kind, text }
    }

    /// Number of positions this block occupies.
    ///
    /// Text blocks count an opening token, one position per character and a
    /// closing token. Atoms count as one.
    pub fn node_size(&self) -> usize {
        if self.kind.is_atom() {
            1
        } else {
            self.text.chars().count() + 2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_kind() {
        let para = BlockKind::Paragraph;
        assert!(!para.is_heading());
        assert!(!para.is_list_item());
        assert!(!para.is_page_break());

        let heading = BlockKind::Heading { level: 1 };
        assert!(heading.is_heading());

        let list = BlockKind::ListItem {
            list_id: ListId(0),
            indent_level: 0,
            marker: ListMarker::Bullet,
        };
        assert!(list.is_list_item());

        let marker = BlockKind::page_break(BreakKind::Automatic);
        assert!(marker.is_atom());
        assert_eq!(marker.break_kind(), Some(BreakKind::Automatic));
        assert_eq!(marker.node_type(), NodeType::PageBreak);
    }

    #[test]
    fn test_heading_level_is_clamped() {
        assert_eq!(BlockKind::heading(0), BlockKind::Heading { level: 1 });
        assert_eq!(BlockKind::heading(9), BlockKind::Heading { level: 6 });
    }

    #[test]
    fn test_break_kind_parse() {
        assert_eq!("manual".parse::<BreakKind>(), Ok(BreakKind::Manual));
        assert_eq!(" automatic ".parse::<BreakKind>(), Ok(BreakKind::Automatic));
        assert!("sometimes".parse::<BreakKind>().is_err());
        assert_eq!(BreakKind::Automatic.to_string(), "automatic");
    }

    #[test]
    fn test_node_size() {
        let para = Block::new(BlockId(0), BlockKind::Paragraph, "héllo");
        assert_eq!(para.node_size(), 7);

        let empty = Block::new(BlockId(1), BlockKind::Paragraph, "");
        assert_eq!(empty.node_size(), 2);

        let marker = Block::new(BlockId(2), BlockKind::page_break(BreakKind::Manual), "ignored");
        assert_eq!(marker.node_size(), 1);
        assert!(marker.text.is_empty());
    }
}
