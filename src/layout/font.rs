//! Font metrics for layout

/// Metrics needed for text layout
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    /// Line height in logical pixels
    pub line_height: f32,
    /// Width of ASCII characters (0-127)
    pub char_widths: Vec<f32>,
    /// Default width for non-ASCII characters
    pub default_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        // 14px * 1.2 line height, 8.41px monospace advance
        Self::monospace(16.8, 8.41)
    }
}

impl FontMetrics {
    pub fn new(line_height: f32, char_widths: Vec<f32>, default_width: f32) -> Self {
        Self {
            line_height,
            char_widths,
            default_width,
        }
    }

    /// Every character has the same advance
    pub fn monospace(line_height: f32, width: f32) -> Self {
        Self::new(line_height, vec![width; 128], width)
    }

    /// Get width of a character
    pub fn width(&self, c: char) -> f32 {
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        self.default_width
    }

    /// Width of a run of text. Tabs count as four default advances, control
    /// characters as nothing.
    pub fn text_width(&self, text: &str) -> f32 {
        text.chars()
            .map(|c| match c {
                '\t' => self.default_width * 4.0,
                c if c.is_control() => 0.0,
                c => self.width(c),
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        let metrics = FontMetrics::monospace(10.0, 8.0);
        assert_eq!(metrics.text_width("abc"), 24.0);
        assert_eq!(metrics.text_width("a\tb"), 48.0);
        assert_eq!(metrics.text_width("a\n"), 8.0);
        assert_eq!(metrics.text_width("é"), 8.0);
    }
}
