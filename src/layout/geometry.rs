//! Page geometry shared by layout, pagination and page chrome

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Physical page dimensions in device-independent pixels.
///
/// Every height comparison in the pagination engine goes through
/// [`PageGeometry::content_height`], never the raw page height. The one
/// exception is scroll position, which is measured in whole pages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    /// Uniform margin on all four sides
    pub margin_size: f32,
    pub header_height: f32,
    pub footer_height: f32,
    /// When set, header and footer bands are rendered in the page flow and
    /// replace the top and bottom margins.
    pub header_footer_in_flow: bool,
}

/// US Letter at 96 DPI with one inch margins
pub const US_LETTER: PageGeometry = PageGeometry {
    page_width: 816.0,
    page_height: 1056.0,
    margin_size: 96.0,
    header_height: 96.0,
    footer_height: 96.0,
    header_footer_in_flow: false,
};

impl Default for PageGeometry {
    fn default() -> Self {
        US_LETTER
    }
}

impl PageGeometry {
    /// Get usable content height per page
    pub fn content_height(&self) -> f32 {
        if self.header_footer_in_flow {
            self.page_height - self.header_height - self.footer_height
        } else {
            self.page_height - 2.0 * self.margin_size
        }
    }

    /// Get usable content width
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin_size
    }

    /// Check that the geometry describes a usable page
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dimensions = [
            ("pageWidth", self.page_width),
            ("pageHeight", self.page_height),
            ("marginSize", self.margin_size),
            ("headerHeight", self.header_height),
            ("footerHeight", self.footer_height),
        ];
        for (name, value) in dimensions {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDimension { name, value });
            }
        }

        let height = self.content_height();
        let width = self.content_width();
        if height <= 0.0 || width <= 0.0 {
            return Err(ConfigError::EmptyContentArea { width, height });
        }
        Ok(())
    }
}
