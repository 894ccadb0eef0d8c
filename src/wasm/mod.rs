//! WASM bindings for the editor
//!
//! Structured values cross the bridge as JSON strings; errors become JS
//! `Error` objects.

use crate::{CheckOutcome, Config, Editor, FontMetrics, PageGeometry, SystemClock};
use serde::Serialize;
use std::fmt::Display;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn js_error(err: impl Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// WASM-exposed editor wrapper
#[wasm_bindgen]
pub struct WasmEditor {
    editor: Editor,
    config: Config,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor with the default page (US Letter) and timings
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            editor: Editor::default(),
            config: Config::default(),
        }
    }

    /// Create an editor from a JSON configuration
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(json: &str) -> Result<WasmEditor, JsValue> {
        let config = Config::from_json(json).map_err(js_error)?;
        let editor = Editor::new(config, SystemClock).map_err(js_error)?;
        Ok(Self { editor, config })
    }

    /// Replace the document with saved markup. Pending checks of the old
    /// document are dropped.
    #[wasm_bindgen(js_name = loadHtml)]
    pub fn load_html(&mut self, html: &str) -> Result<(), JsValue> {
        let editor = Editor::from_html(html, self.config, SystemClock).map_err(js_error)?;
        self.editor.destroy();
        self.editor = editor;
        Ok(())
    }

    #[wasm_bindgen(js_name = toHtml)]
    pub fn to_html(&self) -> String {
        self.editor.to_html()
    }

    #[wasm_bindgen(js_name = getText)]
    pub fn get_text(&self) -> String {
        self.editor.text()
    }

    #[wasm_bindgen(js_name = pushParagraph)]
    pub fn push_paragraph(&mut self, text: &str) -> Result<(), JsValue> {
        self.editor.push_paragraph(text).map(drop).map_err(js_error)
    }

    #[wasm_bindgen(js_name = pushHeading)]
    pub fn push_heading(&mut self, level: u8, text: &str) -> Result<(), JsValue> {
        self.editor.push_heading(level, text).map(drop).map_err(js_error)
    }

    /// Font metrics measured by the host, applied to every character
    #[wasm_bindgen(js_name = setFontMetrics)]
    pub fn set_font_metrics(&mut self, line_height: f32, char_width: f32) {
        self.editor
            .set_font_metrics(FontMetrics::monospace(line_height, char_width));
    }

    // ---- Commands ----

    #[wasm_bindgen(js_name = insertManualPageBreak)]
    pub fn insert_manual_page_break(&mut self) -> Result<(), JsValue> {
        self.editor
            .insert_manual_page_break()
            .map(drop)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = enableAutoPageBreak)]
    pub fn enable_auto_page_break(&mut self) {
        self.editor.enable_auto_page_break();
    }

    #[wasm_bindgen(js_name = disableAutoPageBreak)]
    pub fn disable_auto_page_break(&mut self) {
        self.editor.disable_auto_page_break();
    }

    #[wasm_bindgen(js_name = isAutoPageBreakEnabled)]
    pub fn is_auto_page_break_enabled(&self) -> bool {
        self.editor.is_auto_page_break_enabled()
    }

    /// Paginate now. Returns the check outcome, e.g. `"inserted"`.
    #[wasm_bindgen(js_name = checkPageOverflow)]
    pub fn check_page_overflow(&mut self) -> String {
        self.editor.check_page_overflow().as_str().to_string()
    }

    /// Returns how many automatic breaks were removed
    #[wasm_bindgen(js_name = removeAutomaticBreaks)]
    pub fn remove_automatic_breaks(&mut self) -> Result<u32, JsValue> {
        let removed = self.editor.remove_automatic_breaks().map_err(js_error)?;
        Ok(removed as u32)
    }

    // ---- Events ----

    /// Scroll container moved. Returns the page indicator JSON.
    #[wasm_bindgen(js_name = onScroll)]
    pub fn on_scroll(&mut self, offset: f32) -> String {
        let indicator = self.editor.scroll_to(offset);
        to_json(&indicator)
    }

    /// Rendered surface resized
    #[wasm_bindgen(js_name = onLayoutChange)]
    pub fn on_layout_change(&mut self) {
        self.editor.layout_changed();
    }

    /// Epoch milliseconds at which `tick` should next be called
    #[wasm_bindgen(js_name = nextDeadline)]
    pub fn next_deadline(&self) -> Option<f64> {
        self.editor.next_deadline().map(|ms| ms as f64)
    }

    /// Run the debounced check if due. Returns the outcome when a check ran.
    pub fn tick(&mut self) -> Option<String> {
        self.editor
            .tick()
            .map(|outcome: CheckOutcome| outcome.as_str().to_string())
    }

    pub fn destroy(&mut self) {
        self.editor.destroy();
    }

    // ---- Reactive values ----

    /// `{ currentPage, totalPages }` as JSON
    #[wasm_bindgen(js_name = getPagination)]
    pub fn get_pagination(&self) -> String {
        to_json(&self.editor.pagination())
    }

    /// Page geometry constants for drawing page backgrounds
    #[wasm_bindgen(js_name = getPageGeometry)]
    pub fn get_page_geometry(&self) -> String {
        to_json(&GeometryInfo::from(self.editor.geometry()))
    }

    #[wasm_bindgen(js_name = getPageCount)]
    pub fn get_page_count(&self) -> u32 {
        self.editor.pagination().total_pages
    }
}

impl Default for WasmEditor {
    fn default() -> Self {
        Self::new()
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        tracing::warn!(%err, "failed to serialize value for JS");
        "null".to_string()
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeometryInfo {
    #[serde(flatten)]
    page: PageGeometry,
    content_width: f32,
    content_height: f32,
}

impl From<&PageGeometry> for GeometryInfo {
    fn from(page: &PageGeometry) -> Self {
        Self {
            page: *page,
            content_width: page.content_width(),
            content_height: page.content_height(),
        }
    }
}
