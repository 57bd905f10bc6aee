//! The page surface the bridge reads from and writes to.
//!
//! The bridge never looks elements up by itself: it is handed a [`View`] and
//! only touches the five elements through it. [`MemoryDocument`] is an
//! in-process page used by the CLI and by tests.

use crate::FormFields;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Identifiers of the elements on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementIds {
    pub button: String,
    pub real: String,
    pub imaginary: String,
    pub zoom: String,
    pub iterations: String,
    pub image: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            button: "button".to_string(),
            real: "real_number".to_string(),
            imaginary: "imaginary_number".to_string(),
            zoom: "zoom".to_string(),
            iterations: "iterations".to_string(),
            // Misspelling matches the markup served with the generator
            image: "mandlebrot".to_string(),
        }
    }
}

/// A console line produced by the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleMessage {
    /// "log" or "error"
    pub level: String,
    pub text: String,
}

impl ConsoleMessage {
    pub fn log(text: impl Into<String>) -> Self {
        Self {
            level: "log".to_string(),
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: "error".to_string(),
            text: text.into(),
        }
    }
}

/// View-model interface over the form, the image and the console.
pub trait View: Send + Sync {
    /// Snapshot the four input fields as raw text.
    fn read_fields(&self) -> FormFields;

    /// Current `src` of the image element, if any.
    fn image_source(&self) -> Option<String>;

    /// Replace the `src` of the image element.
    fn set_image_source(&self, src: String);

    /// Write a line to the console.
    fn console(&self, msg: ConsoleMessage);
}

type OnConsoleHandler = Arc<dyn Fn(&ConsoleMessage) + Send + Sync>;

#[derive(Default)]
struct DocumentState {
    values: HashMap<String, String>,
    sources: HashMap<String, String>,
    image_writes: usize,
    console: Vec<ConsoleMessage>,
}

/// An in-memory page holding input values, image sources and console output.
pub struct MemoryDocument {
    ids: ElementIds,
    state: Mutex<DocumentState>,
    on_console: Option<OnConsoleHandler>,
}

impl MemoryDocument {
    pub fn new(ids: ElementIds) -> Self {
        let mut values = HashMap::new();
        for id in [&ids.real, &ids.imaginary, &ids.zoom, &ids.iterations] {
            values.insert(id.clone(), String::new());
        }
        Self {
            ids,
            state: Mutex::new(DocumentState {
                values,
                ..Default::default()
            }),
            on_console: None,
        }
    }

    /// Pre-fill the form with the given values.
    pub fn with_fields(ids: ElementIds, fields: &FormFields) -> Self {
        let doc = Self::new(ids);
        doc.fill(fields);
        doc
    }

    /// Forward every console line to `cb` in addition to buffering it.
    pub fn on_console<F>(&mut self, cb: F)
    where
        F: Fn(&ConsoleMessage) + Send + Sync + 'static,
    {
        self.on_console = Some(Arc::new(cb));
    }

    /// Set the value of an input element, as if the user typed it.
    pub fn set_value(&self, id: &str, value: impl Into<String>) {
        let mut st = self.state.lock().unwrap();
        st.values.insert(id.to_string(), value.into());
    }

    pub fn value(&self, id: &str) -> Option<String> {
        self.state.lock().unwrap().values.get(id).cloned()
    }

    /// Overwrite all four inputs at once.
    pub fn fill(&self, fields: &FormFields) {
        self.set_value(&self.ids.real, fields.real.clone());
        self.set_value(&self.ids.imaginary, fields.imaginary.clone());
        self.set_value(&self.ids.zoom, fields.zoom.clone());
        self.set_value(&self.ids.iterations, fields.iterations.clone());
    }

    /// How many times the image `src` has been written.
    pub fn image_writes(&self) -> usize {
        self.state.lock().unwrap().image_writes
    }

    /// Buffered console output, oldest first.
    pub fn console_messages(&self) -> Vec<ConsoleMessage> {
        self.state.lock().unwrap().console.clone()
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new(ElementIds::default())
    }
}

impl View for MemoryDocument {
    fn read_fields(&self) -> FormFields {
        let st = self.state.lock().unwrap();
        let get = |id: &str| st.values.get(id).cloned().unwrap_or_default();
        FormFields {
            real: get(&self.ids.real),
            imaginary: get(&self.ids.imaginary),
            zoom: get(&self.ids.zoom),
            iterations: get(&self.ids.iterations),
        }
    }

    fn image_source(&self) -> Option<String> {
        self.state.lock().unwrap().sources.get(&self.ids.image).cloned()
    }

    fn set_image_source(&self, src: String) {
        let mut st = self.state.lock().unwrap();
        st.sources.insert(self.ids.image.clone(), src);
        st.image_writes += 1;
    }

    fn console(&self, msg: ConsoleMessage) {
        if let Some(cb) = &self.on_console {
            cb(&msg);
        }
        self.state.lock().unwrap().console.push(msg);
    }
}
