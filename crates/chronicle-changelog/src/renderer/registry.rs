//! Renderer registry

use std::sync::Arc;

use super::{
    ChangelogRenderer, HtmlRenderer, JsonRenderer, MarkdownRenderer, RstRenderer, TextRenderer,
};

/// Registry of available changelog renderers
pub struct RendererRegistry {
    renderers: Vec<Arc<dyn ChangelogRenderer>>,
}

impl RendererRegistry {
    /// Create a new registry with all built-in renderers
    pub fn new() -> Self {
        Self {
            renderers: vec![
                Arc::new(TextRenderer::new()),
                Arc::new(MarkdownRenderer::new()),
                Arc::new(HtmlRenderer::new()),
                Arc::new(RstRenderer::new()),
                Arc::new(JsonRenderer::new()),
            ],
        }
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            renderers: Vec::new(),
        }
    }

    /// Register a renderer
    pub fn register<R: ChangelogRenderer + 'static>(&mut self, renderer: R) {
        self.renderers.push(Arc::new(renderer));
    }

    /// Get renderer by name, alias or file extension (case-insensitive)
    pub fn get(&self, format: &str) -> Option<Arc<dyn ChangelogRenderer>> {
        let format = format.trim().to_ascii_lowercase();
        self.renderers
            .iter()
            .find(|r| {
                r.name() == format || r.extension() == format || r.aliases().contains(&format.as_str())
            })
            .cloned()
    }

    /// Get all renderer names
    pub fn names(&self) -> Vec<&'static str> {
        self.renderers.iter().map(|r| r.name()).collect()
    }

    /// Every name, extension and alias `get` accepts
    pub fn formats(&self) -> Vec<&'static str> {
        let mut formats = Vec::new();
        for renderer in &self.renderers {
            for format in [renderer.name(), renderer.extension()]
                .into_iter()
                .chain(renderer.aliases().iter().copied())
            {
                if !formats.contains(&format) {
                    formats.push(format);
                }
            }
        }
        formats
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = RendererRegistry::new();
        assert_eq!(registry.renderers.len(), 5);
    }

    #[test]
    fn test_get_by_name_and_extension() {
        let registry = RendererRegistry::new();
        assert_eq!(registry.get("markdown").unwrap().name(), "markdown");
        assert_eq!(registry.get("md").unwrap().name(), "markdown");
        assert_eq!(registry.get("txt").unwrap().name(), "text");
        assert_eq!(registry.get("HTML").unwrap().name(), "html");
        assert_eq!(registry.get("htm").unwrap().name(), "html");
        assert_eq!(registry.get("restructuredtext").unwrap().name(), "rst");
        assert!(registry.get("pdf").is_none());
    }

    #[test]
    fn test_names() {
        let registry = RendererRegistry::new();
        assert_eq!(registry.names(), vec!["text", "markdown", "html", "rst", "json"]);
    }

    #[test]
    fn test_formats_match_config_validation() {
        use chronicle_core::config::defaults::KNOWN_FORMATS;

        let mut formats = RendererRegistry::new().formats();
        formats.sort_unstable();
        let mut known = KNOWN_FORMATS.to_vec();
        known.sort_unstable();
        assert_eq!(formats, known);
    }

    #[test]
    fn test_empty_registry() {
        let mut registry = RendererRegistry::empty();
        assert!(registry.names().is_empty());
        registry.register(TextRenderer::new());
        assert!(registry.get("text").is_some());
    }
}
