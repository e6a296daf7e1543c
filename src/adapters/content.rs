//! Static template pool for synthesized post copy.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::PostFormat;
use crate::domain::ports::ContentProvider;

/// Serves fixed copy per format. Used when no content-generation service is
/// wired in.
#[derive(Debug, Clone)]
pub struct StaticTemplateProvider {
    templates: HashMap<PostFormat, Vec<String>>,
}

impl Default for StaticTemplateProvider {
    fn default() -> Self {
        let mut templates = HashMap::new();
        templates.insert(
            PostFormat::Reels,
            to_strings(&[
                "Behind the scenes of our top-performing content!",
                "You loved our last video, so here's more!",
                "Building on what's working - more engaging content coming your way!",
            ]),
        );
        templates.insert(
            PostFormat::Story,
            to_strings(&[
                "Quick update on our successful campaign!",
                "More insights from our trending story!",
                "Following up on what you're loving!",
            ]),
        );
        templates.insert(
            PostFormat::Post,
            to_strings(&[
                "Continuing our successful content series!",
                "More of what's working for our community!",
                "Building momentum with proven content!",
            ]),
        );
        Self { templates }
    }
}

impl StaticTemplateProvider {
    /// A provider with no copy for any format.
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn with_templates(mut self, format: PostFormat, templates: Vec<String>) -> Self {
        self.templates.insert(format, templates);
        self
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[async_trait]
impl ContentProvider for StaticTemplateProvider {
    async fn templates_for(&self, format: PostFormat) -> DomainResult<Vec<String>> {
        Ok(self.templates.get(&format).cloned().unwrap_or_default())
    }
}
