use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

// Placeholders look like {table_schemas}; anything else is literal text.
static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern must compile"));

#[derive(Debug)]
pub enum PromptError {
    TemplateNotFound(String),
    UnknownPlaceholder(String),
}

impl std::fmt::Display for PromptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptError::TemplateNotFound(path) => {
                write!(f, "Prompt template not found: {}", path)
            }
            PromptError::UnknownPlaceholder(name) => {
                write!(f, "Unknown placeholder in template: {}", name)
            }
        }
    }
}

impl std::error::Error for PromptError {}

/// A prompt template with named placeholders.
///
/// The set of recognized placeholders is fixed per template version; a
/// placeholder with no substitution is an error, caught before any text is
/// substituted so content containing braces cannot confuse the scan.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: String) -> Self {
        Self { template }
    }

    pub fn render(&self, substitutions: &[(&str, &str)]) -> Result<String, PromptError> {
        for capture in PLACEHOLDER_PATTERN.captures_iter(&self.template) {
            let name = &capture[1];
            if !substitutions.iter().any(|(key, _)| *key == name) {
                return Err(PromptError::UnknownPlaceholder(name.to_string()));
            }
        }

        let mut rendered = self.template.clone();
        for (key, value) in substitutions {
            rendered = rendered.replace(&format!("{{{}}}", key), value);
        }
        Ok(rendered)
    }
}

/// Reads a prompt template file from disk. A missing template is a fatal
/// startup error, surfaced when the loader runs at container construction.
#[derive(Debug, Clone)]
pub struct PromptLoader {
    template_path: PathBuf,
}

impl PromptLoader {
    pub fn new(template_path: &Path) -> Self {
        Self {
            template_path: template_path.to_path_buf(),
        }
    }

    pub fn load(&self) -> Result<PromptTemplate, PromptError> {
        let template = std::fs::read_to_string(&self.template_path)
            .map_err(|_| PromptError::TemplateNotFound(self.template_path.display().to_string()))?;
        Ok(PromptTemplate::new(template))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_render_fills_every_placeholder() {
        let template = PromptTemplate::new(
            "Dialect: {dialect}\nQuestion: {question}\nAgain: {question}".to_string(),
        );

        let rendered = template
            .render(&[("dialect", "SQLite"), ("question", "total sales?")])
            .unwrap();

        assert_eq!(
            rendered,
            "Dialect: SQLite\nQuestion: total sales?\nAgain: total sales?"
        );
    }

    #[test]
    fn test_unknown_placeholder_is_an_error() {
        let template = PromptTemplate::new("Hello {nobody}".to_string());

        let err = template.render(&[("dialect", "SQLite")]).unwrap_err();

        assert!(matches!(err, PromptError::UnknownPlaceholder(name) if name == "nobody"));
    }

    #[test]
    fn test_substituted_content_may_contain_braces() {
        let template = PromptTemplate::new("Schemas: {table_schemas}".to_string());

        let rendered = template
            .render(&[("table_schemas", r#"{"table_name": "orders"}"#)])
            .unwrap();

        assert_eq!(rendered, r#"Schemas: {"table_name": "orders"}"#);
    }

    #[test]
    fn test_loader_reads_template_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "Q: {{question}}").unwrap();

        let template = PromptLoader::new(&path).load().unwrap();
        let rendered = template.render(&[("question", "hi")]).unwrap();

        assert_eq!(rendered, "Q: hi");
    }

    #[test]
    fn test_missing_template_is_an_error() {
        let err = PromptLoader::new(Path::new("/nonexistent/prompt.txt"))
            .load()
            .unwrap_err();

        assert!(matches!(err, PromptError::TemplateNotFound(_)));
    }
}
