//! HTML templating
//!
//! Thin wrapper over a `minijinja` environment that loads templates from a
//! directory on first use. The handle is cheap to clone so route handlers can
//! capture it.

use std::path::Path;
use std::sync::Arc;

use minijinja::{path_loader, Environment};
use serde::Serialize;

use crate::error::Result;

#[derive(Clone)]
pub struct Templates {
    env: Arc<Environment<'static>>,
}

impl Templates {
    /// Load templates by name from files under `dir`
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(dir.as_ref().to_path_buf()));
        Self::from_environment(env)
    }

    /// Use a preconfigured environment (custom filters, inline templates)
    pub fn from_environment(env: Environment<'static>) -> Self {
        Self { env: Arc::new(env) }
    }

    /// Render template `name` with `context`
    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String> {
        let template = self.env.get_template(name)?;
        Ok(template.render(context)?)
    }
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Templates").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;

    #[test]
    fn test_render_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("test.html"),
            "<html><title>{{ new_title }}</title><body>{{ new_body }}</body></html>",
        )
        .unwrap();

        let templates = Templates::from_dir(dir.path());
        let context = HashMap::from([("new_title", "Best title"), ("new_body", "Best body")]);
        let html = templates.render("test.html", &context).unwrap();
        assert!(html.contains("<title>Best title</title>"));
        assert!(html.contains("<body>Best body</body>"));
    }

    #[test]
    fn test_html_context_is_escaped() {
        let mut env = Environment::new();
        env.add_template("page.html", "<p>{{ body }}</p>").unwrap();
        let templates = Templates::from_environment(env);
        let html = templates
            .render("page.html", minijinja::context! { body => "a < b & c" })
            .unwrap();
        assert_eq!(html, "<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn test_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let templates = Templates::from_dir(dir.path());
        let err = templates.render("nope.html", ()).unwrap_err();
        assert!(matches!(err, Error::Template(_)));
    }
}
