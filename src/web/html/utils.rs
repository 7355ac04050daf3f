use html_minifier::HTMLMinifier;
use tera::Context;
use thiserror::Error;
use tracing::error;

use crate::State;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("rendering error")]
    Tera(#[from] tera::Error),
}

/// Renders `template` and minifies the result, falling back to the
/// unminified output if minification fails.
pub(super) fn render(
    state: &State,
    template: &'static str,
    context: &Context,
) -> Result<String, TemplateError> {
    let rendered = state.tera.render(template, context)?;
    Ok(minify(rendered))
}

fn minify(rendered: String) -> String {
    let mut html_minifier = HTMLMinifier::new();
    if let Err(err) = html_minifier.digest(&rendered) {
        error!("Failed to minify HTML: {}", err);
        return rendered;
    };

    match std::str::from_utf8(html_minifier.get_html()) {
        Ok(minified) => minified.to_string(),
        Err(err) => {
            error!("Failed to parse minified HTML as UTF-8: {}", err);
            rendered
        },
    }
}

#[cfg(test)]
mod tests {
    use super::minify;

    #[test]
    fn minify_keeps_text_content() {
        let minified = minify(
            "<ul>\n    <li>Sunset</li>\n    <li>Mountain</li>\n</ul>\n".to_string(),
        );
        assert!(minified.contains("Sunset"));
        assert!(minified.contains("Mountain"));
    }
}
