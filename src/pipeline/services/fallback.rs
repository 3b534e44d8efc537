//! Minimal built-in artifact substituted when generation fails.

use crate::pipeline::domain::{Artifact, ArtifactFile, TaskSlug};
use minijinja::{Environment, context};

const FALLBACK_PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ task }}</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
            padding: 20px;
        }
        .container {
            border-radius: 12px;
            padding: 40px;
            max-width: 600px;
            width: 100%;
            box-shadow: 0 20px 60px rgba(0,0,0,0.3);
        }
        .brief { background: #f5f5f5; padding: 15px; border-radius: 8px; margin-top: 20px; }
    </style>
</head>
<body>
    <div class="container">
        <h1>{{ task }}</h1>
        <p>This application was generated automatically from the following requirements:</p>
        <div class="brief">{{ brief }}</div>
    </div>
</body>
</html>
"#;

const FALLBACK_README_TEMPLATE: &str = r"# {{ task }}

## Description
{{ brief }}

## Setup
1. Clone this repository
2. Open `index.html` in a web browser

## License
MIT
";

/// Builds the minimal artifact used when the generation collaborator
/// fails: a placeholder page plus a short README derived from the brief.
pub(crate) fn minimal_artifact(task: &TaskSlug, brief: &str) -> Artifact {
    Artifact::new(vec![
        ArtifactFile::new("index.html", render(FALLBACK_PAGE_TEMPLATE, task, brief)),
        ArtifactFile::new("README.md", render(FALLBACK_README_TEMPLATE, task, brief)),
    ])
}

fn render(template: &str, task: &TaskSlug, brief: &str) -> String {
    let environment = Environment::new();
    environment
        .render_str(template, context! { task => task.as_str(), brief => brief })
        .unwrap_or_else(|_| plain_fallback(task, brief))
}

/// Template-free last resort; only reachable if a built-in template fails
/// to render.
fn plain_fallback(task: &TaskSlug, brief: &str) -> String {
    format!("# {task}\n\n{brief}\n")
}
