//! Rendering tests for the feed vocabularies using datatest-stable.
//!
//! Each test case is a file in `tests/render-cases/` with format:
//! ```text
//! root: atom-feed
//! options: sorted
//! ---
//! <build steps>
//! ===
//! <expected XML>
//! ```
//!
//! Build steps form an indented tree, two spaces per level:
//!
//! - `name value` builds child `name` (the value is optional)
//! - `!name value` is the singular-assignment form
//! - `@attr value` sets an attribute on the enclosing element
//! - `| text` appends a text node
//! - `-- text` appends a comment

use std::path::Path;
use std::sync::Arc;

use blockup::{Args, BuildError, Element, ElementType, RenderOptions};
use blockup_feeds::{atom, rss};

#[derive(Debug)]
struct Step {
    line: String,
    children: Vec<Step>,
}

fn parse_steps(lines: &[&str]) -> Result<Vec<Step>, String> {
    let mut roots: Vec<Step> = Vec::new();
    for (lineno, raw) in lines.iter().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let indent = raw.len() - raw.trim_start().len();
        if indent % 2 != 0 {
            return Err(format!("line {}: odd indentation", lineno + 1));
        }
        let mut siblings = &mut roots;
        for _ in 0..indent / 2 {
            siblings = match siblings.last_mut() {
                Some(parent) => &mut parent.children,
                None => return Err(format!("line {}: indented without a parent", lineno + 1)),
            };
        }
        siblings.push(Step {
            line: raw.trim().to_string(),
            children: Vec::new(),
        });
    }
    Ok(roots)
}

fn split_word(line: &str) -> (&str, Option<&str>) {
    match line.split_once(' ') {
        Some((word, rest)) => (word, Some(rest)),
        None => (line, None),
    }
}

/// Attributes declared directly under a step.
fn attrs_of(steps: &[Step]) -> Vec<(String, String)> {
    steps
        .iter()
        .filter_map(|s| s.line.strip_prefix('@'))
        .map(|a| {
            let (name, value) = split_word(a);
            (name.to_string(), value.unwrap_or_default().to_string())
        })
        .collect()
}

fn args_for<'a>(value: Option<&str>, children: &'a [Step]) -> Args<'a> {
    let mut args = Args::new().attrs(attrs_of(children));
    if let Some(value) = value {
        args = args.value(value);
    }
    if children.iter().any(|s| !s.line.starts_with('@')) {
        args = args.with(move |e| apply(e, children));
    }
    args
}

fn apply(element: &mut Element, steps: &[Step]) -> Result<(), BuildError> {
    for step in steps {
        let line = step.line.as_str();
        if line.starts_with('@') {
            continue;
        } else if let Some(text) = line.strip_prefix("| ") {
            element.text(text)?;
        } else if let Some(text) = line.strip_prefix("-- ") {
            element.comment(text)?;
        } else if let Some(rest) = line.strip_prefix('!') {
            let (name, value) = split_word(rest);
            element.assign(name, args_for(value, &step.children))?;
        } else {
            let (name, value) = split_word(line);
            element.element(name, args_for(value, &step.children))?;
        }
    }
    Ok(())
}

fn root_type(name: &str) -> Option<&'static Arc<ElementType>> {
    let ty = match name {
        "atom-feed" => &*atom::FEED,
        "atom-entry" => &*atom::ENTRY,
        "atom-document" => &*atom::DOCUMENT,
        "rss-channel" => &*rss::CHANNEL,
        "rss-document" => &*rss::DOCUMENT,
        _ => return None,
    };
    Some(ty)
}

fn run_render_test(path: &Path) -> datatest_stable::Result<()> {
    facet_testhelpers::setup();

    let content = std::fs::read_to_string(path)?;
    let Some((header, rest)) = content.split_once("\n---\n") else {
        return Err("Test file must have a '---' line after the header".into());
    };
    let Some((build, expected)) = rest.split_once("\n===\n") else {
        return Err("Test file must have a '===' line before the expected XML".into());
    };

    let mut ty = None;
    let mut opts = RenderOptions::new();
    for line in header.lines().filter(|l| !l.trim().is_empty()) {
        match line.split_once(':').map(|(k, v)| (k.trim(), v.trim())) {
            Some(("root", name)) => {
                ty = Some(root_type(name).ok_or_else(|| format!("unknown root `{name}`"))?);
            }
            Some(("options", "sorted")) => opts = opts.sort_attributes(),
            _ => return Err(format!("unrecognised header line `{line}`").into()),
        }
    }
    let ty = ty.ok_or("Test file header must name a root")?;

    let lines: Vec<&str> = build.lines().collect();
    let steps = parse_steps(&lines)?;
    let root = Element::build(ty, args_for(None, &steps)).map_err(|e| format!("build failed: {e}"))?;
    let result = root.to_xml_with_options(&opts);
    let expected = expected.trim();

    if result != expected {
        return Err(format!("Render mismatch!\nResult:   {result}\nExpected: {expected}").into());
    }

    Ok(())
}

datatest_stable::harness! {
    { test = run_render_test, root = "tests/render-cases", pattern = r".*\.case$" },
}
