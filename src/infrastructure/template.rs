//! Mustache-style rendering of stack files.
//!
//! Stack files ending in `.mustache` are expanded with a JSON view before
//! being sent to the API. Escaped tags (`{{name}}`) emit the value
//! JSON-encoded, so a string variable lands in YAML as a quoted scalar; raw
//! tags (`{{{name}}}`, `{{& name}}`) emit it verbatim.
//!
//! Supported: variables with dotted names, `{{.}}`, sections, inverted
//! sections and comments. Partials and delimiter changes are rejected.

use std::path::Path;

use serde_json::Value;

use crate::error::TemplateError;

/// Extension marking a stack file as a template.
pub const TEMPLATE_EXTENSION: &str = "mustache";

/// True when the file should go through [`render`].
#[must_use]
pub fn is_template(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(TEMPLATE_EXTENSION))
}

/// Render `template` against `view`.
///
/// # Errors
///
/// Returns a [`TemplateError`] for unterminated tags, unbalanced sections or
/// unsupported tag kinds.
pub fn render(template: &str, view: &Value) -> Result<String, TemplateError> {
    let nodes = parse(template)?;
    let mut out = String::with_capacity(template.len());
    let mut stack = vec![view];
    render_nodes(&nodes, &mut stack, &mut out);
    Ok(out)
}

#[derive(Debug, PartialEq)]
enum Node {
    Text(String),
    Escaped(String),
    Raw(String),
    Section {
        name: String,
        inverted: bool,
        children: Vec<Node>,
    },
}

struct Frame {
    name: String,
    inverted: bool,
    nodes: Vec<Node>,
}

fn parse(template: &str) -> Result<Vec<Node>, TemplateError> {
    let mut frames = vec![Frame {
        name: String::new(),
        inverted: false,
        nodes: Vec::new(),
    }];
    let mut cursor = 0;

    while let Some(found) = template[cursor..].find("{{") {
        let open = cursor + found;
        push_text(&mut frames, &template[cursor..open]);

        let triple = template[open..].starts_with("{{{");
        let (body_start, closer) = if triple { (open + 3, "}}}") } else { (open + 2, "}}") };
        let body_len = template[body_start..]
            .find(closer)
            .ok_or(TemplateError::UnclosedTag { offset: open })?;
        let body = template[body_start..body_start + body_len].trim();
        let mut end = body_start + body_len + closer.len();

        if triple {
            if body.is_empty() {
                return Err(TemplateError::EmptyTag { offset: open });
            }
            current(&mut frames).push(Node::Raw(body.to_string()));
            cursor = end;
            continue;
        }

        let (sigil, name) = match body.chars().next() {
            Some(c @ ('#' | '^' | '/' | '!' | '&' | '>' | '=')) => (Some(c), body[1..].trim()),
            Some(_) => (None, body),
            None => return Err(TemplateError::EmptyTag { offset: open }),
        };
        if name.is_empty() && sigil != Some('!') {
            return Err(TemplateError::EmptyTag { offset: open });
        }

        // Block tags alone on their line take the line with them.
        if matches!(sigil, Some('#' | '^' | '/' | '!')) {
            if let Some(line_end) = standalone_end(template, open, end) {
                trim_line_indent(&mut frames);
                end = line_end;
            }
        }

        match sigil {
            Some('!') => {}
            Some('#' | '^') => frames.push(Frame {
                name: name.to_string(),
                inverted: sigil == Some('^'),
                nodes: Vec::new(),
            }),
            Some('/') => {
                if frames.len() == 1 {
                    return Err(TemplateError::UnexpectedClose {
                        name: name.to_string(),
                    });
                }
                let frame = frames.pop().ok_or(TemplateError::UnexpectedClose {
                    name: name.to_string(),
                })?;
                if frame.name != name {
                    return Err(TemplateError::MismatchedSection {
                        expected: frame.name,
                        found: name.to_string(),
                    });
                }
                current(&mut frames).push(Node::Section {
                    name: frame.name,
                    inverted: frame.inverted,
                    children: frame.nodes,
                });
            }
            Some('&') => current(&mut frames).push(Node::Raw(name.to_string())),
            Some(other) => {
                return Err(TemplateError::Unsupported {
                    tag: format!("{other}{name}"),
                })
            }
            None => current(&mut frames).push(Node::Escaped(name.to_string())),
        }

        cursor = end;
    }

    push_text(&mut frames, &template[cursor..]);

    if frames.len() > 1 {
        let name = frames.pop().map(|f| f.name).unwrap_or_default();
        return Err(TemplateError::UnclosedSection { name });
    }
    Ok(frames.pop().map(|f| f.nodes).unwrap_or_default())
}

fn current(frames: &mut [Frame]) -> &mut Vec<Node> {
    // The root frame is never popped while parsing.
    let last = frames.len() - 1;
    &mut frames[last].nodes
}

fn push_text(frames: &mut [Frame], text: &str) {
    if text.is_empty() {
        return;
    }
    let nodes = current(frames);
    if let Some(Node::Text(existing)) = nodes.last_mut() {
        existing.push_str(text);
    } else {
        nodes.push(Node::Text(text.to_string()));
    }
}

/// If the tag spanning `open..close` is the only thing on its line, return
/// the offset just past that line's newline.
fn standalone_end(template: &str, open: usize, close: usize) -> Option<usize> {
    let line_start = template[..open].rfind('\n').map_or(0, |i| i + 1);
    if !template[line_start..open].chars().all(|c| c == ' ' || c == '\t') {
        return None;
    }

    let rest = &template[close..];
    let line_len = rest.find('\n').map_or(rest.len(), |i| i + 1);
    let tail = rest[..line_len].trim_end_matches(['\n', '\r']);
    if !tail.chars().all(|c| c == ' ' || c == '\t') {
        return None;
    }
    Some(close + line_len)
}

/// Drop the indentation preceding a standalone tag from the pending text.
fn trim_line_indent(frames: &mut [Frame]) {
    if let Some(Node::Text(text)) = current(frames).last_mut() {
        let keep = text.rfind('\n').map_or(0, |i| i + 1);
        text.truncate(keep);
    }
}

fn render_nodes<'a>(nodes: &[Node], stack: &mut Vec<&'a Value>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Escaped(name) => {
                if let Some(value) = lookup(stack, name) {
                    out.push_str(&escaped(value));
                }
            }
            Node::Raw(name) => {
                if let Some(value) = lookup(stack, name) {
                    out.push_str(&raw(value));
                }
            }
            Node::Section {
                name,
                inverted,
                children,
            } => {
                let value = lookup(stack, name);
                if *inverted {
                    if !value.is_some_and(is_truthy) {
                        render_nodes(children, stack, out);
                    }
                    continue;
                }
                match value {
                    Some(Value::Array(items)) => {
                        for item in items {
                            stack.push(item);
                            render_nodes(children, stack, out);
                            stack.pop();
                        }
                    }
                    Some(value) if is_truthy(value) => {
                        stack.push(value);
                        render_nodes(children, stack, out);
                        stack.pop();
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Resolve a possibly dotted name against the context stack, innermost first.
fn lookup<'a>(stack: &[&'a Value], name: &str) -> Option<&'a Value> {
    if name == "." {
        return stack.last().copied();
    }

    let mut parts = name.split('.');
    let head = parts.next()?;
    let mut value = stack
        .iter()
        .rev()
        .copied()
        .find_map(|context| context.as_object().and_then(|map| map.get(head)))?;

    for part in parts {
        value = match value {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(value)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

fn escaped(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn raw(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn detects_template_extension() {
        assert!(is_template(Path::new("deploy/stack.yml.mustache")));
        assert!(is_template(Path::new("stack.MUSTACHE")));
        assert!(!is_template(Path::new("stack.yml")));
        assert!(!is_template(Path::new("mustache")));
    }

    #[test]
    fn escaped_strings_are_json_quoted() {
        let out = render("image: nginx:{{tag}}\n", &json!({"tag": "1.25"})).unwrap();
        assert_eq!(out, "image: nginx:\"1.25\"\n");
    }

    #[test]
    fn escaped_strings_escape_quotes() {
        let out = render("motd: {{msg}}", &json!({"msg": "say \"hi\""})).unwrap();
        assert_eq!(out, r#"motd: "say \"hi\"""#);
    }

    #[test]
    fn raw_tags_emit_verbatim() {
        let view = json!({"tag": "1.25"});
        assert_eq!(render("nginx:{{{tag}}}", &view).unwrap(), "nginx:1.25");
        assert_eq!(render("nginx:{{& tag}}", &view).unwrap(), "nginx:1.25");
    }

    #[test]
    fn numbers_and_booleans() {
        let view = json!({"replicas": 3, "debug": true});
        assert_eq!(
            render("replicas: {{replicas}} debug: {{debug}}", &view).unwrap(),
            "replicas: 3 debug: true"
        );
    }

    #[test]
    fn dotted_names_walk_objects() {
        let view = json!({"db": {"host": "pg", "port": 5432}});
        assert_eq!(
            render("{{{db.host}}}:{{db.port}}", &view).unwrap(),
            "pg:5432"
        );
    }

    #[test]
    fn missing_names_render_empty() {
        assert_eq!(render("a{{nope}}b{{x.y}}c", &json!({})).unwrap(), "abc");
    }

    #[test]
    fn sections_iterate_arrays() {
        let view = json!({"ports": [80, 443]});
        let out = render("ports:\n{{#ports}}\n  - {{.}}\n{{/ports}}\n", &view).unwrap();
        assert_eq!(out, "ports:\n  - 80\n  - 443\n");
    }

    #[test]
    fn sections_push_object_context() {
        let view = json!({"name": "outer", "svc": {"name": "inner"}});
        assert_eq!(
            render("{{#svc}}{{{name}}}{{/svc}}/{{{name}}}", &view).unwrap(),
            "inner/outer"
        );
    }

    #[test]
    fn falsy_sections_are_skipped_and_inverted_rendered() {
        let view = json!({"enabled": false, "list": [], "empty": ""});
        let out = render(
            "{{#enabled}}on{{/enabled}}{{^enabled}}off{{/enabled}}{{#list}}x{{/list}}{{^list}}none{{/list}}{{^empty}}!{{/empty}}",
            &view,
        )
        .unwrap();
        assert_eq!(out, "offnone!");
    }

    #[test]
    fn comments_are_dropped_with_their_line() {
        let out = render("a: 1\n  {{! generated }}\nb: 2\n", &json!({})).unwrap();
        assert_eq!(out, "a: 1\nb: 2\n");
    }

    #[test]
    fn inline_section_keeps_surrounding_text() {
        let view = json!({"tls": true});
        assert_eq!(
            render("port: {{#tls}}443{{/tls}}{{^tls}}80{{/tls}}\n", &view).unwrap(),
            "port: 443\n"
        );
    }

    #[test]
    fn plain_text_passes_through() {
        let text = "version: '3.8'\nservices:\n  web:\n    image: nginx\n";
        assert_eq!(render(text, &json!({})).unwrap(), text);
    }

    #[test]
    fn unclosed_tag_is_an_error() {
        assert_eq!(
            render("image: {{tag", &json!({})),
            Err(TemplateError::UnclosedTag { offset: 7 })
        );
    }

    #[test]
    fn unbalanced_sections_are_errors() {
        assert_eq!(
            render("{{#a}}x", &json!({})),
            Err(TemplateError::UnclosedSection { name: "a".into() })
        );
        assert_eq!(
            render("{{#a}}x{{/b}}", &json!({})),
            Err(TemplateError::MismatchedSection {
                expected: "a".into(),
                found: "b".into()
            })
        );
        assert_eq!(
            render("x{{/a}}", &json!({})),
            Err(TemplateError::UnexpectedClose { name: "a".into() })
        );
    }

    #[test]
    fn partials_are_rejected() {
        assert_eq!(
            render("{{> header}}", &json!({})),
            Err(TemplateError::Unsupported {
                tag: ">header".into()
            })
        );
    }

    #[test]
    fn empty_tag_is_an_error() {
        assert_eq!(
            render("a {{ }}", &json!({})),
            Err(TemplateError::EmptyTag { offset: 2 })
        );
    }
}
