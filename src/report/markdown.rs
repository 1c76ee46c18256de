//! Minimal markdown-to-terminal rendering for subject responses.
//!
//! Fenced code blocks become indented literal lines. Outside fences, inline
//! code, bold and italic spans are replaced in one left-to-right pass per
//! line, with inline code taking precedence over bold and bold over italic.
use super::Palette;
use regex::{Captures, Regex};
use std::sync::OnceLock;

fn inline_spans() -> &'static Regex {
    static SPANS: OnceLock<Regex> = OnceLock::new();
    SPANS.get_or_init(|| {
        Regex::new(r"`([^`]+)`|\*\*([^*]+)\*\*|\*([^*]+)\*").expect("valid inline span regex")
    })
}

/// Render `text` line by line, prefixing each output line with `indent`.
pub fn render_markdown(text: &str, indent: &str, palette: &Palette) -> String {
    let mut lines = Vec::new();
    let mut in_code_block = false;
    let mut code_lines: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if line.trim().starts_with("```") {
            if in_code_block {
                flush_code_block(&mut lines, &mut code_lines, indent, palette);
            }
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            code_lines.push(line);
            continue;
        }
        lines.push(format!("{indent}{}", render_inline(line, palette)));
    }

    // An unclosed fence still renders its body as code.
    flush_code_block(&mut lines, &mut code_lines, indent, palette);

    lines.join("\n")
}

/// Apply inline emphasis to a single line.
pub fn render_inline(line: &str, palette: &Palette) -> String {
    inline_spans()
        .replace_all(line, |caps: &Captures<'_>| {
            let (style, inner) = if let Some(code) = caps.get(1) {
                (palette.cyan(), code.as_str())
            } else if let Some(bold) = caps.get(2) {
                (palette.bold(), bold.as_str())
            } else if let Some(italic) = caps.get(3) {
                (palette.italic(), italic.as_str())
            } else {
                ("", "")
            };
            format!("{style}{inner}{}", palette.reset())
        })
        .into_owned()
}

fn flush_code_block(
    lines: &mut Vec<String>,
    code_lines: &mut Vec<&str>,
    indent: &str,
    palette: &Palette,
) {
    for code_line in code_lines.drain(..) {
        lines.push(format!(
            "{indent}  {}{code_line}{}",
            palette.cyan(),
            palette.reset()
        ));
    }
}
