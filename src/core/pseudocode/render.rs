// src/core/pseudocode/render.rs
use std::fmt::Write;

use crate::config::CycleHandling;
use super::{ExpandedPseudocode, ExpansionMarker, PseudocodeLine};

const INDENT: &str = "  ";

/// Plain gist-style text, two spaces per level, markers ignored
pub fn render_lines(lines: &[PseudocodeLine]) -> String {
    let mut out = String::new();
    for line in lines {
        push_line(&mut out, line.indent, &line.text);
    }
    out
}

/// Gist-style text with inlined callees flattened in place and every
/// marker on its own line beneath the invocation it belongs to
pub fn render_expanded(expanded: &ExpandedPseudocode) -> String {
    let mut out = String::new();
    render_into(&mut out, &expanded.lines, expanded);
    out
}

fn render_into(out: &mut String, lines: &[PseudocodeLine], expanded: &ExpandedPseudocode) {
    for line in lines {
        push_line(out, line.indent, &line.text);

        let Some(marker) = &line.expansion else {
            continue;
        };
        let nested = line.indent + 1;
        match marker {
            ExpansionMarker::Inlined { lines } => render_into(out, lines, expanded),
            ExpansionMarker::CycleDetected { identity, .. } => {
                let note = match expanded.cycle_handling {
                    CycleHandling::Mark => "already expanded above",
                    CycleHandling::Stop => "expansion stopped",
                };
                push_marker(out, nested, &format!("[CYCLE DETECTED: {}] ({})", identity.logical_path(), note));
            }
            ExpansionMarker::DepthLimitReached { identity } => {
                push_marker(
                    out,
                    nested,
                    &format!("[DEPTH LIMIT REACHED: {}] (max depth: {})", identity.logical_path(), expanded.max_depth),
                );
            }
            ExpansionMarker::Unresolved { raw_target, kind } => {
                let target = if raw_target.trim().is_empty() { "(no target)" } else { raw_target.as_str() };
                push_marker(out, nested, &format!("[UNRESOLVED: {}] ({})", target, kind.as_str()));
            }
        }
    }
}

fn push_line(out: &mut String, indent: usize, text: &str) {
    let _ = writeln!(out, "{}- {}", INDENT.repeat(indent), text);
}

fn push_marker(out: &mut String, indent: usize, text: &str) {
    let _ = writeln!(out, "{}{}", INDENT.repeat(indent), text);
}
