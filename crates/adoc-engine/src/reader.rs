/*
 * reader.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Line reader with preprocessor directives.
//!
//! The reader hands out source lines one at a time and applies the
//! line-level directives on the way: `ifdef`, `ifndef`, `ifeval` and `endif`
//! conditionals, and `include::target[]`. Directives are evaluated against
//! the attributes as they stand when the line is read, so entries defined
//! earlier in the document influence the conditionals that follow them.

use crate::attributes::AttributeMap;
use crate::defaults::MAX_INCLUDE_DEPTH;
use crate::error::{EngineError, EngineResult};
use crate::resolver::IncludeResolver;
use crate::subs::attributes::substitute_attributes;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// `ifdef::name[]`, `ifndef::a,b[]`, `ifeval::[expr]`, `endif::[]`, and escaped forms.
static CONDITIONAL_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\\)?(ifdef|ifndef|ifeval|endif)::(\S*?(?:([,+])\S*?)?)\[(.*)\]$").unwrap()
});

/// `include::target[attrs]`, and the escaped form.
static INCLUDE_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\\)?include::([^\s\[](?:[^\[]*[^\s\[])?)\[(.*)\]$").unwrap()
});

/// `lhs op rhs` inside an `ifeval` directive.
static EVAL_EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*([=!><]=|<|>)\s*(.+)$").unwrap());

/// Lines from one source: the document itself or an included file.
struct Frame {
    lines: VecDeque<String>,
    dir: PathBuf,
    depth: usize,
    lineno: usize,
}

/// An open block conditional.
struct Conditional {
    target: String,
    skipping: bool,
}

pub(crate) struct Reader<'r> {
    frames: Vec<Frame>,
    pushed_back: Vec<String>,
    conditionals: Vec<Conditional>,
    resolver: &'r dyn IncludeResolver,
}

impl<'r> Reader<'r> {
    pub(crate) fn new(text: &str, base_dir: &Path, resolver: &'r dyn IncludeResolver) -> Self {
        Self {
            frames: vec![Frame {
                lines: split_lines(text),
                dir: base_dir.to_path_buf(),
                depth: 0,
                lineno: 0,
            }],
            pushed_back: Vec::new(),
            conditionals: Vec::new(),
            resolver,
        }
    }

    /// Return a line to the reader; the next call to `next_line` yields it again.
    pub(crate) fn push_back(&mut self, line: String) {
        self.pushed_back.push(line);
    }

    /// Read the next line after applying preprocessor directives.
    pub(crate) fn next_line(&mut self, attrs: &AttributeMap) -> EngineResult<Option<String>> {
        if let Some(line) = self.pushed_back.pop() {
            return Ok(Some(line));
        }

        loop {
            let Some(frame) = self.frames.last_mut() else {
                if let Some(open) = self.conditionals.last() {
                    tracing::warn!(target_name = %open.target, "unterminated preprocessor conditional");
                }
                return Ok(None);
            };

            let Some(line) = frame.lines.pop_front() else {
                self.frames.pop();
                continue;
            };
            frame.lineno += 1;

            if line.contains("::") {
                if let Some(caps) = CONDITIONAL_DIRECTIVE.captures(&line) {
                    if caps.get(1).is_some() {
                        if !self.skipping() {
                            return Ok(Some(line[1..].to_string()));
                        }
                        continue;
                    }
                    let keyword = &caps[2];
                    let target = caps[3].to_string();
                    let delimiter = caps.get(4).map(|m| m.as_str());
                    let text = caps[5].to_string();
                    if let Some(content) =
                        self.handle_conditional(keyword, &target, delimiter, &text, attrs)
                    {
                        return Ok(Some(content));
                    }
                    continue;
                }
            }

            if self.skipping() {
                continue;
            }

            if line.starts_with("include::") || line.starts_with("\\include::") {
                if let Some(caps) = INCLUDE_DIRECTIVE.captures(&line) {
                    if caps.get(1).is_some() {
                        return Ok(Some(line[1..].to_string()));
                    }
                    let target = caps[2].to_string();
                    let attrlist = caps[3].to_string();
                    if let Some(replacement) = self.handle_include(&target, &attrlist, attrs)? {
                        return Ok(Some(replacement));
                    }
                    continue;
                }
            }

            return Ok(Some(line));
        }
    }

    fn skipping(&self) -> bool {
        self.conditionals.last().is_some_and(|c| c.skipping)
    }

    /// Process a conditional directive. Returns the content of a single-line
    /// conditional whose condition holds.
    fn handle_conditional(
        &mut self,
        keyword: &str,
        target: &str,
        delimiter: Option<&str>,
        text: &str,
        attrs: &AttributeMap,
    ) -> Option<String> {
        if keyword == "endif" {
            match self.conditionals.last() {
                None => tracing::warn!(line = %format!("endif::{target}[]"), "unmatched preprocessor directive"),
                Some(open) if !target.is_empty() && open.target != target => {
                    tracing::warn!(expected = %open.target, found = %target, "mismatched preprocessor directive");
                }
                Some(_) => {
                    self.conditionals.pop();
                }
            }
            return None;
        }

        if self.skipping() {
            // Nested block conditionals still need their endif matched.
            if text.is_empty() || keyword == "ifeval" {
                self.conditionals.push(Conditional {
                    target: target.to_string(),
                    skipping: true,
                });
            }
            return None;
        }

        let holds = match keyword {
            "ifdef" => evaluate_defined(target, delimiter, attrs),
            "ifndef" => !evaluate_defined(target, delimiter, attrs),
            _ => {
                if !target.is_empty() {
                    tracing::warn!(target_name = %target, "malformed preprocessor directive: ifeval takes no target");
                    return None;
                }
                evaluate_expression(text, attrs)
            }
        };

        if keyword != "ifeval" && !text.is_empty() {
            return holds.then(|| text.to_string());
        }

        self.conditionals.push(Conditional {
            target: target.to_string(),
            skipping: !holds,
        });
        None
    }

    /// Push an included file onto the frame stack. Returns a replacement line
    /// when the target cannot be resolved.
    fn handle_include(
        &mut self,
        target: &str,
        attrlist: &str,
        attrs: &AttributeMap,
    ) -> EngineResult<Option<String>> {
        let expanded = substitute_attributes(target, attrs);
        let Some(frame) = self.frames.last() else {
            return Ok(None);
        };

        let max_depth = attrs
            .get("max-include-depth")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(MAX_INCLUDE_DEPTH);
        if frame.depth >= max_depth {
            return Err(EngineError::IncludeDepthExceeded {
                target: expanded,
                max_depth,
            });
        }

        match self.resolver.resolve(&expanded, &frame.dir) {
            Some(included) => {
                tracing::debug!(include = %expanded, line = frame.lineno, "including file");
                let depth = frame.depth + 1;
                self.frames.push(Frame {
                    lines: split_lines(&included.content),
                    dir: included.dir,
                    depth,
                    lineno: 0,
                });
                Ok(None)
            }
            None => {
                tracing::warn!(include = %expanded, line = frame.lineno, "include file not found");
                Ok(Some(format!(
                    "Unresolved directive in <stdin> - include::{expanded}[{attrlist}]"
                )))
            }
        }
    }
}

fn split_lines(text: &str) -> VecDeque<String> {
    text.lines().map(|l| l.trim_end().to_string()).collect()
}

/// Whether the attributes named by an `ifdef` target are defined: any of
/// them for `a,b`, all of them for `a+b`.
fn evaluate_defined(target: &str, delimiter: Option<&str>, attrs: &AttributeMap) -> bool {
    match delimiter {
        Some(",") => target.split(',').any(|name| attrs.contains(name)),
        Some(_) => target.split('+').all(|name| attrs.contains(name)),
        None => attrs.contains(target),
    }
}

/// Evaluate an `ifeval` expression such as `{sectnumlevels} >= 3` or
/// `"{backend}" == "dita-topic"`.
fn evaluate_expression(expression: &str, attrs: &AttributeMap) -> bool {
    let Some(caps) = EVAL_EXPRESSION.captures(expression.trim()) else {
        tracing::warn!(expression = %expression, "malformed ifeval expression");
        return false;
    };

    let lhs = EvalValue::parse(&substitute_attributes(&caps[1], attrs));
    let rhs = EvalValue::parse(&substitute_attributes(&caps[3], attrs));

    match &caps[2] {
        "==" => lhs == rhs,
        "!=" => lhs != rhs,
        op => match lhs.partial_cmp(&rhs) {
            Some(ordering) => match op {
                "<" => ordering.is_lt(),
                "<=" => ordering.is_le(),
                ">" => ordering.is_gt(),
                _ => ordering.is_ge(),
            },
            None => false,
        },
    }
}

#[derive(Debug, PartialEq, PartialOrd)]
enum EvalValue {
    Number(f64),
    Text(String),
}

impl EvalValue {
    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let unquoted = raw
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .or_else(|| raw.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')));

        match unquoted {
            Some(text) => EvalValue::Text(text.to_string()),
            None => raw
                .parse::<f64>()
                .map(EvalValue::Number)
                .unwrap_or_else(|_| EvalValue::Text(raw.to_string())),
        }
    }
}
