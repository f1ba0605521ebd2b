//! Compilation-session state.
//!
//! The [`Accumulator`] collects everything one compilation produces: the
//! generated statement buffer, the current indentation, the reference
//! table of original nodes the generated code indexes into, the
//! deduplicated runtime-helper bindings, and a counter for fresh variable
//! names. One accumulator is created per top-level compilation and
//! consumed at the end; it is never shared.
//!
//! # Generated name space
//!
//! All well-known names in the generated text carry the `_sable_` prefix:
//! `_sable_refs` (reference table), `_sable_runtime` (runtime object),
//! `_sable_var{n}` (fresh variables), `_sable_helper_{name}` (helper
//! bindings), and `_sable_lineno` (the source-position table).
//!
//! # Source-line markers
//!
//! [`Accumulator::lineno`] returns an inline `\n#<line>\n` marker for
//! nodes with known source positions. Fragments embed the marker inside
//! their parenthesized text, so the marker occupies its own physical line.
//! [`Accumulator::get_source`] strips marker lines and folds them into the
//! `_sable_lineno` table: two parallel arrays of generated-line indexes
//! and original line numbers, recording each point where the original
//! line last changed. A downstream fault handler uses the table to map a
//! failure back to the original script line.

use rustc_hash::FxHashMap;
use sable_ir::NodeRef;

/// A runtime helper operation the generated text can call.
///
/// Closed enumeration of the runtime's helper table; each helper renders
/// a lookup key and a deduplicated local binding name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Helper<'a> {
    /// Shallow-copy a referenced node with field overrides.
    Replace,
    /// Build an immutable child sequence from a list of nodes.
    Children,
    /// Sentinel for "argument not supplied".
    Missing,
    /// Scripted-language attribute access.
    GetAttribute,
    /// Attach source-position context to a converted value.
    SetLocation,
    ImportModule,
    FromModuleImport,
    /// Coerce an interpolated value with a named converter.
    Interpolate(&'a str),
    /// Convert a value for a typed command-argument position.
    Convert(&'a str),
}

impl Helper<'_> {
    /// The runtime helper-table key.
    fn key(&self) -> String {
        match self {
            Helper::Replace => "replace".to_string(),
            Helper::Children => "children".to_string(),
            Helper::Missing => "missing".to_string(),
            Helper::GetAttribute => "get_attribute".to_string(),
            Helper::SetLocation => "set_location".to_string(),
            Helper::ImportModule => "import_module".to_string(),
            Helper::FromModuleImport => "from_module_import".to_string(),
            Helper::Interpolate(converter) => format!("interpolate_{converter}"),
            Helper::Convert(parser) => format!("convert:{parser}"),
        }
    }

    /// The local binding name for this helper in the generated header.
    fn local(&self) -> String {
        let mut name = String::from("_sable_helper_");
        for c in self.key().chars() {
            if c.is_ascii_alphanumeric() {
                name.extend(c.to_lowercase());
            } else {
                name.push('_');
            }
        }
        name
    }
}

/// Mutable state of one compilation.
#[derive(Default)]
pub struct Accumulator {
    indentation: String,
    refs: Vec<NodeRef>,
    lines: Vec<String>,
    counter: u32,
    header: Vec<(String, String)>,
    header_index: FxHashMap<String, usize>,
}

impl Accumulator {
    pub fn new() -> Self {
        Accumulator::default()
    }

    /// Append one line of generated code at the current indentation.
    pub fn statement(&mut self, code: impl AsRef<str>) {
        self.lines
            .push(format!("{}{}\n", self.indentation, code.as_ref()));
    }

    /// Run `f` with the indentation one level deeper.
    ///
    /// The previous indentation is restored on every exit path, including
    /// an `Err` flowing out of the closure.
    pub fn block<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = self.indentation.len();
        self.indentation.push_str("    ");
        let result = f(self);
        self.indentation.truncate(previous);
        result
    }

    /// Register `node` in the reference table, returning the indexing
    /// expression the generated code uses to reach it.
    pub fn make_ref(&mut self, node: &NodeRef) -> String {
        let index = self.refs.len();
        self.refs.push(node.clone());
        format!("_sable_refs[{index}]")
    }

    /// Register a contiguous run of nodes, returning a range-indexing
    /// expression covering all of them.
    pub fn make_ref_slice(&mut self, nodes: &[NodeRef]) -> String {
        let start = self.refs.len();
        self.refs.extend(nodes.iter().cloned());
        let stop = self.refs.len();
        format!("_sable_refs[{start}:{stop}]")
    }

    /// A fresh, compilation-unique variable name.
    pub fn make_variable(&mut self) -> String {
        let name = format!("_sable_var{}", self.counter);
        self.counter += 1;
        name
    }

    /// Bind `helper` in the header (first use only) and return its local
    /// name.
    fn bind_helper(&mut self, helper: &Helper<'_>) -> String {
        let expression = format!("_sable_runtime.helpers['{}']", helper.key());
        if let Some(&slot) = self.header_index.get(&expression) {
            return self.header[slot].1.clone();
        }
        let local = helper.local();
        self.header_index
            .insert(expression.clone(), self.header.len());
        self.header.push((expression, local.clone()));
        local
    }

    /// A call expression invoking a runtime helper.
    pub fn helper(&mut self, helper: Helper<'_>, args: &[&str]) -> String {
        let local = self.bind_helper(&helper);
        format!("{local}({})", args.join(", "))
    }

    /// An expression shallow-copying a referenced node with the given
    /// fields overridden.
    pub fn replace(&mut self, node: &str, fields: &[(&str, String)]) -> String {
        let mut args = vec![node.to_string()];
        args.extend(
            fields
                .iter()
                .map(|(name, expression)| format!("{name}={expression}")),
        );
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.helper(Helper::Replace, &args)
    }

    /// The shared "argument not supplied" sentinel expression.
    pub fn missing(&mut self) -> String {
        self.bind_helper(&Helper::Missing)
    }

    /// An expression building a child sequence from item expressions.
    pub fn children(&mut self, items: &[String]) -> String {
        let list = format!("[{}]", items.join(", "));
        self.helper(Helper::Children, &[list.as_str()])
    }

    /// An inline source-line marker for `node`, or `""` when its location
    /// is unknown.
    pub fn lineno(&self, node: &NodeRef) -> String {
        let location = node.location();
        if location.is_known() {
            format!("\n#{}\n", location.lineno())
        } else {
            String::new()
        }
    }

    /// Render the final source: the source-position table, the helper
    /// bindings, then the buffered statements with markers resolved.
    pub fn get_source(&self) -> String {
        let header: String = self
            .header
            .iter()
            .map(|(expression, variable)| format!("{variable} = {expression}\n"))
            .collect();

        let mut lines: Vec<String> = vec![String::new()];
        let mut positions: Vec<usize> = vec![1];
        let mut numbers: Vec<u32> = vec![1];

        let body = format!("{header}{}", self.lines.concat());
        for line in body.lines() {
            if let Some(marker) = line.strip_prefix('#') {
                if let Ok(current) = marker.parse::<u32>() {
                    if numbers.last() != Some(&current) {
                        positions.push(lines.len());
                        numbers.push(current);
                    }
                    continue;
                }
            }
            lines.push(line.to_string());
        }

        lines[0] = format!("_sable_lineno = {positions:?}, {numbers:?}");
        lines.join("\n")
    }

    /// Consume the accumulator, yielding the reference table.
    pub fn into_refs(self) -> Vec<NodeRef> {
        self.refs
    }

    pub(crate) fn indentation(&self) -> &str {
        &self.indentation
    }

    pub(crate) fn lines_len(&self) -> usize {
        self.lines.len()
    }

    /// Detach every statement emitted at or after `at`.
    pub(crate) fn split_off_lines(&mut self, at: usize) -> Vec<String> {
        self.lines.split_off(at)
    }

    pub(crate) fn append_lines(&mut self, lines: Vec<String>) {
        self.lines.extend(lines);
    }

    /// Re-indent every statement from `at` onward by one level.
    pub(crate) fn indent_lines_from(&mut self, at: usize) {
        for line in &mut self.lines[at..] {
            line.insert_str(0, "    ");
        }
    }

    /// Insert a raw, already-terminated line at position `at`.
    pub(crate) fn insert_line(&mut self, at: usize, line: String) {
        self.lines.insert(at, line);
    }
}
