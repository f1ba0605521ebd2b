//! Expression rules: node kinds that compile to exactly one fragment.
//!
//! Every fragment is parenthesized with the node's source-line marker
//! embedded right after the opening parenthesis, so markers survive as
//! their own physical lines inside a syntactically transparent position.

use std::rc::Rc;

use rustc_hash::FxHashSet;
use sable_dispatch::Rule;
use sable_ir::{NodeKind, NodeRef, Value};

use super::{expect_child, expect_leaf, expect_str};
use crate::accumulator::{Accumulator, Helper};
use crate::error::CodegenError;
use crate::visit::{one, visit_required};
use crate::{CodegenVisitor, CompileResult};

pub(super) fn register(visitor: &mut CodegenVisitor, converters: Rc<FxHashSet<String>>) {
    visitor.add_rule(Rule::for_kind(NodeKind::Interpolation, interpolation));
    visitor.add_rule(Rule::for_kind(
        NodeKind::ArgumentInterpolation,
        move |v, node, acc: &mut Accumulator| argument_interpolation(&converters, v, node, acc),
    ));
    visitor.add_rule(Rule::for_kind(NodeKind::ExpressionBinary, binary));
    visitor.add_rule(Rule::for_kind(NodeKind::ExpressionUnary, unary));
    visitor.add_rule(Rule::for_kind(NodeKind::Value, literal));
    visitor.add_rule(Rule::for_kind(NodeKind::Identifier, identifier));
    visitor.add_rule(Rule::for_kind(NodeKind::FormatString, format_string));
    visitor.add_rule(Rule::for_kind(NodeKind::Tuple, tuple));
    visitor.add_rule(Rule::for_kind(NodeKind::List, list));
    visitor.add_rule(Rule::for_kind(NodeKind::Dict, dict));
    visitor.add_rule(Rule::for_kind(NodeKind::Attribute, attribute));
    visitor.add_rule(Rule::for_kind(NodeKind::Lookup, lookup));
    visitor.add_rule(Rule::for_kind(NodeKind::Call, call));
    visitor.add_rule(Rule::for_kind(NodeKind::Assignment, assignment));
    visitor.add_rule(Rule::for_kind(NodeKind::TargetIdentifier, target_identifier));
}

fn interpolation(visitor: &CodegenVisitor, node: &NodeRef, acc: &mut Accumulator) -> CompileResult {
    let value = visit_required(visitor, expect_child(node, "value"), acc)?;
    let converter = expect_str(node, "converter");
    let reference = acc.make_ref(node);
    let result = acc.helper(Helper::Interpolate(converter), &[value.as_str(), reference.as_str()]);
    Ok(one(format!("({}{result})", acc.lineno(node))))
}

fn argument_interpolation(
    converters: &FxHashSet<String>,
    visitor: &CodegenVisitor,
    node: &NodeRef,
    acc: &mut Accumulator,
) -> CompileResult {
    let parser = expect_str(node, "parser");
    if !converters.contains(parser) {
        return Err(CodegenError::UnknownConverter {
            parser: parser.to_string(),
        });
    }
    let value = visit_required(visitor, expect_child(node, "value"), acc)?;
    let converted = acc.helper(Helper::Convert(parser), &[value.as_str()]);
    let reference = acc.make_ref(node);
    let located = acc.helper(Helper::SetLocation, &[converted.as_str(), reference.as_str()]);
    Ok(one(format!("({}{located})", acc.lineno(node))))
}

fn binary(visitor: &CodegenVisitor, node: &NodeRef, acc: &mut Accumulator) -> CompileResult {
    let operator = expect_str(node, "operator").replace('_', " ");
    let left = visit_required(visitor, expect_child(node, "left"), acc)?;
    let right = visit_required(visitor, expect_child(node, "right"), acc)?;
    Ok(one(format!(
        "({}{left} {operator} {right})",
        acc.lineno(node)
    )))
}

fn unary(visitor: &CodegenVisitor, node: &NodeRef, acc: &mut Accumulator) -> CompileResult {
    let operator = expect_str(node, "operator").replace('_', " ");
    let value = visit_required(visitor, expect_child(node, "value"), acc)?;
    Ok(one(format!("({}{operator} {value})", acc.lineno(node))))
}

fn literal(_: &CodegenVisitor, node: &NodeRef, _: &mut Accumulator) -> CompileResult {
    Ok(one(expect_leaf(node, "value").repr()))
}

fn identifier(_: &CodegenVisitor, node: &NodeRef, acc: &mut Accumulator) -> CompileResult {
    Ok(one(format!(
        "({}{})",
        acc.lineno(node),
        expect_str(node, "value")
    )))
}

fn format_string(visitor: &CodegenVisitor, node: &NodeRef, acc: &mut Accumulator) -> CompileResult {
    let mut values: Vec<String> = Vec::new();
    for value in node.children("values").unwrap_or(&[]) {
        values.push(visit_required(visitor, value, acc)?);
    }
    let template = expect_leaf(node, "fmt").repr();
    Ok(one(format!(
        "({}{template}.format({}))",
        acc.lineno(node),
        values.join(", ")
    )))
}

fn tuple(visitor: &CodegenVisitor, node: &NodeRef, acc: &mut Accumulator) -> CompileResult {
    let mut items = String::new();
    for item in node.children("items").unwrap_or(&[]) {
        let value = visit_required(visitor, item, acc)?;
        items.push_str(&value);
        items.push(',');
    }
    Ok(one(format!("({}({items}))", acc.lineno(node))))
}

fn list(visitor: &CodegenVisitor, node: &NodeRef, acc: &mut Accumulator) -> CompileResult {
    let mut items: Vec<String> = Vec::new();
    for item in node.children("items").unwrap_or(&[]) {
        items.push(visit_required(visitor, item, acc)?);
    }
    Ok(one(format!(
        "({}[{}])",
        acc.lineno(node),
        items.join(", ")
    )))
}

fn dict(visitor: &CodegenVisitor, node: &NodeRef, acc: &mut Accumulator) -> CompileResult {
    let mut items: Vec<String> = Vec::new();
    for item in node.children("items").unwrap_or(&[]) {
        let key = visit_required(visitor, expect_child(item, "key"), acc)?;
        let value = visit_required(visitor, expect_child(item, "value"), acc)?;
        items.push(format!("{key}: {value}"));
    }
    Ok(one(format!(
        "({}{{{}}})",
        acc.lineno(node),
        items.join(", ")
    )))
}

fn attribute(visitor: &CodegenVisitor, node: &NodeRef, acc: &mut Accumulator) -> CompileResult {
    let value = visit_required(visitor, expect_child(node, "value"), acc)?;
    let name = Value::from(expect_str(node, "name")).repr();
    let result = acc.helper(Helper::GetAttribute, &[value.as_str(), name.as_str()]);
    Ok(one(format!("({}{result})", acc.lineno(node))))
}

fn lookup(visitor: &CodegenVisitor, node: &NodeRef, acc: &mut Accumulator) -> CompileResult {
    let mut arguments: Vec<String> = Vec::new();
    for argument in node.arguments() {
        arguments.push(visit_required(visitor, argument, acc)?);
    }
    let value = visit_required(visitor, expect_child(node, "value"), acc)?;
    Ok(one(format!(
        "({}{value}[{}])",
        acc.lineno(node),
        arguments.join(", ")
    )))
}

fn call(visitor: &CodegenVisitor, node: &NodeRef, acc: &mut Accumulator) -> CompileResult {
    let mut arguments: Vec<String> = Vec::new();
    for argument in node.arguments() {
        arguments.push(visit_required(visitor, argument, acc)?);
    }
    let value = visit_required(visitor, expect_child(node, "value"), acc)?;
    Ok(one(format!(
        "({}{value}({}))",
        acc.lineno(node),
        arguments.join(", ")
    )))
}

fn assignment(visitor: &CodegenVisitor, node: &NodeRef, acc: &mut Accumulator) -> CompileResult {
    let operator = expect_str(node, "operator");
    let target = visit_required(visitor, expect_child(node, "target"), acc)?;
    let value = visit_required(visitor, expect_child(node, "value"), acc)?;
    Ok(one(format!("{target} {operator} {value}")))
}

fn target_identifier(_: &CodegenVisitor, node: &NodeRef, _: &mut Accumulator) -> CompileResult {
    Ok(one(expect_str(node, "value").to_string()))
}
