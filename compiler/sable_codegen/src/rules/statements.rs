//! Statement rules: command forms that emit lines into the accumulator.

use sable_dispatch::Rule;
use sable_ir::{NodeKind, NodeRef, Value};

use crate::accumulator::{Accumulator, Helper};
use crate::error::CodegenError;
use crate::visit::{visit_body, visit_required, visit_single};
use crate::{CodegenVisitor, CompileResult};

pub(super) fn register(visitor: &mut CodegenVisitor) {
    visitor.add_rule(
        Rule::for_kind(NodeKind::Command, statement).constrain("identifier", "statement"),
    );
    visitor.add_rule(
        Rule::for_kind(NodeKind::Command, function).constrain("identifier", "def:function:body"),
    );
    for identifier in ["return", "return:value"] {
        visitor.add_rule(
            Rule::for_kind(NodeKind::Command, return_statement)
                .constrain("identifier", identifier),
        );
    }
    for identifier in ["yield", "yield:value", "yield:from:value"] {
        visitor.add_rule(
            Rule::for_kind(NodeKind::Command, yield_statement).constrain("identifier", identifier),
        );
    }
    for (identifier, keyword) in [
        ("if:condition:body", "if"),
        ("elif:condition:body", "elif"),
        ("while:condition:body", "while"),
    ] {
        visitor.add_rule(
            Rule::for_kind(NodeKind::Command, move |v, node, acc: &mut Accumulator| {
                condition_block(keyword, v, node, acc)
            })
            .constrain("identifier", identifier),
        );
    }
    visitor.add_rule(
        Rule::for_kind(NodeKind::Command, else_statement).constrain("identifier", "else:body"),
    );
    visitor.add_rule(
        Rule::for_kind(NodeKind::Command, for_statement)
            .constrain("identifier", "for:target:in:iterable:body"),
    );
    for keyword in ["break", "continue", "pass"] {
        visitor.add_rule(
            Rule::for_kind(NodeKind::Command, move |_, _, acc: &mut Accumulator| {
                acc.statement(keyword);
                Ok(Some(Vec::new()))
            })
            .constrain("identifier", keyword),
        );
    }
    for identifier in [
        "import:module",
        "import:module:as:alias",
        "from:module:import:subcommand",
    ] {
        visitor.add_rule(
            Rule::for_kind(NodeKind::Command, import_statement)
                .constrain("identifier", identifier),
        );
    }
}

fn statement(visitor: &CodegenVisitor, node: &NodeRef, acc: &mut Accumulator) -> CompileResult {
    if let Some(value) = visit_single(visitor, &node.arguments()[0], acc)? {
        acc.statement(value);
    }
    Ok(Some(Vec::new()))
}

fn function(visitor: &CodegenVisitor, node: &NodeRef, acc: &mut Accumulator) -> CompileResult {
    let arguments = node.arguments();
    let signature = &arguments[0];

    let mut parameters: Vec<String> = Vec::new();
    for argument in signature.arguments() {
        let name = super::expect_str(argument, "name");
        if argument.child("default").is_some() {
            let missing = acc.missing();
            parameters.push(format!("{name}={missing}"));
        } else {
            parameters.push(name.to_string());
        }
    }

    let name = super::expect_str(signature, "name");
    acc.statement(format!("def {name}({}):", parameters.join(", ")));

    acc.block(|acc| -> Result<(), CodegenError> {
        for argument in signature.arguments() {
            if let Some(default) = argument.child("default") {
                let parameter = super::expect_str(argument, "name");
                let missing = acc.missing();
                acc.statement(format!("if {parameter} is {missing}:"));
                acc.block(|acc| -> Result<(), CodegenError> {
                    let value = visit_required(visitor, default, acc)?;
                    acc.statement(format!("{parameter} = {value}"));
                    Ok(())
                })?;
            }
        }
        visit_body(visitor, &arguments[1], acc)
    })?;

    Ok(Some(Vec::new()))
}

fn return_statement(
    visitor: &CodegenVisitor,
    node: &NodeRef,
    acc: &mut Accumulator,
) -> CompileResult {
    let mut statement = "return".to_string();
    if let Some(value) = node.arguments().first() {
        let value = visit_required(visitor, value, acc)?;
        statement.push(' ');
        statement.push_str(&value);
    }
    acc.statement(statement);
    Ok(Some(Vec::new()))
}

fn yield_statement(
    visitor: &CodegenVisitor,
    node: &NodeRef,
    acc: &mut Accumulator,
) -> CompileResult {
    let mut statement = if node.identifier() == "yield:from:value" {
        "yield from".to_string()
    } else {
        "yield".to_string()
    };
    if let Some(value) = node.arguments().first() {
        let value = visit_required(visitor, value, acc)?;
        statement.push(' ');
        statement.push_str(&value);
    }
    acc.statement(statement);
    Ok(Some(Vec::new()))
}

fn condition_block(
    keyword: &str,
    visitor: &CodegenVisitor,
    node: &NodeRef,
    acc: &mut Accumulator,
) -> CompileResult {
    let condition = visit_required(visitor, &node.arguments()[0], acc)?;
    acc.statement(format!("{keyword} {condition}:"));
    acc.block(|acc| visit_body(visitor, &node.arguments()[1], acc))?;
    Ok(Some(Vec::new()))
}

fn else_statement(
    visitor: &CodegenVisitor,
    node: &NodeRef,
    acc: &mut Accumulator,
) -> CompileResult {
    acc.statement("else:");
    acc.block(|acc| visit_body(visitor, &node.arguments()[0], acc))?;
    Ok(Some(Vec::new()))
}

fn for_statement(
    visitor: &CodegenVisitor,
    node: &NodeRef,
    acc: &mut Accumulator,
) -> CompileResult {
    let target = visit_required(visitor, &node.arguments()[0], acc)?;
    let iterable = visit_required(visitor, &node.arguments()[1], acc)?;
    acc.statement(format!("for {target} in {iterable}:"));
    acc.block(|acc| visit_body(visitor, &node.arguments()[2], acc))?;
    Ok(Some(Vec::new()))
}

/// The `namespace:path` value of a module location, or the bare path for
/// a native module.
fn module_value(module: &NodeRef) -> String {
    let path = super::expect_str(module, "path");
    match module.leaf_str("namespace") {
        Some(namespace) => format!("{namespace}:{path}"),
        None => path.to_string(),
    }
}

fn import_statement(
    _visitor: &CodegenVisitor,
    node: &NodeRef,
    acc: &mut Accumulator,
) -> CompileResult {
    acc.statement(acc.lineno(node));

    let arguments = node.arguments();
    let module = &arguments[0];
    let namespaced = module.leaf_str("namespace").is_some();
    let path = super::expect_str(module, "path");

    match node.identifier() {
        "from:module:import:subcommand" => {
            let mut names: Vec<String> = Vec::new();
            let mut subcommand = &arguments[1];
            loop {
                let name = subcommand
                    .arguments()
                    .first()
                    .filter(|name| name.kind() == NodeKind::ImportedIdentifier)
                    .and_then(|name| name.leaf_str("value"))
                    .ok_or(CodegenError::MalformedImport)?;
                names.push(name.to_string());

                if subcommand.identifier() == "from:module:import:name:subcommand" {
                    subcommand = &subcommand.arguments()[1];
                } else {
                    break;
                }
            }

            if namespaced {
                let mut args = vec![Value::from(module_value(module)).repr()];
                args.extend(names.iter().map(|name| Value::from(name.as_str()).repr()));
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                let call = acc.helper(Helper::FromModuleImport, &args);
                acc.statement(format!("{} = {call}", names.join(", ")));
            } else {
                acc.statement(format!("from {path} import {}", names.join(", ")));
            }
        }
        "import:module:as:alias" => {
            let alias = super::expect_str(&arguments[1], "value");
            if namespaced {
                let module_repr = Value::from(module_value(module)).repr();
                let call = acc.helper(Helper::ImportModule, &[module_repr.as_str()]);
                acc.statement(format!("{alias} = {call}.namespace"));
            } else {
                acc.statement(format!("import {path} as {alias}"));
            }
        }
        _ => {
            if namespaced {
                let module_repr = Value::from(module_value(module)).repr();
                let call = acc.helper(Helper::ImportModule, &[module_repr.as_str()]);
                acc.statement(call);
            } else {
                acc.statement(format!("import {path}"));
            }
        }
    }

    Ok(Some(Vec::new()))
}
