use super::*;
use pretty_assertions::assert_eq;
use sable_ir::Node;

fn value(v: impl Into<Value>) -> NodeRef {
    Node::build(NodeKind::Value).leaf("value", v).done()
}

/// A command resembling `particle dust 1.0 0.5 0.5 1.0 7 7 7`.
fn particle_command() -> NodeRef {
    Node::build(NodeKind::Command)
        .leaf("identifier", "particle:name:parameters")
        .children(
            "arguments",
            [
                Node::build(NodeKind::ResourceLocation)
                    .leaf("namespace", Value::None)
                    .leaf("path", "dust")
                    .done(),
                Node::build(NodeKind::Tuple)
                    .children(
                        "items",
                        [value(1.0), value(0.5), value(0.5), value(1.0)],
                    )
                    .done(),
                value(7i64),
                value(7i64),
                value(7i64),
            ],
        )
        .done()
}

#[test]
fn collects_matching_nodes_across_walk() {
    let mut visitor: Visitor<Vec<Value>, ()> = Visitor::walking();
    visitor.add_rule(Rule::for_kind(NodeKind::Value, |_, node, out: &mut Vec<Value>| {
        if let Some(v) = node.leaf("value") {
            out.push(v.clone());
        }
    }));

    let mut values = Vec::new();
    visitor.invoke(&particle_command(), &mut values);

    assert_eq!(
        values,
        vec![
            Value::Float(1.0),
            Value::Float(0.5),
            Value::Float(0.5),
            Value::Float(1.0),
            Value::Int(7),
            Value::Int(7),
            Value::Int(7),
        ]
    );
}

#[derive(Default)]
struct Collected {
    kinds: Vec<NodeKind>,
    numbers: Vec<Value>,
    sevens: usize,
}

#[test]
fn extended_rule_sets_compose() {
    let mut visitor: Visitor<Collected, ()> = Visitor::new();
    visitor.add_rule(Rule::new(|v, node, out: &mut Collected| {
        out.kinds.push(node.kind());
        walk_children(v, node, out);
    }));
    visitor.add_rule(
        Rule::for_kind(NodeKind::Value, |_, _, out: &mut Collected| {
            out.sevens += 1;
        })
        .constrain("value", 7i64),
    );

    let mut numbers: Visitor<Collected, ()> = Visitor::new();
    numbers.add_rule(Rule::for_kind(NodeKind::Value, |_, node, out: &mut Collected| {
        if let Some(v) = node.leaf("value") {
            out.numbers.push(v.clone());
        }
    }));
    visitor.extend(numbers);

    let mut out = Collected::default();
    visitor.invoke(&particle_command(), &mut out);

    // The default rule saw every node without a more specific handler.
    assert_eq!(
        out.kinds,
        vec![NodeKind::Command, NodeKind::ResourceLocation, NodeKind::Tuple]
    );
    // The extended unconstrained rule took the non-seven values, even
    // though the seven rule was registered earlier.
    assert_eq!(
        out.numbers,
        vec![
            Value::Float(1.0),
            Value::Float(0.5),
            Value::Float(0.5),
            Value::Float(1.0),
        ]
    );
    assert_eq!(out.sevens, 3);
}

#[test]
fn parent_rules_consume_child_results() {
    fn say(text: &str) -> NodeRef {
        Node::build(NodeKind::Command)
            .leaf("identifier", "say:message")
            .children("arguments", [value(text)])
            .done()
    }

    let root = Node::build(NodeKind::Root)
        .children("commands", [say("hello"), say("world")])
        .done();

    let mut visitor: Visitor<(), Vec<String>> = Visitor::new();
    visitor.add_rule(Rule::for_kind(NodeKind::Root, |v, node, ctx| {
        let mut commands = Vec::new();
        for command in node.children("commands").unwrap_or(&[]) {
            commands.extend(v.invoke(command, ctx));
        }
        commands
    }));
    visitor.add_rule(Rule::for_kind(NodeKind::Command, |v, node, ctx| {
        let arguments: Vec<String> = node
            .arguments()
            .iter()
            .flat_map(|argument| v.invoke(argument, ctx))
            .collect();
        vec![format!("{}({})", node.identifier(), arguments.join(", "))]
    }));
    visitor.add_rule(Rule::for_kind(NodeKind::Value, |_, node, _| {
        node.leaf("value").map(Value::repr).into_iter().collect()
    }));

    let result = visitor.invoke(&root, &mut ());
    assert_eq!(result, vec!["say:message('hello')", "say:message('world')"]);
}

#[test]
fn constrained_rule_wins_only_on_match() {
    let mut visitor: Visitor<Vec<&'static str>, ()> = Visitor::new();
    visitor.add_rule(Rule::for_kind(NodeKind::Value, |_, _, out: &mut Vec<_>| {
        out.push("any value");
    }));
    visitor.add_rule(
        Rule::for_kind(NodeKind::Value, |_, _, out: &mut Vec<_>| {
            out.push("seven");
        })
        .constrain("value", 7i64),
    );

    let mut out = Vec::new();
    visitor.invoke(&value(7i64), &mut out);
    visitor.invoke(&value(3i64), &mut out);
    assert_eq!(out, vec!["seven", "any value"]);
}

#[test]
fn recency_breaks_specificity_ties() {
    let mut visitor: Visitor<Vec<&'static str>, ()> = Visitor::new();
    visitor.add_rule(Rule::for_kind(NodeKind::Value, |_, _, out: &mut Vec<_>| {
        out.push("first");
    }));
    visitor.add_rule(Rule::for_kind(NodeKind::Value, |_, _, out: &mut Vec<_>| {
        out.push("second");
    }));

    let mut out = Vec::new();
    visitor.invoke(&value(1i64), &mut out);
    assert_eq!(out, vec!["second"]);
}

#[test]
#[should_panic(expected = "no dispatch rule matches")]
fn missing_rule_is_a_defect() {
    let visitor: Visitor<(), ()> = Visitor::new();
    visitor.invoke(&value(1i64), &mut ());
}
