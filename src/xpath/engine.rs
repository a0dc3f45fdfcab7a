//! Evaluation of a parsed expression against a document.

use ahash::{HashMap, HashSet};

use super::ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, NodeTypeTest, Step};
use super::functions;
use crate::document::{Document, Node};
use crate::error::Error;
use crate::xmlvalue::Value;

/// The result of evaluating an XPath expression.
#[derive(Debug, Clone, PartialEq)]
pub enum XPathValue {
    /// Nodes without duplicates, in document order.
    NodeSet(Vec<Node>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl XPathValue {
    /// Coerce to a boolean as XPath `boolean()` does.
    pub fn to_bool(&self) -> bool {
        match self {
            XPathValue::NodeSet(nodes) => !nodes.is_empty(),
            XPathValue::String(s) => !s.is_empty(),
            XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XPathValue::Boolean(b) => *b,
        }
    }

    /// Coerce to a number as XPath `number()` does.
    pub fn to_number(&self, doc: &Document) -> f64 {
        match self {
            XPathValue::Number(n) => *n,
            XPathValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            _ => string_to_number(&self.to_string_value(doc)),
        }
    }

    /// Coerce to a string as XPath `string()` does: a node-set gives the
    /// string-value of its first node.
    pub fn to_string_value(&self, doc: &Document) -> String {
        match self {
            XPathValue::NodeSet(nodes) => nodes
                .first()
                .map(|n| doc.text_content(*n))
                .unwrap_or_default(),
            XPathValue::String(s) => s.clone(),
            XPathValue::Number(n) => format_number(*n),
            XPathValue::Boolean(b) => b.to_string(),
        }
    }
}

/// Format a number the XPath way: `NaN`, `Infinity`, `-Infinity`, integral
/// values without a fraction and never an exponent.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == 0.0 {
        // also -0
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

/// Convert a string to a number the XPath way: optional whitespace, an
/// optional minus sign and a decimal number. Anything else is NaN.
pub fn string_to_number(s: &str) -> f64 {
    let s = s.trim();
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut seen_digit = false;
    let mut seen_dot = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return f64::NAN,
        }
    }
    if !seen_digit {
        return f64::NAN;
    }
    s.parse().unwrap_or(f64::NAN)
}

pub(crate) fn query_error(message: impl Into<String>) -> Error {
    Error::Query {
        path: String::new(),
        message: message.into(),
    }
}

/// Position of every node in the tree being queried.
pub(crate) struct DocumentOrder(HashMap<Node, usize>);

impl DocumentOrder {
    pub(crate) fn new(doc: &Document, root: Node) -> Self {
        DocumentOrder(
            doc.document_order(root)
                .enumerate()
                .map(|(i, node)| (node, i))
                .collect(),
        )
    }

    pub(crate) fn sort(&self, nodes: &mut Vec<Node>) {
        let mut seen = HashSet::default();
        nodes.retain(|n| seen.insert(*n));
        nodes.sort_by_key(|n| self.0.get(n).copied().unwrap_or(usize::MAX));
    }
}

/// Everything needed to evaluate an expression at one node.
pub(crate) struct EvaluationContext<'d> {
    pub(crate) doc: &'d Document,
    pub(crate) node: Node,
    /// 1-based.
    pub(crate) position: usize,
    pub(crate) size: usize,
    pub(crate) root: Node,
    /// Where in-scope namespace declarations are looked up.
    pub(crate) scope: Node,
    pub(crate) order: &'d DocumentOrder,
}

impl<'d> EvaluationContext<'d> {
    fn at(&self, node: Node, position: usize, size: usize) -> Self {
        EvaluationContext {
            doc: self.doc,
            node,
            position,
            size,
            root: self.root,
            scope: self.scope,
            order: self.order,
        }
    }
}

/// Evaluate an expression.
pub(crate) fn evaluate(expr: &Expression, e_ctx: &EvaluationContext) -> Result<XPathValue, Error> {
    match expr {
        Expression::Literal(s) => Ok(XPathValue::String(s.clone())),
        Expression::Number(n) => Ok(XPathValue::Number(*n)),
        Expression::LocationPath(path) => {
            let nodes = evaluate_location_path(path, e_ctx)?;
            Ok(XPathValue::NodeSet(nodes))
        }
        Expression::FunctionCall { name, args } => {
            let mut evaluated_args = Vec::with_capacity(args.len());
            for arg in args {
                evaluated_args.push(evaluate(arg, e_ctx)?);
            }
            functions::evaluate_function(name, evaluated_args, e_ctx)
        }
        Expression::Filter {
            primary,
            predicates,
        } => match evaluate(primary, e_ctx)? {
            XPathValue::NodeSet(nodes) => Ok(XPathValue::NodeSet(apply_predicates(
                nodes, predicates, e_ctx,
            )?)),
            _ => Err(query_error("predicates can only filter node-sets")),
        },
        Expression::BinaryOp { left, op, right } => evaluate_binary(left, *op, right, e_ctx),
        Expression::Negate(expr) => {
            let value = evaluate(expr, e_ctx)?;
            Ok(XPathValue::Number(-value.to_number(e_ctx.doc)))
        }
    }
}

fn evaluate_binary(
    left: &Expression,
    op: BinaryOperator,
    right: &Expression,
    e_ctx: &EvaluationContext,
) -> Result<XPathValue, Error> {
    use BinaryOperator::*;
    let doc = e_ctx.doc;
    let value = |expr: &Expression| evaluate(expr, e_ctx);
    let number = |expr: &Expression| -> Result<f64, Error> { Ok(value(expr)?.to_number(doc)) };
    let result = match op {
        // the boolean operators short-circuit
        Or => XPathValue::Boolean(value(left)?.to_bool() || value(right)?.to_bool()),
        And => XPathValue::Boolean(value(left)?.to_bool() && value(right)?.to_bool()),
        Union => match (value(left)?, value(right)?) {
            (XPathValue::NodeSet(mut left), XPathValue::NodeSet(right)) => {
                left.extend(right);
                e_ctx.order.sort(&mut left);
                XPathValue::NodeSet(left)
            }
            _ => return Err(query_error("union of values that are not node-sets")),
        },
        Equals | NotEquals | LessThan | LessThanOrEqual | GreaterThan | GreaterThanOrEqual => {
            XPathValue::Boolean(compare(doc, op, &value(left)?, &value(right)?))
        }
        Plus => XPathValue::Number(number(left)? + number(right)?),
        Minus => XPathValue::Number(number(left)? - number(right)?),
        Multiply => XPathValue::Number(number(left)? * number(right)?),
        Divide => XPathValue::Number(number(left)? / number(right)?),
        // truncating remainder, like Rust's %
        Modulo => XPathValue::Number(number(left)? % number(right)?),
    };
    Ok(result)
}

fn compare_atoms(op: BinaryOperator, left: &Atom, right: &Atom) -> bool {
    use BinaryOperator::*;
    match op {
        Equals | NotEquals => {
            let equal = match (left, right) {
                (Atom::Boolean(l), r) => *l == r.to_bool(),
                (l, Atom::Boolean(r)) => l.to_bool() == *r,
                (Atom::Number(l), r) => *l == r.to_number(),
                (l, Atom::Number(r)) => l.to_number() == *r,
                (Atom::String(l), Atom::String(r)) => l == r,
            };
            if op == Equals {
                equal
            } else {
                !equal
            }
        }
        _ => {
            let (l, r) = (left.to_number(), right.to_number());
            match op {
                LessThan => l < r,
                LessThanOrEqual => l <= r,
                GreaterThan => l > r,
                _ => l >= r,
            }
        }
    }
}

// a single comparable value: node-sets compare node by node
enum Atom {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl Atom {
    fn to_bool(&self) -> bool {
        match self {
            Atom::String(s) => !s.is_empty(),
            Atom::Number(n) => *n != 0.0 && !n.is_nan(),
            Atom::Boolean(b) => *b,
        }
    }

    fn to_number(&self) -> f64 {
        match self {
            Atom::String(s) => string_to_number(s),
            Atom::Number(n) => *n,
            Atom::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

fn compare(doc: &Document, op: BinaryOperator, left: &XPathValue, right: &XPathValue) -> bool {
    let atoms = |value: &XPathValue| -> Vec<Atom> {
        match value {
            XPathValue::NodeSet(nodes) => nodes
                .iter()
                .map(|n| Atom::String(doc.text_content(*n)))
                .collect(),
            XPathValue::String(s) => vec![Atom::String(s.clone())],
            XPathValue::Number(n) => vec![Atom::Number(*n)],
            XPathValue::Boolean(b) => vec![Atom::Boolean(*b)],
        }
    };
    // a node-set compared with a boolean is converted as a whole
    match (left, right) {
        (XPathValue::NodeSet(_), XPathValue::Boolean(b)) => {
            return compare_atoms(op, &Atom::Boolean(left.to_bool()), &Atom::Boolean(*b))
        }
        (XPathValue::Boolean(b), XPathValue::NodeSet(_)) => {
            return compare_atoms(op, &Atom::Boolean(*b), &Atom::Boolean(right.to_bool()))
        }
        _ => {}
    }
    let left_atoms = atoms(left);
    let right_atoms = atoms(right);
    left_atoms
        .iter()
        .any(|l| right_atoms.iter().any(|r| compare_atoms(op, l, r)))
}

fn evaluate_location_path(
    path: &LocationPath,
    e_ctx: &EvaluationContext,
) -> Result<Vec<Node>, Error> {
    let mut current_nodes = if let Some(start_expr) = &path.start_point {
        match evaluate(start_expr, e_ctx)? {
            XPathValue::NodeSet(nodes) => nodes,
            _ => return Err(query_error("a path can only continue from a node-set")),
        }
    } else if path.is_absolute {
        vec![e_ctx.root]
    } else {
        vec![e_ctx.node]
    };
    for step in &path.steps {
        current_nodes = evaluate_step(step, &current_nodes, e_ctx)?;
    }
    Ok(current_nodes)
}

// predicates are applied per context node, so positions count along the
// axis from that node
fn evaluate_step(
    step: &Step,
    context_nodes: &[Node],
    e_ctx: &EvaluationContext,
) -> Result<Vec<Node>, Error> {
    let matcher = NameMatcher::new(&step.node_test, e_ctx)?;
    let mut result = Vec::new();
    for node in context_nodes {
        let axis_nodes = collect_axis_nodes(e_ctx.doc, step.axis, *node)?;
        let tested = axis_nodes
            .into_iter()
            .filter(|n| matcher.matches(e_ctx.doc, *n, step.axis))
            .collect::<Vec<_>>();
        result.extend(apply_predicates(tested, &step.predicates, e_ctx)?);
    }
    e_ctx.order.sort(&mut result);
    Ok(result)
}

/// Nodes along an axis, in axis order: reverse axes nearest first.
fn collect_axis_nodes(doc: &Document, axis: Axis, node: Node) -> Result<Vec<Node>, Error> {
    let is_attribute = doc.is_attribute(node);
    let nodes = match axis {
        Axis::Child => doc.children(node).collect(),
        Axis::Descendant => doc.descendants(node).skip(1).collect(),
        Axis::DescendantOrSelf => {
            if is_attribute {
                vec![node]
            } else {
                doc.descendants(node).collect()
            }
        }
        Axis::Attribute => doc.attribute_nodes(node).collect(),
        Axis::Parent => doc.parent(node).into_iter().collect(),
        Axis::Ancestor => doc.ancestors(node).skip(1).collect(),
        Axis::AncestorOrSelf => doc.ancestors(node).collect(),
        Axis::SelfAxis => vec![node],
        Axis::FollowingSibling => {
            if is_attribute {
                Vec::new()
            } else {
                doc.following_siblings(node).skip(1).collect()
            }
        }
        Axis::PrecedingSibling => {
            if is_attribute {
                Vec::new()
            } else {
                doc.preceding_siblings(node).skip(1).collect()
            }
        }
        Axis::Following => doc.following(node).collect(),
        Axis::Preceding => doc.preceding(node).collect(),
        Axis::Namespace => return Err(query_error("the namespace axis is not supported")),
    };
    Ok(nodes)
}

fn apply_predicates(
    nodes: Vec<Node>,
    predicates: &[Expression],
    e_ctx: &EvaluationContext,
) -> Result<Vec<Node>, Error> {
    let mut current = nodes;
    for predicate in predicates {
        let size = current.len();
        let mut kept = Vec::new();
        for (i, node) in current.iter().enumerate() {
            let predicate_ctx = e_ctx.at(*node, i + 1, size);
            let keep = match evaluate(predicate, &predicate_ctx)? {
                XPathValue::Number(n) => n == (i + 1) as f64,
                other => other.to_bool(),
            };
            if keep {
                kept.push(*node);
            }
        }
        current = kept;
    }
    Ok(current)
}

// a node test with its prefix resolved
enum NameMatcher<'t> {
    Name {
        namespace: Option<String>,
        local: &'t str,
    },
    Namespace(String),
    Any,
    Type(&'t NodeTypeTest),
}

impl<'t> NameMatcher<'t> {
    fn new(test: &'t NodeTest, e_ctx: &EvaluationContext) -> Result<Self, Error> {
        let resolve = |prefix: &str| {
            e_ctx
                .doc
                .resolve_prefix_uri(e_ctx.scope, prefix)
                .ok_or_else(|| query_error(format!("undefined namespace prefix: {}", prefix)))
        };
        Ok(match test {
            NodeTest::Name { prefix, local } => NameMatcher::Name {
                namespace: match prefix {
                    Some(prefix) => Some(resolve(prefix)?),
                    None => None,
                },
                local,
            },
            NodeTest::PrefixWildcard(prefix) => NameMatcher::Namespace(resolve(prefix)?),
            NodeTest::Wildcard => NameMatcher::Any,
            NodeTest::NodeType(node_type) => NameMatcher::Type(node_type),
        })
    }

    fn matches(&self, doc: &Document, node: Node, axis: Axis) -> bool {
        // the principal node type of the attribute axis is attribute,
        // for the others element
        let principal = if axis == Axis::Attribute {
            doc.is_attribute(node)
        } else {
            doc.is_element(node)
        };
        match self {
            NameMatcher::Name { namespace, local } => {
                principal
                    && doc.local_name(node) == Some(*local)
                    && doc.namespace_uri(node) == namespace.as_deref()
            }
            NameMatcher::Namespace(namespace) => {
                principal && doc.namespace_uri(node) == Some(namespace.as_str())
            }
            NameMatcher::Any => principal,
            NameMatcher::Type(node_type) => match (node_type, doc.value(node)) {
                (NodeTypeTest::Node, _) => true,
                (NodeTypeTest::Text, Value::Text(_) | Value::CData(_)) => true,
                (NodeTypeTest::Comment, Value::Comment(_)) => true,
                (NodeTypeTest::ProcessingInstruction(target), Value::ProcessingInstruction(pi)) => {
                    target.as_deref().map_or(true, |t| t == pi.target())
                }
                _ => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xpath::parse_expression;

    fn eval(doc: &Document, path: &str) -> XPathValue {
        let expr = parse_expression(path).unwrap();
        let root = doc.root();
        let order = DocumentOrder::new(doc, root);
        let e_ctx = EvaluationContext {
            doc,
            node: root,
            position: 1,
            size: 1,
            root,
            scope: root,
            order: &order,
        };
        evaluate(&expr, &e_ctx).unwrap()
    }

    fn names(doc: &Document, value: XPathValue) -> Vec<String> {
        match value {
            XPathValue::NodeSet(nodes) => nodes
                .into_iter()
                .map(|n| {
                    doc.qualified_name(n)
                        .unwrap_or_else(|| doc.text_content(n))
                })
                .collect(),
            other => panic!("expected node-set, got {:?}", other),
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(1e20), "100000000000000000000");
    }

    #[test]
    fn test_string_to_number() {
        assert_eq!(string_to_number(" 12 "), 12.0);
        assert_eq!(string_to_number("-1.5"), -1.5);
        assert_eq!(string_to_number(".5"), 0.5);
        assert!(string_to_number("1e3").is_nan());
        assert!(string_to_number("+1").is_nan());
        assert!(string_to_number("inf").is_nan());
        assert!(string_to_number("").is_nan());
    }

    #[test]
    fn test_positional_predicate_per_parent() {
        let doc = Document::parse("<r><a><b>1</b><b>2</b></a><a><b>3</b></a></r>").unwrap();
        let value = eval(&doc, "/r/a/b[1]");
        assert_eq!(names(&doc, value), vec!["b", "b"]);
        assert_eq!(
            eval(&doc, "string(/r/a[2]/b)"),
            XPathValue::String("3".to_string())
        );
    }

    #[test]
    fn test_reverse_axis_positions() {
        let doc = Document::parse("<r><a/><b/><c/></r>").unwrap();
        let value = eval(&doc, "/r/c/preceding-sibling::*[1]");
        assert_eq!(names(&doc, value), vec!["b"]);
        let value = eval(&doc, "/r/c/preceding-sibling::*");
        assert_eq!(names(&doc, value), vec!["a", "b"]);
    }

    #[test]
    fn test_union_in_document_order() {
        let doc = Document::parse("<r><a/><b/></r>").unwrap();
        let value = eval(&doc, "/r/b | /r/a | /r/b");
        assert_eq!(names(&doc, value), vec!["a", "b"]);
    }

    #[test]
    fn test_attributes_and_parent() {
        let doc = Document::parse(r#"<r><a id="x"/><a id="y"/></r>"#).unwrap();
        let value = eval(&doc, "//a[@id='y']/@id/..");
        assert_eq!(names(&doc, value), vec!["a"]);
        assert_eq!(eval(&doc, "count(//@*)"), XPathValue::Number(2.0));
    }

    #[test]
    fn test_comparisons() {
        let doc = Document::parse("<r><n>1</n><n>5</n></r>").unwrap();
        assert_eq!(eval(&doc, "/r/n = 5"), XPathValue::Boolean(true));
        assert_eq!(eval(&doc, "/r/n != 5"), XPathValue::Boolean(true));
        assert_eq!(eval(&doc, "/r/n > 7"), XPathValue::Boolean(false));
        assert_eq!(eval(&doc, "/r/missing = ''"), XPathValue::Boolean(false));
        assert_eq!(eval(&doc, "'1' = 1.0"), XPathValue::Boolean(true));
        assert_eq!(eval(&doc, "true() = 'x'"), XPathValue::Boolean(true));
    }

    #[test]
    fn test_arithmetic() {
        let doc = Document::new();
        assert_eq!(eval(&doc, "7 mod 3"), XPathValue::Number(1.0));
        assert_eq!(eval(&doc, "1 div 0"), XPathValue::Number(f64::INFINITY));
        assert_eq!(eval(&doc, "-(2 + 3) * 2"), XPathValue::Number(-10.0));
    }

    #[test]
    fn test_text_matches_cdata() {
        let doc = Document::parse("<r>a<![CDATA[b]]><!--c--></r>").unwrap();
        assert_eq!(eval(&doc, "count(/r/text())"), XPathValue::Number(2.0));
        assert_eq!(eval(&doc, "count(/r/comment())"), XPathValue::Number(1.0));
        assert_eq!(eval(&doc, "count(/r/node())"), XPathValue::Number(3.0));
    }
}
