//! Syntax tree of XPath 1.0 expressions.

/// An expression that can be evaluated against a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(String),
    Number(f64),
    LocationPath(LocationPath),
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
    /// A primary expression followed by predicates, like `(a|b)[1]`.
    Filter {
        primary: Box<Expression>,
        predicates: Vec<Expression>,
    },
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    Negate(Box<Expression>),
}

impl Expression {
    /// Checks if the expression is a `LocationPath` variant.
    pub fn is_location_path(&self) -> bool {
        matches!(self, Expression::LocationPath(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Or,
    And,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Union,
}

/// A location path, like `/child::foo`, `descendant::bar[1]` or `(a|b)/c`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    /// The expression the path starts from, for paths like `id('x')/foo`.
    /// If `None`, the path starts from the context node or the root.
    pub start_point: Option<Box<Expression>>,
    /// True if the path starts from the root (`/foo`). Ignored when
    /// `start_point` is set.
    pub is_absolute: bool,
    pub steps: Vec<Step>,
}

/// A single step, like `child::foo[position() > 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub node_test: NodeTest,
    pub predicates: Vec<Expression>,
}

impl Step {
    pub(crate) fn new(axis: Axis, node_test: NodeTest) -> Self {
        Step {
            axis,
            node_test,
            predicates: Vec::new(),
        }
    }

    // the step `//` stands for
    pub(crate) fn descendant_or_self() -> Self {
        Step::new(
            Axis::DescendantOrSelf,
            NodeTest::NodeType(NodeTypeTest::Node),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Attribute,
    Parent,
    Ancestor,
    AncestorOrSelf,
    SelfAxis,
    FollowingSibling,
    PrecedingSibling,
    Following,
    Preceding,
    /// Parsed, but namespace nodes are not part of the tree.
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// A name test; the prefix is resolved when the path is evaluated.
    Name {
        prefix: Option<String>,
        local: String,
    },
    /// `*`
    Wildcard,
    /// `prefix:*`
    PrefixWildcard(String),
    /// `text()`, `node()` and friends.
    NodeType(NodeTypeTest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTypeTest {
    Text,
    Node,
    Comment,
    /// `processing-instruction()`, optionally with a target literal.
    ProcessingInstruction(Option<String>),
}
