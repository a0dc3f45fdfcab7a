//! A `nom` parser for XPath 1.0 expressions.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit0, digit1, multispace0, satisfy},
    combinator::{map, map_res, not, opt, recognize},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated},
    IResult, Parser,
};

use super::ast::*;
use crate::error::Error;

/// Parse an XPath 1.0 expression.
pub fn parse_expression(input: &str) -> Result<Expression, Error> {
    match expression(input.trim()) {
        Ok(("", expr)) => Ok(expr),
        Ok((rem, _)) => Err(Error::Query {
            path: input.to_string(),
            message: format!("unexpected input at '{}'", rem),
        }),
        Err(e) => Err(Error::Query {
            path: input.to_string(),
            message: e.to_string(),
        }),
    }
}

type Operand<'a> = fn(&'a str) -> IResult<&'a str, Expression>;
type Operator<'a> = fn(&'a str) -> IResult<&'a str, BinaryOperator>;

// left associative chain: operand (operator operand)*
fn binary_chain<'a>(
    input: &'a str,
    operand: Operand<'a>,
    operator: Operator<'a>,
) -> IResult<&'a str, Expression> {
    let (mut input, mut left) = operand(input)?;
    loop {
        match preceded(multispace0, operator).parse(input) {
            Ok((rest, op)) => {
                let (rest, right) = operand(rest)?;
                left = Expression::BinaryOp {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                };
                input = rest;
            }
            Err(nom::Err::Error(_)) => return Ok((input, left)),
            Err(e) => return Err(e),
        }
    }
}

fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '\u{B7}')
}

// an operator name like `and` must not run on into a longer name
fn keyword<'a>(
    word: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> {
    terminated(tag(word), not(satisfy(is_name_char)))
}

// --- Expressions, lowest precedence first ---

fn expression(input: &str) -> IResult<&str, Expression> {
    or_expr(input)
}

fn or_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(keyword("or"), |_| BinaryOperator::Or).parse(input)
}

fn and_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(keyword("and"), |_| BinaryOperator::And).parse(input)
}

fn equality_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(tag("!="), |_| BinaryOperator::NotEquals),
        map(tag("="), |_| BinaryOperator::Equals),
    ))
    .parse(input)
}

fn relational_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(tag("<="), |_| BinaryOperator::LessThanOrEqual),
        map(tag(">="), |_| BinaryOperator::GreaterThanOrEqual),
        map(tag("<"), |_| BinaryOperator::LessThan),
        map(tag(">"), |_| BinaryOperator::GreaterThan),
    ))
    .parse(input)
}

fn additive_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(char('+'), |_| BinaryOperator::Plus),
        map(char('-'), |_| BinaryOperator::Minus),
    ))
    .parse(input)
}

fn multiplicative_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(char('*'), |_| BinaryOperator::Multiply),
        map(keyword("div"), |_| BinaryOperator::Divide),
        map(keyword("mod"), |_| BinaryOperator::Modulo),
    ))
    .parse(input)
}

fn union_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(char('|'), |_| BinaryOperator::Union).parse(input)
}

fn or_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(input, and_expr, or_op)
}

fn and_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(input, equality_expr, and_op)
}

fn equality_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(input, relational_expr, equality_op)
}

fn relational_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(input, additive_expr, relational_op)
}

fn additive_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(input, multiplicative_expr, additive_op)
}

fn multiplicative_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(input, unary_expr, multiplicative_op)
}

fn unary_expr(input: &str) -> IResult<&str, Expression> {
    alt((
        map(preceded(preceded(multispace0, char('-')), unary_expr), |expr| {
            Expression::Negate(Box::new(expr))
        }),
        union_expr,
    ))
    .parse(input)
}

fn union_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(input, path_expr, union_op)
}

fn path_separator(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, alt((tag("//"), tag("/")))).parse(input)
}

// a filter expression optionally followed by more steps, or a plain
// location path
fn path_expr(input: &str) -> IResult<&str, Expression> {
    let (i, start_expr) =
        alt((filter_expr, map(location_path, Expression::LocationPath))).parse(input)?;
    if start_expr.is_location_path() {
        return Ok((i, start_expr));
    }
    let (i, remainder) = many0(pair(path_separator, step)).parse(i)?;
    if remainder.is_empty() {
        return Ok((i, start_expr));
    }
    let mut steps = Vec::new();
    for (separator, next_step) in remainder {
        if separator == "//" {
            steps.push(Step::descendant_or_self());
        }
        steps.push(next_step);
    }
    Ok((
        i,
        Expression::LocationPath(LocationPath {
            start_point: Some(Box::new(start_expr)),
            is_absolute: false,
            steps,
        }),
    ))
}

fn filter_expr(input: &str) -> IResult<&str, Expression> {
    let (i, primary) = primary_expr(input)?;
    let (i, predicates) = many0(predicate).parse(i)?;
    if predicates.is_empty() {
        Ok((i, primary))
    } else {
        Ok((
            i,
            Expression::Filter {
                primary: Box::new(primary),
                predicates,
            },
        ))
    }
}

fn primary_expr(input: &str) -> IResult<&str, Expression> {
    preceded(
        multispace0,
        alt((
            map(number, Expression::Number),
            map(string_literal, Expression::Literal),
            function_call,
            delimited(char('('), expression, preceded(multispace0, char(')'))),
        )),
    )
    .parse(input)
}

// --- Literals ---

// digits with an optional fraction, or a fraction alone; no sign, no
// exponent and no named values
fn number(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        ))),
        |s: &str| s.parse::<f64>(),
    )
    .parse(input)
}

fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

// --- Names and node tests ---

fn nc_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(is_name_start_char),
        take_while(is_name_char),
    ))
    .parse(input)
}

fn q_name(input: &str) -> IResult<&str, (Option<&str>, &str)> {
    map(
        pair(nc_name, opt(preceded(char(':'), nc_name))),
        |(first, second)| match second {
            Some(local) => (Some(first), local),
            None => (None, first),
        },
    )
    .parse(input)
}

fn empty_parens(input: &str) -> IResult<&str, ()> {
    map(
        pair(
            preceded(multispace0, char('(')),
            preceded(multispace0, char(')')),
        ),
        |_| (),
    )
    .parse(input)
}

fn node_type_test(input: &str) -> IResult<&str, NodeTest> {
    alt((
        map(terminated(tag("text"), empty_parens), |_| {
            NodeTest::NodeType(NodeTypeTest::Text)
        }),
        map(terminated(tag("node"), empty_parens), |_| {
            NodeTest::NodeType(NodeTypeTest::Node)
        }),
        map(terminated(tag("comment"), empty_parens), |_| {
            NodeTest::NodeType(NodeTypeTest::Comment)
        }),
        map(
            preceded(
                tag("processing-instruction"),
                delimited(
                    preceded(multispace0, char('(')),
                    opt(preceded(multispace0, string_literal)),
                    preceded(multispace0, char(')')),
                ),
            ),
            |target| NodeTest::NodeType(NodeTypeTest::ProcessingInstruction(target)),
        ),
    ))
    .parse(input)
}

fn node_test(input: &str) -> IResult<&str, NodeTest> {
    alt((
        map(char('*'), |_| NodeTest::Wildcard),
        map(terminated(nc_name, tag(":*")), |prefix| {
            NodeTest::PrefixWildcard(prefix.to_string())
        }),
        node_type_test,
        map(q_name, |(prefix, local)| NodeTest::Name {
            prefix: prefix.map(|p| p.to_string()),
            local: local.to_string(),
        }),
    ))
    .parse(input)
}

// --- Location paths ---

fn axis(input: &str) -> IResult<&str, Axis> {
    terminated(
        alt((
            map(tag("ancestor-or-self"), |_| Axis::AncestorOrSelf),
            map(tag("ancestor"), |_| Axis::Ancestor),
            map(tag("attribute"), |_| Axis::Attribute),
            map(tag("child"), |_| Axis::Child),
            map(tag("descendant-or-self"), |_| Axis::DescendantOrSelf),
            map(tag("descendant"), |_| Axis::Descendant),
            map(tag("following-sibling"), |_| Axis::FollowingSibling),
            map(tag("following"), |_| Axis::Following),
            map(tag("namespace"), |_| Axis::Namespace),
            map(tag("parent"), |_| Axis::Parent),
            map(tag("preceding-sibling"), |_| Axis::PrecedingSibling),
            map(tag("preceding"), |_| Axis::Preceding),
            map(tag("self"), |_| Axis::SelfAxis),
        )),
        preceded(multispace0, tag("::")),
    )
    .parse(input)
}

fn predicate(input: &str) -> IResult<&str, Expression> {
    delimited(
        preceded(multispace0, char('[')),
        expression,
        preceded(multispace0, char(']')),
    )
    .parse(input)
}

fn step(input: &str) -> IResult<&str, Step> {
    let (i, (axis, node_test)) = preceded(
        multispace0,
        alt((
            map(tag(".."), |_| {
                (Axis::Parent, NodeTest::NodeType(NodeTypeTest::Node))
            }),
            map(tag("."), |_| {
                (Axis::SelfAxis, NodeTest::NodeType(NodeTypeTest::Node))
            }),
            map(preceded(char('@'), node_test), |nt| (Axis::Attribute, nt)),
            map(
                pair(opt(axis), preceded(multispace0, node_test)),
                |(axis, nt)| (axis.unwrap_or(Axis::Child), nt),
            ),
        )),
    )
    .parse(input)?;
    let (i, predicates) = many0(predicate).parse(i)?;
    Ok((
        i,
        Step {
            axis,
            node_test,
            predicates,
        },
    ))
}

fn location_path(input: &str) -> IResult<&str, LocationPath> {
    let (i, _) = multispace0(input)?;
    let (i, (is_absolute, mut steps)) = if let Ok((rest, _)) = tag::<&str, &str, nom::error::Error<&str>>("//").parse(i) {
        let (rest, first) = step(rest)?;
        (rest, (true, vec![Step::descendant_or_self(), first]))
    } else if let Ok((rest, _)) = char::<&str, nom::error::Error<&str>>('/').parse(i) {
        match step(rest) {
            Ok((rest, first)) => (rest, (true, vec![first])),
            // just "/": the root
            Err(_) => (rest, (true, vec![])),
        }
    } else {
        let (rest, first) = step(i)?;
        (rest, (false, vec![first]))
    };

    // a lone "/" takes no further steps
    if steps.is_empty() {
        return Ok((
            i,
            LocationPath {
                start_point: None,
                is_absolute,
                steps,
            },
        ));
    }
    let (i, remainder) = many0(pair(path_separator, step)).parse(i)?;
    for (separator, next_step) in remainder {
        if separator == "//" {
            steps.push(Step::descendant_or_self());
        }
        steps.push(next_step);
    }
    Ok((
        i,
        LocationPath {
            start_point: None,
            is_absolute,
            steps,
        },
    ))
}

fn function_call(input: &str) -> IResult<&str, Expression> {
    let (i, (prefix, local)) = q_name(input)?;
    // node type tests look like calls but belong to steps
    if prefix.is_none() && matches!(local, "text" | "node" | "comment" | "processing-instruction")
    {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    let (i, args) = delimited(
        preceded(multispace0, char('(')),
        separated_list0(preceded(multispace0, char(',')), expression),
        preceded(multispace0, char(')')),
    )
    .parse(i)?;
    let name = match prefix {
        Some(prefix) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    };
    Ok((i, Expression::FunctionCall { name, args }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(local: &str) -> NodeTest {
        NodeTest::Name {
            prefix: None,
            local: local.to_string(),
        }
    }

    fn relative(steps: Vec<Step>) -> Expression {
        Expression::LocationPath(LocationPath {
            start_point: None,
            is_absolute: false,
            steps,
        })
    }

    #[test]
    fn test_parse_simple_path() {
        assert_eq!(
            parse_expression("foo/bar").unwrap(),
            relative(vec![
                Step::new(Axis::Child, name("foo")),
                Step::new(Axis::Child, name("bar")),
            ])
        );
    }

    #[test]
    fn test_parse_prefixed_name() {
        let result = parse_expression("ns:foo").unwrap();
        assert_eq!(
            result,
            relative(vec![Step::new(
                Axis::Child,
                NodeTest::Name {
                    prefix: Some("ns".to_string()),
                    local: "foo".to_string()
                }
            )])
        );
    }

    #[test]
    fn test_parse_prefix_wildcard() {
        let result = parse_expression("ns:*").unwrap();
        assert_eq!(
            result,
            relative(vec![Step::new(
                Axis::Child,
                NodeTest::PrefixWildcard("ns".to_string())
            )])
        );
    }

    #[test]
    fn test_parse_unary_minus() {
        assert_eq!(
            parse_expression("-5").unwrap(),
            Expression::Negate(Box::new(Expression::Number(5.0)))
        );
        let result = parse_expression("10 - -5").unwrap();
        assert_eq!(
            result,
            Expression::BinaryOp {
                left: Box::new(Expression::Number(10.0)),
                op: BinaryOperator::Minus,
                right: Box::new(Expression::Negate(Box::new(Expression::Number(5.0)))),
            }
        );
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_expression("1.5").unwrap(), Expression::Number(1.5));
        assert_eq!(parse_expression(".5").unwrap(), Expression::Number(0.5));
        assert_eq!(parse_expression("3.").unwrap(), Expression::Number(3.0));
    }

    #[test]
    fn test_named_numbers_are_names() {
        // not infinity, but an element named inf
        assert_eq!(
            parse_expression("inf").unwrap(),
            relative(vec![Step::new(Axis::Child, name("inf"))])
        );
    }

    #[test]
    fn test_operator_names_as_element_names() {
        assert_eq!(
            parse_expression("div/order").unwrap(),
            relative(vec![
                Step::new(Axis::Child, name("div")),
                Step::new(Axis::Child, name("order")),
            ])
        );
        let result = parse_expression("a div b").unwrap();
        assert!(matches!(
            result,
            Expression::BinaryOp {
                op: BinaryOperator::Divide,
                ..
            }
        ));
        // "andy" is a name, not "and" followed by "y"
        assert!(parse_expression("a andy").is_err());
    }

    #[test]
    fn test_parse_axes() {
        if let Expression::LocationPath(lp) = parse_expression("following-sibling::foo").unwrap()
        {
            assert_eq!(lp.steps[0].axis, Axis::FollowingSibling);
        } else {
            panic!("expected location path");
        }
        if let Expression::LocationPath(lp) = parse_expression("ancestor-or-self::*").unwrap() {
            assert_eq!(lp.steps[0].axis, Axis::AncestorOrSelf);
            assert_eq!(lp.steps[0].node_test, NodeTest::Wildcard);
        } else {
            panic!("expected location path");
        }
    }

    #[test]
    fn test_parse_abbreviated_steps() {
        assert_eq!(
            parse_expression("../.").unwrap(),
            relative(vec![
                Step::new(Axis::Parent, NodeTest::NodeType(NodeTypeTest::Node)),
                Step::new(Axis::SelfAxis, NodeTest::NodeType(NodeTypeTest::Node)),
            ])
        );
    }

    #[test]
    fn test_parse_predicate() {
        let result = parse_expression("foo[@id = 'a']").unwrap();
        let mut expected = Step::new(Axis::Child, name("foo"));
        expected.predicates.push(Expression::BinaryOp {
            left: Box::new(relative(vec![Step::new(Axis::Attribute, name("id"))])),
            op: BinaryOperator::Equals,
            right: Box::new(Expression::Literal("a".into())),
        });
        assert_eq!(result, relative(vec![expected]));
    }

    #[test]
    fn test_parse_descendant_or_self() {
        assert_eq!(
            parse_expression("//foo").unwrap(),
            Expression::LocationPath(LocationPath {
                start_point: None,
                is_absolute: true,
                steps: vec![Step::descendant_or_self(), Step::new(Axis::Child, name("foo"))]
            })
        );
    }

    #[test]
    fn test_parse_root() {
        assert_eq!(
            parse_expression("/").unwrap(),
            Expression::LocationPath(LocationPath {
                start_point: None,
                is_absolute: true,
                steps: vec![]
            })
        );
    }

    #[test]
    fn test_parse_function_calls() {
        assert_eq!(
            parse_expression("count(a)").unwrap(),
            Expression::FunctionCall {
                name: "count".to_string(),
                args: vec![relative(vec![Step::new(Axis::Child, name("a"))])]
            }
        );
        if let Expression::LocationPath(lp) = parse_expression("foo/text()").unwrap() {
            assert_eq!(lp.steps[1].node_test, NodeTest::NodeType(NodeTypeTest::Text));
        } else {
            panic!("expected location path");
        }
    }

    #[test]
    fn test_parse_processing_instruction_target() {
        if let Expression::LocationPath(lp) =
            parse_expression("processing-instruction('php')").unwrap()
        {
            assert_eq!(
                lp.steps[0].node_test,
                NodeTest::NodeType(NodeTypeTest::ProcessingInstruction(Some(
                    "php".to_string()
                )))
            );
        } else {
            panic!("expected location path");
        }
    }

    #[test]
    fn test_parse_filter_then_path() {
        let result = parse_expression("(a|b)[1]/c").unwrap();
        if let Expression::LocationPath(lp) = result {
            assert!(matches!(
                lp.start_point.as_deref(),
                Some(Expression::Filter { .. })
            ));
            assert_eq!(lp.steps, vec![Step::new(Axis::Child, name("c"))]);
        } else {
            panic!("expected location path");
        }
    }

    #[test]
    fn test_parse_operator_precedence() {
        assert_eq!(
            parse_expression("1 + 2 * 3").unwrap(),
            Expression::BinaryOp {
                left: Box::new(Expression::Number(1.0)),
                op: BinaryOperator::Plus,
                right: Box::new(Expression::BinaryOp {
                    left: Box::new(Expression::Number(2.0)),
                    op: BinaryOperator::Multiply,
                    right: Box::new(Expression::Number(3.0)),
                }),
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_expression("foo[").is_err());
        assert!(parse_expression("foo)").is_err());
        assert!(parse_expression("").is_err());
        assert!(parse_expression("a/").is_err());
    }
}
