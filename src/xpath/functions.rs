//! The XPath 1.0 core function library.

use super::engine::{query_error, string_to_number, EvaluationContext, XPathValue};
use crate::error::Error;

fn arity(name: &str, args: &[XPathValue], min: usize, max: usize) -> Result<(), Error> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            format!("{}", min)
        } else {
            format!("{} to {}", min, max)
        };
        return Err(query_error(format!(
            "{}() expects {} arguments, got {}",
            name,
            expected,
            args.len()
        )));
    }
    Ok(())
}

// the string argument, or the string-value of the context node without one
fn string_arg(args: &[XPathValue], e_ctx: &EvaluationContext) -> String {
    match args.first() {
        Some(arg) => arg.to_string_value(e_ctx.doc),
        None => e_ctx.doc.text_content(e_ctx.node),
    }
}

// the first node of the node-set argument, or the context node
fn node_arg(
    name: &str,
    args: &[XPathValue],
    e_ctx: &EvaluationContext,
) -> Result<Option<crate::Node>, Error> {
    match args.first() {
        Some(XPathValue::NodeSet(nodes)) => Ok(nodes.first().copied()),
        Some(_) => Err(query_error(format!("{}() expects a node-set", name))),
        None => Ok(Some(e_ctx.node)),
    }
}

/// Dispatch a function call to its implementation.
pub(crate) fn evaluate_function(
    name: &str,
    args: Vec<XPathValue>,
    e_ctx: &EvaluationContext,
) -> Result<XPathValue, Error> {
    let doc = e_ctx.doc;
    let number_arg = |i: usize| args[i].to_number(doc);
    let string_at = |i: usize| args[i].to_string_value(doc);
    let value = match name {
        // node-set functions
        "last" => {
            arity(name, &args, 0, 0)?;
            XPathValue::Number(e_ctx.size as f64)
        }
        "position" => {
            arity(name, &args, 0, 0)?;
            XPathValue::Number(e_ctx.position as f64)
        }
        "count" => {
            arity(name, &args, 1, 1)?;
            match &args[0] {
                XPathValue::NodeSet(nodes) => XPathValue::Number(nodes.len() as f64),
                _ => return Err(query_error("count() expects a node-set")),
            }
        }
        "local-name" => {
            arity(name, &args, 0, 1)?;
            let node = node_arg(name, &args, e_ctx)?;
            XPathValue::String(
                node.and_then(|n| doc.local_name(n))
                    .unwrap_or_default()
                    .to_string(),
            )
        }
        "namespace-uri" => {
            arity(name, &args, 0, 1)?;
            let node = node_arg(name, &args, e_ctx)?;
            XPathValue::String(
                node.and_then(|n| doc.namespace_uri(n))
                    .unwrap_or_default()
                    .to_string(),
            )
        }
        "name" => {
            arity(name, &args, 0, 1)?;
            let node = node_arg(name, &args, e_ctx)?;
            XPathValue::String(node.and_then(|n| doc.qualified_name(n)).unwrap_or_default())
        }

        // string functions
        "string" => {
            arity(name, &args, 0, 1)?;
            XPathValue::String(string_arg(&args, e_ctx))
        }
        "concat" => {
            if args.len() < 2 {
                return Err(query_error("concat() expects at least 2 arguments"));
            }
            XPathValue::String(args.iter().map(|a| a.to_string_value(doc)).collect())
        }
        "starts-with" => {
            arity(name, &args, 2, 2)?;
            XPathValue::Boolean(string_at(0).starts_with(&string_at(1)))
        }
        "contains" => {
            arity(name, &args, 2, 2)?;
            XPathValue::Boolean(string_at(0).contains(&string_at(1)))
        }
        "substring-before" => {
            arity(name, &args, 2, 2)?;
            let (s, search) = (string_at(0), string_at(1));
            XPathValue::String(
                s.split_once(search.as_str())
                    .map(|(before, _)| before.to_string())
                    .unwrap_or_default(),
            )
        }
        "substring-after" => {
            arity(name, &args, 2, 2)?;
            let (s, search) = (string_at(0), string_at(1));
            XPathValue::String(
                s.split_once(search.as_str())
                    .map(|(_, after)| after.to_string())
                    .unwrap_or_default(),
            )
        }
        "substring" => {
            arity(name, &args, 2, 3)?;
            let s = string_at(0);
            let first = round(number_arg(1));
            let last = if args.len() == 3 {
                first + round(number_arg(2))
            } else {
                f64::INFINITY
            };
            XPathValue::String(
                s.chars()
                    .enumerate()
                    .filter(|(i, _)| {
                        let position = (i + 1) as f64;
                        position >= first && position < last
                    })
                    .map(|(_, c)| c)
                    .collect(),
            )
        }
        "string-length" => {
            arity(name, &args, 0, 1)?;
            XPathValue::Number(string_arg(&args, e_ctx).chars().count() as f64)
        }
        "normalize-space" => {
            arity(name, &args, 0, 1)?;
            XPathValue::String(
                string_arg(&args, e_ctx)
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" "),
            )
        }
        "translate" => {
            arity(name, &args, 3, 3)?;
            let from = string_at(1).chars().collect::<Vec<_>>();
            let to = string_at(2).chars().collect::<Vec<_>>();
            XPathValue::String(
                string_at(0)
                    .chars()
                    .filter_map(|c| match from.iter().position(|f| *f == c) {
                        Some(i) => to.get(i).copied(),
                        None => Some(c),
                    })
                    .collect(),
            )
        }

        // boolean functions
        "boolean" => {
            arity(name, &args, 1, 1)?;
            XPathValue::Boolean(args[0].to_bool())
        }
        "not" => {
            arity(name, &args, 1, 1)?;
            XPathValue::Boolean(!args[0].to_bool())
        }
        "true" => {
            arity(name, &args, 0, 0)?;
            XPathValue::Boolean(true)
        }
        "false" => {
            arity(name, &args, 0, 0)?;
            XPathValue::Boolean(false)
        }

        // number functions
        "number" => {
            arity(name, &args, 0, 1)?;
            match args.first() {
                Some(arg) => XPathValue::Number(arg.to_number(doc)),
                None => XPathValue::Number(string_to_number(&doc.text_content(e_ctx.node))),
            }
        }
        "sum" => {
            arity(name, &args, 1, 1)?;
            match &args[0] {
                XPathValue::NodeSet(nodes) => XPathValue::Number(
                    nodes
                        .iter()
                        .map(|n| string_to_number(&doc.text_content(*n)))
                        .sum(),
                ),
                _ => return Err(query_error("sum() expects a node-set")),
            }
        }
        "floor" => {
            arity(name, &args, 1, 1)?;
            XPathValue::Number(number_arg(0).floor())
        }
        "ceiling" => {
            arity(name, &args, 1, 1)?;
            XPathValue::Number(number_arg(0).ceil())
        }
        "round" => {
            arity(name, &args, 1, 1)?;
            XPathValue::Number(round(number_arg(0)))
        }
        _ => return Err(query_error(format!("unknown function: {}()", name))),
    };
    Ok(value)
}

// halves round towards positive infinity
fn round(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() || n == 0.0 {
        n
    } else {
        (n + 0.5).floor()
    }
}
