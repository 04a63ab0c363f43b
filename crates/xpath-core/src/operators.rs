//! Evaluates binary operators against [`XPathValue`]s, implementing the XPath 1.0
//! type-coercion rules for comparisons (§3.4 of the XPath 1.0 recommendation):
//! node-sets compare existentially against their other operand, atomic operands
//! convert to a common type before comparing.

use super::ast::BinaryOperator;
use super::engine::XPathValue;
use crate::datasource::DataSourceNode;
use crate::error::XPathError;
use std::collections::HashSet;

pub fn evaluate<'a, N>(
    op: BinaryOperator,
    left: XPathValue<N>,
    right: XPathValue<N>,
) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    match op {
        BinaryOperator::Or => Ok(XPathValue::Boolean(left.to_bool() || right.to_bool())),
        BinaryOperator::And => Ok(XPathValue::Boolean(left.to_bool() && right.to_bool())),

        BinaryOperator::Equals => Ok(XPathValue::Boolean(compare(&left, &right, Cmp::Eq))),
        BinaryOperator::NotEquals => Ok(XPathValue::Boolean(compare(&left, &right, Cmp::Ne))),
        BinaryOperator::LessThan => Ok(XPathValue::Boolean(compare(&left, &right, Cmp::Lt))),
        BinaryOperator::LessThanOrEqual => {
            Ok(XPathValue::Boolean(compare(&left, &right, Cmp::Le)))
        }
        BinaryOperator::GreaterThan => Ok(XPathValue::Boolean(compare(&left, &right, Cmp::Gt))),
        BinaryOperator::GreaterThanOrEqual => {
            Ok(XPathValue::Boolean(compare(&left, &right, Cmp::Ge)))
        }

        BinaryOperator::Plus => Ok(XPathValue::Number(left.to_number() + right.to_number())),
        BinaryOperator::Minus => Ok(XPathValue::Number(left.to_number() - right.to_number())),
        BinaryOperator::Multiply => Ok(XPathValue::Number(left.to_number() * right.to_number())),
        BinaryOperator::Divide => Ok(XPathValue::Number(left.to_number() / right.to_number())),
        BinaryOperator::Modulo => Ok(XPathValue::Number(left.to_number() % right.to_number())),

        BinaryOperator::Union => evaluate_union(left, right),

        // idiv/intersect/except are XPath 2.0 productions layered on by petty-xpath31;
        // the 1.0 grammar never constructs them.
        BinaryOperator::IDiv | BinaryOperator::Intersect | BinaryOperator::Except => {
            Err(XPathError::TypeError(format!(
                "{op:?} is not a valid XPath 1.0 operator"
            )))
        }
    }
}

#[derive(Clone, Copy)]
enum Cmp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Cmp {
    fn reversed(self) -> Cmp {
        match self {
            Cmp::Eq => Cmp::Eq,
            Cmp::Ne => Cmp::Ne,
            Cmp::Lt => Cmp::Gt,
            Cmp::Le => Cmp::Ge,
            Cmp::Gt => Cmp::Lt,
            Cmp::Ge => Cmp::Le,
        }
    }
}

fn apply_cmp(ord: std::cmp::Ordering, cmp: Cmp) -> bool {
    use std::cmp::Ordering::*;
    match cmp {
        Cmp::Eq => ord == Equal,
        Cmp::Ne => ord != Equal,
        Cmp::Lt => ord == Less,
        Cmp::Le => ord != Greater,
        Cmp::Gt => ord == Greater,
        Cmp::Ge => ord != Less,
    }
}

fn apply_cmp_f64(a: f64, b: f64, cmp: Cmp) -> bool {
    match cmp {
        Cmp::Eq => a == b,
        Cmp::Ne => a != b,
        Cmp::Lt => a < b,
        Cmp::Le => a <= b,
        Cmp::Gt => a > b,
        Cmp::Ge => a >= b,
    }
}

fn compare<'a, N>(left: &XPathValue<N>, right: &XPathValue<N>, cmp: Cmp) -> bool
where
    N: DataSourceNode<'a> + 'a,
{
    match (left, right) {
        (XPathValue::NodeSet(l), XPathValue::NodeSet(r)) => l.iter().any(|ln| {
            r.iter()
                .any(|rn| compare_strings(&ln.string_value(), &rn.string_value(), cmp))
        }),
        (XPathValue::NodeSet(nodes), other) => compare_node_vs_other(nodes, other, cmp),
        (other, XPathValue::NodeSet(nodes)) => compare_node_vs_other(nodes, other, cmp.reversed()),
        (a, b) => compare_atomic(a, b, cmp),
    }
}

/// Existential comparison of a node-set's string-values against a single non-node-set
/// operand. A boolean operand short-circuits to `boolean(node-set) <cmp> b`.
fn compare_node_vs_other<'a, N>(nodes: &[N], other: &XPathValue<N>, cmp: Cmp) -> bool
where
    N: DataSourceNode<'a> + 'a,
{
    match other {
        XPathValue::Boolean(b) => apply_cmp((!nodes.is_empty()).cmp(b), cmp),
        XPathValue::Number(n) => nodes.iter().any(|node| {
            node.string_value()
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(|v| v.partial_cmp(n))
                .map(|ord| apply_cmp(ord, cmp))
                .unwrap_or(false)
        }),
        XPathValue::String(s) => nodes
            .iter()
            .any(|node| compare_strings(&node.string_value(), s, cmp)),
        XPathValue::NodeSet(_) => unreachable!("node-set/node-set handled by caller"),
    }
}

fn compare_strings(a: &str, b: &str, cmp: Cmp) -> bool {
    match cmp {
        Cmp::Eq | Cmp::Ne => apply_cmp(a.cmp(b), cmp),
        _ => a
            .trim()
            .parse::<f64>()
            .ok()
            .zip(b.trim().parse::<f64>().ok())
            .and_then(|(x, y)| x.partial_cmp(&y))
            .map(|ord| apply_cmp(ord, cmp))
            .unwrap_or(false),
    }
}

/// Two non-node-set operands: `=`/`!=` follow the boolean > number > string type
/// priority table; relational operators always compare numerically.
fn compare_atomic<'a, N>(left: &XPathValue<N>, right: &XPathValue<N>, cmp: Cmp) -> bool
where
    N: DataSourceNode<'a> + 'a,
{
    if !matches!(cmp, Cmp::Eq | Cmp::Ne) {
        return apply_cmp_f64(left.to_number(), right.to_number(), cmp);
    }
    if matches!(left, XPathValue::Boolean(_)) || matches!(right, XPathValue::Boolean(_)) {
        apply_cmp(left.to_bool().cmp(&right.to_bool()), cmp)
    } else if matches!(left, XPathValue::Number(_)) || matches!(right, XPathValue::Number(_)) {
        apply_cmp_f64(left.to_number(), right.to_number(), cmp)
    } else {
        apply_cmp(left.to_string().cmp(&right.to_string()), cmp)
    }
}

fn evaluate_union<'a, N>(
    left: XPathValue<N>,
    right: XPathValue<N>,
) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let (XPathValue::NodeSet(l), XPathValue::NodeSet(r)) = (&left, &right) else {
        return Err(XPathError::TypeError(
            "union operands must be node-sets".to_string(),
        ));
    };

    let mut seen = HashSet::new();
    let mut nodes = Vec::new();
    for n in l.iter().chain(r.iter()) {
        if seen.insert(*n) {
            nodes.push(*n);
        }
    }
    nodes.sort();
    Ok(XPathValue::NodeSet(nodes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::tests::{MockNode, create_test_tree};

    #[test]
    fn test_or_and() {
        let t: XPathValue<MockNode> = XPathValue::Boolean(true);
        let f: XPathValue<MockNode> = XPathValue::Boolean(false);
        assert!(
            evaluate(BinaryOperator::Or, t.clone(), f.clone())
                .unwrap()
                .to_bool()
        );
        assert!(
            !evaluate(BinaryOperator::And, t, f)
                .unwrap()
                .to_bool()
        );
    }

    #[test]
    fn test_numeric_comparison() {
        let five: XPathValue<MockNode> = XPathValue::Number(5.0);
        let ten: XPathValue<MockNode> = XPathValue::Number(10.0);
        assert!(
            evaluate(BinaryOperator::LessThan, five.clone(), ten.clone())
                .unwrap()
                .to_bool()
        );
        assert!(
            !evaluate(BinaryOperator::GreaterThan, five, ten)
                .unwrap()
                .to_bool()
        );
    }

    #[test]
    fn test_string_vs_number_equality() {
        let s: XPathValue<MockNode> = XPathValue::String("5".to_string());
        let n: XPathValue<MockNode> = XPathValue::Number(5.0);
        assert!(evaluate(BinaryOperator::Equals, s, n).unwrap().to_bool());
    }

    #[test]
    fn test_nodeset_equals_string_is_existential() {
        let tree = create_test_tree();
        let para = MockNode { id: 1, tree: &tree };
        let other = MockNode { id: 6, tree: &tree };
        let nodes = XPathValue::NodeSet(vec![para, other]);
        let target = XPathValue::String("World".to_string());
        assert!(
            evaluate(BinaryOperator::Equals, nodes, target)
                .unwrap()
                .to_bool()
        );
    }

    #[test]
    fn test_union_dedups_and_sorts() {
        let tree = create_test_tree();
        let a = MockNode { id: 6, tree: &tree };
        let b = MockNode { id: 1, tree: &tree };
        let left = XPathValue::NodeSet(vec![a, b]);
        let right = XPathValue::NodeSet(vec![b]);
        let result = evaluate(BinaryOperator::Union, left, right).unwrap();
        match result {
            XPathValue::NodeSet(nodes) => assert_eq!(nodes, vec![b, a]),
            _ => panic!("expected node-set"),
        }
    }

    #[test]
    fn test_idiv_rejected() {
        let a: XPathValue<MockNode> = XPathValue::Number(3.0);
        let b: XPathValue<MockNode> = XPathValue::Number(2.0);
        assert!(evaluate(BinaryOperator::IDiv, a, b).is_err());
    }
}
