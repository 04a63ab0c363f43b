use crate::ast::BinaryOperator;
use crate::error::XPath31Error;
use crate::types::{AtomicValue, XdmItem, XdmValue};

pub fn evaluate_binary<N: Clone + Eq + std::hash::Hash + Ord>(
    op: BinaryOperator,
    left: XdmValue<N>,
    right: XdmValue<N>,
) -> Result<XdmValue<N>, XPath31Error> {
    match op {
        BinaryOperator::Or => evaluate_or(left, right),
        BinaryOperator::And => evaluate_and(left, right),
        BinaryOperator::Equals => {
            evaluate_comparison(left, right, |ord| ord == std::cmp::Ordering::Equal)
        }
        BinaryOperator::NotEquals => {
            evaluate_comparison(left, right, |ord| ord != std::cmp::Ordering::Equal)
        }
        BinaryOperator::LessThan => {
            evaluate_comparison(left, right, |ord| ord == std::cmp::Ordering::Less)
        }
        BinaryOperator::LessThanOrEqual => {
            evaluate_comparison(left, right, |ord| ord != std::cmp::Ordering::Greater)
        }
        BinaryOperator::GreaterThan => {
            evaluate_comparison(left, right, |ord| ord == std::cmp::Ordering::Greater)
        }
        BinaryOperator::GreaterThanOrEqual => {
            evaluate_comparison(left, right, |ord| ord != std::cmp::Ordering::Less)
        }
        BinaryOperator::ValueEq => {
            evaluate_value_comparison(left, right, |ord| ord == std::cmp::Ordering::Equal)
        }
        BinaryOperator::ValueNe => {
            evaluate_value_comparison(left, right, |ord| ord != std::cmp::Ordering::Equal)
        }
        BinaryOperator::ValueLt => {
            evaluate_value_comparison(left, right, |ord| ord == std::cmp::Ordering::Less)
        }
        BinaryOperator::ValueLe => {
            evaluate_value_comparison(left, right, |ord| ord != std::cmp::Ordering::Greater)
        }
        BinaryOperator::ValueGt => {
            evaluate_value_comparison(left, right, |ord| ord == std::cmp::Ordering::Greater)
        }
        BinaryOperator::ValueGe => {
            evaluate_value_comparison(left, right, |ord| ord != std::cmp::Ordering::Less)
        }
        BinaryOperator::Is | BinaryOperator::Precedes | BinaryOperator::Follows => Err(
            XPath31Error::type_error("node comparison requires a document context"),
        ),
        BinaryOperator::Plus => {
            evaluate_arithmetic(left, right, |a, b| a + b, |a: i64, b: i64| a.checked_add(b))
        }
        BinaryOperator::Minus => {
            evaluate_arithmetic(left, right, |a, b| a - b, |a: i64, b: i64| a.checked_sub(b))
        }
        BinaryOperator::Multiply => {
            evaluate_arithmetic(left, right, |a, b| a * b, |a: i64, b: i64| a.checked_mul(b))
        }
        BinaryOperator::Divide => evaluate_divide(left, right),
        BinaryOperator::IDiv => evaluate_idiv(left, right),
        BinaryOperator::Modulo => evaluate_modulo(left, right),
        BinaryOperator::Union => evaluate_union(left, right),
        BinaryOperator::Intersect => evaluate_intersect(left, right),
        BinaryOperator::Except => evaluate_except(left, right),
    }
}

pub fn evaluate_binary_with_nodes<'a, N>(
    op: BinaryOperator,
    left: XdmValue<N>,
    right: XdmValue<N>,
) -> Result<XdmValue<N>, XPath31Error>
where
    N: Clone + Eq + std::hash::Hash + Ord + xpath_core::DataSourceNode<'a> + 'a,
{
    match op {
        BinaryOperator::Or => evaluate_or(left, right),
        BinaryOperator::And => evaluate_and(left, right),
        BinaryOperator::Equals => {
            evaluate_comparison_with_nodes(left, right, |ord| ord == std::cmp::Ordering::Equal)
        }
        BinaryOperator::NotEquals => {
            evaluate_comparison_with_nodes(left, right, |ord| ord != std::cmp::Ordering::Equal)
        }
        BinaryOperator::LessThan => {
            evaluate_comparison_with_nodes(left, right, |ord| ord == std::cmp::Ordering::Less)
        }
        BinaryOperator::LessThanOrEqual => {
            evaluate_comparison_with_nodes(left, right, |ord| ord != std::cmp::Ordering::Greater)
        }
        BinaryOperator::GreaterThan => {
            evaluate_comparison_with_nodes(left, right, |ord| ord == std::cmp::Ordering::Greater)
        }
        BinaryOperator::GreaterThanOrEqual => {
            evaluate_comparison_with_nodes(left, right, |ord| ord != std::cmp::Ordering::Less)
        }
        BinaryOperator::ValueEq => evaluate_value_comparison_with_nodes(left, right, |ord| {
            ord == std::cmp::Ordering::Equal
        }),
        BinaryOperator::ValueNe => evaluate_value_comparison_with_nodes(left, right, |ord| {
            ord != std::cmp::Ordering::Equal
        }),
        BinaryOperator::ValueLt => evaluate_value_comparison_with_nodes(left, right, |ord| {
            ord == std::cmp::Ordering::Less
        }),
        BinaryOperator::ValueLe => evaluate_value_comparison_with_nodes(left, right, |ord| {
            ord != std::cmp::Ordering::Greater
        }),
        BinaryOperator::ValueGt => evaluate_value_comparison_with_nodes(left, right, |ord| {
            ord == std::cmp::Ordering::Greater
        }),
        BinaryOperator::ValueGe => evaluate_value_comparison_with_nodes(left, right, |ord| {
            ord != std::cmp::Ordering::Less
        }),
        BinaryOperator::Is => {
            evaluate_node_comparison(left, right, |ord| ord == std::cmp::Ordering::Equal)
        }
        BinaryOperator::Precedes => {
            evaluate_node_comparison(left, right, |ord| ord == std::cmp::Ordering::Less)
        }
        BinaryOperator::Follows => {
            evaluate_node_comparison(left, right, |ord| ord == std::cmp::Ordering::Greater)
        }
        BinaryOperator::Plus => {
            evaluate_arithmetic(left, right, |a, b| a + b, |a: i64, b: i64| a.checked_add(b))
        }
        BinaryOperator::Minus => {
            evaluate_arithmetic(left, right, |a, b| a - b, |a: i64, b: i64| a.checked_sub(b))
        }
        BinaryOperator::Multiply => {
            evaluate_arithmetic(left, right, |a, b| a * b, |a: i64, b: i64| a.checked_mul(b))
        }
        BinaryOperator::Divide => evaluate_divide(left, right),
        BinaryOperator::IDiv => evaluate_idiv(left, right),
        BinaryOperator::Modulo => evaluate_modulo(left, right),
        BinaryOperator::Union => evaluate_union(left, right),
        BinaryOperator::Intersect => evaluate_intersect(left, right),
        BinaryOperator::Except => evaluate_except(left, right),
    }
}

fn evaluate_or<N: Clone>(
    left: XdmValue<N>,
    right: XdmValue<N>,
) -> Result<XdmValue<N>, XPath31Error> {
    let result = left.try_effective_boolean_value()? || right.try_effective_boolean_value()?;
    Ok(XdmValue::from_bool(result))
}

fn evaluate_and<N: Clone>(
    left: XdmValue<N>,
    right: XdmValue<N>,
) -> Result<XdmValue<N>, XPath31Error> {
    let result = left.try_effective_boolean_value()? && right.try_effective_boolean_value()?;
    Ok(XdmValue::from_bool(result))
}

fn evaluate_comparison<N: Clone, F>(
    left: XdmValue<N>,
    right: XdmValue<N>,
    predicate: F,
) -> Result<XdmValue<N>, XPath31Error>
where
    F: Fn(std::cmp::Ordering) -> bool,
{
    let left_items = left.items();
    let right_items = right.items();

    for l_item in left_items {
        for r_item in right_items {
            if let Some(ord) = compare_items(l_item, r_item)?
                && predicate(ord)
            {
                return Ok(XdmValue::from_bool(true));
            }
        }
    }

    Ok(XdmValue::from_bool(false))
}

fn evaluate_comparison_with_nodes<'a, N, F>(
    left: XdmValue<N>,
    right: XdmValue<N>,
    predicate: F,
) -> Result<XdmValue<N>, XPath31Error>
where
    N: Clone + xpath_core::DataSourceNode<'a> + 'a,
    F: Fn(std::cmp::Ordering) -> bool,
{
    let left_items = left.items();
    let right_items = right.items();

    for l_item in left_items {
        for r_item in right_items {
            if let Some(ord) = compare_items_with_nodes(l_item, r_item)?
                && predicate(ord)
            {
                return Ok(XdmValue::from_bool(true));
            }
        }
    }

    Ok(XdmValue::from_bool(false))
}

fn compare_items<N>(
    left: &XdmItem<N>,
    right: &XdmItem<N>,
) -> Result<Option<std::cmp::Ordering>, XPath31Error> {
    match (left, right) {
        (XdmItem::Atomic(a), XdmItem::Atomic(b)) => compare_atomics(a, b),
        _ => Ok(None),
    }
}

fn compare_items_with_nodes<'a, N>(
    left: &XdmItem<N>,
    right: &XdmItem<N>,
) -> Result<Option<std::cmp::Ordering>, XPath31Error>
where
    N: xpath_core::DataSourceNode<'a> + 'a,
{
    let left_atomic = atomize_item(left);
    let right_atomic = atomize_item(right);

    match (left_atomic, right_atomic) {
        (Some(a), Some(b)) => compare_atomics(&a, &b),
        _ => Ok(None),
    }
}

fn atomize_item<'a, N>(item: &XdmItem<N>) -> Option<AtomicValue>
where
    N: xpath_core::DataSourceNode<'a> + 'a,
{
    match item {
        XdmItem::Atomic(a) => Some(a.clone()),
        XdmItem::Node(node) => Some(AtomicValue::UntypedAtomic(node.string_value())),
        XdmItem::Array(_) | XdmItem::Map(_) | XdmItem::Function(_) => None,
    }
}

/// Compares two atomic values per the general-comparison coercion rules. A mixed
/// integer/double pair truncates the double toward zero and compares as integers
/// (so `1 = 1.5` is false but `1 = 1.9` also compares 1 against 1, not 1.0 against 1.9,
/// matching the engine's "truncate, don't promote" rule for integer/double pairs).
/// Arithmetic (`evaluate_arithmetic`) keeps an integer pair as integers instead
/// of truncating a double into one; the two rules only coincide when both
/// sides already share a type.
fn compare_atomics(
    left: &AtomicValue,
    right: &AtomicValue,
) -> Result<Option<std::cmp::Ordering>, XPath31Error> {
    match (left, right) {
        (AtomicValue::String(a), AtomicValue::String(b)) => Ok(Some(a.cmp(b))),
        (AtomicValue::Integer(a), AtomicValue::Integer(b)) => Ok(Some(a.cmp(b))),
        (AtomicValue::Double(a), AtomicValue::Double(b)) => Ok(a.partial_cmp(b)),
        (AtomicValue::Decimal(a), AtomicValue::Decimal(b)) => Ok(a.partial_cmp(b)),
        (AtomicValue::Boolean(a), AtomicValue::Boolean(b)) => Ok(Some(a.cmp(b))),

        (AtomicValue::Integer(a), AtomicValue::Double(b)) => Ok(truncated_cmp(*a, *b)),
        (AtomicValue::Double(a), AtomicValue::Integer(b)) => {
            Ok(truncated_cmp(*b, *a).map(std::cmp::Ordering::reverse))
        }

        (AtomicValue::UntypedAtomic(a), AtomicValue::String(b))
        | (AtomicValue::String(b), AtomicValue::UntypedAtomic(a)) => Ok(Some(a.cmp(b))),

        (AtomicValue::UntypedAtomic(a), AtomicValue::Integer(b)) => {
            Ok(a.parse::<i64>().ok().map(|ai| ai.cmp(b)))
        }
        (AtomicValue::Integer(a), AtomicValue::UntypedAtomic(b)) => {
            Ok(b.parse::<i64>().ok().map(|bi| a.cmp(&bi)))
        }

        (AtomicValue::UntypedAtomic(a), AtomicValue::Double(b)) => {
            Ok(a.parse::<f64>().ok().and_then(|ad| ad.partial_cmp(b)))
        }
        (AtomicValue::Double(a), AtomicValue::UntypedAtomic(b)) => {
            Ok(b.parse::<f64>().ok().and_then(|bd| a.partial_cmp(&bd)))
        }

        (AtomicValue::UntypedAtomic(a), AtomicValue::UntypedAtomic(b)) => Ok(Some(a.cmp(b))),

        _ => Err(XPath31Error::invalid_value(format!(
            "cannot compare {} to {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Truncates `b` toward zero and compares it against `a` as integers. Falls back to
/// a double comparison when `b` is not finite (NaN/Infinity have no integer
/// truncation).
fn truncated_cmp(a: i64, b: f64) -> Option<std::cmp::Ordering> {
    if b.is_finite() {
        Some(a.cmp(&(b.trunc() as i64)))
    } else {
        (a as f64).partial_cmp(&b)
    }
}

/// `eq`/`ne`/`lt`/`le`/`gt`/`ge`: each operand must be at most one item (err if
/// either side has more), empty either side yields the empty sequence rather
/// than a boolean.
fn evaluate_value_comparison<N: Clone, F>(
    left: XdmValue<N>,
    right: XdmValue<N>,
    predicate: F,
) -> Result<XdmValue<N>, XPath31Error>
where
    F: Fn(std::cmp::Ordering) -> bool,
{
    if left.is_empty() || right.is_empty() {
        return Ok(XdmValue::empty());
    }
    let l = single_atomic(&left)?;
    let r = single_atomic(&right)?;
    match compare_atomics(&l, &r)? {
        Some(ord) => Ok(XdmValue::from_bool(predicate(ord))),
        None => Ok(XdmValue::empty()),
    }
}

fn evaluate_value_comparison_with_nodes<'a, N, F>(
    left: XdmValue<N>,
    right: XdmValue<N>,
    predicate: F,
) -> Result<XdmValue<N>, XPath31Error>
where
    N: Clone + xpath_core::DataSourceNode<'a> + 'a,
    F: Fn(std::cmp::Ordering) -> bool,
{
    if left.is_empty() || right.is_empty() {
        return Ok(XdmValue::empty());
    }
    let l = single_atomic_with_nodes(&left)?;
    let r = single_atomic_with_nodes(&right)?;
    match compare_atomics(&l, &r)? {
        Some(ord) => Ok(XdmValue::from_bool(predicate(ord))),
        None => Ok(XdmValue::empty()),
    }
}

fn single_atomic<N: Clone>(value: &XdmValue<N>) -> Result<AtomicValue, XPath31Error> {
    match value.single() {
        Some(XdmItem::Atomic(a)) => Ok(a.clone()),
        Some(_) => Err(XPath31Error::type_error(
            "value comparison requires an atomic operand",
        )),
        None => Err(XPath31Error::cardinality_error(
            "value comparison",
            "zero or one item",
            value.len(),
        )),
    }
}

fn single_atomic_with_nodes<'a, N>(value: &XdmValue<N>) -> Result<AtomicValue, XPath31Error>
where
    N: Clone + xpath_core::DataSourceNode<'a> + 'a,
{
    match value.single() {
        Some(item @ (XdmItem::Atomic(_) | XdmItem::Node(_))) => {
            atomize_item(item).ok_or_else(|| {
                XPath31Error::type_error("value comparison requires an atomic operand")
            })
        }
        Some(_) => Err(XPath31Error::type_error(
            "value comparison requires an atomic operand",
        )),
        None => Err(XPath31Error::cardinality_error(
            "value comparison",
            "zero or one item",
            value.len(),
        )),
    }
}

/// `is`/`<<`/`>>`: compare the identity/document-order of two single nodes via
/// their source-assigned `id()`. Cardinality errors on either side holding more
/// than one node; the empty sequence on either side yields the empty sequence.
fn evaluate_node_comparison<'a, N, F>(
    left: XdmValue<N>,
    right: XdmValue<N>,
    predicate: F,
) -> Result<XdmValue<N>, XPath31Error>
where
    N: Clone + xpath_core::DataSourceNode<'a> + 'a,
    F: Fn(std::cmp::Ordering) -> bool,
{
    if left.is_empty() || right.is_empty() {
        return Ok(XdmValue::empty());
    }
    let l = single_node(&left)?;
    let r = single_node(&right)?;
    Ok(XdmValue::from_bool(predicate(l.id().cmp(&r.id()))))
}

fn single_node<'a, N>(value: &XdmValue<N>) -> Result<N, XPath31Error>
where
    N: Clone + xpath_core::DataSourceNode<'a> + 'a,
{
    match value.single() {
        Some(XdmItem::Node(n)) => Ok(n.clone()),
        Some(_) => Err(XPath31Error::type_error(
            "node comparison requires a node operand",
        )),
        None => Err(XPath31Error::cardinality_error(
            "node comparison",
            "zero or one node",
            value.len(),
        )),
    }
}

/// Evaluates `+`/`-`/`*` per spec.md §4.2's promotion table (same table
/// the general comparison path uses): both operands integer stays integer;
/// anything else (a double on either side, or an integer pair that
/// overflows `i64`) promotes both sides to double.
fn evaluate_arithmetic<N: Clone, FD, FI>(
    left: XdmValue<N>,
    right: XdmValue<N>,
    double_op: FD,
    int_op: FI,
) -> Result<XdmValue<N>, XPath31Error>
where
    FD: Fn(f64, f64) -> f64,
    FI: Fn(i64, i64) -> Option<i64>,
{
    if let (Some(XdmItem::Atomic(AtomicValue::Integer(a))), Some(XdmItem::Atomic(AtomicValue::Integer(b)))) =
        (left.first(), right.first())
        && let Some(result) = int_op(*a, *b)
    {
        return Ok(XdmValue::from_integer(result));
    }

    let l = left.to_double();
    let r = right.to_double();
    Ok(XdmValue::from_double(double_op(l, r)))
}

fn evaluate_divide<N: Clone>(
    left: XdmValue<N>,
    right: XdmValue<N>,
) -> Result<XdmValue<N>, XPath31Error> {
    let l = left.to_double();
    let r = right.to_double();

    if r == 0.0 {
        if l == 0.0 {
            Ok(XdmValue::from_double(f64::NAN))
        } else if l > 0.0 {
            Ok(XdmValue::from_double(f64::INFINITY))
        } else {
            Ok(XdmValue::from_double(f64::NEG_INFINITY))
        }
    } else {
        Ok(XdmValue::from_double(l / r))
    }
}

/// `idiv`: integer division truncating toward zero. `3 idiv -2 = -1`,
/// `-3 idiv 2 = -1`.
fn evaluate_idiv<N: Clone>(
    left: XdmValue<N>,
    right: XdmValue<N>,
) -> Result<XdmValue<N>, XPath31Error> {
    let l = left.to_double();
    let r = right.to_double();

    if r == 0.0 {
        return Err(XPath31Error::DivisionByZero);
    }
    Ok(XdmValue::from_integer((l / r).trunc() as i64))
}

fn evaluate_modulo<N: Clone>(
    left: XdmValue<N>,
    right: XdmValue<N>,
) -> Result<XdmValue<N>, XPath31Error> {
    let l = left.to_double();
    let r = right.to_double();

    if r == 0.0 {
        Ok(XdmValue::from_double(f64::NAN))
    } else {
        Ok(XdmValue::from_double(l % r))
    }
}

fn evaluate_union<N: Clone + Eq + std::hash::Hash + Ord>(
    left: XdmValue<N>,
    right: XdmValue<N>,
) -> Result<XdmValue<N>, XPath31Error> {
    let mut seen = std::collections::HashSet::new();
    let mut nodes: Vec<N> = collect_nodes(&left)?
        .into_iter()
        .chain(collect_nodes(&right)?)
        .filter(|n| seen.insert(n.clone()))
        .collect();

    nodes.sort();
    Ok(XdmValue::from_nodes(nodes))
}

/// Collects the nodes from a sequence, erroring (per `err:XPTY0004`-style typing)
/// if it contains anything else; `union`/`intersect`/`except` operate only on
/// node-sets.
fn collect_nodes<N: Clone>(value: &XdmValue<N>) -> Result<Vec<N>, XPath31Error> {
    value
        .items()
        .iter()
        .map(|item| match item {
            XdmItem::Node(n) => Ok(n.clone()),
            other => Err(XPath31Error::type_error(format!(
                "operand of a node-set operator must be a node, found {}",
                other.type_name()
            ))),
        })
        .collect()
}

fn evaluate_intersect<N: Clone + Eq + std::hash::Hash + Ord>(
    left: XdmValue<N>,
    right: XdmValue<N>,
) -> Result<XdmValue<N>, XPath31Error> {
    let left_nodes = collect_nodes(&left)?;
    let right_set: std::collections::HashSet<N> = collect_nodes(&right)?.into_iter().collect();

    let mut seen = std::collections::HashSet::new();
    let mut nodes: Vec<N> = left_nodes
        .into_iter()
        .filter(|n| right_set.contains(n) && seen.insert(n.clone()))
        .collect();

    nodes.sort();
    Ok(XdmValue::from_nodes(nodes))
}

fn evaluate_except<N: Clone + Eq + std::hash::Hash + Ord>(
    left: XdmValue<N>,
    right: XdmValue<N>,
) -> Result<XdmValue<N>, XPath31Error> {
    let left_nodes = collect_nodes(&left)?;
    let right_set: std::collections::HashSet<N> = collect_nodes(&right)?.into_iter().collect();

    let mut seen = std::collections::HashSet::new();
    let mut nodes: Vec<N> = left_nodes
        .into_iter()
        .filter(|n| !right_set.contains(n) && seen.insert(n.clone()))
        .collect();

    nodes.sort();
    Ok(XdmValue::from_nodes(nodes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or() {
        let t: XdmValue<()> = XdmValue::from_bool(true);
        let f: XdmValue<()> = XdmValue::from_bool(false);

        assert!(
            evaluate_binary(BinaryOperator::Or, t.clone(), f.clone())
                .unwrap()
                .effective_boolean_value()
        );
        assert!(
            evaluate_binary(BinaryOperator::Or, f.clone(), t.clone())
                .unwrap()
                .effective_boolean_value()
        );
        assert!(
            !evaluate_binary(BinaryOperator::Or, f.clone(), f.clone())
                .unwrap()
                .effective_boolean_value()
        );
    }

    #[test]
    fn test_and() {
        let t: XdmValue<()> = XdmValue::from_bool(true);
        let f: XdmValue<()> = XdmValue::from_bool(false);

        assert!(
            evaluate_binary(BinaryOperator::And, t.clone(), t.clone())
                .unwrap()
                .effective_boolean_value()
        );
        assert!(
            !evaluate_binary(BinaryOperator::And, t.clone(), f.clone())
                .unwrap()
                .effective_boolean_value()
        );
    }

    #[test]
    fn test_comparison() {
        let five: XdmValue<()> = XdmValue::from_integer(5);
        let ten: XdmValue<()> = XdmValue::from_integer(10);

        assert!(
            evaluate_binary(BinaryOperator::LessThan, five.clone(), ten.clone())
                .unwrap()
                .effective_boolean_value()
        );
        assert!(
            !evaluate_binary(BinaryOperator::LessThan, ten.clone(), five.clone())
                .unwrap()
                .effective_boolean_value()
        );
        assert!(
            evaluate_binary(BinaryOperator::Equals, five.clone(), five.clone())
                .unwrap()
                .effective_boolean_value()
        );
    }

    #[test]
    fn test_arithmetic() {
        let a: XdmValue<()> = XdmValue::from_integer(10);
        let b: XdmValue<()> = XdmValue::from_integer(3);

        let result = evaluate_binary(BinaryOperator::Plus, a.clone(), b.clone()).unwrap();
        assert_eq!(result.to_double(), 13.0);

        let result = evaluate_binary(BinaryOperator::Minus, a.clone(), b.clone()).unwrap();
        assert_eq!(result.to_double(), 7.0);

        let result = evaluate_binary(BinaryOperator::Multiply, a.clone(), b.clone()).unwrap();
        assert_eq!(result.to_double(), 30.0);
    }

    #[test]
    fn test_arithmetic_keeps_integer_operands_as_integers() {
        let a: XdmValue<()> = XdmValue::from_integer(10);
        let b: XdmValue<()> = XdmValue::from_integer(3);

        for (op, expected) in [
            (BinaryOperator::Plus, 13),
            (BinaryOperator::Minus, 7),
            (BinaryOperator::Multiply, 30),
        ] {
            let result = evaluate_binary(op, a.clone(), b.clone()).unwrap();
            assert!(matches!(
                result.first(),
                Some(XdmItem::Atomic(AtomicValue::Integer(n))) if *n == expected
            ));
        }
    }

    #[test]
    fn test_arithmetic_mixed_integer_double_promotes_to_double() {
        let a: XdmValue<()> = XdmValue::from_integer(1);
        let b = XdmValue::from_atomic(AtomicValue::Double(0.5));

        let result = evaluate_binary(BinaryOperator::Plus, a, b).unwrap();
        assert!(matches!(
            result.first(),
            Some(XdmItem::Atomic(AtomicValue::Double(n))) if *n == 1.5
        ));
    }

    #[test]
    fn test_arithmetic_integer_overflow_falls_back_to_double() {
        let a: XdmValue<()> = XdmValue::from_integer(i64::MAX);
        let b: XdmValue<()> = XdmValue::from_integer(1);

        let result = evaluate_binary(BinaryOperator::Plus, a, b).unwrap();
        assert!(matches!(
            result.first(),
            Some(XdmItem::Atomic(AtomicValue::Double(n))) if *n == (i64::MAX as f64 + 1.0)
        ));
    }

    #[test]
    fn test_divide() {
        let a: XdmValue<()> = XdmValue::from_integer(10);
        let b: XdmValue<()> = XdmValue::from_integer(4);

        let result = evaluate_binary(BinaryOperator::Divide, a, b).unwrap();
        assert_eq!(result.to_double(), 2.5);
    }

    #[test]
    fn test_divide_by_zero() {
        let a: XdmValue<()> = XdmValue::from_integer(10);
        let zero: XdmValue<()> = XdmValue::from_integer(0);

        let result = evaluate_binary(BinaryOperator::Divide, a, zero).unwrap();
        assert!(result.to_double().is_infinite());
    }

    #[test]
    fn test_modulo() {
        let a: XdmValue<()> = XdmValue::from_integer(10);
        let b: XdmValue<()> = XdmValue::from_integer(3);

        let result = evaluate_binary(BinaryOperator::Modulo, a, b).unwrap();
        assert_eq!(result.to_double(), 1.0);
    }

    #[test]
    fn test_idiv() {
        let a: XdmValue<()> = XdmValue::from_integer(10);
        let b: XdmValue<()> = XdmValue::from_integer(3);
        let result = evaluate_binary(BinaryOperator::IDiv, a, b).unwrap();
        assert_eq!(result.to_double(), 3.0);

        let neg: XdmValue<()> = XdmValue::from_integer(-3);
        let two: XdmValue<()> = XdmValue::from_integer(2);
        let result = evaluate_binary(BinaryOperator::IDiv, neg, two).unwrap();
        assert_eq!(result.to_double(), -1.0);

        let three: XdmValue<()> = XdmValue::from_integer(3);
        let neg_two: XdmValue<()> = XdmValue::from_integer(-2);
        let result = evaluate_binary(BinaryOperator::IDiv, three, neg_two).unwrap();
        assert_eq!(result.to_double(), -1.0);
    }

    #[test]
    fn test_idiv_by_zero() {
        let a: XdmValue<()> = XdmValue::from_integer(10);
        let zero: XdmValue<()> = XdmValue::from_integer(0);
        assert!(evaluate_binary(BinaryOperator::IDiv, a, zero).is_err());
    }

    #[test]
    fn test_value_comparison() {
        let five: XdmValue<()> = XdmValue::from_integer(5);
        let ten: XdmValue<()> = XdmValue::from_integer(10);

        assert!(
            evaluate_binary(BinaryOperator::ValueLt, five.clone(), ten.clone())
                .unwrap()
                .effective_boolean_value()
        );
        assert!(
            evaluate_binary(BinaryOperator::ValueEq, five.clone(), five.clone())
                .unwrap()
                .effective_boolean_value()
        );
    }

    #[test]
    fn test_value_comparison_empty() {
        let empty: XdmValue<()> = XdmValue::empty();
        let five: XdmValue<()> = XdmValue::from_integer(5);
        let result = evaluate_binary(BinaryOperator::ValueEq, empty, five).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_value_comparison_cardinality_error() {
        let many: XdmValue<()> =
            XdmValue::from_items(vec![XdmItem::Atomic(AtomicValue::Integer(1)), XdmItem::Atomic(AtomicValue::Integer(2))]);
        let five: XdmValue<()> = XdmValue::from_integer(5);
        assert!(evaluate_binary(BinaryOperator::ValueEq, many, five).is_err());
    }
}
