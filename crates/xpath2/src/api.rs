//! Public entry points (spec.md §4.6): parse an XML document, bind
//! variables, and evaluate XPath queries against it. [`Expression`] values
//! produced by [`parse_expression`] are reusable — compile once, rerun many
//! times against different variable bindings without re-parsing.
//!
//! Building the tree and querying it are two separate steps, same as the
//! teacher's own `XmlDocument::parse` + `doc.root_node()` pairing in
//! `xslt::processor`: a [`Document`] borrows an already-parsed
//! [`XmlDocument`] rather than owning one, so the tree can outlive — and be
//! queried many times by — a context whose variable bindings change between
//! runs.

use std::collections::HashMap;

use crate::ast::Expression;
use crate::engine::{self, EvaluationContext};
use crate::error::XPath31Error;
use crate::parser::parse_expression;
use crate::types::{XdmItem, XdmValue};
use crate::xml::{XmlDocument, XmlNode};

/// A query context: a borrowed XML tree plus the variable bindings queries
/// against it run with.
///
/// `new` wraps an already-parsed [`XmlDocument`], `set_variable`/
/// `unset_variable` manage the binding set a query sees as `$name`, and
/// `evaluate`/`run` drive a (re)compiled query against the document root.
pub struct Document<'doc> {
    xml: &'doc XmlDocument<'doc>,
    variables: HashMap<String, XdmValue<XmlNode<'doc, 'doc>>>,
}

impl<'doc> Document<'doc> {
    pub fn new(xml: &'doc XmlDocument<'doc>) -> Self {
        Self {
            xml,
            variables: HashMap::new(),
        }
    }

    pub fn set_variable(
        &mut self,
        name: impl Into<String>,
        value: XdmValue<XmlNode<'doc, 'doc>>,
    ) {
        self.variables.insert(name.into(), value);
    }

    pub fn unset_variable(&mut self, name: &str) {
        self.variables.remove(name);
    }

    /// Parses and evaluates `query` in one step. For a query run more than
    /// once, prefer [`Document::compile`] + [`Document::run`] to pay the
    /// parse cost only once.
    pub fn evaluate(&self, query: &str) -> Result<XdmValue<XmlNode<'doc, 'doc>>, XPath31Error> {
        let expr = parse_expression(query)?;
        self.run(&expr)
    }

    /// Parses `query` into a reusable [`Expression`] without evaluating it.
    pub fn compile(query: &str) -> Result<Expression, XPath31Error> {
        parse_expression(query)
    }

    /// Evaluates an already-compiled expression against this document's
    /// current variable bindings, with the document root as initial focus.
    pub fn run(&self, expr: &Expression) -> Result<XdmValue<XmlNode<'doc, 'doc>>, XPath31Error> {
        let root: XmlNode<'doc, 'doc> = self.xml.root_node();
        let ctx: EvaluationContext<'doc, '_, XmlNode<'doc, 'doc>> =
            EvaluationContext::new(Some(XdmItem::Node(root)), Some(root), &self.variables);
        engine::evaluate(expr, &ctx, &HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AtomicValue;

    const DOC: &str = r#"<root empty="" one="1" foo="no">
  <sub foo="baz" someattr="somevalue">123</sub>
  <sub foo="bar" attr="baz">sub2</sub>
  <sub foo="bar" self="sub3">contents sub3<subsub foo="bar">subsub</subsub></sub>
  <other foo="barbaz"><subsub foo="oof">contents subsub other</subsub></other>
  <other foo="other2"><subsub foo="oof">contents subsub other2</subsub></other>
  <a><sub p="a1/1"/><sub p="a1/2"/></a>
  <a><sub p="a2/1"/><sub p="a2/2"/></a>
</root>"#;

    #[test]
    fn for_expr_doubles_range() {
        let xml = XmlDocument::parse(DOC).unwrap();
        let doc = Document::new(&xml);
        let result = doc.evaluate("for $i in 1 to 3 return $i * 2").unwrap();
        let nums: Vec<i64> = result
            .items()
            .iter()
            .map(|i| match i {
                XdmItem::Atomic(AtomicValue::Integer(n)) => *n,
                other => panic!("expected integer, got {other:?}"),
            })
            .collect();
        assert_eq!(nums, vec![2, 4, 6]);
    }

    #[test]
    fn position_numbers_each_sub_child() {
        let xml = XmlDocument::parse(DOC).unwrap();
        let doc = Document::new(&xml);
        let result = doc.evaluate("/root/sub/position()").unwrap();
        let nums: Vec<i64> = result
            .items()
            .iter()
            .map(|i| match i {
                XdmItem::Atomic(AtomicValue::Integer(n)) => *n,
                other => panic!("expected integer, got {other:?}"),
            })
            .collect();
        assert_eq!(nums, vec![1, 2, 3]);
    }

    #[test]
    fn document_order_operators_hold() {
        let xml = XmlDocument::parse(DOC).unwrap();
        let doc = Document::new(&xml);
        let precedes = doc.evaluate("/root/sub[1] << /root/sub[3]").unwrap();
        assert_eq!(precedes.try_effective_boolean_value().unwrap(), true);

        let is_same = doc
            .evaluate("/root/sub[1] is /root/sub[2]/preceding-sibling::sub[1]")
            .unwrap();
        assert_eq!(is_same.try_effective_boolean_value().unwrap(), true);
    }

    #[test]
    fn string_of_last_subs_self_attribute() {
        let xml = XmlDocument::parse(DOC).unwrap();
        let doc = Document::new(&xml);
        let result = doc.evaluate("string(/root/sub[last()]/@self)").unwrap();
        assert_eq!(result.to_string_value(), "sub3");
    }

    #[test]
    fn unbound_variable_is_empty_sequence() {
        let xml = XmlDocument::parse(DOC).unwrap();
        let doc = Document::new(&xml);
        let result = doc.evaluate("$nope").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn bound_variable_is_visible_to_queries() {
        let xml = XmlDocument::parse(DOC).unwrap();
        let mut doc = Document::new(&xml);
        doc.set_variable("n", XdmValue::from_integer(41));
        let result = doc.evaluate("$n + 1").unwrap();
        assert_eq!(result.to_double(), 42.0);

        doc.unset_variable("n");
        assert!(doc.evaluate("$n").unwrap().is_empty());
    }

    #[test]
    fn compiled_expression_reruns_against_new_bindings() {
        let xml = XmlDocument::parse(DOC).unwrap();
        let mut doc = Document::new(&xml);
        let expr = Document::compile("$x * 2").unwrap();

        doc.set_variable("x", XdmValue::from_integer(10));
        assert_eq!(doc.run(&expr).unwrap().to_double(), 20.0);

        doc.set_variable("x", XdmValue::from_integer(21));
        assert_eq!(doc.run(&expr).unwrap().to_double(), 42.0);
    }

    const DOC_WITH_COMMENT: &str = r#"<root><!-- a note --><sub foo="bar">text</sub></root>"#;

    #[test]
    fn abbreviated_parent_step_navigates_up_and_back_down() {
        let xml = XmlDocument::parse(DOC).unwrap();
        let doc = Document::new(&xml);
        let is_same = doc
            .evaluate("/root/sub[1]/../sub[2] is /root/sub[2]")
            .unwrap();
        assert!(is_same.try_effective_boolean_value().unwrap());
    }

    #[test]
    fn kind_test_discriminates_by_node_type() {
        let xml = XmlDocument::parse(DOC_WITH_COMMENT).unwrap();
        let doc = Document::new(&xml);

        assert!(
            doc.evaluate("/root/sub instance of element()")
                .unwrap()
                .try_effective_boolean_value()
                .unwrap()
        );
        assert!(
            !doc.evaluate("/root/sub instance of text()")
                .unwrap()
                .try_effective_boolean_value()
                .unwrap()
        );
        assert!(
            !doc.evaluate("/root/sub instance of attribute()")
                .unwrap()
                .try_effective_boolean_value()
                .unwrap()
        );

        assert!(
            doc.evaluate("/root/sub/@foo instance of attribute()")
                .unwrap()
                .try_effective_boolean_value()
                .unwrap()
        );
        assert!(
            !doc.evaluate("/root/sub/@foo instance of element()")
                .unwrap()
                .try_effective_boolean_value()
                .unwrap()
        );

        assert!(
            doc.evaluate("/root/sub/text() instance of text()")
                .unwrap()
                .try_effective_boolean_value()
                .unwrap()
        );
        assert!(
            !doc.evaluate("/root/sub/text() instance of element()")
                .unwrap()
                .try_effective_boolean_value()
                .unwrap()
        );

        assert!(
            doc.evaluate("/root/comment() instance of comment()")
                .unwrap()
                .try_effective_boolean_value()
                .unwrap()
        );
        assert!(
            !doc.evaluate("/root/comment() instance of element()")
                .unwrap()
                .try_effective_boolean_value()
                .unwrap()
        );
    }
}
