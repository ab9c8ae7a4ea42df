use core::fmt;

use crate::model::XdmNode;

/// Type tags the host evaluator uses for argument hints and return types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultType {
    Number,
    String,
    Boolean,
    NodeSet,
    Navigator,
    /// Result is not type-checked statically.
    Any,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XdmAtomicValue {
    Boolean(bool),
    String(String),
    Integer(i64),
    Double(f64),
    UntypedAtomic(String),
}

impl XdmAtomicValue {
    /// Text form following the XPath `string()` conversion rules.
    pub fn to_text(&self) -> String {
        match self {
            XdmAtomicValue::Boolean(b) => b.to_string(),
            XdmAtomicValue::String(s) | XdmAtomicValue::UntypedAtomic(s) => s.clone(),
            XdmAtomicValue::Integer(i) => i.to_string(),
            XdmAtomicValue::Double(d) => double_to_text(*d),
        }
    }

    pub fn result_type(&self) -> ResultType {
        match self {
            XdmAtomicValue::Boolean(_) => ResultType::Boolean,
            XdmAtomicValue::Integer(_) | XdmAtomicValue::Double(_) => ResultType::Number,
            XdmAtomicValue::String(_) | XdmAtomicValue::UntypedAtomic(_) => ResultType::String,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn double_to_text(d: f64) -> String {
    if d.is_nan() {
        return "NaN".to_string();
    }
    if d.is_infinite() {
        let s = if d > 0.0 { "Infinity" } else { "-Infinity" };
        return s.to_string();
    }
    if d == 0.0 {
        // -0 prints as 0
        return "0".to_string();
    }
    if d.fract() == 0.0 && d.abs() < 1e15 {
        return (d as i64).to_string();
    }
    d.to_string()
}

impl fmt::Display for XdmAtomicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

pub type XdmSequence<N> = Vec<XdmItem<N>>;

#[derive(Debug, Clone, PartialEq)]
pub enum XdmItem<N> {
    Node(N),
    Atomic(XdmAtomicValue),
}

impl<N: XdmNode> XdmItem<N> {
    pub fn to_text(&self) -> String {
        match self {
            XdmItem::Node(n) => n.string_value(),
            XdmItem::Atomic(a) => a.to_text(),
        }
    }
}

impl<N> From<XdmAtomicValue> for XdmItem<N> {
    fn from(a: XdmAtomicValue) -> Self {
        XdmItem::Atomic(a)
    }
}

/// XPath `string()` of a sequence: the text of its first item, empty for `()`.
pub fn sequence_to_string<N: XdmNode>(seq: &XdmSequence<N>) -> String {
    seq.first().map(XdmItem::to_text).unwrap_or_default()
}

/// Forward-only, single-use sequence of nodes produced by the evaluator.
///
/// Not `Clone`: moving it into a function is the only way to read it, so the
/// same sequence cannot be drained twice. Nodes arrive in whatever order the
/// producing iterator yields them, normally document order.
pub struct NodeSequence<'a, N> {
    iter: Box<dyn Iterator<Item = N> + 'a>,
}

impl<'a, N> NodeSequence<'a, N> {
    pub fn new<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        I::IntoIter: 'a,
    {
        Self { iter: Box::new(nodes.into_iter()) }
    }

    pub fn empty() -> Self
    where
        N: 'a,
    {
        Self { iter: Box::new(core::iter::empty()) }
    }
}

impl<N> Iterator for NodeSequence<'_, N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<N> fmt::Debug for NodeSequence<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSequence").field("size_hint", &self.iter.size_hint()).finish_non_exhaustive()
    }
}

/// One evaluated argument of an extension function call.
#[derive(Debug)]
pub enum Argument<'a, N> {
    Scalar(XdmAtomicValue),
    Nodes(NodeSequence<'a, N>),
}

impl<'a, N> Argument<'a, N> {
    pub fn nodes<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        I::IntoIter: 'a,
    {
        Argument::Nodes(NodeSequence::new(nodes))
    }

    pub fn result_type(&self) -> ResultType {
        match self {
            Argument::Scalar(v) => v.result_type(),
            Argument::Nodes(_) => ResultType::NodeSet,
        }
    }
}

impl<N> From<XdmAtomicValue> for Argument<'_, N> {
    fn from(v: XdmAtomicValue) -> Self {
        Argument::Scalar(v)
    }
}

impl<N> From<&str> for Argument<'_, N> {
    fn from(s: &str) -> Self {
        Argument::Scalar(XdmAtomicValue::String(s.to_string()))
    }
}

impl<N> From<String> for Argument<'_, N> {
    fn from(s: String) -> Self {
        Argument::Scalar(XdmAtomicValue::String(s))
    }
}

impl<N> From<bool> for Argument<'_, N> {
    fn from(b: bool) -> Self {
        Argument::Scalar(XdmAtomicValue::Boolean(b))
    }
}

impl<N> From<i64> for Argument<'_, N> {
    fn from(i: i64) -> Self {
        Argument::Scalar(XdmAtomicValue::Integer(i))
    }
}

impl<N> From<f64> for Argument<'_, N> {
    fn from(d: f64) -> Self {
        Argument::Scalar(XdmAtomicValue::Double(d))
    }
}

impl<'a, N> From<NodeSequence<'a, N>> for Argument<'a, N> {
    fn from(seq: NodeSequence<'a, N>) -> Self {
        Argument::Nodes(seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_text_form() {
        assert_eq!(double_to_text(3.0), "3");
        assert_eq!(double_to_text(-0.0), "0");
        assert_eq!(double_to_text(0.5), "0.5");
        assert_eq!(double_to_text(f64::NAN), "NaN");
        assert_eq!(double_to_text(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn boolean_text_form() {
        assert_eq!(XdmAtomicValue::Boolean(true).to_text(), "true");
    }
}
