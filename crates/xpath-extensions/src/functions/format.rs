//! `format(template, arg1, arg2, ...)`.
//!
//! Node-sequence arguments are flattened: each node takes its own positional
//! slot, so `format('{0} and {1}', /a/b)` with two `b` elements formats both.
//! An empty node sequence takes no slot at all and every later argument moves
//! one index down. That shift is kept as observed behaviour; do not build on it.
//!
//! Scalars use their XPath `string()` form, so booleans print as `true` and
//! `false` rather than `True`/`False`. Format specifiers such as `{0:N2}` are
//! accepted but ignored: `format('{0:N2}', 1.5)` yields `1.5`.
use smallvec::SmallVec;

use super::template::substitute;
use crate::context::{CallCtx, FunctionDescriptor};
use crate::error::Error;
use crate::model::XdmNode;
use crate::xdm::{Argument, ResultType, XdmAtomicValue, XdmItem, XdmSequence};

pub const NAME: &str = "format";

pub fn descriptor<N: 'static + XdmNode>() -> FunctionDescriptor<N> {
    FunctionDescriptor::variadic(NAME, 1, format_fn::<N>).with_return_type(ResultType::Any)
}

pub fn format_fn<N: XdmNode>(
    _ctx: &CallCtx<'_, N>,
    args: Vec<Argument<'_, N>>,
) -> Result<XdmSequence<N>, Error> {
    let mut args = args.into_iter();
    // a missing template formats to the empty string
    let template = args.next().map(template_text).unwrap_or_default();
    let values = flatten_arguments(args);
    tracing::trace!(template = %template, values = values.len(), "format arguments flattened");

    let texts: SmallVec<[String; 8]> = values.iter().map(XdmItem::to_text).collect();
    let out = substitute(&template, texts.as_slice())?;
    Ok(vec![XdmItem::Atomic(XdmAtomicValue::String(out))])
}

/// Expand node-sequence arguments into one item per node, keeping argument
/// order. Scalars pass through unchanged; empty sequences contribute nothing.
pub fn flatten_arguments<'a, N, I>(args: I) -> XdmSequence<N>
where
    I: IntoIterator<Item = Argument<'a, N>>,
{
    let mut out = Vec::new();
    for arg in args {
        match arg {
            Argument::Scalar(v) => out.push(XdmItem::Atomic(v)),
            Argument::Nodes(nodes) => out.extend(nodes.map(XdmItem::Node)),
        }
    }
    out
}

// XPath string() of the template argument: first node of a sequence, "" when empty.
fn template_text<N: XdmNode>(arg: Argument<'_, N>) -> String {
    match arg {
        Argument::Scalar(v) => v.to_text(),
        Argument::Nodes(mut nodes) => nodes.next().map(|n| n.string_value()).unwrap_or_default(),
    }
}
