//! Extension function support for XPath-style evaluators.
//!
//! An evaluator that meets a function call it does not know natively asks a
//! [`FunctionResolver`] for it by name. [`ExtensionContext`] is the concrete
//! registry; [`ExtensionContext::string_format`] ships the variadic `format`
//! function, which flattens node-sequence arguments into positional values
//! before substituting them into a `{0}`-style template.
//!
//! ```
//! use xpath_extensions::simple_node::{attr, elem, text};
//! use xpath_extensions::{Argument, ExtensionContext, SimpleNode, XdmNode};
//!
//! let author = elem("author").attr(attr("gender", "male")).child(text("Mike")).build();
//! let ctx = ExtensionContext::<SimpleNode>::string_format();
//!
//! let out = ctx
//!     .invoke(
//!         None,
//!         "format",
//!         vec![
//!             Argument::from("{0} is {1}"),
//!             Argument::nodes(author.children()),
//!             Argument::nodes(author.attributes()),
//!         ],
//!         None,
//!     )
//!     .unwrap();
//! assert_eq!(xpath_extensions::xdm::sequence_to_string(&out), "Mike is male");
//! ```

pub mod context;
pub mod error;
pub mod functions;
pub mod model;
pub mod simple_node;
pub mod xdm;

pub use context::{
    CallCtx, ExtensionContext, ExtensionContextBuilder, FunctionDescriptor, FunctionImpl,
    FunctionResolver, VariableDescriptor,
};
pub use error::{Error, ErrorCode, FormatSyntaxReason};
pub use functions::template::{Template, substitute};
pub use model::{NodeKind, QName, XdmNode};
pub use simple_node::{SimpleNode, SimpleNodeBuilder};
pub use xdm::{Argument, NodeSequence, ResultType, XdmAtomicValue, XdmItem, XdmSequence};
