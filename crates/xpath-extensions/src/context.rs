//! Function resolution context consulted by the host evaluator.
use core::cmp::Ordering;
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::Error;
use crate::model::XdmNode;
use crate::xdm::{Argument, ResultType, XdmSequence};

/// Context passed into extension function implementations.
pub struct CallCtx<'a, N> {
    pub context: &'a ExtensionContext<N>,
    /// Node the evaluator was positioned on when the call was made.
    pub current_node: Option<&'a N>,
}

pub type FunctionImpl<N> = Arc<
    dyn for<'c, 'a> Fn(&CallCtx<'c, N>, Vec<Argument<'a, N>>) -> Result<XdmSequence<N>, Error>
        + Send
        + Sync,
>;

/// One callable extension function. Immutable once registered.
pub struct FunctionDescriptor<N> {
    name: String,
    min_args: usize,
    // None = variadic
    max_args: Option<usize>,
    return_type: ResultType,
    arg_types: Option<Vec<ResultType>>,
    func: FunctionImpl<N>,
}

impl<N> Clone for FunctionDescriptor<N> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            min_args: self.min_args,
            max_args: self.max_args,
            return_type: self.return_type,
            arg_types: self.arg_types.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<N> fmt::Debug for FunctionDescriptor<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDescriptor")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .field("return_type", &self.return_type)
            .field("arg_types", &self.arg_types)
            .finish_non_exhaustive()
    }
}

impl<N> FunctionDescriptor<N> {
    /// Register a function with an arity range. `max_args = None` makes it variadic.
    pub fn new<F>(name: impl Into<String>, min_args: usize, max_args: Option<usize>, f: F) -> Self
    where
        F: 'static
            + Send
            + Sync
            + for<'c, 'a> Fn(&CallCtx<'c, N>, Vec<Argument<'a, N>>) -> Result<XdmSequence<N>, Error>,
    {
        Self {
            name: name.into(),
            min_args,
            max_args,
            return_type: ResultType::Any,
            arg_types: None,
            func: Arc::new(f),
        }
    }

    pub fn variadic<F>(name: impl Into<String>, min_args: usize, f: F) -> Self
    where
        F: 'static
            + Send
            + Sync
            + for<'c, 'a> Fn(&CallCtx<'c, N>, Vec<Argument<'a, N>>) -> Result<XdmSequence<N>, Error>,
    {
        Self::new(name, min_args, None, f)
    }

    #[must_use]
    pub fn with_return_type(mut self, return_type: ResultType) -> Self {
        self.return_type = return_type;
        self
    }

    #[must_use]
    pub fn with_arg_types(mut self, arg_types: Vec<ResultType>) -> Self {
        self.arg_types = Some(arg_types);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_args(&self) -> usize {
        self.min_args
    }

    pub fn max_args(&self) -> Option<usize> {
        self.max_args
    }

    pub fn return_type(&self) -> ResultType {
        self.return_type
    }

    pub fn arg_types(&self) -> Option<&[ResultType]> {
        self.arg_types.as_deref()
    }

    pub fn accepts(&self, argc: usize) -> bool {
        argc >= self.min_args && self.max_args.is_none_or(|m| argc <= m)
    }

    /// Evaluators are expected to enforce the bounds before invoking; this is
    /// for hosts that leave it to the extension layer.
    pub fn check_arity(&self, argc: usize) -> Result<(), Error> {
        if self.accepts(argc) {
            Ok(())
        } else {
            Err(Error::WrongArity {
                name: self.name.clone(),
                arity: argc,
                min: self.min_args,
                max: self.max_args,
            })
        }
    }

    pub fn invoke(
        &self,
        ctx: &CallCtx<'_, N>,
        args: Vec<Argument<'_, N>>,
    ) -> Result<XdmSequence<N>, Error> {
        (self.func)(ctx, args)
    }
}

/// Variable handle. No shipped context declares variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDescriptor {
    pub name: String,
    pub result_type: ResultType,
}

/// Callback surface an evaluator consults for names it does not know natively.
pub trait FunctionResolver<N> {
    /// `prefix` and `arg_types` are hints; resolution is by local name only.
    /// Unknown names are a hard error, never an empty result.
    fn resolve_function(
        &self,
        prefix: Option<&str>,
        name: &str,
        arg_types: &[ResultType],
    ) -> Result<&FunctionDescriptor<N>, Error>;

    /// `None` means "no such variable"; probing is not an error.
    fn resolve_variable(&self, prefix: Option<&str>, name: &str) -> Option<&VariableDescriptor>;

    /// Whether whitespace-only text nodes are significant.
    fn whitespace(&self) -> bool;

    fn preserve_whitespace(&self, node: &N) -> bool;

    /// Relative order of two source documents identified by base URI.
    fn compare_document(&self, base_uri: &str, next_base_uri: &str) -> Ordering;
}

/// Read-only registry of extension functions, built once per evaluation session.
///
/// Nothing mutates after [`ExtensionContextBuilder::build`], so one instance can
/// be shared across threads behind an `Arc`.
pub struct ExtensionContext<N> {
    functions: HashMap<String, FunctionDescriptor<N>>,
    whitespace: bool,
}

impl<N> fmt::Debug for ExtensionContext<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionContext")
            .field("functions", &self.function_names())
            .field("whitespace", &self.whitespace)
            .finish()
    }
}

impl<N> ExtensionContext<N> {
    pub fn builder() -> ExtensionContextBuilder<N> {
        ExtensionContextBuilder::new()
    }

    /// Registered names, sorted.
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl<N: 'static + XdmNode> ExtensionContext<N> {
    /// Context holding the `format` function.
    pub fn string_format() -> Self {
        ExtensionContextBuilder::new().with_format().build()
    }

    /// Resolve, check arity and call in one step.
    pub fn invoke(
        &self,
        prefix: Option<&str>,
        name: &str,
        args: Vec<Argument<'_, N>>,
        current_node: Option<&N>,
    ) -> Result<XdmSequence<N>, Error> {
        let hints: SmallVec<[ResultType; 8]> = args.iter().map(Argument::result_type).collect();
        let descriptor = self.resolve_function(prefix, name, &hints)?;
        descriptor.check_arity(args.len())?;
        let ctx = CallCtx { context: self, current_node };
        descriptor.invoke(&ctx, args)
    }
}

impl<N> FunctionResolver<N> for ExtensionContext<N> {
    fn resolve_function(
        &self,
        _prefix: Option<&str>,
        name: &str,
        _arg_types: &[ResultType],
    ) -> Result<&FunctionDescriptor<N>, Error> {
        match self.functions.get(name) {
            Some(descriptor) => {
                tracing::debug!(name, "resolved extension function");
                Ok(descriptor)
            }
            None => {
                tracing::debug!(name, "extension function not found");
                Err(Error::function_not_found(name))
            }
        }
    }

    fn resolve_variable(&self, _prefix: Option<&str>, _name: &str) -> Option<&VariableDescriptor> {
        None
    }

    fn whitespace(&self) -> bool {
        self.whitespace
    }

    fn preserve_whitespace(&self, _node: &N) -> bool {
        self.whitespace
    }

    fn compare_document(&self, _base_uri: &str, _next_base_uri: &str) -> Ordering {
        // single document in play; no cross-document order
        Ordering::Equal
    }
}

/// Builder for [`ExtensionContext`]. Whitespace is significant unless disabled.
pub struct ExtensionContextBuilder<N> {
    functions: HashMap<String, FunctionDescriptor<N>>,
    whitespace: bool,
}

impl<N> Default for ExtensionContextBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> ExtensionContextBuilder<N> {
    pub fn new() -> Self {
        Self { functions: HashMap::new(), whitespace: true }
    }

    /// Register a function. A later registration under the same name replaces
    /// the earlier one.
    #[must_use]
    pub fn with_function(mut self, descriptor: FunctionDescriptor<N>) -> Self {
        let name = descriptor.name.clone();
        if self.functions.insert(name.clone(), descriptor).is_some() {
            tracing::warn!(name = %name, "replacing previously registered extension function");
        }
        self
    }

    #[must_use]
    pub fn with_whitespace(mut self, significant: bool) -> Self {
        self.whitespace = significant;
        self
    }

    pub fn build(self) -> ExtensionContext<N> {
        tracing::debug!(functions = self.functions.len(), whitespace = self.whitespace, "extension context built");
        ExtensionContext { functions: self.functions, whitespace: self.whitespace }
    }
}

impl<N: 'static + XdmNode> ExtensionContextBuilder<N> {
    #[must_use]
    pub fn with_format(self) -> Self {
        self.with_function(crate::functions::format::descriptor())
    }
}
