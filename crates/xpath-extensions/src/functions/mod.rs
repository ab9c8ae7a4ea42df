//! Shipped extension functions and the templating primitive they rely on.
pub mod format;
pub mod template;
