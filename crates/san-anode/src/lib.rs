//! San template model.
//!
//! This crate holds the already-parsed input of the PHP SSR code generator:
//! template node trees ([`ANode`]), expression trees ([`Expr`]), compile-time
//! constants ([`ConstValue`]) and per-component metadata ([`ComponentInfo`]).
//! Every type can be read from the JSON form produced by the San front end.

pub mod component;
pub mod error;
pub mod expr;
pub mod node;
pub mod value;

pub use component::{ComponentInfo, ComponentReference, InitData, SanSourceFile, DEFAULT_ID};
pub use error::{AstError, AstResult};
pub use expr::{op, Accessor, ArrayItem, Expr, ExprKind, Filter, ObjectItem};
pub use node::{AElement, ANode, ATextNode, Directives, ForDirective, NodeKind, Prop, SlotVar};
pub use value::ConstValue;

/// Parse a template node tree from its JSON form.
pub fn parse_anode(source: &str) -> serde_json::Result<ANode> {
    serde_json::from_str(source)
}

/// Parse an expression tree from its JSON form.
pub fn parse_expr(source: &str) -> serde_json::Result<Expr> {
    serde_json::from_str(source)
}
