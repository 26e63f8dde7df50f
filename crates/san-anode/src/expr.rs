//! Template expression trees.
//!
//! Expressions arrive already parsed. Operator codes are kept as the numeric
//! codes of the wire form so that a consumer can reject the ones it does not
//! understand.

use serde::Deserialize;
use smol_str::SmolStr;

use crate::error::AstError;

/// Operator codes used by [`ExprKind::Unary`] and [`ExprKind::Binary`].
pub mod op {
    pub const NOT: u32 = 33;
    pub const MOD: u32 = 37;
    pub const MUL: u32 = 42;
    pub const ADD: u32 = 43;
    pub const SUB: u32 = 45;
    pub const DIV: u32 = 47;
    pub const LT: u32 = 60;
    pub const GT: u32 = 62;
    pub const AND: u32 = 76;
    pub const NE: u32 = 94;
    pub const LE: u32 = 121;
    pub const EQ: u32 = 122;
    pub const GE: u32 = 123;
    pub const STRICT_NE: u32 = 155;
    pub const STRICT_EQ: u32 = 183;
    pub const OR: u32 = 248;

    /// Unary minus shares its code with subtraction.
    pub const NEG: u32 = SUB;
}

/// An expression node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawExpr")]
pub struct Expr {
    /// The expression itself.
    pub kind: ExprKind,
    /// Written inside parentheses in the template.
    pub parenthesized: bool,
}

/// The closed set of expression kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A string literal.
    String(String),
    /// A number literal.
    Number(f64),
    /// A boolean literal.
    Bool(bool),
    /// The `null` literal.
    Null,
    /// A data access path such as `list[i].name`.
    Accessor(Accessor),
    /// An interpolation `{{ expr | filter }}`.
    Interp {
        expr: Box<Expr>,
        filters: Vec<Filter>,
        /// Output without escaping (`{{{ }}}` or `s-html`-like usage).
        original: bool,
    },
    /// A method call on the component instance.
    Call { name: Accessor, args: Vec<Expr> },
    /// Text mixed with interpolations.
    Text {
        segs: Vec<Expr>,
        /// The text carries reconciliation markers.
        original: bool,
    },
    Binary {
        operator: u32,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary { operator: u32, expr: Box<Expr> },
    Ternary {
        cond: Box<Expr>,
        yes: Box<Expr>,
        no: Box<Expr>,
    },
    Array(Vec<ArrayItem>),
    Object(Vec<ObjectItem>),
}

/// A path of property accesses rooted at the component data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Accessor {
    /// Path segments. Literal segments are constant keys, accessor segments
    /// are looked up first.
    pub paths: Vec<Expr>,
}

impl Accessor {
    /// Create an accessor over literal names.
    pub fn from_names(names: &[&str]) -> Self {
        Self {
            paths: names.iter().map(|name| Expr::string(*name)).collect(),
        }
    }

    /// The first segment as a plain name, if it is a string literal.
    pub fn head_name(&self) -> Option<&str> {
        match self.paths.first().map(|p| &p.kind) {
            Some(ExprKind::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A filter applied inside an interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub name: SmolStr,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayItem {
    pub expr: Expr,
    pub spread: bool,
}

/// An object literal member. Spread members carry no name.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectItem {
    pub name: Option<Expr>,
    pub expr: Expr,
    pub spread: bool,
}

impl From<ExprKind> for Expr {
    fn from(kind: ExprKind) -> Self {
        Self {
            kind,
            parenthesized: false,
        }
    }
}

impl Expr {
    pub fn string(value: impl Into<String>) -> Self {
        ExprKind::String(value.into()).into()
    }

    pub fn number(value: f64) -> Self {
        ExprKind::Number(value).into()
    }

    pub fn bool(value: bool) -> Self {
        ExprKind::Bool(value).into()
    }

    pub fn null() -> Self {
        ExprKind::Null.into()
    }

    pub fn accessor(paths: Vec<Expr>) -> Self {
        ExprKind::Accessor(Accessor { paths }).into()
    }

    /// Accessor over literal names, e.g. `Expr::path(&["list", "length"])`.
    pub fn path(names: &[&str]) -> Self {
        ExprKind::Accessor(Accessor::from_names(names)).into()
    }

    pub fn interp(expr: Expr, filters: Vec<Filter>) -> Self {
        ExprKind::Interp {
            expr: Box::new(expr),
            filters,
            original: false,
        }
        .into()
    }

    pub fn text(segs: Vec<Expr>) -> Self {
        ExprKind::Text {
            segs,
            original: false,
        }
        .into()
    }

    pub fn call(name: Accessor, args: Vec<Expr>) -> Self {
        ExprKind::Call { name, args }.into()
    }

    pub fn binary(operator: u32, lhs: Expr, rhs: Expr) -> Self {
        ExprKind::Binary {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
        .into()
    }

    pub fn unary(operator: u32, expr: Expr) -> Self {
        ExprKind::Unary {
            operator,
            expr: Box::new(expr),
        }
        .into()
    }

    pub fn ternary(cond: Expr, yes: Expr, no: Expr) -> Self {
        ExprKind::Ternary {
            cond: Box::new(cond),
            yes: Box::new(yes),
            no: Box::new(no),
        }
        .into()
    }

    pub fn array(items: Vec<ArrayItem>) -> Self {
        ExprKind::Array(items).into()
    }

    pub fn object(items: Vec<ObjectItem>) -> Self {
        ExprKind::Object(items).into()
    }

    /// Mark this expression as written in parentheses.
    pub fn parenthesized(mut self) -> Self {
        self.parenthesized = true;
        self
    }

    /// Set the `original` flag of an interpolation or text expression.
    pub fn with_original(mut self) -> Self {
        match &mut self.kind {
            ExprKind::Interp { original, .. } | ExprKind::Text { original, .. } => *original = true,
            _ => {}
        }
        self
    }

    /// The literal value when this is a string literal.
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind, ExprKind::String(_))
    }

    /// Whether this is text carrying reconciliation markers.
    pub fn is_original_text(&self) -> bool {
        matches!(self.kind, ExprKind::Text { original: true, .. })
    }
}

impl Filter {
    pub fn new(name: impl Into<SmolStr>, args: Vec<Expr>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

impl ArrayItem {
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            spread: false,
        }
    }

    pub fn spread(expr: Expr) -> Self {
        Self { expr, spread: true }
    }
}

impl ObjectItem {
    pub fn new(name: Expr, expr: Expr) -> Self {
        Self {
            name: Some(name),
            expr,
            spread: false,
        }
    }

    pub fn spread(expr: Expr) -> Self {
        Self {
            name: None,
            expr,
            spread: true,
        }
    }
}

// Wire form.

#[derive(Deserialize)]
struct RawExpr {
    #[serde(rename = "type")]
    ty: u8,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    paths: Vec<Expr>,
    #[serde(default)]
    expr: Option<Box<Expr>>,
    #[serde(default)]
    filters: Vec<Expr>,
    #[serde(default)]
    name: Option<Box<Expr>>,
    #[serde(default)]
    args: Vec<Expr>,
    #[serde(default)]
    segs: Vec<Expr>,
    #[serde(default)]
    operator: Option<u32>,
    #[serde(default)]
    items: Vec<RawItem>,
    #[serde(default)]
    original: serde_json::Value,
    #[serde(default)]
    parenthesized: serde_json::Value,
}

#[derive(Deserialize)]
struct RawItem {
    #[serde(default)]
    name: Option<Expr>,
    expr: Expr,
    #[serde(default)]
    spread: serde_json::Value,
}

/// Flags are written as `true` or `1` by the front end.
pub(crate) fn truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Null => false,
        _ => true,
    }
}

fn into_accessor(expr: Expr, kind: &'static str) -> Result<Accessor, AstError> {
    match expr.kind {
        ExprKind::Accessor(accessor) => Ok(accessor),
        _ => Err(AstError::invalid(kind, "name", "expected an accessor")),
    }
}

fn into_filter(expr: Expr) -> Result<Filter, AstError> {
    match expr.kind {
        ExprKind::Call { name, args } => {
            let filter_name = name
                .head_name()
                .ok_or_else(|| AstError::invalid("filter", "name", "expected a literal name"))?;
            Ok(Filter::new(filter_name, args))
        }
        _ => Err(AstError::invalid("interp", "filters", "expected a call")),
    }
}

fn pair<const N: usize>(segs: Vec<Expr>, kind: &'static str) -> Result<[Expr; N], AstError> {
    segs.try_into()
        .map_err(|segs: Vec<Expr>| AstError::invalid(kind, "segs", format!("expected {} operands, found {}", N, segs.len())))
}

impl TryFrom<RawExpr> for Expr {
    type Error = AstError;

    fn try_from(raw: RawExpr) -> Result<Self, Self::Error> {
        let kind = match raw.ty {
            1 => ExprKind::String(
                raw.value
                    .as_str()
                    .ok_or_else(|| AstError::missing("string", "value"))?
                    .to_string(),
            ),
            2 => ExprKind::Number(
                raw.value
                    .as_f64()
                    .ok_or_else(|| AstError::missing("number", "value"))?,
            ),
            3 => ExprKind::Bool(truthy(&raw.value)),
            4 => ExprKind::Accessor(Accessor { paths: raw.paths }),
            5 => ExprKind::Interp {
                expr: raw.expr.ok_or_else(|| AstError::missing("interp", "expr"))?,
                filters: raw
                    .filters
                    .into_iter()
                    .map(into_filter)
                    .collect::<Result<_, _>>()?,
                original: truthy(&raw.original),
            },
            6 => {
                let name = raw.name.ok_or_else(|| AstError::missing("call", "name"))?;
                ExprKind::Call {
                    name: into_accessor(*name, "call")?,
                    args: raw.args,
                }
            }
            7 => ExprKind::Text {
                segs: raw.segs,
                original: truthy(&raw.original),
            },
            8 => {
                let [lhs, rhs] = pair::<2>(raw.segs, "binary")?;
                ExprKind::Binary {
                    operator: raw
                        .operator
                        .ok_or_else(|| AstError::missing("binary", "operator"))?,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }
            }
            9 => ExprKind::Unary {
                operator: raw
                    .operator
                    .ok_or_else(|| AstError::missing("unary", "operator"))?,
                expr: raw.expr.ok_or_else(|| AstError::missing("unary", "expr"))?,
            },
            10 => {
                let [cond, yes, no] = pair::<3>(raw.segs, "ternary")?;
                ExprKind::Ternary {
                    cond: Box::new(cond),
                    yes: Box::new(yes),
                    no: Box::new(no),
                }
            }
            11 => ExprKind::Object(
                raw.items
                    .into_iter()
                    .map(|item| {
                        let spread = truthy(&item.spread);
                        if !spread && item.name.is_none() {
                            return Err(AstError::missing("object item", "name"));
                        }
                        Ok(ObjectItem {
                            name: item.name,
                            expr: item.expr,
                            spread,
                        })
                    })
                    .collect::<Result<_, _>>()?,
            ),
            12 => ExprKind::Array(
                raw.items
                    .into_iter()
                    .map(|item| ArrayItem {
                        spread: truthy(&item.spread),
                        expr: item.expr,
                    })
                    .collect(),
            ),
            13 => ExprKind::Null,
            other => return Err(AstError::UnknownExpressionType(other)),
        };
        Ok(Self {
            kind,
            parenthesized: truthy(&raw.parenthesized),
        })
    }
}
