//! Template expressions to PHP expressions.
//!
//! Data reads go through `$ctx->data`, method calls through
//! `$ctx->instance`. Whether a value is escaped on output depends on where
//! it is used, so every compilation takes an [`OutputMode`].

use san_anode::{op, Accessor, ArrayItem, Expr, ExprKind, Filter, ObjectItem};
use smol_str::SmolStr;

use crate::error::{CompileError, CompileResult};
use crate::helpers::escape_html;
use crate::stringifier::{bool_literal, number, Stringifier};

/// Filters the runtime implements without a component declaration.
const BUILTIN_FILTERS: &[&str] = &["_class", "_style", "_xclass", "_xstyle", "url"];

/// How a compiled value is written to the HTML output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Used as a PHP value, no output conversion.
    None,
    /// Converted to string without escaping.
    Plain,
    /// Converted to string and HTML-escaped.
    Escape,
}

/// PHP operator of a binary operator code.
fn binary_operator(code: u32) -> Option<&'static str> {
    Some(match code {
        op::ADD => "+",
        op::SUB => "-",
        op::MUL => "*",
        op::DIV => "/",
        op::MOD => "%",
        op::LT => "<",
        op::GT => ">",
        op::AND => "&&",
        op::NE => "!=",
        op::LE => "<=",
        op::EQ => "==",
        op::GE => ">=",
        op::STRICT_NE => "!==",
        op::STRICT_EQ => "===",
        op::OR => "||",
        _ => return None,
    })
}

/// Wrap `code` for output in `mode`.
fn output_code(code: String, mode: OutputMode) -> String {
    match mode {
        OutputMode::None => code,
        OutputMode::Plain => format!("_::output({}, false)", code),
        OutputMode::Escape => format!("_::output({}, true)", code),
    }
}

/// Compiles expressions of one component.
#[derive(Debug, Clone, Copy)]
pub struct ExprCompiler<'a> {
    stringifier: &'a Stringifier,
    filter_names: &'a [SmolStr],
}

impl<'a> ExprCompiler<'a> {
    pub fn new(stringifier: &'a Stringifier) -> Self {
        Self {
            stringifier,
            filter_names: &[],
        }
    }

    /// Filters declared by the component, used to warn about unknown ones.
    pub fn with_filters(mut self, filter_names: &'a [SmolStr]) -> Self {
        self.filter_names = filter_names;
        self
    }

    pub fn stringifier(&self) -> &'a Stringifier {
        self.stringifier
    }

    /// Compile an expression for use as a PHP value.
    pub fn expr(&self, e: &Expr) -> CompileResult<String> {
        self.compile(e, OutputMode::None)
    }

    pub fn compile(&self, e: &Expr, mode: OutputMode) -> CompileResult<String> {
        let code = match &e.kind {
            ExprKind::String(s) => self.str(s, mode),
            ExprKind::Number(n) => number(*n),
            ExprKind::Bool(b) => bool_literal(*b).to_string(),
            ExprKind::Null => "null".to_string(),
            ExprKind::Accessor(accessor) => output_code(self.data_access(accessor)?, mode),
            ExprKind::Interp {
                expr,
                filters,
                original,
            } => self.interp(expr, filters, *original, mode)?,
            ExprKind::Call { name, args } => output_code(self.call(name, args)?, mode),
            ExprKind::Text { segs, .. } => self.text(segs, mode)?,
            ExprKind::Binary { operator, lhs, rhs } => self.binary(*operator, lhs, rhs, mode)?,
            ExprKind::Unary { operator, expr } => self.unary(*operator, expr)?,
            ExprKind::Ternary { cond, yes, no } => format!(
                "{} ? {} : {}",
                self.expr(cond)?,
                self.expr(yes)?,
                self.expr(no)?
            ),
            ExprKind::Array(items) => self.array(items)?,
            ExprKind::Object(items) => self.object(items)?,
        };
        Ok(if e.parenthesized {
            format!("({})", code)
        } else {
            code
        })
    }

    /// String literals bound for HTML are escaped now rather than at runtime.
    fn str(&self, s: &str, mode: OutputMode) -> String {
        match mode {
            OutputMode::Escape => self.stringifier.str(&escape_html(s)),
            _ => self.stringifier.str(s),
        }
    }

    /// `$ctx->data[..][..]`, nested accessors are looked up first.
    pub fn data_access(&self, accessor: &Accessor) -> CompileResult<String> {
        let mut code = String::from("$ctx->data");
        for path in &accessor.paths {
            let key = match &path.kind {
                ExprKind::Accessor(nested) => self.data_access(nested)?,
                _ => self.expr(path)?,
            };
            code.push('[');
            code.push_str(&key);
            code.push(']');
        }
        Ok(code)
    }

    fn call(&self, name: &Accessor, args: &[Expr]) -> CompileResult<String> {
        let method = name
            .head_name()
            .ok_or_else(|| CompileError::invalid_expression("call without a method name"))?;
        let mut code = format!("$ctx->instance->{}", method);
        for path in &name.paths[1..] {
            match &path.kind {
                ExprKind::String(prop) => {
                    code.push_str("->");
                    code.push_str(prop);
                }
                ExprKind::Number(n) => code.push_str(&format!("[{}]", number(*n))),
                _ => code.push_str(&format!("[{}]", self.expr(path)?)),
            }
        }
        let args = args
            .iter()
            .map(|arg| self.expr(arg))
            .collect::<CompileResult<Vec<_>>>()?;
        code.push_str(&format!("({})", args.join(", ")));
        Ok(code)
    }

    fn interp(
        &self,
        expr: &Expr,
        filters: &[Filter],
        original: bool,
        mode: OutputMode,
    ) -> CompileResult<String> {
        let mut code = self.expr(expr)?;

        for filter in filters {
            let name = filter.name.as_str();
            code = match name {
                "_class" => format!("_::classFilter({})", code),
                "_style" => format!("_::styleFilter({})", code),
                "_xclass" | "_xstyle" => {
                    let arg = filter.args.first().ok_or_else(|| {
                        CompileError::invalid_expression(format!("filter {} needs an argument", name))
                    })?;
                    format!("_::{}Filter({}, {})", &name[1..], code, self.expr(arg)?)
                }
                // runtime twin of `encodeURIComponent`, keeps `!*'()` as they are
                "url" => format!("_::encodeURIComponent({})", code),
                _ => {
                    if !self.filter_names.iter().any(|f| f == name) && !BUILTIN_FILTERS.contains(&name) {
                        log::warn!("filter \"{}\" is not declared by the component", name);
                    }
                    let mut args = vec![code];
                    for arg in &filter.args {
                        args.push(self.expr(arg)?);
                    }
                    format!("_::callFilter($ctx, \"{}\", [{}])", name, args.join(", "))
                }
            };
        }

        let mode = if original && mode == OutputMode::Escape {
            OutputMode::Plain
        } else {
            mode
        };
        Ok(output_code(code, mode))
    }

    /// Segments joined by `.`, each compiled in `mode`.
    fn text(&self, segs: &[Expr], mode: OutputMode) -> CompileResult<String> {
        if segs.is_empty() {
            return Ok("\"\"".to_string());
        }
        let segs = segs
            .iter()
            .map(|seg| self.compile(seg, mode))
            .collect::<CompileResult<Vec<_>>>()?;
        Ok(segs.join(" . "))
    }

    fn binary(&self, operator: u32, lhs: &Expr, rhs: &Expr, mode: OutputMode) -> CompileResult<String> {
        let php_op = binary_operator(operator).ok_or(CompileError::UnexpectedBinaryOperator(operator))?;
        let l = self.expr(lhs)?;
        let r = self.expr(rhs)?;
        let code = if operator == op::OR {
            format!("({} ? {} : {})", l, l, r)
        } else if operator == op::ADD && (lhs.is_string() || rhs.is_string()) {
            format!("{} . {}", l, r)
        } else {
            format!("{} {} {}", l, php_op, r)
        };
        Ok(output_code(code, mode))
    }

    fn unary(&self, operator: u32, expr: &Expr) -> CompileResult<String> {
        let prefix = match operator {
            op::NOT => "!",
            op::NEG => "-",
            _ => return Err(CompileError::UnexpectedUnaryOperator(operator)),
        };
        Ok(format!("{}{}", prefix, self.expr(expr)?))
    }

    /// `_::spread([a, b], "01")`, the bit string marks spread items.
    fn array(&self, items: &[ArrayItem]) -> CompileResult<String> {
        let mut codes = Vec::with_capacity(items.len());
        let mut bits = String::with_capacity(items.len());
        for item in items {
            codes.push(self.expr(&item.expr)?);
            bits.push(if item.spread { '1' } else { '0' });
        }
        Ok(format!("_::spread([{}], \"{}\")", codes.join(", "), bits))
    }

    /// `_::objSpread([["k", v], obj], "01")`.
    fn object(&self, items: &[ObjectItem]) -> CompileResult<String> {
        let mut codes = Vec::with_capacity(items.len());
        let mut bits = String::with_capacity(items.len());
        for item in items {
            match (&item.name, item.spread) {
                (_, true) => {
                    codes.push(self.expr(&item.expr)?);
                    bits.push('1');
                }
                (Some(name), false) => {
                    codes.push(format!("[{}, {}]", self.expr(name)?, self.expr(&item.expr)?));
                    bits.push('0');
                }
                (None, false) => {
                    return Err(CompileError::invalid_expression("object member without a name"))
                }
            }
        }
        Ok(format!("_::objSpread([{}], \"{}\")", codes.join(", "), bits))
    }
}
