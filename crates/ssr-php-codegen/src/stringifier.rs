//! Compile-time constants to PHP literals.

use php_emitter::string_literal;
use san_anode::ConstValue;

use crate::error::{CompileError, CompileResult};

/// Largest magnitude printed as an integer literal.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Turns constant values into PHP literal source.
#[derive(Debug, Clone)]
pub struct Stringifier {
    /// Namespace of the runtime helpers, used for `Ts2Php_Date`.
    helpers: String,
}

impl Stringifier {
    pub fn new(helpers: impl Into<String>) -> Self {
        Self {
            helpers: helpers.into().trim_matches('\\').to_string(),
        }
    }

    /// Stringify any constant. A top level `Undefined` has no PHP form.
    pub fn any(&self, value: &ConstValue) -> CompileResult<String> {
        Ok(match value {
            ConstValue::Undefined => {
                return Err(CompileError::CannotStringify("undefined".to_string()))
            }
            ConstValue::Null => "null".to_string(),
            ConstValue::Bool(b) => bool_literal(*b).to_string(),
            ConstValue::Number(n) => number(*n),
            ConstValue::String(s) => self.str(s),
            ConstValue::Date(ms) => self.date(*ms),
            ConstValue::Array(items) => self.arr(items)?,
            ConstValue::Object(map) => {
                let pairs = map
                    .iter()
                    .filter(|(_, v)| !matches!(v, ConstValue::Undefined))
                    .map(|(k, v)| Ok(format!("{} => {}", self.str(k), self.any(v)?)))
                    .collect::<CompileResult<Vec<_>>>()?;
                format!("[{}]", pairs.join(", "))
            }
        })
    }

    pub fn str(&self, source: &str) -> String {
        string_literal(source)
    }

    fn arr(&self, items: &[ConstValue]) -> CompileResult<String> {
        let items = items
            .iter()
            .map(|item| match item {
                // holes read as null
                ConstValue::Undefined => Ok("null".to_string()),
                item => self.any(item),
            })
            .collect::<CompileResult<Vec<_>>>()?;
        Ok(format!("[{}]", items.join(", ")))
    }

    fn date(&self, ms: i64) -> String {
        if self.helpers.is_empty() {
            format!("new \\Ts2Php_Date({})", ms)
        } else {
            format!("new \\{}\\Ts2Php_Date({})", self.helpers, ms)
        }
    }
}

pub fn bool_literal(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// PHP literal of a number.
pub fn number(n: f64) -> String {
    if n.is_nan() {
        "null".to_string()
    } else if n.is_infinite() {
        let inf = if n > 0.0 { "INF" } else { "-INF" };
        inf.to_string()
    } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
