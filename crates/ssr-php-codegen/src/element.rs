//! Open tags, attributes, element content and close tags.

use php_emitter::{string_literal, PhpEmitter};
use san_anode::{AElement, Expr, ExprKind, Prop};

use crate::anode::compile_node;
use crate::context::CodegenContext;
use crate::error::CompileResult;
use crate::expr::OutputMode;
use crate::helpers::{escape_html, is_bool_attr, is_void_tag, BOOL_ATTRS};

/// Variable holding the tag of a component root with no tag name.
const TAG_NAME_VAR: &str = "$tagName";

/// Write the open tag of `el`, attributes included.
pub fn tag_start(emitter: &mut PhpEmitter, el: &AElement, cx: &mut CodegenContext) -> CompileResult<()> {
    let tag = el.tag_name.as_str();
    if tag.is_empty() {
        emitter.buffer_html_literal("<");
        emitter.write_html(TAG_NAME_VAR);
    } else {
        emitter.buffer_html_literal(&format!("<{}", tag));
    }

    for prop in &el.props {
        if prop.name == "slot" {
            continue;
        }
        match (prop.name.as_str(), tag) {
            ("value", "textarea") => {}
            ("value", "select") => {
                emitter.write_line(&format!("$selectValue = {};", cx.exprs.expr(&prop.expr)?));
            }
            ("value", "option") => option_value(emitter, prop, cx)?,
            ("checked", "input") => input_checked(emitter, el, prop, cx)?,
            (name, _) if is_bool_attr(name) => bool_attr(emitter, prop, cx)?,
            _ => attr(emitter, prop, cx)?,
        }
    }

    if let Some(bind) = &el.directives.bind {
        bind_attrs(emitter, tag, bind, cx)?;
    }

    emitter.buffer_html_literal(">");
    Ok(())
}

/// Write the close tag of `el` and reset form state.
pub fn tag_end(emitter: &mut PhpEmitter, el: &AElement) {
    let tag = el.tag_name.as_str();
    if tag.is_empty() {
        emitter.buffer_html_literal("</");
        emitter.write_html(TAG_NAME_VAR);
        emitter.buffer_html_literal(">");
        return;
    }
    if !is_void_tag(tag) {
        emitter.buffer_html_literal(&format!("</{}>", tag));
    }
    match tag {
        "select" => emitter.write_line("$selectValue = null;"),
        "option" => emitter.write_line("$optionValue = null;"),
        _ => {}
    }
}

/// Write the content of `el`.
pub fn inner(emitter: &mut PhpEmitter, el: &AElement, cx: &mut CodegenContext) -> CompileResult<()> {
    if el.tag_name == "textarea" {
        if let Some(value) = el.prop("value") {
            emitter.write_html(&cx.exprs.compile(&value.expr, OutputMode::Escape)?);
        }
        return Ok(());
    }

    if let Some(html) = &el.directives.html {
        emitter.write_html(&cx.exprs.compile(html, OutputMode::Plain)?);
        return Ok(());
    }

    for child in &el.children {
        compile_node(emitter, child, cx, false)?;
    }
    Ok(())
}

fn option_value(emitter: &mut PhpEmitter, prop: &Prop, cx: &mut CodegenContext) -> CompileResult<()> {
    emitter.write_line(&format!("$optionValue = {};", cx.exprs.expr(&prop.expr)?));
    emitter.write_if("isset($optionValue)", |e| {
        e.write_html("_::attrFilter(\"value\", $optionValue, true)")
    });
    emitter.write_if("isset($selectValue) && $optionValue == $selectValue", |e| {
        e.buffer_html_literal(" selected")
    });
    Ok(())
}

/// `checked` on checkboxes and radios compares against the input's value.
fn input_checked(
    emitter: &mut PhpEmitter,
    el: &AElement,
    prop: &Prop,
    cx: &mut CodegenContext,
) -> CompileResult<()> {
    let input_type = el.prop("type").and_then(|p| p.expr.as_str());
    let value = el.prop("value");
    let (Some(kind @ ("checkbox" | "radio")), Some(value)) = (input_type, value) else {
        return bool_attr(emitter, prop, cx);
    };

    let checked = cx.exprs.expr(&prop.expr)?;
    let value = cx.exprs.expr(&value.expr)?;
    let cond = if kind == "checkbox" {
        format!("_::contains({}, {})", checked, value)
    } else {
        format!("{} === {}", checked, value)
    };
    emitter.write_if(&cond, |e| e.buffer_html_literal(" checked"));
    Ok(())
}

fn bool_attr(emitter: &mut PhpEmitter, prop: &Prop, cx: &mut CodegenContext) -> CompileResult<()> {
    match &prop.expr.kind {
        ExprKind::Bool(false) => {}
        // present without a dynamic value
        ExprKind::Bool(true) | ExprKind::String(_) => {
            emitter.buffer_html_literal(&format!(" {}", prop.name));
        }
        _ => {
            emitter.write_html(&format!(
                "_::boolAttrFilter({}, {})",
                string_literal(&prop.name),
                cx.exprs.expr(&prop.expr)?
            ));
        }
    }
    Ok(())
}

fn attr(emitter: &mut PhpEmitter, prop: &Prop, cx: &mut CodegenContext) -> CompileResult<()> {
    match &prop.expr.kind {
        ExprKind::Bool(true) => emitter.buffer_html_literal(&format!(" {}", prop.name)),
        ExprKind::Bool(false) => {}
        ExprKind::String(s) => {
            emitter.buffer_html_literal(&format!(" {}=\"{}\"", prop.name, escape_html(s)));
        }
        _ => {
            let escape = prop.x || needs_escape(&prop.expr);
            emitter.write_html(&format!(
                "_::attrFilter({}, {}, {})",
                string_literal(&prop.name),
                cx.exprs.expr(&prop.expr)?,
                escape
            ));
        }
    }
    Ok(())
}

/// Values that may carry user text are escaped by the runtime filter.
fn needs_escape(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Accessor(_) | ExprKind::Text { .. } => true,
        ExprKind::Interp { original, .. } => !original,
        _ => false,
    }
}

/// Spread an object into attributes at runtime.
fn bind_attrs(emitter: &mut PhpEmitter, tag: &str, bind: &Expr, cx: &mut CodegenContext) -> CompileResult<()> {
    emitter.write_line(&format!("$bindObj = {};", cx.exprs.expr(bind)?));
    emitter.write_foreach("$bindObj as $key => $value", |e| {
        if tag == "textarea" {
            e.write_if("$key == \"value\"", |e| e.write_continue());
        }
        e.write_switch("$key", |e| {
            let (rest, last) = BOOL_ATTRS.split_at(BOOL_ATTRS.len() - 1);
            for name in rest {
                e.write_case(&string_literal(name), |_| ());
            }
            e.write_case(&string_literal(last[0]), |e| {
                e.write_html("_::boolAttrFilter($key, $value)");
                e.write_break();
            });
            e.write_default(|e| e.write_html("_::attrFilter($key, $value, true)"));
        });
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompileOptions;
    use crate::reference::ReferenceCompiler;
    use crate::stringifier::Stringifier;
    use camino::Utf8Path;
    use pretty_assertions::assert_eq;
    use san_anode::{ComponentInfo, SanSourceFile};

    fn start(el: &AElement) -> String {
        let options = CompileOptions::default();
        let file = SanSourceFile::new("/a.san", vec![ComponentInfo::new("default", 0)]);
        let references = ReferenceCompiler::new(&options, Utf8Path::new("/"), &file);
        let stringifier = Stringifier::new("san\\runtime");
        let mut cx = CodegenContext::new(&options, &file.components[0], &references, &stringifier);
        let mut emitter = PhpEmitter::new();
        tag_start(&mut emitter, el, &mut cx).unwrap();
        tag_end(&mut emitter, el);
        emitter.finish()
    }

    #[test]
    fn test_static_attrs() {
        let el = AElement::new("div")
            .with_prop("id", Expr::string("a<b"))
            .with_prop("hidden", Expr::bool(true))
            .with_prop("draggable", Expr::bool(false))
            .with_prop("slot", Expr::string("title"));
        assert_eq!(start(&el), "$html .= \"<div id=\\\"a&lt;b\\\" hidden></div>\";\n");
    }

    #[test]
    fn test_dynamic_attr_escaping() {
        let el = AElement::new("a")
            .with_prop("href", Expr::path(&["url"]))
            .with_prop("title", Expr::interp(Expr::path(&["t"]), vec![]).with_original());
        assert_eq!(
            start(&el),
            "$html .= \"<a\";\n\
             $html .= _::attrFilter(\"href\", $ctx->data[\"url\"], true);\n\
             $html .= _::attrFilter(\"title\", $ctx->data[\"t\"], false);\n\
             $html .= \"></a>\";\n"
        );
    }

    #[test]
    fn test_empty_class_is_kept() {
        let el = AElement::new("span").with_prop("class", Expr::string(""));
        assert_eq!(start(&el), "$html .= \"<span class=\\\"\\\"></span>\";\n");
    }

    #[test]
    fn test_dynamic_class() {
        let el = AElement::new("span").with_prop("class", Expr::path(&["c"]));
        assert_eq!(
            start(&el),
            "$html .= \"<span\";\n\
             $html .= _::attrFilter(\"class\", $ctx->data[\"c\"], true);\n\
             $html .= \"></span>\";\n"
        );
    }

    #[test]
    fn test_static_false_attr_is_dropped() {
        let el = AElement::new("div")
            .with_prop("spellcheck", Expr::bool(false))
            .with_prop("title", Expr::string("t"));
        assert_eq!(start(&el), "$html .= \"<div title=\\\"t\\\"></div>\";\n");
    }

    #[test]
    fn test_void_tag() {
        assert_eq!(start(&AElement::new("br")), "$html .= \"<br>\";\n");
    }

    #[test]
    fn test_bool_attrs() {
        let el = AElement::new("button")
            .with_prop("disabled", Expr::path(&["busy"]))
            .with_prop("readonly", Expr::bool(true));
        assert_eq!(
            start(&el),
            "$html .= \"<button\";\n\
             $html .= _::boolAttrFilter(\"disabled\", $ctx->data[\"busy\"]);\n\
             $html .= \" readonly></button>\";\n"
        );
    }

    #[test]
    fn test_checkbox() {
        let el = AElement::new("input")
            .with_prop("type", Expr::string("checkbox"))
            .with_prop("value", Expr::string("a"))
            .with_prop("checked", Expr::path(&["picked"]));
        assert_eq!(
            start(&el),
            "$html .= \"<input type=\\\"checkbox\\\" value=\\\"a\\\"\";\n\
             if (_::contains($ctx->data[\"picked\"], \"a\")) {\n    \
             $html .= \" checked\";\n\
             }\n\
             $html .= \">\";\n"
        );
    }

    #[test]
    fn test_radio() {
        let el = AElement::new("input")
            .with_prop("type", Expr::string("radio"))
            .with_prop("value", Expr::path(&["v"]))
            .with_prop("checked", Expr::path(&["picked"]));
        let code = start(&el);
        assert!(code.contains("if ($ctx->data[\"picked\"] === $ctx->data[\"v\"]) {"));
    }

    #[test]
    fn test_select_and_option() {
        let el = AElement::new("select").with_prop("value", Expr::path(&["city"]));
        assert_eq!(
            start(&el),
            "$html .= \"<select\";\n\
             $selectValue = $ctx->data[\"city\"];\n\
             $html .= \"></select>\";\n\
             $selectValue = null;\n"
        );

        let el = AElement::new("option").with_prop("value", Expr::string("bj"));
        assert_eq!(
            start(&el),
            "$html .= \"<option\";\n\
             $optionValue = \"bj\";\n\
             if (isset($optionValue)) {\n    \
             $html .= _::attrFilter(\"value\", $optionValue, true);\n\
             }\n\
             if (isset($selectValue) && $optionValue == $selectValue) {\n    \
             $html .= \" selected\";\n\
             }\n\
             $html .= \"></option>\";\n\
             $optionValue = null;\n"
        );
    }

    #[test]
    fn test_bind() {
        let el = AElement::new("textarea").with_bind(Expr::path(&["attrs"]));
        assert_eq!(
            start(&el),
            "$html .= \"<textarea\";\n\
             $bindObj = $ctx->data[\"attrs\"];\n\
             foreach ($bindObj as $key => $value) {\n    \
             if ($key == \"value\") {\n        \
             continue;\n    \
             }\n    \
             switch ($key) {\n        \
             case \"readonly\":\n        \
             case \"disabled\":\n        \
             case \"multiple\":\n        \
             case \"checked\":\n            \
             $html .= _::boolAttrFilter($key, $value);\n            \
             break;\n        \
             default:\n            \
             $html .= _::attrFilter($key, $value, true);\n    \
             }\n\
             }\n\
             $html .= \"></textarea>\";\n"
        );
    }

    #[test]
    fn test_caller_tag_name() {
        assert_eq!(
            start(&AElement::new("")),
            "$html .= \"<\";\n\
             $html .= $tagName;\n\
             $html .= \"></\";\n\
             $html .= $tagName;\n\
             $html .= \">\";\n"
        );
    }
}
