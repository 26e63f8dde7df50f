//! Template node compilation.
//!
//! Every node kind has its own strategy: text, `if` chains, `for` loops,
//! slots, transparent `template`/`fragment` wrappers, child components and
//! plain elements. `if` and `for` are handled before the structural kind and
//! are then masked out, so the rest of the node compiles as if they were
//! never there. The node itself is never modified.

use indexmap::IndexMap;
use php_emitter::{string_literal, PhpEmitter};
use san_anode::{AElement, ANode, ATextNode, ComponentReference, Expr, ExprKind, ForDirective, NodeKind};

use crate::context::CodegenContext;
use crate::element;
use crate::error::CompileResult;
use crate::expr::OutputMode;
use crate::helpers::{camelize, escape_html};
use crate::stringifier::number;

/// Directives already handled on the way to an element.
#[derive(Debug, Clone, Copy, Default)]
struct Consumed {
    if_: bool,
    for_: bool,
}

/// Compile a node. `is_root` is set for the root of a component template.
pub fn compile_node(
    emitter: &mut PhpEmitter,
    node: &ANode,
    cx: &mut CodegenContext,
    is_root: bool,
) -> CompileResult<()> {
    match node {
        ANode::Text(text) => compile_text(emitter, text, cx),
        ANode::Element(el) => compile_element(emitter, el, Consumed::default(), cx, is_root),
    }
}

fn compile_element(
    emitter: &mut PhpEmitter,
    el: &AElement,
    consumed: Consumed,
    cx: &mut CodegenContext,
    is_root: bool,
) -> CompileResult<()> {
    if let (Some(cond), false) = (&el.directives.if_, consumed.if_) {
        return compile_if(emitter, el, cond, consumed, cx, is_root);
    }
    if let (Some(dir), false) = (&el.directives.for_, consumed.for_) {
        return compile_for(emitter, el, dir, consumed, cx);
    }

    log::trace!("compile <{}> as {:?}", el.tag_name, el.kind());
    match el.kind() {
        NodeKind::Slot => compile_slot(emitter, el, cx),
        NodeKind::Template => element::inner(emitter, el, cx),
        NodeKind::Fragment => compile_fragment(emitter, el, cx),
        NodeKind::Tag => match cx.info.get_child_component_reference(el) {
            Some(reference) => compile_component(emitter, el, reference, cx, is_root),
            None => compile_plain(emitter, el, cx, is_root),
        },
    }
}

fn compile_text(emitter: &mut PhpEmitter, text: &ATextNode, cx: &mut CodegenContext) -> CompileResult<()> {
    let expr = &text.text_expr;
    let markers = expr.is_original_text() && !cx.ssr_only();

    if markers {
        emitter.buffer_html_literal("<!--s-text-->");
    }
    match static_text(&expr.kind) {
        Some(html) => emitter.buffer_html_literal(&html),
        None => emitter.write_html(&cx.exprs.compile(expr, OutputMode::Escape)?),
    }
    if markers {
        emitter.buffer_html_literal("<!--/s-text-->");
    }
    Ok(())
}

/// Escaped HTML of text made only of literals.
fn static_text(kind: &ExprKind) -> Option<String> {
    match kind {
        ExprKind::String(s) => Some(escape_html(s)),
        ExprKind::Number(n) => Some(number(*n)),
        ExprKind::Text { segs, .. } => segs.iter().map(|seg| static_text(&seg.kind)).collect(),
        _ => None,
    }
}

fn compile_if(
    emitter: &mut PhpEmitter,
    el: &AElement,
    cond: &Expr,
    consumed: Consumed,
    cx: &mut CodegenContext,
    is_root: bool,
) -> CompileResult<()> {
    let residual = Consumed {
        if_: true,
        ..consumed
    };
    emitter.write_if(&cx.exprs.expr(cond)?, |e| compile_element(e, el, residual, cx, is_root))?;

    for branch in &el.elses {
        match &branch.directives.elif {
            Some(cond) => emitter.begin_else_if(&cx.exprs.expr(cond)?),
            None => emitter.begin_else(),
        }
        compile_element(emitter, branch, Consumed::default(), cx, is_root)?;
        emitter.end_if();
    }
    Ok(())
}

/// Loop variables are written into the shared data of the component and
/// stay there after the loop.
fn compile_for(
    emitter: &mut PhpEmitter,
    el: &AElement,
    dir: &ForDirective,
    consumed: Consumed,
    cx: &mut CodegenContext,
) -> CompileResult<()> {
    let list = format!("${}", cx.next_id());
    let index = dir.index.as_ref().map(|_| format!("${}", cx.next_id()));
    let item = format!("${}", cx.next_id());
    let residual = Consumed {
        for_: true,
        ..consumed
    };

    emitter.write_line(&format!("{} = {};", list, cx.exprs.expr(&dir.value)?));
    let guard = format!("is_array({}) || is_object({})", list, list);
    emitter.write_if(&guard, |e| {
        let head = match &index {
            Some(index) => format!("{} as {} => {}", list, index, item),
            None => format!("{} as {}", list, item),
        };
        e.write_foreach(&head, |e| {
            if let (Some(name), Some(index)) = (&dir.index, &index) {
                e.write_line(&format!("$ctx->data[{}] = {};", string_literal(name), index));
            }
            e.write_line(&format!("$ctx->data[{}] = {};", string_literal(&dir.item), item));
            compile_element(e, el, residual, cx, false)
        })
    })
}

/// Slot content is rendered by a closure cached on the context. Caller
/// content runs against the owner context, default content against ours.
fn compile_slot(emitter: &mut PhpEmitter, el: &AElement, cx: &mut CodegenContext) -> CompileResult<()> {
    let renderer = format!("$ctx->slotRenderers[{}]", string_literal(&cx.next_id()));

    emitter.write_if(&format!("!isset({})", renderer), |e| -> CompileResult<()> {
        e.next_line(&format!("{} = ", renderer));
        e.write_anonymous_function(&[], &["&$ctx", "&$html"], |e| -> CompileResult<()> {
            e.next_line("$defaultSlotRender = ");
            e.write_anonymous_function(&["$ctx"], &[], |e| -> CompileResult<()> {
                e.write_line("$html = \"\";");
                for child in &el.children {
                    compile_node(e, child, cx, false)?;
                }
                e.write_line("return $html;");
                Ok(())
            })?;
            e.feed_line(";");

            let slot_name = match el.prop("name") {
                Some(prop) => cx.exprs.expr(&prop.expr)?,
                None => "\"\"".to_string(),
            };
            e.write_line(&format!("$slotName = {};", slot_name));
            e.write_line("$isInserted = isset($ctx->slots[$slotName]);");
            e.write_line("$slotRender = $isInserted ? $ctx->slots[$slotName] : $defaultSlotRender;");
            e.write_line("$slotCtx = $isInserted ? $ctx->owner : $ctx;");

            if el.directives.bind.is_some() || !el.vars.is_empty() {
                e.write_line(
                    "$slotCtx = (object)[\"computedNames\" => $slotCtx->computedNames, \
                     \"sanssrCid\" => $slotCtx->sanssrCid, \"slots\" => $slotCtx->slots, \
                     \"owner\" => $slotCtx->owner, \"slotRenderers\" => [], \
                     \"data\" => $slotCtx->data, \"instance\" => $slotCtx->instance];",
                );
            }
            if let Some(bind) = &el.directives.bind {
                e.write_line(&format!("_::extend($slotCtx->data, {});", cx.exprs.expr(bind)?));
            }
            for var in &el.vars {
                e.write_line(&format!(
                    "$slotCtx->data[{}] = {};",
                    string_literal(&var.name),
                    cx.exprs.expr(&var.expr)?
                ));
            }
            e.write_html("$slotRender($slotCtx)");
            Ok(())
        })?;
        e.feed_line(";");
        Ok(())
    })?;
    emitter.write_line(&format!("call_user_func({});", renderer));
    Ok(())
}

fn compile_fragment(emitter: &mut PhpEmitter, el: &AElement, cx: &mut CodegenContext) -> CompileResult<()> {
    let markers = !cx.ssr_only();
    if markers && el.children.first().is_some_and(ANode::is_text) {
        emitter.buffer_html_literal("<!--s-frag-->");
    }
    element::inner(emitter, el, cx)?;
    if markers && el.children.last().is_some_and(ANode::is_text) {
        emitter.buffer_html_literal("<!--/s-frag-->");
    }
    Ok(())
}

/// Render a child component through its render function.
fn compile_component(
    emitter: &mut PhpEmitter,
    el: &AElement,
    reference: &ComponentReference,
    cx: &mut CodegenContext,
    is_root: bool,
) -> CompileResult<()> {
    // PHP key expression of each slot to its content, default slot first
    let mut slots: IndexMap<String, Vec<&ANode>> = IndexMap::new();
    slots.insert("\"\"".to_string(), Vec::new());
    for child in &el.children {
        let slot = child.as_element().and_then(|c| c.prop("slot"));
        let key = match slot {
            Some(prop) => cx.exprs.expr(&prop.expr)?,
            None => "\"\"".to_string(),
        };
        slots.entry(key).or_default().push(child);
    }

    emitter.write_line("$childSlots = [];");
    for (key, children) in slots.iter().filter(|(_, children)| !children.is_empty()) {
        emitter.next_line(&format!("$childSlots[{}] = ", key));
        emitter.write_anonymous_function(&["$ctx"], &[], |e| -> CompileResult<()> {
            e.write_line("$html = \"\";");
            for child in children {
                compile_node(e, child, cx, false)?;
            }
            e.write_line("return $html;");
            Ok(())
        })?;
        emitter.feed_line(";");
    }

    let mut data = Vec::with_capacity(el.props.len());
    for prop in el.props.iter().filter(|p| p.name != "slot") {
        data.push(format!(
            "{} => {}",
            string_literal(&camelize(&prop.name)),
            cx.exprs.expr(&prop.expr)?
        ));
    }
    let mut data = format!("[{}]", data.join(", "));
    if let Some(bind) = &el.directives.bind {
        data = format!("_::combine({}, {})", cx.exprs.expr(bind)?, data);
    }

    let render = cx.references.compile_to_function_full_name(reference)?;
    let no_data_output = if is_root { "$noDataOutput" } else { "true" };
    emitter.next_line("$html .= ");
    emitter.write_function_call(
        &render,
        &[
            data,
            no_data_output.to_string(),
            "$ctx".to_string(),
            string_literal(&el.tag_name),
            "$childSlots".to_string(),
        ],
    );
    emitter.feed_line(";");
    emitter.write_line("$childSlots = null;");
    Ok(())
}

fn compile_plain(
    emitter: &mut PhpEmitter,
    el: &AElement,
    cx: &mut CodegenContext,
    is_root: bool,
) -> CompileResult<()> {
    element::tag_start(emitter, el, cx)?;
    if is_root && !cx.ssr_only() {
        emitter.write_if("!$noDataOutput", |e| e.write_data_comment());
    }
    element::inner(emitter, el, cx)?;
    element::tag_end(emitter, el);
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
    use san_anode::{ComponentInfo, Expr, SanSourceFile};

    fn compile_with(options: &CompileOptions, info: ComponentInfo, node: &ANode, is_root: bool) -> String {
        let file = SanSourceFile::new("/proj/src/a.san", vec![info]);
        let references = ReferenceCompiler::new(options, Utf8Path::new("/proj/src"), &file);
        let stringifier = Stringifier::new("san\\runtime");
        let mut cx = CodegenContext::new(options, &file.components[0], &references, &stringifier);
        let mut emitter = PhpEmitter::new();
        compile_node(&mut emitter, node, &mut cx, is_root).unwrap();
        emitter.finish()
    }

    fn compile(node: impl Into<ANode>) -> String {
        compile_with(&CompileOptions::default(), ComponentInfo::new("default", 0), &node.into(), false)
    }

    #[test]
    fn test_static_text() {
        let node = ANode::text(Expr::text(vec![Expr::string("a < b")]));
        assert_eq!(compile(node), "$html .= \"a &lt; b\";\n");
    }

    #[test]
    fn test_text_markers() {
        let node = ANode::text(Expr::text(vec![Expr::interp(Expr::path(&["n"]), vec![])]).with_original());
        assert_eq!(
            compile(node.clone()),
            "$html .= \"<!--s-text-->\";\n\
             $html .= _::output($ctx->data[\"n\"], true);\n\
             $html .= \"<!--/s-text-->\";\n"
        );

        let options = CompileOptions {
            ssr_only: true,
            ..Default::default()
        };
        assert_eq!(
            compile_with(&options, ComponentInfo::new("default", 0), &node, false),
            "$html .= _::output($ctx->data[\"n\"], true);\n"
        );
    }

    #[test]
    fn test_if_chain() {
        let el = AElement::new("p")
            .with_if(Expr::path(&["a"]))
            .with_else_branch(AElement::new("b").with_elif(Expr::path(&["b"])))
            .with_else_branch(AElement::new("i").with_else());
        assert_eq!(
            compile(el),
            "if ($ctx->data[\"a\"]) {\n    \
             $html .= \"<p></p>\";\n\
             }\n\
             else if ($ctx->data[\"b\"]) {\n    \
             $html .= \"<b></b>\";\n\
             }\n\
             else {\n    \
             $html .= \"<i></i>\";\n\
             }\n"
        );
    }

    #[test]
    fn test_for_with_index() {
        let el = AElement::new("li")
            .with_for("item", Some("i"), Expr::path(&["list"]))
            .with_child(ANode::text(Expr::interp(Expr::path(&["item"]), vec![])));
        assert_eq!(
            compile(el),
            "$sanssrId0 = $ctx->data[\"list\"];\n\
             if (is_array($sanssrId0) || is_object($sanssrId0)) {\n    \
             foreach ($sanssrId0 as $sanssrId1 => $sanssrId2) {\n        \
             $ctx->data[\"i\"] = $sanssrId1;\n        \
             $ctx->data[\"item\"] = $sanssrId2;\n        \
             $html .= \"<li>\";\n        \
             $html .= _::output($ctx->data[\"item\"], true);\n        \
             $html .= \"</li>\";\n    \
             }\n\
             }\n"
        );
    }

    #[test]
    fn test_for_without_index() {
        let el = AElement::new("li").with_for("item", None, Expr::path(&["list"]));
        let code = compile(el);
        assert!(code.contains("foreach ($sanssrId0 as $sanssrId1) {"));
        assert!(!code.contains("=> $"));
    }

    #[test]
    fn test_if_before_for() {
        let el = AElement::new("li")
            .with_if(Expr::path(&["show"]))
            .with_for("item", None, Expr::path(&["list"]));
        let code = compile(el);
        let if_at = code.find("if ($ctx->data[\"show\"])").unwrap();
        let for_at = code.find("foreach").unwrap();
        assert!(if_at < for_at);
    }

    #[test]
    fn test_template_and_fragment() {
        let template = AElement::new("template").with_child(AElement::new("b"));
        assert_eq!(compile(template), "$html .= \"<b></b>\";\n");

        let fragment = AElement::new("fragment")
            .with_child(ANode::text(Expr::string("x")))
            .with_child(AElement::new("b"));
        assert_eq!(compile(fragment), "$html .= \"<!--s-frag-->x<b></b>\";\n");
    }

    #[test]
    fn test_fragment_closing_marker() {
        let fragment = AElement::new("fragment")
            .with_child(AElement::new("b"))
            .with_child(ANode::text(Expr::string("y")));
        assert_eq!(compile(fragment.clone()), "$html .= \"<b></b>y<!--/s-frag-->\";\n");

        let wrapped = AElement::new("fragment")
            .with_child(ANode::text(Expr::string("x")))
            .with_child(ANode::text(Expr::string("y")));
        assert_eq!(compile(wrapped), "$html .= \"<!--s-frag-->xy<!--/s-frag-->\";\n");

        let options = CompileOptions {
            ssr_only: true,
            ..Default::default()
        };
        assert_eq!(
            compile_with(&options, ComponentInfo::new("default", 0), &fragment.into(), false),
            "$html .= \"<b></b>y\";\n"
        );
    }

    #[test]
    fn test_root_data_comment() {
        let options = CompileOptions::default();
        let node = ANode::from(AElement::new("div"));
        assert_eq!(
            compile_with(&options, ComponentInfo::new("default", 0), &node, true),
            "$html .= \"<div>\";\n\
             if (!$noDataOutput) {\n    \
             $html .= \"<!--s-data:\" . _::json_encode($ctx->data) . \"-->\";\n\
             }\n\
             $html .= \"</div>\";\n"
        );
    }

    #[test]
    fn test_html_directive() {
        let el = AElement::new("div").with_html(Expr::path(&["raw"]));
        assert_eq!(
            compile(el),
            "$html .= \"<div>\";\n\
             $html .= _::output($ctx->data[\"raw\"], false);\n\
             $html .= \"</div>\";\n"
        );
    }

    #[test]
    fn test_slot() {
        let el = AElement::new("slot").with_child(ANode::text(Expr::string("fallback")));
        assert_eq!(
            compile(el),
            "if (!isset($ctx->slotRenderers[\"sanssrId0\"])) {\n    \
             $ctx->slotRenderers[\"sanssrId0\"] = function () use (&$ctx, &$html) {\n        \
             $defaultSlotRender = function ($ctx) {\n            \
             $html = \"\";\n            \
             $html .= \"fallback\";\n            \
             return $html;\n        \
             };\n        \
             $slotName = \"\";\n        \
             $isInserted = isset($ctx->slots[$slotName]);\n        \
             $slotRender = $isInserted ? $ctx->slots[$slotName] : $defaultSlotRender;\n        \
             $slotCtx = $isInserted ? $ctx->owner : $ctx;\n        \
             $html .= $slotRender($slotCtx);\n    \
             };\n\
             }\n\
             call_user_func($ctx->slotRenderers[\"sanssrId0\"]);\n"
        );
    }

    #[test]
    fn test_scoped_slot() {
        let el = AElement::new("slot")
            .with_prop("name", Expr::string("row"))
            .with_var("n", Expr::path(&["num"]));
        let code = compile(el);
        assert!(code.contains("$slotName = \"row\";"));
        assert!(code.contains("$slotCtx = (object)["));
        assert!(code.contains("$slotCtx->data[\"n\"] = $ctx->data[\"num\"];"));
    }

    #[test]
    fn test_slot_bind() {
        let el = AElement::new("slot").with_bind(Expr::path(&["o"]));
        let code = compile(el);
        let copy_at = code.find("$slotCtx = (object)[").unwrap();
        let extend_at = code
            .find("        _::extend($slotCtx->data, $ctx->data[\"o\"]);\n")
            .unwrap();
        let render_at = code.find("$html .= $slotRender($slotCtx);").unwrap();
        assert!(copy_at < extend_at);
        assert!(extend_at < render_at);
    }

    #[test]
    fn test_child_component() {
        let info = ComponentInfo::new("default", 0)
            .with_child_component("x-item", ComponentReference::new("./item", "default"));
        let el = AElement::new("x-item")
            .with_prop("item-title", Expr::path(&["t"]))
            .with_child(AElement::new("b").with_prop("slot", Expr::string("head")))
            .with_child(ANode::text(Expr::string("body")));
        assert_eq!(
            compile_with(&CompileOptions::default(), info, &el.into(), true),
            "$childSlots = [];\n\
             $childSlots[\"\"] = function ($ctx) {\n    \
             $html = \"\";\n    \
             $html .= \"body\";\n    \
             return $html;\n\
             };\n\
             $childSlots[\"head\"] = function ($ctx) {\n    \
             $html = \"\";\n    \
             $html .= \"<b></b>\";\n    \
             return $html;\n\
             };\n\
             $html .= \\san\\item\\render([\"itemTitle\" => $ctx->data[\"t\"]], $noDataOutput, $ctx, \"x-item\", $childSlots);\n\
             $childSlots = null;\n"
        );
    }

    #[test]
    fn test_child_component_bind() {
        let info = ComponentInfo::new("default", 0)
            .with_child_component("x-b", ComponentReference::local("1"));
        let file_info = ComponentInfo::new("1", 1);
        let file = SanSourceFile::new("/proj/src/a.san", vec![info, file_info]);
        let options = CompileOptions::default();
        let references = ReferenceCompiler::new(&options, Utf8Path::new("/proj/src"), &file);
        let stringifier = Stringifier::new("san\\runtime");
        let mut cx = CodegenContext::new(&options, &file.components[0], &references, &stringifier);
        let mut emitter = PhpEmitter::new();
        let node = ANode::from(AElement::new("x-b").with_bind(Expr::path(&["o"])));
        compile_node(&mut emitter, &node, &mut cx, false).unwrap();
        assert!(emitter.finish().contains(
            "$html .= \\san\\a\\render1(_::combine($ctx->data[\"o\"], []), true, $ctx, \"x-b\", $childSlots);"
        ));
    }
}
