//! Render function of one component.

use php_emitter::{string_literal, PhpEmitter};
use san_anode::{ComponentInfo, InitData};

use crate::anode::compile_node;
use crate::context::CodegenContext;
use crate::error::CompileResult;
use crate::helpers::RENDER_ARGS;
use crate::reference::render_function_name;

/// Write `function render<id>(...) { ... }` for the component of `cx`.
pub fn compile_renderer(emitter: &mut PhpEmitter, cx: &mut CodegenContext) -> CompileResult<()> {
    let info = cx.info;
    log::debug!("compile renderer for component {}", info.id);

    emitter.carriage_return();
    emitter.write_function(&render_function_name(&info.id), RENDER_ARGS, &[], |e| -> CompileResult<()> {
        let Some(root) = &info.root else {
            e.write_line("return \"\";");
            return Ok(());
        };

        e.write_if("is_object($data)", |e| e.write_line("$data = (array)$data;"));
        e.write_line("$html = \"\";");
        compile_context(e, info, cx)?;
        compile_node(e, root, cx, true)?;
        e.write_line("return $html;");
        Ok(())
    })?;
    emitter.carriage_return();
    Ok(())
}

/// Build `$ctx`, fill in default data and run the `inited` hook.
fn compile_context(emitter: &mut PhpEmitter, info: &ComponentInfo, cx: &CodegenContext) -> CompileResult<()> {
    let computed_names = info
        .computed_names
        .iter()
        .map(|name| string_literal(name))
        .collect::<Vec<_>>();

    emitter.write_line("$ctx = (object)[];");
    emitter.write_line(&format!("$ctx->computedNames = [{}];", computed_names.join(", ")));
    emitter.write_line(&format!("$ctx->sanssrCid = {};", info.cid));
    emitter.write_line("$ctx->slots = $slots;");
    emitter.write_line("$ctx->owner = $parentCtx;");
    emitter.write_line("$ctx->slotRenderers = [];");
    emitter.write_line("$ctx->data = &$data;");
    emitter.write_line("$ctx->instance = _::createComponent($ctx);");

    match &info.init_data {
        Some(InitData::Static(defaults)) => {
            let stringifier = cx.exprs.stringifier();
            for (key, value) in defaults {
                let slot = format!("$ctx->data[{}]", string_literal(key));
                emitter.write_line(&format!(
                    "{} = isset({}) ? {} : {};",
                    slot,
                    slot,
                    slot,
                    stringifier.any(value)?
                ));
            }
        }
        // `setDefaultData` returns the merged copy, or null without `initData`
        Some(InitData::Dynamic) => emitter.write_line("_::extend($ctx->data, _::setDefaultData($ctx));"),
        None => {}
    }

    if info.has_inited {
        emitter.write_line("$ctx->instance->inited();");
    }

    if !info.computed_names.is_empty() {
        emitter.write_foreach("$ctx->computedNames as $computedName", |e| {
            e.write_line("$ctx->data[$computedName] = _::callComputed($ctx, $computedName);");
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompileOptions;
    use crate::reference::ReferenceCompiler;
    use crate::stringifier::Stringifier;
    use camino::Utf8Path;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use san_anode::{AElement, ConstValue, SanSourceFile};

    fn render(info: ComponentInfo) -> String {
        let options = CompileOptions::default();
        let file = SanSourceFile::new("/proj/a.san", vec![info]);
        let references = ReferenceCompiler::new(&options, Utf8Path::new("/proj"), &file);
        let stringifier = Stringifier::new("san\\runtime");
        let mut cx = CodegenContext::new(&options, &file.components[0], &references, &stringifier);
        let mut emitter = PhpEmitter::new();
        compile_renderer(&mut emitter, &mut cx).unwrap();
        emitter.finish()
    }

    #[test]
    fn test_empty_component() {
        assert_eq!(
            render(ComponentInfo::new("3", 0)),
            "function render3($data = [], $noDataOutput = false, $parentCtx = [], $tagName = \"div\", $slots = []) {\n    \
             return \"\";\n\
             }\n"
        );
    }

    #[test]
    fn test_static_init_data() {
        let mut defaults = IndexMap::new();
        defaults.insert("title".to_string(), ConstValue::from("hi"));
        let mut info = ComponentInfo::new("default", 2).with_root(AElement::new("div"));
        info.init_data = Some(InitData::Static(defaults));
        info.has_inited = true;

        let code = render(info);
        assert!(code.starts_with("function render($data = []"));
        assert!(code.contains(
            "    $ctx->data[\"title\"] = isset($ctx->data[\"title\"]) ? $ctx->data[\"title\"] : \"hi\";\n"
        ));
        assert!(code.contains("    $ctx->sanssrCid = 2;\n"));
        assert!(code.contains("    $ctx->instance->inited();\n"));
        assert!(!code.contains("callComputed"));
        assert!(code.ends_with("    return $html;\n}\n"));
    }

    #[test]
    fn test_dynamic_init_data() {
        let mut info = ComponentInfo::new("default", 0).with_root(AElement::new("div"));
        info.init_data = Some(InitData::Dynamic);
        info.computed_names = vec!["full".into()];

        let code = render(info);
        assert!(code.contains("    _::extend($ctx->data, _::setDefaultData($ctx));\n"));
        let defaults_at = code.find("_::setDefaultData($ctx)").unwrap();
        let computed_at = code.find("_::callComputed($ctx, $computedName)").unwrap();
        assert!(defaults_at < computed_at);
        assert!(code.contains("$ctx->computedNames = [\"full\"];"));
    }
}
