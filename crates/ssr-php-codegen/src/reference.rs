//! Component references to fully qualified render function names.

use camino::{Utf8Path, Utf8PathBuf};
use rustc_hash::FxHashSet;
use san_anode::{ComponentReference, SanSourceFile, DEFAULT_ID};

use crate::error::{CompileError, CompileResult};
use crate::namespace::{get_namespace, normalize_namespace, resolve_from};
use crate::options::CompileOptions;

/// Name of the render function of component `id` within its namespace.
pub fn render_function_name(id: &str) -> String {
    if id == DEFAULT_ID {
        "render".to_string()
    } else {
        format!("render{}", id)
    }
}

/// Resolves references made from one source file.
#[derive(Debug)]
pub struct ReferenceCompiler<'a> {
    options: &'a CompileOptions,
    root: &'a Utf8Path,
    file_path: &'a Utf8Path,
    namespace: String,
    local_ids: FxHashSet<&'a str>,
}

impl<'a> ReferenceCompiler<'a> {
    pub fn new(options: &'a CompileOptions, root: &'a Utf8Path, file: &'a SanSourceFile) -> Self {
        Self {
            options,
            root,
            file_path: &file.path,
            namespace: get_namespace(&options.ns_prefix, root, &file.path),
            local_ids: file.components.iter().map(|c| c.id.as_str()).collect(),
        }
    }

    /// Namespace of the file being compiled.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `\<namespace>\render<id>` of the referenced component.
    pub fn compile_to_function_full_name(&self, reference: &ComponentReference) -> CompileResult<String> {
        let ns = self.get_namespace(reference)?;
        let name = render_function_name(&reference.id);
        if ns.is_empty() {
            Ok(format!("\\{}", name))
        } else {
            Ok(format!("\\{}\\{}", ns, name))
        }
    }

    fn get_namespace(&self, reference: &ComponentReference) -> CompileResult<String> {
        if let Some(ns) = self.options.module_namespace(&reference.specifier) {
            return Ok(normalize_namespace(ns));
        }
        if reference.is_local() {
            if !self.local_ids.contains(reference.id.as_str()) {
                return Err(self.unresolved(reference));
            }
            return Ok(self.namespace.clone());
        }
        if !reference.specifier.starts_with('.') {
            return Err(self.unresolved(reference));
        }
        let path = resolve_from(self.file_path, &reference.specifier);
        Ok(get_namespace(&self.options.ns_prefix, self.root, &path))
    }

    fn unresolved(&self, reference: &ComponentReference) -> CompileError {
        CompileError::UnresolvedComponent {
            file: Utf8PathBuf::from(self.file_path),
            specifier: reference.specifier.clone(),
            id: reference.id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ModuleInfo;
    use san_anode::ComponentInfo;

    fn file() -> SanSourceFile {
        SanSourceFile::new(
            "/proj/src/pages/home.san",
            vec![ComponentInfo::new("default", 1), ComponentInfo::new("0", 2)],
        )
    }

    #[test]
    fn test_function_names() {
        assert_eq!(render_function_name("default"), "render");
        assert_eq!(render_function_name("0"), "render0");
    }

    #[test]
    fn test_local_reference() {
        let options = CompileOptions::default();
        let file = file();
        let refs = ReferenceCompiler::new(&options, Utf8Path::new("/proj/src"), &file);
        assert_eq!(refs.namespace(), "san\\pages\\home");
        assert_eq!(
            refs.compile_to_function_full_name(&ComponentReference::local("0")).unwrap(),
            "\\san\\pages\\home\\render0"
        );
        assert!(matches!(
            refs.compile_to_function_full_name(&ComponentReference::local("9")),
            Err(CompileError::UnresolvedComponent { .. })
        ));
    }

    #[test]
    fn test_relative_reference() {
        let options = CompileOptions::default();
        let file = file();
        let refs = ReferenceCompiler::new(&options, Utf8Path::new("/proj/src"), &file);
        assert_eq!(
            refs.compile_to_function_full_name(&ComponentReference::new("../components/x-button.san", "default"))
                .unwrap(),
            "\\san\\components\\xButton\\render"
        );
    }

    #[test]
    fn test_module_override() {
        let mut options = CompileOptions::default();
        options.modules.insert(
            "@vendor/ui".into(),
            ModuleInfo {
                namespace: Some("\\vendor\\ui\\".into()),
            },
        );
        let file = file();
        let refs = ReferenceCompiler::new(&options, Utf8Path::new("/proj/src"), &file);
        assert_eq!(
            refs.compile_to_function_full_name(&ComponentReference::new("@vendor/ui", "Button"))
                .unwrap(),
            "\\vendor\\ui\\renderButton"
        );
        assert!(refs
            .compile_to_function_full_name(&ComponentReference::new("@vendor/other", "default"))
            .is_err());
    }

    #[test]
    fn test_module_override_keeps_spelling() {
        let mut options = CompileOptions::default();
        options.modules.insert(
            "@vendor/ui".into(),
            ModuleInfo {
                namespace: Some("\\Vendor\\my_ui\\".into()),
            },
        );
        let file = file();
        let refs = ReferenceCompiler::new(&options, Utf8Path::new("/proj/src"), &file);
        assert_eq!(
            refs.compile_to_function_full_name(&ComponentReference::new("@vendor/ui", "default"))
                .unwrap(),
            "\\Vendor\\my_ui\\render"
        );
    }
}
