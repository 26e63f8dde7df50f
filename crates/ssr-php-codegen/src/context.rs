//! Code generation context.

use san_anode::ComponentInfo;

use crate::expr::ExprCompiler;
use crate::helpers::ID_PREFIX;
use crate::options::CompileOptions;
use crate::reference::ReferenceCompiler;
use crate::stringifier::Stringifier;

/// State for compiling the template of one component.
pub struct CodegenContext<'a> {
    /// Compiler options.
    pub options: &'a CompileOptions,
    /// The component being compiled.
    pub info: &'a ComponentInfo,
    /// Resolver for child component references.
    pub references: &'a ReferenceCompiler<'a>,
    /// Expression compiler bound to this component's filters.
    pub exprs: ExprCompiler<'a>,
    /// Counter for generating unique names.
    counter: u32,
}

impl<'a> CodegenContext<'a> {
    /// Create a new code generation context.
    pub fn new(
        options: &'a CompileOptions,
        info: &'a ComponentInfo,
        references: &'a ReferenceCompiler<'a>,
        stringifier: &'a Stringifier,
    ) -> Self {
        Self {
            options,
            info,
            references,
            exprs: ExprCompiler::new(stringifier).with_filters(&info.filter_names),
            counter: 0,
        }
    }

    /// Generate a unique identifier, `sanssrId0`, `sanssrId1`, ...
    pub fn next_id(&mut self) -> String {
        let id = format!("{}{}", ID_PREFIX, self.counter);
        self.counter += 1;
        id
    }

    /// Whether reconciliation markers are left out.
    pub fn ssr_only(&self) -> bool {
        self.options.ssr_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;
    use san_anode::SanSourceFile;

    #[test]
    fn test_next_id() {
        let options = CompileOptions::default();
        let file = SanSourceFile::new("/a.san", vec![ComponentInfo::new("default", 0)]);
        let references = ReferenceCompiler::new(&options, Utf8Path::new("/"), &file);
        let stringifier = Stringifier::new("san\\runtime");
        let mut cx = CodegenContext::new(&options, &file.components[0], &references, &stringifier);
        assert_eq!(cx.next_id(), "sanssrId0");
        assert_eq!(cx.next_id(), "sanssrId1");
    }
}
