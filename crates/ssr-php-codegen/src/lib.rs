//! San component templates to PHP render functions.
//!
//! Each source file becomes one PHP namespace holding a render function per
//! component. The functions build a render context, fill in default and
//! computed data and concatenate the HTML of the template into `$html`,
//! calling the helpers of the PHP runtime for everything decided at render
//! time.

pub mod anode;
pub mod context;
pub mod element;
pub mod error;
pub mod expr;
pub mod helpers;
pub mod namespace;
pub mod options;
pub mod reference;
pub mod renderer;
pub mod stringifier;

use camino::Utf8PathBuf;
use php_emitter::{string_literal, PhpEmitter};
use rayon::prelude::*;
use san_anode::SanSourceFile;

pub use context::CodegenContext;
pub use error::{CompileError, CompileResult, ConfigError};
pub use expr::{ExprCompiler, OutputMode};
pub use options::{CompileOptions, ModuleInfo};
pub use reference::{render_function_name, ReferenceCompiler};
pub use renderer::compile_renderer;
pub use stringifier::Stringifier;

/// Compiles source files with one set of options.
#[derive(Debug, Clone)]
pub struct Compiler {
    options: CompileOptions,
    root: Utf8PathBuf,
    stringifier: Stringifier,
}

impl Compiler {
    /// Create a compiler, checking the options.
    pub fn new(mut options: CompileOptions) -> CompileResult<Self> {
        let root = options.ns_root_dir.clone().ok_or(ConfigError::MissingRoot)?;
        options.ns_prefix = options.normalized_prefix();
        let stringifier = Stringifier::new(options.helpers_namespace());
        Ok(Self {
            options,
            root,
            stringifier,
        })
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a file into PHP source. Nothing is returned unless every
    /// component compiles.
    pub fn compile_file(&self, file: &SanSourceFile) -> CompileResult<String> {
        log::debug!("compile {}", file.path);
        let references = ReferenceCompiler::new(&self.options, &self.root, file);
        let helpers = self.options.helpers_namespace();
        let relative = namespace::relative_namespace(&self.root, &file.path);

        let mut emitter = PhpEmitter::with_header(self.options.emit_header, self.options.ns_prefix.as_str());
        emitter.write_namespace(&relative, |e| -> CompileResult<()> {
            e.write_line(&format!("use {}\\_;", helpers));

            for info in &file.components {
                if let Some(class_name) = &info.class_name {
                    e.write_line(&format!(
                        "\\{}\\ComponentRegistry::$comps[{}] = {};",
                        helpers,
                        info.cid,
                        string_literal(class_name)
                    ));
                }
            }

            for info in &file.components {
                let mut cx = CodegenContext::new(&self.options, info, &references, &self.stringifier);
                compile_renderer(e, &mut cx)?;
            }

            if let Some(entry) = file.entry_component() {
                let target = render_function_name(&entry.id);
                if target != self.options.render_function_name {
                    e.write_function(
                        &self.options.render_function_name,
                        &["$data = []", "$noDataOutput = false"],
                        &[],
                        |e| e.write_line(&format!("return {}($data, $noDataOutput);", target)),
                    );
                    e.carriage_return();
                }
            }
            Ok(())
        })?;

        Ok(emitter.finish())
    }

    /// Compile independent files in parallel. Results keep the input order.
    pub fn compile_files(&self, files: &[SanSourceFile]) -> Vec<CompileResult<String>> {
        log::debug!("compile {} files", files.len());
        files.par_iter().map(|file| self.compile_file(file)).collect()
    }
}
