//! Source text to compiled program.

use redex_codegen::{compile_spec, CompileOptions, Entry, Program};
use redex_diagnostic::Diagnostic;
use redex_eval::{EvalResult, Interpreter, InterpreterConfig};
use redex_ir::code::Module;

/// A compiled specification, ready to run.
#[derive(Clone, Debug)]
pub struct Compiled {
    pub program: Program,
}

impl Compiled {
    pub fn module(&self) -> &Module {
        &self.program.module
    }

    /// Entry points in source order.
    pub fn entries(&self) -> &[Entry] {
        &self.program.entries
    }

    /// Name of the generated function applying reduction relation `name`.
    pub fn relation_function(&self, name: &str) -> Option<&str> {
        self.program
            .relations
            .iter()
            .find(|(relation, _)| relation.as_str() == name)
            .map(|(_, function)| function.as_str())
    }

    /// Name of the generated function implementing metafunction `name`.
    pub fn metafunction_function(&self, name: &str) -> Option<&str> {
        self.program
            .metafunctions
            .iter()
            .find(|(metafunction, _)| metafunction.as_str() == name)
            .map(|(_, function)| function.as_str())
    }

    /// Load the module into a fresh interpreter.
    pub fn interpreter(&self, config: InterpreterConfig) -> EvalResult<Interpreter> {
        Interpreter::with_config(&self.program.module, config)
    }
}

/// Parse and compile one specification.
///
/// Stops at the first diagnostic.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn compile_source(source: &str, options: &CompileOptions) -> Result<Compiled, Diagnostic> {
    let spec = redex_parse::parse_spec(source)?;
    tracing::debug!(forms = spec.forms.len(), "parsed");
    let program = compile_spec(&spec, options)?;
    Ok(Compiled { program })
}
