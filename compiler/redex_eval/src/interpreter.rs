//! The statement interpreter.

use std::rc::Rc;

use redex_ir::code::{BinaryOp, Callee, Expr, Lit, Module, Operand, Stmt};
use redex_ir::{Symbol, Term};
use redex_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;

use crate::diagnostics::{CallStack, CallStats};
use crate::errors::{invalid_binary_op, type_mismatch, wrong_arg_count, EvalError, EvalResult};
use crate::foreign::ForeignRegistry;
use crate::print_handler::{stdout_handler, SharedPrintHandler};
use crate::runtime_calls::call_runtime;
use crate::Value;

/// Default recursion limit for generated code.
const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Interpreter settings.
pub struct InterpreterConfig {
    pub print: SharedPrintHandler,
    pub foreign: ForeignRegistry,
    /// `None` for unlimited.
    pub max_depth: Option<usize>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            print: stdout_handler(),
            foreign: ForeignRegistry::new(),
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

struct Function {
    params: Vec<Symbol>,
    body: Vec<Stmt>,
}

/// How a block finished.
enum Flow {
    Normal,
    Break,
    Return(Value),
}

/// Executes one compiled module.
pub struct Interpreter {
    functions: FxHashMap<Symbol, Rc<Function>>,
    globals: FxHashMap<Symbol, Value>,
    print: SharedPrintHandler,
    foreign: ForeignRegistry,
    stack: CallStack,
    stats: CallStats,
}

impl Interpreter {
    /// Load `module` with the default configuration.
    pub fn new(module: &Module) -> EvalResult<Self> {
        Interpreter::with_config(module, InterpreterConfig::default())
    }

    /// Load `module`: register its functions and run its module-level
    /// statements (hoisted constants) once.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn with_config(module: &Module, config: InterpreterConfig) -> EvalResult<Self> {
        let mut interpreter = Interpreter {
            functions: FxHashMap::default(),
            globals: FxHashMap::default(),
            print: config.print,
            foreign: config.foreign,
            stack: CallStack::new(config.max_depth),
            stats: CallStats::default(),
        };
        let mut top_level = Vec::new();
        for stmt in &module.body {
            match stmt {
                Stmt::FunctionDef { name, params, body } => {
                    interpreter.functions.insert(
                        name.clone(),
                        Rc::new(Function {
                            params: params.clone(),
                            body: body.clone(),
                        }),
                    );
                }
                other => top_level.push(other.clone()),
            }
        }
        let mut globals = FxHashMap::default();
        match interpreter.exec_block(&top_level, &mut globals)? {
            Flow::Normal => {}
            Flow::Break => return Err(EvalError::BreakOutsideLoop),
            Flow::Return(_) => {}
        }
        interpreter.globals = globals;
        tracing::debug!(
            functions = interpreter.functions.len(),
            globals = interpreter.globals.len(),
            "module loaded"
        );
        Ok(interpreter)
    }

    /// Call a module or foreign function by name.
    pub fn call(&mut self, name: &str, args: Vec<Value>) -> EvalResult<Value> {
        self.call_function(&Symbol::new(name), args)
    }

    /// Call a one-argument function on a term, e.g. a matcher or relation.
    pub fn call_on_term(&mut self, name: &str, term: Term) -> EvalResult<Value> {
        self.call(name, vec![Value::Term(term)])
    }

    pub fn stats(&self) -> &CallStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(&Symbol::new(name))
    }

    /// Captured output of a buffer print handler.
    pub fn output(&self) -> String {
        self.print.get_output()
    }

    // ── Calls ───────────────────────────────────────────────────────

    fn call_function(&mut self, name: &Symbol, args: Vec<Value>) -> EvalResult<Value> {
        let Some(function) = self.functions.get(name).cloned() else {
            return self.call_foreign(name, &args);
        };
        if function.params.len() != args.len() {
            return Err(wrong_arg_count(name.as_str(), function.params.len(), args.len()));
        }
        self.stats.record(name);
        self.stack.push(name.clone())?;
        tracing::trace!(function = %name, depth = self.stack.depth(), "call");

        let mut locals: FxHashMap<Symbol, Value> = function.params.iter().cloned().zip(args).collect();
        let flow = ensure_sufficient_stack(|| self.exec_block(&function.body, &mut locals));
        self.stack.pop();
        match flow? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::None),
            Flow::Break => Err(EvalError::BreakOutsideLoop),
        }
    }

    fn call_foreign(&mut self, name: &Symbol, args: &[Value]) -> EvalResult<Value> {
        let Some(function) = self.foreign.get(name).cloned() else {
            return Err(EvalError::UnknownFunction(name.as_str().to_owned()));
        };
        self.stats.record(name);
        let terms = args
            .iter()
            .map(|arg| arg.as_term().cloned())
            .collect::<EvalResult<Vec<Term>>>()?;
        function(&terms)
            .map(Value::Term)
            .map_err(|message| EvalError::Foreign {
                function: name.as_str().to_owned(),
                message,
            })
    }

    // ── Statements ──────────────────────────────────────────────────

    fn exec_block(&mut self, body: &[Stmt], locals: &mut FxHashMap<Symbol, Value>) -> EvalResult<Flow> {
        for stmt in body {
            match self.exec(stmt, locals)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&mut self, stmt: &Stmt, locals: &mut FxHashMap<Symbol, Value>) -> EvalResult<Flow> {
        match stmt {
            Stmt::FunctionDef { name, params, body } => {
                self.functions.insert(
                    name.clone(),
                    Rc::new(Function {
                        params: params.clone(),
                        body: body.clone(),
                    }),
                );
            }
            Stmt::Assign { target, value } => {
                let value = self.eval(value, locals)?;
                locals.insert(target.clone(), value);
            }
            Stmt::If {
                condition,
                then_body,
                else_body,
            } => {
                let branch = if self.operand(condition, locals)?.as_bool()? {
                    then_body
                } else {
                    else_body
                };
                return self.exec_block(branch, locals);
            }
            Stmt::ForEach {
                targets,
                iterable,
                body,
            } => {
                let items = self.lookup(iterable, locals)?.as_list()?.borrow().clone();
                for item in items {
                    bind_targets(targets, item, locals)?;
                    match self.exec_block(body, locals)? {
                        Flow::Normal => {}
                        Flow::Break => break,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
            }
            Stmt::ForRange {
                target,
                start,
                end,
                body,
            } => {
                let start = self.operand(start, locals)?.as_int()?;
                let end = self.operand(end, locals)?.as_int()?;
                for index in start..end {
                    locals.insert(target.clone(), Value::Int(index));
                    match self.exec_block(body, locals)? {
                        Flow::Normal => {}
                        Flow::Break => break,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
            }
            Stmt::While { condition, body } => {
                while self.lookup(condition, locals)?.as_bool()? {
                    match self.exec_block(body, locals)? {
                        Flow::Normal => {}
                        Flow::Break => break,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
            }
            Stmt::Break => return Ok(Flow::Break),
            Stmt::Return(value) => return Ok(Flow::Return(self.operand(value, locals)?)),
            Stmt::Raise(value) => {
                let message = self.operand(value, locals)?.to_string();
                tracing::debug!(%message, frames = ?self.stack.frames(), "raise");
                return Err(EvalError::Raised(message));
            }
            Stmt::Print(value) => {
                let text = self.operand(value, locals)?.to_string();
                self.print.println(&text);
            }
            Stmt::Expr(expr) => {
                self.eval(expr, locals)?;
            }
        }
        Ok(Flow::Normal)
    }

    // ── Expressions ─────────────────────────────────────────────────

    fn eval(&mut self, expr: &Expr, locals: &FxHashMap<Symbol, Value>) -> EvalResult<Value> {
        match expr {
            Expr::Operand(operand) => self.operand(operand, locals),
            Expr::Call { callee, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.operand(arg, locals))
                    .collect::<EvalResult<Vec<_>>>()?;
                match callee {
                    Callee::Runtime(function) => call_runtime(*function, &args),
                    Callee::Function(name) => self.call_function(name, args),
                }
            }
            Expr::Field { base, index } => {
                let pair = self.lookup(base, locals)?;
                let (first, second) = pair.as_pair()?;
                match index {
                    0 => Ok(first.clone()),
                    1 => Ok(second.clone()),
                    _ => Err(EvalError::Runtime(redex_runtime::RuntimeError::IndexOutOfBounds {
                        index: *index,
                        len: 2,
                    })),
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.operand(lhs, locals)?;
                let rhs = self.operand(rhs, locals)?;
                binary(*op, &lhs, &rhs)
            }
        }
    }

    fn operand(&self, operand: &Operand, locals: &FxHashMap<Symbol, Value>) -> EvalResult<Value> {
        match operand {
            Operand::Var(name) => self.lookup(name, locals),
            Operand::Lit(Lit::None) => Ok(Value::None),
            Operand::Lit(Lit::Bool(b)) => Ok(Value::Bool(*b)),
            Operand::Lit(Lit::Int(n)) => Ok(Value::Int(*n)),
            Operand::Lit(Lit::Str(s)) => Ok(Value::Str(Rc::clone(s))),
        }
    }

    /// Locals shadow module-level constants.
    fn lookup(&self, name: &Symbol, locals: &FxHashMap<Symbol, Value>) -> EvalResult<Value> {
        locals
            .get(name)
            .or_else(|| self.globals.get(name))
            .cloned()
            .ok_or_else(|| EvalError::UndefinedVariable(name.as_str().to_owned()))
    }
}

fn bind_targets(targets: &[Symbol], item: Value, locals: &mut FxHashMap<Symbol, Value>) -> EvalResult<()> {
    match targets {
        [single] => {
            locals.insert(single.clone(), item);
        }
        [first, second] => {
            let (a, b) = item.as_pair()?;
            locals.insert(first.clone(), a.clone());
            locals.insert(second.clone(), b.clone());
        }
        _ => return Err(type_mismatch("one or two loop targets", &item)),
    }
    Ok(())
}

fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult<Value> {
    let invalid = || invalid_binary_op(op.as_str(), lhs, rhs);
    Ok(match (op, lhs, rhs) {
        (BinaryOp::Add, Value::Int(a), Value::Int(b)) => Value::Int(a.checked_add(*b).ok_or(EvalError::Overflow)?),
        (BinaryOp::Add, Value::Str(a), Value::Str(b)) => Value::Str(Rc::from(format!("{a}{b}"))),
        (BinaryOp::Sub, Value::Int(a), Value::Int(b)) => Value::Int(a.checked_sub(*b).ok_or(EvalError::Overflow)?),
        (BinaryOp::Lt, Value::Int(a), Value::Int(b)) => Value::Bool(a < b),
        (BinaryOp::Le, Value::Int(a), Value::Int(b)) => Value::Bool(a <= b),
        (BinaryOp::Gt, Value::Int(a), Value::Int(b)) => Value::Bool(a > b),
        (BinaryOp::Ge, Value::Int(a), Value::Int(b)) => Value::Bool(a >= b),
        (BinaryOp::Eq, _, _) => Value::Bool(lhs.same(rhs)),
        (BinaryOp::Ne, _, _) => Value::Bool(!lhs.same(rhs)),
        (BinaryOp::And, Value::Bool(a), Value::Bool(b)) => Value::Bool(*a && *b),
        (BinaryOp::Or, Value::Bool(a), Value::Bool(b)) => Value::Bool(*a || *b),
        _ => return Err(invalid()),
    })
}

#[cfg(test)]
mod tests;
