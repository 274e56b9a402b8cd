//! Statement execution and expression evaluation.
//!
//! The interpreter walks the tree depth first, left to right, against the
//! current frame of the scope chain. Every step returns [`Exec`]: a control
//! signal or an error travels up through `?` until a loop or a call absorbs
//! it, or until it leaves the program and becomes a [`RunError`].

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use smpl_types::ast::*;
use tracing::{debug, debug_span, trace, warn};

use crate::config::{CallErrorPolicy, EvalConfig};
use crate::console::{Console, StdConsole};
use crate::control::{Exec, Unwind};
use crate::error::{RunError, SemanticError};
use crate::function::{Function, FunctionKind};
use crate::literal::{parse_float, parse_int, parse_str};
use crate::operators;
use crate::scope::Scope;
use crate::stack::ensure_sufficient_stack;
use crate::value::{ListValue, Value};

/// Run `program` against `globals` with process stdio and the default
/// configuration.
pub fn execute(program: &Program, globals: Scope) -> Result<(), RunError> {
    Interpreter::new(globals, Rc::new(StdConsole::new())).run(program)
}

/// The tree-walking evaluator.
pub struct Interpreter {
    /// Frame that name lookups and bindings start from.
    pub(crate) scope: Scope,
    globals: Scope,
    config: EvalConfig,
    console: Rc<dyn Console>,
    /// Parsed values of literal nodes, by node.
    literals: FxHashMap<NodeId, Value>,
    /// The list each list literal node refills.
    lists: FxHashMap<NodeId, Rc<ListValue>>,
    /// Function definitions that have executed at least once.
    defined: FxHashSet<NodeId>,
    /// Closure calls currently executing.
    depth: usize,
}

impl Interpreter {
    pub fn new(globals: Scope, console: Rc<dyn Console>) -> Self {
        Self {
            scope: globals.clone(),
            globals,
            config: EvalConfig::default(),
            console,
            literals: FxHashMap::default(),
            lists: FxHashMap::default(),
            defined: FxHashSet::default(),
            depth: 0,
        }
    }

    pub fn with_config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn globals(&self) -> &Scope {
        &self.globals
    }

    /// The current frame.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn console(&self) -> &Rc<dyn Console> {
        &self.console
    }

    /// Execute a whole program in the global frame.
    pub fn run(&mut self, program: &Program) -> Result<(), RunError> {
        let _span = debug_span!("run", stmts = program.stmts.len()).entered();
        // Node ids are only unique within one program.
        self.literals.clear();
        self.lists.clear();
        self.defined.clear();
        self.depth = 0;
        self.scope = self.globals.clone();

        let result = self.exec_all(&program.stmts).map_err(RunError::from);
        if let Err(err) = &result {
            debug!(error = %err, "program failed");
        }
        result
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    pub fn exec(&mut self, stmt: &Stmt) -> Exec<()> {
        ensure_sufficient_stack(|| self.exec_inner(stmt))
    }

    fn exec_inner(&mut self, stmt: &Stmt) -> Exec<()> {
        match stmt {
            Stmt::Expr(s) => {
                self.eval(&s.expr)?;
                Ok(())
            }
            Stmt::Assign(s) => self.exec_assign(s),
            Stmt::PropAssign(s) => {
                let target = self.eval(&s.target)?;
                let value = self.eval(&s.value)?;
                target.set_property(&s.property.name, value)?;
                Ok(())
            }
            Stmt::FnDef(def) => self.exec_fn_def(def),
            Stmt::If(s) => {
                if self.eval(&s.condition)?.is_truthy() {
                    self.exec(&s.then_branch)
                } else if let Some(else_branch) = &s.else_branch {
                    self.exec(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While(s) => self.exec_while(s),
            Stmt::For(s) => self.exec_for(s),
            Stmt::Break(_) => Err(Unwind::Break),
            Stmt::Continue(_) => Err(Unwind::Continue),
            Stmt::Return(s) => {
                let value = match &s.value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Null,
                };
                Err(Unwind::Return(value))
            }
            Stmt::Write(s) => {
                let value = self.eval(&s.value)?;
                self.console.print(&value.to_string());
                Ok(())
            }
            Stmt::Block(block) => self.exec_block(block),
        }
    }

    fn exec_all(&mut self, stmts: &[Stmt]) -> Exec<()> {
        for stmt in stmts {
            self.exec(stmt)?;
        }
        Ok(())
    }

    fn exec_block(&mut self, block: &Block) -> Exec<()> {
        let frame = self.scope.child();
        trace!(depth = frame.depth(), "enter block");
        self.with_frame(frame, |inner| inner.exec_all(&block.stmts))
    }

    fn exec_assign(&mut self, stmt: &AssignStmt) -> Exec<()> {
        let scope = self.scope.clone();
        scope.write(&stmt.name.name, || self.eval(&stmt.value))
    }

    fn exec_fn_def(&mut self, def: &FnDef) -> Exec<()> {
        let name = &def.name.name;
        if !self.defined.contains(&def.id) {
            if self.scope.get_local(name).is_some() {
                return Err(SemanticError::FunctionExists(name.clone()).into());
            }
            self.defined.insert(def.id);
        }
        let closure = Value::closure(name.as_str(), self.scope.clone(), Rc::clone(&def.decl));
        self.scope.define(name, closure);
        Ok(())
    }

    fn exec_while(&mut self, stmt: &WhileStmt) -> Exec<()> {
        while self.eval(&stmt.condition)?.is_truthy() {
            match self.exec(&stmt.body) {
                Ok(()) | Err(Unwind::Continue) => {}
                Err(Unwind::Break) => break,
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    fn exec_for(&mut self, stmt: &ForStmt) -> Exec<()> {
        self.exec(&stmt.init)?;
        while self.eval(&stmt.test)?.is_truthy() {
            match self.exec(&stmt.body) {
                Ok(()) | Err(Unwind::Continue) => {}
                Err(Unwind::Break) => break,
                Err(other) => return Err(other),
            }
            self.exec(&stmt.increment)?;
        }
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    pub fn eval(&mut self, expr: &Expr) -> Exec<Value> {
        ensure_sufficient_stack(|| self.eval_inner(expr))
    }

    fn eval_inner(&mut self, expr: &Expr) -> Exec<Value> {
        match &expr.kind {
            ExprKind::Int { id, raw } => self.literal(*id, || parse_int(raw)),
            ExprKind::Float { id, raw } => self.literal(*id, || parse_float(raw)),
            ExprKind::Str { id, raw } => self.literal(*id, || parse_str(raw)),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::List { id, items } => self.eval_list(*id, items),
            ExprKind::New(props) => self.eval_new(props),

            ExprKind::Identifier(name) => Ok(self.scope.read(name)?),
            ExprKind::Property { target, name } => {
                let target = self.eval(target)?;
                let value = target
                    .property(&name.name)
                    .ok_or_else(|| SemanticError::UndefinedProperty(name.name.clone()))?;
                Ok(value)
            }
            ExprKind::Call { callee, args } => self.eval_call(callee, args),
            ExprKind::Lambda { decl } => {
                Ok(Value::closure("", self.scope.clone(), Rc::clone(decl)))
            }

            ExprKind::Binary { left, op, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(operators::binary(*op, &left, &right)?)
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.eval(operand)?;
                Ok(operators::unary(*op, &operand)?)
            }
            ExprKind::Logical { left, op, right } => {
                let left = self.eval(left)?;
                let decided = match op {
                    LogicalOp::And => !left.is_truthy(),
                    LogicalOp::Or => left.is_truthy(),
                };
                if decided {
                    Ok(left)
                } else {
                    self.eval(right)
                }
            }
            ExprKind::NullCoalesce { left, right } => {
                let left = self.eval(left)?;
                if left.is_null() {
                    self.eval(right)
                } else {
                    Ok(left)
                }
            }
        }
    }

    // ── Literals ──────────────────────────────────────────────────────────

    fn literal(
        &mut self,
        id: NodeId,
        parse: impl FnOnce() -> Result<Value, SemanticError>,
    ) -> Exec<Value> {
        if let Some(value) = self.literals.get(&id) {
            return Ok(value.clone());
        }
        let value = parse()?;
        self.literals.insert(id, value.clone());
        Ok(value)
    }

    /// Evaluating a list literal again empties and refills the same list, so
    /// every handle taken from an earlier evaluation sees the new contents.
    fn eval_list(&mut self, id: NodeId, elems: &[Expr]) -> Exec<Value> {
        let list = Rc::clone(
            self.lists
                .entry(id)
                .or_insert_with(|| ListValue::new(Vec::with_capacity(elems.len()))),
        );
        list.items_mut().clear();
        for elem in elems {
            let value = self.eval(elem)?;
            list.items_mut().push(value);
        }
        Ok(Value::List(list))
    }

    fn eval_new(&mut self, props: &[NewProp]) -> Exec<Value> {
        let object = Value::object();
        for prop in props {
            let value = self.eval(&prop.value)?;
            object.add_property(&prop.name.name, value)?;
        }
        Ok(object)
    }

    // ── Calls ─────────────────────────────────────────────────────────────

    fn eval_call(&mut self, callee: &Expr, args: &[Expr]) -> Exec<Value> {
        let function = match self.eval(callee)? {
            Value::Function(function) => function,
            other => return Err(SemanticError::expected("<fn>", &other).into()),
        };
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg)?);
        }
        self.call_function(&function, values)
    }

    /// Call a function value with already evaluated arguments.
    ///
    /// A closure body runs in a fresh frame whose parent is the scope the
    /// closure captured. `return` ends the call with its value; running off
    /// the end yields `null`. An error in the body is handled according to
    /// [`EvalConfig::call_errors`], and so is a call that would nest deeper
    /// than [`EvalConfig::max_call_depth`]. A native function's error always
    /// propagates.
    pub fn call_function(&mut self, function: &Function, args: Vec<Value>) -> Exec<Value> {
        if args.len() != function.arity() {
            return Err(SemanticError::ArityMismatch {
                expected: function.arity(),
                actual: args.len(),
            }
            .into());
        }

        match function.kind() {
            FunctionKind::Native(native) => Ok(native.invoke(&args)?),
            FunctionKind::Closure { scope, decl } => {
                if self.depth >= self.config.max_call_depth {
                    let err = SemanticError::CallDepthExceeded(self.config.max_call_depth);
                    return self.on_call_error(function, err);
                }
                let _span = debug_span!("call", function = function.name()).entered();
                let frame = scope.child();
                for (param, arg) in decl.params.iter().zip(args) {
                    frame.define(param, arg);
                }
                self.depth += 1;
                let outcome = self.with_frame(frame, |inner| inner.exec_all(&decl.body.stmts));
                self.depth -= 1;
                match outcome {
                    Ok(()) => Ok(Value::Null),
                    Err(Unwind::Return(value)) => Ok(value),
                    Err(Unwind::Break) => {
                        self.on_call_error(function, SemanticError::JumpOutsideLoop("Break"))
                    }
                    Err(Unwind::Continue) => {
                        self.on_call_error(function, SemanticError::JumpOutsideLoop("Continue"))
                    }
                    Err(Unwind::Error(err)) => self.on_call_error(function, err),
                }
            }
        }
    }

    fn on_call_error(&self, function: &Function, err: SemanticError) -> Exec<Value> {
        match self.config.call_errors {
            CallErrorPolicy::Propagate => Err(err.into()),
            CallErrorPolicy::Swallow => {
                warn!(function = function.name(), error = %err, "call failed, result is null");
                Ok(Value::Null)
            }
        }
    }
}
