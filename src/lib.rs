pub mod ast;
pub mod ast_printer;
pub mod callable;
pub mod class;
pub mod environment;
pub mod error;
pub mod function;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;

use std::io::Write;

use log::info;

use ast::{ExprIdGen, Stmt};
use error::{Diagnostics, LoxError, Result};
use interpreter::Interpreter;
use parser::{Parser, ParserOptions};
use resolver::Resolver;

/// One interpreter session: scan → parse → resolve → interpret.
///
/// Globals, functions and classes persist across [`Lox::run`] calls, which is
/// what the REPL relies on.  Compile diagnostics do not: every call starts
/// with an empty [`Diagnostics`].
pub struct Lox {
    interpreter: Interpreter,
    ids: ExprIdGen,
    options: ParserOptions,
}

impl Lox {
    pub fn new() -> Self {
        Self::from_interpreter(Interpreter::new())
    }

    /// Session whose `print` output goes to `out` instead of stdout.
    pub fn with_output<W: Write + 'static>(out: W) -> Self {
        Self::from_interpreter(Interpreter::with_output(out))
    }

    fn from_interpreter(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            ids: ExprIdGen::new(),
            options: ParserOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Scans, parses and resolves `source`.  Resolution is skipped when
    /// parsing already failed, so its errors never pile onto syntax errors.
    pub fn compile(&mut self, source: &str) -> Result<Vec<Stmt>> {
        let mut diagnostics = Diagnostics::new();

        let tokens = scanner::scan_tokens(source, &mut diagnostics);

        let statements = Parser::new(&tokens, &mut self.ids, &mut diagnostics)
            .with_options(self.options)
            .parse();

        if !diagnostics.had_error() {
            Resolver::new(&mut self.interpreter, &mut diagnostics).resolve(&statements);
        }

        if diagnostics.had_error() {
            return Err(LoxError::Compile(diagnostics.into_errors()));
        }

        Ok(statements)
    }

    /// Compiles and, if that succeeded, executes `source`.
    pub fn run(&mut self, source: &str) -> Result<()> {
        let statements = self.compile(source)?;

        info!("Running {} statement(s)", statements.len());

        self.interpreter.interpret(&statements)?;

        Ok(())
    }
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses `source` on its own, without resolving or running it.
pub fn parse(source: &str, options: ParserOptions) -> (Vec<Stmt>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let mut ids = ExprIdGen::new();

    let tokens = scanner::scan_tokens(source, &mut diagnostics);
    let statements = Parser::new(&tokens, &mut ids, &mut diagnostics)
        .with_options(options)
        .parse();

    (statements, diagnostics)
}
