//! Centralised error hierarchy for the interpreter.
//!
//! Compile‑time problems (scanner, parser, resolver) are [`CompileError`]s and
//! are *accumulated* in a [`Diagnostics`] collector rather than thrown across
//! the pipeline.  Runtime failures are [`RuntimeError`]s and unwind to the top
//! of the current `interpret` call.  [`LoxError`] is what a whole run hands
//! back to its caller.
//!
//! The module **does not** print diagnostics itself.

use std::io;
use thiserror::Error;

use log::debug;

use crate::token::{Location, Token};

/// Grammar, lexing, or static‑analysis failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// Lexical (scanner) error.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,

        column: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        line: usize,
        column: usize,

        /// ` at 'lexeme'` or ` at end`.
        location: String,
    },

    /// Resolution failure (bad `return`, self‑referencing initializer, ...).
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        line: usize,
        column: usize,
        location: String,
    },
}

fn where_at(token: &Token) -> String {
    if token.is_eof() {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

impl CompileError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, column: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Lex error: line={}, msg={}", line, message);

        CompileError::Lex {
            message,
            line,
            column,
        }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Parse error: line={}, msg={}", token.line, message);

        CompileError::Parse {
            message,
            line: token.line,
            column: token.column,
            location: where_at(token),
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Resolve error: line={}, msg={}", token.line, message);

        CompileError::Resolve {
            message,
            line: token.line,
            column: token.column,
            location: where_at(token),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            CompileError::Lex { line, .. }
            | CompileError::Parse { line, .. }
            | CompileError::Resolve { line, .. } => *line,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CompileError::Lex { message, .. }
            | CompileError::Parse { message, .. }
            | CompileError::Resolve { message, .. } => message,
        }
    }
}

/// Error sink shared by the scanner, parser and resolver for one compile.
///
/// Stands in for a process‑wide "had error" flag: a fresh collector is
/// created per source unit, so REPL entries never leak state into each other.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<CompileError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, error: CompileError) {
        debug!("Reported: {}", error);

        self.errors.push(error);
    }

    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<CompileError> {
        self.errors
    }
}

/// Failures raised while executing a program.  Each carries the location of
/// the token that triggered it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuntimeError {
    /// Unsupported operand type(s) for an operator.
    #[error("TypeError: {message}")]
    Type { message: String, at: Location },

    /// Division where either operand is exactly zero.
    #[error("ZeroDivisionError: Can not divide by zero.")]
    ZeroDivision { at: Location },

    /// Read of, or assignment to, a name bound nowhere in the chain.
    #[error("UndefinedVariableError: Undefined variable '{name}'.")]
    UndefinedVariable { name: String, at: Location },

    #[error("Undefined property '{name}'.")]
    UndefinedProperty { name: String, at: Location },

    /// Call on something that is neither a function nor a class.
    #[error("NotCallableError: Can only call functions and classes.")]
    NotCallable { at: Location },

    #[error("Expected {expected} arguments but got {got}.")]
    Arity {
        expected: usize,
        got: usize,
        at: Location,
    },

    /// Failure reported by a native function.
    #[error("{message}")]
    Native { message: String, at: Location },

    /// The `print` sink could not be written.
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl RuntimeError {
    pub fn type_error<S: Into<String>>(token: &Token, msg: S) -> Self {
        RuntimeError::Type {
            message: msg.into(),
            at: token.location(),
        }
    }

    pub fn zero_division(token: &Token) -> Self {
        RuntimeError::ZeroDivision {
            at: token.location(),
        }
    }

    pub fn undefined_variable(token: &Token) -> Self {
        RuntimeError::UndefinedVariable {
            name: token.lexeme.clone(),
            at: token.location(),
        }
    }

    pub fn undefined_property(token: &Token) -> Self {
        RuntimeError::UndefinedProperty {
            name: token.lexeme.clone(),
            at: token.location(),
        }
    }

    pub fn not_callable(token: &Token) -> Self {
        RuntimeError::NotCallable {
            at: token.location(),
        }
    }

    pub fn arity(token: &Token, expected: usize, got: usize) -> Self {
        RuntimeError::Arity {
            expected,
            got,
            at: token.location(),
        }
    }

    pub fn native<S: Into<String>>(token: &Token, msg: S) -> Self {
        RuntimeError::Native {
            message: msg.into(),
            at: token.location(),
        }
    }

    /// Where the error was raised, if it is tied to a token.
    pub fn location(&self) -> Option<Location> {
        match self {
            RuntimeError::Type { at, .. }
            | RuntimeError::ZeroDivision { at }
            | RuntimeError::UndefinedVariable { at, .. }
            | RuntimeError::UndefinedProperty { at, .. }
            | RuntimeError::NotCallable { at }
            | RuntimeError::Arity { at, .. }
            | RuntimeError::Native { at, .. } => Some(*at),
            RuntimeError::Output(_) => None,
        }
    }

    /// Host‑facing rendering: `[line N] message`.
    pub fn report(&self) -> String {
        match self.location() {
            Some(at) => format!("[line {}] {}", at.line, self),
            None => self.to_string(),
        }
    }
}

/// Outcome of running one source unit through the whole pipeline.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Scanning, parsing or resolution failed; the program never ran.
    #[error("{} compile error(s)", .0.len())]
    Compile(Vec<CompileError>),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl LoxError {
    /// Process exit code for batch mode.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoxError::Compile(_) => 65,
            LoxError::Runtime(_) => 70,
            LoxError::Io(_) | LoxError::Utf8(_) => 74,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
