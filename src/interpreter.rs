use std::collections::HashMap;
use std::io::{self, Write};
use std::mem;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, LiteralValue, Stmt};
use crate::callable::{self, Callable};
use crate::class::{LoxClass, LoxInstance};
use crate::environment::{EnvRef, Environment};
use crate::error::RuntimeError;
use crate::function::LoxFunction;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// How a statement finished.  `return` travels up as `Flow::Return` through
/// ordinary `Ok` values, so it can never be confused with a `RuntimeError`.
#[derive(Debug, Clone)]
pub enum Flow {
    Normal,
    Return(Value),
}

/// Convenient alias for interpreter results.
pub type IResult<T> = Result<T, RuntimeError>;

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,

    /// Resolution side‑table: scope distance of every local reference.
    /// References without an entry are globals.
    locals: HashMap<ExprId, usize>,

    /// Where `print` writes.
    out: Box<dyn Write>,
}

impl Interpreter {
    /// Creates an Interpreter printing to stdout, with `clock` predefined.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }

    pub fn with_output<W: Write + 'static>(out: W) -> Self {
        info!("Initializing Interpreter");

        let globals = Environment::new().into_ref();

        debug!("Defining native function 'clock'");

        globals
            .borrow_mut()
            .define("clock", Value::NativeFunction(Rc::new(callable::clock())));

        Self {
            environment: globals.clone(),
            globals,
            locals: HashMap::new(),
            out: Box::new(out),
        }
    }

    pub fn globals(&self) -> EnvRef {
        self.globals.clone()
    }

    /// Called by the resolver for every reference bound in a local scope.
    pub fn note_local(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    pub fn resolved_depth(&self, id: ExprId) -> Option<usize> {
        self.locals.get(&id).copied()
    }

    /// Runs a program.  The first runtime error aborts it and is returned.
    pub fn interpret(&mut self, statements: &[Stmt]) -> IResult<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            self.execute(stmt)?;
        }

        self.out.flush()?;

        info!("Interpretation completed successfully");

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────────

    pub fn execute(&mut self, stmt: &Stmt) -> IResult<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);

                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let environment = Environment::with_enclosing(self.environment.clone());
                self.execute_block(statements, environment.into_ref())
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }

                Ok(Flow::Normal)
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);

                // The closure is the scope the declaration sits in, which is
                // also where its own name gets bound, so recursion works.
                let function =
                    LoxFunction::new(declaration.clone(), self.environment.clone(), false);

                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));
                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                Ok(Flow::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                debug!("Defining class '{}'", name.lexeme);

                let superclass = match superclass {
                    Some(expr) => match self.evaluate(expr)? {
                        Value::Class(class) => Some(class),
                        _ => {
                            return Err(RuntimeError::type_error(
                                superclass_name(expr).unwrap_or(name),
                                "Superclass must be a class.",
                            ))
                        }
                    },
                    None => None,
                };

                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Nil);

                // Methods of a subclass close over an extra scope holding `super`.
                let method_env = match &superclass {
                    Some(class) => {
                        let mut env = Environment::with_enclosing(self.environment.clone());
                        env.define("super", Value::Class(class.clone()));
                        env.into_ref()
                    }
                    None => self.environment.clone(),
                };

                let methods: HashMap<String, Rc<LoxFunction>> = methods
                    .iter()
                    .map(|method| {
                        let is_initializer = method.name.lexeme == "init";
                        let function =
                            LoxFunction::new(method.clone(), method_env.clone(), is_initializer);
                        (method.name.lexeme.clone(), Rc::new(function))
                    })
                    .collect();

                let class = LoxClass::new(&name.lexeme, superclass, methods);

                self.environment
                    .borrow_mut()
                    .assign(name, Value::Class(Rc::new(class)))?;
                Ok(Flow::Normal)
            }
        }
    }

    /// Runs `statements` with `environment` as the current scope and puts the
    /// previous scope back on every exit path.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> IResult<Flow> {
        let previous = mem::replace(&mut self.environment, environment);

        let mut result = Ok(Flow::Normal);

        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}
                other => {
                    result = other;
                    break;
                }
            }
        }

        self.environment = previous;

        result
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> IResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::from(s.as_str()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;

                match (&operator.token_type, right) {
                    (TokenType::BANG, value) => Ok(Value::Bool(!value.is_truthy())),
                    (TokenType::MINUS, Value::Number(n)) => Ok(Value::Number(-n)),
                    _ => Err(RuntimeError::type_error(
                        operator,
                        "Operand must be a number.",
                    )),
                }
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;

                binary(operator, left, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                let short_circuit = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(distance) => {
                        self.environment
                            .borrow_mut()
                            .assign_at(*distance, name, value.clone())?;
                    }
                    None => {
                        self.globals.borrow_mut().assign(name, value.clone())?;
                    }
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let function: Rc<dyn Callable> = callee
                    .as_callable()
                    .ok_or_else(|| RuntimeError::not_callable(paren))?;

                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                if values.len() != function.arity() {
                    return Err(RuntimeError::arity(paren, function.arity(), values.len()));
                }

                function.call(self, paren, values)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => LoxInstance::get(&instance, name),
                _ => Err(RuntimeError::type_error(
                    name,
                    "Only instances have properties.",
                )),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(RuntimeError::type_error(name, "Only instances have fields."));
                };

                let value = self.evaluate(value)?;
                instance.borrow_mut().set(name, value.clone());

                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => {
                let distance = self
                    .locals
                    .get(id)
                    .copied()
                    .ok_or_else(|| RuntimeError::undefined_variable(keyword))?;

                let superclass = self.environment.borrow().get_at(distance, keyword)?;

                // `this` is always bound one scope inside `super`.
                let this = Token::synthetic("this", keyword.location());
                let object = self
                    .environment
                    .borrow()
                    .get_at(distance.saturating_sub(1), &this)?;

                match (superclass, object) {
                    (Value::Class(class), Value::Instance(instance)) => {
                        match class.find_method(&method.lexeme) {
                            Some(found) => Ok(Value::Function(Rc::new(found.bind(instance)))),
                            None => Err(RuntimeError::undefined_property(method)),
                        }
                    }
                    _ => Err(RuntimeError::undefined_variable(keyword)),
                }
            }
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> IResult<Value> {
        match self.locals.get(&id) {
            Some(distance) => self.environment.borrow().get_at(*distance, name),
            None => self.globals.borrow().get(name),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn superclass_name(expr: &Expr) -> Option<&Token> {
    match expr {
        Expr::Variable { name, .. } => Some(name),
        _ => None,
    }
}

/// Arithmetic, comparison and equality on evaluated operands.
fn binary(operator: &Token, left: Value, right: Value) -> IResult<Value> {
    use Value::{Number, String as Str};

    debug!("Binary '{}' on {} and {}", operator.lexeme, left, right);

    match &operator.token_type {
        TokenType::PLUS => match (left, right) {
            (Number(a), Number(b)) => Ok(Number(a + b)),
            (Str(a), Str(b)) => Ok(Value::from(format!("{}{}", a, b))),
            (l @ Str(_), r) | (l, r @ Str(_)) => Ok(Value::from(format!("{}{}", l, r))),
            _ => Err(RuntimeError::type_error(
                operator,
                "Operands must be two numbers or two strings.",
            )),
        },

        TokenType::MINUS | TokenType::STAR | TokenType::SLASH => {
            let (Number(a), Number(b)) = (left, right) else {
                return Err(RuntimeError::type_error(operator, "Operands must be numbers."));
            };

            Ok(Number(match operator.token_type {
                TokenType::MINUS => a - b,
                TokenType::STAR => a * b,
                _ => {
                    if a == 0.0 || b == 0.0 {
                        return Err(RuntimeError::zero_division(operator));
                    }
                    a / b
                }
            }))
        }

        TokenType::GREATER
        | TokenType::GREATER_EQUAL
        | TokenType::LESS
        | TokenType::LESS_EQUAL
        | TokenType::EQUAL_EQUAL
        | TokenType::BANG_EQUAL => {
            let ordering = match (&left, &right) {
                (Number(a), Number(b)) => a.partial_cmp(b),
                (Str(a), Str(b)) => Some(a.cmp(b)),
                _ => {
                    return Err(RuntimeError::type_error(
                        operator,
                        "Operands must be two numbers or two strings.",
                    ))
                }
            };

            // `None` only arises from NaN, for which every comparison is
            // false except `!=`.
            let result = match (&operator.token_type, ordering) {
                (TokenType::BANG_EQUAL, None) => true,
                (_, None) => false,
                (TokenType::GREATER, Some(o)) => o.is_gt(),
                (TokenType::GREATER_EQUAL, Some(o)) => o.is_ge(),
                (TokenType::LESS, Some(o)) => o.is_lt(),
                (TokenType::LESS_EQUAL, Some(o)) => o.is_le(),
                (TokenType::EQUAL_EQUAL, Some(o)) => o.is_eq(),
                (_, Some(o)) => o.is_ne(),
            };

            Ok(Value::Bool(result))
        }

        _ => Err(RuntimeError::type_error(
            operator,
            format!("Invalid binary operator '{}'.", operator.lexeme),
        )),
    }
}
