use crate::error::EvalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    TextIndex,
    TextTotal,
    SelectorValue,
    Time,
    Frame,
}

impl Variable {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "textIndex" => Variable::TextIndex,
            "textTotal" => Variable::TextTotal,
            "selectorValue" => Variable::SelectorValue,
            "time" => Variable::Time,
            "frame" => Variable::Frame,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Abs,
    Min,
    Max,
    Clamp,
    Floor,
    Ceil,
    Round,
    Sqrt,
    Sin,
    Cos,
    Pow,
}

impl Function {
    /// Accepts both bare names and the `Math.` prefixed spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix("Math.").unwrap_or(name);
        Some(match name {
            "abs" => Function::Abs,
            "min" => Function::Min,
            "max" => Function::Max,
            "clamp" => Function::Clamp,
            "floor" => Function::Floor,
            "ceil" => Function::Ceil,
            "round" => Function::Round,
            "sqrt" => Function::Sqrt,
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "pow" => Function::Pow,
            _ => return None,
        })
    }

    pub fn arity(&self) -> usize {
        match self {
            Function::Min | Function::Max | Function::Pow => 2,
            Function::Clamp => 3,
            _ => 1,
        }
    }

    fn apply(&self, args: &[f64; 3]) -> f64 {
        match self {
            Function::Abs => args[0].abs(),
            Function::Min => args[0].min(args[1]),
            Function::Max => args[0].max(args[1]),
            Function::Clamp => args[0].max(args[1]).min(args[2]),
            Function::Floor => args[0].floor(),
            Function::Ceil => args[0].ceil(),
            Function::Round => args[0].round(),
            Function::Sqrt => args[0].sqrt(),
            Function::Sin => args[0].sin(),
            Function::Cos => args[0].cos(),
            Function::Pow => args[0].powf(args[1]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Var(Variable),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
    Call(Function, Vec<Expr>),
}

/// Values bound to the fixed variable set for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bindings {
    pub text_index: f64,
    pub text_total: f64,
    pub selector_value: f64,
    pub time: f64,
    pub frame: f64,
}

impl Bindings {
    fn get(&self, var: Variable) -> f64 {
        match var {
            Variable::TextIndex => self.text_index,
            Variable::TextTotal => self.text_total,
            Variable::SelectorValue => self.selector_value,
            Variable::Time => self.time,
            Variable::Frame => self.frame,
        }
    }
}

fn truthy(v: f64) -> bool {
    v != 0.0
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Step-counted tree walk. Every visited node costs one step.
pub(crate) struct Evaluator<'a> {
    bindings: &'a Bindings,
    steps: usize,
    budget: usize,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(bindings: &'a Bindings, budget: usize) -> Self {
        Self {
            bindings,
            steps: 0,
            budget,
        }
    }

    pub(crate) fn eval(&mut self, expr: &Expr) -> Result<f64, EvalError> {
        self.steps += 1;
        if self.steps > self.budget {
            return Err(EvalError::BudgetExceeded {
                budget: self.budget,
            });
        }

        match expr {
            Expr::Number(n) => Ok(*n),
            Expr::Var(v) => Ok(self.bindings.get(*v)),
            Expr::Unary(op, inner) => {
                let v = self.eval(inner)?;
                Ok(match op {
                    UnaryOp::Neg => -v,
                    UnaryOp::Plus => v,
                    UnaryOp::Not => flag(!truthy(v)),
                })
            }
            Expr::Binary(BinaryOp::And, lhs, rhs) => {
                if !truthy(self.eval(lhs)?) {
                    return Ok(0.0);
                }
                Ok(flag(truthy(self.eval(rhs)?)))
            }
            Expr::Binary(BinaryOp::Or, lhs, rhs) => {
                if truthy(self.eval(lhs)?) {
                    return Ok(1.0);
                }
                Ok(flag(truthy(self.eval(rhs)?)))
            }
            Expr::Binary(op, lhs, rhs) => {
                let a = self.eval(lhs)?;
                let b = self.eval(rhs)?;
                match op {
                    BinaryOp::Add => Ok(a + b),
                    BinaryOp::Sub => Ok(a - b),
                    BinaryOp::Mul => Ok(a * b),
                    BinaryOp::Div if b == 0.0 => Err(EvalError::DivisionByZero),
                    BinaryOp::Div => Ok(a / b),
                    BinaryOp::Rem if b == 0.0 => Err(EvalError::ModuloByZero),
                    BinaryOp::Rem => Ok(a % b),
                    BinaryOp::Lt => Ok(flag(a < b)),
                    BinaryOp::Le => Ok(flag(a <= b)),
                    BinaryOp::Gt => Ok(flag(a > b)),
                    BinaryOp::Ge => Ok(flag(a >= b)),
                    BinaryOp::Eq => Ok(flag(a == b)),
                    BinaryOp::Ne => Ok(flag(a != b)),
                    BinaryOp::And => Ok(flag(truthy(a) && truthy(b))),
                    BinaryOp::Or => Ok(flag(truthy(a) || truthy(b))),
                }
            }
            Expr::Ternary(cond, then, otherwise) => {
                if truthy(self.eval(cond)?) {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::Call(func, args) => {
                let mut values = [0.0; 3];
                for (slot, arg) in values.iter_mut().zip(args) {
                    *slot = self.eval(arg)?;
                }
                Ok(func.apply(&values))
            }
        }
    }
}
