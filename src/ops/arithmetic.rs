//! Operation kind enums
//!
//! Backends dispatch element-wise and reduction kernels on these kinds. The
//! host-side `apply` helpers are the reference semantics every backend
//! kernel reproduces.

/// Binary operation kind
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition: a + b
    Add,
    /// Subtraction: a - b
    Sub,
    /// Multiplication: a * b
    Mul,
    /// Division: a / b
    Div,
    /// Power: a^b
    Pow,
    /// Maximum: max(a, b)
    Max,
    /// Minimum: min(a, b)
    Min,
}

impl BinaryOp {
    /// Apply the operation to one pair of elements
    #[inline]
    pub fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Pow => a.powf(b),
            BinaryOp::Max => {
                if a > b {
                    a
                } else {
                    b
                }
            }
            BinaryOp::Min => {
                if a < b {
                    a
                } else {
                    b
                }
            }
        }
    }

    /// Kernel entry point name
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Pow => "pow",
            BinaryOp::Max => "maximum",
            BinaryOp::Min => "minimum",
        }
    }
}

/// Tensor-scalar operation kind
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScalarOp {
    /// a + s
    Add,
    /// a - s
    Sub,
    /// s - a
    RSub,
    /// a * s
    Mul,
    /// a / s
    Div,
    /// a^s
    Pow,
}

impl ScalarOp {
    /// Apply the operation to one element
    #[inline]
    pub fn apply(self, a: f32, s: f32) -> f32 {
        match self {
            ScalarOp::Add => a + s,
            ScalarOp::Sub => a - s,
            ScalarOp::RSub => s - a,
            ScalarOp::Mul => a * s,
            ScalarOp::Div => a / s,
            ScalarOp::Pow => a.powf(s),
        }
    }

    /// Kernel entry point name
    pub fn name(self) -> &'static str {
        match self {
            ScalarOp::Add => "add_scalar",
            ScalarOp::Sub => "sub_scalar",
            ScalarOp::RSub => "rsub_scalar",
            ScalarOp::Mul => "mul_scalar",
            ScalarOp::Div => "div_scalar",
            ScalarOp::Pow => "pow_scalar",
        }
    }
}

/// Unary operation kind
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// Negation: -a
    Neg,
    /// Absolute value: |a|
    Abs,
    /// Square root: sqrt(a)
    Sqrt,
    /// Sign with sign(0) = +1
    Sign,
    /// Zero indicator: 1 where a == 0, else 0
    IsZero,
}

impl UnaryOp {
    /// Apply the operation to one element
    #[inline]
    pub fn apply(self, a: f32) -> f32 {
        match self {
            UnaryOp::Neg => -a,
            UnaryOp::Abs => a.abs(),
            UnaryOp::Sqrt => a.sqrt(),
            UnaryOp::Sign => {
                if a >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            UnaryOp::IsZero => {
                if a == 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Kernel entry point name
    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Abs => "abs",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Sign => "sign",
            UnaryOp::IsZero => "is_zero",
        }
    }
}

/// Full-tensor reduction kind
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReduceOp {
    /// Σ a
    Sum,
    /// Σ a²
    SumSq,
    /// Σ |a|
    AbsSum,
    /// min a
    Min,
    /// max a
    Max,
}

impl ReduceOp {
    /// Map one element before accumulation
    #[inline]
    pub fn map(self, a: f64) -> f64 {
        match self {
            ReduceOp::Sum | ReduceOp::Min | ReduceOp::Max => a,
            ReduceOp::SumSq => a * a,
            ReduceOp::AbsSum => a.abs(),
        }
    }

    /// Combine two partial results
    #[inline]
    pub fn combine(self, acc: f64, v: f64) -> f64 {
        match self {
            ReduceOp::Sum | ReduceOp::SumSq | ReduceOp::AbsSum => acc + v,
            ReduceOp::Min => acc.min(v),
            ReduceOp::Max => acc.max(v),
        }
    }

    /// Value of the reduction over zero elements
    #[inline]
    pub fn identity(self) -> f64 {
        match self {
            ReduceOp::Sum | ReduceOp::SumSq | ReduceOp::AbsSum => 0.0,
            ReduceOp::Min => f64::INFINITY,
            ReduceOp::Max => f64::NEG_INFINITY,
        }
    }

    /// Kernel entry point name
    pub fn name(self) -> &'static str {
        match self {
            ReduceOp::Sum => "reduce_sum",
            ReduceOp::SumSq => "reduce_sum_sq",
            ReduceOp::AbsSum => "reduce_abs_sum",
            ReduceOp::Min => "reduce_min",
            ReduceOp::Max => "reduce_max",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_of_zero_is_positive() {
        assert_eq!(UnaryOp::Sign.apply(0.0), 1.0);
        assert_eq!(UnaryOp::Sign.apply(-0.0), 1.0);
        assert_eq!(UnaryOp::Sign.apply(-3.0), -1.0);
    }

    #[test]
    fn test_reduce_identity() {
        for op in [ReduceOp::Sum, ReduceOp::SumSq, ReduceOp::AbsSum] {
            assert_eq!(op.identity(), 0.0);
        }
        assert_eq!(ReduceOp::Min.combine(ReduceOp::Min.identity(), 2.0), 2.0);
        assert_eq!(ReduceOp::Max.combine(ReduceOp::Max.identity(), -2.0), -2.0);
    }

    #[test]
    fn test_rsub() {
        assert_eq!(ScalarOp::RSub.apply(0.25, 1.0), 0.75);
    }
}
