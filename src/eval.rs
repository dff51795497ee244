//! Cleartext reference evaluation of a compiled [`Circuit`].
//!
//! Interprets the same instruction list on plain `f64` vectors. Rescaling,
//! relinearization and modulus switching do not change values, so they are
//! identities here.

use thiserror::Error;

use crate::Valuation;
use crate::compiler::{Circuit, Instruction};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("missing input '{0}'")]
    MissingInput(String),
    #[error("input '{name}' has {actual} values, expected {expected}")]
    InputLength {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("step {step} refers to value {operand} that is not yet computed")]
    DanglingOperand { step: usize, operand: usize },
    #[error("output '{0}' refers to a missing value")]
    MissingOutput(String),
}

pub type EvalResult<T> = Result<T, EvalError>;

pub fn evaluate(circuit: &Circuit, inputs: &Valuation) -> EvalResult<Valuation> {
    let vec_size = circuit.vec_size();
    let mut values: Vec<Vec<f64>> = Vec::with_capacity(circuit.steps().len());

    for (index, step) in circuit.steps().iter().enumerate() {
        let get = |id: usize| {
            values.get(id).ok_or(EvalError::DanglingOperand {
                step: index,
                operand: id,
            })
        };

        let result = match &step.instruction {
            Instruction::Input { name } => {
                let input = inputs
                    .get(name)
                    .ok_or_else(|| EvalError::MissingInput(name.clone()))?;
                if input.len() != vec_size {
                    return Err(EvalError::InputLength {
                        name: name.clone(),
                        expected: vec_size,
                        actual: input.len(),
                    });
                }
                input.clone()
            }
            Instruction::Add { lhs, rhs } => zip_with(get(*lhs)?, get(*rhs)?, |a, b| a + b),
            Instruction::Mul { lhs, rhs } => zip_with(get(*lhs)?, get(*rhs)?, |a, b| a * b),
            Instruction::Relinearize { operand }
            | Instruction::Rescale { operand }
            | Instruction::ModSwitch { operand } => get(*operand)?.clone(),
            Instruction::MulConst { operand, value, .. } => {
                get(*operand)?.iter().map(|x| x * value).collect()
            }
            Instruction::AddConst { operand, value } => {
                get(*operand)?.iter().map(|x| x + value).collect()
            }
        };
        values.push(result);
    }

    circuit
        .outputs()
        .iter()
        .map(|(name, &id)| {
            values
                .get(id)
                .cloned()
                .map(|v| (name.clone(), v))
                .ok_or_else(|| EvalError::MissingOutput(name.clone()))
        })
        .collect()
}

fn zip_with(a: &[f64], b: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{CkksCompiler, SecurityLevel};
    use crate::program::Polynomial;
    use approx::assert_relative_eq;

    fn compiled(coefficients: Vec<f64>) -> Circuit {
        let mut program = Polynomial::new("p", coefficients).to_program(8).unwrap();
        program.set_input_scales(30);
        program.set_output_ranges(20);
        CkksCompiler::new()
            .security(SecurityLevel::None)
            .compile(&program)
            .unwrap()
            .circuit
    }

    fn inputs() -> Valuation {
        let xs = (0..8).map(|i| -5.0 + 10.0 * i as f64 / 8.0).collect();
        Valuation::from([("x".to_string(), xs)])
    }

    #[test]
    fn matches_direct_polynomial_evaluation() {
        let coefficients = vec![0.6237631886314631, -0.0987802999285526, -0.024950527545258522];
        let poly = Polynomial::new("mm_poly2", coefficients.clone());
        let outputs = evaluate(&compiled(coefficients), &inputs()).unwrap();
        for (x, y) in inputs()["x"].iter().zip(&outputs["y"]) {
            assert_relative_eq!(poly.eval(*x), *y, max_relative = 1e-12);
        }
    }

    #[test]
    fn is_deterministic() {
        let circuit = compiled(vec![1.0, 0.5, -0.16, 0.0, 0.00512]);
        let first = evaluate(&circuit, &inputs()).unwrap();
        let second = evaluate(&circuit, &inputs()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn reports_missing_and_short_inputs() {
        let circuit = compiled(vec![1.0, 1.0]);
        assert_eq!(
            evaluate(&circuit, &Valuation::new()),
            Err(EvalError::MissingInput("x".into()))
        );
        let short = Valuation::from([("x".to_string(), vec![1.0; 3])]);
        assert!(matches!(
            evaluate(&circuit, &short),
            Err(EvalError::InputLength { expected: 8, actual: 3, .. })
        ));
    }
}
