use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Index of a step in [`Circuit::steps`].
pub type ValueId = usize;

/// One instruction of a lowered circuit. Operands always refer to earlier steps.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Input { name: String },
    Add { lhs: ValueId, rhs: ValueId },
    Mul { lhs: ValueId, rhs: ValueId },
    Relinearize { operand: ValueId },
    Rescale { operand: ValueId },
    /// Drops primes down to the level of the step.
    ModSwitch { operand: ValueId },
    /// Multiplies by `round(value * multiplier)`.
    MulConst {
        operand: ValueId,
        value: f64,
        multiplier: f64,
    },
    /// Adds `value` at the operand's scale.
    AddConst { operand: ValueId, value: f64 },
}

impl Instruction {
    pub fn operands(&self) -> Vec<ValueId> {
        match self {
            Instruction::Input { .. } => Vec::new(),
            Instruction::Add { lhs, rhs } | Instruction::Mul { lhs, rhs } => vec![*lhs, *rhs],
            Instruction::Relinearize { operand }
            | Instruction::Rescale { operand }
            | Instruction::ModSwitch { operand }
            | Instruction::MulConst { operand, .. }
            | Instruction::AddConst { operand, .. } => vec![*operand],
        }
    }

    fn label(&self) -> String {
        match self {
            Instruction::Input { name } => format!("Input {name}"),
            Instruction::Add { .. } => "Add".into(),
            Instruction::Mul { .. } => "Multiply".into(),
            Instruction::Relinearize { .. } => "Relinearize".into(),
            Instruction::Rescale { .. } => "Rescale".into(),
            Instruction::ModSwitch { .. } => "ModSwitch".into(),
            Instruction::MulConst { value, .. } => format!("Multiply {value:e}"),
            Instruction::AddConst { value, .. } => format!("Add {value:e}"),
        }
    }
}

/// A step together with the level and scale its result carries.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub instruction: Instruction,
    pub level: usize,
    pub scale: f64,
}

/// How a named input or output is encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct IoEncoding {
    pub level: usize,
    pub scale: f64,
}

/// Encoding contract between encryptor, circuit and decryptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub vec_size: usize,
    pub inputs: BTreeMap<String, IoEncoding>,
    pub outputs: BTreeMap<String, IoEncoding>,
}

/// Straight-line FHE circuit with compile-time levels and scales.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    name: String,
    vec_size: usize,
    steps: Vec<Step>,
    outputs: BTreeMap<String, ValueId>,
}

impl Circuit {
    pub(crate) fn new(name: String, vec_size: usize) -> Self {
        Self {
            name,
            vec_size,
            steps: Vec::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub(crate) fn push(&mut self, instruction: Instruction, level: usize, scale: f64) -> ValueId {
        debug_assert!(
            instruction.operands().iter().all(|&op| op < self.steps.len()),
            "circuit operands must precede their use"
        );
        self.steps.push(Step {
            instruction,
            level,
            scale,
        });
        self.steps.len() - 1
    }

    pub(crate) fn set_output(&mut self, name: String, value: ValueId) {
        self.outputs.insert(name, value);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vec_size(&self) -> usize {
        self.vec_size
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, id: ValueId) -> Option<&Step> {
        self.steps.get(id)
    }

    pub fn outputs(&self) -> &BTreeMap<String, ValueId> {
        &self.outputs
    }

    /// Number of ciphertext-ciphertext multiplications.
    pub fn multiplication_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.instruction, Instruction::Mul { .. }))
            .count()
    }

    /// Renders the circuit in Graphviz DOT.
    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        let _ = writeln!(dot, "digraph \"{}\" {{", self.name);
        for (id, step) in self.steps.iter().enumerate() {
            let _ = writeln!(
                dot,
                "t{id} [label=\"{}\\nlevel {} scale 2^{:.2}\"];",
                step.instruction.label(),
                step.level,
                step.scale.log2()
            );
        }
        for (id, step) in self.steps.iter().enumerate() {
            for (port, operand) in step.instruction.operands().into_iter().enumerate() {
                let _ = writeln!(dot, "t{operand} -> t{id} [label=\"{port}\"];");
            }
        }
        for (name, &id) in &self.outputs {
            let _ = writeln!(dot, "out_{name} [shape=box label=\"Output {name}\"];");
            let _ = writeln!(dot, "t{id} -> out_{name};");
        }
        dot.push_str("}\n");
        dot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_circuit() -> Circuit {
        let mut circuit = Circuit::new("square".into(), 4);
        let x = circuit.push(Instruction::Input { name: "x".into() }, 1, 1024.0);
        let sq = circuit.push(Instruction::Mul { lhs: x, rhs: x }, 1, 1024.0 * 1024.0);
        let rl = circuit.push(Instruction::Relinearize { operand: sq }, 1, 1024.0 * 1024.0);
        let rs = circuit.push(Instruction::Rescale { operand: rl }, 0, 16.0);
        circuit.set_output("y".into(), rs);
        circuit
    }

    #[test]
    fn operands_are_listed_in_port_order() {
        assert_eq!(Instruction::Add { lhs: 3, rhs: 1 }.operands(), vec![3, 1]);
        assert!(Instruction::Input { name: "x".into() }.operands().is_empty());
    }

    #[test]
    fn dot_contains_every_step_and_edge() {
        let dot = tiny_circuit().to_dot();
        assert!(dot.starts_with("digraph \"square\" {"));
        assert!(dot.contains("t0 [label=\"Input x"));
        assert!(dot.contains("t0 -> t1 [label=\"0\"]"));
        assert!(dot.contains("t0 -> t1 [label=\"1\"]"));
        assert!(dot.contains("t3 -> out_y;"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn counts_ciphertext_multiplications() {
        assert_eq!(tiny_circuit().multiplication_count(), 1);
    }
}
