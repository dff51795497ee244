//! Depth analysis and lowering of a [`Program`] to a [`Circuit`].
//!
//! Every ciphertext value is placed on a level and an exact scale at compile
//! time. Two kinds of values exist:
//!
//! - natural values (inputs and ciphertext products) sit wherever their
//!   operands put them;
//! - exact values (sums and products with constants) are materialized on a
//!   requested `(level, scale)`, which is what lets sums add operands of
//!   identical level and scale.
//!
//! A product with a constant lands exactly on `(L, S)` by switching its
//! operand to `L + 1`, multiplying by `round(c * S * q_{L+1} / s)` and
//! rescaling by `q_{L+1}`. A natural value used where an exact scale is needed
//! goes through the same correction with `c = 1`.

use std::collections::HashMap;

use super::circuit::{Circuit, Instruction, ValueId};
use super::errors::{CompileError, CompileResult};
use crate::program::{Node, Program};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Kind {
    /// Folded plaintext scalar.
    Plain(f64),
    /// Lives `depth` levels below the top.
    Natural { depth: usize },
    /// Needs `depth` levels to be materialized on an exact scale.
    Exact { depth: usize },
}

impl Kind {
    fn operand_depth(self) -> usize {
        match self {
            Kind::Plain(_) => 0,
            Kind::Natural { depth } | Kind::Exact { depth } => depth,
        }
    }

    fn exact_depth(self) -> usize {
        match self {
            Kind::Plain(_) => 0,
            Kind::Natural { depth } => depth + 1,
            Kind::Exact { depth } => depth,
        }
    }

    fn is_cipher(self) -> bool {
        !matches!(self, Kind::Plain(_))
    }
}

/// Classifies every node and folds plaintext-only subgraphs.
pub(crate) fn analyze(program: &Program) -> Vec<Kind> {
    let mut kinds: Vec<Kind> = Vec::with_capacity(program.nodes().len());
    for node in program.nodes() {
        let kind = match node {
            Node::Input { .. } => Kind::Natural { depth: 0 },
            Node::Constant { value } => Kind::Plain(*value),
            Node::Add(a, b) => match (kinds[a.index()], kinds[b.index()]) {
                (Kind::Plain(x), Kind::Plain(y)) => Kind::Plain(x + y),
                (Kind::Plain(_), c) | (c, Kind::Plain(_)) => Kind::Exact {
                    depth: c.exact_depth(),
                },
                (x, y) => Kind::Exact {
                    depth: x.exact_depth().max(y.exact_depth()),
                },
            },
            Node::Mul(a, b) => match (kinds[a.index()], kinds[b.index()]) {
                (Kind::Plain(x), Kind::Plain(y)) => Kind::Plain(x * y),
                (Kind::Plain(_), c) | (c, Kind::Plain(_)) => Kind::Exact {
                    depth: c.operand_depth() + 1,
                },
                (x, y) => Kind::Natural {
                    depth: x.operand_depth().max(y.operand_depth()) + 1,
                },
            },
        };
        kinds.push(kind);
    }
    kinds
}

/// Number of rescale primes the outputs need.
pub(crate) fn chain_depth(program: &Program, kinds: &[Kind]) -> CompileResult<usize> {
    let mut depth = 0;
    for (name, node) in program.outputs() {
        let kind = kinds[node.index()];
        if !kind.is_cipher() {
            return Err(CompileError::OutputWithoutInput(name.clone()));
        }
        depth = depth.max(kind.exact_depth());
    }
    Ok(depth)
}

pub(crate) struct Lowering<'a> {
    program: &'a Program,
    kinds: &'a [Kind],
    /// `q_0 .. q_D`
    chain: &'a [u64],
    base_scale: f64,
    circuit: Circuit,
    natural: Vec<Option<ValueId>>,
    exact: HashMap<(usize, usize, u64), ValueId>,
}

impl<'a> Lowering<'a> {
    pub(crate) fn new(
        program: &'a Program,
        kinds: &'a [Kind],
        chain: &'a [u64],
        base_scale: f64,
    ) -> Self {
        Self {
            program,
            kinds,
            chain,
            base_scale,
            circuit: Circuit::new(program.name().to_string(), program.vec_size()),
            natural: vec![None; program.nodes().len()],
            exact: HashMap::new(),
        }
    }

    fn top(&self) -> usize {
        self.chain.len() - 1
    }

    pub(crate) fn run(mut self) -> CompileResult<Circuit> {
        for (name, node) in self.program.outputs() {
            let value = self.emit_exact(node.index(), 0, self.base_scale)?;
            self.circuit.set_output(name.clone(), value);
        }
        Ok(self.circuit)
    }

    fn level_of(&self, value: ValueId) -> usize {
        self.circuit.steps()[value].level
    }

    fn scale_of(&self, value: ValueId) -> f64 {
        self.circuit.steps()[value].scale
    }

    fn mod_switch(&mut self, value: ValueId, level: usize) -> ValueId {
        if self.level_of(value) == level {
            return value;
        }
        let scale = self.scale_of(value);
        self.circuit
            .push(Instruction::ModSwitch { operand: value }, level, scale)
    }

    /// Multiplies `value` by `constant` and lands the product on `(level, scale)`.
    fn land(
        &mut self,
        node: usize,
        value: ValueId,
        constant: f64,
        level: usize,
        scale: f64,
    ) -> CompileResult<ValueId> {
        let available = self.level_of(value);
        if level + 1 > available {
            return Err(CompileError::LevelBudget {
                node,
                needed: level + 1,
                available,
            });
        }
        let switched = self.mod_switch(value, level + 1);
        let prime = self.chain[level + 1] as f64;
        let multiplier = scale * prime / self.scale_of(switched);
        let product = self.circuit.push(
            Instruction::MulConst {
                operand: switched,
                value: constant,
                multiplier,
            },
            level + 1,
            scale * prime,
        );
        Ok(self
            .circuit
            .push(Instruction::Rescale { operand: product }, level, scale))
    }

    fn plain_operand(&self, a: usize, b: usize) -> Option<(usize, f64)> {
        match (self.kinds[a], self.kinds[b]) {
            (Kind::Plain(v), _) => Some((b, v)),
            (_, Kind::Plain(v)) => Some((a, v)),
            _ => None,
        }
    }

    fn emit_natural(&mut self, node: usize) -> CompileResult<ValueId> {
        if let Some(value) = self.natural[node] {
            return Ok(value);
        }
        let value = match self.kinds[node] {
            Kind::Exact { depth } => {
                let level = self.top().checked_sub(depth).ok_or(CompileError::LevelBudget {
                    node,
                    needed: depth,
                    available: self.top(),
                })?;
                self.emit_exact(node, level, self.base_scale)?
            }
            Kind::Natural { .. } => match self.program.nodes()[node].clone() {
                Node::Input { name } => {
                    self.circuit
                        .push(Instruction::Input { name }, self.top(), self.base_scale)
                }
                Node::Mul(a, b) => {
                    let lhs = self.emit_natural(a.index())?;
                    let rhs = self.emit_natural(b.index())?;
                    let level = self.level_of(lhs).min(self.level_of(rhs));
                    if level == 0 {
                        return Err(CompileError::LevelBudget {
                            node,
                            needed: 1,
                            available: 0,
                        });
                    }
                    let lhs = self.mod_switch(lhs, level);
                    let rhs = self.mod_switch(rhs, level);
                    let scale = self.scale_of(lhs) * self.scale_of(rhs);
                    let product = self.circuit.push(Instruction::Mul { lhs, rhs }, level, scale);
                    let relin = self
                        .circuit
                        .push(Instruction::Relinearize { operand: product }, level, scale);
                    let prime = self.chain[level] as f64;
                    self.circuit
                        .push(Instruction::Rescale { operand: relin }, level - 1, scale / prime)
                }
                Node::Constant { .. } | Node::Add(..) => {
                    unreachable!("analysis never marks constants or sums as natural")
                }
            },
            Kind::Plain(_) => unreachable!("plaintext nodes are folded into their users"),
        };
        self.natural[node] = Some(value);
        Ok(value)
    }

    fn emit_exact(&mut self, node: usize, level: usize, scale: f64) -> CompileResult<ValueId> {
        let key = (node, level, scale.to_bits());
        if let Some(&value) = self.exact.get(&key) {
            return Ok(value);
        }

        let value = match self.kinds[node] {
            Kind::Natural { .. } => {
                let natural = self.emit_natural(node)?;
                if self.scale_of(natural) == scale && self.level_of(natural) >= level {
                    self.mod_switch(natural, level)
                } else {
                    self.land(node, natural, 1.0, level, scale)?
                }
            }
            Kind::Exact { .. } => match self.program.nodes()[node] {
                Node::Mul(a, b) => {
                    let (cipher, constant) = self
                        .plain_operand(a.index(), b.index())
                        .ok_or(CompileError::OutputWithoutInput(self.program.name().into()))?;
                    let operand = self.emit_natural(cipher)?;
                    self.land(node, operand, constant, level, scale)?
                }
                Node::Add(a, b) => match self.plain_operand(a.index(), b.index()) {
                    Some((cipher, constant)) => {
                        let operand = self.emit_exact(cipher, level, scale)?;
                        self.circuit
                            .push(Instruction::AddConst { operand, value: constant }, level, scale)
                    }
                    None => {
                        let lhs = self.emit_exact(a.index(), level, scale)?;
                        let rhs = self.emit_exact(b.index(), level, scale)?;
                        self.circuit.push(Instruction::Add { lhs, rhs }, level, scale)
                    }
                },
                Node::Input { .. } | Node::Constant { .. } => {
                    unreachable!("analysis marks only sums and constant products as exact")
                }
            },
            Kind::Plain(_) => unreachable!("plaintext nodes are folded into their users"),
        };

        self.exact.insert(key, value);
        Ok(value)
    }
}
