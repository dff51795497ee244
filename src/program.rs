//! Symbolic programs over encrypted vectors.
//!
//! A [`Program`] is a graph of inputs, constants, additions and
//! multiplications, appended in topological order. [`Polynomial`] is the
//! declarative coefficient form the benchmark families are written in; it
//! lowers itself into a `Program`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProgramError {
    #[error("polynomial '{name}' has degree 0 and no encrypted term")]
    ConstantPolynomial { name: String },
    #[error("polynomial '{name}' has a non-finite coefficient at degree {degree}")]
    NonFiniteCoefficient { name: String, degree: usize },
    #[error("vec_size {0} must be a positive power of two")]
    InvalidVecSize(usize),
}

pub type ProgramResult<T> = Result<T, ProgramError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Input { name: String },
    /// A plaintext scalar broadcast to every slot.
    Constant { value: f64 },
    Add(NodeId, NodeId),
    Mul(NodeId, NodeId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    name: String,
    vec_size: usize,
    nodes: Vec<Node>,
    outputs: Vec<(String, NodeId)>,
    input_scale_bits: Option<u32>,
    output_range_bits: Option<u32>,
}

impl Program {
    pub fn new(name: impl Into<String>, vec_size: usize) -> Self {
        Self {
            name: name.into(),
            vec_size,
            nodes: Vec::new(),
            outputs: Vec::new(),
            input_scale_bits: None,
            output_range_bits: None,
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn check(&self, id: NodeId) {
        assert!(
            id.0 < self.nodes.len(),
            "program '{}': node {} does not exist",
            self.name,
            id.0
        );
    }

    pub fn input(&mut self, name: impl Into<String>) -> NodeId {
        self.push(Node::Input { name: name.into() })
    }

    pub fn constant(&mut self, value: f64) -> NodeId {
        self.push(Node::Constant { value })
    }

    pub fn add(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.check(lhs);
        self.check(rhs);
        self.push(Node::Add(lhs, rhs))
    }

    pub fn mul(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.check(lhs);
        self.check(rhs);
        self.push(Node::Mul(lhs, rhs))
    }

    pub fn output(&mut self, name: impl Into<String>, node: NodeId) {
        self.check(node);
        self.outputs.push((name.into(), node));
    }

    /// Fixed-point scale for every input, in bits.
    pub fn set_input_scales(&mut self, bits: u32) {
        self.input_scale_bits = Some(bits);
    }

    /// Bits reserved for the integer part of every output.
    pub fn set_output_ranges(&mut self, bits: u32) {
        self.output_range_bits = Some(bits);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vec_size(&self) -> usize {
        self.vec_size
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn outputs(&self) -> &[(String, NodeId)] {
        &self.outputs
    }

    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Input { name } => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn input_scale_bits(&self) -> Option<u32> {
        self.input_scale_bits
    }

    pub fn output_range_bits(&self) -> Option<u32> {
        self.output_range_bits
    }
}

/// A univariate polynomial `sum_k coefficients[k] * x^k` with a report name.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    name: String,
    coefficients: Vec<f64>,
}

impl Polynomial {
    pub const INPUT: &'static str = "x";
    pub const OUTPUT: &'static str = "y";

    /// Coefficients are listed from lowest to highest degree.
    pub fn new(name: impl Into<String>, coefficients: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            coefficients,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Horner evaluation in plain `f64`.
    pub fn eval(&self, x: f64) -> f64 {
        self.coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }

    /// Builds `y = p(x)` over vectors of `vec_size` slots.
    ///
    /// Powers come from a balanced tree (`x^k = x^(2^m) * x^(k - 2^m)`), so
    /// `x^k` has multiplicative depth `ceil(log2 k)`. Terms are summed from the
    /// highest degree down and exact-zero coefficients are skipped.
    pub fn to_program(&self, vec_size: usize) -> ProgramResult<Program> {
        if vec_size == 0 || !vec_size.is_power_of_two() {
            return Err(ProgramError::InvalidVecSize(vec_size));
        }
        if let Some(degree) = self.coefficients.iter().position(|c| !c.is_finite()) {
            return Err(ProgramError::NonFiniteCoefficient {
                name: self.name.clone(),
                degree,
            });
        }
        let has_term = self.coefficients.iter().skip(1).any(|&c| c != 0.0);
        if self.degree() == 0 || !has_term {
            return Err(ProgramError::ConstantPolynomial {
                name: self.name.clone(),
            });
        }

        let mut program = Program::new(self.name.clone(), vec_size);
        let x = program.input(Self::INPUT);

        let mut powers: Vec<Option<NodeId>> = vec![None; self.degree() + 1];
        powers[1] = Some(x);

        let mut sum: Option<NodeId> = None;
        for k in (1..=self.degree()).rev() {
            let c = self.coefficients[k];
            if c == 0.0 {
                continue;
            }
            let power = power_node(&mut program, &mut powers, k);
            let coeff = program.constant(c);
            let term = program.mul(power, coeff);
            sum = Some(match sum {
                Some(acc) => program.add(acc, term),
                None => term,
            });
        }

        // has_term guarantees at least one term was emitted
        let mut y = sum.unwrap_or(x);
        if self.coefficients[0] != 0.0 {
            let c0 = program.constant(self.coefficients[0]);
            y = program.add(y, c0);
        }
        program.output(Self::OUTPUT, y);
        Ok(program)
    }
}

fn power_node(program: &mut Program, powers: &mut [Option<NodeId>], k: usize) -> NodeId {
    if let Some(node) = powers[k] {
        return node;
    }
    let high = if k.is_power_of_two() { k / 2 } else { 1 << k.ilog2() };
    let low = k - high;
    let a = power_node(program, powers, high);
    let b = power_node(program, powers, low);
    let node = program.mul(a, b);
    powers[k] = Some(node);
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_muls(program: &Program) -> usize {
        program
            .nodes()
            .iter()
            .filter(|n| matches!(n, Node::Mul(a, b)
                if !matches!(program.node(*a), Node::Constant { .. })
                    && !matches!(program.node(*b), Node::Constant { .. })))
            .count()
    }

    #[test]
    fn horner_matches_direct_sum() {
        let p = Polynomial::new("p", vec![1.0, -2.0, 0.5]);
        assert_eq!(p.eval(2.0), 1.0 - 4.0 + 2.0);
        assert_eq!(p.degree(), 2);
    }

    #[test]
    fn quadratic_program_has_one_square() {
        let p = Polynomial::new("cheby_poly2", vec![1.0, 0.0, -0.0533333333333333]);
        let program = p.to_program(8).unwrap();
        assert_eq!(program.input_names().collect::<Vec<_>>(), vec!["x"]);
        assert_eq!(program.outputs().len(), 1);
        assert_eq!(count_muls(&program), 1);
    }

    #[test]
    fn degree_ten_reuses_powers() {
        let coefficients = (0..=10).map(|k| k as f64 + 1.0).collect();
        let p = Polynomial::new("p10", coefficients);
        let program = p.to_program(8).unwrap();
        // every power from x^2 to x^10 costs exactly one multiplication
        assert_eq!(count_muls(&program), 9);
    }

    #[test]
    fn nodes_are_topologically_ordered() {
        let p = Polynomial::new("p", vec![0.5, 1.0, 2.0, 3.0, 4.0]);
        let program = p.to_program(4).unwrap();
        for (index, node) in program.nodes().iter().enumerate() {
            if let Node::Add(a, b) | Node::Mul(a, b) = node {
                assert!(a.index() < index && b.index() < index);
            }
        }
    }

    #[test]
    fn rejects_constant_polynomials() {
        let p = Polynomial::new("c", vec![3.0]);
        assert!(matches!(
            p.to_program(8),
            Err(ProgramError::ConstantPolynomial { .. })
        ));
        let zeros = Polynomial::new("z", vec![3.0, 0.0, 0.0]);
        assert!(zeros.to_program(8).is_err());
    }

    #[test]
    fn rejects_bad_vec_size() {
        let p = Polynomial::new("p", vec![0.0, 1.0]);
        assert_eq!(p.to_program(6), Err(ProgramError::InvalidVecSize(6)));
    }

    #[test]
    #[should_panic(expected = "node 7 does not exist")]
    fn foreign_node_ids_panic() {
        let mut program = Program::new("p", 4);
        let x = program.input("x");
        program.add(x, NodeId(7));
    }
}
