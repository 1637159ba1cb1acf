use log::debug;
use tfhe::boolean::prelude::*;

/// The gates the adder is built from.
pub trait Gates {
    type Bit: Clone;

    fn xor(&mut self, a: &Self::Bit, b: &Self::Bit) -> Self::Bit;
    fn and(&mut self, a: &Self::Bit, b: &Self::Bit) -> Self::Bit;
    fn or(&mut self, a: &Self::Bit, b: &Self::Bit) -> Self::Bit;
}

/// Homomorphic evaluation under the cloud key. Every gate is bootstrapped.
pub struct Execution {
    sk: ServerKey,
    ct_ops: usize,
}

impl Execution {
    pub fn new(sk: ServerKey) -> Self {
        Self { sk, ct_ops: 0 }
    }

    pub fn ct_operations_count(&self) -> usize {
        self.ct_ops
    }
}

impl Gates for Execution {
    type Bit = Ciphertext;

    fn xor(&mut self, a: &Ciphertext, b: &Ciphertext) -> Ciphertext {
        self.ct_ops += 1;
        self.sk.xor(a, b)
    }
    fn and(&mut self, a: &Ciphertext, b: &Ciphertext) -> Ciphertext {
        self.ct_ops += 1;
        self.sk.and(a, b)
    }
    fn or(&mut self, a: &Ciphertext, b: &Ciphertext) -> Ciphertext {
        self.ct_ops += 1;
        self.sk.or(a, b)
    }
}

/// Cleartext evaluation of the same circuit.
#[cfg(test)]
#[derive(Default)]
pub struct PlainExecution {
    ops: usize,
}

#[cfg(test)]
impl PlainExecution {
    pub fn operations_count(&self) -> usize {
        self.ops
    }
}

#[cfg(test)]
impl Gates for PlainExecution {
    type Bit = bool;

    fn xor(&mut self, a: &bool, b: &bool) -> bool {
        self.ops += 1;
        a ^ b
    }
    fn and(&mut self, a: &bool, b: &bool) -> bool {
        self.ops += 1;
        a & b
    }
    fn or(&mut self, a: &bool, b: &bool) -> bool {
        self.ops += 1;
        a | b
    }
}

/// Returns `(sum, carry)` of three input bits.
pub fn full_adder<G: Gates>(g: &mut G, a: &G::Bit, b: &G::Bit, c: &G::Bit) -> (G::Bit, G::Bit) {
    let a_xor_b = g.xor(a, b);
    let sum = g.xor(&a_xor_b, c);
    let a_and_b = g.and(a, b);
    let propagated = g.and(c, &a_xor_b);
    let carry = g.or(&a_and_b, &propagated);
    (sum, carry)
}

/// Adds two little-endian words plus a carry-in bit.
///
/// The sum wraps at the word width; the final carry is returned separately.
///
/// # Panics
/// If `lhs` and `rhs` differ in length.
pub fn ripple_carry_add<G: Gates>(
    g: &mut G,
    lhs: &[G::Bit],
    rhs: &[G::Bit],
    carry_in: &G::Bit,
) -> (Vec<G::Bit>, G::Bit) {
    assert_eq!(lhs.len(), rhs.len(), "operand widths differ");

    let mut carry = carry_in.clone();
    let mut sum = Vec::with_capacity(lhs.len());
    for (i, (a, b)) in lhs.iter().zip(rhs).enumerate() {
        let (s, c) = full_adder(g, a, b, &carry);
        sum.push(s);
        carry = c;
        debug!("bit {} done", i);
    }
    (sum, carry)
}
