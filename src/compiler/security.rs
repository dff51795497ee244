/// Security target used to pick the modulus degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityLevel {
    /// 128-bit classical security per the homomorphic encryption standard.
    #[default]
    Tc128,
    /// No security bound; the degree only has to hold the vector. Test use only.
    None,
}

/// `(poly_modulus_degree, max total modulus bits)` at 128-bit classical security.
pub const TC128_MODULUS_BITS: [(usize, u32); 6] = [
    (1024, 27),
    (2048, 54),
    (4096, 109),
    (8192, 218),
    (16384, 438),
    (32768, 881),
];

pub const MAX_POLY_MODULUS_DEGREE: usize = 32768;

impl SecurityLevel {
    /// Largest total modulus, in bits, allowed at `degree`.
    pub fn max_modulus_bits(self, degree: usize) -> Option<u32> {
        match self {
            SecurityLevel::Tc128 => TC128_MODULUS_BITS
                .iter()
                .find(|&&(n, _)| n == degree)
                .map(|&(_, bits)| bits),
            SecurityLevel::None => Some(u32::MAX),
        }
    }

    /// Candidate degrees, smallest first, that hold `vec_size` slots and
    /// admit `modulus_bits`.
    pub fn candidate_degrees(self, vec_size: usize, modulus_bits: u32) -> Vec<usize> {
        let min_degree = (2 * vec_size).next_power_of_two().max(2);
        if min_degree > MAX_POLY_MODULUS_DEGREE {
            return Vec::new();
        }
        match self {
            SecurityLevel::Tc128 => TC128_MODULUS_BITS
                .iter()
                .filter(|&&(n, bits)| n >= min_degree && bits >= modulus_bits)
                .map(|&(n, _)| n)
                .collect(),
            SecurityLevel::None => vec![min_degree],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tc128_picks_smallest_secure_degree() {
        let degrees = SecurityLevel::Tc128.candidate_degrees(8192, 260);
        assert_eq!(degrees, vec![16384, 32768]);
        let degrees = SecurityLevel::Tc128.candidate_degrees(16, 200);
        assert_eq!(degrees.first(), Some(&8192));
    }

    #[test]
    fn tc128_has_no_room_for_huge_moduli() {
        assert!(SecurityLevel::Tc128.candidate_degrees(8, 900).is_empty());
    }

    #[test]
    fn insecure_mode_only_fits_the_vector() {
        assert_eq!(SecurityLevel::None.candidate_degrees(16, 10_000), vec![32]);
        assert_eq!(SecurityLevel::None.max_modulus_bits(32), Some(u32::MAX));
    }

    #[test]
    fn vectors_beyond_the_largest_degree_are_rejected() {
        assert!(SecurityLevel::None.candidate_degrees(32768, 10).is_empty());
    }
}
