//! The two polynomial families benchmarked by the suite.
//!
//! Both approximate the same target on `[-5, 5)` at even degrees 2 through 10.
//! Coefficients run from the constant term up.

use crate::program::Polynomial;

pub const DEGREES: [usize; 5] = [2, 4, 6, 8, 10];

const CHEBYSHEV: [&[f64]; 5] = [
    &[1.0, 2.29672856559844e-17, -0.0533333333333333],
    &[
        1.0,
        4.89858719658941e-17,
        -0.16,
        -2.35132185436292e-18,
        0.00512,
    ],
    &[
        1.0,
        1.22464679914735e-16,
        -0.32,
        -1.56754790290861e-17,
        0.0256,
        4.47870829402461e-19,
        -0.000585142857142857,
    ],
    &[
        1.0,
        3.32221551472521e-16,
        -0.533333333333333,
        -7.97331723534049e-17,
        0.0768,
        5.46741753280491e-18,
        -0.004096,
        -1.13398289569287e-19,
        7.28177777777778e-5,
    ],
    &[
        1.0,
        2.00860586050432e-16,
        -0.8,
        -7.71304650433661e-17,
        0.1792,
        9.25565580520393e-18,
        -0.016384,
        -4.38786645580038e-19,
        0.00065536,
        7.18014510949153e-21,
        -9.53250909090909e-6,
    ],
];

const MINIMAX: [&[f64]; 5] = [
    &[0.6237631886314631, -0.0987802999285526, -0.024950527545258522],
    &[
        0.679759438585044,
        0.004335521937744174,
        -0.18570010532765574,
        -0.00407359817765997,
        0.00634038911137016,
    ],
    &[
        1.3069816852010294,
        0.5237883301907104,
        -0.3861815224336235,
        -0.07715912707437025,
        0.028858172428070823,
        0.002398532961841965,
        -0.000620083289081901,
    ],
    &[
        1.4527202922170603,
        0.14688608966841082,
        -1.0154403475418765,
        -0.04890884127931118,
        0.17505735028396438,
        -0.00407228575751848,
        -0.010573893362360708,
        -8.817535706168166e-05,
        0.00020413319233468963,
    ],
    &[
        1.4365038843115265,
        0.29867430901628356,
        -1.436306679738091,
        -0.152714360742452235,
        0.3672986923385317,
        0.022623122816971705,
        -0.03634685322705485,
        -0.0012620994639159894,
        0.0015256601539810903,
        2.3527469896569213e-05,
        -2.284871020324586e-05,
    ],
];

/// An ordered set of polynomials of increasing degree, reported together.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialFamily {
    /// Human-readable name used in plot titles and legends.
    pub label: String,
    /// File-name prefix for reports, e.g. `cheby`.
    pub prefix: String,
    pub polynomials: Vec<Polynomial>,
}

impl PolynomialFamily {
    pub fn new(
        label: impl Into<String>,
        prefix: impl Into<String>,
        polynomials: Vec<Polynomial>,
    ) -> Self {
        Self {
            label: label.into(),
            prefix: prefix.into(),
            polynomials,
        }
    }

    fn from_table(label: &str, prefix: &str, table: &[&[f64]; 5]) -> Self {
        let polynomials = DEGREES
            .iter()
            .zip(table)
            .map(|(degree, coefficients)| {
                Polynomial::new(format!("{prefix}_poly{degree}"), coefficients.to_vec())
            })
            .collect();
        Self::new(label, prefix, polynomials)
    }

    pub fn chebyshev() -> Self {
        Self::from_table("Chebyshev", "cheby", &CHEBYSHEV)
    }

    pub fn minimax() -> Self {
        Self::from_table("Minimax", "mm", &MINIMAX)
    }

    pub fn degrees(&self) -> Vec<usize> {
        self.polynomials.iter().map(Polynomial::degree).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_cover_even_degrees_in_order() {
        for family in [PolynomialFamily::chebyshev(), PolynomialFamily::minimax()] {
            assert_eq!(family.degrees(), DEGREES.to_vec());
        }
    }

    #[test]
    fn names_follow_the_prefix() {
        let cheby = PolynomialFamily::chebyshev();
        let names: Vec<_> = cheby.polynomials.iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            ["cheby_poly2", "cheby_poly4", "cheby_poly6", "cheby_poly8", "cheby_poly10"]
        );
        assert_eq!(PolynomialFamily::minimax().polynomials[4].name(), "mm_poly10");
    }

    #[test]
    fn chebyshev_quadratic_matches_reference_formula() {
        let p = &PolynomialFamily::chebyshev().polynomials[0];
        let x = 2.5;
        let expected = -0.0533333333333333 * x * x + 2.29672856559844e-17 * x + 1.0;
        assert!((p.eval(x) - expected).abs() < 1e-15);
    }
}
