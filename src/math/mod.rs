pub mod modular;
pub mod primes;
pub mod sampling;

pub use modular::{
    add_mod, center, mod_inverse, mod_pow, mul_mod, neg_mod, reduce_i64, sub_mod,
};
pub use primes::{
    is_ntt_friendly_prime, is_prime, largest_prime_below_bits, next_prime_down,
    next_prime_up, primes_near_power_of_two,
};
pub use sampling::{gaussian_coefficients, ternary_coefficients, uniform_coefficients};
