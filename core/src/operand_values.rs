//! Operand value sources
//!
//! Integer registers are initialized with `2^k - 1` where the width `k` follows the operand width
//! histogram of real programs reported in "Dynamically Exploiting Narrow Width Operands to Improve
//! Processor Power and Performance" (D. Brooks and M. Martonosi, HPCA 99).  Floating-point
//! registers get one of a set of well-known mathematical constants.

use rand::{
    distributions::{Distribution, WeightedIndex},
    seq::SliceRandom,
    Rng,
};

/// Probability of an operand being `k` bits wide, for `k` in `0..=32`
pub const NARROW_WIDTH_WEIGHTS: [f64; 33] = [
    0.2222222, 0.1180556, 0.0347222, 0.0486111, 0.0694444, 0.0486111, //
    0.0486111, 0.0486111, 0.0486111, 0.0555556, 0.0277778, 0.0277778, //
    0.0069444, 0.0138889, 0.0208333, 0.0208333, 0.0208333, 0.0138889, //
    0.0138889, 0.0069444, 0.0, 0.0138889, 0.0138889, 0.0277778, //
    0.0, 0.0069444, 0.0, 0.0, 0.0069444, 0.0069444, //
    0.0, 0.0, 0.0069447,
];

/// Constants loaded into floating-point registers
pub const REAL_VALUES: [f64; 26] = [
    1.0,                             // one
    0.5,                             // half
    std::f64::consts::PI,            // pi
    std::f64::consts::SQRT_2,        // square root of 2
    1.7320508075688772,              // square root of 3
    std::f64::consts::FRAC_1_SQRT_2, // inverse square root of 2
    1.618033988749895,               // golden ratio
    std::f64::consts::E,             // euler
    std::f64::consts::LN_2,          // natural logarithm of 2
    0.8346268416740731,              // gauss
    4.810477380965351,               // john
    262537412640768744.0,            // hermite-ramanujan
    1.7579327566180045,              // kasner
    23.140692632779267,              // gelfond
    4.532360141827194,               // van der pauw
    2.5029078750958926,              // feigenbaum
    1.5065918849,                    // mandelbrot set area
    2.399963229728653,               // golden angle
    0.65028784016,                   // sin 1
    -0.98803162409,                  // sin 3
    0.85090352453,                   // sin 4
    -0.3048106211,                   // sin 6
    -0.38778163541,                  // sin 7
    0.92175126972,                   // cos 7
    0.8939966636,                    // sin 9
    -0.44807361613,                  // cos 9
];

/// Largest value loaded into a divide/remainder source register, exclusive.  Above it `%hi()`
/// rounds up to `0x80000` and the sign-extended `lui` of RV64 makes the register negative.
pub const DIVISOR_LIMIT: u64 = 0x7FFF_F800;

/// Largest value used by conditional branch tests, exclusive
pub const BRANCH_VALUE_LIMIT: u64 = 1 << 20;

/// Random operand value generator
pub struct OperandValues {
    widths: WeightedIndex<f64>,
}

impl Default for OperandValues {
    fn default() -> Self {
        Self::new()
    }
}

impl OperandValues {
    pub fn new() -> Self {
        // Static table: finite, non-negative, positive sum
        let widths = match WeightedIndex::new(NARROW_WIDTH_WEIGHTS) {
            Ok(w) => w,
            Err(e) => unreachable!("invalid narrow width weights: {e}"),
        };
        OperandValues { widths }
    }

    /// Returns `2^k - 1` with `k` drawn from the narrow width distribution
    pub fn narrow_width<R: Rng>(&self, rng: &mut R) -> u64 {
        let width = self.widths.sample(rng) as u32;
        (1u64 << width) - 1
    }

    /// Returns one of the real constants
    pub fn real<R: Rng>(&self, rng: &mut R) -> f64 {
        *REAL_VALUES.choose(rng).unwrap_or(&1.0)
    }

    /// Returns a strictly positive divisor that is positive as a signed 32-bit value too
    pub fn positive_divisor<R: Rng>(&self, rng: &mut R) -> u64 {
        rng.gen_range(1..DIVISOR_LIMIT)
    }

    /// Returns a 20-bit upper immediate
    pub fn upper_immediate<R: Rng>(&self, rng: &mut R) -> u32 {
        rng.gen_range(0..1u32 << 20)
    }

    /// Returns a shift amount valid for 32-bit and 64-bit shifts
    pub fn shift_amount<R: Rng>(&self, rng: &mut R) -> u32 {
        rng.gen_range(0..32)
    }

    /// Returns a non-negative 12-bit signed immediate
    pub fn short_immediate<R: Rng>(&self, rng: &mut R) -> u32 {
        rng.gen_range(0..2048)
    }
}
