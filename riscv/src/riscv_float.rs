//! IEEE-754 literals
//!
//! Floating-point registers are initialized from memory literals.  A literal is stored as the raw
//! bit pattern of the value split into 32-bit `.word` directives: one word for single precision,
//! two words for double precision with the low word first (RISC-V is little endian).

use crate::NumericDomain;

/// Bit pattern of a floating-point constant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatLiteral {
    Single(u32),
    Double(u64),
}

impl FloatLiteral {
    /// Encodes a value in the precision of the given domain.  Returns None for the integer domain.
    pub fn encode(domain: NumericDomain, value: f64) -> Option<FloatLiteral> {
        match domain {
            NumericDomain::Integer => None,
            NumericDomain::Single => Some(FloatLiteral::Single((value as f32).to_bits())),
            NumericDomain::Double => Some(FloatLiteral::Double(value.to_bits())),
        }
    }

    /// Returns the `.word` values of the literal, low word first
    pub fn words(&self) -> Vec<u32> {
        match self {
            FloatLiteral::Single(bits) => vec![*bits],
            FloatLiteral::Double(bits) => vec![*bits as u32, (*bits >> 32) as u32],
        }
    }

    /// Rebuilds a literal from its `.word` values, low word first
    pub fn from_words(words: &[u32]) -> Option<FloatLiteral> {
        match words {
            [w] => Some(FloatLiteral::Single(*w)),
            [lo, hi] => Some(FloatLiteral::Double(((*hi as u64) << 32) | *lo as u64)),
            _ => None,
        }
    }

    /// Decoded value of the literal
    pub fn value(&self) -> f64 {
        match self {
            FloatLiteral::Single(bits) => f32::from_bits(*bits) as f64,
            FloatLiteral::Double(bits) => f64::from_bits(*bits),
        }
    }

    /// Power-of-two alignment required by the literal, as used by the `.align` directive
    pub fn align(&self) -> u32 {
        match self {
            FloatLiteral::Single(_) => 2,
            FloatLiteral::Double(_) => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_keeps_sign() {
        let lit = FloatLiteral::encode(NumericDomain::Single, -0.98803162409).unwrap();
        let words = lit.words();
        assert_eq!(words.len(), 1);
        assert_ne!(words[0] & 0x8000_0000, 0);
        let back = FloatLiteral::from_words(&words).unwrap();
        assert_eq!(back.value(), -0.98803162409f32 as f64);
    }

    #[test]
    fn test_double_low_word_first() {
        let lit = FloatLiteral::encode(NumericDomain::Double, -0.44807361613).unwrap();
        let bits = (-0.44807361613f64).to_bits();
        assert_eq!(lit.words(), vec![bits as u32, (bits >> 32) as u32]);
        assert_eq!(FloatLiteral::from_words(&lit.words()).unwrap().value(), -0.44807361613);
    }

    #[test]
    fn test_negative_zero_and_one() {
        let one = FloatLiteral::encode(NumericDomain::Single, 1.0).unwrap();
        assert_eq!(one.words(), vec![0x3f80_0000]);
        let neg_zero = FloatLiteral::encode(NumericDomain::Double, -0.0).unwrap();
        assert_eq!(neg_zero.words(), vec![0, 0x8000_0000]);
        assert_eq!(FloatLiteral::encode(NumericDomain::Integer, 1.0), None);
        assert_eq!(FloatLiteral::from_words(&[]), None);
    }
}
