//! Spawn ids: a 9-digit base followed by a checksum digit.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const BASE_MIN: u64 = 100_000_000;
const BASE_MAX: u64 = 999_999_999;

/// Ten-digit id whose last digit is the digit sum of the first nine, mod 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpawnId(pub u64);

/// Sum of the decimal digits of `base`, mod 10.
pub fn checksum(base: u64) -> u64 {
    let mut sum = 0;
    let mut rest = base;
    while rest > 0 {
        sum += rest % 10;
        rest /= 10;
    }
    sum % 10
}

impl SpawnId {
    /// Append the checksum digit. `None` unless `base` has exactly 9 digits.
    pub fn from_base(base: u64) -> Option<Self> {
        (BASE_MIN..=BASE_MAX)
            .contains(&base)
            .then(|| SpawnId(base * 10 + checksum(base)))
    }

    pub fn generate(rng: &mut impl Rng) -> Self {
        let base = rng.gen_range(BASE_MIN..=BASE_MAX);
        SpawnId(base * 10 + checksum(base))
    }

    pub fn base(&self) -> u64 {
        self.0 / 10
    }

    pub fn check_digit(&self) -> u64 {
        self.0 % 10
    }

    pub fn is_valid(&self) -> bool {
        (BASE_MIN..=BASE_MAX).contains(&self.base()) && checksum(self.base()) == self.check_digit()
    }
}

impl fmt::Display for SpawnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn check_digit_is_digit_sum_mod_ten() {
        // 1+2+3+4+5+6+7+8+9 = 45
        let id = SpawnId::from_base(123_456_789).unwrap();
        assert_eq!(id.0, 1_234_567_895);
        assert!(id.is_valid());
    }

    #[test]
    fn generated_ids_verify() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let id = SpawnId::generate(&mut rng);
            assert!(id.is_valid(), "{id}");
            assert_eq!(id.0.to_string().len(), 10);
        }
    }

    #[test]
    fn tampered_and_short_ids_fail() {
        assert!(!SpawnId(1_234_567_894).is_valid());
        assert!(!SpawnId(12_345).is_valid());
        assert!(SpawnId::from_base(99_999_999).is_none());
    }
}
