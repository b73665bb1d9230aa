use crate::error::{AudioError, AudioResult};
use std::fmt;
use std::str::FromStr;

/// Exact rational rate (frames or samples per second)
///
/// Rates are kept in lowest terms and never converted to floating point for
/// any sample-count derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RationalRate {
    numerator: u64,
    denominator: u64,
}

impl RationalRate {
    /// NTSC video frame rate (30000/1001)
    pub const NTSC: RationalRate = RationalRate {
        numerator: 30000,
        denominator: 1001,
    };

    /// PAL/SECAM video frame rate (25/1)
    pub const PAL: RationalRate = RationalRate {
        numerator: 25,
        denominator: 1,
    };

    /// Create a rate, reduced to lowest terms
    pub fn new(numerator: u64, denominator: u64) -> AudioResult<Self> {
        if numerator == 0 || denominator == 0 {
            return Err(AudioError::InvalidRate(format!(
                "{}/{} must have a non-zero numerator and denominator",
                numerator, denominator
            )));
        }

        let g = gcd(numerator, denominator);
        Ok(RationalRate {
            numerator: numerator / g,
            denominator: denominator / g,
        })
    }

    /// Create an integral rate such as an audio sample rate in Hz
    pub fn from_integer(rate: u64) -> AudioResult<Self> {
        Self::new(rate, 1)
    }

    /// Numerator in lowest terms
    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    /// Denominator in lowest terms
    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    /// Approximate value, for display and seconds reporting only
    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Convert a count of units at this rate into seconds
    pub fn count_to_secs(&self, count: i64) -> f64 {
        count as f64 * self.denominator as f64 / self.numerator as f64
    }
}

impl fmt::Display for RationalRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl FromStr for RationalRate {
    type Err = AudioError;

    /// Parse `"30000/1001"` or `"25"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u64>()
                .map_err(|e| AudioError::InvalidRate(format!("{:?}: {}", s, e)))
        };

        match s.split_once('/') {
            Some((num, den)) => Self::new(parse(num)?, parse(den)?),
            None => Self::new(parse(s)?, 1),
        }
    }
}

/// Greatest common divisor
pub(crate) fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
