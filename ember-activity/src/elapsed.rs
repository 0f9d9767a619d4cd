use std::fmt;
use std::time::Duration;

/// Elapsed wall-clock time, displayed as seconds with three decimals (`1.234 s`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Elapsed(pub Duration);

impl Elapsed {
    pub fn as_secs_f64(&self) -> f64 {
        self.0.as_secs_f64()
    }
}

impl From<Duration> for Elapsed {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} s", self.0.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_decimals() {
        assert_eq!(Elapsed(Duration::ZERO).to_string(), "0.000 s");
        assert_eq!(Elapsed(Duration::from_millis(1234)).to_string(), "1.234 s");
        assert_eq!(Elapsed(Duration::from_secs(75)).to_string(), "75.000 s");
        assert_eq!(Elapsed(Duration::from_micros(1_234_567)).to_string(), "1.235 s");
    }
}
