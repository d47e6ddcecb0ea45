use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Monetary amount in integer minor units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(value: i64) -> Self {
        Money(value)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub const fn abs(self) -> Self {
        Money(self.0.abs())
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `None` when the result leaves the `i64` range.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_neg(self) -> Option<Self> {
        self.0.checked_neg().map(Money)
    }

    pub fn checked_abs(self) -> Option<Self> {
        self.0.checked_abs().map(Money)
    }

    /// Sum of `values`, or `None` if any partial sum leaves the `i64` range.
    pub fn checked_sum(values: impl IntoIterator<Item = Money>) -> Option<Self> {
        values.into_iter().try_fold(Money::ZERO, Money::checked_add)
    }
}

/// Percentage stored in hundredths of a percent, so `100%` is `10_000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Percent(i64);

impl Percent {
    pub const HUNDRED: Percent = Percent(10_000);

    pub const fn from_basis_points(value: i64) -> Self {
        Percent(value)
    }

    pub const fn basis_points(self) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDecimalError {
    #[error("empty decimal value")]
    Empty,
    #[error("invalid decimal value '{0}'")]
    Invalid(String),
    #[error("'{0}' has more than two fraction digits")]
    TooPrecise(String),
    #[error("'{0}' is out of range")]
    OutOfRange(String),
}

/// Parse a decimal string with at most two fraction digits into a value
/// scaled by 100, without going through floating point.
fn parse_hundredths(input: &str) -> Result<i64, ParseDecimalError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ParseDecimalError::Empty);
    }

    let (negative, digits) = match s.as_bytes()[0] {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let (whole, frac) = match digits.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (digits, ""),
    };

    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
        return Err(ParseDecimalError::Invalid(s.to_string()));
    }
    if frac.len() > 2 {
        return Err(ParseDecimalError::TooPrecise(s.to_string()));
    }

    let out_of_range = || ParseDecimalError::OutOfRange(s.to_string());
    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| out_of_range())?
    };
    let frac: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| out_of_range())? * 10,
        _ => frac.parse().map_err(|_| out_of_range())?,
    };

    let value = whole
        .checked_mul(100)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(out_of_range)?;
    Ok(if negative { -value } else { value })
}

fn write_hundredths(f: &mut fmt::Formatter<'_>, value: i64) -> fmt::Result {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    let whole = abs / 100;
    let frac = abs % 100;
    write!(f, "{sign}{whole}.{frac:02}")
}

impl FromStr for Money {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hundredths(s).map(Money)
    }
}

impl FromStr for Percent {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        parse_hundredths(s.strip_suffix('%').unwrap_or(s)).map(Percent)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hundredths(f, self.0)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hundredths(f, self.0)?;
        f.write_str("%")
    }
}

impl std::ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl std::ops::Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
