//! Duration and date literals.
use time::{
    convert::{Day, Hour, Minute, Second},
    Date, Duration,
};

use crate::{
    common::{ElementaryTypeName, FixedPoint, LiteralError},
    core::SourceSpan,
};

const SECOND_PER_DAY: u64 = Second::per(Day) as u64;
const SECOND_PER_HOUR: u64 = Second::per(Hour) as u64;
const SECOND_PER_MINUTE: u64 = Second::per(Minute) as u64;

const OUT_OF_RANGE: LiteralError = LiteralError::OutOfRange(ElementaryTypeName::TIME);

/// Converts the fractional part of a unit into microseconds. The product
/// does not fit in 64 bits for a day so this works in 128 bits.
fn fraction_micros(femptos: u64, seconds_per_unit: u64) -> i64 {
    let micros_per_unit = seconds_per_unit as u128 * 1_000_000;
    (femptos as u128 * micros_per_unit / FixedPoint::FRACTIONAL_UNITS as u128) as i64
}

/// Converts a whole count of some unit into the `i64` that the `time`
/// constructors take. The constructors panic when the count overflows so
/// the count is scaled here first.
fn whole_units(whole: u64, scale: u64) -> Result<i64, LiteralError> {
    i64::try_from(whole as u128 * scale as u128).map_err(|_e| OUT_OF_RANGE)
}

/// Builds the interval for an amount of a unit that is at least one second.
fn interval_of(amount: &FixedPoint, seconds_per_unit: u64) -> Result<Duration, LiteralError> {
    let whole = Duration::seconds(whole_units(amount.whole, seconds_per_unit)?);
    let fraction = Duration::microseconds(fraction_micros(amount.femptos, seconds_per_unit));
    whole.checked_add(fraction).ok_or(OUT_OF_RANGE)
}

// See section 2.2.2
#[derive(Debug, PartialEq, Clone)]
pub struct DurationLiteral {
    pub span: SourceSpan,
    pub interval: Duration,
}

impl DurationLiteral {
    /// Create a new `DurationLiteral` with the given number of days.
    ///
    /// ```rust
    /// use plctype_dsl::common::FixedPoint;
    /// use plctype_dsl::time::DurationLiteral;
    /// use time::Duration;
    /// assert_eq!(DurationLiteral::days(FixedPoint::parse("1").unwrap()).unwrap().interval, Duration::days(1));
    /// ```
    pub fn days(days: FixedPoint) -> Result<Self, LiteralError> {
        Ok(Self {
            interval: interval_of(&days, SECOND_PER_DAY)?,
            span: days.span,
        })
    }

    pub fn hours(hours: FixedPoint) -> Result<Self, LiteralError> {
        Ok(Self {
            interval: interval_of(&hours, SECOND_PER_HOUR)?,
            span: hours.span,
        })
    }

    pub fn minutes(minutes: FixedPoint) -> Result<Self, LiteralError> {
        Ok(Self {
            interval: interval_of(&minutes, SECOND_PER_MINUTE)?,
            span: minutes.span,
        })
    }

    /// Create a new `DurationLiteral` with the given number of seconds.
    ///
    /// ```rust
    /// use plctype_dsl::common::FixedPoint;
    /// use plctype_dsl::time::DurationLiteral;
    /// use time::Duration;
    /// assert_eq!(DurationLiteral::seconds(FixedPoint::parse("1.001").unwrap()).unwrap().interval, Duration::seconds(1) + Duration::milliseconds(1));
    /// ```
    pub fn seconds(seconds: FixedPoint) -> Result<Self, LiteralError> {
        let whole = Duration::seconds(whole_units(seconds.whole, 1)?);
        let fraction = Duration::nanoseconds((seconds.femptos / 1_000_000) as i64);
        Ok(Self {
            span: seconds.span,
            interval: whole.checked_add(fraction).ok_or(OUT_OF_RANGE)?,
        })
    }

    pub fn milliseconds(millis: FixedPoint) -> Result<Self, LiteralError> {
        let whole = Duration::milliseconds(whole_units(millis.whole, 1)?);
        let fraction = Duration::nanoseconds((millis.femptos / 1_000_000_000) as i64);
        Ok(Self {
            span: millis.span,
            interval: whole.checked_add(fraction).ok_or(OUT_OF_RANGE)?,
        })
    }

    pub fn microseconds(micros: FixedPoint) -> Result<Self, LiteralError> {
        let whole = Duration::microseconds(whole_units(micros.whole, 1)?);
        let fraction = Duration::nanoseconds((micros.femptos / 1_000_000_000_000) as i64);
        Ok(Self {
            span: micros.span,
            interval: whole.checked_add(fraction).ok_or(OUT_OF_RANGE)?,
        })
    }

    pub fn nanoseconds(nanos: FixedPoint) -> Result<Self, LiteralError> {
        Ok(Self {
            interval: Duration::nanoseconds(whole_units(nanos.whole, 1)?),
            span: nanos.span,
        })
    }

    pub fn plus(&self, other: DurationLiteral) -> Result<Self, LiteralError> {
        Ok(DurationLiteral {
            span: self.span.clone(),
            interval: self
                .interval
                .checked_add(other.interval)
                .ok_or(OUT_OF_RANGE)?,
        })
    }

    pub fn negated(self) -> Self {
        DurationLiteral {
            span: self.span,
            interval: -self.interval,
        }
    }
}

// See section 2.2.3
#[derive(Debug, PartialEq, Clone)]
pub struct DateLiteral {
    value: Date,
}

impl DateLiteral {
    pub fn new(value: Date) -> Self {
        Self { value }
    }

    pub fn value(&self) -> Date {
        self.value
    }
}
