//! Logical types layered on primitive schema types.
//!
//! A logical type is recognised by comparing the schema name against a small closed
//! set of identifiers. Each logical type has a physical representation (what goes on
//! the wire) and a logical runtime form; the `to_logical` / `from_logical` functions in
//! the submodules convert between the two.
//!
//! | Logical type | Physical type | Physical value                  | Logical form       |
//! |--------------|---------------|---------------------------------|--------------------|
//! | Date         | int32         | days since 1970-01-01           | `NaiveDate`        |
//! | Time         | int32         | millis since midnight           | `NaiveTime`        |
//! | Timestamp    | int64         | millis since the epoch          | `DateTime<Utc>`    |
//! | Decimal      | bytes         | big-endian two's complement     | `Decimal`          |

use crate::schema::SchemaType;

/// Recognised logical types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Date,
    Time,
    Timestamp,
    Decimal,
}

impl LogicalType {
    /// Match a schema name against the known logical type identifiers.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            date::LOGICAL_NAME => Some(Self::Date),
            time::LOGICAL_NAME => Some(Self::Time),
            timestamp::LOGICAL_NAME => Some(Self::Timestamp),
            decimal::LOGICAL_NAME => Some(Self::Decimal),
            _ => None,
        }
    }

    /// Schema name identifying this logical type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Date => date::LOGICAL_NAME,
            Self::Time => time::LOGICAL_NAME,
            Self::Timestamp => timestamp::LOGICAL_NAME,
            Self::Decimal => decimal::LOGICAL_NAME,
        }
    }

    /// Primitive type the logical type is layered on.
    pub fn physical_type(&self) -> SchemaType {
        match self {
            Self::Date | Self::Time => SchemaType::Int32,
            Self::Timestamp => SchemaType::Int64,
            Self::Decimal => SchemaType::Bytes,
        }
    }
}

pub mod date {
    use crate::error::{Result, TypesError};
    use chrono::{Duration, NaiveDate};

    pub const LOGICAL_NAME: &str = "org.apache.kafka.connect.data.Date";

    fn epoch() -> NaiveDate {
        NaiveDate::default()
    }

    /// Days since the epoch to a calendar date.
    pub fn to_logical(days: i32) -> Result<NaiveDate> {
        epoch()
            .checked_add_signed(Duration::days(i64::from(days)))
            .ok_or(TypesError::OutOfRange {
                logical: "Date",
                value: i64::from(days),
            })
    }

    /// Days since the epoch to a proleptic Gregorian `(year, month, day)`.
    ///
    /// Unlike [`to_logical`] this covers every day count, including those beyond the
    /// range of [`NaiveDate`].
    pub fn civil_from_days(days: i64) -> (i64, u32, u32) {
        // Shift the epoch to 0000-03-01 so leap days fall at the end of each year
        let z = days + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z.rem_euclid(146_097);
        let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
        let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
        let year = yoe + era * 400 + i64::from(month <= 2);
        (year, month, day)
    }

    /// Calendar date to days since the epoch.
    pub fn from_logical(date: &NaiveDate) -> Result<i32> {
        let days = date.signed_duration_since(epoch()).num_days();
        i32::try_from(days).map_err(|_| TypesError::OutOfRange {
            logical: "Date",
            value: days,
        })
    }
}

pub mod time {
    use crate::error::{Result, TypesError};
    use chrono::{NaiveTime, Timelike};

    pub const LOGICAL_NAME: &str = "org.apache.kafka.connect.data.Time";

    const MILLIS_PER_DAY: i32 = 24 * 60 * 60 * 1000;

    /// Millis since midnight to a time of day.
    pub fn to_logical(millis: i32) -> Result<NaiveTime> {
        let out_of_range = || TypesError::OutOfRange {
            logical: "Time",
            value: i64::from(millis),
        };
        if !(0..MILLIS_PER_DAY).contains(&millis) {
            return Err(out_of_range());
        }
        let secs = (millis / 1000) as u32;
        let nanos = (millis % 1000) as u32 * 1_000_000;
        NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos).ok_or_else(out_of_range)
    }

    /// Time of day to millis since midnight. Sub-millisecond precision is truncated.
    pub fn from_logical(time: &NaiveTime) -> i32 {
        (time.num_seconds_from_midnight() * 1000 + time.nanosecond().min(999_999_999) / 1_000_000)
            as i32
    }
}

pub mod timestamp {
    use crate::error::{Result, TypesError};
    use chrono::{DateTime, Utc};

    pub const LOGICAL_NAME: &str = "org.apache.kafka.connect.data.Timestamp";

    /// Millis since the epoch to an instant.
    pub fn to_logical(millis: i64) -> Result<DateTime<Utc>> {
        DateTime::from_timestamp_millis(millis).ok_or(TypesError::OutOfRange {
            logical: "Timestamp",
            value: millis,
        })
    }

    /// Instant to millis since the epoch.
    pub fn from_logical(instant: &DateTime<Utc>) -> i64 {
        instant.timestamp_millis()
    }
}

pub mod decimal {
    use crate::error::{Result, TypesError};
    use crate::schema::Schema;
    use rust_decimal::Decimal;

    pub const LOGICAL_NAME: &str = "org.apache.kafka.connect.data.Decimal";

    /// Schema parameter carrying the decimal scale.
    pub const SCALE_FIELD: &str = "scale";

    /// Read the scale parameter of a decimal schema.
    pub fn scale(schema: &Schema) -> Result<u32> {
        let raw = schema.parameter(SCALE_FIELD).ok_or_else(|| {
            TypesError::InvalidDecimal(format!(
                "schema {} has no '{SCALE_FIELD}' parameter",
                schema.describe()
            ))
        })?;
        raw.trim()
            .parse()
            .map_err(|e| TypesError::InvalidDecimal(format!("invalid scale '{raw}': {e}")))
    }

    /// Unscaled big-endian two's-complement bytes to a decimal.
    pub fn to_logical(bytes: &[u8], scale: u32) -> Result<Decimal> {
        if bytes.len() > 16 {
            return Err(TypesError::InvalidDecimal(format!(
                "unscaled value of {} bytes exceeds 128 bits",
                bytes.len()
            )));
        }

        let is_negative = bytes.first().is_some_and(|b| b & 0x80 != 0);
        let mut unscaled: i128 = if is_negative { -1 } else { 0 };
        for &byte in bytes {
            unscaled = (unscaled << 8) | i128::from(byte);
        }

        Decimal::try_from_i128_with_scale(unscaled, scale)
            .map_err(|e| TypesError::InvalidDecimal(format!("{unscaled}e-{scale}: {e}")))
    }

    /// Decimal to unscaled big-endian two's-complement bytes at the given scale.
    ///
    /// The encoding is minimal: redundant leading sign bytes are stripped.
    pub fn from_logical(value: &Decimal, scale: u32) -> Result<Vec<u8>> {
        let mut rescaled = *value;
        rescaled.rescale(scale);
        if rescaled.scale() != scale {
            return Err(TypesError::InvalidDecimal(format!(
                "{value} cannot be represented with scale {scale}"
            )));
        }

        let bytes = rescaled.mantissa().to_be_bytes();
        let mut start = 0;
        while start < bytes.len() - 1 {
            let (head, next) = (bytes[start], bytes[start + 1]);
            let redundant =
                (head == 0x00 && next & 0x80 == 0) || (head == 0xFF && next & 0x80 != 0);
            if !redundant {
                break;
            }
            start += 1;
        }
        Ok(bytes[start..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_logical_names() {
        for logical in [
            LogicalType::Date,
            LogicalType::Time,
            LogicalType::Timestamp,
            LogicalType::Decimal,
        ] {
            assert_eq!(LogicalType::from_name(logical.name()), Some(logical));
        }
        assert_eq!(LogicalType::from_name("date"), None);
        assert_eq!(LogicalType::Time.physical_type(), SchemaType::Int32);
    }

    #[test]
    fn test_date_transforms() {
        assert_eq!(
            date::to_logical(0).unwrap(),
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
        );
        assert_eq!(
            date::to_logical(19723).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(
            date::to_logical(-1).unwrap(),
            NaiveDate::from_ymd_opt(1969, 12, 31).unwrap()
        );
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(date::from_logical(&d).unwrap(), 19723);
    }

    #[test]
    fn test_civil_from_days() {
        for days in (-800_000..3_000_000).step_by(997).chain([-719_163, -1, 0, 19_723]) {
            let d = date::to_logical(days).unwrap();
            assert_eq!(
                date::civil_from_days(i64::from(days)),
                (i64::from(d.year()), d.month(), d.day()),
                "days = {days}"
            );
        }

        assert_eq!(date::civil_from_days(i64::from(i32::MAX)), (5_881_580, 7, 11));
        assert_eq!(date::civil_from_days(i64::from(i32::MIN)), (-5_877_641, 6, 23));
        assert!(date::to_logical(i32::MAX).is_err());
    }

    #[test]
    fn test_time_transforms() {
        let t = time::to_logical(45_296_789).unwrap();
        assert_eq!(t, NaiveTime::from_hms_milli_opt(12, 34, 56, 789).unwrap());
        assert_eq!(time::from_logical(&t), 45_296_789);

        assert!(time::to_logical(-1).is_err());
        assert!(time::to_logical(86_400_000).is_err());
    }

    #[test]
    fn test_timestamp_transforms() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(timestamp::from_logical(&instant), 1_704_110_400_000);
        assert_eq!(timestamp::to_logical(1_704_110_400_000).unwrap(), instant);
        assert!(timestamp::to_logical(i64::MAX).is_err());
    }

    #[test]
    fn test_decimal_from_bytes() {
        // 12345 = 0x3039, scale 2 => 123.45
        let d = decimal::to_logical(&[0x30, 0x39], 2).unwrap();
        assert_eq!(d, Decimal::from_str("123.45").unwrap());

        // -1 as a single byte
        let d = decimal::to_logical(&[0xFF], 0).unwrap();
        assert_eq!(d, Decimal::from(-1));

        // -12345 = 0xCFC7
        let d = decimal::to_logical(&[0xCF, 0xC7], 3).unwrap();
        assert_eq!(d, Decimal::from_str("-12.345").unwrap());

        assert_eq!(decimal::to_logical(&[], 0).unwrap(), Decimal::ZERO);
        assert!(decimal::to_logical(&[0x01; 17], 0).is_err());
    }

    #[test]
    fn test_decimal_to_bytes() {
        let d = Decimal::from_str("123.45").unwrap();
        assert_eq!(decimal::from_logical(&d, 2).unwrap(), vec![0x30, 0x39]);

        let d = Decimal::from_str("-12.345").unwrap();
        assert_eq!(decimal::from_logical(&d, 3).unwrap(), vec![0xCF, 0xC7]);

        // 128 needs a leading zero byte to stay positive
        assert_eq!(
            decimal::from_logical(&Decimal::from(128), 0).unwrap(),
            vec![0x00, 0x80]
        );

        // Rescaling widens the unscaled value
        let d = Decimal::from_str("1.2").unwrap();
        assert_eq!(decimal::from_logical(&d, 2).unwrap(), vec![120]);
    }
}
