//! Synthetic vibration log generator
//!
//! Writes `record,date,time,vibration_mm_sec` rows at a fixed interval with
//! uniformly sampled readings.

use crate::error::{CoreError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::Rng;
use std::io::Write;

pub const CSV_HEADER: &str = "record,date,time,vibration_mm_sec";

/// Parameters for one generated log file
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSpec {
    pub num_records: usize,
    pub min_vibration: f64,
    pub max_vibration: f64,
    pub start: NaiveDateTime,
    pub interval_minutes: i64,
}

impl Default for GeneratorSpec {
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .unwrap_or_default();
        Self {
            num_records: 20,
            min_vibration: 1.12,
            max_vibration: 2.0,
            start,
            interval_minutes: 15,
        }
    }
}

impl GeneratorSpec {
    pub fn validate(&self) -> Result<()> {
        if self.num_records == 0 {
            return Err(CoreError::invalid_argument(
                "number of records must be greater than 0",
            ));
        }
        if !self.min_vibration.is_finite() || !self.max_vibration.is_finite() {
            return Err(CoreError::invalid_argument(
                "vibration bounds must be finite numbers",
            ));
        }
        if self.min_vibration >= self.max_vibration {
            return Err(CoreError::invalid_argument(
                "minimum vibration must be less than maximum vibration",
            ));
        }
        if self.interval_minutes < 0 {
            return Err(CoreError::invalid_argument(
                "interval must not be negative",
            ));
        }
        Ok(())
    }
}

/// What was written
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSummary {
    pub records: usize,
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
}

/// Write a header and `spec.num_records` rows to `out`
pub fn generate_vibration_csv<W: Write, R: Rng>(
    out: &mut W,
    spec: &GeneratorSpec,
    rng: &mut R,
) -> Result<GeneratorSummary> {
    spec.validate()?;

    let io_err = |e: std::io::Error| CoreError::write(&e);

    writeln!(out, "{}", CSV_HEADER).map_err(io_err)?;

    let overflow = || CoreError::invalid_argument("record timestamps overflow the supported range");

    let mut last = spec.start;
    for i in 0..spec.num_records {
        let at = spec
            .interval_minutes
            .checked_mul(i as i64)
            .and_then(Duration::try_minutes)
            .and_then(|offset| spec.start.checked_add_signed(offset))
            .ok_or_else(overflow)?;
        let reading = rng.gen_range(spec.min_vibration..=spec.max_vibration);
        let reading = (reading * 100.0).round() / 100.0;

        writeln!(
            out,
            "{},{},{},{:.2}",
            i + 1,
            at.format("%Y-%m-%d"),
            at.format("%H:%M:%S"),
            reading
        )
        .map_err(io_err)?;
        last = at;
    }

    Ok(GeneratorSummary {
        records: spec.num_records,
        first: spec.start,
        last,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generate(spec: &GeneratorSpec) -> (String, GeneratorSummary) {
        let mut buf = Vec::new();
        let mut rng = StdRng::seed_from_u64(7);
        let summary = generate_vibration_csv(&mut buf, spec, &mut rng).unwrap();
        (String::from_utf8(buf).unwrap(), summary)
    }

    #[test]
    fn test_default_spec_layout() {
        let spec = GeneratorSpec::default();
        let (csv, summary) = generate(&spec);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 21);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].starts_with("1,2025-06-01,08:00:00,"));
        assert!(lines[2].starts_with("2,2025-06-01,08:15:00,"));
        assert!(lines[20].starts_with("20,2025-06-01,12:45:00,"));
        assert_eq!(summary.records, 20);
        assert_eq!(summary.last.format("%H:%M:%S").to_string(), "12:45:00");
    }

    #[test]
    fn test_readings_within_bounds() {
        let spec = GeneratorSpec {
            num_records: 200,
            min_vibration: 0.5,
            max_vibration: 3.2,
            ..GeneratorSpec::default()
        };
        let (csv, _) = generate(&spec);
        for line in csv.lines().skip(1) {
            let value: f64 = line.rsplit(',').next().unwrap().parse().unwrap();
            assert!((0.5..=3.2).contains(&value), "{} out of range", value);
        }
    }

    #[test]
    fn test_crosses_midnight() {
        let spec = GeneratorSpec {
            num_records: 3,
            start: NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(23, 50, 0)
                .unwrap(),
            interval_minutes: 10,
            ..GeneratorSpec::default()
        };
        let (csv, _) = generate(&spec);
        assert!(csv.lines().nth(3).unwrap().starts_with("3,2025-06-02,00:10:00,"));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let spec = GeneratorSpec {
            min_vibration: 2.0,
            max_vibration: 1.0,
            ..GeneratorSpec::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let err = generate_vibration_csv(&mut Vec::new(), &spec, &mut rng).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument { .. }));
    }

    #[test]
    fn test_rejects_zero_records() {
        let spec = GeneratorSpec {
            num_records: 0,
            ..GeneratorSpec::default()
        };
        assert!(spec.validate().is_err());
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::WriteZero))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_not_an_argument_error() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = generate_vibration_csv(&mut FullDisk, &GeneratorSpec::default(), &mut rng)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::E004WriteFailed);
        assert!(matches!(
            err,
            CoreError::Write {
                kind: std::io::ErrorKind::WriteZero,
                ..
            }
        ));
    }
}
