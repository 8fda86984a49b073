//! Partition key grammar shared by the uploader and the registrar
//!
//! Hive-style layout:
//! `{prefix}/year={YYYY}/month={MM}/day={DD}/{filename}`
//!
//! Month and day are always zero-padded to two digits, year to four.

use crate::error::{CoreError, Result};
use chrono::{Datelike, NaiveDate};

/// Token replaced by the reference date (`%Y%m%d`) in filename templates
pub const DATE_TOKEN: &str = "YYYYMMDD";

const YEAR_SEGMENT: (&str, usize) = ("year", 4);
const MONTH_SEGMENT: (&str, usize) = ("month", 2);
const DAY_SEGMENT: (&str, usize) = ("day", 2);

/// A date-partitioned object key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionKey {
    prefix: String,
    date: NaiveDate,
    filename: String,
}

impl PartitionKey {
    /// Build a key for `reference_date`, expanding [`DATE_TOKEN`] in the template
    pub fn new(base_prefix: &str, reference_date: NaiveDate, filename_template: &str) -> Result<Self> {
        let year = reference_date.year();
        if !(0..=9999).contains(&year) {
            return Err(CoreError::invalid_argument(format!(
                "year {} cannot be rendered as four digits",
                year
            )));
        }

        // The key must parse back: one non-empty category segment ahead of year=
        let prefix = normalize_prefix(base_prefix);
        if prefix.is_empty() || prefix.contains('/') || prefix.contains('=') {
            return Err(CoreError::invalid_argument(format!(
                "prefix '{}' must be a single path segment without '='",
                base_prefix
            )));
        }

        let filename =
            filename_template.replace(DATE_TOKEN, &reference_date.format("%Y%m%d").to_string());

        Ok(Self {
            prefix,
            date: reference_date,
            filename,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn year(&self) -> String {
        format!("{:04}", self.date.year())
    }

    pub fn month(&self) -> String {
        format!("{:02}", self.date.month())
    }

    pub fn day(&self) -> String {
        format!("{:02}", self.date.day())
    }

    /// Directory portion of the key, with trailing slash
    pub fn partition_prefix(&self) -> String {
        partition_path(&self.prefix, &self.year(), &self.month(), &self.day())
    }
}

impl std::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.partition_prefix(), self.filename)
    }
}

/// Derive the object key for a file uploaded on `reference_date`
///
/// ```
/// use chrono::NaiveDate;
/// let date = NaiveDate::from_ymd_opt(2025, 6, 24).unwrap();
/// let key = plclog_core::derive_key("plc-logs", date, "plc-data-YYYYMMDD.csv").unwrap();
/// assert_eq!(key, "plc-logs/year=2025/month=06/day=24/plc-data-20250624.csv");
/// ```
pub fn derive_key(base_prefix: &str, reference_date: NaiveDate, filename_template: &str) -> Result<String> {
    Ok(PartitionKey::new(base_prefix, reference_date, filename_template)?.to_string())
}

/// Same as [`derive_key`] but from raw calendar components, rejecting impossible dates
pub fn derive_key_from_ymd(
    base_prefix: &str,
    year: i32,
    month: u32,
    day: u32,
    filename_template: &str,
) -> Result<String> {
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        CoreError::invalid_argument(format!(
            "{:04}-{:02}-{:02} is not a valid calendar date",
            year, month, day
        ))
    })?;
    derive_key(base_prefix, date, filename_template)
}

/// Render `{prefix}/year=../month=../day=../`
pub fn partition_path(prefix: &str, year: &str, month: &str, day: &str) -> String {
    format!(
        "{}/year={}/month={}/day={}/",
        normalize_prefix(prefix),
        year,
        month,
        day
    )
}

fn normalize_prefix(prefix: &str) -> String {
    prefix.trim_matches('/').to_string()
}

/// Components recovered from an object key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    pub prefix: String,
    pub year: String,
    pub month: String,
    pub day: String,
    pub filename: Option<String>,
}

impl ParsedKey {
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            self.year.parse().ok()?,
            self.month.parse().ok()?,
            self.day.parse().ok()?,
        )
    }
}

/// Parse a decoded object key back into its partition components
///
/// Segment 0 is the category prefix, segments 1-3 must be `year=`, `month=`
/// and `day=` pairs. Anything else is [`CoreError::MalformedKey`].
pub fn parse_object_key(key: &str) -> Result<ParsedKey> {
    let segments: Vec<&str> = key.split('/').collect();
    if segments.len() < 4 {
        return Err(CoreError::malformed_key(
            key,
            format!(
                "expected at least 4 '/'-separated segments, found {}",
                segments.len()
            ),
        ));
    }

    if segments[0].is_empty() {
        return Err(CoreError::malformed_key(key, "missing category prefix"));
    }

    let year = partition_value(key, segments[1], YEAR_SEGMENT)?;
    let month = partition_value(key, segments[2], MONTH_SEGMENT)?;
    let day = partition_value(key, segments[3], DAY_SEGMENT)?;

    let filename = segments[4..].join("/");
    let parsed = ParsedKey {
        prefix: segments[0].to_string(),
        year,
        month,
        day,
        filename: (!filename.is_empty()).then_some(filename),
    };

    if parsed.date().is_none() {
        return Err(CoreError::malformed_key(
            key,
            format!(
                "{}-{}-{} is not a valid calendar date",
                parsed.year, parsed.month, parsed.day
            ),
        ));
    }

    Ok(parsed)
}

fn partition_value(key: &str, segment: &str, (name, width): (&str, usize)) -> Result<String> {
    let (label, value) = segment.split_once('=').ok_or_else(|| {
        CoreError::malformed_key(key, format!("segment '{}' lacks '='", segment))
    })?;

    if label != name {
        return Err(CoreError::malformed_key(
            key,
            format!("expected '{}=' segment, found '{}'", name, segment),
        ));
    }

    if value.len() != width || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::malformed_key(
            key,
            format!("{} must be {} digits, found '{}'", name, width, value),
        ));
    }

    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_derive_key_daily_log() {
        let key = derive_key("plc-logs", date(2025, 6, 24), "plc-data-YYYYMMDD.csv").unwrap();
        assert_eq!(key, "plc-logs/year=2025/month=06/day=24/plc-data-20250624.csv");
    }

    #[test]
    fn test_month_and_day_are_zero_padded() {
        let key = derive_key("plc-logs", date(2024, 3, 5), "f.csv").unwrap();
        assert!(key.contains("/month=03/day=05/"));

        let key = derive_key("plc-logs", date(2024, 12, 31), "f.csv").unwrap();
        assert!(key.contains("/month=12/day=31/"));
    }

    #[test]
    fn test_template_without_token_is_used_verbatim() {
        let key = derive_key("plc-logs", date(2025, 1, 2), "readings.csv").unwrap();
        assert_eq!(key, "plc-logs/year=2025/month=01/day=02/readings.csv");
    }

    #[test]
    fn test_prefix_slashes_are_trimmed() {
        let key = derive_key("/plc-logs/", date(2025, 1, 2), "a.csv").unwrap();
        assert_eq!(key, "plc-logs/year=2025/month=01/day=02/a.csv");
    }

    #[test]
    fn test_unparseable_prefix_rejected() {
        for prefix in ["", "/", "plc/logs", "kind=plc"] {
            let err = derive_key(prefix, date(2025, 1, 2), "a.csv").unwrap_err();
            assert_eq!(err.code(), ErrorCode::E001InvalidArgument, "prefix {:?}", prefix);
        }

        let key = derive_key("plc-logs", date(2025, 1, 2), "a.csv").unwrap();
        assert!(parse_object_key(&key).is_ok());
    }

    #[test]
    fn test_invalid_date_is_invalid_argument() {
        let err = derive_key_from_ymd("plc-logs", 2025, 2, 30, "a.csv").unwrap_err();
        assert_eq!(err.code(), ErrorCode::E001InvalidArgument);

        let err = derive_key_from_ymd("plc-logs", 2025, 13, 1, "a.csv").unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument { .. }));
    }

    #[test]
    fn test_five_digit_year_rejected() {
        let err = derive_key("plc-logs", date(10_000, 1, 1), "a.csv").unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument { .. }));
    }

    #[test]
    fn test_partition_key_accessors() {
        let key = PartitionKey::new("plc-logs", date(2025, 6, 4), "x-YYYYMMDD.csv").unwrap();
        assert_eq!(key.year(), "2025");
        assert_eq!(key.month(), "06");
        assert_eq!(key.day(), "04");
        assert_eq!(key.filename(), "x-20250604.csv");
        assert_eq!(key.partition_prefix(), "plc-logs/year=2025/month=06/day=04/");
    }

    #[test]
    fn test_parse_object_key() {
        let parsed = parse_object_key("plc-logs/year=2025/month=06/day=24/file.csv").unwrap();
        assert_eq!(parsed.prefix, "plc-logs");
        assert_eq!(parsed.year, "2025");
        assert_eq!(parsed.month, "06");
        assert_eq!(parsed.day, "24");
        assert_eq!(parsed.filename.as_deref(), Some("file.csv"));
    }

    #[test]
    fn test_parse_without_filename() {
        let parsed = parse_object_key("plc-logs/year=2025/month=06/day=24").unwrap();
        assert_eq!(parsed.filename, None);

        let parsed = parse_object_key("plc-logs/year=2025/month=06/day=24/").unwrap();
        assert_eq!(parsed.filename, None);
    }

    #[test]
    fn test_parse_nested_filename() {
        let parsed = parse_object_key("plc-logs/year=2025/month=06/day=24/line1/a.csv").unwrap();
        assert_eq!(parsed.filename.as_deref(), Some("line1/a.csv"));
    }

    #[test]
    fn test_parse_rejects_single_segment() {
        let err = parse_object_key("onlyoneseg").unwrap_err();
        assert!(matches!(err, CoreError::MalformedKey { .. }));
    }

    #[test]
    fn test_parse_rejects_missing_equals() {
        let err = parse_object_key("plc-logs/2025/month=06/day=24/f.csv").unwrap_err();
        assert!(matches!(err, CoreError::MalformedKey { .. }));
        assert!(err.to_string().contains("lacks '='"));
    }

    #[test]
    fn test_parse_rejects_wrong_order_and_widths() {
        assert!(parse_object_key("plc-logs/month=06/year=2025/day=24/f.csv").is_err());
        assert!(parse_object_key("plc-logs/year=2025/month=6/day=24/f.csv").is_err());
        assert!(parse_object_key("plc-logs/year=25/month=06/day=24/f.csv").is_err());
        assert!(parse_object_key("plc-logs/year=2025/month=06/day=2x/f.csv").is_err());
        assert!(parse_object_key("/year=2025/month=06/day=24/f.csv").is_err());
    }

    #[test]
    fn test_parse_rejects_impossible_date() {
        let err = parse_object_key("plc-logs/year=2025/month=02/day=30/f.csv").unwrap_err();
        assert!(err.to_string().contains("not a valid calendar date"));
    }

    #[test]
    fn test_round_trip_recovers_date() {
        let mut day = date(2023, 12, 25);
        for _ in 0..400 {
            let key = derive_key("plc-logs", day, "plc-data-YYYYMMDD.csv").unwrap();
            let parsed = parse_object_key(&key).unwrap();
            assert_eq!(parsed.date(), Some(day), "key {}", key);
            day = day.succ_opt().unwrap();
        }
    }
}
