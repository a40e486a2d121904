//! NMEA 0183 sentence decoding
//!
//! Turns the raw text accumulated from a positioning source into a [`Fix`].
//! Two sentence types carry a position:
//! - **GGA**: latitude, longitude, altitude, satellite count, fix quality
//! - **RMC**: latitude, longitude, speed over ground, validity flag
//!
//! Any talker prefix is accepted (`$GPGGA`, `$GNGGA`, `$GLRMC`, ...).
//! Decoding is pure: the caller supplies the capture timestamp.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Fix, FixQuality};

/// Meters per second in one knot
pub const KNOTS_TO_METERS_PER_SECOND: f64 = 1852.0 / 3600.0;

/// Number of comma-separated fields in a complete GGA sentence
const GGA_FIELDS: usize = 15;

/// Minimum number of fields in an RMC sentence (NMEA 2.0; 2.3 adds a mode field)
const RMC_FIELDS: usize = 12;

/// Position-carrying sentence types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceKind {
    Gga,
    Rmc,
}

/// Reason a single sentence was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SentenceError {
    #[error("sentence does not start with '$'")]
    MissingStart,

    #[error("unsupported sentence type {0}")]
    Unsupported(String),

    #[error("checksum mismatch: sentence says {expected:02X}, computed {computed:02X}")]
    ChecksumMismatch { expected: u8, computed: u8 },

    #[error("malformed checksum {0:?}")]
    MalformedChecksum(String),

    #[error("expected at least {expected} fields, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("receiver reports no position fix")]
    NoFix,

    #[error("coordinate out of range: {latitude}, {longitude}")]
    OutOfRange { latitude: f64, longitude: f64 },
}

/// Outcome of decoding one batch of raw text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeReport {
    /// First fix decoded from the batch, if any
    pub fix: Option<Fix>,

    /// GGA/RMC sentences that were skipped, in input order
    pub rejected: Vec<SentenceError>,

    /// Number of `$`-prefixed lines examined before decoding stopped
    pub sentences: usize,
}

/// Decode the first usable fix from a batch of raw NMEA text.
///
/// Returns `None` when the batch holds no decodable position, which is the
/// normal "no data yet" case rather than an error.
pub fn decode(raw: &str, captured_at: DateTime<Utc>) -> Option<Fix> {
    decode_with_report(raw, captured_at).fix
}

/// Decode a batch, keeping track of the sentences that were rejected.
///
/// Lines that do not begin with `$` are ignored. A recognized sentence that
/// fails checksum or field validation is recorded in
/// [`DecodeReport::rejected`] and scanning continues with the next line.
pub fn decode_with_report(raw: &str, captured_at: DateTime<Utc>) -> DecodeReport {
    let mut report = DecodeReport::default();

    for line in raw.split('\n') {
        let line = line.trim();
        if !line.starts_with('$') {
            continue;
        }
        report.sentences += 1;

        match parse_sentence(line, captured_at) {
            Ok(fix) => {
                report.fix = Some(fix);
                break;
            }
            Err(SentenceError::Unsupported(_)) => {}
            Err(err) => {
                tracing::debug!(sentence = line, error = %err, "Skipping NMEA sentence");
                report.rejected.push(err);
            }
        }
    }

    report
}

/// Decode raw bytes, replacing invalid UTF-8 sequences
pub fn decode_bytes(raw: &[u8], captured_at: DateTime<Utc>) -> DecodeReport {
    decode_with_report(&String::from_utf8_lossy(raw), captured_at)
}

/// Parse a single sentence into a fix
pub fn parse_sentence(line: &str, captured_at: DateTime<Utc>) -> Result<Fix, SentenceError> {
    let sentence = line.trim().strip_prefix('$').ok_or(SentenceError::MissingStart)?;
    let (body, declared) = match sentence.split_once('*') {
        Some((body, declared)) => (body, Some(declared)),
        None => (sentence, None),
    };

    let fields: Vec<&str> = body.split(',').collect();
    let kind = sentence_kind(fields[0])
        .ok_or_else(|| SentenceError::Unsupported(fields[0].to_string()))?;

    if let Some(declared) = declared {
        verify_checksum(body, declared)?;
    }

    match kind {
        SentenceKind::Gga => parse_gga(&fields, captured_at),
        SentenceKind::Rmc => parse_rmc(&fields, captured_at),
    }
}

/// XOR of every byte between `$` and `*`
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, b| acc ^ b)
}

/// Wrap a sentence body in `$...*HH`
pub fn with_checksum(body: &str) -> String {
    format!("${}*{:02X}", body, checksum(body))
}

fn verify_checksum(body: &str, declared: &str) -> Result<(), SentenceError> {
    let declared = declared.trim();
    if declared.len() != 2 {
        return Err(SentenceError::MalformedChecksum(declared.to_string()));
    }
    let expected = u8::from_str_radix(declared, 16)
        .map_err(|_| SentenceError::MalformedChecksum(declared.to_string()))?;
    let computed = checksum(body);

    if expected != computed {
        return Err(SentenceError::ChecksumMismatch { expected, computed });
    }
    Ok(())
}

fn sentence_kind(address: &str) -> Option<SentenceKind> {
    if address.len() != 5 {
        return None;
    }
    match address.get(2..)? {
        "GGA" => Some(SentenceKind::Gga),
        "RMC" => Some(SentenceKind::Rmc),
        _ => None,
    }
}

fn parse_gga(fields: &[&str], captured_at: DateTime<Utc>) -> Result<Fix, SentenceError> {
    require_fields(fields, GGA_FIELDS)?;

    let quality_code: u8 = parse_required(fields[6], "fix quality")?;
    if quality_code == 0 {
        return Err(SentenceError::NoFix);
    }
    let quality = FixQuality::from_gga(quality_code).ok_or_else(|| SentenceError::InvalidField {
        field: "fix quality",
        value: fields[6].to_string(),
    })?;

    let latitude = parse_coordinate(fields[2], fields[3], Axis::Latitude)?;
    let longitude = parse_coordinate(fields[4], fields[5], Axis::Longitude)?;
    let mut fix = build_fix(latitude, longitude, captured_at)?.with_quality(quality);

    if let Some(satellites) = parse_optional::<u8>(fields[7], "satellite count")? {
        fix = fix.with_satellites(satellites);
    }
    if let Some(altitude) = parse_optional::<f64>(fields[9], "altitude")? {
        fix = fix.with_altitude(altitude);
    }

    Ok(fix)
}

fn parse_rmc(fields: &[&str], captured_at: DateTime<Utc>) -> Result<Fix, SentenceError> {
    require_fields(fields, RMC_FIELDS)?;

    match fields[2] {
        "A" => {}
        "V" => return Err(SentenceError::NoFix),
        "" => return Err(SentenceError::MissingField("status")),
        other => {
            return Err(SentenceError::InvalidField {
                field: "status",
                value: other.to_string(),
            })
        }
    }

    let latitude = parse_coordinate(fields[3], fields[4], Axis::Latitude)?;
    let longitude = parse_coordinate(fields[5], fields[6], Axis::Longitude)?;
    let mut fix = build_fix(latitude, longitude, captured_at)?;

    if let Some(knots) = parse_optional::<f64>(fields[7], "speed")? {
        if !knots.is_finite() || knots < 0.0 {
            return Err(SentenceError::InvalidField {
                field: "speed",
                value: fields[7].to_string(),
            });
        }
        fix = fix.with_speed(knots * KNOTS_TO_METERS_PER_SECOND);
    }

    Ok(fix)
}

fn require_fields(fields: &[&str], expected: usize) -> Result<(), SentenceError> {
    if fields.len() < expected {
        return Err(SentenceError::Truncated {
            expected,
            found: fields.len(),
        });
    }
    Ok(())
}

fn build_fix(
    latitude: f64,
    longitude: f64,
    captured_at: DateTime<Utc>,
) -> Result<Fix, SentenceError> {
    Fix::new(latitude, longitude, captured_at)
        .map_err(|_| SentenceError::OutOfRange { latitude, longitude })
}

fn parse_required<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
) -> Result<T, SentenceError> {
    parse_optional(value, field)?.ok_or(SentenceError::MissingField(field))
}

fn parse_optional<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
) -> Result<Option<T>, SentenceError> {
    if value.is_empty() {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| SentenceError::InvalidField {
        field,
        value: value.to_string(),
    })
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn name(self) -> &'static str {
        match self {
            Axis::Latitude => "latitude",
            Axis::Longitude => "longitude",
        }
    }

    fn hemisphere_name(self) -> &'static str {
        match self {
            Axis::Latitude => "latitude hemisphere",
            Axis::Longitude => "longitude hemisphere",
        }
    }

    fn degree_digits(self) -> usize {
        match self {
            Axis::Latitude => 2,
            Axis::Longitude => 3,
        }
    }

    /// Sign applied for a hemisphere letter, `None` if the letter is wrong for this axis
    fn sign(self, hemisphere: &str) -> Option<f64> {
        match (self, hemisphere) {
            (Axis::Latitude, "N") | (Axis::Longitude, "E") => Some(1.0),
            (Axis::Latitude, "S") | (Axis::Longitude, "W") => Some(-1.0),
            _ => None,
        }
    }
}

/// Parse `ddmm.mmmm` / `dddmm.mmmm` plus hemisphere into signed degrees
fn parse_coordinate(value: &str, hemisphere: &str, axis: Axis) -> Result<f64, SentenceError> {
    if value.is_empty() {
        return Err(SentenceError::MissingField(axis.name()));
    }
    if hemisphere.is_empty() {
        return Err(SentenceError::MissingField(axis.hemisphere_name()));
    }

    let invalid = || SentenceError::InvalidField {
        field: axis.name(),
        value: value.to_string(),
    };

    let sign = axis.sign(hemisphere).ok_or_else(|| SentenceError::InvalidField {
        field: axis.hemisphere_name(),
        value: hemisphere.to_string(),
    })?;

    // Line noise survives lossy UTF-8 decoding as multi-byte characters
    if !value.is_ascii() {
        return Err(invalid());
    }

    // Minutes always occupy the two digits before the decimal point
    let dot = value.find('.').unwrap_or(value.len());
    let split = dot.checked_sub(2).filter(|&s| s >= 1).ok_or_else(invalid)?;
    let (degrees, minutes) = value.split_at(split);

    if degrees.len() > axis.degree_digits() || !degrees.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if !minutes.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return Err(invalid());
    }

    let degrees: f64 = degrees.parse().map_err(|_| invalid())?;
    let minutes: f64 = minutes.parse().map_err(|_| invalid())?;
    if !(0.0..60.0).contains(&minutes) {
        return Err(invalid());
    }

    Ok(sign * (degrees + minutes / 60.0))
}

/// Render a fix as a GGA sentence with checksum
pub fn encode_gga(fix: &Fix) -> String {
    let (lat, ns) = format_coordinate(fix.latitude, Axis::Latitude);
    let (lon, ew) = format_coordinate(fix.longitude, Axis::Longitude);
    let quality = fix.quality.unwrap_or(FixQuality::Gps).code();

    let body = format!(
        "GPGGA,{},{},{},{},{},{},{:02},0.9,{:.1},M,0.0,M,,",
        format_time(fix.captured_at),
        lat,
        ns,
        lon,
        ew,
        quality,
        fix.satellites.unwrap_or(0),
        fix.altitude.unwrap_or(0.0),
    );
    with_checksum(&body)
}

/// Render a fix as an RMC sentence with checksum
pub fn encode_rmc(fix: &Fix) -> String {
    let (lat, ns) = format_coordinate(fix.latitude, Axis::Latitude);
    let (lon, ew) = format_coordinate(fix.longitude, Axis::Longitude);
    let knots = fix.speed.unwrap_or(0.0) / KNOTS_TO_METERS_PER_SECOND;

    let body = format!(
        "GPRMC,{},A,{},{},{},{},{:.1},,{},,,A",
        format_time(fix.captured_at),
        lat,
        ns,
        lon,
        ew,
        knots,
        fix.captured_at.format("%d%m%y"),
    );
    with_checksum(&body)
}

fn format_time(at: DateTime<Utc>) -> String {
    format!("{}.00", at.format("%H%M%S"))
}

fn format_coordinate(value: f64, axis: Axis) -> (String, &'static str) {
    let hemisphere = match (axis, value < 0.0) {
        (Axis::Latitude, false) => "N",
        (Axis::Latitude, true) => "S",
        (Axis::Longitude, false) => "E",
        (Axis::Longitude, true) => "W",
    };

    // Work in ten-thousandths of a minute so rounding carries into degrees
    let ticks = (value.abs() * 60.0 * 10_000.0).round() as u64;
    let degrees = ticks / 600_000;
    let minutes = (ticks % 600_000) as f64 / 10_000.0;

    let text = match axis {
        Axis::Latitude => format!("{:02}{:07.4}", degrees, minutes),
        Axis::Longitude => format!("{:03}{:07.4}", degrees, minutes),
    };
    (text, hemisphere)
}
