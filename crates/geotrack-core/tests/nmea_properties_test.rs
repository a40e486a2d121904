//! Property tests for the NMEA decoder

use chrono::Utc;
use geotrack_core::models::Fix;
use geotrack_core::nmea::{decode, decode_bytes, decode_with_report, encode_gga, encode_rmc};
use proptest::prelude::*;

proptest! {
    #[test]
    fn decoded_fixes_stay_in_range(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
        let fix = Fix::new(lat, lon, Utc::now()).unwrap();
        let decoded = decode(&encode_gga(&fix), fix.captured_at).unwrap();

        prop_assert!((-90.0..=90.0).contains(&decoded.latitude));
        prop_assert!((-180.0..=180.0).contains(&decoded.longitude));
        prop_assert!((decoded.latitude - lat).abs() < 1e-5);
        prop_assert!((decoded.longitude - lon).abs() < 1e-5);
    }

    #[test]
    fn text_without_sentence_start_never_decodes(text in "[^$]*") {
        let report = decode_with_report(&text, Utc::now());
        prop_assert!(report.fix.is_none());
        prop_assert_eq!(report.sentences, 0);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = decode_bytes(&bytes, Utc::now());
    }

    #[test]
    fn arbitrary_sentence_fields_never_panic(
        address in prop::sample::select(vec!["$GPGGA,", "$GPRMC,", "$GNGGA,", "$GNRMC,"]),
        fields in proptest::collection::vec(any::<u8>(), 0..160),
    ) {
        let mut line = address.as_bytes().to_vec();
        line.extend(fields);
        line.extend_from_slice(b"\r\n");

        let report = decode_bytes(&line, Utc::now());
        if let Some(fix) = report.fix {
            prop_assert!((-90.0..=90.0).contains(&fix.latitude));
        }
    }

    #[test]
    fn single_corrupted_byte_never_panics(
        lat in -80.0f64..80.0,
        lon in -170.0f64..170.0,
        position in 1usize..60,
        byte in any::<u8>(),
        keep_checksum in any::<bool>(),
    ) {
        let fix = Fix::new(lat, lon, Utc::now()).unwrap();
        let encoded = encode_gga(&fix);
        let sentence = if keep_checksum {
            encoded.as_str()
        } else {
            encoded.split('*').next().unwrap_or_default()
        };

        let mut bytes = sentence.as_bytes().to_vec();
        let index = position.min(bytes.len() - 1);
        bytes[index] = byte;

        let report = decode_bytes(&bytes, fix.captured_at);
        if let Some(decoded) = report.fix {
            prop_assert!((-90.0..=90.0).contains(&decoded.latitude));
            prop_assert!((-180.0..=180.0).contains(&decoded.longitude));
        }
    }

    #[test]
    fn corrupt_sentence_does_not_hide_later_fix(lat in -80.0f64..80.0, lon in -170.0f64..170.0) {
        let fix = Fix::new(lat, lon, Utc::now()).unwrap();
        let good = encode_rmc(&fix);
        let corrupt = good.replacen("GPRMC,", "GPRMC,9", 1);
        let batch = format!("{}\r\n{}\r\n", corrupt, good);

        let report = decode_with_report(&batch, fix.captured_at);
        prop_assert!(report.fix.is_some());
        prop_assert_eq!(report.rejected.len(), 1);
    }
}
