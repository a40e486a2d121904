use async_trait::async_trait;
use chrono::Utc;
use geotrack_core::error::Result;
use geotrack_core::models::{Fix, FixQuality};
use geotrack_core::nmea;
use geotrack_core::ports::PositionSource;

/// Distance covered per read
pub const DEFAULT_STEP_METERS: f64 = 25.0;

/// Reads spent walking out before turning back
pub const DEFAULT_LEG_READS: u64 = 8;

const WALKING_SPEED: f64 = 1.4;

/// Deterministic receiver walking away from a point and back
///
/// Each read yields a GGA and an RMC sentence for the next position on the
/// walk. Optional dropouts return empty reads to exercise lost-fix handling.
pub struct SimulatorSource {
    origin: (f64, f64),
    bearing: f64,
    step_meters: f64,
    leg_reads: u64,
    dropout: Option<(u64, u64)>,
    tick: u64,
}

impl SimulatorSource {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            origin: (latitude, longitude),
            bearing: 0.0,
            step_meters: DEFAULT_STEP_METERS,
            leg_reads: DEFAULT_LEG_READS,
            dropout: None,
            tick: 0,
        }
    }

    pub fn with_bearing(mut self, degrees: f64) -> Self {
        self.bearing = degrees;
        self
    }

    pub fn with_step(mut self, meters: f64) -> Self {
        self.step_meters = meters;
        self
    }

    pub fn with_leg(mut self, reads: u64) -> Self {
        self.leg_reads = reads.max(1);
        self
    }

    /// Return `length` empty reads at the end of every `every` reads
    pub fn with_dropout(mut self, every: u64, length: u64) -> Self {
        self.dropout = (every > 0 && length > 0).then_some((every, length.min(every)));
        self
    }

    /// Distance from the origin at read number `tick`
    pub fn offset_at(&self, tick: u64) -> f64 {
        let phase = tick % (2 * self.leg_reads);
        let steps = if phase <= self.leg_reads { phase } else { 2 * self.leg_reads - phase };
        steps as f64 * self.step_meters
    }

    fn in_dropout(&self, tick: u64) -> bool {
        match self.dropout {
            Some((every, length)) => tick % every >= every - length,
            None => false,
        }
    }

    fn fix_at(&self, tick: u64) -> Result<Fix> {
        let (lat, lon) = geotrack_geo::destination(
            self.origin.0,
            self.origin.1,
            self.bearing,
            self.offset_at(tick),
        );

        Ok(Fix::new(lat, lon, Utc::now())?
            .with_altitude(10.0)
            .with_speed(WALKING_SPEED)
            .with_satellites(8)
            .with_quality(FixQuality::Simulation))
    }
}

#[async_trait]
impl PositionSource for SimulatorSource {
    async fn read(&mut self) -> Result<Vec<u8>> {
        let tick = self.tick;
        self.tick += 1;

        if self.in_dropout(tick) {
            return Ok(Vec::new());
        }

        let fix = self.fix_at(tick)?;
        Ok(format!("{}\r\n{}\r\n", nmea::encode_gga(&fix), nmea::encode_rmc(&fix)).into_bytes())
    }

    fn describe(&self) -> String {
        format!("simulator from {:.4}, {:.4}", self.origin.0, self.origin.1)
    }
}
