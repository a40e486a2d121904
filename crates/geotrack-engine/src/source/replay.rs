use async_trait::async_trait;
use geotrack_core::error::{GeotrackError, Result};
use geotrack_core::ports::PositionSource;
use std::path::PathBuf;

/// Lines handed out per read by default
pub const DEFAULT_LINES_PER_READ: usize = 2;

/// Replays a recorded NMEA log a few lines at a time
///
/// Once the log is exhausted every read is empty.
pub struct ReplaySource {
    path: PathBuf,
    lines: Vec<Vec<u8>>,
    cursor: usize,
    lines_per_read: usize,
}

impl ReplaySource {
    pub async fn open(path: PathBuf) -> Result<Self> {
        let content = tokio::fs::read(&path).await.map_err(|e| {
            GeotrackError::Source(format!("Failed to read replay log {}: {}", path.display(), e))
        })?;

        // Captures are kept byte for byte; the decoder copes with invalid UTF-8
        let lines = split_lines(&content);
        Ok(Self { path, lines, cursor: 0, lines_per_read: DEFAULT_LINES_PER_READ })
    }

    pub fn with_lines_per_read(mut self, lines: usize) -> Self {
        self.lines_per_read = lines.max(1);
        self
    }

    pub fn remaining(&self) -> usize {
        self.lines.len() - self.cursor
    }
}

fn split_lines(content: &[u8]) -> Vec<Vec<u8>> {
    let mut lines: Vec<Vec<u8>> = content
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line).to_vec())
        .collect();
    if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}

#[async_trait]
impl PositionSource for ReplaySource {
    async fn read(&mut self) -> Result<Vec<u8>> {
        let end = (self.cursor + self.lines_per_read).min(self.lines.len());
        let mut out = Vec::new();

        for line in &self.lines[self.cursor..end] {
            out.extend_from_slice(line);
            out.extend_from_slice(b"\r\n");
        }

        self.cursor = end;
        Ok(out)
    }

    fn describe(&self) -> String {
        format!("replay {}", self.path.display())
    }
}
