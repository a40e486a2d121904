use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::Instant;

/// Upper bound on the bytes returned by one read window
pub const MAX_BATCH_BYTES: usize = 16 * 1024;

/// Bytes collected during one read window
#[derive(Debug, Default)]
pub struct ReadOutcome {
    pub bytes: Vec<u8>,
    /// The stream reported end of input
    pub eof: bool,
}

/// Collect whatever arrives on `reader` within `window`
///
/// Returns early at end of input or once [`MAX_BATCH_BYTES`] have been read.
/// An empty outcome is not an error.
pub async fn read_window<R>(reader: &mut R, window: Duration) -> io::Result<ReadOutcome>
where
    R: AsyncRead + Unpin,
{
    let deadline = Instant::now() + window;
    let mut outcome = ReadOutcome::default();
    let mut buf = [0u8; 1024];

    while outcome.bytes.len() < MAX_BATCH_BYTES {
        match tokio::time::timeout_at(deadline, reader.read(&mut buf)).await {
            Err(_) => break,
            Ok(Ok(0)) => {
                outcome.eof = true;
                break;
            }
            Ok(Ok(n)) => outcome.bytes.extend_from_slice(&buf[..n]),
            Ok(Err(e)) if e.kind() == io::ErrorKind::Interrupted => continue,
            Ok(Err(e)) => return Err(e),
        }
    }

    Ok(outcome)
}
