// Server module - host adapter serving the verifier over a line protocol
//
// Each input line is a JSON `VerifyRequest`; each output line is the
// matching `VerifyResponse`, in the same order.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::auth::{VerificationStatus, Verifier, VerifyRequest, VerifyResponse};
use crate::error::{Error, Result};

/// Counters reported when the input stream ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeStats {
    pub requests: u64,
    pub accepted: u64,
    pub malformed: u64,
}

/// Serve requests from `reader` until EOF, writing responses to `writer`.
///
/// Blank lines are skipped. A line that is not a valid request is answered
/// with `ParseFailed` instead of ending the loop.
pub async fn serve<R, W>(
    verifier: Arc<Verifier>,
    mut reader: R,
    mut writer: W,
) -> Result<ServeStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut stats = ServeStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        // Raw bytes: a non-UTF-8 line must reach the ParseFailed branch
        let line = trim_ascii(&buf);
        if line.is_empty() {
            continue;
        }

        stats.requests += 1;

        let response = match serde_json::from_slice::<VerifyRequest>(line) {
            Ok(request) => verifier.handle(&request).await,
            Err(e) => {
                stats.malformed += 1;
                tracing::warn!(error = %e, "Malformed verify request");
                VerifyResponse::from(VerificationStatus::ParseFailed)
            }
        };

        if response.success {
            stats.accepted += 1;
        }

        write_response(&mut writer, &response).await?;
    }

    writer.flush().await?;

    tracing::info!(
        requests = stats.requests,
        accepted = stats.accepted,
        malformed = stats.malformed,
        "Input closed, stopping"
    );

    Ok(stats)
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

async fn write_response<W>(writer: &mut W, response: &VerifyResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut encoded = serde_json::to_vec(response).map_err(|e| Error::Protocol(e.to_string()))?;
    encoded.push(b'\n');
    writer.write_all(&encoded).await?;
    writer.flush().await?;
    Ok(())
}
