//! Byte pumps between the local terminal and the session streams.

use std::io::{self, ErrorKind, Read, Write};

use cloudterm_bridge::{InboundStream, OutboundSink};

const CHUNK: usize = 4096;

fn session_ended(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::NotConnected | ErrorKind::BrokenPipe | ErrorKind::ConnectionAborted
    )
}

/// Copy local input into the session until input ends or the session does.
///
/// Each chunk read from `input` becomes one outbound message. Returns the
/// number of bytes forwarded.
pub fn pump_input<R: Read>(mut input: R, mut sink: OutboundSink) -> io::Result<u64> {
    let mut buf = [0u8; CHUNK];
    let mut total = 0u64;
    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        match sink.write_all(&buf[..n]) {
            Ok(()) => total += n as u64,
            Err(e) if session_ended(e.kind()) => {
                tracing::debug!(error = %e, "Session no longer accepts input");
                return Ok(total);
            }
            Err(e) => return Err(e),
        }
    }
}

/// Copy session output to `out` until the inbound stream reaches EOF.
pub fn pump_output<W: Write>(mut stream: InboundStream, mut out: W) -> io::Result<u64> {
    let mut buf = [0u8; CHUNK];
    let mut total = 0u64;
    loop {
        let n = match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if session_ended(e.kind()) => {
                tracing::debug!(error = %e, "Session output unavailable");
                break;
            }
            Err(e) => return Err(e),
        };
        out.write_all(&buf[..n])?;
        out.flush()?;
        total += n as u64;
    }
    Ok(total)
}
