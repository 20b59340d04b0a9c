//! Newline-delimited JSON framing over an async byte stream.
//!
//! One message per line, UTF-8, no embedded newlines — the same wire shape
//! the teacher's debug server used for its command/response pairs.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::error::TransportError;

/// Write one JSON document as a single line, followed by `\n`.
pub async fn write_frame<W, T>(writer: &mut W, value: &T) -> Result<(), TransportError>
where
    W: tokio::io::AsyncWrite + Unpin,
    T: Serialize,
{
    let mut line = serde_json::to_string(value)
        .map_err(|e| TransportError::Malformed(format!("serialize: {e}")))?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one line and parse it as JSON. Returns `Ok(None)` on clean EOF.
pub async fn read_frame<R, T>(reader: &mut BufReader<R>) -> Result<Option<T>, TransportError>
where
    R: tokio::io::AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value = serde_json::from_str(trimmed)
            .map_err(|e| TransportError::Malformed(format!("parse: {e}")))?;
        return Ok(Some(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tokio::io::duplex;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Ping {
        n: u32,
    }

    #[tokio::test]
    async fn round_trips_a_frame() {
        let (mut client, server) = duplex(256);
        write_frame(&mut client, &Ping { n: 7 }).await.unwrap();

        let mut reader = BufReader::new(server);
        let got: Ping = read_frame(&mut reader).await.unwrap().unwrap();
        assert_eq!(got, Ping { n: 7 });
    }

    #[tokio::test]
    async fn eof_yields_none() {
        let (client, server) = duplex(256);
        drop(client);
        let mut reader = BufReader::new(server);
        let got: Option<Ping> = read_frame(&mut reader).await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        let (mut client, server) = duplex(256);
        client.write_all(b"\n\n").await.unwrap();
        write_frame(&mut client, &Ping { n: 3 }).await.unwrap();

        let mut reader = BufReader::new(server);
        let got: Ping = read_frame(&mut reader).await.unwrap().unwrap();
        assert_eq!(got, Ping { n: 3 });
    }
}
