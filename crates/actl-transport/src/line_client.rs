//! Minimal controller-side client: one request line out, one response line in.

use actl_protocol::{CommandRequest, Response};
use serde_json::{Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::errors::ClientError;

pub struct LineClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl LineClient {
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let (read, write) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read),
            writer: write,
        })
    }

    /// Send one command and wait for its response. Empty params are omitted.
    pub async fn send(
        &mut self,
        command: &str,
        params: Option<Map<String, Value>>,
    ) -> Result<Response, ClientError> {
        let request = CommandRequest::new(command, params);
        let line = self.send_raw(&request.to_line()).await?;
        Ok(serde_json::from_str(&line)?)
    }

    /// Send an arbitrary line and return the response line, delimiter stripped.
    pub async fn send_raw(&mut self, line: &str) -> Result<String, ClientError> {
        self.write_raw(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        self.read_line().await?.ok_or(ClientError::Closed)
    }

    /// Write bytes as-is, without appending a delimiter.
    pub async fn write_raw(&mut self, bytes: &[u8]) -> Result<(), ClientError> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Next response line, or `None` once the server has closed the socket.
    pub async fn read_line(&mut self) -> Result<Option<String>, ClientError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Close the write side so the server sees end of stream.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.writer.shutdown().await?;
        Ok(())
    }
}
