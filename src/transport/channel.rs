//! One physical connection to a management endpoint.
//!
//! A round trip writes the request in chunks of at most
//! [`MAX_IO_CHUNK`] bytes, then reads into a fresh [`FrameDetector`] until
//! the response root closes.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, StreamOwned};

use super::{Endpoint, TlsSettings, Transport};
use crate::error::{Result, XcliError};
use crate::protocol::wire_format::{DEFAULT_PORT, DEFAULT_SSL_PORT, MAX_IO_CHUNK};
use crate::protocol::{Element, FrameDetector};

#[derive(Debug)]
enum Stream {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
    Closed,
}

impl Stream {
    fn tcp(&self) -> Option<&TcpStream> {
        match self {
            Stream::Plain(sock) => Some(sock),
            Stream::Tls(tls) => Some(&tls.sock),
            Stream::Closed => None,
        }
    }
}

fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "channel is closed")
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Stream::Plain(sock) => sock.read(buf),
            Stream::Tls(tls) => tls.read(buf),
            Stream::Closed => Err(not_connected()),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Stream::Plain(sock) => sock.write(buf),
            Stream::Tls(tls) => tls.write(buf),
            Stream::Closed => Err(not_connected()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Stream::Plain(sock) => sock.flush(),
            Stream::Tls(tls) => tls.flush(),
            Stream::Closed => Err(not_connected()),
        }
    }
}

/// A plain or TLS connection.
#[derive(Debug)]
pub struct Channel {
    /// Resolved target, kept for reconnect.
    endpoint: Endpoint,
    timeout: Duration,
    tls: Option<Arc<ClientConfig>>,
    stream: Stream,
}

impl Channel {
    /// Connect without TLS. A missing port defaults to 7777.
    pub fn connect(endpoint: &Endpoint, timeout: Duration) -> Result<Self> {
        let endpoint = Endpoint::with_port(endpoint.host.clone(), endpoint.port_or(DEFAULT_PORT));
        tracing::debug!("CONNECT (non SSL) {}", endpoint);
        Self::open(endpoint, timeout, None)
    }

    /// Connect with TLS. A missing port defaults to 7778.
    pub fn connect_tls(endpoint: &Endpoint, timeout: Duration, settings: &TlsSettings) -> Result<Self> {
        let endpoint =
            Endpoint::with_port(endpoint.host.clone(), endpoint.port_or(DEFAULT_SSL_PORT));
        tracing::debug!("CONNECT SSL {}, ca_certs={:?}", endpoint, settings.ca_certs);
        let config = settings.client_config()?;
        Self::open(endpoint, timeout, Some(config))
    }

    fn open(endpoint: Endpoint, timeout: Duration, tls: Option<Arc<ClientConfig>>) -> Result<Self> {
        let stream = establish(&endpoint, timeout, tls.as_ref())?;
        Ok(Self {
            endpoint,
            timeout,
            tls,
            stream,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn is_tls(&self) -> bool {
        self.tls.is_some()
    }

    /// Close after a rejected response and pick the error to report.
    fn reject(&mut self, err: XcliError, raw: BytesMut, eof: bool) -> XcliError {
        tracing::error!("Termination-detecting parser failed, {}", err);
        let connected = !eof && self.is_connected();
        self.close();
        if connected {
            XcliError::CorruptResponse {
                message: err.to_string(),
                raw: Some(raw.freeze()),
                source: Some(Box::new(err)),
            }
        } else {
            XcliError::DisconnectedWhileReceiving
        }
    }

    fn fail_io(&mut self, err: io::Error) -> XcliError {
        tracing::debug!("I/O failure on {}: {}", self.endpoint, err);
        self.close();
        XcliError::Io(err)
    }
}

fn establish(endpoint: &Endpoint, timeout: Duration, tls: Option<&Arc<ClientConfig>>) -> Result<Stream> {
    if timeout.is_zero() {
        return Err(XcliError::Config("timeout must be non-zero".to_string()));
    }
    let port = endpoint.port_or(DEFAULT_PORT);
    let mut last_err = None;
    let mut sock = None;
    for addr in (endpoint.host.as_str(), port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(s) => {
                sock = Some(s);
                break;
            }
            Err(e) => last_err = Some(e),
        }
    }
    let sock = match (sock, last_err) {
        (Some(sock), _) => sock,
        (None, Some(err)) => return Err(err.into()),
        (None, None) => {
            return Err(XcliError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} did not resolve to any address", endpoint.host),
            )))
        }
    };
    sock.set_read_timeout(Some(timeout))?;
    sock.set_write_timeout(Some(timeout))?;
    sock.set_nodelay(true)?;

    let Some(config) = tls else {
        return Ok(Stream::Plain(sock));
    };
    let server_name = ServerName::try_from(endpoint.host.clone())
        .map_err(|e| XcliError::Tls(format!("invalid server name: {}", e)))?;
    let conn = ClientConnection::new(config.clone(), server_name)
        .map_err(|e| XcliError::Tls(format!("TLS setup failed: {}", e)))?;
    let mut tls = StreamOwned::new(conn, sock);
    while tls.conn.is_handshaking() {
        tls.conn
            .complete_io(&mut tls.sock)
            .map_err(|e| XcliError::Tls(format!("TLS handshake failed: {}", e)))?;
    }
    Ok(Stream::Tls(Box::new(tls)))
}

impl Transport for Channel {
    fn send(&mut self, payload: &[u8]) -> Result<Element> {
        if matches!(self.stream, Stream::Closed) {
            return Err(XcliError::ClosedTransport {
                message: format!("channel to {} is closed", self.endpoint),
                failures: Vec::new(),
            });
        }

        for chunk in payload.chunks(MAX_IO_CHUNK) {
            if let Err(e) = self.stream.write_all(chunk) {
                return Err(self.fail_io(e));
            }
        }
        if let Err(e) = self.stream.flush() {
            return Err(self.fail_io(e));
        }

        let mut detector = FrameDetector::new();
        let mut raw = BytesMut::new();
        let mut buf = vec![0u8; MAX_IO_CHUNK];
        let mut eof = false;
        while !detector.is_closed() {
            let n = match self.stream.read(&mut buf) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                // TLS peers may drop the socket without close_notify.
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => 0,
                Err(e) => return Err(self.fail_io(e)),
            };
            if n == 0 {
                eof = true;
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            if let Err(err) = detector.feed(&buf[..n]) {
                return Err(self.reject(err, raw, eof));
            }
        }

        match detector.close() {
            Ok(root) => Ok(root),
            Err(err) => Err(self.reject(err, raw, eof)),
        }
    }

    fn is_connected(&self) -> bool {
        self.stream
            .tcp()
            .map_or(false, |sock| sock.peer_addr().is_ok())
    }

    fn close(&mut self) {
        match std::mem::replace(&mut self.stream, Stream::Closed) {
            Stream::Plain(sock) => {
                let _ = sock.shutdown(Shutdown::Both);
            }
            Stream::Tls(mut tls) => {
                tls.conn.send_close_notify();
                let _ = tls.flush();
                let _ = tls.sock.shutdown(Shutdown::Both);
            }
            Stream::Closed => {}
        }
    }

    fn reconnect(&mut self) -> Result<()> {
        if self.is_connected() {
            self.close();
        }
        tracing::debug!("RECONNECT {}", self.endpoint);
        self.stream = establish(&self.endpoint, self.timeout, self.tls.as_ref())?;
        Ok(())
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.close();
    }
}
