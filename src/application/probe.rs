//! Port reconciliation probe
//!
//! An exposed-port declaration is advisory: nothing at build time checks
//! that the entry process binds it. The probe closes that gap from the
//! outside with a real TCP handshake against the declared port.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use crate::domain::entities::Image;
use crate::error::{StratumError, StratumResult};

/// Successful reconciliation of a declared port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub port: u16,
    pub elapsed_ms: u128,
}

/// Probe the port an image declares.
pub fn probe_image(image: &Image, host: &str, timeout: Duration) -> StratumResult<ProbeReport> {
    let port = image
        .config
        .exposed_port
        .ok_or_else(|| StratumError::PortUndeclared {
            image: image.name.clone(),
        })?;
    reconcile(host, port.get(), timeout)
}

/// Attempt a TCP handshake against `host:port` within `timeout`.
pub fn reconcile(host: &str, port: u16, timeout: Duration) -> StratumResult<ProbeReport> {
    let start = Instant::now();

    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| StratumError::PortUnreachable {
            port,
            message: e.to_string(),
        })?;

    let mut last_error = format!("no addresses resolved for '{host}'");
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(_) => {
                return Ok(ProbeReport {
                    port,
                    elapsed_ms: start.elapsed().as_millis(),
                })
            }
            Err(e) => last_error = e.to_string(),
        }
    }

    Err(StratumError::PortUnreachable {
        port,
        message: last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ImageConfig, Layer, LayerStack};
    use crate::domain::value_objects::{PortDeclaration, TreeDigest};
    use std::net::TcpListener;

    const TIMEOUT: Duration = Duration::from_millis(500);

    fn image_with_port(port: Option<u16>) -> Image {
        let mut layers = LayerStack::new();
        layers.push(Layer::new(TreeDigest::new("aaa"), "provision-base"));
        Image::new(
            "lego-bot",
            "python-slim:3.11",
            ImageConfig {
                workdir: "/app".to_string(),
                entrypoint: "start.sh".to_string(),
                exposed_port: port.map(PortDeclaration::new),
            },
            layers,
        )
    }

    #[test]
    fn reconcile_succeeds_against_a_bound_port() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let report = reconcile("127.0.0.1", port, TIMEOUT).unwrap();
        assert_eq!(report.port, port);
    }

    #[test]
    fn reconcile_fails_against_an_unbound_port() {
        // Bind then drop, so the port is known-free.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        match reconcile("127.0.0.1", port, TIMEOUT) {
            Err(StratumError::PortUnreachable { port: reported, .. }) => {
                assert_eq!(reported, port);
            }
            other => panic!("expected PortUnreachable, got {other:?}"),
        }
    }

    #[test]
    fn probe_image_uses_the_declared_port() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let report = probe_image(&image_with_port(Some(port)), "127.0.0.1", TIMEOUT).unwrap();
        assert_eq!(report.port, port);
    }

    #[test]
    fn probe_image_without_declaration_is_typed() {
        match probe_image(&image_with_port(None), "127.0.0.1", TIMEOUT) {
            Err(StratumError::PortUndeclared { image }) => assert_eq!(image, "lego-bot"),
            other => panic!("expected PortUndeclared, got {other:?}"),
        }
    }
}
