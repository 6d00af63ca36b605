// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

//! Advisory network probes.
//!
//! These answer "is the exact binary the policy pins publicly auditable"
//! along two independent axes: resolvability in the container registry
//! and presence in the Sigstore transparency log.  Neither is part of the
//! cryptographic hardware-trust chain; a failure here degrades confidence
//! but never invalidates hardware verification.  Probes run as background
//! tasks and report back through the orchestrator's verdict channel.

pub use self::ghcr::RegistryProbe;
pub use self::rekor::TransparencyLogProbe;

pub mod ghcr;
pub mod rekor;

#[cfg(test)]
pub(crate) mod testutil {
    //! Canned-response HTTP responder on a loopback port, so probe
    //! success paths can be exercised without leaving the host.

    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    pub(crate) struct StubServer {
        pub(crate) base_url: String,
    }

    impl StubServer {
        /// Serve `routes` as `(path-prefix, body)` pairs; the first
        /// matching prefix wins, unmatched paths answer 404.
        pub(crate) async fn serve(routes: Vec<(&str, String)>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let base_url = format!("http://{}", listener.local_addr().unwrap());
            let routes: Arc<Vec<(String, String)>> = Arc::new(
                routes.into_iter().map(|(p, b)| (p.to_string(), b)).collect(),
            );

            tokio::spawn(async move {
                loop {
                    let Ok((mut stream, _)) = listener.accept().await else {
                        return;
                    };
                    let routes = Arc::clone(&routes);

                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 8192];
                        let n = stream.read(&mut buf).await.unwrap_or(0);
                        let request = String::from_utf8_lossy(&buf[..n]);
                        let path = request.split_whitespace().nth(1).unwrap_or("/");

                        let (status, body) = match routes
                            .iter()
                            .find(|(p, _)| path.starts_with(p.as_str()))
                        {
                            Some((_, body)) => ("200 OK", body.as_str()),
                            None => ("404 Not Found", ""),
                        };

                        let response = format!(
                            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                            body.len(),
                        );
                        let _ = stream.write_all(response.as_bytes()).await;
                        let _ = stream.shutdown().await;
                    });
                }
            });

            Self { base_url }
        }
    }
}
