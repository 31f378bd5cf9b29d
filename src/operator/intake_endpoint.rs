use super::{OperatorIntake, OperatorMessage, OperatorReply};
use crate::{event, log, warn};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

/// TCP endpoint of the operator front-ends.
///
/// Every connection sends newline delimited [`OperatorMessage`] JSON objects and receives
/// one [`OperatorReply`] line per message. Messages of one connection are applied in the
/// order they arrive.
pub struct IntakeEndpoint {
    listener: TcpListener,
}

impl IntakeEndpoint {
    /// Binds the endpoint.
    ///
    /// # Arguments
    /// - `addr`: The socket address to listen on, e.g. `127.0.0.1:1337`.
    ///
    /// # Returns
    /// The bound endpoint or the I/O error of the bind.
    pub async fn bind(addr: &str) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> { self.listener.local_addr() }

    /// Accepts front-end connections until `c_tok` is cancelled.
    ///
    /// # Arguments
    /// - `intake`: Receiver of the decoded messages, shared by all connections.
    /// - `c_tok`: Teardown token, its cancellation also closes every open connection.
    pub async fn run(self, intake: Arc<OperatorIntake>, c_tok: CancellationToken) {
        if let Ok(addr) = self.local_addr() {
            log!("Operator intake listening on {addr}");
        }
        loop {
            let accept = tokio::select! {
                accept = self.listener.accept() => accept,
                () = c_tok.cancelled() => break,
            };
            match accept {
                Ok((socket, peer)) => {
                    log!("Operator front-end {peer} connected");
                    let intake_local = Arc::clone(&intake);
                    let conn_tok = c_tok.child_token();
                    tokio::spawn(async move {
                        match Self::handle_connection(socket, &intake_local, conn_tok).await {
                            Ok(()) => log!("Operator front-end {peer} disconnected"),
                            Err(e)
                                if e.kind() == ErrorKind::UnexpectedEof
                                    || e.kind() == ErrorKind::ConnectionReset
                                    || e.kind() == ErrorKind::ConnectionAborted =>
                            {
                                log!("Operator front-end {peer} dropped");
                            }
                            Err(e) => warn!("Closing operator connection {peer} due to {e}"),
                        }
                    });
                }
                Err(e) => warn!("Accepting operator connection failed: {e}"),
            }
        }
        log!("Operator intake stopped");
    }

    async fn handle_connection(
        socket: TcpStream,
        intake: &OperatorIntake,
        c_tok: CancellationToken,
    ) -> Result<(), std::io::Error> {
        let (rx_socket, mut tx_socket) = socket.into_split();
        let mut lines = BufReader::new(rx_socket).lines();
        loop {
            let line = tokio::select! {
                line = lines.next_line() => line?,
                () = c_tok.cancelled() => break,
            };
            let Some(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            let reply = match OperatorMessage::decode(&line) {
                Ok(message) => intake.handle(message).await,
                Err(e) => {
                    event!("Rejecting operator line {line}: {e}");
                    OperatorReply::rejected(e)
                }
            };
            match reply.encode_line() {
                Ok(bytes) => tx_socket.write_all(&bytes).await?,
                Err(e) => warn!("Encoding operator reply failed: {e}"),
            }
        }
        tx_socket.shutdown().await
    }
}
