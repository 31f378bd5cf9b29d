use super::{Outbound, VariableCommand};
use crate::http_handler::{
    http_client::HTTPClient,
    http_request::{
        lvar_set_post::VariableSetRequest, lvar_step_post::VariableStepRequest,
        request_common::JSONBodyHTTPRequestType, update_sim_post::UpdateSimRequest,
    },
    http_response::response_common::ResponseError,
};
use crate::profile::RewriteTable;
use crate::{cmd, event, log, warn};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Write end of the outbound command queue.
///
/// Sending never waits: messages are queued in emission order and delivered by the
/// [`CommandDispatcher`].
#[derive(Debug, Clone)]
pub struct CommandSink {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl CommandSink {
    /// Opens the outbound queue.
    ///
    /// # Returns
    /// The sink together with the receiver the [`CommandDispatcher`] consumes.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, message: impl Into<Outbound>) {
        let message = message.into();
        if let Err(e) = self.tx.send(message) {
            warn!("Command queue closed, dropping {}", e.0);
        }
    }
}

/// Physical delivery of one outbound message.
#[async_trait]
pub trait CommandTransport: Send + Sync {
    /// Delivers one message that already passed the rewrite table.
    ///
    /// # Arguments
    /// - `message`: The physical message.
    ///
    /// # Returns
    /// `Ok(())` on delivery, otherwise the `ResponseError` of the exchange. Callers do not
    /// retry.
    async fn deliver(&self, message: &Outbound) -> Result<(), ResponseError>;
}

/// Delivers messages to the simulator host over HTTP.
pub struct HttpTransport {
    client: Arc<HTTPClient>,
    profile_id: String,
}

impl HttpTransport {
    /// Creates the HTTP delivery of a session.
    ///
    /// # Arguments
    /// - `client`: The HTTP client of the session.
    /// - `profile_id`: Appended to every message as `profile`.
    ///
    /// # Returns
    /// A new `HttpTransport`.
    pub(crate) fn new(client: Arc<HTTPClient>, profile_id: &str) -> Self {
        Self { client, profile_id: profile_id.to_string() }
    }
}

#[async_trait]
impl CommandTransport for HttpTransport {
    async fn deliver(&self, message: &Outbound) -> Result<(), ResponseError> {
        let profile = Some(self.profile_id.clone());
        let status = match message {
            Outbound::Sim(command) => {
                let request = UpdateSimRequest::new(command, Some(&self.profile_id))?;
                request.send_request(&self.client).await?
            }
            Outbound::Variable(VariableCommand::Set { key, value }) => {
                let request = VariableSetRequest { key: (*key).to_string(), value: *value, profile };
                request.send_request(&self.client).await?
            }
            Outbound::Variable(VariableCommand::Step { key, delta }) => {
                let request = VariableStepRequest { key: (*key).to_string(), delta: *delta, profile };
                request.send_request(&self.client).await?
            }
        };
        event!("Host answered {} to {message}", status.status());
        Ok(())
    }
}

/// Single consumer of the outbound queue.
///
/// Applies the profile's rewrite table and hands the resulting physical messages to the
/// transport one at a time, so the delivery order equals the emission order. Failed
/// deliveries are logged and dropped, the next gesture or poll corrects the simulator.
pub struct CommandDispatcher {
    rx: mpsc::UnboundedReceiver<Outbound>,
    rewrites: RewriteTable,
    transport: Arc<dyn CommandTransport>,
}

impl CommandDispatcher {
    /// Creates the consumer of the outbound queue.
    ///
    /// # Arguments
    /// - `rx`: The receiving end of [`CommandSink::channel`].
    /// - `rewrites`: The profile's per-type rewrites.
    /// - `transport`: Where physical messages are delivered.
    ///
    /// # Returns
    /// A new `CommandDispatcher`, started with [`Self::run`].
    pub fn new(
        rx: mpsc::UnboundedReceiver<Outbound>,
        rewrites: RewriteTable,
        transport: Arc<dyn CommandTransport>,
    ) -> Self {
        Self { rx, rewrites, transport }
    }

    /// Runs until all senders are gone or `c_tok` is cancelled.
    ///
    /// On cancellation the messages already queued are still delivered before returning.
    pub async fn run(mut self, c_tok: CancellationToken) {
        loop {
            let next = tokio::select! {
                biased;
                msg = self.rx.recv() => msg,
                () = c_tok.cancelled() => break,
            };
            let Some(message) = next else {
                return;
            };
            self.dispatch(message).await;
        }
        let mut drained = 0usize;
        while let Ok(message) = self.rx.try_recv() {
            self.dispatch(message).await;
            drained += 1;
        }
        log!("Command dispatcher stopped, flushed {drained} queued messages");
    }

    async fn dispatch(&self, message: Outbound) {
        for physical in self.rewrites.apply(message) {
            cmd!("{physical}");
            if let Err(e) = self.transport.deliver(&physical).await {
                warn!("Dropping command {physical}: {e}");
            }
        }
    }
}
