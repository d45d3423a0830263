//! WebSocket client task keeping a [`WorkloadStore`] in sync.

use super::error::SubscriptionError;
use super::state::ConnectionState;
use crate::workload::{
    ControlRequest, ErrorResponse, InboundMessage, PendingAction, WorkloadResponse, WorkloadStore,
};
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;

/// Outcome of a control request, matched by `msg_id`.
pub type CommandReply = Result<WorkloadResponse, ErrorResponse>;

struct Command {
    request: ControlRequest,
    /// Workloads given a pending overlay by this request.
    targets: Vec<String>,
    reply: oneshot::Sender<CommandReply>,
}

struct Awaiting {
    targets: Vec<String>,
    reply: oneshot::Sender<CommandReply>,
}

enum SessionEnd {
    Cancelled,
    Disconnected,
    HandlesDropped,
}

/// Background subscription to the workload driver.
pub struct WorkloadSubscriber {
    url: url::Url,
    reconnect_delay: Duration,
    store: Arc<WorkloadStore>,
}

impl WorkloadSubscriber {
    pub fn new(url: url::Url, reconnect_delay: Duration, store: Arc<WorkloadStore>) -> Self {
        Self {
            url,
            reconnect_delay,
            store,
        }
    }

    /// Spawn the subscription task.
    ///
    /// The task reconnects after a fixed delay for as long as `cancel` is not
    /// triggered.
    pub fn start(self, cancel: CancellationToken) -> (SubscriptionHandle, JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);

        let handle = SubscriptionHandle {
            commands: cmd_tx,
            state: state_rx,
            store: Arc::clone(&self.store),
        };

        let task = tokio::spawn(async move {
            self.run(cancel, cmd_rx, state_tx).await;
        });

        (handle, task)
    }

    async fn run(
        self,
        cancel: CancellationToken,
        mut commands: mpsc::UnboundedReceiver<Command>,
        state: watch::Sender<ConnectionState>,
    ) {
        tracing::info!(url = %self.url, "Starting workload subscription");

        loop {
            set_state(&state, ConnectionState::Connecting);

            let connected = tokio::select! {
                _ = cancel.cancelled() => break,
                result = tokio_tungstenite::connect_async(self.url.as_str()) => result,
            };

            let end = match connected {
                Ok((socket, _response)) => {
                    self.session(socket, &cancel, &mut commands, &state).await
                }
                Err(e) => {
                    tracing::warn!(
                        url = %self.url,
                        error = %e,
                        "Failed to connect to workload driver"
                    );
                    SessionEnd::Disconnected
                }
            };

            set_state(&state, ConnectionState::Disconnected);

            match end {
                SessionEnd::Cancelled | SessionEnd::HandlesDropped => break,
                SessionEnd::Disconnected => {}
            }

            // Nothing is replayed after reconnecting
            while let Ok(command) = commands.try_recv() {
                tracing::warn!(
                    op = command.request.op(),
                    msg_id = command.request.msg_id(),
                    "Dropping command issued while disconnected"
                );
                self.clear_pending(&command.targets);
            }

            tracing::debug!(
                delay_ms = self.reconnect_delay.as_millis() as u64,
                "Reconnecting to workload driver"
            );
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }

        set_state(&state, ConnectionState::Disconnected);
        tracing::info!("Workload subscription stopped");
    }

    async fn session<S>(
        &self,
        socket: tokio_tungstenite::WebSocketStream<S>,
        cancel: &CancellationToken,
        commands: &mut mpsc::UnboundedReceiver<Command>,
        state: &watch::Sender<ConnectionState>,
    ) -> SessionEnd
    where
        S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
    {
        let (mut sink, mut stream) = socket.split();
        let mut awaiting: HashMap<String, Awaiting> = HashMap::new();

        let subscribe = ControlRequest::subscribe();
        if let Err(e) = send_request(&mut sink, &subscribe).await {
            tracing::warn!(error = %e, "Failed to send subscribe request");
            return SessionEnd::Disconnected;
        }
        set_state(state, ConnectionState::Subscribed);

        let end = loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = sink.send(Message::Close(None)).await;
                    break SessionEnd::Cancelled;
                }
                command = commands.recv() => {
                    let Some(command) = command else {
                        let _ = sink.send(Message::Close(None)).await;
                        break SessionEnd::HandlesDropped;
                    };
                    if let Err(e) = send_request(&mut sink, &command.request).await {
                        tracing::warn!(
                            op = command.request.op(),
                            error = %e,
                            "Failed to send command"
                        );
                        self.clear_pending(&command.targets);
                        break SessionEnd::Disconnected;
                    }
                    awaiting.insert(
                        command.request.msg_id().to_string(),
                        Awaiting {
                            targets: command.targets,
                            reply: command.reply,
                        },
                    );
                }
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.handle_frame(&text, &mut awaiting),
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => self.handle_frame(text, &mut awaiting),
                        Err(e) => tracing::warn!(error = %e, "Skipping non UTF-8 binary frame"),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "Workload driver closed the connection");
                        break SessionEnd::Disconnected;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Workload connection failed");
                        break SessionEnd::Disconnected;
                    }
                    None => break SessionEnd::Disconnected,
                },
            }
        };

        // Unanswered commands resolve as closed when their senders drop
        for pending in awaiting.into_values() {
            self.clear_pending(&pending.targets);
        }

        end
    }

    fn handle_frame(&self, text: &str, awaiting: &mut HashMap<String, Awaiting>) {
        let message = match InboundMessage::decode(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, len = text.len(), "Skipping undecodable frame");
                return;
            }
        };

        match message {
            InboundMessage::Response(response) => {
                self.store.apply(&response);
                if let Some(waiter) = awaiting.remove(&response.msg_id) {
                    self.clear_pending(&waiter.targets);
                    let _ = waiter.reply.send(Ok(response));
                }
            }
            InboundMessage::Error(error) => {
                tracing::error!(
                    msg_id = %error.msg_id,
                    op = %error.op,
                    error_message = %error.error_message,
                    description = %error.description,
                    "Workload driver rejected request"
                );
                if let Some(waiter) = awaiting.remove(&error.msg_id) {
                    self.clear_pending(&waiter.targets);
                    let _ = waiter.reply.send(Err(error));
                }
            }
        }
    }

    fn clear_pending(&self, targets: &[String]) {
        for id in targets {
            self.store.clear_pending(id);
        }
    }
}

async fn send_request<S>(
    sink: &mut S,
    request: &ControlRequest,
) -> Result<(), SubscriptionError>
where
    S: futures::Sink<Message, Error = tungstenite::Error> + Unpin,
{
    let payload = serde_json::to_string(request)?;
    tracing::debug!(op = request.op(), msg_id = request.msg_id(), "Sending request");
    sink.send(Message::Text(payload)).await?;
    Ok(())
}

fn set_state(tx: &watch::Sender<ConnectionState>, next: ConnectionState) {
    let changed = tx.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        *current = next;
        true
    });
    if changed {
        tracing::info!(state = %next, "Workload subscription state changed");
    }
}

/// Cloneable handle for issuing commands to the subscription task.
#[derive(Clone)]
pub struct SubscriptionHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ConnectionState>,
    store: Arc<WorkloadStore>,
}

impl SubscriptionHandle {
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Receiver notified on every connection state change.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    pub fn store(&self) -> &Arc<WorkloadStore> {
        &self.store
    }

    /// Wait until the subscription is established.
    pub async fn wait_until_subscribed(&self, timeout: Duration) -> Result<(), SubscriptionError> {
        let mut state = self.state.clone();
        let subscribed = async {
            state
                .wait_for(ConnectionState::is_subscribed)
                .await
                .map(|_| ())
        };
        let result = match tokio::time::timeout(timeout, subscribed).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(SubscriptionError::Closed),
            Err(_) => Err(SubscriptionError::Timeout(timeout)),
        };
        result
    }

    /// Request a full workload listing.
    pub fn refresh(&self) -> Result<oneshot::Receiver<CommandReply>, SubscriptionError> {
        self.submit(ControlRequest::get_workloads(), None)
    }

    pub fn start_workload(
        &self,
        workload_id: &str,
    ) -> Result<oneshot::Receiver<CommandReply>, SubscriptionError> {
        self.submit(
            ControlRequest::start_workload(workload_id),
            Some(PendingAction::Starting),
        )
    }

    pub fn stop_workload(
        &self,
        workload_id: &str,
    ) -> Result<oneshot::Receiver<CommandReply>, SubscriptionError> {
        self.submit(
            ControlRequest::stop_workload(workload_id),
            Some(PendingAction::Stopping),
        )
    }

    /// Pause a workload, or resume it if it is already paused or pausing.
    pub fn pause_workload(
        &self,
        workload_id: &str,
    ) -> Result<oneshot::Receiver<CommandReply>, SubscriptionError> {
        let paused = self
            .store
            .snapshot()
            .get(workload_id)
            .is_some_and(|w| w.state.is_paused_or_pausing());

        if paused {
            self.submit(
                ControlRequest::unpause_workload(workload_id),
                Some(PendingAction::Resuming),
            )
        } else {
            self.submit(
                ControlRequest::pause_workload(workload_id),
                Some(PendingAction::Pausing),
            )
        }
    }

    /// Stop every workload currently running.
    pub fn stop_all_workloads(&self) -> Result<oneshot::Receiver<CommandReply>, SubscriptionError> {
        let running = self.store.snapshot().running_ids();
        self.submit(
            ControlRequest::stop_workloads(running),
            Some(PendingAction::Stopping),
        )
    }

    pub fn toggle_debug_logs(
        &self,
        workload_id: &str,
        enabled: bool,
    ) -> Result<oneshot::Receiver<CommandReply>, SubscriptionError> {
        self.submit(
            ControlRequest::toggle_debug_logs(workload_id, enabled),
            Some(PendingAction::TogglingDebugLogs),
        )
    }

    fn submit(
        &self,
        request: ControlRequest,
        action: Option<PendingAction>,
    ) -> Result<oneshot::Receiver<CommandReply>, SubscriptionError> {
        if !self.state().is_subscribed() {
            tracing::warn!(
                op = request.op(),
                state = %self.state(),
                "Cannot send command, workload subscription is not established"
            );
            return Err(SubscriptionError::NotConnected);
        }

        let targets: Vec<String> = match &request {
            ControlRequest::StopWorkloads { workload_ids, .. } => workload_ids.clone(),
            other => other.workload_id().map(str::to_string).into_iter().collect(),
        };

        let mut marked = Vec::new();
        if let Some(action) = action {
            for id in &targets {
                if self.store.mark_pending(id, action) {
                    marked.push(id.clone());
                }
            }
        }

        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command {
                request,
                targets: marked,
                reply,
            })
            .map_err(|_| SubscriptionError::Closed)?;

        Ok(rx)
    }
}

/// Wait for a command reply, failing on timeout or rejection.
pub async fn reply_within(
    rx: oneshot::Receiver<CommandReply>,
    timeout: Duration,
) -> Result<WorkloadResponse, SubscriptionError> {
    match tokio::time::timeout(timeout, rx).await {
        Ok(Ok(Ok(response))) => Ok(response),
        Ok(Ok(Err(error))) => Err(SubscriptionError::Rejected(error)),
        Ok(Err(_)) => Err(SubscriptionError::Closed),
        Err(_) => Err(SubscriptionError::Timeout(timeout)),
    }
}
