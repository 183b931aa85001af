//! Realtime session
//!
//! One task owns the connection manager and all session state. The UI talks
//! to it through [`SessionHandle`] commands and hears back on a broadcast
//! channel; reads go through a [`SessionView`] the task republishes whenever
//! something visible in it changed.

use super::{SessionEvent, SessionState, SessionView};
use crate::connection::{ConnectionEvent, ConnectionManager, Connector};
use crate::dispatch::InboundDispatcher;
use crate::protocol::OutboundFrame;
use ghost_common::{AppError, AppResult, RealtimeConfig};
use ghost_core::{normalize_text, Conversation, DomainError, Handle, Message, PortResult, SnapshotSource};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

/// Capacity of the command channel
const COMMAND_BUFFER: usize = 64;

enum Command {
    OpenChat {
        peer: Handle,
        reply: oneshot::Sender<Result<(), DomainError>>,
    },
    LeaveChat,
    InputChanged,
    SendMessage {
        text: String,
        reply: oneshot::Sender<Result<Option<Message>, DomainError>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Entry point for starting a session
pub struct Session;

impl Session {
    /// Start the session task
    ///
    /// Opens the connection for `identity` and fetches the online snapshot
    /// concurrently. Must be called inside a tokio runtime.
    pub fn start(
        config: RealtimeConfig,
        identity: Handle,
        connector: Arc<dyn Connector>,
        snapshot_source: Arc<dyn SnapshotSource>,
    ) -> (SessionHandle, broadcast::Receiver<SessionEvent>) {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (events_tx, events_rx) = broadcast::channel(config.event_buffer.max(1));

        let state = SessionState::new(identity.clone(), &config);
        let mut connection = ConnectionManager::new(connector, config);
        connection.open(identity.clone());

        let view = Arc::new(RwLock::new(SessionView::new(&state, connection.state(), 0)));

        let snapshot = tokio::spawn(async move { snapshot_source.online_snapshot().await });

        tracing::info!(identity = %identity, "Session started");

        let actor = SessionActor {
            state,
            connection,
            commands: commands_rx,
            events: events_tx.clone(),
            view: Arc::clone(&view),
            revision: 0,
            dirty: false,
            snapshot: Some(snapshot),
        };
        tokio::spawn(actor.run());

        let handle = SessionHandle {
            commands: commands_tx,
            events: events_tx,
            view,
        };
        (handle, events_rx)
    }
}

/// Cloneable handle to a running session
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<SessionEvent>,
    view: Arc<RwLock<SessionView>>,
}

impl SessionHandle {
    /// Open a chat with a peer, replacing any open chat
    pub async fn open_chat(&self, peer: Handle) -> AppResult<()> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::OpenChat { peer, reply }, rx).await??;
        Ok(())
    }

    /// Leave the open chat, dropping its messages
    pub async fn leave_chat(&self) -> AppResult<()> {
        self.notify(Command::LeaveChat).await
    }

    /// The local text input changed
    pub async fn input_changed(&self) -> AppResult<()> {
        self.notify(Command::InputChanged).await
    }

    /// Send a message to the open chat
    ///
    /// Returns the appended message, or `None` if the session was not
    /// connected and the message was dropped.
    pub async fn send_message(&self, text: impl Into<String>) -> AppResult<Option<Message>> {
        let (reply, rx) = oneshot::channel();
        let sent = self
            .request(
                Command::SendMessage {
                    text: text.into(),
                    reply,
                },
                rx,
            )
            .await??;
        Ok(sent)
    }

    /// Stop the session; no reconnect happens afterwards
    pub async fn shutdown(&self) -> AppResult<()> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Shutdown { reply }, rx).await
    }

    /// Current read-only view
    #[must_use]
    pub fn view(&self) -> SessionView {
        self.view.read().clone()
    }

    /// Subscribe to session events from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Check if the session task has stopped
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn notify(&self, command: Command) -> AppResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| AppError::SessionClosed)
    }

    async fn request<T>(&self, command: Command, rx: oneshot::Receiver<T>) -> AppResult<T> {
        self.notify(command).await?;
        rx.await.map_err(|_| AppError::SessionClosed)
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

struct SessionActor {
    state: SessionState,
    connection: ConnectionManager,
    commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<SessionEvent>,
    view: Arc<RwLock<SessionView>>,
    revision: u64,
    /// Set when state the view mirrors has changed since the last publish
    dirty: bool,
    snapshot: Option<JoinHandle<PortResult<Vec<Handle>>>>,
}

impl SessionActor {
    async fn run(mut self) {
        let shutdown_reply = loop {
            let idle_deadline = self.state.outbound_typing.idle_deadline();
            let typing_expiry = self.state.inbound_typing.next_expiry();

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown { reply }) => break Some(reply),
                    Some(command) => self.on_command(command),
                    // Every handle dropped
                    None => break None,
                },
                event = self.connection.next_event() => self.on_connection_event(event),
                () = sleep_until_opt(idle_deadline) => self.on_idle(),
                () = sleep_until_opt(typing_expiry) => self.on_typing_expiry(),
                result = join_opt(&mut self.snapshot) => {
                    self.snapshot = None;
                    self.on_snapshot(result);
                }
            }

            self.publish_view();
        };

        self.teardown();

        if let Some(reply) = shutdown_reply {
            let _ = reply.send(());
        }
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::OpenChat { peer, reply } => {
                let result = self.open_chat(peer);
                self.dirty = true;
                self.publish_view();
                let _ = reply.send(result);
            }
            Command::LeaveChat => {
                self.leave_chat();
                self.dirty = true;
            }
            // Outbound typing is not part of the view
            Command::InputChanged => self.input_changed(),
            Command::SendMessage { text, reply } => {
                let result = self.send_message(&text);
                self.dirty = true;
                self.publish_view();
                let _ = reply.send(result);
            }
            // Handled by the run loop
            Command::Shutdown { .. } => {}
        }
    }

    fn open_chat(&mut self, peer: Handle) -> Result<(), DomainError> {
        if peer == *self.state.identity() {
            return Err(DomainError::SelfChat(peer));
        }
        if self.state.open_peer() == Some(&peer) {
            return Ok(());
        }

        self.leave_chat();
        tracing::info!(peer = %peer, "Chat opened");
        self.state.conversation = Some(Conversation::new(peer));
        Ok(())
    }

    fn leave_chat(&mut self) {
        if let Some(frame) = self.state.outbound_typing.on_leave() {
            self.connection.send(&frame);
        }
        if let Some(conversation) = self.state.conversation.take() {
            tracing::info!(peer = %conversation.peer(), messages = conversation.len(), "Chat left");
        }
    }

    fn input_changed(&mut self) {
        let Some(peer) = self.state.open_peer().cloned() else {
            tracing::debug!("Input changed with no open chat");
            return;
        };

        if let Some(frame) = self.state.outbound_typing.on_input(Instant::now(), &peer) {
            self.connection.send(&frame);
        }
    }

    fn send_message(&mut self, text: &str) -> Result<Option<Message>, DomainError> {
        let peer = self.state.open_peer().cloned().ok_or(DomainError::NoOpenChat)?;
        let text = normalize_text(text)?;

        let written = self.connection.send(&OutboundFrame::message(peer.clone(), text.as_str()));

        if let Some(frame) = self.state.outbound_typing.on_send() {
            self.connection.send(&frame);
        }

        if !written {
            tracing::debug!(peer = %peer, "Message dropped while disconnected");
            return Ok(None);
        }

        let message = Message::outgoing(self.state.identity().clone(), text);
        if let Some(conversation) = self.state.conversation.as_mut() {
            conversation.push(message.clone());
        }
        Ok(Some(message))
    }

    fn on_connection_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Opened => {
                self.dirty = true;
                self.emit(SessionEvent::Connected);
            }
            ConnectionEvent::Closed => {
                self.dirty = true;
                self.emit(SessionEvent::Disconnected);
            }
            ConnectionEvent::Reconnecting => self.dirty = true,
            ConnectionEvent::Frame(text) => {
                let Some(frame) = InboundDispatcher::decode(&text) else {
                    return;
                };
                self.dirty |= frame.is_session_data();
                if let Some(event) = InboundDispatcher::dispatch(&mut self.state, frame, Instant::now()) {
                    self.emit(event);
                }
            }
        }
    }

    fn on_idle(&mut self) {
        if let Some(frame) = self.state.outbound_typing.on_idle_expired(Instant::now()) {
            self.connection.send(&frame);
        }
    }

    fn on_typing_expiry(&mut self) {
        for peer in self.state.inbound_typing.sweep(Instant::now()) {
            self.dirty = true;
            self.emit(SessionEvent::TypingChanged {
                peer,
                is_typing: false,
            });
        }
    }

    fn on_snapshot(&mut self, result: Result<PortResult<Vec<Handle>>, tokio::task::JoinError>) {
        let snapshot = match result {
            Ok(Ok(handles)) => handles,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Online snapshot failed, starting from an empty set");
                Vec::new()
            }
            Err(e) => {
                tracing::error!(error = %e, "Online snapshot task failed");
                Vec::new()
            }
        };

        self.state.presence.bootstrap(snapshot);
        self.dirty = true;
        self.emit(SessionEvent::PresenceSynced {
            online: self.state.presence.online_handles(),
        });
    }

    fn emit(&self, event: SessionEvent) {
        let name = event.name();
        if self.events.send(event).is_err() {
            tracing::trace!(event = name, "No subscribers for session event");
        }
    }

    fn publish_view(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        self.revision += 1;
        *self.view.write() = SessionView::new(&self.state, self.connection.state(), self.revision);
    }

    fn teardown(&mut self) {
        self.commands.close();
        if let Some(snapshot) = self.snapshot.take() {
            snapshot.abort();
        }
        if let Some(frame) = self.state.outbound_typing.on_leave() {
            self.connection.send(&frame);
        }
        self.connection.close();
        self.dirty = true;
        self.publish_view();

        tracing::info!(identity = %self.state.identity(), "Session stopped");
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn join_opt<T>(task: &mut Option<JoinHandle<T>>) -> Result<T, tokio::task::JoinError> {
    match task {
        Some(task) => task.await,
        None => std::future::pending().await,
    }
}
