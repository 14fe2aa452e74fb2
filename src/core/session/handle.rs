use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::controller::SessionController;
use super::{SessionCommand, SessionError, SessionState, SessionStatus};

/// Handle to a controller running on its own task.
///
/// Commands and transport events are handled strictly one at a time.
/// Cloning the handle shares the same controller.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    status: watch::Receiver<SessionStatus>,
    /// Set from the moment a connect is accepted until the actor has handled it
    connect_pending: Arc<AtomicBool>,
}

impl SessionHandle {
    /// Move `controller` onto a new task.
    pub fn spawn(controller: SessionController) -> (Self, JoinHandle<()>) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let status = controller.subscribe();
        let connect_pending = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(run(controller, commands_rx, connect_pending.clone()));
        (
            Self {
                commands: commands_tx,
                status,
                connect_pending,
            },
            task,
        )
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    /// Status updates.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    /// Connect. Dropped without queueing while a connect is in progress.
    pub async fn connect(&self) -> Result<(), SessionError> {
        if !self.claim_connect() {
            debug!("Connect already in progress, request dropped");
            return Ok(());
        }
        let result = self.request(|reply| SessionCommand::Connect { reply }).await;
        self.release_if_closed(&result);
        result
    }

    pub async fn disconnect(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Disconnect { reply }).await
    }

    /// Microphone button.
    pub async fn mic_click(&self) -> Result<(), SessionError> {
        // anything but a live session turns the click into a connect
        let claimed = self.status.borrow().state != SessionState::Connected;
        if claimed && !self.claim_connect() {
            debug!("Connect already in progress, mic action dropped");
            return Ok(());
        }
        let result = self
            .request(|reply| SessionCommand::MicClick { claimed, reply })
            .await;
        if claimed {
            self.release_if_closed(&result);
        }
        result
    }

    pub async fn set_muted(&self, muted: bool) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::SetMuted { muted, reply }).await
    }

    /// Screen share button.
    pub async fn toggle_screen_share(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::ToggleScreenShare { reply }).await
    }

    pub async fn clear_turns(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::ClearTurns { reply }).await
    }

    /// Write an export file into `dir` and return its path.
    pub async fn export(&self, dir: impl Into<PathBuf>) -> Result<PathBuf, SessionError> {
        let dir = dir.into();
        self.request(|reply| SessionCommand::Export { dir, reply }).await
    }

    /// Stop the controller task. Pending commands are dropped.
    pub fn shutdown(&self) {
        let _ = self.commands.send(SessionCommand::Shutdown);
    }

    fn claim_connect(&self) -> bool {
        self.connect_pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// The actor never saw the request, so nothing else will clear the claim.
    fn release_if_closed(&self, result: &Result<(), SessionError>) {
        if matches!(result, Err(SessionError::ControllerClosed)) {
            self.connect_pending.store(false, Ordering::SeqCst);
        }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, SessionError>>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(build(reply_tx))
            .map_err(|_| SessionError::ControllerClosed)?;
        reply_rx.await.map_err(|_| SessionError::ControllerClosed)?
    }
}

async fn run(
    mut controller: SessionController,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    connect_pending: Arc<AtomicBool>,
) {
    let Some(mut events) = controller.take_event_receiver() else {
        return;
    };

    loop {
        tokio::select! {
            biased;
            command = commands.recv() => {
                let Some(command) = command else { break };
                if !handle_command(&mut controller, command, &connect_pending).await {
                    break;
                }
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                controller.handle_event(event).await;
            }
        }
    }

    let _ = controller.disconnect().await;
    info!("Session controller stopped");
}

/// Returns false on shutdown.
async fn handle_command(
    controller: &mut SessionController,
    command: SessionCommand,
    connect_pending: &AtomicBool,
) -> bool {
    match command {
        SessionCommand::Connect { reply } => {
            let result = controller.connect().await;
            connect_pending.store(false, Ordering::SeqCst);
            let _ = reply.send(result);
        }
        SessionCommand::Disconnect { reply } => {
            let _ = reply.send(controller.disconnect().await);
        }
        SessionCommand::MicClick { claimed, reply } => {
            let result = controller.handle_mic_click().await;
            if claimed {
                connect_pending.store(false, Ordering::SeqCst);
            }
            let _ = reply.send(result);
        }
        SessionCommand::SetMuted { muted, reply } => {
            let _ = reply.send(controller.set_muted(muted));
        }
        SessionCommand::ToggleScreenShare { reply } => {
            let _ = reply.send(controller.toggle_screen_share());
        }
        SessionCommand::ClearTurns { reply } => {
            controller.clear_turns();
            let _ = reply.send(Ok(()));
        }
        SessionCommand::Export { dir, reply } => {
            let _ = reply.send(controller.export(&dir));
        }
        SessionCommand::Shutdown => return false,
    }
    true
}
