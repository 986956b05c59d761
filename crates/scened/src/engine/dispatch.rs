use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::light::Command;

/// Channel types for commands FROM the reproducer TO whoever executes them
/// (unbounded - reproduction must not block on a slow consumer)
pub type CommandSender = mpsc::UnboundedSender<Command>;
pub type CommandReceiver = mpsc::UnboundedReceiver<Command>;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("command channel closed")]
    Closed,

    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Executes commands produced by the reproducer.
///
/// Implementations map `Command::Activate` / `Command::Deactivate` onto the
/// host's "turn on" / "turn off" actions.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Get the name/identifier of this dispatcher
    fn name(&self) -> &str;

    async fn dispatch(&self, cmd: Command) -> Result<(), DispatchError>;
}

/// Dispatcher that forwards commands over an in-process channel.
pub struct ChannelDispatcher {
    tx: CommandSender,
}

impl ChannelDispatcher {
    pub fn new() -> (Self, CommandReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Dispatcher for ChannelDispatcher {
    fn name(&self) -> &str {
        "channel"
    }

    async fn dispatch(&self, cmd: Command) -> Result<(), DispatchError> {
        self.tx.send(cmd).map_err(|_| DispatchError::Closed)
    }
}
