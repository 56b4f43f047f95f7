//! Operator hand-off for two-step verification and captcha challenges.
//!
//! The challenge is completed by a human in the browser window. The login flow
//! sends a prompt through an [`OperatorGate`] and waits for an acknowledgement
//! on the paired [`OperatorChannel`]. The binary serves the channel from the
//! terminal with [`spawn_stdin_operator`]; tests acknowledge directly.

use std::io::{self, Write};

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use super::error::AuthError;

/// Login-side end: sends prompts, waits for acknowledgements.
#[derive(Debug)]
pub struct OperatorGate {
    requests: mpsc::Sender<String>,
    acks: mpsc::Receiver<()>,
    cancel: CancellationToken,
}

/// Operator-side end: receives prompts, acknowledges completed challenges.
#[derive(Debug)]
pub struct OperatorChannel {
    pub requests: mpsc::Receiver<String>,
    pub acks: mpsc::Sender<()>,
}

pub fn operator_channel(cancel: CancellationToken) -> (OperatorGate, OperatorChannel) {
    let (request_tx, request_rx) = mpsc::channel(1);
    let (ack_tx, ack_rx) = mpsc::channel(1);
    (
        OperatorGate {
            requests: request_tx,
            acks: ack_rx,
            cancel,
        },
        OperatorChannel {
            requests: request_rx,
            acks: ack_tx,
        },
    )
}

impl OperatorGate {
    /// Ask the operator to complete a challenge and block until they confirm.
    ///
    /// There is no deadline. Fails with [`AuthError::ChallengeAborted`] when the
    /// shutdown token fires or the operator side goes away.
    pub async fn wait(&mut self, prompt: &str) -> Result<(), AuthError> {
        if self.requests.send(prompt.to_string()).await.is_err() {
            return Err(AuthError::ChallengeAborted);
        }
        tokio::select! {
            ack = self.acks.recv() => ack.ok_or(AuthError::ChallengeAborted),
            _ = self.cancel.cancelled() => {
                tracing::info!("Shutdown requested while waiting for verification");
                Err(AuthError::ChallengeAborted)
            }
        }
    }
}

/// Serve operator prompts on the terminal: print the prompt, wait for ENTER.
///
/// The stdin read runs on a detached thread so a pending read never holds up
/// runtime shutdown.
pub fn spawn_stdin_operator(mut channel: OperatorChannel) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(prompt) = channel.requests.recv().await {
            let (tx, rx) = oneshot::channel();
            std::thread::spawn(move || {
                let _ = tx.send(read_confirmation(&prompt));
            });
            match rx.await {
                Ok(Ok(())) => {
                    if channel.acks.send(()).await.is_err() {
                        break;
                    }
                }
                Ok(Err(e)) => {
                    tracing::error!("Failed to read confirmation from terminal: {}", e);
                    break;
                }
                Err(_) => break,
            }
        }
    })
}

fn read_confirmation(prompt: &str) -> io::Result<()> {
    print!("{} ", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
    }
    Ok(())
}
