use crate::events::AppEvent;
use async_channel::Sender;
use radarctl::ipc::{Command, SOCKET_PATH};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::UnixListener;

pub async fn run_server(tx: Sender<AppEvent>) {
    run_server_at(Path::new(SOCKET_PATH), tx).await;
}

pub async fn run_server_at(socket: &Path, tx: Sender<AppEvent>) {
    // Cleanup old socket if it exists
    if fs_err::metadata(socket).is_ok() {
        let _ = fs_err::remove_file(socket);
    }

    let listener = match UnixListener::bind(socket) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket {}: {}", socket.display(), e);
            return;
        }
    };

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    forward_commands(stream, tx).await;
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Forwards every parseable line as an event; stops when the GUI side is gone.
async fn forward_commands<R: AsyncRead + Unpin>(stream: R, tx: Sender<AppEvent>) {
    let mut lines = BufReader::new(stream).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        match line.parse::<Command>() {
            Ok(command) => {
                if tx.send(AppEvent::from(command)).await.is_err() {
                    break;
                }
            }
            Err(e) => log::warn!("Ignoring control line {:?}: {}", line, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radarctl::target::TargetPath;

    #[tokio::test]
    async fn test_forwards_known_commands_only() {
        let (tx, rx) = async_channel::unbounded();
        let input: &[u8] = b"show\nscan now\ntarget /wanted.png\n\nhide\n";

        forward_commands(input, tx).await;

        let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], AppEvent::Show));
        assert!(matches!(&events[1], AppEvent::Target(p) if *p == TargetPath::from("/wanted.png")));
        assert!(matches!(events[2], AppEvent::Hide));
    }

    #[tokio::test]
    async fn test_stops_when_receiver_dropped() {
        let (tx, rx) = async_channel::unbounded();
        drop(rx);
        let input: &[u8] = b"show\nhide\n";

        // must return instead of looping on a closed channel
        forward_commands(input, tx).await;
    }
}
