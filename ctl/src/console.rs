/*
 *   Copyright (c) 2025 twinax-ctl contributors
 *   All rights reserved.
 *
 *   Licensed under the Apache License, Version 2.0 (the "License");
 *   you may not use this file except in compliance with the License.
 *   You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 *   Unless required by applicable law or agreed to in writing, software
 *   distributed under the License is distributed on an "AS IS" BASIS,
 *   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *   See the License for the specific language governing permissions and
 *   limitations under the License.
 */

//! Operator debug consoles: a line-oriented protocol over TCP and/or a
//! Unix-domain socket, reimplemented from the interactive terminal-select
//! shell `original_source/` drives with Python's `cmd.Cmd` (`do_status`,
//! `do_input`, `do_escE`, ...). Each accepted connection gets its own
//! lightweight task, per §5's "each client gets its own lightweight task"
//! note — this is additive operator tooling, not a core subsystem, and
//! touches no wire/link/term semantics beyond what a terminal session
//! already exposes.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, UnixListener};
use tokio::sync::mpsc;

use twinax_term::TerminalSession;
use tokio::sync::Mutex;

use crate::config::ConsoleConfig;
use crate::error::DaemonError;

/// One configured terminal's session plus the sender the console can use
/// to inject bytes into its child's stdin directly (bypassing the
/// scancode decoder), the way `do_input`/`do_txstring` do in the original.
#[derive(Clone)]
pub struct ConsoleTerminal {
    pub station: u8,
    pub session: Arc<Mutex<TerminalSession>>,
    pub stdin_tx: mpsc::Sender<Vec<u8>>,
}

/// Starts whichever listeners `config` enables. Returns immediately;
/// listeners run as detached tasks for the process lifetime.
pub fn spawn(config: ConsoleConfig, terminals: Arc<Vec<ConsoleTerminal>>) -> Result<(), DaemonError> {
    if let Some(addr) = config.tcp_bind {
        let terminals = terminals.clone();
        tokio::spawn(async move {
            match TcpListener::bind(&addr).await {
                Ok(listener) => {
                    tracing::info!(addr = %addr, "operator console listening (tcp)");
                    accept_loop_tcp(listener, terminals).await;
                }
                Err(error) => tracing::error!(addr = %addr, %error, "failed to bind operator console"),
            }
        });
    }

    if let Some(path) = config.unix_socket {
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path).map_err(|source| DaemonError::ConsoleBind {
            addr: path.clone(),
            source,
        })?;
        tracing::info!(path = %path, "operator console listening (unix)");
        tokio::spawn(accept_loop_unix(listener, terminals));
    }

    Ok(())
}

async fn accept_loop_tcp(listener: TcpListener, terminals: Arc<Vec<ConsoleTerminal>>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let terminals = terminals.clone();
                tokio::spawn(async move {
                    let (rx, tx) = stream.into_split();
                    if let Err(error) = serve_client(rx, tx, terminals).await {
                        tracing::debug!(peer = %peer, %error, "console client disconnected");
                    }
                });
            }
            Err(error) => {
                tracing::warn!(%error, "console accept failed");
                break;
            }
        }
    }
}

async fn accept_loop_unix(listener: UnixListener, terminals: Arc<Vec<ConsoleTerminal>>) {
    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                let terminals = terminals.clone();
                tokio::spawn(async move {
                    let (rx, tx) = stream.into_split();
                    if let Err(error) = serve_client(rx, tx, terminals).await {
                        tracing::debug!(%error, "console client disconnected");
                    }
                });
            }
            Err(error) => {
                tracing::warn!(%error, "console accept failed");
                break;
            }
        }
    }
}

/// Runs the per-client command loop: select a station, then `status` /
/// `dump` / `reset` / `send <text>` against it until the client hangs up.
async fn serve_client<R, W>(rx: R, mut tx: W, terminals: Arc<Vec<ConsoleTerminal>>) -> std::io::Result<()>
where
    R: tokio::io::AsyncRead + Unpin,
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(rx).lines();
    let mut selected: Option<u8> = None;

    tx.write_all(b"twinax-ctl operator console. commands: select <n>, status, dump, reset, send <text>\n").await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let reply = handle_command(line, &mut selected, &terminals).await;
        tx.write_all(reply.as_bytes()).await?;
        tx.write_all(b"\n").await?;
    }
    Ok(())
}

async fn handle_command(line: &str, selected: &mut Option<u8>, terminals: &[ConsoleTerminal]) -> String {
    let mut parts = line.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim();

    match cmd {
        "select" => match rest.parse::<u8>() {
            Ok(station) if terminals.iter().any(|t| t.station == station) => {
                *selected = Some(station);
                format!("ok: selected station {station}")
            }
            Ok(station) => format!("error: station {station} is not configured"),
            Err(_) => "error: usage: select <station>".to_string(),
        },
        "status" => match find(selected, terminals) {
            Some(t) => {
                let s = t.session.lock().await;
                format!(
                    "station={} state={:?} cursor=({},{}) initialized={} busy={} poll_active={} response_level={} line_parity={}",
                    t.station, s.state, s.cursor.row, s.cursor.col, s.initialized, s.busy, s.poll_active, s.response_level, s.line_parity
                )
            }
            None => no_terminal_selected(),
        },
        "dump" => match find(selected, terminals) {
            Some(t) => {
                let s = t.session.lock().await;
                format!(
                    "station={} cursor={:?} saved_cursor={:?} newline_pending={} cursor_in_previous_line={} modifiers={:?} status_byte={:?} indicator_byte={:?} queue_depth={}",
                    t.station, s.cursor, s.saved_cursor, s.newline_pending, s.cursor_in_previous_line, s.modifiers, s.status_byte, s.indicator_byte, s.command_queue_depth()
                )
            }
            None => no_terminal_selected(),
        },
        "reset" => match find(selected, terminals) {
            Some(t) => {
                t.session.lock().await.disconnect();
                format!("ok: station {} reset", t.station)
            }
            None => no_terminal_selected(),
        },
        "send" => match find(selected, terminals) {
            Some(t) => {
                if rest.is_empty() {
                    "error: usage: send <text>".to_string()
                } else if t.stdin_tx.send(rest.as_bytes().to_vec()).await.is_ok() {
                    format!("ok: sent {} bytes", rest.len())
                } else {
                    "error: child is not running for this terminal".to_string()
                }
            }
            None => no_terminal_selected(),
        },
        "help" => "commands: select <n>, status, dump, reset, send <text>".to_string(),
        other => format!("error: unknown command {other:?}"),
    }
}

fn no_terminal_selected() -> String {
    "error: no terminal selected; use: select <station>".to_string()
}

fn find<'a>(selected: &Option<u8>, terminals: &'a [ConsoleTerminal]) -> Option<&'a ConsoleTerminal> {
    let station = (*selected)?;
    terminals.iter().find(|t| t.station == station)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use twinax_wire::BoundedFifo;

    fn terminal(station: u8) -> (ConsoleTerminal, mpsc::Receiver<Vec<u8>>) {
        let dict = Arc::new(twinax_term::ScancodeDictionary::builder("test").build());
        let commands = BoundedFifo::<Vec<u8>>::new(64);
        let polls = BoundedFifo::<Vec<u8>>::new(64);
        let session = TerminalSession::new(
            station,
            dict,
            twinax_term::SessionConfig::default(),
            commands.sender(),
            polls.sender(),
        );
        let (stdin_tx, stdin_rx) = mpsc::channel(8);
        (
            ConsoleTerminal {
                station,
                session: Arc::new(Mutex::new(session)),
                stdin_tx,
            },
            stdin_rx,
        )
    }

    #[tokio::test]
    async fn select_requires_a_configured_station() {
        let (t, _rx) = terminal(2);
        let terminals = vec![t];
        let mut selected = None;
        let reply = handle_command("select 2", &mut selected, &terminals).await;
        assert_eq!(reply, "ok: selected station 2");
        assert_eq!(selected, Some(2));

        let reply = handle_command("select 5", &mut selected, &terminals).await;
        assert_eq!(reply, "error: station 5 is not configured");
    }

    #[tokio::test]
    async fn status_without_selection_errors() {
        let terminals: Vec<ConsoleTerminal> = vec![];
        let mut selected = None;
        let reply = handle_command("status", &mut selected, &terminals).await;
        assert_eq!(reply, no_terminal_selected());
    }

    #[tokio::test]
    async fn send_forwards_bytes_to_stdin_channel() {
        let (t, mut rx) = terminal(1);
        let terminals = vec![t];
        let mut selected = Some(1);
        let reply = handle_command("send hello", &mut selected, &terminals).await;
        assert_eq!(reply, "ok: sent 5 bytes");
        assert_eq!(rx.recv().await, Some(b"hello".to_vec()));
    }
}
