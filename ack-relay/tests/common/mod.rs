//! Scripted loopback peer shared by the integration tests.
//!
//! The peer accepts one connection, splits the inbound stream into frames,
//! and answers frame `i` according to `script[i]` (frames past the end of the
//! script are acknowledged).  It keeps reading until the sender closes the
//! connection, so frames sent after a silent answer are still observed.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ack_relay::frame::{FrameDecoder, FrameFormat};
use ack_relay::SenderConfig;

/// Pause between the chunks of a [`Action::Chunks`] answer, so each one
/// arrives in its own read on the sender side.
pub const CHUNK_GAP: Duration = Duration::from_millis(60);

/// How the peer answers one frame.
#[derive(Debug, Clone)]
pub enum Action {
    /// Reply `OK`.
    Ack,
    /// Reply with each chunk in turn, pausing [`CHUNK_GAP`] between them.
    Chunks(Vec<&'static str>),
    /// Reply nothing.
    Silent,
    /// Close the connection without replying.
    Close,
    /// Reply `OK`, then close the connection.
    AckThenClose,
    /// Drop the connection while this frame still sits unread in the
    /// receive buffer, so the kernel answers with a reset. The frame is not
    /// recorded.
    Reset,
}

/// A running mock peer.
pub struct MockPeer {
    pub addr: SocketAddr,
    handle: JoinHandle<Vec<Vec<u8>>>,
}

impl MockPeer {
    /// Bind on an OS-chosen loopback port and serve one connection.
    pub fn spawn(script: Vec<Action>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock peer");
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            serve(stream, &script)
        });
        Self { addr, handle }
    }

    /// Sender settings pointed at this peer, with short timeouts.
    pub fn config(&self) -> SenderConfig {
        SenderConfig {
            connect_timeout: Duration::from_secs(2),
            read_timeout: Duration::from_millis(50),
            ack_timeout: Duration::from_secs(2),
            ..SenderConfig::new("127.0.0.1", self.addr.port())
        }
    }

    /// Wait for the connection to end; return every raw frame received.
    pub fn frames(self) -> Vec<Vec<u8>> {
        self.handle.join().expect("mock peer panicked")
    }

    /// Like [`frames`](Self::frames), decoded with the default format.
    pub fn records(self) -> Vec<String> {
        let fmt = FrameFormat::default();
        self.frames()
            .iter()
            .map(|f| fmt.decode(f).expect("well-formed frame"))
            .collect()
    }
}

fn serve(mut stream: TcpStream, script: &[Action]) -> Vec<Vec<u8>> {
    let mut decoder = FrameDecoder::new();
    let mut frames = Vec::new();
    let mut buf = [0u8; 4096];

    loop {
        if decoder.pending() == 0 && matches!(script.get(frames.len()), Some(Action::Reset)) {
            // Block until the frame has landed, then close without reading it.
            let _ = stream.peek(&mut buf);
            return frames;
        }

        let n = match stream.read(&mut buf) {
            Ok(0) | Err(_) => return frames,
            Ok(n) => n,
        };
        decoder.push(&buf[..n]);

        while let Some(frame) = decoder.next_frame() {
            let action = script.get(frames.len()).cloned().unwrap_or(Action::Ack);
            frames.push(frame);
            match action {
                Action::Ack => {
                    let _ = stream.write_all(b"OK");
                }
                Action::Chunks(chunks) => {
                    for (i, chunk) in chunks.iter().enumerate() {
                        if i > 0 {
                            thread::sleep(CHUNK_GAP);
                        }
                        let _ = stream.write_all(chunk.as_bytes());
                    }
                }
                Action::Silent => {}
                Action::Close | Action::Reset => return frames,
                Action::AckThenClose => {
                    let _ = stream.write_all(b"OK");
                    return frames;
                }
            }
        }
    }
}

/// A loopback port with nothing listening on it.
pub fn dead_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
