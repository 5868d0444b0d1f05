//! Message channel between supervisor and worker.
//!
//! The channel is the worker's stdin/stdout carrying newline-delimited JSON.
//! A supervisor that wants message mode announces it by setting
//! `CHILDPROC_CHANNEL=message` in the worker's environment; without that
//! variable the worker falls back to argument mode.

use super::protocol::WorkerReply;
use serde_json::Value;
use std::io::{self, BufRead, Write};

/// Environment variable announcing that a message channel is attached.
pub const CHANNEL_ENV: &str = "CHILDPROC_CHANNEL";

/// Value of `CHANNEL_ENV` selecting message mode.
pub const CHANNEL_MESSAGE: &str = "message";

/// How the worker was asked to receive its task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryMode {
    /// Task arrives as one JSON message on the channel.
    Message,
    /// Task arrives as the first positional argument.
    Argument(Option<String>),
}

impl EntryMode {
    /// Capability check: message mode if the channel is announced, argument
    /// mode otherwise. `args` excludes the program name.
    pub fn detect<I>(channel: Option<&str>, mut args: I) -> Self
    where
        I: Iterator<Item = String>,
    {
        match channel {
            Some(c) if c.eq_ignore_ascii_case(CHANNEL_MESSAGE) => EntryMode::Message,
            _ => EntryMode::Argument(args.next()),
        }
    }

    /// Detect from the real process environment and arguments.
    pub fn from_env() -> Self {
        let channel = std::env::var(CHANNEL_ENV).ok();
        Self::detect(channel.as_deref(), std::env::args().skip(1))
    }
}

/// What arrived on the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// A line that parsed as JSON.
    Message(Value),
    /// A line that did not parse; kept verbatim for the error reply.
    Malformed(String),
    /// The supervisor closed the channel without sending anything.
    Closed,
}

/// Line-oriented JSON channel over a reader/writer pair.
pub struct MessageChannel<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> MessageChannel<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Receive the next message. Blank lines are skipped.
    pub fn recv(&mut self) -> io::Result<Incoming> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(Incoming::Closed);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Ok(match serde_json::from_str(trimmed) {
                Ok(value) => Incoming::Message(value),
                Err(_) => Incoming::Malformed(trimmed.to_string()),
            });
        }
    }

    /// Send one reply line and flush.
    pub fn send(&mut self, reply: &WorkerReply) -> io::Result<()> {
        self.writer.write_all(reply.to_line().as_bytes())?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_detect_modes() {
        assert_eq!(
            EntryMode::detect(Some("message"), args(&["5"])),
            EntryMode::Message
        );
        assert_eq!(
            EntryMode::detect(Some("MESSAGE"), args(&[])),
            EntryMode::Message
        );
        assert_eq!(
            EntryMode::detect(None, args(&["5", "extra"])),
            EntryMode::Argument(Some("5".into()))
        );
        assert_eq!(
            EntryMode::detect(Some("pipe"), args(&[])),
            EntryMode::Argument(None)
        );
    }

    #[test]
    fn test_recv_variants() {
        let input = Cursor::new("\n{\"size\":3}\nnot json\n");
        let mut channel = MessageChannel::new(input, Vec::new());
        assert_eq!(channel.recv().unwrap(), Incoming::Message(json!({"size": 3})));
        assert_eq!(
            channel.recv().unwrap(),
            Incoming::Malformed("not json".into())
        );
        assert_eq!(channel.recv().unwrap(), Incoming::Closed);
    }

    #[test]
    fn test_send_writes_one_line() {
        let mut out = Vec::new();
        {
            let mut channel = MessageChannel::new(Cursor::new(""), &mut out);
            channel
                .send(&WorkerReply::Error {
                    message: "bad".into(),
                    received: Value::Null,
                })
                .unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("\"status\":\"error\""));
    }
}
