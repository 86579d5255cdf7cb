//! Blocking point-to-point exchanges over short-lived TCP connections.
//!
//! Every logical exchange is one message per connection: the initiator
//! connects, writes a single line, optionally blocks for the single-line
//! reply, and closes. There is deliberately no timeout, retry, or
//! cancellation anywhere; an unresponsive peer stalls the caller.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;

use super::message::Message;

/// Fire-and-forget send for token messages (Turn, End).
pub fn send(addr: SocketAddr, message: &Message) -> Result<()> {
    let mut stream = TcpStream::connect(addr)
        .wrap_err_with(|| format!("failed to connect to {}", addr))?;
    write_line(&mut stream, message)
}

/// Blocking request/response exchange (DvUpdate/Ack, ChangedQuery/Reply).
pub fn exchange(addr: SocketAddr, message: &Message) -> Result<Message> {
    let mut stream = TcpStream::connect(addr)
        .wrap_err_with(|| format!("failed to connect to {}", addr))?;
    write_line(&mut stream, message)?;

    let mut line = String::new();
    let mut reader = BufReader::new(&stream);
    reader
        .read_line(&mut line)
        .wrap_err_with(|| format!("failed to read reply from {}", addr))?;
    if line.is_empty() {
        return Err(eyre!("peer {} closed the connection before replying", addr));
    }

    Ok(Message::decode(&line)?)
}

/// Write a reply on an already-accepted connection.
pub fn reply(stream: &TcpStream, message: &Message) -> Result<()> {
    let mut writer = stream;
    write_line(&mut writer, message)
}

fn write_line<W: Write>(writer: &mut W, message: &Message) -> Result<()> {
    writer
        .write_all(message.encode().as_bytes())
        .wrap_err("failed to send message")?;
    writer.write_all(b"\n").wrap_err("failed to send message")?;
    writer.flush().wrap_err("failed to flush message")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_exchange_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut line = String::new();
            BufReader::new(&stream).read_line(&mut line).unwrap();
            assert_eq!(
                Message::decode(&line).unwrap(),
                Message::ChangedQuery { round: 4 }
            );
            reply(
                &stream,
                &Message::ChangedReply {
                    changed: false,
                    last_changed_round: 2,
                },
            )
            .unwrap();
        });

        let response = exchange(addr, &Message::ChangedQuery { round: 4 }).unwrap();
        assert_eq!(
            response,
            Message::ChangedReply {
                changed: false,
                last_changed_round: 2,
            }
        );
        server.join().unwrap();
    }

    #[test]
    fn test_send_delivers_one_line() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        send(addr, &Message::Turn { round: 1 }).unwrap();

        let (stream, _) = listener.accept().unwrap();
        let mut line = String::new();
        BufReader::new(&stream).read_line(&mut line).unwrap();
        assert_eq!(Message::decode(&line).unwrap(), Message::Turn { round: 1 });
    }

    #[test]
    fn test_exchange_reports_peer_reset() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            // Accept and drop the connection without replying.
            let (stream, _) = listener.accept().unwrap();
            drop(stream);
        });

        let result = exchange(addr, &Message::ChangedQuery { round: 1 });
        assert!(result.is_err());
        server.join().unwrap();
    }
}
