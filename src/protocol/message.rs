//! The closed set of protocol messages and their plain-text wire codec.
//!
//! Every message travels as a single text line over a fresh TCP connection.
//! Decoding happens exactly once at the receiving boundary; the rest of the
//! crate only ever sees the `Message` enum.

/// Errors produced while decoding a wire line.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed message line: {0:?}")]
    Malformed(String),
    #[error("invalid number '{value}' in message field '{field}'")]
    InvalidNumber { field: &'static str, value: String },
}

/// A protocol message.
///
/// `Turn`, `ChangedQuery`, and `DvUpdate` carry the current round so every
/// receiver evaluates "changed this round?" against the same value without a
/// process-global counter.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// The ring token: the receiver may broadcast its row this round.
    Turn { round: u64 },
    /// Convergence poll: did your table change in `round`?
    ChangedQuery { round: u64 },
    /// Reply to `ChangedQuery`. `last_changed_round` travels on the wire only
    /// for unchanged replies; it is 0 when decoded from a bare `true`.
    ChangedReply { changed: bool, last_changed_round: i64 },
    /// One node's own distance row, broadcast to a neighbor.
    DvUpdate {
        sender: String,
        round: u64,
        distances: Vec<f64>,
    },
    /// Acknowledges a `DvUpdate`.
    Ack,
    /// Termination token: print the final row and stop.
    End,
}

impl Message {
    /// Encode to the wire line (without the trailing newline).
    pub fn encode(&self) -> String {
        match self {
            Message::Turn { round } => format!("turn;{}", round),
            Message::ChangedQuery { round } => format!("changed?;{}", round),
            Message::ChangedReply { changed: true, .. } => "true".to_string(),
            Message::ChangedReply {
                changed: false,
                last_changed_round,
            } => format!("false;{}", last_changed_round),
            Message::DvUpdate {
                sender,
                round,
                distances,
            } => {
                let joined: Vec<String> = distances.iter().map(|d| d.to_string()).collect();
                format!("dv;{};{};{}", sender, round, joined.join(" "))
            }
            Message::Ack => "done".to_string(),
            Message::End => "end".to_string(),
        }
    }

    /// Decode a wire line into a message.
    pub fn decode(line: &str) -> Result<Message, ProtocolError> {
        let line = line.trim();
        let mut parts = line.split(';');
        let tag = parts.next().unwrap_or_default();

        match tag {
            "turn" => Ok(Message::Turn {
                round: parse_round(&mut parts, line)?,
            }),
            "changed?" => Ok(Message::ChangedQuery {
                round: parse_round(&mut parts, line)?,
            }),
            "true" => Ok(Message::ChangedReply {
                changed: true,
                last_changed_round: 0,
            }),
            "false" => {
                let value = parts
                    .next()
                    .ok_or_else(|| ProtocolError::Malformed(line.to_string()))?;
                let last_changed_round =
                    value
                        .parse::<i64>()
                        .map_err(|_| ProtocolError::InvalidNumber {
                            field: "last_changed_round",
                            value: value.to_string(),
                        })?;
                Ok(Message::ChangedReply {
                    changed: false,
                    last_changed_round,
                })
            }
            "dv" => {
                let sender = parts
                    .next()
                    .ok_or_else(|| ProtocolError::Malformed(line.to_string()))?;
                let round = parse_round(&mut parts, line)?;
                let vector = parts
                    .next()
                    .ok_or_else(|| ProtocolError::Malformed(line.to_string()))?;
                let mut distances = Vec::new();
                for token in vector.split_whitespace() {
                    let distance =
                        token
                            .parse::<f64>()
                            .map_err(|_| ProtocolError::InvalidNumber {
                                field: "distances",
                                value: token.to_string(),
                            })?;
                    distances.push(distance);
                }
                Ok(Message::DvUpdate {
                    sender: sender.to_string(),
                    round,
                    distances,
                })
            }
            "done" => Ok(Message::Ack),
            "end" => Ok(Message::End),
            _ => Err(ProtocolError::Malformed(line.to_string())),
        }
    }
}

fn parse_round<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    line: &str,
) -> Result<u64, ProtocolError> {
    let value = parts
        .next()
        .ok_or_else(|| ProtocolError::Malformed(line.to_string()))?;
    value.parse::<u64>().map_err(|_| ProtocolError::InvalidNumber {
        field: "round",
        value: value.to_string(),
    })
}
