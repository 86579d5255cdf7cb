//! Convergence detection: the terminal node's per-round poll of the network.
//!
//! Runs inside the terminal node's Turn handling, after its own broadcast
//! phase. Strictly sequential: one outstanding query at a time.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;

use crate::directory::NodeDirectory;
use crate::protocol::transport;
use crate::protocol::Message;

/// Query every node for "changed since last round" status.
///
/// The poller answers for itself from its own already-known state instead of
/// opening a connection to its own endpoint. Returns `None` while any node
/// still reports a change this round, or `Some(round)` once the network is
/// quiet, where `round` is the last round in which any node's table changed.
pub fn poll_network(
    directory: &NodeDirectory,
    poller: &str,
    round: u64,
    poller_last_changed: i64,
) -> Result<Option<i64>> {
    let mut any_changed = false;
    // The authoritative convergence round: the maximum last-changed round
    // reported by nodes that answered "unchanged". Starts at 0 so a network
    // that never changes reports round 0.
    let mut last_change = 0i64;

    for name in directory.names() {
        if name == poller {
            if poller_last_changed == round as i64 {
                any_changed = true;
            } else {
                last_change = last_change.max(poller_last_changed);
            }
            continue;
        }

        let reply = transport::exchange(directory.endpoint(name)?, &Message::ChangedQuery { round })
            .wrap_err_with(|| format!("changed-poll of node {} failed", name))?;
        match reply {
            Message::ChangedReply { changed: true, .. } => any_changed = true,
            Message::ChangedReply {
                changed: false,
                last_changed_round,
            } => last_change = last_change.max(last_changed_round),
            other => log::warn!("changed-poll of node {} returned {:?}", name, other),
        }
    }

    if any_changed {
        Ok(None)
    } else {
        Ok(Some(last_change))
    }
}
