//! Keeps the client's security list in sync with imported transactions

use tracing::info;

use crate::ledger::{Client, SecurityRef};

/// Add `security` to the client unless that very handle is already there.
///
/// Returns `true` when the security was added. `None` is a no-op, since
/// fee or interest bookings often have no security.
pub fn ensure_registered(client: &mut Client, security: Option<&SecurityRef>) -> bool {
    let Some(security) = security else {
        return false;
    };

    if client.contains_security(security) {
        return false;
    }

    info!(security = %security.id, name = %security.name, "Registering security");
    client.add_security(security.clone());
    true
}
