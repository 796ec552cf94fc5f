//! `cardwall rm` - delete a card

use anyhow::Result;
use cardwall_board::{BoardSession, TaskId};

/// Delete a card. Unknown ids succeed silently.
pub async fn run_rm(session: &BoardSession, id: &str) -> Result<()> {
    let id = TaskId::from(id);
    if session.delete(&id).await?.is_none() {
        tracing::debug!(%id, "nothing to delete");
    }
    Ok(())
}
