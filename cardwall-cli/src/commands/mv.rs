//! `cardwall mv` - move a card between or within columns

use super::parse_column;
use anyhow::{bail, Result};
use cardwall_board::{BoardSession, TaskId};

/// Move a card to `column`, at `index` or the end of the column.
///
/// The source column is looked up on the board. Moving a card onto its
/// current slot succeeds without writing.
pub async fn run_mv(
    session: &BoardSession,
    id: &str,
    column: &str,
    index: Option<usize>,
) -> Result<()> {
    let to = parse_column(column)?;
    let id = TaskId::from(id);

    let Some((from, _)) = session.snapshot().await.locate(&id) else {
        bail!("no task with id {}", id);
    };

    // Out-of-range indexes are clamped to the end of the column
    let index = index.unwrap_or(usize::MAX);
    if !session.move_task(&id, from, to, index).await? {
        tracing::debug!(%id, %to, "task already in place");
    }
    Ok(())
}
