//! `cardwall rebalance` - renumber positions to whole numbers

use super::parse_column;
use anyhow::Result;
use cardwall_board::{BoardSession, ColumnId};

/// Rebalance one column, or every column when `column` is `None`
pub async fn run_rebalance(session: &BoardSession, column: Option<&str>) -> Result<()> {
    let columns = match column {
        Some(value) => vec![parse_column(value)?],
        None => ColumnId::ALL.to_vec(),
    };

    for column in columns {
        let updated = session.rebalance(column).await?;
        println!("{}: {} card(s) renumbered", column, updated);
    }
    Ok(())
}
