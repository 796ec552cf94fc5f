//! `cardwall add` - append a card to a column

use super::parse_column;
use anyhow::Result;
use cardwall_board::BoardSession;

/// Add a card and print its id
pub async fn run_add(session: &BoardSession, column: &str, words: &[String]) -> Result<()> {
    let column = parse_column(column)?;
    let task = session.add(column, &words.join(" ")).await?;
    println!("{}", task.id);
    Ok(())
}
