//! `cardwall list` - show the board

use anyhow::Result;
use cardwall_board::{Board, BoardSession, ColumnId};
use comfy_table::{presets::UTF8_FULL, Table};

/// Print the board as a table, or as grouped JSON
pub async fn run_list(session: &BoardSession, json: bool) -> Result<()> {
    let board = session.snapshot().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&board)?);
        return Ok(());
    }

    if board.is_empty() {
        println!("No tasks.");
        return Ok(());
    }

    println!("{}", render_table(&board));
    println!("\n{} task(s).", board.len());
    Ok(())
}

/// One row per card, columns in board order
pub fn render_table(board: &Board) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Column", "#", "Id", "Text"]);

    for column in ColumnId::ALL {
        for (index, task) in board.column(column).iter().enumerate() {
            table.add_row(vec![
                column.title().to_string(),
                index.to_string(),
                task.id.to_string(),
                task.text.clone(),
            ]);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardwall_board::{Task, TaskRecord};

    #[test]
    fn test_render_table_orders_columns() {
        let records: Vec<TaskRecord> = vec![
            Task::new("shipped", ColumnId::Done, 0.0).to_record(),
            Task::new("planned", ColumnId::Todo, 0.0).to_record(),
        ];
        let rendered = render_table(&Board::from_records(records)).to_string();

        let planned = rendered.find("planned").unwrap();
        let shipped = rendered.find("shipped").unwrap();
        assert!(planned < shipped);
        assert!(rendered.contains("To Do"));
    }
}
