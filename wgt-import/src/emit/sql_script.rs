//! PostgreSQL import script rendering
//!
//! Renders a batch as one anonymous `DO` block. Each operation looks the
//! player up by username and inserts with `ON CONFLICT DO NOTHING`, so the
//! script has the same insert-if-absent semantics as [`super::apply`] and
//! can be run repeatedly. Players missing from `users` are skipped.

use super::UpsertOperation;

/// Quote a string as a SQL literal (`'` doubled)
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Render the whole script
pub fn render(operations: &[UpsertOperation]) -> String {
    let mut sql = String::new();

    sql.push_str("-- Import historical Wordle scores\n");
    sql.push_str(&format!("-- {} insert-if-absent operations\n\n", operations.len()));
    sql.push_str("DO $$\n");
    sql.push_str("DECLARE\n");
    sql.push_str("  v_user_id INTEGER;\n");
    sql.push_str("BEGIN\n\n");

    for op in operations {
        let player = op.player.as_str();
        sql.push_str(&format!(
            "  -- {}: Wordle {} = {}\n",
            player.replace(['\r', '\n'], " "),
            op.puzzle_number,
            op.score
        ));
        sql.push_str(&format!(
            "  SELECT id INTO v_user_id FROM users WHERE username = {};\n",
            quote_literal(player)
        ));
        sql.push_str("  IF v_user_id IS NOT NULL THEN\n");
        sql.push_str("    INSERT INTO scores (user_id, wordle_number, score, date)\n");
        sql.push_str(&format!(
            "    VALUES (v_user_id, {}, {}, '{}'::date)\n",
            op.puzzle_number,
            op.score,
            op.date.format("%Y-%m-%d")
        ));
        sql.push_str("    ON CONFLICT (user_id, wordle_number) DO NOTHING;\n");
        sql.push_str("  END IF;\n\n");
    }

    sql.push_str("END $$;\n");
    sql
}
