use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::Feedback;

pub fn insert_feedback(conn: &Connection, feedback: &Feedback) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO feedback (id, report_id, user_id, is_correct, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            feedback.id.to_string(),
            feedback.report_id.to_string(),
            feedback.user_id.to_string(),
            feedback.is_correct as i32,
            feedback.notes,
            format_timestamp(&feedback.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_feedback_for_report(
    conn: &Connection,
    report_id: &Uuid,
    user_id: &Uuid,
) -> Result<Option<Feedback>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, report_id, user_id, is_correct, notes, created_at
         FROM feedback WHERE report_id = ?1 AND user_id = ?2",
        params![report_id.to_string(), user_id.to_string()],
        |row| {
            Ok(FeedbackRow {
                id: row.get(0)?,
                report_id: row.get(1)?,
                user_id: row.get(2)?,
                is_correct: row.get(3)?,
                notes: row.get(4)?,
                created_at: row.get(5)?,
            })
        },
    );

    match result {
        Ok(row) => Ok(Some(feedback_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

struct FeedbackRow {
    id: String,
    report_id: String,
    user_id: String,
    is_correct: i32,
    notes: Option<String>,
    created_at: String,
}

fn feedback_from_row(row: FeedbackRow) -> Result<Feedback, DatabaseError> {
    Ok(Feedback {
        id: parse_uuid(&row.id)?,
        report_id: parse_uuid(&row.report_id)?,
        user_id: parse_uuid(&row.user_id)?,
        is_correct: row.is_correct != 0,
        notes: row.notes,
        created_at: parse_timestamp(&row.created_at),
    })
}
