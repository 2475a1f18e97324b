use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{decode_json, encode_json, format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::Report;

const SELECT_COLUMNS: &str = "id, user_id, image_url, image_storage_id, predicted_disease,
     confidence, ai_treatments, deleted, created_at";

/// Persist a report and its catalog-treatment references atomically.
pub fn insert_report(conn: &Connection, report: &Report) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO reports (id, user_id, image_url, image_storage_id, predicted_disease,
         confidence, ai_treatments, deleted, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            report.id.to_string(),
            report.user_id.to_string(),
            report.image_url,
            report.image_storage_id,
            report.predicted_disease,
            report.confidence,
            encode_json("ai_treatments", &report.ai_treatments)?,
            report.deleted as i32,
            format_timestamp(&report.created_at),
        ],
    )?;

    for treatment_id in &report.treatment_ids {
        tx.execute(
            "INSERT INTO report_treatments (report_id, treatment_id) VALUES (?1, ?2)",
            params![report.id.to_string(), treatment_id.to_string()],
        )?;
    }

    tx.commit()?;
    Ok(())
}

/// Owner-scoped fetch. A report that exists but belongs to someone else is
/// indistinguishable from a missing one.
pub fn get_report_for_user(
    conn: &Connection,
    id: &Uuid,
    user_id: &Uuid,
) -> Result<Option<Report>, DatabaseError> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM reports
         WHERE id = ?1 AND user_id = ?2 AND deleted = 0"
    );
    let result = conn.query_row(&sql, params![id.to_string(), user_id.to_string()], row_to_raw);

    match result {
        Ok(row) => Ok(Some(report_from_row(conn, row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// A user's own reports, newest first.
pub fn list_reports_for_user(
    conn: &Connection,
    user_id: &Uuid,
    offset: i64,
    limit: i64,
) -> Result<Vec<Report>, DatabaseError> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM reports
         WHERE user_id = ?1 AND deleted = 0
         ORDER BY created_at DESC, id
         LIMIT ?2 OFFSET ?3"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id.to_string(), limit, offset], row_to_raw)?;

    let mut raw = Vec::new();
    for row in rows {
        raw.push(row?);
    }
    raw.into_iter().map(|r| report_from_row(conn, r)).collect()
}

pub fn count_reports_for_user(conn: &Connection, user_id: &Uuid) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM reports WHERE user_id = ?1 AND deleted = 0",
        params![user_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// All users' reports, newest first (admin view).
pub fn list_all_reports(
    conn: &Connection,
    offset: i64,
    limit: i64,
) -> Result<Vec<Report>, DatabaseError> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM reports
         WHERE deleted = 0
         ORDER BY created_at DESC, id
         LIMIT ?1 OFFSET ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![limit, offset], row_to_raw)?;

    let mut raw = Vec::new();
    for row in rows {
        raw.push(row?);
    }
    raw.into_iter().map(|r| report_from_row(conn, r)).collect()
}

pub fn count_all_reports(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM reports WHERE deleted = 0",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Hard delete; reference rows and feedback cascade.
pub fn delete_report(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM reports WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}

struct ReportRow {
    id: String,
    user_id: String,
    image_url: String,
    image_storage_id: String,
    predicted_disease: String,
    confidence: f64,
    ai_treatments: String,
    deleted: i32,
    created_at: String,
}

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReportRow> {
    Ok(ReportRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        image_url: row.get(2)?,
        image_storage_id: row.get(3)?,
        predicted_disease: row.get(4)?,
        confidence: row.get(5)?,
        ai_treatments: row.get(6)?,
        deleted: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn report_from_row(conn: &Connection, row: ReportRow) -> Result<Report, DatabaseError> {
    let id = parse_uuid(&row.id)?;
    Ok(Report {
        id,
        user_id: parse_uuid(&row.user_id)?,
        image_url: row.image_url,
        image_storage_id: row.image_storage_id,
        predicted_disease: row.predicted_disease,
        confidence: row.confidence,
        treatment_ids: load_treatment_ids(conn, &id)?,
        ai_treatments: decode_json("ai_treatments", &row.ai_treatments)?,
        deleted: row.deleted != 0,
        created_at: parse_timestamp(&row.created_at),
    })
}

fn load_treatment_ids(conn: &Connection, report_id: &Uuid) -> Result<Vec<Uuid>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT treatment_id FROM report_treatments WHERE report_id = ?1 ORDER BY rowid",
    )?;
    let rows = stmt.query_map(params![report_id.to_string()], |row| row.get::<_, String>(0))?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(parse_uuid(&row?)?);
    }
    Ok(ids)
}
