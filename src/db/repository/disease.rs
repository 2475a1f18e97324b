use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{decode_json, encode_json, format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::Disease;

pub fn insert_disease(conn: &Connection, disease: &Disease) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO diseases (id, name, description, symptoms, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            disease.id.to_string(),
            disease.name,
            disease.description,
            encode_json("symptoms", &disease.symptoms)?,
            format_timestamp(&disease.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_disease(conn: &Connection, id: &Uuid) -> Result<Option<Disease>, DatabaseError> {
    query_one(
        conn,
        "SELECT id, name, description, symptoms, created_at FROM diseases WHERE id = ?1",
        &id.to_string(),
    )
}

/// Case-insensitive lookup by canonical name.
pub fn get_disease_by_name(conn: &Connection, name: &str) -> Result<Option<Disease>, DatabaseError> {
    query_one(
        conn,
        "SELECT id, name, description, symptoms, created_at
         FROM diseases WHERE name = ?1 COLLATE NOCASE LIMIT 1",
        name,
    )
}

/// Idempotent create: look up by case-insensitive name, insert when absent,
/// and treat a unique violation on insert as a concurrent creation of the
/// same name — re-reading instead of surfacing the conflict.
pub fn find_or_create_disease(conn: &Connection, name: &str) -> Result<Disease, DatabaseError> {
    if let Some(existing) = get_disease_by_name(conn, name)? {
        return Ok(existing);
    }

    let disease = Disease::from_label(name);
    match insert_disease(conn, &disease) {
        Ok(()) => Ok(disease),
        Err(e) if e.is_unique_violation() => {
            get_disease_by_name(conn, name)?.ok_or(DatabaseError::NotFound {
                entity_type: "Disease".into(),
                id: name.into(),
            })
        }
        Err(e) => Err(e),
    }
}

fn query_one(conn: &Connection, sql: &str, param: &str) -> Result<Option<Disease>, DatabaseError> {
    let result = conn.query_row(sql, params![param], |row| {
        Ok(DiseaseRow {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            symptoms: row.get(3)?,
            created_at: row.get(4)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(disease_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

struct DiseaseRow {
    id: String,
    name: String,
    description: String,
    symptoms: String,
    created_at: String,
}

fn disease_from_row(row: DiseaseRow) -> Result<Disease, DatabaseError> {
    Ok(Disease {
        id: parse_uuid(&row.id)?,
        name: row.name,
        description: row.description,
        symptoms: decode_json("symptoms", &row.symptoms)?,
        created_at: parse_timestamp(&row.created_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn insert_and_get_by_name_case_insensitive() {
        let conn = open_memory_database().unwrap();
        let disease = Disease::from_label("Early Blight");
        insert_disease(&conn, &disease).unwrap();

        let found = get_disease_by_name(&conn, "early blight").unwrap().unwrap();
        assert_eq!(found.id, disease.id);
        assert_eq!(found.name, "Early Blight");
        assert_eq!(found.description, "Information about Early Blight");
        assert!(found.symptoms.is_empty());
    }

    #[test]
    fn find_or_create_is_idempotent() {
        let conn = open_memory_database().unwrap();
        let first = find_or_create_disease(&conn, "Powdery Mildew").unwrap();
        let second = find_or_create_disease(&conn, "powdery mildew").unwrap();
        let third = find_or_create_disease(&conn, "POWDERY MILDEW").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.id, third.id);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM diseases", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn find_or_create_survives_lost_insert_race() {
        let conn = open_memory_database().unwrap();
        // Simulate losing the race: the row appears between our lookup and
        // insert. A direct insert of the same name must come back as the
        // existing record, not an error.
        let rival = Disease::from_label("Leaf Spot");
        insert_disease(&conn, &rival).unwrap();

        let mine = Disease::from_label("leaf spot");
        let err = insert_disease(&conn, &mine).unwrap_err();
        assert!(err.is_unique_violation());

        let resolved = find_or_create_disease(&conn, "leaf spot").unwrap();
        assert_eq!(resolved.id, rival.id);
    }

    #[test]
    fn near_duplicate_names_stay_distinct() {
        let conn = open_memory_database().unwrap();
        let a = find_or_create_disease(&conn, "Early Blight").unwrap();
        let b = find_or_create_disease(&conn, "Early Blights").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn symptoms_round_trip() {
        let conn = open_memory_database().unwrap();
        let mut disease = Disease::from_label("Rust");
        disease.symptoms = vec!["orange pustules".into(), "leaf drop".into()];
        insert_disease(&conn, &disease).unwrap();

        let found = get_disease(&conn, &disease.id).unwrap().unwrap();
        assert_eq!(found.symptoms, disease.symptoms);
    }
}
