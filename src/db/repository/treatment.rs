use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{decode_json, encode_json, format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::TreatmentMethod;
use crate::models::Treatment;

const SELECT_COLUMNS: &str =
    "id, disease_id, method, steps, image_url, approved, created_at";

pub fn insert_treatment(conn: &Connection, treatment: &Treatment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO treatments (id, disease_id, method, steps, image_url, approved, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            treatment.id.to_string(),
            treatment.disease_id.to_string(),
            treatment.method.as_str(),
            encode_json("steps", &treatment.steps)?,
            treatment.image_url,
            treatment.approved as i32,
            format_timestamp(&treatment.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_treatment(conn: &Connection, id: &Uuid) -> Result<Option<Treatment>, DatabaseError> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM treatments WHERE id = ?1");
    let result = conn.query_row(&sql, params![id.to_string()], row_to_raw);

    match result {
        Ok(row) => Ok(Some(treatment_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Full-record update by id. Returns NotFound when the id does not exist.
pub fn update_treatment(conn: &Connection, treatment: &Treatment) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE treatments SET disease_id = ?2, method = ?3, steps = ?4,
         image_url = ?5, approved = ?6 WHERE id = ?1",
        params![
            treatment.id.to_string(),
            treatment.disease_id.to_string(),
            treatment.method.as_str(),
            encode_json("steps", &treatment.steps)?,
            treatment.image_url,
            treatment.approved as i32,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Treatment".into(),
            id: treatment.id.to_string(),
        });
    }
    Ok(())
}

/// Hard delete. Returns whether a record was removed.
pub fn delete_treatment(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM treatments WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(changed > 0)
}

/// Approved catalog treatments for a disease, oldest first.
pub fn get_approved_treatments(
    conn: &Connection,
    disease_id: &Uuid,
) -> Result<Vec<Treatment>, DatabaseError> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM treatments
         WHERE disease_id = ?1 AND approved = 1
         ORDER BY created_at, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![disease_id.to_string()], row_to_raw)?;

    let mut treatments = Vec::new();
    for row in rows {
        treatments.push(treatment_from_row(row?)?);
    }
    Ok(treatments)
}

/// Resolve a set of treatment ids, preserving input order and skipping ids
/// whose records have since been deleted from the catalog.
pub fn get_treatments_by_ids(
    conn: &Connection,
    ids: &[Uuid],
) -> Result<Vec<Treatment>, DatabaseError> {
    let mut treatments = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(t) = get_treatment(conn, id)? {
            treatments.push(t);
        }
    }
    Ok(treatments)
}

/// Optional filters for the admin treatment listing.
#[derive(Debug, Default, Clone)]
pub struct TreatmentFilter {
    pub disease_id: Option<Uuid>,
    pub approved: Option<bool>,
    pub method: Option<TreatmentMethod>,
}

/// Filtered listing, newest first.
pub fn list_treatments(
    conn: &Connection,
    filter: &TreatmentFilter,
) -> Result<Vec<Treatment>, DatabaseError> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM treatments
         WHERE (?1 IS NULL OR disease_id = ?1)
           AND (?2 IS NULL OR approved = ?2)
           AND (?3 IS NULL OR method = ?3)
         ORDER BY created_at DESC, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![
            filter.disease_id.map(|id| id.to_string()),
            filter.approved.map(|a| a as i32),
            filter.method.map(|m| m.as_str()),
        ],
        row_to_raw,
    )?;

    let mut treatments = Vec::new();
    for row in rows {
        treatments.push(treatment_from_row(row?)?);
    }
    Ok(treatments)
}

struct TreatmentRow {
    id: String,
    disease_id: String,
    method: String,
    steps: String,
    image_url: Option<String>,
    approved: i32,
    created_at: String,
}

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<TreatmentRow> {
    Ok(TreatmentRow {
        id: row.get(0)?,
        disease_id: row.get(1)?,
        method: row.get(2)?,
        steps: row.get(3)?,
        image_url: row.get(4)?,
        approved: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn treatment_from_row(row: TreatmentRow) -> Result<Treatment, DatabaseError> {
    Ok(Treatment {
        id: parse_uuid(&row.id)?,
        disease_id: parse_uuid(&row.disease_id)?,
        method: TreatmentMethod::from_str(&row.method)?,
        steps: decode_json("steps", &row.steps)?,
        image_url: row.image_url,
        approved: row.approved != 0,
        created_at: parse_timestamp(&row.created_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::disease::insert_disease;
    use crate::db::sqlite::open_memory_database;
    use crate::models::Disease;

    fn seed_disease(conn: &Connection, name: &str) -> Uuid {
        let disease = Disease::from_label(name);
        insert_disease(conn, &disease).unwrap();
        disease.id
    }

    fn make_treatment(disease_id: Uuid, method: TreatmentMethod, approved: bool) -> Treatment {
        Treatment {
            id: Uuid::new_v4(),
            disease_id,
            method,
            steps: vec!["Prune infected branches".into(), "Apply treatment weekly".into()],
            image_url: None,
            approved,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let conn = open_memory_database().unwrap();
        let disease_id = seed_disease(&conn, "Early Blight");
        let treatment = make_treatment(disease_id, TreatmentMethod::Organic, true);
        insert_treatment(&conn, &treatment).unwrap();

        let found = get_treatment(&conn, &treatment.id).unwrap().unwrap();
        assert_eq!(found.disease_id, disease_id);
        assert_eq!(found.method, TreatmentMethod::Organic);
        assert_eq!(found.steps.len(), 2);
        assert!(found.approved);
    }

    #[test]
    fn approved_filter_excludes_unapproved() {
        let conn = open_memory_database().unwrap();
        let disease_id = seed_disease(&conn, "Leaf Spot");
        insert_treatment(&conn, &make_treatment(disease_id, TreatmentMethod::Organic, true)).unwrap();
        insert_treatment(&conn, &make_treatment(disease_id, TreatmentMethod::Chemical, false)).unwrap();

        let approved = get_approved_treatments(&conn, &disease_id).unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].method, TreatmentMethod::Organic);
    }

    #[test]
    fn update_flips_approval() {
        let conn = open_memory_database().unwrap();
        let disease_id = seed_disease(&conn, "Rust");
        let mut treatment = make_treatment(disease_id, TreatmentMethod::Cultural, false);
        insert_treatment(&conn, &treatment).unwrap();
        assert!(get_approved_treatments(&conn, &disease_id).unwrap().is_empty());

        treatment.approved = true;
        update_treatment(&conn, &treatment).unwrap();
        assert_eq!(get_approved_treatments(&conn, &disease_id).unwrap().len(), 1);
    }

    #[test]
    fn update_missing_is_not_found() {
        let conn = open_memory_database().unwrap();
        let disease_id = seed_disease(&conn, "Rust");
        let treatment = make_treatment(disease_id, TreatmentMethod::Cultural, false);
        let err = update_treatment(&conn, &treatment).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn delete_reports_whether_removed() {
        let conn = open_memory_database().unwrap();
        let disease_id = seed_disease(&conn, "Mosaic Virus");
        let treatment = make_treatment(disease_id, TreatmentMethod::Integrated, true);
        insert_treatment(&conn, &treatment).unwrap();

        assert!(delete_treatment(&conn, &treatment.id).unwrap());
        assert!(!delete_treatment(&conn, &treatment.id).unwrap());
        assert!(get_treatment(&conn, &treatment.id).unwrap().is_none());
    }

    #[test]
    fn list_honors_filters() {
        let conn = open_memory_database().unwrap();
        let blight = seed_disease(&conn, "Early Blight");
        let mildew = seed_disease(&conn, "Powdery Mildew");
        insert_treatment(&conn, &make_treatment(blight, TreatmentMethod::Organic, true)).unwrap();
        insert_treatment(&conn, &make_treatment(blight, TreatmentMethod::Chemical, false)).unwrap();
        insert_treatment(&conn, &make_treatment(mildew, TreatmentMethod::Organic, true)).unwrap();

        let all = list_treatments(&conn, &TreatmentFilter::default()).unwrap();
        assert_eq!(all.len(), 3);

        let blight_only = list_treatments(
            &conn,
            &TreatmentFilter { disease_id: Some(blight), ..Default::default() },
        )
        .unwrap();
        assert_eq!(blight_only.len(), 2);

        let approved_organic = list_treatments(
            &conn,
            &TreatmentFilter {
                approved: Some(true),
                method: Some(TreatmentMethod::Organic),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(approved_organic.len(), 2);

        let unapproved = list_treatments(
            &conn,
            &TreatmentFilter { approved: Some(false), ..Default::default() },
        )
        .unwrap();
        assert_eq!(unapproved.len(), 1);
        assert_eq!(unapproved[0].method, TreatmentMethod::Chemical);
    }

    #[test]
    fn ids_lookup_preserves_order_and_skips_missing() {
        let conn = open_memory_database().unwrap();
        let disease_id = seed_disease(&conn, "Canker");
        let a = make_treatment(disease_id, TreatmentMethod::Organic, true);
        let b = make_treatment(disease_id, TreatmentMethod::Chemical, true);
        insert_treatment(&conn, &a).unwrap();
        insert_treatment(&conn, &b).unwrap();

        let ghost = Uuid::new_v4();
        let found = get_treatments_by_ids(&conn, &[b.id, ghost, a.id]).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, b.id);
        assert_eq!(found[1].id, a.id);
    }
}
