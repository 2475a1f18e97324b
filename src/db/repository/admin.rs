use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::Admin;

pub fn insert_admin(conn: &Connection, admin: &Admin) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO admins (id, user_id, is_super_admin, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            admin.id.to_string(),
            admin.user_id.to_string(),
            admin.is_super_admin as i32,
            format_timestamp(&admin.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_admin_by_user(conn: &Connection, user_id: &Uuid) -> Result<Option<Admin>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, user_id, is_super_admin, created_at FROM admins WHERE user_id = ?1",
        params![user_id.to_string()],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i32>(2)?,
                row.get::<_, String>(3)?,
            ))
        },
    );

    match result {
        Ok((id, user_id, is_super_admin, created_at)) => Ok(Some(Admin {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            is_super_admin: is_super_admin != 0,
            created_at: parse_timestamp(&created_at),
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Grant admin rights to a user id, idempotently (startup bootstrap).
pub fn ensure_admin(conn: &Connection, user_id: &Uuid) -> Result<Admin, DatabaseError> {
    if let Some(existing) = get_admin_by_user(conn, user_id)? {
        return Ok(existing);
    }

    let admin = Admin {
        id: Uuid::new_v4(),
        user_id: *user_id,
        is_super_admin: false,
        created_at: chrono::Utc::now().naive_utc(),
    };
    match insert_admin(conn, &admin) {
        Ok(()) => Ok(admin),
        Err(e) if e.is_unique_violation() => {
            get_admin_by_user(conn, user_id)?.ok_or(DatabaseError::NotFound {
                entity_type: "Admin".into(),
                id: user_id.to_string(),
            })
        }
        Err(e) => Err(e),
    }
}
