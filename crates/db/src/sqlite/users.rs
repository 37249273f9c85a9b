//! SQLite-Implementierung des UserRepository

use chrono::{DateTime, Utc};
use zugang_core::{Geschlecht, Rolle, UserId};

use crate::error::DbError;
use crate::models::{BenutzerRecord, BenutzerUpdate, NeuerBenutzer};
use crate::repository::{DbResult, UserRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::{zeit_parsen, zeitstempel};

const SPALTEN: &str = "id, account, name, mail_address, sex, password_hash, role, is_active, \
                       is_enable, last_authenticated_at, created_at";

impl UserRepository for SqliteDb {
    async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord> {
        let now = Utc::now();

        let id = sqlx::query(
            "INSERT INTO users (account, name, mail_address, sex, password_hash, role, is_active, is_enable, created_at)
             VALUES (?, ?, ?, ?, ?, ?, 0, 1, ?)",
        )
        .bind(data.account)
        .bind(data.name)
        .bind(data.mail_address)
        .bind(data.sex.als_str())
        .bind(data.password_hash)
        .bind(data.role.als_str())
        .bind(zeitstempel(&now))
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::Eindeutigkeit(_) => DbError::Eindeutigkeit(format!("Account '{}'", data.account)),
            andere => andere,
        })?
        .last_insert_rowid();

        Ok(BenutzerRecord {
            id: UserId(id),
            account: data.account.to_string(),
            name: data.name.to_string(),
            mail_address: data.mail_address.map(str::to_string),
            sex: data.sex,
            password_hash: data.password_hash.to_string(),
            role: data.role,
            is_active: false,
            is_enable: true,
            last_authenticated_at: None,
            created_at: now,
        })
    }

    async fn exists(&self, account: &str) -> DbResult<bool> {
        let anzahl: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE account = ?")
            .bind(account)
            .fetch_one(&self.pool)
            .await?;
        Ok(anzahl > 0)
    }

    async fn get_by_id(&self, id: UserId) -> DbResult<Option<BenutzerRecord>> {
        let sql = format!("SELECT {SPALTEN} FROM users WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id.inner())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn get_by_account(&self, account: &str) -> DbResult<Option<BenutzerRecord>> {
        let sql = format!("SELECT {SPALTEN} FROM users WHERE account = ?");
        let row = sqlx::query(&sql)
            .bind(account)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn update(&self, id: UserId, data: BenutzerUpdate) -> DbResult<BenutzerRecord> {
        // Dynamisches UPDATE – nur gesetzte Felder aendern
        let mut sets: Vec<&str> = Vec::new();
        if data.password_hash.is_some() {
            sets.push("password_hash = ?");
        }
        if data.is_active.is_some() {
            sets.push("is_active = ?");
        }
        if data.is_enable.is_some() {
            sets.push("is_enable = ?");
        }

        if sets.is_empty() {
            return self
                .get_by_id(id)
                .await?
                .ok_or_else(|| DbError::nicht_gefunden(format!("User {id}")));
        }

        let sql = format!("UPDATE users SET {} WHERE id = ?", sets.join(", "));
        let mut q = sqlx::query(&sql);

        if let Some(ref v) = data.password_hash {
            q = q.bind(v);
        }
        if let Some(v) = data.is_active {
            q = q.bind(v as i64);
        }
        if let Some(v) = data.is_enable {
            q = q.bind(v as i64);
        }
        q = q.bind(id.inner());

        let affected = q.execute(&self.pool).await?.rows_affected();
        if affected == 0 {
            return Err(DbError::nicht_gefunden(format!("User {id}")));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::nicht_gefunden(format!("User {id}")))
    }

    async fn update_last_authenticated(&self, id: UserId, zeitpunkt: DateTime<Utc>) -> DbResult<()> {
        sqlx::query("UPDATE users SET last_authenticated_at = ? WHERE id = ?")
            .bind(zeitstempel(&zeitpunkt))
            .bind(id.inner())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn row_to_benutzer(row: &sqlx::sqlite::SqliteRow) -> DbResult<BenutzerRecord> {
    use sqlx::Row as _;

    let role_str: String = row.try_get("role")?;
    let role: Rolle = role_str
        .parse()
        .map_err(|e| DbError::ungueltiger_wert("role", e))?;

    let sex_str: String = row.try_get("sex")?;
    let sex: Geschlecht = sex_str
        .parse()
        .map_err(|e| DbError::ungueltiger_wert("sex", e))?;

    let created_at_str: String = row.try_get("created_at")?;
    let created_at = zeit_parsen(&created_at_str, "created_at")?;

    let last_auth: Option<String> = row.try_get("last_authenticated_at")?;
    let last_authenticated_at = last_auth
        .as_deref()
        .map(|s| zeit_parsen(s, "last_authenticated_at"))
        .transpose()?;

    let is_active: i64 = row.try_get("is_active")?;
    let is_enable: i64 = row.try_get("is_enable")?;

    Ok(BenutzerRecord {
        id: UserId(row.try_get("id")?),
        account: row.try_get("account")?,
        name: row.try_get("name")?,
        mail_address: row.try_get("mail_address")?,
        sex,
        password_hash: row.try_get("password_hash")?,
        role,
        is_active: is_active != 0,
        is_enable: is_enable != 0,
        last_authenticated_at,
        created_at,
    })
}
