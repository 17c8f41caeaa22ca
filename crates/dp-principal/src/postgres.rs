//! PostgreSQL implementation of the principal store.

use async_trait::async_trait;
use indexmap::IndexMap;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, info};

use dp_common::path;

use crate::entity::Principal;
use crate::fields::{FieldMap, PROP_EMAIL};
use crate::store::{
    PrincipalStore, PrincipalTableConfig, PropertyPatch, PropertyUpdate, SearchMode,
};
use crate::{Result, StoreError};

/// PostgreSQL-backed [`PrincipalStore`].
#[derive(Debug, Clone)]
pub struct PostgresPrincipalStore {
    pool: PgPool,
    tables: PrincipalTableConfig,
    fields: FieldMap,
}

impl PostgresPrincipalStore {
    /// Creates a store with the default table names and field map.
    pub fn new(pool: PgPool) -> Self {
        Self::with_config(pool, PrincipalTableConfig::default(), FieldMap::default())
    }

    /// Creates a store with custom table names and field map.
    pub fn with_config(pool: PgPool, tables: PrincipalTableConfig, fields: FieldMap) -> Self {
        Self {
            pool,
            tables,
            fields,
        }
    }

    /// The underlying pool, for callers sharing the connection.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn select_columns(&self) -> String {
        let mut columns = String::from("id, uri");
        for column in self.fields.columns() {
            columns.push_str(", ");
            columns.push_str(column);
        }
        columns
    }

    fn parse_row(&self, row: &PgRow) -> Result<Principal> {
        let mut properties = IndexMap::new();
        for (property, column) in self.fields.entries() {
            if let Some(value) = row.try_get::<Option<String>, _>(column)? {
                properties.insert(property.to_string(), value);
            }
        }
        Ok(Principal {
            id: row.try_get("id")?,
            uri: row.try_get("uri")?,
            properties,
        })
    }

    async fn principal_id(&self, path: &str) -> Result<Option<i64>> {
        let row = sqlx::query(&format!(
            "SELECT id FROM {} WHERE uri = $1",
            self.tables.principals_table
        ))
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|row| row.try_get::<i64, _>("id")).transpose()?)
    }
}

// LIKE treats backslash as an escape character here; escape the prefix
// so the narrowing pattern stays literal.
fn prefix_pattern(prefix: &str) -> String {
    let escaped = prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("{escaped}/%")
}

#[async_trait]
impl PrincipalStore for PostgresPrincipalStore {
    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<Principal>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE uri LIKE $1 ORDER BY id ASC",
            self.select_columns(),
            self.tables.principals_table
        );
        let rows = sqlx::query(&sql)
            .bind(prefix_pattern(prefix))
            .fetch_all(&self.pool)
            .await?;

        let mut principals = Vec::new();
        for row in rows {
            let principal = self.parse_row(&row)?;
            // LIKE matches the whole subtree; keep direct children only.
            if path::is_direct_child(&principal.uri, prefix) {
                principals.push(principal);
            }
        }
        debug!(prefix = %prefix, count = principals.len(), "Listed principals");
        Ok(principals)
    }

    async fn find_by_path(&self, path: &str) -> Result<Option<Principal>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE uri = $1",
            self.select_columns(),
            self.tables.principals_table
        );
        let row = sqlx::query(&sql)
            .bind(path)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| self.parse_row(&row)).transpose()
    }

    async fn update_properties(
        &self,
        path: &str,
        patch: &PropertyPatch,
    ) -> Result<PropertyUpdate> {
        let mut assignments = Vec::new();
        let mut values = Vec::new();
        let mut report = PropertyUpdate::default();
        for (property, value) in patch {
            match self.fields.column_for(property) {
                Some(column) => {
                    assignments.push(format!("{} = ${}", column, assignments.len() + 1));
                    values.push(value);
                    report.applied.push(property.clone());
                }
                None => report.unhandled.push(property.clone()),
            }
        }
        if assignments.is_empty() {
            return Ok(report);
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE uri = ${}",
            self.tables.principals_table,
            assignments.join(", "),
            assignments.len() + 1
        );
        let mut query = sqlx::query(&sql);
        for value in values {
            query = query.bind(value);
        }
        let result = query.bind(path).execute(&self.pool).await?;
        debug!(
            path = %path,
            applied = report.applied.len(),
            rows = result.rows_affected(),
            "Updated principal properties"
        );
        Ok(report)
    }

    async fn search(
        &self,
        prefix: &str,
        properties: &IndexMap<String, String>,
        mode: SearchMode,
    ) -> Result<Vec<String>> {
        if properties.is_empty() {
            return Ok(Vec::new());
        }

        let mut conditions = Vec::new();
        let mut params = Vec::new();
        for (property, value) in properties {
            let Some(column) = self.fields.column_for(property) else {
                // One unrecognized property fails the whole search.
                debug!(property = %property, "Search on unmapped property");
                return Ok(Vec::new());
            };
            conditions.push(format!("{} ILIKE ${}", column, conditions.len() + 2));
            params.push(format!("%{value}%"));
        }
        let separator = match mode {
            SearchMode::AllOf => " AND ",
            SearchMode::AnyOf => " OR ",
        };
        let sql = format!(
            "SELECT uri FROM {} WHERE uri LIKE $1 AND ({}) ORDER BY id ASC",
            self.tables.principals_table,
            conditions.join(separator)
        );

        let mut query = sqlx::query(&sql).bind(prefix_pattern(prefix));
        for param in &params {
            query = query.bind(param);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut uris = Vec::new();
        for row in rows {
            let uri: String = row.try_get("uri")?;
            if path::is_direct_child(&uri, prefix) {
                uris.push(uri);
            }
        }
        debug!(
            prefix = %prefix,
            criteria = properties.len(),
            matches = uris.len(),
            "Searched principals"
        );
        Ok(uris)
    }

    async fn find_by_uri(&self, uri: &str, prefix: &str) -> Result<Option<String>> {
        let Some((scheme, address)) = uri.split_once(':') else {
            return Ok(None);
        };
        match scheme {
            "mailto" => {
                let Some(column) = self.fields.column_for(PROP_EMAIL) else {
                    return Ok(None);
                };
                let sql = format!(
                    "SELECT uri FROM {} WHERE LOWER({}) = LOWER($1) ORDER BY id ASC",
                    self.tables.principals_table, column
                );
                let rows = sqlx::query(&sql).bind(address).fetch_all(&self.pool).await?;
                for row in rows {
                    let candidate: String = row.try_get("uri")?;
                    // Oldest matching row under the prefix wins.
                    if path::is_direct_child(&candidate, prefix) {
                        return Ok(Some(candidate));
                    }
                }
                Ok(None)
            }
            // The scheme registry currently holds a single entry.
            _ => Ok(None),
        }
    }

    async fn group_members(&self, path: &str) -> Result<Vec<String>> {
        let group_id = self
            .principal_id(path)
            .await?
            .ok_or_else(|| StoreError::principal_not_found(path))?;
        let sql = format!(
            "SELECT {1}.uri AS uri FROM {0} LEFT JOIN {1} ON {0}.member_id = {1}.id \
             WHERE {0}.principal_id = $1 ORDER BY {1}.id ASC",
            self.tables.group_members_table, self.tables.principals_table
        );
        let rows = sqlx::query(&sql).bind(group_id).fetch_all(&self.pool).await?;

        let mut members = Vec::new();
        for row in rows {
            // An edge pointing at a deleted principal joins to a NULL uri.
            if let Some(uri) = row.try_get::<Option<String>, _>("uri")? {
                members.push(uri);
            }
        }
        Ok(members)
    }

    async fn group_membership(&self, path: &str) -> Result<Vec<String>> {
        let member_id = self
            .principal_id(path)
            .await?
            .ok_or_else(|| StoreError::principal_not_found(path))?;
        let sql = format!(
            "SELECT {1}.uri AS uri FROM {0} LEFT JOIN {1} ON {0}.principal_id = {1}.id \
             WHERE {0}.member_id = $1 ORDER BY {1}.id ASC",
            self.tables.group_members_table, self.tables.principals_table
        );
        let rows = sqlx::query(&sql)
            .bind(member_id)
            .fetch_all(&self.pool)
            .await?;

        let mut groups = Vec::new();
        for row in rows {
            if let Some(uri) = row.try_get::<Option<String>, _>("uri")? {
                groups.push(uri);
            }
        }
        Ok(groups)
    }

    async fn set_group_members(&self, path: &str, members: &[String]) -> Result<()> {
        // Resolve the group and all members in one query.
        let mut lookup = Vec::with_capacity(members.len() + 1);
        lookup.push(path.to_string());
        lookup.extend(members.iter().cloned());
        let sql = format!(
            "SELECT id, uri FROM {} WHERE uri = ANY($1)",
            self.tables.principals_table
        );
        let rows = sqlx::query(&sql).bind(&lookup).fetch_all(&self.pool).await?;

        let mut group_id = None;
        let mut member_ids = Vec::new();
        for row in rows {
            let id: i64 = row.try_get("id")?;
            let uri: String = row.try_get("uri")?;
            if uri == path {
                group_id = Some(id);
            } else {
                member_ids.push(id);
            }
        }
        let group_id = group_id.ok_or_else(|| StoreError::principal_not_found(path))?;
        if member_ids.len() < members.len() {
            debug!(
                group = %path,
                requested = members.len(),
                resolved = member_ids.len(),
                "Dropping unresolved group members"
            );
        }

        // Delete and re-insert inside one transaction; a reader must never
        // observe the half-replaced set.
        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!(
            "DELETE FROM {} WHERE principal_id = $1",
            self.tables.group_members_table
        ))
        .bind(group_id)
        .execute(&mut *tx)
        .await?;
        let insert = format!(
            "INSERT INTO {} (principal_id, member_id) VALUES ($1, $2)",
            self.tables.group_members_table
        );
        for member_id in &member_ids {
            sqlx::query(&insert)
                .bind(group_id)
                .bind(member_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        debug!(group = %path, members = member_ids.len(), "Replaced group members");
        Ok(())
    }

    async fn create_principal(
        &self,
        path: &str,
        properties: &PropertyPatch,
    ) -> Result<PropertyUpdate> {
        sqlx::query(&format!(
            "INSERT INTO {} (uri) VALUES ($1)",
            self.tables.principals_table
        ))
        .bind(path)
        .execute(&self.pool)
        .await?;
        debug!(path = %path, "Created principal");
        self.update_properties(path, properties).await
    }

    async fn init_schema(&self) -> Result<()> {
        let mut property_columns = String::new();
        for column in self.fields.columns() {
            property_columns.push_str(&format!(", {column} TEXT"));
        }
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                uri TEXT NOT NULL UNIQUE{}
            )",
            self.tables.principals_table, property_columns
        ))
        .execute(&self.pool)
        .await?;

        // No foreign keys; a member edge may outlive its principal row.
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                principal_id BIGINT NOT NULL,
                member_id BIGINT NOT NULL,
                UNIQUE (principal_id, member_id)
            )",
            self.tables.group_members_table
        ))
        .execute(&self.pool)
        .await?;

        // Membership scans filter on member_id; the unique constraint
        // indexes principal_id first.
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_member ON {} (member_id)",
            self.tables.group_members_table.replace('.', "_"),
            self.tables.group_members_table
        ))
        .execute(&self.pool)
        .await?;

        info!(
            principals = %self.tables.principals_table,
            group_members = %self.tables.group_members_table,
            "Initialized PostgreSQL principal schema"
        );
        Ok(())
    }
}
