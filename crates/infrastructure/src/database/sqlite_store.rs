use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use serde_json::Value;

use super::document::{apply_find, CollectionOptions, Document, Filter, FindOptions, IndexModel, ID_FIELD};
use super::schema::{collection_indexes, collections, documents};
use super::store::{CollectionMeta, DocumentStore, KeyLookup};
use super::SqlitePool;
use crate::errors::StoreError;

// Database models
#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = collections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct CollectionModel {
    #[allow(dead_code)]
    name: String,
    validator: Option<String>,
    #[allow(dead_code)]
    created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = collections)]
struct NewCollectionModel {
    name: String,
    validator: Option<String>,
    created_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Insertable, Debug)]
#[diesel(table_name = collection_indexes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct IndexModelRow {
    collection: String,
    name: String,
    keys: String,
    is_unique: bool,
}

#[derive(QueryableByName)]
struct DocumentBody {
    #[diesel(sql_type = Text)]
    body: String,
}

#[derive(Insertable)]
#[diesel(table_name = documents)]
struct NewDocumentModel {
    collection: String,
    doc_id: String,
    body: String,
}

impl TryFrom<IndexModelRow> for IndexModel {
    type Error = StoreError;

    fn try_from(row: IndexModelRow) -> Result<Self, Self::Error> {
        Ok(IndexModel {
            name: row.name,
            keys: serde_json::from_str(&row.keys)?,
            unique: row.is_unique,
        })
    }
}

/// Document store persisted in SQLite through diesel. Bodies are stored as
/// JSON text. Equality filters and key lookups run in SQL on `json_extract`;
/// sorting happens in memory over the matched rows.
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Runs `work` in one transaction on the blocking thread pool.
    async fn transact<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, StoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut pooled = pool.get()?;
            let conn: &mut SqliteConnection = &mut pooled;
            conn.transaction(work)
        })
        .await?
    }
}

fn load_meta(conn: &mut SqliteConnection, collection: &str) -> Result<Option<CollectionMeta>, StoreError> {
    let row = collections::table
        .filter(collections::name.eq(collection))
        .select(CollectionModel::as_select())
        .first::<CollectionModel>(conn)
        .optional()?;

    let row = match row {
        Some(row) => row,
        None => return Ok(None),
    };

    let validator = match row.validator {
        Some(text) => Some(serde_json::from_str::<Value>(&text)?),
        None => None,
    };

    let indexes = collection_indexes::table
        .filter(collection_indexes::collection.eq(collection))
        .order(collection_indexes::name.asc())
        .select(IndexModelRow::as_select())
        .load::<IndexModelRow>(conn)?
        .into_iter()
        .map(IndexModel::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(CollectionMeta { validator, indexes }))
}

fn insert_collection(
    conn: &mut SqliteConnection,
    collection: &str,
    validator: Option<&Value>,
) -> Result<(), StoreError> {
    let new_collection = NewCollectionModel {
        name: collection.to_string(),
        validator: validator.map(Value::to_string),
        created_at: chrono::Utc::now().naive_utc(),
    };
    diesel::insert_into(collections::table)
        .values(&new_collection)
        .execute(conn)?;
    Ok(())
}

/// Loads the collection settings, creating an unvalidated collection when missing.
fn ensure_collection(conn: &mut SqliteConnection, collection: &str) -> Result<CollectionMeta, StoreError> {
    if let Some(meta) = load_meta(conn, collection)? {
        return Ok(meta);
    }
    insert_collection(conn, collection, None)?;
    Ok(CollectionMeta::default())
}

fn parse_bodies<I>(bodies: I) -> Result<Vec<Document>, StoreError>
where
    I: IntoIterator<Item = String>,
{
    bodies
        .into_iter()
        .map(|body| serde_json::from_str::<Document>(&body).map_err(StoreError::from))
        .collect()
}

fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field)
}

/// Loads the documents of `collection` whose fields equal `conditions`, in
/// insertion order. With `array_members` a condition on an array field also
/// matches when the array holds the value.
///
/// SQL equality is looser than JSON equality (`true` equals `1`), so callers
/// re-check every row they get back.
fn load_matching(
    conn: &mut SqliteConnection,
    collection: &str,
    conditions: &[(String, Value)],
    array_members: bool,
) -> Result<Vec<Document>, StoreError> {
    let mut sql = String::from("SELECT body FROM documents WHERE collection = ?");
    for (_, expected) in conditions {
        if array_members && !expected.is_array() {
            sql.push_str(
                " AND (json_extract(body, ?) IS json_extract(?, '$') \
                 OR EXISTS (SELECT 1 FROM json_each(body, ?) WHERE json_each.value IS json_extract(?, '$')))",
            );
        } else {
            sql.push_str(" AND json_extract(body, ?) IS json_extract(?, '$')");
        }
    }
    sql.push_str(" ORDER BY seq");

    let mut query = diesel::sql_query(sql)
        .into_boxed::<Sqlite>()
        .bind::<Text, _>(collection.to_string());
    for (field, expected) in conditions {
        let path = json_path(field);
        let value = expected.to_string();
        if array_members && !expected.is_array() {
            query = query
                .bind::<Text, _>(path.clone())
                .bind::<Text, _>(value.clone());
        }
        query = query.bind::<Text, _>(path).bind::<Text, _>(value);
    }

    let rows = query.load::<DocumentBody>(conn)?;
    parse_bodies(rows.into_iter().map(|row| row.body))
}

/// Loads the documents that share their `index` key with another document.
fn load_key_collisions(
    conn: &mut SqliteConnection,
    collection: &str,
    index: &IndexModel,
) -> Result<Vec<Document>, StoreError> {
    let mut sql = String::from(
        "SELECT d.body AS body FROM documents d WHERE d.collection = ? AND EXISTS \
         (SELECT 1 FROM documents o WHERE o.collection = d.collection AND o.seq <> d.seq",
    );
    for _ in &index.keys {
        sql.push_str(" AND json_extract(o.body, ?) IS json_extract(d.body, ?)");
    }
    sql.push_str(") ORDER BY d.seq");

    let mut query = diesel::sql_query(sql)
        .into_boxed::<Sqlite>()
        .bind::<Text, _>(collection.to_string());
    for (field, _) in &index.keys {
        let path = json_path(field);
        query = query.bind::<Text, _>(path.clone()).bind::<Text, _>(path);
    }

    let rows = query.load::<DocumentBody>(conn)?;
    parse_bodies(rows.into_iter().map(|row| row.body))
}

fn id_exists(conn: &mut SqliteConnection, collection: &str, id: &str) -> Result<bool, StoreError> {
    let count = documents::table
        .filter(documents::collection.eq(collection))
        .filter(documents::doc_id.eq(id))
        .count()
        .get_result::<i64>(conn)?;
    Ok(count > 0)
}

/// Key lookups answered by SQL inside the current transaction.
struct SqlKeyLookup<'a> {
    conn: &'a mut SqliteConnection,
    collection: &'a str,
}

impl KeyLookup for SqlKeyLookup<'_> {
    fn matching(&mut self, key: &[(String, Value)]) -> Result<Vec<Document>, StoreError> {
        // `_id` lookups use the indexed doc_id column
        if let [(field, Value::String(id))] = key {
            if field == ID_FIELD {
                let bodies = documents::table
                    .filter(documents::collection.eq(self.collection))
                    .filter(documents::doc_id.eq(id))
                    .select(documents::body)
                    .load::<String>(&mut *self.conn)?;
                return parse_bodies(bodies);
            }
        }
        load_matching(&mut *self.conn, self.collection, key, false)
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn list_collection_names(&self) -> Result<Vec<String>, StoreError> {
        self.transact(|conn| {
            let names = collections::table
                .order(collections::name.asc())
                .select(collections::name)
                .load::<String>(conn)?;
            Ok(names)
        })
        .await
    }

    async fn create_collection(&self, name: &str, options: CollectionOptions) -> Result<(), StoreError> {
        let name = name.to_string();
        self.transact(move |conn| {
            if load_meta(conn, &name)?.is_some() {
                return Err(StoreError::CollectionExists(name));
            }
            insert_collection(conn, &name, options.validator.as_ref())
        })
        .await
    }

    async fn drop_collection(&self, name: &str) -> Result<(), StoreError> {
        let name = name.to_string();
        self.transact(move |conn| {
            diesel::delete(documents::table.filter(documents::collection.eq(&name))).execute(conn)?;
            diesel::delete(collection_indexes::table.filter(collection_indexes::collection.eq(&name)))
                .execute(conn)?;
            diesel::delete(collections::table.filter(collections::name.eq(&name))).execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn create_index(&self, collection: &str, index: IndexModel) -> Result<(), StoreError> {
        let collection = collection.to_string();
        self.transact(move |conn| {
            let mut meta = ensure_collection(conn, &collection)?;
            let existing = if index.unique {
                load_key_collisions(conn, &collection, &index)?
            } else {
                Vec::new()
            };

            let row = IndexModelRow {
                collection: collection.clone(),
                name: index.name.clone(),
                keys: serde_json::to_string(&index.keys)?,
                is_unique: index.unique,
            };

            if meta.add_index(&collection, index, &existing)? {
                diesel::insert_into(collection_indexes::table)
                    .values(&row)
                    .execute(conn)?;
            }
            Ok(())
        })
        .await
    }

    async fn drop_index(&self, collection: &str, name: &str) -> Result<(), StoreError> {
        let collection = collection.to_string();
        let name = name.to_string();
        self.transact(move |conn| {
            if load_meta(conn, &collection)?.is_none() {
                return Err(StoreError::CollectionNotFound(collection));
            }
            diesel::delete(
                collection_indexes::table
                    .filter(collection_indexes::collection.eq(&collection))
                    .filter(collection_indexes::name.eq(&name)),
            )
            .execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn list_indexes(&self, collection: &str) -> Result<Vec<IndexModel>, StoreError> {
        let collection = collection.to_string();
        self.transact(move |conn| {
            Ok(load_meta(conn, &collection)?
                .map(|meta| meta.indexes)
                .unwrap_or_default())
        })
        .await
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        let collection = collection.to_string();
        self.transact(move |conn| {
            let meta = ensure_collection(conn, &collection)?;
            let mut lookup = SqlKeyLookup {
                conn: &mut *conn,
                collection: &collection,
            };
            let (id, document) = meta.prepare_insert(&collection, document, &mut lookup)?;

            let new_document = NewDocumentModel {
                collection: collection.clone(),
                doc_id: id.clone(),
                body: serde_json::to_string(&document)?,
            };
            diesel::insert_into(documents::table)
                .values(&new_document)
                .execute(conn)?;

            Ok(id)
        })
        .await
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let collection = collection.to_string();
        let conditions = filter.conditions().to_vec();
        let documents = self
            .transact(move |conn| load_matching(conn, &collection, &conditions, true))
            .await?;
        Ok(apply_find(documents, filter, options))
    }

    async fn replace_one(&self, collection: &str, id: &str, document: Document) -> Result<bool, StoreError> {
        let collection = collection.to_string();
        let id = id.to_string();
        self.transact(move |conn| {
            let meta = match load_meta(conn, &collection)? {
                Some(meta) => meta,
                None => return Ok(false),
            };

            if !id_exists(conn, &collection, &id)? {
                return Ok(false);
            }

            let mut lookup = SqlKeyLookup {
                conn: &mut *conn,
                collection: &collection,
            };
            let document = meta.prepare_replace(&collection, &id, document, &mut lookup)?;
            diesel::update(
                documents::table
                    .filter(documents::collection.eq(&collection))
                    .filter(documents::doc_id.eq(&id)),
            )
            .set(documents::body.eq(serde_json::to_string(&document)?))
            .execute(conn)?;

            Ok(true)
        })
        .await
    }

    async fn delete_one(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let collection = collection.to_string();
        let id = id.to_string();
        self.transact(move |conn| {
            let deleted = diesel::delete(
                documents::table
                    .filter(documents::collection.eq(&collection))
                    .filter(documents::doc_id.eq(&id)),
            )
            .execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }
}
