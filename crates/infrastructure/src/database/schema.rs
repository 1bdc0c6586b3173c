// Tables backing the SQLite document store
diesel::table! {
    collections (name) {
        name -> Text,
        validator -> Nullable<Text>,   // JSON schema, if any
        created_at -> Timestamp,
    }
}

diesel::table! {
    collection_indexes (collection, name) {
        collection -> Text,
        name -> Text,
        keys -> Text,                  // JSON array of [field, order] pairs
        is_unique -> Bool,
    }
}

diesel::table! {
    documents (seq) {
        seq -> BigInt,                 // Insertion order
        collection -> Text,
        doc_id -> Text,
        body -> Text,                  // JSON object including _id
    }
}

diesel::allow_tables_to_appear_in_same_query!(collections, collection_indexes, documents,);

pub(crate) const CREATE_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS collections (
        name TEXT PRIMARY KEY NOT NULL,
        validator TEXT,
        created_at TIMESTAMP NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS collection_indexes (
        collection TEXT NOT NULL,
        name TEXT NOT NULL,
        keys TEXT NOT NULL,
        is_unique BOOLEAN NOT NULL DEFAULT 0,
        PRIMARY KEY (collection, name)
    )",
    "CREATE TABLE IF NOT EXISTS documents (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        collection TEXT NOT NULL,
        doc_id TEXT NOT NULL,
        body TEXT NOT NULL,
        UNIQUE (collection, doc_id)
    )",
];
