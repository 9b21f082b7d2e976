//! SQL schema for the school directory store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Soft-deleted rows keep their unique keys.
CREATE TABLE IF NOT EXISTS schools (
    school_id         TEXT PRIMARY KEY,
    school_no         TEXT NOT NULL UNIQUE,
    school_census_no  TEXT UNIQUE,
    school_name_en    TEXT NOT NULL,
    school_name_ta    TEXT,
    school_name_si    TEXT,
    school_type       TEXT NOT NULL
                      CHECK (school_type IN ('1AB', '1C', 'type2', 'type3')),
    school_category   TEXT NOT NULL
                      CHECK (school_category IN
                        ('national', 'province', 'private', 'semigovernment')),
    division          TEXT,
    zone              TEXT,
    district          TEXT,
    province          TEXT,
    address           TEXT,
    phone             TEXT,
    email             TEXT,
    website           TEXT,
    established_year  INTEGER,
    geo_lat           REAL,
    geo_lng           REAL,
    school_map_url    TEXT,
    created_by        TEXT,
    updated_by        TEXT,
    deleted_by        TEXT,
    created_at        TEXT NOT NULL,   -- RFC 3339 UTC, fixed width
    updated_at        TEXT NOT NULL,
    deleted_at        TEXT             -- soft-delete marker
);

CREATE INDEX IF NOT EXISTS schools_deleted_idx  ON schools(deleted_at);
CREATE INDEX IF NOT EXISTS schools_province_idx ON schools(province);
CREATE INDEX IF NOT EXISTS schools_name_idx     ON schools(school_name_en);

PRAGMA user_version = 1;
";
