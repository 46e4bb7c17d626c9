//! SQL schema for the SQLite request store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for future migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- AUTOINCREMENT keeps ids from ever being reused.
-- Only `estado` is ever updated; rows are never deleted.
CREATE TABLE IF NOT EXISTS solicitud (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    cedula          TEXT NOT NULL CHECK (length(trim(cedula)) > 0),
    subvencion      TEXT NOT NULL CHECK (length(trim(subvencion)) > 0),
    tipo_bono       TEXT,
    estado          TEXT NOT NULL DEFAULT 'En revisión'
                    CHECK (estado IN ('En revisión', 'Aprobado', 'Rechazado')),
    fecha_registro  TEXT            -- RFC 3339 UTC; NULL on upgraded legacy rows
);

CREATE INDEX IF NOT EXISTS solicitud_cedula_idx ON solicitud(cedula);

PRAGMA user_version = 1;
";

/// Rebuilds a `solicitud` table written by the earlier web application
/// (`tipo_bono NOT NULL`, nullable `estado`, no `fecha_registro`) into the
/// current layout. Runs inside a transaction, before [`SCHEMA`].
///
/// SQLite cannot relax a `NOT NULL` with `ALTER TABLE`, hence the copy.
pub const UPGRADE_LEGACY: &str = "
CREATE TABLE solicitud_upgrade (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    cedula          TEXT NOT NULL CHECK (length(trim(cedula)) > 0),
    subvencion      TEXT NOT NULL CHECK (length(trim(subvencion)) > 0),
    tipo_bono       TEXT,
    estado          TEXT NOT NULL DEFAULT 'En revisión'
                    CHECK (estado IN ('En revisión', 'Aprobado', 'Rechazado')),
    fecha_registro  TEXT
);

INSERT INTO solicitud_upgrade (id, cedula, subvencion, tipo_bono, estado)
SELECT id, cedula, subvencion,
       NULLIF(trim(tipo_bono), ''),
       COALESCE(estado, 'En revisión')
FROM solicitud;

DROP TABLE solicitud;
ALTER TABLE solicitud_upgrade RENAME TO solicitud;
";

/// Column list shared by every `SELECT` so rows decode uniformly.
pub const COLUMNS: &str =
  "id, cedula, subvencion, tipo_bono, estado, fecha_registro";
