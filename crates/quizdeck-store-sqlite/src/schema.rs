//! SQL schema for the quizdeck SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated
//! on `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS guests (
    guest_id          TEXT PRIMARY KEY,
    created_at        TEXT NOT NULL,
    converted_user_id TEXT REFERENCES users(user_id)
);

-- The unifying identity. Exactly one backing id is set, consistent with
-- the discriminant.
CREATE TABLE IF NOT EXISTS players (
    player_id    TEXT PRIMARY KEY,
    kind         TEXT NOT NULL,   -- 'user' | 'guest'
    user_id      TEXT REFERENCES users(user_id),
    guest_id     TEXT REFERENCES guests(guest_id),
    display_name TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    CHECK ((kind = 'user'  AND user_id IS NOT NULL AND guest_id IS NULL)
        OR (kind = 'guest' AND guest_id IS NOT NULL AND user_id IS NULL))
);

-- Bearer tokens at rest; only the SHA-256 hex digest is stored.
CREATE TABLE IF NOT EXISTS auth_tokens (
    token_hash TEXT PRIMARY KEY,
    player_id  TEXT NOT NULL REFERENCES players(player_id),
    issued_at  TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

-- The topic is the natural dedup key: one board per topic, ever.
CREATE TABLE IF NOT EXISTS quiz_boards (
    board_id   TEXT PRIMARY KEY,
    title      TEXT NOT NULL,
    topic      TEXT NOT NULL UNIQUE,
    created_by TEXT NOT NULL REFERENCES players(player_id),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    category_id TEXT PRIMARY KEY,
    board_id    TEXT NOT NULL REFERENCES quiz_boards(board_id),
    name        TEXT NOT NULL,
    position    INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS questions (
    question_id   TEXT PRIMARY KEY,
    category_id   TEXT NOT NULL REFERENCES categories(category_id),
    question_text TEXT NOT NULL,
    answer_text   TEXT NOT NULL,
    points        INTEGER NOT NULL CHECK (points > 0),
    position      INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS game_sessions (
    session_id   TEXT PRIMARY KEY,
    board_id     TEXT NOT NULL REFERENCES quiz_boards(board_id),
    player_id    TEXT NOT NULL REFERENCES players(player_id),
    score        INTEGER NOT NULL DEFAULT 0,
    status       TEXT NOT NULL DEFAULT 'in_progress',
    started_at   TEXT NOT NULL,
    completed_at TEXT
);

-- Attempts are strictly append-only: no UPDATE or DELETE is ever issued
-- against this table. The UNIQUE pair constraint is load-bearing for the
-- at-most-one-attempt invariant; concurrent duplicate inserts fail fast
-- here rather than relying on the application-level existence check.
CREATE TABLE IF NOT EXISTS question_attempts (
    attempt_id       TEXT PRIMARY KEY,
    session_id       TEXT NOT NULL REFERENCES game_sessions(session_id),
    question_id      TEXT NOT NULL REFERENCES questions(question_id),
    submitted_answer TEXT NOT NULL,
    outcome          TEXT NOT NULL,   -- 'correct' | 'incorrect'
    points_earned    INTEGER NOT NULL,
    attempted_at     TEXT NOT NULL,
    UNIQUE (session_id, question_id)
);

CREATE INDEX IF NOT EXISTS players_user_idx      ON players(user_id);
CREATE INDEX IF NOT EXISTS tokens_expiry_idx     ON auth_tokens(expires_at);
CREATE INDEX IF NOT EXISTS categories_board_idx  ON categories(board_id);
CREATE INDEX IF NOT EXISTS questions_cat_idx     ON questions(category_id);
CREATE INDEX IF NOT EXISTS sessions_player_idx   ON game_sessions(player_id, board_id);
CREATE INDEX IF NOT EXISTS attempts_session_idx  ON question_attempts(session_id);

PRAGMA user_version = 1;
";
