//! Server-side sessions and the authentication audit trail.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(SESSIONS_SQL).await?;
        db.execute_unprepared(AUTH_EVENTS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS auth_events CASCADE;")
            .await?;
        db.execute_unprepared("DROP TYPE IF EXISTS auth_event_kind;")
            .await?;
        db.execute_unprepared("DROP TABLE IF EXISTS sessions CASCADE;")
            .await?;
        Ok(())
    }
}

const SESSIONS_SQL: &str = r"
-- Only the SHA-256 digest of the bearer token is stored
CREATE TABLE sessions (
    id UUID PRIMARY KEY,
    token_hash VARCHAR(64) NOT NULL,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    role user_role NOT NULL,
    school_id UUID REFERENCES schools(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    last_seen_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    expires_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT uq_sessions_token_hash UNIQUE (token_hash),
    CONSTRAINT chk_expires_future CHECK (expires_at > created_at)
);

CREATE INDEX idx_sessions_user ON sessions(user_id);
CREATE INDEX idx_sessions_expires ON sessions(expires_at);
";

const AUTH_EVENTS_SQL: &str = r"
CREATE TYPE auth_event_kind AS ENUM ('login_succeeded', 'login_failed', 'login_suspended', 'logout');

-- No foreign keys: failed logins reference emails that may not exist
CREATE TABLE auth_events (
    id UUID PRIMARY KEY,
    user_id UUID,
    email VARCHAR(255) NOT NULL,
    school_id UUID,
    kind auth_event_kind NOT NULL,
    ip_address VARCHAR(45),
    user_agent TEXT,
    occurred_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_auth_events_user ON auth_events(user_id, occurred_at DESC);
CREATE INDEX idx_auth_events_email ON auth_events(email, occurred_at DESC);
";
