//! The session authority: login, token resolution, role checks and logout.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use scholaris_shared::types::{AuthEventId, SchoolId, SessionId, UserId};
use tracing::{info, warn};

use super::event::{MAX_EMAIL_LENGTH, MAX_IP_LENGTH, clip};
use super::password::verify_dummy;
use super::principal::normalize_email;
use super::{
    AuditLog, AuthEvent, AuthEventKind, AuthenticationError, AuthorizationError, ClientInfo,
    PrincipalDirectory, Role, Session, SessionPolicy, SessionStore, SessionToken, policy,
    verify_password,
};

/// Issues and checks sessions.
///
/// There is no ambient "current user": every check takes the session (or
/// the raw token) explicitly.
#[derive(Clone)]
pub struct SessionAuthority {
    principals: Arc<dyn PrincipalDirectory>,
    sessions: Arc<dyn SessionStore>,
    audit: Arc<dyn AuditLog>,
    policy: SessionPolicy,
}

impl SessionAuthority {
    /// Creates an authority over the given stores.
    pub fn new(
        principals: Arc<dyn PrincipalDirectory>,
        sessions: Arc<dyn SessionStore>,
        audit: Arc<dyn AuditLog>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            principals,
            sessions,
            audit,
            policy,
        }
    }

    /// Session lifetime rules in force.
    #[must_use]
    pub const fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Verifies credentials and opens a session.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<(SessionToken, Session), AuthenticationError> {
        self.authenticate_at(email, password, client, Utc::now()).await
    }

    /// `authenticate` with an explicit clock.
    pub async fn authenticate_at(
        &self,
        email: &str,
        password: &str,
        client: &ClientInfo,
        now: DateTime<Utc>,
    ) -> Result<(SessionToken, Session), AuthenticationError> {
        let email = normalize_email(email);

        // No principal can have an email this long.
        if email.chars().count() > MAX_EMAIL_LENGTH {
            verify_dummy(password);
            info!("Login attempt with oversized email");
            self.record(AuthEventKind::LoginFailed, &email, None, None, client, now)
                .await?;
            return Err(AuthenticationError::InvalidCredentials);
        }

        let Some(principal) = self.principals.find_by_email(&email).await? else {
            verify_dummy(password);
            info!(email = %email, "Login attempt for unknown email");
            self.record(AuthEventKind::LoginFailed, &email, None, None, client, now)
                .await?;
            return Err(AuthenticationError::InvalidCredentials);
        };

        if !verify_password(password, &principal.password_hash)? {
            info!(user_id = %principal.id, "Failed login attempt - invalid password");
            self.record(
                AuthEventKind::LoginFailed,
                &email,
                Some(principal.id),
                principal.school_id,
                client,
                now,
            )
            .await?;
            return Err(AuthenticationError::InvalidCredentials);
        }

        if principal.is_suspended() {
            info!(user_id = %principal.id, "Login attempt by suspended principal");
            self.record(
                AuthEventKind::LoginSuspended,
                &email,
                Some(principal.id),
                principal.school_id,
                client,
                now,
            )
            .await?;
            return Err(AuthenticationError::AccountSuspended);
        }

        let token = SessionToken::generate();
        let session = Session {
            id: SessionId::new(),
            token_hash: token.digest(),
            user_id: principal.id,
            role: principal.role,
            school_id: principal.school_id,
            created_at: now,
            last_seen_at: now,
            expires_at: self.policy.expiry_from(now),
        };

        // Audit first: a login that cannot be recorded does not happen.
        self.record(
            AuthEventKind::LoginSucceeded,
            &email,
            Some(principal.id),
            principal.school_id,
            client,
            now,
        )
        .await?;
        self.sessions.insert(&session).await?;

        info!(
            user_id = %session.user_id,
            role = %session.role,
            session_id = %session.id,
            "Session opened"
        );
        Ok((token, session))
    }

    /// Loads the live session for a token, sliding its idle window.
    ///
    /// A session whose principal or school has since been suspended is
    /// removed and treated as unknown.
    pub async fn resolve(&self, token: &SessionToken) -> Result<Session, AuthorizationError> {
        self.resolve_at(token, Utc::now()).await
    }

    /// `resolve` with an explicit clock.
    pub async fn resolve_at(
        &self,
        token: &SessionToken,
        now: DateTime<Utc>,
    ) -> Result<Session, AuthorizationError> {
        let token_hash = token.digest();
        let Some(mut session) = self.sessions.find_by_token_hash(&token_hash).await? else {
            return Err(AuthorizationError::Unauthenticated);
        };

        if self.policy.is_expired(&session, now) {
            self.sessions.delete_by_token_hash(&token_hash).await?;
            info!(session_id = %session.id, "Expired session removed");
            return Err(AuthorizationError::Unauthenticated);
        }

        let live = self
            .principals
            .find_by_id(session.user_id)
            .await?
            .is_some_and(|principal| !principal.is_suspended());
        if !live {
            self.sessions.delete_by_token_hash(&token_hash).await?;
            info!(
                session_id = %session.id,
                user_id = %session.user_id,
                "Session of suspended principal removed"
            );
            return Err(AuthorizationError::Unauthenticated);
        }

        self.sessions.touch(&token_hash, now).await?;
        session.last_seen_at = now;
        Ok(session)
    }

    /// Resolves the token and authorizes the resulting session.
    pub async fn check_access(
        &self,
        token: &SessionToken,
        required_role: Role,
        required_school: Option<SchoolId>,
    ) -> Result<Session, AuthorizationError> {
        let session = self.resolve(token).await?;
        policy::authorize(&session, required_role, required_school)?;
        Ok(session)
    }

    /// Ends the session for a token. Unknown tokens are a no-op.
    pub async fn terminate(
        &self,
        token: &SessionToken,
        client: &ClientInfo,
    ) -> Result<(), AuthorizationError> {
        let token_hash = token.digest();
        let Some(session) = self.sessions.find_by_token_hash(&token_hash).await? else {
            return Ok(());
        };
        if !self.sessions.delete_by_token_hash(&token_hash).await? {
            // Lost a race with another logout; that one audited it.
            return Ok(());
        }

        let email = match self.principals.find_by_id(session.user_id).await? {
            Some(principal) => principal.email,
            None => String::new(),
        };
        self.record(
            AuthEventKind::Logout,
            &email,
            Some(session.user_id),
            session.school_id,
            client,
            Utc::now(),
        )
        .await
        .map_err(|e| AuthorizationError::Backend(e.to_string()))?;

        info!(user_id = %session.user_id, session_id = %session.id, "Session terminated");
        Ok(())
    }

    /// Drops every session of a principal.
    pub async fn revoke_user_sessions(&self, user_id: UserId) -> Result<u64, AuthorizationError> {
        let removed = self.sessions.delete_for_user(user_id).await?;
        if removed > 0 {
            warn!(user_id = %user_id, removed, "Revoked sessions");
        }
        Ok(removed)
    }

    async fn record(
        &self,
        kind: AuthEventKind,
        email: &str,
        user_id: Option<UserId>,
        school_id: Option<SchoolId>,
        client: &ClientInfo,
        now: DateTime<Utc>,
    ) -> Result<(), AuthenticationError> {
        let event = AuthEvent {
            id: AuthEventId::new(),
            user_id,
            email: clip(email, MAX_EMAIL_LENGTH),
            school_id,
            kind,
            ip_address: client.ip_address.as_deref().map(|ip| clip(ip, MAX_IP_LENGTH)),
            user_agent: client.user_agent.clone(),
            occurred_at: now,
        };
        self.audit.append(&event).await.map_err(Into::into)
    }
}
