//! Sign-in command handlers

use anyhow::{Context, Result};

use anitrack_core::IdentityProvider;

use crate::output::Output;
use crate::session::Session;

/// Sign in and load the watchlist
pub async fn login(session: &Session, output: &Output) -> Result<()> {
    let controller = &session.controller;

    controller.begin_sign_in();
    let identity = match session.identity.sign_in().await {
        Ok(identity) => identity,
        Err(e) => {
            controller.sign_in_failed(&e);
            return Err(e).context("Sign-in failed");
        }
    };

    let name = identity.display_name.clone();
    controller
        .on_identity_changed(Some(identity))
        .await
        .context("Signed in, but failed to load watchlist")?;

    let count = controller.entries().len();
    output.success(&format!("Signed in as {} ({} on watchlist)", name, count));
    Ok(())
}

/// Sign out
pub async fn logout(session: &Session, output: &Output) -> Result<()> {
    let Some(identity) = session.identity.current() else {
        output.message("Not signed in.");
        return Ok(());
    };

    let controller = &session.controller;
    controller.begin_sign_out();
    if let Err(e) = session.identity.sign_out().await {
        controller.sign_out_failed(&e);
        return Err(e).context("Sign-out failed");
    }
    controller.on_identity_changed(None).await?;

    output.success(&format!("Signed out {}", identity.display_name));
    Ok(())
}

/// Show who is signed in
pub fn whoami(session: &Session, output: &Output) -> Result<()> {
    output.print_identity(session.identity.current().as_ref());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use anitrack_core::Config;
    use tempfile::TempDir;

    fn session(temp_dir: &TempDir, user: Option<&str>) -> Session {
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };
        Session::open(config, user.map(str::to_string), true).unwrap()
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let temp_dir = TempDir::new().unwrap();
        let session = session(&temp_dir, Some("U1"));
        let output = Output::new(OutputFormat::Quiet);

        login(&session, &output).await.unwrap();
        assert_eq!(
            session.controller.identity().map(|i| i.user_id),
            Some("U1".to_string())
        );

        logout(&session, &output).await.unwrap();
        assert!(session.identity.current().is_none());
        assert!(session.controller.identity().is_none());
    }

    #[tokio::test]
    async fn test_logout_when_signed_out() {
        let temp_dir = TempDir::new().unwrap();
        let session = session(&temp_dir, Some("U1"));

        logout(&session, &Output::new(OutputFormat::Quiet))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_login_failure_settles_session() {
        let temp_dir = TempDir::new().unwrap();
        let session = session(&temp_dir, Some("bad/name"));

        let result = login(&session, &Output::new(OutputFormat::Quiet)).await;

        assert!(result.is_err());
        assert_eq!(
            session.controller.snapshot().session,
            anitrack_core::SessionState::LoggedOut
        );
    }
}
