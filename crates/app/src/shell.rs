//! The interactive dashboard shell.
//!
//! Reads commands line by line, drives the auth context, and renders the
//! session. Session transitions are printed by [`watch_session`] as they
//! happen; command replies only say whether the provider accepted a request.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::debug;
use vestibule_application::AuthContext;
use vestibule_domain::{AuthErrorKind, AuthMethod, SessionState, SessionStatus};

use crate::commands::{Command, HELP};

/// Renders the dashboard line for a session snapshot.
#[must_use]
pub fn render_state(state: &SessionState, method: AuthMethod) -> String {
    match (state.status(), state.principal()) {
        (SessionStatus::Uninitialized, _) => "Determining session...".to_string(),
        (SessionStatus::Authenticated, Some(principal)) => {
            let email = match principal.email.as_deref() {
                Some(email) if principal.name.as_deref() != Some(email) => format!(" <{email}>"),
                _ => String::new(),
            };
            format!("Signed in as {} via {method}{email}", principal.label())
        }
        _ => "Signed out".to_string(),
    }
}

/// Prints the current session, then every transition until the provider
/// stops.
pub async fn watch_session<W>(
    mut observer: watch::Receiver<SessionState>,
    method: AuthMethod,
    mut out: W,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        let line = render_state(&observer.borrow_and_update(), method);
        out.write_all(format!("* {line}\n").as_bytes()).await?;
        out.flush().await?;
        if observer.changed().await.is_err() {
            break;
        }
    }
    debug!("session watcher finished");
    Ok(())
}

/// Command loop bound to one auth context.
#[derive(Debug)]
pub struct Shell {
    context: AuthContext,
}

impl Shell {
    /// Creates a shell for `context`.
    #[must_use]
    pub const fn new(context: AuthContext) -> Self {
        Self { context }
    }

    /// Runs commands from `input` until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from reading or writing.
    pub async fn run<R, W>(&self, input: R, mut out: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        loop {
            out.write_all(b"> ").await?;
            out.flush().await?;
            let Some(line) = lines.next_line().await? else {
                break;
            };

            let reply = match Command::parse(&line) {
                Ok(None) => continue,
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => self.execute(command).await,
                Err(e) => e.to_string(),
            };
            out.write_all(reply.as_bytes()).await?;
            out.write_all(b"\n").await?;
        }
        out.flush().await
    }

    /// Executes one command and returns the reply to print.
    pub async fn execute(&self, command: Command) -> String {
        let actions = self.context.actions();
        match command {
            Command::SignIn { email, password } => {
                match actions.sign_in_with_email(&email, &password).await {
                    Ok(principal) => format!("Credentials accepted for {}", principal.label()),
                    Err(e) => format!("Sign-in failed: {e}"),
                }
            }
            Command::Register {
                email,
                username,
                password,
            } => match actions.register(&email, &username, &password).await {
                Ok(principal) => format!("Account created for {}", principal.label()),
                Err(e) => format!("Registration failed: {e}"),
            },
            Command::Federated(provider) => match actions.sign_in_with_provider(&provider).await {
                Ok(principal) => format!("{provider} accepted {}", principal.label()),
                Err(e) if e.kind() == AuthErrorKind::Cancelled => {
                    format!("{provider} sign-in cancelled")
                }
                Err(e) => format!("{provider} sign-in failed: {e}"),
            },
            Command::SignOut => match actions.sign_out().await {
                Ok(()) => "Sign-out requested".to_string(),
                Err(e) => format!("Sign-out failed: {e}"),
            },
            Command::Status => render_state(&self.context.state(), self.context.method()),
            Command::Help => HELP.to_string(),
            Command::Quit => String::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use vestibule_application::SessionProvider;
    use vestibule_domain::{Principal, RawUser, SessionAction};
    use vestibule_infrastructure::InMemoryIdentityProvider;

    fn mounted() -> SessionProvider {
        let identity = InMemoryIdentityProvider::new().with_account(
            "demo@vestibule.dev",
            "demo-pass",
            Some("Demo User"),
        );
        SessionProvider::mount(Arc::new(identity))
    }

    #[test]
    fn test_render_states() {
        let initial = SessionState::initial();
        assert_eq!(
            render_state(&initial, AuthMethod::Local),
            "Determining session..."
        );

        let signed_out = initial.reduce(SessionAction::auth_changed(None));
        assert_eq!(render_state(&signed_out, AuthMethod::Local), "Signed out");

        let user = RawUser {
            display_name: Some("Carl".to_string()),
            ..RawUser::new("u2", Some("c@d.com".to_string()))
        };
        let signed_in = signed_out.reduce(SessionAction::auth_changed(Some(user)));
        assert_eq!(
            render_state(&signed_in, AuthMethod::Firebase),
            "Signed in as Carl via FIREBASE <c@d.com>"
        );
    }

    #[tokio::test]
    async fn test_session_flow_through_commands() {
        let provider = mounted();
        let context = provider.context();
        context.initialized().await.unwrap();
        let shell = Shell::new(context.clone());
        let mut observer = context.subscribe();

        let reply = shell
            .execute(Command::SignIn {
                email: "demo@vestibule.dev".to_string(),
                password: "wrong".to_string(),
            })
            .await;
        assert!(reply.starts_with("Sign-in failed"), "{reply}");

        let reply = shell
            .execute(Command::SignIn {
                email: "demo@vestibule.dev".to_string(),
                password: "demo-pass".to_string(),
            })
            .await;
        assert_eq!(reply, "Credentials accepted for Demo User");

        observer.changed().await.unwrap();
        assert_eq!(
            context.principal().map(|p: Principal| p.name),
            Some(Some("Demo User".to_string()))
        );

        shell.execute(Command::SignOut).await;
        observer.changed().await.unwrap();
        assert_eq!(shell.execute(Command::Status).await, "Signed out");

        provider.unmount().await.unwrap();
    }

    #[tokio::test]
    async fn test_run_reads_until_quit() {
        let provider = mounted();
        let context = provider.context();
        context.initialized().await.unwrap();

        let input: &[u8] = b"status\n\nbogus\nquit\nstatus\n";
        let mut output = Vec::new();
        Shell::new(context).run(input, &mut output).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(
            output,
            "> Signed out\n> > unknown command `bogus`, try `help`\n> "
        );
        provider.unmount().await.unwrap();
    }

    #[tokio::test]
    async fn test_watcher_prints_transitions_and_stops_on_unmount() {
        let provider = mounted();
        let context = provider.context();
        let mut output = Vec::new();

        let watcher = watch_session(context.subscribe(), AuthMethod::Local, &mut output);
        let drive = async {
            context.initialized().await.unwrap();
            provider.unmount().await.unwrap();
        };
        let (written, ()) = tokio::join!(watcher, drive);
        written.unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "* Determining session...\n* Signed out\n"
        );
    }

    #[tokio::test]
    async fn test_watcher_started_after_determination_prints_it() {
        let provider = mounted();
        let context = provider.context();
        let observer = context.subscribe();
        context.initialized().await.unwrap();

        let mut output = Vec::new();
        let watcher = watch_session(observer, AuthMethod::Local, &mut output);
        let drive = async {
            tokio::task::yield_now().await;
            provider.unmount().await.unwrap();
        };
        let (written, ()) = tokio::join!(watcher, drive);
        written.unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "* Signed out\n");
    }
}
