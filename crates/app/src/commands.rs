//! Shell command parsing.

use std::str::FromStr;

use thiserror::Error;
use vestibule_domain::FederatedProvider;

/// A line typed at the shell prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `signin <email> <password>`
    SignIn {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
    },
    /// `register <email> <username> <password>`
    Register {
        /// Account email.
        email: String,
        /// Chosen username.
        username: String,
        /// Account password.
        password: String,
    },
    /// `provider <name>`
    Federated(FederatedProvider),
    /// `signout`
    SignOut,
    /// `status`
    Status,
    /// `help`
    Help,
    /// `quit` / `exit`
    Quit,
}

/// Why a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// First word is not a command.
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    /// Wrong number of arguments.
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Help text listing every command.
pub const HELP: &str = "\
commands:
  signin <email> <password>              sign in with email and password
  register <email> <username> <password> create an account
  provider <google|github|microsoft|apple|id>
                                         sign in with a federated provider
  signout                                end the session
  status                                 show the session
  help                                   show this text
  quit                                   leave";

const SIGN_IN_USAGE: &str = "signin <email> <password>";
const REGISTER_USAGE: &str = "register <email> <username> <password>";
const PROVIDER_USAGE: &str = "provider <name>";

impl Command {
    /// Parses one input line. Blank lines yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `Unknown` or `Usage` for lines that are not commands.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match (name.to_ascii_lowercase().as_str(), args) {
            ("signin" | "login", [email, password]) => Self::SignIn {
                email: (*email).to_string(),
                password: (*password).to_string(),
            },
            ("signin" | "login", _) => return Err(CommandError::Usage(SIGN_IN_USAGE)),
            ("register" | "signup", [email, username, password]) => Self::Register {
                email: (*email).to_string(),
                username: (*username).to_string(),
                password: (*password).to_string(),
            },
            ("register" | "signup", _) => return Err(CommandError::Usage(REGISTER_USAGE)),
            ("provider", [provider]) => Self::Federated(
                FederatedProvider::from_str(provider)
                    .map_err(|_| CommandError::Usage(PROVIDER_USAGE))?,
            ),
            ("provider", _) => return Err(CommandError::Usage(PROVIDER_USAGE)),
            ("google", []) => Self::Federated(FederatedProvider::Google),
            ("signout" | "logout", []) => Self::SignOut,
            ("status", []) => Self::Status,
            ("help" | "?", _) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            _ => return Err(CommandError::Unknown(name.to_string())),
        };
        Ok(Some(command))
    }
}
