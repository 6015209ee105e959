//! Interactive session over a line-oriented input.
//!
//! DESIGN
//! ======
//! The shell plays the part of a browser tab: it holds one
//! [`SessionController`], routes every command through the route guard, and
//! drives the same page models a UI would. Output goes to any
//! `std::io::Write`, so tests capture it in a `Vec<u8>`.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::customer::{Customer, CustomerDraft};
use crate::pages::{CustomerFormPage, CustomerListPage, FormMode, LoginPage, Navigation};
use crate::routes::{self, RouteDecision};
use crate::session::SessionController;

const PROMPT: &str = "> ";
const SIGN_IN_HINT: &str = "Not signed in. Use: login <username> <password>";

const HELP: &str = "\
commands:
  login <username> <password>   sign in
  logout                        sign out
  whoami                        show the signed-in user
  list                          list customers
  get <id>                      show one customer
  add field=value ...           create a customer
  edit <id> field=value ...     replace a customer's fields
  delete <id>                   delete a customer
  help                          show this text
  quit                          leave the shell
fields: first_name last_name email phone address";

// =============================================================================
// PARSING
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command `{0}`; try `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid customer id `{0}`")]
    InvalidId(String),
    #[error("invalid field `{0}`; expected name=value with one of first_name, last_name, email, phone, address")]
    InvalidField(String),
    #[error("unterminated quote")]
    UnterminatedQuote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Login { username: String, password: String },
    Logout,
    Whoami,
    List,
    Get(i64),
    Add(Vec<(String, String)>),
    Edit(i64, Vec<(String, String)>),
    Delete(i64),
    Quit,
}

impl ShellCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing what was wrong with the line.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let words = split_words(line)?;
        let Some((name, args)) = words.split_first() else {
            return Ok(None);
        };
        let command = match (name.as_str(), args) {
            ("help" | "?", []) => Self::Help,
            ("login", [username, password]) => Self::Login {
                username: username.clone(),
                password: password.clone(),
            },
            ("login", _) => return Err(ParseError::Usage("login <username> <password>")),
            ("logout", []) => Self::Logout,
            ("whoami", []) => Self::Whoami,
            ("list" | "ls", []) => Self::List,
            ("get", [id]) => Self::Get(parse_id(id)?),
            ("get", _) => return Err(ParseError::Usage("get <id>")),
            ("add", fields) => Self::Add(parse_fields(fields)?),
            ("edit", [id, fields @ ..]) => Self::Edit(parse_id(id)?, parse_fields(fields)?),
            ("edit", []) => return Err(ParseError::Usage("edit <id> field=value ...")),
            ("delete" | "rm", [id]) => Self::Delete(parse_id(id)?),
            ("delete" | "rm", _) => return Err(ParseError::Usage("delete <id>")),
            ("quit" | "exit", []) => Self::Quit,
            (other, _) => return Err(ParseError::Unknown(other.to_owned())),
        };
        Ok(Some(command))
    }
}

/// Split on whitespace, honoring single and double quotes.
fn split_words(line: &str) -> Result<Vec<String>, ParseError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_word = true;
            }
            None if ch.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(ch);
                in_word = true;
            }
        }
    }
    if quote.is_some() {
        return Err(ParseError::UnterminatedQuote);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn parse_id(raw: &str) -> Result<i64, ParseError> {
    raw.parse().map_err(|_| ParseError::InvalidId(raw.to_owned()))
}

/// Accepts `name=value` and `--name=value`; dashes in names map to underscores.
fn parse_fields(args: &[String]) -> Result<Vec<(String, String)>, ParseError> {
    args.iter()
        .map(|arg| {
            let (name, value) = arg
                .trim_start_matches("--")
                .split_once('=')
                .ok_or_else(|| ParseError::InvalidField(arg.clone()))?;
            let name = name.replace('-', "_");
            if !CustomerDraft::default().set_field(&name, "") {
                return Err(ParseError::InvalidField(arg.clone()));
            }
            Ok((name, value.to_owned()))
        })
        .collect()
}

// =============================================================================
// RUNNING
// =============================================================================

/// Read commands from `input` until EOF or `quit`, writing results to `out`.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails; command
/// failures are reported on `out`.
pub async fn run_shell<R, W>(session: &SessionController, input: R, out: &mut W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    match routes::navbar_label(&session.session()) {
        Some(label) => writeln!(out, "{label}")?,
        None => writeln!(out, "Not signed in.")?,
    }

    let mut lines = input.lines();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            return Ok(());
        };
        match ShellCommand::parse(&line) {
            Ok(None) => {}
            Ok(Some(ShellCommand::Quit)) => return Ok(()),
            Ok(Some(command)) => {
                debug!(?command, "shell command");
                execute(session, command, out).await?;
            }
            Err(e) => writeln!(out, "error: {e}")?,
        }
    }
}

async fn execute<W: Write>(session: &SessionController, command: ShellCommand, out: &mut W) -> std::io::Result<()> {
    let api = session.api().clone();
    match command {
        ShellCommand::Help => writeln!(out, "{HELP}"),
        ShellCommand::Quit => Ok(()),
        ShellCommand::Whoami => match routes::navbar_label(&session.session()) {
            Some(label) => writeln!(out, "{label}"),
            None => writeln!(out, "Not signed in."),
        },
        ShellCommand::Login { username, password } => {
            if !guard(session, Navigation::Login.path(), out)? {
                if let Some(user) = session.user() {
                    writeln!(out, "Already signed in as {}. Use `logout` first.", user.display_name())?;
                }
                return Ok(());
            }
            let mut page = LoginPage { username, password, error: None };
            match page.submit(session).await {
                Some(_) => writeln!(out, "{}", routes::navbar_label(&session.session()).unwrap_or_default()),
                None => writeln!(out, "error: {}", page.error.unwrap_or_default()),
            }
        }
        ShellCommand::Logout => {
            session.logout().await;
            writeln!(out, "Signed out.")
        }
        ShellCommand::List => {
            if !guard(session, Navigation::Home.path(), out)? {
                return Ok(());
            }
            let mut page = CustomerListPage::new(api);
            page.load().await;
            if let Some(error) = &page.error {
                writeln!(out, "error: {error}")?;
            }
            for customer in &page.items {
                writeln!(out, "{}", format_row(customer))?;
            }
            if let Some(empty) = page.empty_message() {
                writeln!(out, "{empty}")?;
            }
            Ok(())
        }
        ShellCommand::Get(id) => {
            if !guard(session, &format!("/customers/{id}"), out)? {
                return Ok(());
            }
            let mut page = CustomerFormPage::new(api, FormMode::Edit(id));
            page.load().await;
            match page.error {
                Some(error) => writeln!(out, "error: {error}"),
                None => write_draft(out, id, &page.values),
            }
        }
        ShellCommand::Add(fields) => {
            if !guard(session, "/customers/new", out)? {
                return Ok(());
            }
            let page = CustomerFormPage::new(api, FormMode::Add);
            save(page, &fields, out).await
        }
        ShellCommand::Edit(id, fields) => {
            if !guard(session, &format!("/customers/{id}"), out)? {
                return Ok(());
            }
            let mut page = CustomerFormPage::new(api, FormMode::Edit(id));
            page.load().await;
            if let Some(error) = &page.error {
                return writeln!(out, "error: {error}");
            }
            save(page, &fields, out).await
        }
        ShellCommand::Delete(id) => {
            if !guard(session, Navigation::Home.path(), out)? {
                return Ok(());
            }
            let mut page = CustomerListPage::new(api);
            let next = page.delete(id).await;
            if let Some(success) = &page.success {
                writeln!(out, "{success}")?;
            }
            if let Some(error) = &page.error {
                writeln!(out, "error: {error}")?;
            }
            if next == Some(Navigation::Login) {
                writeln!(out, "{SIGN_IN_HINT}")?;
            }
            Ok(())
        }
    }
}

/// Run the route guard for `path`; prints why when the route is not shown.
fn guard<W: Write>(session: &SessionController, path: &str, out: &mut W) -> std::io::Result<bool> {
    match routes::resolve(path, &session.session()) {
        RouteDecision::Render(_) => Ok(true),
        RouteDecision::Loading => {
            writeln!(out, "Busy, try again.")?;
            Ok(false)
        }
        RouteDecision::Redirect(Navigation::Login) => {
            writeln!(out, "{SIGN_IN_HINT}")?;
            Ok(false)
        }
        RouteDecision::Redirect(Navigation::Home) => Ok(false),
    }
}

async fn save<W: Write>(mut page: CustomerFormPage, fields: &[(String, String)], out: &mut W) -> std::io::Result<()> {
    for (name, value) in fields {
        page.values.set_field(name, value);
    }
    match page.submit().await {
        Some(_) => writeln!(out, "Customer saved."),
        None => writeln!(out, "error: {}", page.error.unwrap_or_default()),
    }
}

fn format_row(customer: &Customer) -> String {
    let phone = if customer.phone.is_empty() { "-" } else { customer.phone.as_str() };
    format!(
        "{:>4}  {} {}  <{}>  {}",
        customer.id, customer.first_name, customer.last_name, customer.email, phone
    )
}

fn write_draft<W: Write>(out: &mut W, id: i64, draft: &CustomerDraft) -> std::io::Result<()> {
    writeln!(out, "id:         {id}")?;
    writeln!(out, "first_name: {}", draft.first_name)?;
    writeln!(out, "last_name:  {}", draft.last_name)?;
    writeln!(out, "email:      {}", draft.email)?;
    writeln!(out, "phone:      {}", draft.phone)?;
    writeln!(out, "address:    {}", draft.address)
}

#[cfg(test)]
#[path = "shell_test.rs"]
mod tests;
