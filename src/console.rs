//! Line-oriented front-end for the sandbox
//!
//! Each input line is parsed into a [`Command`] and applied to a checkout
//! session, or to the booking form that comes before it. The returned text
//! is what the terminal shows.

use anyhow::{bail, Result};
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;
use thiserror::Error;

use crate::checkout::CheckoutSession;
use crate::form::{FieldValue, FormEngine, FormValues, InputEvent, InputKind, SubmitOutcome};
use crate::sdk::{Endpoint, SdkClientTrait, SdkError, SdkMode};

pub const HELP: &str = "\
Commands:
  keys [live|mock]       generate sandbox credentials
  auth                   request a bearer token
  user                   fetch the current user
  cards                  list saved payment methods
  charge                 send the sample charge
  form booking|payment   choose the form that field commands edit
  type <field> <value>   change a form field
  check <field> on|off   toggle a checkbox field
  blur <field>           leave a form field
  book                   submit the booking form
  pay                    submit the payment form
  reset                  clear the current form
  show                   print the current form state
  help                   print this help
  quit                   exit";

/// Errors from parsing a command line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error(transparent)]
    Mode(#[from] SdkError),
    #[error("expected on or off, got {0}")]
    NotAToggle(String),
    #[error("unknown form: {0} (expected booking or payment)")]
    UnknownForm(String),
}

/// The forms a console session walks through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormKind {
    Booking,
    #[default]
    Payment,
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormKind::Booking => write!(f, "booking"),
            FormKind::Payment => write!(f, "payment"),
        }
    }
}

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Keys(Option<SdkMode>),
    Auth,
    User,
    Cards,
    Charge,
    Select(FormKind),
    Type { field: String, value: String },
    Check { field: String, checked: bool },
    Blur(String),
    Book,
    Pay,
    Reset,
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim_start();

        let field = |rest: &str| -> Result<String, CommandError> {
            rest.split_whitespace()
                .next()
                .map(str::to_string)
                .ok_or(CommandError::MissingArgument("field"))
        };

        match name.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "keys" => {
                let mode = match rest {
                    "" => None,
                    mode => Some(mode.parse::<SdkMode>()?),
                };
                Ok(Command::Keys(mode))
            }
            "auth" => Ok(Command::Auth),
            "user" => Ok(Command::User),
            "cards" => Ok(Command::Cards),
            "charge" => Ok(Command::Charge),
            "form" => match rest.to_ascii_lowercase().as_str() {
                "" => Err(CommandError::MissingArgument("form")),
                "booking" => Ok(Command::Select(FormKind::Booking)),
                "payment" | "checkout" => Ok(Command::Select(FormKind::Payment)),
                _ => Err(CommandError::UnknownForm(rest.to_string())),
            },
            "type" => {
                let field = field(rest)?;
                // Everything after the field name is the value, spaces included
                let value = rest[field.len()..].trim_start().to_string();
                Ok(Command::Type { field, value })
            }
            "check" => {
                let field = field(rest)?;
                let toggle = rest[field.len()..].trim();
                let checked = match toggle {
                    "on" | "true" | "yes" => true,
                    "off" | "false" | "no" => false,
                    "" => return Err(CommandError::MissingArgument("on|off")),
                    other => return Err(CommandError::NotAToggle(other.to_string())),
                };
                Ok(Command::Check { field, checked })
            }
            "blur" => Ok(Command::Blur(field(rest)?)),
            "book" => Ok(Command::Book),
            "pay" | "submit" => Ok(Command::Pay),
            "reset" => Ok(Command::Reset),
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Applies commands to a checkout session and renders the results
pub struct Console<C> {
    session: CheckoutSession<C>,
    booking: Option<FormEngine>,
    active: FormKind,
    stay: Option<FormValues>,
    quit: bool,
}

impl<C: SdkClientTrait> Console<C> {
    pub fn new(session: CheckoutSession<C>) -> Self {
        Self {
            session,
            booking: None,
            active: FormKind::Payment,
            stay: None,
            quit: false,
        }
    }

    /// Start on a booking form; a confirmed booking moves on to payment
    pub fn with_booking(mut self, booking: FormEngine) -> Self {
        self.booking = Some(booking);
        self.active = FormKind::Booking;
        self
    }

    pub fn session(&self) -> &CheckoutSession<C> {
        &self.session
    }

    pub fn active_form(&self) -> FormKind {
        self.active
    }

    /// Values of the last confirmed booking
    pub fn stay(&self) -> Option<&FormValues> {
        self.stay.as_ref()
    }

    fn form(&self) -> &FormEngine {
        match (self.active, &self.booking) {
            (FormKind::Booking, Some(booking)) => booking,
            _ => self.session.form(),
        }
    }

    fn form_mut(&mut self) -> &mut FormEngine {
        match (self.active, self.booking.as_mut()) {
            (FormKind::Booking, Some(booking)) => booking,
            _ => self.session.form_mut(),
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Run one command and return the text to display
    pub async fn execute(&mut self, command: Command) -> Result<String> {
        match command {
            Command::Keys(mode) => {
                let client = self.session.client_mut();
                let mode = mode.unwrap_or_else(|| client.mode());
                let credentials = client.initialize(mode);
                Ok(serde_json::to_string_pretty(&credentials)?)
            }
            Command::Auth => {
                let result = self.session.client_mut().authenticate().await;
                self.render_call(Endpoint::Auth, result.map(|_| ()))
            }
            Command::User => {
                let result = self.session.client_mut().get_user().await;
                self.render_call(Endpoint::User, result.map(|_| ()))
            }
            Command::Cards => {
                let result = self.session.client_mut().get_cards().await;
                self.render_call(Endpoint::Cards, result.map(|_| ()))
            }
            Command::Charge => {
                let result = self
                    .session
                    .client_mut()
                    .charge(crate::sdk::ChargeRequest::sample())
                    .await;
                self.render_call(Endpoint::Charge, result.map(|_| ()))
            }
            Command::Select(kind) => {
                if kind == FormKind::Booking && self.booking.is_none() {
                    bail!("this session has no booking form");
                }
                self.active = kind;
                Ok(self.render_form())
            }
            Command::Type { field, value } => {
                let kind = match self.form().input_kind(&field) {
                    InputKind::Checkbox => {
                        bail!("{field} is a checkbox, use `check {field} on|off`")
                    }
                    kind => kind,
                };
                let event = InputEvent {
                    kind,
                    ..InputEvent::text(&field, &value)
                };
                self.form_mut().handle_change(&event).await;
                Ok(self.render_field(&field))
            }
            Command::Check { field, checked } => {
                let event = InputEvent::checkbox(&field, checked);
                self.form_mut().handle_change(&event).await;
                Ok(self.render_field(&field))
            }
            Command::Blur(field) => {
                self.form_mut().handle_blur(&field).await;
                Ok(self.render_field(&field))
            }
            Command::Book => self.book().await,
            Command::Pay => {
                let outcome = self.session.pay().await;
                Ok(self.render_payment(&outcome)?)
            }
            Command::Reset => {
                match self.active {
                    FormKind::Payment => self.session.reset(),
                    FormKind::Booking => {
                        if let Some(booking) = self.booking.as_mut() {
                            booking.reset();
                        }
                        self.stay = None;
                    }
                }
                Ok(format!("{} form reset", self.active))
            }
            Command::Show => Ok(self.render_form()),
            Command::Help => Ok(HELP.to_string()),
            Command::Quit => {
                self.quit = true;
                Ok("Bye".to_string())
            }
        }
    }

    async fn book(&mut self) -> Result<String> {
        let Some(booking) = self.booking.as_mut() else {
            bail!("this session has no booking form");
        };

        let mut stay = None;
        let outcome = booking
            .submit(|values| {
                stay = Some(values);
                async { Ok(()) }
            })
            .await;

        Ok(match (outcome, stay) {
            (SubmitOutcome::Submitted, Some(stay)) => {
                let summary = format!(
                    "{} to {}, {} guest(s)",
                    field_text(&stay, "checkIn"),
                    field_text(&stay, "checkOut"),
                    field_text(&stay, "guests"),
                );
                tracing::info!(%summary, "Booking confirmed");
                self.stay = Some(stay);
                self.active = FormKind::Payment;
                format!("Booking confirmed: {summary}\nEnter card details, then `pay`")
            }
            (SubmitOutcome::Failed(message), _) => format!("Booking failed ({message})"),
            _ => self.booking.as_ref().map(render_errors).unwrap_or_default(),
        })
    }

    fn render_call(&self, endpoint: Endpoint, result: Result<(), SdkError>) -> Result<String> {
        let exchange = self.session.client().exchange(endpoint);
        let mut out = String::new();
        match &result {
            Ok(()) => writeln!(out, "{} request succeeded", endpoint.label())?,
            Err(err) => writeln!(out, "{} request failed: {err}", endpoint.label())?,
        }
        out.push_str(&serde_json::to_string_pretty(&exchange)?);
        Ok(out)
    }

    fn render_field(&self, field: &str) -> String {
        let form = self.form();
        let mut line = format!("{field} = {}", display_value(form.value(field)));
        if let Some(error) = form.error(field) {
            line.push_str(&format!("  [{error}]"));
        }
        line
    }

    fn render_form(&self) -> String {
        let form = self.form();
        let mut lines = vec![format!("{} form", self.active)];
        lines.extend(form.values().keys().map(|field| {
            let marker = if form.is_touched(field) { "*" } else { " " };
            format!("{marker} {}", self.render_field(field))
        }));
        // Errors forced onto fields the form does not hold
        for (field, error) in form.errors() {
            if !form.values().contains_key(field) {
                lines.push(format!("! {field}: {error}"));
            }
        }
        lines.push(format!(
            "dirty={} valid={} submitting={}",
            form.is_dirty(),
            form.is_valid(),
            form.is_submitting()
        ));
        lines.join("\n")
    }

    fn render_payment(&self, outcome: &SubmitOutcome) -> Result<String> {
        Ok(match outcome {
            SubmitOutcome::Submitted => {
                let receipt = self
                    .session
                    .receipt()
                    .map(serde_json::to_string_pretty)
                    .transpose()?
                    .unwrap_or_default();
                format!("Payment processed successfully!\n{receipt}")
            }
            SubmitOutcome::Invalid => render_errors(self.session.form()),
            SubmitOutcome::Failed(message) => {
                format!("Payment processing failed. Please try again. ({message})")
            }
        })
    }
}

fn render_errors(form: &FormEngine) -> String {
    let mut out = "Please fix the highlighted fields:".to_string();
    for (field, error) in form.errors() {
        out.push_str(&format!("\n  {field}: {error}"));
    }
    out
}

fn field_text(values: &FormValues, field: &str) -> String {
    values.get(field).map(ToString::to_string).unwrap_or_default()
}

fn display_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) => format!("{s:?}"),
        FieldValue::Missing => "-".to_string(),
        other => other.to_string(),
    }
}
