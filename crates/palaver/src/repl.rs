//! The interactive read-eval-print loop.

use std::fmt::Display;
use std::io::{self, Write};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::Stream::Stdout;
use owo_colors::{AnsiColors, OwoColorize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::select;
use tokio::signal;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::Session;

const RULE_WIDTH: usize = 60;
const DIVIDER_WIDTH: usize = 40;

/// A slash command understood by the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// `/quit` or `/exit`.
    Quit,
    /// `/clear`.
    Clear,
    /// `/history`.
    History,
    /// `/help`.
    Help,
}

/// A classified input line.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Input<'a> {
    /// Nothing but whitespace.
    Empty,
    /// Text to send to the model, trimmed.
    Chat(&'a str),
    /// A known command.
    Command(Command),
    /// Something starting with `/` that is not a command, lowercased.
    UnknownCommand(String),
}

/// Classifies an input line.
///
/// Commands are matched case-insensitively against the whole trimmed line,
/// so `/QUIT` quits while `/quit now` is an unknown command.
pub fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    if !line.starts_with('/') {
        return Input::Chat(line);
    }

    let command = line.to_lowercase();
    match command.as_str() {
        "/quit" | "/exit" => Input::Command(Command::Quit),
        "/clear" => Input::Command(Command::Clear),
        "/history" => Input::Command(Command::History),
        "/help" => Input::Command(Command::Help),
        _ => Input::UnknownCommand(command),
    }
}

/// Drives a [`Session`] from a line-based input and writes everything the
/// user should see to `output`.
pub struct Repl<W> {
    session: Session,
    output: W,
    colored: bool,
    spinner_style: Option<ProgressStyle>,
}

impl<W: Write> Repl<W> {
    /// Creates a loop over `session` that prints to `output`.
    #[inline]
    pub fn new(session: Session, output: W) -> Self {
        Self {
            session,
            output,
            colored: false,
            spinner_style: None,
        }
    }

    /// Colors the prompt labels when stdout is a terminal.
    #[inline]
    pub fn with_colors(mut self) -> Self {
        self.colored = true;
        self
    }

    /// Shows a spinner on stderr while waiting for the model.
    pub fn with_spinner(mut self) -> Self {
        self.spinner_style = ProgressStyle::with_template("{spinner} {msg}")
            .ok()
            .map(|style| style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        self
    }

    /// Returns the session.
    #[inline]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Consumes the loop, returning the output sink.
    #[inline]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs until the user quits or the input ends, treating Ctrl-C as an
    /// interrupt.
    ///
    /// Only I/O errors on `output` (or a broken `input`) end the loop
    /// early; failed turns and undecodable lines are reported and the loop
    /// goes on.
    pub async fn run<R>(&mut self, input: R) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let interrupts = Interrupts::listen();
        self.run_with_interrupt(input, || interrupts.wait()).await
    }

    /// Like [`Repl::run`], but interrupts are signaled by the futures
    /// `interrupt` returns. A new future is requested every time the loop
    /// starts waiting, for input or for the model.
    pub async fn run_with_interrupt<R, F, Fut>(
        &mut self,
        mut input: R,
        mut interrupt: F,
    ) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        self.print_welcome()?;

        let mut line = String::new();
        loop {
            let label = self.label("You:", AnsiColors::BrightGreen);
            write!(self.output, "\n{label} ")?;
            self.output.flush()?;

            // A partially typed line is dropped on interrupt.
            line.clear();
            let count = select! {
                biased;
                _ = interrupt() => {
                    self.print_interrupted()?;
                    continue;
                }
                count = input.read_line(&mut line) => count,
            };
            let count = match count {
                Ok(count) => count,
                Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                    warn!("unreadable input line: {err}");
                    self.print_error(&err)?;
                    continue;
                }
                Err(err) => return Err(err),
            };
            if count == 0 {
                trace!("input closed");
                self.print_farewell()?;
                return Ok(());
            }

            let text = match parse_input(&line) {
                Input::Empty => continue,
                Input::Command(command) => {
                    if self.handle_command(command)?.is_break() {
                        return Ok(());
                    }
                    continue;
                }
                Input::UnknownCommand(command) => {
                    writeln!(self.output, "\nUnknown command: {command}")?;
                    writeln!(
                        self.output,
                        "Type /help for available commands."
                    )?;
                    continue;
                }
                Input::Chat(text) => text,
            };

            let spinner = self.spinner_style.clone().map(|style| {
                let spinner = ProgressBar::new_spinner()
                    .with_style(style)
                    .with_message("Thinking...");
                spinner.enable_steady_tick(Duration::from_millis(100));
                spinner
            });
            let result = select! {
                biased;
                _ = interrupt() => None,
                result = self.session.send_message(text) => Some(result),
            };
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }

            match result {
                None => self.print_interrupted()?,
                Some(Ok(reply)) => {
                    let label =
                        self.label("Assistant:", AnsiColors::BrightCyan);
                    writeln!(self.output, "\n{label} {reply}")?;
                    writeln!(self.output, "{}", "-".repeat(DIVIDER_WIDTH))?;
                }
                Some(Err(err)) => {
                    warn!(kind = ?err.kind(), "turn failed: {err}");
                    self.print_error(&err)?;
                }
            }
        }
    }

    fn handle_command(
        &mut self,
        command: Command,
    ) -> io::Result<ControlFlow<()>> {
        debug!("handling command {command:?}");
        match command {
            Command::Quit => {
                self.print_farewell()?;
                return Ok(ControlFlow::Break(()));
            }
            Command::Clear => {
                self.session.clear_history();
                writeln!(self.output, "\nConversation history cleared.")?;
            }
            Command::History => {
                let history = self.session.history();
                if history.is_empty() {
                    writeln!(self.output, "\nNo conversation history yet.")?;
                } else {
                    writeln!(self.output, "\n=== Conversation History ===")?;
                    writeln!(
                        self.output,
                        "{}",
                        serde_json::to_string_pretty(&history)?
                    )?;
                    writeln!(self.output, "=== End of History ===")?;
                }
            }
            Command::Help => self.print_welcome()?,
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Prints the banner and the command summary.
    pub fn print_welcome(&mut self) -> io::Result<()> {
        let out = &mut self.output;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "Welcome to the AI Chat Interface")?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "\nCommands:")?;
        writeln!(out, "  /quit or /exit - End the chat")?;
        writeln!(out, "  /clear - Clear conversation history")?;
        writeln!(out, "  /history - Show conversation history")?;
        writeln!(out, "  /help - Show this help message")?;
        writeln!(out, "\nType your message and press Enter to chat.")?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))
    }

    fn label(&self, text: &str, color: AnsiColors) -> String {
        if self.colored {
            text.if_supports_color(Stdout, |t| t.color(color)).to_string()
        } else {
            text.to_owned()
        }
    }

    fn print_farewell(&mut self) -> io::Result<()> {
        writeln!(self.output, "\nGoodbye! Thank you for chatting.")
    }

    fn print_interrupted(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n\nInterrupted. Use /quit to exit properly.")
    }

    fn print_error(&mut self, err: &dyn Display) -> io::Result<()> {
        writeln!(self.output, "\nError: {err}")?;
        writeln!(self.output, "Please try again or use /quit to exit.")
    }
}

/// Pending Ctrl-C presses.
///
/// A press that arrives while nobody waits is kept and wakes the next
/// waiter, so presses made while output is being printed are not lost.
/// Presses made before a wait are coalesced into one.
struct Interrupts {
    notify: Arc<Notify>,
    listener: Option<JoinHandle<()>>,
}

impl Interrupts {
    fn new() -> Self {
        Self {
            notify: Arc::new(Notify::new()),
            listener: None,
        }
    }

    /// Starts listening for Ctrl-C until dropped.
    fn listen() -> Self {
        let mut interrupts = Self::new();
        let notify = Arc::clone(&interrupts.notify);
        interrupts.listener = Some(tokio::spawn(forward_ctrl_c(notify)));
        interrupts
    }

    #[cfg(test)]
    fn raise(&self) {
        self.notify.notify_one();
    }

    fn wait(&self) -> impl Future<Output = ()> + use<> {
        let notify = Arc::clone(&self.notify);
        async move { notify.notified().await }
    }
}

impl Drop for Interrupts {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

async fn forward_ctrl_c(notify: Arc<Notify>) {
    if let Err(err) = listen_ctrl_c(&notify).await {
        // Without a handler there is nothing to wait for.
        warn!("cannot listen for Ctrl-C: {err}");
    }
}

#[cfg(unix)]
async fn listen_ctrl_c(notify: &Notify) -> io::Result<()> {
    use tokio::signal::unix::SignalKind;

    let mut interrupts = signal::unix::signal(SignalKind::interrupt())?;
    while interrupts.recv().await.is_some() {
        notify.notify_one();
    }
    Ok(())
}

#[cfg(not(unix))]
async fn listen_ctrl_c(notify: &Notify) -> io::Result<()> {
    loop {
        signal::ctrl_c().await?;
        notify.notify_one();
    }
}
