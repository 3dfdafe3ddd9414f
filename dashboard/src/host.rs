//! Terminal host for the dashboard controller.
//!
//! # Design
//! The controller never performs I/O, so this module does it on its behalf:
//! - `Effect::Send` runs the request on the blocking pool with ureq and
//!   posts the completion back into the event loop.
//! - `Effect::ScheduleDismiss` spawns a sleeping task and keeps its
//!   `AbortHandle`; `Effect::CancelDismiss` aborts it.
//! - Commands arrive line by line from a dedicated stdin reader thread.
//!
//! Everything that mutates the controller happens on the single loop in
//! `Host::run`, one event at a time.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use dashboard_core::{
    view, Confirm, Dashboard, Effect, HttpResponse, NotificationId, Ticket, TransportError,
    UserClient,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;
use tracing::{debug, warn};
use ureq::Agent;

use crate::command::{self, Command, CommandError};
use crate::config::DashboardConfig;
use crate::error::HostError;
use crate::transport;

#[derive(Debug)]
enum Event {
    Completed(Ticket, Result<HttpResponse, TransportError>),
    DismissElapsed(NotificationId),
}

pub struct Host {
    dashboard: Dashboard,
    agent: Agent,
    events: UnboundedSender<Event>,
    timers: HashMap<NotificationId, AbortHandle>,
}

/// Spawn the stdin reader. The channel closes on EOF or a read error.
pub fn stdin_lines() -> UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "stdin closed");
                    break;
                }
            }
        }
    });
    rx
}

impl Host {
    fn new(config: &DashboardConfig) -> (Self, UnboundedReceiver<Event>) {
        let (events, rx) = mpsc::unbounded_channel();
        let dashboard = Dashboard::new(UserClient::new(&config.base_url))
            .with_notification_lifetime(config.notification_lifetime);
        let host = Host {
            dashboard,
            agent: transport::agent(config.request_timeout),
            events,
            timers: HashMap::new(),
        };
        (host, rx)
    }

    /// Run the session until `quit` or end of input. Must be called from a
    /// multi-threaded runtime because delete confirmation blocks in place.
    pub async fn run(
        config: DashboardConfig,
        mut lines: UnboundedReceiver<String>,
    ) -> Result<(), HostError> {
        let (mut host, mut events) = Host::new(&config);
        let effects = host.dashboard.start();
        host.apply(effects);
        host.render()?;

        loop {
            tokio::select! {
                line = lines.recv() => {
                    let Some(line) = line else { break };
                    match line.parse::<Command>() {
                        Ok(Command::Quit) => break,
                        Ok(Command::Help) => {
                            println!("{}", command::HELP);
                            continue;
                        }
                        Ok(command) => host.dispatch(command, &mut lines),
                        Err(CommandError::Empty) => {}
                        Err(err) => {
                            println!("{err}");
                            continue;
                        }
                    }
                }
                Some(event) = events.recv() => host.handle(event),
            }
            host.render()?;
        }

        let Host {
            dashboard,
            mut timers,
            ..
        } = host;
        for effect in dashboard.shutdown() {
            if let Effect::CancelDismiss { id } = effect {
                debug!(?id, "dismiss timer cancelled on exit");
                if let Some(timer) = timers.remove(&id) {
                    timer.abort();
                }
            }
        }
        for timer in timers.into_values() {
            timer.abort();
        }
        Ok(())
    }

    fn dispatch(&mut self, command: Command, lines: &mut UnboundedReceiver<String>) {
        let effects = match command {
            Command::Refresh => self.dashboard.refresh(),
            Command::Add => {
                self.dashboard.open_add();
                Vec::new()
            }
            Command::Edit(id) => {
                if !self.dashboard.open_edit(&id) {
                    println!("no user with id `{id}`");
                }
                Vec::new()
            }
            Command::Delete(id) => {
                let mut confirm = StdinConfirm { lines };
                self.dashboard.request_delete(&id, &mut confirm)
            }
            Command::Set(field, value) => {
                if let Err(err) = self.dashboard.set_field(field, &value) {
                    println!("{err}");
                }
                Vec::new()
            }
            Command::Submit => self.dashboard.submit(),
            Command::Cancel => {
                self.dashboard.close_modal();
                Vec::new()
            }
            Command::Dismiss => self.dashboard.dismiss_notification(),
            Command::Help | Command::Quit => Vec::new(),
        };
        self.apply(effects);
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::Completed(ticket, result) => {
                let effects = self.dashboard.complete(ticket, result);
                self.apply(effects);
            }
            Event::DismissElapsed(id) => {
                self.timers.remove(&id);
                self.dashboard.dismiss_elapsed(id);
            }
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Send { ticket, request } => {
                    let agent = self.agent.clone();
                    let events = self.events.clone();
                    tokio::task::spawn_blocking(move || {
                        let result = transport::execute(&agent, &request);
                        let _ = events.send(Event::Completed(ticket, result));
                    });
                }
                Effect::ScheduleDismiss { id, after } => {
                    let events = self.events.clone();
                    let task = tokio::spawn(async move {
                        tokio::time::sleep(after).await;
                        let _ = events.send(Event::DismissElapsed(id));
                    });
                    if let Some(previous) = self.timers.insert(id, task.abort_handle()) {
                        previous.abort();
                    }
                }
                Effect::CancelDismiss { id } => {
                    if let Some(timer) = self.timers.remove(&id) {
                        timer.abort();
                    }
                }
            }
        }
    }

    fn render(&self) -> Result<(), HostError> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", "=".repeat(60))?;
        write!(stdout, "{}", view::render(&self.dashboard.snapshot()))?;
        write!(stdout, "> ")?;
        stdout.flush()?;
        Ok(())
    }
}

/// Reads the answer to a confirmation prompt from the next input line.
struct StdinConfirm<'a> {
    lines: &'a mut UnboundedReceiver<String>,
}

impl Confirm for StdinConfirm<'_> {
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let answer = tokio::task::block_in_place(|| self.lines.blocking_recv());
        answer.as_deref().is_some_and(command::is_yes)
    }
}
