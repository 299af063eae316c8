//! Line-oriented terminal front end for a chat session.

use crate::chat::{ChatSession, SendOutcome};
use crate::commands::{ChatCommand, HELP, parse_command};
use crate::session::SessionStore;
use shae_actions::exercise::ExerciseKind;
use shae_actions::{ActionId, MicroAction, Phase, Sender, TranscriptEntry};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

const EXERCISE_POLL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Driver<W: Write> {
    session: ChatSession,
    store: SessionStore,
    out: W,
    printed: usize,
    finish_announced: bool,
}

impl<W: Write> Driver<W> {
    pub fn new(session: ChatSession, store: SessionStore, out: W) -> Self {
        Self {
            session,
            store,
            out,
            printed: 0,
            finish_announced: false,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Writes transcript entries appended since the last call. User lines are
    /// not echoed.
    pub fn flush_transcript(&mut self) -> anyhow::Result<()> {
        let entries = self.session.transcript().entries();
        for entry in &entries[self.printed.min(entries.len())..] {
            if let Some(line) = format_entry(entry) {
                writeln!(self.out, "{line}")?;
            }
        }
        self.printed = entries.len();
        self.out.flush()?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn handle_line(&mut self, line: &str) -> anyhow::Result<Flow> {
        let flow = match parse_command(line) {
            Some(command) => self.handle_command(command).await?,
            None => {
                self.handle_message(line).await?;
                Flow::Continue
            }
        };
        self.flush_transcript()?;
        Ok(flow)
    }

    async fn handle_message(&mut self, text: &str) -> anyhow::Result<()> {
        let outcome = self.session.send(text).await;
        self.flush_transcript()?;
        if let SendOutcome::Replied {
            suggestion: Some(action_id),
        } = outcome
        {
            let reveal = self.session.pacing().suggestion_reveal();
            if !reveal.is_zero() {
                tokio::time::sleep(reveal).await;
            }
            // The card is only shown if the suggestion is still pending.
            if self.session.lifecycle().pending() == Some(&action_id) {
                if let Some(action) = self.session.suggested_action() {
                    let card = render_card(action);
                    writeln!(self.out, "{card}")?;
                }
            }
        }
        Ok(())
    }

    async fn handle_command(&mut self, command: ChatCommand) -> anyhow::Result<Flow> {
        match command {
            ChatCommand::Try => {
                let Some(id) = self.session.lifecycle().pending().cloned() else {
                    return self.note("Nothing suggested right now.");
                };
                self.session.start(&id).await?;
                self.finish_announced = false;
                let intro = self.session.active_action().map(active_intro);
                if let Some(intro) = intro {
                    writeln!(self.out, "{intro}")?;
                }
                if let Some(exercise) = self.session.exercise() {
                    writeln!(self.out, "  {}", exercise.status_line())?;
                }
                Ok(Flow::Continue)
            }
            ChatCommand::Skip => {
                let target = self
                    .session
                    .lifecycle()
                    .active()
                    .or(self.session.lifecycle().pending())
                    .cloned();
                let Some(id) = target else {
                    return self.note("Nothing to skip.");
                };
                self.session.skip(&id).await?;
                Ok(Flow::Continue)
            }
            ChatCommand::Done => {
                let Some(id) = self.session.lifecycle().active().cloned() else {
                    return self.note("No exercise in progress. Use /try first.");
                };
                self.session.complete(&id).await?;
                Ok(Flow::Continue)
            }
            ChatCommand::Stop => {
                let stopped = match self.session.exercise_mut().map(|e| e.kind_mut()) {
                    Some(ExerciseKind::Countdown(countdown)) => {
                        countdown.stop_early();
                        true
                    }
                    _ => false,
                };
                if !stopped {
                    return self.note("No countdown running.");
                }
                self.show_exercise()
            }
            ChatCommand::Burn(text) => {
                let reply = match self.session.exercise_mut().map(|e| e.kind_mut()) {
                    Some(ExerciseKind::Release(pad)) if pad.snapshot().burning => {
                        "Still burning the last one. Try again in a moment."
                    }
                    Some(ExerciseKind::Release(pad)) => {
                        pad.write(text);
                        if pad.burn() {
                            "🔥 letting it go..."
                        } else {
                            "Write something to burn first."
                        }
                    }
                    _ => "Burning only works during a release exercise.",
                };
                self.note(reply)
            }
            ChatCommand::Status => {
                let status = self.status_lines();
                for line in status {
                    writeln!(self.out, "{line}")?;
                }
                Ok(Flow::Continue)
            }
            ChatCommand::Reset => {
                self.store.clear().await?;
                let session_id = self.store.get_or_create().await?;
                self.session.reset(session_id);
                self.printed = 0;
                self.finish_announced = false;
                self.note("Started a fresh session.")
            }
            ChatCommand::Help => self.note(HELP),
            ChatCommand::Quit => Ok(Flow::Quit),
            ChatCommand::Unknown(name) => self.note(&format!("Unknown command {name}. {HELP}")),
        }
    }

    /// Announces once when a timed exercise runs out on its own.
    pub fn poll_exercise(&mut self) -> anyhow::Result<()> {
        let Some(exercise) = self.session.exercise() else {
            return Ok(());
        };
        if self.finish_announced || !exercise.is_finished() {
            return Ok(());
        }
        self.finish_announced = true;
        let status = exercise.status_line();
        writeln!(self.out, "  {status}")?;
        writeln!(self.out, "  /done to mark it complete.")?;
        self.out.flush()?;
        Ok(())
    }

    fn show_exercise(&mut self) -> anyhow::Result<Flow> {
        if let Some(exercise) = self.session.exercise() {
            let status = exercise.status_line();
            writeln!(self.out, "  {status}")?;
        }
        Ok(Flow::Continue)
    }

    fn status_lines(&self) -> Vec<String> {
        let lifecycle = self.session.lifecycle();
        let phase = match lifecycle.phase() {
            Phase::Idle => "idle".to_string(),
            Phase::Suggested(id) => format!("suggested {id}"),
            Phase::Active(id) => format!("active {id}"),
        };
        let completed: Vec<&str> = lifecycle.completed().iter().map(ActionId::as_str).collect();
        let mut lines = vec![
            format!("session_id={}", self.session.session_id()),
            format!("phase={phase}"),
            format!("completed={}", completed.join(",")),
        ];
        if let Some(exercise) = self.session.exercise() {
            lines.push(format!("exercise={}", exercise.status_line()));
        }
        lines
    }

    fn note(&mut self, text: &str) -> anyhow::Result<Flow> {
        writeln!(self.out, "  {text}")?;
        Ok(Flow::Continue)
    }
}

pub fn format_entry(entry: &TranscriptEntry) -> Option<String> {
    match entry.sender {
        Sender::User => None,
        Sender::Companion => Some(format!("shae › {}", entry.text)),
        Sender::System => Some(format!("  {}", entry.text)),
    }
}

pub fn render_card(action: &MicroAction) -> String {
    let mut heading = format!("┌ {} · {}", action.title, action.category.label());
    if let Some(duration) = action.duration_label() {
        heading.push_str(&format!(" · {duration}"));
    }
    let mut lines = vec![heading, format!("│ {}", action.description)];
    if action.requires_consent_notice {
        lines.push(format!("│ {}", MicroAction::CONSENT_NOTICE));
    }
    lines.push("└ /try to start, /skip to pass".to_string());
    lines.join("\n")
}

fn active_intro(action: &MicroAction) -> String {
    format!("  Starting {}. /done when finished, /skip to stop.", action.title)
}

/// Reads stdin until EOF or `/quit`, polling the running exercise between lines.
pub async fn run<W: Write>(mut driver: Driver<W>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut poll = tokio::time::interval(EXERCISE_POLL);
    poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    driver.flush_transcript()?;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::debug!("stdin closed");
                    break;
                };
                if driver.handle_line(&line).await? == Flow::Quit {
                    break;
                }
            }
            _ = poll.tick() => driver.poll_exercise()?,
        }
    }
    tracing::info!(session_id = %driver.session().session_id(), "chat ended");
    Ok(())
}
