//! Automation scripts: replay key and mouse input, on startup or when a
//! watched key is pressed.
//!
//! A script is a list of steps loaded from TOML:
//!
//! ```toml
//! # Runs once at startup: Ctrl+C.
//! [[steps]]
//! press = ["ctrl", "c"]
//!
//! # Every F9 press clicks ten times a second until Esc or for 2 seconds.
//! [[steps]]
//! do = { on = "f9", steps = [
//!     { repeat = { at = "10hz", for = "2s", until = "esc", steps = [{ press = "left click" }] } },
//! ] }
//!
//! # Steps from another file, inlined here.
//! [[steps]]
//! file = "common.toml"
//! ```
//!
//! # Steps
//!
//! | Step      | Effect                                                              |
//! |-----------|---------------------------------------------------------------------|
//! | `press`   | Presses every named key in order, then releases the bare ones.      |
//! | `hold`    | Sends the named transitions; bare names mean "down".                |
//! | `release` | Sends the named transitions; bare names mean "up".                  |
//! | `repeat`  | Runs `steps` at a frequency until `for` elapses or an `until` key.  |
//! | `do`      | Groups `steps`; with `on`, runs them each time an `on` key is seen. |
//! | `file`    | Inlines the steps of another script file.                           |
//!
//! Key names are those of [`keybridge_core::parse_input`]; a bare integer
//! `0`..`9` names the digit key.  `press = ["ctrl", "c"]` sends Ctrl-down,
//! C-down, Ctrl-up, C-up, so modifiers combine.
//!
//! # Where the events come from
//!
//! Triggers (`do` with `on`) and `until` keys watch the same event stream as
//! the consumer loop: the consumer forwards each event into the runner's
//! [`inbox`](ScriptRunner::inbox), which is an ordinary single-slot
//! [`EventMailbox`].  There is no second subscriber on the bridge.

use std::sync::Arc;
use std::time::{Duration, Instant};

use keybridge_core::{parse_key_spec, EventMailbox, InputEvent, KeyNameError, KeySpec};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::emulate_input::{send_all, InputSender};

/// Highest accepted `repeat.at` frequency.
pub const MAX_FREQUENCY_HZ: f64 = 1000.0;

/// How many `file` steps may nest inside one another.
const MAX_INCLUDE_DEPTH: usize = 16;

/// Error type for loading and compiling scripts.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("invalid key name in `{step}`: {source}")]
    InvalidKey {
        step: &'static str,
        #[source]
        source: KeyNameError,
    },

    #[error("{0} is not a digit key; write other key names as strings")]
    InvalidDigit(i64),

    #[error("invalid frequency {0:?}: expected e.g. \"10hz\", at most {MAX_FREQUENCY_HZ}hz")]
    InvalidFrequency(String),

    #[error("invalid duration {0:?}: expected a positive value such as \"1.5s\" or \"300ms\"")]
    InvalidDuration(String),

    #[error("`repeat` needs `for`, `until`, or both")]
    UnboundedRepeat,

    #[error("`do` with `on` is only allowed at the top level of a script")]
    NestedTrigger,

    #[error("trigger on {0:?} sends that same event and would re-fire itself")]
    SelfTrigger(InputEvent),

    #[error("script {path} includes itself")]
    IncludeCycle { path: String },

    #[error("failed to load script {path}: {reason}")]
    Load { path: String, reason: String },
}

// ── File schema ───────────────────────────────────────────────────────────────

/// A key written either as a name or as a bare digit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum KeyName {
    Digit(i64),
    Name(String),
}

/// One key or a list of keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum KeyList {
    One(KeyName),
    Many(Vec<KeyName>),
}

impl KeyList {
    fn names(&self) -> &[KeyName] {
        match self {
            Self::One(name) => std::slice::from_ref(name),
            Self::Many(names) => names,
        }
    }
}

/// One step as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepSpec {
    Press(KeyList),
    Hold(KeyList),
    Release(KeyList),
    Repeat(RepeatSpec),
    Do(DoSpec),
    File(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepeatSpec {
    /// Frequency, e.g. `"10hz"`.
    pub at: String,
    /// Optional time limit, e.g. `"2s"`.
    #[serde(rename = "for", default)]
    pub limit: Option<String>,
    /// Keys that end the repeat early.
    #[serde(default)]
    pub until: Option<KeyList>,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DoSpec {
    /// Keys that trigger `steps`.  Without it the steps simply run in place.
    #[serde(default)]
    pub on: Option<KeyList>,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

/// Top level of a script file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptSpec {
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

/// Source of the script files named by `file` steps.
pub trait ScriptLoader {
    fn load(&self, path: &str) -> Result<ScriptSpec, ScriptError>;
}

// ── Compiled form ─────────────────────────────────────────────────────────────

/// An executable step.  Key names are already resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Send these events in order.
    Send(Vec<InputEvent>),
    Repeat(Repeat),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Repeat {
    pub interval: Duration,
    pub limit: Option<Duration>,
    pub until: Vec<InputEvent>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub on: Vec<InputEvent>,
    pub steps: Vec<Step>,
}

/// A compiled script: steps run once at startup, then triggers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub steps: Vec<Step>,
    pub triggers: Vec<Trigger>,
}

/// Resolves every key name, frequency and duration in `spec`, inlining
/// `file` steps through `loader`.
///
/// # Errors
///
/// Any malformed value is reported here; a compiled [`Script`] never fails
/// for structural reasons at run time.
pub fn compile(spec: &ScriptSpec, loader: &dyn ScriptLoader) -> Result<Script, ScriptError> {
    let mut compiler = Compiler {
        loader,
        including: Vec::new(),
        triggers: Vec::new(),
    };
    let steps = compiler.steps(&spec.steps, true)?;
    Ok(Script {
        steps,
        triggers: compiler.triggers,
    })
}

struct Compiler<'a> {
    loader: &'a dyn ScriptLoader,
    including: Vec<String>,
    triggers: Vec<Trigger>,
}

impl Compiler<'_> {
    fn steps(&mut self, specs: &[StepSpec], top_level: bool) -> Result<Vec<Step>, ScriptError> {
        let mut out = Vec::new();
        for spec in specs {
            match spec {
                StepSpec::Press(keys) => {
                    let keys = key_specs("press", keys)?;
                    let mut events: Vec<InputEvent> = keys.iter().map(|k| k.event).collect();
                    events.extend(keys.iter().filter(|k| !k.directed).map(|k| k.event.released()));
                    out.push(Step::Send(events));
                }
                StepSpec::Hold(keys) => {
                    let events = key_specs("hold", keys)?.iter().map(|k| k.event).collect();
                    out.push(Step::Send(events));
                }
                StepSpec::Release(keys) => {
                    let events = key_specs("release", keys)?
                        .iter()
                        .map(|k| if k.directed { k.event } else { k.event.released() })
                        .collect();
                    out.push(Step::Send(events));
                }
                StepSpec::Repeat(repeat) => out.push(Step::Repeat(self.repeat(repeat)?)),
                StepSpec::Do(DoSpec { on: None, steps }) => {
                    out.extend(self.steps(steps, top_level)?);
                }
                StepSpec::Do(DoSpec { on: Some(on), steps }) => {
                    if !top_level {
                        return Err(ScriptError::NestedTrigger);
                    }
                    let on: Vec<InputEvent> = key_specs("on", on)?.iter().map(|k| k.event).collect();
                    let steps = self.steps(steps, false)?;
                    if let Some(event) = on.iter().find(|e| sends(&steps, **e)) {
                        return Err(ScriptError::SelfTrigger(*event));
                    }
                    self.triggers.push(Trigger { on, steps });
                }
                StepSpec::File(path) => out.extend(self.include(path, top_level)?),
            }
        }
        Ok(out)
    }

    fn repeat(&mut self, spec: &RepeatSpec) -> Result<Repeat, ScriptError> {
        let interval = parse_frequency(&spec.at)?;
        let limit = spec.limit.as_deref().map(parse_duration).transpose()?;
        let until: Vec<InputEvent> = match &spec.until {
            Some(keys) => key_specs("until", keys)?.iter().map(|k| k.event).collect(),
            None => Vec::new(),
        };
        if limit.is_none() && until.is_empty() {
            return Err(ScriptError::UnboundedRepeat);
        }
        Ok(Repeat {
            interval,
            limit,
            until,
            steps: self.steps(&spec.steps, false)?,
        })
    }

    fn include(&mut self, path: &str, top_level: bool) -> Result<Vec<Step>, ScriptError> {
        if self.including.iter().any(|p| p == path) || self.including.len() >= MAX_INCLUDE_DEPTH {
            return Err(ScriptError::IncludeCycle {
                path: path.to_string(),
            });
        }
        let spec = self.loader.load(path)?;
        debug!(path, steps = spec.steps.len(), "including script");

        self.including.push(path.to_string());
        let steps = self.steps(&spec.steps, top_level);
        self.including.pop();
        steps
    }
}

fn key_specs(step: &'static str, keys: &KeyList) -> Result<Vec<KeySpec>, ScriptError> {
    keys.names()
        .iter()
        .map(|name| {
            let text = match name {
                KeyName::Digit(d @ 0..=9) => d.to_string(),
                KeyName::Digit(d) => return Err(ScriptError::InvalidDigit(*d)),
                KeyName::Name(text) => text.clone(),
            };
            parse_key_spec(&text).map_err(|source| ScriptError::InvalidKey { step, source })
        })
        .collect()
}

/// `true` if running `steps` would send `event`.
fn sends(steps: &[Step], event: InputEvent) -> bool {
    steps.iter().any(|step| match step {
        Step::Send(events) => events.contains(&event),
        Step::Repeat(repeat) => sends(&repeat.steps, event),
    })
}

/// Parses `"<n>hz"` into the interval between ticks.
pub fn parse_frequency(text: &str) -> Result<Duration, ScriptError> {
    let invalid = || ScriptError::InvalidFrequency(text.to_string());
    let lower = text.trim().to_ascii_lowercase();
    let hz: f64 = lower
        .strip_suffix("hz")
        .ok_or_else(invalid)?
        .trim()
        .parse()
        .map_err(|_| invalid())?;
    if !(hz > 0.0 && hz <= MAX_FREQUENCY_HZ) {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(1.0 / hz).map_err(|_| invalid())
}

/// Parses a duration such as `"300ms"`, `"1.5s"` or `"1m30s"`.
///
/// Units: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`.  Every number needs a
/// unit and the total must be positive.
pub fn parse_duration(text: &str) -> Result<Duration, ScriptError> {
    let invalid = || ScriptError::InvalidDuration(text.to_string());
    let is_number = |c: char| c.is_ascii_digit() || c == '.';

    let mut rest = text.trim();
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut seconds = 0.0_f64;
    while !rest.is_empty() {
        let number_len = rest.find(|c: char| !is_number(c)).ok_or_else(invalid)?;
        let (number, tail) = rest.split_at(number_len);
        let value: f64 = number.parse().map_err(|_| invalid())?;

        let unit_len = tail.find(is_number).unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);
        let scale = match unit {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return Err(invalid()),
        };
        seconds += value * scale;
        rest = next;
    }

    match Duration::try_from_secs_f64(seconds) {
        Ok(duration) if !duration.is_zero() => Ok(duration),
        _ => Err(invalid()),
    }
}

// ── Runner ────────────────────────────────────────────────────────────────────

/// Totals reported when a script run ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Times a trigger fired.
    pub triggered: u64,
    /// Events handed to the sender successfully.
    pub sent: u64,
    /// Steps that stopped early because the sender failed.
    pub failures: u64,
}

enum Flow {
    Continue,
    Shutdown,
}

/// Executes a [`Script`] through an [`InputSender`].
pub struct ScriptRunner {
    script: Script,
    sender: Arc<dyn InputSender>,
    inbox: Arc<EventMailbox>,
}

impl ScriptRunner {
    pub fn new(script: Script, sender: Arc<dyn InputSender>) -> Self {
        Self {
            script,
            sender,
            inbox: Arc::new(EventMailbox::new()),
        }
    }

    /// Mailbox observed events are forwarded into.  Shutting it down ends
    /// [`run`](Self::run), including any repeat in progress.
    pub fn inbox(&self) -> Arc<EventMailbox> {
        Arc::clone(&self.inbox)
    }

    /// Runs the startup steps, then fires triggers until the inbox shuts
    /// down.  Returns at once after the startup steps if there are no
    /// triggers.  Blocks; run it on its own thread.
    pub fn run(&self) -> RunStats {
        let mut stats = RunStats::default();

        info!(
            steps = self.script.steps.len(),
            triggers = self.script.triggers.len(),
            "script started"
        );
        if let Flow::Shutdown = self.exec_all(&self.script.steps, &mut stats) {
            return stats;
        }
        if self.script.triggers.is_empty() {
            return stats;
        }

        loop {
            let event = self.inbox.take_next();
            if event.is_sentinel() {
                break;
            }
            for trigger in self.script.triggers.iter().filter(|t| t.on.contains(&event)) {
                stats.triggered += 1;
                debug!(code = event.code, action = ?event.action, "trigger fired");
                if let Flow::Shutdown = self.exec_all(&trigger.steps, &mut stats) {
                    return stats;
                }
            }
        }
        stats
    }

    fn exec_all(&self, steps: &[Step], stats: &mut RunStats) -> Flow {
        for step in steps {
            let flow = match step {
                Step::Send(events) => {
                    self.send(events, stats);
                    Flow::Continue
                }
                Step::Repeat(repeat) => self.repeat(repeat, stats),
            };
            if let Flow::Shutdown = flow {
                return Flow::Shutdown;
            }
        }
        Flow::Continue
    }

    fn send(&self, events: &[InputEvent], stats: &mut RunStats) {
        match send_all(self.sender.as_ref(), events) {
            Ok(sent) => stats.sent += sent as u64,
            Err((sent, e)) => {
                stats.sent += sent as u64;
                stats.failures += 1;
                warn!(error = %e, sent, total = events.len(), "script step failed");
            }
        }
    }

    /// Ticks every `interval`, first after one interval, until the limit
    /// passes, an `until` event arrives, or the inbox shuts down.  Other
    /// events seen meanwhile are ignored.
    fn repeat(&self, repeat: &Repeat, stats: &mut RunStats) -> Flow {
        let started = Instant::now();
        let deadline = repeat.limit.map(|limit| started + limit);
        let mut next_tick = started + repeat.interval;

        loop {
            let now = Instant::now();
            if deadline.is_some_and(|d| now >= d) {
                return Flow::Continue;
            }
            if now >= next_tick {
                if let Flow::Shutdown = self.exec_all(&repeat.steps, stats) {
                    return Flow::Shutdown;
                }
                // Ticks missed while the steps ran are dropped, not replayed.
                next_tick = (next_tick + repeat.interval).max(Instant::now());
                continue;
            }

            let wake = deadline.map_or(next_tick, |d| d.min(next_tick));
            match self.inbox.take_next_timeout(wake.saturating_duration_since(now)) {
                Some(event) if event.is_sentinel() => return Flow::Shutdown,
                Some(event) if repeat.until.contains(&event) => {
                    debug!(code = event.code, "repeat ended by key");
                    return Flow::Continue;
                }
                _ => {}
            }
        }
    }
}
