//! Command dispatcher: maps one structured request at a time onto the
//! scheduler and produces the structured response of the device protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use zonealarm_domain::alarm::{AlarmDraft, AlarmRecord};
use zonealarm_domain::error::{NotFoundError, ValidationError, ZoneAlarmError};
use zonealarm_domain::id::{SlotId, ZoneId};
use zonealarm_domain::time::{format_wall_clock, parse_wall_clock};

use crate::ports::{AlarmSink, ByteStore, ClockSource, TimeSync};
use crate::scheduler::Scheduler;

/// Commands understood by [`Dispatcher::dispatch_json`].
const COMMANDS: [&str; 7] = ["set", "ntp", "sync", "add", "delete", "list", "time"];

/// A parsed protocol request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum Request {
    /// Set the clock to `YYYY-MM-DD HH:MM[:SS]`.
    Set {
        #[serde(default)]
        time: Option<String>,
    },
    /// Ask the time-sync collaborator for the current time.
    #[serde(alias = "sync")]
    Ntp,
    Add(AddRequest),
    Delete {
        #[serde(default, alias = "zone")]
        callback: Option<i64>,
        #[serde(default)]
        id: Option<i64>,
    },
    List,
    Time,
}

/// Body of an `add` request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddRequest {
    #[serde(default, alias = "zone")]
    pub callback: Option<i64>,
    #[serde(default)]
    pub zone_data: Option<Value>,
    #[serde(flatten)]
    pub draft: AlarmDraft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Coarse classification of a response, for transports that need a status code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Outcome {
    #[default]
    Ok,
    /// Malformed or invalid input.
    Rejected,
    NotFound,
    /// The zone is full.
    Conflict,
    /// The clock or time source is not available.
    Unavailable,
    /// Storage failed.
    Failed,
}

/// A protocol response. Absent fields are not serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<SlotId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarms: Option<Vec<AlarmRecord>>,
    #[serde(skip)]
    pub outcome: Outcome,
}

impl Response {
    #[must_use]
    pub fn success() -> Self {
        Self {
            status: Some(Status::Success),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            status: Some(Status::Error),
            message: Some(message.into()),
            outcome,
            ..Self::default()
        }
    }

    #[must_use]
    fn with_command(mut self, command: &'static str) -> Self {
        self.command = Some(command);
        self
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Ok
    }
}

impl From<&ZoneAlarmError> for Outcome {
    fn from(err: &ZoneAlarmError) -> Self {
        match err {
            ZoneAlarmError::Validation(_) => Self::Rejected,
            ZoneAlarmError::CapacityExceeded(_) => Self::Conflict,
            ZoneAlarmError::NotFound(_) => Self::NotFound,
            ZoneAlarmError::Clock(_) => Self::Unavailable,
            ZoneAlarmError::Storage(_) => Self::Failed,
        }
    }
}

impl From<ZoneAlarmError> for Response {
    fn from(err: ZoneAlarmError) -> Self {
        let outcome = Outcome::from(&err);
        Self::error(err.to_string(), outcome)
    }
}

/// Owns the scheduler and the time-sync collaborator; one request at a time.
pub struct Dispatcher<B, S, C, T> {
    scheduler: Scheduler<B, S, C>,
    time_sync: T,
}

impl<B, S, C, T> Dispatcher<B, S, C, T>
where
    B: ByteStore,
    S: AlarmSink,
    C: ClockSource,
    T: TimeSync,
{
    pub fn new(scheduler: Scheduler<B, S, C>, time_sync: T) -> Self {
        Self {
            scheduler,
            time_sync,
        }
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler<B, S, C> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<B, S, C> {
        &mut self.scheduler
    }

    /// Parse and run one raw JSON request.
    pub async fn dispatch_json(&mut self, raw: &str) -> Response {
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            return Response::error("Invalid JSON", Outcome::Rejected);
        };
        let known = value
            .get("command")
            .and_then(Value::as_str)
            .is_some_and(|command| COMMANDS.contains(&command));
        if !known {
            return Response::error("Unknown command", Outcome::Rejected);
        }
        match serde_json::from_value::<Request>(value) {
            Ok(request) => self.dispatch(request).await,
            Err(err) => Response::error(format!("Invalid request: {err}"), Outcome::Rejected),
        }
    }

    /// Run one parsed request.
    #[tracing::instrument(skip(self))]
    pub async fn dispatch(&mut self, request: Request) -> Response {
        let response = match request {
            Request::Set { time } => self.set(time.as_deref()),
            Request::Ntp => self.sync().await,
            Request::Add(add) => self.add(add).await,
            Request::Delete { callback, id } => self.delete(callback, id).await,
            Request::List => self.list(),
            Request::Time => self.time(),
        };
        if !response.is_success() {
            tracing::debug!(message = ?response.message, "request failed");
        }
        response
    }

    fn set(&self, time: Option<&str>) -> Response {
        let result = time
            .ok_or(ValidationError::InvalidDateTime)
            .and_then(parse_wall_clock)
            .map_err(ZoneAlarmError::from)
            .and_then(|at| self.scheduler.set_clock(at).map_err(ZoneAlarmError::from));
        match result {
            Ok(()) => Response::success(),
            Err(err) => err.into(),
        }
    }

    async fn sync(&self) -> Response {
        let result = match self.time_sync.sync().await {
            Ok(at) => self.scheduler.set_clock(at).map_err(ZoneAlarmError::from),
            Err(err) => Err(err),
        };
        let response = match result {
            Ok(()) => Response {
                message: Some("Clock synced".to_string()),
                time: self.scheduler.now().ok().map(|now| format_wall_clock(&now)),
                ..Response::success()
            },
            Err(err) => {
                tracing::warn!(error = %err, "time sync failed");
                Response::error(format!("Time sync failed: {err}"), Outcome::Unavailable)
            }
        };
        response.with_command("ntp")
    }

    async fn add(&mut self, add: AddRequest) -> Response {
        let zone = match ZoneId::new(add.callback.unwrap_or_default()) {
            Ok(zone) => zone,
            Err(err) => return ZoneAlarmError::from(err).into(),
        };
        match self
            .scheduler
            .add_alarm(zone, &add.draft, add.zone_data)
            .await
        {
            Ok(committed) => Response {
                id: Some(committed.value),
                message: committed.persisted.err().map(|err| err.to_string()),
                ..Response::success()
            },
            Err(err) => err.into(),
        }
    }

    async fn delete(&mut self, callback: Option<i64>, id: Option<i64>) -> Response {
        let zone = match ZoneId::new(callback.unwrap_or_default()) {
            Ok(zone) => zone,
            Err(err) => return ZoneAlarmError::from(err).into(),
        };
        let raw_slot = id.unwrap_or(-1);
        let Ok(slot) = SlotId::new(raw_slot) else {
            return ZoneAlarmError::from(NotFoundError {
                zone,
                slot: raw_slot,
            })
            .into();
        };
        match self.scheduler.delete_alarm(zone, slot).await {
            Ok(committed) => Response {
                message: committed.persisted.err().map(|err| err.to_string()),
                ..Response::success()
            },
            Err(err) => err.into(),
        }
    }

    fn list(&self) -> Response {
        Response {
            alarms: Some(self.scheduler.list()),
            ..Response::default()
        }
        .with_command("list")
    }

    fn time(&self) -> Response {
        let response = match self.scheduler.now() {
            Ok(now) => Response {
                time: Some(format_wall_clock(&now)),
                ..Response::default()
            },
            Err(err) => ZoneAlarmError::from(err).into(),
        };
        response.with_command("time")
    }
}
