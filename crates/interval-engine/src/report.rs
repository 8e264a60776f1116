//! Optional reporting of operations through a pluggable sink.
//!
//! A [`Reporter`] binds a component name to an optional [`ReportSink`]. With
//! no sink attached every call is a no-op, so the engine works as a plain
//! library. [`TracingSink`] forwards records to `tracing`.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// Severity of a report record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportLevel::Debug => write!(f, "debug"),
            ReportLevel::Info => write!(f, "info"),
            ReportLevel::Warn => write!(f, "warn"),
            ReportLevel::Error => write!(f, "error"),
        }
    }
}

/// Optional detail attached to a record or event.
#[derive(Default)]
pub struct ReportOptions<'a> {
    pub message: Option<String>,
    pub data: Option<Value>,
    pub err: Option<&'a (dyn StdError + 'static)>,
}

impl<'a> ReportOptions<'a> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_err(mut self, err: &'a (dyn StdError + 'static)) -> Self {
        self.err = Some(err);
        self
    }
}

/// Payload published with a named event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

/// Destination for records and events.
pub trait ReportSink: Send + Sync {
    fn log(
        &self,
        level: ReportLevel,
        message: &str,
        data: Option<&Value>,
        err: Option<&(dyn StdError + 'static)>,
    );

    fn publish(&self, event: &str, body: &EventBody);
}

/// Sink that writes through the `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn log(
        &self,
        level: ReportLevel,
        message: &str,
        data: Option<&Value>,
        err: Option<&(dyn StdError + 'static)>,
    ) {
        let data = data.map(Value::to_string);
        let err = err.map(ToString::to_string);
        match level {
            ReportLevel::Debug => debug!(data = ?data, error = ?err, "{message}"),
            ReportLevel::Info => info!(data = ?data, error = ?err, "{message}"),
            ReportLevel::Warn => warn!(data = ?data, error = ?err, "{message}"),
            ReportLevel::Error => error!(data = ?data, error = ?err, "{message}"),
        }
    }

    fn publish(&self, event: &str, body: &EventBody) {
        let data = body.data.as_ref().map(Value::to_string);
        info!(
            event = %event,
            data = ?data,
            error = ?body.err,
            "{}",
            body.message
        );
    }
}

/// Names records after a component and forwards them to an optional sink.
#[derive(Clone)]
pub struct Reporter {
    component: &'static str,
    sink: Option<Arc<dyn ReportSink>>,
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("component", &self.component)
            .field("attached", &self.sink.is_some())
            .finish()
    }
}

impl Reporter {
    /// A reporter with no sink; every call is a no-op.
    pub fn silent(component: &'static str) -> Self {
        Self {
            component,
            sink: None,
        }
    }

    pub fn new(component: &'static str, sink: Arc<dyn ReportSink>) -> Self {
        Self {
            component,
            sink: Some(sink),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.sink.is_some()
    }

    pub fn debug(&self, caller: &str, options: ReportOptions<'_>) {
        self.log(ReportLevel::Debug, caller, options);
    }

    pub fn info(&self, caller: &str, options: ReportOptions<'_>) {
        self.log(ReportLevel::Info, caller, options);
    }

    pub fn warn(&self, caller: &str, options: ReportOptions<'_>) {
        self.log(ReportLevel::Warn, caller, options);
    }

    pub fn error(&self, caller: &str, options: ReportOptions<'_>) {
        self.log(ReportLevel::Error, caller, options);
    }

    /// Publish `event`; returns `false` when no sink is attached.
    pub fn emit(&self, event: &str, caller: &str, options: ReportOptions<'_>) -> bool {
        let Some(sink) = &self.sink else {
            return false;
        };
        let body = EventBody {
            message: self.label(caller, options.message.as_deref()),
            data: options.data,
            err: options.err.map(ToString::to_string),
        };
        sink.publish(event, &body);
        true
    }

    fn log(&self, level: ReportLevel, caller: &str, options: ReportOptions<'_>) {
        let Some(sink) = &self.sink else {
            return;
        };
        let label = self.label(caller, options.message.as_deref());
        // An attached error always escalates the record.
        let level = if options.err.is_some() {
            ReportLevel::Error
        } else {
            level
        };
        sink.log(level, &label, options.data.as_ref(), options.err);
    }

    fn label(&self, caller: &str, message: Option<&str>) -> String {
        match message {
            Some(message) => format!("{}#{caller}: {message}", self.component),
            None => format!("{}#{caller}", self.component),
        }
    }
}
