use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Hint attached to every budget-exhausted failure
pub const BUDGET_HINT: &str =
    "The shared daily request budget has run out for everyone. Try again tomorrow.";

/// Discriminant of a failed submission, kept in the session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    BudgetExhausted,
    RequestFailed,
    MalformedResponse,
}

/// Failure of a single call against the blend service
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BlendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request budget exhausted: {hint}")]
    BudgetExhausted {
        hint: String,
        resets_at: DateTime<Utc>,
    },

    #[error("Request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl BlendError {
    /// Builds a budget-exhausted error that resets at the next UTC midnight
    pub fn budget_exhausted(now: DateTime<Utc>) -> Self {
        BlendError::BudgetExhausted {
            hint: BUDGET_HINT.to_string(),
            resets_at: next_budget_reset(now),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BlendError::Network(_) => ErrorKind::Network,
            BlendError::BudgetExhausted { .. } => ErrorKind::BudgetExhausted,
            BlendError::RequestFailed { .. } => ErrorKind::RequestFailed,
            BlendError::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }

    /// Whether the condition is global and time-bounded rather than tied to this request
    pub fn is_global(&self) -> bool {
        self.kind() == ErrorKind::BudgetExhausted
    }
}

/// Errors returned by the session controller's submit operations
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    /// Another submission is already in flight on this session
    #[error("A blend request is already in progress")]
    InFlight,

    #[error(transparent)]
    Blend(#[from] BlendError),
}

/// Which of the two profile inputs a validation message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    First,
    Second,
}

/// Per-field validation failures, surfaced before any network call
#[derive(thiserror::Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("Invalid profile input")]
pub struct ValidationErrors {
    pub first: Option<String>,
    pub second: Option<String>,
}

impl ValidationErrors {
    pub fn set(&mut self, field: Field, message: impl Into<String>) {
        let slot = match field {
            Field::First => &mut self.first,
            Field::Second => &mut self.second,
        };
        *slot = Some(message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::First => self.first.as_deref(),
            Field::Second => self.second.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.second.is_none()
    }
}

pub type BlendResult<T> = Result<T, BlendError>;

fn next_budget_reset(now: DateTime<Utc>) -> DateTime<Utc> {
    (now.date_naive() + Duration::days(1))
        .and_time(NaiveTime::MIN)
        .and_utc()
}
