use mutrace_core_types::TraceId;
use thiserror::Error;

/// Result type alias using MutraceError
pub type Result<T> = std::result::Result<T, MutraceError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic handling,
/// tests and log assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural
    NotFound,
    AlreadyExists,
    CycleDetected,
    Orphan,

    // Live update path
    Transport,
    MalformedMessage,
    StaleResponse,

    // Configuration / IO
    InvalidConfig,
    Io,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            ExErrorKind::Orphan => "ERR_ORPHAN_POST",
            ExErrorKind::Transport => "ERR_TRANSPORT",
            ExErrorKind::MalformedMessage => "ERR_MALFORMED_MESSAGE",
            ExErrorKind::StaleResponse => "ERR_STALE_RESPONSE",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Io => "ERR_IO",
        }
    }

    /// Whether the condition leaves the engine with a usable, last-known view
    ///
    /// Every kind raised by the live update path degrades rather than aborts.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            ExErrorKind::Transport
                | ExErrorKind::MalformedMessage
                | ExErrorKind::StaleResponse
                | ExErrorKind::CycleDetected
                | ExErrorKind::Orphan
        )
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and context for
/// debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    post_id: Option<String>,
    incident_id: Option<String>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            post_id: None,
            incident_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add post ID context
    pub fn with_post_id(mut self, id: impl Into<String>) -> Self {
        self.post_id = Some(id.into());
        self
    }

    /// Add incident ID context
    pub fn with_incident_id(mut self, id: impl Into<String>) -> Self {
        self.incident_id = Some(id.into());
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn post_id(&self) -> Option<&str> {
        self.post_id.as_deref()
    }

    pub fn incident_id(&self) -> Option<&str> {
        self.incident_id.as_deref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(post_id) = &self.post_id {
            write!(f, " (post_id: {})", post_id)?;
        }
        if let Some(incident_id) = &self.incident_id {
            write!(f, " (incident_id: {})", incident_id)?;
        }
        if let Some(trace_id) = &self.trace_id {
            write!(f, " (trace_id: {})", trace_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for mutrace operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutraceError {
    /// Snapshot fetch or live channel failed or closed
    #[error("Transport failure for incident {incident_id}: {reason}")]
    TransportError { incident_id: String, reason: String },

    /// Channel payload could not be decoded or lacks required fields
    #[error("Malformed channel message: {reason}")]
    MalformedMessage { reason: String },

    /// Post sits on a parent-reference cycle
    #[error("Cycle detected: post {post_id} is its own ancestor")]
    CycleDetected { post_id: String },

    /// Post references a parent absent from the current post set
    #[error("Orphan post {post_id}: parent {parent_id} not present")]
    OrphanPost { post_id: String, parent_id: String },

    /// Post not present in the post set
    #[error("Post not found: {post_id}")]
    PostNotFound { post_id: String },

    /// Post id already present (first-seen wins)
    #[error("Duplicate post: {post_id}")]
    DuplicatePost { post_id: String },

    /// Post or response tagged with a different incident than the active one
    #[error("Incident mismatch: expected {expected}, got {actual}")]
    IncidentMismatch { expected: String, actual: String },

    /// Configuration failed to parse or validate
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Filesystem failure
    #[error("IO error on {path}: {reason}")]
    Io { path: String, reason: String },
}

impl From<MutraceError> for ExError {
    fn from(err: MutraceError) -> Self {
        match err {
            MutraceError::TransportError {
                incident_id,
                reason,
            } => ExError::new(ExErrorKind::Transport)
                .with_incident_id(incident_id)
                .with_message(reason),

            MutraceError::MalformedMessage { reason } => {
                ExError::new(ExErrorKind::MalformedMessage).with_message(reason)
            }

            MutraceError::CycleDetected { post_id } => ExError::new(ExErrorKind::CycleDetected)
                .with_post_id(post_id)
                .with_message("Post is its own ancestor; isolated as root"),

            MutraceError::OrphanPost { post_id, parent_id } => ExError::new(ExErrorKind::Orphan)
                .with_post_id(post_id)
                .with_message(format!("Parent {} not present; kept as root", parent_id)),

            MutraceError::PostNotFound { post_id } => ExError::new(ExErrorKind::NotFound)
                .with_post_id(post_id)
                .with_message("Post not found"),

            MutraceError::DuplicatePost { post_id } => ExError::new(ExErrorKind::AlreadyExists)
                .with_post_id(post_id)
                .with_message("Post already merged"),

            MutraceError::IncidentMismatch { expected, actual } => {
                ExError::new(ExErrorKind::StaleResponse)
                    .with_incident_id(actual)
                    .with_message(format!("Expected incident {}", expected))
            }

            MutraceError::InvalidConfig { reason } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(reason)
            }

            MutraceError::Io { path, reason } => {
                ExError::new(ExErrorKind::Io).with_message(format!("{}: {}", path, reason))
            }
        }
    }
}
