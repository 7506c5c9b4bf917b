//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Radar chart constants
pub mod chart {
    /// Upper bound of the score scale
    pub const MAX_SCORE: f64 = 10.0;

    /// Number of concentric reference rings
    pub const RING_COUNT: usize = 5;

    /// Score step between consecutive rings (MAX_SCORE / RING_COUNT)
    pub const RING_STEP: f64 = 2.0;

    /// Angle of the first axis (12 o'clock), degrees
    pub const START_ANGLE_DEG: f64 = -90.0;

    /// Pointer distance (CSS px) within which a data point becomes active
    pub const DEFAULT_ACTIVATION_RADIUS: f64 = 20.0;

    /// Entrance sweep duration (milliseconds)
    pub const DEFAULT_ANIMATION_MS: u64 = 1500;

    /// Frame interval for the animation driver (~60 fps)
    pub const FRAME_INTERVAL_MS: u64 = 16;

    /// Default CSS size of the drawing surface
    pub const DEFAULT_WIDTH: f64 = 400.0;
    pub const DEFAULT_HEIGHT: f64 = 400.0;

    /// Space reserved around the polygon for axis labels (CSS px)
    pub const LABEL_PADDING: f64 = 60.0;

    /// Distance of axis labels beyond the outer ring (CSS px)
    pub const LABEL_OFFSET: f64 = 18.0;

    /// Data point radii (CSS px)
    pub const POINT_RADIUS: f64 = 4.0;
    pub const ACTIVE_POINT_RADIUS: f64 = 7.0;
}

/// Blueprint generation constants
pub mod generation {
    /// Mock validation score bounds (inclusive)
    pub const MOCK_SCORE_MIN: u32 = 5;
    pub const MOCK_SCORE_MAX: u32 = 8;

    /// Mock pillar bands (inclusive), by pillar name
    pub const MOCK_PILLAR_BANDS: [(&str, u32, u32); 6] = [
        ("Market Fit", 5, 8),
        ("Uniqueness", 4, 7),
        ("Scalability", 5, 8),
        ("Revenue", 4, 7),
        ("Execution", 5, 8),
        ("Expertise", 4, 7),
    ];

    /// Maximum accepted title length (characters)
    pub const MAX_TITLE_CHARS: usize = 200;

    /// Maximum accepted description length (characters)
    pub const MAX_DESCRIPTION_CHARS: usize = 5000;
}

/// Session-tier keys
pub mod session {
    pub const CURRENT_IDEA: &str = "currentIdea";
    pub const CURRENT_BLUEPRINT: &str = "currentBlueprint";
    pub const PROJECT_SAVED: &str = "projectSaved";

    /// Idle time after which an in-memory HTTP session is dropped (seconds)
    pub const DEFAULT_SESSION_TTL_SECS: u64 = 2 * 60 * 60;

    /// Upper bound on live in-memory HTTP sessions
    pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

    /// How often the server sweeps idle sessions (seconds)
    pub const SWEEP_INTERVAL_SECS: u64 = 60;
}

/// View constants
pub mod views {
    /// Dashboard card description excerpt length (characters)
    pub const CARD_EXCERPT_CHARS: usize = 140;
}

/// HTTP/Network constants
pub mod network {
    /// Default LLM request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 10;

    /// Default retries on transient provider failures
    pub const DEFAULT_MAX_RETRIES: usize = 1;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 4;

    /// Header carrying the session-tier id
    pub const SESSION_HEADER: &str = "x-session-id";

    /// Header carrying the authenticated user id (set by the upstream auth layer)
    pub const USER_HEADER: &str = "x-user-id";

    /// Where the auth callback lands when no valid redirect is given
    pub const DEFAULT_REDIRECT: &str = "/dashboard";
}
