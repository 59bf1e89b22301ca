/// Application constants

// Tracked game
pub const GAME_NAME: &str = "chickenroad";
pub const GAME_PROVIDER: &str = "Evoplay";
pub const GAME_RTP: &str = "96%";

// Message type values observed on the game socket
pub const START_TYPES: &[&str] = &["game_start", "start"];
pub const ADVANCE_TYPES: &[&str] = &["cross", "safe", "lane_cleared"];
pub const LOSS_TYPES: &[&str] = &["hit", "crash", "game_over"];
pub const CASHOUT_TYPES: &[&str] = &["cashout", "collect"];
pub const BACKFILL_TYPE: &str = "history";

// Round defaults
pub const INITIAL_MULTIPLIER: f64 = 1.0;
pub const FINGERPRINT_LEN: usize = 12;

// Stats API query bounds
pub const GAMES_DEFAULT_LIMIT: i64 = 50;
pub const GAMES_MAX_LIMIT: i64 = 500;
pub const RECENT_DEFAULT_LIMIT: i64 = 100;
pub const RECENT_MAX_LIMIT: i64 = 1000;

// Lanes crossed distribution buckets: (label, min, max inclusive)
pub const DISTRIBUTION_BUCKETS: &[(&str, i32, Option<i32>)] = &[
    ("1 lane", 1, Some(1)),
    ("2-3 lanes", 2, Some(3)),
    ("4-5 lanes", 4, Some(5)),
    ("6-7 lanes", 6, Some(7)),
    ("8-9 lanes", 8, Some(9)),
    ("10+ lanes", 10, None),
];

// API version
pub const API_VERSION: &str = "v1";

// WebSocket configuration
pub const WS_CLIENT_TIMEOUT_SECS: u64 = 120;
