//! Semantic action IDs for Idle Clicker click targets.
//!
//! Registered during render and dispatched via `InputEvent::Click`.

// ── Core actions ────────────────────────────────────────────────
pub const PRIMARY_ACTION: u16 = 0;
pub const RESET_PROGRESS: u16 = 1;

// ── Upgrade purchase (base + UpgradeKind::index) ────────────────
pub const BUY_UPGRADE_BASE: u16 = 100;

// ── Bonus item collection (base + bonus id % BONUS_SLOT_SPAN) ───
pub const COLLECT_BONUS_BASE: u16 = 200;
pub const BONUS_SLOT_SPAN: u16 = 256;
