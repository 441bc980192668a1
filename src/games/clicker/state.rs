/// Idle Clicker game state definitions.

use super::timers::{Scheduler, TaskId};

/// Generator re-arm interval.
pub const GENERATOR_INTERVAL_MS: u64 = 1000;
/// Bonus items spawned by one magnet activation.
pub const BONUS_ITEM_COUNT: usize = 5;
/// Currency granted by collecting a bonus item.
pub const BONUS_ITEM_VALUE: f64 = 5.0;
/// Message log capacity.
const LOG_CAPACITY: usize = 50;

/// The four purchasable upgrades.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeKind {
    /// Permanent: yields currency automatically every second.
    Generator,
    /// Permanent: scales the yield of manual actions.
    Multiplier,
    /// Timed: spawns collectible bonus items.
    Magnet,
    /// Timed: temporarily scales the yield of manual actions.
    Boost,
}

impl UpgradeKind {
    /// All kinds in display order.
    pub fn all() -> &'static [UpgradeKind] {
        &[
            UpgradeKind::Generator,
            UpgradeKind::Multiplier,
            UpgradeKind::Magnet,
            UpgradeKind::Boost,
        ]
    }

    pub fn name(&self) -> &str {
        match self {
            UpgradeKind::Generator => "オートクリッカー",
            UpgradeKind::Multiplier => "クリック倍率",
            UpgradeKind::Magnet => "コインマグネット",
            UpgradeKind::Boost => "スーパークリック",
        }
    }

    pub fn description(&self) -> &str {
        match self {
            UpgradeKind::Generator => "毎秒自動でコイン獲得",
            UpgradeKind::Multiplier => "クリック獲得量 ×2",
            UpgradeKind::Magnet => "ボーナスコインを5枚出現",
            UpgradeKind::Boost => "5秒間クリック獲得量 ×3",
        }
    }

    /// Keyboard shortcut.
    pub fn key(&self) -> char {
        match self {
            UpgradeKind::Generator => '1',
            UpgradeKind::Multiplier => '2',
            UpgradeKind::Magnet => '3',
            UpgradeKind::Boost => '4',
        }
    }

    pub fn from_key(key: char) -> Option<UpgradeKind> {
        UpgradeKind::all().iter().copied().find(|k| k.key() == key)
    }

    /// Display index (0..4).
    pub fn index(&self) -> usize {
        match self {
            UpgradeKind::Generator => 0,
            UpgradeKind::Multiplier => 1,
            UpgradeKind::Magnet => 2,
            UpgradeKind::Boost => 3,
        }
    }

    /// Timed upgrades are single-instance while active.
    pub fn is_timed(&self) -> bool {
        matches!(self, UpgradeKind::Magnet | UpgradeKind::Boost)
    }
}

/// Purchase parameters of one upgrade.
///
/// `level` only advances for permanent upgrades; `duration_ms` is only
/// meaningful for timed ones.
#[derive(Clone, Debug, PartialEq)]
pub struct Upgrade {
    pub level: u32,
    pub cost: f64,
    pub multiplier: f64,
    pub duration_ms: u64,
}

impl Upgrade {
    pub fn permanent(cost: f64, multiplier: f64) -> Self {
        Self {
            level: 1,
            cost,
            multiplier,
            duration_ms: 0,
        }
    }

    pub fn timed(cost: f64, multiplier: f64, duration_ms: u64) -> Self {
        Self {
            level: 1,
            cost,
            multiplier,
            duration_ms,
        }
    }
}

/// One upgrade entity per kind.
#[derive(Clone, Debug, PartialEq)]
pub struct Upgrades {
    pub generator: Upgrade,
    pub multiplier: Upgrade,
    pub magnet: Upgrade,
    pub boost: Upgrade,
}

impl Upgrades {
    pub fn new() -> Self {
        Self {
            generator: Upgrade::permanent(10.0, 1.0),
            multiplier: Upgrade::permanent(25.0, 2.0),
            magnet: Upgrade::timed(50.0, 1.0, 5000),
            boost: Upgrade::timed(100.0, 3.0, 5000),
        }
    }

    pub fn get(&self, kind: UpgradeKind) -> &Upgrade {
        match kind {
            UpgradeKind::Generator => &self.generator,
            UpgradeKind::Multiplier => &self.multiplier,
            UpgradeKind::Magnet => &self.magnet,
            UpgradeKind::Boost => &self.boost,
        }
    }

    pub fn get_mut(&mut self, kind: UpgradeKind) -> &mut Upgrade {
        match kind {
            UpgradeKind::Generator => &mut self.generator,
            UpgradeKind::Multiplier => &mut self.multiplier,
            UpgradeKind::Magnet => &mut self.magnet,
            UpgradeKind::Boost => &mut self.boost,
        }
    }
}

/// Work queued on the scheduler.
#[derive(Clone, Debug, PartialEq)]
pub enum TimerTask {
    GeneratorTick,
    BoostExpired,
    MagnetExpired,
    BonusExpired(u32),
}

/// A collectible spawned by the magnet.
#[derive(Clone, Debug)]
pub struct BonusItem {
    pub id: u32,
    /// Horizontal position in percent of the bonus field (10..90).
    pub x_pct: u8,
    /// Vertical position in percent of the bonus field (10..90).
    pub y_pct: u8,
    /// The item's own expiry.
    pub expiry: TaskId,
}

/// Something the economy engine changed. Drained by the game after every
/// input and tick.
#[derive(Clone, Debug, PartialEq)]
pub enum EconomyEvent {
    CurrencyChanged { amount: f64 },
    Purchased(UpgradeKind),
    GeneratorArmed,
    BoostExpired,
    MagnetExpired { uncollected: usize },
    BonusCollected,
    BonusExpired,
    Reset,
}

impl EconomyEvent {
    /// Whether the event changed persisted data. A reset deletes the
    /// snapshot instead of rewriting it.
    pub fn needs_save(&self) -> bool {
        !matches!(self, EconomyEvent::BonusExpired | EconomyEvent::Reset)
    }
}

#[derive(Clone, Debug)]
pub struct ClickerLogEntry {
    pub text: String,
    pub is_important: bool,
}

/// Full state of an Idle Clicker game.
pub struct ClickerState {
    /// Spendable currency, never negative.
    pub currency: f64,
    /// Currency per manual action.
    pub per_action_yield: f64,
    pub magnet_active: bool,
    pub boost_active: bool,
    pub upgrades: Upgrades,
    /// Manual actions performed (stats).
    pub total_actions: u64,
    /// Everything ever gained (stats).
    pub currency_all_time: f64,

    /// Recurring generator task, owned by the economy engine.
    pub generator_task: Option<TaskId>,
    pub boost_task: Option<TaskId>,
    pub magnet_task: Option<TaskId>,
    pub timers: Scheduler<TimerTask>,
    pub bonus_items: Vec<BonusItem>,
    pub next_bonus_id: u32,
    pub events: Vec<EconomyEvent>,
    pub log: Vec<ClickerLogEntry>,
    pub rng_state: u32,
}

impl ClickerState {
    pub fn new() -> Self {
        Self {
            currency: 0.0,
            per_action_yield: 1.0,
            magnet_active: false,
            boost_active: false,
            upgrades: Upgrades::new(),
            total_actions: 0,
            currency_all_time: 0.0,
            generator_task: None,
            boost_task: None,
            magnet_task: None,
            timers: Scheduler::new(),
            bonus_items: Vec::new(),
            next_bonus_id: 0,
            events: Vec::new(),
            log: vec![ClickerLogEntry {
                text: "Idle Clicker へようこそ！".into(),
                is_important: true,
            }],
            rng_state: 42,
        }
    }

    pub fn can_afford(&self, kind: UpgradeKind) -> bool {
        self.currency >= self.upgrades.get(kind).cost
    }

    pub fn is_active(&self, kind: UpgradeKind) -> bool {
        match kind {
            UpgradeKind::Generator => self
                .generator_task
                .is_some_and(|id| self.timers.is_scheduled(id)),
            UpgradeKind::Multiplier => false,
            UpgradeKind::Magnet => self.magnet_active,
            UpgradeKind::Boost => self.boost_active,
        }
    }

    /// Currency granted by one generator tick.
    pub fn generator_yield(&self) -> f64 {
        self.per_action_yield * self.upgrades.generator.multiplier
    }

    /// Remaining milliseconds of a running timed upgrade.
    pub fn remaining_ms(&self, kind: UpgradeKind) -> Option<u64> {
        let task = match kind {
            UpgradeKind::Boost => self.boost_task?,
            UpgradeKind::Magnet => self.magnet_task?,
            _ => return None,
        };
        self.timers.remaining_ms(task)
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(ClickerLogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > LOG_CAPACITY {
            self.log.remove(0);
        }
    }

    /// xorshift32, only used for bonus placement.
    pub fn next_random(&mut self) -> u32 {
        let mut x = self.rng_state;
        if x == 0 {
            x = 0x9E37_79B9;
        }
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng_state = x;
        x
    }
}
