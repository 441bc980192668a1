//! Pure projection of [`ClickerState`] onto the values the UI shows.
//!
//! Rendering reads only a [`Display`], so everything the player sees
//! (texts, enabled flags) can be checked without a terminal.

use super::logic::format_number;
use super::state::{ClickerState, UpgradeKind};

/// One upgrade control.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeControl {
    pub kind: UpgradeKind,
    pub label: String,
    pub description: String,
    /// Level text for permanent upgrades.
    pub level: Option<String>,
    pub cost: String,
    /// Disabled whenever the balance is below the cost.
    pub enabled: bool,
    /// Seconds left while a timed upgrade runs.
    pub running_secs: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Display {
    pub currency: String,
    pub per_action: String,
    /// Generator output per second, `None` until the first purchase.
    pub per_second: Option<String>,
    pub generator_level: String,
    pub total_actions: String,
    pub currency_all_time: String,
    pub controls: Vec<UpgradeControl>,
    pub bonus_count: usize,
}

impl Display {
    pub fn project(state: &ClickerState) -> Self {
        let controls = UpgradeKind::all()
            .iter()
            .map(|&kind| {
                let upgrade = state.upgrades.get(kind);
                UpgradeControl {
                    kind,
                    label: kind.name().to_string(),
                    description: kind.description().to_string(),
                    level: (!kind.is_timed()).then(|| upgrade.level.to_string()),
                    cost: format_number(upgrade.cost),
                    enabled: state.can_afford(kind),
                    running_secs: state
                        .remaining_ms(kind)
                        .map(|ms| ms.div_ceil(1000)),
                }
            })
            .collect();

        Self {
            currency: format_number(state.currency),
            per_action: format_number(state.per_action_yield),
            per_second: state
                .generator_task
                .map(|_| format_number(state.generator_yield())),
            generator_level: state.upgrades.generator.level.to_string(),
            total_actions: format_number(state.total_actions as f64),
            currency_all_time: format_number(state.currency_all_time),
            controls,
            bonus_count: state.bonus_items.len(),
        }
    }

    pub fn control(&self, kind: UpgradeKind) -> &UpgradeControl {
        &self.controls[kind.index()]
    }
}
