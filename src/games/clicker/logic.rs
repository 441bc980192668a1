//! Idle Clicker economy engine: free functions over [`ClickerState`].
//!
//! Every mutation pushes an [`EconomyEvent`]; the caller drains them to
//! persist and log. Nothing here touches the DOM or storage.

use super::state::{
    BonusItem, ClickerState, EconomyEvent, TimerTask, UpgradeKind, BONUS_ITEM_COUNT,
    BONUS_ITEM_VALUE, GENERATOR_INTERVAL_MS,
};

/// Game time covered by one tick (10 ticks/sec).
pub const MS_PER_TICK: u64 = 100;

/// Add `amount` to the balance. Negative amounts are ignored.
pub fn apply_gain(state: &mut ClickerState, amount: f64) {
    if amount.is_nan() || amount < 0.0 {
        log::debug!("ignoring invalid gain {amount}");
        return;
    }
    state.currency += amount;
    state.currency_all_time += amount;
    state.events.push(EconomyEvent::CurrencyChanged { amount });
}

/// Manual action on the primary control.
pub fn primary_action(state: &mut ClickerState) {
    state.total_actions += 1;
    let amount = state.per_action_yield;
    apply_gain(state, amount);
}

/// Try to buy an upgrade. Returns true if successful.
///
/// Insufficient funds or an already running timed upgrade leave the state
/// untouched.
pub fn purchase(state: &mut ClickerState, kind: UpgradeKind) -> bool {
    let cost = state.upgrades.get(kind).cost;
    if state.currency < cost {
        log::debug!("{:?}: cannot afford {} (have {})", kind, cost, state.currency);
        return false;
    }
    if kind.is_timed() && state.is_active(kind) {
        log::debug!("{:?}: already active", kind);
        return false;
    }

    state.currency -= cost;

    match kind {
        UpgradeKind::Generator | UpgradeKind::Multiplier => {
            let upgrade = state.upgrades.get_mut(kind);
            upgrade.level += 1;
            upgrade.cost *= 2.0;
            let (level, factor) = (upgrade.level, upgrade.multiplier);
            if kind == UpgradeKind::Generator {
                start_generator(state);
            } else {
                state.per_action_yield *= factor;
            }
            state.add_log(
                &format!("{} を購入！ (Lv {})", kind.name(), level),
                false,
            );
        }
        UpgradeKind::Boost => {
            let (factor, duration) = (state.upgrades.boost.multiplier, state.upgrades.boost.duration_ms);
            state.per_action_yield *= factor;
            state.boost_active = true;
            state.boost_task = Some(state.timers.schedule_once(duration, TimerTask::BoostExpired));
            state.add_log(
                &format!("⚡ {} 発動！ ({}秒)", kind.name(), duration / 1000),
                true,
            );
        }
        UpgradeKind::Magnet => {
            let duration = state.upgrades.magnet.duration_ms;
            state.magnet_active = true;
            // Armed before the items so it fires first and clears them.
            state.magnet_task = Some(state.timers.schedule_once(duration, TimerTask::MagnetExpired));
            for _ in 0..BONUS_ITEM_COUNT {
                spawn_bonus_item(state, duration);
            }
            state.add_log(
                &format!("🧲 {} 発動！ ボーナスコインを集めよう", kind.name()),
                true,
            );
        }
    }

    state.events.push(EconomyEvent::Purchased(kind));
    true
}

/// (Re)arm the recurring generator tick, cancelling any previous one so that
/// exactly one tick is ever scheduled.
pub fn start_generator(state: &mut ClickerState) {
    if let Some(previous) = state.generator_task.take() {
        state.timers.cancel(previous);
    }
    let id = state
        .timers
        .schedule_every(GENERATOR_INTERVAL_MS, TimerTask::GeneratorTick);
    state.generator_task = Some(id);
    state.events.push(EconomyEvent::GeneratorArmed);
}

/// Re-arm the expiry of a timed upgrade restored from a snapshot.
pub fn resume_timed(state: &mut ClickerState, kind: UpgradeKind) {
    match kind {
        UpgradeKind::Boost if state.boost_active && state.boost_task.is_none() => {
            let duration = state.upgrades.boost.duration_ms;
            state.boost_task = Some(state.timers.schedule_once(duration, TimerTask::BoostExpired));
        }
        UpgradeKind::Magnet if state.magnet_active && state.magnet_task.is_none() => {
            let duration = state.upgrades.magnet.duration_ms;
            state.magnet_task = Some(state.timers.schedule_once(duration, TimerTask::MagnetExpired));
        }
        _ => {}
    }
}

fn spawn_bonus_item(state: &mut ClickerState, duration_ms: u64) {
    let id = state.next_bonus_id;
    state.next_bonus_id = state.next_bonus_id.wrapping_add(1);
    // 10%..90% keeps items clear of the field's edges.
    let x_pct = 10 + (state.next_random() % 81) as u8;
    let y_pct = 10 + (state.next_random() % 81) as u8;
    let expiry = state
        .timers
        .schedule_once(duration_ms, TimerTask::BonusExpired(id));
    state.bonus_items.push(BonusItem {
        id,
        x_pct,
        y_pct,
        expiry,
    });
}

/// Collect a bonus item by id. Returns false if it is already gone.
pub fn collect_bonus(state: &mut ClickerState, id: u32) -> bool {
    let idx = match state.bonus_items.iter().position(|b| b.id == id) {
        Some(i) => i,
        None => return false,
    };
    let item = state.bonus_items.remove(idx);
    state.timers.cancel(item.expiry);
    apply_gain(state, BONUS_ITEM_VALUE);
    state.events.push(EconomyEvent::BonusCollected);
    true
}

/// Advance the game by `delta_ticks` ticks, firing every task that falls due.
pub fn tick(state: &mut ClickerState, delta_ticks: u32) {
    if delta_ticks == 0 {
        return;
    }
    let deadline = state.timers.now_ms() + delta_ticks as u64 * MS_PER_TICK;
    while let Some((_, task)) = state.timers.pop_due(deadline) {
        run_task(state, task);
    }
    state.timers.advance_to(deadline);
}

fn run_task(state: &mut ClickerState, task: TimerTask) {
    match task {
        TimerTask::GeneratorTick => {
            let amount = state.generator_yield();
            apply_gain(state, amount);
        }
        TimerTask::BoostExpired => {
            state.per_action_yield /= state.upgrades.boost.multiplier;
            state.boost_active = false;
            state.boost_task = None;
            state.add_log(&format!("  {} 終了", UpgradeKind::Boost.name()), false);
            state.events.push(EconomyEvent::BoostExpired);
        }
        TimerTask::MagnetExpired => {
            let uncollected = state.bonus_items.len();
            for item in state.bonus_items.drain(..) {
                state.timers.cancel(item.expiry);
            }
            state.magnet_active = false;
            state.magnet_task = None;
            let text = if uncollected > 0 {
                format!("  {} 終了 ({}枚取り逃し)", UpgradeKind::Magnet.name(), uncollected)
            } else {
                format!("  {} 終了", UpgradeKind::Magnet.name())
            };
            state.add_log(&text, false);
            state.events.push(EconomyEvent::MagnetExpired { uncollected });
        }
        TimerTask::BonusExpired(id) => {
            let before = state.bonus_items.len();
            state.bonus_items.retain(|b| b.id != id);
            if state.bonus_items.len() != before {
                state.events.push(EconomyEvent::BonusExpired);
            }
        }
    }
}

/// Wipe all progress: cancel every timer, drop bonus items, restore defaults.
/// The message log survives.
pub fn reset_progress(state: &mut ClickerState) {
    // The scheduler survives so its clock and task ids stay monotonic.
    let mut timers = std::mem::take(&mut state.timers);
    log::info!("reset: cancelling {} timers", timers.pending());
    timers.clear();
    *state = ClickerState {
        timers,
        log: std::mem::take(&mut state.log),
        rng_state: state.rng_state,
        ..ClickerState::new()
    };
    state.add_log("進行状況をリセットしました", true);
    state.events.push(EconomyEvent::Reset);
}

/// Format a number with commas (e.g. 1234567 → "1,234,567").
pub fn format_number(n: f64) -> String {
    if n < 0.0 {
        return format!("-{}", format_number(-n));
    }
    let scaled = (n * 10.0).round() as u64;
    let (whole, tenths) = (scaled / 10, scaled % 10);

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if tenths > 0 {
        format!("{}.{}", grouped, tenths)
    } else {
        grouped
    }
}
