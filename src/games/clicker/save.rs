//! Idle Clicker セーブ/ロード機能。
//!
//! ## バージョニング方針
//!
//! - `SAVE_VERSION`: 現在のセーブ形式バージョン。フィールド追加時にインクリメントする。
//! - `MIN_COMPATIBLE_VERSION`: 互換性を維持できる最小バージョン。
//!   既存フィールドの意味変更や削除など破壊的変更を行った場合のみインクリメントする。
//!
//! 欠けているフィールドは `ClickerState::new()` の値で補完される
//! （デフォルト状態の上にセーブデータをマージする）。
//!
//! タイマーハンドルとボーナスコインは保存しない。ロード後にレベルとフラグから
//! タイマーを再構築する。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logic;
use super::state::{ClickerState, Upgrade, UpgradeKind};

/// セーブデータのフォーマットバージョン。
const SAVE_VERSION: u32 = 1;

/// 互換性を維持できる最小バージョン。
const MIN_COMPATIBLE_VERSION: u32 = 1;

/// localStorage のキー。
pub const STORAGE_KEY: &str = "idle_clicker_save";

#[derive(Debug, Error)]
#[error("storage unavailable: {0}")]
pub struct StorageError(pub String);

/// Flat string key-value store (`localStorage` in the browser).
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests and for browsers without `localStorage`.
#[derive(Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

/// `window.localStorage`.
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError(format!("{e:?}")))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError(format!("{e:?}")))
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage
            .remove_item(key)
            .map_err(|e| StorageError(format!("{e:?}")))
    }
}

/// The store the game should use: `localStorage`, or memory when the
/// browser refuses access (private mode, disabled storage).
pub fn browser_store() -> Box<dyn KeyValueStore> {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(store) = LocalStorage::open() {
            return Box::new(store);
        }
        log::warn!("localStorage unavailable, progress will not survive a reload");
    }
    Box::new(MemoryStore::new())
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no saved game")]
    Missing,
    #[error("saved game is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("saved game version {saved} is older than {min_compatible}")]
    Incompatible { saved: u32, min_compatible: u32 },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// シリアライズ用のセーブデータ構造体。
#[derive(Serialize, Deserialize)]
struct SaveData {
    version: u32,
    game: GameSave,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
struct UpgradeSave {
    level: u32,
    cost: f64,
    multiplier: f64,
    duration_ms: u64,
}

/// 読み込み時のアップグレード。欠けたフィールドは種類ごとのデフォルトで補う。
#[derive(Deserialize, Default)]
#[serde(default)]
struct PartialUpgradeSave {
    level: Option<u32>,
    cost: Option<f64>,
    multiplier: Option<f64>,
    duration_ms: Option<u64>,
}

impl PartialUpgradeSave {
    fn merge_over(self, base: UpgradeSave) -> UpgradeSave {
        UpgradeSave {
            level: self.level.unwrap_or(base.level),
            cost: self.cost.unwrap_or(base.cost),
            multiplier: self.multiplier.unwrap_or(base.multiplier),
            duration_ms: self.duration_ms.unwrap_or(base.duration_ms),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct PartialUpgradesSave {
    generator: PartialUpgradeSave,
    multiplier: PartialUpgradeSave,
    magnet: PartialUpgradeSave,
    boost: PartialUpgradeSave,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(from = "PartialUpgradesSave")]
struct UpgradesSave {
    generator: UpgradeSave,
    multiplier: UpgradeSave,
    magnet: UpgradeSave,
    boost: UpgradeSave,
}

impl From<PartialUpgradesSave> for UpgradesSave {
    fn from(partial: PartialUpgradesSave) -> Self {
        let base = UpgradesSave::default();
        Self {
            generator: partial.generator.merge_over(base.generator),
            multiplier: partial.multiplier.merge_over(base.multiplier),
            magnet: partial.magnet.merge_over(base.magnet),
            boost: partial.boost.merge_over(base.boost),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
struct GameSave {
    currency: f64,
    per_action_yield: f64,
    magnet_active: bool,
    boost_active: bool,
    total_actions: u64,
    currency_all_time: f64,
    upgrades: UpgradesSave,
}

impl From<&Upgrade> for UpgradeSave {
    fn from(u: &Upgrade) -> Self {
        Self {
            level: u.level,
            cost: u.cost,
            multiplier: u.multiplier,
            duration_ms: u.duration_ms,
        }
    }
}

impl From<&UpgradeSave> for Upgrade {
    fn from(u: &UpgradeSave) -> Self {
        Self {
            level: u.level,
            cost: u.cost,
            multiplier: u.multiplier,
            duration_ms: u.duration_ms,
        }
    }
}

// 欠けたフィールドはデフォルトのゲーム状態から補う。
impl Default for GameSave {
    fn default() -> Self {
        extract_save(&ClickerState::new()).game
    }
}

impl Default for UpgradesSave {
    fn default() -> Self {
        GameSave::default().upgrades
    }
}

/// ClickerState からセーブ用データを抽出する。
fn extract_save(state: &ClickerState) -> SaveData {
    SaveData {
        version: SAVE_VERSION,
        game: GameSave {
            currency: state.currency,
            per_action_yield: state.per_action_yield,
            magnet_active: state.magnet_active,
            boost_active: state.boost_active,
            total_actions: state.total_actions,
            currency_all_time: state.currency_all_time,
            upgrades: UpgradesSave {
                generator: (&state.upgrades.generator).into(),
                multiplier: (&state.upgrades.multiplier).into(),
                magnet: (&state.upgrades.magnet).into(),
                boost: (&state.upgrades.boost).into(),
            },
        },
    }
}

/// セーブデータを ClickerState に復元し、タイマーを再構築する。
fn apply_save(state: &mut ClickerState, save: &GameSave) {
    state.currency = save.currency.max(0.0);
    state.per_action_yield = save.per_action_yield;
    state.magnet_active = save.magnet_active;
    state.boost_active = save.boost_active;
    state.total_actions = save.total_actions;
    state.currency_all_time = save.currency_all_time;
    state.upgrades.generator = (&save.upgrades.generator).into();
    state.upgrades.multiplier = (&save.upgrades.multiplier).into();
    state.upgrades.magnet = (&save.upgrades.magnet).into();
    state.upgrades.boost = (&save.upgrades.boost).into();

    // タイマーハンドルは保存されないのでレベルから復元する。
    if state.upgrades.generator.level > 1 {
        logic::start_generator(state);
    }
    logic::resume_timed(state, UpgradeKind::Boost);
    logic::resume_timed(state, UpgradeKind::Magnet);
}

/// ゲーム状態をストアに保存する。
pub fn save_game(store: &mut dyn KeyValueStore, state: &ClickerState) -> Result<(), SaveError> {
    let json = serde_json::to_string(&extract_save(state))?;
    store.set_item(STORAGE_KEY, &json)?;
    Ok(())
}

/// ストアからゲーム状態を復元する。
///
/// エラー時は `state` に一切触れない。壊れたデータと互換性のないデータは削除する。
pub fn load_game(store: &mut dyn KeyValueStore, state: &mut ClickerState) -> Result<(), LoadError> {
    let json = store.get_item(STORAGE_KEY)?.ok_or(LoadError::Missing)?;

    let save_data: SaveData = match serde_json::from_str(&json) {
        Ok(d) => d,
        Err(e) => {
            let _ = store.remove_item(STORAGE_KEY);
            return Err(e.into());
        }
    };

    if save_data.version < MIN_COMPATIBLE_VERSION {
        let _ = store.remove_item(STORAGE_KEY);
        return Err(LoadError::Incompatible {
            saved: save_data.version,
            min_compatible: MIN_COMPATIBLE_VERSION,
        });
    }

    if save_data.version < SAVE_VERSION {
        log::info!(
            "migrating save data (saved={}, current={})",
            save_data.version,
            SAVE_VERSION
        );
    }

    apply_save(state, &save_data.game);
    Ok(())
}

/// セーブデータを削除する。
pub fn delete_save(store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
    store.remove_item(STORAGE_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved_json(store: &MemoryStore) -> String {
        store.get_item(STORAGE_KEY).unwrap().unwrap()
    }

    #[test]
    fn save_then_load_roundtrip() {
        let mut original = ClickerState::new();
        original.currency = 12345.5;
        original.per_action_yield = 8.0;
        original.total_actions = 42;
        original.currency_all_time = 99999.0;
        original.upgrades.generator.level = 4;
        original.upgrades.generator.cost = 80.0;
        original.upgrades.multiplier.level = 3;
        original.upgrades.multiplier.cost = 100.0;

        let mut store = MemoryStore::new();
        save_game(&mut store, &original).unwrap();

        let mut restored = ClickerState::new();
        load_game(&mut store, &mut restored).unwrap();

        assert_eq!(restored.currency, 12345.5);
        assert_eq!(restored.per_action_yield, 8.0);
        assert_eq!(restored.total_actions, 42);
        assert_eq!(restored.currency_all_time, 99999.0);
        assert_eq!(restored.upgrades, original.upgrades);
        assert!(restored.generator_task.is_some());
    }

    #[test]
    fn timer_handles_are_not_persisted() {
        let mut state = ClickerState::new();
        state.currency = 10.0;
        logic::purchase(&mut state, UpgradeKind::Generator);
        let mut store = MemoryStore::new();
        save_game(&mut store, &state).unwrap();
        let json = saved_json(&store);
        assert!(!json.contains("task"));
        assert!(!json.contains("bonus_items"));
        assert!(json.contains("\"version\":1"));
    }

    #[test]
    fn fresh_level_does_not_arm_generator() {
        let mut store = MemoryStore::new();
        save_game(&mut store, &ClickerState::new()).unwrap();
        let mut state = ClickerState::new();
        load_game(&mut store, &mut state).unwrap();
        assert!(state.generator_task.is_none());
        assert_eq!(state.timers.pending(), 0);
    }

    #[test]
    fn restored_generator_produces() {
        let mut store = MemoryStore::new();
        let mut saved = ClickerState::new();
        saved.upgrades.generator.level = 2;
        save_game(&mut store, &saved).unwrap();

        let mut state = ClickerState::new();
        load_game(&mut store, &mut state).unwrap();
        logic::tick(&mut state, 10);
        assert_eq!(state.currency, 1.0);
    }

    #[test]
    fn restored_boost_reverts_after_duration() {
        let mut state = ClickerState::new();
        state.currency = 100.0;
        logic::purchase(&mut state, UpgradeKind::Boost);
        let mut store = MemoryStore::new();
        save_game(&mut store, &state).unwrap();

        let mut restored = ClickerState::new();
        load_game(&mut store, &mut restored).unwrap();
        assert!(restored.boost_active);
        assert_eq!(restored.per_action_yield, 3.0);
        logic::tick(&mut restored, 50);
        assert!(!restored.boost_active);
        assert!((restored.per_action_yield - 1.0).abs() < 1e-9);
    }

    #[test]
    fn missing_slot_keeps_defaults() {
        let mut store = MemoryStore::new();
        let mut state = ClickerState::new();
        assert!(matches!(load_game(&mut store, &mut state), Err(LoadError::Missing)));
        assert_eq!(state.currency, 0.0);
    }

    #[test]
    fn malformed_slot_is_discarded() {
        let mut store = MemoryStore::new();
        store.set_item(STORAGE_KEY, "{not json").unwrap();
        let mut state = ClickerState::new();
        assert!(matches!(
            load_game(&mut store, &mut state),
            Err(LoadError::Malformed(_))
        ));
        assert_eq!(state.currency, 0.0);
        assert_eq!(store.get_item(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn incompatible_version_is_rejected() {
        let mut store = MemoryStore::new();
        store
            .set_item(STORAGE_KEY, r#"{"version":0,"game":{"currency":500.0}}"#)
            .unwrap();
        let mut state = ClickerState::new();
        assert!(matches!(
            load_game(&mut store, &mut state),
            Err(LoadError::Incompatible { saved: 0, .. })
        ));
        assert_eq!(state.currency, 0.0);
        assert_eq!(store.get_item(STORAGE_KEY).unwrap(), None);
    }

    /// 欠けたフィールドはデフォルト値のまま。
    #[test]
    fn partial_save_merges_over_defaults() {
        let mut store = MemoryStore::new();
        store
            .set_item(
                STORAGE_KEY,
                r#"{"version":1,"game":{"currency":77.0,"future_unknown_field":true}}"#,
            )
            .unwrap();
        let mut state = ClickerState::new();
        load_game(&mut store, &mut state).unwrap();
        assert_eq!(state.currency, 77.0);
        assert_eq!(state.per_action_yield, 1.0);
        assert_eq!(state.upgrades.generator.cost, 10.0);
        assert_eq!(state.upgrades.boost.multiplier, 3.0);
        assert_eq!(state.upgrades.magnet.duration_ms, 5000);
    }

    /// アップグレードの一部だけが保存されていても、残りはその種類のデフォルト。
    #[test]
    fn partial_upgrade_entry_keeps_its_own_defaults() {
        let mut store = MemoryStore::new();
        store
            .set_item(
                STORAGE_KEY,
                r#"{"version":1,"game":{"upgrades":{"generator":{"level":3},"boost":{"cost":400.0}}}}"#,
            )
            .unwrap();
        let mut state = ClickerState::new();
        load_game(&mut store, &mut state).unwrap();

        assert_eq!(state.upgrades.generator.level, 3);
        assert_eq!(state.upgrades.generator.cost, 10.0);
        assert_eq!(state.upgrades.generator.multiplier, 1.0);
        assert_eq!(state.upgrades.boost.cost, 400.0);
        assert_eq!(state.upgrades.boost.multiplier, 3.0);
        assert_eq!(state.upgrades.boost.duration_ms, 5000);
        assert_eq!(state.upgrades.multiplier, ClickerState::new().upgrades.multiplier);

        // 0 コインでは買えず、購入後のコストは倍になる。
        assert!(!logic::purchase(&mut state, UpgradeKind::Generator));
        state.currency = 10.0;
        assert!(logic::purchase(&mut state, UpgradeKind::Generator));
        assert_eq!(state.upgrades.generator.cost, 20.0);
    }

    #[test]
    fn delete_save_clears_slot() {
        let mut store = MemoryStore::new();
        save_game(&mut store, &ClickerState::new()).unwrap();
        delete_save(&mut store).unwrap();
        assert_eq!(store.get_item(STORAGE_KEY).unwrap(), None);
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get_item(&self, _: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError("denied".into()))
        }
        fn set_item(&mut self, _: &str, _: &str) -> Result<(), StorageError> {
            Err(StorageError("quota".into()))
        }
        fn remove_item(&mut self, _: &str) -> Result<(), StorageError> {
            Err(StorageError("denied".into()))
        }
    }

    #[test]
    fn storage_failures_surface_as_errors() {
        let mut state = ClickerState::new();
        assert!(matches!(
            save_game(&mut BrokenStore, &state),
            Err(SaveError::Storage(_))
        ));
        assert!(matches!(
            load_game(&mut BrokenStore, &mut state),
            Err(LoadError::Storage(_))
        ));
    }
}
