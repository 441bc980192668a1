//! Idle Clicker: earn coins by hand, automate, and spend them on upgrades.

pub mod actions;
pub mod display;
pub mod logic;
pub mod render;
pub mod save;
pub mod state;
pub mod timers;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::games::Game;
use crate::input::{ClickState, InputEvent};

use actions::{
    BONUS_SLOT_SPAN, BUY_UPGRADE_BASE, COLLECT_BONUS_BASE, PRIMARY_ACTION, RESET_PROGRESS,
};
use save::{KeyValueStore, LoadError};
use state::{ClickerState, UpgradeKind};

pub struct ClickerGame {
    pub state: ClickerState,
    store: Box<dyn KeyValueStore>,
}

impl ClickerGame {
    /// A fresh game writing through to `store`.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            state: ClickerState::new(),
            store,
        }
    }

    /// Restore from `store`, falling back to a fresh game on any load error.
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let mut game = Self::new(store);
        match save::load_game(game.store.as_mut(), &mut game.state) {
            Ok(()) => {
                log::info!("restored saved game");
                game.state.add_log("セーブデータを読み込みました", false);
            }
            Err(LoadError::Missing) => log::info!("no saved game, starting fresh"),
            Err(e) => log::warn!("{e}; starting a new game"),
        }
        // Restoring re-arms timers; nothing new to persist yet.
        game.state.events.clear();
        game
    }

    /// Seed bonus placement.
    pub fn seed(&mut self, seed: u32) {
        self.state.rng_state = seed;
    }

    fn handle_key(&mut self, key: char) -> bool {
        match key {
            'c' | ' ' => {
                logic::primary_action(&mut self.state);
                true
            }
            'b' => {
                if let Some(id) = self.state.bonus_items.first().map(|b| b.id) {
                    logic::collect_bonus(&mut self.state, id);
                }
                true
            }
            'R' => {
                self.reset();
                true
            }
            _ => match UpgradeKind::from_key(key) {
                Some(kind) => {
                    logic::purchase(&mut self.state, kind);
                    true
                }
                None => false,
            },
        }
    }

    fn handle_click(&mut self, action_id: u16) -> bool {
        match action_id {
            PRIMARY_ACTION => {
                logic::primary_action(&mut self.state);
                true
            }
            RESET_PROGRESS => {
                self.reset();
                true
            }
            id if (BUY_UPGRADE_BASE..BUY_UPGRADE_BASE + 4).contains(&id) => {
                let kind = UpgradeKind::all()[(id - BUY_UPGRADE_BASE) as usize];
                logic::purchase(&mut self.state, kind);
                true
            }
            id if (COLLECT_BONUS_BASE..COLLECT_BONUS_BASE + BONUS_SLOT_SPAN).contains(&id) => {
                let slot = (id - COLLECT_BONUS_BASE) as u32;
                let target = self
                    .state
                    .bonus_items
                    .iter()
                    .find(|b| b.id % BONUS_SLOT_SPAN as u32 == slot)
                    .map(|b| b.id);
                if let Some(bonus_id) = target {
                    logic::collect_bonus(&mut self.state, bonus_id);
                }
                true
            }
            _ => false,
        }
    }

    fn reset(&mut self) {
        logic::reset_progress(&mut self.state);
        if let Err(e) = save::delete_save(self.store.as_mut()) {
            log::warn!("could not delete saved game: {e}");
        }
    }

    /// React to everything the engine changed: write through to storage once
    /// if any event touched persisted data.
    fn flush_events(&mut self) {
        let events = std::mem::take(&mut self.state.events);
        if events.iter().any(|e| e.needs_save()) {
            if let Err(e) = save::save_game(self.store.as_mut(), &self.state) {
                log::warn!("autosave failed: {e}");
            }
        }
    }
}

impl Game for ClickerGame {
    fn handle_input(&mut self, event: &InputEvent) -> bool {
        let consumed = match event {
            InputEvent::Key(c) => self.handle_key(*c),
            InputEvent::Click(id) => self.handle_click(*id),
        };
        self.flush_events();
        consumed
    }

    fn tick(&mut self, delta_ticks: u32) {
        logic::tick(&mut self.state, delta_ticks);
        self.flush_events();
    }

    fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(&self.state, f, area, click_state);
    }
}
