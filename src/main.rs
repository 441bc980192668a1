mod games;
mod input;
mod logging;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};

use games::clicker::logic::MS_PER_TICK;
use games::clicker::{save, ClickerGame};
use games::Game;
use input::{ClickState, InputEvent};
use time::GameClock;

/// Resolve a mouse position to a click action via the grid container's
/// bounding rect.
fn dom_hit_test(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<u16> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let click_x = mouse_x as f64 - rect.left();
    let click_y = mouse_y as f64 - rect.top();
    let action = cs.hit_test_pixels(click_x, click_y, rect.width(), rect.height());
    log::debug!(
        "click at ({}, {}) -> {:?} ({} targets)",
        mouse_x,
        mouse_y,
        action,
        cs.targets.len()
    );
    action
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);

    let mut game = ClickerGame::load(save::browser_store());
    game.seed(js_sys::Date::now() as u32);
    let game = Rc::new(RefCell::new(game));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let action = {
                let cs = click_state.borrow();
                if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                    return;
                }
                dom_hit_test(mouse_event.x, mouse_event.y, &cs)
            };

            if let Some(action_id) = action {
                game.borrow_mut()
                    .handle_input(&InputEvent::Click(action_id));
            }
        }
    });

    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let KeyCode::Char(c) = key_event.code {
                game.borrow_mut().handle_input(&InputEvent::Key(c));
            }
        }
    });

    let clock = RefCell::new(GameClock::new(MS_PER_TICK));
    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            let ticks = clock.borrow_mut().update(now_ms());
            if ticks > 0 {
                game.borrow_mut().tick(ticks);
            }

            let size = f.area();
            {
                let mut cs = click_state.borrow_mut();
                cs.terminal_cols = size.width;
                cs.terminal_rows = size.height;
                cs.clear_targets();
            }

            game.borrow().render(f, size, &click_state);
        }
    });

    Ok(())
}
