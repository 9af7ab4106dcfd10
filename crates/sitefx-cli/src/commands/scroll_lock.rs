use anyhow::{bail, Result};

use sitefx_core::headless::HeadlessPage;
use sitefx_core::page::{ScrollBehavior, ScrollPort};
use sitefx_core::scroll_lock::{InputEvent, ScrollLockTabController};
use sitefx_core::AppConfig;

/// Frame interval of the simulated page
const FRAME_MS: f64 = 16.0;

/// Native scroll step used to walk the page down to the section
const APPROACH_STEP: f64 = 120.0;

pub fn run(
    config: &AppConfig,
    tabs: usize,
    deltas: &[f64],
    touch: bool,
    fragment: Option<&str>,
) -> Result<()> {
    let lock = &config.scroll_lock;
    let bypass = lock.bypass_for(fragment, false);
    let Some(mut controller) = ScrollLockTabController::attach(HeadlessPage::new(tabs), lock, bypass)
    else {
        bail!("feature section needs at least one tab");
    };

    let mut now = 0.0;
    let mut last = describe(&controller);
    println!("{:>8}  {}", "start", last);

    // Scroll natively until the section locks or is passed
    let section_end = {
        let layout = controller.dom().layout();
        layout.section_top + layout.section_height
    };
    while !controller.session().is_locked() && controller.dom().scroll_y() < section_end {
        controller.dom_mut().scroll_by(APPROACH_STEP);
        controller.on_scroll();
        now += FRAME_MS;
        controller.on_frame(now);
        report(&controller, &mut last, &format!("y={}", controller.dom().scroll_y()));
    }

    if touch {
        controller.handle_input(InputEvent::TouchStart { y: 0.0 });
    }
    let mut finger = 0.0;
    for delta in deltas {
        let event = if touch {
            // Finger travel up scrolls content down
            finger -= delta;
            InputEvent::TouchMove { y: finger }
        } else {
            InputEvent::Wheel { delta_y: *delta }
        };

        let outcome = controller.handle_input(event);
        if !outcome.prevent_default {
            // Uncaptured input scrolls the page natively
            let y = controller.dom().scroll_y() + delta;
            controller.dom_mut().scroll_to(y, ScrollBehavior::Smooth);
            controller.on_scroll();
        }
        now += FRAME_MS;
        controller.on_frame(now);

        let label = format!("{}{:+}", if touch { "touch" } else { "wheel" }, delta);
        report(&controller, &mut last, &label);
    }

    // Let any pending panel reveal land
    now += lock.panel_reveal_delay_ms + FRAME_MS;
    controller.on_frame(now);
    report(&controller, &mut last, "settle");

    let page = controller.detach();
    println!(
        "\nactive tab {:?}, active panel {:?}, page at y={}",
        page.active_tabs(),
        page.active_panels(),
        page.scroll_y()
    );

    Ok(())
}

fn describe(controller: &ScrollLockTabController<HeadlessPage>) -> String {
    let session = controller.session();
    let buffer = session
        .scroll_buffer()
        .map(|b| format!(" buffer={}", b))
        .unwrap_or_default();
    format!(
        "{} tab={} panels={:?} completed={}{}",
        session.phase().name(),
        session.current_tab(),
        controller.dom().active_panels(),
        session.has_completed_once(),
        buffer
    )
}

fn report(controller: &ScrollLockTabController<HeadlessPage>, last: &mut String, label: &str) {
    let state = describe(controller);
    if state != *last {
        println!("{:>8}  {}", label, state);
        *last = state;
    }
}
