#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use winit::event_loop::EventLoop;

use crate::app::{App, AppMessage};

mod app;
mod logging;
mod utils;

fn run() -> anyhow::Result<()> {
    #[cfg(target_os = "linux")]
    tracing::warn!("Tray menus need a running GTK main loop on Linux, clicks may not arrive");

    let evl = EventLoop::<AppMessage>::with_user_event().build()?;

    let proxy = evl.create_proxy();
    muda::MenuEvent::set_event_handler(Some(move |e| {
        if let Err(e) = proxy.send_event(AppMessage::MenuEvent(e)) {
            tracing::error!("Failed to send `AppMessage::MenuEvent`: {e}")
        }
    }));

    let mut app = App::new(evl.create_proxy())?;
    evl.run_app(&mut app)?;

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let log_guard = logging::init()?;

    std::panic::set_hook(Box::new(|info| {
        utils::error_dialog(info);
        tracing::error!("{info}");
    }));

    if let Err(e) = run() {
        utils::error_dialog(&e);
        tracing::error!("{e}");
        // exit skips destructors, flush the file log first
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}
