use tray_icon::{TrayIcon, TrayIconBuilder};
use tray_menu::{Config, ItemId, MenuDescription, MenuTree, NativeMenu};
use winit::application::ApplicationHandler;
use winit::event::{StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoopProxy};
use winit::window::WindowId;

const DEFAULT_MENU: &str = include_str!("default_menu.json");
const DEFAULT_QUIT_ITEM: ItemId = ItemId(6);

#[derive(Debug, Clone)]
pub enum AppMessage {
    MenuEvent(muda::MenuEvent),
    ItemClicked(ItemId),
}

pub struct App {
    tree: MenuTree,
    native_menu: NativeMenu,
    tray_icon: Option<TrayIcon>,
    quit_item: Option<ItemId>,
}

impl App {
    pub fn new(proxy: EventLoopProxy<AppMessage>) -> anyhow::Result<Self> {
        let config = Config::load()?;

        let (description, quit_item) = match config.load_menu()? {
            Some(description) => (description, config.quit_item),
            None => (
                MenuDescription::from_json(DEFAULT_MENU)?,
                config.quit_item.or(Some(DEFAULT_QUIT_ITEM)),
            ),
        };

        let mut tree = MenuTree::from_description(&description, &config.icon_resolver());
        tree.set_on_click(move |id| {
            if let Err(e) = proxy.send_event(AppMessage::ItemClicked(id)) {
                tracing::error!("Failed to send `AppMessage::ItemClicked`: {e}")
            }
        });

        let native_menu = NativeMenu::new(&tree)?;

        Ok(Self {
            tree,
            native_menu,
            tray_icon: None,
            quit_item,
        })
    }

    fn create_tray_icon(&mut self) -> anyhow::Result<()> {
        let icon = tray_icon::Icon::from_rgba(dot_icon(32), 32, 32)?;

        let tray_icon = TrayIconBuilder::new()
            .with_icon(icon)
            .with_tooltip(env!("CARGO_PKG_NAME"))
            .with_menu(Box::new(self.native_menu.menu().clone()))
            .build()?;

        self.tray_icon.replace(tray_icon);

        Ok(())
    }

    fn handle_message(&mut self, event_loop: &ActiveEventLoop, message: AppMessage) {
        match message {
            AppMessage::MenuEvent(event) => {
                if self.native_menu.dispatch(&self.tree, &event).is_none() {
                    tracing::debug!("Ignoring menu event {:?}", event.id());
                }
            }
            AppMessage::ItemClicked(id) => {
                let label = self.tree.find(id).map(|entry| entry.label()).unwrap_or_default();
                tracing::info!("Clicked menu item {id} ({label})");

                if Some(id) == self.quit_item {
                    event_loop.exit();
                }
            }
        }
    }
}

impl ApplicationHandler<AppMessage> for App {
    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        // the tray icon must be created once the event loop is running on macOS
        if cause == StartCause::Init {
            if let Err(e) = self.create_tray_icon() {
                tracing::error!("Failed to create tray icon: {e}");
            }
        }
    }

    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, _: WindowEvent) {}

    fn user_event(&mut self, event_loop: &ActiveEventLoop, message: AppMessage) {
        self.handle_message(event_loop, message);
    }
}

/// A filled circle on a transparent background.
fn dot_icon(size: u32) -> Vec<u8> {
    let center = (size as f32 - 1.0) / 2.0;
    let radius = size as f32 / 2.5;

    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let distance = ((x as f32 - center).powi(2) + (y as f32 - center).powi(2)).sqrt();
            let alpha = if distance <= radius { 255 } else { 0 };
            rgba.extend_from_slice(&[40, 40, 40, alpha]);
        }
    }
    rgba
}
