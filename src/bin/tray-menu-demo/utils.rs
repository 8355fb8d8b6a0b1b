use std::fmt::Display;

pub fn error_dialog<T: Display>(error: T) {
    rfd::MessageDialog::new()
        .set_title("tray-menu")
        .set_description(error.to_string())
        .set_level(rfd::MessageLevel::Error)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}
