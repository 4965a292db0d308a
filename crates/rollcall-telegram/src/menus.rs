//! Inline menus and their callback tags.

use rollcall_models::AttendanceStatus;

use crate::reply::{Button, Keyboard};

/// Callback tags of every button the bot renders.
pub mod tags {
    pub const MAIN_MENU: &str = "main_menu";
    pub const ATTENDANCE: &str = "attendance";
    pub const WASHING_MACHINES: &str = "washing_machines";
    pub const ADMIN_MENU: &str = "admin_menu";

    pub const GENERATE_REPORT: &str = "generate_report";
    pub const ADD_ADMIN: &str = "add_admin";
    pub const LIST_ADMINS: &str = "list_admins";

    pub const CHECK_WASHING_MACHINES: &str = "check_washing_machines";
    pub const UPDATE_WASHING_MACHINES: &str = "update_washing_machines";
    pub const WASHING_AVAILABLE: &str = "washing_available";
    pub const WASHING_NOT_AVAILABLE: &str = "washing_not_available";
}

/// Maps a laundry status button to availability.
pub fn laundry_availability(tag: &str) -> Option<bool> {
    match tag {
        tags::WASHING_AVAILABLE => Some(true),
        tags::WASHING_NOT_AVAILABLE => Some(false),
        _ => None,
    }
}

fn back_to_main() -> Button {
    Button::new("Back to Main Menu", tags::MAIN_MENU)
}

/// Top-level menu. Admins get an extra entry.
pub fn main_menu(is_admin: bool) -> Keyboard {
    let mut buttons = vec![
        Button::new("Mark Attendance", tags::ATTENDANCE),
        Button::new("Washing Machines", tags::WASHING_MACHINES),
    ];
    if is_admin {
        buttons.push(Button::new("Admin Menu", tags::ADMIN_MENU));
    }
    Keyboard::column(buttons)
}

pub fn admin_menu() -> Keyboard {
    Keyboard::column([
        Button::new("Generate Report", tags::GENERATE_REPORT),
        Button::new("Add Admin", tags::ADD_ADMIN),
        Button::new("List Admins", tags::LIST_ADMINS),
        back_to_main(),
    ])
}

pub fn attendance_menu() -> Keyboard {
    Keyboard::column(
        AttendanceStatus::ALL
            .iter()
            .map(|status| Button::new(status.label(), status.button_tag())),
    )
}

pub fn laundry_menu() -> Keyboard {
    Keyboard::column([
        Button::new("Check Availability", tags::CHECK_WASHING_MACHINES),
        Button::new("Update Status", tags::UPDATE_WASHING_MACHINES),
        back_to_main(),
    ])
}

pub fn laundry_status_menu() -> Keyboard {
    Keyboard::column([
        Button::new("Available", tags::WASHING_AVAILABLE),
        Button::new("Not Available", tags::WASHING_NOT_AVAILABLE),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_entry_only_for_admins() {
        assert!(!main_menu(false).tags().contains(&tags::ADMIN_MENU));
        assert!(main_menu(true).tags().contains(&tags::ADMIN_MENU));
    }

    #[test]
    fn test_attendance_buttons_round_trip_to_statuses() {
        for tag in attendance_menu().tags() {
            assert!(AttendanceStatus::from_button_tag(tag).is_some());
        }
        assert_eq!(attendance_menu().rows.len(), 3);
    }

    #[test]
    fn test_laundry_status_buttons() {
        let menu = laundry_status_menu();
        let tags = menu.tags();
        assert_eq!(tags.len(), 2);
        assert_eq!(laundry_availability(tags[0]), Some(true));
        assert_eq!(laundry_availability(tags[1]), Some(false));
        assert_eq!(laundry_availability(tags::MAIN_MENU), None);
    }
}
