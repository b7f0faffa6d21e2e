// daemon.rs
use crate::api::TodoApi;
use crate::todo::{TodoItem, today};
use std::collections::HashSet;
use std::sync::Arc;
use std::{thread, time::Duration};

#[cfg(target_os = "linux")]
use notify_rust::Notification;

#[cfg(target_os = "windows")]
use notifica::notify;

#[cfg(target_os = "macos")]
use mac_notification_sys::send_notification;

const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Remembers which todos were already announced this run.
#[derive(Default)]
pub struct Reminders {
    notified: HashSet<String>,
}

impl Reminders {
    /// Incomplete items for `day` that have not been announced yet.
    pub fn due<'a>(&mut self, items: &'a [TodoItem], day: &str) -> Vec<&'a TodoItem> {
        items
            .iter()
            .filter(|t| !t.complete && t.day == day)
            .filter(|t| self.notified.insert(t.id.clone()))
            .collect()
    }
}

fn notify_due(todo: &TodoItem) -> Result<(), Box<dyn std::error::Error>> {
    let body = format!("\"{}\" is on for today! Don't forget!", todo.name);
    #[cfg(target_os = "linux")]
    Notification::new()
        .summary("Todo due today!")
        .body(&body)
        .show()?;
    #[cfg(target_os = "windows")]
    {
        let _ = notify("Todo List", &body);
    }
    #[cfg(target_os = "macos")]
    {
        send_notification("Todo List", None, &body, None)?;
    }
    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    log::info!("{}", body);
    Ok(())
}

pub fn start_daemon(api: Arc<dyn TodoApi>) {
    let mut reminders = Reminders::default();
    loop {
        let day = today();
        match api.fetch_by_day(day) {
            Ok(items) => {
                for todo in reminders.due(&items, day) {
                    if let Err(e) = notify_due(todo) {
                        log::warn!("reminder for {} failed: {}", todo.id, e);
                    }
                }
            }
            Err(e) => log::warn!("reminder poll for {} failed: {}", day, e),
        }
        thread::sleep(POLL_INTERVAL);
    }
}
