use client_core::{DeleteOutcome, Notification, NotificationKind, SubmitOutcome};
use shared::domain::Contact;

pub fn contacts(contacts: &[Contact]) {
    if contacts.is_empty() {
        println!("(no contacts)");
        return;
    }
    for contact in contacts {
        println!("{}\t{} {}", contact.id, contact.name, contact.number);
    }
}

pub fn notification(notification: &Notification) {
    match notification.kind {
        NotificationKind::Success => println!("[ok] {}", notification.message),
        NotificationKind::Error => eprintln!("[error] {}", notification.message),
    }
}

pub fn submit_outcome(outcome: &SubmitOutcome) {
    if matches!(outcome, SubmitOutcome::Declined) {
        println!("nothing changed");
    }
}

pub fn delete_outcome(outcome: &DeleteOutcome, name: &str) {
    match outcome {
        DeleteOutcome::Deleted(_) => println!("deleted {name}"),
        DeleteOutcome::Declined => println!("nothing changed"),
        DeleteOutcome::Failed => {}
    }
}
