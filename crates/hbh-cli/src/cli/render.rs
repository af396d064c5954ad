//! Plain-text rendering of the popup view.

use hbh_core::controller::{PopupView, StatusKind};

pub fn print_view(view: &PopupView) {
    if let Some(name) = &view.bundle_name {
        println!("Bundle: {}", name);
        println!(
            "Items:  {}  (PDF: {}, EPUB: {})",
            view.counts.items, view.counts.pdf, view.counts.epub
        );
    }
    if let Some(status) = &view.status {
        let tag = match status.kind {
            StatusKind::Info => "note",
            StatusKind::Warning => "warning",
            StatusKind::Error => "error",
        };
        println!("{}: {}", tag, status.text);
    }
    if let Some(tally) = &view.tally {
        println!("{}", tally);
    }
    if let Some(error) = &view.error {
        eprintln!("error: {}", error);
    }
}
