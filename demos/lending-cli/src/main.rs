//! Scripted walkthrough of the lending lifecycle.
//!
//! Signs a student in, borrows and returns lab equipment, exercises the
//! priority queue and undoes a few steps, printing what happens along the way.
//! Settings come from the environment (or a `.env` file), see
//! [`LendingConfig::from_env`].

use anyhow::Result;
use circuitlend_core::metrics::register_lending_metrics;
use circuitlend_core::{
    ItemId, LendingConfig, LendingController, LendingEnvironment, Requester, SortKey,
    StaticCatalog, SubmitOptions,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn lab_catalog() -> StaticCatalog {
    StaticCatalog::new([
        ("Breadboard", 10),
        ("DC Power Supply", 15),
        ("AC Power Supply", 15),
        ("Digital Multimeter", 10),
        ("AC Ammeter", 10),
        ("AC Voltmeter", 10),
        ("Analog Multimeter", 10),
        ("Resistors (10 Ω – 1 kΩ)", 100),
        ("Potentiometer", 10),
        ("Capacitors (0.1 µF – 100 µF)", 40),
        ("Inductors (10 mH – 1.389 H)", 10),
        ("Connecting Wires", 100),
        ("Alligator Clips", 10),
        ("Switches", 10),
    ])
}

fn item_names(items: &[ItemId]) -> String {
    items.iter().map(ItemId::as_str).collect::<Vec<_>>().join(", ")
}

fn print_stock(controller: &LendingController, items: &[&str]) {
    for item in items {
        println!("  {item:<28} {}", controller.availability_of(&ItemId::from(*item)));
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let config = LendingConfig::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("circuitlend_core={}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    register_lending_metrics();
    info!(cart_capacity = config.cart_capacity, "Configuration loaded");

    println!("=== CircuitLend ===\n");

    let mut controller =
        LendingController::from_catalog(&lab_catalog(), LendingEnvironment::default(), config);

    println!("Catalog by availability:");
    for item in controller.sorted_items(SortKey::Availability) {
        println!("  {item:<28} {}", controller.availability_of(&item));
    }

    // Browsing and cart edits need no session, submitting does
    controller.add_to_cart("Breadboard")?;
    if let Err(error) = controller.submit(SubmitOptions::new()) {
        println!("\nSubmitting without a session: {error}");
    }

    controller.sign_in(Requester::new("Theresa", "2026-00001", "theresa@school.edu"));
    println!("\nSigned in as Theresa");

    controller.add_to_cart("Digital Multimeter")?;
    let receipt = controller.submit(
        SubmitOptions::new()
            .reason("normal")
            .dates("2026-03-02", "2026-03-09"),
    )?;
    println!("{receipt}");
    print_stock(&controller, &["Breadboard", "Digital Multimeter"]);

    // Expedited requests
    println!("\nQueueing expedited requests...");
    controller.add_to_cart("Switches")?;
    controller.submit(SubmitOptions::new().reason("normal").prioritize(true))?;
    controller.add_to_cart("DC Power Supply")?;
    let urgent = controller.submit(SubmitOptions::new().reason("emergency").prioritize(true))?;
    println!("{urgent}");

    while let Some(request) = controller.next_priority() {
        println!(
            "  dispatched {} ({}) for {}",
            item_names(request.items()),
            request.reason(),
            request.requester().name
        );
    }

    // Return and undo
    println!("\nReturning the multimeter...");
    let returned = controller.return_items(["Digital Multimeter"])?;
    println!("{returned}");
    print_stock(&controller, &["Digital Multimeter"]);

    println!("\nUndoing...");
    for _ in 0..3 {
        println!("  {}", controller.undo()?);
    }
    print_stock(
        &controller,
        &["Breadboard", "Digital Multimeter", "Switches", "DC Power Supply"],
    );

    println!("\nHistory:");
    for request in controller.history() {
        println!(
            "  {} {} ({} item(s))",
            request.timestamp(),
            request.reason(),
            request.items().len()
        );
    }

    println!("\nReminders:");
    for reminder in controller.reminders() {
        println!(
            "  {}: {} item(s), due {}",
            reminder.user,
            reminder.items.len(),
            reminder.return_date
        );
    }

    let depths = controller.queue_depths();
    println!(
        "\nPending: {} | Priority: {} | Undo records: {}",
        depths.pending,
        depths.priority,
        controller.undo_depth()
    );

    controller.sign_out();
    println!("\n=== Done ===");
    Ok(())
}

