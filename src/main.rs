use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use aggregate_runtime::domain::order::{OrderAggregate, OrderItem, OrderStatus, ShippingAddress};
use aggregate_runtime::{AggregateRoot, Enumeration, RuntimeConfig};

fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=trace cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,aggregate_runtime=debug")),
        )
        .init();

    tracing::info!("Starting aggregate runtime demo");

    let config = match std::env::var("AGGREGATE_RUNTIME_CONFIG") {
        Ok(path) => RuntimeConfig::from_json(&std::fs::read_to_string(path)?)?,
        Err(_) => RuntimeConfig::default(),
    };

    // === 1. Create a draft order ===
    let address = ShippingAddress::new("221B Baker Street", "London", "NW1 6XE", "UK")?;
    let mut order = OrderAggregate::create(
        Uuid::new_v4(),
        address,
        vec![OrderItem {
            product_id: Uuid::new_v4(),
            quantity: 2,
            unit_price_cents: 1_999,
        }],
        config.clone(),
    )?;
    tracing::info!(
        order_id = %order.id(),
        lifecycle = ?order.tracking().lifecycle(),
        "Draft order ready"
    );

    // === 2. Invalid value objects fail fast ===
    if let Err(e) = ShippingAddress::new("", "London", "?", "UK") {
        tracing::info!("Rejected address:\n{}", e);
    }

    // === 3. Mutate through business methods ===
    order.add_line(OrderItem {
        product_id: Uuid::new_v4(),
        quantity: 1,
        unit_price_cents: 4_500,
    })?;
    order.confirm()?;

    if let Err(e) = order.add_line(OrderItem {
        product_id: Uuid::new_v4(),
        quantity: 1,
        unit_price_cents: 100,
    }) {
        tracing::info!(error = %e, "Confirmed orders are locked");
    }

    tracing::info!(
        status = order.status().name(),
        version = order.version(),
        total_cents = order.total_cents(),
        can_ship = order.can_move_to(OrderStatus::Shipped),
        "Order confirmed"
    );

    // === 4. Commit for publication ===
    let envelopes = order.commit(Uuid::new_v4());
    for envelope in &envelopes {
        tracing::info!(
            sequence = envelope.sequence_number,
            event_type = %envelope.event_type,
            "Publishing event"
        );
    }
    order.tracking_mut().mark_as_clean();

    // === 5. Rebuild from the published history ===
    let mut restored = OrderAggregate::rehydrate(order.id(), envelopes, config)?;
    tracing::info!(
        version = restored.version(),
        status = restored.status().name(),
        clean = restored.tracking().is_clean(),
        "Order rebuilt from history"
    );

    restored.ship("1Z999AA10123456784", "UPS")?;
    if let Err(e) = restored.cancel(Some("too late".to_string())) {
        tracing::info!(error = %e, "Shipped orders cannot be cancelled");
    }

    // === 6. Projections ===
    let plain = restored.to_plain()?;
    println!("{}", serde_json::to_string_pretty(&plain.to_json())?);

    let frozen = restored.freeze();
    tracing::info!(
        version = frozen.version(),
        tracking = ?frozen.tracking(),
        "Snapshot handed off"
    );

    tracing::info!("Demo complete");
    Ok(())
}
