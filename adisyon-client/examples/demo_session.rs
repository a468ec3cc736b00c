//! Drive a terminal session against the in-memory gateway
//!
//! ```sh
//! RUST_LOG=debug cargo run -p adisyon-client --example demo_session
//! ```

use adisyon_client::{
    ClientConfig, MemoryGateway, OrderLine, PosSession, ServerEvent, TenderField, UiEvent, drive,
};
use shared::message::{InitialDataPayload, OrderPayload, PaymentCompletedPayload};
use shared::models::{MenuItem, SystemInfo};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (gateway, inbound, mut server) = MemoryGateway::channel();
    let mut session = PosSession::new(gateway, ClientConfig::default());
    let mut ui = session.subscribe();

    // Local action first, then hand the session to the pump
    session.select_order("Masa 3")?;
    let emitted = server.next_emitted().await;
    println!("emitted: {:?}", emitted.map(|e| e.event));

    let shutdown = CancellationToken::new();
    let pump = tokio::spawn(drive(session, inbound, shutdown.clone()));

    let mut menu = shared::models::Menu::new();
    menu.insert(
        "Icecekler".to_string(),
        vec![MenuItem("Kola".to_string(), 15.0), MenuItem("Ayran".to_string(), 10.0)],
    );
    server.push(ServerEvent::InitialData(InitialDataPayload {
        system: SystemInfo {
            company_name: "Demo Lokanta".to_string(),
            masa_sayisi: 12,
            paket_sayisi: 4,
            ..Default::default()
        },
        menu,
        adisyonlar: Default::default(),
    }))?;
    server.push(ServerEvent::MasaSelected(OrderPayload {
        masa: "Masa 3".to_string(),
        items: vec![OrderLine::new("Kola", 15.0, 2), OrderLine::new("Ayran", 10.0, 1)],
        total: Some(40.0),
        source: None,
    }))?;

    // Wait until the order reached the session
    while let Ok(event) = ui.recv().await {
        if let UiEvent::OrderChanged { order_id, total, line_count } = event {
            if line_count > 0 {
                println!("{} -> {} lines, total {}", order_id, line_count, total);
                break;
            }
        }
    }

    shutdown.cancel();
    let mut session = pump.await?;

    session.open_payment(Some(TenderField::Cash), false)?;
    session.edit_tender_text(TenderField::Card, "15,50")?;
    let outcome = session.finalize_payment(false)?;
    println!("finalized: {:?}", outcome.request().tenders);

    if let Some(envelope) = server.next_emitted().await {
        println!("emitted {} -> {}", envelope.request_id, envelope.event);
    }

    session.handle(ServerEvent::PaymentCompleted(PaymentCompletedPayload {
        masa: "Masa 3".to_string(),
        payment_type: "Nakit + Kredi Kartı".to_string(),
        is_partial: false,
    }));
    let indicator = session.store().table_indicator("Masa 3");
    println!("Masa 3 occupied: {}, total {}", indicator.occupied, indicator.total);

    Ok(())
}
