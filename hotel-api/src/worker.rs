use hotel_core::{EventBus, HotelEvent};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Audit trail of domain events in the service log.
pub fn spawn_event_logger(events: &EventBus) -> JoinHandle<()> {
    let mut rx = events.subscribe();

    tokio::spawn(async move {
        info!("Event logger started");
        loop {
            match rx.recv().await {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event logger lagged"),
                Err(RecvError::Closed) => break,
            }
        }
        info!("Event logger stopped");
    })
}

fn log_event(event: &HotelEvent) {
    match event {
        HotelEvent::ReservationCreated { reservation_id, room_id, .. } => {
            info!(%reservation_id, %room_id, "event: reservation created")
        }
        HotelEvent::ReservationDeactivated { event, .. } => info!(
            reservation_id = %event.reservation_id,
            room_id = %event.room_id,
            reason = ?event.reason,
            "event: reservation deactivated"
        ),
        HotelEvent::GuestCheckedIn { reservation_id, room_id, .. } => {
            info!(%reservation_id, %room_id, "event: guest checked in")
        }
        HotelEvent::RoomStatusChanged { room_id, from, to, .. } => {
            info!(%room_id, %from, %to, "event: room status changed")
        }
    }
}
