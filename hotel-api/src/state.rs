use hotel_core::Hotel;

#[derive(Clone)]
pub struct AppState {
    pub hotel: Hotel,
}

impl AppState {
    pub fn new(hotel: Hotel) -> Self {
        Self { hotel }
    }
}
