// Adapters layer: concrete implementations for external systems (http api client).

pub mod google_ads;
