pub mod booking;
pub mod catalog;
pub mod config;
pub mod metrics;
pub mod seating;
pub mod testing;

pub use booking::{
    BookingConfig, BookingData, BookingError, BookingReceipt, BookingUploader,
    HttpBookingUploader, UploadStatus,
};
pub use catalog::{CatalogError, Movie, MovieCatalog, TmdbClient, TmdbConfig};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use seating::{
    RandomSource, Seat, SeatError, SeatEvent, SeatLabels, SeatLayoutConfiguration,
    SeatObserver, SeatSelectionEngine, SeatStatus, SubscriptionId, ThreadRandom, TicketType,
    ToggleOutcome,
};
