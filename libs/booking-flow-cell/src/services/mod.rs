pub mod availability;
pub mod booking;
pub mod flow;
pub mod selection;
pub mod slots;

pub use availability::AvailabilityService;
pub use booking::BookingService;
pub use flow::BookingFlow;
pub use selection::SelectionFlow;
pub use slots::derive_day_slots;
