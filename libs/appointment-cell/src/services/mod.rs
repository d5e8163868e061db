pub mod booking;
pub mod conflict;
pub mod lifecycle;
pub mod pricing;

pub use booking::BookingService;
pub use conflict::ConflictDetectionService;
pub use lifecycle::AppointmentLifecycleService;
pub use pricing::PricingService;
