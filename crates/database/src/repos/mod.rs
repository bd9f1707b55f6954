//! Repository implementations over the SQLite pool.

pub mod application_repository;
pub mod event_repository;
pub mod exhibitor_repository;
pub mod notification_repository;
pub mod organizer_repository;

pub use application_repository::ApplicationRepository;
pub use event_repository::EventRepository;
pub use exhibitor_repository::ExhibitorRepository;
pub use notification_repository::NotificationRepository;
pub use organizer_repository::OrganizerRepository;
