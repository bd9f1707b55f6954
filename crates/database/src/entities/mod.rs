//! Entity definitions shared across the repositories.

pub mod application;
pub mod event;
pub mod exhibitor;
pub mod notification;
pub mod organizer;

pub use application::{
    Application, ApplicationStatus, ApplicationWithEvent, ApplicationWithExhibitor,
};
pub use event::{CreateEventRequest, Event, EventStatus};
pub use exhibitor::{CreateExhibitorRequest, DocumentKind, Exhibitor};
pub use notification::{CreateNotificationRequest, Notification, UserType};
pub use organizer::{CreateOrganizerRequest, Organizer};
