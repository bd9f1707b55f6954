//! Event lifecycle: creation, admin review, and closing applications.

use expodesk_database::{
    ApplicationRepository, ApplicationWithExhibitor, CreateEventRequest, Event, EventRepository,
    EventStatus, Organizer, OrganizerRepository, UserType,
};
use sqlx::SqlitePool;

use super::{error::ServiceError, notifications};

pub struct NewEvent {
    pub name: String,
    pub description: Option<String>,
    pub starts_on: Option<String>,
    pub ends_on: Option<String>,
}

/// The result of closing an event's application window.
pub struct ClosedApplications {
    pub event: Event,
    pub closed_at: String,
    pub applications: Vec<ApplicationWithExhibitor>,
}

pub async fn create_event(
    pool: &SqlitePool,
    organizer: &Organizer,
    event: NewEvent,
) -> Result<Event, ServiceError> {
    if event.name.trim().is_empty() {
        return Err(ServiceError::bad_request("event name must not be empty"));
    }

    let request = CreateEventRequest {
        organizer_id: organizer.id,
        name: event.name.trim().to_string(),
        description: event.description,
        starts_on: event.starts_on,
        ends_on: event.ends_on,
    };

    let created = EventRepository::new(pool.clone()).create(&request).await?;

    notifications::notify_admins(
        pool,
        "event_submitted",
        "新しいイベント申請",
        &format!("{} が掲載審査待ちです。", created.name),
    )
    .await;

    Ok(created)
}

pub async fn list_for_organizer(
    pool: &SqlitePool,
    organizer: &Organizer,
) -> Result<Vec<Event>, ServiceError> {
    let events = EventRepository::new(pool.clone())
        .list_by_organizer(organizer.id)
        .await?;
    Ok(events)
}

pub async fn list_open_for_store(pool: &SqlitePool) -> Result<Vec<Event>, ServiceError> {
    let events = EventRepository::new(pool.clone()).list_open_approved().await?;
    Ok(events)
}

pub async fn list_pending(pool: &SqlitePool) -> Result<Vec<Event>, ServiceError> {
    let events = EventRepository::new(pool.clone()).list_pending().await?;
    Ok(events)
}

/// Admin decision on a pending event. Notifies the owning organizer.
pub async fn review_event(
    pool: &SqlitePool,
    event_id: i64,
    status: EventStatus,
) -> Result<Event, ServiceError> {
    let repo = EventRepository::new(pool.clone());
    let event = repo.find_by_id(event_id).await?.ok_or(ServiceError::NotFound)?;

    if !repo.review(event_id, status).await? {
        return Err(ServiceError::bad_request("event has already been reviewed"));
    }

    if let Some(organizer) = OrganizerRepository::new(pool.clone())
        .find_by_id(event.organizer_id)
        .await?
    {
        let (title, message) = match status {
            EventStatus::Approved => (
                "イベントが承認されました",
                format!("{} の掲載が承認されました。", event.name),
            ),
            _ => (
                "イベントが却下されました",
                format!("{} の掲載は承認されませんでした。", event.name),
            ),
        };
        notifications::notify(
            pool,
            organizer.user_id,
            UserType::Organizer,
            "event_reviewed",
            title,
            &message,
        )
        .await;
    }

    let reviewed = repo.find_by_id(event_id).await?.ok_or(ServiceError::NotFound)?;
    Ok(reviewed)
}

/// Close the application window for an event and return the applicant list.
///
/// The event must exist and belong to the requesting organizer. The close
/// itself is a conditional update, so a concurrent or repeated close surfaces
/// as `AlreadyClosed` without touching the row again.
pub async fn close_applications(
    pool: &SqlitePool,
    organizer: &Organizer,
    event_id: i64,
) -> Result<ClosedApplications, ServiceError> {
    let repo = EventRepository::new(pool.clone());
    let event = repo.find_by_id(event_id).await?.ok_or(ServiceError::NotFound)?;

    if event.organizer_id != organizer.id {
        return Err(ServiceError::Forbidden);
    }

    let closed_at = chrono::Utc::now().to_rfc3339();
    if !repo.close_applications(event_id, organizer.id, &closed_at).await? {
        return Err(ServiceError::AlreadyClosed);
    }

    let applications = ApplicationRepository::new(pool.clone())
        .list_for_event(event_id)
        .await?;

    let event = repo.find_by_id(event_id).await?.ok_or(ServiceError::NotFound)?;

    Ok(ClosedApplications {
        event,
        closed_at,
        applications,
    })
}

/// Applicant list for an export that does not close the event. Ownership is
/// checked the same way as for closing.
pub async fn applications_for_export(
    pool: &SqlitePool,
    organizer: &Organizer,
    event_id: i64,
) -> Result<(Event, Vec<ApplicationWithExhibitor>), ServiceError> {
    let event = EventRepository::new(pool.clone())
        .find_by_id(event_id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if event.organizer_id != organizer.id {
        return Err(ServiceError::Forbidden);
    }

    let applications = ApplicationRepository::new(pool.clone())
        .list_for_event(event_id)
        .await?;

    Ok((event, applications))
}
