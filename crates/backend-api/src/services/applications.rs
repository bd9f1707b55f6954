//! Application submission and review.

use expodesk_database::{
    Application, ApplicationRepository, ApplicationStatus, ApplicationWithEvent,
    ApplicationWithExhibitor, EventRepository, EventStatus, Exhibitor, ExhibitorRepository,
    Organizer, OrganizerRepository, UserType,
};
use sqlx::SqlitePool;

use super::{error::ServiceError, notifications};

/// Submit an application from an exhibitor to an event.
pub async fn submit(
    pool: &SqlitePool,
    exhibitor: &Exhibitor,
    event_id: i64,
) -> Result<Application, ServiceError> {
    let event = EventRepository::new(pool.clone())
        .find_by_id(event_id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if event.status != EventStatus::Approved {
        return Err(ServiceError::bad_request("event is not accepting applications"));
    }
    if event.applications_closed() {
        return Err(ServiceError::bad_request("applications are closed for this event"));
    }

    let application = ApplicationRepository::new(pool.clone())
        .create(exhibitor.id, event_id)
        .await
        .map_err(|err| {
            if err.is_unique_violation() {
                ServiceError::bad_request("already applied to this event")
            } else {
                ServiceError::from(err)
            }
        })?;

    if let Some(organizer) = OrganizerRepository::new(pool.clone())
        .find_by_id(event.organizer_id)
        .await?
    {
        notifications::notify(
            pool,
            organizer.user_id,
            UserType::Organizer,
            "application_submitted",
            "新しい出展申込",
            &format!("{} から {} への出展申込が届きました。", exhibitor.company, event.name),
        )
        .await;
    }

    Ok(application)
}

pub async fn list_for_event(
    pool: &SqlitePool,
    organizer: &Organizer,
    event_id: i64,
) -> Result<Vec<ApplicationWithExhibitor>, ServiceError> {
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
    Ok(applications)
}

pub async fn list_for_exhibitor(
    pool: &SqlitePool,
    exhibitor: &Exhibitor,
) -> Result<Vec<ApplicationWithEvent>, ServiceError> {
    let applications = ApplicationRepository::new(pool.clone())
        .list_for_exhibitor(exhibitor.id)
        .await?;
    Ok(applications)
}

/// Organizer decision on a pending application. Notifies the exhibitor.
pub async fn review(
    pool: &SqlitePool,
    organizer: &Organizer,
    application_id: i64,
    status: ApplicationStatus,
) -> Result<Application, ServiceError> {
    let repo = ApplicationRepository::new(pool.clone());
    let application = repo
        .find_by_id(application_id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let event = EventRepository::new(pool.clone())
        .find_by_id(application.event_id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if event.organizer_id != organizer.id {
        return Err(ServiceError::Forbidden);
    }

    if !repo.review(application_id, status).await? {
        return Err(ServiceError::bad_request("application has already been reviewed"));
    }

    if let Some(exhibitor) = ExhibitorRepository::new(pool.clone())
        .find_by_id(application.exhibitor_id)
        .await?
    {
        let (title, message) = match status {
            ApplicationStatus::Approved => (
                "出展申込が承認されました",
                format!("{} への出展申込が承認されました。", event.name),
            ),
            _ => (
                "出展申込が却下されました",
                format!("{} への出展申込は承認されませんでした。", event.name),
            ),
        };
        notifications::notify(
            pool,
            exhibitor.user_id,
            UserType::Exhibitor,
            "application_reviewed",
            title,
            &message,
        )
        .await;
    }

    let reviewed = repo
        .find_by_id(application_id)
        .await?
        .ok_or(ServiceError::NotFound)?;
    Ok(reviewed)
}
