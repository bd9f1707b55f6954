//! Organizer and exhibitor profile registration.

use expodesk_auth::User;
use expodesk_database::{
    CreateExhibitorRequest, CreateOrganizerRequest, DocumentKind, Exhibitor, ExhibitorRepository,
    Organizer, OrganizerRepository, UserType,
};
use sqlx::SqlitePool;

use super::{error::ServiceError, notifications};

pub struct NewOrganizerProfile {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
}

pub struct NewExhibitorProfile {
    pub company: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
}

pub async fn register_organizer(
    pool: &SqlitePool,
    user: &User,
    profile: NewOrganizerProfile,
) -> Result<Organizer, ServiceError> {
    for (field, value) in [
        ("name", &profile.name),
        ("company", &profile.company),
        ("email", &profile.email),
        ("phone", &profile.phone),
    ] {
        if value.trim().is_empty() {
            return Err(ServiceError::bad_request(format!("{field} must not be empty")));
        }
    }

    let request = CreateOrganizerRequest {
        user_id: user.id,
        name: profile.name.trim().to_string(),
        company: profile.company.trim().to_string(),
        email: profile.email.trim().to_string(),
        phone: profile.phone.trim().to_string(),
    };

    let organizer = OrganizerRepository::new(pool.clone())
        .create(&request)
        .await
        .map_err(|err| {
            if err.is_unique_violation() {
                ServiceError::bad_request("organizer profile already registered")
            } else {
                ServiceError::from(err)
            }
        })?;

    notifications::notify_admins(
        pool,
        "organizer_registered",
        "新しい主催者登録",
        &format!("{}（{}）が主催者登録を申請しました。", organizer.name, organizer.company),
    )
    .await;

    Ok(organizer)
}

pub async fn list_pending_organizers(pool: &SqlitePool) -> Result<Vec<Organizer>, ServiceError> {
    let organizers = OrganizerRepository::new(pool.clone()).list_pending().await?;
    Ok(organizers)
}

/// Admin approval of an organizer profile. Notifies the organizer's account.
pub async fn approve_organizer(pool: &SqlitePool, organizer_id: i64) -> Result<Organizer, ServiceError> {
    let repo = OrganizerRepository::new(pool.clone());

    if !repo.approve(organizer_id).await? {
        return Err(ServiceError::NotFound);
    }

    let organizer = repo
        .find_by_id(organizer_id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    notifications::notify(
        pool,
        organizer.user_id,
        UserType::Organizer,
        "organizer_approved",
        "主催者登録が承認されました",
        "イベントの作成と掲載申請ができるようになりました。",
    )
    .await;

    Ok(organizer)
}

pub async fn organizer_for_user(pool: &SqlitePool, user: &User) -> Result<Organizer, ServiceError> {
    OrganizerRepository::new(pool.clone())
        .find_by_user_id(user.id)
        .await?
        .ok_or(ServiceError::NotFound)
}

pub async fn register_exhibitor(
    pool: &SqlitePool,
    user: &User,
    profile: NewExhibitorProfile,
) -> Result<Exhibitor, ServiceError> {
    for (field, value) in [
        ("company", &profile.company),
        ("contact_name", &profile.contact_name),
        ("email", &profile.email),
        ("phone", &profile.phone),
    ] {
        if value.trim().is_empty() {
            return Err(ServiceError::bad_request(format!("{field} must not be empty")));
        }
    }

    let request = CreateExhibitorRequest {
        user_id: user.id,
        company: profile.company.trim().to_string(),
        contact_name: profile.contact_name.trim().to_string(),
        email: profile.email.trim().to_string(),
        phone: profile.phone.trim().to_string(),
    };

    let exhibitor = ExhibitorRepository::new(pool.clone())
        .create(&request)
        .await
        .map_err(|err| {
            if err.is_unique_violation() {
                ServiceError::bad_request("exhibitor profile already registered")
            } else {
                ServiceError::from(err)
            }
        })?;

    Ok(exhibitor)
}

pub async fn exhibitor_for_user(pool: &SqlitePool, user: &User) -> Result<Exhibitor, ServiceError> {
    ExhibitorRepository::new(pool.clone())
        .find_by_user_id(user.id)
        .await?
        .ok_or(ServiceError::NotFound)
}

/// Attach a compliance-document URL to the exhibitor profile.
pub async fn attach_document(
    pool: &SqlitePool,
    exhibitor: &Exhibitor,
    kind: DocumentKind,
    url: &str,
) -> Result<(), ServiceError> {
    if !url.starts_with("http://") && !url.starts_with("https://") && !url.starts_with("data:") {
        return Err(ServiceError::bad_request("document url must be an http(s) or data url"));
    }

    let updated = ExhibitorRepository::new(pool.clone())
        .set_document_url(exhibitor.id, kind, url)
        .await?;

    if !updated {
        return Err(ServiceError::NotFound);
    }

    Ok(())
}
