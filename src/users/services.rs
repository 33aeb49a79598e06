use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    response::{FieldError, Outcome},
};

use super::{
    dto::CreateUserDto,
    form::{CreateUserForm, Form},
    password::hash_password,
    repo::{RepoError, UserRepository},
    repo_types::{NewUser, User},
};

pub const USERNAME_TAKEN: &str = "Username already exists";
pub const EMAIL_TAKEN: &str = "Email already exists";

pub async fn list_users(users: &dyn UserRepository) -> Result<Vec<User>, AppError> {
    Ok(users.find_all().await?)
}

pub async fn get_user_by_id(users: &dyn UserRepository, id: Uuid) -> Result<Option<User>, AppError> {
    Ok(users.find_by_id(id).await?)
}

/// Validate `payload` and store a new user.
///
/// Structural and uniqueness problems come back as `Outcome::Error` (400)
/// and leave the store untouched; `Err` is reserved for infrastructure
/// failures.
pub async fn create_user(
    users: &dyn UserRepository,
    payload: &Value,
) -> Result<Outcome<User>, AppError> {
    let form = validate_create_payload(users, payload).await?;
    if !form.is_valid() {
        debug!(errors = form.errors().len(), "create user rejected");
        return Ok(Outcome::bad_request(form.into_errors()));
    }

    let new_user = new_user_from_dto(form.into_data())?;
    match users.save(new_user).await {
        Ok(user) => {
            info!(user_id = %user.id, username = %user.username, "user created");
            Ok(Outcome::created(user))
        }
        Err(RepoError::Duplicate { field }) => {
            warn!(field, "unique constraint hit on insert");
            Ok(Outcome::bad_request(vec![FieldError::new(
                Some(field),
                taken_message(field),
            )]))
        }
        Err(e) => Err(e.into()),
    }
}

async fn validate_create_payload(
    users: &dyn UserRepository,
    payload: &Value,
) -> Result<Form<CreateUserDto>, AppError> {
    let mut form = CreateUserForm::submit(payload);

    // Only well-formed values are looked up; anything else already failed.
    if !form.has_error("username") {
        let username = form.data().username.clone();
        if users.find_by_username(&username).await?.is_some() {
            form.add_error(Some("username"), USERNAME_TAKEN);
        }
    }

    if !form.has_error("email") {
        let email = form.data().email.clone();
        if users.find_by_email(&email).await?.is_some() {
            form.add_error(Some("email"), EMAIL_TAKEN);
        }
    }

    Ok(form)
}

fn new_user_from_dto(dto: CreateUserDto) -> Result<NewUser, AppError> {
    let password_hash = hash_password(&dto.password)?;
    let now = OffsetDateTime::now_utc();
    Ok(NewUser {
        username: dto.username,
        email: dto.email,
        password_hash,
        created_at: now,
        updated_at: now,
    })
}

fn taken_message(field: &str) -> &'static str {
    match field {
        "email" => EMAIL_TAKEN,
        _ => USERNAME_TAKEN,
    }
}
