/// 사용자 관련 커맨드 처리
/// 1. 회원 가입
// region:    --- Imports
use crate::database::DatabaseManager;
use crate::error::{Error, Result};
use crate::users::model::User;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

// region:    --- Commands
/// 회원 가입 명령
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterUserCommand {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 50;
const MIN_PASSWORD_LENGTH: usize = 6;

/// 가입 명령 검증
fn validate_register(cmd: &RegisterUserCommand) -> Result<()> {
    if !cmd.email.contains('@') || cmd.email.trim().is_empty() {
        return Err(Error::Validation("올바른 이메일이 아닙니다".to_string()));
    }
    let username_len = cmd.username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&username_len) {
        return Err(Error::Validation(format!(
            "사용자 이름은 {MIN_USERNAME_LENGTH}~{MAX_USERNAME_LENGTH}자여야 합니다"
        )));
    }
    if cmd.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::Validation(format!(
            "비밀번호는 최소 {MIN_PASSWORD_LENGTH}자여야 합니다"
        )));
    }
    if cmd.first_name.trim().is_empty() || cmd.last_name.trim().is_empty() {
        return Err(Error::Validation("이름은 비울 수 없습니다".to_string()));
    }
    Ok(())
}
// endregion: --- Commands

// region:    --- Command Handlers
/// 1. 회원 가입. 이메일/사용자 이름 중복을 검사하고 비밀번호는 argon2 해시로만 저장한다.
pub async fn handle_register_user(
    cmd: RegisterUserCommand,
    db_manager: &DatabaseManager,
) -> Result<User> {
    info!("{:<12} --> 회원 가입 요청: {}", "Command", cmd.username);
    validate_register(&cmd)?;

    let email_taken =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
            .bind(&cmd.email)
            .fetch_one(db_manager.pool())
            .await?;
    if email_taken {
        return Err(Error::EmailTaken);
    }

    let username_taken =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
            .bind(&cmd.username)
            .fetch_one(db_manager.pool())
            .await?;
    if username_taken {
        return Err(Error::UsernameTaken);
    }

    let password_hash = hash_password(&cmd.password)?;

    // 선행 검사와 삽입 사이의 경합은 UNIQUE 제약이 막는다
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, username, password_hash, first_name, last_name, phone)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(&cmd.email)
    .bind(&cmd.username)
    .bind(&password_hash)
    .bind(&cmd.first_name)
    .bind(&cmd.last_name)
    .bind(&cmd.phone)
    .fetch_one(db_manager.pool())
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            if db_err.message().contains("email") {
                Error::EmailTaken
            } else {
                Error::UsernameTaken
            }
        }
        _ => Error::from(e),
    })?;

    info!("{:<12} --> 회원 가입 완료: id {}", "Command", user.id);
    Ok(user)
}

/// argon2 해시 생성 (PHC 문자열)
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Internal(format!("비밀번호 해시 실패: {e}")))?;
    Ok(hash.to_string())
}
// endregion: --- Command Handlers

// endregion: --- Tests
