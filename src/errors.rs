//! Unified error type for the service, the bot and their shared core.
//!
//! Domain variants carry the Russian message shown to dashboard users as-is.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Ошибка конфигурации: {message}")]
    Config { message: String },

    #[error("Ошибка базы данных: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка сериализации: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Ошибка HTTP-запроса: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Ошибка планировщика: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),

    #[error("Ошибка чат-платформы: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),

    #[error("Листовка не найдена")]
    LeafletNotFound { id: i64 },

    #[error("Заказ на распространение не найден")]
    LeafletOrderNotFound { id: i64 },

    #[error("Город не найден")]
    CityNotFound { id: i64 },

    #[error("Распространитель не найден")]
    DistributorNotFound { id: i64 },

    #[error("Работник не найден")]
    WorkerNotFound { id: i64 },

    #[error("Заказ не найден")]
    OrderNotFound { id: i64 },

    #[error("Цель не найдена")]
    GoalNotFound { id: i64 },

    #[error("Пользователь не найден")]
    UserNotFound { id: i64 },

    #[error("Недостаточно листовок на складе")]
    InsufficientStock { available: i64, requested: i64 },

    #[error("Некорректное количество: {quantity}")]
    InvalidQuantity { quantity: i64 },

    #[error("Недопустимое действие «{action}» для заказа в статусе {state}")]
    InvalidTransition { state: String, action: &'static str },

    #[error("{message}")]
    Validation { message: String },

    #[error("Запись используется и не может быть удалена: {message}")]
    InUse { message: String },

    #[error("Неверный логин или пароль")]
    InvalidCredentials,

    #[error("Сессия истекла, войдите снова")]
    Unauthorized,

    #[error("Недостаточно прав")]
    Forbidden,

    #[error("Ошибка токена: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Ошибка хеширования пароля: {message}")]
    PasswordHash { message: String },

    #[error("API вернул ошибку {status}: {message}")]
    Api { status: u16, message: String },
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
