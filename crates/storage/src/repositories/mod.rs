pub mod admin_sessions_repo;
pub mod signals_repo;
pub mod subscriptions_repo;

pub use admin_sessions_repo::AdminSessionRepository;
pub use signals_repo::SignalRepository;
pub use subscriptions_repo::SubscriptionRepository;

pub(crate) fn decode_error<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}
