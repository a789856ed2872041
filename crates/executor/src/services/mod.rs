pub mod admin_auth;
pub mod auto_signal_service;
pub mod signal_pipeline;
pub mod telegram_service;

pub use admin_auth::AdminAuth;
pub use auto_signal_service::AutoSignalService;
pub use signal_pipeline::SignalPipeline;
pub use telegram_service::TelegramService;
