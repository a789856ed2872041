pub mod admin_session;
pub mod signal;
pub mod subscription;

pub use admin_session::AdminSession;
pub use signal::{
    Analysis, Direction, ExecutionSpeed, Indicators, Macd, Momentum, RequestedBy, RiskRating,
    Signal, SignalCounts, SignalStatus, SignalStyle, SignalSummary, SignalType, UnknownVariant,
    VolumeLevel,
};
pub use subscription::{PaymentStatus, PlanType, Subscription};
