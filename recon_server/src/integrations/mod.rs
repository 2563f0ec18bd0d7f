pub mod gateway;
pub mod notifier;

pub use gateway::HttpPaymentGateway;
pub use notifier::HttpNotifier;
