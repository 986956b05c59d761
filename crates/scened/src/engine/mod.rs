mod dispatch;
mod reproducer;
mod store;

pub use dispatch::ChannelDispatcher;
pub use dispatch::CommandReceiver;
pub use dispatch::CommandSender;
pub use dispatch::DispatchError;
pub use dispatch::Dispatcher;
pub use reproducer::Failure;
pub use reproducer::ReproduceReport;
pub use reproducer::Reproducer;
pub use reproducer::Unsupported;
pub use store::StateStore;
pub use store::States;
