mod bus;
mod events;

pub use bus::{EventBus, ObserverId, StackObserver};
pub use events::StackEvent;
