//! # Event subscribers for the watchvisor runtime.
//!
//! Status reports are [`Event`](crate::Event)s on the bus; subscribers turn
//! them into output.
//!
//! ```text
//! Task ── publish(Event) ──► Bus ──► Runtime listener ──► SubscriberSet
//!                                                            ├──► LogWriter (stdout)
//!                                                            └──► custom Subscribe impls
//! ```

mod log;
mod subscriber;
mod subscriber_set;

pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
