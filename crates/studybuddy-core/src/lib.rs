pub mod config;
pub mod draft;
pub mod filter;
pub mod gateway;
pub mod prefs;
pub mod schedule;
pub mod stats;
pub mod store;
pub mod urgency;

pub use config::Config;
pub use filter::FilterKey;
pub use gateway::{
  ApiError,
  MutationError,
  MutationGateway,
  Notice,
  NoticeKind,
  Notifier,
  TaskApi
};
pub use store::{
  StoreAction,
  StoreSink,
  TaskStore
};
pub use urgency::{
  DUE_SOON_DAYS,
  Urgency
};
