mod state;

pub use state::{AppState, HistoryCache};
