pub mod analytics;
pub mod d1;
pub mod notifications;
