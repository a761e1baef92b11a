pub mod decks;
pub mod detail;
pub mod input;
pub mod map;
pub mod outline;
pub mod sources;
pub mod tabs;
