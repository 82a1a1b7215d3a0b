pub mod create;
pub mod dump;
pub mod extract;
pub mod list;
pub mod load;
pub mod verify;
