pub mod backup;
pub mod probe;
pub mod restore;
