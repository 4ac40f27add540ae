pub mod logging;
pub mod character_gen;

// Character and draft persistence collaborators
pub mod storage;
