pub mod effect;
pub mod pitch;
pub mod utterance;
