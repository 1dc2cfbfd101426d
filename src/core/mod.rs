pub mod context;
pub mod effects;
pub mod grammar;
pub mod narrator;
pub mod phrasing;
pub mod pipeline;
pub mod selector;
pub mod variety;
