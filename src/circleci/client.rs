mod core;
mod insights;
mod pipelines;
mod workflows;

pub use self::core::CircleClient;
