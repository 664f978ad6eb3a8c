//! Decorative collaborators. They read deck notifications and scroll
//! position; nothing here feeds back into navigation.

pub mod ambient;
pub mod particles;

pub use ambient::AmbientGlow;
pub use particles::ParticleField;
