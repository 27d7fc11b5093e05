//! User aggregate
//!
//! Contains the User entity, DTOs, and repository interface.

pub mod model;
pub mod repository;

mod dto_create;
mod dto_update;

pub use model::{default_avatar_url, PublicUser, User, UserRole};

pub use dto_create::RegisterUserDto;
pub use dto_update::UpdateUserDto;

pub use repository::UserRepository;
